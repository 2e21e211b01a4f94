use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::RewardsWithdrawn;
use crate::math::{split_rewards, RewardSplit};
use crate::venue::{self, GetRewardAccounts};
use super::custody::transfer_signed;

/// Harvest gauge rewards for a tranche and pay them out three ways:
/// protocol fee to the factory owner, then maker and taker shares.
#[derive(Accounts)]
pub struct WithdrawRewards<'info> {
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [FACTORY_SEED],
        bump = factory_state.bump,
        constraint = factory_state.key() == vault.factory @ VaultError::InvalidAccountData
    )]
    pub factory_state: Box<Account<'info, FactoryState>>,

    #[account(
        seeds = [VAULT_SEED, vault.factory.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        has_one = vault @ VaultError::InvalidAccountData,
        seeds = [TRANCHE_SEED, vault.key().as_ref(), &tranche.index.to_le_bytes()],
        bump = tranche.bump
    )]
    pub tranche: Box<Account<'info, Tranche>>,

    #[account(address = vault.reward_mint @ VaultError::InvalidMint)]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Harvest lands here, then is split out in the same instruction
    #[account(
        init_if_needed,
        payer = caller,
        seeds = [TRANCHE_REWARD_SEED, tranche.key().as_ref()],
        bump,
        token::mint = reward_mint,
        token::authority = tranche,
        token::token_program = token_program,
    )]
    pub tranche_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = reward_mint,
        constraint = maker_reward_account.owner == vault.maker @ VaultError::Unauthorized
    )]
    pub maker_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = reward_mint,
        constraint = taker_reward_account.owner == tranche.taker @ VaultError::Unauthorized
    )]
    pub taker_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Protocol fee recipient: the factory owner
    #[account(
        mut,
        token::mint = reward_mint,
        constraint = fee_recipient_reward_account.owner == factory_state.owner @ VaultError::Unauthorized
    )]
    pub fee_recipient_reward_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Venue program recorded at vault creation
    #[account(address = vault.venue_program @ VaultError::VenueOperationFailed)]
    pub venue_program: UncheckedAccount<'info>,

    /// CHECK: Venue gauge recorded at vault creation
    #[account(mut, address = vault.gauge @ VaultError::VenueOperationFailed)]
    pub gauge: UncheckedAccount<'info>,

    /// CHECK: Tranche stake PDA at the gauge - derivation checked in handler
    #[account(mut)]
    pub gauge_stake: UncheckedAccount<'info>,

    /// CHECK: Gauge reward custody - validated by the venue
    #[account(mut)]
    pub gauge_reward_vault: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<WithdrawRewards>) -> Result<RewardSplit> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;
    let vault_key = accounts.vault.key();
    let tranche_key = accounts.tranche.key();
    let caller = accounts.caller.key();

    accounts.tranche.investor(&caller, &accounts.vault.maker)?;
    require!(
        accounts.tranche.phase(now) != TranchePhase::Created,
        VaultError::InvalidState
    );

    let (expected_stake, _) =
        venue::derive_stake_pda(&accounts.vault.gauge, &tranche_key, &accounts.vault.venue_program);
    require_keys_eq!(accounts.gauge_stake.key(), expected_stake, VaultError::VenueOperationFailed);

    let index_bytes = accounts.tranche.index.to_le_bytes();
    let tranche_seeds: &[&[&[u8]]] = &[&[
        TRANCHE_SEED,
        vault_key.as_ref(),
        &index_bytes,
        &[accounts.tranche.bump],
    ]];

    let reward_accounts = GetRewardAccounts {
        owner: accounts.tranche.to_account_info(),
        gauge: accounts.gauge.to_account_info(),
        stake: accounts.gauge_stake.to_account_info(),
        gauge_reward_vault: accounts.gauge_reward_vault.to_account_info(),
        recipient: accounts.tranche_reward_account.to_account_info(),
        reward_mint: accounts.reward_mint.to_account_info(),
        token_program: accounts.token_program.to_account_info(),
    };
    let harvested = venue::harvest_reward(
        &accounts.venue_program.to_account_info(),
        &reward_accounts,
        tranche_seeds,
    )?;

    // Split the whole escrow balance so nothing is ever stranded there
    accounts.tranche_reward_account.reload()?;
    let balance = accounts.tranche_reward_account.amount;
    let split = split_rewards(
        balance,
        accounts.vault.protocol_fee_bps,
        accounts.vault.maker_revenue_bps,
    )?;
    require!(split.total() == Some(balance), VaultError::Overflow);

    transfer_signed(
        &accounts.token_program,
        accounts.tranche_reward_account.to_account_info(),
        accounts.fee_recipient_reward_account.to_account_info(),
        accounts.tranche.to_account_info(),
        &accounts.reward_mint,
        split.fees,
        tranche_seeds,
    )?;
    transfer_signed(
        &accounts.token_program,
        accounts.tranche_reward_account.to_account_info(),
        accounts.maker_reward_account.to_account_info(),
        accounts.tranche.to_account_info(),
        &accounts.reward_mint,
        split.maker_rewards,
        tranche_seeds,
    )?;
    transfer_signed(
        &accounts.token_program,
        accounts.tranche_reward_account.to_account_info(),
        accounts.taker_reward_account.to_account_info(),
        accounts.tranche.to_account_info(),
        &accounts.reward_mint,
        split.taker_rewards,
        tranche_seeds,
    )?;

    accounts.tranche_reward_account.reload()?;
    require_eq!(accounts.tranche_reward_account.amount, 0, VaultError::InvalidState);

    let tranche = &mut accounts.tranche;
    tranche.rewards_harvested = tranche
        .rewards_harvested
        .checked_add(balance)
        .ok_or(VaultError::Overflow)?;
    tranche.fees_paid = tranche
        .fees_paid
        .checked_add(split.fees)
        .ok_or(VaultError::Overflow)?;

    msg!(
        "Tranche {} rewards: harvested {}, distributed {} (fee {}, maker {}, taker {})",
        tranche_key,
        harvested,
        balance,
        split.fees,
        split.maker_rewards,
        split.taker_rewards
    );

    emit!(RewardsWithdrawn {
        vault: vault_key,
        tranche: tranche_key,
        caller,
        harvested: balance,
        maker_rewards: split.maker_rewards,
        taker_rewards: split.taker_rewards,
        fees: split.fees,
        fee_recipient: accounts.factory_state.owner,
    });

    Ok(split)
}
