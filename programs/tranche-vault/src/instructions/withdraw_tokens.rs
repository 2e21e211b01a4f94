use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::TrancheWithdrawn;
use crate::math::{quote_remove_liquidity, slippage_floor};
use crate::venue::{self, GaugeStakeAccounts, LiquidityAccounts, RemoveLiquidityArgs, VenuePool};
use super::custody::transfer_signed;

/// Unwind a tranche: unstake, remove liquidity, return maker principal to the
/// vault reserve and taker principal to the taker.
/// Shared by `withdraw_tokens` and `emergency_liquidation`.
#[derive(Accounts)]
pub struct WithdrawTokens<'info> {
    /// Maker or taker of the tranche; also pays for venue account rent if any
    #[account(mut)]
    pub caller: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.factory.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        seeds = [VAULT_RESERVE_SEED, vault.key().as_ref()],
        bump = vault.reserve_bump
    )]
    pub vault_reserve: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        has_one = vault @ VaultError::InvalidAccountData,
        seeds = [TRANCHE_SEED, vault.key().as_ref(), &tranche.index.to_le_bytes()],
        bump = tranche.bump
    )]
    pub tranche: Box<Account<'info, Tranche>>,

    #[account(
        mut,
        seeds = [TRANCHE_MAKER_SEED, tranche.key().as_ref()],
        bump
    )]
    pub tranche_maker_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [TRANCHE_TAKER_SEED, tranche.key().as_ref()],
        bump
    )]
    pub tranche_taker_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        seeds = [TRANCHE_LP_SEED, tranche.key().as_ref()],
        bump
    )]
    pub tranche_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Taker principal destination
    #[account(
        mut,
        constraint = taker_token_account.owner == tranche.taker @ VaultError::Unauthorized,
        constraint = taker_token_account.mint == vault.taker_mint @ VaultError::InvalidMint
    )]
    pub taker_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = vault.maker_mint @ VaultError::InvalidMint)]
    pub maker_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = vault.taker_mint @ VaultError::InvalidMint)]
    pub taker_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mut, address = vault.lp_mint @ VaultError::InvalidMint)]
    pub lp_mint: Box<InterfaceAccount<'info, Mint>>,

    /// CHECK: Venue program recorded at vault creation
    #[account(address = vault.venue_program @ VaultError::VenueOperationFailed)]
    pub venue_program: UncheckedAccount<'info>,

    /// CHECK: Venue pool recorded at vault creation
    #[account(mut, address = vault.pool @ VaultError::VenueOperationFailed)]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: Pool custody of token A - matched against the pool state
    #[account(mut)]
    pub pool_vault_a: UncheckedAccount<'info>,

    /// CHECK: Pool custody of token B - matched against the pool state
    #[account(mut)]
    pub pool_vault_b: UncheckedAccount<'info>,

    /// CHECK: Venue gauge recorded at vault creation
    #[account(mut, address = vault.gauge @ VaultError::VenueOperationFailed)]
    pub gauge: UncheckedAccount<'info>,

    /// CHECK: Tranche stake PDA at the gauge - derivation checked in handler
    #[account(mut)]
    pub gauge_stake: UncheckedAccount<'info>,

    /// CHECK: Gauge LP custody - validated by the venue
    #[account(mut)]
    pub gauge_lp_vault: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<WithdrawTokens>) -> Result<TrancheWithdrawal> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;

    accounts
        .tranche
        .investor(&accounts.caller.key(), &accounts.vault.maker)?;
    accounts.tranche.ensure_withdrawable(now)?;

    accounts.unwind(now, false)
}

impl<'info> WithdrawTokens<'info> {
    /// Settle the tranche and forward all principal. Safe to call again:
    /// a settled or empty position returns `(0, 0)` without moving funds.
    pub fn unwind(&mut self, now: i64, via_bypass: bool) -> Result<TrancheWithdrawal> {
        let vault_key = self.vault.key();
        let tranche_key = self.tranche.key();

        let (expected_stake, _) =
            venue::derive_stake_pda(&self.vault.gauge, &tranche_key, &self.vault.venue_program);
        require_keys_eq!(self.gauge_stake.key(), expected_stake, VaultError::VenueOperationFailed);

        let staked = venue::staked_balance(
            &self.gauge_stake.to_account_info(),
            &self.vault.gauge,
            &tranche_key,
            &self.vault.venue_program,
        )?;
        let phase = self.tranche.phase(now);
        if phase == TranchePhase::Settled || staked == 0 {
            msg!("Tranche {} has nothing to unwind ({:?}, staked {})", tranche_key, phase, staked);
            return Ok(TrancheWithdrawal::default());
        }

        // Settled before any venue call
        self.tranche.mark_settled(now)?;

        let index_bytes = self.tranche.index.to_le_bytes();
        let tranche_seeds: &[&[&[u8]]] = &[&[
            TRANCHE_SEED,
            vault_key.as_ref(),
            &index_bytes,
            &[self.tranche.bump],
        ]];

        let stake_accounts = GaugeStakeAccounts {
            owner: self.tranche.to_account_info(),
            payer: self.caller.to_account_info(),
            gauge: self.gauge.to_account_info(),
            stake: self.gauge_stake.to_account_info(),
            owner_lp: self.tranche_lp_account.to_account_info(),
            gauge_lp_vault: self.gauge_lp_vault.to_account_info(),
            lp_mint: self.lp_mint.to_account_info(),
            token_program: self.token_program.to_account_info(),
            system_program: self.system_program.to_account_info(),
        };
        let unstaked = venue::unstake(
            &self.venue_program.to_account_info(),
            &stake_accounts,
            staked,
            tranche_seeds,
        )?;
        require_eq!(unstaked, staked, VaultError::VenueOperationFailed);

        self.tranche_lp_account.reload()?;
        let liquidity = self.tranche_lp_account.amount;
        let (maker_min, taker_min) = self.removal_minimums(liquidity)?;
        let (amount_a_min, amount_b_min) = self.vault.to_pool_order(maker_min, taker_min);
        let (owner_token_a, owner_token_b) = self.vault.to_pool_order(
            self.tranche_maker_account.to_account_info(),
            self.tranche_taker_account.to_account_info(),
        );
        let (mint_a, mint_b) = self.vault.to_pool_order(
            self.maker_mint.to_account_info(),
            self.taker_mint.to_account_info(),
        );

        let liquidity_accounts = LiquidityAccounts {
            owner: self.tranche.to_account_info(),
            pool: self.pool.to_account_info(),
            lp_mint: self.lp_mint.to_account_info(),
            pool_vault_a: self.pool_vault_a.to_account_info(),
            pool_vault_b: self.pool_vault_b.to_account_info(),
            owner_token_a,
            owner_token_b,
            owner_lp: self.tranche_lp_account.to_account_info(),
            mint_a,
            mint_b,
            token_program: self.token_program.to_account_info(),
        };
        let removed = venue::remove_liquidity(
            &self.venue_program.to_account_info(),
            &liquidity_accounts,
            RemoveLiquidityArgs {
                liquidity,
                amount_a_min,
                amount_b_min,
                deadline: now,
            },
            tranche_seeds,
        )?;
        require_eq!(removed.liquidity, liquidity, VaultError::VenueOperationFailed);

        // Forward the whole escrows, including any residual left from creation
        self.tranche_maker_account.reload()?;
        self.tranche_taker_account.reload()?;
        let maker_withdrawal = self.tranche_maker_account.amount;
        let taker_withdrawal = self.tranche_taker_account.amount;

        transfer_signed(
            &self.token_program,
            self.tranche_maker_account.to_account_info(),
            self.vault_reserve.to_account_info(),
            self.tranche.to_account_info(),
            &self.maker_mint,
            maker_withdrawal,
            tranche_seeds,
        )?;
        transfer_signed(
            &self.token_program,
            self.tranche_taker_account.to_account_info(),
            self.taker_token_account.to_account_info(),
            self.tranche.to_account_info(),
            &self.taker_mint,
            taker_withdrawal,
            tranche_seeds,
        )?;

        let tranche = &mut self.tranche;
        tranche.maker_withdrawn = maker_withdrawal;
        tranche.taker_withdrawn = taker_withdrawal;

        msg!(
            "Tranche {} unwound: {} LP -> maker {}, taker {}",
            tranche_key,
            liquidity,
            maker_withdrawal,
            taker_withdrawal
        );

        emit!(TrancheWithdrawn {
            vault: vault_key,
            tranche: tranche_key,
            caller: self.caller.key(),
            liquidity_removed: liquidity,
            maker_withdrawal,
            taker_withdrawal,
            via_bypass,
            settled_at: now,
        });

        Ok(TrancheWithdrawal {
            maker_withdrawal,
            taker_withdrawal,
        })
    }

    /// `(maker, taker)` floors for burning `liquidity` at current reserves
    fn removal_minimums(&self, liquidity: u64) -> Result<(u64, u64)> {
        let pool: VenuePool =
            venue::load_venue_account(&self.pool.to_account_info(), &self.vault.venue_program)?;
        require_keys_eq!(self.pool_vault_a.key(), pool.token_vault_a, VaultError::VenueOperationFailed);
        require_keys_eq!(self.pool_vault_b.key(), pool.token_vault_b, VaultError::VenueOperationFailed);

        let (reserve_maker, reserve_taker) = pool.reserves_for(&self.vault.maker_mint)?;
        let (maker_out, taker_out) =
            quote_remove_liquidity(reserve_maker, reserve_taker, self.lp_mint.supply, liquidity)?;

        let slippage_bps = self.vault.slippage_bps;
        Ok((
            slippage_floor(maker_out, slippage_bps)?,
            slippage_floor(taker_out, slippage_bps)?,
        ))
    }
}
