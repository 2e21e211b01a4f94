//! Venue CPI (Cross-Program Invocation) Helpers
//!
//! Every helper snapshots the relevant token balances, invokes the venue,
//! and reports what actually moved. Callers compare these settled amounts
//! against their own bounds; nothing here trusts venue return data.
//!
//! ```rust,ignore
//! let settled = venue::cpi::add_liquidity(
//!     &ctx.accounts.venue_program,
//!     &liquidity_accounts,
//!     args,
//!     &[tranche_seeds],
//! )?;
//! ```

use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::Instruction,
    program::invoke_signed,
};
use crate::errors::VaultError;
use super::accounts::{load_venue_account, VenueStake};
use super::instructions::*;

/// Offset of the `amount` field in an SPL token account
const TOKEN_AMOUNT_OFFSET: usize = 64;

// ============================================================
// CPI RESULT TYPES
// ============================================================

/// Settled amounts of an add/remove liquidity CPI, in pool order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LiquidityResult {
    /// Token A moved between the owner and the pool
    pub amount_a: u64,
    /// Token B moved between the owner and the pool
    pub amount_b: u64,
    /// LP minted (add) or burned (remove)
    pub liquidity: u64,
}

// ============================================================
// BALANCE HELPERS
// ============================================================

/// Read the amount of an SPL token account (classic or Token-2022 layout)
pub fn read_token_amount(account: &AccountInfo) -> Result<u64> {
    let data = account.try_borrow_data()?;
    token_amount_from_data(&data)
}

fn token_amount_from_data(data: &[u8]) -> Result<u64> {
    let bytes: [u8; 8] = data
        .get(TOKEN_AMOUNT_OFFSET..TOKEN_AMOUNT_OFFSET + 8)
        .and_then(|slice| slice.try_into().ok())
        .ok_or(VaultError::InvalidAccountData)?;
    Ok(u64::from_le_bytes(bytes))
}

fn spent(before: u64, after: u64) -> Result<u64> {
    before.checked_sub(after).ok_or_else(|| {
        msg!("Venue credited an account it should have debited: {} -> {}", before, after);
        error!(VaultError::VenueOperationFailed)
    })
}

fn received(before: u64, after: u64) -> Result<u64> {
    after.checked_sub(before).ok_or_else(|| {
        msg!("Venue debited an account it should have credited: {} -> {}", before, after);
        error!(VaultError::VenueOperationFailed)
    })
}

fn invoke_venue<'info>(
    name: &str,
    venue_program: &AccountInfo<'info>,
    metas: Vec<anchor_lang::solana_program::instruction::AccountMeta>,
    mut infos: Vec<AccountInfo<'info>>,
    data: Vec<u8>,
    signer_seeds: &[&[&[u8]]],
) -> Result<()> {
    let ix = Instruction {
        program_id: venue_program.key(),
        accounts: metas,
        data,
    };
    infos.push(venue_program.clone());

    invoke_signed(&ix, &infos, signer_seeds).map_err(|e| {
        msg!("Venue {} failed: {:?}", name, e);
        error!(VaultError::VenueOperationFailed)
    })
}

// ============================================================
// LIQUIDITY CPI
// ============================================================

/// Deposit both assets into the pool and mint LP to the owner
pub fn add_liquidity<'info>(
    venue_program: &AccountInfo<'info>,
    accounts: &LiquidityAccounts<'info>,
    args: AddLiquidityArgs,
    signer_seeds: &[&[&[u8]]],
) -> Result<LiquidityResult> {
    let a_before = read_token_amount(&accounts.owner_token_a)?;
    let b_before = read_token_amount(&accounts.owner_token_b)?;
    let lp_before = read_token_amount(&accounts.owner_lp)?;

    invoke_venue(
        "add_liquidity",
        venue_program,
        accounts.to_account_metas(),
        accounts.to_account_infos(),
        args.to_instruction_data()?,
        signer_seeds,
    )?;

    Ok(LiquidityResult {
        amount_a: spent(a_before, read_token_amount(&accounts.owner_token_a)?)?,
        amount_b: spent(b_before, read_token_amount(&accounts.owner_token_b)?)?,
        liquidity: received(lp_before, read_token_amount(&accounts.owner_lp)?)?,
    })
}

/// Burn LP and return both assets to the owner
pub fn remove_liquidity<'info>(
    venue_program: &AccountInfo<'info>,
    accounts: &LiquidityAccounts<'info>,
    args: RemoveLiquidityArgs,
    signer_seeds: &[&[&[u8]]],
) -> Result<LiquidityResult> {
    let a_before = read_token_amount(&accounts.owner_token_a)?;
    let b_before = read_token_amount(&accounts.owner_token_b)?;
    let lp_before = read_token_amount(&accounts.owner_lp)?;

    invoke_venue(
        "remove_liquidity",
        venue_program,
        accounts.to_account_metas(),
        accounts.to_account_infos(),
        args.to_instruction_data()?,
        signer_seeds,
    )?;

    Ok(LiquidityResult {
        amount_a: received(a_before, read_token_amount(&accounts.owner_token_a)?)?,
        amount_b: received(b_before, read_token_amount(&accounts.owner_token_b)?)?,
        liquidity: spent(lp_before, read_token_amount(&accounts.owner_lp)?)?,
    })
}

// ============================================================
// GAUGE CPI
// ============================================================

/// Stake LP at the gauge. Returns the LP that left the owner's account.
pub fn stake<'info>(
    venue_program: &AccountInfo<'info>,
    accounts: &GaugeStakeAccounts<'info>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let lp_before = read_token_amount(&accounts.owner_lp)?;

    invoke_venue(
        "gauge_deposit",
        venue_program,
        accounts.to_account_metas(),
        accounts.to_account_infos(),
        GaugeAmountArgs { amount }.deposit_data()?,
        signer_seeds,
    )?;

    spent(lp_before, read_token_amount(&accounts.owner_lp)?)
}

/// Unstake LP from the gauge. Returns the LP that arrived in the owner's account.
pub fn unstake<'info>(
    venue_program: &AccountInfo<'info>,
    accounts: &GaugeStakeAccounts<'info>,
    amount: u64,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let lp_before = read_token_amount(&accounts.owner_lp)?;

    invoke_venue(
        "gauge_withdraw",
        venue_program,
        accounts.to_account_metas(),
        accounts.to_account_infos(),
        GaugeAmountArgs { amount }.withdraw_data()?,
        signer_seeds,
    )?;

    received(lp_before, read_token_amount(&accounts.owner_lp)?)
}

/// Claim all accrued gauge rewards into `accounts.recipient`
pub fn harvest_reward<'info>(
    venue_program: &AccountInfo<'info>,
    accounts: &GetRewardAccounts<'info>,
    signer_seeds: &[&[&[u8]]],
) -> Result<u64> {
    let before = read_token_amount(&accounts.recipient)?;

    invoke_venue(
        "get_reward",
        venue_program,
        accounts.to_account_metas(),
        accounts.to_account_infos(),
        discriminators::GET_REWARD.to_vec(),
        signer_seeds,
    )?;

    received(before, read_token_amount(&accounts.recipient)?)
}

/// LP currently staked by `owner` at `gauge`. A stake account the venue has
/// not created yet counts as zero.
pub fn staked_balance(
    stake: &AccountInfo,
    gauge: &Pubkey,
    owner: &Pubkey,
    venue_program: &Pubkey,
) -> Result<u64> {
    if stake.data_is_empty() {
        return Ok(0);
    }
    let position: VenueStake = load_venue_account(stake, venue_program)?;
    require_keys_eq!(position.gauge, *gauge, VaultError::InvalidAccountData);
    require_keys_eq!(position.owner, *owner, VaultError::InvalidAccountData);
    Ok(position.amount)
}
