//! Basis-point arithmetic shared by the vault and its tranches
//!
//! All rate math truncates toward zero with a `u128` intermediate. Reward
//! splits always strip the protocol fee first and only then divide the
//! remainder between maker and taker, so the taker absorbs the rounding dust
//! of the second split and the maker/fee recipient never receive more than
//! their exact share.

use anchor_lang::prelude::*;
use crate::constants::{BPS_DENOMINATOR, MINIMUM_LIQUIDITY};
use crate::errors::VaultError;

/// Three-way distribution of one reward harvest
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RewardSplit {
    pub maker_rewards: u64,
    pub taker_rewards: u64,
    pub fees: u64,
}

impl RewardSplit {
    pub fn total(&self) -> Option<u64> {
        self.maker_rewards
            .checked_add(self.taker_rewards)?
            .checked_add(self.fees)
    }
}

/// Amounts a proportional router would accept for a pair of desired amounts
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LiquidityQuote {
    pub maker_amount: u64,
    pub taker_amount: u64,
    pub liquidity: u64,
}

/// Fails with `InvalidRate` (logging the value and the maximum) when `bps > 10000`
pub fn validate_bps(bps: u16) -> Result<()> {
    require_gte!(BPS_DENOMINATOR, bps, VaultError::InvalidRate);
    Ok(())
}

/// Split `amount` into `(floor(amount * bps / 10000), rest)`
pub fn split_bps(amount: u64, bps: u16) -> Result<(u64, u64)> {
    validate_bps(bps)?;
    let portion = (amount as u128)
        .checked_mul(bps as u128)
        .ok_or(VaultError::Overflow)?
        / BPS_DENOMINATOR as u128;
    let portion = u64::try_from(portion).map_err(|_| error!(VaultError::Overflow))?;
    let remainder = amount.checked_sub(portion).ok_or(VaultError::Overflow)?;
    Ok((portion, remainder))
}

/// Protocol fee first, then the maker's revenue share of what is left
pub fn split_rewards(total: u64, fee_bps: u16, maker_revenue_bps: u16) -> Result<RewardSplit> {
    let (fees, after_fee) = split_bps(total, fee_bps)?;
    let (maker_rewards, taker_rewards) = split_bps(after_fee, maker_revenue_bps)?;
    Ok(RewardSplit {
        maker_rewards,
        taker_rewards,
        fees,
    })
}

/// Lowest amount still inside `slippage_bps` of `amount`
pub fn slippage_floor(amount: u64, slippage_bps: u16) -> Result<u64> {
    let (_tolerance, floor) = split_bps(amount, slippage_bps)?;
    Ok(floor)
}

/// Proportional add-liquidity quote against the current pool reserves.
///
/// The maker side is used in full when the taker side can match it; if not,
/// the taker side is used in full and the maker side is scaled down to the
/// pool ratio. A pool without two-sided reserves has no price to bound the
/// maker side against and fails with `VenueOperationFailed`.
pub fn quote_add_liquidity(
    reserve_maker: u64,
    reserve_taker: u64,
    lp_supply: u64,
    maker_desired: u64,
    taker_desired: u64,
) -> Result<LiquidityQuote> {
    // The first depositor would set the price for the whole maker reserve
    if reserve_maker == 0 && reserve_taker == 0 {
        msg!("Pool is empty; refusing to seed it with maker capital");
        return err!(VaultError::VenueOperationFailed);
    }

    if reserve_maker == 0 || reserve_taker == 0 {
        msg!("Pool has a one-sided reserve ({}, {})", reserve_maker, reserve_taker);
        return err!(VaultError::VenueOperationFailed);
    }

    let taker_optimal = proportional(maker_desired, reserve_maker, reserve_taker);
    let (maker_amount, taker_amount) = if taker_optimal <= taker_desired as u128 {
        (maker_desired, taker_optimal as u64)
    } else {
        // taker_desired < maker_desired * rt / rm, so this stays below maker_desired
        let maker_optimal = proportional(taker_desired, reserve_taker, reserve_maker);
        (maker_optimal as u64, taker_desired)
    };

    let liquidity = if lp_supply == 0 {
        first_deposit_liquidity(maker_amount, taker_amount)?
    } else {
        let by_maker = proportional(maker_amount, reserve_maker, lp_supply);
        let by_taker = proportional(taker_amount, reserve_taker, lp_supply);
        u64::try_from(by_maker.min(by_taker)).map_err(|_| error!(VaultError::Overflow))?
    };

    Ok(LiquidityQuote {
        maker_amount,
        taker_amount,
        liquidity,
    })
}

/// Pro-rata share of both reserves for burning `liquidity` out of `lp_supply`,
/// as `(maker, taker)`
pub fn quote_remove_liquidity(
    reserve_maker: u64,
    reserve_taker: u64,
    lp_supply: u64,
    liquidity: u64,
) -> Result<(u64, u64)> {
    require_gte!(lp_supply, liquidity, VaultError::InsufficientBalance);
    if lp_supply == 0 {
        return Ok((0, 0));
    }
    // liquidity <= lp_supply keeps both shares within the reserves
    let maker = proportional(liquidity, lp_supply, reserve_maker) as u64;
    let taker = proportional(liquidity, lp_supply, reserve_taker) as u64;
    Ok((maker, taker))
}

fn proportional(amount: u64, reserve_in: u64, reserve_out: u64) -> u128 {
    // u64 * u64 always fits in u128
    amount as u128 * reserve_out as u128 / reserve_in as u128
}

fn first_deposit_liquidity(amount_a: u64, amount_b: u64) -> Result<u64> {
    let root = integer_sqrt(amount_a as u128 * amount_b as u128);
    let liquidity = root.saturating_sub(MINIMUM_LIQUIDITY);
    u64::try_from(liquidity).map_err(|_| error!(VaultError::Overflow))
}

/// Floor of the square root (Newton iteration)
pub fn integer_sqrt(value: u128) -> u128 {
    if value < 2 {
        return value;
    }
    let mut x = value;
    let mut y = (x + 1) / 2;
    while y < x {
        x = y;
        y = (x + value / x) / 2;
    }
    x
}
