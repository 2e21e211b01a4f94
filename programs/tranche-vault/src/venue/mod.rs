//! Liquidity venue (router + gauge) integration module
//!
//! The venue is an external program that custodies pooled assets, mints LP
//! tokens, and pays staking rewards through per-pool gauges. This program
//! only ever talks to it through the narrow surface defined here.
//!
//! ## Key Components
//!
//! - **accounts**: Layouts of the venue accounts we read (pool, gauge, stake)
//!   and the PDA rules that resolve them
//! - **instructions**: Instruction data and account ordering for venue CPIs
//! - **cpi**: CPI helpers that report the amounts actually settled
//!
//! ## Supported Operations
//!
//! | Operation | Venue instruction |
//! |-----------|-------------------|
//! | add liquidity | `add_liquidity` |
//! | remove liquidity | `remove_liquidity` |
//! | stake LP | `gauge_deposit` |
//! | unstake LP | `gauge_withdraw` |
//! | harvest rewards | `get_reward` |
//!
//! Quotes are computed locally from the pool reserves (see `crate::math`);
//! every amount the vault acts on afterwards is measured from token balance
//! deltas around the CPI, never taken from the quote.

pub mod accounts;
pub mod instructions;
pub mod cpi;

pub use accounts::*;
pub use instructions::*;
pub use cpi::*;

/// Venue PDA seeds
pub mod seeds {
    pub const POOL_SEED: &[u8] = b"pool";
    pub const GAUGE_SEED: &[u8] = b"gauge";
    pub const STAKE_SEED: &[u8] = b"stake";
}
