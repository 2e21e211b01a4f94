use anchor_lang::prelude::*;

// ============================================================
// TIME CONSTANTS (in seconds)
// ============================================================

/// 1 day in seconds
pub const ONE_DAY: i64 = 24 * 60 * 60;

/// 30 days in seconds
pub const THIRTY_DAYS: i64 = 30 * ONE_DAY;

/// Tranche lifetime when `create_vault` is not given one
pub const DEFAULT_MATURITY_DURATION: i64 = THIRTY_DAYS;

// ============================================================
// BASIS POINTS
// ============================================================

/// 100% in basis points (denominator for BPS calculations)
pub const BPS_DENOMINATOR: u16 = 10000;

/// Settlement tolerance when `create_vault` is not given one (0.5% = 50 bps)
pub const DEFAULT_SLIPPAGE_BPS: u16 = 50;

/// Protocol fee on harvested rewards when the factory is initialized without one (10%)
pub const DEFAULT_PROTOCOL_FEE_BPS: u16 = 1000;

// ============================================================
// VENUE CONSTANTS
// ============================================================

/// Liquidity permanently locked by the venue on the first deposit into a pool
pub const MINIMUM_LIQUIDITY: u128 = 1000;

// ============================================================
// VIEW LIMITS
// ============================================================

/// Tranche addresses returned per `vault_info` call (return data is capped at 1024 bytes)
pub const TRANCHE_PAGE_SIZE: u64 = 16;

// ============================================================
// PDA SEEDS
// ============================================================

pub const FACTORY_SEED: &[u8] = b"factory";
pub const VAULT_SEED: &[u8] = b"vault";
pub const VAULT_RESERVE_SEED: &[u8] = b"vault_reserve";
pub const TRANCHE_SEED: &[u8] = b"tranche";
pub const TRANCHE_MAKER_SEED: &[u8] = b"tranche_maker";
pub const TRANCHE_TAKER_SEED: &[u8] = b"tranche_taker";
pub const TRANCHE_LP_SEED: &[u8] = b"tranche_lp";
pub const TRANCHE_REWARD_SEED: &[u8] = b"tranche_reward";

// ============================================================
// EXTERNAL PROGRAM IDS
// ============================================================

/// Audited liquidity venue (router + gauge) deployment
pub const VENUE_PROGRAM_ID: Pubkey = venue_program::ID;

pub mod venue_program {
    use anchor_lang::prelude::*;
    declare_id!("GVMbSkMVztfpqB2k6GJGozcrpYGW5LP3i8P22uXxP3PP");
}
