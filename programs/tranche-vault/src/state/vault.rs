use anchor_lang::prelude::*;
use anchor_lang::solana_program::program_option::COption;
use crate::constants::*;
use crate::errors::VaultError;

/// Per-maker treasury: custody of maker capital, the economic parameters
/// every tranche inherits, and the registry of tranches it has spawned.
///
/// Tranches live at `["tranche", vault, index]` for `index` in
/// `0..tranche_count`, so the registry is append-only and duplicate-free
/// by construction.
#[account]
#[derive(Default)]
pub struct Vault {
    /// Factory this vault was created by
    pub factory: Pubkey,

    /// Sequential id within the factory
    pub vault_id: u64,

    /// Sole authority over vault capital and parameters
    pub maker: Pubkey,

    // ============================================================
    // ASSETS
    // ============================================================

    /// Asset supplied by the maker
    pub maker_mint: Pubkey,

    /// Asset supplied by takers
    pub taker_mint: Pubkey,

    // ============================================================
    // ECONOMICS (immutable after creation except slippage)
    // ============================================================

    /// Protocol fee snapshot taken at creation (0-10000)
    pub protocol_fee_bps: u16,

    /// Maker share of post-fee rewards (0-10000)
    pub maker_revenue_bps: u16,

    /// Tolerance applied to venue settlements (0-10000)
    pub slippage_bps: u16,

    /// Seconds from tranche creation to maturity
    pub maturity_duration: i64,

    // ============================================================
    // VENUE
    // ============================================================

    pub venue_program: Pubkey,
    pub stable: bool,
    pub pool: Pubkey,
    pub gauge: Pubkey,
    pub lp_mint: Pubkey,
    pub reward_mint: Pubkey,

    /// Maker mint is the pool's token A (lower mint)
    pub maker_is_pool_a: bool,

    // ============================================================
    // TRANCHES
    // ============================================================

    pub tranche_creation_enabled: bool,

    /// Number of tranches created; also the next tranche index
    pub tranche_count: u64,

    // ============================================================
    // STATISTICS
    // ============================================================

    /// Lifetime maker deposits into the reserve
    pub total_deposited: u64,

    /// Lifetime maker withdrawals from the reserve
    pub total_withdrawn: u64,

    pub created_at: i64,

    /// PDA bump seed
    pub bump: u8,

    /// Reserve token account bump seed
    pub reserve_bump: u8,
}

impl Vault {
    pub const LEN: usize = 8  // discriminator
        + 32  // factory
        + 8   // vault_id
        + 32  // maker
        + 32  // maker_mint
        + 32  // taker_mint
        + 2   // protocol_fee_bps
        + 2   // maker_revenue_bps
        + 2   // slippage_bps
        + 8   // maturity_duration
        + 32  // venue_program
        + 1   // stable
        + 32  // pool
        + 32  // gauge
        + 32  // lp_mint
        + 32  // reward_mint
        + 1   // maker_is_pool_a
        + 1   // tranche_creation_enabled
        + 8   // tranche_count
        + 8   // total_deposited
        + 8   // total_withdrawn
        + 8   // created_at
        + 1   // bump
        + 1   // reserve_bump
        + 64; // padding for future expansion

    pub fn ensure_tranche_creation_enabled(&self) -> Result<()> {
        require!(self.tranche_creation_enabled, VaultError::TrancheCreationDisabled);
        Ok(())
    }

    /// Replace the slippage tolerance, returning the previous value
    pub fn set_slippage(&mut self, slippage_bps: u16) -> Result<u16> {
        crate::math::validate_bps(slippage_bps)?;
        let old = self.slippage_bps;
        self.slippage_bps = slippage_bps;
        Ok(old)
    }

    /// Maturity for a tranche created at `now`
    pub fn maturity_from(&self, now: i64) -> Result<i64> {
        let maturity = now
            .checked_add(self.maturity_duration)
            .ok_or(VaultError::Overflow)?;
        require_gt!(maturity, now, VaultError::InvalidMaturity);
        Ok(maturity)
    }

    /// Claim the next registry slot
    pub fn register_tranche(&mut self) -> Result<u64> {
        let index = self.tranche_count;
        self.tranche_count = index.checked_add(1).ok_or(VaultError::Overflow)?;
        Ok(index)
    }

    pub fn tranche_address(vault: &Pubkey, index: u64) -> Pubkey {
        Pubkey::find_program_address(
            &[TRANCHE_SEED, vault.as_ref(), &index.to_le_bytes()],
            &crate::ID,
        )
        .0
    }

    /// Every tranche this vault has created, in creation order
    pub fn tranche_addresses(&self, vault: &Pubkey) -> Vec<Pubkey> {
        (0..self.tranche_count)
            .map(|index| Self::tranche_address(vault, index))
            .collect()
    }

    /// `(maker, taker)` pair reordered as `(token A, token B)`
    pub fn to_pool_order<T>(&self, maker: T, taker: T) -> (T, T) {
        if self.maker_is_pool_a {
            (maker, taker)
        } else {
            (taker, maker)
        }
    }

    /// `(token A, token B)` pair reordered as `(maker, taker)`
    pub fn from_pool_order<T>(&self, a: T, b: T) -> (T, T) {
        self.to_pool_order(a, b)
    }

    /// Amount `spender` may still pull from a token account under SPL delegation
    pub fn allowance_of(delegate: COption<Pubkey>, delegated_amount: u64, spender: &Pubkey) -> u64 {
        match delegate {
            COption::Some(key) if key == *spender => delegated_amount,
            _ => 0,
        }
    }

    /// View of the vault with one page of the registry starting at `offset`
    pub fn info(&self, vault: &Pubkey, offset: u64) -> VaultInfo {
        let end = offset.saturating_add(TRANCHE_PAGE_SIZE).min(self.tranche_count);
        let tranches = (offset.min(end)..end)
            .map(|index| Self::tranche_address(vault, index))
            .collect();

        VaultInfo {
            maker: self.maker,
            maker_mint: self.maker_mint,
            taker_mint: self.taker_mint,
            pool: self.pool,
            gauge: self.gauge,
            lp_mint: self.lp_mint,
            reward_mint: self.reward_mint,
            protocol_fee_bps: self.protocol_fee_bps,
            maker_revenue_bps: self.maker_revenue_bps,
            slippage_bps: self.slippage_bps,
            maturity_duration: self.maturity_duration,
            tranche_creation_enabled: self.tranche_creation_enabled,
            tranche_count: self.tranche_count,
            tranches,
        }
    }
}

/// Read-only view of a vault returned by `vault_info`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct VaultInfo {
    pub maker: Pubkey,
    pub maker_mint: Pubkey,
    pub taker_mint: Pubkey,
    pub pool: Pubkey,
    pub gauge: Pubkey,
    pub lp_mint: Pubkey,
    pub reward_mint: Pubkey,
    pub protocol_fee_bps: u16,
    pub maker_revenue_bps: u16,
    pub slippage_bps: u16,
    pub maturity_duration: i64,
    pub tranche_creation_enabled: bool,
    pub tranche_count: u64,
    /// Registry page, in creation order
    pub tranches: Vec<Pubkey>,
}
