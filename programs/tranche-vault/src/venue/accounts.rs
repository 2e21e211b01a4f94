//! Venue Account Structures
//!
//! These structures deserialize account data owned by the venue program.
//! Every account starts with an 8-byte discriminator,
//! `sha256("account:<Name>")[..8]`, followed by the Borsh-encoded fields.
//!
//! | Account | Size (bytes) |
//! |---------|--------------|
//! | Pool | 186 |
//! | Gauge | 177 |
//! | Stake | 81 |

use anchor_lang::prelude::*;
use crate::errors::VaultError;
use super::seeds;

/// Discriminator length for venue accounts
pub const VENUE_ACCOUNT_DISCRIMINATOR_LEN: usize = 8;

// ============================================================
// POOL
// ============================================================

/// A two-asset pool. Mints are stored in canonical (sorted) order.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VenuePool {
    /// Lower of the two mints
    pub token_mint_a: Pubkey,
    /// Higher of the two mints
    pub token_mint_b: Pubkey,
    /// Stable-curve pool (true) or volatile x*y=k pool (false)
    pub stable: bool,
    /// LP token mint
    pub lp_mint: Pubkey,
    /// Pool custody for token A
    pub token_vault_a: Pubkey,
    /// Pool custody for token B
    pub token_vault_b: Pubkey,
    /// Reserve of token A
    pub reserve_a: u64,
    /// Reserve of token B
    pub reserve_b: u64,
    /// PDA bump
    pub bump: u8,
}

impl VenuePool {
    pub const LEN: usize = 8 + 32 + 32 + 1 + 32 + 32 + 32 + 8 + 8 + 1;

    pub fn contains_pair(&self, mint_x: &Pubkey, mint_y: &Pubkey) -> bool {
        (self.token_mint_a == *mint_x && self.token_mint_b == *mint_y)
            || (self.token_mint_a == *mint_y && self.token_mint_b == *mint_x)
    }

    /// Reserves as `(maker side, taker side)`
    pub fn reserves_for(&self, maker_mint: &Pubkey) -> Result<(u64, u64)> {
        if self.token_mint_a == *maker_mint {
            Ok((self.reserve_a, self.reserve_b))
        } else if self.token_mint_b == *maker_mint {
            Ok((self.reserve_b, self.reserve_a))
        } else {
            err!(VaultError::InvalidMint)
        }
    }
}

// ============================================================
// GAUGE
// ============================================================

/// Staking gauge attached to one pool
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VenueGauge {
    /// Pool whose LP token is staked here
    pub pool: Pubkey,
    /// Staking token (the pool's LP mint)
    pub lp_mint: Pubkey,
    /// Reward token paid to stakers
    pub reward_mint: Pubkey,
    /// Gauge custody of staked LP
    pub lp_vault: Pubkey,
    /// Gauge custody of undistributed rewards
    pub reward_vault: Pubkey,
    /// Total LP staked across all owners
    pub total_staked: u64,
    /// PDA bump
    pub bump: u8,
}

impl VenueGauge {
    pub const LEN: usize = 8 + 32 * 5 + 8 + 1;
}

// ============================================================
// STAKE
// ============================================================

/// One owner's staked position at a gauge
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct VenueStake {
    pub gauge: Pubkey,
    pub owner: Pubkey,
    /// LP currently staked
    pub amount: u64,
    /// PDA bump
    pub bump: u8,
}

impl VenueStake {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 1;
}

// ============================================================
// DESERIALIZATION HELPERS
// ============================================================

/// Trait for deserializing venue accounts from raw data
pub trait VenueAccountDeserialize: Sized {
    /// Deserialize from account data (discriminator included)
    fn try_deserialize(data: &[u8]) -> Result<Self>;

    /// Get the expected account discriminator
    fn discriminator() -> [u8; 8];
}

fn deserialize_checked<T: AnchorDeserialize>(data: &[u8], discriminator: [u8; 8]) -> Result<T> {
    if data.len() < VENUE_ACCOUNT_DISCRIMINATOR_LEN {
        return Err(error!(VaultError::InvalidAccountData));
    }
    if data[..VENUE_ACCOUNT_DISCRIMINATOR_LEN] != discriminator {
        return Err(error!(VaultError::InvalidAccountData));
    }
    let mut body = &data[VENUE_ACCOUNT_DISCRIMINATOR_LEN..];
    T::deserialize(&mut body).map_err(|_| error!(VaultError::InvalidAccountData))
}

impl VenueAccountDeserialize for VenuePool {
    fn try_deserialize(data: &[u8]) -> Result<Self> {
        deserialize_checked(data, Self::discriminator())
    }

    fn discriminator() -> [u8; 8] {
        // sha256("account:Pool")
        [241, 154, 109, 4, 17, 177, 109, 188]
    }
}

impl VenueAccountDeserialize for VenueGauge {
    fn try_deserialize(data: &[u8]) -> Result<Self> {
        deserialize_checked(data, Self::discriminator())
    }

    fn discriminator() -> [u8; 8] {
        // sha256("account:Gauge")
        [9, 19, 249, 189, 158, 171, 226, 205]
    }
}

impl VenueAccountDeserialize for VenueStake {
    fn try_deserialize(data: &[u8]) -> Result<Self> {
        deserialize_checked(data, Self::discriminator())
    }

    fn discriminator() -> [u8; 8] {
        // sha256("account:Stake")
        [150, 197, 176, 29, 55, 132, 112, 149]
    }
}

/// Load a venue-owned account, rejecting anything the venue does not own
pub fn load_venue_account<T: VenueAccountDeserialize>(
    info: &AccountInfo,
    venue_program: &Pubkey,
) -> Result<T> {
    if info.owner != venue_program || info.data_is_empty() {
        msg!("Account {} is not a live venue account", info.key());
        return err!(VaultError::VenueOperationFailed);
    }
    let data = info.try_borrow_data()?;
    T::try_deserialize(&data)
}

// ============================================================
// PDA DERIVATION
// ============================================================

/// Sort two mints into canonical order (lower pubkey first)
/// Returns (mint_a, mint_b, is_swapped) where is_swapped indicates
/// the arguments arrived in descending order
pub fn sort_mints(mint_x: &Pubkey, mint_y: &Pubkey) -> (Pubkey, Pubkey, bool) {
    if mint_x.to_bytes() < mint_y.to_bytes() {
        (*mint_x, *mint_y, false)
    } else {
        (*mint_y, *mint_x, true)
    }
}

/// Resolve the pool PDA for a mint pair and curve type
pub fn derive_pool_pda(
    mint_x: &Pubkey,
    mint_y: &Pubkey,
    stable: bool,
    venue_program: &Pubkey,
) -> (Pubkey, u8) {
    let (mint_a, mint_b, _) = sort_mints(mint_x, mint_y);
    Pubkey::find_program_address(
        &[
            seeds::POOL_SEED,
            mint_a.as_ref(),
            mint_b.as_ref(),
            &[stable as u8],
        ],
        venue_program,
    )
}

/// Resolve the gauge PDA for a pool
pub fn derive_gauge_pda(pool: &Pubkey, venue_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[seeds::GAUGE_SEED, pool.as_ref()], venue_program)
}

/// Resolve an owner's stake PDA at a gauge
pub fn derive_stake_pda(gauge: &Pubkey, owner: &Pubkey, venue_program: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[seeds::STAKE_SEED, gauge.as_ref(), owner.as_ref()],
        venue_program,
    )
}
