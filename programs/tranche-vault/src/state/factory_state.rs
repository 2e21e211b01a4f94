use anchor_lang::prelude::*;
use crate::errors::VaultError;

/// Factory-level configuration
/// Single PDA holding the protocol fee policy and vault creation access
#[account]
#[derive(Default)]
pub struct FactoryState {
    /// Factory owner - updates fees, gates vault creation, receives protocol fees
    pub owner: Pubkey,

    /// Protocol fee on harvested rewards (0-10000 bps)
    /// Snapshotted into each vault at creation
    pub protocol_fee_bps: u16,

    /// When false only the owner may create vaults
    pub vault_creation_open: bool,

    // ============================================================
    // STATISTICS
    // ============================================================

    /// Vaults created so far; also the next vault id
    pub vault_count: u64,

    /// PDA bump seed
    pub bump: u8,
}

impl FactoryState {
    pub const LEN: usize = 8  // discriminator
        + 32  // owner
        + 2   // protocol_fee_bps
        + 1   // vault_creation_open
        + 8   // vault_count
        + 1   // bump
        + 64; // padding for future expansion

    pub fn authorize_vault_creation(&self, caller: &Pubkey) -> bool {
        self.vault_creation_open || *caller == self.owner
    }

    /// Fails with `Unauthorized`, logging caller and owner, when creation is gated
    pub fn ensure_vault_creation_authorized(&self, caller: &Pubkey) -> Result<()> {
        if !self.authorize_vault_creation(caller) {
            require_keys_eq!(*caller, self.owner, VaultError::Unauthorized);
        }
        Ok(())
    }

    pub fn next_vault_id(&mut self) -> Result<u64> {
        let id = self.vault_count;
        self.vault_count = id.checked_add(1).ok_or(VaultError::Overflow)?;
        Ok(id)
    }
}
