use anchor_lang::prelude::*;

// ============================================================
// FACTORY EVENTS
// ============================================================

#[event]
pub struct FactoryInitialized {
    pub owner: Pubkey,
    pub protocol_fee_bps: u16,
    pub vault_creation_open: bool,
}

#[event]
pub struct ProtocolFeeUpdated {
    pub old_fee_bps: u16,
    pub new_fee_bps: u16,
}

#[event]
pub struct VaultCreationAccessUpdated {
    pub vault_creation_open: bool,
}

#[event]
pub struct FactoryOwnershipTransferred {
    pub previous_owner: Pubkey,
    pub new_owner: Pubkey,
}

// ============================================================
// VAULT EVENTS
// ============================================================

#[event]
pub struct VaultCreated {
    pub vault: Pubkey,
    pub vault_id: u64,
    pub maker: Pubkey,
    pub maker_mint: Pubkey,
    pub taker_mint: Pubkey,
    pub pool: Pubkey,
    pub gauge: Pubkey,
    pub reward_mint: Pubkey,
    pub protocol_fee_bps: u16,
    pub maker_revenue_bps: u16,
    pub slippage_bps: u16,
    pub maturity_duration: i64,
}

#[event]
pub struct MakerDeposited {
    pub vault: Pubkey,
    pub maker: Pubkey,
    pub amount: u64,
    pub reserve_balance: u64,
}

#[event]
pub struct MakerWithdrew {
    pub vault: Pubkey,
    pub maker: Pubkey,
    pub amount: u64,
    pub reserve_balance: u64,
}

#[event]
pub struct TrancheCreationToggled {
    pub vault: Pubkey,
    pub enabled: bool,
}

#[event]
pub struct SlippageUpdated {
    pub vault: Pubkey,
    pub old_slippage_bps: u16,
    pub new_slippage_bps: u16,
}

// ============================================================
// TRANCHE EVENTS
// ============================================================

#[event]
pub struct TrancheCreated {
    pub vault: Pubkey,
    pub tranche: Pubkey,
    pub index: u64,
    pub taker: Pubkey,
    pub maturity_timestamp: i64,
    pub maker_deposit: u64,
    pub taker_deposit: u64,
    pub liquidity_minted: u64,
}

#[event]
pub struct TrancheWithdrawn {
    pub vault: Pubkey,
    pub tranche: Pubkey,
    pub caller: Pubkey,
    pub liquidity_removed: u64,
    pub maker_withdrawal: u64,
    pub taker_withdrawal: u64,
    pub via_bypass: bool,
    pub settled_at: i64,
}

#[event]
pub struct RewardsWithdrawn {
    pub vault: Pubkey,
    pub tranche: Pubkey,
    pub caller: Pubkey,
    pub harvested: u64,
    pub maker_rewards: u64,
    pub taker_rewards: u64,
    pub fees: u64,
    pub fee_recipient: Pubkey,
}

#[event]
pub struct EmergencyBypassSet {
    pub vault: Pubkey,
    pub tranche: Pubkey,
    pub principal: Pubkey,
    pub is_maker: bool,
    pub maker_bypass: bool,
    pub taker_bypass: bool,
}
