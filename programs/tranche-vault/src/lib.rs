use anchor_lang::prelude::*;

pub mod constants;
pub mod errors;
pub mod events;
pub mod instructions;
pub mod math;
pub mod state;
pub mod venue;

use instructions::*;
use math::RewardSplit;
use state::{TrancheDeposit, TrancheWithdrawal, VaultInfo};

declare_id!("BWSLsvW7XhFQFn3E1NN8sxtVaPkHy9okpRhajqwTMH3m");

#[program]
pub mod tranche_vault {
    use super::*;

    // ============ Factory ============

    /// Initialize the factory (one-time setup)
    pub fn initialize_factory(
        ctx: Context<InitializeFactory>,
        protocol_fee_bps: Option<u16>,
        vault_creation_open: bool,
    ) -> Result<()> {
        instructions::initialize_factory::handler(ctx, protocol_fee_bps, vault_creation_open)
    }

    /// Update the protocol fee for vaults created from now on
    pub fn set_protocol_fee(ctx: Context<FactoryAdmin>, new_fee_bps: u16) -> Result<()> {
        instructions::admin::set_protocol_fee_handler(ctx, new_fee_bps)
    }

    pub fn set_vault_creation_open(ctx: Context<FactoryAdmin>, open: bool) -> Result<()> {
        instructions::admin::set_vault_creation_open_handler(ctx, open)
    }

    pub fn transfer_factory_ownership(ctx: Context<TransferFactoryOwnership>) -> Result<()> {
        instructions::admin::transfer_factory_ownership_handler(ctx)
    }

    /// Create a vault bound to a venue pool and gauge
    pub fn create_vault(ctx: Context<CreateVault>, params: CreateVaultParams) -> Result<()> {
        instructions::create_vault::handler(ctx, params)
    }

    // ============ Maker Capital ============

    /// Pull delegated maker capital into the vault reserve
    pub fn deposit_tokens(ctx: Context<DepositTokens>, amount: u64) -> Result<()> {
        instructions::deposit::handler(ctx, amount)
    }

    /// Return idle capital from the vault reserve to the maker
    pub fn maker_withdraw_tokens_from_vault(
        ctx: Context<MakerWithdrawTokens>,
        amount: u64,
    ) -> Result<()> {
        instructions::withdraw::handler(ctx, amount)
    }

    // ============ Maker Settings ============

    pub fn enable_tranche_creation(ctx: Context<MakerVaultControl>) -> Result<()> {
        instructions::admin::enable_tranche_creation_handler(ctx)
    }

    pub fn disable_tranche_creation(ctx: Context<MakerVaultControl>) -> Result<()> {
        instructions::admin::disable_tranche_creation_handler(ctx)
    }

    pub fn set_slippage_basis_points(
        ctx: Context<MakerVaultControl>,
        new_slippage_bps: u16,
    ) -> Result<()> {
        instructions::admin::set_slippage_basis_points_handler(ctx, new_slippage_bps)
    }

    /// Vault parameters plus one page of the tranche registry
    pub fn vault_info(ctx: Context<VaultView>, offset: u64) -> Result<VaultInfo> {
        instructions::admin::vault_info_handler(ctx, offset)
    }

    // ============ Tranche Lifecycle ============

    /// Match a taker deposit with maker capital and stake the resulting LP
    pub fn create_tranche(ctx: Context<CreateTranche>, taker_amount: u64) -> Result<TrancheDeposit> {
        instructions::create_tranche::handler(ctx, taker_amount)
    }

    /// Unwind a matured (or mutually bypassed) tranche
    pub fn withdraw_tokens(ctx: Context<WithdrawTokens>) -> Result<TrancheWithdrawal> {
        instructions::withdraw_tokens::handler(ctx)
    }

    /// Harvest and split gauge rewards
    pub fn withdraw_rewards(ctx: Context<WithdrawRewards>) -> Result<RewardSplit> {
        instructions::withdraw_rewards::handler(ctx)
    }

    // ============ Emergency ============

    /// Set the caller's bypass and unwind once both principals agree
    pub fn emergency_liquidation(ctx: Context<WithdrawTokens>) -> Result<TrancheWithdrawal> {
        instructions::emergency::emergency_liquidation_handler(ctx)
    }

    pub fn maker_set_emergency_bypass(ctx: Context<SetEmergencyBypass>) -> Result<()> {
        instructions::emergency::maker_set_emergency_bypass_handler(ctx)
    }

    pub fn taker_set_emergency_bypass(ctx: Context<SetEmergencyBypass>) -> Result<()> {
        instructions::emergency::taker_set_emergency_bypass_handler(ctx)
    }
}
