use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::{
    FactoryOwnershipTransferred, ProtocolFeeUpdated, SlippageUpdated, TrancheCreationToggled,
    VaultCreationAccessUpdated,
};
use crate::math::validate_bps;

// ============================================================
// FACTORY OWNER CONTROLS
// ============================================================

/// Factory-level settings. Only callable by the factory owner.
#[derive(Accounts)]
pub struct FactoryAdmin<'info> {
    #[account(
        address = factory_state.owner @ VaultError::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [FACTORY_SEED],
        bump = factory_state.bump
    )]
    pub factory_state: Account<'info, FactoryState>,
}

/// Applies to vaults created afterwards; existing vaults keep their snapshot
pub fn set_protocol_fee_handler(ctx: Context<FactoryAdmin>, new_fee_bps: u16) -> Result<()> {
    validate_bps(new_fee_bps)?;

    let factory = &mut ctx.accounts.factory_state;
    let old_fee_bps = factory.protocol_fee_bps;
    factory.protocol_fee_bps = new_fee_bps;

    emit!(ProtocolFeeUpdated {
        old_fee_bps,
        new_fee_bps,
    });

    Ok(())
}

pub fn set_vault_creation_open_handler(ctx: Context<FactoryAdmin>, open: bool) -> Result<()> {
    ctx.accounts.factory_state.vault_creation_open = open;

    emit!(VaultCreationAccessUpdated {
        vault_creation_open: open,
    });

    Ok(())
}

/// Transfer factory ownership (and with it the protocol fee stream)
#[derive(Accounts)]
pub struct TransferFactoryOwnership<'info> {
    #[account(
        address = factory_state.owner @ VaultError::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// CHECK: New owner address - must not be zero address
    #[account(
        constraint = new_owner.key() != Pubkey::default() @ VaultError::ZeroAddress
    )]
    pub new_owner: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [FACTORY_SEED],
        bump = factory_state.bump
    )]
    pub factory_state: Account<'info, FactoryState>,
}

pub fn transfer_factory_ownership_handler(ctx: Context<TransferFactoryOwnership>) -> Result<()> {
    let factory = &mut ctx.accounts.factory_state;
    let previous_owner = factory.owner;
    factory.owner = ctx.accounts.new_owner.key();

    emit!(FactoryOwnershipTransferred {
        previous_owner,
        new_owner: factory.owner,
    });

    Ok(())
}

// ============================================================
// MAKER CONTROLS
// ============================================================

/// Vault-level settings. Only callable by the vault's maker.
#[derive(Accounts)]
pub struct MakerVaultControl<'info> {
    #[account(
        address = vault.maker @ VaultError::Unauthorized
    )]
    pub maker: Signer<'info>,

    #[account(
        mut,
        seeds = [VAULT_SEED, vault.factory.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,
}

pub fn enable_tranche_creation_handler(ctx: Context<MakerVaultControl>) -> Result<()> {
    set_tranche_creation(ctx, true)
}

pub fn disable_tranche_creation_handler(ctx: Context<MakerVaultControl>) -> Result<()> {
    set_tranche_creation(ctx, false)
}

fn set_tranche_creation(ctx: Context<MakerVaultControl>, enabled: bool) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    ctx.accounts.vault.tranche_creation_enabled = enabled;

    msg!("Tranche creation {} for vault {}", if enabled { "enabled" } else { "disabled" }, vault_key);

    emit!(TrancheCreationToggled {
        vault: vault_key,
        enabled,
    });

    Ok(())
}

/// Only affects settlements performed after the change
pub fn set_slippage_basis_points_handler(
    ctx: Context<MakerVaultControl>,
    new_slippage_bps: u16,
) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();
    let old_slippage_bps = ctx.accounts.vault.set_slippage(new_slippage_bps)?;

    emit!(SlippageUpdated {
        vault: vault_key,
        old_slippage_bps,
        new_slippage_bps,
    });

    Ok(())
}

// ============================================================
// VIEWS
// ============================================================

#[derive(Accounts)]
pub struct VaultView<'info> {
    #[account(
        seeds = [VAULT_SEED, vault.factory.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,
}

pub fn vault_info_handler(ctx: Context<VaultView>, offset: u64) -> Result<VaultInfo> {
    let vault = &ctx.accounts.vault;
    Ok(vault.info(&vault.key(), offset))
}
