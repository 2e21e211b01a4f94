use anchor_lang::prelude::*;
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::EmergencyBypassSet;
use super::withdraw_tokens::WithdrawTokens;

// ============================================================
// EMERGENCY LIQUIDATION
// ============================================================

/// Record the caller's consent to an early unwind and, once both principals
/// have consented, unwind immediately. Reuses the `WithdrawTokens` accounts.
pub fn emergency_liquidation_handler(ctx: Context<WithdrawTokens>) -> Result<TrancheWithdrawal> {
    let now = Clock::get()?.unix_timestamp;
    let accounts = ctx.accounts;
    let caller = accounts.caller.key();
    let maker = accounts.vault.maker;
    let vault_key = accounts.vault.key();

    let investor = accounts.tranche.investor(&caller, &maker)?;
    if accounts.tranche.record_bypass(investor) {
        emit_bypass(vault_key, &accounts.tranche, caller, investor.is_maker);
    }

    if !accounts.tranche.mutual_bypass() {
        msg!(
            "Bypass recorded for {}; waiting on counterparty (maker={}, taker={})",
            caller,
            accounts.tranche.maker_bypass,
            accounts.tranche.taker_bypass
        );
        return Ok(TrancheWithdrawal::default());
    }

    accounts.unwind(now, true)
}

// ============================================================
// SINGLE-PRINCIPAL BYPASS
// ============================================================

/// Set one principal's bypass flag without attempting an unwind
#[derive(Accounts)]
pub struct SetEmergencyBypass<'info> {
    pub principal: Signer<'info>,

    #[account(
        seeds = [VAULT_SEED, vault.factory.as_ref(), &vault.vault_id.to_le_bytes()],
        bump = vault.bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mut,
        has_one = vault @ VaultError::InvalidAccountData,
        seeds = [TRANCHE_SEED, vault.key().as_ref(), &tranche.index.to_le_bytes()],
        bump = tranche.bump
    )]
    pub tranche: Box<Account<'info, Tranche>>,
}

pub fn maker_set_emergency_bypass_handler(ctx: Context<SetEmergencyBypass>) -> Result<()> {
    let principal = ctx.accounts.principal.key();
    require_keys_eq!(principal, ctx.accounts.vault.maker, VaultError::Unauthorized);
    set_bypass(ctx, Investor::MAKER)
}

pub fn taker_set_emergency_bypass_handler(ctx: Context<SetEmergencyBypass>) -> Result<()> {
    let principal = ctx.accounts.principal.key();
    require_keys_eq!(principal, ctx.accounts.tranche.taker, VaultError::Unauthorized);
    set_bypass(ctx, Investor::TAKER)
}

fn set_bypass(ctx: Context<SetEmergencyBypass>, investor: Investor) -> Result<()> {
    let principal = ctx.accounts.principal.key();
    let vault_key = ctx.accounts.vault.key();
    let tranche = &mut ctx.accounts.tranche;

    if tranche.record_bypass(investor) {
        emit_bypass(vault_key, tranche, principal, investor.is_maker);
    }
    Ok(())
}

fn emit_bypass(vault: Pubkey, tranche: &Account<Tranche>, principal: Pubkey, is_maker: bool) {
    emit!(EmergencyBypassSet {
        vault,
        tranche: tranche.key(),
        principal,
        is_maker,
        maker_bypass: tranche.maker_bypass,
        taker_bypass: tranche.taker_bypass,
    });
}
