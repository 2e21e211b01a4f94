use anchor_lang::prelude::*;
use anchor_spl::token_interface::{self, Mint, TokenAccount, TokenInterface, TransferChecked};
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::MakerWithdrew;

/// Return idle maker capital from the vault reserve to the maker.
/// Capital committed to tranches is not in the reserve and cannot be pulled here.
#[derive(Accounts)]
pub struct MakerWithdrawTokens<'info> {
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

    #[account(
        mut,
        seeds = [VAULT_RESERVE_SEED, vault.key().as_ref()],
        bump = vault.reserve_bump
    )]
    pub vault_reserve: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = maker_mint,
        token::authority = maker,
        token::token_program = token_program,
    )]
    pub maker_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        address = vault.maker_mint @ VaultError::InvalidMint
    )]
    pub maker_mint: Box<InterfaceAccount<'info, Mint>>,

    pub token_program: Interface<'info, TokenInterface>,
}

pub fn handler(ctx: Context<MakerWithdrawTokens>, amount: u64) -> Result<()> {
    let vault_key = ctx.accounts.vault.key();

    require_gt!(amount, 0, VaultError::InsufficientAmount);
    require_gte!(ctx.accounts.vault_reserve.amount, amount, VaultError::InsufficientBalance);

    let vault = &ctx.accounts.vault;
    let factory_key = vault.factory;
    let vault_id_bytes = vault.vault_id.to_le_bytes();
    let signer_seeds: &[&[&[u8]]] = &[&[
        VAULT_SEED,
        factory_key.as_ref(),
        &vault_id_bytes,
        &[vault.bump],
    ]];

    token_interface::transfer_checked(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferChecked {
                from: ctx.accounts.vault_reserve.to_account_info(),
                mint: ctx.accounts.maker_mint.to_account_info(),
                to: ctx.accounts.maker_token_account.to_account_info(),
                authority: ctx.accounts.vault.to_account_info(),
            },
            signer_seeds,
        ),
        amount,
        ctx.accounts.maker_mint.decimals,
    )?;

    ctx.accounts.vault_reserve.reload()?;
    let reserve_balance = ctx.accounts.vault_reserve.amount;

    let vault = &mut ctx.accounts.vault;
    vault.total_withdrawn = vault
        .total_withdrawn
        .checked_add(amount)
        .ok_or(VaultError::Overflow)?;

    msg!("Maker withdrew {} from vault {}, reserve now {}", amount, vault_key, reserve_balance);

    emit!(MakerWithdrew {
        vault: vault_key,
        maker: vault.maker,
        amount,
        reserve_balance,
    });

    Ok(())
}
