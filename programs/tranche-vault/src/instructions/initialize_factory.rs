use anchor_lang::prelude::*;
use crate::state::FactoryState;
use crate::constants::*;
use crate::events::FactoryInitialized;
use crate::math::validate_bps;

#[derive(Accounts)]
pub struct InitializeFactory<'info> {
    #[account(mut)]
    pub owner: Signer<'info>,

    #[account(
        init,
        payer = owner,
        space = FactoryState::LEN,
        seeds = [FACTORY_SEED],
        bump
    )]
    pub factory_state: Account<'info, FactoryState>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitializeFactory>,
    protocol_fee_bps: Option<u16>,
    vault_creation_open: bool,
) -> Result<()> {
    let protocol_fee_bps = protocol_fee_bps.unwrap_or(DEFAULT_PROTOCOL_FEE_BPS);
    validate_bps(protocol_fee_bps)?;

    let factory = &mut ctx.accounts.factory_state;
    factory.owner = ctx.accounts.owner.key();
    factory.protocol_fee_bps = protocol_fee_bps;
    factory.vault_creation_open = vault_creation_open;
    factory.vault_count = 0;
    factory.bump = ctx.bumps.factory_state;

    msg!(
        "Factory initialized: owner={}, fee={}bps, open={}",
        factory.owner,
        protocol_fee_bps,
        vault_creation_open
    );

    emit!(FactoryInitialized {
        owner: factory.owner,
        protocol_fee_bps,
        vault_creation_open,
    });

    Ok(())
}
