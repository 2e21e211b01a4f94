use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::VaultCreated;
use crate::math::validate_bps;
use crate::venue::{self, VenueGauge, VenuePool};

/// Parameters for creating a new vault
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct CreateVaultParams {
    /// Principal who controls the vault capital
    pub maker: Pubkey,

    /// Maker share of post-fee rewards (0-10000)
    pub maker_revenue_bps: u16,

    /// Initial settlement tolerance (0-10000)
    /// Default: DEFAULT_SLIPPAGE_BPS
    pub slippage_bps: Option<u16>,

    /// Seconds from tranche creation to maturity (must be positive)
    /// Default: DEFAULT_MATURITY_DURATION (30 days)
    pub maturity_duration: Option<i64>,

    /// Stable-curve pool (true) or volatile pool (false)
    pub stable: bool,
}

impl CreateVaultParams {
    pub fn slippage_bps(&self) -> u16 {
        self.slippage_bps.unwrap_or(DEFAULT_SLIPPAGE_BPS)
    }

    pub fn maturity_duration(&self) -> i64 {
        self.maturity_duration.unwrap_or(DEFAULT_MATURITY_DURATION)
    }

    pub fn validate(&self, protocol_fee_bps: u16) -> Result<()> {
        require_keys_neq!(self.maker, Pubkey::default(), VaultError::ZeroAddress);
        validate_bps(protocol_fee_bps)?;
        validate_bps(self.maker_revenue_bps)?;
        validate_bps(self.slippage_bps())?;
        require_gt!(self.maturity_duration(), 0, VaultError::InvalidMaturity);
        Ok(())
    }
}

#[derive(Accounts)]
pub struct CreateVault<'info> {
    #[account(mut)]
    pub creator: Signer<'info>,

    #[account(
        mut,
        seeds = [FACTORY_SEED],
        bump = factory_state.bump
    )]
    pub factory_state: Box<Account<'info, FactoryState>>,

    /// Use Box to reduce stack usage - Vault is the largest account
    #[account(
        init,
        payer = creator,
        space = Vault::LEN,
        seeds = [VAULT_SEED, factory_state.key().as_ref(), &factory_state.vault_count.to_le_bytes()],
        bump
    )]
    pub vault: Box<Account<'info, Vault>>,

    #[account(
        mint::token_program = token_program,
        constraint = maker_mint.key() != taker_mint.key() @ VaultError::IdenticalMints
    )]
    pub maker_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(mint::token_program = token_program)]
    pub taker_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Custody of idle maker capital
    #[account(
        init,
        payer = creator,
        seeds = [VAULT_RESERVE_SEED, vault.key().as_ref()],
        bump,
        token::mint = maker_mint,
        token::authority = vault,
        token::token_program = token_program,
    )]
    pub vault_reserve: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Liquidity venue program; pinned to VENUE_PROGRAM_ID outside localnet/devnet
    #[account(executable)]
    pub venue_program: UncheckedAccount<'info>,

    /// CHECK: Venue pool for the pair - PDA and layout verified in handler
    pub pool: UncheckedAccount<'info>,

    /// CHECK: Venue gauge for the pool - PDA and layout verified in handler
    pub gauge: UncheckedAccount<'info>,

    /// Single token program for the whole vault: both mints here, and the LP
    /// mint at tranche creation, must belong to it. Pairs that mix SPL Token
    /// and Token-2022 cannot get a vault.
    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateVault>, params: CreateVaultParams) -> Result<()> {
    let clock = Clock::get()?;
    let factory = &mut ctx.accounts.factory_state;

    factory.ensure_vault_creation_authorized(&ctx.accounts.creator.key())?;
    params.validate(factory.protocol_fee_bps)?;

    let venue_key = ctx.accounts.venue_program.key();
    #[cfg(not(any(feature = "localnet", feature = "devnet")))]
    require_keys_eq!(venue_key, VENUE_PROGRAM_ID, VaultError::VenueOperationFailed);

    let maker_mint = ctx.accounts.maker_mint.key();
    let taker_mint = ctx.accounts.taker_mint.key();

    // Resolve the pool and gauge the same way the venue derives them
    let (expected_pool, _) = venue::derive_pool_pda(&maker_mint, &taker_mint, params.stable, &venue_key);
    require_keys_eq!(ctx.accounts.pool.key(), expected_pool, VaultError::VenueOperationFailed);
    let pool: VenuePool = venue::load_venue_account(&ctx.accounts.pool.to_account_info(), &venue_key)?;
    require!(
        pool.contains_pair(&maker_mint, &taker_mint) && pool.stable == params.stable,
        VaultError::VenueOperationFailed
    );

    let (expected_gauge, _) = venue::derive_gauge_pda(&expected_pool, &venue_key);
    require_keys_eq!(ctx.accounts.gauge.key(), expected_gauge, VaultError::VenueOperationFailed);
    let gauge: VenueGauge = venue::load_venue_account(&ctx.accounts.gauge.to_account_info(), &venue_key)?;
    require_keys_eq!(gauge.pool, expected_pool, VaultError::VenueOperationFailed);
    require_keys_eq!(gauge.lp_mint, pool.lp_mint, VaultError::VenueOperationFailed);
    require_keys_neq!(gauge.reward_mint, Pubkey::default(), VaultError::ZeroAddress);

    let vault_id = factory.next_vault_id()?;
    let protocol_fee_bps = factory.protocol_fee_bps;

    let vault = &mut ctx.accounts.vault;
    vault.factory = factory.key();
    vault.vault_id = vault_id;
    vault.maker = params.maker;
    vault.maker_mint = maker_mint;
    vault.taker_mint = taker_mint;
    vault.protocol_fee_bps = protocol_fee_bps;
    vault.maker_revenue_bps = params.maker_revenue_bps;
    vault.slippage_bps = params.slippage_bps();
    vault.maturity_duration = params.maturity_duration();
    vault.venue_program = venue_key;
    vault.stable = params.stable;
    vault.pool = expected_pool;
    vault.gauge = expected_gauge;
    vault.lp_mint = pool.lp_mint;
    vault.reward_mint = gauge.reward_mint;
    vault.maker_is_pool_a = pool.token_mint_a == maker_mint;
    vault.tranche_creation_enabled = true;
    vault.tranche_count = 0;
    vault.total_deposited = 0;
    vault.total_withdrawn = 0;
    vault.created_at = clock.unix_timestamp;
    vault.bump = ctx.bumps.vault;
    vault.reserve_bump = ctx.bumps.vault_reserve;

    msg!(
        "Vault {} created: maker={}, pool={}, fee={}bps, maker_revenue={}bps",
        vault_id,
        vault.maker,
        vault.pool,
        protocol_fee_bps,
        vault.maker_revenue_bps
    );

    emit!(VaultCreated {
        vault: vault.key(),
        vault_id,
        maker: vault.maker,
        maker_mint,
        taker_mint,
        pool: vault.pool,
        gauge: vault.gauge,
        reward_mint: vault.reward_mint,
        protocol_fee_bps,
        maker_revenue_bps: vault.maker_revenue_bps,
        slippage_bps: vault.slippage_bps,
        maturity_duration: vault.maturity_duration,
    });

    Ok(())
}
