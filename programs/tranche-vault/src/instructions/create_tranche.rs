use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use crate::state::*;
use crate::constants::*;
use crate::errors::VaultError;
use crate::events::TrancheCreated;
use crate::math::{quote_add_liquidity, slippage_floor, LiquidityQuote};
use crate::venue::{self, AddLiquidityArgs, GaugeStakeAccounts, LiquidityAccounts, VenuePool};
use super::custody::transfer_signed;

/// Match a taker deposit against the vault's idle maker capital, provide the
/// pair to the venue and stake the LP, all inside one new tranche.
#[derive(Accounts)]
pub struct CreateTranche<'info> {
    #[account(mut)]
    pub taker: Signer<'info>,

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

    /// Taker's source account; must delegate `taker_amount` to the vault PDA
    #[account(
        mut,
        token::mint = taker_mint,
        token::authority = taker,
        token::token_program = token_program,
    )]
    pub taker_token_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(address = vault.maker_mint @ VaultError::InvalidMint)]
    pub maker_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(address = vault.taker_mint @ VaultError::InvalidMint)]
    pub taker_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        address = vault.lp_mint @ VaultError::InvalidMint,
        mint::token_program = token_program,
    )]
    pub lp_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        init,
        payer = taker,
        space = Tranche::LEN,
        seeds = [TRANCHE_SEED, vault.key().as_ref(), &vault.tranche_count.to_le_bytes()],
        bump
    )]
    pub tranche: Box<Account<'info, Tranche>>,

    #[account(
        init,
        payer = taker,
        seeds = [TRANCHE_MAKER_SEED, tranche.key().as_ref()],
        bump,
        token::mint = maker_mint,
        token::authority = tranche,
        token::token_program = token_program,
    )]
    pub tranche_maker_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = taker,
        seeds = [TRANCHE_TAKER_SEED, tranche.key().as_ref()],
        bump,
        token::mint = taker_mint,
        token::authority = tranche,
        token::token_program = token_program,
    )]
    pub tranche_taker_account: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        init,
        payer = taker,
        seeds = [TRANCHE_LP_SEED, tranche.key().as_ref()],
        bump,
        token::mint = lp_mint,
        token::authority = tranche,
        token::token_program = token_program,
    )]
    pub tranche_lp_account: Box<InterfaceAccount<'info, TokenAccount>>,

    /// CHECK: Venue program recorded at vault creation
    #[account(address = vault.venue_program @ VaultError::VenueOperationFailed)]
    pub venue_program: UncheckedAccount<'info>,

    /// CHECK: Venue pool recorded at vault creation
    #[account(mut, address = vault.pool @ VaultError::VenueOperationFailed)]
    pub pool: UncheckedAccount<'info>,

    /// CHECK: Pool custody of token A - matched against the pool state
    #[account(mut)]
    pub pool_vault_a: UncheckedAccount<'info>,

    /// CHECK: Pool custody of token B - matched against the pool state
    #[account(mut)]
    pub pool_vault_b: UncheckedAccount<'info>,

    /// CHECK: Venue gauge recorded at vault creation
    #[account(mut, address = vault.gauge @ VaultError::VenueOperationFailed)]
    pub gauge: UncheckedAccount<'info>,

    /// CHECK: Tranche stake PDA at the gauge - created by the venue on first deposit
    #[account(mut)]
    pub gauge_stake: UncheckedAccount<'info>,

    /// CHECK: Gauge LP custody - validated by the venue
    #[account(mut)]
    pub gauge_lp_vault: UncheckedAccount<'info>,

    pub token_program: Interface<'info, TokenInterface>,
    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateTranche>, taker_amount: u64) -> Result<TrancheDeposit> {
    let now = Clock::get()?.unix_timestamp;
    let tranche_bump = ctx.bumps.tranche;
    let accounts = ctx.accounts;

    let vault_key = accounts.vault.key();
    let tranche_key = accounts.tranche.key();
    let taker_key = accounts.taker.key();

    accounts.vault.ensure_tranche_creation_enabled()?;
    require_gt!(taker_amount, 0, VaultError::InsufficientAmount);
    let allowance = Vault::allowance_of(
        accounts.taker_token_account.delegate,
        accounts.taker_token_account.delegated_amount,
        &vault_key,
    );
    require_gte!(allowance, taker_amount, VaultError::InsufficientAmount);
    let reserve_balance = accounts.vault_reserve.amount;
    require_gt!(reserve_balance, 0, VaultError::InsufficientBalance);

    // Tranche exists and is registered before the venue is touched
    let maturity = accounts.vault.maturity_from(now)?;
    let index = accounts.vault.register_tranche()?;
    accounts
        .tranche
        .initialize(vault_key, index, taker_key, now, maturity, tranche_bump)?;

    let quote = accounts.quote(reserve_balance, taker_amount)?;
    accounts.fund_escrows(&quote)?;
    let deposit = accounts.add_liquidity(&quote, now)?;

    accounts.tranche.activate(
        deposit.maker_deposit,
        deposit.taker_deposit,
        deposit.liquidity_minted,
    )?;

    msg!(
        "Tranche {} of vault {}: maker={}, taker={}, lp={}, matures {}",
        index,
        vault_key,
        deposit.maker_deposit,
        deposit.taker_deposit,
        deposit.liquidity_minted,
        maturity
    );

    emit!(TrancheCreated {
        vault: vault_key,
        tranche: tranche_key,
        index,
        taker: taker_key,
        maturity_timestamp: maturity,
        maker_deposit: deposit.maker_deposit,
        taker_deposit: deposit.taker_deposit,
        liquidity_minted: deposit.liquidity_minted,
    });

    Ok(deposit)
}

impl<'info> CreateTranche<'info> {
    /// Proportional quote for the full reserve against `taker_amount`
    fn quote(&self, reserve_balance: u64, taker_amount: u64) -> Result<LiquidityQuote> {
        let pool: VenuePool =
            venue::load_venue_account(&self.pool.to_account_info(), &self.vault.venue_program)?;
        require_keys_eq!(self.pool_vault_a.key(), pool.token_vault_a, VaultError::VenueOperationFailed);
        require_keys_eq!(self.pool_vault_b.key(), pool.token_vault_b, VaultError::VenueOperationFailed);

        let (reserve_maker, reserve_taker) = pool.reserves_for(&self.vault.maker_mint)?;
        let quote = quote_add_liquidity(
            reserve_maker,
            reserve_taker,
            self.lp_mint.supply,
            reserve_balance,
            taker_amount,
        )?;

        let taker_floor = slippage_floor(taker_amount, self.vault.slippage_bps)?;
        if quote.maker_amount == 0
            || quote.taker_amount == 0
            || quote.liquidity == 0
            || quote.taker_amount < taker_floor
        {
            msg!(
                "Quote ({}, {}) for taker amount {} below floor {} at reserves ({}, {})",
                quote.maker_amount,
                quote.taker_amount,
                taker_amount,
                taker_floor,
                reserve_maker,
                reserve_taker
            );
            return err!(VaultError::VenueOperationFailed);
        }

        Ok(quote)
    }

    /// Move both quoted sides into the tranche escrows under vault authority
    fn fund_escrows(&self, quote: &LiquidityQuote) -> Result<()> {
        let factory_key = self.vault.factory;
        let vault_id_bytes = self.vault.vault_id.to_le_bytes();
        let vault_seeds: &[&[&[u8]]] = &[&[
            VAULT_SEED,
            factory_key.as_ref(),
            &vault_id_bytes,
            &[self.vault.bump],
        ]];

        // Vault is the taker's delegate
        transfer_signed(
            &self.token_program,
            self.taker_token_account.to_account_info(),
            self.tranche_taker_account.to_account_info(),
            self.vault.to_account_info(),
            &self.taker_mint,
            quote.taker_amount,
            vault_seeds,
        )?;

        transfer_signed(
            &self.token_program,
            self.vault_reserve.to_account_info(),
            self.tranche_maker_account.to_account_info(),
            self.vault.to_account_info(),
            &self.maker_mint,
            quote.maker_amount,
            vault_seeds,
        )
    }

    /// Provide the escrowed pair, return residuals and stake every minted LP.
    /// Fails unless the venue settles within `[slippage_floor(quote), quote]`.
    fn add_liquidity(&mut self, quote: &LiquidityQuote, now: i64) -> Result<TrancheDeposit> {
        let slippage_bps = self.vault.slippage_bps;
        let maker_min = slippage_floor(quote.maker_amount, slippage_bps)?;
        let taker_min = slippage_floor(quote.taker_amount, slippage_bps)?;

        let (amount_a_desired, amount_b_desired) =
            self.vault.to_pool_order(quote.maker_amount, quote.taker_amount);
        let (amount_a_min, amount_b_min) = self.vault.to_pool_order(maker_min, taker_min);
        let (owner_token_a, owner_token_b) = self.vault.to_pool_order(
            self.tranche_maker_account.to_account_info(),
            self.tranche_taker_account.to_account_info(),
        );
        let (mint_a, mint_b) = self.vault.to_pool_order(
            self.maker_mint.to_account_info(),
            self.taker_mint.to_account_info(),
        );

        let vault_key = self.vault.key();
        let tranche_key = self.tranche.key();
        let index_bytes = self.tranche.index.to_le_bytes();
        let tranche_seeds: &[&[&[u8]]] = &[&[
            TRANCHE_SEED,
            vault_key.as_ref(),
            &index_bytes,
            &[self.tranche.bump],
        ]];

        let liquidity_accounts = LiquidityAccounts {
            owner: self.tranche.to_account_info(),
            pool: self.pool.to_account_info(),
            lp_mint: self.lp_mint.to_account_info(),
            pool_vault_a: self.pool_vault_a.to_account_info(),
            pool_vault_b: self.pool_vault_b.to_account_info(),
            owner_token_a,
            owner_token_b,
            owner_lp: self.tranche_lp_account.to_account_info(),
            mint_a,
            mint_b,
            token_program: self.token_program.to_account_info(),
        };
        let settled = venue::add_liquidity(
            &self.venue_program.to_account_info(),
            &liquidity_accounts,
            AddLiquidityArgs {
                amount_a_desired,
                amount_b_desired,
                amount_a_min,
                amount_b_min,
                deadline: now,
            },
            tranche_seeds,
        )?;
        let (maker_deposit, taker_deposit) =
            self.vault.from_pool_order(settled.amount_a, settled.amount_b);

        if maker_deposit < maker_min
            || taker_deposit < taker_min
            || maker_deposit > quote.maker_amount
            || taker_deposit > quote.taker_amount
            || settled.liquidity == 0
        {
            msg!(
                "Venue settled ({}, {}) for {} LP, accepted ({}..={}, {}..={})",
                maker_deposit,
                taker_deposit,
                settled.liquidity,
                maker_min,
                quote.maker_amount,
                taker_min,
                quote.taker_amount
            );
            return err!(VaultError::VenueOperationFailed);
        }

        // Residuals: maker side back to the reserve, taker side back to the taker
        self.tranche_maker_account.reload()?;
        self.tranche_taker_account.reload()?;
        transfer_signed(
            &self.token_program,
            self.tranche_maker_account.to_account_info(),
            self.vault_reserve.to_account_info(),
            self.tranche.to_account_info(),
            &self.maker_mint,
            self.tranche_maker_account.amount,
            tranche_seeds,
        )?;
        transfer_signed(
            &self.token_program,
            self.tranche_taker_account.to_account_info(),
            self.taker_token_account.to_account_info(),
            self.tranche.to_account_info(),
            &self.taker_mint,
            self.tranche_taker_account.amount,
            tranche_seeds,
        )?;

        let (expected_stake, _) =
            venue::derive_stake_pda(&self.vault.gauge, &tranche_key, &self.vault.venue_program);
        require_keys_eq!(self.gauge_stake.key(), expected_stake, VaultError::VenueOperationFailed);

        let stake_accounts = GaugeStakeAccounts {
            owner: self.tranche.to_account_info(),
            payer: self.taker.to_account_info(),
            gauge: self.gauge.to_account_info(),
            stake: self.gauge_stake.to_account_info(),
            owner_lp: self.tranche_lp_account.to_account_info(),
            gauge_lp_vault: self.gauge_lp_vault.to_account_info(),
            lp_mint: self.lp_mint.to_account_info(),
            token_program: self.token_program.to_account_info(),
            system_program: self.system_program.to_account_info(),
        };
        let staked = venue::stake(
            &self.venue_program.to_account_info(),
            &stake_accounts,
            settled.liquidity,
            tranche_seeds,
        )?;
        require_eq!(staked, settled.liquidity, VaultError::VenueOperationFailed);

        Ok(TrancheDeposit {
            tranche: tranche_key,
            maker_deposit,
            taker_deposit,
            liquidity_minted: settled.liquidity,
        })
    }
}
