//! Venue Instruction Data Structures
//!
//! Each venue instruction is an 8-byte discriminator,
//! `sha256("global:<instruction_name>")[..8]`, followed by Borsh-encoded
//! arguments. Account structs list the accounts in the exact order the
//! venue expects them.

use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::AccountMeta;
use crate::errors::VaultError;

// ============================================================
// INSTRUCTION DISCRIMINATORS
// ============================================================

pub mod discriminators {
    /// add_liquidity
    pub const ADD_LIQUIDITY: [u8; 8] = [181, 157, 89, 67, 143, 182, 52, 72];

    /// remove_liquidity
    pub const REMOVE_LIQUIDITY: [u8; 8] = [80, 85, 209, 72, 24, 206, 177, 108];

    /// gauge_deposit
    pub const GAUGE_DEPOSIT: [u8; 8] = [189, 94, 175, 222, 58, 42, 198, 213];

    /// gauge_withdraw
    pub const GAUGE_WITHDRAW: [u8; 8] = [193, 54, 15, 22, 14, 67, 70, 104];

    /// get_reward
    pub const GET_REWARD: [u8; 8] = [221, 63, 124, 201, 96, 218, 238, 29];
}

fn encode<T: AnchorSerialize>(discriminator: [u8; 8], args: &T) -> Result<Vec<u8>> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|_| error!(VaultError::InvalidAccountData))?;
    Ok(data)
}

// ============================================================
// ADD LIQUIDITY
// ============================================================

/// Amounts are in pool order (token A = lower mint)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct AddLiquidityArgs {
    pub amount_a_desired: u64,
    pub amount_b_desired: u64,
    pub amount_a_min: u64,
    pub amount_b_min: u64,
    /// Unix timestamp after which the venue must reject the call
    pub deadline: i64,
}

impl AddLiquidityArgs {
    pub fn to_instruction_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::ADD_LIQUIDITY, self)
    }
}

/// Account ordering shared by add_liquidity and remove_liquidity
pub struct LiquidityAccounts<'info> {
    /// [signer] Position owner (tranche PDA)
    pub owner: AccountInfo<'info>,
    /// [writable] Pool state
    pub pool: AccountInfo<'info>,
    /// [writable] LP mint
    pub lp_mint: AccountInfo<'info>,
    /// [writable] Pool custody of token A
    pub pool_vault_a: AccountInfo<'info>,
    /// [writable] Pool custody of token B
    pub pool_vault_b: AccountInfo<'info>,
    /// [writable] Owner's token A account
    pub owner_token_a: AccountInfo<'info>,
    /// [writable] Owner's token B account
    pub owner_token_b: AccountInfo<'info>,
    /// [writable] Owner's LP account
    pub owner_lp: AccountInfo<'info>,
    /// [] Token A mint
    pub mint_a: AccountInfo<'info>,
    /// [] Token B mint
    pub mint_b: AccountInfo<'info>,
    /// [] Token program
    pub token_program: AccountInfo<'info>,
}

impl<'info> LiquidityAccounts<'info> {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            readonly_signer(self.owner.key()),
            writable(self.pool.key()),
            writable(self.lp_mint.key()),
            writable(self.pool_vault_a.key()),
            writable(self.pool_vault_b.key()),
            writable(self.owner_token_a.key()),
            writable(self.owner_token_b.key()),
            writable(self.owner_lp.key()),
            readonly(self.mint_a.key()),
            readonly(self.mint_b.key()),
            readonly(self.token_program.key()),
        ]
    }

    pub fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.pool.clone(),
            self.lp_mint.clone(),
            self.pool_vault_a.clone(),
            self.pool_vault_b.clone(),
            self.owner_token_a.clone(),
            self.owner_token_b.clone(),
            self.owner_lp.clone(),
            self.mint_a.clone(),
            self.mint_b.clone(),
            self.token_program.clone(),
        ]
    }
}

// ============================================================
// REMOVE LIQUIDITY
// ============================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct RemoveLiquidityArgs {
    pub liquidity: u64,
    pub amount_a_min: u64,
    pub amount_b_min: u64,
    pub deadline: i64,
}

impl RemoveLiquidityArgs {
    pub fn to_instruction_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::REMOVE_LIQUIDITY, self)
    }
}

// ============================================================
// GAUGE DEPOSIT / WITHDRAW
// ============================================================

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, PartialEq, Eq)]
pub struct GaugeAmountArgs {
    pub amount: u64,
}

impl GaugeAmountArgs {
    pub fn deposit_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::GAUGE_DEPOSIT, self)
    }

    pub fn withdraw_data(&self) -> Result<Vec<u8>> {
        encode(discriminators::GAUGE_WITHDRAW, self)
    }
}

/// Account ordering for gauge_deposit and gauge_withdraw
pub struct GaugeStakeAccounts<'info> {
    /// [signer] Stake owner (tranche PDA)
    pub owner: AccountInfo<'info>,
    /// [signer, writable] Pays rent when the stake account is first created
    pub payer: AccountInfo<'info>,
    /// [writable] Gauge state
    pub gauge: AccountInfo<'info>,
    /// [writable] Owner's stake PDA
    pub stake: AccountInfo<'info>,
    /// [writable] Owner's LP account
    pub owner_lp: AccountInfo<'info>,
    /// [writable] Gauge LP custody
    pub gauge_lp_vault: AccountInfo<'info>,
    /// [] LP mint
    pub lp_mint: AccountInfo<'info>,
    /// [] Token program
    pub token_program: AccountInfo<'info>,
    /// [] System program
    pub system_program: AccountInfo<'info>,
}

impl<'info> GaugeStakeAccounts<'info> {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            readonly_signer(self.owner.key()),
            writable_signer(self.payer.key()),
            writable(self.gauge.key()),
            writable(self.stake.key()),
            writable(self.owner_lp.key()),
            writable(self.gauge_lp_vault.key()),
            readonly(self.lp_mint.key()),
            readonly(self.token_program.key()),
            readonly(self.system_program.key()),
        ]
    }

    pub fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.payer.clone(),
            self.gauge.clone(),
            self.stake.clone(),
            self.owner_lp.clone(),
            self.gauge_lp_vault.clone(),
            self.lp_mint.clone(),
            self.token_program.clone(),
            self.system_program.clone(),
        ]
    }
}

// ============================================================
// GET REWARD
// ============================================================

/// Account ordering for get_reward (no arguments)
pub struct GetRewardAccounts<'info> {
    /// [signer] Stake owner (tranche PDA)
    pub owner: AccountInfo<'info>,
    /// [writable] Gauge state
    pub gauge: AccountInfo<'info>,
    /// [writable] Owner's stake PDA
    pub stake: AccountInfo<'info>,
    /// [writable] Gauge reward custody
    pub gauge_reward_vault: AccountInfo<'info>,
    /// [writable] Reward recipient token account
    pub recipient: AccountInfo<'info>,
    /// [] Reward mint
    pub reward_mint: AccountInfo<'info>,
    /// [] Token program
    pub token_program: AccountInfo<'info>,
}

impl<'info> GetRewardAccounts<'info> {
    pub fn to_account_metas(&self) -> Vec<AccountMeta> {
        vec![
            readonly_signer(self.owner.key()),
            writable(self.gauge.key()),
            writable(self.stake.key()),
            writable(self.gauge_reward_vault.key()),
            writable(self.recipient.key()),
            readonly(self.reward_mint.key()),
            readonly(self.token_program.key()),
        ]
    }

    pub fn to_account_infos(&self) -> Vec<AccountInfo<'info>> {
        vec![
            self.owner.clone(),
            self.gauge.clone(),
            self.stake.clone(),
            self.gauge_reward_vault.clone(),
            self.recipient.clone(),
            self.reward_mint.clone(),
            self.token_program.clone(),
        ]
    }
}

// ============================================================
// ACCOUNT META HELPERS
// ============================================================

/// Helper to create writable account meta
pub fn writable(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, false)
}

/// Helper to create writable signer account meta
pub fn writable_signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new(pubkey, true)
}

/// Helper to create readonly account meta
pub fn readonly(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, false)
}

/// Helper to create readonly signer account meta
pub fn readonly_signer(pubkey: Pubkey) -> AccountMeta {
    AccountMeta::new_readonly(pubkey, true)
}
