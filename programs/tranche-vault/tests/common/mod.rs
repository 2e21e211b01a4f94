//! Shared fixture for instruction-level tests.
//!
//! The program runs from its SBF build (`cargo test-sbf`, or `cargo build-sbf`
//! followed by `cargo test`); the venue is the in-process stand-in from
//! `venue.rs`, registered at `VENUE_PROGRAM_ID`. Without an SBF build the
//! tests print a notice and return early.

#![allow(dead_code)]

pub mod venue;

use std::path::Path;

use anchor_lang::{AccountDeserialize, AnchorDeserialize, InstructionData, ToAccountMetas};
use anchor_spl::token::spl_token;
use solana_program::program_pack::Pack;
use solana_program_test::{processor, ProgramTest, ProgramTestContext};
use solana_sdk::{
    account::Account,
    clock::Clock,
    instruction::{Instruction, InstructionError},
    pubkey::Pubkey,
    signature::{Keypair, Signer},
    system_program,
    transaction::{Transaction, TransactionError},
};
use tranche_vault::{
    accounts as accts,
    constants::*,
    errors::VaultError,
    instruction as ix,
    instructions::CreateVaultParams,
    state::{Tranche, Vault},
    venue::{derive_gauge_pda, derive_pool_pda, derive_stake_pda, sort_mints, VenueGauge, VenuePool},
};

pub const DECIMALS: u8 = 6;
pub const POOL_RESERVE: u64 = 1_000_000_000;
pub const STARTING_BALANCE: u64 = 10_000_000;
pub const MAKER_DEPOSIT: u64 = 5_000_000;
pub const MAKER_REVENUE_BPS: u16 = 3000;
pub const GAUGE_REWARDS: u64 = 100_000_000;

const LAMPORTS: u64 = 10_000_000_000;

#[derive(Clone, Copy, Debug)]
pub enum Who {
    Admin,
    Maker,
    Taker,
    Stranger,
}

/// PDAs of one tranche
#[derive(Clone, Copy, Debug)]
pub struct TrancheKeys {
    pub tranche: Pubkey,
    pub maker_escrow: Pubkey,
    pub taker_escrow: Pubkey,
    pub lp_escrow: Pubkey,
    pub reward_escrow: Pubkey,
    pub stake: Pubkey,
}

pub struct Harness {
    pub ctx: ProgramTestContext,
    pub admin: Keypair,
    pub maker: Keypair,
    pub taker: Keypair,
    pub stranger: Keypair,

    pub maker_mint: Pubkey,
    pub taker_mint: Pubkey,
    pub lp_mint: Pubkey,
    pub reward_mint: Pubkey,

    pub pool: Pubkey,
    pub pool_vault_a: Pubkey,
    pub pool_vault_b: Pubkey,
    pub gauge: Pubkey,
    pub gauge_lp_vault: Pubkey,
    pub gauge_reward_vault: Pubkey,

    pub factory: Pubkey,
    pub vault: Pubkey,
    pub vault_reserve: Pubkey,

    pub maker_tokens: Pubkey,
    pub taker_tokens: Pubkey,
    pub admin_rewards: Pubkey,
    pub maker_rewards: Pubkey,
    pub taker_rewards: Pubkey,
}

/// Point program-test at the SBF build, if there is one
fn locate_program() -> bool {
    for var in ["SBF_OUT_DIR", "BPF_OUT_DIR"] {
        if let Ok(dir) = std::env::var(var) {
            if Path::new(&dir).join("tranche_vault.so").exists() {
                return true;
            }
        }
    }
    let deploy = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../target/deploy");
    if deploy.join("tranche_vault.so").exists() {
        std::env::set_var("SBF_OUT_DIR", &deploy);
        return true;
    }
    false
}

fn funded(lamports: u64) -> Account {
    Account {
        lamports,
        data: vec![],
        owner: system_program::ID,
        executable: false,
        rent_epoch: 0,
    }
}

fn mint_account(authority: Pubkey, supply: u64) -> Account {
    let mut data = vec![0; spl_token::state::Mint::LEN];
    spl_token::state::Mint {
        mint_authority: Some(authority).into(),
        supply,
        decimals: DECIMALS,
        is_initialized: true,
        freeze_authority: None.into(),
    }
    .pack_into_slice(&mut data);
    Account {
        lamports: LAMPORTS,
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    }
}

fn token_account(mint: Pubkey, owner: Pubkey, amount: u64, delegate: Option<Pubkey>) -> Account {
    let mut data = vec![0; spl_token::state::Account::LEN];
    spl_token::state::Account {
        mint,
        owner,
        amount,
        delegate: delegate.into(),
        state: spl_token::state::AccountState::Initialized,
        is_native: None.into(),
        delegated_amount: if delegate.is_some() { amount } else { 0 },
        close_authority: None.into(),
    }
    .pack_into_slice(&mut data);
    Account {
        lamports: LAMPORTS,
        data,
        owner: spl_token::ID,
        executable: false,
        rent_epoch: 0,
    }
}

fn venue_account(data: Vec<u8>) -> Account {
    Account {
        lamports: LAMPORTS,
        data,
        owner: VENUE_PROGRAM_ID,
        executable: false,
        rent_epoch: 0,
    }
}

fn instruction(accounts: impl ToAccountMetas, data: impl InstructionData) -> Instruction {
    Instruction {
        program_id: tranche_vault::ID,
        accounts: accounts.to_account_metas(None),
        data: data.data(),
    }
}

impl Harness {
    /// Factory, one vault with `MAKER_DEPOSIT` in its reserve, and a venue
    /// pool holding `POOL_RESERVE` of each side. `None` without an SBF build.
    pub async fn start() -> Option<Self> {
        Self::start_with_pool(POOL_RESERVE).await
    }

    pub async fn start_with_pool(pool_reserve: u64) -> Option<Self> {
        if !locate_program() {
            eprintln!("tranche_vault.so not found; run `cargo test-sbf` to exercise instruction tests");
            return None;
        }

        let mut program_test = ProgramTest::new("tranche_vault", tranche_vault::ID, None);
        program_test.prefer_bpf(false);
        program_test.add_program("venue", VENUE_PROGRAM_ID, processor!(venue::process_venue));
        program_test.set_compute_max_units(1_400_000);

        let admin = Keypair::new();
        let maker = Keypair::new();
        let taker = Keypair::new();
        let stranger = Keypair::new();
        for principal in [&admin, &maker, &taker, &stranger] {
            program_test.add_account(principal.pubkey(), funded(LAMPORTS));
        }

        let maker_mint = Pubkey::new_unique();
        let taker_mint = Pubkey::new_unique();
        let reward_mint = Pubkey::new_unique();
        let lp_mint = Pubkey::new_unique();

        let (pool, pool_bump) = derive_pool_pda(&maker_mint, &taker_mint, false, &VENUE_PROGRAM_ID);
        let (gauge, gauge_bump) = derive_gauge_pda(&pool, &VENUE_PROGRAM_ID);
        let (token_mint_a, token_mint_b, _) = sort_mints(&maker_mint, &taker_mint);
        let pool_vault_a = Pubkey::new_unique();
        let pool_vault_b = Pubkey::new_unique();
        let gauge_lp_vault = Pubkey::new_unique();
        let gauge_reward_vault = Pubkey::new_unique();

        program_test.add_account(maker_mint, mint_account(Pubkey::new_unique(), 0));
        program_test.add_account(taker_mint, mint_account(Pubkey::new_unique(), 0));
        program_test.add_account(reward_mint, mint_account(Pubkey::new_unique(), 0));
        program_test.add_account(lp_mint, mint_account(pool, pool_reserve));

        program_test.add_account(pool_vault_a, token_account(token_mint_a, pool, pool_reserve, None));
        program_test.add_account(pool_vault_b, token_account(token_mint_b, pool, pool_reserve, None));
        program_test.add_account(gauge_lp_vault, token_account(lp_mint, gauge, 0, None));
        program_test.add_account(
            gauge_reward_vault,
            token_account(reward_mint, gauge, GAUGE_REWARDS, None),
        );

        let venue_pool = VenuePool {
            token_mint_a,
            token_mint_b,
            stable: false,
            lp_mint,
            token_vault_a: pool_vault_a,
            token_vault_b: pool_vault_b,
            reserve_a: pool_reserve,
            reserve_b: pool_reserve,
            bump: pool_bump,
        };
        program_test.add_account(pool, venue_account(venue::account_data(&venue_pool, VenuePool::LEN)));
        let venue_gauge = VenueGauge {
            pool,
            lp_mint,
            reward_mint,
            lp_vault: gauge_lp_vault,
            reward_vault: gauge_reward_vault,
            total_staked: 0,
            bump: gauge_bump,
        };
        program_test.add_account(gauge, venue_account(venue::account_data(&venue_gauge, VenueGauge::LEN)));

        let (factory, _) = Pubkey::find_program_address(&[FACTORY_SEED], &tranche_vault::ID);
        let (vault, _) = Pubkey::find_program_address(
            &[VAULT_SEED, factory.as_ref(), &0u64.to_le_bytes()],
            &tranche_vault::ID,
        );
        let (vault_reserve, _) =
            Pubkey::find_program_address(&[VAULT_RESERVE_SEED, vault.as_ref()], &tranche_vault::ID);

        // Principals approve the vault PDA up front
        let maker_tokens = Pubkey::new_unique();
        let taker_tokens = Pubkey::new_unique();
        program_test.add_account(
            maker_tokens,
            token_account(maker_mint, maker.pubkey(), STARTING_BALANCE, Some(vault)),
        );
        program_test.add_account(
            taker_tokens,
            token_account(taker_mint, taker.pubkey(), STARTING_BALANCE, Some(vault)),
        );

        let admin_rewards = Pubkey::new_unique();
        let maker_rewards = Pubkey::new_unique();
        let taker_rewards = Pubkey::new_unique();
        program_test.add_account(admin_rewards, token_account(reward_mint, admin.pubkey(), 0, None));
        program_test.add_account(maker_rewards, token_account(reward_mint, maker.pubkey(), 0, None));
        program_test.add_account(taker_rewards, token_account(reward_mint, taker.pubkey(), 0, None));

        let ctx = program_test.start_with_context().await;
        let mut harness = Self {
            ctx,
            admin,
            maker,
            taker,
            stranger,
            maker_mint,
            taker_mint,
            lp_mint,
            reward_mint,
            pool,
            pool_vault_a,
            pool_vault_b,
            gauge,
            gauge_lp_vault,
            gauge_reward_vault,
            factory,
            vault,
            vault_reserve,
            maker_tokens,
            taker_tokens,
            admin_rewards,
            maker_rewards,
            taker_rewards,
        };

        let setup = [
            (harness.initialize_factory_ix(), Who::Admin),
            (harness.create_vault_ix(), Who::Admin),
            (harness.deposit_ix(MAKER_DEPOSIT, Who::Maker), Who::Maker),
        ];
        for (instruction, signer) in setup {
            harness.send(instruction, signer).await.expect("fixture setup");
        }
        Some(harness)
    }

    pub fn key(&self, who: Who) -> Pubkey {
        self.keypair(who).pubkey()
    }

    fn keypair(&self, who: Who) -> &Keypair {
        match who {
            Who::Admin => &self.admin,
            Who::Maker => &self.maker,
            Who::Taker => &self.taker,
            Who::Stranger => &self.stranger,
        }
    }

    /// Sign with the fee payer (and `who` when the instruction names it as a
    /// signer) on a fresh blockhash so repeated
    /// instructions are never deduplicated. Returns the raw return data.
    pub async fn send(&mut self, instruction: Instruction, who: Who) -> Result<Vec<u8>, TransactionError> {
        let blockhash = self
            .ctx
            .get_new_latest_blockhash()
            .await
            .expect("latest blockhash");
        let signer = self.keypair(who);
        let mut signers = vec![&self.ctx.payer];
        if instruction
            .accounts
            .iter()
            .any(|meta| meta.is_signer && meta.pubkey == signer.pubkey())
        {
            signers.push(signer);
        }
        let tx = Transaction::new_signed_with_payer(
            &[instruction],
            Some(&self.ctx.payer.pubkey()),
            &signers[..],
            blockhash,
        );
        let outcome = self
            .ctx
            .banks_client
            .process_transaction_with_metadata(tx)
            .await
            .expect("banks client");
        outcome.result?;
        Ok(outcome
            .metadata
            .and_then(|metadata| metadata.return_data)
            .map(|return_data| return_data.data)
            .unwrap_or_default())
    }

    pub async fn now(&mut self) -> i64 {
        self.clock().await.unix_timestamp
    }

    pub async fn warp_to(&mut self, unix_timestamp: i64) {
        let mut clock = self.clock().await;
        clock.unix_timestamp = unix_timestamp;
        self.ctx.set_sysvar(&clock);
    }

    async fn clock(&mut self) -> Clock {
        self.ctx
            .banks_client
            .get_sysvar::<Clock>()
            .await
            .expect("clock sysvar")
    }

    pub async fn token_balance(&mut self, address: Pubkey) -> u64 {
        let account = self
            .ctx
            .banks_client
            .get_account(address)
            .await
            .expect("banks client")
            .expect("token account exists");
        spl_token::state::Account::unpack(&account.data)
            .expect("token account layout")
            .amount
    }

    pub async fn vault_state(&mut self) -> Vault {
        let account = self.ctx.banks_client.get_account(self.vault).await.unwrap().unwrap();
        Vault::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    pub async fn tranche_state(&mut self, index: u64) -> Tranche {
        let address = self.tranche_keys(index).tranche;
        let account = self.ctx.banks_client.get_account(address).await.unwrap().unwrap();
        Tranche::try_deserialize(&mut account.data.as_slice()).unwrap()
    }

    pub fn tranche_keys(&self, index: u64) -> TrancheKeys {
        let (tranche, _) = Pubkey::find_program_address(
            &[TRANCHE_SEED, self.vault.as_ref(), &index.to_le_bytes()],
            &tranche_vault::ID,
        );
        let escrow = |seed: &[u8]| {
            Pubkey::find_program_address(&[seed, tranche.as_ref()], &tranche_vault::ID).0
        };
        TrancheKeys {
            tranche,
            maker_escrow: escrow(TRANCHE_MAKER_SEED),
            taker_escrow: escrow(TRANCHE_TAKER_SEED),
            lp_escrow: escrow(TRANCHE_LP_SEED),
            reward_escrow: escrow(TRANCHE_REWARD_SEED),
            stake: derive_stake_pda(&self.gauge, &tranche, &VENUE_PROGRAM_ID).0,
        }
    }

    // ============================================================
    // INSTRUCTIONS
    // ============================================================

    pub fn initialize_factory_ix(&self) -> Instruction {
        instruction(
            accts::InitializeFactory {
                owner: self.admin.pubkey(),
                factory_state: self.factory,
                system_program: system_program::ID,
            },
            ix::InitializeFactory {
                protocol_fee_bps: None,
                vault_creation_open: false,
            },
        )
    }

    pub fn create_vault_ix(&self) -> Instruction {
        instruction(
            accts::CreateVault {
                creator: self.admin.pubkey(),
                factory_state: self.factory,
                vault: self.vault,
                maker_mint: self.maker_mint,
                taker_mint: self.taker_mint,
                vault_reserve: self.vault_reserve,
                venue_program: VENUE_PROGRAM_ID,
                pool: self.pool,
                gauge: self.gauge,
                token_program: spl_token::ID,
                system_program: system_program::ID,
            },
            ix::CreateVault {
                params: CreateVaultParams {
                    maker: self.maker.pubkey(),
                    maker_revenue_bps: MAKER_REVENUE_BPS,
                    slippage_bps: None,
                    maturity_duration: None,
                    stable: false,
                },
            },
        )
    }

    pub fn deposit_ix(&self, amount: u64, signer: Who) -> Instruction {
        instruction(
            accts::DepositTokens {
                maker: self.key(signer),
                vault: self.vault,
                vault_reserve: self.vault_reserve,
                maker_token_account: self.maker_tokens,
                maker_mint: self.maker_mint,
                token_program: spl_token::ID,
            },
            ix::DepositTokens { amount },
        )
    }

    pub fn maker_withdraw_ix(&self, amount: u64, signer: Who) -> Instruction {
        instruction(
            accts::MakerWithdrawTokens {
                maker: self.key(signer),
                vault: self.vault,
                vault_reserve: self.vault_reserve,
                maker_token_account: self.maker_tokens,
                maker_mint: self.maker_mint,
                token_program: spl_token::ID,
            },
            ix::MakerWithdrawTokensFromVault { amount },
        )
    }

    pub fn tranche_creation_ix(&self, enabled: bool, signer: Who) -> Instruction {
        let accounts = accts::MakerVaultControl {
            maker: self.key(signer),
            vault: self.vault,
        };
        if enabled {
            instruction(accounts, ix::EnableTrancheCreation)
        } else {
            instruction(accounts, ix::DisableTrancheCreation)
        }
    }

    pub fn set_slippage_ix(&self, new_slippage_bps: u16, signer: Who) -> Instruction {
        instruction(
            accts::MakerVaultControl {
                maker: self.key(signer),
                vault: self.vault,
            },
            ix::SetSlippageBasisPoints { new_slippage_bps },
        )
    }

    pub fn vault_info_ix(&self, offset: u64) -> Instruction {
        instruction(accts::VaultView { vault: self.vault }, ix::VaultInfo { offset })
    }

    pub fn create_tranche_ix(&self, index: u64, taker_amount: u64) -> Instruction {
        let keys = self.tranche_keys(index);
        instruction(
            accts::CreateTranche {
                taker: self.taker.pubkey(),
                vault: self.vault,
                vault_reserve: self.vault_reserve,
                taker_token_account: self.taker_tokens,
                maker_mint: self.maker_mint,
                taker_mint: self.taker_mint,
                lp_mint: self.lp_mint,
                tranche: keys.tranche,
                tranche_maker_account: keys.maker_escrow,
                tranche_taker_account: keys.taker_escrow,
                tranche_lp_account: keys.lp_escrow,
                venue_program: VENUE_PROGRAM_ID,
                pool: self.pool,
                pool_vault_a: self.pool_vault_a,
                pool_vault_b: self.pool_vault_b,
                gauge: self.gauge,
                gauge_stake: keys.stake,
                gauge_lp_vault: self.gauge_lp_vault,
                token_program: spl_token::ID,
                system_program: system_program::ID,
            },
            ix::CreateTranche { taker_amount },
        )
    }

    fn unwind_accounts(&self, index: u64, caller: Who) -> accts::WithdrawTokens {
        let keys = self.tranche_keys(index);
        accts::WithdrawTokens {
            caller: self.key(caller),
            vault: self.vault,
            vault_reserve: self.vault_reserve,
            tranche: keys.tranche,
            tranche_maker_account: keys.maker_escrow,
            tranche_taker_account: keys.taker_escrow,
            tranche_lp_account: keys.lp_escrow,
            taker_token_account: self.taker_tokens,
            maker_mint: self.maker_mint,
            taker_mint: self.taker_mint,
            lp_mint: self.lp_mint,
            venue_program: VENUE_PROGRAM_ID,
            pool: self.pool,
            pool_vault_a: self.pool_vault_a,
            pool_vault_b: self.pool_vault_b,
            gauge: self.gauge,
            gauge_stake: keys.stake,
            gauge_lp_vault: self.gauge_lp_vault,
            token_program: spl_token::ID,
            system_program: system_program::ID,
        }
    }

    pub fn withdraw_tokens_ix(&self, index: u64, caller: Who) -> Instruction {
        instruction(self.unwind_accounts(index, caller), ix::WithdrawTokens)
    }

    pub fn emergency_liquidation_ix(&self, index: u64, caller: Who) -> Instruction {
        instruction(self.unwind_accounts(index, caller), ix::EmergencyLiquidation)
    }

    pub fn withdraw_rewards_ix(&self, index: u64, caller: Who) -> Instruction {
        let keys = self.tranche_keys(index);
        instruction(
            accts::WithdrawRewards {
                caller: self.key(caller),
                factory_state: self.factory,
                vault: self.vault,
                tranche: keys.tranche,
                reward_mint: self.reward_mint,
                tranche_reward_account: keys.reward_escrow,
                maker_reward_account: self.maker_rewards,
                taker_reward_account: self.taker_rewards,
                fee_recipient_reward_account: self.admin_rewards,
                venue_program: VENUE_PROGRAM_ID,
                gauge: self.gauge,
                gauge_stake: keys.stake,
                gauge_reward_vault: self.gauge_reward_vault,
                token_program: spl_token::ID,
                system_program: system_program::ID,
            },
            ix::WithdrawRewards,
        )
    }
}

/// Decode instruction return data. The runtime strips trailing zero bytes,
/// so the buffer is padded back out before deserializing.
pub fn decode<T: AnchorDeserialize>(mut data: Vec<u8>) -> T {
    data.resize(1024, 0);
    T::deserialize(&mut data.as_slice()).expect("return data layout")
}

pub fn assert_vault_error(result: Result<Vec<u8>, TransactionError>, expected: VaultError) {
    let code: u32 = expected.into();
    assert_eq!(
        result.unwrap_err(),
        TransactionError::InstructionError(0, InstructionError::Custom(code)),
        "expected {:?}",
        expected
    );
}
