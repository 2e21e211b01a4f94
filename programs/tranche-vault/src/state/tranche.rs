use anchor_lang::prelude::*;
use crate::errors::VaultError;

/// Stored lifecycle of a tranche
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TrancheStatus {
    /// Account exists, no liquidity yet
    #[default]
    Created,
    /// Liquidity provided and staked
    Active,
    /// Unwound; all principal forwarded
    Settled,
}

/// Lifecycle as observed at a point in time
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TranchePhase {
    Created,
    Active,
    /// Active and past maturity, or both principals set the bypass
    Withdrawable,
    Settled,
}

/// Which principal roles a caller holds in a tranche.
/// A maker that also took its own tranche holds both.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Investor {
    pub is_maker: bool,
    pub is_taker: bool,
}

impl Investor {
    pub const MAKER: Investor = Investor { is_maker: true, is_taker: false };
    pub const TAKER: Investor = Investor { is_maker: false, is_taker: true };
}

/// One maker/taker liquidity position with a fixed maturity
#[account]
#[derive(Default)]
pub struct Tranche {
    /// Parent vault; the maker is read from it
    pub vault: Pubkey,

    /// Position in the vault registry
    pub index: u64,

    pub taker: Pubkey,

    pub maturity_timestamp: i64,

    // ============================================================
    // EMERGENCY BYPASS (monotonic)
    // ============================================================

    pub maker_bypass: bool,
    pub taker_bypass: bool,

    pub status: TrancheStatus,

    // ============================================================
    // ACCOUNTING
    // ============================================================

    /// Maker asset accepted by the venue
    pub maker_deposit: u64,

    /// Taker asset accepted by the venue
    pub taker_deposit: u64,

    /// LP minted and staked at creation
    pub liquidity_minted: u64,

    /// Maker asset returned to the vault at unwind
    pub maker_withdrawn: u64,

    /// Taker asset returned to the taker at unwind
    pub taker_withdrawn: u64,

    /// Lifetime rewards harvested and distributed
    pub rewards_harvested: u64,

    /// Lifetime protocol fees paid out of rewards
    pub fees_paid: u64,

    pub created_at: i64,
    pub settled_at: i64,

    /// PDA bump seed
    pub bump: u8,
}

impl Tranche {
    pub const LEN: usize = 8  // discriminator
        + 32  // vault
        + 8   // index
        + 32  // taker
        + 8   // maturity_timestamp
        + 1   // maker_bypass
        + 1   // taker_bypass
        + 1   // status
        + 8   // maker_deposit
        + 8   // taker_deposit
        + 8   // liquidity_minted
        + 8   // maker_withdrawn
        + 8   // taker_withdrawn
        + 8   // rewards_harvested
        + 8   // fees_paid
        + 8   // created_at
        + 8   // settled_at
        + 1   // bump
        + 32; // padding for future expansion

    pub fn initialize(
        &mut self,
        vault: Pubkey,
        index: u64,
        taker: Pubkey,
        now: i64,
        maturity_timestamp: i64,
        bump: u8,
    ) -> Result<()> {
        require_keys_neq!(taker, Pubkey::default(), VaultError::ZeroAddress);
        require_gt!(maturity_timestamp, now, VaultError::InvalidMaturity);

        self.vault = vault;
        self.index = index;
        self.taker = taker;
        self.maturity_timestamp = maturity_timestamp;
        self.maker_bypass = false;
        self.taker_bypass = false;
        self.status = TrancheStatus::Created;
        self.created_at = now;
        self.bump = bump;
        Ok(())
    }

    /// Resolve the caller's roles; strangers fail with `Unauthorized`
    pub fn investor(&self, caller: &Pubkey, maker: &Pubkey) -> Result<Investor> {
        let investor = Investor {
            is_maker: caller == maker,
            is_taker: *caller == self.taker,
        };
        if !investor.is_maker && !investor.is_taker {
            msg!("Caller {} is neither maker {} nor taker {}", caller, maker, self.taker);
            return err!(VaultError::Unauthorized);
        }
        Ok(investor)
    }

    /// Set the caller's bypass flags. Returns true if any flag changed.
    pub fn record_bypass(&mut self, investor: Investor) -> bool {
        let before = (self.maker_bypass, self.taker_bypass);
        self.maker_bypass |= investor.is_maker;
        self.taker_bypass |= investor.is_taker;
        before != (self.maker_bypass, self.taker_bypass)
    }

    pub fn mutual_bypass(&self) -> bool {
        self.maker_bypass && self.taker_bypass
    }

    pub fn maturity_reached(&self, now: i64) -> bool {
        now >= self.maturity_timestamp || self.mutual_bypass()
    }

    pub fn phase(&self, now: i64) -> TranchePhase {
        match self.status {
            TrancheStatus::Created => TranchePhase::Created,
            TrancheStatus::Settled => TranchePhase::Settled,
            TrancheStatus::Active if self.maturity_reached(now) => TranchePhase::Withdrawable,
            TrancheStatus::Active => TranchePhase::Active,
        }
    }

    /// Withdrawable and Settled pass (a settled unwind is a no-op).
    /// Active fails with `MaturityNotReached`, logging `now` and the maturity.
    pub fn ensure_withdrawable(&self, now: i64) -> Result<()> {
        match self.phase(now) {
            TranchePhase::Withdrawable | TranchePhase::Settled => Ok(()),
            TranchePhase::Active => {
                msg!(
                    "Tranche matures at {} (now {}), bypass maker={} taker={}",
                    self.maturity_timestamp,
                    now,
                    self.maker_bypass,
                    self.taker_bypass
                );
                err!(VaultError::MaturityNotReached)
            }
            TranchePhase::Created => err!(VaultError::InvalidState),
        }
    }

    pub fn activate(&mut self, maker_deposit: u64, taker_deposit: u64, liquidity: u64) -> Result<()> {
        require!(self.status == TrancheStatus::Created, VaultError::InvalidState);
        self.maker_deposit = maker_deposit;
        self.taker_deposit = taker_deposit;
        self.liquidity_minted = liquidity;
        self.status = TrancheStatus::Active;
        Ok(())
    }

    pub fn mark_settled(&mut self, now: i64) -> Result<()> {
        require!(self.status == TrancheStatus::Active, VaultError::InvalidState);
        self.status = TrancheStatus::Settled;
        self.settled_at = now;
        Ok(())
    }
}

/// Returned by `create_tranche`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrancheDeposit {
    pub tranche: Pubkey,
    pub maker_deposit: u64,
    pub taker_deposit: u64,
    pub liquidity_minted: u64,
}

/// Returned by `withdraw_tokens` and `emergency_liquidation`
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TrancheWithdrawal {
    pub maker_withdrawal: u64,
    pub taker_withdrawal: u64,
}
