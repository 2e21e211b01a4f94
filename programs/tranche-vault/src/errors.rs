use anchor_lang::prelude::*;

#[error_code]
pub enum VaultError {
    // ============================================================
    // AUTHORIZATION ERRORS (6000-6009)
    // ============================================================

    #[msg("Caller is not the required principal for this operation")]
    Unauthorized,

    // ============================================================
    // RATE ERRORS (6010-6019)
    // ============================================================

    #[msg("Basis point rate exceeds the maximum of 10000")]
    InvalidRate,

    // ============================================================
    // AMOUNT ERRORS (6020-6039)
    // ============================================================

    #[msg("Amount is zero or exceeds the authorized allowance")]
    InsufficientAmount,

    #[msg("Requested amount exceeds the custodied balance")]
    InsufficientBalance,

    // ============================================================
    // LIFECYCLE ERRORS (6040-6059)
    // ============================================================

    #[msg("Tranche creation is disabled by the maker")]
    TrancheCreationDisabled,

    #[msg("Tranche has not reached maturity and bypass is not mutual")]
    MaturityNotReached,

    #[msg("Maturity must be strictly in the future")]
    InvalidMaturity,

    #[msg("Tranche is not in the expected state")]
    InvalidState,

    // ============================================================
    // VALIDATION ERRORS (6060-6079)
    // ============================================================

    #[msg("Required address is the zero address")]
    ZeroAddress,

    #[msg("Maker and taker assets must differ")]
    IdenticalMints,

    #[msg("Token account mint does not match the vault asset")]
    InvalidMint,

    #[msg("Invalid account data or discriminator mismatch")]
    InvalidAccountData,

    // ============================================================
    // VENUE ERRORS (6080-6099)
    // ============================================================

    #[msg("Liquidity venue rejected the operation or settled outside tolerance")]
    VenueOperationFailed,

    // ============================================================
    // ARITHMETIC ERRORS (6100-6119)
    // ============================================================

    #[msg("Arithmetic overflow")]
    Overflow,
}
