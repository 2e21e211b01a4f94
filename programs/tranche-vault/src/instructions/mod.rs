pub mod initialize_factory;
pub mod admin;
pub mod create_vault;
pub mod deposit;
pub mod withdraw;
pub mod create_tranche;
pub mod withdraw_tokens;
pub mod withdraw_rewards;
pub mod emergency;
pub mod custody;

// Glob re-exports for Anchor compatibility
// Note: "ambiguous glob re-exports" warning for `handler` is benign -
// lib.rs uses fully qualified paths (e.g., instructions::deposit::handler)
#[allow(ambiguous_glob_reexports)]
pub use initialize_factory::*;
pub use admin::*;
pub use create_vault::*;
pub use deposit::*;
pub use withdraw::*;
pub use create_tranche::*;
pub use withdraw_tokens::*;
pub use withdraw_rewards::*;
pub use emergency::*;
