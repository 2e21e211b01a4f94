pub mod factory_state;
pub mod vault;
pub mod tranche;

pub use factory_state::*;
pub use vault::*;
pub use tranche::*;
