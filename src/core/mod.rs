pub mod error;
pub mod types;

pub use error::{BattleError, Result};
pub use types::{Player, UnitId, Winner};
