//! Battle engine - deterministic hex-grid tactical combat
//!
//! Two armies, one seeded RNG, single-stepped turns with full undo.

pub mod abilities;
pub mod actions;
pub mod constants;
pub mod damage;
pub mod deploy;
pub mod dispatch;
pub mod engine;
pub mod events;
pub mod grid;
pub mod hex;
pub mod pathfinding;
pub mod rng;
pub mod units;

pub use abilities::{Ability, Effect, TargetKind, Trigger};
pub use actions::{ActionKind, LastAction, UndyingSave};
pub use engine::{Battle, BattleOptions};
pub use events::{EffectEvent, EventKind};
pub use grid::HexGrid;
pub use hex::Hex;
pub use units::{Unit, UnitSpec};
