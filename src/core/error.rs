use thiserror::Error;

use crate::battle::hex::Hex;

#[derive(Error, Debug)]
pub enum BattleError {
    #[error("unit spec `{name}`: count must be at least 1, got {count}")]
    InvalidCount { name: String, count: u32 },

    #[error("unit spec `{name}`: attack range must be at least 1")]
    InvalidRange { name: String },

    #[error("unit spec `{name}`: max_hp must be at least 1, got {max_hp}")]
    InvalidMaxHp { name: String, max_hp: i32 },

    #[error("unit spec `{name}`: hp {hp} outside 1..={max_hp}")]
    InvalidHp { name: String, hp: i32, max_hp: i32 },

    #[error("unit spec `{name}`: speed must be at least 1.0, got {speed}")]
    InvalidSpeed { name: String, speed: f64 },

    #[error("unit spec `{name}`: ability charge must be at least 1")]
    InvalidCharge { name: String },

    #[error("unit spec `{name}`: {reason}")]
    InvalidAbility { name: String, reason: String },

    #[error("unit spec `{name}`: position {pos:?} out of bounds")]
    PositionOutOfBounds { name: String, pos: Hex },

    #[error("unit spec `{name}`: position {pos:?} already occupied")]
    PositionOccupied { name: String, pos: Hex },

    #[error("unit spec `{name}`: explicit position requires count 1")]
    PositionWithCount { name: String },

    #[error("army for player {player:?} does not fit the deployment zone")]
    ArmyTooLarge { player: crate::core::types::Player },
}

pub type Result<T> = std::result::Result<T, BattleError>;
