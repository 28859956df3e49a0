//! Core type definitions used throughout the engine

use serde::{Deserialize, Serialize};

/// Unique identifier for units within a battle.
///
/// IDs are assigned sequentially from 1 in creation order (army setup,
/// then summons), so the unit vector is always ID-ordered and ID-based
/// tie-breaks are deterministic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// One of the two sides of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One,
    Two,
}

impl Player {
    pub fn opponent(&self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

/// Terminal outcome of a battle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Winner {
    Player(Player),
    Draw,
}
