//! Battle board: a fixed-width hex grid with bounds checks and
//! neighbor enumeration.
//!
//! Neighbor order is part of the engine contract: BFS tie-breaks and
//! summon placement depend on it. Neighbors are enumerated clockwise
//! starting at north-east: NE, E, SE, SW, W, NW.

use serde::{Deserialize, Serialize};

use crate::battle::hex::Hex;

/// Offsets per row parity, clockwise from north-east
const EVEN_ROW_DIRS: [(i32, i32); 6] = [(0, -1), (1, 0), (0, 1), (-1, 1), (-1, 0), (-1, -1)];
const ODD_ROW_DIRS: [(i32, i32); 6] = [(1, -1), (1, 0), (1, 1), (0, 1), (-1, 0), (0, -1)];

/// The battle board dimensions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexGrid {
    pub cols: i32,
    pub rows: i32,
}

impl HexGrid {
    pub fn new(cols: i32, rows: i32) -> Self {
        Self { cols, rows }
    }

    /// Check if coordinate is within map bounds
    pub fn in_bounds(&self, hex: Hex) -> bool {
        hex.col >= 0 && hex.col < self.cols && hex.row >= 0 && hex.row < self.rows
    }

    /// In-bounds neighbors of a hex, clockwise from north-east
    pub fn neighbors(&self, hex: Hex) -> Vec<Hex> {
        let dirs = if hex.row & 1 == 0 {
            &EVEN_ROW_DIRS
        } else {
            &ODD_ROW_DIRS
        };
        dirs.iter()
            .map(|&(dc, dr)| Hex::new(hex.col + dc, hex.row + dr))
            .filter(|nb| self.in_bounds(*nb))
            .collect()
    }
}
