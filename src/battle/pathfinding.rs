//! Breadth-first pathfinding over the battle board
//!
//! Paths avoid hexes occupied by living units, except that both
//! endpoints are exempt (a unit stands on its own start hex, and the
//! goal is usually an enemy's hex). Tie-breaks follow the grid's
//! neighbor enumeration order.

use std::collections::VecDeque;

use ahash::AHashSet;

use crate::battle::grid::HexGrid;
use crate::battle::hex::Hex;

/// BFS path length from `start` to `goal`, or `None` if unreachable
pub fn path_length(grid: &HexGrid, start: Hex, goal: Hex, occupied: &AHashSet<Hex>) -> Option<u32> {
    shortest_path(grid, start, goal, occupied).map(|(len, _)| len)
}

/// BFS shortest path from `start` to `goal`.
///
/// Returns the path length and the first hex to step onto, or `None`
/// if no path exists. A zero-length path returns `start` itself.
pub fn shortest_path(
    grid: &HexGrid,
    start: Hex,
    goal: Hex,
    occupied: &AHashSet<Hex>,
) -> Option<(u32, Hex)> {
    if start == goal {
        return Some((0, start));
    }

    let mut queue: VecDeque<(Hex, Hex, u32)> = VecDeque::new();
    let mut visited: AHashSet<Hex> = AHashSet::new();
    visited.insert(start);
    queue.push_back((start, start, 0));

    while let Some((current, first_step, dist)) = queue.pop_front() {
        for nb in grid.neighbors(current) {
            if visited.contains(&nb) {
                continue;
            }
            visited.insert(nb);
            let step = if dist == 0 { nb } else { first_step };
            if nb == goal {
                return Some((dist + 1, step));
            }
            if !occupied.contains(&nb) {
                queue.push_back((nb, step, dist + 1));
            }
        }
    }
    None
}
