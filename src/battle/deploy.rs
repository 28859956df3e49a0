//! Army deployment: board sizing and range-tier placement
//!
//! Each side owns a six-column zone. Units sort by attack range,
//! shortest first; the frontline column is filled before falling back
//! toward the board edge, and a new range tier always starts a fresh
//! column. Rows are center-packed and shuffled for variety.

use ahash::AHashSet;

use crate::battle::constants::{COLS, MAX_ROWS, MIN_ROWS, P1_ZONE_END, P2_ZONE_START};
use crate::battle::grid::HexGrid;
use crate::battle::hex::Hex;
use crate::battle::rng::BattleRng;
use crate::battle::units::{Unit, UnitSpec};
use crate::core::error::{BattleError, Result};
use crate::core::types::Player;

/// Units of the smallest range tier, which all want the front column
fn frontline_count(specs: &[UnitSpec]) -> u32 {
    let min_range = match specs.iter().map(|s| s.range).min() {
        Some(r) => r,
        None => return 0,
    };
    specs
        .iter()
        .filter(|s| s.range == min_range)
        .map(|s| s.count)
        .sum()
}

fn side_total(specs: &[UnitSpec]) -> u32 {
    specs.iter().map(|s| s.count).sum()
}

/// Board height: enough rows for the bigger frontline and for the whole
/// army to fit its six-column zone, clamped to the legal band
pub(crate) fn compute_rows(p1_specs: &[UnitSpec], p2_specs: &[UnitSpec]) -> Result<i32> {
    let zone_cols = P1_ZONE_END as u32;
    let mut needed = 0u32;
    for specs in [p1_specs, p2_specs] {
        needed = needed
            .max(frontline_count(specs))
            .max(side_total(specs).div_ceil(zone_cols));
    }
    for spec in p1_specs.iter().chain(p2_specs) {
        if let Some(pos) = spec.position {
            needed = needed.max(pos.row.max(0) as u32 + 1);
        }
    }
    let rows = (needed as i32).clamp(MIN_ROWS, MAX_ROWS);

    for (specs, player) in [(p1_specs, Player::One), (p2_specs, Player::Two)] {
        if side_total(specs) > zone_cols * rows as u32 {
            return Err(BattleError::ArmyTooLarge { player });
        }
    }
    Ok(rows)
}

/// Place every auto-deployed unit of one side.
///
/// `auto_indices` point into `units`; explicitly positioned hexes are
/// already in `taken` and stay untouched.
pub(crate) fn deploy_side(
    grid: &HexGrid,
    units: &mut [Unit],
    auto_indices: &[usize],
    player: Player,
    taken: &mut AHashSet<Hex>,
    rng: &mut BattleRng,
) -> Result<()> {
    if auto_indices.is_empty() {
        return Ok(());
    }

    // shortest range first; shuffle within each tier to interleave
    // different unit types
    let mut order: Vec<usize> = auto_indices.to_vec();
    order.sort_by_key(|&i| (units[i].attack_range, units[i].id));
    let mut shuffled: Vec<usize> = Vec::with_capacity(order.len());
    let mut start = 0;
    while start < order.len() {
        let tier = units[order[start]].attack_range;
        let mut end = start;
        while end < order.len() && units[order[end]].attack_range == tier {
            end += 1;
        }
        let mut group = order[start..end].to_vec();
        rng.shuffle(&mut group);
        shuffled.extend(group);
        start = end;
    }

    let columns: Vec<i32> = match player {
        Player::One => (0..P1_ZONE_END).rev().collect(),
        Player::Two => (P2_ZONE_START..COLS).collect(),
    };
    let free_rows: Vec<Vec<i32>> = columns
        .iter()
        .map(|&c| {
            (0..grid.rows)
                .filter(|&r| !taken.contains(&Hex::new(c, r)))
                .collect()
        })
        .collect();

    // walk columns front to back; a new range tier or a full column
    // advances to the next one
    let mut col_units: Vec<Vec<usize>> = vec![Vec::new(); columns.len()];
    let mut ci = 0usize;
    let mut prev_range: Option<u32> = None;
    for &ui in &shuffled {
        let range = units[ui].attack_range;
        if prev_range.is_some() && prev_range != Some(range) && !col_units[ci].is_empty() {
            ci += 1;
        }
        while ci < columns.len() && col_units[ci].len() >= free_rows[ci].len() {
            ci += 1;
        }
        if ci >= columns.len() {
            return Err(BattleError::ArmyTooLarge { player });
        }
        col_units[ci].push(ui);
        prev_range = Some(range);
    }

    // center-pack each column's rows, then shuffle the assignment
    for (k, &col) in columns.iter().enumerate() {
        let assigned = &col_units[k];
        if assigned.is_empty() {
            continue;
        }
        let rows = &free_rows[k];
        let mid = rows[rows.len() / 2];
        let mut picked = rows.clone();
        picked.sort_by_key(|&r| ((r - mid).abs(), r));
        picked.truncate(assigned.len());
        picked.sort_unstable();
        let mut positions: Vec<Hex> = picked.into_iter().map(|r| Hex::new(col, r)).collect();
        rng.shuffle(&mut positions);
        for (&ui, pos) in assigned.iter().zip(positions) {
            units[ui].pos = pos;
            taken.insert(pos);
        }
    }
    Ok(())
}
