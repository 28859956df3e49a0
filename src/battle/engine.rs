//! Battle facade: construction, the step loop, rounds, snapshots and undo
//!
//! `step()` is the only driver. One invocation resolves one unit's turn
//! (or a round transition) and records everything observable in
//! `last_action`. The engine is single-threaded and synchronous; hosts
//! wanting parallel simulations run independent `Battle` values.

use std::collections::VecDeque;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::battle::abilities::Trigger;
use crate::battle::actions::{ActionKind, LastAction};
use crate::battle::constants::{COLS, STALEMATE_ROUNDS};
use crate::battle::deploy;
use crate::battle::dispatch::TriggerCtx;
use crate::battle::events::EffectEvent;
use crate::battle::grid::HexGrid;
use crate::battle::hex::Hex;
use crate::battle::pathfinding;
use crate::battle::rng::BattleRng;
use crate::battle::units::{Unit, UnitSpec};
use crate::core::error::{BattleError, Result};
use crate::core::types::{Player, UnitId, Winner};

/// Host-facing knobs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BattleOptions {
    /// Drain the effect queue after each fired ability (default).
    /// When false, events accumulate and drain at turn end.
    pub apply_events_immediately: bool,
    /// Push an undo snapshot on every step. Turn off for bulk
    /// simulation where undo is never needed.
    pub record_history: bool,
}

impl Default for BattleOptions {
    fn default() -> Self {
        Self {
            apply_events_immediately: true,
            record_history: true,
        }
    }
}

/// Compact per-round state used for stalemate detection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RoundSnapshot {
    entries: Vec<(UnitId, i32, Hex, i32, i32)>,
    unit_count: usize,
}

/// Full value-copy of the battle's mutable state, for undo
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct Snapshot {
    units: Vec<Unit>,
    turn_order: Vec<UnitId>,
    current_index: usize,
    round: u32,
    winner: Option<Winner>,
    log: Vec<String>,
    rng: BattleRng,
    stalemate_snapshots: VecDeque<RoundSnapshot>,
    stalemate_count: u8,
    last_action: LastAction,
    event_queue: VecDeque<EffectEvent>,
    next_unit_id: u32,
}

/// A battle between two armies on a hex map
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Battle {
    pub(crate) grid: HexGrid,
    pub(crate) units: Vec<Unit>,
    pub(crate) turn_order: Vec<UnitId>,
    pub(crate) current_index: usize,
    pub(crate) round: u32,
    pub(crate) winner: Option<Winner>,
    pub(crate) log: Vec<String>,
    pub(crate) rng: BattleRng,
    pub(crate) stalemate_snapshots: VecDeque<RoundSnapshot>,
    pub(crate) stalemate_count: u8,
    pub(crate) history: Vec<Snapshot>,
    pub(crate) last_action: LastAction,
    pub(crate) options: BattleOptions,
    pub(crate) event_queue: VecDeque<EffectEvent>,
    pub(crate) next_unit_id: u32,
    pub(crate) shadowstep_armed: bool,
    pub(crate) draining: bool,
}

impl Battle {
    /// Build a battle from two army spec lists and a seed.
    ///
    /// Construction is atomic: the first invalid spec aborts with an
    /// error and no battle is created.
    pub fn new(
        p1_specs: &[UnitSpec],
        p2_specs: &[UnitSpec],
        rng_seed: u64,
        options: BattleOptions,
    ) -> Result<Self> {
        for spec in p1_specs.iter().chain(p2_specs) {
            spec.validate()?;
        }
        let rows = deploy::compute_rows(p1_specs, p2_specs)?;
        let grid = HexGrid::new(COLS, rows);
        let mut rng = BattleRng::seed_from_u64(rng_seed);

        let mut next_unit_id: u32 = 1;
        let mut units: Vec<Unit> = Vec::new();
        let mut taken: AHashSet<Hex> = AHashSet::new();
        for (specs, player) in [(p1_specs, Player::One), (p2_specs, Player::Two)] {
            let mut auto_indices: Vec<usize> = Vec::new();
            for spec in specs {
                let built = spec.build(player, &mut next_unit_id);
                for unit in built {
                    let idx = units.len();
                    if let Some(pos) = spec.position {
                        if !grid.in_bounds(pos) {
                            return Err(BattleError::PositionOutOfBounds {
                                name: spec.name.clone(),
                                pos,
                            });
                        }
                        if !taken.insert(pos) {
                            return Err(BattleError::PositionOccupied {
                                name: spec.name.clone(),
                                pos,
                            });
                        }
                    } else {
                        auto_indices.push(idx);
                    }
                    units.push(unit);
                }
            }
            deploy::deploy_side(&grid, &mut units, &auto_indices, player, &mut taken, &mut rng)?;
        }

        let mut battle = Self {
            grid,
            units,
            turn_order: Vec::new(),
            current_index: 0,
            round: 0,
            winner: None,
            log: Vec::new(),
            rng,
            stalemate_snapshots: VecDeque::new(),
            stalemate_count: 0,
            history: Vec::new(),
            last_action: LastAction::default(),
            options,
            event_queue: VecDeque::new(),
            next_unit_id,
            shadowstep_armed: false,
            draining: false,
        };
        battle.new_round();
        Ok(battle)
    }

    // --- read-only views ---

    pub fn units(&self) -> &[Unit] {
        &self.units
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn winner(&self) -> Option<Winner> {
        self.winner
    }

    pub fn last_action(&self) -> &LastAction {
        &self.last_action
    }

    pub fn turn_order(&self) -> &[UnitId] {
        &self.turn_order
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn log(&self) -> &[String] {
        &self.log
    }

    pub fn cols(&self) -> i32 {
        self.grid.cols
    }

    pub fn rows(&self) -> i32 {
        self.grid.rows
    }

    // --- unit lookup ---

    pub(crate) fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.iter().find(|u| u.id == id)
    }

    pub(crate) fn unit_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.iter_mut().find(|u| u.id == id)
    }

    pub(crate) fn is_alive(&self, id: UnitId) -> bool {
        self.unit(id).map(|u| u.is_alive()).unwrap_or(false)
    }

    /// Hexes occupied by living units
    pub(crate) fn occupied(&self) -> AHashSet<Hex> {
        self.units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.pos)
            .collect()
    }

    fn side_has_living(&self, player: Player) -> bool {
        self.units
            .iter()
            .any(|u| u.is_alive() && u.player == player)
    }

    /// Living enemies of `player`, ID ascending
    pub(crate) fn living_enemies(&self, player: Player) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.is_alive() && u.player != player)
            .map(|u| u.id)
            .collect()
    }

    // --- step loop ---

    /// Execute one unit's turn. Returns `false` once the battle is over.
    ///
    /// Exactly one undo snapshot is pushed per call, even when the call
    /// crosses a round boundary. Calling again after termination is a
    /// pure no-op: nothing is pushed and `last_action` keeps the final
    /// action record.
    pub fn step(&mut self) -> bool {
        if self.winner.is_some() {
            return false;
        }
        self.push_snapshot();
        self.last_action = LastAction::default();
        self.step_inner()
    }

    /// The turn body; round transitions re-enter here without touching
    /// the undo stack
    fn step_inner(&mut self) -> bool {
        if !self.side_has_living(Player::One) {
            self.winner = Some(Winner::Player(Player::Two));
            self.log.push("Player 2 wins!".into());
            return false;
        }
        if !self.side_has_living(Player::Two) {
            self.winner = Some(Winner::Player(Player::One));
            self.log.push("Player 1 wins!".into());
            return false;
        }

        // advance to the next living, unfrozen unit
        let unit_id = loop {
            if self.current_index >= self.turn_order.len() {
                self.new_round();
                if self.winner.is_some() {
                    return false;
                }
                return self.step_inner();
            }
            let id = self.turn_order[self.current_index];
            let (alive, frozen) = match self.unit(id) {
                Some(u) => (u.is_alive(), u.frozen_turns > 0),
                None => (false, false),
            };
            if !alive {
                self.current_index += 1;
                continue;
            }
            if frozen {
                if let Some(u) = self.unit_mut(id) {
                    u.frozen_turns -= 1;
                    u.has_acted = true;
                }
                self.log.push(format!("unit {} is frozen and skips a turn", id.0));
                self.current_index += 1;
                continue;
            }
            break id;
        };

        if !self.take_turn(unit_id) {
            return false;
        }

        let ready = self
            .unit(unit_id)
            .map(|u| u.ready_triggered)
            .unwrap_or(false);
        if let Some(u) = self.unit_mut(unit_id) {
            if ready {
                u.ready_triggered = false;
            } else {
                u.has_acted = true;
            }
        }
        self.current_index += 1;
        self.check_runtime_guards();
        true
    }

    /// Resolve one unit's turn. Returns `false` if the battle ended
    /// mid-turn (all enemies already dead).
    fn take_turn(&mut self, unit_id: UnitId) -> bool {
        self.shadowstep_armed = false;
        self.trigger_abilities(unit_id, Trigger::TurnStart, &TriggerCtx { target: None });

        // chain reactions during turnstart may have killed the unit
        if !self.is_alive(unit_id) {
            self.end_of_turn(unit_id);
            return true;
        }

        let (player, pos, range) = match self.unit(unit_id) {
            Some(u) => (u.player, u.pos, u.attack_range),
            None => return true,
        };
        let enemies = self.living_enemies(player);
        if enemies.is_empty() {
            self.winner = Some(Winner::Player(player));
            self.log.push(format!(
                "Player {} wins!",
                if player == Player::One { 1 } else { 2 }
            ));
            return false;
        }

        let in_range: Vec<UnitId> = enemies
            .iter()
            .copied()
            .filter(|&e| {
                self.unit(e)
                    .map(|u| pos.distance(&u.pos) <= range)
                    .unwrap_or(false)
            })
            .collect();

        if let Some(&target_id) = self.rng.choice(&in_range) {
            let (ranged, killed) = self.perform_attack(unit_id, target_id);
            self.last_action.kind = ActionKind::Attack;
            self.last_action.attacker_pos = Some(pos);
            self.last_action.target_pos = self.unit(target_id).map(|u| u.pos);
            self.last_action.ranged = ranged;
            self.last_action.killed = killed;
            self.trigger_abilities(
                unit_id,
                Trigger::OnHit,
                &TriggerCtx {
                    target: Some(target_id),
                },
            );
        } else {
            self.movement_phase(unit_id, &enemies);
        }

        self.end_of_turn(unit_id);
        true
    }

    fn end_of_turn(&mut self, unit_id: UnitId) {
        self.trigger_abilities(unit_id, Trigger::EndTurn, &TriggerCtx { target: None });
        if !self.options.apply_events_immediately {
            self.drain_events();
        }
        self.shadowstep_armed = false;
    }

    /// Move toward the closest enemy, then attack if one came into range
    fn movement_phase(&mut self, unit_id: UnitId, enemies: &[UnitId]) {
        let (pos, range, speed) = match self.unit(unit_id) {
            Some(u) => (u.pos, u.attack_range, u.speed),
            None => return,
        };
        let mut occupied = self.occupied();
        occupied.remove(&pos);

        // closest enemy by BFS path length, unreachable last, ties by ID
        let mut target: Option<(u64, UnitId, Hex)> = None;
        for &eid in enemies {
            let Some(epos) = self.unit(eid).map(|u| u.pos) else {
                continue;
            };
            let len = pathfinding::path_length(&self.grid, pos, epos, &occupied)
                .map(u64::from)
                .unwrap_or(u64::MAX);
            if target.map(|(best, _, _)| len < best).unwrap_or(true) {
                target = Some((len, eid, epos));
            }
        }
        let Some((path_len, _, target_pos)) = target else {
            return;
        };

        let old = pos;
        let mut moved = false;

        if self.shadowstep_armed {
            if let Some(dest) = self.shadowstep_destination(pos, enemies, &occupied) {
                if let Some(u) = self.unit_mut(unit_id) {
                    u.pos = dest;
                }
                self.log
                    .push(format!("unit {} shadowsteps {:?}->{:?}", unit_id.0, old, dest));
                moved = true;
            }
        }

        if !moved && path_len != u64::MAX && path_len > 1 {
            if let Some((_, first)) = pathfinding::shortest_path(&self.grid, pos, target_pos, &occupied)
            {
                if let Some(u) = self.unit_mut(unit_id) {
                    u.pos = first;
                }
                self.log
                    .push(format!("unit {} moves {:?}->{:?}", unit_id.0, old, first));
                moved = true;

                // speed bonus: a chance at one extra hex
                if speed > 1.0 && self.rng.uniform() < speed - 1.0 {
                    let here = first;
                    let mut occupied = self.occupied();
                    occupied.remove(&here);
                    if let Some((len2, second)) =
                        pathfinding::shortest_path(&self.grid, here, target_pos, &occupied)
                    {
                        if len2 > 1 {
                            if let Some(u) = self.unit_mut(unit_id) {
                                u.pos = second;
                            }
                            self.log
                                .push(format!("  speed! unit {} moves {:?}->{:?}", unit_id.0, here, second));
                        }
                    }
                }
            }
        }

        if !moved {
            // nowhere to go; the turn is a skip
            self.last_action.kind = ActionKind::Skip;
            self.last_action.attacker_pos = Some(old);
            return;
        }

        let new_pos = match self.unit(unit_id) {
            Some(u) => u.pos,
            None => return,
        };
        let in_range: Vec<UnitId> = enemies
            .iter()
            .copied()
            .filter(|&e| {
                self.unit(e)
                    .map(|u| u.is_alive() && new_pos.distance(&u.pos) <= range)
                    .unwrap_or(false)
            })
            .collect();

        if let Some(&target_id) = self.rng.choice(&in_range) {
            let (ranged, killed) = self.perform_attack(unit_id, target_id);
            self.last_action.kind = ActionKind::MoveAttack;
            self.last_action.from = Some(old);
            self.last_action.to = Some(new_pos);
            self.last_action.target_pos = self.unit(target_id).map(|u| u.pos);
            self.last_action.ranged = ranged;
            self.last_action.killed = killed;
            self.trigger_abilities(
                unit_id,
                Trigger::OnHit,
                &TriggerCtx {
                    target: Some(target_id),
                },
            );
        } else {
            self.last_action.kind = ActionKind::Move;
            self.last_action.from = Some(old);
            self.last_action.to = Some(new_pos);
        }
    }

    /// Hex adjacent to the furthest living enemy (BFS length, ties by
    /// lowest ID), first free neighbor in enumeration order
    fn shadowstep_destination(
        &self,
        from: Hex,
        enemies: &[UnitId],
        occupied: &AHashSet<Hex>,
    ) -> Option<Hex> {
        let mut furthest: Option<(u64, UnitId, Hex)> = None;
        for &eid in enemies {
            let epos = self.unit(eid)?.pos;
            let len = pathfinding::path_length(&self.grid, from, epos, occupied)
                .map(u64::from)
                .unwrap_or(u64::MAX);
            if furthest.map(|(best, _, _)| len > best).unwrap_or(true) {
                furthest = Some((len, eid, epos));
            }
        }
        let (_, _, anchor) = furthest?;
        self.grid
            .neighbors(anchor)
            .into_iter()
            .find(|nb| !occupied.contains(nb))
    }

    // --- rounds ---

    /// Start a new round: stalemate check, fresh shuffle, flag reset
    pub(crate) fn new_round(&mut self) {
        self.round += 1;

        let snap = self.round_snapshot();
        match self.stalemate_snapshots.back() {
            Some(prev) if *prev == snap => self.stalemate_count += 1,
            _ => self.stalemate_count = 0,
        }
        self.stalemate_snapshots.push_back(snap);
        while self.stalemate_snapshots.len() > STALEMATE_ROUNDS as usize {
            self.stalemate_snapshots.pop_front();
        }
        if self.stalemate_count >= STALEMATE_ROUNDS {
            self.winner = Some(Winner::Draw);
            self.log
                .push("Stalemate - no progress possible. Battle is a draw!".into());
            return;
        }

        let mut order: Vec<UnitId> = self
            .units
            .iter()
            .filter(|u| u.is_alive())
            .map(|u| u.id)
            .collect();
        self.rng.shuffle(&mut order);
        self.turn_order = order;
        self.current_index = 0;
        for unit in self.units.iter_mut().filter(|u| u.is_alive()) {
            unit.has_acted = false;
            unit.block_used = 0;
        }
        self.log.push(format!("--- Round {} ---", self.round));
    }

    fn round_snapshot(&self) -> RoundSnapshot {
        RoundSnapshot {
            entries: self
                .units
                .iter()
                .filter(|u| u.is_alive())
                .map(|u| (u.id, u.hp, u.pos, u.armor, u.damage))
                .collect(),
            unit_count: self.units.len(),
        }
    }

    // --- snapshots and undo ---

    fn push_snapshot(&mut self) {
        if !self.options.record_history {
            return;
        }
        let snapshot = Snapshot {
            units: self.units.clone(),
            turn_order: self.turn_order.clone(),
            current_index: self.current_index,
            round: self.round,
            winner: self.winner,
            log: self.log.clone(),
            rng: self.rng.clone(),
            stalemate_snapshots: self.stalemate_snapshots.clone(),
            stalemate_count: self.stalemate_count,
            last_action: self.last_action.clone(),
            event_queue: self.event_queue.clone(),
            next_unit_id: self.next_unit_id,
        };
        self.history.push(snapshot);
    }

    /// Restore the state before the most recent `step()`, including the
    /// RNG stream. Returns `false` if there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.units = snapshot.units;
        self.turn_order = snapshot.turn_order;
        self.current_index = snapshot.current_index;
        self.round = snapshot.round;
        self.winner = snapshot.winner;
        self.log = snapshot.log;
        self.rng = snapshot.rng;
        self.stalemate_snapshots = snapshot.stalemate_snapshots;
        self.stalemate_count = snapshot.stalemate_count;
        self.last_action = snapshot.last_action;
        self.event_queue = snapshot.event_queue;
        self.next_unit_id = snapshot.next_unit_id;
        true
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    // --- runtime guards ---

    /// Invariant check after each step. A violation is an engine bug;
    /// the battle is marked drawn so the host can salvage the session.
    fn check_runtime_guards(&mut self) {
        let mut seen: AHashSet<Hex> = AHashSet::new();
        for unit in self.units.iter().filter(|u| u.is_alive()) {
            if !seen.insert(unit.pos) {
                log::error!(
                    "occupancy invariant violated at {:?}; aborting battle",
                    unit.pos
                );
                self.log
                    .push(format!("engine fault: double occupancy at {:?}", unit.pos));
                self.winner = Some(Winner::Draw);
                return;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::abilities::{Ability, Effect, TargetKind, Trigger};

    fn duel(p1: UnitSpec, p2: UnitSpec, seed: u64) -> Battle {
        Battle::new(&[p1], &[p2], seed, BattleOptions::default()).expect("valid duel specs")
    }

    #[test]
    fn test_construction_rejects_bad_spec() {
        let bad = UnitSpec::new("Broken", 0, 1, 1);
        let ok = UnitSpec::new("Page", 3, 1, 1);
        assert!(Battle::new(&[bad], &[ok], 1, BattleOptions::default()).is_err());
    }

    #[test]
    fn test_construction_rejects_out_of_bounds_position() {
        let p1 = UnitSpec::new("Page", 3, 1, 1).at(40, 2);
        let p2 = UnitSpec::new("Foe", 3, 1, 1);
        assert!(matches!(
            Battle::new(&[p1], &[p2], 1, BattleOptions::default()),
            Err(BattleError::PositionOutOfBounds { .. })
        ));
    }

    #[test]
    fn test_construction_rejects_colliding_positions() {
        let p1 = UnitSpec::new("Page", 3, 1, 1).at(8, 2);
        let p2 = UnitSpec::new("Foe", 3, 1, 1).at(8, 2);
        assert!(matches!(
            Battle::new(&[p1], &[p2], 1, BattleOptions::default()),
            Err(BattleError::PositionOccupied { .. })
        ));
    }

    #[test]
    fn test_first_round_is_one_and_order_covers_all() {
        let b = duel(
            UnitSpec::new("Page", 3, 1, 1),
            UnitSpec::new("Foe", 3, 1, 1),
            1,
        );
        assert_eq!(b.round(), 1);
        assert_eq!(b.turn_order().len(), 2);
        assert_eq!(b.winner(), None);
    }

    #[test]
    fn test_adjacent_duel_produces_winner() {
        let p1 = UnitSpec::new("Bruiser", 10, 3, 1).at(8, 2);
        let p2 = UnitSpec::new("Victim", 6, 0, 1).at(9, 2);
        let mut b = duel(p1, p2, 1);
        let mut steps = 0;
        while b.step() {
            steps += 1;
            assert!(steps < 100, "duel must end quickly");
        }
        assert_eq!(b.winner(), Some(Winner::Player(Player::One)));
        let victim = &b.units()[1];
        assert!(!victim.is_alive());
    }

    #[test]
    fn test_attack_is_recorded_in_last_action() {
        let p1 = UnitSpec::new("Bruiser", 10, 3, 1).at(8, 2);
        let p2 = UnitSpec::new("Wall", 50, 0, 1).at(9, 2);
        let mut b = duel(p1, p2, 1);
        let mut saw_attack = false;
        for _ in 0..6 {
            if !b.step() {
                break;
            }
            if b.last_action().kind == ActionKind::Attack {
                saw_attack = true;
                assert!(b.last_action().attacker_pos.is_some());
                assert!(b.last_action().target_pos.is_some());
                assert!(!b.last_action().ranged);
            }
        }
        assert!(saw_attack);
    }

    #[test]
    fn test_move_closes_distance() {
        let p1 = UnitSpec::new("Walker", 10, 1, 1).at(2, 2);
        let p2 = UnitSpec::new("Target", 50, 0, 1).at(14, 2);
        let mut b = duel(p1, p2, 3);
        b.step();
        b.step();
        let walker = &b.units()[0];
        let target = &b.units()[1];
        assert!(walker.pos.distance(&target.pos) < 12 || target.pos.distance(&walker.pos) < 12);
        let action = b.last_action();
        assert_eq!(action.kind, ActionKind::Move);
        assert!(action.from.is_some() && action.to.is_some());
    }

    #[test]
    fn test_undo_pops_one_snapshot() {
        let p1 = UnitSpec::new("Bruiser", 10, 3, 1).at(8, 2);
        let p2 = UnitSpec::new("Wall", 50, 0, 1).at(9, 2);
        let mut b = duel(p1, p2, 1);
        b.step();
        b.step();
        let depth = b.history_len();
        assert!(b.undo());
        assert_eq!(b.history_len(), depth - 1);
    }

    #[test]
    fn test_undo_on_empty_history_fails() {
        let p1 = UnitSpec::new("Page", 3, 1, 1);
        let p2 = UnitSpec::new("Foe", 3, 1, 1);
        let mut b = duel(p1, p2, 1);
        assert!(!b.undo());
    }

    #[test]
    fn test_record_history_off_disables_undo() {
        let p1 = UnitSpec::new("Page", 3, 1, 1);
        let p2 = UnitSpec::new("Foe", 3, 1, 1);
        let options = BattleOptions {
            record_history: false,
            ..BattleOptions::default()
        };
        let mut b = Battle::new(&[p1], &[p2], 1, options).expect("valid specs");
        b.step();
        assert_eq!(b.history_len(), 0);
        assert!(!b.undo());
    }

    #[test]
    fn test_zero_damage_duel_ends_in_stalemate_draw() {
        let p1 = UnitSpec::new("Pacifist", 10, 0, 1).at(8, 2);
        let p2 = UnitSpec::new("Pacifist", 10, 0, 1).at(9, 2);
        let mut b = duel(p1, p2, 1);
        let mut steps = 0;
        while b.step() {
            steps += 1;
            assert!(steps < 100, "stalemate must be detected");
        }
        assert_eq!(b.winner(), Some(Winner::Draw));
    }

    #[test]
    fn test_ready_leaves_killer_unacted() {
        let p1 = UnitSpec::new("Fodder", 1, 0, 1).at(8, 2);
        let extra = UnitSpec::new("Fodder", 1, 0, 1).at(8, 3);
        let p2 = UnitSpec::new("Emperor", 100, 10, 1)
            .at(9, 2)
            .with_ability(Ability::new(
                Trigger::OnKill,
                Effect::Ready,
                TargetKind::SelfUnit,
                0,
            ));
        let mut b = Battle::new(&[p1, extra], &[p2], 1, BattleOptions::default())
            .expect("valid specs");
        let mut ready_observed = false;
        let mut steps = 0;
        while b.step() {
            steps += 1;
            assert!(steps < 50);
            if b.last_action().killed {
                // the ready flag was consumed instead of marking the
                // emperor as having acted
                let emperor = &b.units()[2];
                assert!(!emperor.ready_triggered);
                if !emperor.has_acted {
                    ready_observed = true;
                }
            }
        }
        assert!(ready_observed, "ready must fire on kill");
        assert_eq!(b.winner(), Some(Winner::Player(Player::Two)));
    }

    #[test]
    fn test_frozen_unit_skips_and_thaws() {
        let p1 = UnitSpec::new("Victim", 10, 0, 1).at(8, 2);
        let p2 = UnitSpec::new("Freezer", 10, 0, 1)
            .at(9, 2)
            .with_ability(
                Ability::new(Trigger::EndTurn, Effect::Freeze, TargetKind::Area, 2).with_range(1),
            );
        let mut b = duel(p1, p2, 1);
        let mut frozen_seen = false;
        for _ in 0..20 {
            if !b.step() {
                break;
            }
            if b.units()[0].frozen_turns > 0 {
                frozen_seen = true;
            }
        }
        assert!(frozen_seen, "freeze must land on the victim");
    }
}
