//! Trigger dispatch: charge gating, target resolution and the active
//! effect handlers
//!
//! Passive effects (block, armor, boost, execute, undying, lament_aura)
//! never pass through here; the damage pipeline and death scan query
//! them directly.

use crate::battle::abilities::{Ability, Effect, TargetKind, Trigger};
use crate::battle::engine::Battle;
use crate::battle::events::EventKind;
use crate::battle::hex::{push_direction, Hex};
use crate::battle::units::Unit;
use crate::core::types::UnitId;

/// Context handed to every fired ability
#[derive(Debug, Clone, Copy)]
pub(crate) struct TriggerCtx {
    /// The unit this trigger is about: the victim for onhit, the
    /// deceased for onkill. Absent for turnstart/endturn/wounded.
    pub target: Option<UnitId>,
}

impl Battle {
    /// Fire all of a unit's abilities matching `trigger`, in
    /// declaration order. Silenced or dead units fire nothing.
    pub(crate) fn trigger_abilities(&mut self, unit_id: UnitId, trigger: Trigger, ctx: &TriggerCtx) {
        let ability_count = match self.unit(unit_id) {
            Some(u) => u.abilities.len(),
            None => return,
        };
        for idx in 0..ability_count {
            let ability = match self.unit(unit_id) {
                Some(u) if u.is_alive() && !u.silenced => match u.abilities.get(idx) {
                    Some(ab) if ab.trigger == trigger => ab.clone(),
                    _ => continue,
                },
                _ => return,
            };
            if !self.charge_ready(unit_id, idx) {
                continue;
            }
            self.execute_ability(unit_id, &ability, ctx);
            if self.options.apply_events_immediately {
                self.drain_events();
            }
        }
    }

    /// Advance an ability's charge counter; true when it should fire
    pub(crate) fn charge_ready(&mut self, unit_id: UnitId, ability_idx: usize) -> bool {
        let Some(unit) = self.unit_mut(unit_id) else {
            return false;
        };
        let charge = match unit.abilities.get(ability_idx) {
            Some(ab) => ab.charge(),
            None => return false,
        };
        let Some(counter) = unit.charge_counters.get_mut(ability_idx) else {
            return false;
        };
        *counter += 1;
        if *counter < charge {
            false
        } else {
            *counter = 0;
            true
        }
    }

    /// Run one fired ability's effect
    pub(crate) fn execute_ability(&mut self, unit_id: UnitId, ability: &Ability, ctx: &TriggerCtx) {
        let value = ability.value();
        match ability.effect {
            Effect::Heal | Effect::Fortify => {
                let kind = if ability.effect == Effect::Heal {
                    EventKind::Heal
                } else {
                    EventKind::Fortify
                };
                for target in self.resolve_targets(unit_id, ability, ctx) {
                    self.queue_event(kind, unit_id, target, value, None);
                }
            }
            Effect::Strike => {
                let source_pos = self.unit(unit_id).map(|u| u.pos);
                for target in self.resolve_targets(unit_id, ability, ctx) {
                    self.queue_event(EventKind::Strike, unit_id, target, value, source_pos);
                }
            }
            Effect::Sunder => {
                let source_pos = self.unit(unit_id).map(|u| u.pos);
                for target in self.resolve_targets(unit_id, ability, ctx) {
                    self.queue_event(EventKind::Sunder, unit_id, target, value, source_pos);
                }
            }
            Effect::Splash => {
                // splash radiates from the context target even if the
                // triggering hit just killed it
                if let Some(primary) = ctx.target {
                    self.queue_splash_events(unit_id, primary, value);
                }
            }
            Effect::Ramp => {
                let pos = match self.unit_mut(unit_id) {
                    Some(u) => {
                        u.ramp(value);
                        u.pos
                    }
                    None => return,
                };
                self.last_action.ramp_pos = Some(pos);
                self.log
                    .push(format!("  unit {} ramps damage by {}", unit_id.0, value));
            }
            Effect::Push => {
                let targets = self.resolve_targets(unit_id, ability, ctx);
                if let Some(&target) = targets.first() {
                    self.apply_push(unit_id, target, value);
                }
            }
            Effect::Retreat => {
                if let Some(target) = ctx.target {
                    self.apply_retreat(unit_id, target);
                }
            }
            Effect::Freeze => {
                for target in self.resolve_targets(unit_id, ability, ctx) {
                    if let Some(t) = self.unit_mut(target) {
                        t.frozen_turns = t.frozen_turns.max(value as u32);
                    }
                    self.log.push(format!("  unit {} is frozen", target.0));
                }
            }
            Effect::Summon => {
                self.apply_summon(unit_id, value, ability.summon_ready);
            }
            Effect::Shadowstep => {
                // consumed by the movement phase of this turn
                self.shadowstep_armed = true;
            }
            Effect::Silence => {
                for target in self.resolve_targets(unit_id, ability, ctx) {
                    let newly = match self.unit_mut(target) {
                        Some(t) if !t.silenced => {
                            t.silenced = true;
                            true
                        }
                        _ => false,
                    };
                    if newly {
                        self.log
                            .push(format!("  unit {} silences unit {}", unit_id.0, target.0));
                    }
                }
            }
            Effect::Ready => {
                if let Some(u) = self.unit_mut(unit_id) {
                    u.ready_triggered = true;
                }
                self.log
                    .push(format!("  unit {} readies for another action", unit_id.0));
            }
            Effect::Block
            | Effect::Execute
            | Effect::Armor
            | Effect::Boost
            | Effect::Undying
            | Effect::LamentAura => {}
        }
    }

    /// Resolve the target set for a fired ability
    pub(crate) fn resolve_targets(
        &mut self,
        unit_id: UnitId,
        ability: &Ability,
        ctx: &TriggerCtx,
    ) -> Vec<UnitId> {
        let (player, pos, attack_range) = match self.unit(unit_id) {
            Some(u) => (u.player, u.pos, u.attack_range),
            None => return Vec::new(),
        };
        let range = ability.range.unwrap_or(attack_range);

        match ability.target {
            TargetKind::SelfUnit => vec![unit_id],
            TargetKind::Target => ctx
                .target
                .filter(|&t| self.is_alive(t))
                .into_iter()
                .collect(),
            TargetKind::Global => {
                let want_enemies = ability.effect.is_offensive();
                self.units
                    .iter()
                    .filter(|u| u.is_alive() && (u.player != player) == want_enemies)
                    .map(|u| u.id)
                    .collect()
            }
            TargetKind::Random | TargetKind::Area => {
                let pool: Vec<UnitId> = if ability.effect.is_supportive() {
                    self.units
                        .iter()
                        .filter(|u| {
                            u.is_alive()
                                && u.player == player
                                && pos.distance(&u.pos) <= range
                                && (ability.effect != Effect::Heal || u.hp < u.max_hp)
                        })
                        .map(|u| u.id)
                        .collect()
                } else {
                    self.units
                        .iter()
                        .filter(|u| {
                            u.is_alive() && u.player != player && pos.distance(&u.pos) <= range
                        })
                        .map(|u| u.id)
                        .collect()
                };
                if ability.target == TargetKind::Area {
                    pool
                } else {
                    self.rng.choice(&pool).copied().into_iter().collect()
                }
            }
        }
    }

    /// Splash strikes every enemy adjacent to the primary target
    pub(crate) fn queue_splash_events(&mut self, attacker_id: UnitId, primary: UnitId, amount: i32) {
        let (primary_pos, attacker_player) = match (self.unit(primary), self.unit(attacker_id)) {
            (Some(p), Some(a)) => (p.pos, a.player),
            _ => return,
        };
        let victims: Vec<UnitId> = self
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && u.player != attacker_player
                    && u.id != primary
                    && u.pos.distance(&primary_pos) <= 1
            })
            .map(|u| u.id)
            .collect();
        for victim in victims {
            self.queue_event(EventKind::Splash, attacker_id, victim, amount, None);
        }
    }

    /// Shove the target horizontally away, stopping at the first
    /// blocked or out-of-bounds hex
    pub(crate) fn apply_push(&mut self, pusher_id: UnitId, target_id: UnitId, value: i32) {
        if value <= 0 {
            return;
        }
        let (pusher_pos, target_pos, target_alive) =
            match (self.unit(pusher_id), self.unit(target_id)) {
                (Some(p), Some(t)) => (p.pos, t.pos, t.is_alive()),
                _ => return,
            };
        if !target_alive {
            return;
        }
        let dir = push_direction(pusher_pos, target_pos);
        let mut occupied = self.occupied();
        occupied.remove(&target_pos);

        let row = target_pos.row;
        let mut col = target_pos.col;
        for _ in 0..value {
            let next = Hex::new(col + dir, row);
            if !self.grid.in_bounds(next) || occupied.contains(&next) {
                break;
            }
            col = next.col;
        }
        let dest = Hex::new(col, row);
        if dest != target_pos {
            if let Some(t) = self.unit_mut(target_id) {
                t.pos = dest;
            }
            self.log.push(format!(
                "  unit {} pushed {:?}->{:?}",
                target_id.0, target_pos, dest
            ));
            self.last_action.push_from = Some(target_pos);
            self.last_action.push_to = Some(dest);
        }
    }

    /// Step one hex away from the context target, preferring the
    /// greatest resulting distance; first in neighbor order wins ties
    pub(crate) fn apply_retreat(&mut self, unit_id: UnitId, from_target: UnitId) {
        let (pos, target_pos) = match (self.unit(unit_id), self.unit(from_target)) {
            (Some(u), Some(t)) => (u.pos, t.pos),
            _ => return,
        };
        let mut occupied = self.occupied();
        occupied.remove(&pos);
        let current = pos.distance(&target_pos);

        let mut best: Option<(u32, Hex)> = None;
        for nb in self.grid.neighbors(pos) {
            if occupied.contains(&nb) {
                continue;
            }
            let d = nb.distance(&target_pos);
            if d > current && best.map(|(bd, _)| d > bd).unwrap_or(true) {
                best = Some((d, nb));
            }
        }
        if let Some((_, dest)) = best {
            if let Some(u) = self.unit_mut(unit_id) {
                u.pos = dest;
            }
            self.log
                .push(format!("  unit {} retreats to {:?}", unit_id.0, dest));
        }
    }

    /// Create up to `value` Blades on free hexes adjacent to the
    /// summoner, in neighbor order
    pub(crate) fn apply_summon(&mut self, unit_id: UnitId, value: i32, summon_ready: bool) {
        if value <= 0 {
            return;
        }
        let (anchor, player, alive) = match self.unit(unit_id) {
            Some(u) => (u.pos, u.player, u.is_alive()),
            None => return,
        };
        if !alive {
            return;
        }
        let mut occupied = self.occupied();
        let mut spawned = 0usize;
        for nb in self.grid.neighbors(anchor) {
            if spawned as i32 >= value {
                break;
            }
            if occupied.contains(&nb) {
                continue;
            }
            let id = UnitId(self.next_unit_id);
            self.next_unit_id += 1;
            let mut blade = Unit::summoned(id, player, nb, unit_id);
            blade.has_acted = !summon_ready;
            if summon_ready {
                let at = (self.current_index + 1 + spawned).min(self.turn_order.len());
                self.turn_order.insert(at, id);
            }
            self.units.push(blade);
            occupied.insert(nb);
            spawned += 1;
        }
        if spawned > 0 {
            self.log
                .push(format!("  unit {} summons {} Blade(s)", unit_id.0, spawned));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::engine::{Battle, BattleOptions};
    use crate::battle::units::UnitSpec;
    use crate::core::types::Player;

    fn battle(p1: Vec<UnitSpec>, p2: Vec<UnitSpec>, seed: u64) -> Battle {
        Battle::new(&p1, &p2, seed, BattleOptions::default()).expect("valid specs")
    }

    #[test]
    fn test_charge_gates_every_nth_trigger() {
        let spec = UnitSpec::new("Herald", 10, 1, 1).with_ability(
            Ability::new(Trigger::EndTurn, Effect::Fortify, TargetKind::SelfUnit, 1).with_charge(3),
        );
        let mut b = battle(vec![spec.at(2, 2)], vec![UnitSpec::new("Foe", 50, 0, 1).at(14, 2)], 1);
        let herald = b.units()[0].id;
        // two increments: no fire
        assert!(!b.charge_ready(herald, 0));
        assert!(!b.charge_ready(herald, 0));
        // third: fires and resets
        assert!(b.charge_ready(herald, 0));
        assert!(!b.charge_ready(herald, 0));
    }

    #[test]
    fn test_silenced_unit_fires_nothing() {
        let spec = UnitSpec::new("Healer", 10, 1, 1)
            .with_ability(Ability::new(
                Trigger::EndTurn,
                Effect::Fortify,
                TargetKind::SelfUnit,
                5,
            ))
            .at(2, 2);
        let mut b = battle(vec![spec], vec![UnitSpec::new("Foe", 50, 0, 1).at(14, 2)], 1);
        let healer = b.units()[0].id;
        if let Some(u) = b.unit_mut(healer) {
            u.silenced = true;
        }
        let before = b.units()[0].max_hp;
        b.trigger_abilities(healer, Trigger::EndTurn, &TriggerCtx { target: None });
        assert_eq!(b.units()[0].max_hp, before);
    }

    #[test]
    fn test_target_kind_requires_living_context_target() {
        let spec = UnitSpec::new("Chaser", 10, 1, 1)
            .with_ability(Ability::new(Trigger::OnHit, Effect::Sunder, TargetKind::Target, 2))
            .at(2, 2);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(14, 2);
        let mut b = battle(vec![spec], vec![foe], 1);
        let chaser = b.units()[0].id;
        let foe_id = b.units()[1].id;
        if let Some(f) = b.unit_mut(foe_id) {
            f.hp = 0;
        }
        let ability = b.units()[0].abilities[0].clone();
        let targets = b.resolve_targets(chaser, &ability, &TriggerCtx { target: Some(foe_id) });
        assert!(targets.is_empty());
    }

    #[test]
    fn test_global_buff_hits_all_allies_only() {
        let healer = UnitSpec::new("Healer", 10, 1, 3)
            .with_ability(Ability::new(
                Trigger::EndTurn,
                Effect::Fortify,
                TargetKind::Global,
                1,
            ))
            .at(2, 2);
        let buddy = UnitSpec::new("Buddy", 10, 0, 1).at(2, 3);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(14, 2);
        let mut b = battle(vec![healer, buddy], vec![foe], 1);
        let healer_id = b.units()[0].id;
        let ability = b.units()[0].abilities[0].clone();
        let targets = b.resolve_targets(healer_id, &ability, &TriggerCtx { target: None });
        assert_eq!(targets.len(), 2);
        assert!(targets.iter().all(|&t| {
            b.unit(t).map(|u| u.player == Player::One).unwrap_or(false)
        }));
    }

    #[test]
    fn test_heal_pool_excludes_full_hp_allies() {
        let healer = UnitSpec::new("Healer", 10, 1, 3)
            .with_ability(
                Ability::new(Trigger::EndTurn, Effect::Heal, TargetKind::Area, 2).with_range(5),
            )
            .at(2, 2);
        let hurt = UnitSpec::new("Hurt", 10, 0, 1).with_hp(4).at(2, 3);
        let fine = UnitSpec::new("Fine", 10, 0, 1).at(2, 4);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(14, 2);
        let mut b = battle(vec![healer, hurt, fine], vec![foe], 1);
        let healer_id = b.units()[0].id;
        let hurt_id = b.units()[1].id;
        let ability = b.units()[0].abilities[0].clone();
        let targets = b.resolve_targets(healer_id, &ability, &TriggerCtx { target: None });
        assert_eq!(targets, vec![hurt_id]);
    }

    #[test]
    fn test_push_moves_target_away_until_blocked() {
        let pusher = UnitSpec::new("Pusher", 10, 1, 2).at(8, 2);
        let victim = UnitSpec::new("Victim", 10, 0, 1).at(10, 2);
        let wall = UnitSpec::new("Wall", 10, 0, 1).at(13, 2);
        let mut b = battle(vec![pusher], vec![victim, wall], 1);
        let pusher_id = b.units()[0].id;
        let victim_id = b.units()[1].id;
        b.apply_push(pusher_id, victim_id, 5);
        // pushed east from col 10, stopping short of the wall at col 13
        assert_eq!(b.units()[1].pos, Hex::new(12, 2));
        assert_eq!(b.last_action().push_from, Some(Hex::new(10, 2)));
        assert_eq!(b.last_action().push_to, Some(Hex::new(12, 2)));
    }

    #[test]
    fn test_push_off_board_stops_at_edge() {
        let pusher = UnitSpec::new("Pusher", 10, 1, 2).at(14, 2);
        let victim = UnitSpec::new("Victim", 10, 0, 1).at(15, 2);
        let mut b = battle(vec![pusher], vec![victim], 1);
        let pusher_id = b.units()[0].id;
        let victim_id = b.units()[1].id;
        b.apply_push(pusher_id, victim_id, 5);
        assert_eq!(b.units()[1].pos, Hex::new(16, 2));
    }

    #[test]
    fn test_retreat_increases_distance() {
        let archer = UnitSpec::new("Archer", 10, 1, 3).at(8, 2);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(9, 2);
        let mut b = battle(vec![archer], vec![foe], 1);
        let archer_id = b.units()[0].id;
        let foe_id = b.units()[1].id;
        let before = b.units()[0].pos.distance(&b.units()[1].pos);
        b.apply_retreat(archer_id, foe_id);
        let after = b.units()[0].pos.distance(&b.units()[1].pos);
        assert!(after > before);
    }

    #[test]
    fn test_summon_fills_free_neighbors_in_order() {
        let herald = UnitSpec::new("Herald", 10, 1, 1).at(8, 2);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(14, 2);
        let mut b = battle(vec![herald], vec![foe], 1);
        let herald_id = b.units()[0].id;
        b.apply_summon(herald_id, 2, false);
        let blades: Vec<&Unit> = b.units().iter().filter(|u| u.name == "Blade").collect();
        assert_eq!(blades.len(), 2);
        // first two free neighbors of (8,2) in enumeration order
        assert_eq!(blades[0].pos, Hex::new(8, 1));
        assert_eq!(blades[1].pos, Hex::new(9, 2));
        assert!(blades.iter().all(|bl| bl.has_acted));
        assert!(blades.iter().all(|bl| bl.summoner_id == Some(herald_id)));
        assert!(blades.iter().all(|bl| bl.player == Player::One));
    }

    #[test]
    fn test_summon_ready_enters_turn_order_after_current() {
        let herald = UnitSpec::new("Herald", 10, 1, 1).at(8, 2);
        let foe = UnitSpec::new("Foe", 50, 0, 1).at(14, 2);
        let mut b = battle(vec![herald], vec![foe], 1);
        let herald_id = b.units()[0].id;
        let order_len = b.turn_order().len();
        b.apply_summon(herald_id, 1, true);
        assert_eq!(b.turn_order().len(), order_len + 1);
        let blade = b.units().iter().find(|u| u.name == "Blade").map(|u| u.id);
        let at = (b.current_index() + 1).min(b.turn_order().len() - 1);
        assert_eq!(Some(b.turn_order()[at]), blade);
        let blade_unit = b.units().iter().find(|u| u.name == "Blade");
        assert!(blade_unit.map(|u| !u.has_acted).unwrap_or(false));
    }
}
