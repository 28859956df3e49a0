//! Damage pipeline: block, armor, undying rescue, execute thresholds
//! and death handling
//!
//! Order matters and is part of the engine contract:
//! block -> armor -> undying -> apply -> wounded/execute -> death.

use crate::battle::abilities::{Effect, Trigger};
use crate::battle::actions::UndyingSave;
use crate::battle::dispatch::TriggerCtx;
use crate::battle::engine::Battle;
use crate::core::types::UnitId;

impl Battle {
    /// Base armor plus non-silenced self armor passives plus
    /// non-silenced ally armor auras in range
    pub(crate) fn effective_armor(&self, target_id: UnitId) -> i32 {
        let Some(target) = self.unit(target_id) else {
            return 0;
        };
        let mut bonus = 0;
        if !target.silenced {
            for ab in &target.abilities {
                if ab.trigger == Trigger::Passive && ab.effect == Effect::Armor && ab.aura.is_none()
                {
                    bonus += ab.value();
                }
            }
        }
        for ally in &self.units {
            if ally.id == target_id
                || !ally.is_alive()
                || ally.player != target.player
                || ally.silenced
            {
                continue;
            }
            for ab in &ally.abilities {
                if ab.trigger == Trigger::Passive
                    && ab.effect == Effect::Armor
                    && ab.aura.is_some()
                    && ab.aura() >= ally.pos.distance(&target.pos)
                {
                    bonus += ab.value();
                }
            }
        }
        target.armor + bonus
    }

    /// Flat attack bonus from every living, non-silenced boost carrier
    /// on the player's side (the attacker included, no range limit)
    pub(crate) fn boost_bonus(&self, player: crate::core::types::Player) -> i32 {
        self.units
            .iter()
            .filter(|u| u.is_alive() && u.player == player && !u.silenced)
            .flat_map(|u| u.abilities.iter())
            .filter(|ab| ab.trigger == Trigger::Passive && ab.effect == Effect::Boost)
            .map(|ab| ab.value())
            .sum()
    }

    /// A unit's basic attack: boosted damage through the pipeline.
    /// Returns `(ranged, killed)` for the action record.
    pub(crate) fn perform_attack(&mut self, attacker_id: UnitId, target_id: UnitId) -> (bool, bool) {
        let (ranged, player, damage) = match self.unit(attacker_id) {
            Some(a) => (a.attack_range > 1, a.player, a.damage),
            None => return (false, false),
        };
        let attack_damage = damage + self.boost_bonus(player);
        let eff_armor = self.effective_armor(target_id);
        let actual = self.apply_damage(target_id, attack_damage, Some(attacker_id));
        if eff_armor > 0 && actual < attack_damage {
            self.log.push(format!(
                "unit {} attacks unit {} for {} damage ({} absorbed by armor)",
                attacker_id.0, target_id.0, actual, eff_armor
            ));
        } else if eff_armor < 0 {
            self.log.push(format!(
                "unit {} attacks unit {} for {} damage ({} extra from sundered armor)",
                attacker_id.0, target_id.0, actual, -eff_armor
            ));
        } else {
            self.log.push(format!(
                "unit {} attacks unit {} for {} damage",
                attacker_id.0, target_id.0, actual
            ));
        }
        let killed = !self.is_alive(target_id);
        if killed {
            self.log.push(format!("  unit {} dies!", target_id.0));
        }
        (ranged, killed)
    }

    /// Run the full pipeline. Returns the damage actually applied.
    pub(crate) fn apply_damage(
        &mut self,
        target_id: UnitId,
        amount: i32,
        source: Option<UnitId>,
    ) -> i32 {
        let Some(target) = self.unit(target_id) else {
            return 0;
        };
        if !target.is_alive() {
            return 0;
        }

        // block: a per-round budget of fully negated instances
        if !target.silenced {
            let block_value = target
                .abilities
                .iter()
                .find(|ab| ab.trigger == Trigger::Passive && ab.effect == Effect::Block)
                .map(|ab| ab.value());
            if let Some(block_value) = block_value {
                if target.block_used < block_value {
                    let mut used = 0;
                    if let Some(t) = self.unit_mut(target_id) {
                        t.block_used += 1;
                        used = t.block_used;
                    }
                    self.log.push(format!(
                        "  unit {} blocks damage ({}/{} blocks used)",
                        target_id.0, used, block_value
                    ));
                    return 0;
                }
            }
        }

        let eff_armor = self.effective_armor(target_id);
        let actual = (amount - eff_armor).max(0);
        if actual == 0 {
            return 0;
        }

        // undying: a nearby ally trades the victim's damage stat for
        // its life
        let (hp, damage, target_pos, target_player) = match self.unit(target_id) {
            Some(t) => (t.hp, t.damage, t.pos, t.player),
            None => return 0,
        };
        if hp - actual <= 0 && damage > 0 {
            let mut rescue: Option<(UnitId, crate::battle::hex::Hex, i32)> = None;
            for ally in &self.units {
                if ally.id == target_id
                    || !ally.is_alive()
                    || ally.player != target_player
                    || ally.silenced
                {
                    continue;
                }
                for ab in &ally.abilities {
                    if ab.trigger == Trigger::Passive
                        && ab.effect == Effect::Undying
                        && ab.aura() >= ally.pos.distance(&target_pos)
                        && ab.value() <= damage
                    {
                        rescue = Some((ally.id, ally.pos, ab.value()));
                        break;
                    }
                }
                if rescue.is_some() {
                    break;
                }
            }
            if let Some((_ally_id, ally_pos, value)) = rescue {
                let mut now = 0;
                if let Some(t) = self.unit_mut(target_id) {
                    t.damage -= value;
                    now = t.damage;
                }
                self.log.push(format!(
                    "  unit {} saved by undying, loses {} damage (now {})",
                    target_id.0, value, now
                ));
                self.last_action.undying_saves.push(UndyingSave {
                    target_pos,
                    source_pos: ally_pos,
                });
                return 0;
            }
        }

        if let Some(t) = self.unit_mut(target_id) {
            t.take_damage(actual);
        }

        if self.is_alive(target_id) {
            self.trigger_abilities(target_id, Trigger::Wounded, &TriggerCtx { target: None });
            if self.is_alive(target_id) {
                self.check_execute(target_id);
            }
        } else {
            self.handle_unit_death(target_id, source);
        }
        actual
    }

    /// Kill a wounded unit if any enemy's execute threshold covers it.
    /// Lowest unit ID wins; the executioner is credited with the kill.
    pub(crate) fn check_execute(&mut self, target_id: UnitId) {
        let (hp, pos, player) = match self.unit(target_id) {
            Some(t) if t.is_alive() => (t.hp, t.pos, t.player),
            _ => return,
        };
        let mut executioner: Option<UnitId> = None;
        for enemy in &self.units {
            if !enemy.is_alive() || enemy.player == player || enemy.silenced {
                continue;
            }
            for ab in &enemy.abilities {
                if ab.trigger == Trigger::Passive
                    && ab.effect == Effect::Execute
                    && ab.aura() >= enemy.pos.distance(&pos)
                    && hp <= ab.value()
                {
                    executioner = Some(enemy.id);
                    break;
                }
            }
            if executioner.is_some() {
                break;
            }
        }
        if let Some(enemy_id) = executioner {
            self.log.push(format!(
                "  unit {} executes unit {} (HP {})",
                enemy_id.0, target_id.0, hp
            ));
            if let Some(t) = self.unit_mut(target_id) {
                t.hp = 0;
            }
            self.handle_unit_death(target_id, Some(enemy_id));
        }
    }

    /// Fire death triggers: the killer's onkill, then one ID-ascending
    /// scan for lament, harvest and lament_aura responses
    pub(crate) fn handle_unit_death(&mut self, dead_id: UnitId, source: Option<UnitId>) {
        let (dead_pos, dead_player) = match self.unit(dead_id) {
            Some(d) => (d.pos, d.player),
            None => return,
        };

        if let Some(source_id) = source {
            if self.is_alive(source_id) {
                self.trigger_abilities(
                    source_id,
                    Trigger::OnKill,
                    &TriggerCtx {
                        target: Some(dead_id),
                    },
                );
            }
        }

        // index loop: units summoned by a response are scanned too
        let mut i = 0;
        while i < self.units.len() {
            let (vid, v_player, v_pos, v_range, v_alive, v_silenced, ability_count) = {
                let v = &self.units[i];
                (
                    v.id,
                    v.player,
                    v.pos,
                    v.attack_range,
                    v.is_alive(),
                    v.silenced,
                    v.abilities.len(),
                )
            };
            i += 1;
            if !v_alive {
                continue;
            }

            for idx in 0..ability_count {
                let ability = match self.unit(vid).and_then(|v| v.abilities.get(idx)) {
                    Some(ab) => ab.clone(),
                    None => continue,
                };
                let in_range =
                    |r: Option<u32>| v_pos.distance(&dead_pos) <= r.unwrap_or(v_range);
                match ability.trigger {
                    Trigger::Lament if !v_silenced && v_player == dead_player && vid != dead_id => {
                        if in_range(ability.range) && self.charge_ready(vid, idx) {
                            self.execute_ability(vid, &ability, &TriggerCtx { target: None });
                            if self.options.apply_events_immediately {
                                self.drain_events();
                            }
                        }
                    }
                    Trigger::Harvest if !v_silenced && v_player != dead_player => {
                        if in_range(ability.range) && self.charge_ready(vid, idx) {
                            self.execute_ability(vid, &ability, &TriggerCtx { target: None });
                            if self.options.apply_events_immediately {
                                self.drain_events();
                            }
                        }
                    }
                    Trigger::Passive
                        if ability.effect == Effect::LamentAura && v_player == dead_player =>
                    {
                        let aura = ability.aura();
                        if v_pos.distance(&dead_pos) <= aura {
                            self.apply_lament_aura(vid, dead_id, aura, ability.value());
                        }
                    }
                    _ => {}
                }
            }
        }
    }

    /// Ramp every living ally of the deceased within the carrier's aura
    fn apply_lament_aura(&mut self, carrier_id: UnitId, dead_id: UnitId, aura: u32, value: i32) {
        let (carrier_pos, player) = match self.unit(carrier_id) {
            Some(c) => (c.pos, c.player),
            None => return,
        };
        let recipients: Vec<UnitId> = self
            .units
            .iter()
            .filter(|u| {
                u.is_alive()
                    && u.player == player
                    && u.id != dead_id
                    && u.pos.distance(&carrier_pos) <= aura
            })
            .map(|u| u.id)
            .collect();
        for rid in recipients {
            let pos = match self.unit_mut(rid) {
                Some(r) => {
                    r.ramp(value);
                    r.pos
                }
                None => continue,
            };
            self.log.push(format!(
                "  unit {} gains {} damage from a fallen ally",
                rid.0, value
            ));
            self.last_action.vengeance_positions.push(pos);
        }
    }
}
