//! Queued effect events and the iterative drain loop
//!
//! Handlers enqueue instead of recursing: a strike that kills may fire
//! lament/harvest triggers that enqueue further strikes, and the single
//! drain loop applies them in FIFO order. A hard cap bounds pathological
//! ability decks.

use serde::{Deserialize, Serialize};

use crate::battle::constants::EVENT_CHAIN_LIMIT;
use crate::battle::engine::Battle;
use crate::battle::hex::Hex;
use crate::core::types::UnitId;

/// Kind of a queued effect event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Heal,
    Fortify,
    Sunder,
    Splash,
    Strike,
}

/// One pending effect, addressed by unit IDs so chains through deaths
/// stay well-defined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EffectEvent {
    pub kind: EventKind,
    pub target_id: UnitId,
    pub source_id: UnitId,
    pub amount: i32,
    /// Target position at enqueue time
    pub pos: Hex,
    /// Source position at enqueue time; set for sunder and strike
    pub source_pos: Option<Hex>,
}

impl Battle {
    /// Enqueue an effect event and mirror it into `last_action`
    pub(crate) fn queue_event(
        &mut self,
        kind: EventKind,
        source_id: UnitId,
        target_id: UnitId,
        amount: i32,
        source_pos: Option<Hex>,
    ) {
        let pos = match self.unit(target_id) {
            Some(target) => target.pos,
            None => return,
        };
        let event = EffectEvent {
            kind,
            target_id,
            source_id,
            amount,
            pos,
            source_pos,
        };
        self.last_action.record_event(&event);
        self.event_queue.push_back(event);
    }

    /// Apply one event. The target is re-resolved by ID; if it died
    /// between enqueue and apply the event is dropped.
    pub(crate) fn apply_effect_event(&mut self, event: &EffectEvent) {
        let alive = self
            .unit(event.target_id)
            .map(|u| u.is_alive())
            .unwrap_or(false);
        if !alive {
            return;
        }
        match event.kind {
            EventKind::Heal => {
                let healed = match self.unit_mut(event.target_id) {
                    Some(target) => target.heal(event.amount),
                    None => 0,
                };
                if healed > 0 {
                    self.log.push(format!(
                        "  unit {} heals unit {} for {} HP",
                        event.source_id.0, event.target_id.0, healed
                    ));
                }
            }
            EventKind::Fortify => {
                if let Some(target) = self.unit_mut(event.target_id) {
                    target.fortify(event.amount);
                }
                self.log.push(format!(
                    "  unit {} fortifies unit {} for +{} HP",
                    event.source_id.0, event.target_id.0, event.amount
                ));
            }
            EventKind::Sunder => {
                let armor = match self.unit_mut(event.target_id) {
                    Some(target) => {
                        target.sunder(event.amount);
                        target.armor
                    }
                    None => return,
                };
                self.log.push(format!(
                    "  unit {} sunders unit {} armor by {} (now {})",
                    event.source_id.0, event.target_id.0, event.amount, armor
                ));
            }
            EventKind::Splash | EventKind::Strike => {
                self.apply_damage(event.target_id, event.amount, Some(event.source_id));
            }
        }
    }

    /// Apply queued events in FIFO order until the queue is empty.
    ///
    /// Applying strikes can kill units, which fires further triggers
    /// that enqueue more events; those are picked up by the same loop.
    /// Reentrant calls (a trigger fired mid-drain) are no-ops so the
    /// outer loop keeps sole ownership of the cap.
    pub(crate) fn drain_events(&mut self) {
        if self.draining {
            return;
        }
        self.draining = true;
        let mut applied = 0usize;
        while let Some(event) = self.event_queue.pop_front() {
            if applied >= EVENT_CHAIN_LIMIT {
                log::warn!(
                    "effect chain exceeded {} events; truncating",
                    EVENT_CHAIN_LIMIT
                );
                self.log
                    .push(format!("  effect chain truncated at {}", EVENT_CHAIN_LIMIT));
                self.event_queue.clear();
                break;
            }
            self.apply_effect_event(&event);
            applied += 1;
        }
        self.draining = false;
    }
}
