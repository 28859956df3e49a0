//! Structured record of the most recent step, for hosts and replays

use serde::{Deserialize, Serialize};

use crate::battle::events::{EffectEvent, EventKind};
use crate::battle::hex::Hex;

/// What the acting unit did this step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Attack,
    Move,
    MoveAttack,
    /// The unit had no enemy in range and no path to one
    #[default]
    Skip,
}

/// An undying rescue that happened during the step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndyingSave {
    pub target_pos: Hex,
    pub source_pos: Hex,
}

/// Everything observable about one `step()` call.
///
/// Ability side effects append to the typed lists; the action kind and
/// positional fields are filled in by the scheduler. The lists survive
/// the kind assignment, so wounded-trigger events fired mid-attack are
/// not lost.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LastAction {
    pub kind: ActionKind,
    pub attacker_pos: Option<Hex>,
    pub target_pos: Option<Hex>,
    pub from: Option<Hex>,
    pub to: Option<Hex>,
    /// True iff the attacking unit's range is greater than 1
    pub ranged: bool,
    pub killed: bool,

    pub heal_events: Vec<EffectEvent>,
    pub fortify_events: Vec<EffectEvent>,
    pub sunder_events: Vec<EffectEvent>,
    pub splash_events: Vec<EffectEvent>,
    pub strike_events: Vec<EffectEvent>,

    pub ramp_pos: Option<Hex>,
    pub push_from: Option<Hex>,
    pub push_to: Option<Hex>,
    pub undying_saves: Vec<UndyingSave>,
    pub vengeance_positions: Vec<Hex>,
}

impl LastAction {
    /// File a queued event into its typed list
    pub fn record_event(&mut self, event: &EffectEvent) {
        let list = match event.kind {
            EventKind::Heal => &mut self.heal_events,
            EventKind::Fortify => &mut self.fortify_events,
            EventKind::Sunder => &mut self.sunder_events,
            EventKind::Splash => &mut self.splash_events,
            EventKind::Strike => &mut self.strike_events,
        };
        list.push(event.clone());
    }
}
