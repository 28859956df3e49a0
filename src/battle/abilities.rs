//! Ability model: triggers, effects and target kinds as closed enums
//!
//! Unknown names fail at parse time, so the engine never dispatches on
//! a string it has not seen before.

use serde::{Deserialize, Serialize};

/// When an ability fires
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trigger {
    Passive,
    TurnStart,
    OnHit,
    OnKill,
    Wounded,
    EndTurn,
    Lament,
    Harvest,
}

/// What an ability does
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Effect {
    Heal,
    Fortify,
    Strike,
    Splash,
    Sunder,
    Ramp,
    Push,
    Retreat,
    Freeze,
    Summon,
    Shadowstep,
    Silence,
    Ready,
    Block,
    Execute,
    Armor,
    Boost,
    Undying,
    LamentAura,
}

impl Effect {
    /// Passive effects are queried by the damage pipeline and death
    /// scan rather than fired through trigger dispatch.
    pub fn is_passive(&self) -> bool {
        matches!(
            self,
            Effect::Block
                | Effect::Execute
                | Effect::Armor
                | Effect::Boost
                | Effect::Undying
                | Effect::LamentAura
        )
    }

    /// Offensive effects resolve against enemies
    pub fn is_offensive(&self) -> bool {
        matches!(
            self,
            Effect::Strike
                | Effect::Splash
                | Effect::Sunder
                | Effect::Freeze
                | Effect::Silence
                | Effect::Push
        )
    }

    /// Supportive effects resolve against allies
    pub fn is_supportive(&self) -> bool {
        matches!(self, Effect::Heal | Effect::Fortify)
    }
}

/// Who an ability resolves against
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetKind {
    #[serde(rename = "self")]
    SelfUnit,
    Target,
    Random,
    Area,
    Global,
}

/// One ability definition as supplied in a unit spec
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    pub trigger: Trigger,
    pub effect: Effect,
    #[serde(default = "default_target")]
    pub target: TargetKind,
    #[serde(default)]
    pub value: i32,
    #[serde(default)]
    pub range: Option<u32>,
    #[serde(default)]
    pub charge: Option<u32>,
    #[serde(default)]
    pub aura: Option<u32>,
    #[serde(default)]
    pub summon_ready: bool,
}

fn default_target() -> TargetKind {
    TargetKind::SelfUnit
}

impl Ability {
    pub fn new(trigger: Trigger, effect: Effect, target: TargetKind, value: i32) -> Self {
        Self {
            trigger,
            effect,
            target,
            value,
            range: None,
            charge: None,
            aura: None,
            summon_ready: false,
        }
    }

    pub fn with_range(mut self, range: u32) -> Self {
        self.range = Some(range);
        self
    }

    pub fn with_charge(mut self, charge: u32) -> Self {
        self.charge = Some(charge);
        self
    }

    pub fn with_aura(mut self, aura: u32) -> Self {
        self.aura = Some(aura);
        self
    }

    /// Trigger-count divisor; the ability fires on every Nth trigger
    pub fn charge(&self) -> u32 {
        self.charge.unwrap_or(1)
    }

    /// Effective radius for passive auras
    pub fn aura(&self) -> u32 {
        self.aura.unwrap_or(0)
    }

    /// Clamped effect magnitude
    pub fn value(&self) -> i32 {
        self.value.max(0)
    }

    /// Reject combinations the engine cannot dispatch
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.charge == Some(0) {
            return Err("ability charge must be at least 1".into());
        }
        match (self.trigger, self.effect.is_passive()) {
            (Trigger::Passive, false) => Err(format!(
                "effect {:?} cannot be used with the passive trigger",
                self.effect
            )),
            (Trigger::Passive, true) => Ok(()),
            (_, true) => Err(format!(
                "passive effect {:?} requires the passive trigger",
                self.effect
            )),
            (_, false) => Ok(()),
        }
    }
}
