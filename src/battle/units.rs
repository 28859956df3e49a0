//! Units: battle-time state plus the spec format hosts construct them from

use serde::{Deserialize, Serialize};

use crate::battle::abilities::Ability;
use crate::battle::constants::{SUMMON_DAMAGE, SUMMON_HP, SUMMON_NAME, SUMMON_RANGE};
use crate::battle::hex::Hex;
use crate::core::error::{BattleError, Result};
use crate::core::types::{Player, UnitId};

/// A unit on the battle map.
///
/// Dead units stay in the battle's unit vector (events and history
/// refer to them by ID) but are excluded from turn order and queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub name: String,
    pub display_name: String,
    pub player: Player,
    pub summoner_id: Option<UnitId>,

    pub max_hp: i32,
    pub hp: i32,
    pub damage: i32,
    pub attack_range: u32,
    pub armor: i32,
    pub speed: f64,

    pub abilities: Vec<Ability>,
    /// Per-ability trigger counters, parallel to `abilities`
    pub charge_counters: Vec<u32>,

    pub pos: Hex,
    pub has_acted: bool,
    pub ready_triggered: bool,
    pub frozen_turns: u32,
    pub silenced: bool,
    pub block_used: i32,
    pub ramp_accumulated: i32,
}

impl Unit {
    pub fn is_alive(&self) -> bool {
        self.hp > 0
    }

    pub fn is_enemy_of(&self, other: &Unit) -> bool {
        self.player != other.player
    }

    pub fn take_damage(&mut self, amount: i32) {
        self.hp -= amount;
    }

    /// Restore HP up to the cap; returns the amount actually healed
    pub fn heal(&mut self, amount: i32) -> i32 {
        if !self.is_alive() {
            return 0;
        }
        let healed = amount.min(self.max_hp - self.hp).max(0);
        self.hp += healed;
        healed
    }

    /// Raise both the HP cap and current HP
    pub fn fortify(&mut self, amount: i32) {
        self.max_hp += amount;
        self.hp += amount;
    }

    /// Reduce armor; it may go negative
    pub fn sunder(&mut self, amount: i32) {
        self.armor -= amount;
    }

    /// Permanent damage increase, tracked so the base value can be
    /// reconstructed
    pub fn ramp(&mut self, amount: i32) {
        self.damage += amount;
        self.ramp_accumulated += amount;
    }

    /// The unit created by the summon effect
    pub fn summoned(id: UnitId, player: Player, pos: Hex, summoner_id: UnitId) -> Self {
        Self {
            id,
            name: SUMMON_NAME.to_string(),
            display_name: SUMMON_NAME.to_string(),
            player,
            summoner_id: Some(summoner_id),
            max_hp: SUMMON_HP,
            hp: SUMMON_HP,
            damage: SUMMON_DAMAGE,
            attack_range: SUMMON_RANGE,
            armor: 0,
            speed: 1.0,
            abilities: Vec::new(),
            charge_counters: Vec::new(),
            pos,
            has_acted: false,
            ready_triggered: false,
            frozen_turns: 0,
            silenced: false,
            block_used: 0,
            ramp_accumulated: 0,
        }
    }
}

/// Externally supplied description of one kind of unit in an army
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSpec {
    pub name: String,
    #[serde(default)]
    pub display_name: Option<String>,
    pub max_hp: i32,
    /// Starting HP; defaults to `max_hp`
    #[serde(default)]
    pub hp: Option<i32>,
    pub damage: i32,
    pub range: u32,
    #[serde(default)]
    pub armor: i32,
    #[serde(default = "default_speed")]
    pub speed: f64,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default = "default_count")]
    pub count: u32,
    #[serde(default)]
    pub position: Option<Hex>,
}

fn default_speed() -> f64 {
    1.0
}

fn default_count() -> u32 {
    1
}

impl UnitSpec {
    pub fn new(name: &str, max_hp: i32, damage: i32, range: u32) -> Self {
        Self {
            name: name.to_string(),
            display_name: None,
            max_hp,
            hp: None,
            damage,
            range,
            armor: 0,
            speed: 1.0,
            abilities: Vec::new(),
            count: 1,
            position: None,
        }
    }

    pub fn with_count(mut self, count: u32) -> Self {
        self.count = count;
        self
    }

    pub fn with_armor(mut self, armor: i32) -> Self {
        self.armor = armor;
        self
    }

    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = speed;
        self
    }

    pub fn with_hp(mut self, hp: i32) -> Self {
        self.hp = Some(hp);
        self
    }

    pub fn with_ability(mut self, ability: Ability) -> Self {
        self.abilities.push(ability);
        self
    }

    pub fn at(mut self, col: i32, row: i32) -> Self {
        self.position = Some(Hex::new(col, row));
        self
    }

    /// Reject malformed specs before any unit is created
    pub fn validate(&self) -> Result<()> {
        if self.count < 1 {
            return Err(BattleError::InvalidCount {
                name: self.name.clone(),
                count: self.count,
            });
        }
        if self.range < 1 {
            return Err(BattleError::InvalidRange {
                name: self.name.clone(),
            });
        }
        if self.max_hp < 1 {
            return Err(BattleError::InvalidMaxHp {
                name: self.name.clone(),
                max_hp: self.max_hp,
            });
        }
        if let Some(hp) = self.hp {
            if hp < 1 || hp > self.max_hp {
                return Err(BattleError::InvalidHp {
                    name: self.name.clone(),
                    hp,
                    max_hp: self.max_hp,
                });
            }
        }
        if self.speed < 1.0 {
            return Err(BattleError::InvalidSpeed {
                name: self.name.clone(),
                speed: self.speed,
            });
        }
        if self.position.is_some() && self.count != 1 {
            return Err(BattleError::PositionWithCount {
                name: self.name.clone(),
            });
        }
        for ability in &self.abilities {
            if ability.charge == Some(0) {
                return Err(BattleError::InvalidCharge {
                    name: self.name.clone(),
                });
            }
            ability.validate().map_err(|reason| BattleError::InvalidAbility {
                name: self.name.clone(),
                reason,
            })?;
        }
        Ok(())
    }

    /// Expand this spec into `count` identical units
    pub fn build(&self, player: Player, next_id: &mut u32) -> Vec<Unit> {
        let mut units = Vec::with_capacity(self.count as usize);
        for _ in 0..self.count {
            let id = UnitId(*next_id);
            *next_id += 1;
            units.push(Unit {
                id,
                name: self.name.clone(),
                display_name: self
                    .display_name
                    .clone()
                    .unwrap_or_else(|| self.name.clone()),
                player,
                summoner_id: None,
                max_hp: self.max_hp,
                hp: self.hp.unwrap_or(self.max_hp),
                damage: self.damage,
                attack_range: self.range,
                armor: self.armor,
                speed: self.speed,
                abilities: self.abilities.clone(),
                charge_counters: vec![0; self.abilities.len()],
                pos: self.position.unwrap_or_default(),
                has_acted: false,
                ready_triggered: false,
                frozen_turns: 0,
                silenced: false,
                block_used: 0,
                ramp_accumulated: 0,
            });
        }
        units
    }
}
