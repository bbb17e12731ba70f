//! Combatant stat blocks

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::types::{CombatantId, Level};

/// Reasons a fight refuses to start
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CombatError {
    #[error("combatant {0} is already defeated")]
    AlreadyDefeated(CombatantId),

    #[error("combatant {id} has invalid {stat}: {value}")]
    InvalidStat {
        id: CombatantId,
        stat: &'static str,
        value: f32,
    },

    #[error("a combatant cannot fight itself ({0})")]
    SameCombatant(CombatantId),
}

/// Health and fighting attributes
///
/// `critical_chance` is a percentage (0-100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombatantStats {
    pub health: f32,
    pub max_health: f32,
    pub attack: f32,
    pub defense: f32,
    pub speed: f32,
    pub critical_chance: f32,
}

impl CombatantStats {
    /// Fresh stats at full health
    pub fn new(health: f32, attack: f32, defense: f32, speed: f32, critical_chance: f32) -> Self {
        Self {
            health,
            max_health: health,
            attack,
            defense,
            speed,
            critical_chance,
        }
    }

    /// A freshly hatched common rooster
    pub fn starter() -> Self {
        Self::new(100.0, 15.0, 5.0, 12.0, 10.0)
    }

    pub fn is_defeated(&self) -> bool {
        self.health <= 0.0
    }

    /// Subtract damage, never dropping below zero. Returns the health left.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if amount.is_finite() && amount > 0.0 {
            self.health = (self.health - amount).max(0.0);
        }
        self.health
    }

    pub fn heal(&mut self, amount: f32) {
        if amount.is_finite() && amount > 0.0 {
            self.health = (self.health + amount).min(self.max_health);
        }
    }

    pub fn critical_probability(&self) -> f64 {
        (self.critical_chance as f64 / 100.0).clamp(0.0, 1.0)
    }

    /// Check the block is something the resolvers can work with
    pub fn validate(&self, id: CombatantId) -> Result<(), CombatError> {
        let fields = [
            ("health", self.health),
            ("max_health", self.max_health),
            ("attack", self.attack),
            ("defense", self.defense),
            ("speed", self.speed),
            ("critical_chance", self.critical_chance),
        ];
        for (stat, value) in fields {
            if !value.is_finite() || value < 0.0 {
                return Err(CombatError::InvalidStat { id, stat, value });
            }
        }
        if self.critical_chance > 100.0 {
            return Err(CombatError::InvalidStat {
                id,
                stat: "critical_chance",
                value: self.critical_chance,
            });
        }
        if self.health > self.max_health {
            return Err(CombatError::InvalidStat {
                id,
                stat: "health",
                value: self.health,
            });
        }
        if self.is_defeated() {
            return Err(CombatError::AlreadyDefeated(id));
        }
        Ok(())
    }
}

impl Default for CombatantStats {
    fn default() -> Self {
        Self::starter()
    }
}

/// Anyone who can step into a fight
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub id: CombatantId,
    pub name: String,
    pub level: Level,
    pub stats: CombatantStats,
}

impl Combatant {
    pub fn new(name: impl Into<String>, level: Level, stats: CombatantStats) -> Self {
        Self {
            id: CombatantId::new(),
            name: name.into(),
            level: level.max(1),
            stats,
        }
    }

    /// The starter rooster every new player receives
    pub fn starter() -> Self {
        Self::new("Scrapper", 1, CombatantStats::starter())
    }

    /// A difficulty-1 street opponent
    pub fn street_opponent() -> Self {
        Self::new("Alley Cock", 1, CombatantStats::new(80.0, 10.0, 5.0, 10.0, 5.0))
    }
}

/// Fail fast on anything that would make a fight undefined
pub fn check_matchup(attacker: &Combatant, defender: &Combatant) -> Result<(), CombatError> {
    if attacker.id == defender.id {
        return Err(CombatError::SameCombatant(attacker.id));
    }
    attacker.stats.validate(attacker.id)?;
    defender.stats.validate(defender.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_damage_floors_at_zero() {
        let mut stats = CombatantStats::starter();
        assert_eq!(stats.take_damage(30.0), 70.0);
        assert_eq!(stats.take_damage(500.0), 0.0);
        assert!(stats.is_defeated());
    }

    #[test]
    fn test_take_damage_ignores_nan() {
        let mut stats = CombatantStats::starter();
        stats.take_damage(f32::NAN);
        stats.take_damage(-5.0);
        assert_eq!(stats.health, 100.0);
    }

    #[test]
    fn test_heal_caps_at_max() {
        let mut stats = CombatantStats::starter();
        stats.take_damage(50.0);
        stats.heal(80.0);
        assert_eq!(stats.health, stats.max_health);
    }

    #[test]
    fn test_defeated_combatant_rejected() {
        let mut rooster = Combatant::starter();
        rooster.stats.health = 0.0;
        assert_eq!(
            rooster.stats.validate(rooster.id),
            Err(CombatError::AlreadyDefeated(rooster.id))
        );
    }

    #[test]
    fn test_nan_stat_rejected() {
        let mut rooster = Combatant::starter();
        rooster.stats.attack = f32::NAN;
        assert!(matches!(
            rooster.stats.validate(rooster.id),
            Err(CombatError::InvalidStat { stat: "attack", .. })
        ));
    }

    #[test]
    fn test_self_fight_rejected() {
        let rooster = Combatant::starter();
        assert_eq!(
            check_matchup(&rooster, &rooster),
            Err(CombatError::SameCombatant(rooster.id))
        );
    }

    #[test]
    fn test_critical_probability_is_fraction() {
        let stats = CombatantStats::new(10.0, 1.0, 1.0, 1.0, 25.0);
        assert_eq!(stats.critical_probability(), 0.25);
    }
}
