//! Opponent generation per fight zone

use thiserror::Error;

use crate::combat::{Combatant, CombatantStats};
use crate::core::config::ZoneConfig;
use crate::core::rng::RandomSource;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EnemyError {
    #[error("unknown zone '{0}'")]
    UnknownZone(String),

    #[error("enemy provider unavailable: {0}")]
    Unavailable(String),
}

/// Supplies the opponent for a zone; called once before a fight
pub trait EnemyProvider: Send + Sync {
    fn enemy_for_zone(
        &self,
        zone_id: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<Combatant, EnemyError>;
}

const STREET_NAMES: &[&str] = &[
    "Razorback",
    "Iron Comb",
    "Night Crow",
    "Rust Spur",
    "Gutter King",
    "Neon Beak",
    "Ash Talon",
    "Scrap Dancer",
];

/// Stats grow linearly with zone difficulty
#[derive(Debug, Clone)]
pub struct ScaledEnemyProvider {
    zones: Vec<ZoneConfig>,
}

impl ScaledEnemyProvider {
    pub fn new(zones: Vec<ZoneConfig>) -> Self {
        Self { zones }
    }

    pub fn zones(&self) -> &[ZoneConfig] {
        &self.zones
    }

    /// Stat block for difficulty `d`
    pub fn stats_for(difficulty: u32) -> CombatantStats {
        let d = difficulty as f32;
        CombatantStats::new(
            80.0 + 20.0 * d,
            10.0 + 3.0 * d,
            5.0 + 2.0 * d,
            10.0 + 1.5 * d,
            5.0 + (difficulty / 2) as f32,
        )
    }
}

impl EnemyProvider for ScaledEnemyProvider {
    fn enemy_for_zone(
        &self,
        zone_id: &str,
        rng: &mut dyn RandomSource,
    ) -> Result<Combatant, EnemyError> {
        let zone = self
            .zones
            .iter()
            .find(|z| z.id == zone_id)
            .ok_or_else(|| EnemyError::UnknownZone(zone_id.to_string()))?;
        let name = match &zone.boss {
            Some(boss) => boss.clone(),
            None => STREET_NAMES[rng.below(STREET_NAMES.len() as u32) as usize].to_string(),
        };
        let enemy = Combatant::new(name, zone.difficulty, Self::stats_for(zone.difficulty));
        tracing::debug!(
            zone = zone_id,
            enemy = %enemy.name,
            level = enemy.level,
            "Enemy generated"
        );
        Ok(enemy)
    }
}
