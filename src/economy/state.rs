//! Global economy record

use serde::{Deserialize, Serialize};

use crate::core::config::{EconomyConfig, EconomySeed};
use crate::core::types::Timestamp;
use crate::economy::GlobalEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EconomyStatus {
    Stable,
    Volatile,
    Critical,
    /// Only reported for the tick in which a drain happened
    Draining,
}

impl EconomyStatus {
    /// Threshold classification, ignoring drains
    pub fn classify(stability: f32, config: &EconomyConfig) -> Self {
        if stability < config.critical_threshold {
            EconomyStatus::Critical
        } else if stability < config.warning_threshold {
            EconomyStatus::Volatile
        } else {
            EconomyStatus::Stable
        }
    }
}

/// Snapshot of the shared economy
///
/// `claimed_crystals <= daily_crystal_pool` and `stability_index` in
/// `[0, 100]` hold after every engine call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EconomyState {
    pub daily_crystal_pool: u32,
    pub claimed_crystals: u32,
    pub active_players: u32,
    pub total_ad_views_today: u64,
    pub stability_index: f32,
    pub market_tax_rate: f32,
    pub last_drain_time: Timestamp,
    pub next_drain_time: Timestamp,
    pub status: EconomyStatus,
    pub current_event: GlobalEvent,
}

impl EconomyState {
    pub fn seeded(config: &EconomyConfig, seed: &EconomySeed, now: Timestamp) -> Self {
        let stability_index = clamp_stability(seed.stability_index);
        let last_drain_time = now.saturating_sub(seed.last_drain_ago_ms);
        Self {
            daily_crystal_pool: config.daily_crystal_pool,
            claimed_crystals: seed.claimed_crystals.min(config.daily_crystal_pool),
            active_players: seed.active_players,
            total_ad_views_today: seed.total_ad_views_today,
            stability_index,
            market_tax_rate: seed.market_tax_rate.clamp(0.0, 1.0),
            last_drain_time,
            next_drain_time: last_drain_time + config.drain_interval_ms,
            status: EconomyStatus::classify(stability_index, config),
            current_event: GlobalEvent::None,
        }
    }

    pub fn remaining_crystals(&self) -> u32 {
        self.daily_crystal_pool.saturating_sub(self.claimed_crystals)
    }

    /// Share of the pool already claimed, 0-1
    pub fn pool_usage(&self) -> f32 {
        if self.daily_crystal_pool == 0 {
            return 1.0;
        }
        self.claimed_crystals as f32 / self.daily_crystal_pool as f32
    }
}

/// Clamp to `[0, 100]`; NaN maps to 0
pub fn clamp_stability(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MS_PER_HOUR;

    #[test]
    fn test_classification_thresholds() {
        let config = EconomyConfig::default();
        assert_eq!(EconomyStatus::classify(85.0, &config), EconomyStatus::Stable);
        assert_eq!(EconomyStatus::classify(50.0, &config), EconomyStatus::Stable);
        assert_eq!(EconomyStatus::classify(45.0, &config), EconomyStatus::Volatile);
        assert_eq!(EconomyStatus::classify(40.0, &config), EconomyStatus::Volatile);
        assert_eq!(EconomyStatus::classify(35.0, &config), EconomyStatus::Critical);
    }

    #[test]
    fn test_seeded_drain_schedule() {
        let config = EconomyConfig::default();
        let now = 100 * MS_PER_HOUR;
        let state = EconomyState::seeded(&config, &config.initial, now);
        assert_eq!(state.last_drain_time, now - MS_PER_HOUR);
        assert_eq!(state.next_drain_time, now + 5 * MS_PER_HOUR);
        assert_eq!(state.claimed_crystals, 1250);
        assert_eq!(state.remaining_crystals(), 8750);
        assert_eq!(state.status, EconomyStatus::Stable);
        assert_eq!(state.current_event, GlobalEvent::None);
    }

    #[test]
    fn test_clamp_stability() {
        assert_eq!(clamp_stability(140.0), 100.0);
        assert_eq!(clamp_stability(-3.0), 0.0);
        assert_eq!(clamp_stability(f32::NAN), 0.0);
    }
}
