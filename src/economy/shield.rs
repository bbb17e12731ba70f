//! Per-player raid shield earned by watching ads

use serde::{Deserialize, Serialize};

use crate::core::config::EconomyConfig;
use crate::core::types::Timestamp;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShieldState {
    /// Ads this player has watched, all time
    pub ads_watched: u64,
    pub shield_expires_at: Option<Timestamp>,
}

impl ShieldState {
    pub fn is_active(&self, now: Timestamp) -> bool {
        self.shield_expires_at.is_some_and(|t| now < t)
    }

    pub fn remaining_ms(&self, now: Timestamp) -> u64 {
        self.shield_expires_at
            .map(|t| t.saturating_sub(now))
            .unwrap_or(0)
    }

    /// Count one ad; returns true when this view switched the shield on
    pub fn record_ad(&mut self, now: Timestamp, config: &EconomyConfig) -> bool {
        self.ads_watched += 1;
        if self.ads_watched % config.ads_for_shield.max(1) != 0 {
            return false;
        }
        self.shield_expires_at = Some(now + config.shield_duration_ms);
        tracing::info!(expires_at = now + config.shield_duration_ms, "Shield activated");
        true
    }

    /// Ads left until the next shield
    pub fn ads_until_shield(&self, config: &EconomyConfig) -> u64 {
        let every = config.ads_for_shield.max(1);
        every - self.ads_watched % every
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::MS_PER_DAY;

    #[test]
    fn test_every_third_ad_shields() {
        let config = EconomyConfig::default();
        let mut shield = ShieldState::default();
        assert!(!shield.record_ad(0, &config));
        assert!(!shield.record_ad(0, &config));
        assert!(!shield.is_active(0));
        assert!(shield.record_ad(1_000, &config));
        assert!(shield.is_active(1_000));
        assert_eq!(shield.remaining_ms(1_000), MS_PER_DAY);
        assert_eq!(shield.ads_until_shield(&config), 3);
    }

    #[test]
    fn test_shield_expires() {
        let config = EconomyConfig::default();
        let mut shield = ShieldState::default();
        for _ in 0..3 {
            shield.record_ad(0, &config);
        }
        assert!(shield.is_active(MS_PER_DAY - 1));
        assert!(!shield.is_active(MS_PER_DAY));
        assert_eq!(shield.remaining_ms(MS_PER_DAY + 5), 0);
    }
}
