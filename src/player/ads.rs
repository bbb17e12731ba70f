//! Rewarded ads
//!
//! One watched ad counts towards the global pool boost, counts towards the
//! player's shield and pays the player a few crystals.

use serde::Serialize;
use thiserror::Error;

use crate::core::error::Result;
use crate::core::types::{PlayerId, Timestamp, MS_PER_HOUR};
use crate::economy::EconomyEngine;
use crate::player::notify::{Notification, NotificationSink};
use crate::player::store::PlayerStore;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AdError {
    #[error("no ad available")]
    NoFill,

    #[error("ad closed before completion")]
    Interrupted,

    #[error("ad network unavailable: {0}")]
    Unavailable(String),
}

/// Plays an ad to completion or fails
pub trait AdBroker: Send + Sync {
    fn play(&self, player: &PlayerId) -> std::result::Result<(), AdError>;
}

/// Every ad completes immediately
#[derive(Debug, Default, Clone, Copy)]
pub struct InstantAdBroker;

impl AdBroker for InstantAdBroker {
    fn play(&self, _player: &PlayerId) -> std::result::Result<(), AdError> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdReward {
    pub crystals: u32,
    pub total_views: u64,
    pub pool_boosted: bool,
    pub shield_activated: bool,
}

/// Play an ad and pay out
///
/// A failed ad changes nothing and raises an `Error` notification.
pub fn watch_ad(
    broker: &dyn AdBroker,
    economy: &mut EconomyEngine,
    player_id: &PlayerId,
    player: &mut dyn PlayerStore,
    now: Timestamp,
    sink: &dyn NotificationSink,
) -> Result<AdReward> {
    if let Err(e) = broker.play(player_id) {
        tracing::warn!(player = %player_id.0, error = %e, "Ad failed");
        sink.notify(Notification::error("The ad could not be played."));
        return Err(e.into());
    }

    let view = economy.record_ad_view();
    let shield_activated = player.shield_mut().record_ad(now, economy.config());
    let crystals = economy.config().ad_reward;
    player.credit_crystals(crystals as u64);
    player.record_ad_view();

    let message = if shield_activated {
        let hours = economy.config().shield_duration_ms / MS_PER_HOUR;
        format!("+{crystals} crystals. Shield active for {hours}h!")
    } else {
        format!("+{crystals} crystals")
    };
    sink.notify(Notification::success(message));

    Ok(AdReward {
        crystals,
        total_views: view.total_views,
        pool_boosted: view.pool_boosted,
        shield_activated,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::EconomyConfig;
    use crate::core::error::GameError;
    use crate::player::notify::RecordingNotifier;
    use crate::player::store::PlayerLedger;

    struct DeadNetwork;

    impl AdBroker for DeadNetwork {
        fn play(&self, _player: &PlayerId) -> std::result::Result<(), AdError> {
            Err(AdError::Unavailable("offline".into()))
        }
    }

    #[test]
    fn test_third_ad_shields_and_pays() {
        let mut economy = EconomyEngine::new(EconomyConfig::default(), 0).unwrap();
        let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
        let id = ledger.id.clone();
        let sink = RecordingNotifier::new();

        let mut last = None;
        for _ in 0..3 {
            last = Some(
                watch_ad(&InstantAdBroker, &mut economy, &id, &mut ledger, 5, &sink).unwrap(),
            );
        }
        let reward = last.unwrap();
        assert!(reward.shield_activated);
        assert_eq!(ledger.crystals, 10 + 9);
        assert!(ledger.shield.is_active(5));
        assert_eq!(ledger.record.total_ad_views, 3);
        assert_eq!(economy.state().total_ad_views_today, 859);
        assert_eq!(
            sink.snapshot().last(),
            Some(&Notification::success("+3 crystals. Shield active for 24h!"))
        );
    }

    #[test]
    fn test_shield_message_uses_configured_duration() {
        let config = EconomyConfig {
            ads_for_shield: 1,
            shield_duration_ms: 6 * MS_PER_HOUR,
            ..EconomyConfig::default()
        };
        let mut economy = EconomyEngine::new(config, 0).unwrap();
        let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
        let id = ledger.id.clone();
        let sink = RecordingNotifier::new();

        let reward = watch_ad(&InstantAdBroker, &mut economy, &id, &mut ledger, 0, &sink).unwrap();
        assert!(reward.shield_activated);
        assert_eq!(
            sink.snapshot(),
            vec![Notification::success("+3 crystals. Shield active for 6h!")]
        );
    }

    #[test]
    fn test_failed_ad_changes_nothing() {
        let mut economy = EconomyEngine::new(EconomyConfig::default(), 0).unwrap();
        let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
        let id = ledger.id.clone();
        let before = (economy.current_state(), ledger.clone());
        let sink = RecordingNotifier::new();

        let result = watch_ad(&DeadNetwork, &mut economy, &id, &mut ledger, 0, &sink);
        assert!(matches!(result, Err(GameError::Ad(AdError::Unavailable(_)))));
        assert_eq!((economy.current_state(), ledger), before);
        assert_eq!(sink.count(|n| matches!(n, Notification::Error { .. })), 1);
    }
}
