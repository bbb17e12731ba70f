//! Economy integration tests
//!
//! Pool and stability invariants under arbitrary call sequences, status
//! classification, events, ads and the shared ticker.

use std::sync::Arc;
use std::time::Duration;

use proptest::prelude::*;

use rooster_empire::core::clock::ManualClock;
use rooster_empire::core::config::{EconomyConfig, EconomySeed};
use rooster_empire::core::rng::{GameRng, ScriptedRolls};
use rooster_empire::core::types::{PlayerId, MS_PER_HOUR};
use rooster_empire::economy::ticker::{share, snapshot, with_economy};
use rooster_empire::economy::{
    spawn_ticker, street_bet, BetOutcome, ClaimRejected, EconomyEngine, EconomyStatus,
    GlobalEvent,
};
use rooster_empire::player::{
    watch_ad, AdBroker, AdError, InstantAdBroker, Notification, PlayerLedger, RecordingNotifier,
};

fn empty_pool_config() -> EconomyConfig {
    EconomyConfig {
        initial: EconomySeed {
            claimed_crystals: 0,
            ..EconomySeed::default()
        },
        ..EconomyConfig::default()
    }
}

#[derive(Debug, Clone)]
enum Op {
    Claim(u32),
    Tick(u64),
    Ad,
    SetStability(f32),
    SetEvent(usize),
    CreditPool(u32),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0u32..5_000).prop_map(Op::Claim),
        (0u64..2 * 24 * MS_PER_HOUR).prop_map(Op::Tick),
        Just(Op::Ad),
        (-500.0f32..500.0).prop_map(Op::SetStability),
        (0usize..5).prop_map(Op::SetEvent),
        (0u32..1_000).prop_map(Op::CreditPool),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(300))]

    /// Claims never overdraw the pool and rejected claims change nothing
    #[test]
    fn prop_pool_invariant(amounts in prop::collection::vec(0u32..6_000, 1..60)) {
        let mut engine = EconomyEngine::new(empty_pool_config(), 0).unwrap();
        for amount in amounts {
            let before = engine.current_state();
            match engine.claim(amount) {
                Ok(remaining) => {
                    prop_assert_eq!(
                        engine.state().claimed_crystals,
                        before.claimed_crystals + amount
                    );
                    prop_assert_eq!(remaining, engine.state().remaining_crystals());
                }
                Err(ClaimRejected { requested, remaining }) => {
                    prop_assert_eq!(requested, amount);
                    prop_assert_eq!(remaining, before.remaining_crystals());
                    prop_assert_eq!(engine.current_state(), before);
                }
            }
            prop_assert!(engine.state().claimed_crystals <= engine.state().daily_crystal_pool);
        }
    }

    /// Stability stays in [0, 100] whatever ticks and overrides arrive
    #[test]
    fn prop_stability_bounds(
        ops in prop::collection::vec(op_strategy(), 1..80),
        seed in any::<u64>()
    ) {
        let mut rng = GameRng::seeded(seed);
        let mut engine = EconomyEngine::new(EconomyConfig::default(), 0).unwrap();
        let mut now = 0u64;
        for op in ops {
            match op {
                Op::Claim(amount) => {
                    let _ = engine.claim(amount);
                }
                Op::Tick(dt) => {
                    now += dt;
                    engine.tick(now, &mut rng);
                }
                Op::Ad => {
                    engine.record_ad_view();
                }
                Op::SetStability(value) => engine.set_stability(value),
                Op::SetEvent(i) => engine.set_event(GlobalEvent::ALL[i], now),
                Op::CreditPool(amount) => engine.credit_pool(amount),
            }
            let state = engine.state();
            prop_assert!((0.0..=100.0).contains(&state.stability_index));
            prop_assert!(state.claimed_crystals <= state.daily_crystal_pool);
        }
    }
}

#[test]
fn test_overdraw_rejected_with_remaining() {
    let mut engine = EconomyEngine::new(empty_pool_config(), 0).unwrap();
    assert_eq!(engine.claim(9_000), Ok(1_000));
    assert_eq!(engine.state().claimed_crystals, 9_000);

    let rejected = engine.claim(2_000).unwrap_err();
    assert_eq!(
        rejected,
        ClaimRejected {
            requested: 2_000,
            remaining: 1_000
        }
    );
    assert_eq!(engine.state().claimed_crystals, 9_000);
}

#[test]
fn test_threshold_classification() {
    let config = EconomyConfig::default();
    assert_eq!(EconomyStatus::classify(45.0, &config), EconomyStatus::Volatile);
    assert_eq!(EconomyStatus::classify(35.0, &config), EconomyStatus::Critical);
    assert_eq!(EconomyStatus::classify(50.0, &config), EconomyStatus::Stable);
    assert_eq!(EconomyStatus::classify(40.0, &config), EconomyStatus::Volatile);
}

#[test]
fn test_drain_reported_then_classified() {
    let start = 24 * MS_PER_HOUR;
    let mut engine = EconomyEngine::new(EconomyConfig::default(), start).unwrap();
    engine.set_stability(45.0);
    assert_eq!(engine.state().status, EconomyStatus::Volatile);

    // Seeded last drain was an hour ago; the next one is due at +5h
    let mut rng = ScriptedRolls::new([]).with_fallback(0.5);
    let report = engine.tick(start + 5 * MS_PER_HOUR, &mut rng);
    assert_eq!(report.drains, 1);
    assert_eq!(report.status, EconomyStatus::Draining);
    assert!((engine.state().stability_index - 43.0).abs() < 1e-4);

    let report = engine.tick(start + 5 * MS_PER_HOUR + 30_000, &mut rng);
    assert_eq!(report.drains, 0);
    assert_eq!(report.status, EconomyStatus::Volatile);
}

#[test]
fn test_event_is_a_pure_value() {
    let mut engine = EconomyEngine::new(EconomyConfig::default(), 0).unwrap();
    let before = engine.current_state();
    engine.set_event(GlobalEvent::PoliceRaid, 10);
    let after = engine.current_state();

    assert_eq!(after.current_event, GlobalEvent::PoliceRaid);
    assert_eq!(after.stability_index, before.stability_index);
    assert_eq!(after.claimed_crystals, before.claimed_crystals);

    // Events stay until changed by default
    engine.tick(30 * 24 * MS_PER_HOUR, &mut GameRng::seeded(1));
    assert_eq!(engine.current_event(), GlobalEvent::PoliceRaid);
}

#[test]
fn test_ads_boost_pool_and_shield_player() {
    let config = EconomyConfig {
        initial: EconomySeed {
            total_ad_views_today: 98,
            ..EconomySeed::default()
        },
        ..EconomyConfig::default()
    };
    let mut engine = EconomyEngine::new(config, 0).unwrap();
    let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
    let sink = RecordingNotifier::new();
    let player = ledger.id.clone();

    let first =
        watch_ad(&InstantAdBroker, &mut engine, &player, &mut ledger, 1_000, &sink).unwrap();
    assert!(!first.pool_boosted);
    let second =
        watch_ad(&InstantAdBroker, &mut engine, &player, &mut ledger, 2_000, &sink).unwrap();
    assert!(second.pool_boosted);
    assert_eq!(engine.state().daily_crystal_pool, 10_500);
    let third =
        watch_ad(&InstantAdBroker, &mut engine, &player, &mut ledger, 3_000, &sink).unwrap();
    assert!(third.shield_activated);

    assert_eq!(ledger.crystals, 10 + 9);
    assert!(ledger.shield.is_active(3_000 + MS_PER_HOUR));
    assert_eq!(ledger.record.total_ad_views, 3);
}

struct NoFill;

impl AdBroker for NoFill {
    fn play(&self, _player: &PlayerId) -> Result<(), AdError> {
        Err(AdError::NoFill)
    }
}

#[test]
fn test_failed_ad_changes_nothing() {
    let mut engine = EconomyEngine::new(EconomyConfig::default(), 0).unwrap();
    let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
    let economy_before = engine.current_state();
    let ledger_before = ledger.clone();
    let sink = RecordingNotifier::new();
    let player = ledger.id.clone();

    assert!(watch_ad(&NoFill, &mut engine, &player, &mut ledger, 0, &sink).is_err());
    assert_eq!(engine.current_state(), economy_before);
    assert_eq!(ledger, ledger_before);
    assert_eq!(sink.count(|n| matches!(n, Notification::Error { .. })), 1);
}

#[test]
fn test_shield_skips_raid_roll() {
    // A zero draw raids anyone unshielded and loses a shielded bet
    let mut rolls = ScriptedRolls::new([0.0, 0.9]);
    let outcome = street_bet(100, 1_000, 10.0, GlobalEvent::PoliceRaid, true, &mut rolls).unwrap();
    assert_eq!(outcome, BetOutcome::Lost { stake: 100 });

    let mut rolls = ScriptedRolls::new([0.0, 0.9]);
    let outcome = street_bet(100, 1_000, 10.0, GlobalEvent::PoliceRaid, false, &mut rolls).unwrap();
    assert_eq!(outcome, BetOutcome::Raided { fine: 200 });
}

#[tokio::test]
async fn test_ticker_and_admin_share_the_engine() {
    let clock = Arc::new(ManualClock::starting_at(0));
    let economy = share(EconomyEngine::new(EconomyConfig::default(), 0).unwrap());
    let handle = spawn_ticker(
        Arc::clone(&economy),
        clock.clone(),
        GameRng::seeded(7),
        Duration::from_millis(5),
    );

    clock.advance(6 * MS_PER_HOUR);
    with_economy(&economy, |engine| engine.set_event(GlobalEvent::BountyHunt, 0));
    tokio::time::sleep(Duration::from_millis(50)).await;
    let ticks = handle.stop().await;

    let state = snapshot(&economy);
    assert!(ticks >= 1);
    assert_eq!(state.current_event, GlobalEvent::BountyHunt);
    assert!(state.last_drain_time >= 5 * MS_PER_HOUR);
    assert!((0.0..=100.0).contains(&state.stability_index));
}
