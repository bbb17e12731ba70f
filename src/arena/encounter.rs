//! One slingshot fight wired to its collaborators
//!
//! An encounter is only created once the opponent is known, so a failed
//! enemy fetch never leaves a half-started fight behind.

use std::sync::Arc;

use glam::Vec2;

use crate::arena::body::Arena;
use crate::arena::session::{ArenaEvent, ArenaSession, ArenaView, Outcome, SessionStats};
use crate::arena::sling::{InputRejected, PointerInput};
use crate::combat::{check_matchup, Combatant};
use crate::core::config::ArenaConfig;
use crate::core::error::{GameError, Result};
use crate::core::rng::RandomSource;
use crate::economy::GlobalEvent;
use crate::player::enemy::EnemyProvider;
use crate::player::notify::{Notification, NotificationSink};
use crate::player::store::{PlayerStore, Settlement};

pub struct Encounter {
    session: ArenaSession,
    player: Combatant,
    enemy: Combatant,
    zone: String,
    reward_multiplier: f32,
    sink: Arc<dyn NotificationSink>,
    best_hit: f32,
    damage_taken: f32,
    settled: bool,
}

impl Encounter {
    /// Check energy, fetch the opponent once and open the session
    #[allow(clippy::too_many_arguments)]
    pub fn begin(
        config: ArenaConfig,
        arena: Arena,
        store: &dyn PlayerStore,
        enemies: &dyn EnemyProvider,
        zone_id: &str,
        event: GlobalEvent,
        rng: &mut dyn RandomSource,
        sink: Arc<dyn NotificationSink>,
    ) -> Result<Self> {
        let rooster = store.active_rooster().ok_or(GameError::NoActiveCombatant)?;
        if rooster.energy < config.min_energy_to_fight {
            sink.notify(Notification::error("Energy too low!"));
            return Err(GameError::NotEnoughEnergy {
                have: rooster.energy,
                need: config.min_energy_to_fight,
            });
        }

        let enemy = match enemies.enemy_for_zone(zone_id, rng) {
            Ok(enemy) => enemy,
            Err(e) => {
                tracing::warn!(zone = zone_id, error = %e, "Could not start fight");
                sink.notify(Notification::error("Could not start the fight."));
                return Err(e.into());
            }
        };
        let player = rooster.combatant.clone();
        check_matchup(&player, &enemy)?;

        let stats = SessionStats {
            player_hp: player.stats.health,
            player_attack: player.stats.attack,
            enemy_hp: enemy.stats.health,
            enemy_attack: enemy.stats.attack,
        };
        let session = ArenaSession::new(config, arena, stats);

        tracing::info!(
            session = %session.id().0,
            zone = zone_id,
            player = %player.name,
            enemy = %enemy.name,
            %event,
            "Encounter started"
        );
        sink.notify(Notification::BattleStart {
            opponent: enemy.name.clone(),
        });

        Ok(Self {
            session,
            player,
            enemy,
            zone: zone_id.to_string(),
            reward_multiplier: event.effects().combat_reward,
            sink,
            best_hit: 0.0,
            damage_taken: 0.0,
            settled: false,
        })
    }

    pub fn session(&self) -> &ArenaSession {
        &self.session
    }

    pub fn player(&self) -> &Combatant {
        &self.player
    }

    pub fn enemy(&self) -> &Combatant {
        &self.enemy
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.session.outcome()
    }

    pub fn is_settled(&self) -> bool {
        self.settled
    }

    pub fn view(&self) -> ArenaView {
        self.session.view()
    }

    /// Reposition the enemy for scripted scenarios
    pub fn place_enemy(&mut self, pos: Vec2, patrol_vx: f32) {
        self.session.place_enemy(pos, patrol_vx);
    }

    pub fn handle_input(&mut self, input: PointerInput) -> std::result::Result<(), InputRejected> {
        match input {
            PointerInput::Down { x, y } => {
                self.session.pointer_down(x, y)?;
            }
            PointerInput::Move { x, y } => self.session.pointer_move(x, y)?,
            PointerInput::Up => {
                self.session.pointer_up();
            }
        }
        self.pump();
        Ok(())
    }

    /// Run the simulation forward and forward its events as notifications
    pub fn advance(&mut self, elapsed_ms: f64) -> Vec<ArenaEvent> {
        self.session.advance(elapsed_ms);
        self.pump()
    }

    /// Single fixed step, for headless drivers
    pub fn step(&mut self) -> Vec<ArenaEvent> {
        self.session.step();
        self.pump()
    }

    fn pump(&mut self) -> Vec<ArenaEvent> {
        let events = self.session.take_events();
        for event in &events {
            match *event {
                ArenaEvent::Launched { power, .. } => {
                    self.sink.notify(Notification::Launch { power });
                }
                ArenaEvent::Hit { damage, .. } => {
                    self.best_hit = self.best_hit.max(damage);
                    self.sink.notify(Notification::Hit {
                        damage: damage.round() as u32,
                        critical: false,
                    });
                }
                ArenaEvent::Miss { damage, .. } => {
                    self.damage_taken += damage;
                    self.sink.notify(Notification::error(format!(
                        "Missed! {} took {damage} damage",
                        self.player.name
                    )));
                }
                ArenaEvent::Finished { outcome: Outcome::Win } => {
                    self.sink
                        .notify(Notification::success(format!("{} is down!", self.enemy.name)));
                }
                ArenaEvent::Finished { outcome: Outcome::Lose } => {
                    self.sink.notify(Notification::error(format!(
                        "{} was knocked out",
                        self.player.name
                    )));
                }
                ArenaEvent::Cancelled | ArenaEvent::Respawned => {}
            }
        }
        events
    }

    /// What the finished fight pays
    pub fn settlement(&self) -> Option<Settlement> {
        let config = self.session.config();
        let outcome = self.outcome()?;
        Some(match outcome {
            Outcome::Win => Settlement {
                won: true,
                payout: config.win_reward.scaled(self.reward_multiplier),
                energy_cost: config.win_energy_cost,
                damage_taken: self.damage_taken,
                best_hit: self.best_hit.round() as u32,
            },
            Outcome::Lose => Settlement {
                won: false,
                payout: config.loss_reward,
                energy_cost: config.loss_energy_cost,
                damage_taken: self.damage_taken,
                best_hit: self.best_hit.round() as u32,
            },
        })
    }

    /// Report the outcome to the player store, once
    ///
    /// Returns `None` while the fight is running and on every call after the
    /// first successful one.
    pub fn settle(&mut self, store: &mut dyn PlayerStore) -> Result<Option<Settlement>> {
        if self.settled {
            return Ok(None);
        }
        let Some(settlement) = self.settlement() else {
            return Ok(None);
        };
        store.settle(&settlement)?;
        self.settled = true;
        Ok(Some(settlement))
    }
}

impl std::fmt::Debug for Encounter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Encounter")
            .field("session", &self.session.id())
            .field("zone", &self.zone)
            .field("player", &self.player.name)
            .field("enemy", &self.enemy.name)
            .field("settled", &self.settled)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::rng::ScriptedRolls;
    use crate::player::enemy::{EnemyError, ScaledEnemyProvider};
    use crate::player::notify::RecordingNotifier;
    use crate::player::store::PlayerLedger;
    use crate::core::config::ZoneConfig;

    struct Offline;

    impl EnemyProvider for Offline {
        fn enemy_for_zone(
            &self,
            _zone_id: &str,
            _rng: &mut dyn RandomSource,
        ) -> std::result::Result<Combatant, EnemyError> {
            Err(EnemyError::Unavailable("timeout".into()))
        }
    }

    fn begin(ledger: &PlayerLedger, sink: Arc<RecordingNotifier>) -> Result<Encounter> {
        let config = ArenaConfig::default();
        let arena = Arena::standard(&config)?;
        Encounter::begin(
            config,
            arena,
            ledger,
            &ScaledEnemyProvider::new(ZoneConfig::default_ladder()),
            "d1",
            GlobalEvent::BountyHunt,
            &mut ScriptedRolls::new([]),
            sink,
        )
    }

    #[test]
    fn test_begin_announces_battle() {
        let ledger = PlayerLedger::new_player("p1", "tester", 0);
        let sink = Arc::new(RecordingNotifier::new());
        let encounter = begin(&ledger, sink.clone()).unwrap();
        assert_eq!(encounter.enemy().level, 1);
        assert_eq!(
            sink.count(|n| matches!(n, Notification::BattleStart { .. })),
            1
        );
    }

    #[test]
    fn test_low_energy_refused() {
        let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
        ledger.active_rooster_mut().unwrap().energy = 9;
        let sink = Arc::new(RecordingNotifier::new());
        assert!(matches!(
            begin(&ledger, sink.clone()),
            Err(GameError::NotEnoughEnergy { have: 9, need: 10 })
        ));
        assert_eq!(sink.count(|n| matches!(n, Notification::BattleStart { .. })), 0);
    }

    #[test]
    fn test_failed_fetch_starts_nothing() {
        let ledger = PlayerLedger::new_player("p1", "tester", 0);
        let before = ledger.clone();
        let sink = Arc::new(RecordingNotifier::new());
        let config = ArenaConfig::default();
        let arena = Arena::standard(&config).unwrap();
        let result = Encounter::begin(
            config,
            arena,
            &ledger,
            &Offline,
            "d1",
            GlobalEvent::None,
            &mut ScriptedRolls::new([]),
            sink.clone(),
        );
        assert!(matches!(result, Err(GameError::Enemy(_))));
        assert_eq!(ledger, before);
        assert_eq!(sink.count(|n| matches!(n, Notification::Error { .. })), 1);
    }

    #[test]
    fn test_unsettled_until_over() {
        let mut ledger = PlayerLedger::new_player("p1", "tester", 0);
        let sink = Arc::new(RecordingNotifier::new());
        let mut encounter = begin(&ledger, sink).unwrap();
        assert_eq!(encounter.settle(&mut ledger).unwrap(), None);
        assert!(!encounter.is_settled());
    }
}
