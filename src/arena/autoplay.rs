//! Headless slingshot fights
//!
//! A bot pulls the sling in a random direction each turn. Every launch
//! becomes one [`CombatRound`]: a hit is a round by the player, a miss is a
//! round by the enemy dealing its attack back. This lets the slingshot game
//! stand in anywhere a [`CombatEngine`] is expected.

use std::f64::consts::PI;
use std::sync::Arc;

use glam::Vec2;

use crate::arena::body::Arena;
use crate::arena::session::{ArenaEvent, ArenaSession, Outcome, Phase, SessionStats};
use crate::combat::{
    check_matchup, CombatEngine, CombatError, CombatResult, CombatRound, Combatant, Commentary,
    CommentaryCategory, CommentaryTable, Rewards,
};
use crate::core::config::ArenaConfig;
use crate::core::error::Result;
use crate::core::rng::RandomSource;

/// Steps one launch may take before the bot gives up on it
pub const LAUNCH_STEP_LIMIT: u32 = 1_200;

/// Pick a pull offset from the anchor: downward half-plane, long enough to fire
pub fn random_pull(config: &ArenaConfig, rng: &mut dyn RandomSource) -> Vec2 {
    let (sin, cos) = rng.range(0.0, PI).sin_cos();
    let shortest = (config.min_launch_distance + 1.0).min(config.max_drag_distance);
    let distance = rng.range(shortest as f64, config.max_drag_distance as f64);
    Vec2::new((cos * distance) as f32, (sin * distance) as f32)
}

#[derive(Clone)]
pub struct SlingshotEngine {
    config: ArenaConfig,
    arena: Arena,
    max_rounds: u32,
    step_limit: u32,
    commentary: Arc<dyn Commentary>,
}

impl SlingshotEngine {
    pub fn new(config: ArenaConfig, max_rounds: u32) -> Result<Self> {
        let arena = Arena::standard(&config)?;
        Ok(Self {
            config,
            arena,
            max_rounds: max_rounds.max(1),
            step_limit: LAUNCH_STEP_LIMIT,
            commentary: Arc::new(CommentaryTable),
        })
    }

    pub fn with_step_limit(mut self, step_limit: u32) -> Self {
        self.step_limit = step_limit.max(1);
        self
    }

    pub fn with_commentary(mut self, commentary: Arc<dyn Commentary>) -> Self {
        self.commentary = commentary;
        self
    }

    fn launch(&self, session: &mut ArenaSession, pull: Vec2) -> bool {
        let anchor = self.arena.anchor;
        let target = anchor + pull;
        let grabbed = session.pointer_down(anchor.x, anchor.y).unwrap_or(false);
        if !grabbed || session.pointer_move(target.x, target.y).is_err() {
            return false;
        }
        matches!(session.pointer_up(), Some(ArenaEvent::Launched { .. }))
    }

    /// Step until the projectile is back on the sling; returns the hits and
    /// misses the shot produced, in order
    fn fly_out(&self, session: &mut ArenaSession) -> Vec<ArenaEvent> {
        let mut decisive = Vec::new();
        for _ in 0..self.step_limit {
            session.step();
            decisive.extend(
                session
                    .take_events()
                    .into_iter()
                    .filter(|e| matches!(e, ArenaEvent::Hit { .. } | ArenaEvent::Miss { .. })),
            );
            if matches!(session.phase(), Phase::Aiming | Phase::Over { .. }) {
                break;
            }
        }
        decisive
    }
}

impl std::fmt::Debug for SlingshotEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlingshotEngine")
            .field("arena", &self.arena)
            .field("max_rounds", &self.max_rounds)
            .field("step_limit", &self.step_limit)
            .finish()
    }
}

impl CombatEngine for SlingshotEngine {
    fn name(&self) -> &'static str {
        "slingshot"
    }

    fn resolve(
        &mut self,
        attacker: &Combatant,
        defender: &Combatant,
        rng: &mut dyn RandomSource,
    ) -> std::result::Result<CombatResult, CombatError> {
        check_matchup(attacker, defender)?;

        let stats = SessionStats {
            player_hp: attacker.stats.health,
            player_attack: attacker.stats.attack,
            enemy_hp: defender.stats.health,
            enemy_attack: defender.stats.attack,
        };
        let mut session = ArenaSession::new(self.config.clone(), self.arena, stats);
        let mut rounds = Vec::new();
        let mut player_hp = session.player_hp();

        while rounds.len() < self.max_rounds as usize && !session.is_over() {
            let index = rounds.len();
            let pull = random_pull(&self.config, rng);
            if !self.launch(&mut session, pull) {
                break;
            }
            let shots = self.fly_out(&mut session);
            if shots.is_empty() {
                tracing::warn!(steps = self.step_limit, "Launch never came down");
                rounds.push(CombatRound::miss(
                    attacker.id,
                    defender.id,
                    self.commentary.line(CommentaryCategory::Miss, index),
                    (session.player_hp(), session.enemy().hp),
                ));
                break;
            }
            for shot in shots {
                if rounds.len() >= self.max_rounds as usize {
                    break;
                }
                let index = rounds.len();
                match shot {
                    ArenaEvent::Hit {
                        damage, enemy_hp, ..
                    } => rounds.push(CombatRound::hit(
                        attacker.id,
                        defender.id,
                        damage.round() as u32,
                        false,
                        self.commentary.line(CommentaryCategory::Hit, index),
                        (player_hp, enemy_hp),
                    )),
                    ArenaEvent::Miss {
                        damage,
                        player_hp: left,
                    } => {
                        player_hp = left;
                        rounds.push(CombatRound::hit(
                            defender.id,
                            attacker.id,
                            damage.round() as u32,
                            false,
                            self.commentary.line(CommentaryCategory::Miss, index),
                            (session.enemy().hp, left),
                        ));
                    }
                    _ => {}
                }
            }
        }

        let (attacker_won, decided_on_points) = match session.outcome() {
            Some(outcome) => (outcome == Outcome::Win, false),
            None => (session.player_hp() > session.enemy().hp, true),
        };
        let (winner_id, loser_id, payout) = if attacker_won {
            (attacker.id, defender.id, self.config.win_reward)
        } else {
            (defender.id, attacker.id, self.config.loss_reward)
        };

        tracing::debug!(
            rounds = rounds.len(),
            launches = session.launches(),
            attacker_won,
            decided_on_points,
            "Slingshot fight resolved"
        );
        Ok(CombatResult {
            winner_id,
            loser_id,
            rounds,
            rewards: Rewards::new(payout),
            decided_on_points,
        })
    }
}
