//! Slingshot fight state machine
//!
//! ```text
//! Aiming -> Dragging -> Flying -> Hit  -> Rebounding -> Aiming
//!                   \-> Aiming    Miss -> Aiming       \-> Miss (floor)
//!                       (cancel)  Hit/Miss -> Over(Win | Lose)
//! ```
//!
//! The simulation runs in fixed steps of `1 / step_hz` seconds. Wall-clock
//! time handed to [`ArenaSession::advance`] is accumulated and converted to
//! whole steps, so behaviour does not depend on the caller's frame rate.

use glam::Vec2;
use serde::Serialize;

use crate::arena::body::{Arena, EnemyBody, PhysicsBody};
use crate::arena::sling::{clamp_drag, launch_velocity, sanitize, InputRejected};
use crate::core::config::ArenaConfig;
use crate::core::types::SessionId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Outcome {
    Win,
    Lose,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum Phase {
    Aiming,
    Dragging,
    Flying,
    /// Bouncing away from the enemy; enemy collisions are off, the floor is not
    Rebounding { respawn_at_ms: f64 },
    Over { outcome: Outcome },
}

/// Things that happened during input handling or a step
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ArenaEvent {
    Launched { velocity: Vec2, power: f32 },
    Cancelled,
    Hit { damage: f32, enemy_hp: f32, impact_vy: f32 },
    Miss { damage: f32, player_hp: f32 },
    Respawned,
    Finished { outcome: Outcome },
}

/// Fighter numbers the session needs
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionStats {
    pub player_hp: f32,
    pub player_attack: f32,
    pub enemy_hp: f32,
    pub enemy_attack: f32,
}

/// Throttled projection for observers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArenaView {
    pub session: SessionId,
    pub phase: Phase,
    pub player_pos: Vec2,
    pub player_rotation: f32,
    pub enemy_pos: Vec2,
    pub player_hp: f32,
    pub player_max_hp: f32,
    pub enemy_hp: f32,
    pub enemy_max_hp: f32,
    pub trajectory: Vec<Vec2>,
    pub steps: u64,
}

#[derive(Debug, Clone)]
pub struct ArenaSession {
    id: SessionId,
    config: ArenaConfig,
    arena: Arena,
    player: PhysicsBody,
    enemy: EnemyBody,
    phase: Phase,
    player_hp: f32,
    player_max_hp: f32,
    player_attack: f32,
    enemy_attack: f32,
    sim_ms: f64,
    accumulator_ms: f64,
    steps: u64,
    launches: u32,
    events: Vec<ArenaEvent>,
}

impl ArenaSession {
    pub fn new(config: ArenaConfig, arena: Arena, stats: SessionStats) -> Self {
        let player = PhysicsBody::anchored(arena.anchor, config.player_radius);
        let enemy = EnemyBody::spawn(&arena, &config, stats.enemy_hp.max(0.0));
        Self {
            id: SessionId::new(),
            config,
            arena,
            player,
            enemy,
            phase: Phase::Aiming,
            player_hp: stats.player_hp.max(0.0),
            player_max_hp: stats.player_hp.max(0.0),
            player_attack: stats.player_attack,
            enemy_attack: stats.enemy_attack,
            sim_ms: 0.0,
            accumulator_ms: 0.0,
            steps: 0,
            launches: 0,
            events: Vec::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn player(&self) -> &PhysicsBody {
        &self.player
    }

    pub fn enemy(&self) -> &EnemyBody {
        &self.enemy
    }

    pub fn player_hp(&self) -> f32 {
        self.player_hp
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn launches(&self) -> u32 {
        self.launches
    }

    pub fn outcome(&self) -> Option<Outcome> {
        match self.phase {
            Phase::Over { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_over(&self) -> bool {
        self.outcome().is_some()
    }

    /// Move the enemy, e.g. for scripted scenarios
    pub fn place_enemy(&mut self, pos: Vec2, patrol_vx: f32) {
        if pos.is_finite() && patrol_vx.is_finite() {
            self.enemy.pos = pos;
            self.enemy.patrol_vx = patrol_vx;
        }
    }

    /// Events since the last call
    pub fn take_events(&mut self) -> Vec<ArenaEvent> {
        std::mem::take(&mut self.events)
    }

    /// Press: grabs the projectile when close enough. Returns whether it did.
    pub fn pointer_down(&mut self, x: f32, y: f32) -> Result<bool, InputRejected> {
        let point = sanitize(x, y)?;
        if self.phase != Phase::Aiming {
            return Ok(false);
        }
        if point.distance(self.player.pos) < self.config.grab_radius {
            self.player.is_dragging = true;
            self.phase = Phase::Dragging;
            return Ok(true);
        }
        Ok(false)
    }

    /// Drag: pulls the projectile, clamped around the anchor
    pub fn pointer_move(&mut self, x: f32, y: f32) -> Result<(), InputRejected> {
        let point = sanitize(x, y)?;
        if self.phase == Phase::Dragging {
            self.player.pos = clamp_drag(self.arena.anchor, point, self.config.max_drag_distance);
        }
        Ok(())
    }

    /// Release: fires if pulled far enough, otherwise snaps back
    pub fn pointer_up(&mut self) -> Option<ArenaEvent> {
        if self.phase != Phase::Dragging {
            return None;
        }
        let pull = self.arena.anchor.distance(self.player.pos);
        let event = if pull > self.config.min_launch_distance {
            let velocity =
                launch_velocity(self.arena.anchor, self.player.pos, self.config.sling_force);
            self.player.vel = velocity;
            self.player.is_dragging = false;
            self.player.is_flying = true;
            self.phase = Phase::Flying;
            self.launches += 1;
            let power = pull / self.config.max_drag_distance;
            tracing::debug!(launch = self.launches, ?velocity, "Launched");
            ArenaEvent::Launched { velocity, power }
        } else {
            self.player.reset_to(self.arena.anchor);
            self.phase = Phase::Aiming;
            ArenaEvent::Cancelled
        };
        self.events.push(event);
        Some(event)
    }

    /// Feed elapsed wall-clock time; returns the number of steps run
    pub fn advance(&mut self, elapsed_ms: f64) -> u32 {
        if self.is_over() {
            return 0;
        }
        if elapsed_ms.is_finite() && elapsed_ms > 0.0 {
            self.accumulator_ms += elapsed_ms;
        }
        let step_ms = self.config.step_ms();
        let mut ran = 0;
        while self.accumulator_ms >= step_ms && ran < self.config.max_steps_per_advance {
            self.accumulator_ms -= step_ms;
            self.step();
            ran += 1;
            if self.is_over() {
                self.accumulator_ms = 0.0;
                break;
            }
        }
        // Drop backlog a stalled caller could not work off
        self.accumulator_ms = self.accumulator_ms.min(step_ms);
        ran
    }

    /// One fixed simulation step
    pub fn step(&mut self) {
        if self.is_over() {
            return;
        }
        self.steps += 1;
        self.sim_ms += self.config.step_ms();
        self.enemy.patrol(&self.arena, self.config.enemy_patrol_margin);

        match self.phase {
            Phase::Flying => {
                self.fly();
                if self.player.below_floor(&self.arena) {
                    self.on_miss();
                } else if self.player.overlaps(&self.enemy) {
                    self.on_hit();
                }
            }
            Phase::Rebounding { respawn_at_ms } => {
                self.fly();
                if self.player.below_floor(&self.arena) {
                    self.on_miss();
                } else if self.sim_ms >= respawn_at_ms {
                    self.respawn();
                    self.events.push(ArenaEvent::Respawned);
                }
            }
            Phase::Aiming | Phase::Dragging | Phase::Over { .. } => {}
        }
    }

    /// Predicted flight path from the current pull
    ///
    /// Empty unless the projectile is being dragged. Stops after the first
    /// point past the floor line.
    pub fn preview(&self) -> Vec<Vec2> {
        if self.phase != Phase::Dragging {
            return Vec::new();
        }
        let mut ghost = self.player;
        ghost.vel = launch_velocity(self.arena.anchor, self.player.pos, self.config.sling_force);
        let mut points = Vec::with_capacity(self.config.preview_steps);
        for _ in 0..self.config.preview_steps {
            ghost.integrate(self.config.gravity, self.config.air_drag);
            points.push(ghost.pos);
            if ghost.pos.y > self.arena.height {
                break;
            }
        }
        points
    }

    pub fn view(&self) -> ArenaView {
        let player_rotation = match self.phase {
            Phase::Dragging => {
                let facing = self.arena.anchor - self.player.pos;
                facing.y.atan2(facing.x)
            }
            _ => self.player.rotation(),
        };
        ArenaView {
            session: self.id,
            phase: self.phase,
            player_pos: self.player.pos,
            player_rotation,
            enemy_pos: self.enemy.pos,
            player_hp: self.player_hp,
            player_max_hp: self.player_max_hp,
            enemy_hp: self.enemy.hp,
            enemy_max_hp: self.enemy.max_hp,
            trajectory: self.preview(),
            steps: self.steps,
        }
    }

    fn fly(&mut self) {
        self.player.integrate(self.config.gravity, self.config.air_drag);
        self.player.bounce_in(&self.arena, self.config.bounce_damping);
    }

    fn on_hit(&mut self) {
        let impact_vy = self.player.vel.y;
        let damage = self.player_attack * (1.0 + self.config.impact_speed_bonus * impact_vy.abs());
        let enemy_hp = self.enemy.take_damage(damage);
        self.events.push(ArenaEvent::Hit {
            damage,
            enemy_hp,
            impact_vy,
        });
        tracing::debug!(damage, enemy_hp, "Enemy hit");

        if self.enemy.is_down() {
            self.finish(Outcome::Win);
            return;
        }
        let rebound = self.config.hit_rebound;
        self.player.vel = Vec2::new(-self.player.vel.x * rebound, -impact_vy.abs() * rebound);
        self.phase = Phase::Rebounding {
            respawn_at_ms: self.sim_ms + self.config.respawn_delay_ms as f64,
        };
    }

    fn on_miss(&mut self) {
        let damage = self.enemy_attack;
        self.player_hp = (self.player_hp - damage).max(0.0);
        self.events.push(ArenaEvent::Miss {
            damage,
            player_hp: self.player_hp,
        });
        tracing::debug!(damage, player_hp = self.player_hp, "Shot missed");

        if self.player_hp <= 0.0 {
            self.finish(Outcome::Lose);
        } else {
            self.respawn();
        }
    }

    fn respawn(&mut self) {
        self.player.reset_to(self.arena.anchor);
        self.phase = Phase::Aiming;
    }

    fn finish(&mut self, outcome: Outcome) {
        self.phase = Phase::Over { outcome };
        self.player.is_flying = false;
        self.events.push(ArenaEvent::Finished { outcome });
        tracing::info!(?outcome, launches = self.launches, steps = self.steps, "Arena fight over");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> SessionStats {
        SessionStats {
            player_hp: 100.0,
            player_attack: 15.0,
            enemy_hp: 100.0,
            enemy_attack: 10.0,
        }
    }

    fn session() -> ArenaSession {
        let config = ArenaConfig::default();
        let arena = Arena::standard(&config).unwrap();
        ArenaSession::new(config, arena, stats())
    }

    fn pull(session: &mut ArenaSession, offset: Vec2) {
        let anchor = session.arena().anchor;
        assert!(session.pointer_down(anchor.x, anchor.y).unwrap());
        let target = anchor + offset;
        session.pointer_move(target.x, target.y).unwrap();
    }

    #[test]
    fn test_grab_requires_proximity() {
        let mut s = session();
        assert!(!s.pointer_down(0.0, 0.0).unwrap());
        assert_eq!(s.phase(), Phase::Aiming);
    }

    #[test]
    fn test_nan_pointer_rejected_state_untouched() {
        let mut s = session();
        pull(&mut s, Vec2::new(0.0, 50.0));
        let before = s.player().pos;
        assert!(s.pointer_move(f32::NAN, 3.0).is_err());
        assert_eq!(s.player().pos, before);
    }

    #[test]
    fn test_short_pull_cancels() {
        let mut s = session();
        pull(&mut s, Vec2::new(0.0, 10.0));
        assert_eq!(s.pointer_up(), Some(ArenaEvent::Cancelled));
        assert_eq!(s.phase(), Phase::Aiming);
        assert_eq!(s.player().pos, s.arena().anchor);
        assert_eq!(s.launches(), 0);
    }

    #[test]
    fn test_long_pull_launches_opposite() {
        let mut s = session();
        pull(&mut s, Vec2::new(0.0, 500.0));
        // Clamped to 160, launch speed 160 * 0.25 upwards
        match s.pointer_up() {
            Some(ArenaEvent::Launched { velocity, power }) => {
                assert!((velocity.y + 40.0).abs() < 1e-3);
                assert!(velocity.x.abs() < 1e-3);
                assert!((power - 1.0).abs() < 1e-3);
            }
            other => panic!("expected launch, got {other:?}"),
        }
        assert_eq!(s.phase(), Phase::Flying);
    }

    #[test]
    fn test_preview_only_while_dragging() {
        let mut s = session();
        assert!(s.preview().is_empty());
        pull(&mut s, Vec2::new(-60.0, 80.0));
        let points = s.preview();
        assert!(!points.is_empty());
        assert!(points.len() <= 25);
        // First predicted point moves away from the pull
        assert!(points[0].x > s.player().pos.x);
    }

    #[test]
    fn test_advance_is_frame_rate_independent() {
        let mut fast = session();
        let mut slow = session();
        for s in [&mut fast, &mut slow] {
            pull(s, Vec2::new(-40.0, 120.0));
            s.pointer_up();
        }
        // 120 Hz vs 30 Hz for half a second
        for _ in 0..60 {
            fast.advance(1000.0 / 120.0);
        }
        for _ in 0..15 {
            slow.advance(1000.0 / 30.0);
        }
        assert_eq!(fast.steps(), slow.steps());
        assert_eq!(fast.player().pos, slow.player().pos);
    }

    #[test]
    fn test_stalled_frame_is_capped() {
        let mut s = session();
        let ran = s.advance(10_000.0);
        assert_eq!(ran, s.config().max_steps_per_advance);
        // Backlog dropped: the next tiny advance runs at most one step
        assert!(s.advance(1.0) <= 1);
    }

    #[test]
    fn test_garbage_elapsed_ignored() {
        let mut s = session();
        assert_eq!(s.advance(f64::NAN), 0);
        assert_eq!(s.advance(-50.0), 0);
    }

    #[test]
    fn test_miss_damages_player_and_resets() {
        let mut s = session();
        // Enemy parked far away; shoot sideways and let it drop out
        s.place_enemy(Vec2::new(40.0, 60.0), 0.0);
        pull(&mut s, Vec2::new(-100.0, 0.0));
        s.pointer_up();
        for _ in 0..2_000 {
            s.step();
            if s.phase() == Phase::Aiming {
                break;
            }
        }
        assert_eq!(s.phase(), Phase::Aiming);
        assert_eq!(s.player_hp(), 90.0);
        let events = s.take_events();
        assert!(events
            .iter()
            .any(|e| matches!(e, ArenaEvent::Miss { damage, .. } if *damage == 10.0)));
    }

    #[test]
    fn test_enough_misses_lose() {
        let config = ArenaConfig::default();
        let arena = Arena::standard(&config).unwrap();
        let mut s = ArenaSession::new(
            config,
            arena,
            SessionStats {
                player_hp: 15.0,
                enemy_attack: 10.0,
                ..stats()
            },
        );
        s.place_enemy(Vec2::new(40.0, 60.0), 0.0);
        for _ in 0..2 {
            pull(&mut s, Vec2::new(-100.0, 0.0));
            s.pointer_up();
            for _ in 0..2_000 {
                s.step();
                if s.phase() != Phase::Flying {
                    break;
                }
            }
        }
        assert_eq!(s.outcome(), Some(Outcome::Lose));
        assert_eq!(s.player_hp(), 0.0);
        // No more input once over
        let anchor = s.arena().anchor;
        assert!(!s.pointer_down(anchor.x, anchor.y).unwrap());
    }

    #[test]
    fn test_floor_breach_while_rebounding_is_a_miss() {
        let config = ArenaConfig {
            respawn_delay_ms: 60_000,
            ..ArenaConfig::default()
        };
        let arena = Arena::standard(&config).unwrap();
        let mut s = ArenaSession::new(config, arena, stats());
        let anchor = s.arena().anchor;
        s.place_enemy(anchor + Vec2::new(0.0, 100.0), 0.0);
        pull(&mut s, Vec2::new(0.0, -150.0));
        s.pointer_up();
        s.take_events();

        let mut events = Vec::new();
        for _ in 0..2_000 {
            s.step();
            events.extend(s.take_events());
            if s.phase() == Phase::Aiming {
                break;
            }
        }
        assert!(matches!(events.first(), Some(ArenaEvent::Hit { .. })));
        assert!(matches!(
            events.last(),
            Some(ArenaEvent::Miss { damage, .. }) if *damage == 10.0
        ));
        assert_eq!(s.player_hp(), 90.0);
        assert_eq!(s.phase(), Phase::Aiming);
    }
}
