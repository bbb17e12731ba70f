//! Rigid bodies for the slingshot arena

use glam::Vec2;
use serde::Serialize;

use crate::core::config::ArenaConfig;
use crate::core::error::{GameError, Result};

/// Playfield bounds and the sling anchor
///
/// Canvas coordinates: origin top-left, positive y points down.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Arena {
    pub width: f32,
    pub height: f32,
    pub anchor: Vec2,
}

impl Arena {
    pub fn new(width: f32, height: f32, config: &ArenaConfig) -> Result<Self> {
        let usable = width.is_finite()
            && height.is_finite()
            && width > 2.0 * config.enemy_patrol_margin.max(config.player_radius)
            && height > config.anchor_offset_from_floor + config.player_radius;
        if !usable {
            return Err(GameError::Config(format!(
                "arena {width}x{height} is too small for the configured sling"
            )));
        }
        Ok(Self {
            width,
            height,
            anchor: Vec2::new(width / 2.0, height - config.anchor_offset_from_floor),
        })
    }

    /// Portrait phone-sized playfield
    pub fn standard(config: &ArenaConfig) -> Result<Self> {
        Self::new(400.0, 800.0, config)
    }
}

/// The player's projectile
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicsBody {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub is_flying: bool,
    pub is_dragging: bool,
}

impl PhysicsBody {
    pub fn anchored(anchor: Vec2, radius: f32) -> Self {
        Self {
            pos: anchor,
            vel: Vec2::ZERO,
            radius,
            is_flying: false,
            is_dragging: false,
        }
    }

    pub fn reset_to(&mut self, anchor: Vec2) {
        *self = Self::anchored(anchor, self.radius);
    }

    /// Heading for rendering
    pub fn rotation(&self) -> f32 {
        self.vel.y.atan2(self.vel.x)
    }

    /// One ballistic step: gravity, then drag, then move
    pub fn integrate(&mut self, gravity: f32, drag: f32) {
        self.vel.y += gravity;
        self.vel *= drag;
        self.pos += self.vel;
    }

    /// Clamp against side walls and ceiling, reflecting with damping.
    /// The floor is open.
    pub fn bounce_in(&mut self, arena: &Arena, damping: f32) {
        let r = self.radius;
        if self.pos.x < r {
            self.pos.x = r;
            self.vel.x *= -damping;
        } else if self.pos.x > arena.width - r {
            self.pos.x = arena.width - r;
            self.vel.x *= -damping;
        }
        if self.pos.y < r {
            self.pos.y = r;
            self.vel.y *= -damping;
        }
    }

    pub fn below_floor(&self, arena: &Arena) -> bool {
        self.pos.y > arena.height + self.radius
    }

    pub fn overlaps(&self, enemy: &EnemyBody) -> bool {
        self.pos.distance(enemy.pos) < self.radius + enemy.radius
    }
}

/// The opponent patrolling the top of the arena
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct EnemyBody {
    pub pos: Vec2,
    pub patrol_vx: f32,
    pub radius: f32,
    pub hp: f32,
    pub max_hp: f32,
}

impl EnemyBody {
    pub fn spawn(arena: &Arena, config: &ArenaConfig, hp: f32) -> Self {
        Self {
            pos: Vec2::new(arena.width / 2.0, config.enemy_start_y),
            patrol_vx: config.enemy_patrol_speed,
            radius: config.enemy_radius,
            hp,
            max_hp: hp,
        }
    }

    /// Constant-speed patrol, turning around at the margins
    pub fn patrol(&mut self, arena: &Arena, margin: f32) {
        self.pos.x += self.patrol_vx;
        if self.pos.x > arena.width - margin || self.pos.x < margin {
            self.patrol_vx = -self.patrol_vx;
        }
    }

    /// Returns the health left
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        self.hp = (self.hp - amount).max(0.0);
        self.hp
    }

    pub fn is_down(&self) -> bool {
        self.hp <= 0.0
    }
}
