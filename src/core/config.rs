//! Game configuration with documented constants
//!
//! All tuning numbers live here. Sections can be overridden from a TOML file;
//! anything left out falls back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::error::{GameError, Result};
use crate::core::types::{Payout, MS_PER_DAY, MS_PER_HOUR};

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub combat: CombatConfig,
    pub arena: ArenaConfig,
    pub economy: EconomyConfig,
    /// Fight zones the enemy provider knows about
    pub zones: Vec<ZoneConfig>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            arena: ArenaConfig::default(),
            economy: EconomyConfig::default(),
            zones: ZoneConfig::default_ladder(),
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a TOML file, fill gaps with defaults and validate the result
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml(&content)?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let mut config: GameConfig = toml::from_str(content)?;
        if config.zones.is_empty() {
            config.zones = ZoneConfig::default_ladder();
        }
        config.validate().map_err(GameError::Config)?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> std::result::Result<(), String> {
        self.combat.validate()?;
        self.arena.validate()?;
        self.economy.validate()
    }
}

/// Turn-based resolver tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Hard cap on rounds; a fight that reaches it is decided on remaining health
    pub max_rounds: u32,

    /// Hit chance between equally fast combatants
    pub base_hit_chance: f64,

    /// Hit chance gained per point of speed advantage (lost per point of deficit)
    pub hit_chance_per_speed: f64,

    pub min_hit_chance: f64,
    pub max_hit_chance: f64,

    /// Damage multiplier on a critical hit
    pub critical_multiplier: f32,

    /// Share of the target's defense subtracted from raw damage
    pub defense_factor: f32,

    pub gold_per_loser_level: u32,
    pub xp_per_loser_level: u32,

    /// Flat payout to an attacker who loses
    pub consolation: Payout,

    /// Chance a winning attacker also finds an item
    pub loot_chance: f64,

    /// Item ids a win can drop, picked uniformly
    pub loot_table: Vec<String>,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            base_hit_chance: 0.9,
            hit_chance_per_speed: 0.01,
            min_hit_chance: 0.2,
            max_hit_chance: 1.0,
            critical_multiplier: 2.0,
            defense_factor: 0.5,
            gold_per_loser_level: 50,
            xp_per_loser_level: 20,
            consolation: Payout::new(10, 5),
            loot_chance: 0.1,
            loot_table: vec!["potion_heal".into(), "protein_mix".into(), "stim_speed".into()],
        }
    }
}

impl CombatConfig {
    fn validate(&self) -> std::result::Result<(), String> {
        if self.max_rounds == 0 {
            return Err("combat.max_rounds must be at least 1".into());
        }
        if !(0.0..=1.0).contains(&self.min_hit_chance)
            || !(0.0..=1.0).contains(&self.max_hit_chance)
            || self.min_hit_chance > self.max_hit_chance
        {
            return Err(format!(
                "combat hit chance bounds invalid: min {} max {}",
                self.min_hit_chance, self.max_hit_chance
            ));
        }
        if self.critical_multiplier < 1.0 {
            return Err("combat.critical_multiplier must be >= 1".into());
        }
        if !(0.0..=1.0).contains(&self.loot_chance) {
            return Err(format!("combat.loot_chance {} outside [0, 1]", self.loot_chance));
        }
        Ok(())
    }
}

/// Slingshot arena physics
///
/// Units are canvas pixels and simulation steps. One step is one frame of a
/// 60 Hz display; `step_hz` lets the runner keep that feel at any frame rate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaConfig {
    /// Added to vertical velocity every step (positive y is down)
    pub gravity: f32,

    /// Velocity multiplier applied every step before integration
    ///
    /// Must be in (0, 1]. At 0.995 a launch keeps ~74% of its speed after
    /// one second of flight, ignoring gravity.
    pub air_drag: f32,

    /// Share of speed kept when bouncing off a wall or the ceiling
    pub bounce_damping: f32,

    /// Launch velocity per pixel of pull
    pub sling_force: f32,

    /// Pull is clamped to this radius around the anchor
    pub max_drag_distance: f32,

    /// Releases closer to the anchor than this cancel instead of firing
    pub min_launch_distance: f32,

    /// A press must land this close to the projectile to grab it
    pub grab_radius: f32,

    pub player_radius: f32,
    pub enemy_radius: f32,

    /// Horizontal enemy speed in pixels per step
    pub enemy_patrol_speed: f32,

    /// Enemy turns around this far from the side walls
    pub enemy_patrol_margin: f32,

    pub enemy_start_y: f32,

    /// Sling anchor height measured up from the floor
    pub anchor_offset_from_floor: f32,

    /// Hit damage = attack * (1 + impact_speed_bonus * |vy|)
    pub impact_speed_bonus: f32,

    /// Velocity share kept (and reversed) when rebounding off the enemy
    pub hit_rebound: f32,

    /// Time between an enemy hit and the projectile returning to the sling
    pub respawn_delay_ms: u64,

    pub step_hz: u32,

    /// Cap on catch-up steps per advance
    pub max_steps_per_advance: u32,

    /// Publish a view to observers every N steps
    pub view_every_frames: u32,

    pub preview_steps: usize,

    pub win_reward: Payout,
    pub loss_reward: Payout,
    pub win_energy_cost: u32,
    pub loss_energy_cost: u32,
    pub min_energy_to_fight: u32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            gravity: 0.4,
            air_drag: 0.995,
            bounce_damping: 0.6,
            sling_force: 0.25,
            max_drag_distance: 160.0,
            min_launch_distance: 20.0,
            grab_radius: 60.0,
            player_radius: 35.0,
            enemy_radius: 45.0,
            enemy_patrol_speed: 3.0,
            enemy_patrol_margin: 50.0,
            enemy_start_y: 150.0,
            anchor_offset_from_floor: 180.0,
            impact_speed_bonus: 0.1,
            hit_rebound: 0.5,
            respawn_delay_ms: 500,
            step_hz: 60,
            max_steps_per_advance: 8,
            view_every_frames: 4,
            preview_steps: 25,
            win_reward: Payout::new(500, 100),
            loss_reward: Payout::new(10, 5),
            win_energy_cost: 10,
            loss_energy_cost: 15,
            min_energy_to_fight: 10,
        }
    }
}

impl ArenaConfig {
    /// Length of one simulation step in milliseconds
    pub fn step_ms(&self) -> f64 {
        1000.0 / self.step_hz.max(1) as f64
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !(self.air_drag > 0.0 && self.air_drag <= 1.0) {
            return Err(format!("arena.air_drag ({}) must be in (0, 1]", self.air_drag));
        }
        if !(0.0..=1.0).contains(&self.bounce_damping) {
            return Err("arena.bounce_damping must be in [0, 1]".into());
        }
        if self.max_drag_distance <= 0.0 || self.min_launch_distance >= self.max_drag_distance {
            return Err(format!(
                "arena.min_launch_distance ({}) should be < max_drag_distance ({})",
                self.min_launch_distance, self.max_drag_distance
            ));
        }
        if self.player_radius <= 0.0 || self.enemy_radius <= 0.0 {
            return Err("arena radii must be positive".into());
        }
        if self.step_hz == 0 || self.max_steps_per_advance == 0 {
            return Err("arena.step_hz and max_steps_per_advance must be positive".into());
        }
        Ok(())
    }
}

/// When the daily crystal counters roll over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DailyReset {
    /// Counters keep growing for the life of the process
    Never,
    /// Pool, claims and ad views reset when the UTC day changes
    UtcMidnight,
}

/// Global economy simulation tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub daily_crystal_pool: u32,

    /// How often the outer scheduler calls `tick`
    pub tick_interval_ms: u64,

    /// Time between scheduled drains
    pub drain_interval_ms: u64,

    /// Stability lost per drain is drawn uniformly from [drain_min, drain_max]
    pub drain_min: f32,
    pub drain_max: f32,

    /// Missed drains applied in one tick after a long pause
    pub max_drain_catchup: u32,

    /// Passive stability regeneration, pro-rated by elapsed time
    ///
    /// At 10 points per day against 1-3 points every 6 hours the index
    /// hovers instead of pinning at either end.
    pub stability_recovery_per_day: f32,

    /// Below this the economy reads VOLATILE
    pub warning_threshold: f32,

    /// Below this the economy reads CRITICAL
    pub critical_threshold: f32,

    /// Illegal goods are listed while stability is below this
    pub black_market_threshold: f32,

    /// Every Nth global ad view grows the pool
    pub ad_boost_every: u64,
    pub ad_boost_amount: u32,

    /// Crystals paid to the player per ad watched
    pub ad_reward: u32,

    /// Every Nth ad by one player grants that player a shield
    pub ads_for_shield: u64,
    pub shield_duration_ms: u64,

    pub daily_reset: DailyReset,

    /// Automatic return to NONE after this long; events persist when unset
    pub event_duration_ms: Option<u64>,

    pub initial: EconomySeed,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            daily_crystal_pool: 10_000,
            tick_interval_ms: 30_000,
            drain_interval_ms: 6 * MS_PER_HOUR,
            drain_min: 1.0,
            drain_max: 3.0,
            max_drain_catchup: 4,
            stability_recovery_per_day: 10.0,
            warning_threshold: 50.0,
            critical_threshold: 40.0,
            black_market_threshold: 50.0,
            ad_boost_every: 100,
            ad_boost_amount: 500,
            ad_reward: 3,
            ads_for_shield: 3,
            shield_duration_ms: MS_PER_DAY,
            daily_reset: DailyReset::Never,
            event_duration_ms: None,
            initial: EconomySeed::default(),
        }
    }
}

impl EconomyConfig {
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.critical_threshold >= self.warning_threshold {
            return Err(format!(
                "economy.critical_threshold ({}) should be < warning_threshold ({})",
                self.critical_threshold, self.warning_threshold
            ));
        }
        if self.drain_min < 0.0 || self.drain_min > self.drain_max {
            return Err(format!(
                "economy drain range invalid: [{}, {}]",
                self.drain_min, self.drain_max
            ));
        }
        if self.drain_interval_ms == 0 || self.tick_interval_ms == 0 {
            return Err("economy intervals must be positive".into());
        }
        if self.ad_boost_every == 0 || self.ads_for_shield == 0 {
            return Err("economy ad cadences must be positive".into());
        }
        if self.initial.claimed_crystals > self.daily_crystal_pool {
            return Err("economy.initial.claimed_crystals exceeds the pool".into());
        }
        Ok(())
    }
}

/// Values the economy starts from
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomySeed {
    pub claimed_crystals: u32,
    pub active_players: u32,
    pub total_ad_views_today: u64,
    pub stability_index: f32,
    pub market_tax_rate: f32,
    /// How long ago the last drain happened at start-up
    pub last_drain_ago_ms: u64,
}

impl Default for EconomySeed {
    fn default() -> Self {
        Self {
            claimed_crystals: 1250,
            active_players: 342,
            total_ad_views_today: 856,
            stability_index: 85.0,
            market_tax_rate: 0.05,
            last_drain_ago_ms: MS_PER_HOUR,
        }
    }
}

/// A fight zone: identifier, difficulty and optional named boss
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub id: String,
    pub difficulty: u32,
    #[serde(default)]
    pub boss: Option<String>,
}

impl ZoneConfig {
    /// Zones `d1`..`d15` with matching difficulty
    pub fn default_ladder() -> Vec<ZoneConfig> {
        (1..=15)
            .map(|d| ZoneConfig {
                id: format!("d{d}"),
                difficulty: d,
                boss: None,
            })
            .collect()
    }
}
