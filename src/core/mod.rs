pub mod clock;
pub mod config;
pub mod error;
pub mod rng;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ArenaConfig, CombatConfig, DailyReset, EconomyConfig, GameConfig, ZoneConfig};
pub use error::{GameError, Result};
pub use rng::{GameRng, RandomSource, ScriptedRolls};
