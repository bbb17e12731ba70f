//! Real-time slingshot fights
//!
//! [`ArenaSession`] is the pure simulation, [`Encounter`] ties it to the
//! player store and enemy provider, and [`spawn_arena`] drives one on a
//! tokio task. [`SlingshotEngine`] plays it headless behind the
//! [`CombatEngine`](crate::combat::CombatEngine) trait.

pub mod autoplay;
pub mod body;
pub mod encounter;
pub mod runner;
pub mod session;
pub mod sling;

pub use autoplay::{random_pull, SlingshotEngine};
pub use body::{Arena, EnemyBody, PhysicsBody};
pub use encounter::Encounter;
pub use runner::{spawn_arena, ArenaHandle, ArenaReport};
pub use session::{ArenaEvent, ArenaSession, ArenaView, Outcome, Phase, SessionStats};
pub use sling::{InputRejected, PointerInput};
