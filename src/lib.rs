//! Rooster Empire - street-fighting rooster game core
//!
//! Turn-based fights, a real-time slingshot arena and a shared crystal
//! economy driven by global events.

pub mod arena;
pub mod combat;
pub mod core;
pub mod economy;
pub mod player;
