//! Core type definitions used throughout the codebase

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for combatants (player roosters and opponents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub Uuid);

impl CombatantId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CombatantId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CombatantId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier for one mounted arena session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

/// Player account identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

/// Wall-clock time in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Combatant level (1-based)
pub type Level = u32;

pub const MS_PER_SECOND: u64 = 1_000;
pub const MS_PER_HOUR: u64 = 60 * 60 * MS_PER_SECOND;
pub const MS_PER_DAY: u64 = 24 * MS_PER_HOUR;

/// Gold and experience paid out after a fight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payout {
    pub gold: u32,
    pub xp: u32,
}

impl Payout {
    pub const fn new(gold: u32, xp: u32) -> Self {
        Self { gold, xp }
    }

    /// Scale both components, rounding down
    pub fn scaled(self, multiplier: f32) -> Self {
        let m = if multiplier.is_finite() { multiplier.max(0.0) } else { 1.0 };
        Self {
            gold: (self.gold as f32 * m).floor() as u32,
            xp: (self.xp as f32 * m).floor() as u32,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_combatant_ids_are_unique() {
        assert_ne!(CombatantId::new(), CombatantId::new());
    }

    #[test]
    fn test_payout_scaling() {
        let payout = Payout::new(500, 100);
        assert_eq!(payout.scaled(2.0), Payout::new(1000, 200));
        assert_eq!(payout.scaled(0.5), Payout::new(250, 50));
    }

    #[test]
    fn test_payout_scaling_ignores_garbage_multiplier() {
        let payout = Payout::new(10, 5);
        assert_eq!(payout.scaled(f32::NAN), payout);
        assert_eq!(payout.scaled(-3.0), Payout::new(0, 0));
    }

    #[test]
    fn test_day_constant() {
        assert_eq!(MS_PER_DAY, 86_400_000);
    }
}
