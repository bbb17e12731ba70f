//! Turn-based fight resolution and the shared fight result types

pub mod commentary;
pub mod engine;
pub mod resolution;
pub mod round;
pub mod stats;

pub use commentary::{Commentary, CommentaryCategory, CommentaryTable};
pub use engine::{fight, CombatEngine};
pub use resolution::TurnBasedResolver;
pub use round::{CombatResult, CombatRound, Rewards};
pub use stats::{check_matchup, CombatError, Combatant, CombatantStats};
