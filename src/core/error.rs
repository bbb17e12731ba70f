use thiserror::Error;

use crate::arena::InputRejected;
use crate::combat::CombatError;
use crate::economy::ClaimRejected;
use crate::player::{AdError, EnemyError, StoreError};

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Combat rejected: {0}")]
    Combat(#[from] CombatError),

    #[error(transparent)]
    Claim(#[from] ClaimRejected),

    #[error("Input rejected: {0}")]
    Input(#[from] InputRejected),

    #[error("Enemy unavailable: {0}")]
    Enemy(#[from] EnemyError),

    #[error("Ad failed: {0}")]
    Ad(#[from] AdError),

    #[error("Storage failed: {0}")]
    Store(#[from] StoreError),

    #[error("No active combatant")]
    NoActiveCombatant,

    #[error("Not enough energy: have {have}, need {need}")]
    NotEnoughEnergy { have: u32, need: u32 },

    #[error("Not enough gold: have {have}, need {need}")]
    NotEnoughGold { have: u64, need: u64 },

    #[error("Arena session already closed")]
    SessionClosed,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl GameError {
    /// Short message safe to show to the player
    pub fn user_message(&self) -> &'static str {
        match self {
            GameError::Combat(_) => "This fight cannot start.",
            GameError::Claim(_) => "The crystal pool is exhausted. Come back tomorrow.",
            GameError::Input(_) => "Move ignored.",
            GameError::Enemy(_) => "Could not start the fight.",
            GameError::Ad(_) => "The ad could not be played.",
            GameError::NoActiveCombatant => "You have no rooster.",
            GameError::NotEnoughEnergy { .. } => "Energy too low!",
            GameError::NotEnoughGold { .. } => "Not enough gold!",
            GameError::SessionClosed => "The fight is over.",
            GameError::Store(_) => "Could not save your progress.",
            GameError::Config(_)
            | GameError::IoError(_)
            | GameError::SerdeError(_)
            | GameError::TomlError(_) => "Something went wrong.",
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_hides_detail() {
        let err = GameError::NotEnoughEnergy { have: 3, need: 10 };
        assert!(err.to_string().contains("have 3"));
        assert!(!err.user_message().contains('3'));
    }

    #[test]
    fn test_claim_rejection_converts() {
        let err: GameError = ClaimRejected {
            requested: 2000,
            remaining: 1000,
        }
        .into();
        assert!(matches!(err, GameError::Claim(_)));
        assert!(err.to_string().contains("1000"));
    }
}
