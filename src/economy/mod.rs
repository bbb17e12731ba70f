//! Global economy simulation and event register

pub mod engine;
pub mod events;
pub mod risk;
pub mod shield;
pub mod state;
pub mod ticker;

pub use engine::{AdView, ClaimRejected, EconomyEngine, TickReport};
pub use events::{EventEffects, GlobalEvent};
pub use risk::{raid_chance, street_bet, BetOutcome, MarketMood, Sentiment, VolatilityTier};
pub use shield::ShieldState;
pub use state::{EconomyState, EconomyStatus};
pub use ticker::{spawn_ticker, SharedEconomy, TickerHandle};
