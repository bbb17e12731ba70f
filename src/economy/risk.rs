//! Risk calculators that read the economy
//!
//! All of these are pure reads of stability and the active event.

use serde::Serialize;

use crate::core::error::{GameError, Result};
use crate::core::rng::RandomSource;
use crate::economy::{EconomyState, GlobalEvent};

/// Illegal goods are listed while the economy is shaky
pub fn black_market_open(stability: f32, threshold: f32) -> bool {
    stability < threshold
}

/// Chance that a shady deal gets raided
pub fn raid_chance(stability: f32, event: GlobalEvent) -> f64 {
    let base = ((100.0 - stability as f64) / 200.0).max(0.05);
    (base * event.effects().raid_risk as f64).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VolatilityTier {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Sentiment {
    Bullish,
    Balanced,
    Cautious,
    Risky,
}

/// Market intel summary shown next to the exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MarketMood {
    pub volatility_score: f32,
    pub volatility: VolatilityTier,
    pub sentiment: Sentiment,
    /// Tax rate scaled to 0-100
    pub tax_pressure: u32,
    /// Exchange multipliers set by the active event
    pub crystal_price: f32,
    pub gold_price: f32,
    /// Share of today's crystal pool already claimed
    pub pool_usage: f32,
}

impl MarketMood {
    pub fn assess(state: &EconomyState) -> Self {
        let stability = state.stability_index;
        let volatility_score = (100.0 - stability).max(0.0);
        let volatility = if volatility_score > 70.0 {
            VolatilityTier::Critical
        } else if volatility_score > 45.0 {
            VolatilityTier::High
        } else if volatility_score > 25.0 {
            VolatilityTier::Medium
        } else {
            VolatilityTier::Low
        };
        let sentiment = if stability > 75.0 {
            Sentiment::Bullish
        } else if stability > 55.0 {
            Sentiment::Balanced
        } else if stability > 35.0 {
            Sentiment::Cautious
        } else {
            Sentiment::Risky
        };
        let tax_pressure = ((state.market_tax_rate * 200.0).round().max(0.0) as u32).min(100);
        let effects = state.current_event.effects();
        Self {
            volatility_score,
            volatility,
            sentiment,
            tax_pressure,
            crystal_price: effects.crystal_price,
            gold_price: effects.gold_price,
            pool_usage: state.pool_usage(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BetOutcome {
    Raided { fine: u64 },
    Won { profit: u64 },
    Lost { stake: u64 },
}

impl BetOutcome {
    /// Signed change to the player's gold
    pub fn gold_delta(&self) -> i64 {
        match *self {
            BetOutcome::Raided { fine } => -(fine as i64),
            BetOutcome::Won { profit } => profit as i64,
            BetOutcome::Lost { stake } => -(stake as i64),
        }
    }
}

/// Back-alley dice game
///
/// The raid roll comes first; a shielded player skips it. Otherwise a coin
/// flip pays 80% of the stake or takes the stake.
pub fn street_bet(
    bet: u64,
    gold: u64,
    stability: f32,
    event: GlobalEvent,
    shielded: bool,
    rng: &mut dyn RandomSource,
) -> Result<BetOutcome> {
    if bet > gold {
        return Err(GameError::NotEnoughGold {
            have: gold,
            need: bet,
        });
    }
    if !shielded && rng.next_unit() < raid_chance(stability, event) {
        let fine = gold / 5;
        tracing::info!(fine, "Street bet raided");
        return Ok(BetOutcome::Raided { fine });
    }
    let outcome = if rng.next_unit() > 0.5 {
        BetOutcome::Won {
            profit: bet * 4 / 5,
        }
    } else {
        BetOutcome::Lost { stake: bet }
    };
    tracing::debug!(?outcome, "Street bet settled");
    Ok(outcome)
}
