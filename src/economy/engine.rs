//! Economy simulation engine
//!
//! Owns the single [`EconomyState`]. Every mutation is one method call that
//! leaves status, stability and drain timestamps consistent with each other.

use serde::Serialize;
use thiserror::Error;

use crate::core::config::{DailyReset, EconomyConfig};
use crate::core::error::{GameError, Result};
use crate::core::rng::RandomSource;
use crate::core::types::{Timestamp, MS_PER_DAY};
use crate::economy::state::clamp_stability;
use crate::economy::{EconomyState, EconomyStatus, GlobalEvent};

/// A crystal claim that would overrun the daily pool
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("claim of {requested} crystals rejected: only {remaining} left in today's pool")]
pub struct ClaimRejected {
    pub requested: u32,
    pub remaining: u32,
}

/// What one tick did
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickReport {
    pub drains: u32,
    pub stability_lost: f32,
    pub stability_regained: f32,
    pub status: EconomyStatus,
    pub day_rolled: bool,
    pub event_expired: bool,
}

/// Result of counting one global ad view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdView {
    pub total_views: u64,
    pub pool_boosted: bool,
}

#[derive(Debug, Clone)]
pub struct EconomyEngine {
    config: EconomyConfig,
    state: EconomyState,
    last_tick: Timestamp,
    event_set_at: Option<Timestamp>,
    day: u64,
}

impl EconomyEngine {
    /// Start the simulation at `now`; rejects a config that cannot tick
    pub fn new(config: EconomyConfig, now: Timestamp) -> Result<Self> {
        config.validate().map_err(GameError::Config)?;
        let state = EconomyState::seeded(&config, &config.initial, now);
        tracing::info!(
            pool = state.daily_crystal_pool,
            stability = state.stability_index,
            next_drain = state.next_drain_time,
            "Economy engine started"
        );
        Ok(Self {
            config,
            state,
            last_tick: now,
            event_set_at: None,
            day: now / MS_PER_DAY,
        })
    }

    pub fn config(&self) -> &EconomyConfig {
        &self.config
    }

    pub fn state(&self) -> &EconomyState {
        &self.state
    }

    /// Owned copy for readers outside the lock
    pub fn current_state(&self) -> EconomyState {
        self.state.clone()
    }

    pub fn current_event(&self) -> GlobalEvent {
        self.state.current_event
    }

    /// Advance the simulation to `now`
    pub fn tick(&mut self, now: Timestamp, rng: &mut dyn RandomSource) -> TickReport {
        let day_rolled = self.roll_day(now);
        let event_expired = self.expire_event(now);

        // Bounded random walk of the activity counters
        let step = rng.below(3);
        self.state.active_players = (self.state.active_players + step).saturating_sub(1);
        self.state.total_ad_views_today += rng.below(5) as u64;

        let before = self.state.stability_index;
        let mut drains = 0;
        let mut stability_lost = 0.0;
        while now >= self.state.next_drain_time && drains < self.config.max_drain_catchup {
            let amount =
                rng.range(self.config.drain_min as f64, self.config.drain_max as f64) as f32;
            let next = clamp_stability(self.state.stability_index - amount);
            stability_lost += self.state.stability_index - next;
            self.state.stability_index = next;
            self.state.last_drain_time = self.state.next_drain_time;
            self.state.next_drain_time += self.config.drain_interval_ms;
            drains += 1;
        }
        if now >= self.state.next_drain_time {
            // Pause longer than the catch-up allowance; skip the rest
            let interval = self.config.drain_interval_ms;
            let missed = (now - self.state.next_drain_time) / interval + 1;
            self.state.last_drain_time += missed * interval;
            self.state.next_drain_time += missed * interval;
            tracing::warn!(skipped = missed, "Economy drains skipped after long pause");
        }

        let mut stability_regained = 0.0;
        if drains == 0 {
            let elapsed = now.saturating_sub(self.last_tick) as f32;
            let regen = self.config.stability_recovery_per_day * elapsed / MS_PER_DAY as f32;
            let next = clamp_stability(self.state.stability_index + regen);
            stability_regained = next - self.state.stability_index;
            self.state.stability_index = next;
        }
        self.last_tick = self.last_tick.max(now);

        let previous = self.state.status;
        self.state.status = if drains > 0 {
            EconomyStatus::Draining
        } else {
            EconomyStatus::classify(self.state.stability_index, &self.config)
        };

        if drains > 0 {
            tracing::info!(
                drains,
                from = before,
                to = self.state.stability_index,
                next_drain = self.state.next_drain_time,
                "Economy drained"
            );
        }
        if previous != self.state.status {
            tracing::info!(from = ?previous, to = ?self.state.status, "Economy status changed");
        }

        TickReport {
            drains,
            stability_lost,
            stability_regained,
            status: self.state.status,
            day_rolled,
            event_expired,
        }
    }

    /// Take `amount` crystals from today's pool
    ///
    /// Returns what is left after the claim. A rejected claim changes nothing.
    pub fn claim(&mut self, amount: u32) -> std::result::Result<u32, ClaimRejected> {
        let remaining = self.state.remaining_crystals();
        match self.state.claimed_crystals.checked_add(amount) {
            Some(total) if total <= self.state.daily_crystal_pool => {
                self.state.claimed_crystals = total;
                Ok(self.state.remaining_crystals())
            }
            _ => {
                tracing::debug!(requested = amount, remaining, "Crystal claim rejected");
                Err(ClaimRejected {
                    requested: amount,
                    remaining,
                })
            }
        }
    }

    /// Count one ad view; every Nth view grows the pool
    pub fn record_ad_view(&mut self) -> AdView {
        self.state.total_ad_views_today += 1;
        let total_views = self.state.total_ad_views_today;
        let pool_boosted = total_views % self.config.ad_boost_every.max(1) == 0;
        if pool_boosted {
            self.state.daily_crystal_pool = self
                .state
                .daily_crystal_pool
                .saturating_add(self.config.ad_boost_amount);
            tracing::info!(
                views = total_views,
                pool = self.state.daily_crystal_pool,
                "Crystal pool boosted by ad views"
            );
        }
        AdView {
            total_views,
            pool_boosted,
        }
    }

    /// Admin override; takes effect immediately
    pub fn set_event(&mut self, event: GlobalEvent, now: Timestamp) {
        let previous = self.state.current_event;
        self.state.current_event = event;
        self.event_set_at = (event != GlobalEvent::None).then_some(now);
        tracing::info!(from = %previous, to = %event, "Global event set");
    }

    /// Admin override; clamped to `[0, 100]`, status recomputed
    pub fn set_stability(&mut self, value: f32) {
        if !value.is_finite() {
            tracing::warn!(value, "Ignoring non-finite stability override");
            return;
        }
        self.state.stability_index = clamp_stability(value);
        self.state.status = EconomyStatus::classify(self.state.stability_index, &self.config);
        tracing::info!(stability = self.state.stability_index, "Stability overridden");
    }

    pub fn set_market_tax_rate(&mut self, rate: f32) {
        if rate.is_finite() {
            self.state.market_tax_rate = rate.clamp(0.0, 1.0);
        }
    }

    /// Admin override; grows today's pool
    pub fn credit_pool(&mut self, amount: u32) {
        self.state.daily_crystal_pool = self.state.daily_crystal_pool.saturating_add(amount);
        tracing::info!(amount, pool = self.state.daily_crystal_pool, "Crystal pool credited");
    }

    pub fn black_market_open(&self) -> bool {
        crate::economy::risk::black_market_open(
            self.state.stability_index,
            self.config.black_market_threshold,
        )
    }

    fn roll_day(&mut self, now: Timestamp) -> bool {
        let day = now / MS_PER_DAY;
        if self.config.daily_reset != DailyReset::UtcMidnight || day <= self.day {
            return false;
        }
        self.day = day;
        self.state.daily_crystal_pool = self.config.daily_crystal_pool;
        self.state.claimed_crystals = 0;
        self.state.total_ad_views_today = 0;
        tracing::info!(day, "Daily crystal pool reset");
        true
    }

    fn expire_event(&mut self, now: Timestamp) -> bool {
        let (Some(duration), Some(set_at)) = (self.config.event_duration_ms, self.event_set_at)
        else {
            return false;
        };
        if now < set_at.saturating_add(duration) {
            return false;
        }
        tracing::info!(event = %self.state.current_event, "Global event expired");
        self.state.current_event = GlobalEvent::None;
        self.event_set_at = None;
        true
    }
}
