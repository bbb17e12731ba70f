//! Background economy ticker
//!
//! The engine sits behind a mutex; the ticker and admin calls are the only
//! writers and each takes the lock for one engine call.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::core::clock::Clock;
use crate::core::rng::GameRng;
use crate::economy::{EconomyEngine, EconomyState};

pub type SharedEconomy = Arc<Mutex<EconomyEngine>>;

pub fn share(engine: EconomyEngine) -> SharedEconomy {
    Arc::new(Mutex::new(engine))
}

/// Run `f` against the engine under the lock
pub fn with_economy<R>(economy: &SharedEconomy, f: impl FnOnce(&mut EconomyEngine) -> R) -> R {
    let mut guard = economy.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
}

pub fn snapshot(economy: &SharedEconomy) -> EconomyState {
    with_economy(economy, |engine| engine.current_state())
}

/// Owns the running ticker task
#[derive(Debug)]
pub struct TickerHandle {
    shutdown: oneshot::Sender<()>,
    task: JoinHandle<u64>,
}

impl TickerHandle {
    /// Stop ticking and wait for the task; returns how many ticks ran
    pub async fn stop(self) -> u64 {
        let _ = self.shutdown.send(());
        match self.task.await {
            Ok(ticks) => ticks,
            Err(e) => {
                tracing::warn!(error = %e, "Economy ticker task failed");
                0
            }
        }
    }
}

/// Tick `economy` every `period` until the handle is stopped or dropped
pub fn spawn_ticker(
    economy: SharedEconomy,
    clock: Arc<dyn Clock>,
    mut rng: GameRng,
    period: Duration,
) -> TickerHandle {
    let (shutdown, mut shutdown_rx) = oneshot::channel::<()>();
    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately; the schedule starts one period out
        interval.tick().await;

        tracing::info!(period_ms = period.as_millis() as u64, "Economy ticker started");
        let mut ticks = 0u64;
        loop {
            tokio::select! {
                _ = &mut shutdown_rx => break,
                _ = interval.tick() => {
                    let now = clock.now();
                    let report = with_economy(&economy, |engine| engine.tick(now, &mut rng));
                    ticks += 1;
                    tracing::debug!(ticks, status = ?report.status, "Economy tick");
                }
            }
        }
        tracing::info!(ticks, "Economy ticker stopped");
        ticks
    });
    TickerHandle { shutdown, task }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::config::EconomyConfig;

    #[test]
    fn test_with_economy_survives_poison() {
        let economy = share(EconomyEngine::new(EconomyConfig::default(), 0).unwrap());
        let poisoner = Arc::clone(&economy);
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock().unwrap();
            panic!("poison the lock");
        })
        .join();
        assert!(economy.is_poisoned());
        assert_eq!(snapshot(&economy).claimed_crystals, 1250);
    }

    #[tokio::test]
    async fn test_ticker_ticks_until_stopped() {
        let clock = Arc::new(ManualClock::starting_at(0));
        let economy = share(EconomyEngine::new(EconomyConfig::default(), 0).unwrap());
        let handle = spawn_ticker(
            Arc::clone(&economy),
            clock,
            GameRng::seeded(1),
            Duration::from_millis(5),
        );
        tokio::time::sleep(Duration::from_millis(60)).await;
        let ticks = handle.stop().await;
        assert!(ticks >= 2, "only {ticks} ticks");
    }
}
