//! Real-time driver for an encounter
//!
//! The fight runs on its own task at a fixed frame period. Pointer input
//! arrives over a channel and is applied at the start of the next frame;
//! observers read throttled views from a watch channel.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::arena::encounter::Encounter;
use crate::arena::session::{ArenaView, Outcome};
use crate::arena::sling::PointerInput;
use crate::core::error::{GameError, Result};
use crate::player::store::{PlayerStore, Settlement};

/// How a run ended
#[derive(Debug)]
pub struct ArenaReport<S> {
    /// `None` when closed before the fight was decided
    pub outcome: Option<Outcome>,
    pub settlement: Option<Settlement>,
    pub store: S,
    pub frames: u64,
}

pub struct ArenaHandle<S> {
    input: mpsc::UnboundedSender<PointerInput>,
    views: watch::Receiver<ArenaView>,
    close: oneshot::Sender<()>,
    task: JoinHandle<ArenaReport<S>>,
}

impl<S> ArenaHandle<S> {
    /// Queue pointer input for the next frame
    pub fn send(&self, input: PointerInput) -> Result<()> {
        self.input.send(input).map_err(|_| GameError::SessionClosed)
    }

    pub fn views(&self) -> watch::Receiver<ArenaView> {
        self.views.clone()
    }

    pub fn latest(&self) -> ArenaView {
        self.views.borrow().clone()
    }

    /// Tear the fight down without settling it
    pub async fn close(self) -> Result<ArenaReport<S>> {
        let _ = self.close.send(());
        join(self.task).await
    }

    /// Wait for the fight to be decided and settled
    pub async fn finished(self) -> Result<ArenaReport<S>> {
        let ArenaHandle { close, task, .. } = self;
        let report = join(task).await;
        drop(close);
        report
    }
}

impl<S> std::fmt::Debug for ArenaHandle<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaHandle")
            .field("session", &self.views.borrow().session)
            .field("finished", &self.task.is_finished())
            .finish()
    }
}

async fn join<S>(task: JoinHandle<ArenaReport<S>>) -> Result<ArenaReport<S>> {
    task.await.map_err(|e| {
        tracing::error!(error = %e, "Arena task failed");
        GameError::SessionClosed
    })
}

/// Mount `encounter` and run it every `frame` until it ends or is closed
///
/// A decided fight is settled against `store` exactly once before the task
/// exits. Dropping the handle closes the fight.
pub fn spawn_arena<S>(mut encounter: Encounter, mut store: S, frame: Duration) -> ArenaHandle<S>
where
    S: PlayerStore + 'static,
{
    let (input, mut input_rx) = mpsc::unbounded_channel();
    let (view_tx, views) = watch::channel(encounter.view());
    let (close, mut close_rx) = oneshot::channel::<()>();
    let publish_every = u64::from(encounter.session().config().view_every_frames.max(1));

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(frame);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut last = Instant::now();
        let mut frames = 0u64;
        let mut settlement = None;

        tracing::info!(
            session = %encounter.session().id().0,
            zone = encounter.zone(),
            "Arena mounted"
        );
        loop {
            tokio::select! {
                _ = &mut close_rx => {
                    tracing::info!(frames, "Arena closed");
                    break;
                }
                _ = interval.tick() => {
                    while let Ok(pointer) = input_rx.try_recv() {
                        if let Err(e) = encounter.handle_input(pointer) {
                            tracing::debug!(error = %e, "Pointer input ignored");
                        }
                    }
                    let now = Instant::now();
                    let elapsed_ms = now.duration_since(last).as_secs_f64() * 1_000.0;
                    last = now;
                    encounter.advance(elapsed_ms);
                    frames += 1;

                    let over = encounter.outcome().is_some();
                    if over || frames % publish_every == 0 {
                        let _ = view_tx.send(encounter.view());
                    }
                    if over {
                        match encounter.settle(&mut store) {
                            Ok(settled) => settlement = settled,
                            Err(e) => tracing::error!(error = %e, "Could not settle fight"),
                        }
                        break;
                    }
                }
            }
        }

        ArenaReport {
            outcome: encounter.outcome(),
            settlement,
            store,
            frames,
        }
    });

    ArenaHandle {
        input,
        views,
        close,
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::arena::body::Arena;
    use crate::core::config::{ArenaConfig, ZoneConfig};
    use crate::core::rng::GameRng;
    use crate::economy::GlobalEvent;
    use crate::player::enemy::ScaledEnemyProvider;
    use crate::player::notify::NullNotifier;
    use crate::player::store::PlayerLedger;

    fn encounter(ledger: &PlayerLedger) -> Encounter {
        let config = ArenaConfig::default();
        let arena = Arena::standard(&config).unwrap();
        Encounter::begin(
            config,
            arena,
            ledger,
            &ScaledEnemyProvider::new(ZoneConfig::default_ladder()),
            "d2",
            GlobalEvent::None,
            &mut GameRng::seeded(4),
            Arc::new(NullNotifier),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_close_leaves_store_untouched() {
        let ledger = PlayerLedger::new_player("p1", "tester", 0);
        let before = ledger.clone();
        let handle = spawn_arena(encounter(&ledger), ledger, Duration::from_millis(2));
        tokio::time::sleep(Duration::from_millis(20)).await;

        let report = handle.close().await.unwrap();
        assert_eq!(report.outcome, None);
        assert_eq!(report.settlement, None);
        assert_eq!(report.store, before);
        assert!(report.frames > 0);
    }

    #[tokio::test]
    async fn test_views_end_with_task() {
        let ledger = PlayerLedger::new_player("p1", "tester", 0);
        let handle = spawn_arena(encounter(&ledger), ledger, Duration::from_millis(2));
        let views = handle.views();
        let report = handle.close().await.unwrap();
        assert!(report.frames < 1_000);
        assert!(views.has_changed().is_err());
    }
}
