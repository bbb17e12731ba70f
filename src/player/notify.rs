//! Fire-and-forget feedback to whatever is presenting the game

use std::sync::Mutex;

use serde::Serialize;

/// Feedback raised at fixed points: fight start, each landed blow, launch,
/// and the terminal outcome
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    Success { message: String },
    Error { message: String },
    Hit { damage: u32, critical: bool },
    BattleStart { opponent: String },
    Launch { power: f32 },
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self::Success {
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }
}

/// Receives notifications; must never block or fail the caller
pub trait NotificationSink: Send + Sync {
    fn notify(&self, notification: Notification);
}

/// Writes every notification to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn notify(&self, notification: Notification) {
        match &notification {
            Notification::Error { message } => tracing::warn!(%message, "notify"),
            Notification::Hit { damage, critical } => {
                tracing::debug!(damage, critical, "notify: hit")
            }
            other => tracing::info!(?other, "notify"),
        }
    }
}

/// Drops everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullNotifier;

impl NotificationSink for NullNotifier {
    fn notify(&self, _notification: Notification) {}
}

/// Keeps everything in memory, for tests
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Notification> {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn count(&self, pred: impl Fn(&Notification) -> bool) -> usize {
        self.snapshot().iter().filter(|n| pred(n)).count()
    }
}

impl NotificationSink for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(notification);
    }
}
