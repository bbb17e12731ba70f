//! Collaborators the game talks to: player data, opponents, feedback,
//! storage and ads

pub mod ads;
pub mod enemy;
pub mod notify;
pub mod storage;
pub mod store;

pub use ads::{watch_ad, AdBroker, AdError, AdReward, InstantAdBroker};
pub use enemy::{EnemyError, EnemyProvider, ScaledEnemyProvider};
pub use notify::{Notification, NotificationSink, NullNotifier, RecordingNotifier, TracingNotifier};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StoreError};
pub use store::{PlayerLedger, PlayerRecord, PlayerStore, Rooster, Settlement};
