//! Core of the widget-backed list.
//! This crate owns the host list, its full-snapshot replica in shared storage
//! and the lifecycle hook that asks the widget to refresh.

pub mod config;
pub mod db;
pub mod lifecycle;
pub mod logging;
pub mod model;
pub mod service;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod widget;

pub use config::{provision_namespace, ConfigError, StoreBackend, SyncConfig, DEFAULT_STORAGE_KEY};
pub use lifecycle::monitor::{
    LifecycleMonitor, LifecycleParseError, LifecycleState, TransitionOutcome,
};
pub use lifecycle::refresh::{CallbackRefresh, NoopRefresh, PendingRefresh, RefreshSignal};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::item::{ItemId, ListItem, ValidationError};
pub use model::list::{DuplicateItemId, ListModel};
pub use service::list_service::{ListService, Mutation, SyncStatus};
pub use service::session::{SessionError, WidgetSyncSession};
pub use snapshot::codec::{CodecError, CodecResult};
pub use store::{
    open_reader, open_store, DynStore, FileStore, MemoryStore, SerializedStore, SqliteStore, StorageError,
    StoreResult,
};
pub use sync::writer::{LoadError, SyncWriter};
pub use widget::{read_widget_snapshot, WidgetSnapshot};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
