//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose list mutations and lifecycle forwarding to Dart via FRB.
//! - Report when the host should ask the platform to reload the widget.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - One session per process; reopening with a different config is rejected.
//! - A failed snapshot write is reported (`synced=false`) but the returned
//!   list is still the authoritative host list.

use log::warn;
use std::sync::{Arc, Mutex, MutexGuard};
use widgetlist_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, ping as ping_inner,
    read_widget_snapshot, DynStore, ListItem, PendingRefresh, StoreBackend, SyncConfig,
    SyncStatus, TransitionOutcome, WidgetSyncSession,
};

type HostSession = WidgetSyncSession<DynStore, Arc<PendingRefresh>>;

struct OpenSession {
    config: SyncConfig,
    session: HostSession,
}

static SESSION: Mutex<Option<OpenSession>> = Mutex::new(None);

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Never panics; returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// One list row as seen by Dart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListEntry {
    pub id: String,
    pub title: String,
    pub completed: bool,
    /// Creation time in epoch milliseconds.
    pub created_at_ms: i64,
}

/// Response envelope for every list call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListResponse {
    /// Whether the call was accepted (validation and session checks passed).
    pub ok: bool,
    /// Full host list after the call.
    pub items: Vec<ListEntry>,
    /// Items not yet completed.
    pub remaining: u32,
    /// Whether the widget replica matches `items`.
    pub synced: bool,
    /// Human-readable message for diagnostics/UI.
    pub message: String,
}

impl ListResponse {
    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            items: Vec::new(),
            remaining: 0,
            synced: false,
            message: message.into(),
        }
    }
}

/// Response envelope for lifecycle forwarding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleResponse {
    /// `true` when the host should call the platform widget reload API now.
    pub reload_widget: bool,
    pub message: String,
}

/// Opens the per-process list session and hydrates it from the replica.
///
/// Input semantics:
/// - `namespace`: shared namespace id, e.g. `group.com.example.todo`.
/// - `container_dir`: absolute directory the platform provisions namespaces in.
/// - `backend`: `sqlite|file`; `None` selects `sqlite`.
///
/// # FFI contract
/// - Idempotent for the same config; a different config is rejected.
/// - Never panics.
#[flutter_rust_bridge::frb(sync)]
pub fn list_open(namespace: String, container_dir: String, backend: Option<String>) -> ListResponse {
    let config = match build_config(namespace, container_dir, backend) {
        Ok(config) => config,
        Err(message) => return ListResponse::failure(format!("list_open failed: {message}")),
    };

    let mut guard = lock_session();
    if let Some(open) = guard.as_ref() {
        if open.config != config {
            return ListResponse::failure(format!(
                "list_open failed: session already open for namespace `{}`",
                open.config.namespace
            ));
        }
        return respond(&open.session, "Session already open.");
    }

    match WidgetSyncSession::open(&config, Arc::new(PendingRefresh::new())) {
        Ok(session) => {
            let response = respond(&session, "Session opened.");
            *guard = Some(OpenSession { config, session });
            response
        }
        Err(err) => {
            warn!(
                "event=ffi_list_open module=ffi status=error namespace={} error={}",
                config.namespace, err
            );
            ListResponse::failure(format!("list_open failed: {err}"))
        }
    }
}

/// Returns the current host list.
#[flutter_rust_bridge::frb(sync)]
pub fn list_items() -> ListResponse {
    with_session("list_items", |session| respond(session, "OK."))
}

/// Adds one item from user input.
///
/// # FFI contract
/// - Blank titles return `ok=false` and leave the list untouched.
#[flutter_rust_bridge::frb(sync)]
pub fn list_add(title: String) -> ListResponse {
    with_session("list_add", |session| {
        match session.list_mut().add(title.as_str()) {
            Ok(_) => respond(session, "Item added."),
            Err(err) => ListResponse {
                ok: false,
                ..respond(session, format!("list_add failed: {err}"))
            },
        }
    })
}

/// Removes one item; unknown ids are accepted as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn list_remove(id: String) -> ListResponse {
    with_session("list_remove", |session| {
        let removed = session.list_mut().remove(id.as_str()).value.is_some();
        respond(session, if removed { "Item removed." } else { "No such item." })
    })
}

/// Toggles one item; unknown ids are accepted as a no-op.
#[flutter_rust_bridge::frb(sync)]
pub fn list_toggle(id: String) -> ListResponse {
    with_session("list_toggle", |session| {
        let toggled = session.list_mut().toggle(id.as_str()).value.is_some();
        respond(session, if toggled { "Item toggled." } else { "No such item." })
    })
}

/// Empties the list and writes an empty snapshot.
#[flutter_rust_bridge::frb(sync)]
pub fn list_clear() -> ListResponse {
    with_session("list_clear", |session| {
        session.list_mut().clear();
        respond(session, "List cleared.")
    })
}

/// Forwards one platform lifecycle state (`active|inactive|background`).
///
/// # FFI contract
/// - `reload_widget=true` at most once per background episode.
/// - Unknown states are ignored with a message.
#[flutter_rust_bridge::frb(sync)]
pub fn lifecycle_changed(state: String) -> LifecycleResponse {
    let mut guard = lock_session();
    let Some(open) = guard.as_mut() else {
        return LifecycleResponse {
            reload_widget: false,
            message: "lifecycle_changed ignored: session not open".to_string(),
        };
    };

    match open.session.on_platform_lifecycle(state.as_str()) {
        Ok(outcome) => LifecycleResponse {
            reload_widget: open.session.lifecycle().signal().take(),
            message: match outcome {
                TransitionOutcome::Fired => "Widget refresh requested.".to_string(),
                TransitionOutcome::Debounced => "Already in background.".to_string(),
                TransitionOutcome::Ignored => "No action.".to_string(),
            },
        },
        Err(err) => {
            warn!("event=ffi_lifecycle module=ffi status=skip error={err}");
            LifecycleResponse {
                reload_widget: false,
                message: format!("lifecycle_changed ignored: {err}"),
            }
        }
    }
}

/// Reads the replica the way the widget extension renders it.
///
/// # FFI contract
/// - Does not require an open session.
/// - Missing namespace or key returns an empty list with `ok=true`.
#[flutter_rust_bridge::frb(sync)]
pub fn widget_snapshot(
    namespace: String,
    container_dir: String,
    backend: Option<String>,
) -> ListResponse {
    let config = match build_config(namespace, container_dir, backend) {
        Ok(config) => config,
        Err(message) => return ListResponse::failure(format!("widget_snapshot failed: {message}")),
    };
    match read_widget_snapshot(&config) {
        Ok(snapshot) => ListResponse {
            ok: true,
            remaining: clamp_count(snapshot.remaining),
            items: snapshot.items.iter().map(to_entry).collect(),
            synced: true,
            message: "OK.".to_string(),
        },
        Err(err) => ListResponse::failure(format!("widget_snapshot failed: {err}")),
    }
}

fn build_config(
    namespace: String,
    container_dir: String,
    backend: Option<String>,
) -> Result<SyncConfig, String> {
    let backend = match backend.as_deref().map(str::trim) {
        None | Some("") => StoreBackend::default(),
        Some(raw) => raw.parse::<StoreBackend>().map_err(|err| err.to_string())?,
    };
    SyncConfig::new(namespace, container_dir.trim())
        .map(|config| config.with_backend(backend))
        .map_err(|err| err.to_string())
}

fn with_session(name: &str, f: impl FnOnce(&mut HostSession) -> ListResponse) -> ListResponse {
    let mut guard = lock_session();
    match guard.as_mut() {
        Some(open) => f(&mut open.session),
        None => ListResponse::failure(format!("{name} failed: session not open")),
    }
}

fn respond(session: &HostSession, message: impl Into<String>) -> ListResponse {
    let list = session.list();
    ListResponse {
        ok: true,
        items: list.items().iter().map(to_entry).collect(),
        remaining: clamp_count(list.remaining_count()),
        synced: list.sync_status() == &SyncStatus::Synced,
        message: message.into(),
    }
}

fn to_entry(item: &ListItem) -> ListEntry {
    ListEntry {
        id: item.id.clone(),
        title: item.title.clone(),
        completed: item.completed,
        created_at_ms: item.created_at.timestamp_millis(),
    }
}

fn clamp_count(value: usize) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn lock_session() -> MutexGuard<'static, Option<OpenSession>> {
    SESSION
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::{
        core_version, init_logging, lifecycle_changed, list_add, list_clear, list_items,
        list_open, list_remove, list_toggle, ping, widget_snapshot,
    };
    use std::path::PathBuf;
    use std::sync::OnceLock;

    const NAMESPACE: &str = "group.com.example.ffi-test";

    fn container_dir() -> String {
        static ROOT: OnceLock<PathBuf> = OnceLock::new();
        let root = ROOT.get_or_init(|| {
            let dir = std::env::temp_dir().join(format!(
                "widgetlist-ffi-{}-{}",
                std::process::id(),
                std::time::SystemTime::now()
                    .duration_since(std::time::UNIX_EPOCH)
                    .expect("time went backwards")
                    .as_nanos()
            ));
            std::fs::create_dir_all(dir.join(NAMESPACE)).expect("provision namespace");
            dir
        });
        root.to_str().expect("utf-8 temp dir").to_string()
    }

    fn open() {
        let response = list_open(NAMESPACE.to_string(), container_dir(), None);
        assert!(response.ok, "{}", response.message);
    }

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }

    #[test]
    fn init_logging_rejects_empty_log_dir() {
        let error = init_logging("info".to_string(), String::new());
        assert!(!error.is_empty());
    }

    #[test]
    fn init_logging_rejects_unsupported_level() {
        let error = init_logging("verbose".to_string(), "tmp/logs".to_string());
        assert!(!error.is_empty());
    }

    #[test]
    fn list_open_rejects_relative_container_dir() {
        let response = list_open(NAMESPACE.to_string(), "relative".to_string(), None);
        assert!(!response.ok);
        assert!(response.message.contains("absolute"));
    }

    #[test]
    fn list_open_rejects_second_namespace() {
        open();
        let response = list_open("group.other".to_string(), container_dir(), None);
        assert!(!response.ok);
        assert!(response.message.contains("already open"));
    }

    #[test]
    fn list_calls_mutate_host_list_and_widget_replica() {
        open();
        let token = format!("ffi-{}", std::process::id());

        let added = list_add(token.clone());
        assert!(added.ok, "{}", added.message);
        assert!(added.synced);
        let id = added
            .items
            .iter()
            .find(|entry| entry.title == token)
            .map(|entry| entry.id.clone())
            .expect("added item should be listed");

        let toggled = list_toggle(id.clone());
        assert!(toggled.items.iter().any(|entry| entry.id == id && entry.completed));

        let widget = widget_snapshot(NAMESPACE.to_string(), container_dir(), None);
        assert!(widget.ok, "{}", widget.message);
        assert!(widget.items.iter().any(|entry| entry.id == id && entry.completed));

        let removed = list_remove(id.clone());
        assert!(removed.items.iter().all(|entry| entry.id != id));
        assert_eq!(list_remove(id).message, "No such item.");

        let blank = list_add("   ".to_string());
        assert!(!blank.ok);

        let cleared = list_clear();
        assert!(cleared.items.is_empty());
        assert!(list_items().items.is_empty());
    }

    #[test]
    fn lifecycle_reports_reload_once_per_background_episode() {
        open();
        assert!(!lifecycle_changed("active".to_string()).reload_widget);
        assert!(lifecycle_changed("background".to_string()).reload_widget);
        assert!(!lifecycle_changed("background".to_string()).reload_widget);
        assert!(!lifecycle_changed("unknown".to_string()).reload_widget);
        assert!(!lifecycle_changed("active".to_string()).reload_widget);
    }
}
