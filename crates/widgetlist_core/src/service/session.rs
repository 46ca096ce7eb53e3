//! Per-process composition root for the widget sync core.
//!
//! # Responsibility
//! - Own the list service and lifecycle monitor for the host process.
//!
//! # Invariants
//! - Constructed once per host process and held for its lifetime; there is
//!   no ambient global store handle inside core.

use crate::config::SyncConfig;
use crate::lifecycle::monitor::{LifecycleMonitor, LifecycleParseError, LifecycleState, TransitionOutcome};
use crate::lifecycle::refresh::RefreshSignal;
use crate::service::list_service::ListService;
use crate::store::{open_store, DynStore, SerializedStore, StorageError};
use crate::sync::writer::{LoadError, SyncWriter};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum SessionError {
    Storage(StorageError),
    Load(LoadError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Load(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Load(err) => Some(err),
        }
    }
}

impl From<StorageError> for SessionError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<LoadError> for SessionError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

/// Host-side session: the list plus the lifecycle hook.
pub struct WidgetSyncSession<S: SerializedStore, R: RefreshSignal> {
    list: ListService<S>,
    lifecycle: LifecycleMonitor<R>,
}

impl<R: RefreshSignal> WidgetSyncSession<DynStore, R> {
    /// Opens the configured store and hydrates the list from its replica.
    ///
    /// # Errors
    /// - `SessionError::Storage` when the namespace is not provisioned or the
    ///   backend cannot be opened.
    /// - `SessionError::Load` when the existing replica cannot be read or
    ///   decoded.
    pub fn open(config: &SyncConfig, signal: R) -> Result<Self, SessionError> {
        let store = open_store(config)?;
        let writer = SyncWriter::new(store, config.storage_key.as_str())?;
        let list = ListService::hydrate(writer)?;
        info!(
            "event=session_open module=service status=ok namespace={} backend={:?} items={}",
            config.namespace,
            config.backend,
            list.model().len()
        );
        Ok(Self::new(list, signal))
    }
}

impl<S: SerializedStore, R: RefreshSignal> WidgetSyncSession<S, R> {
    pub fn new(list: ListService<S>, signal: R) -> Self {
        Self {
            list,
            lifecycle: LifecycleMonitor::new(signal),
        }
    }

    pub fn list(&self) -> &ListService<S> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListService<S> {
        &mut self.list
    }

    pub fn lifecycle(&self) -> &LifecycleMonitor<R> {
        &self.lifecycle
    }

    /// Forwards one lifecycle transition to the monitor.
    pub fn on_lifecycle(&mut self, state: LifecycleState) -> TransitionOutcome {
        self.lifecycle.on_transition(state)
    }

    /// Forwards one raw platform lifecycle string to the monitor.
    pub fn on_platform_lifecycle(
        &mut self,
        raw_state: &str,
    ) -> Result<TransitionOutcome, LifecycleParseError> {
        self.lifecycle.on_platform_event(raw_state)
    }
}
