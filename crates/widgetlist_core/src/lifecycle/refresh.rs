//! Fire-and-forget widget refresh signal.

use log::{info, warn};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// One-way request asking the platform to re-read the shared store.
///
/// Implementations must not block and must not fail loudly: a dropped
/// request only delays the widget until its next scheduled refresh.
pub trait RefreshSignal {
    fn fire(&self);
}

impl<R: RefreshSignal + ?Sized> RefreshSignal for Arc<R> {
    fn fire(&self) {
        (**self).fire()
    }
}

impl<R: RefreshSignal + ?Sized> RefreshSignal for Box<R> {
    fn fire(&self) {
        (**self).fire()
    }
}

/// Signal that does nothing; for hosts without a widget target.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopRefresh;

impl RefreshSignal for NoopRefresh {
    fn fire(&self) {
        info!("event=refresh_signal module=lifecycle status=skip reason=noop");
    }
}

/// Latch drained by the host, which then calls the platform reload API.
///
/// Used across FFI where core cannot call the platform directly.
#[derive(Debug, Default)]
pub struct PendingRefresh {
    pending: AtomicBool,
    fired: AtomicU64,
}

impl PendingRefresh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` once per outstanding request and resets the latch.
    pub fn take(&self) -> bool {
        self.pending.swap(false, Ordering::AcqRel)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }

    /// Total requests fired since construction.
    pub fn fire_count(&self) -> u64 {
        self.fired.load(Ordering::Acquire)
    }
}

impl RefreshSignal for PendingRefresh {
    fn fire(&self) {
        self.pending.store(true, Ordering::Release);
        let count = self.fired.fetch_add(1, Ordering::AcqRel) + 1;
        info!("event=refresh_signal module=lifecycle status=ok mode=pending count={count}");
    }
}

/// Signal backed by a host-provided closure.
pub struct CallbackRefresh {
    callback: Box<dyn Fn() + Send + Sync>,
}

impl CallbackRefresh {
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }
}

impl RefreshSignal for CallbackRefresh {
    fn fire(&self) {
        // A panicking platform hook must not take the host down with it.
        match catch_unwind(AssertUnwindSafe(|| (self.callback)())) {
            Ok(()) => info!("event=refresh_signal module=lifecycle status=ok mode=callback"),
            Err(_) => warn!("event=refresh_signal module=lifecycle status=error mode=callback error_code=callback_panicked"),
        }
    }
}
