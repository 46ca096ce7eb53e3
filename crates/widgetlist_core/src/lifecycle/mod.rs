//! Host lifecycle tracking and widget refresh requests.
//!
//! # Responsibility
//! - Collapse platform lifecycle callbacks into `Active/Inactive/Background`.
//! - Ask the platform to refresh the widget once per background episode.
//!
//! # Invariants
//! - Only the `* -> Background` edge is actionable.
//! - Refresh requests are best-effort; the widget's own read of the store is
//!   the source of truth.

pub mod monitor;
pub mod refresh;
