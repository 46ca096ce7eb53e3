//! Three-state lifecycle machine with one actionable edge.

use crate::lifecycle::refresh::RefreshSignal;
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Host lifecycle state collapsed from platform-specific callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleState {
    Active,
    Inactive,
    Background,
}

impl LifecycleState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Inactive => "inactive",
            Self::Background => "background",
        }
    }
}

/// Platform state string outside the three-state model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LifecycleParseError(pub String);

impl Display for LifecycleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unsupported lifecycle state `{}`; expected active|inactive|background",
            self.0
        )
    }
}

impl Error for LifecycleParseError {}

impl FromStr for LifecycleState {
    type Err = LifecycleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "inactive" => Ok(Self::Inactive),
            "background" => Ok(Self::Background),
            other => Err(LifecycleParseError(other.to_string())),
        }
    }
}

/// Result of feeding one lifecycle event to the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// Entered `Background`; the refresh signal fired.
    Fired,
    /// Repeated `Background` event within the same episode.
    Debounced,
    /// Transition into `Active` or `Inactive`.
    Ignored,
}

/// Watches host lifecycle events and fires the refresh signal on backgrounding.
///
/// # Invariants
/// - Fires exactly once per entry into `Background`, regardless of how many
///   duplicate `Background` events the platform delivers.
/// - The initial state is unknown, so a first `Background` event fires.
pub struct LifecycleMonitor<R: RefreshSignal> {
    signal: R,
    current: Option<LifecycleState>,
    background_episodes: u64,
}

impl<R: RefreshSignal> LifecycleMonitor<R> {
    pub fn new(signal: R) -> Self {
        Self {
            signal,
            current: None,
            background_episodes: 0,
        }
    }

    pub fn current(&self) -> Option<LifecycleState> {
        self.current
    }

    /// Number of background episodes that fired the signal.
    pub fn background_episodes(&self) -> u64 {
        self.background_episodes
    }

    pub fn signal(&self) -> &R {
        &self.signal
    }

    /// Applies one transition event.
    pub fn on_transition(&mut self, next: LifecycleState) -> TransitionOutcome {
        let previous = self.current.replace(next);
        let outcome = match next {
            LifecycleState::Background if previous == Some(LifecycleState::Background) => {
                TransitionOutcome::Debounced
            }
            LifecycleState::Background => {
                self.background_episodes += 1;
                self.signal.fire();
                TransitionOutcome::Fired
            }
            LifecycleState::Active | LifecycleState::Inactive => TransitionOutcome::Ignored,
        };

        match outcome {
            TransitionOutcome::Fired => info!(
                "event=lifecycle_transition module=lifecycle status=ok from={} to={} outcome=fired episode={}",
                previous.map_or("unknown", LifecycleState::as_str),
                next.as_str(),
                self.background_episodes
            ),
            _ => debug!(
                "event=lifecycle_transition module=lifecycle status=ok from={} to={} outcome={:?}",
                previous.map_or("unknown", LifecycleState::as_str),
                next.as_str(),
                outcome
            ),
        }
        outcome
    }

    /// Parses a platform state string and applies it.
    ///
    /// # Errors
    /// - `LifecycleParseError` for states outside the three-state model; the
    ///   monitor state is left unchanged.
    pub fn on_platform_event(
        &mut self,
        raw_state: &str,
    ) -> Result<TransitionOutcome, LifecycleParseError> {
        let state = raw_state.parse::<LifecycleState>()?;
        Ok(self.on_transition(state))
    }
}
