//! Lifecycle state of an [`EventManager`](crate::EventManager).
//!
//! ```text
//! Uninitialized ──► Initializing ──► Listening ──► Terminated
//!       │                 │                            ▲
//!       └─────────────────┴────────────────────────────┘
//! ```
//! Transitions only move forward; `Terminated` is final.

use std::sync::atomic::{AtomicU8, Ordering};

/// Where the manager is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ManagerState {
    /// No stream yet.
    Uninitialized = 0,
    /// Stream opened; registration allowed, not consuming inbound messages yet.
    Initializing = 1,
    /// The receive loop is running.
    Listening = 2,
    /// Disposed, open failed, or the stream ended.
    Terminated = 3,
}

impl ManagerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            ManagerState::Uninitialized => "uninitialized",
            ManagerState::Initializing => "initializing",
            ManagerState::Listening => "listening",
            ManagerState::Terminated => "terminated",
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => ManagerState::Uninitialized,
            1 => ManagerState::Initializing,
            2 => ManagerState::Listening,
            _ => ManagerState::Terminated,
        }
    }
}

impl std::fmt::Display for ManagerState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder enforcing forward-only transitions.
#[derive(Debug)]
pub(crate) struct StateCell(AtomicU8);

impl StateCell {
    pub(crate) fn new() -> Self {
        Self(AtomicU8::new(ManagerState::Uninitialized as u8))
    }

    pub(crate) fn get(&self) -> ManagerState {
        ManagerState::from_u8(self.0.load(Ordering::Acquire))
    }

    /// Moves `from → to`; false if the current state is not `from`.
    pub(crate) fn transition(&self, from: ManagerState, to: ManagerState) -> bool {
        debug_assert!(to > from);
        self.0
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Moves to `Terminated`; returns the previous state.
    pub(crate) fn terminate(&self) -> ManagerState {
        ManagerState::from_u8(self.0.swap(ManagerState::Terminated as u8, Ordering::AcqRel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        let cell = StateCell::new();
        assert!(cell.transition(ManagerState::Uninitialized, ManagerState::Initializing));
        assert!(!cell.transition(ManagerState::Uninitialized, ManagerState::Initializing));
        assert!(cell.transition(ManagerState::Initializing, ManagerState::Listening));
        assert_eq!(cell.get(), ManagerState::Listening);

        assert_eq!(cell.terminate(), ManagerState::Listening);
        assert_eq!(cell.terminate(), ManagerState::Terminated);
        assert!(!cell.transition(ManagerState::Initializing, ManagerState::Listening));
        assert_eq!(cell.get().as_str(), "terminated");
    }
}
