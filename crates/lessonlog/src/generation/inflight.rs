//! Stale-response guard for concurrent generation requests.
//!
//! Each request takes a ticket for its target. Only the newest ticket for a
//! target may write its result; older responses are dropped.

use std::collections::HashMap;
use std::fmt;
use std::sync::Mutex;

use tracing::debug;

/// What a generation request will write to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    /// Description of the strategy with this id.
    Description(u32),
    /// A suggested strategy name.
    Suggestion,
    /// The narrative report.
    Report,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Description(id) => write!(f, "description of strategy {id}"),
            Self::Suggestion => write!(f, "strategy suggestion"),
            Self::Report => write!(f, "report narrative"),
        }
    }
}

/// Proof that a request was started; compare with [`InFlight::is_current`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    target: Target,
    seq: u64,
}

impl Ticket {
    /// The request target.
    #[must_use]
    pub fn target(&self) -> Target {
        self.target
    }
}

/// Per-target request counters.
#[derive(Debug, Default)]
pub struct InFlight {
    latest: Mutex<HashMap<Target, u64>>,
}

impl InFlight {
    /// Create an empty guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a request for `target`, superseding any earlier one.
    pub fn begin(&self, target: Target) -> Ticket {
        let mut latest = self
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        let seq = latest.get(&target).map_or(1, |s| s + 1);
        latest.insert(target, seq);
        debug!(request = %target, seq, "generation request started");
        Ticket { target, seq }
    }

    /// Whether `ticket` is still the newest request for its target.
    #[must_use]
    pub fn is_current(&self, ticket: &Ticket) -> bool {
        let latest = self
            .latest
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        latest.get(&ticket.target) == Some(&ticket.seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_request_is_current() {
        let inflight = InFlight::new();
        let ticket = inflight.begin(Target::Report);
        assert!(inflight.is_current(&ticket));
        assert_eq!(ticket.target(), Target::Report);
    }

    #[test]
    fn test_newer_request_supersedes_older() {
        let inflight = InFlight::new();
        let first = inflight.begin(Target::Suggestion);
        let second = inflight.begin(Target::Suggestion);
        assert!(!inflight.is_current(&first));
        assert!(inflight.is_current(&second));
    }

    #[test]
    fn test_targets_are_independent() {
        let inflight = InFlight::new();
        let a = inflight.begin(Target::Description(1));
        let b = inflight.begin(Target::Description(2));
        assert!(inflight.is_current(&a));
        assert!(inflight.is_current(&b));
    }

    #[test]
    fn test_target_display() {
        assert_eq!(
            Target::Description(4).to_string(),
            "description of strategy 4"
        );
    }
}
