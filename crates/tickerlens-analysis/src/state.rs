//! Per-request state machine.

use serde::Serialize;
use std::fmt;
use thiserror::Error;
use tracing::{error, info};
use uuid::Uuid;

/// Lifecycle of one analysis request.
///
/// ```text
/// Pending -> Fetching -> [FallbackFetching] -> Computing -> Recommending -> Done
///            Fetching | FallbackFetching -> Failed
///            any non-terminal -> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestState {
    Pending,
    Fetching,
    FallbackFetching,
    Computing,
    Recommending,
    Done,
    Failed,
    Cancelled,
}

/// A transition the state machine does not allow.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("invalid request transition {from} -> {to}")]
pub struct InvalidTransition {
    pub from: RequestState,
    pub to: RequestState,
}

impl RequestState {
    /// Whether no further transitions are possible.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed | Self::Cancelled)
    }

    /// Move to `next`, rejecting transitions outside the lifecycle.
    pub fn advance(self, next: RequestState) -> Result<RequestState, InvalidTransition> {
        use RequestState::*;

        let allowed = match (self, next) {
            (Pending, Fetching) => true,
            (Fetching, FallbackFetching) => true,
            (FallbackFetching, FallbackFetching) => true,
            (Fetching | FallbackFetching, Computing | Failed) => true,
            (Computing, Recommending) => true,
            (Recommending, Done) => true,
            (from, Cancelled) => !from.is_terminal(),
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(InvalidTransition {
                from: self,
                to: next,
            })
        }
    }
}

impl fmt::Display for RequestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Fetching => "FETCHING",
            Self::FallbackFetching => "FALLBACK_FETCHING",
            Self::Computing => "COMPUTING",
            Self::Recommending => "RECOMMENDING",
            Self::Done => "DONE",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
        };
        f.write_str(s)
    }
}

/// Current state and history of one request, logged on every move.
#[derive(Debug, Clone)]
pub struct RequestTracker {
    id: Uuid,
    symbol: String,
    state: RequestState,
    history: Vec<RequestState>,
}

impl RequestTracker {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            symbol: symbol.into(),
            state: RequestState::Pending,
            history: vec![RequestState::Pending],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    /// Every state visited, starting with `Pending`.
    pub fn history(&self) -> &[RequestState] {
        &self.history
    }

    /// Apply a transition. An invalid one leaves the state unchanged.
    pub fn advance(&mut self, next: RequestState) -> Result<(), InvalidTransition> {
        match self.state.advance(next) {
            Ok(state) => {
                if state != self.state {
                    info!(
                        request_id = %self.id,
                        symbol = %self.symbol,
                        from = %self.state,
                        to = %state,
                        "Request state changed"
                    );
                    self.history.push(state);
                }
                self.state = state;
                Ok(())
            }
            Err(rejected) => {
                error!(request_id = %self.id, symbol = %self.symbol, %rejected, "Rejected request transition");
                Err(rejected)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use RequestState::*;

    #[test]
    fn test_happy_path() {
        let mut state = Pending;
        for next in [Fetching, Computing, Recommending, Done] {
            state = state.advance(next).unwrap();
        }
        assert_eq!(state, Done);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fallback_path() {
        let state = Fetching.advance(FallbackFetching).unwrap();
        assert_eq!(state.advance(FallbackFetching), Ok(FallbackFetching));
        assert_eq!(state.advance(Computing), Ok(Computing));
        assert_eq!(state.advance(Failed), Ok(Failed));
    }

    #[test]
    fn test_failed_only_from_fetching() {
        assert!(Fetching.advance(Failed).is_ok());
        assert!(Computing.advance(Failed).is_err());
        assert!(Recommending.advance(Failed).is_err());
        assert!(Pending.advance(Failed).is_err());
    }

    #[test]
    fn test_cancel_from_non_terminal_only() {
        for state in [Pending, Fetching, FallbackFetching, Computing, Recommending] {
            assert_eq!(state.advance(Cancelled), Ok(Cancelled));
        }
        for state in [Done, Failed, Cancelled] {
            assert!(state.advance(Cancelled).is_err());
        }
    }

    #[test]
    fn test_no_skipping_or_leaving_terminal() {
        assert!(Pending.advance(Computing).is_err());
        assert!(Fetching.advance(Recommending).is_err());
        assert!(Done.advance(Fetching).is_err());
        assert_eq!(
            Computing.advance(Fetching),
            Err(InvalidTransition {
                from: Computing,
                to: Fetching
            })
        );
    }

    #[test]
    fn test_tracker_records_history() {
        let mut tracker = RequestTracker::new("AAPL");
        tracker.advance(Fetching).unwrap();
        tracker.advance(FallbackFetching).unwrap();
        tracker.advance(FallbackFetching).unwrap();
        assert!(tracker.advance(Done).is_err());
        tracker.advance(Failed).unwrap();

        assert_eq!(tracker.state(), Failed);
        assert_eq!(tracker.history(), &[Pending, Fetching, FallbackFetching, Failed]);
    }
}
