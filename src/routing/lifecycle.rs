use super::error::RoutingError;

/// Where a request is in the dispatch pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Unrouted,
    RouteMatched,
    Traversed,
    Dispatched,
    Responded,
    Unauthorized,
    Forbidden,
    NotFound,
}

impl RequestState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RequestState::Responded
                | RequestState::Unauthorized
                | RequestState::Forbidden
                | RequestState::NotFound
        )
    }

    fn can_advance_to(self, next: RequestState) -> bool {
        use RequestState::*;
        matches!(
            (self, next),
            (Unrouted, RouteMatched)
                | (Unrouted, Traversed)
                | (RouteMatched | Traversed, Dispatched)
                | (RouteMatched | Traversed, Unauthorized)
                | (RouteMatched | Traversed, Forbidden)
                | (RouteMatched | Traversed, NotFound)
                | (Dispatched, Responded)
        )
    }
}

/// Per-request state machine. Moves only forward; there are no retries
/// within one lifecycle.
#[derive(Debug, Clone)]
pub struct Lifecycle {
    state: RequestState,
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

impl Lifecycle {
    pub fn new() -> Self {
        Self {
            state: RequestState::Unrouted,
        }
    }

    pub fn state(&self) -> RequestState {
        self.state
    }

    pub fn advance(&mut self, next: RequestState) -> Result<(), RoutingError> {
        if !self.state.can_advance_to(next) {
            return Err(RoutingError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::trace!(from = ?self.state, to = ?next, "request transition");
        self.state = next;
        Ok(())
    }
}
