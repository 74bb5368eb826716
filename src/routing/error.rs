use std::fmt;

use super::lifecycle::RequestState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A route pattern could not be parsed.
    InvalidPattern { pattern: String, reason: String },
    /// A request tried to move between lifecycle states out of order.
    InvalidTransition {
        from: RequestState,
        to: RequestState,
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::InvalidPattern { pattern, reason } => {
                write!(f, "invalid route pattern `{}`: {}", pattern, reason)
            }
            RoutingError::InvalidTransition { from, to } => {
                write!(f, "invalid request transition {:?} -> {:?}", from, to)
            }
        }
    }
}

impl std::error::Error for RoutingError {}
