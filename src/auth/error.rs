use std::fmt;

use crate::finder::FinderError;
use crate::store::StoreError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    Store(StoreError),
    /// The user container could not be located.
    Finder(FinderError),
    /// An `Authorization` header that is not valid Basic credentials.
    MalformedHeader(String),
    LockPoisoned,
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::Store(e) => write!(f, "auth store error: {}", e),
            AuthError::Finder(e) => write!(f, "auth lookup error: {}", e),
            AuthError::MalformedHeader(msg) => write!(f, "malformed authorization header: {}", msg),
            AuthError::LockPoisoned => write!(f, "ticket store lock poisoned"),
        }
    }
}

impl std::error::Error for AuthError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AuthError::Store(e) => Some(e),
            AuthError::Finder(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for AuthError {
    fn from(err: StoreError) -> Self {
        AuthError::Store(err)
    }
}

impl From<FinderError> for AuthError {
    fn from(err: FinderError) -> Self {
        AuthError::Finder(err)
    }
}
