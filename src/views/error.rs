use std::fmt;

use crate::auth::AuthError;
use crate::finder::FinderError;
use crate::model::ContainerError;
use crate::routing::RoutingError;
use crate::store::{MediaError, StoreError};

/// Error raised while handling a request.
#[derive(Debug)]
pub enum ViewError {
    /// No object or view for the request.
    NotFound(String),
    /// Malformed form input that cannot be shown back as a form message.
    BadRequest(String),
    Container(ContainerError),
    Finder(FinderError),
    Store(StoreError),
    Media(MediaError),
    Auth(AuthError),
    Routing(RoutingError),
    /// A page template failed to load or render.
    Template(minijinja::Error),
}

impl fmt::Display for ViewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViewError::NotFound(what) => write!(f, "not found: {}", what),
            ViewError::BadRequest(msg) => write!(f, "bad request: {}", msg),
            ViewError::Container(e) => write!(f, "{}", e),
            ViewError::Finder(e) => write!(f, "{}", e),
            ViewError::Store(e) => write!(f, "{}", e),
            ViewError::Media(e) => write!(f, "{}", e),
            ViewError::Auth(e) => write!(f, "{}", e),
            ViewError::Routing(e) => write!(f, "{}", e),
            ViewError::Template(e) => write!(f, "template error: {}", e),
        }
    }
}

impl std::error::Error for ViewError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ViewError::Container(e) => Some(e),
            ViewError::Finder(e) => Some(e),
            ViewError::Store(e) => Some(e),
            ViewError::Media(e) => Some(e),
            ViewError::Auth(e) => Some(e),
            ViewError::Routing(e) => Some(e),
            ViewError::Template(e) => Some(e),
            ViewError::NotFound(_) | ViewError::BadRequest(_) => None,
        }
    }
}

impl From<ContainerError> for ViewError {
    fn from(err: ContainerError) -> Self {
        ViewError::Container(err)
    }
}

impl From<FinderError> for ViewError {
    fn from(err: FinderError) -> Self {
        ViewError::Finder(err)
    }
}

impl From<StoreError> for ViewError {
    fn from(err: StoreError) -> Self {
        ViewError::Store(err)
    }
}

impl From<MediaError> for ViewError {
    fn from(err: MediaError) -> Self {
        ViewError::Media(err)
    }
}

impl From<AuthError> for ViewError {
    fn from(err: AuthError) -> Self {
        ViewError::Auth(err)
    }
}

impl From<RoutingError> for ViewError {
    fn from(err: RoutingError) -> Self {
        ViewError::Routing(err)
    }
}

impl From<minijinja::Error> for ViewError {
    fn from(err: minijinja::Error) -> Self {
        ViewError::Template(err)
    }
}

impl ViewError {
    /// Map this error to an HTTP status code.
    pub fn status_code(&self) -> u16 {
        match self {
            ViewError::NotFound(_) => 404,
            ViewError::BadRequest(_) => 400,
            ViewError::Container(ContainerError::NotFound { .. }) => 404,
            ViewError::Container(ContainerError::Duplicate { .. }) => 409,
            ViewError::Container(_) => 400,
            ViewError::Store(StoreError::Conflict { .. }) => 409,
            ViewError::Media(MediaError::NotFound(_) | MediaError::InvalidPath(_)) => 404,
            ViewError::Finder(_)
            | ViewError::Store(_)
            | ViewError::Media(_)
            | ViewError::Auth(_)
            | ViewError::Routing(_)
            | ViewError::Template(_) => 500,
        }
    }
}
