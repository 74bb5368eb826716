use std::fmt;

/// Error type for container operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContainerError {
    /// The key cannot be used as a single traversal segment.
    InvalidKey(String),
    /// The member does not satisfy the container's shape contract.
    InvalidMember { kind: &'static str, reason: String },
    /// An explicit key is already taken.
    Duplicate { container: String, key: String },
    /// No member stored under the key.
    NotFound { container: String, key: String },
}

impl fmt::Display for ContainerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContainerError::InvalidKey(key) => write!(f, "invalid container key: {:?}", key),
            ContainerError::InvalidMember { kind, reason } => {
                write!(f, "invalid {}: {}", kind, reason)
            }
            ContainerError::Duplicate { container, key } => {
                write!(f, "duplicate key `{}` in {}", key, container)
            }
            ContainerError::NotFound { container, key } => {
                write!(f, "`{}` not found in {}", key, container)
            }
        }
    }
}

impl std::error::Error for ContainerError {}
