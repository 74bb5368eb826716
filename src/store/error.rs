use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Another commit landed on the root after this connection opened it.
    Conflict {
        base: String,
        expected: u64,
        actual: u64,
    },
    /// No root has been bootstrapped under this base name.
    MissingRoot(String),
    LockPoisoned(&'static str),
    UnsupportedUri(String),
    /// The database image could not be encoded or decoded.
    Encode(String),
    Io(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreError::Conflict {
                base,
                expected,
                actual,
            } => write!(
                f,
                "conflicting commit on root `{}` (opened at version {}, now {})",
                base, expected, actual
            ),
            StoreError::MissingRoot(base) => write!(f, "no root named `{}`", base),
            StoreError::LockPoisoned(operation) => {
                write!(f, "database lock poisoned during {}", operation)
            }
            StoreError::UnsupportedUri(uri) => write!(f, "unsupported database uri: {}", uri),
            StoreError::Encode(msg) => write!(f, "database image error: {}", msg),
            StoreError::Io(msg) => write!(f, "database io error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<bitcode::Error> for StoreError {
    fn from(err: bitcode::Error) -> Self {
        StoreError::Encode(err.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// The path escapes the store or names no file.
    InvalidPath(String),
    NotFound(String),
    Io(String),
}

impl fmt::Display for MediaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaError::InvalidPath(path) => write!(f, "invalid media path: {}", path),
            MediaError::NotFound(path) => write!(f, "media not found: {}", path),
            MediaError::Io(msg) => write!(f, "media io error: {}", msg),
        }
    }
}

impl std::error::Error for MediaError {}

impl From<std::io::Error> for MediaError {
    fn from(err: std::io::Error) -> Self {
        MediaError::Io(err.to_string())
    }
}
