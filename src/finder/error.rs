use std::fmt;

use crate::traversal::NodeKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FinderError {
    /// No path registered under the name.
    Unregistered(String),
    /// The registered path does not lead to a stored object.
    Unreachable { name: String, path: Vec<String> },
    /// The path leads to an object of the wrong kind.
    WrongKind {
        name: String,
        expected: NodeKind,
        found: NodeKind,
    },
}

impl fmt::Display for FinderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FinderError::Unregistered(name) => write!(f, "no utility registered as `{}`", name),
            FinderError::Unreachable { name, path } => {
                write!(f, "utility `{}` unreachable at /{}", name, path.join("/"))
            }
            FinderError::WrongKind {
                name,
                expected,
                found,
            } => write!(f, "utility `{}` is a {}, expected a {}", name, found, expected),
        }
    }
}

impl std::error::Error for FinderError {}
