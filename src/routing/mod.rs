//! Routing - an explicit route table tried before traversal.
//!
//! Each request first meets the `RouteMapper`. A hit yields a transient
//! context carrying the captured parameters; a miss falls back to
//! traversal of the persistent root.
//!
//! ## Example
//!
//! ```ignore
//! let mut mapper = RouteMapper::new();
//! mapper.connect("/tags/:tag", "tag")?;
//!
//! match resolve(&mapper, &root, "/tags/feature") {
//!     Resolution::Routed(m) => assert_eq!(m.param("tag"), Some("feature")),
//!     Resolution::Traversed(_) => unreachable!(),
//! }
//! ```

mod error;
mod lifecycle;
mod mapper;

pub use error::RoutingError;
pub use lifecycle::{Lifecycle, RequestState};
pub use mapper::{RouteMapper, RouteMatch};

use crate::model::Root;
use crate::traversal::{traverse, Traversal};

/// How a request path was resolved.
#[derive(Debug, Clone)]
pub enum Resolution {
    Routed(RouteMatch),
    Traversed(Traversal),
}

/// Try the route table, then fall back to traversing `root`.
pub fn resolve(mapper: &RouteMapper, root: &Root, path: &str) -> Resolution {
    match mapper.match_path(path) {
        Some(matched) => Resolution::Routed(matched),
        None => Resolution::Traversed(traverse(root, path)),
    }
}
