//! Traversal - resolving URL paths by walking the object graph.
//!
//! Starting at the root, each path segment is looked up as a child of the
//! current object. The first segment that does not resolve becomes the
//! view name and everything after it the subpath. A segment prefixed with
//! `@@` always names a view, even if a child of that name exists.
//!
//! ```text
//! /videos/intro              -> context videos/intro, view ""
//! /channels/feature/edit.html -> context channels/feature, view "edit.html"
//! /@@static/css/screen.css   -> context root, view "static", subpath [css, screen.css]
//! ```

mod node;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::model::Root;
use crate::security::Acl;

pub use node::{Node, NodeKind, NodeMut};

/// Owned reference to a traversal context: its kind and its path from the
/// root. Re-resolve with `walk`/`walk_mut` to reach the object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextRef {
    pub kind: NodeKind,
    pub path: Vec<String>,
}

impl ContextRef {
    pub fn root() -> Self {
        Self {
            kind: NodeKind::Root,
            path: Vec::new(),
        }
    }

    /// Key of the context within its container; `None` for the root.
    pub fn name(&self) -> Option<&str> {
        self.path.last().map(|s| s.as_str())
    }
}

/// Result of traversing a path.
#[derive(Debug, Clone)]
pub struct Traversal {
    pub context: ContextRef,
    pub view_name: String,
    pub subpath: Vec<String>,
    /// ACLs met on the way down, root first.
    pub lineage: Vec<Acl>,
}

/// Bytes left as they are when a key or file path goes into a URL.
const PATH_SAFE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Split a URL path into non-empty, percent-decoded segments.
///
/// Splitting happens before decoding, so an encoded `%2F` stays inside
/// its segment.
pub fn segments(path: &str) -> Vec<String> {
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| percent_decode_str(segment).decode_utf8_lossy().into_owned())
        .collect()
}

/// Percent-encode a key or `/`-separated path for use in a URL.
pub fn encode_path(path: &str) -> String {
    utf8_percent_encode(path, PATH_SAFE).to_string()
}

/// Follow `path` from `root`, failing if any key is missing.
pub fn walk<'a, S: AsRef<str>>(root: &'a Root, path: &[S]) -> Option<Node<'a>> {
    let mut node = Node::Root(root);
    for key in path {
        node = node.child(key.as_ref())?;
    }
    Some(node)
}

/// Mutable counterpart of `walk`. Only stored objects are reachable.
pub fn walk_mut<'a, S: AsRef<str>>(root: &'a mut Root, path: &[S]) -> Option<NodeMut<'a>> {
    let mut node = NodeMut::Root(root);
    for key in path {
        node = node.child(key.as_ref())?;
    }
    Some(node)
}

/// Resolve a URL path to a context, view name and subpath.
pub fn traverse(root: &Root, path: &str) -> Traversal {
    let segments = segments(path);
    let mut node = Node::Root(root);
    let mut lineage: Vec<Acl> = node.acl().into_iter().collect();
    let mut context_path = Vec::new();
    let mut view_name = String::new();
    let mut subpath = Vec::new();

    for (index, segment) in segments.iter().enumerate() {
        if let Some(view) = segment.strip_prefix("@@") {
            view_name = view.to_string();
            subpath = segments[index + 1..].to_vec();
            break;
        }
        match node.child(segment) {
            Some(child) => {
                lineage.extend(child.acl());
                context_path.push(segment.clone());
                node = child;
            }
            None => {
                view_name = segment.clone();
                subpath = segments[index + 1..].to_vec();
                break;
            }
        }
    }

    Traversal {
        context: ContextRef {
            kind: node.kind(),
            path: context_path,
        },
        view_name,
        subpath,
        lineage,
    }
}
