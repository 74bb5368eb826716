//! UtilityFinder - named shortcuts into the object graph.
//!
//! View code asks for "the videos" or "the users" by name instead of
//! hard-coding where those collections live under the root. The registry
//! is built once at startup and only read afterwards; share it behind an
//! `Arc` and do not mutate it while requests are being served.
//!
//! ## Example
//!
//! ```ignore
//! let finder = UtilityFinder::standard();
//! let videos = finder.videos(&root)?;
//! let intro = videos.get("intro");
//! ```

mod error;

use std::collections::BTreeMap;

use crate::model::{AdSpaceContainer, ChannelContainer, Root, UserContainer, VideoContainer};
use crate::traversal::{walk, walk_mut, Node, NodeKind, NodeMut};

pub use error::FinderError;

/// Registry mapping symbolic names to paths from the root.
#[derive(Debug, Clone, Default)]
pub struct UtilityFinder {
    registry: BTreeMap<String, Vec<String>>,
}

impl UtilityFinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// The registrations every mint site uses.
    pub fn standard() -> Self {
        let mut finder = Self::new();
        finder.register("videos", [VideoContainer::NAME]);
        finder.register("users", [UserContainer::NAME]);
        finder.register("channels", [ChannelContainer::NAME]);
        finder.register("banners", [AdSpaceContainer::NAME]);
        finder
    }

    /// Register `name` → `path`, replacing any previous registration.
    pub fn register<I, S>(&mut self, name: &str, path: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.registry
            .insert(name.to_string(), path.into_iter().map(Into::into).collect());
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        self.registry.keys().map(|name| name.as_str()).collect()
    }

    pub fn path(&self, name: &str) -> Result<&[String], FinderError> {
        self.registry
            .get(name)
            .map(|path| path.as_slice())
            .ok_or_else(|| FinderError::Unregistered(name.to_string()))
    }

    pub fn resolve<'a>(&self, root: &'a Root, name: &str) -> Result<Node<'a>, FinderError> {
        let path = self.path(name)?;
        walk(root, path).ok_or_else(|| FinderError::Unreachable {
            name: name.to_string(),
            path: path.to_vec(),
        })
    }

    pub fn resolve_mut<'a>(
        &self,
        root: &'a mut Root,
        name: &str,
    ) -> Result<NodeMut<'a>, FinderError> {
        let path = self.path(name)?;
        walk_mut(root, path).ok_or_else(|| FinderError::Unreachable {
            name: name.to_string(),
            path: path.to_vec(),
        })
    }

    pub fn videos<'a>(&self, root: &'a Root) -> Result<&'a VideoContainer, FinderError> {
        match self.resolve(root, "videos")? {
            Node::Videos(videos) => Ok(videos),
            other => Err(wrong_kind("videos", NodeKind::Videos, other.kind())),
        }
    }

    pub fn videos_mut<'a>(&self, root: &'a mut Root) -> Result<&'a mut VideoContainer, FinderError> {
        match self.resolve_mut(root, "videos")? {
            NodeMut::Videos(videos) => Ok(videos),
            other => Err(wrong_kind("videos", NodeKind::Videos, other.kind())),
        }
    }

    pub fn users<'a>(&self, root: &'a Root) -> Result<&'a UserContainer, FinderError> {
        match self.resolve(root, "users")? {
            Node::Users(users) => Ok(users),
            other => Err(wrong_kind("users", NodeKind::Users, other.kind())),
        }
    }

    pub fn users_mut<'a>(&self, root: &'a mut Root) -> Result<&'a mut UserContainer, FinderError> {
        match self.resolve_mut(root, "users")? {
            NodeMut::Users(users) => Ok(users),
            other => Err(wrong_kind("users", NodeKind::Users, other.kind())),
        }
    }

    pub fn channels<'a>(&self, root: &'a Root) -> Result<&'a ChannelContainer, FinderError> {
        match self.resolve(root, "channels")? {
            Node::Channels(channels) => Ok(channels),
            other => Err(wrong_kind("channels", NodeKind::Channels, other.kind())),
        }
    }

    pub fn channels_mut<'a>(
        &self,
        root: &'a mut Root,
    ) -> Result<&'a mut ChannelContainer, FinderError> {
        match self.resolve_mut(root, "channels")? {
            NodeMut::Channels(channels) => Ok(channels),
            other => Err(wrong_kind("channels", NodeKind::Channels, other.kind())),
        }
    }

    pub fn banners<'a>(&self, root: &'a Root) -> Result<&'a AdSpaceContainer, FinderError> {
        match self.resolve(root, "banners")? {
            Node::Banners(banners) => Ok(banners),
            other => Err(wrong_kind("banners", NodeKind::Banners, other.kind())),
        }
    }

    pub fn banners_mut<'a>(
        &self,
        root: &'a mut Root,
    ) -> Result<&'a mut AdSpaceContainer, FinderError> {
        match self.resolve_mut(root, "banners")? {
            NodeMut::Banners(banners) => Ok(banners),
            other => Err(wrong_kind("banners", NodeKind::Banners, other.kind())),
        }
    }
}

fn wrong_kind(name: &str, expected: NodeKind, found: NodeKind) -> FinderError {
    FinderError::WrongKind {
        name: name.to_string(),
        expected,
        found,
    }
}
