//! Model - the persistent object graph.
//!
//! A `Root` owns four typed containers (videos, users, channels, banners).
//! Containers own their members outright; the only upward link is a
//! member's `Location`, which names the owning container by path and is
//! resolved through the root, never held as a pointer.
//!
//! ## Example
//!
//! ```ignore
//! use mint::model::{Root, VideoContainer};
//!
//! let mut root = Root::new();
//! let key = root.videos.add_video("My Video", "", ["feature"])?;
//! assert_eq!(key, "my_video");
//! assert_eq!(root.videos.get("my_video").unwrap().parent(), Some("videos"));
//! ```

mod advert;
mod channel;
mod container;
mod error;
mod root;
mod user;
mod video;

use serde::{de::DeserializeOwned, Deserialize, Serialize};

pub use advert::{AdSpace, AdSpaceContainer, Advert};
pub use channel::{Channel, ChannelContainer};
pub use container::{slugify, Container};
pub use error::ContainerError;
pub use root::Root;
pub use user::{User, UserContainer};
pub use video::{Encode, EncodeMeta, Video, VideoContainer};

/// Where a member lives: the owning container's path and its own key.
///
/// A member that has never been inserted has no parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub parent: Option<String>,
    pub name: String,
}

/// Static contract for anything a `Container` may hold.
pub trait Member: Clone + Serialize + DeserializeOwned + Send + Sync {
    /// Human-readable kind, used in validation errors.
    const KIND: &'static str;

    /// Display name; new keys are slugged from it.
    fn title(&self) -> &str;

    fn location(&self) -> &Location;

    fn location_mut(&mut self) -> &mut Location;

    /// Shape check run on every insertion.
    fn validate(&self) -> Result<(), String> {
        if self.title().trim().is_empty() {
            return Err("title is required".to_string());
        }
        Ok(())
    }

    /// Called by the owning container when the member is stored under `key`.
    fn attach(&mut self, parent: &str, key: &str) {
        let location = self.location_mut();
        location.parent = Some(parent.to_string());
        location.name = key.to_string();
    }

    /// The member's key within its container.
    fn key(&self) -> &str {
        &self.location().name
    }

    /// Path of the owning container, if stored.
    fn parent(&self) -> Option<&str> {
        self.location().parent.as_deref()
    }
}
