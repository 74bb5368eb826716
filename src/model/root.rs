use serde::{Deserialize, Serialize};

use super::{
    AdSpaceContainer, ChannelContainer, ContainerError, UserContainer, Video, VideoContainer,
};

/// Top of the object graph. Owns every top-level collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Root {
    pub title: String,
    pub videos: VideoContainer,
    pub users: UserContainer,
    pub channels: ChannelContainer,
    pub banners: AdSpaceContainer,
    default_video: Option<String>,
}

impl Default for Root {
    fn default() -> Self {
        Self::new()
    }
}

impl Root {
    /// Names of the top-level collections, in traversal order.
    pub const COLLECTIONS: [&'static str; 4] = [
        VideoContainer::NAME,
        UserContainer::NAME,
        ChannelContainer::NAME,
        AdSpaceContainer::NAME,
    ];

    pub fn new() -> Self {
        Self {
            title: "mint".to_string(),
            videos: VideoContainer::new(),
            users: UserContainer::new(),
            channels: ChannelContainer::new(),
            banners: AdSpaceContainer::new(),
            default_video: None,
        }
    }

    pub fn default_video_key(&self) -> Option<&str> {
        self.default_video.as_deref()
    }

    /// The featured video: the configured default, else the first video.
    pub fn default_video(&self) -> Option<&Video> {
        self.default_video
            .as_deref()
            .and_then(|key| self.videos.get(key))
            .or_else(|| self.videos.values().next())
    }

    pub fn set_default_video(&mut self, key: &str) -> Result<(), ContainerError> {
        if !self.videos.contains(key) {
            return Err(ContainerError::NotFound {
                container: VideoContainer::NAME.to_string(),
                key: key.to_string(),
            });
        }
        self.default_video = Some(key.to_string());
        Ok(())
    }
}
