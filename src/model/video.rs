use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::{Container, ContainerError, Location, Member};

/// Technical details of an encoded media file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodeMeta {
    pub size: u64,
    pub bitrate: Option<u32>,
    pub width: Option<u32>,
    pub height: Option<u32>,
}

/// One encoded rendition of a video, stored on disk under the video's
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Encode {
    /// Format name, e.g. `mp4` or `ogv`. Unique per video.
    pub format: String,
    /// File path relative to the media root, `<video>/<format>.<ext>`.
    pub path: String,
    pub content_type: String,
    pub meta: EncodeMeta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    location: Location,
    title: String,
    description: String,
    tags: Vec<String>,
    encodes: BTreeMap<String, Encode>,
}

impl Video {
    pub fn new<I, S>(title: impl Into<String>, description: impl Into<String>, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: Location::default(),
            title: title.into(),
            description: description.into(),
            tags: tags.into_iter().map(Into::into).collect(),
            encodes: BTreeMap::new(),
        }
    }

    /// The video's key, unique within its container.
    pub fn id(&self) -> &str {
        self.key()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_tags<I, S>(&mut self, tags: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
    }

    pub fn encodes(&self) -> impl Iterator<Item = &Encode> {
        self.encodes.values()
    }

    pub fn encode(&self, format: &str) -> Option<&Encode> {
        self.encodes.get(format)
    }

    /// Record an encode, replacing any previous one of the same format.
    pub fn add_encode(&mut self, encode: Encode) -> Option<Encode> {
        self.encodes.insert(encode.format.clone(), encode)
    }
}

impl Member for Video {
    const KIND: &'static str = "video";

    fn title(&self) -> &str {
        &self.title
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }
}

/// The `videos` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoContainer {
    videos: Container<Video>,
}

impl Default for VideoContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl VideoContainer {
    pub const NAME: &'static str = "videos";

    pub fn new() -> Self {
        Self {
            videos: Container::new(Self::NAME),
        }
    }

    /// Create a video and return its key; colliding titles get `_NNN` suffixes.
    pub fn add_video<I, S>(
        &mut self,
        title: &str,
        description: &str,
        tags: I,
    ) -> Result<String, ContainerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.videos.add(Video::new(title, description, tags))
    }

    pub fn get_videos_by_tag(&self, tag: &str) -> Vec<&Video> {
        self.videos.values().filter(|video| video.has_tag(tag)).collect()
    }
}

impl Deref for VideoContainer {
    type Target = Container<Video>;

    fn deref(&self) -> &Self::Target {
        &self.videos
    }
}

impl DerefMut for VideoContainer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.videos
    }
}
