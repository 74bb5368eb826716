//! Bootstrap - building the initial root.
//!
//! Runs once at startup, before any request is served. A root is built
//! from a JSON seed file when one is configured, otherwise from the
//! built-in sample catalogue.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::model::{ContainerError, Root};
use crate::store::{Database, StoreError};

#[derive(Debug)]
pub enum SeedError {
    Io(String),
    Parse(String),
    Container(ContainerError),
    Store(StoreError),
}

impl fmt::Display for SeedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SeedError::Io(msg) => write!(f, "cannot read seed: {}", msg),
            SeedError::Parse(msg) => write!(f, "invalid seed: {}", msg),
            SeedError::Container(e) => write!(f, "seed rejected: {}", e),
            SeedError::Store(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for SeedError {}

impl From<ContainerError> for SeedError {
    fn from(err: ContainerError) -> Self {
        SeedError::Container(err)
    }
}

impl From<StoreError> for SeedError {
    fn from(err: StoreError) -> Self {
        SeedError::Store(err)
    }
}

impl From<serde_json::Error> for SeedError {
    fn from(err: serde_json::Error) -> Self {
        SeedError::Parse(err.to_string())
    }
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct VideoSeed {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct UserSeed {
    pub id: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub groups: Vec<String>,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChannelSeed {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct AdSpaceSeed {
    pub title: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub formats: Vec<String>,
}

/// Initial contents of a root.
#[derive(Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Seed {
    pub title: Option<String>,
    pub videos: Vec<VideoSeed>,
    pub users: Vec<UserSeed>,
    pub channels: Vec<ChannelSeed>,
    pub banners: Vec<AdSpaceSeed>,
    /// Key of the video featured on the home page.
    pub default_video: Option<String>,
}

impl Seed {
    /// The built-in catalogue: three featured videos and an admin account.
    pub fn sample() -> Self {
        let video = |title: &str, tags: &[&str]| VideoSeed {
            title: title.to_string(),
            description: String::new(),
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
        };
        Self {
            title: None,
            videos: vec![
                video("Intro", &["feature", "intro"]),
                video("Oil on Ice", &["feature", "arctic", "water"]),
                video("Toxic Sperm", &["feature", "greenpeace"]),
            ],
            users: vec![UserSeed {
                id: "admin".to_string(),
                email: "admin@mint.com".to_string(),
                password: "test".to_string(),
                groups: vec!["admin".to_string()],
            }],
            channels: Vec::new(),
            banners: Vec::new(),
            default_video: None,
        }
    }

    pub fn from_json(text: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn load(path: &Path) -> Result<Self, SeedError> {
        let text = fs::read_to_string(path)
            .map_err(|e| SeedError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&text)
    }

    /// Build a root holding the seed's contents.
    pub fn build_root(&self, default_title: &str) -> Result<Root, SeedError> {
        let mut root = Root::new();
        root.title = self
            .title
            .clone()
            .unwrap_or_else(|| default_title.to_string());
        for video in &self.videos {
            root.videos
                .add_video(&video.title, &video.description, video.tags.iter().cloned())?;
        }
        for user in &self.users {
            root.users.add_user(
                &user.id,
                &user.email,
                &user.password,
                user.groups.iter().cloned(),
            )?;
        }
        for channel in &self.channels {
            root.channels.add_channel(&channel.title, &channel.description)?;
        }
        for space in &self.banners {
            root.banners.add_adspace(
                &space.title,
                (space.width, space.height),
                space.formats.iter().cloned(),
            )?;
        }
        if let Some(key) = &self.default_video {
            root.set_default_video(key)?;
        }
        Ok(root)
    }
}

/// Make sure `base` exists in `db`, creating it from `seed` if needed.
///
/// With `reset`, any existing root is replaced. Returns whether a new root
/// was written.
pub fn bootstrap(
    db: &Database,
    base: &str,
    seed: &Seed,
    title: &str,
    reset: bool,
) -> Result<bool, SeedError> {
    let root = seed.build_root(title)?;
    if reset {
        db.reset(base, root)?;
        return Ok(true);
    }
    Ok(db.bootstrap(base, move || root)?)
}
