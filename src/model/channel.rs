use std::borrow::Cow;

use serde::{Deserialize, Serialize};

use super::{Container, ContainerError, Location, Member};

/// A channel groups the videos tagged with its key and optionally wraps
/// them with pre- and post-roll stings (video keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    location: Location,
    title: String,
    description: String,
    pre_roll: Option<String>,
    post_roll: Option<String>,
}

impl Channel {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            location: Location::default(),
            title: title.into(),
            description: description.into(),
            pre_roll: None,
            post_roll: None,
        }
    }

    /// An unsaved channel standing in for `key` until someone edits it.
    fn placeholder(key: &str) -> Self {
        let mut channel = Self::new(key, "");
        channel.location.name = key.to_string();
        channel
    }

    pub fn id(&self) -> &str {
        self.key()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn pre_roll(&self) -> Option<&str> {
        self.pre_roll.as_deref()
    }

    pub fn post_roll(&self) -> Option<&str> {
        self.post_roll.as_deref()
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn set_stings(&mut self, pre_roll: Option<String>, post_roll: Option<String>) {
        self.pre_roll = pre_roll;
        self.post_roll = post_roll;
    }
}

impl Member for Channel {
    const KIND: &'static str = "channel";

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

/// The `channels` collection.
///
/// Every key resolves: unknown keys yield a virtual channel that exists
/// only for the duration of the lookup. Use `is_stored` to tell the two
/// apart; the shape of the returned value is not a reliable signal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelContainer {
    channels: Container<Channel>,
}

impl Default for ChannelContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl ChannelContainer {
    pub const NAME: &'static str = "channels";

    pub fn new() -> Self {
        Self {
            channels: Container::new(Self::NAME),
        }
    }

    /// The stored channel for `key`, or a virtual placeholder.
    pub fn lookup(&self, key: &str) -> Cow<'_, Channel> {
        match self.channels.get(key) {
            Some(channel) => Cow::Borrowed(channel),
            None => Cow::Owned(Channel::placeholder(key)),
        }
    }

    pub fn is_stored(&self, key: &str) -> bool {
        self.channels.contains(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Channel> {
        self.channels.get_mut(key)
    }

    /// Persist `channel` under `key`, materializing a virtual channel.
    pub fn save(&mut self, key: &str, channel: Channel) -> Result<(), ContainerError> {
        self.channels.insert(key, channel).map(|_| ())
    }

    /// Create a channel keyed by its slugged title.
    pub fn add_channel(&mut self, title: &str, description: &str) -> Result<String, ContainerError> {
        self.channels.add(Channel::new(title, description))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.channels.keys()
    }

    pub fn values(&self) -> impl Iterator<Item = &Channel> {
        self.channels.values()
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
