use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::{Container, ContainerError, Location, Member};

/// A single banner creative.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Advert {
    location: Location,
    title: String,
    content: Vec<u8>,
    content_type: String,
    width: u32,
    height: u32,
    link: Option<String>,
}

impl Advert {
    pub fn new(
        title: impl Into<String>,
        content: Vec<u8>,
        content_type: impl Into<String>,
        (width, height): (u32, u32),
        link: Option<String>,
    ) -> Self {
        Self {
            location: Location::default(),
            title: title.into(),
            content,
            content_type: content_type.into(),
            width,
            height,
            link,
        }
    }

    pub fn id(&self) -> &str {
        self.key()
    }

    pub fn content(&self) -> &[u8] {
        &self.content
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn link(&self) -> Option<&str> {
        self.link.as_deref()
    }
}

impl Member for Advert {
    const KIND: &'static str = "advert";

    fn title(&self) -> &str {
        &self.title
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("title is required".to_string());
        }
        if self.content_type.trim().is_empty() {
            return Err("content type is required".to_string());
        }
        Ok(())
    }
}

/// A slot on the page holding adverts of fixed dimensions.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSpace {
    location: Location,
    title: String,
    width: u32,
    height: u32,
    formats: Vec<String>,
    adverts: Container<Advert>,
}

impl AdSpace {
    pub fn new<I, S>(title: impl Into<String>, (width, height): (u32, u32), formats: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            location: Location::default(),
            title: title.into(),
            width,
            height,
            formats: formats.into_iter().map(Into::into).collect(),
            adverts: Container::new(""),
        }
    }

    pub fn id(&self) -> &str {
        self.key()
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn set_dimensions(&mut self, (width, height): (u32, u32)) {
        self.width = width;
        self.height = height;
    }

    /// Accepted content types; empty accepts anything.
    pub fn formats(&self) -> &[String] {
        &self.formats
    }

    pub fn set_formats<I, S>(&mut self, formats: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.formats = formats.into_iter().map(Into::into).collect();
    }

    pub fn accepts(&self, content_type: &str) -> bool {
        self.formats.is_empty() || self.formats.iter().any(|f| f == content_type)
    }

    pub fn adverts(&self) -> &Container<Advert> {
        &self.adverts
    }

    pub fn adverts_mut(&mut self) -> &mut Container<Advert> {
        &mut self.adverts
    }

    /// Store an advert under a key slugged from its title.
    pub fn add_advert(&mut self, advert: Advert) -> Result<String, ContainerError> {
        if !self.accepts(advert.content_type()) {
            return Err(ContainerError::InvalidMember {
                kind: Advert::KIND,
                reason: format!(
                    "content type `{}` is not accepted by `{}`",
                    advert.content_type(),
                    self.title
                ),
            });
        }
        self.adverts.add(advert)
    }
}

impl Member for AdSpace {
    const KIND: &'static str = "ad space";

    fn title(&self) -> &str {
        &self.title
    }

    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }

    fn attach(&mut self, parent: &str, key: &str) {
        self.location.parent = Some(parent.to_string());
        self.location.name = key.to_string();
        self.adverts.rename(format!("{}/{}", parent, key));
    }
}

/// The `banners` collection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdSpaceContainer {
    spaces: Container<AdSpace>,
}

impl Default for AdSpaceContainer {
    fn default() -> Self {
        Self::new()
    }
}

impl AdSpaceContainer {
    pub const NAME: &'static str = "banners";

    pub fn new() -> Self {
        Self {
            spaces: Container::new(Self::NAME),
        }
    }

    pub fn add_adspace<I, S>(
        &mut self,
        title: &str,
        dimensions: (u32, u32),
        formats: I,
    ) -> Result<String, ContainerError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.spaces.add(AdSpace::new(title, dimensions, formats))
    }
}

impl Deref for AdSpaceContainer {
    type Target = Container<AdSpace>;

    fn deref(&self) -> &Self::Target {
        &self.spaces
    }
}

impl DerefMut for AdSpaceContainer {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.spaces
    }
}
