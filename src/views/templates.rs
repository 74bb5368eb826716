//! Page templates.
//!
//! Markup lives in stand-alone files under `templates/`, compiled into the
//! binary with `include_str!` and loaded by name on first use. Every page
//! extends `layout.html`; form widgets are macros in `forms.html`.
//!
//! Templates ending in `.html` or `.xml` are auto-escaped. Keys and file
//! paths placed in URLs go through the `url` filter, which
//! percent-encodes them.

use minijinja::{Environment, Error, Value};
use serde::Serialize;

use crate::traversal::encode_path;

pub const LAYOUT: &str = include_str!("templates/layout.html");
pub const FORMS: &str = include_str!("templates/forms.html");
pub const MESSAGE: &str = include_str!("templates/message.html");
pub const PLAYER: &str = include_str!("templates/player.html");
pub const VIDEO_LINKS: &str = include_str!("templates/video_links.html");
pub const TAGGED: &str = include_str!("templates/tagged.html");
pub const AD_SECTION: &str = include_str!("templates/ad_section.html");
pub const INDEX: &str = include_str!("templates/index.html");
pub const VIDEO_LIST: &str = include_str!("templates/video_list.html");
pub const VIDEO: &str = include_str!("templates/video.html");
pub const TAG: &str = include_str!("templates/tag.html");
pub const CHANNEL_LIST: &str = include_str!("templates/channel_list.html");
pub const CHANNEL: &str = include_str!("templates/channel.html");
pub const PROFILE: &str = include_str!("templates/profile.html");
pub const BANNER_LIST: &str = include_str!("templates/banner_list.html");
pub const ADSPACE: &str = include_str!("templates/adspace.html");
pub const PODCAST: &str = include_str!("templates/podcast.xml");
pub const ADD_VIDEO: &str = include_str!("templates/add_video.html");
pub const UPLOAD: &str = include_str!("templates/upload.html");
pub const DEFAULT_VIDEO: &str = include_str!("templates/default_video.html");
pub const LOGIN: &str = include_str!("templates/login.html");
pub const REGISTER: &str = include_str!("templates/register.html");
pub const REGISTERED: &str = include_str!("templates/registered.html");
pub const EDIT_USER: &str = include_str!("templates/edit_user.html");
pub const EDIT_CHANNEL: &str = include_str!("templates/edit_channel.html");
pub const ADD_BANNER: &str = include_str!("templates/add_banner.html");
pub const EDIT_BANNER: &str = include_str!("templates/edit_banner.html");

/// Every template, by the name pages refer to it with.
pub const ALL: &[(&str, &str)] = &[
    ("layout.html", LAYOUT),
    ("forms.html", FORMS),
    ("message.html", MESSAGE),
    ("player.html", PLAYER),
    ("video_links.html", VIDEO_LINKS),
    ("tagged.html", TAGGED),
    ("ad_section.html", AD_SECTION),
    ("index.html", INDEX),
    ("video_list.html", VIDEO_LIST),
    ("video.html", VIDEO),
    ("tag.html", TAG),
    ("channel_list.html", CHANNEL_LIST),
    ("channel.html", CHANNEL),
    ("profile.html", PROFILE),
    ("banner_list.html", BANNER_LIST),
    ("adspace.html", ADSPACE),
    ("podcast.xml", PODCAST),
    ("add_video.html", ADD_VIDEO),
    ("upload.html", UPLOAD),
    ("default_video.html", DEFAULT_VIDEO),
    ("login.html", LOGIN),
    ("register.html", REGISTER),
    ("registered.html", REGISTERED),
    ("edit_user.html", EDIT_USER),
    ("edit_channel.html", EDIT_CHANNEL),
    ("add_banner.html", ADD_BANNER),
    ("edit_banner.html", EDIT_BANNER),
];

fn source(name: &str) -> Option<&'static str> {
    ALL.iter()
        .find(|(known, _)| *known == name)
        .map(|(_, source)| *source)
}

/// `{{ key|url }}`: percent-encoded and safe to place in an attribute.
fn url(value: String) -> Value {
    Value::from_safe_string(encode_path(&value))
}

/// The site's templates, compiled once and reused.
pub struct Templates {
    env: Environment<'static>,
}

impl Default for Templates {
    fn default() -> Self {
        Self::new()
    }
}

impl Templates {
    pub fn new() -> Self {
        let mut env = Environment::new();
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_loader(|name| Ok(source(name).map(str::to_string)));
        env.add_filter("url", url);
        Self { env }
    }

    /// Render a template with the given data.
    ///
    /// # Errors
    ///
    /// Returns an error if the template name is unknown, fails to compile
    /// or fails to render.
    pub fn render<T: Serialize>(&self, name: &str, data: T) -> Result<String, Error> {
        self.env.get_template(name)?.render(data)
    }
}
