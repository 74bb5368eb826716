use minijinja::{context, Value};

use super::pages::adspace_values;
use super::{Response, ViewContext, ViewError};
use crate::auth::{Credentials, TicketStore};
use crate::model::{Advert, Channel, ContainerError, Encode, EncodeMeta, Member};
use crate::store::{content_type_for, MediaStore};
use crate::traversal::{Node, NodeMut};

/// Split a comma separated list, dropping blanks.
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

/// Invalid input the user can correct, shown back on the form.
fn correctable(err: &ContainerError) -> bool {
    matches!(
        err,
        ContainerError::InvalidKey(_)
            | ContainerError::InvalidMember { .. }
            | ContainerError::Duplicate { .. }
    )
}

fn parse_dimension(ctx: &ViewContext<'_>, field: &str) -> Result<Option<u32>, String> {
    match ctx.request().field(field) {
        None => Ok(None),
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|_| format!("{} must be a whole number", field)),
    }
}

/// Encode formats name files on disk, so they stay plain tokens.
fn valid_format(format: &str) -> bool {
    format
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// A confirmation page linking to what was just created.
fn done(
    ctx: &ViewContext<'_>,
    title: &str,
    note: &str,
    section: &str,
    key: &str,
    detail: Option<&str>,
) -> Result<Response, ViewError> {
    let page = context! {
        note => note,
        link => context! { section => section, key => key, detail => detail },
    };
    ctx.render("message.html", title, page)
}

// --- videos ---------------------------------------------------------------

fn add_video_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    ctx.render("add_video.html", "Add a video", context! { note => note })
}

/// `/videos/add_video.html`.
pub(super) fn add_video(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return add_video_form(ctx, None);
    }
    let Some(name) = request.field("video.name") else {
        return add_video_form(ctx, Some("video.name is required"));
    };
    let description = request.field("video.description").unwrap_or_default();
    let tags = split_list(request.field("video.tags").unwrap_or_default());

    let finder = &ctx.services().finder;
    match finder.videos_mut(ctx.root_mut())?.add_video(name, description, tags) {
        Ok(key) => {
            tracing::info!(video = %key, "added video");
            done(ctx, "Video added", "Upload successful", "videos", &key, None)
        }
        Err(err) if correctable(&err) => add_video_form(ctx, Some(&err.to_string())),
        Err(err) => Err(err.into()),
    }
}

fn upload_form(ctx: &ViewContext<'_>, video: &str, note: Option<&str>) -> Result<Response, ViewError> {
    ctx.render("upload.html", "Upload an encode", context! { video => video, note => note })
}

/// `/videos/<name>/upload.html`: store an encoded file for the video.
///
/// The file is staged beside the video's encodes and only moved to
/// `<video>/<format>.<ext>` once the request commits. The file of a
/// replaced encode is removed at the same point.
pub(super) fn upload(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let key = ctx.context_name()?;
    let request = ctx.request();
    if !request.is_post() {
        return upload_form(ctx, &key, None);
    }
    let Some(format) = request.field("encode.format") else {
        return upload_form(ctx, &key, Some("encode.format is required"));
    };
    if !valid_format(format) {
        return upload_form(
            ctx,
            &key,
            Some("encode.format may only contain letters, digits, - and _"),
        );
    }
    let Some(file) = request.file("encode.file").filter(|file| !file.bytes.is_empty()) else {
        return upload_form(ctx, &key, Some("encode.file is required"));
    };
    let (bitrate, width, height) = match (
        parse_dimension(ctx, "encode.bitrate"),
        parse_dimension(ctx, "encode.width"),
        parse_dimension(ctx, "encode.height"),
    ) {
        (Ok(bitrate), Ok(width), Ok(height)) => (bitrate, width, height),
        (Err(note), _, _) | (_, Err(note), _) | (_, _, Err(note)) => {
            return upload_form(ctx, &key, Some(&note))
        }
    };

    let media = ctx.services().media.clone();
    let path = MediaStore::encode_path(&key, format, &file.file_name);
    let staged = media.stage(&key, &file.bytes)?;
    {
        let media = media.clone();
        let staged = staged.clone();
        ctx.deferred().on_abort(move || {
            if let Err(err) = media.remove(&staged) {
                tracing::warn!(%err, path = %staged, "could not remove staged upload");
            }
        });
    }

    let content_type = file
        .content_type
        .clone()
        .unwrap_or_else(|| content_type_for(&file.file_name).to_string());
    let encode = Encode {
        format: format.to_string(),
        path: path.clone(),
        content_type,
        meta: EncodeMeta {
            size: file.bytes.len() as u64,
            bitrate,
            width,
            height,
        },
    };
    let NodeMut::Video(video) = ctx.node_mut()? else {
        return Err(ViewError::NotFound(key));
    };
    let stale = video
        .add_encode(encode)
        .map(|old| old.path)
        .filter(|old| *old != path);

    ctx.deferred().on_commit(move || {
        if let Err(err) = media.promote(&staged, &path) {
            tracing::error!(%err, path = %path, "could not publish encode");
        }
        if let Some(stale) = stale {
            if let Err(err) = media.remove(&stale) {
                tracing::warn!(%err, path = %stale, "could not remove replaced encode");
            }
        }
    });

    tracing::debug!(video = %key, format, "recorded encode");
    done(ctx, "Encode uploaded", "Upload successful", "videos", &key, Some(format))
}

// --- root -----------------------------------------------------------------

fn default_video_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    let root = ctx.root();
    let videos = ctx.services().finder.videos(root)?;
    let current = root.default_video().map(|video| video.id()).unwrap_or_default();
    let options: Vec<Value> = videos
        .values()
        .map(|video| context! { value => video.id(), label => video.title() })
        .collect();
    let page = context! { note => note, current => current, options => options };
    ctx.render("default_video.html", "Default video", page)
}

/// `/set_default_video.html`: pick the video featured on the home page.
pub(super) fn set_default_video(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return default_video_form(ctx, None);
    }
    let Some(name) = request.field("video.name") else {
        return default_video_form(ctx, Some("video.name is required"));
    };
    match ctx.root_mut().set_default_video(name) {
        Ok(()) => {
            tracing::info!(video = name, "default video changed");
            default_video_form(ctx, Some(&format!("Default video set to {}", name)))
        }
        Err(ContainerError::NotFound { .. }) => {
            default_video_form(ctx, Some(&format!("No video named {}", name)))
        }
        Err(err) => Err(err.into()),
    }
}

fn login_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    ctx.render("login.html", "Login", context! { note => note })
}

/// `/login.html`: check credentials and hand out a ticket cookie.
pub(super) fn login(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return login_form(ctx, None);
    }
    let (Some(login), Some(password)) = (request.field("login"), request.field("password")) else {
        return login_form(ctx, Some("login and password are required"));
    };

    let services = ctx.services();
    match services.auth.authenticate(&Credentials::new(login, password))? {
        Some(user) => {
            let ticket = services.tickets.issue(&user)?;
            tracing::info!(user = %user, "logged in");
            Ok(Response::redirect(302, "/").with_header("set-cookie", TicketStore::cookie(&ticket)))
        }
        None => login_form(ctx, Some("Login failed")),
    }
}

/// `/logout.html`: forget the ticket and clear the cookie.
pub(super) fn logout(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    if let Some(ticket) = ctx.request().ticket() {
        if let Some(user) = ctx.services().tickets.revoke(&ticket)? {
            tracing::info!(user = %user, "logged out");
        }
    }
    Ok(Response::redirect(302, "/").with_header("set-cookie", TicketStore::expired_cookie()))
}

// --- users ----------------------------------------------------------------

fn register_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    ctx.render("register.html", "Register", context! { note => note })
}

/// `/users/register.html`: create an account.
pub(super) fn register(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return register_form(ctx, None);
    }
    let (Some(id), Some(email), Some(password)) = (
        request.field("user.id"),
        request.field("user.email"),
        request.field("user.password"),
    ) else {
        return register_form(ctx, Some("user.id, user.email and user.password are required"));
    };

    let finder = &ctx.services().finder;
    let users = finder.users_mut(ctx.root_mut())?;
    match users.add_user(id, email, password, Vec::<String>::new()) {
        Ok(id) => {
            tracing::info!(user = %id, "registered user");
            ctx.render("registered.html", "Registered", context! { id => id })
        }
        Err(ContainerError::Duplicate { key, .. }) => {
            register_form(ctx, Some(&format!("The id {} is already taken", key)))
        }
        Err(err) if correctable(&err) => register_form(ctx, Some(&err.to_string())),
        Err(err) => Err(err.into()),
    }
}

fn edit_user_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    let Node::User(user) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    let page = context! {
        note => note,
        profile => context! { id => user.id(), email => user.email() },
    };
    ctx.render("edit_user.html", user.id(), page)
}

/// `/users/<id>/edit.html`: change email or password.
pub(super) fn edit_user(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return edit_user_form(ctx, None);
    }
    let email = request.field("user.email");
    if email.is_some_and(|email| !email.contains('@')) {
        return edit_user_form(ctx, Some("user.email is not an email address"));
    }
    let password = request.field("user.password");

    let NodeMut::User(user) = ctx.node_mut()? else {
        return Err(ViewError::NotFound("user".to_string()));
    };
    if let Some(email) = email {
        user.set_email(email);
    }
    if let Some(password) = password {
        user.set_password(password);
    }
    edit_user_form(ctx, Some("Profile saved"))
}

// --- channels -------------------------------------------------------------

fn edit_channel_form(
    ctx: &ViewContext<'_>,
    channel: &Channel,
    note: Option<&str>,
) -> Result<Response, ViewError> {
    let videos = ctx.services().finder.videos(ctx.root())?;
    let options: Vec<Value> = std::iter::once(context! { value => "", label => "none" })
        .chain(
            videos
                .values()
                .map(|video| context! { value => video.id(), label => video.title() }),
        )
        .collect();
    let page = context! {
        note => note,
        options => options,
        channel => context! {
            id => channel.id(),
            title => channel.title(),
            description => channel.description(),
            pre_roll => channel.pre_roll().unwrap_or_default(),
            post_roll => channel.post_roll().unwrap_or_default(),
        },
    };
    ctx.render("edit_channel.html", channel.title(), page)
}

/// `/channels/<name>/edit.html`. Saving a virtual channel stores it.
pub(super) fn edit_channel(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let key = ctx.context_name()?;
    let Node::Channel(current) = ctx.node()? else {
        return Err(ViewError::NotFound(key));
    };
    let mut channel = current.into_owned();

    let request = ctx.request();
    if !request.is_post() {
        return edit_channel_form(ctx, &channel, None);
    }

    let finder = &ctx.services().finder;
    let videos = finder.videos(ctx.root())?;
    let mut stings = Vec::with_capacity(2);
    for field in ["channel.pre_roll", "channel.post_roll"] {
        match request.field(field) {
            Some(sting) if !videos.contains(sting) => {
                let note = format!("{} names no video", field);
                return edit_channel_form(ctx, &channel, Some(&note));
            }
            sting => stings.push(sting.map(str::to_string)),
        }
    }
    let post_roll = stings.pop().flatten();
    let pre_roll = stings.pop().flatten();

    if let Some(title) = request.field("channel.title") {
        channel.set_title(title);
    }
    channel.set_description(request.field("channel.description").unwrap_or_default());
    channel.set_stings(pre_roll, post_roll);

    let channels = finder.channels_mut(ctx.root_mut())?;
    match channels.save(&key, channel.clone()) {
        Ok(()) => {
            tracing::info!(channel = %key, "saved channel");
            edit_channel_form(ctx, &channel, Some("Channel saved"))
        }
        Err(err) if correctable(&err) => edit_channel_form(ctx, &channel, Some(&err.to_string())),
        Err(err) => Err(err.into()),
    }
}

// --- banners --------------------------------------------------------------

fn add_banner_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    ctx.render("add_banner.html", "Add an ad space", context! { note => note })
}

/// `/banners/add.html`: create an ad space.
pub(super) fn add_banner(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return add_banner_form(ctx, None);
    }
    let Some(title) = request.field("adspace.title") else {
        return add_banner_form(ctx, Some("adspace.title is required"));
    };
    let dimensions = match (
        parse_dimension(ctx, "adspace.width"),
        parse_dimension(ctx, "adspace.height"),
    ) {
        (Ok(width), Ok(height)) => (width.unwrap_or_default(), height.unwrap_or_default()),
        (Err(note), _) | (_, Err(note)) => return add_banner_form(ctx, Some(&note)),
    };
    let formats = split_list(request.field("adspace.formats").unwrap_or_default());

    let finder = &ctx.services().finder;
    match finder.banners_mut(ctx.root_mut())?.add_adspace(title, dimensions, formats) {
        Ok(key) => {
            tracing::info!(banner = %key, "added ad space");
            done(ctx, "Ad space added", "Ad space added", "banners", &key, None)
        }
        Err(err) if correctable(&err) => add_banner_form(ctx, Some(&err.to_string())),
        Err(err) => Err(err.into()),
    }
}

fn edit_banner_form(ctx: &ViewContext<'_>, note: Option<&str>) -> Result<Response, ViewError> {
    let Node::AdSpace(space) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    let page = context! { note => note, space => adspace_values(space) };
    ctx.render("edit_banner.html", space.title(), page)
}

/// `/banners/<name>/edit.html`: resize, change formats, add an advert.
///
/// The edits are applied to a copy first; nothing is stored unless the
/// whole edit, advert included, is accepted.
pub(super) fn edit_banner(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let request = ctx.request();
    if !request.is_post() {
        return edit_banner_form(ctx, None);
    }
    let (width, height) = match (
        parse_dimension(ctx, "adspace.width"),
        parse_dimension(ctx, "adspace.height"),
    ) {
        (Ok(width), Ok(height)) => (width, height),
        (Err(note), _) | (_, Err(note)) => return edit_banner_form(ctx, Some(&note)),
    };
    let formats = request.form.get("adspace.formats").map(|raw| split_list(raw));
    let advert = match (request.field("advert.title"), request.file("advert.file")) {
        (Some(title), Some(file)) if !file.bytes.is_empty() => {
            let content_type = file
                .content_type
                .clone()
                .unwrap_or_else(|| content_type_for(&file.file_name).to_string());
            Some((title, file, content_type))
        }
        (None, None) => None,
        _ => return edit_banner_form(ctx, Some("advert.title and advert.file are both required")),
    };

    let Node::AdSpace(current) = ctx.node()? else {
        return Err(ViewError::NotFound("ad space".to_string()));
    };
    let mut edited = current.clone();
    let (current_width, current_height) = edited.dimensions();
    edited.set_dimensions((width.unwrap_or(current_width), height.unwrap_or(current_height)));
    if let Some(formats) = formats {
        edited.set_formats(formats);
    }
    let mut note = "Ad space saved".to_string();
    if let Some((title, file, content_type)) = advert {
        let link = request.field("advert.link").map(str::to_string);
        let advert = Advert::new(title, file.bytes.clone(), content_type, edited.dimensions(), link);
        match edited.add_advert(advert) {
            Ok(key) => note = format!("Advert {} added", key),
            Err(err) if correctable(&err) => {
                let note = format!("{}; nothing was saved", err);
                return edit_banner_form(ctx, Some(&note));
            }
            Err(err) => return Err(err.into()),
        }
    }

    let NodeMut::AdSpace(space) = ctx.node_mut()? else {
        return Err(ViewError::NotFound("ad space".to_string()));
    };
    *space = edited;
    edit_banner_form(ctx, Some(&note))
}
