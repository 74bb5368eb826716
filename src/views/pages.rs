use minijinja::{context, Value};

use super::{Response, ViewContext, ViewError};
use crate::model::{AdSpace, AdSpaceContainer, Member, Video};
use crate::traversal::{encode_path, Node};

/// Template values for a video: what the player, links and feed show.
fn video_values(video: &Video) -> Value {
    context! {
        id => video.id(),
        title => video.title(),
        description => video.description(),
        tags => video.tags(),
        encodes => video.encodes().collect::<Vec<_>>(),
    }
}

fn video_links<'v>(videos: impl IntoIterator<Item = &'v Video>) -> Vec<Value> {
    videos.into_iter().map(video_values).collect()
}

/// Advert slots: the first advert of every ad space.
fn ad_slots(banners: &AdSpaceContainer) -> Vec<Value> {
    banners
        .values()
        .filter_map(|space| {
            let advert = space.adverts().values().next()?;
            let (width, height) = advert.dimensions();
            Some(context! {
                space => space.id(),
                advert => advert.id(),
                title => advert.title(),
                width => width,
                height => height,
                link => advert.link(),
            })
        })
        .collect()
}

pub(super) fn adspace_values(space: &AdSpace) -> Value {
    let (width, height) = space.dimensions();
    let adverts: Vec<Value> = space
        .adverts()
        .values()
        .map(|advert| {
            context! {
                id => advert.id(),
                title => advert.title(),
                content_type => advert.content_type(),
            }
        })
        .collect();
    context! {
        id => space.id(),
        title => space.title(),
        width => width,
        height => height,
        formats => space.formats(),
        adverts => adverts,
    }
}

/// `/` and `/index.html`: the default video, the catalogue and the ads.
pub(super) fn index(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let finder = &ctx.services().finder;
    let root = ctx.root();
    let videos = finder.videos(root)?;
    let banners = finder.banners(root)?;
    let page = context! {
        video => root.default_video().map(video_values),
        videos => video_links(videos.values()),
        slots => ad_slots(banners),
    };
    ctx.render("index.html", "Home", page)
}

/// `/<name>`: old-style video URLs move under `/videos/`.
pub(super) fn legacy_redirect(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let name = ctx.view_name().to_string();
    let videos = ctx.services().finder.videos(ctx.root())?;
    if !ctx.subpath().is_empty() || !videos.contains(&name) {
        return Err(ViewError::NotFound(format!("/{}", name)));
    }
    let location = format!("/videos/{}", encode_path(&name));
    Ok(Response::redirect(301, &location))
}

/// `/videos/`: every video.
pub(super) fn video_list(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let videos = ctx.services().finder.videos(ctx.root())?;
    let page = context! { videos => video_links(videos.values()) };
    ctx.render("video_list.html", "Videos", page)
}

/// `/videos/<name>`: player, description, tags and encodes.
pub(super) fn video(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let Node::Video(video) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    ctx.render("video.html", video.title(), context! { video => video_values(video) })
}

/// `/tags/<tag>`: videos carrying the tag.
pub(super) fn tag(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let tag = ctx
        .param("tag")
        .ok_or_else(|| ViewError::NotFound("tag".to_string()))?
        .to_string();
    let videos = ctx.services().finder.videos(ctx.root())?;
    let page = context! { tagged => video_links(videos.get_videos_by_tag(&tag)) };
    ctx.render("tag.html", &tag, page)
}

/// `/channels/`: stored channels.
pub(super) fn channel_list(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let channels = ctx.services().finder.channels(ctx.root())?;
    let channels: Vec<Value> = channels
        .values()
        .map(|channel| context! { id => channel.id(), title => channel.title() })
        .collect();
    ctx.render("channel_list.html", "Channels", context! { channels => channels })
}

/// `/channels/<name>`: the channel's stings and the videos tagged with
/// its key. Unsaved channels render from their placeholder.
pub(super) fn channel(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let Node::Channel(channel) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    let videos = ctx.services().finder.videos(ctx.root())?;

    let stings: Vec<Value> = [("pre-roll", channel.pre_roll()), ("post-roll", channel.post_roll())]
        .into_iter()
        .filter_map(|(label, sting)| {
            let sting = videos.get(sting?)?;
            Some(context! { label => label, id => sting.id(), title => sting.title() })
        })
        .collect();
    let page = context! {
        channel => context! {
            id => channel.id(),
            description => channel.description(),
        },
        stings => stings,
        tagged => video_links(videos.get_videos_by_tag(channel.id())),
    };
    ctx.render("channel.html", channel.title(), page)
}

/// `/users/<id>/profile.html`.
pub(super) fn profile(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let Node::User(user) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    let page = context! {
        profile => context! {
            id => user.id(),
            email => user.email(),
            groups => user.groups(),
        },
    };
    ctx.render("profile.html", user.id(), page)
}

/// `/banners/`: ad spaces.
pub(super) fn banner_list(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let banners = ctx.services().finder.banners(ctx.root())?;
    let spaces: Vec<Value> = banners.values().map(adspace_values).collect();
    ctx.render("banner_list.html", "Banners", context! { spaces => spaces })
}

/// `/banners/<name>`: an ad space and its adverts.
pub(super) fn adspace(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let Node::AdSpace(space) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    ctx.render("adspace.html", space.title(), context! { space => adspace_values(space) })
}

/// `/podcast.xml`: an RSS 2.0 feed with one item per video and an
/// enclosure per encode.
pub(super) fn podcast(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let base = ctx
        .request()
        .header("host")
        .map(|host| format!("http://{}", host))
        .unwrap_or_default();
    let root = ctx.root();
    let services = ctx.services();
    let videos = services.finder.videos(root)?;
    let feed = services.templates.render(
        "podcast.xml",
        context! {
            site => &root.title,
            base => base,
            items => video_links(videos.values()),
        },
    )?;
    Ok(Response::new(200, "application/rss+xml; charset=utf-8", feed))
}
