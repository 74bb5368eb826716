use super::{Response, ViewContext, ViewError};
use crate::store::{content_type_for, MediaStore};
use crate::traversal::Node;

fn serve(store: &MediaStore, path: &str) -> Result<Response, ViewError> {
    let bytes = store.read(path)?;
    Ok(Response::new(200, content_type_for(path), bytes)
        .with_header("cache-control", "max-age=3600"))
}

/// `/static/*` and `/@@static/*`.
pub(super) fn static_file(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    serve(&ctx.services().statics, &ctx.rest_path())
}

/// `/encodes/<video>/<file>`: uploaded encodes, served with the content
/// type recorded at upload. Files no encode points at are not served.
pub(super) fn encode_file(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let path = ctx.rest_path();
    let services = ctx.services();
    let videos = services.finder.videos(ctx.root())?;
    let encode = path
        .split_once('/')
        .and_then(|(video, _)| videos.get(video))
        .and_then(|video| video.encodes().find(|encode| encode.path == path))
        .ok_or_else(|| ViewError::NotFound(format!("/encodes/{}", path)))?;
    let bytes = services.media.read(&encode.path)?;
    Ok(Response::new(200, &encode.content_type, bytes).with_header("cache-control", "max-age=3600"))
}

/// `/banners/<space>/<advert>`: the advert's stored content.
pub(super) fn advert_content(ctx: &mut ViewContext<'_>) -> Result<Response, ViewError> {
    let Node::Advert(advert) = ctx.node()? else {
        return Err(ViewError::NotFound(ctx.view_name().to_string()));
    };
    Ok(Response::new(200, advert.content_type(), advert.content().to_vec()))
}
