//! MediaStore - files kept beside the object database.
//!
//! Encodes live under `<video_dir>/<video>/<format>.<ext>`; uploads are
//! staged beside them until the request commits. Static assets are
//! served from their own store. Every relative path is checked to stay
//! inside the store's root.

use std::fs;
use std::path::{Component, Path, PathBuf};

use super::error::MediaError;

#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where the encode of `format` for `video` lives: `<video>/<format>`
    /// plus the uploaded file's extension, if it has a plain one.
    ///
    /// The name depends only on the format, so a re-upload lands on the
    /// file it replaces.
    pub fn encode_path(video: &str, format: &str, file_name: &str) -> String {
        let extension = Path::new(file_name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .map(|ext| ext.to_ascii_lowercase());
        match extension {
            Some(extension) => format!("{}/{}.{}", video, format, extension),
            None => format!("{}/{}", video, format),
        }
    }

    /// Write upload bytes under a hidden, unique name in `video`'s
    /// directory and return that relative path.
    pub fn stage(&self, video: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let relative = format!("{}/.upload-{}", video, uuid::Uuid::new_v4().simple());
        let path = self.resolve(&relative)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, bytes)?;
        tracing::debug!(path = %path.display(), size = bytes.len(), "staged media file");
        Ok(relative)
    }

    /// Move a staged file to its published path, replacing what was there.
    pub fn promote(&self, staged: &str, relative: &str) -> Result<(), MediaError> {
        let from = self.resolve(staged)?;
        let to = self.resolve(relative)?;
        if !from.is_file() {
            return Err(MediaError::NotFound(staged.to_string()));
        }
        fs::rename(&from, &to)?;
        tracing::debug!(path = %to.display(), "published media file");
        Ok(())
    }

    /// Delete a file. Returns whether there was one.
    pub fn remove(&self, relative: &str) -> Result<bool, MediaError> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        tracing::debug!(path = %path.display(), "removed media file");
        Ok(true)
    }

    pub fn read(&self, relative: &str) -> Result<Vec<u8>, MediaError> {
        let path = self.resolve(relative)?;
        if !path.is_file() {
            return Err(MediaError::NotFound(relative.to_string()));
        }
        Ok(fs::read(path)?)
    }

    /// Join `relative` onto the store root, rejecting anything but plain
    /// path segments.
    pub fn resolve(&self, relative: &str) -> Result<PathBuf, MediaError> {
        let relative = relative.trim_start_matches('/');
        let path = Path::new(relative);
        let plain = path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
        if relative.is_empty() || !plain {
            return Err(MediaError::InvalidPath(relative.to_string()));
        }
        Ok(self.root.join(path))
    }
}

/// Content type for a file name, by extension.
pub fn content_type_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase());
    match extension.as_deref() {
        Some("css") => "text/css",
        Some("js") => "application/javascript",
        Some("html") | Some("htm") => "text/html; charset=utf-8",
        Some("xml") => "application/xml",
        Some("json") => "application/json",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("swf") => "application/x-shockwave-flash",
        Some("mp4") | Some("m4v") => "video/mp4",
        Some("ogv") | Some("ogg") => "video/ogg",
        Some("webm") => "video/webm",
        Some("flv") => "video/x-flv",
        Some("mp3") => "audio/mpeg",
        _ => "application/octet-stream",
    }
}
