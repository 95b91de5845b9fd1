//! Media reference resolution: the boundary to the upload subsystem.
//!
//! Reference-to-readable-file resolution is the only service the
//! compositor consumes from upload handling. Source media is read-only
//! and may be referenced by multiple concurrent jobs; nothing in the
//! render pipeline mutates it in place.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use framecast_common::error::FramecastResult;
use framecast_timeline::{MediaRef, RenderRequest};

/// Resolves a media reference to an existing, readable file.
pub trait MediaResolver: Send + Sync {
    /// `None` when the reference is unknown or the file is gone.
    fn resolve(&self, media: &MediaRef) -> Option<PathBuf>;
}

/// Resolver over the uploaded-media map carried by a render request.
///
/// A reference resolves only when the mapped path actually exists on
/// disk at planning time.
#[derive(Debug, Default)]
pub struct UploadedMedia {
    map: HashMap<MediaRef, PathBuf>,
}

impl UploadedMedia {
    pub fn new(map: HashMap<MediaRef, PathBuf>) -> Self {
        Self { map }
    }

    pub fn from_request(request: &RenderRequest) -> Self {
        Self::new(request.media.clone())
    }
}

impl MediaResolver for UploadedMedia {
    fn resolve(&self, media: &MediaRef) -> Option<PathBuf> {
        self.map
            .get(media)
            .filter(|path| path.exists())
            .cloned()
    }
}

/// Upload-side storage: writes raw bytes under a fresh opaque reference.
#[derive(Debug, Clone)]
pub struct MediaLibrary {
    root: PathBuf,
}

impl MediaLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store uploaded bytes and return the reference a timeline may use
    /// as a clip's `media`, plus the backing path.
    pub fn store(&self, bytes: &[u8], extension: &str) -> FramecastResult<(MediaRef, PathBuf)> {
        std::fs::create_dir_all(&self.root)?;
        let id = uuid::Uuid::new_v4().to_string();
        let file_name = if extension.is_empty() {
            id.clone()
        } else {
            format!("{id}.{}", extension.trim_start_matches('.'))
        };
        let path = self.root.join(file_name);
        std::fs::write(&path, bytes)?;
        tracing::debug!(media = %id, path = %path.display(), size = bytes.len(), "Stored uploaded media");
        Ok((MediaRef(id), path))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_reference_does_not_resolve() {
        let resolver = UploadedMedia::default();
        assert!(resolver.resolve(&MediaRef::from("nope")).is_none());
    }

    #[test]
    fn reference_to_missing_file_does_not_resolve() {
        let mut map = HashMap::new();
        map.insert(
            MediaRef::from("m1"),
            PathBuf::from("/definitely/not/here.mp4"),
        );
        let resolver = UploadedMedia::new(map);
        assert!(resolver.resolve(&MediaRef::from("m1")).is_none());
    }

    #[test]
    fn stored_media_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let library = MediaLibrary::new(dir.path());
        let (media, path) = library.store(b"fake video bytes", "mp4").unwrap();
        assert!(path.exists());
        assert_eq!(path.extension().unwrap(), "mp4");

        let mut map = HashMap::new();
        map.insert(media.clone(), path.clone());
        let resolver = UploadedMedia::new(map);
        assert_eq!(resolver.resolve(&media), Some(path));
    }
}
