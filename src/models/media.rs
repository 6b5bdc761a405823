// src/models/media.rs

//! Media assets resolved from post records.

use std::path::{Path, PathBuf};

/// Kind of media attached to a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// Classify a file by extension. Unknown extensions count as images,
    /// matching how the publish phase picks its upload timeouts.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "mp4" | "mov" | "avi" | "webm" | "gif" => Self::Video,
            _ => Self::Image,
        }
    }
}

/// One media file referenced by a post.
///
/// Created by the resolver with only the remote URL set; the fetcher fills
/// `local_path` and `size_bytes` once the download lands.
#[derive(Debug, Clone)]
pub struct MediaAsset {
    /// Id of the owning post record
    pub owner_id: String,
    pub kind: MediaKind,
    pub remote_url: String,
    pub local_path: Option<PathBuf>,
    pub size_bytes: Option<u64>,
}

impl MediaAsset {
    pub fn new(owner_id: impl Into<String>, kind: MediaKind, remote_url: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            kind,
            remote_url: remote_url.into(),
            local_path: None,
            size_bytes: None,
        }
    }

    /// Whether the asset has been downloaded.
    pub fn is_fetched(&self) -> bool {
        self.local_path.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_path() {
        assert_eq!(MediaKind::from_path(Path::new("a/b.MP4")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a/b.webm")), MediaKind::Video);
        assert_eq!(MediaKind::from_path(Path::new("a/b.jpg")), MediaKind::Image);
        assert_eq!(MediaKind::from_path(Path::new("noext")), MediaKind::Image);
    }
}
