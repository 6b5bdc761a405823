// src/models/post.rs

//! Extracted post record.

use serde::{Deserialize, Serialize};

/// A post extracted from the feed.
///
/// `id` is the durable status id from the post's permalink when one was
/// exposed, otherwise a structural fingerprint. Records are immutable once
/// extracted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Post {
    /// Dedup identity for this crawl session
    pub id: String,

    /// Author display name
    pub author: String,

    /// Author handle (without the leading @)
    pub handle: String,

    /// Post body text
    pub text: String,

    /// Permalink to the post
    pub link: String,

    /// Image URLs captured from the rendered card at extraction time
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub image_urls: Vec<String>,

    /// Extra author details, collected only when requested
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_details: Option<PosterDetails>,
}

/// Optional per-author details scraped alongside a post.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct PosterDetails {
    pub following: Option<String>,
    pub followers: Option<String>,
}

impl Post {
    /// Whether the record carries any publishable text.
    pub fn has_text(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
