// src/pipeline/dedup.rs

//! Dedup registry for one crawl session.
//!
//! Tracks which extraction ids have been emitted so no record appears twice
//! in the output sequence. Lives for a single crawl invocation and is never
//! persisted.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

/// In-memory set of already-seen extraction ids.
#[derive(Debug, Default)]
pub struct DedupRegistry {
    seen: HashSet<String>,
}

impl DedupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the id has been marked before.
    pub fn seen(&self, id: &str) -> bool {
        self.seen.contains(id)
    }

    /// Mark an id as seen. Idempotent.
    pub fn mark(&mut self, id: &str) {
        self.seen.insert(id.to_string());
    }

    /// Mark an id and report whether it was new.
    pub fn mark_if_new(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Structural fingerprint used when a card exposes no durable id.
///
/// Derived from the author and body text, so the same content re-rendered
/// under a fresh element still dedups within the session.
pub fn fingerprint(author: &str, text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(author.as_bytes());
    hasher.update([0u8]);
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    // 16 hex chars is plenty for a session-scoped set.
    hex::encode(&digest[..8])
}
