// src/pipeline/mod.rs

//! Pipeline layer: backoff policy, dedup registry, and the scrape and
//! publish entry points that stitch the services together.

pub mod backoff;
pub mod dedup;
pub mod publish;
pub mod scrape;

pub use backoff::{BackoffAction, BackoffPolicy};
pub use dedup::{DedupRegistry, fingerprint};
pub use publish::run_publish;
pub use scrape::{fetch_media, run_scrape};
