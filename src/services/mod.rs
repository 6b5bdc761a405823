// src/services/mod.rs

//! Service layer: feed crawling, card extraction, media handling,
//! rephrasing, and the publish state machine.

pub mod extractor;
pub mod feed;
pub mod media;
pub mod publisher;
pub mod rephrase;

pub use extractor::{CardExtractor, Extracted};
pub use feed::{CrawlOutcome, FeedCrawler};
pub use media::{MediaFetcher, MediaResolver};
pub use publisher::{Credentials, PublishState, Publisher};
pub use rephrase::{OllamaRephraser, Rephraser, clamp_text, rephrase_or_original};
