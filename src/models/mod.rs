// src/models/mod.rs

//! Domain models for the crawler and publisher.

mod config;
mod job;
mod media;
mod post;
mod session;

pub use config::{
    BackoffConfig, Config, CrawlerConfig, LoginConfig, MediaConfig, PublishConfig,
    RephraseConfig, SelectorConfig,
};
pub use job::{JobStatus, PublishJob, PublishSummary};
pub use media::{MediaAsset, MediaKind};
pub use post::{Post, PosterDetails};
pub use session::{CrawlSession, StopReason, TabOrder, TargetSpec};
