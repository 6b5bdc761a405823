// src/services/media.rs

//! Media resolution and fetching.
//!
//! Images come straight from the rendered card (captured at extraction
//! time); short-form video goes through a secondary lookup service keyed by
//! the post permalink, which returns the highest-quality variant first.
//! Downloads are streamed to a `.part` file and renamed only on completion,
//! so a partial transfer never masquerades as a finished asset.

use std::path::{Path, PathBuf};
use std::time::Duration;

use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use scraper::{Html, Selector};
use tokio::io::AsyncWriteExt;

use crate::error::Result;
use crate::models::{MediaAsset, MediaConfig, MediaKind, Post};
use crate::utils::{remote_file_name, sanitize_filename};

/// Highest-quality video variant resolved for a post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedVideo {
    pub title: String,
    pub download_url: String,
}

/// Resolves media assets referenced by post records.
pub struct MediaResolver {
    client: reqwest::Client,
    config: MediaConfig,
}

impl MediaResolver {
    pub fn new(client: reqwest::Client, config: MediaConfig) -> Self {
        Self { client, config }
    }

    /// Resolve all media for one record. An unresolvable video is a
    /// "no media" outcome, never an error for the batch.
    pub async fn resolve(&self, record: &Post) -> Vec<MediaAsset> {
        let mut assets: Vec<MediaAsset> = record
            .image_urls
            .iter()
            .map(|url| MediaAsset::new(&record.id, MediaKind::Image, url))
            .collect();

        if !record.link.is_empty() {
            match self.lookup_video(&record.link).await {
                Ok(Some(video)) => {
                    log::info!("Resolved video \"{}\" for post {}", video.title, record.id);
                    assets.push(MediaAsset::new(
                        &record.id,
                        MediaKind::Video,
                        video.download_url,
                    ));
                }
                Ok(None) => log::debug!("No video variant for post {}", record.id),
                Err(e) => log::warn!("Video lookup failed for post {}: {}", record.id, e),
            }
        }

        assets
    }

    /// Query the lookup service for a downloadable video variant.
    async fn lookup_video(&self, link: &str) -> Result<Option<ResolvedVideo>> {
        let url = format!("{}{}", self.config.resolver_url, link);
        let body = self.client.get(&url).send().await?.text().await?;
        Ok(parse_video_lookup(
            &body,
            &self.config.resolver_link_selector,
            &self.config.resolver_title_selector,
        ))
    }
}

/// Pick the first (highest-quality) variant link and the title out of a
/// lookup response page.
fn parse_video_lookup(html: &str, link_selector: &str, title_selector: &str) -> Option<ResolvedVideo> {
    let document = Html::parse_document(html);
    let link_sel = Selector::parse(link_selector).ok()?;
    let title_sel = Selector::parse(title_selector).ok()?;

    let download_url = document
        .select(&link_sel)
        .next()
        .and_then(|a| a.value().attr("href"))?
        .to_string();

    let title = document
        .select(&title_sel)
        .next()
        .map(|t| t.text().collect::<String>().trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| "video".to_string());

    Some(ResolvedVideo {
        title,
        download_url,
    })
}

/// Downloads resolved assets sequentially with progress reporting.
pub struct MediaFetcher {
    client: reqwest::Client,
    config: MediaConfig,
}

impl MediaFetcher {
    pub fn new(client: reqwest::Client, config: MediaConfig) -> Self {
        Self { client, config }
    }

    /// Fetch every asset, one stream at a time. Per-asset failures are
    /// logged; the record proceeds to publish with whatever landed.
    pub async fn fetch_all(&self, owner: &str, assets: &mut [MediaAsset]) {
        for asset in assets.iter_mut() {
            if let Err(e) = self.fetch(owner, asset).await {
                log::warn!(
                    "Download failed for {} (post {}): {}",
                    asset.remote_url,
                    asset.owner_id,
                    e
                );
            }
        }
    }

    /// Stream one asset to disk.
    async fn fetch(&self, owner: &str, asset: &mut MediaAsset) -> Result<()> {
        let dest = asset_path(Path::new(&self.config.root_dir), owner, asset);
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Bounds the whole transfer, not just the connect; a stalled stream
        // must not wedge the run.
        let response = self
            .client
            .get(&asset.remote_url)
            .timeout(Duration::from_secs(self.config.download_timeout_secs))
            .send()
            .await?
            .error_for_status()?;
        let total = response.content_length();

        let bar = progress_bar(total, &dest);
        let part = dest.with_extension("part");
        let mut file = tokio::fs::File::create(&part).await?;
        let mut written: u64 = 0;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
            bar.set_position(written);
        }
        file.flush().await?;
        drop(file);

        // The final path only appears once the stream is complete.
        tokio::fs::rename(&part, &dest).await?;
        bar.finish_and_clear();

        log::info!("Downloaded {} ({} bytes)", dest.display(), written);
        asset.local_path = Some(dest);
        asset.size_bytes = Some(written);
        Ok(())
    }
}

fn progress_bar(total: Option<u64>, dest: &Path) -> ProgressBar {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    match total {
        Some(len) => {
            let bar = ProgressBar::new(len);
            bar.set_style(
                ProgressStyle::with_template("{msg} [{bar:40}] {bytes}/{total_bytes}")
                    .expect("progress template")
                    .progress_chars("=> "),
            );
            bar.set_message(name);
            bar
        }
        None => {
            let bar = ProgressBar::new_spinner();
            bar.set_message(format!("{name} (size unknown)"));
            bar
        }
    }
}

/// Where an asset lands on disk. Videos live in a `videos` subdirectory;
/// every filename embeds the owning post id so the publish phase can locate
/// assets without a side index.
pub fn asset_path(root: &Path, owner: &str, asset: &MediaAsset) -> PathBuf {
    let owner_dir = root.join(sanitize_filename(owner));
    let dir = match asset.kind {
        MediaKind::Video => owner_dir.join("videos"),
        MediaKind::Image => owner_dir,
    };

    let remote = sanitize_filename(&remote_file_name(&asset.remote_url));
    let (base, ext) = match remote.rsplit_once('.') {
        Some((base, ext)) if !base.is_empty() => (base.to_string(), ext.to_string()),
        _ => (
            remote,
            match asset.kind {
                MediaKind::Video => "mp4".to_string(),
                MediaKind::Image => "jpg".to_string(),
            },
        ),
    };
    let base = if base.is_empty() { "media".to_string() } else { base };

    dir.join(format!("{base}_post{}.{ext}", asset.owner_id))
}

/// Locate downloaded media for a post by scanning the owner's directory for
/// filenames embedding the post id.
pub async fn find_media_for(root: &Path, owner: &str, post_id: &str) -> Vec<PathBuf> {
    // Terminated by the extension dot so one id never prefix-matches another.
    let marker = format!("_post{post_id}.");
    let owner_dir = root.join(sanitize_filename(owner));
    let mut found = Vec::new();

    for dir in [owner_dir.clone(), owner_dir.join("videos")] {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.contains(&marker) && !name.ends_with(".part") && path.is_file() {
                found.push(path);
            }
        }
    }

    found.sort();
    found
}
