// src/pipeline/scrape.rs

//! Scrape phase: crawl the target view, export the records, pull media.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::driver::PageDriver;
use crate::error::Result;
use crate::models::{Config, CrawlSession, Post};
use crate::services::feed::{CrawlOutcome, FeedCrawler};
use crate::services::media::{MediaFetcher, MediaResolver};
use crate::storage::LocalStorage;
use crate::utils::http::{create_client, create_download_client};

/// Crawl one session and export whatever was collected. The export is
/// written even for a cancelled or exhausted crawl; an empty run produces
/// no file.
pub async fn run_scrape(
    driver: &dyn PageDriver,
    config: &Config,
    session: &CrawlSession,
    cancel: &Arc<AtomicBool>,
) -> Result<CrawlOutcome> {
    let crawler = FeedCrawler::new(driver, config);
    let outcome = crawler.collect(session, cancel).await;

    log::info!(
        "Scrape ended ({:?}): {} records, {} refreshes, {} throttle retries",
        outcome.stop,
        outcome.records.len(),
        outcome.refreshes,
        outcome.throttle_retries
    );

    if !outcome.records.is_empty() {
        let storage = LocalStorage::new(&config.crawler.output_dir);
        storage.write_posts_csv(&outcome.records).await?;
    }

    Ok(outcome)
}

/// Resolve and download media for each record, sequentially. Per-record
/// failures are logged and skipped; cancellation stops between records.
pub async fn fetch_media(
    config: &Config,
    records: &[Post],
    cancel: &Arc<AtomicBool>,
) -> Result<()> {
    let resolver = MediaResolver::new(create_client(&config.crawler)?, config.media.clone());
    let fetcher = MediaFetcher::new(
        create_download_client(&config.crawler)?,
        config.media.clone(),
    );

    for record in records {
        if cancel.load(Ordering::SeqCst) {
            log::warn!("Media fetch cancelled");
            break;
        }
        let mut assets = resolver.resolve(record).await;
        if assets.is_empty() {
            continue;
        }
        fetcher.fetch_all(&record.handle, &mut assets).await;
        let fetched = assets.iter().filter(|a| a.is_fetched()).count();
        log::info!(
            "Fetched {}/{} assets for post {} into {}",
            fetched,
            assets.len(),
            record.id,
            Path::new(&config.media.root_dir).display()
        );
    }
    Ok(())
}
