// src/services/feed.rs

//! Scroll/crawl controller.
//!
//! Drives the page driver to reveal more of the feed, extracts records from
//! the newest window of candidate cards, and lets the backoff policy decide
//! when the surface is exhausted. Collected records are never lost: the
//! outcome carries whatever was gathered regardless of how the crawl ended.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use url::Url;

use crate::driver::{DriverError, PageDriver, Query};
use crate::models::{Config, CrawlSession, Post, PosterDetails, StopReason, TargetSpec};
use crate::pipeline::backoff::{BackoffAction, BackoffPolicy};
use crate::pipeline::dedup::DedupRegistry;
use crate::services::extractor::{CardExtractor, Extracted};

/// Result of one crawl invocation.
#[derive(Debug)]
pub struct CrawlOutcome {
    pub records: Vec<Post>,
    pub stop: StopReason,
    pub batches: usize,
    pub empty_batches: usize,
    pub ads_skipped: usize,
    pub extraction_failures: usize,
    pub refreshes: u32,
    pub throttle_retries: u32,
}

/// Crawls a feed view until quota, exhaustion, or cancellation.
pub struct FeedCrawler<'a> {
    driver: &'a dyn PageDriver,
    config: &'a Config,
    extractor: CardExtractor,
}

impl<'a> FeedCrawler<'a> {
    pub fn new(driver: &'a dyn PageDriver, config: &'a Config) -> Self {
        let base = Url::parse(&config.crawler.base_url)
            .unwrap_or_else(|_| Url::parse("https://twitter.com").expect("fallback base url"));
        let extractor = CardExtractor::new(config.selectors.clone(), base);
        Self {
            driver,
            config,
            extractor,
        }
    }

    /// Run the crawl loop for one session.
    pub async fn collect(&self, session: &CrawlSession, cancel: &Arc<AtomicBool>) -> CrawlOutcome {
        let target_url = session.target_url(&self.config.crawler.base_url);
        log::info!("Crawling {} ({})", session.target.describe(), target_url);

        let mut outcome = CrawlOutcome {
            records: Vec::new(),
            stop: StopReason::Exhausted,
            batches: 0,
            empty_batches: 0,
            ads_skipped: 0,
            extraction_failures: 0,
            refreshes: 0,
            throttle_retries: 0,
        };

        if let Err(e) = self.open_target(&target_url).await {
            log::error!("Failed to open target view: {}", e);
            return outcome;
        }
        self.dismiss_cookie_banner().await;

        let poster_details = self.read_poster_details(session).await;

        let mut dedup = DedupRegistry::new();
        let mut policy = BackoffPolicy::new(
            self.config.backoff.empty_batch_limit,
            self.config.backoff.refresh_limit,
            self.config.backoff.throttle_retry_limit,
        );

        let card_query = Query::css(&self.config.selectors.card);
        let retry_query = Query::xpath(&self.config.selectors.retry_button);

        // Consecutive stale re-lists; survives `continue 'crawl` so a card
        // that never stops going stale cannot spin the loop forever.
        let mut stale_streak = 0u32;

        'crawl: loop {
            if cancel.load(Ordering::SeqCst) {
                log::warn!("Crawl cancelled; keeping {} records", outcome.records.len());
                outcome.stop = StopReason::Cancelled;
                break;
            }

            if let Err(e) = self.driver.scroll_to_bottom().await {
                log::error!("Scroll failed, ending crawl: {}", e);
                break;
            }

            let cards = match self.driver.find_visible(&card_query).await {
                Ok(cards) => cards,
                Err(e) => {
                    log::error!("Listing cards failed, ending crawl: {}", e);
                    break;
                }
            };
            outcome.batches += 1;

            // Only the newest window of candidates; older cards were already
            // inspected in previous batches.
            let window_start = cards.len().saturating_sub(self.config.crawler.batch_window);
            let mut added = 0usize;

            for &card in &cards[window_start..] {
                // Cheap permalink check first; cards already in the registry
                // are skipped without re-reading their children. Ads are
                // caught here too on every batch after the first.
                let extracted = match self.extractor.candidate_id(self.driver, card).await {
                    Ok(Some(ref id)) if dedup.seen(id) => continue,
                    Ok(_) => self.extractor.extract(self.driver, card).await,
                    Err(e) => Err(e),
                };

                match extracted {
                    Ok(Extracted::Record(mut post)) => {
                        if !dedup.mark_if_new(&post.id) {
                            continue;
                        }
                        post.poster_details = poster_details.clone();
                        outcome.records.push(post);
                        added += 1;

                        if session.quota_reached(outcome.records.len()) {
                            // Remainder of the batch is discarded.
                            outcome.stop = StopReason::Quota;
                            break 'crawl;
                        }
                    }
                    Ok(Extracted::Ad(id)) => {
                        if let Some(id) = id {
                            dedup.mark(&id);
                        }
                        outcome.ads_skipped += 1;
                    }
                    Err(DriverError::Stale) => {
                        // The card vanished between listing and reading;
                        // never read through the dead handle. Re-list, but
                        // only so many times in a row.
                        if stale_streak >= self.config.crawler.stale_retry_limit {
                            log::warn!(
                                "Card still stale after {} re-lists, skipping it",
                                stale_streak
                            );
                            stale_streak = 0;
                            outcome.extraction_failures += 1;
                            continue;
                        }
                        stale_streak += 1;
                        log::debug!("Stale card, re-listing candidates");
                        tokio::time::sleep(self.config.crawler.stale_retry()).await;
                        continue 'crawl;
                    }
                    Err(e) => {
                        log::warn!("Extraction failed for one card: {}", e);
                        outcome.extraction_failures += 1;
                    }
                }
            }
            stale_streak = 0;

            if added == 0 {
                outcome.empty_batches += 1;
            }

            let throttled = self.throttle_signal(&retry_query).await;
            if !throttled && policy.state().retry_count > 0 {
                log::info!("Throttle signal cleared");
                policy.throttle_cleared();
            }

            match policy.observe(added, throttled) {
                BackoffAction::Continue => {}
                BackoffAction::Wait => {
                    tokio::time::sleep(self.config.backoff.empty_poll()).await;
                }
                BackoffAction::Refresh => {
                    log::info!(
                        "No new content after {} empty batches, refreshing (attempt {})",
                        self.config.backoff.empty_batch_limit,
                        policy.state().refresh_count
                    );
                    if let Err(e) = self.open_target(&target_url).await {
                        log::error!("Refresh failed, ending crawl: {}", e);
                        break;
                    }
                }
                BackoffAction::ThrottleWait => {
                    log::warn!(
                        "Rate limited; waiting before retry {}/{}",
                        policy.state().retry_count,
                        self.config.backoff.throttle_retry_limit
                    );
                    tokio::time::sleep(self.config.backoff.throttle_wait()).await;
                    self.click_retry(&retry_query).await;
                    tokio::time::sleep(self.config.backoff.throttle_settle()).await;
                }
                BackoffAction::Exhausted => {
                    log::info!("No more content to crawl");
                    break;
                }
            }
        }

        let state = policy.state();
        outcome.refreshes = state.refresh_count;
        outcome.throttle_retries = state.retry_count;

        log::info!(
            "Crawl finished: {} records in {} batches ({} ads skipped, {} extraction failures)",
            outcome.records.len(),
            outcome.batches,
            outcome.ads_skipped,
            outcome.extraction_failures
        );
        outcome
    }

    async fn open_target(&self, url: &str) -> crate::driver::DriverResult<()> {
        self.driver.navigate(url).await?;
        tokio::time::sleep(self.config.crawler.nav_settle()).await;
        Ok(())
    }

    /// Best-effort dismissal of the consent banner so it does not cover the
    /// feed.
    async fn dismiss_cookie_banner(&self) {
        let query = Query::xpath(&self.config.selectors.cookie_banner);
        if let Ok(buttons) = self.driver.find_visible(&query).await {
            if let Some(&button) = buttons.first() {
                if self.driver.click(button).await.is_ok() {
                    log::debug!("Dismissed cookie banner");
                }
            }
        }
    }

    /// Profile-page stats, read once per session when requested. Only a
    /// profile view renders them; other targets yield nothing.
    async fn read_poster_details(&self, session: &CrawlSession) -> Option<PosterDetails> {
        if !session.poster_details || !matches!(session.target, TargetSpec::Profile(_)) {
            return None;
        }

        let following = self
            .first_visible_text(&self.config.selectors.following_stat)
            .await;
        let followers = self
            .first_visible_text(&self.config.selectors.followers_stat)
            .await;

        if following.is_none() && followers.is_none() {
            return None;
        }
        Some(PosterDetails {
            following,
            followers,
        })
    }

    async fn first_visible_text(&self, selector: &str) -> Option<String> {
        let found = self
            .driver
            .find_visible(&Query::css(selector))
            .await
            .ok()?;
        let &el = found.first()?;
        let text = self.driver.read_text(el).await.ok()?;
        let text = text.trim().to_string();
        (!text.is_empty()).then_some(text)
    }

    async fn throttle_signal(&self, retry_query: &Query) -> bool {
        match self.driver.find_visible(retry_query).await {
            Ok(found) => !found.is_empty(),
            Err(_) => false,
        }
    }

    async fn click_retry(&self, retry_query: &Query) {
        if let Ok(buttons) = self.driver.find_visible(retry_query).await {
            if let Some(&button) = buttons.first() {
                if let Err(e) = self.driver.click(button).await {
                    log::debug!("Retry affordance click failed: {}", e);
                }
            }
        }
    }
}
