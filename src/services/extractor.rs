// src/services/extractor.rs

//! Item extractor: converts a rendered card into a structured record.
//!
//! Promoted content is reported as a marker, not a record, so the crawl
//! loop can mark it seen without emitting it. A failure on one card never
//! aborts the batch; the caller logs and skips.

use url::Url;

use crate::driver::{DriverResult, ElementHandle, PageDriver, Query};
use crate::models::{Post, SelectorConfig};
use crate::pipeline::dedup;
use crate::utils::{extract_status_id, resolve_url};

/// Outcome of extracting one card.
#[derive(Debug)]
pub enum Extracted {
    Record(Post),
    /// Promoted content; marked seen upstream (when an id is available) but
    /// never emitted
    Ad(Option<String>),
}

/// Extracts post records from visible cards using configured selectors.
pub struct CardExtractor {
    selectors: SelectorConfig,
    base: Url,
}

impl CardExtractor {
    pub fn new(selectors: SelectorConfig, base: Url) -> Self {
        Self { selectors, base }
    }

    /// Extract a record from a card element.
    ///
    /// A stale card surfaces `DriverError::Stale` so the crawl loop can
    /// re-list candidates instead of reading through the dead handle.
    pub async fn extract(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
    ) -> DriverResult<Extracted> {
        if self.is_promoted(driver, card).await? {
            let id = self.permalink(driver, card).await?.as_deref().and_then(extract_status_id);
            return Ok(Extracted::Ad(id));
        }

        let author = self
            .first_text(driver, card, &self.selectors.author)
            .await?
            .unwrap_or_default();
        let text = self
            .first_text(driver, card, &self.selectors.text)
            .await?
            .unwrap_or_default();
        let link = self.permalink(driver, card).await?;
        let handle = self.handle(driver, card).await?;
        let image_urls = self.image_urls(driver, card).await?;

        // Prefer the durable status id from the permalink; fall back to a
        // structural fingerprint when the card exposes none.
        let id = link
            .as_deref()
            .and_then(extract_status_id)
            .unwrap_or_else(|| dedup::fingerprint(&author, &text));

        Ok(Extracted::Record(Post {
            id,
            author,
            handle,
            text,
            link: link.unwrap_or_default(),
            image_urls,
            poster_details: None,
        }))
    }

    /// Durable id for a card when its permalink is already rendered, read
    /// without a full extraction. Cards without a visible permalink yield
    /// `None` and must go through `extract` to get a fingerprint id.
    pub async fn candidate_id(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
    ) -> DriverResult<Option<String>> {
        Ok(self
            .permalink(driver, card)
            .await?
            .as_deref()
            .and_then(extract_status_id))
    }

    async fn is_promoted(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
    ) -> DriverResult<bool> {
        let markers = driver
            .find_in(card, &Query::css(&self.selectors.promoted))
            .await?;
        Ok(!markers.is_empty())
    }

    async fn first_text(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
        selector: &str,
    ) -> DriverResult<Option<String>> {
        let found = driver.find_in(card, &Query::css(selector)).await?;
        match found.first() {
            Some(&el) => Ok(Some(driver.read_text(el).await?.trim().to_string())),
            None => Ok(None),
        }
    }

    async fn permalink(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
    ) -> DriverResult<Option<String>> {
        let anchors = driver
            .find_in(card, &Query::css(&self.selectors.permalink))
            .await?;
        for anchor in anchors {
            if let Some(href) = driver.read_attribute(anchor, "href").await? {
                return Ok(Some(resolve_url(&self.base, &href)));
            }
        }
        Ok(None)
    }

    async fn handle(&self, driver: &dyn PageDriver, card: ElementHandle) -> DriverResult<String> {
        let links = driver
            .find_in(card, &Query::css(&self.selectors.handle_link))
            .await?;
        for link in links {
            if let Some(href) = driver.read_attribute(link, "href").await? {
                let handle = href.rsplit('/').next().unwrap_or("").to_string();
                if !handle.is_empty() {
                    return Ok(handle);
                }
            }
        }
        Ok(String::new())
    }

    async fn image_urls(
        &self,
        driver: &dyn PageDriver,
        card: ElementHandle,
    ) -> DriverResult<Vec<String>> {
        let images = driver
            .find_in(card, &Query::css(&self.selectors.image))
            .await?;
        let mut urls = Vec::new();
        for image in images {
            if let Some(src) = driver.read_attribute(image, "src").await? {
                urls.push(upgrade_image_quality(&src));
            }
        }
        Ok(urls)
    }
}

/// Rewrite a CDN image URL to request its largest declared variant.
fn upgrade_image_quality(src: &str) -> String {
    if let Ok(mut url) = Url::parse(src) {
        let has_name = url.query_pairs().any(|(k, _)| k == "name");
        if has_name {
            let kept: Vec<(String, String)> = url
                .query_pairs()
                .filter(|(k, _)| k != "name")
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect();
            url.query_pairs_mut()
                .clear()
                .extend_pairs(kept)
                .append_pair("name", "large");
            return url.to_string();
        }
    }
    src.to_string()
}
