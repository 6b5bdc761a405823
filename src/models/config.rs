// src/models/config.rs

//! Application configuration structures.
//!
//! Every field carries a serde default so a partial TOML file (or none at
//! all) yields a working configuration. Selector strings live here rather
//! than in code so a markup change on the content surface is a config edit,
//! not a release.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Crawl loop behavior
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Empty-batch and throttle backoff policy knobs
    #[serde(default)]
    pub backoff: BackoffConfig,

    /// Feed-side element selectors
    #[serde(default)]
    pub selectors: SelectorConfig,

    /// Login flow selectors and waits
    #[serde(default)]
    pub login: LoginConfig,

    /// Publish state machine selectors and waits
    #[serde(default)]
    pub publish: PublishConfig,

    /// Media resolution and download settings
    #[serde(default)]
    pub media: MediaConfig,

    /// Rephrase collaborator settings
    #[serde(default)]
    pub rephrase: RephraseConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return defaults if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.base_url.trim().is_empty() {
            return Err(AppError::validation("crawler.base_url is empty"));
        }
        if self.crawler.batch_window == 0 {
            return Err(AppError::validation("crawler.batch_window must be > 0"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.backoff.empty_batch_limit == 0 {
            return Err(AppError::validation("backoff.empty_batch_limit must be > 0"));
        }
        if self.backoff.throttle_retry_limit == 0 {
            return Err(AppError::validation(
                "backoff.throttle_retry_limit must be > 0",
            ));
        }
        if self.publish.submit_attempts == 0 {
            return Err(AppError::validation("publish.submit_attempts must be > 0"));
        }
        if self.publish.max_attachments == 0 {
            return Err(AppError::validation("publish.max_attachments must be > 0"));
        }
        if self.publish.max_chars == 0 {
            return Err(AppError::validation("publish.max_chars must be > 0"));
        }
        Ok(())
    }
}

/// Crawl loop behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// Base URL of the content surface
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// User-Agent for the browser session and HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Settle time after a navigation, in milliseconds
    #[serde(default = "defaults::nav_settle_ms")]
    pub nav_settle_ms: u64,

    /// Only the newest N candidate cards are inspected per batch
    #[serde(default = "defaults::batch_window")]
    pub batch_window: usize,

    /// Wait before re-listing after a stale element, in milliseconds
    #[serde(default = "defaults::stale_retry_ms")]
    pub stale_retry_ms: u64,

    /// Consecutive stale re-lists before the card is given up on
    #[serde(default = "defaults::stale_retry_limit")]
    pub stale_retry_limit: u32,

    /// HTTP request timeout in seconds (media and rephrase calls)
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Directory for the tabular export of collected records
    #[serde(default = "defaults::output_dir")]
    pub output_dir: String,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            user_agent: defaults::user_agent(),
            nav_settle_ms: defaults::nav_settle_ms(),
            batch_window: defaults::batch_window(),
            stale_retry_ms: defaults::stale_retry_ms(),
            stale_retry_limit: defaults::stale_retry_limit(),
            timeout_secs: defaults::timeout(),
            output_dir: defaults::output_dir(),
        }
    }
}

impl CrawlerConfig {
    pub fn nav_settle(&self) -> Duration {
        Duration::from_millis(self.nav_settle_ms)
    }

    pub fn stale_retry(&self) -> Duration {
        Duration::from_millis(self.stale_retry_ms)
    }
}

/// Backoff policy knobs.
///
/// Two tiers: short waits while nothing new has rendered yet, and long waits
/// once the surface shows a throttle signal. The limits here are the bounded
/// attempt counts after which the crawl ends as exhausted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackoffConfig {
    /// Consecutive empty batches before a full page refresh
    #[serde(default = "defaults::empty_batch_limit")]
    pub empty_batch_limit: u32,

    /// Refreshes before the crawl is considered exhausted
    #[serde(default = "defaults::refresh_limit")]
    pub refresh_limit: u32,

    /// Short wait after an empty batch, in milliseconds
    #[serde(default = "defaults::empty_poll_ms")]
    pub empty_poll_ms: u64,

    /// Long wait before invoking the throttle recovery affordance
    #[serde(default = "defaults::throttle_wait_ms")]
    pub throttle_wait_ms: u64,

    /// Settle time after clicking the recovery affordance
    #[serde(default = "defaults::throttle_settle_ms")]
    pub throttle_settle_ms: u64,

    /// Throttle recoveries before the crawl is considered exhausted
    #[serde(default = "defaults::throttle_retry_limit")]
    pub throttle_retry_limit: u32,
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            empty_batch_limit: defaults::empty_batch_limit(),
            refresh_limit: defaults::refresh_limit(),
            empty_poll_ms: defaults::empty_poll_ms(),
            throttle_wait_ms: defaults::throttle_wait_ms(),
            throttle_settle_ms: defaults::throttle_settle_ms(),
            throttle_retry_limit: defaults::throttle_retry_limit(),
        }
    }
}

impl BackoffConfig {
    pub fn empty_poll(&self) -> Duration {
        Duration::from_millis(self.empty_poll_ms)
    }

    pub fn throttle_wait(&self) -> Duration {
        Duration::from_millis(self.throttle_wait_ms)
    }

    pub fn throttle_settle(&self) -> Duration {
        Duration::from_millis(self.throttle_settle_ms)
    }
}

/// Feed-side selectors.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectorConfig {
    /// Candidate post cards (CSS)
    #[serde(default = "defaults::sel_card")]
    pub card: String,

    /// Author display name within a card (CSS)
    #[serde(default = "defaults::sel_author")]
    pub author: String,

    /// Author profile link within a card (CSS); href yields the handle
    #[serde(default = "defaults::sel_handle_link")]
    pub handle_link: String,

    /// Post body text within a card (CSS)
    #[serde(default = "defaults::sel_text")]
    pub text: String,

    /// Permalink anchor within a card (CSS)
    #[serde(default = "defaults::sel_permalink")]
    pub permalink: String,

    /// Promoted-content marker within a card (CSS)
    #[serde(default = "defaults::sel_promoted")]
    pub promoted: String,

    /// Image elements within a card (CSS)
    #[serde(default = "defaults::sel_image")]
    pub image: String,

    /// Throttle recovery affordance (XPath)
    #[serde(default = "defaults::sel_retry_button")]
    pub retry_button: String,

    /// Cookie banner dismissal (XPath), best effort
    #[serde(default = "defaults::sel_cookie_banner")]
    pub cookie_banner: String,

    /// Profile-page following count (CSS), read when poster details are on
    #[serde(default = "defaults::sel_following_stat")]
    pub following_stat: String,

    /// Profile-page follower count (CSS), read when poster details are on
    #[serde(default = "defaults::sel_followers_stat")]
    pub followers_stat: String,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card: defaults::sel_card(),
            author: defaults::sel_author(),
            handle_link: defaults::sel_handle_link(),
            text: defaults::sel_text(),
            permalink: defaults::sel_permalink(),
            promoted: defaults::sel_promoted(),
            image: defaults::sel_image(),
            retry_button: defaults::sel_retry_button(),
            cookie_banner: defaults::sel_cookie_banner(),
            following_stat: defaults::sel_following_stat(),
            followers_stat: defaults::sel_followers_stat(),
        }
    }
}

/// Login flow selectors and waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginConfig {
    #[serde(default = "defaults::login_url")]
    pub login_url: String,

    /// Username input (CSS)
    #[serde(default = "defaults::sel_username_input")]
    pub username_input: String,

    /// Secondary verification prompt input (CSS), optional step
    #[serde(default = "defaults::sel_verify_input")]
    pub verify_input: String,

    /// Password input (CSS)
    #[serde(default = "defaults::sel_password_input")]
    pub password_input: String,

    /// Element whose presence means the session is logged in (CSS)
    #[serde(default = "defaults::sel_home_marker")]
    pub home_marker: String,

    /// Session cookie that confirms authentication
    #[serde(default = "defaults::auth_cookie")]
    pub auth_cookie: String,

    /// Wait for each login field to appear, in milliseconds
    #[serde(default = "defaults::login_field_wait_ms")]
    pub field_wait_ms: u64,

    /// Wait for the optional verification prompt, in milliseconds
    #[serde(default = "defaults::login_verify_wait_ms")]
    pub verify_wait_ms: u64,

    /// Settle time between login steps, in milliseconds
    #[serde(default = "defaults::login_settle_ms")]
    pub settle_ms: u64,
}

impl Default for LoginConfig {
    fn default() -> Self {
        Self {
            login_url: defaults::login_url(),
            username_input: defaults::sel_username_input(),
            verify_input: defaults::sel_verify_input(),
            password_input: defaults::sel_password_input(),
            home_marker: defaults::sel_home_marker(),
            auth_cookie: defaults::auth_cookie(),
            field_wait_ms: defaults::login_field_wait_ms(),
            verify_wait_ms: defaults::login_verify_wait_ms(),
            settle_ms: defaults::login_settle_ms(),
        }
    }
}

impl LoginConfig {
    pub fn field_wait(&self) -> Duration {
        Duration::from_millis(self.field_wait_ms)
    }

    pub fn verify_wait(&self) -> Duration {
        Duration::from_millis(self.verify_wait_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

/// Publish state machine selectors and waits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Primary compose control (CSS)
    #[serde(default = "defaults::sel_compose_button")]
    pub compose_button: String,

    /// Fallback compose surface (XPath)
    #[serde(default = "defaults::sel_compose_fallback")]
    pub compose_fallback: String,

    /// Primary text input area (CSS)
    #[serde(default = "defaults::sel_input_area")]
    pub input_area: String,

    /// Fallback editable region (XPath)
    #[serde(default = "defaults::sel_input_fallback")]
    pub input_fallback: String,

    /// File input for attachments (CSS)
    #[serde(default = "defaults::sel_file_input")]
    pub file_input: String,

    /// Upload progress indicator (CSS)
    #[serde(default = "defaults::sel_progress_bar")]
    pub progress_bar: String,

    /// Attachment confirmed marker (CSS)
    #[serde(default = "defaults::sel_attachments")]
    pub attachments: String,

    /// Enabled submit control (XPath)
    #[serde(default = "defaults::sel_submit_button")]
    pub submit_button: String,

    /// Alternative submit locator tried before giving up (XPath)
    #[serde(default = "defaults::sel_submit_fallback")]
    pub submit_fallback: String,

    /// Video processing indicator (XPath)
    #[serde(default = "defaults::sel_processing")]
    pub processing: String,

    /// Wait for compose/input elements, in milliseconds
    #[serde(default = "defaults::element_wait_ms")]
    pub element_wait_ms: u64,

    /// Wait for the progress indicator to appear, in milliseconds
    #[serde(default = "defaults::progress_appear_ms")]
    pub progress_appear_ms: u64,

    /// Upload completion wait for images, in milliseconds
    #[serde(default = "defaults::image_upload_ms")]
    pub image_upload_ms: u64,

    /// Upload completion wait for videos, in milliseconds
    #[serde(default = "defaults::video_upload_ms")]
    pub video_upload_ms: u64,

    /// Wait for the attachment-confirmed fallback marker, in milliseconds
    #[serde(default = "defaults::attach_confirm_ms")]
    pub attach_confirm_ms: u64,

    /// Extra base wait after attaching a video, in milliseconds
    #[serde(default = "defaults::video_extra_wait_ms")]
    pub video_extra_wait_ms: u64,

    /// Poll interval for the processing indicator, in milliseconds
    #[serde(default = "defaults::processing_poll_ms")]
    pub processing_poll_ms: u64,

    /// Maximum time to poll the processing indicator, in milliseconds
    #[serde(default = "defaults::processing_limit_ms")]
    pub processing_limit_ms: u64,

    /// Bounded submit attempts while the control is disabled or covered
    #[serde(default = "defaults::submit_attempts")]
    pub submit_attempts: u32,

    /// Wait between submit attempts, in milliseconds
    #[serde(default = "defaults::submit_retry_ms")]
    pub submit_retry_ms: u64,

    /// Settle time between compose steps, in milliseconds
    #[serde(default = "defaults::publish_settle_ms")]
    pub settle_ms: u64,

    /// At most this many assets are attached per post
    #[serde(default = "defaults::max_attachments")]
    pub max_attachments: usize,

    /// Maximum publishable text length, in graphemes
    #[serde(default = "defaults::max_chars")]
    pub max_chars: usize,

    /// Mandatory delay between publish jobs, in seconds
    #[serde(default = "defaults::delay_between_posts_secs")]
    pub delay_between_posts_secs: u64,

    /// Keep downloaded media after a successful publish
    #[serde(default)]
    pub keep_media: bool,

    /// Directory for diagnostic snapshots
    #[serde(default = "defaults::debug_dir")]
    pub debug_dir: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            compose_button: defaults::sel_compose_button(),
            compose_fallback: defaults::sel_compose_fallback(),
            input_area: defaults::sel_input_area(),
            input_fallback: defaults::sel_input_fallback(),
            file_input: defaults::sel_file_input(),
            progress_bar: defaults::sel_progress_bar(),
            attachments: defaults::sel_attachments(),
            submit_button: defaults::sel_submit_button(),
            submit_fallback: defaults::sel_submit_fallback(),
            processing: defaults::sel_processing(),
            element_wait_ms: defaults::element_wait_ms(),
            progress_appear_ms: defaults::progress_appear_ms(),
            image_upload_ms: defaults::image_upload_ms(),
            video_upload_ms: defaults::video_upload_ms(),
            attach_confirm_ms: defaults::attach_confirm_ms(),
            video_extra_wait_ms: defaults::video_extra_wait_ms(),
            processing_poll_ms: defaults::processing_poll_ms(),
            processing_limit_ms: defaults::processing_limit_ms(),
            submit_attempts: defaults::submit_attempts(),
            submit_retry_ms: defaults::submit_retry_ms(),
            settle_ms: defaults::publish_settle_ms(),
            max_attachments: defaults::max_attachments(),
            max_chars: defaults::max_chars(),
            delay_between_posts_secs: defaults::delay_between_posts_secs(),
            keep_media: false,
            debug_dir: defaults::debug_dir(),
        }
    }
}

impl PublishConfig {
    pub fn element_wait(&self) -> Duration {
        Duration::from_millis(self.element_wait_ms)
    }

    pub fn progress_appear(&self) -> Duration {
        Duration::from_millis(self.progress_appear_ms)
    }

    pub fn upload_wait(&self, video: bool) -> Duration {
        Duration::from_millis(if video {
            self.video_upload_ms
        } else {
            self.image_upload_ms
        })
    }

    pub fn attach_confirm(&self) -> Duration {
        Duration::from_millis(self.attach_confirm_ms)
    }

    pub fn video_extra_wait(&self) -> Duration {
        Duration::from_millis(self.video_extra_wait_ms)
    }

    pub fn processing_poll(&self) -> Duration {
        Duration::from_millis(self.processing_poll_ms)
    }

    pub fn processing_limit(&self) -> Duration {
        Duration::from_millis(self.processing_limit_ms)
    }

    pub fn submit_retry(&self) -> Duration {
        Duration::from_millis(self.submit_retry_ms)
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn post_delay(&self) -> Duration {
        Duration::from_secs(self.delay_between_posts_secs)
    }
}

/// Media resolution and download settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MediaConfig {
    /// Root directory for downloaded media
    #[serde(default = "defaults::media_root")]
    pub root_dir: String,

    /// Video lookup endpoint; the post permalink is appended
    #[serde(default = "defaults::resolver_url")]
    pub resolver_url: String,

    /// Selector for the highest-quality variant link in the lookup response
    #[serde(default = "defaults::resolver_link_selector")]
    pub resolver_link_selector: String,

    /// Selector for the title in the lookup response
    #[serde(default = "defaults::resolver_title_selector")]
    pub resolver_title_selector: String,

    /// Streamed download timeout in seconds
    #[serde(default = "defaults::download_timeout_secs")]
    pub download_timeout_secs: u64,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            root_dir: defaults::media_root(),
            resolver_url: defaults::resolver_url(),
            resolver_link_selector: defaults::resolver_link_selector(),
            resolver_title_selector: defaults::resolver_title_selector(),
            download_timeout_secs: defaults::download_timeout_secs(),
        }
    }
}

/// Rephrase collaborator settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RephraseConfig {
    /// Skip rephrasing entirely when false
    #[serde(default = "defaults::enabled")]
    pub enabled: bool,

    /// Generation endpoint of the local model server
    #[serde(default = "defaults::rephrase_endpoint")]
    pub endpoint: String,

    /// Model name sent with each request
    #[serde(default = "defaults::rephrase_model")]
    pub model: String,

    /// Instruction prepended to the post text
    #[serde(default = "defaults::rephrase_prompt")]
    pub prompt: String,
}

impl Default for RephraseConfig {
    fn default() -> Self {
        Self {
            enabled: defaults::enabled(),
            endpoint: defaults::rephrase_endpoint(),
            model: defaults::rephrase_model(),
            prompt: defaults::rephrase_prompt(),
        }
    }
}

/// Default values for configuration fields.
mod defaults {
    pub fn base_url() -> String {
        "https://twitter.com".to_string()
    }

    pub fn user_agent() -> String {
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) \
         Chrome/120.0.0.0 Safari/537.36"
            .to_string()
    }

    pub fn nav_settle_ms() -> u64 {
        3000
    }

    pub fn batch_window() -> usize {
        15
    }

    pub fn stale_retry_ms() -> u64 {
        2000
    }

    pub fn stale_retry_limit() -> u32 {
        3
    }

    pub fn timeout() -> u64 {
        30
    }

    pub fn output_dir() -> String {
        "posts".to_string()
    }

    pub fn empty_batch_limit() -> u32 {
        5
    }

    pub fn refresh_limit() -> u32 {
        3
    }

    pub fn empty_poll_ms() -> u64 {
        1000
    }

    pub fn throttle_wait_ms() -> u64 {
        58_000
    }

    pub fn throttle_settle_ms() -> u64 {
        2000
    }

    pub fn throttle_retry_limit() -> u32 {
        15
    }

    pub fn sel_card() -> String {
        "article[data-testid='tweet']".to_string()
    }

    pub fn sel_author() -> String {
        "div[data-testid='User-Name'] span".to_string()
    }

    pub fn sel_handle_link() -> String {
        "div[data-testid='User-Name'] a[role='link']".to_string()
    }

    pub fn sel_text() -> String {
        "div[data-testid='tweetText']".to_string()
    }

    pub fn sel_permalink() -> String {
        "a[href*='/status/']".to_string()
    }

    pub fn sel_promoted() -> String {
        "div[data-testid='placementTracking']".to_string()
    }

    pub fn sel_image() -> String {
        "div[data-testid='tweetPhoto'] img".to_string()
    }

    pub fn sel_retry_button() -> String {
        "//span[text()='Retry']/../../..".to_string()
    }

    pub fn sel_cookie_banner() -> String {
        "//span[text()='Refuse non-essential cookies']/../../..".to_string()
    }

    pub fn sel_following_stat() -> String {
        "a[href$='/following'] span span".to_string()
    }

    pub fn sel_followers_stat() -> String {
        "a[href$='/verified_followers'] span span".to_string()
    }

    pub fn login_url() -> String {
        "https://twitter.com/i/flow/login".to_string()
    }

    pub fn sel_username_input() -> String {
        "input[autocomplete='username']".to_string()
    }

    pub fn sel_verify_input() -> String {
        "input[data-testid='ocfEnterTextTextInput']".to_string()
    }

    pub fn sel_password_input() -> String {
        "input[name='password']".to_string()
    }

    pub fn sel_home_marker() -> String {
        "a[data-testid='AppTabBar_Home_Link']".to_string()
    }

    pub fn auth_cookie() -> String {
        "auth_token".to_string()
    }

    pub fn login_field_wait_ms() -> u64 {
        10_000
    }

    pub fn login_verify_wait_ms() -> u64 {
        5000
    }

    pub fn login_settle_ms() -> u64 {
        2000
    }

    pub fn sel_compose_button() -> String {
        "a[data-testid='SideNav_NewTweet_Button']".to_string()
    }

    pub fn sel_compose_fallback() -> String {
        "//div[@role='textbox' and @aria-label]".to_string()
    }

    pub fn sel_input_area() -> String {
        "div[data-testid='tweetTextarea_0']".to_string()
    }

    pub fn sel_input_fallback() -> String {
        "//div[@role='textbox' and @contenteditable='true']".to_string()
    }

    pub fn sel_file_input() -> String {
        "input[data-testid='fileInput']".to_string()
    }

    pub fn sel_progress_bar() -> String {
        "[data-testid='progressBar']".to_string()
    }

    pub fn sel_attachments() -> String {
        "[data-testid='attachments']".to_string()
    }

    pub fn sel_submit_button() -> String {
        "//*[contains(@data-testid, 'tweetButton') and not(@aria-disabled='true')]".to_string()
    }

    pub fn sel_submit_fallback() -> String {
        "//*[contains(@data-testid, 'tweetButton') and (contains(., 'Tweet') or contains(., 'Post'))]"
            .to_string()
    }

    pub fn sel_processing() -> String {
        "//*[contains(text(), 'Processing') or contains(text(), 'Uploading')]".to_string()
    }

    pub fn element_wait_ms() -> u64 {
        10_000
    }

    pub fn progress_appear_ms() -> u64 {
        5000
    }

    pub fn image_upload_ms() -> u64 {
        30_000
    }

    pub fn video_upload_ms() -> u64 {
        60_000
    }

    pub fn attach_confirm_ms() -> u64 {
        10_000
    }

    pub fn video_extra_wait_ms() -> u64 {
        10_000
    }

    pub fn processing_poll_ms() -> u64 {
        5000
    }

    pub fn processing_limit_ms() -> u64 {
        60_000
    }

    pub fn submit_attempts() -> u32 {
        10
    }

    pub fn submit_retry_ms() -> u64 {
        2000
    }

    pub fn publish_settle_ms() -> u64 {
        2000
    }

    pub fn max_attachments() -> usize {
        4
    }

    pub fn max_chars() -> usize {
        280
    }

    pub fn delay_between_posts_secs() -> u64 {
        60
    }

    pub fn debug_dir() -> String {
        "debug".to_string()
    }

    pub fn media_root() -> String {
        "media".to_string()
    }

    pub fn resolver_url() -> String {
        "https://twitsave.com/info?url=".to_string()
    }

    pub fn resolver_link_selector() -> String {
        "div.origin-top-right a".to_string()
    }

    pub fn resolver_title_selector() -> String {
        "div.leading-tight p.m-2".to_string()
    }

    pub fn download_timeout_secs() -> u64 {
        120
    }

    pub fn enabled() -> bool {
        true
    }

    pub fn rephrase_endpoint() -> String {
        "http://localhost:11434/api/generate".to_string()
    }

    pub fn rephrase_model() -> String {
        "llama3.2".to_string()
    }

    pub fn rephrase_prompt() -> String {
        "Rephrase the following post while keeping its meaning intact. Do not add any \
         extra text, explanations, or headers; return only the rephrased post, and keep \
         it under 270 characters. Here is the post: "
            .to_string()
    }
}
