// src/driver/mod.rs

//! Page driver capability.
//!
//! Everything that touches the rendered feed goes through the [`PageDriver`]
//! trait. The session is opened once by the caller and handed to each
//! component as `&dyn PageDriver`, so ownership of the underlying browser
//! session stays in one place. The production implementation drives a remote
//! WebDriver endpoint; tests substitute a scripted mock.

pub mod webdriver;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use webdriver::WebDriverPage;

/// Opaque handle to a rendered element.
///
/// Handles are only valid for the session that produced them and may go
/// stale when the surface re-renders; stale reads surface
/// [`DriverError::Stale`] and callers re-list instead of retrying the handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// An element query, either CSS or XPath.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    Css(String),
    XPath(String),
}

impl Query {
    pub fn css(s: impl Into<String>) -> Self {
        Self::Css(s.into())
    }

    pub fn xpath(s: impl Into<String>) -> Self {
        Self::XPath(s.into())
    }

    /// The raw selector string, for logging.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Css(s) | Self::XPath(s) => s,
        }
    }
}

/// A browser cookie.
#[derive(Debug, Clone)]
pub struct Cookie {
    pub name: String,
    pub value: String,
}

/// Faults surfaced by the page driver.
#[derive(Error, Debug)]
pub enum DriverError {
    /// No element matched the query
    #[error("no such element: {0}")]
    NoSuchElement(String),

    /// The element handle went stale between listing and reading
    #[error("stale element reference")]
    Stale,

    /// A click was intercepted by an overlapping element
    #[error("click intercepted: {0}")]
    Intercepted(String),

    /// A bounded wait expired
    #[error("wait timed out: {0}")]
    Timeout(String),

    /// Session-level failure (connection lost, protocol error)
    #[error("session error: {0}")]
    Session(String),
}

impl DriverError {
    /// Whether the fault is a transient render condition worth a local retry.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Stale | Self::Intercepted(_))
    }
}

/// Result type for driver operations.
pub type DriverResult<T> = std::result::Result<T, DriverError>;

/// Capability for interacting with a rendered page.
///
/// All waits are bounded; no method blocks indefinitely.
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Navigate the session to a URL.
    async fn navigate(&self, url: &str) -> DriverResult<()>;

    /// List currently visible elements matching the query.
    async fn find_visible(&self, query: &Query) -> DriverResult<Vec<ElementHandle>>;

    /// List elements matching the query within a parent element.
    async fn find_in(&self, parent: ElementHandle, query: &Query)
    -> DriverResult<Vec<ElementHandle>>;

    /// Read an attribute value, `None` when the attribute is absent.
    async fn read_attribute(&self, el: ElementHandle, name: &str)
    -> DriverResult<Option<String>>;

    /// Read the visible text of an element.
    async fn read_text(&self, el: ElementHandle) -> DriverResult<String>;

    /// Click an element.
    async fn click(&self, el: ElementHandle) -> DriverResult<()>;

    /// Type text into an element.
    async fn send_keys(&self, el: ElementHandle, text: &str) -> DriverResult<()>;

    /// Wait until an element matching the query is present.
    async fn wait_until_present(&self, query: &Query, timeout: Duration)
    -> DriverResult<ElementHandle>;

    /// Wait until no element matches the query.
    async fn wait_until_absent(&self, query: &Query, timeout: Duration) -> DriverResult<()>;

    /// Scroll the viewport to the bottom of the document. Implementations
    /// may invalidate outstanding handles, as a scroll re-renders the feed;
    /// callers re-list after scrolling.
    async fn scroll_to_bottom(&self) -> DriverResult<()>;

    /// Scroll an element into view.
    async fn scroll_into_view(&self, el: ElementHandle) -> DriverResult<()>;

    /// Capture a diagnostic screenshot as PNG bytes.
    async fn snapshot(&self) -> DriverResult<Vec<u8>>;

    /// Current session cookies.
    async fn cookies(&self) -> DriverResult<Vec<Cookie>>;
}
