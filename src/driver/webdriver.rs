// src/driver/webdriver.rs

//! WebDriver-backed implementation of the page driver capability.
//!
//! Connects to a remote WebDriver endpoint (chromedriver, geckodriver, or a
//! hosted browser pool) and exposes the session through [`PageDriver`].
//! Element handles map to live `WebElement`s through an internal slab that is
//! cleared on every navigation and on every scroll, since handles do not
//! survive a page load and a long crawl would otherwise pin every element it
//! ever listed.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use thirtyfour::prelude::*;

use super::{Cookie, DriverError, DriverResult, ElementHandle, PageDriver, Query};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Handle-to-element slab. Entries live until the page mutates underneath
/// them; lookups after that report the handle stale.
struct HandleSlab<T> {
    entries: Mutex<HashMap<u64, T>>,
    next_id: AtomicU64,
}

impl<T: Clone> HandleSlab<T> {
    fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    fn register(&self, value: T) -> ElementHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.entries
            .lock()
            .expect("element slab poisoned")
            .insert(id, value);
        ElementHandle(id)
    }

    fn lookup(&self, handle: ElementHandle) -> DriverResult<T> {
        self.entries
            .lock()
            .expect("element slab poisoned")
            .get(&handle.0)
            .cloned()
            .ok_or(DriverError::Stale)
    }

    fn clear(&self) {
        self.entries.lock().expect("element slab poisoned").clear();
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.entries.lock().expect("element slab poisoned").len()
    }
}

/// A page driver backed by a remote WebDriver session.
pub struct WebDriverPage {
    driver: WebDriver,
    slab: HandleSlab<WebElement>,
}

impl WebDriverPage {
    /// Connect to a WebDriver server and open a new browser session.
    pub async fn connect(server_url: &str, user_agent: Option<&str>) -> DriverResult<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_arg("--disable-notifications").map_err(to_driver_error)?;
        caps.add_arg("--disable-popup-blocking").map_err(to_driver_error)?;
        if let Some(ua) = user_agent {
            caps.add_arg(&format!("--user-agent={ua}")).map_err(to_driver_error)?;
        }

        let driver = WebDriver::new(server_url, caps)
            .await
            .map_err(to_driver_error)?;

        Ok(Self::from_session(driver))
    }

    /// Wrap an already-open session.
    pub fn from_session(driver: WebDriver) -> Self {
        Self {
            driver,
            slab: HandleSlab::new(),
        }
    }

    /// Close the underlying browser session.
    pub async fn quit(self) -> DriverResult<()> {
        self.driver.quit().await.map_err(to_driver_error)
    }

    fn by(query: &Query) -> By {
        match query {
            Query::Css(s) => By::Css(s.as_str()),
            Query::XPath(s) => By::XPath(s.as_str()),
        }
    }
}

#[async_trait]
impl PageDriver for WebDriverPage {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        // Handles from the previous page are dead after a load.
        self.slab.clear();
        self.driver.goto(url).await.map_err(to_driver_error)
    }

    async fn find_visible(&self, query: &Query) -> DriverResult<Vec<ElementHandle>> {
        let found = self
            .driver
            .find_all(Self::by(query))
            .await
            .map_err(to_driver_error)?;

        let mut handles = Vec::with_capacity(found.len());
        for element in found {
            // An element that vanished between listing and the visibility
            // probe is simply not visible.
            if element.is_displayed().await.unwrap_or(false) {
                handles.push(self.slab.register(element));
            }
        }
        Ok(handles)
    }

    async fn find_in(
        &self,
        parent: ElementHandle,
        query: &Query,
    ) -> DriverResult<Vec<ElementHandle>> {
        let parent = self.slab.lookup(parent)?;
        let found = parent
            .find_all(Self::by(query))
            .await
            .map_err(to_driver_error)?;
        Ok(found.into_iter().map(|e| self.slab.register(e)).collect())
    }

    async fn read_attribute(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let element = self.slab.lookup(el)?;
        element.attr(name).await.map_err(to_driver_error)
    }

    async fn read_text(&self, el: ElementHandle) -> DriverResult<String> {
        let element = self.slab.lookup(el)?;
        element.text().await.map_err(to_driver_error)
    }

    async fn click(&self, el: ElementHandle) -> DriverResult<()> {
        let element = self.slab.lookup(el)?;
        element.click().await.map_err(to_driver_error)
    }

    async fn send_keys(&self, el: ElementHandle, text: &str) -> DriverResult<()> {
        let element = self.slab.lookup(el)?;
        element.send_keys(text).await.map_err(to_driver_error)
    }

    async fn wait_until_present(
        &self,
        query: &Query,
        timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        let element = self
            .driver
            .query(Self::by(query))
            .wait(timeout, POLL_INTERVAL)
            .first()
            .await
            .map_err(|_| DriverError::Timeout(query.as_str().to_string()))?;
        Ok(self.slab.register(element))
    }

    async fn wait_until_absent(&self, query: &Query, timeout: Duration) -> DriverResult<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let found = self
                .driver
                .find_all(Self::by(query))
                .await
                .map_err(to_driver_error)?;
            if found.is_empty() {
                return Ok(());
            }
            if tokio::time::Instant::now() >= deadline {
                return Err(DriverError::Timeout(query.as_str().to_string()));
            }
            tokio::time::sleep(POLL_INTERVAL).await;
        }
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        // Scrolling re-renders the virtualized feed; dropping the slab here
        // keeps it sized to one batch instead of the whole crawl.
        self.slab.clear();
        self.driver
            .execute("window.scrollTo(0, document.body.scrollHeight);", Vec::new())
            .await
            .map_err(to_driver_error)?;
        Ok(())
    }

    async fn scroll_into_view(&self, el: ElementHandle) -> DriverResult<()> {
        let element = self.slab.lookup(el)?;
        element.scroll_into_view().await.map_err(to_driver_error)
    }

    async fn snapshot(&self) -> DriverResult<Vec<u8>> {
        self.driver.screenshot_as_png().await.map_err(to_driver_error)
    }

    async fn cookies(&self) -> DriverResult<Vec<Cookie>> {
        let cookies = self
            .driver
            .get_all_cookies()
            .await
            .map_err(to_driver_error)?;
        Ok(cookies
            .into_iter()
            .map(|c| Cookie {
                name: c.name,
                value: c.value,
            })
            .collect())
    }
}

/// Map a WebDriver protocol error onto the driver fault taxonomy.
fn to_driver_error(err: WebDriverError) -> DriverError {
    match err {
        WebDriverError::NoSuchElement(info) => DriverError::NoSuchElement(format!("{info:?}")),
        WebDriverError::StaleElementReference(_) => DriverError::Stale,
        WebDriverError::ElementClickIntercepted(info) => {
            DriverError::Intercepted(format!("{info:?}"))
        }
        WebDriverError::Timeout(msg) => DriverError::Timeout(msg),
        other => DriverError::Session(other.to_string()),
    }
}
