// src/driver/mock.rs

//! Scripted page driver for unit tests.
//!
//! Queries are keyed by their raw selector string. Each selector holds a
//! queue of result batches; one batch is consumed per `find_visible` call and
//! the last batch repeats once the queue runs dry, which models a surface
//! that stopped producing new content.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use super::{Cookie, DriverError, DriverResult, ElementHandle, PageDriver, Query};

#[derive(Default)]
struct MockState {
    results: HashMap<String, VecDeque<Vec<u64>>>,
    children: HashMap<(u64, String), Vec<u64>>,
    attrs: HashMap<(u64, String), String>,
    texts: HashMap<u64, String>,
    stale_once: HashSet<u64>,
    stale_always: HashSet<u64>,
    intercepts: HashMap<u64, usize>,
    absent_waits: Vec<(String, Duration)>,
    log: Vec<String>,
    navigations: Vec<String>,
    typed: Vec<(u64, String)>,
    clicks: Vec<u64>,
    scrolls: usize,
}

/// A page driver whose responses are scripted up front.
#[derive(Default)]
pub struct MockDriver {
    state: Mutex<MockState>,
}

impl MockDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the batches returned by successive `find_visible` calls for a
    /// selector. The final batch repeats forever.
    pub fn script(&self, selector: &str, batches: Vec<Vec<u64>>) {
        let mut state = self.state.lock().unwrap();
        state
            .results
            .insert(selector.to_string(), batches.into_iter().collect());
    }

    /// Script the elements found inside a parent element.
    pub fn script_child(&self, parent: u64, selector: &str, handles: Vec<u64>) {
        let mut state = self.state.lock().unwrap();
        state
            .children
            .insert((parent, selector.to_string()), handles);
    }

    pub fn set_attr(&self, handle: u64, name: &str, value: &str) {
        let mut state = self.state.lock().unwrap();
        state
            .attrs
            .insert((handle, name.to_string()), value.to_string());
    }

    pub fn set_text(&self, handle: u64, text: &str) {
        let mut state = self.state.lock().unwrap();
        state.texts.insert(handle, text.to_string());
    }

    /// Make the next read of a handle fail with a stale reference.
    pub fn stale_once(&self, handle: u64) {
        self.state.lock().unwrap().stale_once.insert(handle);
    }

    /// Make every read of a handle fail with a stale reference.
    pub fn stale_always(&self, handle: u64) {
        self.state.lock().unwrap().stale_always.insert(handle);
    }

    /// Make the next `n` clicks on a handle be intercepted.
    pub fn intercept_clicks(&self, handle: u64, n: usize) {
        self.state.lock().unwrap().intercepts.insert(handle, n);
    }

    pub fn events(&self) -> Vec<String> {
        self.state.lock().unwrap().log.clone()
    }

    pub fn navigations(&self) -> Vec<String> {
        self.state.lock().unwrap().navigations.clone()
    }

    pub fn typed(&self) -> Vec<(u64, String)> {
        self.state.lock().unwrap().typed.clone()
    }

    pub fn clicks(&self) -> Vec<u64> {
        self.state.lock().unwrap().clicks.clone()
    }

    pub fn scroll_count(&self) -> usize {
        self.state.lock().unwrap().scrolls
    }

    /// Selector and timeout of each `wait_until_absent` call, in order.
    pub fn absent_waits(&self) -> Vec<(String, Duration)> {
        self.state.lock().unwrap().absent_waits.clone()
    }

    fn next_batch(state: &mut MockState, selector: &str) -> Vec<u64> {
        match state.results.get_mut(selector) {
            Some(queue) => {
                if queue.len() > 1 {
                    queue.pop_front().unwrap_or_default()
                } else {
                    queue.front().cloned().unwrap_or_default()
                }
            }
            None => Vec::new(),
        }
    }
}

#[async_trait]
impl PageDriver for MockDriver {
    async fn navigate(&self, url: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("navigate:{url}"));
        state.navigations.push(url.to_string());
        Ok(())
    }

    async fn find_visible(&self, query: &Query) -> DriverResult<Vec<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        let batch = Self::next_batch(&mut state, query.as_str());
        state.log.push(format!("find:{}", query.as_str()));
        Ok(batch.into_iter().map(ElementHandle).collect())
    }

    async fn find_in(
        &self,
        parent: ElementHandle,
        query: &Query,
    ) -> DriverResult<Vec<ElementHandle>> {
        let mut state = self.state.lock().unwrap();
        if state.stale_always.contains(&parent.0) || state.stale_once.remove(&parent.0) {
            return Err(DriverError::Stale);
        }
        state
            .log
            .push(format!("findin:{}:{}", parent.0, query.as_str()));
        Ok(state
            .children
            .get(&(parent.0, query.as_str().to_string()))
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .map(ElementHandle)
            .collect())
    }

    async fn read_attribute(
        &self,
        el: ElementHandle,
        name: &str,
    ) -> DriverResult<Option<String>> {
        let state = self.state.lock().unwrap();
        Ok(state.attrs.get(&(el.0, name.to_string())).cloned())
    }

    async fn read_text(&self, el: ElementHandle) -> DriverResult<String> {
        let mut state = self.state.lock().unwrap();
        if state.stale_always.contains(&el.0) || state.stale_once.remove(&el.0) {
            return Err(DriverError::Stale);
        }
        Ok(state.texts.get(&el.0).cloned().unwrap_or_default())
    }

    async fn click(&self, el: ElementHandle) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        if let Some(remaining) = state.intercepts.get_mut(&el.0) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(DriverError::Intercepted(format!("element {}", el.0)));
            }
        }
        state.log.push(format!("click:{}", el.0));
        state.clicks.push(el.0);
        Ok(())
    }

    async fn send_keys(&self, el: ElementHandle, text: &str) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.log.push(format!("keys:{}:{}", el.0, text));
        state.typed.push((el.0, text.to_string()));
        Ok(())
    }

    async fn wait_until_present(
        &self,
        query: &Query,
        _timeout: Duration,
    ) -> DriverResult<ElementHandle> {
        let mut state = self.state.lock().unwrap();
        let batch = Self::next_batch(&mut state, query.as_str());
        state.log.push(format!("present:{}", query.as_str()));
        batch
            .first()
            .map(|&h| ElementHandle(h))
            .ok_or_else(|| DriverError::Timeout(query.as_str().to_string()))
    }

    async fn wait_until_absent(&self, query: &Query, timeout: Duration) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .absent_waits
            .push((query.as_str().to_string(), timeout));
        // Consume batches until the surface reports the element gone. The
        // terminating empty batch is consumed too, unless it is the last one.
        loop {
            let queue = state.results.entry(query.as_str().to_string()).or_default();
            match queue.front() {
                None => break,
                Some(batch) if batch.is_empty() => {
                    if queue.len() > 1 {
                        queue.pop_front();
                    }
                    break;
                }
                Some(_) => {
                    if queue.len() == 1 {
                        let selector = query.as_str().to_string();
                        state.log.push(format!("absent-timeout:{selector}"));
                        return Err(DriverError::Timeout(selector));
                    }
                    queue.pop_front();
                }
            }
        }
        state.log.push(format!("absent:{}", query.as_str()));
        Ok(())
    }

    async fn scroll_to_bottom(&self) -> DriverResult<()> {
        let mut state = self.state.lock().unwrap();
        state.scrolls += 1;
        state.log.push("scroll".to_string());
        Ok(())
    }

    async fn scroll_into_view(&self, el: ElementHandle) -> DriverResult<()> {
        self.state
            .lock()
            .unwrap()
            .log
            .push(format!("scrollview:{}", el.0));
        Ok(())
    }

    async fn snapshot(&self) -> DriverResult<Vec<u8>> {
        self.state.lock().unwrap().log.push("snapshot".to_string());
        Ok(vec![0x89, b'P', b'N', b'G'])
    }

    async fn cookies(&self) -> DriverResult<Vec<Cookie>> {
        Ok(vec![Cookie {
            name: "auth_token".to_string(),
            value: "mock".to_string(),
        }])
    }
}
