// src/services/publisher.rs

//! Publish state machine.
//!
//! One session posts many jobs. Login happens once and is fatal on failure;
//! per-job faults capture a diagnostic snapshot, mark the job failed, and
//! reset the machine to `Ready` so the next job can proceed.

use std::path::{Path, PathBuf};

use tokio::time::{Instant, sleep};

use crate::driver::{DriverError, ElementHandle, PageDriver, Query};
use crate::error::{AppError, Result};
use crate::models::{JobStatus, LoginConfig, MediaKind, PublishConfig, PublishJob};
use crate::services::rephrase::clamp_text;
use crate::storage::LocalStorage;

/// Where the machine currently is. Transitions only move forward within a
/// job; faults and completion both land back on `Ready`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublishState {
    LoggedOut,
    LoggingIn,
    Ready,
    Composing,
    AttachingMedia,
    Submitting,
}

/// Account credentials for the publish session.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    /// Answer for the secondary verification prompt, when the surface asks
    pub verification: Option<String>,
}

/// Drives the compose/attach/submit flow against a logged-in session.
pub struct Publisher<'a> {
    driver: &'a dyn PageDriver,
    login: LoginConfig,
    config: PublishConfig,
    state: PublishState,
}

impl<'a> Publisher<'a> {
    pub fn new(driver: &'a dyn PageDriver, login: LoginConfig, config: PublishConfig) -> Self {
        Self {
            driver,
            login,
            config,
            state: PublishState::LoggedOut,
        }
    }

    pub fn state(&self) -> PublishState {
        self.state
    }

    /// Authenticate the session. A failure here is fatal for the whole
    /// publish phase; no job runs against an unauthenticated session.
    pub async fn login(&mut self, creds: &Credentials) -> Result<()> {
        self.state = PublishState::LoggingIn;
        match self.run_login(creds).await {
            Ok(()) => {
                log::info!("Logged in as {}", creds.username);
                self.state = PublishState::Ready;
                Ok(())
            }
            Err(e) => {
                self.capture_snapshot("login").await;
                self.state = PublishState::LoggedOut;
                Err(AppError::login(e))
            }
        }
    }

    async fn run_login(&self, creds: &Credentials) -> Result<()> {
        self.driver.navigate(&self.login.login_url).await?;
        sleep(self.login.settle()).await;

        let username = self
            .driver
            .wait_until_present(&Query::css(&self.login.username_input), self.login.field_wait())
            .await?;
        self.driver
            .send_keys(username, &format!("{}\n", creds.username))
            .await?;
        sleep(self.login.settle()).await;

        // The surface sometimes interjects a verification prompt between
        // username and password. Absence is the normal path.
        match self
            .driver
            .wait_until_present(&Query::css(&self.login.verify_input), self.login.verify_wait())
            .await
        {
            Ok(prompt) => {
                let answer = creds.verification.as_deref().ok_or_else(|| {
                    AppError::login("verification prompt shown but no verification value set")
                })?;
                log::info!("Answering verification prompt");
                self.driver
                    .send_keys(prompt, &format!("{answer}\n"))
                    .await?;
                sleep(self.login.settle()).await;
            }
            Err(DriverError::Timeout(_)) | Err(DriverError::NoSuchElement(_)) => {}
            Err(e) => return Err(e.into()),
        }

        let password = self
            .driver
            .wait_until_present(&Query::css(&self.login.password_input), self.login.field_wait())
            .await?;
        self.driver
            .send_keys(password, &format!("{}\n", creds.password))
            .await?;

        self.driver
            .wait_until_present(&Query::css(&self.login.home_marker), self.login.field_wait())
            .await?;

        let cookies = self.driver.cookies().await?;
        if !cookies.iter().any(|c| c.name == self.login.auth_cookie) {
            return Err(AppError::login(format!(
                "session cookie {} not set after login",
                self.login.auth_cookie
            )));
        }
        Ok(())
    }

    /// Publish one job. On fault the job is marked failed, a snapshot is
    /// captured, and the machine resets to `Ready` for the next job.
    pub async fn post(&mut self, job: &mut PublishJob) -> Result<()> {
        if self.state != PublishState::Ready {
            return Err(AppError::publish(
                job.record.id.clone(),
                format!("publisher not ready (state {:?})", self.state),
            ));
        }

        match self.run_post(job).await {
            Ok(()) => {
                job.status = JobStatus::Posted;
                self.state = PublishState::Ready;
                log::info!("Posted record {}", job.record.id);
                Ok(())
            }
            Err(e) => {
                self.capture_snapshot(&format!("publish_{}", job.record.id))
                    .await;
                job.status = JobStatus::Failed;
                self.state = PublishState::Ready;
                Err(AppError::publish(job.record.id.clone(), e))
            }
        }
    }

    async fn run_post(&mut self, job: &PublishJob) -> Result<()> {
        self.state = PublishState::Composing;
        self.open_composer().await?;
        let input = self.find_input().await?;

        let text = clamp_text(&job.text, self.config.max_chars);
        self.driver.send_keys(input, &text).await?;
        sleep(self.config.settle()).await;

        let attachable: Vec<(&PathBuf, MediaKind)> = job
            .media
            .iter()
            .filter_map(|m| m.local_path.as_ref().map(|p| (p, m.kind)))
            .take(self.config.max_attachments)
            .collect();
        if !attachable.is_empty() {
            self.state = PublishState::AttachingMedia;
            // Upload budget is per attachment; an image in a mixed job never
            // waits the video allowance.
            for &(path, kind) in &attachable {
                self.attach(path, kind == MediaKind::Video).await?;
            }
            if job.has_video() {
                self.await_processing().await?;
            }
        }

        self.state = PublishState::Submitting;
        self.submit().await?;
        sleep(self.config.settle()).await;
        Ok(())
    }

    /// Open the compose surface, trying the primary control first and the
    /// fallback editable region second.
    async fn open_composer(&self) -> Result<()> {
        let strategies = [
            Query::css(&self.config.compose_button),
            Query::xpath(&self.config.compose_fallback),
        ];
        let el = self.first_present(&strategies, "compose control").await?;
        self.driver.click(el).await?;
        sleep(self.config.settle()).await;
        Ok(())
    }

    async fn find_input(&self) -> Result<ElementHandle> {
        let strategies = [
            Query::css(&self.config.input_area),
            Query::xpath(&self.config.input_fallback),
        ];
        self.first_present(&strategies, "text input").await
    }

    /// Try each locator in order, returning the first element found.
    async fn first_present(&self, strategies: &[Query], what: &str) -> Result<ElementHandle> {
        for query in strategies {
            match self
                .driver
                .wait_until_present(query, self.config.element_wait())
                .await
            {
                Ok(el) => return Ok(el),
                Err(DriverError::Timeout(_)) | Err(DriverError::NoSuchElement(_)) => {
                    log::debug!("Locator missed for {what}: {}", query.as_str());
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::publish(what, "no locator matched"))
    }

    /// Attach one file and wait for the upload to complete.
    async fn attach(&self, path: &Path, video: bool) -> Result<()> {
        let input = self
            .driver
            .wait_until_present(&Query::css(&self.config.file_input), self.config.element_wait())
            .await?;
        let sent = tokio::fs::canonicalize(path)
            .await
            .unwrap_or_else(|_| path.to_path_buf());
        self.driver
            .send_keys(input, &sent.to_string_lossy())
            .await?;

        let progress = Query::css(&self.config.progress_bar);
        match self
            .driver
            .wait_until_present(&progress, self.config.progress_appear())
            .await
        {
            Ok(_) => {
                self.driver
                    .wait_until_absent(&progress, self.config.upload_wait(video))
                    .await?;
            }
            Err(DriverError::Timeout(_)) => {
                // No progress indicator; fall back to the attachment marker.
                self.driver
                    .wait_until_present(
                        &Query::css(&self.config.attachments),
                        self.config.attach_confirm(),
                    )
                    .await
                    .map_err(|e| AppError::publish("attach", e))?;
            }
            Err(e) => return Err(e.into()),
        }
        log::debug!("Attached {}", path.display());
        Ok(())
    }

    /// Wait out server-side video processing. Submitting while the
    /// processing indicator shows produces a broken post.
    async fn await_processing(&self) -> Result<()> {
        sleep(self.config.video_extra_wait()).await;

        let indicator = Query::xpath(&self.config.processing);
        let started = Instant::now();
        loop {
            let visible = self.driver.find_visible(&indicator).await?;
            if visible.is_empty() {
                return Ok(());
            }
            if started.elapsed() >= self.config.processing_limit() {
                return Err(AppError::publish(
                    "processing",
                    "video still processing at deadline",
                ));
            }
            log::debug!("Video still processing");
            sleep(self.config.processing_poll()).await;
        }
    }

    /// Bounded submit attempts; the control reports disabled or covered
    /// while uploads settle. The fallback locator gets one shot at the end.
    async fn submit(&self) -> Result<()> {
        let primary = Query::xpath(&self.config.submit_button);
        for attempt in 1..=self.config.submit_attempts {
            match self
                .driver
                .wait_until_present(&primary, self.config.submit_retry())
                .await
            {
                Ok(el) => match self.driver.click(el).await {
                    Ok(()) => return Ok(()),
                    Err(e) if e.is_transient() => {
                        // An overlay may be covering the control; bring it
                        // back into the viewport before the next attempt.
                        log::debug!("Submit attempt {attempt} blocked: {e}");
                        let _ = self.driver.scroll_into_view(el).await;
                    }
                    Err(e) => return Err(e.into()),
                },
                Err(DriverError::Timeout(_)) | Err(DriverError::NoSuchElement(_)) => {
                    log::debug!("Submit control not present on attempt {attempt}");
                }
                Err(e) => return Err(e.into()),
            }
            sleep(self.config.submit_retry()).await;
        }

        let fallback = Query::xpath(&self.config.submit_fallback);
        let el = self
            .driver
            .wait_until_present(&fallback, self.config.element_wait())
            .await
            .map_err(|e| AppError::publish("submit", e))?;
        self.driver.click(el).await?;
        Ok(())
    }

    /// Best-effort diagnostic screenshot; failures are logged, never raised.
    async fn capture_snapshot(&self, label: &str) {
        let bytes = match self.driver.snapshot().await {
            Ok(bytes) => bytes,
            Err(e) => {
                log::warn!("Snapshot capture failed: {e}");
                return;
            }
        };
        let storage = LocalStorage::new(&self.config.debug_dir);
        match storage.write_snapshot(label, &bytes).await {
            Ok(path) => log::info!("Saved diagnostic snapshot {}", path.display()),
            Err(e) => log::warn!("Snapshot write failed: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use crate::driver::mock::MockDriver;
    use crate::models::{MediaAsset, MediaKind, Post};

    fn fast_login() -> LoginConfig {
        LoginConfig {
            field_wait_ms: 1,
            verify_wait_ms: 1,
            settle_ms: 1,
            ..LoginConfig::default()
        }
    }

    fn fast_publish() -> PublishConfig {
        PublishConfig {
            element_wait_ms: 1,
            progress_appear_ms: 1,
            image_upload_ms: 1,
            video_upload_ms: 1,
            attach_confirm_ms: 1,
            video_extra_wait_ms: 1,
            processing_poll_ms: 1,
            processing_limit_ms: 200,
            submit_retry_ms: 1,
            settle_ms: 1,
            debug_dir: std::env::temp_dir()
                .join("refeed-test-debug")
                .to_string_lossy()
                .into_owned(),
            ..PublishConfig::default()
        }
    }

    fn creds() -> Credentials {
        Credentials {
            username: "alice".into(),
            password: "secret".into(),
            verification: Some("alice@example.com".into()),
        }
    }

    fn record() -> Post {
        Post {
            id: "42".into(),
            author: "Alice".into(),
            handle: "alice".into(),
            text: "hello".into(),
            link: "https://x.test/alice/status/42".into(),
            image_urls: Vec::new(),
            poster_details: None,
        }
    }

    fn script_compose(driver: &MockDriver, config: &PublishConfig) {
        driver.script(&config.compose_button, vec![vec![10]]);
        driver.script(&config.input_area, vec![vec![11]]);
        driver.script(&config.submit_button, vec![vec![30]]);
    }

    #[tokio::test]
    async fn test_login_reaches_ready() {
        let driver = MockDriver::new();
        let login = fast_login();
        driver.script(&login.username_input, vec![vec![1]]);
        driver.script(&login.password_input, vec![vec![2]]);
        driver.script(&login.home_marker, vec![vec![3]]);

        let mut publisher = Publisher::new(&driver, login, fast_publish());
        publisher.login(&creds()).await.unwrap();

        assert_eq!(publisher.state(), PublishState::Ready);
        let typed = driver.typed();
        assert!(typed.contains(&(1, "alice\n".to_string())));
        assert!(typed.contains(&(2, "secret\n".to_string())));
    }

    #[tokio::test]
    async fn test_login_answers_verification_prompt() {
        let driver = MockDriver::new();
        let login = fast_login();
        driver.script(&login.username_input, vec![vec![1]]);
        driver.script(&login.verify_input, vec![vec![5]]);
        driver.script(&login.password_input, vec![vec![2]]);
        driver.script(&login.home_marker, vec![vec![3]]);

        let mut publisher = Publisher::new(&driver, login, fast_publish());
        publisher.login(&creds()).await.unwrap();

        assert!(
            driver
                .typed()
                .contains(&(5, "alice@example.com\n".to_string()))
        );
    }

    #[tokio::test]
    async fn test_login_failure_is_fatal() {
        let driver = MockDriver::new();
        let login = fast_login();
        driver.script(&login.username_input, vec![vec![1]]);
        driver.script(&login.password_input, vec![vec![2]]);
        // Home marker never appears.

        let mut publisher = Publisher::new(&driver, login, fast_publish());
        let err = publisher.login(&creds()).await.unwrap_err();

        assert!(matches!(err, AppError::Login(_)));
        assert_eq!(publisher.state(), PublishState::LoggedOut);
        assert!(driver.events().contains(&"snapshot".to_string()));
    }

    #[tokio::test]
    async fn test_post_plain_text() {
        let driver = MockDriver::new();
        let config = fast_publish();
        script_compose(&driver, &config);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let mut job = PublishJob::new(record(), "hello world".into(), Vec::new());
        publisher.post(&mut job).await.unwrap();

        assert_eq!(job.status, JobStatus::Posted);
        assert_eq!(publisher.state(), PublishState::Ready);
        assert!(driver.typed().contains(&(11, "hello world".to_string())));
        assert_eq!(driver.clicks(), vec![10, 30]);
    }

    #[tokio::test]
    async fn test_compose_falls_back_to_secondary_locators() {
        let driver = MockDriver::new();
        let config = fast_publish();
        // Primary locators miss; only the fallbacks resolve.
        driver.script(&config.compose_fallback, vec![vec![12]]);
        driver.script(&config.input_fallback, vec![vec![13]]);
        driver.script(&config.submit_button, vec![vec![30]]);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let mut job = PublishJob::new(record(), "via fallback".into(), Vec::new());
        publisher.post(&mut job).await.unwrap();

        assert!(driver.typed().contains(&(13, "via fallback".to_string())));
        assert_eq!(driver.clicks(), vec![12, 30]);
    }

    #[tokio::test]
    async fn test_text_clamped_before_typing() {
        let driver = MockDriver::new();
        let config = fast_publish();
        let max = config.max_chars;
        script_compose(&driver, &config);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let long = "x".repeat(max + 40);
        let mut job = PublishJob::new(record(), long, Vec::new());
        publisher.post(&mut job).await.unwrap();

        let (_, typed) = driver
            .typed()
            .into_iter()
            .find(|(h, _)| *h == 11)
            .unwrap();
        assert_eq!(typed.chars().count(), max);
        assert!(typed.ends_with("..."));
    }

    #[tokio::test]
    async fn test_video_blocks_submit_until_processing_clears() {
        let driver = MockDriver::new();
        let config = fast_publish();
        script_compose(&driver, &config);
        driver.script(&config.file_input, vec![vec![20]]);
        // Progress indicator appears, shows twice more, then clears.
        driver.script(&config.progress_bar, vec![vec![40], vec![40], vec![]]);
        // Processing indicator stays up for two polls.
        driver.script(&config.processing, vec![vec![50], vec![50], vec![]]);

        let mut publisher = Publisher::new(&driver, fast_login(), config.clone());
        publisher.state = PublishState::Ready;

        let mut video = MediaAsset::new("42", MediaKind::Video, "http://cdn/v.mp4");
        video.local_path = Some(PathBuf::from("v.mp4"));
        let mut job = PublishJob::new(record(), "clip".into(), vec![video]);
        publisher.post(&mut job).await.unwrap();

        let events = driver.events();
        let last_processing_poll = events
            .iter()
            .rposition(|e| e == &format!("find:{}", config.processing))
            .unwrap();
        let submit_click = events.iter().position(|e| e == "click:30").unwrap();
        assert!(last_processing_poll < submit_click);
        assert_eq!(job.status, JobStatus::Posted);
    }

    #[tokio::test]
    async fn test_image_attach_uses_marker_fallback() {
        let driver = MockDriver::new();
        let config = fast_publish();
        script_compose(&driver, &config);
        driver.script(&config.file_input, vec![vec![20]]);
        // Progress indicator never appears; the attachment marker confirms.
        driver.script(&config.attachments, vec![vec![41]]);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let mut image = MediaAsset::new("42", MediaKind::Image, "http://cdn/i.jpg");
        image.local_path = Some(PathBuf::from("i.jpg"));
        let mut job = PublishJob::new(record(), "pic".into(), vec![image]);
        publisher.post(&mut job).await.unwrap();

        assert_eq!(job.status, JobStatus::Posted);
        assert!(driver.typed().iter().any(|(h, t)| *h == 20 && t.ends_with("i.jpg")));
    }

    #[tokio::test]
    async fn test_intercepted_submit_is_retried() {
        let driver = MockDriver::new();
        let config = fast_publish();
        script_compose(&driver, &config);
        driver.intercept_clicks(30, 2);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let mut job = PublishJob::new(record(), "persistent".into(), Vec::new());
        publisher.post(&mut job).await.unwrap();

        assert_eq!(job.status, JobStatus::Posted);
        assert_eq!(driver.clicks(), vec![10, 30]);
        // Each blocked click nudges the control back into the viewport.
        let scrolled = driver
            .events()
            .iter()
            .filter(|e| *e == "scrollview:30")
            .count();
        assert_eq!(scrolled, 2);
    }

    #[tokio::test]
    async fn test_upload_wait_is_keyed_per_asset() {
        let driver = MockDriver::new();
        let mut config = fast_publish();
        config.image_upload_ms = 111;
        config.video_upload_ms = 222;
        script_compose(&driver, &config);
        driver.script(&config.file_input, vec![vec![20]]);
        // One progress cycle per attachment.
        driver.script(
            &config.progress_bar,
            vec![vec![40], vec![], vec![40], vec![]],
        );

        let mut publisher = Publisher::new(&driver, fast_login(), config.clone());
        publisher.state = PublishState::Ready;

        let mut image = MediaAsset::new("42", MediaKind::Image, "http://cdn/i.jpg");
        image.local_path = Some(PathBuf::from("i.jpg"));
        let mut video = MediaAsset::new("42", MediaKind::Video, "http://cdn/v.mp4");
        video.local_path = Some(PathBuf::from("v.mp4"));
        let mut job = PublishJob::new(record(), "mixed".into(), vec![image, video]);
        publisher.post(&mut job).await.unwrap();

        assert_eq!(job.status, JobStatus::Posted);
        // The image waits its own budget even though the job carries a video.
        assert_eq!(
            driver.absent_waits(),
            vec![
                (config.progress_bar.clone(), Duration::from_millis(111)),
                (config.progress_bar.clone(), Duration::from_millis(222)),
            ]
        );
    }

    #[tokio::test]
    async fn test_rephrase_failure_still_composes_original() {
        struct Failing;
        #[async_trait::async_trait]
        impl crate::services::rephrase::Rephraser for Failing {
            async fn rephrase(&self, _text: &str) -> crate::error::Result<String> {
                Err(AppError::validation("model offline"))
            }
        }

        let driver = MockDriver::new();
        let config = fast_publish();
        script_compose(&driver, &config);

        let mut publisher = Publisher::new(&driver, fast_login(), config);
        publisher.state = PublishState::Ready;

        let text =
            crate::services::rephrase::rephrase_or_original(&Failing, "original words").await;
        let mut job = PublishJob::new(record(), text, Vec::new());
        publisher.post(&mut job).await.unwrap();

        assert_eq!(job.status, JobStatus::Posted);
        assert!(driver.typed().contains(&(11, "original words".to_string())));
    }

    #[tokio::test]
    async fn test_fault_snapshots_and_resets_to_ready() {
        let driver = MockDriver::new();
        // Nothing scripted: the compose surface never resolves.
        let mut publisher = Publisher::new(&driver, fast_login(), fast_publish());
        publisher.state = PublishState::Ready;

        let mut job = PublishJob::new(record(), "doomed".into(), Vec::new());
        let err = publisher.post(&mut job).await.unwrap_err();

        assert!(matches!(err, AppError::Publish { .. }));
        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(publisher.state(), PublishState::Ready);
        assert!(driver.events().contains(&"snapshot".to_string()));
    }
}
