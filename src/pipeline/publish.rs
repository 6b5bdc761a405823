// src/pipeline/publish.rs

//! Publish phase: turn collected records into publish jobs and run them
//! through the state machine, one at a time.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::time::sleep;

use crate::driver::PageDriver;
use crate::error::Result;
use crate::models::{Config, JobStatus, MediaAsset, MediaKind, Post, PublishJob, PublishSummary};
use crate::services::media::find_media_for;
use crate::services::publisher::{Credentials, Publisher};
use crate::services::rephrase::{OllamaRephraser, rephrase_or_original};
use crate::utils::http::create_client;

/// Publish every record in order. Login failure aborts the run; per-job
/// faults are recorded and the run continues. The summary is always
/// complete, one entry per record.
pub async fn run_publish(
    driver: &dyn PageDriver,
    config: &Config,
    records: &[Post],
    creds: &Credentials,
    cancel: &Arc<AtomicBool>,
) -> Result<PublishSummary> {
    let mut publisher = Publisher::new(driver, config.login.clone(), config.publish.clone());
    publisher.login(creds).await?;

    let rephraser = if config.rephrase.enabled {
        Some(OllamaRephraser::new(
            create_client(&config.crawler)?,
            config.rephrase.clone(),
        ))
    } else {
        None
    };

    let media_root = Path::new(&config.media.root_dir);
    let mut summary = PublishSummary::default();

    for (index, record) in records.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            log::warn!("Publish cancelled; skipping remaining records");
            for remaining in &records[index..] {
                summary.record(&remaining.id, JobStatus::Pending);
            }
            break;
        }

        let text = match &rephraser {
            Some(rephraser) => rephrase_or_original(rephraser, &record.text).await,
            None => record.text.clone(),
        };

        let media = local_media(media_root, record, config.publish.max_attachments).await;
        if !record.has_text() && media.is_empty() {
            log::warn!("Record {} has no text or media, skipping", record.id);
            summary.record(&record.id, JobStatus::Pending);
            continue;
        }
        let mut job = PublishJob::new(record.clone(), text, media);

        match publisher.post(&mut job).await {
            Ok(()) => {
                if !config.publish.keep_media {
                    cleanup_media(&job).await;
                }
            }
            Err(e) => log::error!("Publish failed for record {}: {}", record.id, e),
        }
        summary.record(&record.id, job.status);

        // Posting in quick succession trips the surface's spam heuristics.
        if index + 1 < records.len() {
            sleep(config.publish.post_delay()).await;
        }
    }

    log::info!(
        "Publish finished: {} posted, {} failed, {} skipped",
        summary.posted,
        summary.failed,
        summary.skipped
    );
    Ok(summary)
}

/// Downloaded assets for a record, capped at the attachment limit.
async fn local_media(root: &Path, record: &Post, limit: usize) -> Vec<MediaAsset> {
    let paths = find_media_for(root, &record.handle, &record.id).await;
    paths
        .into_iter()
        .take(limit)
        .map(|path| {
            let mut asset = MediaAsset::new(&record.id, MediaKind::from_path(&path), "");
            asset.local_path = Some(path);
            asset
        })
        .collect()
}

/// Remove a job's downloaded assets after a successful post.
async fn cleanup_media(job: &PublishJob) {
    for asset in &job.media {
        let Some(path) = &asset.local_path else {
            continue;
        };
        match tokio::fs::remove_file(path).await {
            Ok(()) => log::debug!("Removed {}", path.display()),
            Err(e) => log::warn!("Could not remove {}: {}", path.display(), e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;

    fn fast_config(media_root: &Path) -> Config {
        let mut config = Config::default();
        config.login.field_wait_ms = 1;
        config.login.verify_wait_ms = 1;
        config.login.settle_ms = 1;
        config.publish.element_wait_ms = 1;
        config.publish.progress_appear_ms = 1;
        config.publish.image_upload_ms = 1;
        config.publish.video_upload_ms = 1;
        config.publish.attach_confirm_ms = 1;
        config.publish.video_extra_wait_ms = 1;
        config.publish.processing_poll_ms = 1;
        config.publish.processing_limit_ms = 100;
        config.publish.submit_retry_ms = 1;
        config.publish.settle_ms = 1;
        config.publish.delay_between_posts_secs = 0;
        config.publish.debug_dir = std::env::temp_dir()
            .join("refeed-test-debug")
            .to_string_lossy()
            .into_owned();
        config.media.root_dir = media_root.to_string_lossy().into_owned();
        config.rephrase.enabled = false;
        config
    }

    fn script_login(driver: &MockDriver, config: &Config) {
        driver.script(&config.login.username_input, vec![vec![1]]);
        driver.script(&config.login.password_input, vec![vec![2]]);
        driver.script(&config.login.home_marker, vec![vec![3]]);
    }

    fn creds() -> Credentials {
        Credentials {
            username: "alice".into(),
            password: "secret".into(),
            verification: None,
        }
    }

    fn record(id: &str) -> Post {
        Post {
            id: id.into(),
            author: "Alice".into(),
            handle: "alice".into(),
            text: format!("text {id}"),
            link: format!("https://x.test/alice/status/{id}"),
            image_urls: Vec::new(),
            poster_details: None,
        }
    }

    #[tokio::test]
    async fn test_publishes_each_record() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let driver = MockDriver::new();
        script_login(&driver, &config);
        driver.script(&config.publish.compose_button, vec![vec![10]]);
        driver.script(&config.publish.input_area, vec![vec![11]]);
        driver.script(&config.publish.submit_button, vec![vec![30]]);

        let records = vec![record("1"), record("2")];
        let cancel = Arc::new(AtomicBool::new(false));
        let summary = run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert_eq!(summary.posted, 2);
        assert_eq!(summary.failed, 0);
        assert_eq!(
            summary.statuses,
            vec![
                ("1".to_string(), JobStatus::Posted),
                ("2".to_string(), JobStatus::Posted),
            ]
        );
        let typed = driver.typed();
        assert!(typed.contains(&(11, "text 1".to_string())));
        assert!(typed.contains(&(11, "text 2".to_string())));
    }

    #[tokio::test]
    async fn test_failed_job_does_not_stop_the_run() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let driver = MockDriver::new();
        script_login(&driver, &config);
        // First job finds no compose surface; second does.
        driver.script(&config.publish.compose_button, vec![vec![], vec![10]]);
        driver.script(&config.publish.input_area, vec![vec![11]]);
        driver.script(&config.publish.submit_button, vec![vec![30]]);

        let records = vec![record("1"), record("2")];
        let cancel = Arc::new(AtomicBool::new(false));
        let summary = run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert_eq!(summary.failed, 1);
        assert_eq!(summary.posted, 1);
        assert_eq!(summary.statuses[0], ("1".to_string(), JobStatus::Failed));
        assert_eq!(summary.statuses[1], ("2".to_string(), JobStatus::Posted));
    }

    #[tokio::test]
    async fn test_media_attached_and_removed_after_post() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let owner_dir = tmp.path().join("alice");
        std::fs::create_dir_all(&owner_dir).unwrap();
        let image = owner_dir.join("a_post1.jpg");
        std::fs::write(&image, b"img").unwrap();

        let driver = MockDriver::new();
        script_login(&driver, &config);
        driver.script(&config.publish.compose_button, vec![vec![10]]);
        driver.script(&config.publish.input_area, vec![vec![11]]);
        driver.script(&config.publish.file_input, vec![vec![20]]);
        // Upload confirmed via the attachment marker.
        driver.script(&config.publish.attachments, vec![vec![41]]);
        driver.script(&config.publish.submit_button, vec![vec![30]]);

        let records = vec![record("1")];
        let cancel = Arc::new(AtomicBool::new(false));
        let summary = run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert_eq!(summary.posted, 1);
        assert!(
            driver
                .typed()
                .iter()
                .any(|(h, t)| *h == 20 && t.ends_with("a_post1.jpg"))
        );
        assert!(!image.exists());
    }

    #[tokio::test]
    async fn test_keep_media_retains_files() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = fast_config(tmp.path());
        config.publish.keep_media = true;
        let owner_dir = tmp.path().join("alice");
        std::fs::create_dir_all(&owner_dir).unwrap();
        let image = owner_dir.join("a_post1.jpg");
        std::fs::write(&image, b"img").unwrap();

        let driver = MockDriver::new();
        script_login(&driver, &config);
        driver.script(&config.publish.compose_button, vec![vec![10]]);
        driver.script(&config.publish.input_area, vec![vec![11]]);
        driver.script(&config.publish.file_input, vec![vec![20]]);
        driver.script(&config.publish.attachments, vec![vec![41]]);
        driver.script(&config.publish.submit_button, vec![vec![30]]);

        let records = vec![record("1")];
        let cancel = Arc::new(AtomicBool::new(false));
        run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert!(image.exists());
    }

    #[tokio::test]
    async fn test_cancellation_skips_remaining() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let driver = MockDriver::new();
        script_login(&driver, &config);

        let records = vec![record("1"), record("2")];
        let cancel = Arc::new(AtomicBool::new(true));
        let summary = run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert_eq!(summary.posted, 0);
        assert_eq!(summary.skipped, 2);
    }

    #[tokio::test]
    async fn test_empty_record_is_skipped() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let driver = MockDriver::new();
        script_login(&driver, &config);
        driver.script(&config.publish.compose_button, vec![vec![10]]);
        driver.script(&config.publish.input_area, vec![vec![11]]);
        driver.script(&config.publish.submit_button, vec![vec![30]]);

        let mut empty = record("1");
        empty.text = "   ".into();
        let records = vec![empty, record("2")];
        let cancel = Arc::new(AtomicBool::new(false));
        let summary = run_publish(&driver, &config, &records, &creds(), &cancel)
            .await
            .unwrap();

        assert_eq!(summary.skipped, 1);
        assert_eq!(summary.posted, 1);
        assert_eq!(summary.statuses[0].1, JobStatus::Pending);
    }

    #[tokio::test]
    async fn test_login_failure_aborts_run() {
        let tmp = tempfile::tempdir().unwrap();
        let config = fast_config(tmp.path());
        let driver = MockDriver::new();
        // No login selectors scripted at all.

        let records = vec![record("1")];
        let cancel = Arc::new(AtomicBool::new(false));
        let result = run_publish(&driver, &config, &records, &creds(), &cancel).await;

        assert!(result.is_err());
    }
}
