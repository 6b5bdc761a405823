// src/models/job.rs

//! Publish jobs and run summaries.

use super::{MediaAsset, MediaKind, Post};

/// Terminal outcome of one publish job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Pending,
    Posted,
    Failed,
}

/// One unit of work for the publish phase: a record, its publish text, and
/// the media to attach. Jobs are never retried across runs.
#[derive(Debug, Clone)]
pub struct PublishJob {
    pub record: Post,
    /// Text to publish; the original text unless rephrasing succeeded
    pub text: String,
    pub media: Vec<MediaAsset>,
    pub status: JobStatus,
}

impl PublishJob {
    pub fn new(record: Post, text: String, media: Vec<MediaAsset>) -> Self {
        Self {
            record,
            text,
            media,
            status: JobStatus::Pending,
        }
    }

    /// Whether any attached asset is a video (drives the longer upload waits).
    pub fn has_video(&self) -> bool {
        self.media.iter().any(|m| m.kind == MediaKind::Video)
    }
}

/// Per-run summary of the publish phase. Always returned, even when every
/// job failed.
#[derive(Debug, Default)]
pub struct PublishSummary {
    pub posted: usize,
    pub failed: usize,
    pub skipped: usize,
    /// Final status per job, in submission order
    pub statuses: Vec<(String, JobStatus)>,
}

impl PublishSummary {
    pub fn record(&mut self, id: &str, status: JobStatus) {
        match status {
            JobStatus::Posted => self.posted += 1,
            JobStatus::Failed => self.failed += 1,
            JobStatus::Pending => self.skipped += 1,
        }
        self.statuses.push((id.to_string(), status));
    }

    pub fn total(&self) -> usize {
        self.statuses.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn post() -> Post {
        Post {
            id: "1".into(),
            author: "A".into(),
            handle: "a".into(),
            text: "t".into(),
            link: String::new(),
            image_urls: Vec::new(),
            poster_details: None,
        }
    }

    #[test]
    fn test_has_video() {
        let mut image = MediaAsset::new("1", MediaKind::Image, "http://x/i.jpg");
        image.local_path = Some(PathBuf::from("i.jpg"));
        let job = PublishJob::new(post(), "t".into(), vec![image.clone()]);
        assert!(!job.has_video());

        let video = MediaAsset::new("1", MediaKind::Video, "http://x/v.mp4");
        let job = PublishJob::new(post(), "t".into(), vec![image, video]);
        assert!(job.has_video());
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = PublishSummary::default();
        summary.record("1", JobStatus::Posted);
        summary.record("2", JobStatus::Failed);
        summary.record("3", JobStatus::Posted);
        assert_eq!(summary.posted, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.total(), 3);
    }
}
