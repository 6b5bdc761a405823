// src/storage/local.rs

//! Local filesystem storage for collected records.
//!
//! Every write goes through a temp-file-and-rename so readers never observe
//! a half-written export.

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::Post;

/// Writes record exports under a root directory.
pub struct LocalStorage {
    root: PathBuf,
}

impl LocalStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Export collected records as a timestamped CSV. Returns the path of
    /// the written file.
    pub async fn write_posts_csv(&self, records: &[Post]) -> Result<PathBuf> {
        let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S");
        let name = format!("{}_posts_1-{}.csv", stamp, records.len());
        let path = self.root.join(name);

        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(["Name", "Handle", "Content", "Post Link"])?;
        for record in records {
            writer.write_record([
                record.author.as_str(),
                record.handle.as_str(),
                record.text.as_str(),
                record.link.as_str(),
            ])?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        self.write_atomic(&path, &bytes).await?;
        log::info!("Wrote {} records to {}", records.len(), path.display());
        Ok(path)
    }

    /// Load records back from a CSV export. Record ids are recovered from
    /// the permalink, falling back to a content fingerprint.
    pub fn read_posts_csv(path: &Path) -> Result<Vec<Post>> {
        let mut reader = csv::Reader::from_path(path)?;
        let mut records = Vec::new();
        for row in reader.records() {
            let row = row?;
            let author = row.get(0).unwrap_or_default().to_string();
            let handle = row.get(1).unwrap_or_default().to_string();
            let text = row.get(2).unwrap_or_default().to_string();
            let link = row.get(3).unwrap_or_default().to_string();
            let id = crate::utils::extract_status_id(&link)
                .unwrap_or_else(|| crate::pipeline::dedup::fingerprint(&author, &text));
            records.push(Post {
                id,
                author,
                handle,
                text,
                link,
                image_urls: Vec::new(),
                poster_details: None,
            });
        }
        Ok(records)
    }

    /// Newest CSV export under the root, by file name. Exports embed a
    /// sortable timestamp so lexical order is chronological.
    pub fn latest_export(&self) -> Option<PathBuf> {
        let entries = std::fs::read_dir(&self.root).ok()?;
        entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "csv"))
            .max()
    }

    /// Save a diagnostic snapshot under the root, timestamped so repeated
    /// faults never overwrite each other.
    pub async fn write_snapshot(&self, label: &str, bytes: &[u8]) -> Result<PathBuf> {
        let name = format!(
            "{}_{}.png",
            crate::utils::sanitize_filename(label),
            chrono::Local::now().format("%Y-%m-%d_%H-%M-%S"),
        );
        let path = self.root.join(name);
        self.write_atomic(&path, bytes).await?;
        Ok(path)
    }

    /// Write bytes to a temporary file, then rename into place.
    async fn write_atomic(&self, path: &Path, bytes: &[u8]) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
