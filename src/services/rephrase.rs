// src/services/rephrase.rs

//! Rephrase collaborator.
//!
//! The rephraser is fail-open by contract: any failure (connection refused,
//! bad status, unexpected payload) yields the original text so a publish job
//! is never lost to a flaky local model server.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;
use crate::models::RephraseConfig;

/// A text-rephrasing capability.
#[async_trait]
pub trait Rephraser: Send + Sync {
    async fn rephrase(&self, text: &str) -> Result<String>;
}

/// Rephrase `text`, degrading to the original on any failure.
pub async fn rephrase_or_original(rephraser: &dyn Rephraser, text: &str) -> String {
    match rephraser.rephrase(text).await {
        Ok(rephrased) if !rephrased.trim().is_empty() => rephrased,
        Ok(_) => {
            log::warn!("Rephraser returned empty text, keeping original");
            text.to_string()
        }
        Err(e) => {
            log::warn!("Rephrasing failed, keeping original: {}", e);
            text.to_string()
        }
    }
}

/// Clamp text to at most `max` graphemes, ellipsized.
pub fn clamp_text(text: &str, max: usize) -> String {
    let graphemes: Vec<&str> = text.graphemes(true).collect();
    if graphemes.len() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(3);
    let mut out: String = graphemes[..keep].concat();
    out.push_str("...");
    out
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: String,
    stream: bool,
}

#[derive(Deserialize)]
struct GenerateResponse {
    response: String,
}

/// Rephraser backed by a local Ollama-style generation endpoint.
pub struct OllamaRephraser {
    client: reqwest::Client,
    config: RephraseConfig,
}

impl OllamaRephraser {
    pub fn new(client: reqwest::Client, config: RephraseConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Rephraser for OllamaRephraser {
    async fn rephrase(&self, text: &str) -> Result<String> {
        let request = GenerateRequest {
            model: &self.config.model,
            prompt: format!("{}{}", self.config.prompt, text),
            stream: false,
        };

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&request)
            .send()
            .await?
            .error_for_status()?;

        let body: GenerateResponse = response.json().await?;
        Ok(body.response.trim().to_string())
    }
}
