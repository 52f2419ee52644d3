//! Conversational augmentation provider abstraction.
//!
//! Retrieval ends at ranked snippets; optionally, a text-generation
//! service can turn those snippets into a conversational answer. The
//! capability is injected at the caller's boundary — the retrieval engine
//! never sees it, and its absence only changes the shape of the reply.
//!
//! Implementations:
//! - **[`DisabledAugmentor`]** — reports itself unavailable; callers fall
//!   back to the extractive reply.
//! - **[`OpenAiAugmentor`]** — chat-completions API with retry/backoff.
//!
//! # Retry Strategy
//!
//! Same contract as transient-API callers elsewhere in the stack:
//! HTTP 429 and 5xx retry with exponential backoff (1s, 2s, 4s, …,
//! capped at 2^5), other 4xx fail immediately, network errors retry.

use std::time::Duration;

use anyhow::{bail, Result};
use async_trait::async_trait;

use crate::config::AugmentConfig;
use crate::models::SearchHit;

/// A text-generation collaborator that can ground an answer in the
/// engine's top snippets.
#[async_trait]
pub trait Augmentor: Send + Sync {
    /// Whether calls to [`Augmentor::answer`] can succeed at all.
    fn is_enabled(&self) -> bool;

    /// Produce a conversational answer to `question` grounded in
    /// `snippets`. Callers must treat failure as non-fatal and degrade
    /// to the extractive reply.
    async fn answer(&self, question: &str, snippets: &[SearchHit]) -> Result<String>;
}

/// No-op augmentor used when `[augment] provider = "disabled"`.
pub struct DisabledAugmentor;

#[async_trait]
impl Augmentor for DisabledAugmentor {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn answer(&self, _question: &str, _snippets: &[SearchHit]) -> Result<String> {
        bail!("Augmentation provider is disabled")
    }
}

/// Chat-completions augmentor using the OpenAI API.
///
/// Requires the `OPENAI_API_KEY` environment variable.
pub struct OpenAiAugmentor {
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

impl OpenAiAugmentor {
    /// Create a provider from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `model` is unset or `OPENAI_API_KEY` is not
    /// in the environment.
    pub fn new(config: &AugmentConfig) -> Result<Self> {
        let model = config
            .model
            .clone()
            .ok_or_else(|| anyhow::anyhow!("augment.model required for OpenAI provider"))?;
        if std::env::var("OPENAI_API_KEY").is_err() {
            bail!("OPENAI_API_KEY environment variable not set");
        }
        Ok(Self {
            model,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        })
    }
}

#[async_trait]
impl Augmentor for OpenAiAugmentor {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn answer(&self, question: &str, snippets: &[SearchHit]) -> Result<String> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow::anyhow!("OPENAI_API_KEY not set"))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.timeout_secs))
            .build()?;

        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "Answer using only the provided document excerpts. \
                                If they do not contain the answer, say so."
                },
                {
                    "role": "user",
                    "content": build_prompt(question, snippets),
                },
            ],
        });

        let mut last_err = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                // Exponential backoff: 1s, 2s, 4s, 8s, ...
                let delay = Duration::from_secs(1 << (attempt - 1).min(5));
                tokio::time::sleep(delay).await;
            }

            let resp = client
                .post("https://api.openai.com/v1/chat/completions")
                .header("Authorization", format!("Bearer {}", api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await;

            match resp {
                Ok(response) => {
                    let status = response.status();

                    if status.is_success() {
                        let json: serde_json::Value = response.json().await?;
                        return parse_chat_response(&json);
                    }

                    // Rate limited or server error — retry
                    if status.as_u16() == 429 || status.is_server_error() {
                        let body_text = response.text().await.unwrap_or_default();
                        last_err =
                            Some(anyhow::anyhow!("OpenAI API error {}: {}", status, body_text));
                        continue;
                    }

                    // Client error (not 429) — don't retry
                    let body_text = response.text().await.unwrap_or_default();
                    bail!("OpenAI API error {}: {}", status, body_text);
                }
                Err(e) => {
                    last_err = Some(e.into());
                    continue;
                }
            }
        }

        Err(last_err.unwrap_or_else(|| anyhow::anyhow!("Augmentation failed after retries")))
    }
}

/// Assemble the grounding prompt: the question plus each snippet with
/// its document (and page, when known) attribution.
fn build_prompt(question: &str, snippets: &[SearchHit]) -> String {
    let mut prompt = String::new();
    prompt.push_str("Question: ");
    prompt.push_str(question);
    prompt.push_str("\n\nDocument excerpts:\n");
    for hit in snippets {
        match hit.page_number {
            Some(page) => {
                prompt.push_str(&format!("- [{} p.{}] {}\n", hit.document_name, page, hit.snippet))
            }
            None => prompt.push_str(&format!("- [{}] {}\n", hit.document_name, hit.snippet)),
        }
    }
    prompt
}

/// Parse the chat-completions response JSON, returning the first
/// choice's message content.
fn parse_chat_response(json: &serde_json::Value) -> Result<String> {
    json.get("choices")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("message"))
        .and_then(|m| m.get("content"))
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("Invalid OpenAI response: missing message content"))
}

/// Create the appropriate [`Augmentor`] based on configuration.
pub fn create_augmentor(config: &AugmentConfig) -> Result<Box<dyn Augmentor>> {
    match config.provider.as_str() {
        "disabled" => Ok(Box::new(DisabledAugmentor)),
        "openai" => Ok(Box::new(OpenAiAugmentor::new(config)?)),
        other => bail!("Unknown augment provider: {}", other),
    }
}
