//! The text transform gateway.
//!
//! [`Gateway::transform`] always resolves to usable text. A missing
//! credential degrades to passthrough and any backend failure falls back to
//! the input; neither is ever surfaced to the caller.

pub mod gemini;
pub mod mock;

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::consts::REWRITE_CHAR_LIMIT;
use gemini::GeminiRewriter;

/// Why a rewrite attempt produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("service returned no text")]
    Empty,
}

/// A remote text-rewriting backend.
#[async_trait]
pub trait Rewriter: Send + Sync {
    /// Short label for logs and the banner.
    fn name(&self) -> &str;

    async fn rewrite(&self, input: &str) -> Result<String, GatewayError>;
}

/// Instruction sent along with the user's text.
pub fn build_prompt(input: &str) -> String {
    format!(
        "Reword the following text to sound like a concise, retro-futuristic pager message \
         or a cryptic noir typewriter note. Keep it under {REWRITE_CHAR_LIMIT} characters. \
         Do not add quotes. Text: \"{input}\""
    )
}

/// Best-effort wrapper around an optional [`Rewriter`].
#[derive(Clone)]
pub struct Gateway {
    rewriter: Option<Arc<dyn Rewriter>>,
}

impl Gateway {
    pub fn new(rewriter: Arc<dyn Rewriter>) -> Self {
        Self {
            rewriter: Some(rewriter),
        }
    }

    /// No backend at all: every transform returns its input.
    pub fn passthrough() -> Self {
        Self { rewriter: None }
    }

    /// Wire up the Gemini backend if a credential is configured.
    /// Never fails: a missing key only logs a warning.
    pub fn from_config(config: &Config) -> Self {
        match &config.api_key {
            Some(key) => Self::new(Arc::new(GeminiRewriter::new(
                key.clone(),
                config.model.clone(),
                config.endpoint.clone(),
            ))),
            None => {
                warn!(
                    env = crate::consts::API_KEY_ENV,
                    "no API key configured, fix & print will pass text through"
                );
                Self::passthrough()
            }
        }
    }

    pub fn is_configured(&self) -> bool {
        self.rewriter.is_some()
    }

    /// Backend label, if any.
    pub fn backend(&self) -> Option<&str> {
        self.rewriter.as_deref().map(|r| r.name())
    }

    /// Rewrite `input`, or hand it back unchanged.
    pub async fn transform(&self, input: &str) -> String {
        let Some(rewriter) = &self.rewriter else {
            warn!("API key is missing, returning original text");
            return input.to_string();
        };

        match rewriter.rewrite(input).await {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    error!(
                        backend = rewriter.name(),
                        error = %GatewayError::Empty,
                        "rewrite failed, returning original text"
                    );
                    input.to_string()
                } else {
                    debug!(backend = rewriter.name(), chars = text.chars().count(), "rewrite ok");
                    text.to_string()
                }
            }
            Err(e) => {
                error!(
                    backend = rewriter.name(),
                    error = %e,
                    "rewrite failed, returning original text"
                );
                input.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Gateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gateway")
            .field("backend", &self.backend())
            .finish()
    }
}
