//! Session configuration.
//!
//! Built from defaults in [`crate::consts`], the `GEMINI_API_KEY`
//! environment variable, and command-line overrides. Nothing is persisted.

use std::time::Duration;

use anyhow::{Result, bail};

use crate::consts::{
    API_KEY_ENV, DEFAULT_ENDPOINT, DEFAULT_MODEL, DEFAULT_SURFACE_HEIGHT, DEFAULT_SURFACE_WIDTH,
    REVEAL_INTERVAL,
};
use crate::surface::Bounds;

#[derive(Debug, Clone)]
pub struct Config {
    /// Credential for the rewrite service. `None` means passthrough.
    pub api_key: Option<String>,
    pub model: String,
    pub endpoint: String,
    /// Size of the surface cards land on.
    pub surface: Bounds,
    /// Time between revealed characters.
    pub reveal_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            surface: Bounds::new(DEFAULT_SURFACE_WIDTH, DEFAULT_SURFACE_HEIGHT),
            reveal_interval: REVEAL_INTERVAL,
        }
    }
}

impl Config {
    /// Defaults plus the credential from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults plus the credential from an arbitrary lookup.
    /// An empty or whitespace-only value counts as absent.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_key = lookup(API_KEY_ENV)
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Override the credential. Empty values are ignored.
    pub fn with_api_key(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.map(|k| k.trim().to_string()).filter(|k| !k.is_empty()) {
            self.api_key = Some(key);
        }
        self
    }

    pub fn with_model(mut self, model: Option<String>) -> Self {
        if let Some(model) = model {
            self.model = model;
        }
        self
    }

    pub fn with_surface(mut self, width: f64, height: f64) -> Self {
        self.surface = Bounds { width, height };
        self
    }

    pub fn with_reveal_interval(mut self, interval: Duration) -> Self {
        self.reveal_interval = interval;
        self
    }

    /// Reject settings the desk cannot work with.
    pub fn validate(&self) -> Result<()> {
        let Bounds { width, height } = self.surface;
        if !(width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0) {
            bail!(
                "surface must be positive and finite, got {}x{}",
                self.surface.width,
                self.surface.height
            );
        }
        if self.reveal_interval.is_zero() {
            bail!("reveal interval must be greater than zero");
        }
        if self.model.trim().is_empty() {
            bail!("model name must not be empty");
        }
        Ok(())
    }

    /// Human-readable uplink state for the banner.
    pub fn uplink_label(&self) -> String {
        match self.api_key {
            Some(_) => format!("{} ✓", self.model),
            None => "offline (passthrough)".to_string(),
        }
    }
}
