//! # Curse Configuration Module
//!
//! Read-only settings shared by every lookup against the mod host: where the
//! project pages live and how the HTTP client behaves. Uses a builder
//! pattern, starting from defaults that point at the public host.

use std::time::Duration;

use url::Url;

use crate::error::{Error, Result};
use crate::http::HttpOptions;

/// Base URL of the project pages on the public host
pub const DEFAULT_BASE_URL: &str = "http://kerbal.curseforge.com/projects/";

/// Configuration for the Curse client
#[derive(Debug, Clone)]
pub struct CurseConfig {
    /// Base URL that mod identifiers are appended to
    pub base_url: String,

    /// Options for the underlying HTTP client
    pub http: HttpOptions,
}

impl Default for CurseConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpOptions::default(),
        }
    }
}

impl CurseConfig {
    /// Create a new builder
    pub fn builder() -> CurseConfigBuilder {
        CurseConfigBuilder::new()
    }

    /// URL of the project page for an already-trimmed mod identifier
    pub fn project_url(&self, mod_id: &str) -> Result<Url> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), mod_id);
        Url::parse(&raw).map_err(|e| Error::invalid_url(&raw, e))
    }
}

/// Builder for CurseConfig
#[derive(Debug, Default)]
pub struct CurseConfigBuilder {
    config: CurseConfig,
}

impl CurseConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: CurseConfig::default(),
        }
    }

    /// Set the base URL of project pages
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.base_url = base_url.into();
        self
    }

    /// Set the user agent to use for requests
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.http.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.http.timeout = timeout;
        self
    }

    /// Set the maximum number of redirects to follow
    pub fn max_redirects(mut self, max_redirects: usize) -> Self {
        self.config.http.max_redirects = max_redirects;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CurseConfig {
        self.config
    }
}
