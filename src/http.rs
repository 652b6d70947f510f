//! HTTP client implementation for the netkan-curse crate
//!
//! This module provides the client used to talk to the mod host. It never
//! follows redirects on its own: `resolve_redirect` walks `Location` headers
//! one hop at a time so the terminal URL can be observed, and
//! `download_text` treats anything but a 2xx as a failure.

use crate::error::{Error, Result};
use reqwest::header::LOCATION;
use reqwest::{Client as ReqwestClient, Response};
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info_span, instrument, warn};
use url::Url;

/// Default timeout for HTTP requests in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default number of redirects followed before giving up
pub const DEFAULT_MAX_REDIRECTS: usize = 20;

/// Options for building an [`HttpClient`]
#[derive(Debug, Clone)]
pub struct HttpOptions {
    /// User agent sent with every request
    pub user_agent: String,

    /// Per-request timeout
    pub timeout: Duration,

    /// Maximum redirects followed by `resolve_redirect`
    pub max_redirects: usize,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: format!("netkan-curse/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_redirects: DEFAULT_MAX_REDIRECTS,
        }
    }
}

/// HTTP client for fetching pages from the mod host
#[derive(Clone, Debug)]
pub struct HttpClient {
    /// The underlying reqwest client, with redirects disabled
    client: ReqwestClient,

    /// Maximum redirects followed per resolution
    max_redirects: usize,

    /// Span every request is recorded under
    span: Span,
}

impl HttpClient {
    /// Create a new HTTP client with the given options
    pub fn new(options: &HttpOptions) -> Result<Self> {
        Self::with_span(options, info_span!("http"))
    }

    /// Create a new HTTP client whose events are recorded under `span`
    pub fn with_span(options: &HttpOptions, span: Span) -> Result<Self> {
        let client = ReqwestClient::builder()
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(options.user_agent.clone())
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            client,
            max_redirects: options.max_redirects,
            span,
        })
    }

    /// Follow `Location` headers from `seed` until a response without one
    ///
    /// Returns the URL of the request whose response had no `Location`.
    #[instrument(parent = &self.span, skip_all, fields(seed = %seed), level = "debug")]
    pub async fn resolve_redirect(&self, seed: &Url, cancel: &CancellationToken) -> Result<Url> {
        let mut current = seed.clone();
        let mut hops = 0;

        loop {
            let response = self.send(&current, cancel).await?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty());

            // Release the connection before the next hop.
            self.drain(&current, response, cancel).await?;

            let Some(location) = location else {
                if status.is_client_error() || status.is_server_error() {
                    warn!("Redirect chain ended in HTTP {} at {}", status, current);
                    return Err(Error::Status {
                        url: current.to_string(),
                        status: status.as_u16(),
                    });
                }
                debug!("Resolved {} to {} after {} redirects", seed, current, hops);
                return Ok(current);
            };

            if hops >= self.max_redirects {
                warn!("Giving up on {} after {} redirects", seed, hops);
                return Err(Error::RedirectLoop {
                    url: seed.to_string(),
                    hops,
                });
            }

            let next = current
                .join(&location)
                .map_err(|e| Error::invalid_url(&location, e))?;
            debug!("Redirect {} -> {}", current, next);
            current = next;
            hops += 1;
        }
    }

    /// GET `url` and return its body as text
    #[instrument(parent = &self.span, skip_all, fields(url = %url), level = "debug")]
    pub async fn download_text(&self, url: &Url, cancel: &CancellationToken) -> Result<String> {
        let response = self.send(url, cancel).await?;
        let status = response.status();

        if !status.is_success() {
            self.drain(url, response, cancel).await?;
            warn!("HTTP {} fetching {}", status, url);
            return Err(Error::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = cancellable(url, cancel, response.text()).await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    async fn send(&self, url: &Url, cancel: &CancellationToken) -> Result<Response> {
        debug!("Sending GET request to {}", url);
        cancellable(url, cancel, self.client.get(url.clone()).send()).await
    }

    async fn drain(&self, url: &Url, response: Response, cancel: &CancellationToken) -> Result<()> {
        cancellable(url, cancel, response.bytes()).await.map(|_| ())
    }
}

/// Race a request future against the cancellation token
async fn cancellable<T>(
    url: &Url,
    cancel: &CancellationToken,
    fut: impl Future<Output = reqwest::Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Error::Cancelled { url: url.to_string() }),
        result = fut => result.map_err(|e| Error::network(url, e)),
    }
}
