//! Error types for the netkan-curse crate

use std::path::PathBuf;

use thiserror::Error;

/// Result type for netkan-curse operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for netkan-curse operations
///
/// Every variant names the URL or identifier that was being processed when
/// the failure happened, since the remote pages change without notice.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP client could not be built
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Transport failure (connect, DNS, timeout, body read)
    #[error("Network error fetching {url}: {source}")]
    Network {
        /// URL being requested
        url: String,
        /// Underlying client error
        #[source]
        source: reqwest::Error,
    },

    /// Remote answered with a status we cannot use
    #[error("Network error fetching {url}: HTTP {status}")]
    Status {
        /// URL being requested
        url: String,
        /// HTTP status code
        status: u16,
    },

    /// Redirect chain exceeded the configured hop limit
    #[error("Too many redirects ({hops}) resolving {url}")]
    RedirectLoop {
        /// Seed URL of the chain
        url: String,
        /// Number of redirects followed before giving up
        hops: usize,
    },

    /// Expected page structure was not found
    #[error("Scrape error on {url}: {reason}")]
    Scrape {
        /// Page that was being scraped
        url: String,
        /// What was missing
        reason: String,
    },

    /// The default version pointer matches no version
    #[error("Version {version_id} not found for mod {mod_id}")]
    VersionNotFound {
        /// Mod the lookup was made against
        mod_id: String,
        /// The dangling default version id
        version_id: u64,
    },

    /// Malformed numeric or version data
    #[error("Data integrity error in {context}: {message}")]
    DataIntegrity {
        /// Identifier or URL the data came from
        context: String,
        /// What was wrong with it
        message: String,
    },

    /// A URL could not be parsed or joined
    #[error("Invalid URL {url}: {source}")]
    InvalidUrl {
        /// Offending URL text
        url: String,
        /// Parse error
        #[source]
        source: url::ParseError,
    },

    /// The metadata reference cannot drive a lookup
    #[error("Invalid reference: {0}")]
    InvalidReference(String),

    /// The operation was cancelled while waiting on the network
    #[error("Cancelled while fetching {url}")]
    Cancelled {
        /// URL that was in flight
        url: String,
    },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A metadata file could not be read or written
    #[error("IO error on {}: {source}", path.display())]
    Io {
        /// File being accessed
        path: PathBuf,
        /// Underlying filesystem error
        #[source]
        source: std::io::Error,
    },

    /// A metadata file does not hold a valid document
    #[error("Invalid metadata in {}: {source}", path.display())]
    Document {
        /// File that was loaded
        path: PathBuf,
        /// Why the contents were rejected
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    pub(crate) fn network(url: impl ToString, source: reqwest::Error) -> Self {
        Error::Network {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn invalid_url(url: impl ToString, source: url::ParseError) -> Self {
        Error::InvalidUrl {
            url: url.to_string(),
            source,
        }
    }

    pub(crate) fn data_integrity(context: impl ToString, message: impl ToString) -> Self {
        Error::DataIntegrity {
            context: context.to_string(),
            message: message.to_string(),
        }
    }

    /// Whether the failure came from the network layer
    pub fn is_network(&self) -> bool {
        matches!(self, Error::Network { .. } | Error::Status { .. })
    }
}
