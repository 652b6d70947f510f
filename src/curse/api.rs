//! Resolution of mod identifiers into [`ModRecord`]s

use std::future::Future;

use tokio_util::sync::CancellationToken;
use tracing::{Span, debug, info, info_span, instrument};
use url::Url;

use crate::curse::config::CurseConfig;
use crate::curse::extract::extract_latest_download_href;
use crate::curse::model::{ModRecord, ModVersion};
use crate::error::{Error, Result};
use crate::http::HttpClient;

/// Suffix appended to a canonical page to reach its file listing
const FILES_SUFFIX: &str = "/files/";

/// Anything that can turn a mod identifier into a [`ModRecord`]
pub trait ModSource {
    /// Look up a mod by its identifier on the host
    fn get_mod(
        &self,
        mod_id: &str,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<ModRecord>> + Send;
}

/// Client for the mod host's project pages
#[derive(Clone, Debug)]
pub struct CurseApi {
    http: HttpClient,
    config: CurseConfig,
    span: Span,
}

impl CurseApi {
    /// Create a new client from configuration
    pub fn new(config: CurseConfig) -> Result<Self> {
        Self::with_span(config, info_span!("curse_api"))
    }

    /// Create a new client whose events are recorded under `span`
    pub fn with_span(config: CurseConfig, span: Span) -> Result<Self> {
        let http = HttpClient::with_span(&config.http, info_span!(parent: &span, "http"))?;
        Ok(Self { http, config, span })
    }

    /// Resolve a mod identifier to its canonical page and file listing
    ///
    /// Returns `(page_url, files_url)`. The page URL is the end of the
    /// redirect chain with query and fragment removed.
    #[instrument(parent = &self.span, skip_all, fields(mod_id = %mod_id))]
    pub async fn resolve_pages(
        &self,
        mod_id: &str,
        cancel: &CancellationToken,
    ) -> Result<(Url, Url)> {
        let trimmed = mod_id.trim_matches('/');
        if trimmed.is_empty() {
            return Err(Error::InvalidReference(format!("mod id {:?} is empty", mod_id)));
        }

        let seed = self.config.project_url(trimmed)?;
        let mut page_url = self.http.resolve_redirect(&seed, cancel).await?;
        page_url.set_query(None);
        page_url.set_fragment(None);

        let raw = format!("{}{}", page_url.as_str().trim_end_matches('/'), FILES_SUFFIX);
        let files_url = Url::parse(&raw).map_err(|e| Error::invalid_url(&raw, e))?;

        debug!("Mod {} lives at {}, files at {}", trimmed, page_url, files_url);
        Ok((page_url, files_url))
    }

    /// Fetch the mod and build a record around its latest file
    #[instrument(parent = &self.span, skip_all, fields(mod_id = %mod_id))]
    pub async fn get_mod(&self, mod_id: &str, cancel: &CancellationToken) -> Result<ModRecord> {
        let (page_url, files_url) = self.resolve_pages(mod_id, cancel).await?;

        info!("Calling {}", files_url);
        let listing = self.http.download_text(&files_url, cancel).await?;

        let href = extract_latest_download_href(&listing, &files_url)?;
        let download_url = files_url
            .join(&href)
            .map_err(|e| Error::invalid_url(&href, e))?;

        // Confirms the file page exists; nothing on it is parsed.
        let file_page = self.http.download_text(&download_url, cancel).await?;
        debug!("Latest file page {} is {} bytes", download_url, file_page.len());

        let file_id = file_id(&download_url)?;
        let download_text = absolute_text(&files_url, &href)?;
        ModRecord::builder(page_url)
            .version(ModVersion::scraped(file_id, download_url, download_text))
            .default_version_id(file_id)
            .build()
    }
}

impl ModSource for CurseApi {
    async fn get_mod(&self, mod_id: &str, cancel: &CancellationToken) -> Result<ModRecord> {
        CurseApi::get_mod(self, mod_id, cancel).await
    }
}

/// `href` made absolute against `base` without re-encoding it
///
/// [`Url::join`] percent-encodes spaces and non-ASCII text; the host's own
/// spelling is kept here by prefixing the missing scheme, origin or directory.
fn absolute_text(base: &Url, href: &str) -> Result<String> {
    if Url::parse(href).is_ok() {
        return Ok(href.to_string());
    }
    if href.starts_with("//") {
        return Ok(format!("{}:{}", base.scheme(), href));
    }
    if href.starts_with('/') {
        return Ok(format!("{}{}", base.origin().ascii_serialization(), href));
    }
    let dir = base.join(".").map_err(|e| Error::invalid_url(base, e))?;
    Ok(format!("{}{}", dir, href))
}

/// File id from the last path segment, or 0 if that segment is not numeric
fn file_id(url: &Url) -> Result<u64> {
    let last = url
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .unwrap_or_default();

    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(0);
    }

    last.parse::<u64>()
        .map_err(|e| Error::data_integrity(url.as_str(), format!("file id {}: {}", last, e)))
}
