//! Latest-file extraction from the project's file listing
//!
//! The listing has no API, so the download link is located by its position
//! in the page. The path lives in [`LATEST_FILE_PATH`] so a layout change on
//! the host only touches this file.

use scraper::{Html, Selector};
use tracing::{debug, warn};
use url::Url;

use crate::error::{Error, Result};

/// Structural path to the download anchor of the newest file
///
/// Each step is a direct child of the previous one: the second cell of the
/// first row in the files table, then the second nested div's anchor.
pub const LATEST_FILE_PATH: &[&str] = &[
    "#content",
    "section",
    "div",
    "div",
    "div:nth-of-type(2)",
    "table",
    "tbody",
    "tr:nth-of-type(1)",
    "td:nth-of-type(2)",
    "div",
    "div:nth-of-type(2)",
    "a",
];

/// Compile a sequence of child steps into a single selector
pub fn path_selector(steps: &[&str]) -> std::result::Result<Selector, String> {
    let expr = steps.join(" > ");
    Selector::parse(&expr).map_err(|e| format!("invalid selector path {:?}: {:?}", expr, e))
}

/// Extract the href of the latest file's download anchor
///
/// `page_url` is only used to attribute failures.
pub fn extract_latest_download_href(html: &str, page_url: &Url) -> Result<String> {
    extract_href_at(html, page_url, LATEST_FILE_PATH)
}

fn extract_href_at(html: &str, page_url: &Url, steps: &[&str]) -> Result<String> {
    let scrape_error = |reason: String| Error::Scrape {
        url: page_url.to_string(),
        reason,
    };

    let selector = path_selector(steps).map_err(scrape_error)?;
    let document = Html::parse_document(html);

    let Some(anchor) = document.select(&selector).next() else {
        warn!("No latest file row found on {}", page_url);
        return Err(scrape_error(
            "latest file row not found; page layout changed or no files".to_string(),
        ));
    };

    let href = anchor
        .value()
        .attr("href")
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .ok_or_else(|| scrape_error("latest file anchor has no href".to_string()))?;

    debug!("Latest file href on {} is {}", page_url, href);
    Ok(href.to_string())
}
