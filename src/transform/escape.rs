//! URL escaping for resource links

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;
use tracing::debug;

/// Characters that may not appear unescaped anywhere in a URI.
/// Reserved characters and `%` are left alone so existing escapes survive.
const URI_ESCAPE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'<')
    .add(b'>')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

static HAS_HTTP_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("scheme pattern is valid"));

/// Escape a URL taken from the host for use in metadata
///
/// Square brackets are escaped separately: the host hands them out
/// unescaped and general URI escaping leaves them alone as reserved
/// characters. URLs without an http(s) scheme get `http://`, since the
/// host's https support is unknown.
pub fn escape_url(url: Option<&str>) -> Option<String> {
    let url = url?;

    let mut escaped = utf8_percent_encode(url, URI_ESCAPE)
        .to_string()
        .replace('[', "%5B")
        .replace(']', "%5D");

    if !HAS_HTTP_SCHEME.is_match(&escaped) {
        escaped.insert_str(0, "http://");
    }

    debug!("Escaped {} to {}", url, escaped);
    Some(escaped)
}
