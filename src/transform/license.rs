//! License string normalization

/// Map the host's license labels to SPDX-style identifiers
///
/// Only exact matches are rewritten. `BSD` and `LGPL` carry no version on
/// the host, so they pass through like any unknown label.
pub fn normalize(raw: &str) -> String {
    let license = raw.trim();
    match license {
        "GPLv2" => "GPL-2.0",
        "GPLv3" => "GPL-3.0",
        other => other,
    }
    .to_string()
}
