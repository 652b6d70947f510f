//! Data model for mods scraped from the host
//!
//! A [`ModRecord`] is built once per lookup and never changes afterwards.
//! Fields the host does not expose are `None` rather than placeholder text.

use std::fmt;
use std::str::FromStr;

use url::Url;

use crate::error::{Error, Result};

/// Game versions a release targets: `any`, or one to three dotted numbers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameVersion {
    /// Compatible with every game version
    Any,

    /// A specific version such as `1.0.5`
    Numbered(Vec<u32>),
}

impl FromStr for GameVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s == "any" {
            return Ok(GameVersion::Any);
        }

        let parts = s
            .split('.')
            .map(|part| part.parse::<u32>())
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::data_integrity("game version", format!("{:?}: {}", s, e)))?;

        if parts.len() > 3 {
            return Err(Error::data_integrity(
                "game version",
                format!("{:?} has more than three components", s),
            ));
        }

        Ok(GameVersion::Numbered(parts))
    }
}

impl fmt::Display for GameVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameVersion::Any => f.write_str("any"),
            GameVersion::Numbered(parts) => {
                let joined = parts
                    .iter()
                    .map(u32::to_string)
                    .collect::<Vec<_>>()
                    .join(".");
                f.write_str(&joined)
            }
        }
    }
}

/// Version string of a mod release as its author writes it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FriendlyVersion(String);

impl FromStr for FriendlyVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() || s.contains(char::is_whitespace) {
            return Err(Error::data_integrity(
                "mod version",
                format!("{:?} is not a valid version", s),
            ));
        }
        Ok(FriendlyVersion(s.to_string()))
    }
}

impl fmt::Display for FriendlyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One released file of a mod
#[derive(Debug, Clone, PartialEq)]
pub struct ModVersion {
    /// Host-assigned file id
    pub id: u64,

    /// Game version the release targets, if known
    pub target_game_version: Option<GameVersion>,

    /// Release notes, if known
    pub changelog: Option<String>,

    /// Absolute URL of the release's download
    pub download_url: Url,

    /// The download location as the host wrote it, made absolute but not
    /// re-encoded
    pub download_text: String,

    /// Version string of the release, if known
    pub friendly_version: Option<FriendlyVersion>,
}

impl ModVersion {
    /// A version where only the id and download location are known
    pub fn new(id: u64, download_url: Url) -> Self {
        let download_text = download_url.to_string();
        Self::scraped(id, download_url, download_text)
    }

    /// Like [`ModVersion::new`], keeping the host's own spelling of the URL
    pub fn scraped(id: u64, download_url: Url, download_text: impl Into<String>) -> Self {
        Self {
            id,
            target_game_version: None,
            changelog: None,
            download_url,
            download_text: download_text.into(),
            friendly_version: None,
        }
    }
}

/// A mod as resolved from the host
#[derive(Debug, Clone, PartialEq)]
pub struct ModRecord {
    id: u64,
    license: Option<String>,
    name: Option<String>,
    short_description: Option<String>,
    author: Option<String>,
    website: Option<String>,
    source_code: Option<String>,
    background: Option<String>,
    default_version_id: u64,
    versions: Vec<ModVersion>,
    page_url: Url,
}

impl ModRecord {
    /// Start building a record for the mod whose canonical page is `page_url`
    pub fn builder(page_url: Url) -> ModRecordBuilder {
        ModRecordBuilder::new(page_url)
    }

    /// Rebuild from this record, e.g. to layer in fields from another source
    pub fn to_builder(&self) -> ModRecordBuilder {
        ModRecordBuilder {
            record: self.clone(),
        }
    }

    /// The version the author marked as default
    ///
    /// Never falls back to list order: a dangling pointer is an error.
    pub fn latest(&self) -> Result<&ModVersion> {
        self.versions
            .iter()
            .find(|v| v.id == self.default_version_id)
            .ok_or_else(|| Error::VersionNotFound {
                mod_id: self.page_url.to_string(),
                version_id: self.default_version_id,
            })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn license(&self) -> Option<&str> {
        self.license.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn short_description(&self) -> Option<&str> {
        self.short_description.as_deref()
    }

    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn source_code(&self) -> Option<&str> {
        self.source_code.as_deref()
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    pub fn default_version_id(&self) -> u64 {
        self.default_version_id
    }

    pub fn versions(&self) -> &[ModVersion] {
        &self.versions
    }

    /// Canonical page URL (redirect-terminal, query stripped)
    pub fn page_url(&self) -> &Url {
        &self.page_url
    }
}

impl fmt::Display for ModRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => f.write_str(name),
            None => write!(f, "{}", self.page_url),
        }
    }
}

/// Builder for ModRecord
///
/// `website`, `source_code` and `background` take the text the host shows,
/// not a parsed [`Url`]: authors often leave out the scheme or use spaces and
/// brackets, and those values are escaped into URLs only when merged.
#[derive(Debug)]
pub struct ModRecordBuilder {
    record: ModRecord,
}

impl ModRecordBuilder {
    fn new(page_url: Url) -> Self {
        Self {
            record: ModRecord {
                id: 0,
                license: None,
                name: None,
                short_description: None,
                author: None,
                website: None,
                source_code: None,
                background: None,
                default_version_id: 0,
                versions: Vec::new(),
                page_url,
            },
        }
    }

    pub fn id(mut self, id: u64) -> Self {
        self.record.id = id;
        self
    }

    pub fn license(mut self, license: impl Into<String>) -> Self {
        self.record.license = Some(license.into());
        self
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.record.name = Some(name.into());
        self
    }

    pub fn short_description(mut self, short_description: impl Into<String>) -> Self {
        self.record.short_description = Some(short_description.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.record.author = Some(author.into());
        self
    }

    pub fn website(mut self, website: impl Into<String>) -> Self {
        self.record.website = Some(website.into());
        self
    }

    pub fn source_code(mut self, source_code: impl Into<String>) -> Self {
        self.record.source_code = Some(source_code.into());
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.record.background = Some(background.into());
        self
    }

    pub fn default_version_id(mut self, id: u64) -> Self {
        self.record.default_version_id = id;
        self
    }

    /// Append a version; order is kept but has no meaning for `latest`
    pub fn version(mut self, version: ModVersion) -> Self {
        self.record.versions.push(version);
        self
    }

    /// Build the record, rejecting duplicate version ids
    pub fn build(self) -> Result<ModRecord> {
        let record = self.record;
        let mut ids: Vec<u64> = record.versions.iter().map(|v| v.id).collect();
        ids.sort_unstable();
        if let Some(pair) = ids.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(Error::data_integrity(
                record.page_url.as_str(),
                format!("duplicate version id {}", pair[0]),
            ));
        }
        Ok(record)
    }
}
