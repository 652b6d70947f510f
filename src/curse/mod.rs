//! # Curse Source Module
//!
//! Everything needed to turn a mod identifier on the Curse host into a
//! [`ModRecord`]: configuration, the page client, the file-listing scraper
//! and the record types themselves.
//!
//! ## Key Components
//!
//! - `CurseConfig`: base URL and HTTP behaviour
//! - `CurseApi`: redirect resolution and scraping for one mod at a time
//! - `extract_latest_download_href`: locates the newest file on a listing page
//! - `ModRecord` / `ModVersion`: the resolved data, with default-version selection

mod api;
mod config;
mod extract;
mod model;

pub use api::{CurseApi, ModSource};
pub use config::{CurseConfig, CurseConfigBuilder, DEFAULT_BASE_URL};
pub use extract::{LATEST_FILE_PATH, extract_latest_download_href, path_selector};
pub use model::{FriendlyVersion, GameVersion, ModRecord, ModRecordBuilder, ModVersion};
