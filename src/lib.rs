//! # netkan-curse - Curse metadata enrichment for NetKAN documents
//!
//! This crate fills in a partially authored NetKAN metadata document with
//! data scraped from the Curse mod host. The host exposes no structured API
//! for this, so the mod is located by following its project page redirects
//! and the newest file is read off the file listing.
//!
//! ## Features
//!
//! - Bounded redirect resolution with per-request timeouts and cancellation
//! - Latest-file extraction from the host's file listing
//! - Default-version selection that never guesses by list order
//! - Non-destructive merging: author-supplied fields are never overwritten
//! - License normalization and URL escaping for resource links
//!
//! ## Example
//!
//! ```rust,no_run
//! use netkan_curse::curse::{CurseApi, CurseConfig};
//! use netkan_curse::metadata::MetadataDocument;
//! use netkan_curse::transform::{CurseTransformer, Transformer};
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = CurseApi::new(CurseConfig::default())?;
//!     let transformer = CurseTransformer::new(api);
//!
//!     let document: MetadataDocument =
//!         r#"{"identifier":"MyMod","kref":{"source":"curse","id":"220221"}}"#.parse()?;
//!     let enriched = transformer
//!         .transform(document, &CancellationToken::new())
//!         .await?;
//!
//!     println!("{}", enriched.to_pretty_string()?);
//!     Ok(())
//! }
//! ```

mod error;
pub mod http;

pub mod curse;
pub mod metadata;
pub mod transform;

pub use error::Error;

/// Re-export of types module for public use
pub mod prelude {
    pub use crate::error::Error;
    pub use crate::error::Result;
}
