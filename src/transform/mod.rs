//! # Transform Module
//!
//! Transformers take a metadata document and return it enriched. A
//! transformer that does not apply to a document returns it unchanged
//! rather than failing, so transformers can be chained blindly.
//!
//! ## Key Components
//!
//! - `Transformer`: the common interface
//! - `CurseTransformer`: fills fields from the Curse host
//! - `merge`: the field policy used by `CurseTransformer`, usable on its own
//! - `normalize` / `escape_url`: license and URL clean-up applied while merging

pub mod curse;
mod escape;
mod license;

use std::future::Future;

use tokio_util::sync::CancellationToken;

use crate::error::Result;
use crate::metadata::MetadataDocument;

pub use curse::{CurseTransformer, SERVICE, merge};
pub use escape::escape_url;
pub use license::normalize;

/// A step that enriches a metadata document
pub trait Transformer {
    /// Short name used in logs
    fn name(&self) -> &'static str;

    /// Enrich `document`, or return it untouched if this step does not apply
    fn transform(
        &self,
        document: MetadataDocument,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<MetadataDocument>> + Send;
}
