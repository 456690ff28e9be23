//! Content extraction
//!
//! [`extract_metadata`] is the pure per-page step over rendered markup;
//! [`ExtractionCoordinator`] drives it over every indexed URL through a
//! [`crate::render::RenderPool`].

mod coordinator;
mod metadata;

pub use coordinator::{Extraction, ExtractionCoordinator, ExtractionReport};
pub use metadata::{extract_metadata, PageMetadata};
