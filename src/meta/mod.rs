//! Consumer-facing access to a document.
//!
//! - [`MetadataRetrieve`] - index-based getters over the object graph
//! - [`MetadataStore`] - matching setters, and [`convert_metadata`] to copy
//!   one document into another through the pair
//! - [`DocumentSummary`] - serializable overview built from those getters

mod retrieve;
mod store;
mod summary;

pub use retrieve::MetadataRetrieve;
pub use store::{convert_metadata, MetadataStore};
pub use summary::{ChannelSummary, DocumentSummary, ImageSummary, InstrumentSummary};
