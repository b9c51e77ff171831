//! # OME Model
//!
//! An in-memory object model for OME-XML microscopy metadata with deferred
//! ID-reference resolution.
//!
//! OME-XML documents describe images, the instruments that acquired them,
//! the people involved and free-form annotations. Objects point at each
//! other by ID, often before the target has appeared in the document. This
//! library builds the object graph in one top-down walk, recording those
//! pointers as unresolved references, and binds them in a single pass once
//! every object is registered.
//!
//! ## Features
//!
//! - **Deferred resolution**: Forward references need no special handling
//! - **Typed references**: A reference only binds to a target of the right kind
//! - **Round-trip serialization**: Documents serialize back to OME-XML,
//!   including references that could not be resolved
//! - **Copy-conversion**: Any [`MetadataRoot`] can be copied into an
//!   independent [`OmeXmlMetadataRoot`]
//! - **Metadata store**: [`MetadataStore`] fills a document by index, and
//!   [`convert_metadata`] copies any [`MetadataRetrieve`] into it
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`model`] - Registry, references, schema elements and the document root
//! - [`meta`] - Index-based metadata retrieval and storage, document summaries
//! - [`xml`] - DOM read capability and the XML writer
//! - [`config`] - Parse policy and CLI configuration types
//! - [`error`] - Error types
//!
//! ## Example
//!
//! ```rust
//! use ome_model::{MetadataRetrieve, OmeXmlMetadataRoot, ParseConfig};
//!
//! let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
//!     <Image ID="Image:0" Name="cells">
//!         <ExperimenterRef ID="Experimenter:0"/>
//!     </Image>
//!     <Experimenter ID="Experimenter:0" FirstName="Ada"/>
//! </OME>"#;
//!
//! let root = OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default()).unwrap();
//! assert_eq!(root.unresolved_count(), 0);
//! assert_eq!(root.image_experimenter_ref(0), Some("Experimenter:0"));
//! ```

pub mod config;
pub mod error;
pub mod meta;
pub mod model;
pub mod xml;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, ConvertConfig, OutputFormat, ParseConfig, ShowConfig};
pub use error::{EnumerationError, ModelError, ModelResult};
pub use meta::{convert_metadata, DocumentSummary, MetadataRetrieve, MetadataStore};
pub use model::{
    MetadataRoot, ModelObject, ModelVisitor, NodeId, ObjectKind, OmeModel, OmeModelObject,
    OmeXmlMetadataRoot, Reference, ReferenceKind, ReferenceTarget, UnresolvedReference,
    OME_NAMESPACE,
};
pub use xml::{DomElement, XmlElement};
