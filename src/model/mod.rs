//! OME-XML object model.
//!
//! This module holds the in-memory object graph of one OME-XML document:
//!
//! - [`OmeModel`] - arena of model objects, ID registry and pending references
//! - [`Reference`] - typed, deferred pointer from one object to another
//! - [`ModelObject`] / [`OmeModelObject`] - the closed set of schema elements
//!   and their shared capability
//! - [`OmeXmlMetadataRoot`] - the document root, built from a DOM tree
//!
//! Construction walks the DOM top-down. Every element registers its ID and
//! records ID-valued relationships unresolved; a single resolution pass then
//! binds references once the whole document has been read, so forward
//! references need no special handling.

pub mod elements;
pub mod enums;
mod object;
pub(crate) mod parse;
pub mod primitives;
mod reference;
mod registry;
mod root;

pub use elements::{
    Channel, CommentAnnotation, Dataset, Detector, DetectorSettings, Experimenter, Image,
    Ellipse, Instrument, LongAnnotation, Objective, ObjectiveSettings, Pixels, Plane, Plate,
    Point, Rectangle, Roi, ShapeCommon, StructuredAnnotations, TagAnnotation,
};
pub use enums::{
    AcquisitionMode, Binning, DetectorType, DimensionOrder, IlluminationType, Immersion, Medium,
    PixelType, UnitsLength,
};
pub use object::{ModelObject, ModelVisitor, NodeId, ObjectKind, ObjectVariant, OmeModelObject};
pub use primitives::{NonNegativeInteger, PositiveInteger, Timestamp};
pub use reference::{Reference, ReferenceKind, ReferenceTarget, UnresolvedReference};
pub use registry::OmeModel;
pub use root::{MetadataRoot, OmeXmlMetadataRoot, OME_ELEMENT, OME_NAMESPACE};
