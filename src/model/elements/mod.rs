//! Concrete schema elements.
//!
//! Each element provides `from_element`, which builds the object (and its
//! children) from any [`DomElement`](crate::xml::DomElement), registers its
//! ID and records its references unresolved, plus an
//! [`OmeModelObject`](super::OmeModelObject) implementation for
//! serialization.

mod annotation;
mod dataset;
mod experimenter;
mod image;
mod instrument;
mod pixels;
mod plate;
mod roi;

pub use annotation::{CommentAnnotation, LongAnnotation, StructuredAnnotations, TagAnnotation};
pub use dataset::Dataset;
pub use experimenter::Experimenter;
pub use image::{Image, ObjectiveSettings};
pub use instrument::{Detector, Instrument, Objective};
pub use pixels::{Channel, DetectorSettings, Pixels, Plane};
pub use plate::Plate;
pub use roi::{Ellipse, Point, Rectangle, Roi, ShapeCommon, UNION_ELEMENT};
