//! Model object capability and the closed set of schema element variants.
//!
//! Every supported OME-XML element is a concrete struct implementing
//! [`OmeModelObject`]. The [`ModelObject`] enum wraps them so that all
//! objects of one document can live in a single arena inside
//! [`OmeModel`](super::OmeModel), addressed by [`NodeId`].

use std::fmt;

use serde::Serialize;

use crate::xml::XmlElement;

use super::elements::{
    Channel, CommentAnnotation, Dataset, Detector, DetectorSettings, Ellipse, Experimenter, Image,
    Instrument, LongAnnotation, Objective, ObjectiveSettings, Pixels, Plane, Plate, Point,
    Rectangle, Roi, ShapeCommon, StructuredAnnotations, TagAnnotation,
};
use super::registry::OmeModel;

// =============================================================================
// NodeId
// =============================================================================

/// Index of a model object inside its [`OmeModel`] arena.
///
/// A `NodeId` is only meaningful for the model that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) const fn new(index: usize) -> Self {
        NodeId(index)
    }

    /// Position of the object in the arena.
    pub const fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// ObjectKind
// =============================================================================

/// Schema element kind of a model object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ObjectKind {
    Dataset,
    Plate,
    Experimenter,
    Instrument,
    Detector,
    Objective,
    Image,
    ObjectiveSettings,
    Pixels,
    Channel,
    DetectorSettings,
    Plane,
    Roi,
    Rectangle,
    Ellipse,
    Point,
    StructuredAnnotations,
    CommentAnnotation,
    TagAnnotation,
    LongAnnotation,
}

impl ObjectKind {
    /// XML element name for this kind.
    pub const fn element_name(self) -> &'static str {
        match self {
            ObjectKind::Dataset => "Dataset",
            ObjectKind::Plate => "Plate",
            ObjectKind::Experimenter => "Experimenter",
            ObjectKind::Instrument => "Instrument",
            ObjectKind::Detector => "Detector",
            ObjectKind::Objective => "Objective",
            ObjectKind::Image => "Image",
            ObjectKind::ObjectiveSettings => "ObjectiveSettings",
            ObjectKind::Pixels => "Pixels",
            ObjectKind::Channel => "Channel",
            ObjectKind::DetectorSettings => "DetectorSettings",
            ObjectKind::Plane => "Plane",
            ObjectKind::Roi => "ROI",
            ObjectKind::Rectangle => "Rectangle",
            ObjectKind::Ellipse => "Ellipse",
            ObjectKind::Point => "Point",
            ObjectKind::StructuredAnnotations => "StructuredAnnotations",
            ObjectKind::CommentAnnotation => "CommentAnnotation",
            ObjectKind::TagAnnotation => "TagAnnotation",
            ObjectKind::LongAnnotation => "LongAnnotation",
        }
    }

    /// Whether this kind is one of the annotation types.
    pub const fn is_annotation(self) -> bool {
        matches!(
            self,
            ObjectKind::CommentAnnotation | ObjectKind::TagAnnotation | ObjectKind::LongAnnotation
        )
    }

    /// Whether this kind is a shape inside an ROI `Union`.
    pub const fn is_shape(self) -> bool {
        matches!(
            self,
            ObjectKind::Rectangle | ObjectKind::Ellipse | ObjectKind::Point
        )
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.element_name())
    }
}

// =============================================================================
// OmeModelObject
// =============================================================================

/// Capability shared by every schema element.
pub trait OmeModelObject {
    /// Schema element kind.
    fn kind(&self) -> ObjectKind;

    /// The object's own ID, if the element carries one.
    fn id(&self) -> Option<&str>;

    /// Child objects owned by this object, in schema order.
    fn children(&self) -> Vec<NodeId> {
        Vec::new()
    }

    /// Serialize this object (stored at `node` in `model`) to an XML element.
    ///
    /// References registered for `node` are written from the model: resolved
    /// ones with the target's ID, unresolved ones with their recorded ID.
    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement;
}

/// Depth-first visitor over the composition tree.
pub trait ModelVisitor {
    /// Called once per object, parents before children.
    fn visit(&mut self, node: NodeId, object: &ModelObject, depth: usize);
}

// =============================================================================
// ModelObject
// =============================================================================

/// Typed access from a [`ModelObject`] to one concrete variant.
pub trait ObjectVariant: OmeModelObject + Sized {
    fn from_object(object: &ModelObject) -> Option<&Self>;
    fn from_object_mut(object: &mut ModelObject) -> Option<&mut Self>;
}

macro_rules! model_objects {
    ($($variant:ident),+ $(,)?) => {
        /// One schema element stored in the model arena.
        #[derive(Debug, Clone, PartialEq)]
        pub enum ModelObject {
            $($variant($variant)),+
        }

        impl ModelObject {
            /// View this object through the common capability.
            pub fn as_model_object(&self) -> &dyn OmeModelObject {
                match self {
                    $(ModelObject::$variant(inner) => inner),+
                }
            }
        }

        $(
            impl From<$variant> for ModelObject {
                fn from(inner: $variant) -> Self {
                    ModelObject::$variant(inner)
                }
            }

            impl ObjectVariant for $variant {
                fn from_object(object: &ModelObject) -> Option<&Self> {
                    match object {
                        ModelObject::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }

                fn from_object_mut(object: &mut ModelObject) -> Option<&mut Self> {
                    match object {
                        ModelObject::$variant(inner) => Some(inner),
                        _ => None,
                    }
                }
            }
        )+
    };
}

model_objects! {
    Dataset,
    Plate,
    Experimenter,
    Instrument,
    Detector,
    Objective,
    Image,
    ObjectiveSettings,
    Pixels,
    Channel,
    DetectorSettings,
    Plane,
    Roi,
    Rectangle,
    Ellipse,
    Point,
    StructuredAnnotations,
    CommentAnnotation,
    TagAnnotation,
    LongAnnotation,
}

impl ModelObject {
    pub fn kind(&self) -> ObjectKind {
        self.as_model_object().kind()
    }

    pub fn id(&self) -> Option<&str> {
        self.as_model_object().id()
    }

    pub fn children(&self) -> Vec<NodeId> {
        self.as_model_object().children()
    }

    pub fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        self.as_model_object().to_element(node, model)
    }

    /// Attributes shared by ROI shapes, if this object is one.
    pub fn shape(&self) -> Option<&ShapeCommon> {
        match self {
            ModelObject::Rectangle(shape) => Some(&shape.common),
            ModelObject::Ellipse(shape) => Some(&shape.common),
            ModelObject::Point(shape) => Some(&shape.common),
            _ => None,
        }
    }

    pub fn shape_mut(&mut self) -> Option<&mut ShapeCommon> {
        match self {
            ModelObject::Rectangle(shape) => Some(&mut shape.common),
            ModelObject::Ellipse(shape) => Some(&mut shape.common),
            ModelObject::Point(shape) => Some(&mut shape.common),
            _ => None,
        }
    }

    /// X and Y of a shape: a rectangle's corner, an ellipse's centre or
    /// the point itself.
    pub fn shape_anchor(&self) -> Option<(Option<f64>, Option<f64>)> {
        match self {
            ModelObject::Rectangle(shape) => Some((shape.x, shape.y)),
            ModelObject::Ellipse(shape) => Some((shape.x, shape.y)),
            ModelObject::Point(shape) => Some((shape.x, shape.y)),
            _ => None,
        }
    }

    pub fn shape_anchor_mut(&mut self) -> Option<(&mut Option<f64>, &mut Option<f64>)> {
        match self {
            ModelObject::Rectangle(shape) => Some((&mut shape.x, &mut shape.y)),
            ModelObject::Ellipse(shape) => Some((&mut shape.x, &mut shape.y)),
            ModelObject::Point(shape) => Some((&mut shape.x, &mut shape.y)),
            _ => None,
        }
    }
}
