//! ROI and the shapes of its `Union`.
//!
//! Rectangle, Ellipse and Point are modelled; other shape types inside a
//! `Union` are skipped with a debug log. Every shape carries its own ID and
//! may be annotated.

use tracing::debug;

use crate::error::ModelResult;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_child_references, attr_parse, attr_string, check_tag, child_text, register, required_id,
    single_child, write_child_references, write_children,
};
use crate::model::primitives::NonNegativeInteger;
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

/// Element grouping the shapes of one ROI.
pub const UNION_ELEMENT: &str = "Union";

// =============================================================================
// Roi
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Roi {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
    /// Shapes of the `Union`, in document order.
    pub shapes: Vec<NodeId>,
}

impl Roi {
    pub const ELEMENT: &'static str = "ROI";

    pub fn new(id: impl Into<String>) -> Self {
        Roi {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let shapes = match single_child(element, Self::ELEMENT, UNION_ELEMENT)? {
            Some(union) => build_shapes(&union, model)?,
            None => Vec::new(),
        };

        let node = model.insert(Roi {
            id: id.clone(),
            name: attr_string(element, "Name"),
            description: child_text(element, Self::ELEMENT, "Description")?,
            shapes,
        });
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

/// Build the supported shapes of a `Union`, keeping their order.
fn build_shapes<E: DomElement>(union: &E, model: &mut OmeModel) -> ModelResult<Vec<NodeId>> {
    let mut shapes = Vec::new();
    for child in union.child_elements() {
        if !union.shares_namespace(&child) {
            continue;
        }
        let node = match child.local_name() {
            Rectangle::ELEMENT => Rectangle::from_element(&child, model)?,
            Ellipse::ELEMENT => Ellipse::from_element(&child, model)?,
            Point::ELEMENT => Point::from_element(&child, model)?,
            other => {
                debug!("Ignoring unsupported shape {}", other);
                continue;
            }
        };
        shapes.push(node);
    }
    Ok(shapes)
}

impl OmeModelObject for Roi {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Roi
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn children(&self) -> Vec<NodeId> {
        self.shapes.clone()
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Name", self.name.as_deref());
        if !self.shapes.is_empty() {
            let mut union = XmlElement::new(UNION_ELEMENT);
            write_children(&mut union, model, &self.shapes);
            element.push_child(union);
        }
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element.push_text_child("Description", self.description.as_deref());
        element
    }
}

// =============================================================================
// Shape attributes
// =============================================================================

/// Identity, plane placement and styling shared by every shape.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ShapeCommon {
    pub id: String,
    pub the_z: Option<NonNegativeInteger>,
    pub the_c: Option<NonNegativeInteger>,
    pub the_t: Option<NonNegativeInteger>,
    pub text: Option<String>,
    pub fill_color: Option<i32>,
    pub stroke_color: Option<i32>,
}

impl ShapeCommon {
    pub fn new(id: impl Into<String>) -> Self {
        ShapeCommon {
            id: id.into(),
            ..Default::default()
        }
    }

    fn from_element<E: DomElement>(element: &E, element_name: &'static str) -> ModelResult<Self> {
        check_tag(element, element_name);
        Ok(ShapeCommon {
            id: required_id(element, element_name)?,
            the_z: attr_parse(element, element_name, "TheZ")?,
            the_c: attr_parse(element, element_name, "TheC")?,
            the_t: attr_parse(element, element_name, "TheT")?,
            text: attr_string(element, "Text"),
            fill_color: attr_parse(element, element_name, "FillColor")?,
            stroke_color: attr_parse(element, element_name, "StrokeColor")?,
        })
    }

    fn to_element(&self, element_name: &str) -> XmlElement {
        let mut element = XmlElement::new(element_name);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("TheZ", self.the_z);
        element.set_optional_attribute("TheC", self.the_c);
        element.set_optional_attribute("TheT", self.the_t);
        element.set_optional_attribute("Text", self.text.as_deref());
        element.set_optional_attribute("FillColor", self.fill_color);
        element.set_optional_attribute("StrokeColor", self.stroke_color);
        element
    }
}

/// Register a freshly inserted shape and record its annotation links.
fn finish_shape<E: DomElement>(
    element: &E,
    model: &mut OmeModel,
    id: &str,
    node: NodeId,
) -> ModelResult<NodeId> {
    register(model, id, node)?;
    add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
    Ok(node)
}

// =============================================================================
// Rectangle
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Rectangle {
    pub common: ShapeCommon,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

impl Rectangle {
    pub const ELEMENT: &'static str = "Rectangle";

    pub fn new(id: impl Into<String>) -> Self {
        Rectangle {
            common: ShapeCommon::new(id),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        let common = ShapeCommon::from_element(element, Self::ELEMENT)?;
        let id = common.id.clone();
        let node = model.insert(Rectangle {
            common,
            x: attr_parse(element, Self::ELEMENT, "X")?,
            y: attr_parse(element, Self::ELEMENT, "Y")?,
            width: attr_parse(element, Self::ELEMENT, "Width")?,
            height: attr_parse(element, Self::ELEMENT, "Height")?,
        });
        finish_shape(element, model, &id, node)
    }
}

impl OmeModelObject for Rectangle {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Rectangle
    }

    fn id(&self) -> Option<&str> {
        Some(&self.common.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = self.common.to_element(Self::ELEMENT);
        element.set_optional_attribute("X", self.x);
        element.set_optional_attribute("Y", self.y);
        element.set_optional_attribute("Width", self.width);
        element.set_optional_attribute("Height", self.height);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// Ellipse
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ellipse {
    pub common: ShapeCommon,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub radius_x: Option<f64>,
    pub radius_y: Option<f64>,
}

impl Ellipse {
    pub const ELEMENT: &'static str = "Ellipse";

    pub fn new(id: impl Into<String>) -> Self {
        Ellipse {
            common: ShapeCommon::new(id),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        let common = ShapeCommon::from_element(element, Self::ELEMENT)?;
        let id = common.id.clone();
        let node = model.insert(Ellipse {
            common,
            x: attr_parse(element, Self::ELEMENT, "X")?,
            y: attr_parse(element, Self::ELEMENT, "Y")?,
            radius_x: attr_parse(element, Self::ELEMENT, "RadiusX")?,
            radius_y: attr_parse(element, Self::ELEMENT, "RadiusY")?,
        });
        finish_shape(element, model, &id, node)
    }
}

impl OmeModelObject for Ellipse {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Ellipse
    }

    fn id(&self) -> Option<&str> {
        Some(&self.common.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = self.common.to_element(Self::ELEMENT);
        element.set_optional_attribute("X", self.x);
        element.set_optional_attribute("Y", self.y);
        element.set_optional_attribute("RadiusX", self.radius_x);
        element.set_optional_attribute("RadiusY", self.radius_y);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// Point
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Point {
    pub common: ShapeCommon,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

impl Point {
    pub const ELEMENT: &'static str = "Point";

    pub fn new(id: impl Into<String>) -> Self {
        Point {
            common: ShapeCommon::new(id),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        let common = ShapeCommon::from_element(element, Self::ELEMENT)?;
        let id = common.id.clone();
        let node = model.insert(Point {
            common,
            x: attr_parse(element, Self::ELEMENT, "X")?,
            y: attr_parse(element, Self::ELEMENT, "Y")?,
        });
        finish_shape(element, model, &id, node)
    }
}

impl OmeModelObject for Point {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Point
    }

    fn id(&self) -> Option<&str> {
        Some(&self.common.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = self.common.to_element(Self::ELEMENT);
        element.set_optional_attribute("X", self.x);
        element.set_optional_attribute("Y", self.y);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    const ROI: &str = r#"<ROI ID="ROI:0" Name="cell">
        <Union>
            <Rectangle ID="Shape:0" TheZ="1" Text="box" X="1" Y="2" Width="30" Height="40">
                <AnnotationRef ID="Annotation:0"/>
            </Rectangle>
            <Line ID="Shape:9" X1="0" Y1="0" X2="1" Y2="1"/>
            <Ellipse ID="Shape:1" X="5" Y="5" RadiusX="2.5" RadiusY="1"/>
            <Point ID="Shape:2" X="7" Y="8" TheC="0"/>
        </Union>
        <AnnotationRef ID="Annotation:1"/>
        <Description>segmented</Description>
    </ROI>"#;

    fn build(xml: &str) -> ModelResult<(OmeModel, NodeId)> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut model = OmeModel::new();
        let node = Roi::from_element(&doc.root_element(), &mut model)?;
        Ok((model, node))
    }

    #[test]
    fn test_union_shapes_in_order() {
        let (model, node) = build(ROI).unwrap();
        let roi = model.get_as::<Roi>(node).unwrap();
        assert_eq!(roi.description.as_deref(), Some("segmented"));

        let kinds: Vec<ObjectKind> = roi
            .shapes
            .iter()
            .filter_map(|shape| model.get(*shape))
            .map(|shape| shape.kind())
            .collect();
        assert_eq!(
            kinds,
            vec![ObjectKind::Rectangle, ObjectKind::Ellipse, ObjectKind::Point]
        );
        assert_eq!(roi.children(), roi.shapes);

        let rectangle = model.get_as::<Rectangle>(roi.shapes[0]).unwrap();
        assert_eq!(rectangle.common.the_z, Some(NonNegativeInteger::new(1)));
        assert_eq!(rectangle.common.text.as_deref(), Some("box"));
        assert_eq!(rectangle.width, Some(30.0));
        let ellipse = model.get_as::<Ellipse>(roi.shapes[1]).unwrap();
        assert_eq!(ellipse.radius_x, Some(2.5));
        let point = model.get_as::<Point>(roi.shapes[2]).unwrap();
        assert_eq!((point.x, point.y), (Some(7.0), Some(8.0)));
    }

    #[test]
    fn test_shapes_register_ids_and_annotation_links() {
        let (model, node) = build(ROI).unwrap();
        // ROI plus three supported shapes; the Line is skipped
        assert_eq!(model.id_count(), 4);
        assert!(model.lookup("Shape:2").is_some());
        assert!(model.lookup("Shape:9").is_none());

        let rectangle = model.lookup("Shape:0").unwrap();
        assert_eq!(
            model.reference_ids(rectangle, ReferenceKind::AnnotationRef),
            vec!["Annotation:0"]
        );
        assert_eq!(
            model.reference_ids(node, ReferenceKind::AnnotationRef),
            vec!["Annotation:1"]
        );
    }

    #[test]
    fn test_shape_requires_id() {
        let err = build(r#"<ROI ID="ROI:0"><Union><Point X="1" Y="1"/></Union></ROI>"#).unwrap_err();
        assert!(matches!(err, ModelError::MissingId { element: "Point" }));
    }

    #[test]
    fn test_roi_serialization_keeps_union() {
        let (model, node) = build(ROI).unwrap();
        let element = model.get(node).unwrap().to_element(node, &model);

        let names: Vec<&str> = element.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Union", "AnnotationRef", "Description"]);

        let union = &element.children[0];
        assert_eq!(union.children.len(), 3);
        assert_eq!(union.children[0].attribute("Width"), Some("30"));
        assert_eq!(union.children[0].children[0].attribute("ID"), Some("Annotation:0"));
        assert_eq!(union.children[1].attribute("RadiusX"), Some("2.5"));
        assert_eq!(union.children[2].attribute("TheC"), Some("0"));
    }

    #[test]
    fn test_roi_without_union() {
        let (model, node) = build(r#"<ROI ID="ROI:0"/>"#).unwrap();
        let element = model.get(node).unwrap().to_element(node, &model);
        assert!(element.children.is_empty());
    }
}
