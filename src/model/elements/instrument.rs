//! Instrument, Detector and Objective.

use crate::error::ModelResult;
use crate::model::enums::{DetectorType, Immersion};
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_child_references, attr_enum, attr_parse, attr_string, build_children, check_tag,
    register, required_id, write_child_references, write_children,
};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

// =============================================================================
// Instrument
// =============================================================================

/// A microscope setup: the detectors and objectives images refer to.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Instrument {
    pub id: String,
    pub detectors: Vec<NodeId>,
    pub objectives: Vec<NodeId>,
}

impl Instrument {
    pub const ELEMENT: &'static str = "Instrument";

    pub fn new(id: impl Into<String>) -> Self {
        Instrument {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Construct an Instrument and its components from a DOM element.
    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let detectors = build_children(element, Detector::ELEMENT, model, Detector::from_element)?;
        let objectives =
            build_children(element, Objective::ELEMENT, model, Objective::from_element)?;

        let node = model.insert(Instrument {
            id: id.clone(),
            detectors,
            objectives,
        });
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Instrument {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Instrument
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn children(&self) -> Vec<NodeId> {
        self.detectors
            .iter()
            .chain(self.objectives.iter())
            .copied()
            .collect()
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        write_children(&mut element, model, &self.detectors);
        write_children(&mut element, model, &self.objectives);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// Detector
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detector {
    pub id: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub serial_number: Option<String>,
    pub gain: Option<f64>,
    pub zoom: Option<f64>,
    pub detector_type: Option<DetectorType>,
}

impl Detector {
    pub const ELEMENT: &'static str = "Detector";

    pub fn new(id: impl Into<String>) -> Self {
        Detector {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let detector = Detector {
            id: required_id(element, Self::ELEMENT)?,
            manufacturer: attr_string(element, "Manufacturer"),
            model: attr_string(element, "Model"),
            serial_number: attr_string(element, "SerialNumber"),
            gain: attr_parse(element, Self::ELEMENT, "Gain")?,
            zoom: attr_parse(element, Self::ELEMENT, "Zoom")?,
            detector_type: attr_enum(element, "Type")?,
        };

        let id = detector.id.clone();
        let node = model.insert(detector);
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Detector {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Detector
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Manufacturer", self.manufacturer.as_deref());
        element.set_optional_attribute("Model", self.model.as_deref());
        element.set_optional_attribute("SerialNumber", self.serial_number.as_deref());
        element.set_optional_attribute("Gain", self.gain);
        element.set_optional_attribute("Zoom", self.zoom);
        element.set_optional_attribute("Type", self.detector_type);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// Objective
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Objective {
    pub id: String,
    pub manufacturer: Option<String>,
    pub model: Option<String>,
    pub nominal_magnification: Option<f64>,
    pub lens_na: Option<f64>,
    pub immersion: Option<Immersion>,
}

impl Objective {
    pub const ELEMENT: &'static str = "Objective";

    pub fn new(id: impl Into<String>) -> Self {
        Objective {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let objective = Objective {
            id: required_id(element, Self::ELEMENT)?,
            manufacturer: attr_string(element, "Manufacturer"),
            model: attr_string(element, "Model"),
            nominal_magnification: attr_parse(element, Self::ELEMENT, "NominalMagnification")?,
            lens_na: attr_parse(element, Self::ELEMENT, "LensNA")?,
            immersion: attr_enum(element, "Immersion")?,
        };

        let id = objective.id.clone();
        let node = model.insert(objective);
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Objective {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Objective
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Manufacturer", self.manufacturer.as_deref());
        element.set_optional_attribute("Model", self.model.as_deref());
        element.set_optional_attribute("NominalMagnification", self.nominal_magnification);
        element.set_optional_attribute("LensNA", self.lens_na);
        element.set_optional_attribute("Immersion", self.immersion);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}
