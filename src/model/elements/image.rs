//! Image and ObjectiveSettings.

use crate::error::ModelResult;
use crate::model::enums::Medium;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_attribute_reference, add_child_references, attr_enum, attr_parse, attr_string,
    check_tag, child_parse, child_text, register, required_id, single_child,
    write_attribute_reference, write_child_references, write_children,
};
use crate::model::primitives::Timestamp;
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

use super::pixels::Pixels;

// =============================================================================
// Image
// =============================================================================

/// An acquired image with its pixel description.
///
/// Relationships to the experimenter, instrument, ROIs and annotations are
/// kept as references in the model; see [`OmeModel::linked`].
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Image {
    pub id: String,
    pub name: Option<String>,
    pub acquisition_date: Option<Timestamp>,
    pub description: Option<String>,
    pub objective_settings: Option<NodeId>,
    pub pixels: Option<NodeId>,
}

impl Image {
    pub const ELEMENT: &'static str = "Image";

    pub fn new(id: impl Into<String>) -> Self {
        Image {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Construct an Image recursively from a DOM element.
    ///
    /// The Image registers itself, builds its ObjectiveSettings and Pixels,
    /// and records ExperimenterRef, InstrumentRef, ROIRef and AnnotationRef
    /// children as unresolved references.
    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;
        let name = attr_string(element, "Name");
        let acquisition_date = child_parse(element, Self::ELEMENT, "AcquisitionDate")?;
        let description = child_text(element, Self::ELEMENT, "Description")?;

        let objective_settings =
            match single_child(element, Self::ELEMENT, ObjectiveSettings::ELEMENT)? {
                Some(child) => Some(ObjectiveSettings::from_element(&child, model)?),
                None => None,
            };
        let pixels = match single_child(element, Self::ELEMENT, Pixels::ELEMENT)? {
            Some(child) => Some(Pixels::from_element(&child, model)?),
            None => None,
        };

        let node = model.insert(Image {
            id: id.clone(),
            name,
            acquisition_date,
            description,
            objective_settings,
            pixels,
        });
        register(model, &id, node)?;

        add_child_references(element, node, ReferenceKind::ExperimenterRef, model)?;
        add_child_references(element, node, ReferenceKind::InstrumentRef, model)?;
        add_child_references(element, node, ReferenceKind::RoiRef, model)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Image {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Image
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn children(&self) -> Vec<NodeId> {
        self.objective_settings
            .iter()
            .chain(self.pixels.iter())
            .copied()
            .collect()
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Name", self.name.as_deref());

        if let Some(date) = &self.acquisition_date {
            element.push_child(XmlElement::with_text("AcquisitionDate", date.as_str()));
        }
        write_child_references(&mut element, model, node, ReferenceKind::ExperimenterRef);
        element.push_text_child("Description", self.description.as_deref());
        write_child_references(&mut element, model, node, ReferenceKind::InstrumentRef);
        write_children(&mut element, model, self.objective_settings.as_slice());
        write_children(&mut element, model, self.pixels.as_slice());
        write_child_references(&mut element, model, node, ReferenceKind::RoiRef);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// ObjectiveSettings
// =============================================================================

/// Per-image objective settings.
///
/// The `ID` attribute names the Objective used, so it is recorded as an
/// `ObjectiveRef` reference rather than as the element's own ID.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectiveSettings {
    pub correction_collar: Option<f64>,
    pub medium: Option<Medium>,
    pub refractive_index: Option<f64>,
}

impl ObjectiveSettings {
    pub const ELEMENT: &'static str = "ObjectiveSettings";

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        // The reference target is mandatory
        required_id(element, Self::ELEMENT)?;

        let node = model.insert(ObjectiveSettings {
            correction_collar: attr_parse(element, Self::ELEMENT, "CorrectionCollar")?,
            medium: attr_enum(element, "Medium")?,
            refractive_index: attr_parse(element, Self::ELEMENT, "RefractiveIndex")?,
        });
        add_attribute_reference(element, "ID", node, ReferenceKind::ObjectiveRef, model);
        Ok(node)
    }
}

impl OmeModelObject for ObjectiveSettings {
    fn kind(&self) -> ObjectKind {
        ObjectKind::ObjectiveSettings
    }

    fn id(&self) -> Option<&str> {
        None
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        write_attribute_reference(&mut element, "ID", model, node, ReferenceKind::ObjectiveRef);
        element.set_optional_attribute("CorrectionCollar", self.correction_collar);
        element.set_optional_attribute("Medium", self.medium);
        element.set_optional_attribute("RefractiveIndex", self.refractive_index);
        element
    }
}
