//! Dataset: a named grouping of images.

use crate::error::ModelResult;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_child_references, attr_string, check_tag, child_text, register, required_id,
    write_child_references,
};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

/// A grouping of images.
///
/// Membership is expressed only through `ImageRef` references, so a Dataset
/// owns no child objects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    pub id: String,
    pub name: Option<String>,
    pub description: Option<String>,
}

impl Dataset {
    pub const ELEMENT: &'static str = "Dataset";

    pub fn new(id: impl Into<String>) -> Self {
        Dataset {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let node = model.insert(Dataset {
            id: id.clone(),
            name: attr_string(element, "Name"),
            description: child_text(element, Self::ELEMENT, "Description")?,
        });
        register(model, &id, node)?;

        add_child_references(element, node, ReferenceKind::ExperimenterRef, model)?;
        add_child_references(element, node, ReferenceKind::ImageRef, model)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Dataset {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Dataset
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Name", self.name.as_deref());
        element.push_text_child("Description", self.description.as_deref());
        write_child_references(&mut element, model, node, ReferenceKind::ExperimenterRef);
        write_child_references(&mut element, model, node, ReferenceKind::ImageRef);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}
