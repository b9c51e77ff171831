//! Plate: a multi-well plate header.
//!
//! Wells and plate acquisitions are not modelled.

use crate::error::ModelResult;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_child_references, attr_parse, attr_string, check_tag, child_text, register, required_id,
    write_child_references,
};
use crate::model::primitives::{NonNegativeInteger, PositiveInteger};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plate {
    pub id: String,
    pub name: Option<String>,
    pub status: Option<String>,
    pub external_identifier: Option<String>,
    pub rows: Option<PositiveInteger>,
    pub columns: Option<PositiveInteger>,
    pub field_index: Option<NonNegativeInteger>,
    pub description: Option<String>,
}

impl Plate {
    pub const ELEMENT: &'static str = "Plate";

    pub fn new(id: impl Into<String>) -> Self {
        Plate {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let node = model.insert(Plate {
            id: id.clone(),
            name: attr_string(element, "Name"),
            status: attr_string(element, "Status"),
            external_identifier: attr_string(element, "ExternalIdentifier"),
            rows: attr_parse(element, Self::ELEMENT, "Rows")?,
            columns: attr_parse(element, Self::ELEMENT, "Columns")?,
            field_index: attr_parse(element, Self::ELEMENT, "FieldIndex")?,
            description: child_text(element, Self::ELEMENT, "Description")?,
        });
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Plate {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Plate
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Name", self.name.as_deref());
        element.set_optional_attribute("Status", self.status.as_deref());
        element.set_optional_attribute("ExternalIdentifier", self.external_identifier.as_deref());
        element.set_optional_attribute("Rows", self.rows);
        element.set_optional_attribute("Columns", self.columns);
        element.set_optional_attribute("FieldIndex", self.field_index);
        element.push_text_child("Description", self.description.as_deref());
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}
