//! Experimenter: the person who owns or annotated data.

use crate::error::ModelResult;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_child_references, attr_string, check_tag, register, required_id, write_child_references,
};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Experimenter {
    pub id: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub institution: Option<String>,
    pub user_name: Option<String>,
}

impl Experimenter {
    pub const ELEMENT: &'static str = "Experimenter";

    pub fn new(id: impl Into<String>) -> Self {
        Experimenter {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let node = model.insert(Experimenter {
            id: id.clone(),
            first_name: attr_string(element, "FirstName"),
            last_name: attr_string(element, "LastName"),
            email: attr_string(element, "Email"),
            institution: attr_string(element, "Institution"),
            user_name: attr_string(element, "UserName"),
        });
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }

    /// "First Last", or whichever part is present.
    pub fn display_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{} {}", first, last)),
            (Some(name), None) | (None, Some(name)) => Some(name.to_string()),
            (None, None) => self.user_name.clone(),
        }
    }
}

impl OmeModelObject for Experimenter {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Experimenter
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("FirstName", self.first_name.as_deref());
        element.set_optional_attribute("LastName", self.last_name.as_deref());
        element.set_optional_attribute("Email", self.email.as_deref());
        element.set_optional_attribute("Institution", self.institution.as_deref());
        element.set_optional_attribute("UserName", self.user_name.as_deref());
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_experimenter_from_element() {
        let xml = r#"<Experimenter ID="Experimenter:0" FirstName="Ada" LastName="Lovelace"
                         Email="ada@example.org" UserName="ada"/>"#;
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut model = OmeModel::new();

        let node = Experimenter::from_element(&doc.root_element(), &mut model).unwrap();
        let experimenter = model.get_as::<Experimenter>(node).unwrap();
        assert_eq!(experimenter.email.as_deref(), Some("ada@example.org"));
        assert_eq!(experimenter.display_name().as_deref(), Some("Ada Lovelace"));
        assert_eq!(model.lookup("Experimenter:0"), Some(node));
    }

    #[test]
    fn test_display_name_fallbacks() {
        let mut experimenter = Experimenter::new("Experimenter:0");
        assert_eq!(experimenter.display_name(), None);

        experimenter.user_name = Some("root".to_string());
        assert_eq!(experimenter.display_name().as_deref(), Some("root"));

        experimenter.last_name = Some("Curie".to_string());
        assert_eq!(experimenter.display_name().as_deref(), Some("Curie"));
    }
}
