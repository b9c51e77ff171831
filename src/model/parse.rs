//! Helpers shared by the element constructors and serializers.

use std::fmt::Display;
use std::str::FromStr;

use tracing::debug;

use crate::error::{EnumerationError, ModelError, ModelResult};
use crate::xml::{DomElement, XmlElement};

use super::object::NodeId;
use super::reference::{Reference, ReferenceKind};
use super::registry::OmeModel;

/// Log (but accept) an element whose tag does not match the constructor.
pub(crate) fn check_tag<E: DomElement>(element: &E, expected: &str) {
    let tag_name = element.local_name();
    if tag_name != expected {
        debug!("Expecting node name of {} got {}", expected, tag_name);
    }
}

/// The element's own `ID` attribute, which must be present.
pub(crate) fn required_id<E: DomElement>(
    element: &E,
    element_name: &'static str,
) -> ModelResult<String> {
    element
        .get_attribute("ID")
        .map(str::to_string)
        .ok_or(ModelError::MissingId {
            element: element_name,
        })
}

/// A string attribute.
pub(crate) fn attr_string<E: DomElement>(element: &E, name: &str) -> Option<String> {
    element.get_attribute(name).map(str::to_string)
}

/// An attribute converted with `FromStr`; conversion failures are
/// reported as `InvalidValue`.
pub(crate) fn attr_parse<E, T>(
    element: &E,
    element_name: &'static str,
    name: &'static str,
) -> ModelResult<Option<T>>
where
    E: DomElement,
    T: FromStr,
    T::Err: Display,
{
    element
        .get_attribute(name)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ModelError::invalid(element_name, name, e.to_string()))
        })
        .transpose()
}

/// An enumeration-valued attribute.
pub(crate) fn attr_enum<E, T>(element: &E, name: &str) -> ModelResult<Option<T>>
where
    E: DomElement,
    T: FromStr<Err = EnumerationError>,
{
    match element.get_attribute(name) {
        Some(value) => Ok(Some(value.parse::<T>()?)),
        None => Ok(None),
    }
}

/// An `xsd:boolean` attribute.
pub(crate) fn attr_bool<E: DomElement>(
    element: &E,
    element_name: &'static str,
    name: &'static str,
) -> ModelResult<Option<bool>> {
    match element.get_attribute(name).map(str::trim) {
        None => Ok(None),
        Some("true") | Some("1") => Ok(Some(true)),
        Some("false") | Some("0") => Ok(Some(false)),
        Some(other) => Err(ModelError::invalid(
            element_name,
            name,
            format!("'{}' is not a boolean", other),
        )),
    }
}

/// The single child with the given name, if any.
///
/// More than one occurrence is an error.
pub(crate) fn single_child<E: DomElement>(
    element: &E,
    element_name: &'static str,
    child: &'static str,
) -> ModelResult<Option<E>> {
    let mut children = element.children_by_tag_name(child);
    if children.len() > 1 {
        return Err(ModelError::TooManyChildren {
            element: element_name,
            child,
            count: children.len(),
        });
    }
    Ok(children.pop())
}

/// Text content of a single, non-complex child element.
pub(crate) fn child_text<E: DomElement>(
    element: &E,
    element_name: &'static str,
    child: &'static str,
) -> ModelResult<Option<String>> {
    Ok(single_child(element, element_name, child)?
        .map(|node| node.text_content().unwrap_or_default()))
}

/// Text content of a single child, converted with `FromStr`.
pub(crate) fn child_parse<E, T>(
    element: &E,
    element_name: &'static str,
    child: &'static str,
) -> ModelResult<Option<T>>
where
    E: DomElement,
    T: FromStr,
    T::Err: Display,
{
    child_text(element, element_name, child)?
        .map(|text| {
            text.trim()
                .parse::<T>()
                .map_err(|e| ModelError::invalid(element_name, child, e.to_string()))
        })
        .transpose()
}

/// Record every `<KindRef ID=".."/>` child as a reference from `source`.
pub(crate) fn add_child_references<E: DomElement>(
    element: &E,
    source: NodeId,
    kind: ReferenceKind,
    model: &mut OmeModel,
) -> ModelResult<()> {
    for reference in element.children_by_tag_name(kind.name()) {
        let target_id = required_id(&reference, kind.name())?;
        model.add_reference(source, Reference::new(kind, target_id));
    }
    Ok(())
}

/// Record an ID-valued attribute as a reference from `source`.
pub(crate) fn add_attribute_reference<E: DomElement>(
    element: &E,
    attribute: &str,
    source: NodeId,
    kind: ReferenceKind,
    model: &mut OmeModel,
) {
    if let Some(target_id) = element.get_attribute(attribute) {
        model.add_reference(source, Reference::new(kind, target_id));
    }
}

/// Register an object under its own ID.
pub(crate) fn register(model: &mut OmeModel, id: &str, node: NodeId) -> ModelResult<()> {
    model.add_model_object(id, node)
}

/// Build every child with the given name.
pub(crate) fn build_children<E, F>(
    element: &E,
    child: &str,
    model: &mut OmeModel,
    build: F,
) -> ModelResult<Vec<NodeId>>
where
    E: DomElement,
    F: Fn(&E, &mut OmeModel) -> ModelResult<NodeId>,
{
    element
        .children_by_tag_name(child)
        .iter()
        .map(|node| build(node, model))
        .collect()
}

/// Write every reference of `kind` from `source` as `<KindRef ID=".."/>`.
pub(crate) fn write_child_references(
    element: &mut XmlElement,
    model: &OmeModel,
    source: NodeId,
    kind: ReferenceKind,
) {
    for target_id in model.reference_ids(source, kind) {
        let mut reference = XmlElement::new(kind.name());
        reference.set_attribute("ID", target_id);
        element.push_child(reference);
    }
}

/// Write the first reference of `kind` from `source` as an attribute.
pub(crate) fn write_attribute_reference(
    element: &mut XmlElement,
    attribute: &str,
    model: &OmeModel,
    source: NodeId,
    kind: ReferenceKind,
) {
    if let Some(target_id) = model.reference_ids(source, kind).first() {
        element.set_attribute(attribute, *target_id);
    }
}

/// Serialize child objects in order.
pub(crate) fn write_children(element: &mut XmlElement, model: &OmeModel, children: &[NodeId]) {
    for child in children {
        if let Some(object) = model.get(*child) {
            element.push_child(object.to_element(*child, model));
        }
    }
}
