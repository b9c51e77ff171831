//! StructuredAnnotations and the annotation types it contains.
//!
//! Every annotation has an ID, an optional namespace and description, a
//! typed `Value`, and an optional `Annotator` attribute naming the
//! Experimenter who created it. Any ID-bearing object can point at an
//! annotation with an `AnnotationRef`.

use crate::error::ModelResult;
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_attribute_reference, add_child_references, attr_string, build_children, check_tag,
    child_parse, child_text, register, required_id, write_attribute_reference,
    write_child_references, write_children,
};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

// =============================================================================
// StructuredAnnotations
// =============================================================================

/// Container for all annotations of a document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StructuredAnnotations {
    pub comments: Vec<NodeId>,
    pub tags: Vec<NodeId>,
    pub longs: Vec<NodeId>,
}

impl StructuredAnnotations {
    pub const ELEMENT: &'static str = "StructuredAnnotations";

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let container = StructuredAnnotations {
            comments: build_children(
                element,
                CommentAnnotation::ELEMENT,
                model,
                CommentAnnotation::from_element,
            )?,
            tags: build_children(element, TagAnnotation::ELEMENT, model, TagAnnotation::from_element)?,
            longs: build_children(
                element,
                LongAnnotation::ELEMENT,
                model,
                LongAnnotation::from_element,
            )?,
        };
        Ok(model.insert(container))
    }

    /// Number of annotations of all types.
    pub fn len(&self) -> usize {
        self.comments.len() + self.tags.len() + self.longs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl OmeModelObject for StructuredAnnotations {
    fn kind(&self) -> ObjectKind {
        ObjectKind::StructuredAnnotations
    }

    fn id(&self) -> Option<&str> {
        None
    }

    fn children(&self) -> Vec<NodeId> {
        self.comments
            .iter()
            .chain(self.tags.iter())
            .chain(self.longs.iter())
            .copied()
            .collect()
    }

    fn to_element(&self, _node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        write_children(&mut element, model, &self.comments);
        write_children(&mut element, model, &self.tags);
        write_children(&mut element, model, &self.longs);
        element
    }
}

// =============================================================================
// Annotation types
// =============================================================================

/// Defines one annotation type; `$read` extracts the `Value` child.
macro_rules! annotation {
    ($(#[$meta:meta])* $name:ident, $element:literal, $value:ty, $read:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Default)]
        pub struct $name {
            pub id: String,
            pub namespace: Option<String>,
            pub description: Option<String>,
            pub value: Option<$value>,
        }

        impl $name {
            pub const ELEMENT: &'static str = $element;

            pub fn new(id: impl Into<String>) -> Self {
                $name {
                    id: id.into(),
                    ..Default::default()
                }
            }

            pub fn from_element<E: DomElement>(
                element: &E,
                model: &mut OmeModel,
            ) -> ModelResult<NodeId> {
                check_tag(element, Self::ELEMENT);
                let id = required_id(element, Self::ELEMENT)?;

                let node = model.insert($name {
                    id: id.clone(),
                    namespace: attr_string(element, "Namespace"),
                    description: child_text(element, Self::ELEMENT, "Description")?,
                    value: $read(element, Self::ELEMENT, "Value")?,
                });
                register(model, &id, node)?;
                add_attribute_reference(element, "Annotator", node, ReferenceKind::Annotator, model);
                add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
                Ok(node)
            }
        }

        impl OmeModelObject for $name {
            fn kind(&self) -> ObjectKind {
                ObjectKind::$name
            }

            fn id(&self) -> Option<&str> {
                Some(&self.id)
            }

            fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
                let mut element = XmlElement::new(Self::ELEMENT);
                element.set_attribute("ID", &self.id);
                element.set_optional_attribute("Namespace", self.namespace.as_deref());
                write_attribute_reference(
                    &mut element,
                    "Annotator",
                    model,
                    node,
                    ReferenceKind::Annotator,
                );
                element.push_text_child("Description", self.description.as_deref());
                write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
                if let Some(value) = &self.value {
                    element.push_child(XmlElement::with_text("Value", value.to_string()));
                }
                element
            }
        }
    };
}

annotation!(
    /// Free-text comment.
    CommentAnnotation,
    "CommentAnnotation",
    String,
    child_text
);

annotation!(
    /// Short label, conventionally a single word.
    TagAnnotation,
    "TagAnnotation",
    String,
    child_text
);

annotation!(
    /// 64-bit integer value.
    LongAnnotation,
    "LongAnnotation",
    i64,
    child_parse
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;

    const ANNOTATIONS: &str = r#"<StructuredAnnotations>
        <CommentAnnotation ID="Annotation:0" Annotator="Experimenter:0">
            <Description>reviewed</Description>
            <Value>focus drifts after t=40</Value>
        </CommentAnnotation>
        <TagAnnotation ID="Annotation:1" Namespace="openmicroscopy.org/tags">
            <AnnotationRef ID="Annotation:0"/>
            <Value>mitosis</Value>
        </TagAnnotation>
        <LongAnnotation ID="Annotation:2"><Value> 42 </Value></LongAnnotation>
    </StructuredAnnotations>"#;

    fn build(xml: &str) -> ModelResult<(OmeModel, NodeId)> {
        let doc = roxmltree::Document::parse(xml).unwrap();
        let mut model = OmeModel::new();
        let node = StructuredAnnotations::from_element(&doc.root_element(), &mut model)?;
        Ok((model, node))
    }

    #[test]
    fn test_annotations_build() {
        let (model, node) = build(ANNOTATIONS).unwrap();
        let container = model.get_as::<StructuredAnnotations>(node).unwrap();
        assert_eq!(container.len(), 3);

        let comment = model.get_as::<CommentAnnotation>(container.comments[0]).unwrap();
        assert_eq!(comment.value.as_deref(), Some("focus drifts after t=40"));
        assert_eq!(comment.description.as_deref(), Some("reviewed"));
        assert_eq!(
            model.reference_ids(container.comments[0], ReferenceKind::Annotator),
            vec!["Experimenter:0"]
        );

        let tag = model.get_as::<TagAnnotation>(container.tags[0]).unwrap();
        assert_eq!(tag.namespace.as_deref(), Some("openmicroscopy.org/tags"));
        assert_eq!(
            model.reference_ids(container.tags[0], ReferenceKind::AnnotationRef),
            vec!["Annotation:0"]
        );

        let long = model.get_as::<LongAnnotation>(container.longs[0]).unwrap();
        assert_eq!(long.value, Some(42));
    }

    #[test]
    fn test_annotation_to_annotation_reference_resolves() {
        let (mut model, node) = build(ANNOTATIONS).unwrap();
        // Only the Annotator reference dangles
        assert_eq!(model.resolve_references(), 1);

        let container = model.get_as::<StructuredAnnotations>(node).unwrap();
        assert_eq!(
            model.linked(container.tags[0], ReferenceKind::AnnotationRef),
            vec![container.comments[0]]
        );
    }

    #[test]
    fn test_long_annotation_rejects_text() {
        let err = build(
            r#"<StructuredAnnotations>
                <LongAnnotation ID="Annotation:0"><Value>many</Value></LongAnnotation>
            </StructuredAnnotations>"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ModelError::InvalidValue {
                element: "LongAnnotation",
                property: "Value",
                ..
            }
        ));
    }

    #[test]
    fn test_annotation_to_element_order() {
        let (model, node) = build(ANNOTATIONS).unwrap();
        let element = model.get(node).unwrap().to_element(node, &model);
        assert_eq!(element.children.len(), 3);

        let comment = &element.children[0];
        assert_eq!(comment.attribute("Annotator"), Some("Experimenter:0"));
        let names: Vec<_> = comment.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Description", "Value"]);

        let long = &element.children[2];
        assert_eq!(long.children[0].text.as_deref(), Some("42"));
    }
}
