//! Read-only DOM access used by the model constructors.
//!
//! Model objects are built from any tree that implements [`DomElement`]:
//! - `roxmltree::Node` for documents parsed from text
//! - `&XmlElement` for trees produced by serializing another root
//!
//! Element and attribute names are matched by local name, so prefixed and
//! default-namespace documents are handled the same way.

use super::element::XmlElement;

/// Minimal read capability over an XML element.
pub trait DomElement: Sized {
    /// Local tag name (without namespace prefix).
    fn local_name(&self) -> &str;

    /// Namespace URI of the element, if any.
    fn namespace_uri(&self) -> Option<&str>;

    /// Value of an unqualified attribute.
    fn get_attribute(&self, name: &str) -> Option<&str>;

    /// Direct child elements in document order.
    fn child_elements(&self) -> Vec<Self>;

    /// Text content of the element: all of its text nodes, concatenated.
    ///
    /// Returns `None` when the element has no text node at all.
    fn text_content(&self) -> Option<String>;

    /// Whether `child` is in the same namespace as this element.
    fn shares_namespace(&self, child: &Self) -> bool {
        child.namespace_uri() == self.namespace_uri()
    }

    /// Direct children with the given local name in this element's namespace.
    fn children_by_tag_name(&self, name: &str) -> Vec<Self> {
        self.child_elements()
            .into_iter()
            .filter(|child| child.local_name() == name && self.shares_namespace(child))
            .collect()
    }

    /// Whether the element carries the given attribute.
    fn has_attribute(&self, name: &str) -> bool {
        self.get_attribute(name).is_some()
    }
}

impl<'a, 'input> DomElement for roxmltree::Node<'a, 'input> {
    fn local_name(&self) -> &str {
        self.tag_name().name()
    }

    fn namespace_uri(&self) -> Option<&str> {
        self.tag_name().namespace()
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name)
    }

    fn child_elements(&self) -> Vec<Self> {
        self.children().filter(|node| node.is_element()).collect()
    }

    fn text_content(&self) -> Option<String> {
        let mut text: Option<String> = None;
        for node in self.children().filter(|node| node.is_text()) {
            text.get_or_insert_with(String::new)
                .push_str(node.text().unwrap_or_default());
        }
        text
    }
}

impl<'a> DomElement for &'a XmlElement {
    fn local_name(&self) -> &str {
        &self.name
    }

    fn namespace_uri(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    fn get_attribute(&self, name: &str) -> Option<&str> {
        self.attribute(name)
    }

    fn child_elements(&self) -> Vec<Self> {
        let element: &'a XmlElement = *self;
        element.children.iter().collect()
    }

    fn text_content(&self) -> Option<String> {
        self.text.clone()
    }

    /// Serialized children carry no namespace of their own and inherit
    /// the parent's.
    fn shares_namespace(&self, child: &Self) -> bool {
        child.namespace.is_none() || child.namespace == self.namespace
    }
}
