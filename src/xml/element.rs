//! Owned XML element tree and its text serialization.
//!
//! Model objects serialize into [`XmlElement`] trees rather than into a
//! parser-owned DOM. The tree can be compared structurally, walked again by
//! the model constructors (see [`super::DomElement`]), or written as text.
//!
//! # Output Format
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
//!   <Image ID="Image:0" Name="first">
//!     <Description>hello</Description>
//!   </Image>
//! </OME>
//! ```
//!
//! Attributes are written in insertion order. Elements with text and no
//! children are written on a single line so their text survives re-parsing
//! byte for byte.

use std::fmt::{self, Write};

/// XML declaration written before the root element.
pub const XML_DECLARATION: &str = r#"<?xml version="1.0" encoding="UTF-8"?>"#;

/// Indentation used per nesting level.
const INDENT: &str = "  ";

// =============================================================================
// XmlElement
// =============================================================================

/// An owned XML element.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct XmlElement {
    /// Local tag name
    pub name: String,

    /// Namespace URI, written as a default `xmlns` declaration when set
    pub namespace: Option<String>,

    /// Attributes in insertion order
    pub attributes: Vec<(String, String)>,

    /// Child elements in document order
    pub children: Vec<XmlElement>,

    /// Text content (only meaningful for elements without children)
    pub text: Option<String>,
}

impl XmlElement {
    /// Create an empty element.
    pub fn new(name: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create an element holding only text.
    pub fn with_text(name: impl Into<String>, text: impl Into<String>) -> Self {
        XmlElement {
            name: name.into(),
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Look up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing any previous value.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name, value)),
        }
    }

    /// Set an attribute from any displayable value when present.
    pub fn set_optional_attribute<T: fmt::Display>(&mut self, name: &str, value: Option<T>) {
        if let Some(value) = value {
            self.set_attribute(name, value.to_string());
        }
    }

    /// Append a child element.
    pub fn push_child(&mut self, child: XmlElement) {
        self.children.push(child);
    }

    /// Append a text-only child element when the value is present.
    pub fn push_text_child(&mut self, name: &str, text: Option<&str>) {
        if let Some(text) = text {
            self.children.push(XmlElement::with_text(name, text));
        }
    }

    /// Serialize this element as a complete document with an XML declaration.
    pub fn to_document_string(&self) -> String {
        let mut out = String::new();
        out.push_str(XML_DECLARATION);
        out.push('\n');
        // Writing into a String cannot fail
        let _ = self.write_to(&mut out, 0, None);
        out
    }

    fn write_to<W: Write>(
        &self,
        out: &mut W,
        depth: usize,
        parent_namespace: Option<&str>,
    ) -> fmt::Result {
        for _ in 0..depth {
            out.write_str(INDENT)?;
        }
        write!(out, "<{}", self.name)?;

        if let Some(namespace) = self.namespace.as_deref() {
            if parent_namespace != Some(namespace) {
                write!(out, " xmlns=\"{}\"", escape_attribute(namespace))?;
            }
        }
        for (key, value) in &self.attributes {
            write!(out, " {}=\"{}\"", key, escape_attribute(value))?;
        }

        if self.children.is_empty() {
            match self.text.as_deref() {
                Some(text) => writeln!(out, ">{}</{}>", escape_text(text), self.name)?,
                None => out.write_str("/>\n")?,
            }
            return Ok(());
        }

        out.write_str(">\n")?;
        let namespace = self.namespace.as_deref().or(parent_namespace);
        for child in &self.children {
            child.write_to(out, depth + 1, namespace)?;
        }
        for _ in 0..depth {
            out.write_str(INDENT)?;
        }
        writeln!(out, "</{}>", self.name)
    }
}

impl fmt::Display for XmlElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_to(f, 0, None)
    }
}

// =============================================================================
// Escaping
// =============================================================================

/// Escape a value for use inside a double-quoted attribute.
///
/// Tabs and line breaks are written as character references; a parser
/// normalizes literal ones to spaces.
pub fn escape_attribute(value: &str) -> String {
    escape(value, true)
}

/// Escape character data.
///
/// Line feeds and tabs survive parsing as-is, carriage returns do not.
pub fn escape_text(value: &str) -> String {
    escape(value, false)
}

fn escape(value: &str, attribute: bool) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            '\r' => escaped.push_str("&#13;"),
            '\n' if attribute => escaped.push_str("&#10;"),
            '\t' if attribute => escaped.push_str("&#9;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
