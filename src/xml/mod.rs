//! XML plumbing for the OME model.
//!
//! Parsing is delegated to `roxmltree`; this module only provides the
//! read-side abstraction the model constructors walk and an owned element
//! tree for serialization.

mod dom;
mod element;

pub use dom::DomElement;
pub use element::{escape_attribute, escape_text, XmlElement, XML_DECLARATION};
