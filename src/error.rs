use thiserror::Error;

/// A schema-enumerated attribute value did not match any known enumerator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("'{value}' is not a valid {enumeration}")]
pub struct EnumerationError {
    /// Name of the enumeration (e.g. "DimensionOrder")
    pub enumeration: &'static str,

    /// The rejected value
    pub value: String,
}

impl EnumerationError {
    pub fn new(enumeration: &'static str, value: impl Into<String>) -> Self {
        EnumerationError {
            enumeration,
            value: value.into(),
        }
    }
}

/// Errors raised while building, mutating or resolving an OME model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// An ID is already registered to a different model object
    #[error("Duplicate ID: '{0}' is already registered to another object")]
    DuplicateId(String),

    /// No model object is registered under the ID
    #[error("ID not found: '{0}'")]
    NotFound(String),

    /// An element that requires an ID attribute does not have one
    #[error("{element} missing required ID property")]
    MissingId { element: &'static str },

    /// A single-occurrence child element appeared more than once
    #[error("{child} node list size {count} != 1 in {element}")]
    TooManyChildren {
        element: &'static str,
        child: &'static str,
        count: usize,
    },

    /// An attribute or text value could not be converted to its schema type
    #[error("Invalid value for {element}/{property}: {message}")]
    InvalidValue {
        element: &'static str,
        property: &'static str,
        message: String,
    },

    /// Enumeration validation error
    #[error("Enumeration error: {0}")]
    Enumeration(#[from] EnumerationError),

    /// A metadata store setter addressed an object slot that cannot be
    /// filled: past the next free index, or holding a different ID
    #[error("Cannot store {element} at index {index}")]
    StoreIndex { element: &'static str, index: usize },

    /// The document root is not in an accepted OME namespace
    #[error("Unsupported namespace: {0}")]
    UnsupportedNamespace(String),

    /// References remained unresolved under a strict resolution policy
    #[error("{count} reference(s) could not be resolved")]
    UnresolvedReferences { count: usize },

    /// The XML text could not be parsed
    #[error("XML error: {0}")]
    Xml(#[from] roxmltree::Error),

    /// I/O error while reading or writing a document
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ModelError {
    /// Shorthand for building an [`ModelError::InvalidValue`].
    pub(crate) fn invalid(
        element: &'static str,
        property: &'static str,
        message: impl Into<String>,
    ) -> Self {
        ModelError::InvalidValue {
            element,
            property,
            message: message.into(),
        }
    }
}

/// Crate-specific result type.
pub type ModelResult<T> = std::result::Result<T, ModelError>;
