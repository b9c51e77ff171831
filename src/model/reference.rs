//! ID-based references between model objects.
//!
//! A [`Reference`] is created while the DOM is walked, usually before its
//! target has been constructed. It records only the target ID; the
//! resolution pass in [`OmeModel`](super::OmeModel) later swaps the ID for
//! the target's [`NodeId`].

use std::fmt;

use serde::Serialize;

use super::object::{NodeId, ObjectKind};

// =============================================================================
// ReferenceKind
// =============================================================================

/// The relationship a reference expresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ReferenceKind {
    /// `<ExperimenterRef ID=".."/>`
    ExperimenterRef,
    /// `<InstrumentRef ID=".."/>`
    InstrumentRef,
    /// `<ImageRef ID=".."/>`
    ImageRef,
    /// `<ROIRef ID=".."/>`
    RoiRef,
    /// `<AnnotationRef ID=".."/>`
    AnnotationRef,
    /// `ObjectiveSettings/@ID`
    ObjectiveRef,
    /// `DetectorSettings/@ID`
    DetectorRef,
    /// `*Annotation/@Annotator`
    Annotator,
}

impl ReferenceKind {
    /// Name used in XML: the child element name for element references,
    /// the conventional reference name for attribute references.
    pub const fn name(self) -> &'static str {
        match self {
            ReferenceKind::ExperimenterRef => "ExperimenterRef",
            ReferenceKind::InstrumentRef => "InstrumentRef",
            ReferenceKind::ImageRef => "ImageRef",
            ReferenceKind::RoiRef => "ROIRef",
            ReferenceKind::AnnotationRef => "AnnotationRef",
            ReferenceKind::ObjectiveRef => "ObjectiveRef",
            ReferenceKind::DetectorRef => "DetectorRef",
            ReferenceKind::Annotator => "Annotator",
        }
    }

    /// Whether a reference of this kind may bind to an object of `kind`.
    pub const fn accepts(self, kind: ObjectKind) -> bool {
        match self {
            ReferenceKind::ExperimenterRef | ReferenceKind::Annotator => {
                matches!(kind, ObjectKind::Experimenter)
            }
            ReferenceKind::InstrumentRef => matches!(kind, ObjectKind::Instrument),
            ReferenceKind::ImageRef => matches!(kind, ObjectKind::Image),
            ReferenceKind::RoiRef => matches!(kind, ObjectKind::Roi),
            ReferenceKind::AnnotationRef => kind.is_annotation(),
            ReferenceKind::ObjectiveRef => matches!(kind, ObjectKind::Objective),
            ReferenceKind::DetectorRef => matches!(kind, ObjectKind::Detector),
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// =============================================================================
// Reference
// =============================================================================

/// Target of a reference: either the raw ID or the bound object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceTarget {
    Unresolved(String),
    Resolved(NodeId),
}

/// A typed pointer from one model object to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    kind: ReferenceKind,
    target: ReferenceTarget,
}

impl Reference {
    /// Create an unresolved reference to `target_id`.
    pub fn new(kind: ReferenceKind, target_id: impl Into<String>) -> Self {
        Reference {
            kind,
            target: ReferenceTarget::Unresolved(target_id.into()),
        }
    }

    pub fn kind(&self) -> ReferenceKind {
        self.kind
    }

    pub fn target(&self) -> &ReferenceTarget {
        &self.target
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.target, ReferenceTarget::Resolved(_))
    }

    /// The recorded target ID while unresolved.
    pub fn unresolved_id(&self) -> Option<&str> {
        match &self.target {
            ReferenceTarget::Unresolved(id) => Some(id),
            ReferenceTarget::Resolved(_) => None,
        }
    }

    /// The bound object once resolved.
    pub fn resolved_node(&self) -> Option<NodeId> {
        match self.target {
            ReferenceTarget::Resolved(node) => Some(node),
            ReferenceTarget::Unresolved(_) => None,
        }
    }

    /// Bind this reference to `node`, dropping the raw ID.
    pub(crate) fn bind(&mut self, node: NodeId) {
        self.target = ReferenceTarget::Resolved(node);
    }
}

/// Diagnostic record of a reference left dangling after resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedReference {
    /// Object the reference originates from
    pub source: NodeId,

    /// ID of the source object, when it has one
    pub source_id: Option<String>,

    /// Relationship kind
    pub kind: ReferenceKind,

    /// The ID that could not be bound
    pub target_id: String,
}

impl fmt::Display for UnresolvedReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source_id {
            Some(source_id) => write!(f, "{} {} -> '{}'", source_id, self.kind, self.target_id),
            None => write!(f, "{} {} -> '{}'", self.source, self.kind, self.target_id),
        }
    }
}
