//! Per-document registry of model objects and their references.
//!
//! The registry provides:
//! - An arena owning every model object of one document
//! - A unique ID → object mapping
//! - The pending references of every object, in registration order
//! - The resolution pass that binds references to their targets
//!
//! # Example
//!
//! ```
//! use ome_model::model::{
//!     Detector, DetectorSettings, OmeModel, Reference, ReferenceKind,
//! };
//!
//! let mut model = OmeModel::new();
//!
//! // The reference is recorded before its target exists
//! let settings = model.insert(DetectorSettings::default());
//! model.add_reference(settings, Reference::new(ReferenceKind::DetectorRef, "Detector:1"));
//!
//! let detector = model.insert(Detector::new("Detector:1"));
//! model.add_model_object("Detector:1", detector).unwrap();
//!
//! assert_eq!(model.resolve_references(), 0);
//! assert_eq!(model.linked(settings, ReferenceKind::DetectorRef), vec![detector]);
//! ```

use std::collections::{BTreeMap, HashMap};

use tracing::{debug, warn};

use crate::error::{ModelError, ModelResult};

use super::object::{ModelObject, ModelVisitor, NodeId, ObjectVariant};
use super::reference::{Reference, ReferenceKind, ReferenceTarget, UnresolvedReference};

// =============================================================================
// OmeModel
// =============================================================================

/// Registry for the model objects of one document.
///
/// Objects are never removed from the arena: [`OmeModel::remove_model_object`]
/// only unregisters the ID, so `NodeId`s and already-resolved references stay
/// valid for the lifetime of the model.
#[derive(Debug, Clone, Default)]
pub struct OmeModel {
    /// Arena of all objects, indexed by NodeId
    objects: Vec<ModelObject>,

    /// Registered IDs
    ids: HashMap<String, NodeId>,

    /// References keyed by the object they originate from
    references: BTreeMap<NodeId, Vec<Reference>>,
}

impl OmeModel {
    /// Create an empty model.
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Arena
    // -------------------------------------------------------------------------

    /// Store an object in the arena without registering its ID.
    pub fn insert(&mut self, object: impl Into<ModelObject>) -> NodeId {
        let node = NodeId::new(self.objects.len());
        self.objects.push(object.into());
        node
    }

    /// Get an object by arena index.
    pub fn get(&self, node: NodeId) -> Option<&ModelObject> {
        self.objects.get(node.index())
    }

    /// Get an object by arena index for mutation.
    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut ModelObject> {
        self.objects.get_mut(node.index())
    }

    /// Get an object as a concrete element type.
    ///
    /// Returns `None` if the node does not exist or holds another type.
    pub fn get_as<T: ObjectVariant>(&self, node: NodeId) -> Option<&T> {
        self.get(node).and_then(T::from_object)
    }

    /// Mutable variant of [`OmeModel::get_as`].
    pub fn get_as_mut<T: ObjectVariant>(&mut self, node: NodeId) -> Option<&mut T> {
        self.get_mut(node).and_then(T::from_object_mut)
    }

    /// Number of objects in the arena.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Iterate over all objects with their NodeIds.
    pub fn objects(&self) -> impl Iterator<Item = (NodeId, &ModelObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(index, object)| (NodeId::new(index), object))
    }

    // -------------------------------------------------------------------------
    // ID registry
    // -------------------------------------------------------------------------

    /// Register `node` under `id`.
    ///
    /// # Errors
    /// * `DuplicateId` - `id` is already bound to a different object
    /// * `NotFound` - `node` was not issued by this model
    ///
    /// Registering the identical object under the same ID again is a no-op.
    pub fn add_model_object(&mut self, id: &str, node: NodeId) -> ModelResult<()> {
        if node.index() >= self.objects.len() {
            return Err(ModelError::NotFound(format!("{} (object {})", id, node)));
        }

        match self.ids.get(id) {
            Some(existing) if *existing == node => {
                debug!(id = id, "Object already registered under this ID");
                Ok(())
            }
            Some(_) => Err(ModelError::DuplicateId(id.to_string())),
            None => {
                self.ids.insert(id.to_string(), node);
                Ok(())
            }
        }
    }

    /// Unregister `id`, returning the object it was bound to.
    pub fn remove_model_object(&mut self, id: &str) -> ModelResult<NodeId> {
        self.ids
            .remove(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    /// Look up the object registered under `id`.
    ///
    /// A miss is not an error; callers use this to test existence.
    pub fn get_model_object(&self, id: &str) -> Option<&ModelObject> {
        self.lookup(id).and_then(|node| self.get(node))
    }

    /// Look up the NodeId registered under `id`.
    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.ids.get(id).copied()
    }

    /// Number of registered IDs.
    pub fn id_count(&self) -> usize {
        self.ids.len()
    }

    // -------------------------------------------------------------------------
    // References
    // -------------------------------------------------------------------------

    /// Append `reference` to the references originating from `source`.
    ///
    /// No resolution is attempted here.
    pub fn add_reference(&mut self, source: NodeId, reference: Reference) {
        self.references.entry(source).or_default().push(reference);
    }

    /// Set the `index`-th reference of `reference.kind()` from `source`.
    ///
    /// An existing reference at that position is replaced; `index` equal to
    /// the current count of that kind appends. Returns `false`, changing
    /// nothing, when `index` is past the end.
    pub fn set_reference(&mut self, source: NodeId, index: usize, reference: Reference) -> bool {
        let kind = reference.kind();
        let references = self.references.entry(source).or_default();
        let positions: Vec<usize> = references
            .iter()
            .enumerate()
            .filter(|(_, existing)| existing.kind() == kind)
            .map(|(position, _)| position)
            .collect();

        match positions.get(index) {
            Some(position) => references[*position] = reference,
            None if index == positions.len() => references.push(reference),
            None => return false,
        }
        true
    }

    /// References originating from `source`, in registration order.
    pub fn references(&self, source: NodeId) -> &[Reference] {
        self.references
            .get(&source)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Resolved references pointing at `target`, as (source, kind) pairs.
    pub fn references_to(&self, target: NodeId) -> Vec<(NodeId, ReferenceKind)> {
        self.references
            .iter()
            .flat_map(|(source, references)| {
                references
                    .iter()
                    .filter(move |reference| reference.resolved_node() == Some(target))
                    .map(move |reference| (*source, reference.kind()))
            })
            .collect()
    }

    /// Resolved targets of one kind of reference from `source`.
    pub fn linked(&self, source: NodeId, kind: ReferenceKind) -> Vec<NodeId> {
        self.references(source)
            .iter()
            .filter(|reference| reference.kind() == kind)
            .filter_map(Reference::resolved_node)
            .collect()
    }

    /// Target IDs of one kind of reference from `source`, resolved or not.
    ///
    /// Resolved references report the target's current ID. This is what
    /// serialization writes back.
    pub fn reference_ids(&self, source: NodeId, kind: ReferenceKind) -> Vec<&str> {
        self.references(source)
            .iter()
            .filter(|reference| reference.kind() == kind)
            .filter_map(|reference| self.target_id(reference))
            .collect()
    }

    /// The ID a reference points at.
    pub fn target_id<'a>(&'a self, reference: &'a Reference) -> Option<&'a str> {
        match reference.target() {
            ReferenceTarget::Unresolved(id) => Some(id.as_str()),
            ReferenceTarget::Resolved(node) => self.get(*node).and_then(ModelObject::id),
        }
    }

    /// Resolve every pending reference against the registered IDs.
    ///
    /// For each unresolved reference, the target ID is looked up; on a hit
    /// whose object kind the reference accepts, the reference is bound.
    /// Misses and kind mismatches stay unresolved. References that are
    /// already resolved are left untouched, so calling this again is safe.
    ///
    /// # Returns
    /// The number of references still unresolved after the pass.
    pub fn resolve_references(&mut self) -> usize {
        let OmeModel {
            objects,
            ids,
            references,
        } = self;

        let mut bound = 0usize;
        let mut unresolved = 0usize;

        for (source, list) in references.iter_mut() {
            for reference in list.iter_mut() {
                let target_id = match reference.target() {
                    ReferenceTarget::Resolved(_) => continue,
                    ReferenceTarget::Unresolved(id) => id,
                };

                let Some(&target) = ids.get(target_id) else {
                    warn!(
                        source = %source,
                        kind = %reference.kind(),
                        target = %target_id,
                        "Unresolved reference: no object with this ID"
                    );
                    unresolved += 1;
                    continue;
                };

                let target_kind = objects[target.index()].kind();
                if !reference.kind().accepts(target_kind) {
                    warn!(
                        source = %source,
                        kind = %reference.kind(),
                        target = %target_id,
                        found = %target_kind,
                        "Unresolved reference: target has incompatible type"
                    );
                    unresolved += 1;
                    continue;
                }

                reference.bind(target);
                bound += 1;
            }
        }

        debug!(bound, unresolved, "Reference resolution complete");
        unresolved
    }

    /// Number of references currently unresolved.
    pub fn unresolved_count(&self) -> usize {
        self.references
            .values()
            .flatten()
            .filter(|reference| !reference.is_resolved())
            .count()
    }

    /// Describe every unresolved reference.
    pub fn unresolved_references(&self) -> Vec<UnresolvedReference> {
        self.references
            .iter()
            .flat_map(|(source, references)| {
                references.iter().filter_map(move |reference| {
                    reference.unresolved_id().map(|target_id| UnresolvedReference {
                        source: *source,
                        source_id: self.get(*source).and_then(ModelObject::id).map(str::to_string),
                        kind: reference.kind(),
                        target_id: target_id.to_string(),
                    })
                })
            })
            .collect()
    }

    // -------------------------------------------------------------------------
    // Traversal
    // -------------------------------------------------------------------------

    /// Walk the composition tree below `start` depth-first, parents first.
    pub fn accept<V: ModelVisitor + ?Sized>(&self, start: NodeId, visitor: &mut V) {
        self.accept_at(start, visitor, 0);
    }

    fn accept_at<V: ModelVisitor + ?Sized>(&self, node: NodeId, visitor: &mut V, depth: usize) {
        let Some(object) = self.get(node) else {
            return;
        };
        visitor.visit(node, object, depth);
        for child in object.children() {
            self.accept_at(child, visitor, depth + 1);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
