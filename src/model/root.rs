//! Document root of an OME-XML object graph.
//!
//! [`OmeXmlMetadataRoot`] owns the [`OmeModel`] of one document together
//! with the top-level objects found under the `OME` element. Building a root
//! walks the whole DOM tree and then runs the resolution pass exactly once.
//!
//! # Example
//!
//! ```
//! use ome_model::config::ParseConfig;
//! use ome_model::model::OmeXmlMetadataRoot;
//!
//! let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
//!     <Instrument ID="Instrument:0"><Detector ID="Detector:1"/></Instrument>
//!     <Image ID="Image:0">
//!         <InstrumentRef ID="Instrument:0"/>
//!         <Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="uint8">
//!             <Channel ID="Channel:0:0"><DetectorSettings ID="Detector:1"/></Channel>
//!         </Pixels>
//!     </Image>
//! </OME>"#;
//!
//! let root = OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default()).unwrap();
//! assert_eq!(root.unresolved_count(), 0);
//! assert_eq!(root.images().len(), 1);
//! ```

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use crate::config::ParseConfig;
use crate::error::{ModelError, ModelResult};
use crate::xml::{DomElement, XmlElement};

use super::elements::{
    Dataset, Experimenter, Image, Instrument, Plate, Roi, StructuredAnnotations,
};
use super::object::{ModelVisitor, NodeId};
use super::parse::{attr_string, build_children, check_tag, single_child, write_children};
use super::registry::OmeModel;

/// Namespace of the supported OME-XML schema.
pub const OME_NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";

/// Element name of the document root.
pub const OME_ELEMENT: &str = "OME";

/// Direct children of `OME` that are built into the model.
const SUPPORTED_CHILDREN: &[&str] = &[
    Dataset::ELEMENT,
    Plate::ELEMENT,
    Experimenter::ELEMENT,
    Instrument::ELEMENT,
    Image::ELEMENT,
    StructuredAnnotations::ELEMENT,
    Roi::ELEMENT,
];

// =============================================================================
// MetadataRoot
// =============================================================================

/// A metadata document root, independent of how it is held in memory.
///
/// Any implementation can be copy-converted into an
/// [`OmeXmlMetadataRoot`] with [`OmeXmlMetadataRoot::from_metadata_root`].
pub trait MetadataRoot {
    /// Serialize the whole document to an `OME` element tree.
    fn to_element(&self) -> XmlElement;
}

// =============================================================================
// OmeXmlMetadataRoot
// =============================================================================

/// The OME-XML document root and the model it owns.
#[derive(Debug, Clone, Default)]
pub struct OmeXmlMetadataRoot {
    pub(crate) model: OmeModel,
    pub(crate) uuid: Option<String>,
    pub(crate) creator: Option<String>,
    pub(crate) datasets: Vec<NodeId>,
    pub(crate) plates: Vec<NodeId>,
    pub(crate) experimenters: Vec<NodeId>,
    pub(crate) instruments: Vec<NodeId>,
    pub(crate) images: Vec<NodeId>,
    pub(crate) structured_annotations: Option<NodeId>,
    pub(crate) rois: Vec<NodeId>,
    pub(crate) unresolved: usize,
}

impl OmeXmlMetadataRoot {
    /// An empty document, to be filled through
    /// [`MetadataStore`](crate::meta::MetadataStore).
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the object graph below an `OME` element and resolve references.
    ///
    /// # Arguments
    /// * `element` - The `OME` element
    /// * `model` - Registry to build into, normally empty
    ///
    /// # Errors
    /// Any construction failure (missing ID, duplicate ID, invalid value)
    /// aborts the build; the partially filled model is dropped.
    pub fn from_element<E: DomElement>(element: &E, mut model: OmeModel) -> ModelResult<Self> {
        check_tag(element, OME_ELEMENT);

        for child in element.child_elements() {
            let name = child.local_name();
            if !element.shares_namespace(&child) {
                debug!("Ignoring element {} outside the OME namespace", name);
            } else if !SUPPORTED_CHILDREN.contains(&name) {
                debug!("Ignoring unsupported element {}", name);
            }
        }

        let datasets = build_children(element, Dataset::ELEMENT, &mut model, Dataset::from_element)?;
        let plates = build_children(element, Plate::ELEMENT, &mut model, Plate::from_element)?;
        let experimenters = build_children(
            element,
            Experimenter::ELEMENT,
            &mut model,
            Experimenter::from_element,
        )?;
        let instruments =
            build_children(element, Instrument::ELEMENT, &mut model, Instrument::from_element)?;
        let images = build_children(element, Image::ELEMENT, &mut model, Image::from_element)?;
        let structured_annotations =
            match single_child(element, OME_ELEMENT, StructuredAnnotations::ELEMENT)? {
                Some(child) => Some(StructuredAnnotations::from_element(&child, &mut model)?),
                None => None,
            };
        let rois = build_children(element, Roi::ELEMENT, &mut model, Roi::from_element)?;

        let unresolved = model.resolve_references();
        info!(
            objects = model.len(),
            ids = model.id_count(),
            unresolved,
            "Built OME-XML model"
        );

        Ok(OmeXmlMetadataRoot {
            model,
            uuid: attr_string(element, "UUID"),
            creator: attr_string(element, "Creator"),
            datasets,
            plates,
            experimenters,
            instruments,
            images,
            structured_annotations,
            rois,
            unresolved,
        })
    }

    /// Parse an OME-XML document from text.
    ///
    /// # Errors
    /// * `Xml` - The text is not well-formed XML
    /// * `UnsupportedNamespace` - The root namespace is not accepted by `config`
    /// * `UnresolvedReferences` - References dangle and `config` is strict
    pub fn parse_str(xml: &str, config: &ParseConfig) -> ModelResult<Self> {
        let document = roxmltree::Document::parse(xml)?;
        let element = document.root_element();

        let namespace = element.namespace_uri();
        if !config.accepts_namespace(namespace) {
            return Err(ModelError::UnsupportedNamespace(
                namespace.unwrap_or_default().to_string(),
            ));
        }

        let root = Self::from_element(&element, OmeModel::new())?;
        if config.strict_references && root.unresolved > 0 {
            return Err(ModelError::UnresolvedReferences {
                count: root.unresolved,
            });
        }
        Ok(root)
    }

    /// Read and parse an OME-XML file.
    pub fn from_file(path: impl AsRef<Path>, config: &ParseConfig) -> ModelResult<Self> {
        let path = path.as_ref();
        debug!("Reading {}", path.display());
        let xml = fs::read_to_string(path)?;
        Self::parse_str(&xml, config)
    }

    /// Copy-convert another metadata root into a fresh model.
    ///
    /// The source is serialized and rebuilt, so the result shares no
    /// objects with it. The copy runs its own resolution pass.
    pub fn from_metadata_root(source: &dyn MetadataRoot) -> ModelResult<Self> {
        let element = source.to_element();
        Self::from_element(&&element, OmeModel::new())
    }

    /// Serialize to a pretty-printed OME-XML document.
    pub fn to_xml_string(&self) -> String {
        MetadataRoot::to_element(self).to_document_string()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn model(&self) -> &OmeModel {
        &self.model
    }

    /// Mutable access to the model.
    ///
    /// Call [`OmeXmlMetadataRoot::resolve_references`] after registering new
    /// objects to bind pending references and refresh the unresolved count.
    pub fn model_mut(&mut self) -> &mut OmeModel {
        &mut self.model
    }

    pub fn uuid(&self) -> Option<&str> {
        self.uuid.as_deref()
    }

    pub fn creator(&self) -> Option<&str> {
        self.creator.as_deref()
    }

    pub fn datasets(&self) -> &[NodeId] {
        &self.datasets
    }

    pub fn plates(&self) -> &[NodeId] {
        &self.plates
    }

    pub fn experimenters(&self) -> &[NodeId] {
        &self.experimenters
    }

    pub fn instruments(&self) -> &[NodeId] {
        &self.instruments
    }

    pub fn images(&self) -> &[NodeId] {
        &self.images
    }

    pub fn structured_annotations(&self) -> Option<NodeId> {
        self.structured_annotations
    }

    pub fn rois(&self) -> &[NodeId] {
        &self.rois
    }

    /// Number of references left unresolved by the last resolution pass.
    pub fn unresolved_count(&self) -> usize {
        self.unresolved
    }

    /// Run the resolution pass again and return the new unresolved count.
    ///
    /// Already-resolved references are not touched.
    pub fn resolve_references(&mut self) -> usize {
        self.unresolved = self.model.resolve_references();
        self.unresolved
    }

    /// Top-level objects in schema order: datasets, plates, experimenters,
    /// instruments, images, the annotation container, then ROIs. Objects of
    /// one kind keep their document order.
    pub fn top_level(&self) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        nodes.extend_from_slice(&self.datasets);
        nodes.extend_from_slice(&self.plates);
        nodes.extend_from_slice(&self.experimenters);
        nodes.extend_from_slice(&self.instruments);
        nodes.extend_from_slice(&self.images);
        nodes.extend(self.structured_annotations);
        nodes.extend_from_slice(&self.rois);
        nodes
    }

    /// Walk every top-level object and its descendants.
    pub fn accept<V: ModelVisitor + ?Sized>(&self, visitor: &mut V) {
        for node in self.top_level() {
            self.model.accept(node, visitor);
        }
    }
}

impl MetadataRoot for OmeXmlMetadataRoot {
    fn to_element(&self) -> XmlElement {
        let mut element = XmlElement::new(OME_ELEMENT);
        element.namespace = Some(OME_NAMESPACE.to_string());
        element.set_optional_attribute("UUID", self.uuid.as_deref());
        element.set_optional_attribute("Creator", self.creator.as_deref());
        write_children(&mut element, &self.model, &self.top_level());
        element
    }
}

impl PartialEq for OmeXmlMetadataRoot {
    /// Roots are equal when they serialize to the same element tree.
    fn eq(&self, other: &Self) -> bool {
        MetadataRoot::to_element(self) == MetadataRoot::to_element(other)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::elements::{Channel, Detector, DetectorSettings, Pixels};
    use crate::model::object::{ModelObject, ObjectKind};
    use crate::model::reference::ReferenceKind;

    const DETECTOR_DOCUMENT: &str = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
        <Instrument ID="Instrument:0">
            <Detector ID="Detector:1" Type="CCD"/>
        </Instrument>
        <Image ID="Image:0">
            <InstrumentRef ID="Instrument:0"/>
            <Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="uint8" SizeX="1" SizeY="1" SizeZ="1" SizeC="1" SizeT="1">
                <Channel ID="Channel:0:0">
                    <DetectorSettings ID="Detector:1"/>
                </Channel>
            </Pixels>
        </Image>
    </OME>"#;

    fn parse(xml: &str) -> OmeXmlMetadataRoot {
        OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default()).unwrap()
    }

    fn detector_settings(root: &OmeXmlMetadataRoot) -> NodeId {
        let model = root.model();
        let image = model.get_as::<Image>(root.images()[0]).unwrap();
        let pixels = model.get_as::<Pixels>(image.pixels.unwrap()).unwrap();
        let channel = model.get_as::<Channel>(pixels.channels[0]).unwrap();
        channel.detector_settings.unwrap()
    }

    #[test]
    fn test_detector_settings_resolve_to_detector() {
        let root = parse(DETECTOR_DOCUMENT);
        assert_eq!(root.unresolved_count(), 0);

        let model = root.model();
        let settings = detector_settings(&root);
        assert!(model.get_as::<DetectorSettings>(settings).is_some());

        let linked = model.linked(settings, ReferenceKind::DetectorRef);
        assert_eq!(linked.len(), 1);
        let detector = model.get_as::<Detector>(linked[0]).unwrap();
        assert_eq!(detector.id, "Detector:1");
    }

    #[test]
    fn test_missing_detector_leaves_one_unresolved() {
        let xml = DETECTOR_DOCUMENT.replace(r#"<Detector ID="Detector:1" Type="CCD"/>"#, "");
        let root = parse(&xml);
        assert_eq!(root.unresolved_count(), 1);

        let dangling = root.model().unresolved_references();
        assert_eq!(dangling.len(), 1);
        assert_eq!(dangling[0].kind, ReferenceKind::DetectorRef);
        assert_eq!(dangling[0].target_id, "Detector:1");
    }

    #[test]
    fn test_duplicate_id_aborts_build() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <Image ID="Image:0"/>
            <Image ID="Image:0"/>
        </OME>"#;
        let err = OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::DuplicateId(ref id) if id == "Image:0"));
    }

    #[test]
    fn test_strict_mode_rejects_dangling_references() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <Image ID="Image:0"><ExperimenterRef ID="Experimenter:9"/></Image>
        </OME>"#;
        let config = ParseConfig {
            strict_references: true,
            ..ParseConfig::default()
        };
        let err = OmeXmlMetadataRoot::parse_str(xml, &config).unwrap_err();
        assert!(matches!(err, ModelError::UnresolvedReferences { count: 1 }));

        // Lenient mode only counts
        assert_eq!(parse(xml).unresolved_count(), 1);
    }

    #[test]
    fn test_namespace_allow_list() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2015-01"/>"#;
        let err = OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedNamespace(ref ns) if ns.ends_with("2015-01")));

        let config = ParseConfig {
            accepted_namespaces: Vec::new(),
            ..ParseConfig::default()
        };
        assert!(OmeXmlMetadataRoot::parse_str(xml, &config).is_ok());
    }

    #[test]
    fn test_malformed_xml() {
        let err = OmeXmlMetadataRoot::parse_str("<OME>", &ParseConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::Xml(_)));
    }

    #[test]
    fn test_unknown_children_are_ignored() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <Screen ID="Screen:0"/>
            <Image ID="Image:0"/>
        </OME>"#;
        let root = parse(xml);
        assert_eq!(root.images().len(), 1);
        assert!(root.model().get_model_object("Screen:0").is_none());
    }

    #[test]
    fn test_top_level_follows_schema_order() {
        // Document order differs from schema order
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <ROI ID="ROI:0"/>
            <Image ID="Image:0"/>
            <Plate ID="Plate:0"/>
            <Dataset ID="Dataset:0"/>
        </OME>"#;
        let root = parse(xml);
        let ids: Vec<&str> = root
            .top_level()
            .into_iter()
            .filter_map(|node| root.model().get(node).and_then(ModelObject::id))
            .collect();
        assert_eq!(ids, vec!["Dataset:0", "Plate:0", "Image:0", "ROI:0"]);
    }

    #[test]
    fn test_plate_and_shapes_resolve_annotations() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <Plate ID="Plate:0"><AnnotationRef ID="Annotation:0"/></Plate>
            <Image ID="Image:0"><ROIRef ID="ROI:0"/></Image>
            <StructuredAnnotations>
                <TagAnnotation ID="Annotation:0"><Value>plate</Value></TagAnnotation>
                <TagAnnotation ID="Annotation:1"><Value>shape</Value></TagAnnotation>
            </StructuredAnnotations>
            <ROI ID="ROI:0">
                <Union>
                    <Rectangle ID="Shape:0" X="0" Y="0" Width="2" Height="2">
                        <AnnotationRef ID="Annotation:1"/>
                    </Rectangle>
                    <Point ID="Shape:1" X="1" Y="1"><AnnotationRef ID="Annotation:9"/></Point>
                </Union>
            </ROI>
        </OME>"#;
        let root = parse(xml);
        assert_eq!(root.plates().len(), 1);
        // Only the Point's annotation link dangles
        assert_eq!(root.unresolved_count(), 1);
        let dangling = root.model().unresolved_references();
        assert_eq!(dangling[0].source_id.as_deref(), Some("Shape:1"));

        let model = root.model();
        let rectangle = model.lookup("Shape:0").unwrap();
        let tag = model.lookup("Annotation:1").unwrap();
        assert_eq!(model.linked(rectangle, ReferenceKind::AnnotationRef), vec![tag]);
        let plate = model.lookup("Plate:0").unwrap();
        assert_eq!(
            model.linked(plate, ReferenceKind::AnnotationRef),
            vec![model.lookup("Annotation:0").unwrap()]
        );

        let reparsed = parse(&root.to_xml_string());
        assert!(reparsed == root);
        assert_eq!(reparsed.unresolved_count(), 1);
    }

    #[test]
    fn test_whitespace_in_attributes_survives_round_trip() {
        let xml = r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">
            <Image ID="Image:0" Name="line1&#10;line2&#9;tab"/>
        </OME>"#;
        let root = parse(xml);
        let name = |root: &OmeXmlMetadataRoot| {
            root.model()
                .get_as::<Image>(root.images()[0])
                .and_then(|image| image.name.clone())
        };
        assert_eq!(name(&root).as_deref(), Some("line1\nline2\ttab"));

        let reparsed = parse(&root.to_xml_string());
        assert_eq!(name(&reparsed).as_deref(), Some("line1\nline2\ttab"));
        assert!(reparsed == root);
    }

    #[test]
    fn test_copy_is_independent() {
        let root = parse(DETECTOR_DOCUMENT);
        let mut copy = OmeXmlMetadataRoot::from_metadata_root(&root).unwrap();
        assert_eq!(copy.unresolved_count(), 0);
        assert!(copy == root);

        // Mutating the copy leaves the source untouched
        copy.model_mut().remove_model_object("Detector:1").unwrap();
        assert!(copy.model().get_model_object("Detector:1").is_none());
        assert!(root.model().get_model_object("Detector:1").is_some());
    }

    #[test]
    fn test_round_trip_through_text() {
        let root = parse(DETECTOR_DOCUMENT);
        let text = root.to_xml_string();
        assert!(text.starts_with("<?xml"));
        assert!(text.contains(r#"<OME xmlns="http://www.openmicroscopy.org/Schemas/OME/2016-06">"#));

        let reparsed = parse(&text);
        assert!(reparsed == root);
        assert_eq!(reparsed.model().len(), root.model().len());
    }

    #[test]
    fn test_round_trip_keeps_dangling_reference_ids() {
        let xml = DETECTOR_DOCUMENT.replace(r#"<Detector ID="Detector:1" Type="CCD"/>"#, "");
        let root = parse(&xml);
        let reparsed = parse(&root.to_xml_string());
        assert_eq!(reparsed.unresolved_count(), 1);
        assert!(reparsed == root);
    }

    #[test]
    fn test_late_registration_through_root() {
        let xml = DETECTOR_DOCUMENT.replace(r#"<Detector ID="Detector:1" Type="CCD"/>"#, "");
        let mut root = parse(&xml);
        assert_eq!(root.unresolved_count(), 1);

        let model = root.model_mut();
        let detector = model.insert(Detector::new("Detector:1"));
        model.add_model_object("Detector:1", detector).unwrap();
        assert_eq!(root.resolve_references(), 0);
    }

    struct KindCounter(Vec<(ObjectKind, usize)>);

    impl ModelVisitor for KindCounter {
        fn visit(&mut self, _node: NodeId, object: &ModelObject, depth: usize) {
            self.0.push((object.kind(), depth));
        }
    }

    #[test]
    fn test_accept_walks_whole_document() {
        let root = parse(DETECTOR_DOCUMENT);
        let mut counter = KindCounter(Vec::new());
        root.accept(&mut counter);

        assert_eq!(
            counter.0,
            vec![
                (ObjectKind::Instrument, 0),
                (ObjectKind::Detector, 1),
                (ObjectKind::Image, 0),
                (ObjectKind::Pixels, 1),
                (ObjectKind::Channel, 2),
                (ObjectKind::DetectorSettings, 3),
            ]
        );
    }
}
