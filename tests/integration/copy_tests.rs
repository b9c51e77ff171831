//! Copy-conversion and serialization tests.

use ome_model::model::Image;
use ome_model::{
    convert_metadata, MetadataRetrieve, MetadataRoot, MetadataStore, ModelError,
    OmeXmlMetadataRoot, XmlElement, OME_NAMESPACE,
};

use super::test_utils::{parse, OmeDocumentBuilder};

fn sample_document() -> String {
    sample_builder().build()
}

fn sample_builder() -> OmeDocumentBuilder {
    OmeDocumentBuilder::new()
        .creator("copy-tests")
        .dataset(r#"<Dataset ID="Dataset:0"><ImageRef ID="Image:0"/></Dataset>"#)
        .experimenter("Experimenter:0", "Ada")
        .simple_instrument(0)
        .image(
            r#"<Image ID="Image:0" Name="cells">
                <ExperimenterRef ID="Experimenter:0"/>
                <InstrumentRef ID="Instrument:0"/>
                <ObjectiveSettings ID="Objective:0" Medium="Water"/>
                <Pixels ID="Pixels:0" DimensionOrder="XYZCT" Type="uint8" SizeX="2" SizeY="2" SizeZ="1" SizeC="1" SizeT="1">
                    <Channel ID="Channel:0:0"><DetectorSettings ID="Detector:0"/></Channel>
                </Pixels>
                <AnnotationRef ID="Annotation:0"/>
            </Image>"#,
        )
        .annotation(
            r#"<CommentAnnotation ID="Annotation:0" Annotator="Experimenter:0"><Value>ok</Value></CommentAnnotation>"#,
        )
        .roi("ROI:0")
}

#[test]
fn test_copy_equals_source() {
    let source = parse(&sample_document());
    let copy = OmeXmlMetadataRoot::from_metadata_root(&source).unwrap();

    assert!(copy == source);
    assert_eq!(copy.unresolved_count(), 0);
    assert_eq!(copy.model().len(), source.model().len());
    assert_eq!(copy.model().id_count(), source.model().id_count());
    assert_eq!(copy.creator(), Some("copy-tests"));
    assert_eq!(copy.channel_detector_ref(0, 0), Some("Detector:0"));
}

#[test]
fn test_mutating_copy_leaves_source_untouched() {
    let source = parse(&sample_document());
    let mut copy = OmeXmlMetadataRoot::from_metadata_root(&source).unwrap();

    let image = copy.images()[0];
    copy.model_mut().get_as_mut::<Image>(image).unwrap().name = Some("renamed".to_string());
    copy.model_mut().remove_model_object("ROI:0").unwrap();

    assert_eq!(copy.image_name(0), Some("renamed"));
    assert_eq!(source.image_name(0), Some("cells"));
    assert!(source.model().get_model_object("ROI:0").is_some());
    assert!(copy != source);
}

#[test]
fn test_copy_preserves_dangling_references() {
    let xml = sample_document().replace(r#"<ROI ID="ROI:0"/>"#, "").replace(
        r#"<AnnotationRef ID="Annotation:0"/>"#,
        r#"<AnnotationRef ID="Annotation:0"/><ROIRef ID="ROI:0"/>"#,
    );
    let source = parse(&xml);
    assert_eq!(source.unresolved_count(), 1);

    let copy = OmeXmlMetadataRoot::from_metadata_root(&source).unwrap();
    assert_eq!(copy.unresolved_count(), 1);
    assert_eq!(copy.model().unresolved_references()[0].target_id, "ROI:0");
    assert_eq!(copy.image_roi_ref_count(0), 1);
    assert_eq!(copy.image_roi_ref(0, 0), None);
}

#[test]
fn test_text_round_trip() {
    let source = parse(&sample_document());
    let text = source.to_xml_string();

    let reparsed = parse(&text);
    assert!(reparsed == source);
    // Serializing again yields the same text
    assert_eq!(reparsed.to_xml_string(), text);
}

#[test]
fn test_serialized_document_layout() {
    let source = parse(&sample_document());
    let element = source.to_element();

    assert_eq!(element.name, "OME");
    assert_eq!(element.namespace.as_deref(), Some(OME_NAMESPACE));
    assert_eq!(element.attribute("Creator"), Some("copy-tests"));

    let names: Vec<&str> = element
        .children
        .iter()
        .map(|child| child.name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Dataset",
            "Experimenter",
            "Instrument",
            "Image",
            "StructuredAnnotations",
            "ROI"
        ]
    );
}

/// A root assembled by hand rather than parsed.
struct HandBuiltRoot;

impl MetadataRoot for HandBuiltRoot {
    fn to_element(&self) -> XmlElement {
        let mut image = XmlElement::new("Image");
        image.set_attribute("ID", "Image:hand");
        let mut experimenter_ref = XmlElement::new("ExperimenterRef");
        experimenter_ref.set_attribute("ID", "Experimenter:hand");
        image.push_child(experimenter_ref);

        let mut experimenter = XmlElement::new("Experimenter");
        experimenter.set_attribute("ID", "Experimenter:hand");

        let mut root = XmlElement::new("OME");
        root.namespace = Some(OME_NAMESPACE.to_string());
        root.push_child(image);
        root.push_child(experimenter);
        root
    }
}

#[test]
fn test_copy_from_other_root_implementation() {
    let copy = OmeXmlMetadataRoot::from_metadata_root(&HandBuiltRoot).unwrap();

    assert_eq!(copy.unresolved_count(), 0);
    assert_eq!(copy.image_id(0), Some("Image:hand"));
    assert_eq!(copy.image_experimenter_ref(0), Some("Experimenter:hand"));
    assert_eq!(copy.experimenter_count(), 1);
}

#[test]
fn test_store_conversion_matches_copy() {
    let xml = sample_builder()
        .plate(r#"<Plate ID="Plate:0" Rows="2"><AnnotationRef ID="Annotation:0"/></Plate>"#)
        .build();
    let source = parse(&xml);
    assert_eq!(source.plate_count(), 1);

    let mut stored = OmeXmlMetadataRoot::new();
    convert_metadata(&source, &mut stored).unwrap();
    assert_eq!(stored.resolve_references(), 0);

    let copied = OmeXmlMetadataRoot::from_metadata_root(&source).unwrap();
    assert!(stored == copied);
    assert_eq!(stored.plate_annotation_ref(0, 0), Some("Annotation:0"));
    assert_eq!(stored.channel_detector_ref(0, 0), Some("Detector:0"));
}

#[test]
fn test_store_rejects_out_of_order_objects() {
    let mut store = OmeXmlMetadataRoot::new();
    store.set_roi_id("ROI:0", 0).unwrap();

    let err = store.set_rectangle_id("Shape:1", 0, 1).unwrap_err();
    assert!(matches!(err, ModelError::StoreIndex { index: 1, .. }));
    assert!(store.set_rectangle_id("Shape:0", 0, 0).is_ok());
    assert_eq!(store.shape_count(0), 1);
}
