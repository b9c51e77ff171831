//! Reference resolution tests.

use ome_model::model::{Detector, Experimenter};
use ome_model::{MetadataRetrieve, ModelError, ObjectKind, OmeXmlMetadataRoot, ReferenceKind};

use super::test_utils::{parse, strict, OmeDocumentBuilder};

fn detector_document() -> OmeDocumentBuilder {
    OmeDocumentBuilder::new()
        .simple_instrument(1)
        .image_with_detector(0, "Detector:1")
}

#[test]
fn test_detector_settings_bind_to_detector() {
    let root = parse(&detector_document().build());
    assert_eq!(root.unresolved_count(), 0);
    assert_eq!(root.channel_detector_ref(0, 0), Some("Detector:1"));

    let model = root.model();
    let detector = model.lookup("Detector:1").unwrap();
    let sources = model.references_to(detector);
    assert_eq!(sources.len(), 1);
    assert_eq!(sources[0].1, ReferenceKind::DetectorRef);
    assert_eq!(
        model.get(sources[0].0).map(|object| object.kind()),
        Some(ObjectKind::DetectorSettings)
    );
}

#[test]
fn test_missing_target_counts_once() {
    let xml = OmeDocumentBuilder::new()
        .image_with_detector(0, "Detector:1")
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 1);
    assert_eq!(root.model().unresolved_count(), 1);
    // Dangling references are not exposed as links
    assert_eq!(root.channel_detector_ref(0, 0), None);

    let dangling = root.model().unresolved_references();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].kind, ReferenceKind::DetectorRef);
    assert_eq!(dangling[0].target_id, "Detector:1");
    assert_eq!(dangling[0].source_id, None);
    assert!(dangling[0].to_string().contains("'Detector:1'"));
}

#[test]
fn test_each_dangling_reference_is_counted() {
    let xml = OmeDocumentBuilder::new()
        .image(
            r#"<Image ID="Image:0">
                <ExperimenterRef ID="Experimenter:9"/>
                <InstrumentRef ID="Instrument:9"/>
                <ROIRef ID="ROI:9"/>
                <AnnotationRef ID="Annotation:9"/>
            </Image>"#,
        )
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 4);

    let kinds: Vec<ReferenceKind> = root
        .model()
        .unresolved_references()
        .iter()
        .map(|reference| reference.kind)
        .collect();
    assert_eq!(
        kinds,
        vec![
            ReferenceKind::ExperimenterRef,
            ReferenceKind::InstrumentRef,
            ReferenceKind::RoiRef,
            ReferenceKind::AnnotationRef,
        ]
    );
}

#[test]
fn test_wrong_kind_target_stays_unresolved() {
    // Objective:1 exists but a DetectorRef cannot bind to it
    let root = parse(
        &OmeDocumentBuilder::new()
            .simple_instrument(1)
            .image_with_detector(0, "Objective:1")
            .build(),
    );

    assert_eq!(root.unresolved_count(), 1);
    assert_eq!(root.channel_detector_ref(0, 0), None);
    let objective = root.model().lookup("Objective:1").unwrap();
    assert!(root.model().references_to(objective).is_empty());
}

#[test]
fn test_annotator_binds_only_to_experimenter() {
    let xml = OmeDocumentBuilder::new()
        .experimenter("Experimenter:0", "Ada")
        .image(r#"<Image ID="Image:0"/>"#)
        .annotation(
            r#"<TagAnnotation ID="Annotation:0" Annotator="Experimenter:0"><Value>a</Value></TagAnnotation>"#,
        )
        .annotation(
            r#"<TagAnnotation ID="Annotation:1" Annotator="Image:0"><Value>b</Value></TagAnnotation>"#,
        )
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 1);
    assert_eq!(root.tag_annotation_value(1), Some("b"));

    let dangling = root.model().unresolved_references();
    assert_eq!(dangling[0].kind, ReferenceKind::Annotator);
    assert_eq!(dangling[0].source_id.as_deref(), Some("Annotation:1"));
}

#[test]
fn test_annotations_can_reference_annotations() {
    let xml = OmeDocumentBuilder::new()
        .annotation(
            r#"<CommentAnnotation ID="Annotation:0">
                <Value>see tag</Value>
                <AnnotationRef ID="Annotation:1"/>
            </CommentAnnotation>"#,
        )
        .annotation(r#"<TagAnnotation ID="Annotation:1"><Value>t</Value></TagAnnotation>"#)
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 0);
}

#[test]
fn test_repeat_resolution_returns_same_count() {
    let xml = OmeDocumentBuilder::new()
        .simple_instrument(1)
        .image_with_detector(0, "Detector:1")
        .image_with_detector(1, "Detector:2")
        .build();

    let mut root = parse(&xml);
    assert_eq!(root.unresolved_count(), 1);
    assert_eq!(root.resolve_references(), 1);
    assert_eq!(root.resolve_references(), 1);
    assert_eq!(root.channel_detector_ref(0, 0), Some("Detector:1"));
}

#[test]
fn test_removed_target_keeps_existing_binding() {
    let mut root = parse(&detector_document().build());
    let detector = root.model_mut().remove_model_object("Detector:1").unwrap();

    assert!(root.model().get_model_object("Detector:1").is_none());
    assert_eq!(root.resolve_references(), 0);
    // The object stays in the arena and the bound reference still reports it
    assert!(root.model().get_as::<Detector>(detector).is_some());
    assert_eq!(root.channel_detector_ref(0, 0), Some("Detector:1"));
}

#[test]
fn test_removed_target_before_resolution_is_unresolved() {
    // Same document as the Detector case, without the Detector element
    let xml = detector_document()
        .build()
        .replace(r#"<Detector ID="Detector:1" Type="CCD"/>"#, "");

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 1);
    assert!(root.model().get_model_object("Detector:1").is_none());
}

#[test]
fn test_late_registration_resolves() {
    let xml = OmeDocumentBuilder::new()
        .image(r#"<Image ID="Image:0"><ExperimenterRef ID="Experimenter:5"/></Image>"#)
        .build();

    let mut root = parse(&xml);
    assert_eq!(root.unresolved_count(), 1);
    assert_eq!(root.image_experimenter_ref(0), None);

    let model = root.model_mut();
    let experimenter = model.insert(Experimenter::new("Experimenter:5"));
    model.add_model_object("Experimenter:5", experimenter).unwrap();

    assert_eq!(root.resolve_references(), 0);
    assert_eq!(root.image_experimenter_ref(0), Some("Experimenter:5"));
}

#[test]
fn test_strict_policy() {
    let dangling = OmeDocumentBuilder::new()
        .image_with_detector(0, "Detector:1")
        .build();
    let err = OmeXmlMetadataRoot::parse_str(&dangling, &strict()).unwrap_err();
    assert!(matches!(err, ModelError::UnresolvedReferences { count: 1 }));
    assert_eq!(err.to_string(), "1 reference(s) could not be resolved");

    let complete = detector_document().build();
    let root = OmeXmlMetadataRoot::parse_str(&complete, &strict()).unwrap();
    assert_eq!(root.unresolved_count(), 0);
}
