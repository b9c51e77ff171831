//! Document construction tests.

use ome_model::model::{DetectorType, DimensionOrder, Image, Medium, PixelType, Pixels, UnitsLength};
use ome_model::{MetadataRetrieve, ModelError, ObjectKind, OmeXmlMetadataRoot, ParseConfig};

use super::test_utils::{parse, KindCollector, OmeDocumentBuilder};

// =============================================================================
// Well-formed documents
// =============================================================================

#[test]
fn test_full_document_builds_every_element() {
    let xml = OmeDocumentBuilder::new()
        .creator("integration")
        .dataset(
            r#"<Dataset ID="Dataset:0" Name="plate scan">
                <ExperimenterRef ID="Experimenter:0"/>
                <ImageRef ID="Image:0"/>
            </Dataset>"#,
        )
        .experimenter("Experimenter:0", "Ada")
        .simple_instrument(0)
        .image(
            r#"<Image ID="Image:0" Name="cells">
                <AcquisitionDate>2021-03-04T10:11:12</AcquisitionDate>
                <ExperimenterRef ID="Experimenter:0"/>
                <Description>HeLa, fixed</Description>
                <InstrumentRef ID="Instrument:0"/>
                <ObjectiveSettings ID="Objective:0" Medium="Oil" RefractiveIndex="1.518"/>
                <Pixels ID="Pixels:0" DimensionOrder="XYCZT" Type="uint16"
                        SizeX="512" SizeY="256" SizeZ="3" SizeC="2" SizeT="1"
                        PhysicalSizeX="0.65" PhysicalSizeXUnit="nm" PhysicalSizeY="0.65">
                    <Channel ID="Channel:0:0" Name="DAPI" Color="-16776961">
                        <DetectorSettings ID="Detector:0" Gain="1.5"/>
                    </Channel>
                    <Channel ID="Channel:0:1" Name="GFP"/>
                    <Plane TheZ="0" TheC="0" TheT="0" ExposureTime="0.25"/>
                    <Plane TheZ="1" TheC="0" TheT="0"/>
                </Pixels>
                <ROIRef ID="ROI:0"/>
                <AnnotationRef ID="Annotation:0"/>
            </Image>"#,
        )
        .annotation(
            r#"<CommentAnnotation ID="Annotation:0" Annotator="Experimenter:0">
                <Value>looks good</Value>
            </CommentAnnotation>"#,
        )
        .annotation(r#"<LongAnnotation ID="Annotation:1"><Value>42</Value></LongAnnotation>"#)
        .roi("ROI:0")
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 0);
    assert_eq!(root.creator(), Some("integration"));

    assert_eq!(root.image_count(), 1);
    assert_eq!(root.image_name(0), Some("cells"));
    assert_eq!(root.image_description(0), Some("HeLa, fixed"));
    assert_eq!(
        root.image_acquisition_date(0).map(|date| date.to_string()),
        Some("2021-03-04T10:11:12".to_string())
    );
    assert_eq!(root.image_experimenter_ref(0), Some("Experimenter:0"));
    assert_eq!(root.image_instrument_ref(0), Some("Instrument:0"));
    assert_eq!(root.image_roi_ref(0, 0), Some("ROI:0"));
    assert_eq!(root.image_annotation_ref(0, 0), Some("Annotation:0"));

    assert_eq!(root.objective_settings_id(0), Some("Objective:0"));
    assert_eq!(root.objective_settings_medium(0), Some(Medium::Oil));
    assert_eq!(root.objective_settings_refractive_index(0), Some(1.518));

    assert_eq!(root.pixels_dimension_order(0), Some(DimensionOrder::Xyczt));
    assert_eq!(root.pixels_type(0), Some(PixelType::Uint16));
    assert_eq!(root.pixels_size_x(0).map(|size| size.get()), Some(512));
    assert_eq!(
        root.pixels_physical_size_x(0),
        Some((0.65, UnitsLength::Nanometer))
    );
    // Unit defaults to micrometers when the attribute is absent
    assert_eq!(
        root.pixels_physical_size_y(0),
        Some((0.65, UnitsLength::Micrometer))
    );
    assert_eq!(root.pixels_physical_size_z(0), None);

    assert_eq!(root.channel_count(0), 2);
    assert_eq!(root.channel_name(0, 1), Some("GFP"));
    assert_eq!(root.channel_color(0, 0), Some(-16776961));
    assert_eq!(root.channel_detector_ref(0, 0), Some("Detector:0"));
    assert_eq!(root.detector_settings_gain(0, 0), Some(1.5));
    assert_eq!(root.channel_detector_ref(0, 1), None);

    assert_eq!(root.plane_count(0), 2);
    assert_eq!(root.plane_the_z(0, 1).map(|z| z.get()), Some(1));
    assert_eq!(root.plane_exposure_time(0, 0), Some(0.25));

    assert_eq!(root.detector_type(0, 0), Some(DetectorType::Ccd));
    assert_eq!(root.objective_nominal_magnification(0, 0), Some(60.0));

    assert_eq!(root.experimenter_first_name(0), Some("Ada"));
    assert_eq!(root.dataset_name(0), Some("plate scan"));
    assert_eq!(root.dataset_image_ref(0, 0), Some("Image:0"));
    assert_eq!(root.roi_id(0), Some("ROI:0"));

    assert_eq!(root.comment_annotation_value(0), Some("looks good"));
    assert_eq!(root.comment_annotation_annotator(0), Some("Experimenter:0"));
    assert_eq!(root.long_annotation_value(0), Some(42));
    assert_eq!(root.tag_annotation_count(), 0);
}

#[test]
fn test_forward_references_need_no_ordering() {
    // The dataset comes first and points at everything declared after it
    let xml = OmeDocumentBuilder::new()
        .dataset(
            r#"<Dataset ID="Dataset:0">
                <ExperimenterRef ID="Experimenter:7"/>
                <ImageRef ID="Image:0"/>
                <ImageRef ID="Image:1"/>
            </Dataset>"#,
        )
        .experimenter("Experimenter:7", "Grace")
        .image(r#"<Image ID="Image:0"/>"#)
        .image(r#"<Image ID="Image:1"/>"#)
        .build();

    let root = parse(&xml);
    assert_eq!(root.unresolved_count(), 0);
    assert_eq!(root.dataset_experimenter_ref(0), Some("Experimenter:7"));
    assert_eq!(root.dataset_image_ref_count(0), 2);
    assert_eq!(root.dataset_image_ref(0, 1), Some("Image:1"));
}

#[test]
fn test_every_id_is_registered() {
    let xml = OmeDocumentBuilder::new()
        .simple_instrument(0)
        .image_with_detector(0, "Detector:0")
        .roi("ROI:0")
        .build();

    let root = parse(&xml);
    let model = root.model();
    for id in [
        "Instrument:0",
        "Detector:0",
        "Objective:0",
        "Image:0",
        "Pixels:0",
        "Channel:0:0",
        "ROI:0",
    ] {
        assert!(model.get_model_object(id).is_some(), "{} not registered", id);
    }

    // The ID names the Detector, not the DetectorSettings pointing at it
    assert_eq!(
        model.get_model_object("Detector:0").map(|object| object.kind()),
        Some(ObjectKind::Detector)
    );
}

#[test]
fn test_visitor_sees_composition_tree() {
    let xml = OmeDocumentBuilder::new()
        .simple_instrument(0)
        .simple_instrument(1)
        .image_with_detector(0, "Detector:1")
        .build();

    let root = parse(&xml);
    let mut collector = KindCollector::default();
    root.accept(&mut collector);

    assert_eq!(collector.count(ObjectKind::Instrument), 2);
    assert_eq!(collector.count(ObjectKind::Detector), 2);
    assert_eq!(collector.count(ObjectKind::DetectorSettings), 1);
    assert_eq!(collector.visited.len(), root.model().len());
    assert!(collector
        .visited
        .iter()
        .any(|&(kind, depth)| kind == ObjectKind::DetectorSettings && depth == 3));
}

#[test]
fn test_typed_access_through_model() {
    let xml = OmeDocumentBuilder::new()
        .image_with_detector(0, "Detector:0")
        .build();

    let root = parse(&xml);
    let model = root.model();
    let image = model.get_as::<Image>(root.images()[0]).unwrap();
    let pixels = model.get_as::<Pixels>(image.pixels.unwrap()).unwrap();
    assert_eq!(pixels.plane_count(), Some(1));
    assert!(model.get_as::<Pixels>(root.images()[0]).is_none());
}

// =============================================================================
// Construction failures
// =============================================================================

#[test]
fn test_missing_id_fails() {
    let xml = OmeDocumentBuilder::new()
        .image(r#"<Image Name="no id"/>"#)
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::MissingId { element: "Image" }));
}

#[test]
fn test_nested_missing_id_fails() {
    let xml = OmeDocumentBuilder::new()
        .instrument(r#"<Instrument ID="Instrument:0"><Detector Type="CCD"/></Instrument>"#)
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::MissingId { element: "Detector" }));
}

#[test]
fn test_invalid_enumeration_fails() {
    let xml = OmeDocumentBuilder::new()
        .image(r#"<Image ID="Image:0"><Pixels ID="Pixels:0" DimensionOrder="ZYX"/></Image>"#)
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    match err {
        ModelError::Enumeration(e) => {
            assert_eq!(e.enumeration, "DimensionOrder");
            assert_eq!(e.value, "ZYX");
        }
        other => panic!("expected enumeration error, got {:?}", other),
    }
}

#[test]
fn test_zero_size_is_invalid() {
    let xml = OmeDocumentBuilder::new()
        .image(r#"<Image ID="Image:0"><Pixels ID="Pixels:0" SizeX="0"/></Image>"#)
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::InvalidValue {
            element: "Pixels",
            property: "SizeX",
            ..
        }
    ));
}

#[test]
fn test_duplicate_pixels_fails() {
    let xml = OmeDocumentBuilder::new()
        .image(
            r#"<Image ID="Image:0">
                <Pixels ID="Pixels:0"/>
                <Pixels ID="Pixels:1"/>
            </Image>"#,
        )
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(
        err,
        ModelError::TooManyChildren {
            element: "Image",
            child: "Pixels",
            count: 2
        }
    ));
}

#[test]
fn test_duplicate_id_across_kinds_fails() {
    let xml = OmeDocumentBuilder::new()
        .experimenter("Shared:0", "Ada")
        .image(r#"<Image ID="Shared:0"/>"#)
        .build();

    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::DuplicateId(ref id) if id == "Shared:0"));
}

// =============================================================================
// Namespaces
// =============================================================================

#[test]
fn test_missing_namespace_rejected_by_default() {
    let xml = OmeDocumentBuilder::new().namespace(None).build();
    let err = OmeXmlMetadataRoot::parse_str(&xml, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::UnsupportedNamespace(ref ns) if ns.is_empty()));
}

#[test]
fn test_extra_namespace_can_be_allowed() {
    let legacy = "http://www.openmicroscopy.org/Schemas/OME/2015-01";
    let xml = OmeDocumentBuilder::new()
        .namespace(Some(legacy))
        .image(r#"<Image ID="Image:0"/>"#)
        .build();

    let mut config = ParseConfig::default();
    assert!(OmeXmlMetadataRoot::parse_str(&xml, &config).is_err());

    config.accepted_namespaces.push(legacy.to_string());
    let root = OmeXmlMetadataRoot::parse_str(&xml, &config).unwrap();
    assert_eq!(root.image_count(), 1);
}
