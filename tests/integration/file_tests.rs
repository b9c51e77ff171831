//! Reading documents from disk and summarizing them.

use std::fs;

use ome_model::{DocumentSummary, ModelError, OmeXmlMetadataRoot, ParseConfig};

use super::test_utils::{strict, write_temp_document, OmeDocumentBuilder};

fn microscope_document() -> String {
    OmeDocumentBuilder::new()
        .creator("file-tests")
        .experimenter("Experimenter:0", "Ada")
        .simple_instrument(0)
        .image_with_detector(0, "Detector:0")
        .image(
            r#"<Image ID="Image:1" Name="second">
                <AcquisitionDate>2020-01-02T03:04:05Z</AcquisitionDate>
                <ExperimenterRef ID="Experimenter:0"/>
                <Pixels ID="Pixels:1" DimensionOrder="XYCZT" Type="float" SizeX="16" SizeY="8" SizeZ="2" SizeC="1" SizeT="1"/>
            </Image>"#,
        )
        .annotation(r#"<TagAnnotation ID="Annotation:0"><Value>t</Value></TagAnnotation>"#)
        .roi("ROI:0")
        .build()
}

#[test]
fn test_from_file() {
    let file = write_temp_document(&microscope_document());
    let root = OmeXmlMetadataRoot::from_file(file.path(), &ParseConfig::default()).unwrap();

    assert_eq!(root.images().len(), 2);
    assert_eq!(root.instruments().len(), 1);
    assert_eq!(root.unresolved_count(), 0);
}

#[test]
fn test_from_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.ome.xml");

    let err = OmeXmlMetadataRoot::from_file(&path, &ParseConfig::default()).unwrap_err();
    assert!(matches!(err, ModelError::Io(_)));
}

#[test]
fn test_from_file_strict() {
    let xml = microscope_document().replace(
        r#"<DetectorSettings ID="Detector:0"/>"#,
        r#"<DetectorSettings ID="Detector:404"/>"#,
    );
    let file = write_temp_document(&xml);

    let err = OmeXmlMetadataRoot::from_file(file.path(), &strict()).unwrap_err();
    assert!(matches!(err, ModelError::UnresolvedReferences { count: 1 }));
    assert!(OmeXmlMetadataRoot::from_file(file.path(), &ParseConfig::default()).is_ok());
}

#[test]
fn test_written_document_reads_back() {
    let file = write_temp_document(&microscope_document());
    let root = OmeXmlMetadataRoot::from_file(file.path(), &ParseConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let output = dir.path().join("normalized.ome.xml");
    fs::write(&output, root.to_xml_string()).unwrap();

    let reread = OmeXmlMetadataRoot::from_file(&output, &ParseConfig::default()).unwrap();
    assert!(reread == root);
}

#[test]
fn test_summary() {
    let file = write_temp_document(&microscope_document());
    let root = OmeXmlMetadataRoot::from_file(file.path(), &ParseConfig::default()).unwrap();
    let summary = DocumentSummary::from_root(&root);

    assert_eq!(summary.creator.as_deref(), Some("file-tests"));
    assert_eq!(summary.object_count, root.model().len());
    assert_eq!(summary.id_count, root.model().id_count());
    assert_eq!(summary.images.len(), 2);
    assert_eq!(summary.instruments.len(), 1);
    assert_eq!(summary.experimenters, vec!["Experimenter:0".to_string()]);
    assert_eq!(summary.rois, vec!["ROI:0".to_string()]);
    assert_eq!(summary.annotation_count, 1);
    assert!(summary.unresolved.is_empty());

    let first = &summary.images[0];
    assert_eq!(first.size, [4, 4, 1, 1, 1]);
    assert_eq!(first.channels.len(), 1);
    assert_eq!(first.channels[0].detector.as_deref(), Some("Detector:0"));

    let second = &summary.images[1];
    assert_eq!(second.name.as_deref(), Some("second"));
    assert_eq!(second.acquired.as_deref(), Some("2020-01-02T03:04:05Z"));
    assert_eq!(second.dimension_order.as_deref(), Some("XYCZT"));
    assert_eq!(second.pixel_type.as_deref(), Some("float"));
    assert_eq!(second.experimenter.as_deref(), Some("Experimenter:0"));
    assert!(second.channels.is_empty());
}

#[test]
fn test_summary_json() {
    let file = write_temp_document(&microscope_document());
    let root = OmeXmlMetadataRoot::from_file(file.path(), &ParseConfig::default()).unwrap();
    let summary = DocumentSummary::from_root(&root);

    let json = serde_json::to_value(&summary).unwrap();
    assert_eq!(json["creator"], "file-tests");
    assert_eq!(json["images"][1]["size"][0], 16);
    assert_eq!(json["instruments"][0]["objectives"][0], "Objective:0");
    assert_eq!(json["unresolved"].as_array().map(Vec::len), Some(0));
}
