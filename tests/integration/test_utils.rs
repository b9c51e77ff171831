//! Test utilities for integration tests.
//!
//! This module provides a builder for OME-XML documents and helpers for
//! parsing them and writing them to temporary files.

use std::io::Write;

use ome_model::{ModelObject, ModelVisitor, NodeId, ObjectKind, OmeXmlMetadataRoot, ParseConfig};

pub const NAMESPACE: &str = "http://www.openmicroscopy.org/Schemas/OME/2016-06";

// =============================================================================
// Document Builder
// =============================================================================

/// Builds OME-XML documents from top-level element snippets.
///
/// Snippets are written in schema order regardless of the order they were
/// added in, so tests can describe a document piecemeal.
#[derive(Debug, Default, Clone)]
pub struct OmeDocumentBuilder {
    namespace: Option<String>,
    creator: Option<String>,
    datasets: Vec<String>,
    plates: Vec<String>,
    experimenters: Vec<String>,
    instruments: Vec<String>,
    images: Vec<String>,
    annotations: Vec<String>,
    rois: Vec<String>,
}

impl OmeDocumentBuilder {
    pub fn new() -> Self {
        Self {
            namespace: Some(NAMESPACE.to_string()),
            ..Default::default()
        }
    }

    pub fn namespace(mut self, namespace: Option<&str>) -> Self {
        self.namespace = namespace.map(str::to_string);
        self
    }

    pub fn creator(mut self, creator: &str) -> Self {
        self.creator = Some(creator.to_string());
        self
    }

    pub fn dataset(mut self, xml: impl Into<String>) -> Self {
        self.datasets.push(xml.into());
        self
    }

    pub fn plate(mut self, xml: impl Into<String>) -> Self {
        self.plates.push(xml.into());
        self
    }

    pub fn experimenter(mut self, id: &str, first_name: &str) -> Self {
        self.experimenters.push(format!(
            r#"<Experimenter ID="{}" FirstName="{}"/>"#,
            id, first_name
        ));
        self
    }

    pub fn instrument(mut self, xml: impl Into<String>) -> Self {
        self.instruments.push(xml.into());
        self
    }

    /// An instrument holding one detector and one objective.
    pub fn simple_instrument(self, index: usize) -> Self {
        self.instrument(format!(
            r#"<Instrument ID="Instrument:{i}">
                <Detector ID="Detector:{i}" Type="CCD"/>
                <Objective ID="Objective:{i}" NominalMagnification="60"/>
            </Instrument>"#,
            i = index
        ))
    }

    pub fn image(mut self, xml: impl Into<String>) -> Self {
        self.images.push(xml.into());
        self
    }

    /// An image whose only channel uses `Detector:{detector}`.
    pub fn image_with_detector(self, index: usize, detector: &str) -> Self {
        self.image(format!(
            r#"<Image ID="Image:{i}">
                <Pixels ID="Pixels:{i}" DimensionOrder="XYZCT" Type="uint8"
                        SizeX="4" SizeY="4" SizeZ="1" SizeC="1" SizeT="1">
                    <Channel ID="Channel:{i}:0">
                        <DetectorSettings ID="{d}"/>
                    </Channel>
                </Pixels>
            </Image>"#,
            i = index,
            d = detector
        ))
    }

    pub fn annotation(mut self, xml: impl Into<String>) -> Self {
        self.annotations.push(xml.into());
        self
    }

    pub fn roi(mut self, id: &str) -> Self {
        self.rois.push(format!(r#"<ROI ID="{}"/>"#, id));
        self
    }

    pub fn build(&self) -> String {
        let mut xml = String::from(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
        xml.push_str("\n<OME");
        if let Some(ref namespace) = self.namespace {
            xml.push_str(&format!(r#" xmlns="{}""#, namespace));
        }
        if let Some(ref creator) = self.creator {
            xml.push_str(&format!(r#" Creator="{}""#, creator));
        }
        xml.push_str(">\n");

        for part in self
            .datasets
            .iter()
            .chain(&self.plates)
            .chain(&self.experimenters)
            .chain(&self.instruments)
            .chain(&self.images)
        {
            xml.push_str(part);
            xml.push('\n');
        }
        if !self.annotations.is_empty() {
            xml.push_str("<StructuredAnnotations>\n");
            for part in &self.annotations {
                xml.push_str(part);
                xml.push('\n');
            }
            xml.push_str("</StructuredAnnotations>\n");
        }
        for part in &self.rois {
            xml.push_str(part);
            xml.push('\n');
        }
        xml.push_str("</OME>\n");
        xml
    }
}

// =============================================================================
// Parsing Helpers
// =============================================================================

/// Parse with the default (lenient) policy, panicking on failure.
pub fn parse(xml: &str) -> OmeXmlMetadataRoot {
    OmeXmlMetadataRoot::parse_str(xml, &ParseConfig::default())
        .unwrap_or_else(|e| panic!("failed to parse document: {}\n{}", e, xml))
}

/// Parse with strict reference resolution.
pub fn strict() -> ParseConfig {
    ParseConfig {
        strict_references: true,
        ..ParseConfig::default()
    }
}

/// Write `xml` to a temporary `.ome.xml` file.
pub fn write_temp_document(xml: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".ome.xml")
        .tempfile()
        .expect("create temp file");
    file.write_all(xml.as_bytes()).expect("write temp file");
    file.flush().expect("flush temp file");
    file
}

// =============================================================================
// Visitors
// =============================================================================

/// Records the kind and depth of every visited object.
#[derive(Debug, Default)]
pub struct KindCollector {
    pub visited: Vec<(ObjectKind, usize)>,
}

impl ModelVisitor for KindCollector {
    fn visit(&mut self, _node: NodeId, object: &ModelObject, depth: usize) {
        self.visited.push((object.kind(), depth));
    }
}

impl KindCollector {
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.visited.iter().filter(|(k, _)| *k == kind).count()
    }
}
