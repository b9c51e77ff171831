//! Serializable document summary.

use serde::Serialize;

use crate::model::{OmeXmlMetadataRoot, PositiveInteger, UnresolvedReference};

use super::retrieve::MetadataRetrieve;

/// Overview of one document, as printed by `ome-model show`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentSummary {
    pub uuid: Option<String>,
    pub creator: Option<String>,
    pub object_count: usize,
    pub id_count: usize,
    pub images: Vec<ImageSummary>,
    pub instruments: Vec<InstrumentSummary>,
    pub experimenters: Vec<String>,
    pub datasets: Vec<String>,
    pub plates: Vec<String>,
    pub rois: Vec<String>,
    pub shape_count: usize,
    pub annotation_count: usize,
    pub unresolved: Vec<UnresolvedReference>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSummary {
    pub id: String,
    pub name: Option<String>,
    pub acquired: Option<String>,
    pub pixel_type: Option<String>,
    pub dimension_order: Option<String>,
    /// X, Y, Z, C, T sizes; unset sizes are reported as 0
    pub size: [u32; 5],
    pub channels: Vec<ChannelSummary>,
    pub plane_count: usize,
    pub instrument: Option<String>,
    pub experimenter: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChannelSummary {
    pub id: String,
    pub name: Option<String>,
    pub detector: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InstrumentSummary {
    pub id: String,
    pub detectors: Vec<String>,
    pub objectives: Vec<String>,
}

impl DocumentSummary {
    /// Summarize a document root.
    pub fn from_root(root: &OmeXmlMetadataRoot) -> Self {
        let images = (0..root.image_count())
            .filter_map(|image| image_summary(root, image))
            .collect();

        let instruments = (0..root.instrument_count())
            .filter_map(|instrument| {
                Some(InstrumentSummary {
                    id: root.instrument_id(instrument)?.to_string(),
                    detectors: (0..root.detector_count(instrument))
                        .filter_map(|detector| root.detector_id(instrument, detector))
                        .map(str::to_string)
                        .collect(),
                    objectives: (0..root.objective_count(instrument))
                        .filter_map(|objective| root.objective_id(instrument, objective))
                        .map(str::to_string)
                        .collect(),
                })
            })
            .collect();

        DocumentSummary {
            uuid: MetadataRetrieve::uuid(root).map(str::to_string),
            creator: MetadataRetrieve::creator(root).map(str::to_string),
            object_count: root.model().len(),
            id_count: root.model().id_count(),
            images,
            instruments,
            experimenters: collect_ids(root.experimenter_count(), |i| root.experimenter_id(i)),
            datasets: collect_ids(root.dataset_count(), |i| root.dataset_id(i)),
            plates: collect_ids(root.plate_count(), |i| root.plate_id(i)),
            rois: collect_ids(root.roi_count(), |i| root.roi_id(i)),
            shape_count: (0..root.roi_count()).map(|roi| root.shape_count(roi)).sum(),
            annotation_count: root.comment_annotation_count()
                + root.tag_annotation_count()
                + root.long_annotation_count(),
            unresolved: root.model().unresolved_references(),
        }
    }
}

fn collect_ids<'a>(count: usize, id: impl Fn(usize) -> Option<&'a str>) -> Vec<String> {
    (0..count).filter_map(id).map(str::to_string).collect()
}

fn image_summary(root: &OmeXmlMetadataRoot, image: usize) -> Option<ImageSummary> {
    let size = |value: Option<PositiveInteger>| value.map_or(0, |v| v.get());

    let channels = (0..root.channel_count(image))
        .filter_map(|channel| {
            Some(ChannelSummary {
                id: root.channel_id(image, channel)?.to_string(),
                name: root.channel_name(image, channel).map(str::to_string),
                detector: root
                    .channel_detector_ref(image, channel)
                    .map(str::to_string),
            })
        })
        .collect();

    Some(ImageSummary {
        id: root.image_id(image)?.to_string(),
        name: root.image_name(image).map(str::to_string),
        acquired: root
            .image_acquisition_date(image)
            .map(|date| date.to_string()),
        pixel_type: root.pixels_type(image).map(|t| t.to_string()),
        dimension_order: root.pixels_dimension_order(image).map(|o| o.to_string()),
        size: [
            size(root.pixels_size_x(image)),
            size(root.pixels_size_y(image)),
            size(root.pixels_size_z(image)),
            size(root.pixels_size_c(image)),
            size(root.pixels_size_t(image)),
        ],
        channels,
        plane_count: root.plane_count(image),
        instrument: root.image_instrument_ref(image).map(str::to_string),
        experimenter: root.image_experimenter_ref(image).map(str::to_string),
    })
}
