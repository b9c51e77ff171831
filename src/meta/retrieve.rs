//! Index-based read access to a resolved document.
//!
//! Objects are addressed by their position among siblings: `image` is the
//! index among the document's images, `channel` the index among one
//! image's channels, and so on. Every getter returns `None` for an index
//! that is out of range or a property that is not set.
//!
//! Reference getters (`*_ref`) report the ID of the *resolved* target.
//! A reference that is still unresolved yields `None`.

use crate::model::{
    Channel, CommentAnnotation, Dataset, Detector, DetectorSettings, DetectorType,
    DimensionOrder, Ellipse, Experimenter, Image, Instrument, LongAnnotation, Medium,
    ModelObject, NodeId, NonNegativeInteger, Objective, ObjectKind, ObjectiveSettings,
    ObjectVariant, OmeModel, OmeXmlMetadataRoot, PixelType, Pixels, Plane, Plate,
    PositiveInteger, Rectangle, ReferenceKind, Roi, ShapeCommon, StructuredAnnotations,
    TagAnnotation, Timestamp, UnitsLength,
};

// =============================================================================
// MetadataRetrieve
// =============================================================================

/// Read-only metadata access by index.
pub trait MetadataRetrieve {
    // Root
    fn uuid(&self) -> Option<&str>;
    fn creator(&self) -> Option<&str>;

    // Image
    fn image_count(&self) -> usize;
    fn image_id(&self, image: usize) -> Option<&str>;
    fn image_name(&self, image: usize) -> Option<&str>;
    fn image_description(&self, image: usize) -> Option<&str>;
    fn image_acquisition_date(&self, image: usize) -> Option<&Timestamp>;
    fn image_experimenter_ref(&self, image: usize) -> Option<&str>;
    fn image_instrument_ref(&self, image: usize) -> Option<&str>;
    fn image_roi_ref_count(&self, image: usize) -> usize;
    fn image_roi_ref(&self, image: usize, index: usize) -> Option<&str>;
    fn image_annotation_ref_count(&self, image: usize) -> usize;
    fn image_annotation_ref(&self, image: usize, index: usize) -> Option<&str>;

    // ObjectiveSettings
    fn objective_settings_id(&self, image: usize) -> Option<&str>;
    fn objective_settings_medium(&self, image: usize) -> Option<Medium>;
    fn objective_settings_refractive_index(&self, image: usize) -> Option<f64>;

    // Pixels
    fn pixels_id(&self, image: usize) -> Option<&str>;
    fn pixels_dimension_order(&self, image: usize) -> Option<DimensionOrder>;
    fn pixels_type(&self, image: usize) -> Option<PixelType>;
    fn pixels_size_x(&self, image: usize) -> Option<PositiveInteger>;
    fn pixels_size_y(&self, image: usize) -> Option<PositiveInteger>;
    fn pixels_size_z(&self, image: usize) -> Option<PositiveInteger>;
    fn pixels_size_c(&self, image: usize) -> Option<PositiveInteger>;
    fn pixels_size_t(&self, image: usize) -> Option<PositiveInteger>;
    fn pixels_physical_size_x(&self, image: usize) -> Option<(f64, UnitsLength)>;
    fn pixels_physical_size_y(&self, image: usize) -> Option<(f64, UnitsLength)>;
    fn pixels_physical_size_z(&self, image: usize) -> Option<(f64, UnitsLength)>;
    fn pixels_big_endian(&self, image: usize) -> Option<bool>;

    // Channel
    fn channel_count(&self, image: usize) -> usize;
    fn channel_id(&self, image: usize, channel: usize) -> Option<&str>;
    fn channel_name(&self, image: usize, channel: usize) -> Option<&str>;
    fn channel_color(&self, image: usize, channel: usize) -> Option<i32>;
    fn channel_samples_per_pixel(&self, image: usize, channel: usize) -> Option<PositiveInteger>;
    fn channel_emission_wavelength(&self, image: usize, channel: usize) -> Option<f64>;
    fn channel_detector_ref(&self, image: usize, channel: usize) -> Option<&str>;
    fn detector_settings_gain(&self, image: usize, channel: usize) -> Option<f64>;

    // Plane
    fn plane_count(&self, image: usize) -> usize;
    fn plane_the_z(&self, image: usize, plane: usize) -> Option<NonNegativeInteger>;
    fn plane_the_c(&self, image: usize, plane: usize) -> Option<NonNegativeInteger>;
    fn plane_the_t(&self, image: usize, plane: usize) -> Option<NonNegativeInteger>;
    fn plane_exposure_time(&self, image: usize, plane: usize) -> Option<f64>;

    // Instrument
    fn instrument_count(&self) -> usize;
    fn instrument_id(&self, instrument: usize) -> Option<&str>;
    fn detector_count(&self, instrument: usize) -> usize;
    fn detector_id(&self, instrument: usize, detector: usize) -> Option<&str>;
    fn detector_type(&self, instrument: usize, detector: usize) -> Option<DetectorType>;
    fn detector_model(&self, instrument: usize, detector: usize) -> Option<&str>;
    fn objective_count(&self, instrument: usize) -> usize;
    fn objective_id(&self, instrument: usize, objective: usize) -> Option<&str>;
    fn objective_nominal_magnification(&self, instrument: usize, objective: usize)
        -> Option<f64>;
    fn objective_lens_na(&self, instrument: usize, objective: usize) -> Option<f64>;

    // Experimenter
    fn experimenter_count(&self) -> usize;
    fn experimenter_id(&self, experimenter: usize) -> Option<&str>;
    fn experimenter_first_name(&self, experimenter: usize) -> Option<&str>;
    fn experimenter_last_name(&self, experimenter: usize) -> Option<&str>;
    fn experimenter_email(&self, experimenter: usize) -> Option<&str>;

    // Dataset
    fn dataset_count(&self) -> usize;
    fn dataset_id(&self, dataset: usize) -> Option<&str>;
    fn dataset_name(&self, dataset: usize) -> Option<&str>;
    fn dataset_experimenter_ref(&self, dataset: usize) -> Option<&str>;
    fn dataset_image_ref_count(&self, dataset: usize) -> usize;
    fn dataset_image_ref(&self, dataset: usize, index: usize) -> Option<&str>;

    // Plate
    fn plate_count(&self) -> usize;
    fn plate_id(&self, plate: usize) -> Option<&str>;
    fn plate_name(&self, plate: usize) -> Option<&str>;
    fn plate_rows(&self, plate: usize) -> Option<PositiveInteger>;
    fn plate_columns(&self, plate: usize) -> Option<PositiveInteger>;
    fn plate_annotation_ref_count(&self, plate: usize) -> usize;
    fn plate_annotation_ref(&self, plate: usize, index: usize) -> Option<&str>;

    // ROI
    fn roi_count(&self) -> usize;
    fn roi_id(&self, roi: usize) -> Option<&str>;
    fn roi_name(&self, roi: usize) -> Option<&str>;
    fn roi_description(&self, roi: usize) -> Option<&str>;

    // Shapes, addressed by position inside one ROI's Union
    fn shape_count(&self, roi: usize) -> usize;
    fn shape_kind(&self, roi: usize, shape: usize) -> Option<ObjectKind>;
    fn shape_id(&self, roi: usize, shape: usize) -> Option<&str>;
    fn shape_text(&self, roi: usize, shape: usize) -> Option<&str>;
    fn shape_the_z(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger>;
    fn shape_the_c(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger>;
    fn shape_the_t(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger>;
    fn shape_x(&self, roi: usize, shape: usize) -> Option<f64>;
    fn shape_y(&self, roi: usize, shape: usize) -> Option<f64>;
    fn rectangle_width(&self, roi: usize, shape: usize) -> Option<f64>;
    fn rectangle_height(&self, roi: usize, shape: usize) -> Option<f64>;
    fn ellipse_radius_x(&self, roi: usize, shape: usize) -> Option<f64>;
    fn ellipse_radius_y(&self, roi: usize, shape: usize) -> Option<f64>;
    fn shape_annotation_ref_count(&self, roi: usize, shape: usize) -> usize;
    fn shape_annotation_ref(&self, roi: usize, shape: usize, index: usize) -> Option<&str>;

    // Annotations
    fn comment_annotation_count(&self) -> usize;
    fn comment_annotation_id(&self, annotation: usize) -> Option<&str>;
    fn comment_annotation_value(&self, annotation: usize) -> Option<&str>;
    fn comment_annotation_annotator(&self, annotation: usize) -> Option<&str>;
    fn tag_annotation_count(&self) -> usize;
    fn tag_annotation_id(&self, annotation: usize) -> Option<&str>;
    fn tag_annotation_value(&self, annotation: usize) -> Option<&str>;
    fn long_annotation_count(&self) -> usize;
    fn long_annotation_id(&self, annotation: usize) -> Option<&str>;
    fn long_annotation_value(&self, annotation: usize) -> Option<i64>;
}

// =============================================================================
// Lookup helpers
// =============================================================================

/// The `index`-th node of `nodes` as a concrete type.
fn nth<'a, T: ObjectVariant>(
    model: &'a OmeModel,
    nodes: &[NodeId],
    index: usize,
) -> Option<&'a T> {
    nodes.get(index).and_then(|node| model.get_as::<T>(*node))
}

/// Target ID of the `index`-th reference of one kind, counting unresolved
/// references too. Returns `None` when that reference is unresolved.
fn linked_id(
    model: &OmeModel,
    source: NodeId,
    kind: ReferenceKind,
    index: usize,
) -> Option<&str> {
    model
        .references(source)
        .iter()
        .filter(|reference| reference.kind() == kind)
        .nth(index)?
        .resolved_node()
        .and_then(|target| model.get(target))
        .and_then(ModelObject::id)
}

/// Number of references of one kind from `source`, resolved or not.
fn reference_count(model: &OmeModel, source: NodeId, kind: ReferenceKind) -> usize {
    model
        .references(source)
        .iter()
        .filter(|reference| reference.kind() == kind)
        .count()
}

impl OmeXmlMetadataRoot {
    fn image_at(&self, image: usize) -> Option<(NodeId, &Image)> {
        let node = *self.images().get(image)?;
        Some((node, self.model().get_as::<Image>(node)?))
    }

    fn pixels_at(&self, image: usize) -> Option<&Pixels> {
        let (_, image) = self.image_at(image)?;
        self.model().get_as::<Pixels>(image.pixels?)
    }

    fn objective_settings_at(&self, image: usize) -> Option<(NodeId, &ObjectiveSettings)> {
        let (_, image) = self.image_at(image)?;
        let node = image.objective_settings?;
        Some((node, self.model().get_as::<ObjectiveSettings>(node)?))
    }

    fn channel_at(&self, image: usize, channel: usize) -> Option<&Channel> {
        nth(self.model(), &self.pixels_at(image)?.channels, channel)
    }

    fn plane_at(&self, image: usize, plane: usize) -> Option<&Plane> {
        nth(self.model(), &self.pixels_at(image)?.planes, plane)
    }

    fn instrument_at(&self, instrument: usize) -> Option<&Instrument> {
        nth(self.model(), self.instruments(), instrument)
    }

    fn detector_at(&self, instrument: usize, detector: usize) -> Option<&Detector> {
        nth(self.model(), &self.instrument_at(instrument)?.detectors, detector)
    }

    fn objective_at(&self, instrument: usize, objective: usize) -> Option<&Objective> {
        nth(self.model(), &self.instrument_at(instrument)?.objectives, objective)
    }

    fn experimenter_at(&self, experimenter: usize) -> Option<&Experimenter> {
        nth(self.model(), self.experimenters(), experimenter)
    }

    fn plate_at(&self, plate: usize) -> Option<&Plate> {
        nth(self.model(), self.plates(), plate)
    }

    fn shape_node(&self, roi: usize, shape: usize) -> Option<NodeId> {
        let roi = nth::<Roi>(self.model(), self.rois(), roi)?;
        roi.shapes.get(shape).copied()
    }

    fn shape_at(&self, roi: usize, shape: usize) -> Option<&ModelObject> {
        self.model().get(self.shape_node(roi, shape)?)
    }

    fn shape_common_at(&self, roi: usize, shape: usize) -> Option<&ShapeCommon> {
        self.shape_at(roi, shape)?.shape()
    }

    fn shape_as<T: ObjectVariant>(&self, roi: usize, shape: usize) -> Option<&T> {
        self.model().get_as::<T>(self.shape_node(roi, shape)?)
    }

    fn annotations(&self) -> Option<&StructuredAnnotations> {
        self.model()
            .get_as::<StructuredAnnotations>(self.structured_annotations()?)
    }

    fn comment_nodes(&self) -> &[NodeId] {
        self.annotations()
            .map(|annotations| annotations.comments.as_slice())
            .unwrap_or(&[])
    }

    fn tag_nodes(&self) -> &[NodeId] {
        self.annotations()
            .map(|annotations| annotations.tags.as_slice())
            .unwrap_or(&[])
    }

    fn long_nodes(&self) -> &[NodeId] {
        self.annotations()
            .map(|annotations| annotations.longs.as_slice())
            .unwrap_or(&[])
    }
}

// =============================================================================
// OmeXmlMetadataRoot
// =============================================================================

impl MetadataRetrieve for OmeXmlMetadataRoot {
    fn uuid(&self) -> Option<&str> {
        OmeXmlMetadataRoot::uuid(self)
    }

    fn creator(&self) -> Option<&str> {
        OmeXmlMetadataRoot::creator(self)
    }

    // -------------------------------------------------------------------------
    // Image
    // -------------------------------------------------------------------------

    fn image_count(&self) -> usize {
        self.images().len()
    }

    fn image_id(&self, image: usize) -> Option<&str> {
        self.image_at(image).map(|(_, image)| image.id.as_str())
    }

    fn image_name(&self, image: usize) -> Option<&str> {
        self.image_at(image)?.1.name.as_deref()
    }

    fn image_description(&self, image: usize) -> Option<&str> {
        self.image_at(image)?.1.description.as_deref()
    }

    fn image_acquisition_date(&self, image: usize) -> Option<&Timestamp> {
        self.image_at(image)?.1.acquisition_date.as_ref()
    }

    fn image_experimenter_ref(&self, image: usize) -> Option<&str> {
        let (node, _) = self.image_at(image)?;
        linked_id(self.model(), node, ReferenceKind::ExperimenterRef, 0)
    }

    fn image_instrument_ref(&self, image: usize) -> Option<&str> {
        let (node, _) = self.image_at(image)?;
        linked_id(self.model(), node, ReferenceKind::InstrumentRef, 0)
    }

    fn image_roi_ref_count(&self, image: usize) -> usize {
        self.image_at(image)
            .map(|(node, _)| reference_count(self.model(), node, ReferenceKind::RoiRef))
            .unwrap_or(0)
    }

    fn image_roi_ref(&self, image: usize, index: usize) -> Option<&str> {
        let (node, _) = self.image_at(image)?;
        linked_id(self.model(), node, ReferenceKind::RoiRef, index)
    }

    fn image_annotation_ref_count(&self, image: usize) -> usize {
        self.image_at(image)
            .map(|(node, _)| reference_count(self.model(), node, ReferenceKind::AnnotationRef))
            .unwrap_or(0)
    }

    fn image_annotation_ref(&self, image: usize, index: usize) -> Option<&str> {
        let (node, _) = self.image_at(image)?;
        linked_id(self.model(), node, ReferenceKind::AnnotationRef, index)
    }

    // -------------------------------------------------------------------------
    // ObjectiveSettings
    // -------------------------------------------------------------------------

    fn objective_settings_id(&self, image: usize) -> Option<&str> {
        let (node, _) = self.objective_settings_at(image)?;
        linked_id(self.model(), node, ReferenceKind::ObjectiveRef, 0)
    }

    fn objective_settings_medium(&self, image: usize) -> Option<Medium> {
        self.objective_settings_at(image)?.1.medium
    }

    fn objective_settings_refractive_index(&self, image: usize) -> Option<f64> {
        self.objective_settings_at(image)?.1.refractive_index
    }

    // -------------------------------------------------------------------------
    // Pixels
    // -------------------------------------------------------------------------

    fn pixels_id(&self, image: usize) -> Option<&str> {
        self.pixels_at(image).map(|pixels| pixels.id.as_str())
    }

    fn pixels_dimension_order(&self, image: usize) -> Option<DimensionOrder> {
        self.pixels_at(image)?.dimension_order
    }

    fn pixels_type(&self, image: usize) -> Option<PixelType> {
        self.pixels_at(image)?.pixel_type
    }

    fn pixels_size_x(&self, image: usize) -> Option<PositiveInteger> {
        self.pixels_at(image)?.size_x
    }

    fn pixels_size_y(&self, image: usize) -> Option<PositiveInteger> {
        self.pixels_at(image)?.size_y
    }

    fn pixels_size_z(&self, image: usize) -> Option<PositiveInteger> {
        self.pixels_at(image)?.size_z
    }

    fn pixels_size_c(&self, image: usize) -> Option<PositiveInteger> {
        self.pixels_at(image)?.size_c
    }

    fn pixels_size_t(&self, image: usize) -> Option<PositiveInteger> {
        self.pixels_at(image)?.size_t
    }

    fn pixels_physical_size_x(&self, image: usize) -> Option<(f64, UnitsLength)> {
        self.pixels_at(image)?.physical_size_x_with_unit()
    }

    fn pixels_physical_size_y(&self, image: usize) -> Option<(f64, UnitsLength)> {
        self.pixels_at(image)?.physical_size_y_with_unit()
    }

    fn pixels_physical_size_z(&self, image: usize) -> Option<(f64, UnitsLength)> {
        self.pixels_at(image)?.physical_size_z_with_unit()
    }

    fn pixels_big_endian(&self, image: usize) -> Option<bool> {
        self.pixels_at(image)?.big_endian
    }

    // -------------------------------------------------------------------------
    // Channel
    // -------------------------------------------------------------------------

    fn channel_count(&self, image: usize) -> usize {
        self.pixels_at(image)
            .map(|pixels| pixels.channels.len())
            .unwrap_or(0)
    }

    fn channel_id(&self, image: usize, channel: usize) -> Option<&str> {
        self.channel_at(image, channel)
            .map(|channel| channel.id.as_str())
    }

    fn channel_name(&self, image: usize, channel: usize) -> Option<&str> {
        self.channel_at(image, channel)?.name.as_deref()
    }

    fn channel_color(&self, image: usize, channel: usize) -> Option<i32> {
        self.channel_at(image, channel)?.color
    }

    fn channel_samples_per_pixel(&self, image: usize, channel: usize) -> Option<PositiveInteger> {
        self.channel_at(image, channel)?.samples_per_pixel
    }

    fn channel_emission_wavelength(&self, image: usize, channel: usize) -> Option<f64> {
        self.channel_at(image, channel)?.emission_wavelength
    }

    fn channel_detector_ref(&self, image: usize, channel: usize) -> Option<&str> {
        let settings = self.channel_at(image, channel)?.detector_settings?;
        linked_id(self.model(), settings, ReferenceKind::DetectorRef, 0)
    }

    fn detector_settings_gain(&self, image: usize, channel: usize) -> Option<f64> {
        let settings = self.channel_at(image, channel)?.detector_settings?;
        self.model().get_as::<DetectorSettings>(settings)?.gain
    }

    // -------------------------------------------------------------------------
    // Plane
    // -------------------------------------------------------------------------

    fn plane_count(&self, image: usize) -> usize {
        self.pixels_at(image)
            .map(|pixels| pixels.planes.len())
            .unwrap_or(0)
    }

    fn plane_the_z(&self, image: usize, plane: usize) -> Option<NonNegativeInteger> {
        self.plane_at(image, plane)?.the_z
    }

    fn plane_the_c(&self, image: usize, plane: usize) -> Option<NonNegativeInteger> {
        self.plane_at(image, plane)?.the_c
    }

    fn plane_the_t(&self, image: usize, plane: usize) -> Option<NonNegativeInteger> {
        self.plane_at(image, plane)?.the_t
    }

    fn plane_exposure_time(&self, image: usize, plane: usize) -> Option<f64> {
        self.plane_at(image, plane)?.exposure_time
    }

    // -------------------------------------------------------------------------
    // Instrument
    // -------------------------------------------------------------------------

    fn instrument_count(&self) -> usize {
        self.instruments().len()
    }

    fn instrument_id(&self, instrument: usize) -> Option<&str> {
        self.instrument_at(instrument)
            .map(|instrument| instrument.id.as_str())
    }

    fn detector_count(&self, instrument: usize) -> usize {
        self.instrument_at(instrument)
            .map(|instrument| instrument.detectors.len())
            .unwrap_or(0)
    }

    fn detector_id(&self, instrument: usize, detector: usize) -> Option<&str> {
        self.detector_at(instrument, detector)
            .map(|detector| detector.id.as_str())
    }

    fn detector_type(&self, instrument: usize, detector: usize) -> Option<DetectorType> {
        self.detector_at(instrument, detector)?.detector_type
    }

    fn detector_model(&self, instrument: usize, detector: usize) -> Option<&str> {
        self.detector_at(instrument, detector)?.model.as_deref()
    }

    fn objective_count(&self, instrument: usize) -> usize {
        self.instrument_at(instrument)
            .map(|instrument| instrument.objectives.len())
            .unwrap_or(0)
    }

    fn objective_id(&self, instrument: usize, objective: usize) -> Option<&str> {
        self.objective_at(instrument, objective)
            .map(|objective| objective.id.as_str())
    }

    fn objective_nominal_magnification(
        &self,
        instrument: usize,
        objective: usize,
    ) -> Option<f64> {
        self.objective_at(instrument, objective)?
            .nominal_magnification
    }

    fn objective_lens_na(&self, instrument: usize, objective: usize) -> Option<f64> {
        self.objective_at(instrument, objective)?.lens_na
    }

    // -------------------------------------------------------------------------
    // Experimenter
    // -------------------------------------------------------------------------

    fn experimenter_count(&self) -> usize {
        self.experimenters().len()
    }

    fn experimenter_id(&self, experimenter: usize) -> Option<&str> {
        self.experimenter_at(experimenter)
            .map(|experimenter| experimenter.id.as_str())
    }

    fn experimenter_first_name(&self, experimenter: usize) -> Option<&str> {
        self.experimenter_at(experimenter)?.first_name.as_deref()
    }

    fn experimenter_last_name(&self, experimenter: usize) -> Option<&str> {
        self.experimenter_at(experimenter)?.last_name.as_deref()
    }

    fn experimenter_email(&self, experimenter: usize) -> Option<&str> {
        self.experimenter_at(experimenter)?.email.as_deref()
    }

    // -------------------------------------------------------------------------
    // Dataset
    // -------------------------------------------------------------------------

    fn dataset_count(&self) -> usize {
        self.datasets().len()
    }

    fn dataset_id(&self, dataset: usize) -> Option<&str> {
        nth::<Dataset>(self.model(), self.datasets(), dataset).map(|dataset| dataset.id.as_str())
    }

    fn dataset_name(&self, dataset: usize) -> Option<&str> {
        nth::<Dataset>(self.model(), self.datasets(), dataset)?
            .name
            .as_deref()
    }

    fn dataset_experimenter_ref(&self, dataset: usize) -> Option<&str> {
        let node = *self.datasets().get(dataset)?;
        linked_id(self.model(), node, ReferenceKind::ExperimenterRef, 0)
    }

    fn dataset_image_ref_count(&self, dataset: usize) -> usize {
        self.datasets()
            .get(dataset)
            .map(|node| reference_count(self.model(), *node, ReferenceKind::ImageRef))
            .unwrap_or(0)
    }

    fn dataset_image_ref(&self, dataset: usize, index: usize) -> Option<&str> {
        let node = *self.datasets().get(dataset)?;
        linked_id(self.model(), node, ReferenceKind::ImageRef, index)
    }

    // -------------------------------------------------------------------------
    // Plate
    // -------------------------------------------------------------------------

    fn plate_count(&self) -> usize {
        self.plates().len()
    }

    fn plate_id(&self, plate: usize) -> Option<&str> {
        self.plate_at(plate).map(|plate| plate.id.as_str())
    }

    fn plate_name(&self, plate: usize) -> Option<&str> {
        self.plate_at(plate)?.name.as_deref()
    }

    fn plate_rows(&self, plate: usize) -> Option<PositiveInteger> {
        self.plate_at(plate)?.rows
    }

    fn plate_columns(&self, plate: usize) -> Option<PositiveInteger> {
        self.plate_at(plate)?.columns
    }

    fn plate_annotation_ref_count(&self, plate: usize) -> usize {
        self.plates()
            .get(plate)
            .map(|node| reference_count(self.model(), *node, ReferenceKind::AnnotationRef))
            .unwrap_or(0)
    }

    fn plate_annotation_ref(&self, plate: usize, index: usize) -> Option<&str> {
        let node = *self.plates().get(plate)?;
        linked_id(self.model(), node, ReferenceKind::AnnotationRef, index)
    }

    // -------------------------------------------------------------------------
    // ROI
    // -------------------------------------------------------------------------

    fn roi_count(&self) -> usize {
        self.rois().len()
    }

    fn roi_id(&self, roi: usize) -> Option<&str> {
        nth::<Roi>(self.model(), self.rois(), roi).map(|roi| roi.id.as_str())
    }

    fn roi_name(&self, roi: usize) -> Option<&str> {
        nth::<Roi>(self.model(), self.rois(), roi)?.name.as_deref()
    }

    fn roi_description(&self, roi: usize) -> Option<&str> {
        nth::<Roi>(self.model(), self.rois(), roi)?
            .description
            .as_deref()
    }

    fn shape_count(&self, roi: usize) -> usize {
        nth::<Roi>(self.model(), self.rois(), roi)
            .map(|roi| roi.shapes.len())
            .unwrap_or(0)
    }

    fn shape_kind(&self, roi: usize, shape: usize) -> Option<ObjectKind> {
        self.shape_at(roi, shape).map(ModelObject::kind)
    }

    fn shape_id(&self, roi: usize, shape: usize) -> Option<&str> {
        self.shape_common_at(roi, shape)
            .map(|common| common.id.as_str())
    }

    fn shape_text(&self, roi: usize, shape: usize) -> Option<&str> {
        self.shape_common_at(roi, shape)?.text.as_deref()
    }

    fn shape_the_z(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger> {
        self.shape_common_at(roi, shape)?.the_z
    }

    fn shape_the_c(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger> {
        self.shape_common_at(roi, shape)?.the_c
    }

    fn shape_the_t(&self, roi: usize, shape: usize) -> Option<NonNegativeInteger> {
        self.shape_common_at(roi, shape)?.the_t
    }

    fn shape_x(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_at(roi, shape)?.shape_anchor()?.0
    }

    fn shape_y(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_at(roi, shape)?.shape_anchor()?.1
    }

    fn rectangle_width(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_as::<Rectangle>(roi, shape)?.width
    }

    fn rectangle_height(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_as::<Rectangle>(roi, shape)?.height
    }

    fn ellipse_radius_x(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_as::<Ellipse>(roi, shape)?.radius_x
    }

    fn ellipse_radius_y(&self, roi: usize, shape: usize) -> Option<f64> {
        self.shape_as::<Ellipse>(roi, shape)?.radius_y
    }

    fn shape_annotation_ref_count(&self, roi: usize, shape: usize) -> usize {
        self.shape_node(roi, shape)
            .map(|node| reference_count(self.model(), node, ReferenceKind::AnnotationRef))
            .unwrap_or(0)
    }

    fn shape_annotation_ref(&self, roi: usize, shape: usize, index: usize) -> Option<&str> {
        let node = self.shape_node(roi, shape)?;
        linked_id(self.model(), node, ReferenceKind::AnnotationRef, index)
    }

    // -------------------------------------------------------------------------
    // Annotations
    // -------------------------------------------------------------------------

    fn comment_annotation_count(&self) -> usize {
        self.comment_nodes().len()
    }

    fn comment_annotation_id(&self, annotation: usize) -> Option<&str> {
        nth::<CommentAnnotation>(self.model(), self.comment_nodes(), annotation)
            .map(|comment| comment.id.as_str())
    }

    fn comment_annotation_value(&self, annotation: usize) -> Option<&str> {
        nth::<CommentAnnotation>(self.model(), self.comment_nodes(), annotation)?
            .value
            .as_deref()
    }

    fn comment_annotation_annotator(&self, annotation: usize) -> Option<&str> {
        let node = *self.comment_nodes().get(annotation)?;
        linked_id(self.model(), node, ReferenceKind::Annotator, 0)
    }

    fn tag_annotation_count(&self) -> usize {
        self.tag_nodes().len()
    }

    fn tag_annotation_id(&self, annotation: usize) -> Option<&str> {
        nth::<TagAnnotation>(self.model(), self.tag_nodes(), annotation).map(|tag| tag.id.as_str())
    }

    fn tag_annotation_value(&self, annotation: usize) -> Option<&str> {
        nth::<TagAnnotation>(self.model(), self.tag_nodes(), annotation)?
            .value
            .as_deref()
    }

    fn long_annotation_count(&self) -> usize {
        self.long_nodes().len()
    }

    fn long_annotation_id(&self, annotation: usize) -> Option<&str> {
        nth::<LongAnnotation>(self.model(), self.long_nodes(), annotation).map(|long| long.id.as_str())
    }

    fn long_annotation_value(&self, annotation: usize) -> Option<i64> {
        nth::<LongAnnotation>(self.model(), self.long_nodes(), annotation)?.value
    }
}
