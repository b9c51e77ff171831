//! Index-based write access, the counterpart of [`MetadataRetrieve`].
//!
//! Setters address objects by the same indexes the getters use. An `*_id`
//! setter creates its object when the index is the next free slot (or
//! accepts a repeat of the ID already there). Planes have no ID and are
//! created by the first setter that reaches the next free slot. Every
//! other setter needs its object to exist and fails with
//! [`ModelError::StoreIndex`] otherwise.
//!
//! Reference setters record the target ID unresolved. Call
//! [`OmeXmlMetadataRoot::resolve_references`] once the store is filled.

use tracing::debug;

use crate::error::{ModelError, ModelResult};
use crate::model::{
    Channel, CommentAnnotation, Dataset, Detector, DetectorSettings, DetectorType,
    DimensionOrder, Ellipse, Experimenter, Image, Instrument, LongAnnotation, Medium,
    ModelObject, NodeId, NonNegativeInteger, ObjectKind, Objective, ObjectiveSettings,
    ObjectVariant,
    OmeModel, OmeXmlMetadataRoot, PixelType, Pixels, Plane, Plate, Point, PositiveInteger,
    Rectangle, Reference, ReferenceKind, Roi, ShapeCommon, StructuredAnnotations,
    TagAnnotation, Timestamp, UnitsLength,
};

use super::retrieve::MetadataRetrieve;

/// Element name used in errors for a shape of any type.
const SHAPE: &str = "Shape";

// =============================================================================
// MetadataStore
// =============================================================================

/// Metadata population by index.
pub trait MetadataStore {
    // Root
    fn set_uuid(&mut self, uuid: &str);
    fn set_creator(&mut self, creator: &str);

    // Image
    fn set_image_id(&mut self, id: &str, image: usize) -> ModelResult<()>;
    fn set_image_name(&mut self, name: &str, image: usize) -> ModelResult<()>;
    fn set_image_description(&mut self, description: &str, image: usize) -> ModelResult<()>;
    fn set_image_acquisition_date(&mut self, date: Timestamp, image: usize) -> ModelResult<()>;
    fn set_image_experimenter_ref(&mut self, experimenter: &str, image: usize)
        -> ModelResult<()>;
    fn set_image_instrument_ref(&mut self, instrument: &str, image: usize) -> ModelResult<()>;
    fn set_image_roi_ref(&mut self, roi: &str, image: usize, index: usize) -> ModelResult<()>;
    fn set_image_annotation_ref(
        &mut self,
        annotation: &str,
        image: usize,
        index: usize,
    ) -> ModelResult<()>;

    // ObjectiveSettings
    fn set_objective_settings_id(&mut self, objective: &str, image: usize) -> ModelResult<()>;
    fn set_objective_settings_medium(&mut self, medium: Medium, image: usize) -> ModelResult<()>;
    fn set_objective_settings_refractive_index(
        &mut self,
        refractive_index: f64,
        image: usize,
    ) -> ModelResult<()>;

    // Pixels
    fn set_pixels_id(&mut self, id: &str, image: usize) -> ModelResult<()>;
    fn set_pixels_dimension_order(
        &mut self,
        order: DimensionOrder,
        image: usize,
    ) -> ModelResult<()>;
    fn set_pixels_type(&mut self, pixel_type: PixelType, image: usize) -> ModelResult<()>;
    fn set_pixels_size_x(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()>;
    fn set_pixels_size_y(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()>;
    fn set_pixels_size_z(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()>;
    fn set_pixels_size_c(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()>;
    fn set_pixels_size_t(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()>;
    fn set_pixels_physical_size_x(
        &mut self,
        size: (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()>;
    fn set_pixels_physical_size_y(
        &mut self,
        size: (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()>;
    fn set_pixels_physical_size_z(
        &mut self,
        size: (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()>;
    fn set_pixels_big_endian(&mut self, big_endian: bool, image: usize) -> ModelResult<()>;

    // Channel
    fn set_channel_id(&mut self, id: &str, image: usize, channel: usize) -> ModelResult<()>;
    fn set_channel_name(&mut self, name: &str, image: usize, channel: usize) -> ModelResult<()>;
    fn set_channel_color(&mut self, color: i32, image: usize, channel: usize) -> ModelResult<()>;
    fn set_channel_samples_per_pixel(
        &mut self,
        samples: PositiveInteger,
        image: usize,
        channel: usize,
    ) -> ModelResult<()>;
    fn set_channel_emission_wavelength(
        &mut self,
        wavelength: f64,
        image: usize,
        channel: usize,
    ) -> ModelResult<()>;
    fn set_channel_detector_ref(
        &mut self,
        detector: &str,
        image: usize,
        channel: usize,
    ) -> ModelResult<()>;
    fn set_detector_settings_gain(
        &mut self,
        gain: f64,
        image: usize,
        channel: usize,
    ) -> ModelResult<()>;

    // Plane
    fn set_plane_the_z(
        &mut self,
        the_z: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()>;
    fn set_plane_the_c(
        &mut self,
        the_c: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()>;
    fn set_plane_the_t(
        &mut self,
        the_t: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()>;
    fn set_plane_exposure_time(&mut self, time: f64, image: usize, plane: usize)
        -> ModelResult<()>;

    // Instrument
    fn set_instrument_id(&mut self, id: &str, instrument: usize) -> ModelResult<()>;
    fn set_detector_id(&mut self, id: &str, instrument: usize, detector: usize)
        -> ModelResult<()>;
    fn set_detector_type(
        &mut self,
        detector_type: DetectorType,
        instrument: usize,
        detector: usize,
    ) -> ModelResult<()>;
    fn set_detector_model(
        &mut self,
        model: &str,
        instrument: usize,
        detector: usize,
    ) -> ModelResult<()>;
    fn set_objective_id(&mut self, id: &str, instrument: usize, objective: usize)
        -> ModelResult<()>;
    fn set_objective_nominal_magnification(
        &mut self,
        magnification: f64,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<()>;
    fn set_objective_lens_na(
        &mut self,
        lens_na: f64,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<()>;

    // Experimenter
    fn set_experimenter_id(&mut self, id: &str, experimenter: usize) -> ModelResult<()>;
    fn set_experimenter_first_name(&mut self, name: &str, experimenter: usize)
        -> ModelResult<()>;
    fn set_experimenter_last_name(&mut self, name: &str, experimenter: usize)
        -> ModelResult<()>;
    fn set_experimenter_email(&mut self, email: &str, experimenter: usize) -> ModelResult<()>;

    // Dataset
    fn set_dataset_id(&mut self, id: &str, dataset: usize) -> ModelResult<()>;
    fn set_dataset_name(&mut self, name: &str, dataset: usize) -> ModelResult<()>;
    fn set_dataset_experimenter_ref(
        &mut self,
        experimenter: &str,
        dataset: usize,
    ) -> ModelResult<()>;
    fn set_dataset_image_ref(&mut self, image: &str, dataset: usize, index: usize)
        -> ModelResult<()>;

    // Plate
    fn set_plate_id(&mut self, id: &str, plate: usize) -> ModelResult<()>;
    fn set_plate_name(&mut self, name: &str, plate: usize) -> ModelResult<()>;
    fn set_plate_rows(&mut self, rows: PositiveInteger, plate: usize) -> ModelResult<()>;
    fn set_plate_columns(&mut self, columns: PositiveInteger, plate: usize) -> ModelResult<()>;
    fn set_plate_annotation_ref(
        &mut self,
        annotation: &str,
        plate: usize,
        index: usize,
    ) -> ModelResult<()>;

    // ROI
    fn set_roi_id(&mut self, id: &str, roi: usize) -> ModelResult<()>;
    fn set_roi_name(&mut self, name: &str, roi: usize) -> ModelResult<()>;
    fn set_roi_description(&mut self, description: &str, roi: usize) -> ModelResult<()>;

    // Shapes
    fn set_rectangle_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_ellipse_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_point_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_shape_text(&mut self, text: &str, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_shape_the_z(
        &mut self,
        the_z: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()>;
    fn set_shape_the_c(
        &mut self,
        the_c: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()>;
    fn set_shape_the_t(
        &mut self,
        the_t: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()>;
    fn set_shape_x(&mut self, x: f64, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_shape_y(&mut self, y: f64, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_rectangle_width(&mut self, width: f64, roi: usize, shape: usize) -> ModelResult<()>;
    fn set_rectangle_height(&mut self, height: f64, roi: usize, shape: usize)
        -> ModelResult<()>;
    fn set_ellipse_radius_x(&mut self, radius: f64, roi: usize, shape: usize)
        -> ModelResult<()>;
    fn set_ellipse_radius_y(&mut self, radius: f64, roi: usize, shape: usize)
        -> ModelResult<()>;
    fn set_shape_annotation_ref(
        &mut self,
        annotation: &str,
        roi: usize,
        shape: usize,
        index: usize,
    ) -> ModelResult<()>;

    // Annotations
    fn set_comment_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()>;
    fn set_comment_annotation_value(&mut self, value: &str, annotation: usize)
        -> ModelResult<()>;
    fn set_comment_annotation_annotator(
        &mut self,
        experimenter: &str,
        annotation: usize,
    ) -> ModelResult<()>;
    fn set_tag_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()>;
    fn set_tag_annotation_value(&mut self, value: &str, annotation: usize) -> ModelResult<()>;
    fn set_long_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()>;
    fn set_long_annotation_value(&mut self, value: i64, annotation: usize) -> ModelResult<()>;
}

// =============================================================================
// Slot helpers
// =============================================================================

fn missing(element: &'static str, index: usize) -> ModelError {
    ModelError::StoreIndex { element, index }
}

fn node_at(nodes: &[NodeId], element: &'static str, index: usize) -> ModelResult<NodeId> {
    nodes.get(index).copied().ok_or_else(|| missing(element, index))
}

fn object_mut<'a, T: ObjectVariant>(
    model: &'a mut OmeModel,
    node: NodeId,
    element: &'static str,
    index: usize,
) -> ModelResult<&'a mut T> {
    model.get_as_mut::<T>(node).ok_or_else(|| missing(element, index))
}

/// Insert `object` and register it under `id`.
fn insert_registered(
    model: &mut OmeModel,
    id: &str,
    object: impl Into<ModelObject>,
) -> ModelResult<NodeId> {
    if model.lookup(id).is_some() {
        return Err(ModelError::DuplicateId(id.to_string()));
    }
    let node = model.insert(object);
    model.add_model_object(id, node)?;
    debug!(id = id, node = %node, "Stored new object");
    Ok(node)
}

/// Create the object for slot `index` of `nodes`.
///
/// Returns the new node, or `None` when the slot already holds `id`.
fn append_object(
    model: &mut OmeModel,
    nodes: &[NodeId],
    element: &'static str,
    index: usize,
    id: &str,
    object: impl Into<ModelObject>,
) -> ModelResult<Option<NodeId>> {
    if let Some(node) = nodes.get(index) {
        return match model.get(*node).and_then(ModelObject::id) {
            Some(existing) if existing == id => Ok(None),
            _ => Err(missing(element, index)),
        };
    }
    if index != nodes.len() {
        return Err(missing(element, index));
    }
    insert_registered(model, id, object).map(Some)
}

/// [`append_object`] for a child list held by `parent`.
fn append_child<P: ObjectVariant>(
    model: &mut OmeModel,
    parent: NodeId,
    children: fn(&mut P) -> &mut Vec<NodeId>,
    element: &'static str,
    index: usize,
    id: &str,
    object: impl Into<ModelObject>,
) -> ModelResult<()> {
    let existing = model
        .get_as_mut::<P>(parent)
        .map(|parent| children(parent).clone())
        .unwrap_or_default();
    if let Some(node) = append_object(model, &existing, element, index, id, object)? {
        if let Some(parent) = model.get_as_mut::<P>(parent) {
            children(parent).push(node);
        }
    }
    Ok(())
}

fn put_reference(
    model: &mut OmeModel,
    source: NodeId,
    kind: ReferenceKind,
    target: &str,
    index: usize,
) -> ModelResult<()> {
    if model.set_reference(source, index, Reference::new(kind, target)) {
        Ok(())
    } else {
        Err(missing(kind.name(), index))
    }
}

// =============================================================================
// OmeXmlMetadataRoot
// =============================================================================

impl OmeXmlMetadataRoot {
    fn image_node(&self, image: usize) -> ModelResult<NodeId> {
        node_at(&self.images, Image::ELEMENT, image)
    }

    fn image_mut(&mut self, image: usize) -> ModelResult<&mut Image> {
        let node = self.image_node(image)?;
        object_mut(&mut self.model, node, Image::ELEMENT, image)
    }

    fn pixels_node(&self, image: usize) -> ModelResult<NodeId> {
        let node = self.image_node(image)?;
        self.model
            .get_as::<Image>(node)
            .and_then(|image| image.pixels)
            .ok_or_else(|| missing(Pixels::ELEMENT, image))
    }

    fn pixels_mut(&mut self, image: usize) -> ModelResult<&mut Pixels> {
        let node = self.pixels_node(image)?;
        object_mut(&mut self.model, node, Pixels::ELEMENT, image)
    }

    fn objective_settings_mut(&mut self, image: usize) -> ModelResult<&mut ObjectiveSettings> {
        let node = self
            .image_mut(image)?
            .objective_settings
            .ok_or_else(|| missing(ObjectiveSettings::ELEMENT, image))?;
        object_mut(&mut self.model, node, ObjectiveSettings::ELEMENT, image)
    }

    fn channel_node(&self, image: usize, channel: usize) -> ModelResult<NodeId> {
        let pixels = self.pixels_node(image)?;
        self.model
            .get_as::<Pixels>(pixels)
            .and_then(|pixels| pixels.channels.get(channel).copied())
            .ok_or_else(|| missing(Channel::ELEMENT, channel))
    }

    fn channel_mut(&mut self, image: usize, channel: usize) -> ModelResult<&mut Channel> {
        let node = self.channel_node(image, channel)?;
        object_mut(&mut self.model, node, Channel::ELEMENT, channel)
    }

    /// The plane at `plane`, created when that is the next free slot.
    fn plane_mut(&mut self, image: usize, plane: usize) -> ModelResult<&mut Plane> {
        let pixels = self.pixels_node(image)?;
        let planes = self
            .model
            .get_as::<Pixels>(pixels)
            .map(|pixels| pixels.planes.clone())
            .unwrap_or_default();

        let node = match planes.get(plane) {
            Some(node) => *node,
            None if plane == planes.len() => {
                let node = self.model.insert(Plane::default());
                object_mut::<Pixels>(&mut self.model, pixels, Pixels::ELEMENT, image)?
                    .planes
                    .push(node);
                node
            }
            None => return Err(missing(Plane::ELEMENT, plane)),
        };
        object_mut(&mut self.model, node, Plane::ELEMENT, plane)
    }

    fn instrument_node(&self, instrument: usize) -> ModelResult<NodeId> {
        node_at(&self.instruments, Instrument::ELEMENT, instrument)
    }

    fn detector_mut(&mut self, instrument: usize, detector: usize) -> ModelResult<&mut Detector> {
        let parent = self.instrument_node(instrument)?;
        let node = self
            .model
            .get_as::<Instrument>(parent)
            .and_then(|instrument| instrument.detectors.get(detector).copied())
            .ok_or_else(|| missing(Detector::ELEMENT, detector))?;
        object_mut(&mut self.model, node, Detector::ELEMENT, detector)
    }

    fn objective_mut(
        &mut self,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<&mut Objective> {
        let parent = self.instrument_node(instrument)?;
        let node = self
            .model
            .get_as::<Instrument>(parent)
            .and_then(|instrument| instrument.objectives.get(objective).copied())
            .ok_or_else(|| missing(Objective::ELEMENT, objective))?;
        object_mut(&mut self.model, node, Objective::ELEMENT, objective)
    }

    fn experimenter_mut(&mut self, experimenter: usize) -> ModelResult<&mut Experimenter> {
        let node = node_at(&self.experimenters, Experimenter::ELEMENT, experimenter)?;
        object_mut(&mut self.model, node, Experimenter::ELEMENT, experimenter)
    }

    fn dataset_mut(&mut self, dataset: usize) -> ModelResult<&mut Dataset> {
        let node = node_at(&self.datasets, Dataset::ELEMENT, dataset)?;
        object_mut(&mut self.model, node, Dataset::ELEMENT, dataset)
    }

    fn plate_mut(&mut self, plate: usize) -> ModelResult<&mut Plate> {
        let node = node_at(&self.plates, Plate::ELEMENT, plate)?;
        object_mut(&mut self.model, node, Plate::ELEMENT, plate)
    }

    fn roi_mut(&mut self, roi: usize) -> ModelResult<&mut Roi> {
        let node = node_at(&self.rois, Roi::ELEMENT, roi)?;
        object_mut(&mut self.model, node, Roi::ELEMENT, roi)
    }

    fn shape_slot(&self, roi: usize, shape: usize) -> ModelResult<NodeId> {
        let parent = node_at(&self.rois, Roi::ELEMENT, roi)?;
        self.model
            .get_as::<Roi>(parent)
            .and_then(|roi| roi.shapes.get(shape).copied())
            .ok_or_else(|| missing(SHAPE, shape))
    }

    fn shape_object_mut(&mut self, roi: usize, shape: usize) -> ModelResult<&mut ModelObject> {
        let node = self.shape_slot(roi, shape)?;
        self.model.get_mut(node).ok_or_else(|| missing(SHAPE, shape))
    }

    fn shape_common_mut(&mut self, roi: usize, shape: usize) -> ModelResult<&mut ShapeCommon> {
        self.shape_object_mut(roi, shape)?
            .shape_mut()
            .ok_or_else(|| missing(SHAPE, shape))
    }

    fn shape_as_mut<T: ObjectVariant>(
        &mut self,
        element: &'static str,
        roi: usize,
        shape: usize,
    ) -> ModelResult<&mut T> {
        let node = self.shape_slot(roi, shape)?;
        object_mut(&mut self.model, node, element, shape)
    }

    fn add_roi_shape(
        &mut self,
        element: &'static str,
        id: &str,
        roi: usize,
        shape: usize,
        object: impl Into<ModelObject>,
    ) -> ModelResult<()> {
        let parent = node_at(&self.rois, Roi::ELEMENT, roi)?;
        append_child::<Roi>(
            &mut self.model,
            parent,
            |roi| &mut roi.shapes,
            element,
            shape,
            id,
            object,
        )
    }

    /// The annotation container, created on first use.
    fn annotation_container(&mut self) -> NodeId {
        match self.structured_annotations {
            Some(node) => node,
            None => {
                let node = self.model.insert(StructuredAnnotations::default());
                self.structured_annotations = Some(node);
                node
            }
        }
    }

    fn add_annotation(
        &mut self,
        list: fn(&mut StructuredAnnotations) -> &mut Vec<NodeId>,
        element: &'static str,
        id: &str,
        annotation: usize,
        object: impl Into<ModelObject>,
    ) -> ModelResult<()> {
        let container = self.annotation_container();
        append_child::<StructuredAnnotations>(
            &mut self.model,
            container,
            list,
            element,
            annotation,
            id,
            object,
        )
    }

    fn annotation_node(
        &self,
        list: fn(&StructuredAnnotations) -> &Vec<NodeId>,
        element: &'static str,
        annotation: usize,
    ) -> ModelResult<NodeId> {
        self.structured_annotations
            .and_then(|container| self.model.get_as::<StructuredAnnotations>(container))
            .and_then(|annotations| list(annotations).get(annotation).copied())
            .ok_or_else(|| missing(element, annotation))
    }

    fn annotation_mut<T: ObjectVariant>(
        &mut self,
        list: fn(&StructuredAnnotations) -> &Vec<NodeId>,
        element: &'static str,
        annotation: usize,
    ) -> ModelResult<&mut T> {
        let node = self.annotation_node(list, element, annotation)?;
        object_mut(&mut self.model, node, element, annotation)
    }
}

impl MetadataStore for OmeXmlMetadataRoot {
    fn set_uuid(&mut self, uuid: &str) {
        self.uuid = Some(uuid.to_string());
    }

    fn set_creator(&mut self, creator: &str) {
        self.creator = Some(creator.to_string());
    }

    // -------------------------------------------------------------------------
    // Image
    // -------------------------------------------------------------------------

    fn set_image_id(&mut self, id: &str, image: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.images,
            Image::ELEMENT,
            image,
            id,
            Image::new(id),
        )?;
        self.images.extend(created);
        Ok(())
    }

    fn set_image_name(&mut self, name: &str, image: usize) -> ModelResult<()> {
        self.image_mut(image)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_image_description(&mut self, description: &str, image: usize) -> ModelResult<()> {
        self.image_mut(image)?.description = Some(description.to_string());
        Ok(())
    }

    fn set_image_acquisition_date(&mut self, date: Timestamp, image: usize) -> ModelResult<()> {
        self.image_mut(image)?.acquisition_date = Some(date);
        Ok(())
    }

    fn set_image_experimenter_ref(
        &mut self,
        experimenter: &str,
        image: usize,
    ) -> ModelResult<()> {
        let node = self.image_node(image)?;
        put_reference(&mut self.model, node, ReferenceKind::ExperimenterRef, experimenter, 0)
    }

    fn set_image_instrument_ref(&mut self, instrument: &str, image: usize) -> ModelResult<()> {
        let node = self.image_node(image)?;
        put_reference(&mut self.model, node, ReferenceKind::InstrumentRef, instrument, 0)
    }

    fn set_image_roi_ref(&mut self, roi: &str, image: usize, index: usize) -> ModelResult<()> {
        let node = self.image_node(image)?;
        put_reference(&mut self.model, node, ReferenceKind::RoiRef, roi, index)
    }

    fn set_image_annotation_ref(
        &mut self,
        annotation: &str,
        image: usize,
        index: usize,
    ) -> ModelResult<()> {
        let node = self.image_node(image)?;
        put_reference(&mut self.model, node, ReferenceKind::AnnotationRef, annotation, index)
    }

    // -------------------------------------------------------------------------
    // ObjectiveSettings
    // -------------------------------------------------------------------------

    fn set_objective_settings_id(&mut self, objective: &str, image: usize) -> ModelResult<()> {
        let existing = self.image_mut(image)?.objective_settings;
        let node = match existing {
            Some(node) => node,
            None => {
                let node = self.model.insert(ObjectiveSettings::default());
                self.image_mut(image)?.objective_settings = Some(node);
                node
            }
        };
        put_reference(&mut self.model, node, ReferenceKind::ObjectiveRef, objective, 0)
    }

    fn set_objective_settings_medium(&mut self, medium: Medium, image: usize) -> ModelResult<()> {
        self.objective_settings_mut(image)?.medium = Some(medium);
        Ok(())
    }

    fn set_objective_settings_refractive_index(
        &mut self,
        refractive_index: f64,
        image: usize,
    ) -> ModelResult<()> {
        self.objective_settings_mut(image)?.refractive_index = Some(refractive_index);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Pixels
    // -------------------------------------------------------------------------

    fn set_pixels_id(&mut self, id: &str, image: usize) -> ModelResult<()> {
        let existing = self.image_mut(image)?.pixels;
        match existing {
            Some(node) if self.model.get(node).and_then(ModelObject::id) == Some(id) => Ok(()),
            Some(_) => Err(missing(Pixels::ELEMENT, image)),
            None => {
                let node = insert_registered(&mut self.model, id, Pixels::new(id))?;
                self.image_mut(image)?.pixels = Some(node);
                Ok(())
            }
        }
    }

    fn set_pixels_dimension_order(
        &mut self,
        order: DimensionOrder,
        image: usize,
    ) -> ModelResult<()> {
        self.pixels_mut(image)?.dimension_order = Some(order);
        Ok(())
    }

    fn set_pixels_type(&mut self, pixel_type: PixelType, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.pixel_type = Some(pixel_type);
        Ok(())
    }

    fn set_pixels_size_x(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.size_x = Some(size);
        Ok(())
    }

    fn set_pixels_size_y(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.size_y = Some(size);
        Ok(())
    }

    fn set_pixels_size_z(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.size_z = Some(size);
        Ok(())
    }

    fn set_pixels_size_c(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.size_c = Some(size);
        Ok(())
    }

    fn set_pixels_size_t(&mut self, size: PositiveInteger, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.size_t = Some(size);
        Ok(())
    }

    fn set_pixels_physical_size_x(
        &mut self,
        (size, unit): (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()> {
        let pixels = self.pixels_mut(image)?;
        pixels.physical_size_x = Some(size);
        pixels.physical_size_x_unit = Some(unit);
        Ok(())
    }

    fn set_pixels_physical_size_y(
        &mut self,
        (size, unit): (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()> {
        let pixels = self.pixels_mut(image)?;
        pixels.physical_size_y = Some(size);
        pixels.physical_size_y_unit = Some(unit);
        Ok(())
    }

    fn set_pixels_physical_size_z(
        &mut self,
        (size, unit): (f64, UnitsLength),
        image: usize,
    ) -> ModelResult<()> {
        let pixels = self.pixels_mut(image)?;
        pixels.physical_size_z = Some(size);
        pixels.physical_size_z_unit = Some(unit);
        Ok(())
    }

    fn set_pixels_big_endian(&mut self, big_endian: bool, image: usize) -> ModelResult<()> {
        self.pixels_mut(image)?.big_endian = Some(big_endian);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Channel
    // -------------------------------------------------------------------------

    fn set_channel_id(&mut self, id: &str, image: usize, channel: usize) -> ModelResult<()> {
        let pixels = self.pixels_node(image)?;
        append_child::<Pixels>(
            &mut self.model,
            pixels,
            |pixels| &mut pixels.channels,
            Channel::ELEMENT,
            channel,
            id,
            Channel::new(id),
        )
    }

    fn set_channel_name(&mut self, name: &str, image: usize, channel: usize) -> ModelResult<()> {
        self.channel_mut(image, channel)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_channel_color(&mut self, color: i32, image: usize, channel: usize) -> ModelResult<()> {
        self.channel_mut(image, channel)?.color = Some(color);
        Ok(())
    }

    fn set_channel_samples_per_pixel(
        &mut self,
        samples: PositiveInteger,
        image: usize,
        channel: usize,
    ) -> ModelResult<()> {
        self.channel_mut(image, channel)?.samples_per_pixel = Some(samples);
        Ok(())
    }

    fn set_channel_emission_wavelength(
        &mut self,
        wavelength: f64,
        image: usize,
        channel: usize,
    ) -> ModelResult<()> {
        self.channel_mut(image, channel)?.emission_wavelength = Some(wavelength);
        Ok(())
    }

    fn set_channel_detector_ref(
        &mut self,
        detector: &str,
        image: usize,
        channel: usize,
    ) -> ModelResult<()> {
        let existing = self.channel_mut(image, channel)?.detector_settings;
        let node = match existing {
            Some(node) => node,
            None => {
                let node = self.model.insert(DetectorSettings::default());
                self.channel_mut(image, channel)?.detector_settings = Some(node);
                node
            }
        };
        put_reference(&mut self.model, node, ReferenceKind::DetectorRef, detector, 0)
    }

    fn set_detector_settings_gain(
        &mut self,
        gain: f64,
        image: usize,
        channel: usize,
    ) -> ModelResult<()> {
        let node = self
            .channel_mut(image, channel)?
            .detector_settings
            .ok_or_else(|| missing(DetectorSettings::ELEMENT, channel))?;
        object_mut::<DetectorSettings>(&mut self.model, node, DetectorSettings::ELEMENT, channel)?
            .gain = Some(gain);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Plane
    // -------------------------------------------------------------------------

    fn set_plane_the_z(
        &mut self,
        the_z: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()> {
        self.plane_mut(image, plane)?.the_z = Some(the_z);
        Ok(())
    }

    fn set_plane_the_c(
        &mut self,
        the_c: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()> {
        self.plane_mut(image, plane)?.the_c = Some(the_c);
        Ok(())
    }

    fn set_plane_the_t(
        &mut self,
        the_t: NonNegativeInteger,
        image: usize,
        plane: usize,
    ) -> ModelResult<()> {
        self.plane_mut(image, plane)?.the_t = Some(the_t);
        Ok(())
    }

    fn set_plane_exposure_time(
        &mut self,
        time: f64,
        image: usize,
        plane: usize,
    ) -> ModelResult<()> {
        self.plane_mut(image, plane)?.exposure_time = Some(time);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Instrument
    // -------------------------------------------------------------------------

    fn set_instrument_id(&mut self, id: &str, instrument: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.instruments,
            Instrument::ELEMENT,
            instrument,
            id,
            Instrument::new(id),
        )?;
        self.instruments.extend(created);
        Ok(())
    }

    fn set_detector_id(
        &mut self,
        id: &str,
        instrument: usize,
        detector: usize,
    ) -> ModelResult<()> {
        let parent = self.instrument_node(instrument)?;
        append_child::<Instrument>(
            &mut self.model,
            parent,
            |instrument| &mut instrument.detectors,
            Detector::ELEMENT,
            detector,
            id,
            Detector::new(id),
        )
    }

    fn set_detector_type(
        &mut self,
        detector_type: DetectorType,
        instrument: usize,
        detector: usize,
    ) -> ModelResult<()> {
        self.detector_mut(instrument, detector)?.detector_type = Some(detector_type);
        Ok(())
    }

    fn set_detector_model(
        &mut self,
        model: &str,
        instrument: usize,
        detector: usize,
    ) -> ModelResult<()> {
        self.detector_mut(instrument, detector)?.model = Some(model.to_string());
        Ok(())
    }

    fn set_objective_id(
        &mut self,
        id: &str,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<()> {
        let parent = self.instrument_node(instrument)?;
        append_child::<Instrument>(
            &mut self.model,
            parent,
            |instrument| &mut instrument.objectives,
            Objective::ELEMENT,
            objective,
            id,
            Objective::new(id),
        )
    }

    fn set_objective_nominal_magnification(
        &mut self,
        magnification: f64,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<()> {
        self.objective_mut(instrument, objective)?.nominal_magnification = Some(magnification);
        Ok(())
    }

    fn set_objective_lens_na(
        &mut self,
        lens_na: f64,
        instrument: usize,
        objective: usize,
    ) -> ModelResult<()> {
        self.objective_mut(instrument, objective)?.lens_na = Some(lens_na);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Experimenter
    // -------------------------------------------------------------------------

    fn set_experimenter_id(&mut self, id: &str, experimenter: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.experimenters,
            Experimenter::ELEMENT,
            experimenter,
            id,
            Experimenter::new(id),
        )?;
        self.experimenters.extend(created);
        Ok(())
    }

    fn set_experimenter_first_name(
        &mut self,
        name: &str,
        experimenter: usize,
    ) -> ModelResult<()> {
        self.experimenter_mut(experimenter)?.first_name = Some(name.to_string());
        Ok(())
    }

    fn set_experimenter_last_name(
        &mut self,
        name: &str,
        experimenter: usize,
    ) -> ModelResult<()> {
        self.experimenter_mut(experimenter)?.last_name = Some(name.to_string());
        Ok(())
    }

    fn set_experimenter_email(&mut self, email: &str, experimenter: usize) -> ModelResult<()> {
        self.experimenter_mut(experimenter)?.email = Some(email.to_string());
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Dataset
    // -------------------------------------------------------------------------

    fn set_dataset_id(&mut self, id: &str, dataset: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.datasets,
            Dataset::ELEMENT,
            dataset,
            id,
            Dataset::new(id),
        )?;
        self.datasets.extend(created);
        Ok(())
    }

    fn set_dataset_name(&mut self, name: &str, dataset: usize) -> ModelResult<()> {
        self.dataset_mut(dataset)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_dataset_experimenter_ref(
        &mut self,
        experimenter: &str,
        dataset: usize,
    ) -> ModelResult<()> {
        let node = node_at(&self.datasets, Dataset::ELEMENT, dataset)?;
        put_reference(&mut self.model, node, ReferenceKind::ExperimenterRef, experimenter, 0)
    }

    fn set_dataset_image_ref(
        &mut self,
        image: &str,
        dataset: usize,
        index: usize,
    ) -> ModelResult<()> {
        let node = node_at(&self.datasets, Dataset::ELEMENT, dataset)?;
        put_reference(&mut self.model, node, ReferenceKind::ImageRef, image, index)
    }

    // -------------------------------------------------------------------------
    // Plate
    // -------------------------------------------------------------------------

    fn set_plate_id(&mut self, id: &str, plate: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.plates,
            Plate::ELEMENT,
            plate,
            id,
            Plate::new(id),
        )?;
        self.plates.extend(created);
        Ok(())
    }

    fn set_plate_name(&mut self, name: &str, plate: usize) -> ModelResult<()> {
        self.plate_mut(plate)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_plate_rows(&mut self, rows: PositiveInteger, plate: usize) -> ModelResult<()> {
        self.plate_mut(plate)?.rows = Some(rows);
        Ok(())
    }

    fn set_plate_columns(&mut self, columns: PositiveInteger, plate: usize) -> ModelResult<()> {
        self.plate_mut(plate)?.columns = Some(columns);
        Ok(())
    }

    fn set_plate_annotation_ref(
        &mut self,
        annotation: &str,
        plate: usize,
        index: usize,
    ) -> ModelResult<()> {
        let node = node_at(&self.plates, Plate::ELEMENT, plate)?;
        put_reference(&mut self.model, node, ReferenceKind::AnnotationRef, annotation, index)
    }

    // -------------------------------------------------------------------------
    // ROI
    // -------------------------------------------------------------------------

    fn set_roi_id(&mut self, id: &str, roi: usize) -> ModelResult<()> {
        let created = append_object(
            &mut self.model,
            &self.rois,
            Roi::ELEMENT,
            roi,
            id,
            Roi::new(id),
        )?;
        self.rois.extend(created);
        Ok(())
    }

    fn set_roi_name(&mut self, name: &str, roi: usize) -> ModelResult<()> {
        self.roi_mut(roi)?.name = Some(name.to_string());
        Ok(())
    }

    fn set_roi_description(&mut self, description: &str, roi: usize) -> ModelResult<()> {
        self.roi_mut(roi)?.description = Some(description.to_string());
        Ok(())
    }

    fn set_rectangle_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()> {
        self.add_roi_shape(Rectangle::ELEMENT, id, roi, shape, Rectangle::new(id))
    }

    fn set_ellipse_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()> {
        self.add_roi_shape(Ellipse::ELEMENT, id, roi, shape, Ellipse::new(id))
    }

    fn set_point_id(&mut self, id: &str, roi: usize, shape: usize) -> ModelResult<()> {
        self.add_roi_shape(Point::ELEMENT, id, roi, shape, Point::new(id))
    }

    fn set_shape_text(&mut self, text: &str, roi: usize, shape: usize) -> ModelResult<()> {
        self.shape_common_mut(roi, shape)?.text = Some(text.to_string());
        Ok(())
    }

    fn set_shape_the_z(
        &mut self,
        the_z: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_common_mut(roi, shape)?.the_z = Some(the_z);
        Ok(())
    }

    fn set_shape_the_c(
        &mut self,
        the_c: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_common_mut(roi, shape)?.the_c = Some(the_c);
        Ok(())
    }

    fn set_shape_the_t(
        &mut self,
        the_t: NonNegativeInteger,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_common_mut(roi, shape)?.the_t = Some(the_t);
        Ok(())
    }

    fn set_shape_x(&mut self, x: f64, roi: usize, shape: usize) -> ModelResult<()> {
        let (anchor_x, _) = self
            .shape_object_mut(roi, shape)?
            .shape_anchor_mut()
            .ok_or_else(|| missing(SHAPE, shape))?;
        *anchor_x = Some(x);
        Ok(())
    }

    fn set_shape_y(&mut self, y: f64, roi: usize, shape: usize) -> ModelResult<()> {
        let (_, anchor_y) = self
            .shape_object_mut(roi, shape)?
            .shape_anchor_mut()
            .ok_or_else(|| missing(SHAPE, shape))?;
        *anchor_y = Some(y);
        Ok(())
    }

    fn set_rectangle_width(&mut self, width: f64, roi: usize, shape: usize) -> ModelResult<()> {
        self.shape_as_mut::<Rectangle>(Rectangle::ELEMENT, roi, shape)?
            .width = Some(width);
        Ok(())
    }

    fn set_rectangle_height(
        &mut self,
        height: f64,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_as_mut::<Rectangle>(Rectangle::ELEMENT, roi, shape)?
            .height = Some(height);
        Ok(())
    }

    fn set_ellipse_radius_x(
        &mut self,
        radius: f64,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_as_mut::<Ellipse>(Ellipse::ELEMENT, roi, shape)?
            .radius_x = Some(radius);
        Ok(())
    }

    fn set_ellipse_radius_y(
        &mut self,
        radius: f64,
        roi: usize,
        shape: usize,
    ) -> ModelResult<()> {
        self.shape_as_mut::<Ellipse>(Ellipse::ELEMENT, roi, shape)?
            .radius_y = Some(radius);
        Ok(())
    }

    fn set_shape_annotation_ref(
        &mut self,
        annotation: &str,
        roi: usize,
        shape: usize,
        index: usize,
    ) -> ModelResult<()> {
        let node = self.shape_slot(roi, shape)?;
        put_reference(&mut self.model, node, ReferenceKind::AnnotationRef, annotation, index)
    }

    // -------------------------------------------------------------------------
    // Annotations
    // -------------------------------------------------------------------------

    fn set_comment_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()> {
        self.add_annotation(
            |annotations| &mut annotations.comments,
            CommentAnnotation::ELEMENT,
            id,
            annotation,
            CommentAnnotation::new(id),
        )
    }

    fn set_comment_annotation_value(
        &mut self,
        value: &str,
        annotation: usize,
    ) -> ModelResult<()> {
        self.annotation_mut::<CommentAnnotation>(
            |annotations| &annotations.comments,
            CommentAnnotation::ELEMENT,
            annotation,
        )?
        .value = Some(value.to_string());
        Ok(())
    }

    fn set_comment_annotation_annotator(
        &mut self,
        experimenter: &str,
        annotation: usize,
    ) -> ModelResult<()> {
        let node = self.annotation_node(
            |annotations| &annotations.comments,
            CommentAnnotation::ELEMENT,
            annotation,
        )?;
        put_reference(&mut self.model, node, ReferenceKind::Annotator, experimenter, 0)
    }

    fn set_tag_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()> {
        self.add_annotation(
            |annotations| &mut annotations.tags,
            TagAnnotation::ELEMENT,
            id,
            annotation,
            TagAnnotation::new(id),
        )
    }

    fn set_tag_annotation_value(&mut self, value: &str, annotation: usize) -> ModelResult<()> {
        self.annotation_mut::<TagAnnotation>(
            |annotations| &annotations.tags,
            TagAnnotation::ELEMENT,
            annotation,
        )?
        .value = Some(value.to_string());
        Ok(())
    }

    fn set_long_annotation_id(&mut self, id: &str, annotation: usize) -> ModelResult<()> {
        self.add_annotation(
            |annotations| &mut annotations.longs,
            LongAnnotation::ELEMENT,
            id,
            annotation,
            LongAnnotation::new(id),
        )
    }

    fn set_long_annotation_value(&mut self, value: i64, annotation: usize) -> ModelResult<()> {
        self.annotation_mut::<LongAnnotation>(
            |annotations| &annotations.longs,
            LongAnnotation::ELEMENT,
            annotation,
        )?
        .value = Some(value);
        Ok(())
    }
}

// =============================================================================
// Conversion
// =============================================================================

/// Call `$setter` with a retrieved value when it is present.
macro_rules! copy_value {
    ($store:ident, $value:expr, $setter:ident($($index:expr),*)) => {
        if let Some(value) = $value {
            $store.$setter(value, $($index),*)?;
        }
    };
}

/// Copy a list of references, skipping the ones that read back as `None`.
fn copy_references<'a>(
    count: usize,
    get: impl Fn(usize) -> Option<&'a str>,
    mut set: impl FnMut(&'a str, usize) -> ModelResult<()>,
) -> ModelResult<()> {
    let mut stored = 0;
    for index in 0..count {
        if let Some(target) = get(index) {
            set(target, stored)?;
            stored += 1;
        }
    }
    Ok(())
}

/// Copy every value `source` exposes into `store`.
///
/// Objects without an ID in `source` are skipped along with their
/// properties. Unresolved references read back as `None` and are not
/// copied. The store is left unresolved; resolve it once filled.
pub fn convert_metadata(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
) -> ModelResult<()> {
    if let Some(uuid) = source.uuid() {
        store.set_uuid(uuid);
    }
    if let Some(creator) = source.creator() {
        store.set_creator(creator);
    }

    convert_experimenters(source, store)?;
    convert_instruments(source, store)?;
    convert_images(source, store)?;
    convert_datasets(source, store)?;
    convert_plates(source, store)?;
    convert_rois(source, store)?;
    convert_annotations(source, store)?;
    Ok(())
}

fn convert_experimenters(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
) -> ModelResult<()> {
    for e in 0..source.experimenter_count() {
        let Some(id) = source.experimenter_id(e) else {
            continue;
        };
        store.set_experimenter_id(id, e)?;
        copy_value!(store, source.experimenter_first_name(e), set_experimenter_first_name(e));
        copy_value!(store, source.experimenter_last_name(e), set_experimenter_last_name(e));
        copy_value!(store, source.experimenter_email(e), set_experimenter_email(e));
    }
    Ok(())
}

fn convert_instruments(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
) -> ModelResult<()> {
    for i in 0..source.instrument_count() {
        let Some(id) = source.instrument_id(i) else {
            continue;
        };
        store.set_instrument_id(id, i)?;

        for d in 0..source.detector_count(i) {
            let Some(id) = source.detector_id(i, d) else {
                continue;
            };
            store.set_detector_id(id, i, d)?;
            copy_value!(store, source.detector_type(i, d), set_detector_type(i, d));
            copy_value!(store, source.detector_model(i, d), set_detector_model(i, d));
        }

        for o in 0..source.objective_count(i) {
            let Some(id) = source.objective_id(i, o) else {
                continue;
            };
            store.set_objective_id(id, i, o)?;
            copy_value!(
                store,
                source.objective_nominal_magnification(i, o),
                set_objective_nominal_magnification(i, o)
            );
            copy_value!(store, source.objective_lens_na(i, o), set_objective_lens_na(i, o));
        }
    }
    Ok(())
}

fn convert_images(source: &dyn MetadataRetrieve, store: &mut dyn MetadataStore) -> ModelResult<()> {
    for i in 0..source.image_count() {
        let Some(id) = source.image_id(i) else {
            continue;
        };
        store.set_image_id(id, i)?;
        copy_value!(store, source.image_name(i), set_image_name(i));
        copy_value!(store, source.image_description(i), set_image_description(i));
        copy_value!(
            store,
            source.image_acquisition_date(i).cloned(),
            set_image_acquisition_date(i)
        );
        copy_value!(store, source.image_experimenter_ref(i), set_image_experimenter_ref(i));
        copy_value!(store, source.image_instrument_ref(i), set_image_instrument_ref(i));
        copy_references(
            source.image_roi_ref_count(i),
            move |k| source.image_roi_ref(i, k),
            |target, k| store.set_image_roi_ref(target, i, k),
        )?;
        copy_references(
            source.image_annotation_ref_count(i),
            move |k| source.image_annotation_ref(i, k),
            |target, k| store.set_image_annotation_ref(target, i, k),
        )?;

        if let Some(objective) = source.objective_settings_id(i) {
            store.set_objective_settings_id(objective, i)?;
            copy_value!(
                store,
                source.objective_settings_medium(i),
                set_objective_settings_medium(i)
            );
            copy_value!(
                store,
                source.objective_settings_refractive_index(i),
                set_objective_settings_refractive_index(i)
            );
        }

        if let Some(pixels) = source.pixels_id(i) {
            store.set_pixels_id(pixels, i)?;
            convert_pixels(source, store, i)?;
        }
    }
    Ok(())
}

fn convert_pixels(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
    i: usize,
) -> ModelResult<()> {
    copy_value!(store, source.pixels_dimension_order(i), set_pixels_dimension_order(i));
    copy_value!(store, source.pixels_type(i), set_pixels_type(i));
    copy_value!(store, source.pixels_size_x(i), set_pixels_size_x(i));
    copy_value!(store, source.pixels_size_y(i), set_pixels_size_y(i));
    copy_value!(store, source.pixels_size_z(i), set_pixels_size_z(i));
    copy_value!(store, source.pixels_size_c(i), set_pixels_size_c(i));
    copy_value!(store, source.pixels_size_t(i), set_pixels_size_t(i));
    copy_value!(store, source.pixels_physical_size_x(i), set_pixels_physical_size_x(i));
    copy_value!(store, source.pixels_physical_size_y(i), set_pixels_physical_size_y(i));
    copy_value!(store, source.pixels_physical_size_z(i), set_pixels_physical_size_z(i));
    copy_value!(store, source.pixels_big_endian(i), set_pixels_big_endian(i));

    for c in 0..source.channel_count(i) {
        let Some(id) = source.channel_id(i, c) else {
            continue;
        };
        store.set_channel_id(id, i, c)?;
        copy_value!(store, source.channel_name(i, c), set_channel_name(i, c));
        copy_value!(store, source.channel_color(i, c), set_channel_color(i, c));
        copy_value!(
            store,
            source.channel_samples_per_pixel(i, c),
            set_channel_samples_per_pixel(i, c)
        );
        copy_value!(
            store,
            source.channel_emission_wavelength(i, c),
            set_channel_emission_wavelength(i, c)
        );
        if let Some(detector) = source.channel_detector_ref(i, c) {
            store.set_channel_detector_ref(detector, i, c)?;
            copy_value!(
                store,
                source.detector_settings_gain(i, c),
                set_detector_settings_gain(i, c)
            );
        }
    }

    for p in 0..source.plane_count(i) {
        copy_value!(store, source.plane_the_z(i, p), set_plane_the_z(i, p));
        copy_value!(store, source.plane_the_c(i, p), set_plane_the_c(i, p));
        copy_value!(store, source.plane_the_t(i, p), set_plane_the_t(i, p));
        copy_value!(store, source.plane_exposure_time(i, p), set_plane_exposure_time(i, p));
    }
    Ok(())
}

fn convert_datasets(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
) -> ModelResult<()> {
    for d in 0..source.dataset_count() {
        let Some(id) = source.dataset_id(d) else {
            continue;
        };
        store.set_dataset_id(id, d)?;
        copy_value!(store, source.dataset_name(d), set_dataset_name(d));
        copy_value!(
            store,
            source.dataset_experimenter_ref(d),
            set_dataset_experimenter_ref(d)
        );
        copy_references(
            source.dataset_image_ref_count(d),
            move |k| source.dataset_image_ref(d, k),
            |target, k| store.set_dataset_image_ref(target, d, k),
        )?;
    }
    Ok(())
}

fn convert_plates(source: &dyn MetadataRetrieve, store: &mut dyn MetadataStore) -> ModelResult<()> {
    for p in 0..source.plate_count() {
        let Some(id) = source.plate_id(p) else {
            continue;
        };
        store.set_plate_id(id, p)?;
        copy_value!(store, source.plate_name(p), set_plate_name(p));
        copy_value!(store, source.plate_rows(p), set_plate_rows(p));
        copy_value!(store, source.plate_columns(p), set_plate_columns(p));
        copy_references(
            source.plate_annotation_ref_count(p),
            move |k| source.plate_annotation_ref(p, k),
            |target, k| store.set_plate_annotation_ref(target, p, k),
        )?;
    }
    Ok(())
}

fn convert_rois(source: &dyn MetadataRetrieve, store: &mut dyn MetadataStore) -> ModelResult<()> {
    for r in 0..source.roi_count() {
        let Some(id) = source.roi_id(r) else {
            continue;
        };
        store.set_roi_id(id, r)?;
        copy_value!(store, source.roi_name(r), set_roi_name(r));
        copy_value!(store, source.roi_description(r), set_roi_description(r));

        let mut stored = 0;
        for s in 0..source.shape_count(r) {
            let (Some(kind), Some(id)) = (source.shape_kind(r, s), source.shape_id(r, s)) else {
                continue;
            };
            match kind {
                ObjectKind::Rectangle => {
                    store.set_rectangle_id(id, r, stored)?;
                    copy_value!(
                        store,
                        source.rectangle_width(r, s),
                        set_rectangle_width(r, stored)
                    );
                    copy_value!(
                        store,
                        source.rectangle_height(r, s),
                        set_rectangle_height(r, stored)
                    );
                }
                ObjectKind::Ellipse => {
                    store.set_ellipse_id(id, r, stored)?;
                    copy_value!(
                        store,
                        source.ellipse_radius_x(r, s),
                        set_ellipse_radius_x(r, stored)
                    );
                    copy_value!(
                        store,
                        source.ellipse_radius_y(r, s),
                        set_ellipse_radius_y(r, stored)
                    );
                }
                ObjectKind::Point => store.set_point_id(id, r, stored)?,
                other => {
                    debug!("Skipping {} inside ROI {}", other, r);
                    continue;
                }
            }
            copy_value!(store, source.shape_text(r, s), set_shape_text(r, stored));
            copy_value!(store, source.shape_the_z(r, s), set_shape_the_z(r, stored));
            copy_value!(store, source.shape_the_c(r, s), set_shape_the_c(r, stored));
            copy_value!(store, source.shape_the_t(r, s), set_shape_the_t(r, stored));
            copy_value!(store, source.shape_x(r, s), set_shape_x(r, stored));
            copy_value!(store, source.shape_y(r, s), set_shape_y(r, stored));
            copy_references(
                source.shape_annotation_ref_count(r, s),
                move |k| source.shape_annotation_ref(r, s, k),
                |target, k| store.set_shape_annotation_ref(target, r, stored, k),
            )?;
            stored += 1;
        }
    }
    Ok(())
}

fn convert_annotations(
    source: &dyn MetadataRetrieve,
    store: &mut dyn MetadataStore,
) -> ModelResult<()> {
    for a in 0..source.comment_annotation_count() {
        let Some(id) = source.comment_annotation_id(a) else {
            continue;
        };
        store.set_comment_annotation_id(id, a)?;
        copy_value!(store, source.comment_annotation_value(a), set_comment_annotation_value(a));
        copy_value!(
            store,
            source.comment_annotation_annotator(a),
            set_comment_annotation_annotator(a)
        );
    }
    for a in 0..source.tag_annotation_count() {
        let Some(id) = source.tag_annotation_id(a) else {
            continue;
        };
        store.set_tag_annotation_id(id, a)?;
        copy_value!(store, source.tag_annotation_value(a), set_tag_annotation_value(a));
    }
    for a in 0..source.long_annotation_count() {
        let Some(id) = source.long_annotation_id(a) else {
            continue;
        };
        store.set_long_annotation_id(id, a)?;
        copy_value!(store, source.long_annotation_value(a), set_long_annotation_value(a));
    }
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================
