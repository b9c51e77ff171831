//! Pixels and its per-channel and per-plane children.

use crate::error::ModelResult;
use crate::model::enums::{
    AcquisitionMode, Binning, DimensionOrder, IlluminationType, PixelType, UnitsLength,
};
use crate::model::object::{NodeId, ObjectKind, OmeModelObject};
use crate::model::parse::{
    add_attribute_reference, add_child_references, attr_bool, attr_enum, attr_parse,
    attr_string, build_children, check_tag, register, required_id, single_child,
    write_attribute_reference, write_child_references, write_children,
};
use crate::model::primitives::{NonNegativeInteger, PositiveInteger};
use crate::model::reference::ReferenceKind;
use crate::model::registry::OmeModel;
use crate::xml::{DomElement, XmlElement};

// =============================================================================
// Pixels
// =============================================================================

/// Dimensions and storage layout of an image's pixel data.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Pixels {
    pub id: String,
    pub dimension_order: Option<DimensionOrder>,
    pub pixel_type: Option<PixelType>,
    pub size_x: Option<PositiveInteger>,
    pub size_y: Option<PositiveInteger>,
    pub size_z: Option<PositiveInteger>,
    pub size_c: Option<PositiveInteger>,
    pub size_t: Option<PositiveInteger>,
    pub physical_size_x: Option<f64>,
    pub physical_size_x_unit: Option<UnitsLength>,
    pub physical_size_y: Option<f64>,
    pub physical_size_y_unit: Option<UnitsLength>,
    pub physical_size_z: Option<f64>,
    pub physical_size_z_unit: Option<UnitsLength>,
    pub time_increment: Option<f64>,
    pub significant_bits: Option<PositiveInteger>,
    pub big_endian: Option<bool>,
    pub interleaved: Option<bool>,
    pub channels: Vec<NodeId>,
    pub planes: Vec<NodeId>,
}

impl Pixels {
    pub const ELEMENT: &'static str = "Pixels";

    pub fn new(id: impl Into<String>) -> Self {
        Pixels {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Construct Pixels with its Channels and Planes from a DOM element.
    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let mut pixels = Pixels {
            id: id.clone(),
            dimension_order: attr_enum(element, "DimensionOrder")?,
            pixel_type: attr_enum(element, "Type")?,
            size_x: attr_parse(element, Self::ELEMENT, "SizeX")?,
            size_y: attr_parse(element, Self::ELEMENT, "SizeY")?,
            size_z: attr_parse(element, Self::ELEMENT, "SizeZ")?,
            size_c: attr_parse(element, Self::ELEMENT, "SizeC")?,
            size_t: attr_parse(element, Self::ELEMENT, "SizeT")?,
            physical_size_x: attr_parse(element, Self::ELEMENT, "PhysicalSizeX")?,
            physical_size_x_unit: attr_enum(element, "PhysicalSizeXUnit")?,
            physical_size_y: attr_parse(element, Self::ELEMENT, "PhysicalSizeY")?,
            physical_size_y_unit: attr_enum(element, "PhysicalSizeYUnit")?,
            physical_size_z: attr_parse(element, Self::ELEMENT, "PhysicalSizeZ")?,
            physical_size_z_unit: attr_enum(element, "PhysicalSizeZUnit")?,
            time_increment: attr_parse(element, Self::ELEMENT, "TimeIncrement")?,
            significant_bits: attr_parse(element, Self::ELEMENT, "SignificantBits")?,
            big_endian: attr_bool(element, Self::ELEMENT, "BigEndian")?,
            interleaved: attr_bool(element, Self::ELEMENT, "Interleaved")?,
            ..Default::default()
        };
        pixels.channels = build_children(element, Channel::ELEMENT, model, Channel::from_element)?;
        pixels.planes = build_children(element, Plane::ELEMENT, model, Plane::from_element)?;

        let node = model.insert(pixels);
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }

    /// Physical X size with its unit, defaulting the unit to micrometers.
    pub fn physical_size_x_with_unit(&self) -> Option<(f64, UnitsLength)> {
        self.physical_size_x
            .map(|size| (size, self.physical_size_x_unit.unwrap_or_default()))
    }

    /// Physical Y size with its unit, defaulting the unit to micrometers.
    pub fn physical_size_y_with_unit(&self) -> Option<(f64, UnitsLength)> {
        self.physical_size_y
            .map(|size| (size, self.physical_size_y_unit.unwrap_or_default()))
    }

    /// Physical Z size with its unit, defaulting the unit to micrometers.
    pub fn physical_size_z_with_unit(&self) -> Option<(f64, UnitsLength)> {
        self.physical_size_z
            .map(|size| (size, self.physical_size_z_unit.unwrap_or_default()))
    }

    /// Total number of planes implied by the Z, C and T sizes.
    ///
    /// Returns `None` unless all three sizes are set.
    pub fn plane_count(&self) -> Option<u64> {
        let z = self.size_z?.get() as u64;
        let c = self.size_c?.get() as u64;
        let t = self.size_t?.get() as u64;
        Some(z * c * t)
    }
}

impl OmeModelObject for Pixels {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Pixels
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn children(&self) -> Vec<NodeId> {
        self.channels
            .iter()
            .chain(self.planes.iter())
            .copied()
            .collect()
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("DimensionOrder", self.dimension_order);
        element.set_optional_attribute("Type", self.pixel_type);
        element.set_optional_attribute("SizeX", self.size_x);
        element.set_optional_attribute("SizeY", self.size_y);
        element.set_optional_attribute("SizeZ", self.size_z);
        element.set_optional_attribute("SizeC", self.size_c);
        element.set_optional_attribute("SizeT", self.size_t);
        element.set_optional_attribute("PhysicalSizeX", self.physical_size_x);
        element.set_optional_attribute("PhysicalSizeXUnit", self.physical_size_x_unit);
        element.set_optional_attribute("PhysicalSizeY", self.physical_size_y);
        element.set_optional_attribute("PhysicalSizeYUnit", self.physical_size_y_unit);
        element.set_optional_attribute("PhysicalSizeZ", self.physical_size_z);
        element.set_optional_attribute("PhysicalSizeZUnit", self.physical_size_z_unit);
        element.set_optional_attribute("TimeIncrement", self.time_increment);
        element.set_optional_attribute("SignificantBits", self.significant_bits);
        element.set_optional_attribute("BigEndian", self.big_endian);
        element.set_optional_attribute("Interleaved", self.interleaved);

        write_children(&mut element, model, &self.channels);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        write_children(&mut element, model, &self.planes);
        element
    }
}

// =============================================================================
// Channel
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Channel {
    pub id: String,
    pub name: Option<String>,
    pub samples_per_pixel: Option<PositiveInteger>,
    pub acquisition_mode: Option<AcquisitionMode>,
    pub illumination_type: Option<IlluminationType>,
    /// RGBA packed into a signed 32-bit integer
    pub color: Option<i32>,
    pub fluor: Option<String>,
    pub excitation_wavelength: Option<f64>,
    pub emission_wavelength: Option<f64>,
    pub detector_settings: Option<NodeId>,
}

impl Channel {
    pub const ELEMENT: &'static str = "Channel";

    pub fn new(id: impl Into<String>) -> Self {
        Channel {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let id = required_id(element, Self::ELEMENT)?;

        let detector_settings =
            match single_child(element, Self::ELEMENT, DetectorSettings::ELEMENT)? {
                Some(child) => Some(DetectorSettings::from_element(&child, model)?),
                None => None,
            };

        let node = model.insert(Channel {
            id: id.clone(),
            name: attr_string(element, "Name"),
            samples_per_pixel: attr_parse(element, Self::ELEMENT, "SamplesPerPixel")?,
            acquisition_mode: attr_enum(element, "AcquisitionMode")?,
            illumination_type: attr_enum(element, "IlluminationType")?,
            color: attr_parse(element, Self::ELEMENT, "Color")?,
            fluor: attr_string(element, "Fluor"),
            excitation_wavelength: attr_parse(element, Self::ELEMENT, "ExcitationWavelength")?,
            emission_wavelength: attr_parse(element, Self::ELEMENT, "EmissionWavelength")?,
            detector_settings,
        });
        register(model, &id, node)?;
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Channel {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Channel
    }

    fn id(&self) -> Option<&str> {
        Some(&self.id)
    }

    fn children(&self) -> Vec<NodeId> {
        self.detector_settings.into_iter().collect()
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_attribute("ID", &self.id);
        element.set_optional_attribute("Name", self.name.as_deref());
        element.set_optional_attribute("SamplesPerPixel", self.samples_per_pixel);
        element.set_optional_attribute("AcquisitionMode", self.acquisition_mode);
        element.set_optional_attribute("IlluminationType", self.illumination_type);
        element.set_optional_attribute("Color", self.color);
        element.set_optional_attribute("Fluor", self.fluor.as_deref());
        element.set_optional_attribute("ExcitationWavelength", self.excitation_wavelength);
        element.set_optional_attribute("EmissionWavelength", self.emission_wavelength);

        write_children(&mut element, model, self.detector_settings.as_slice());
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}

// =============================================================================
// DetectorSettings
// =============================================================================

/// Per-channel detector settings.
///
/// Like ObjectiveSettings, the `ID` attribute names the Detector used and is
/// recorded as a `DetectorRef` reference.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DetectorSettings {
    pub gain: Option<f64>,
    pub offset: Option<f64>,
    pub binning: Option<Binning>,
}

impl DetectorSettings {
    pub const ELEMENT: &'static str = "DetectorSettings";

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        required_id(element, Self::ELEMENT)?;

        let node = model.insert(DetectorSettings {
            gain: attr_parse(element, Self::ELEMENT, "Gain")?,
            offset: attr_parse(element, Self::ELEMENT, "Offset")?,
            binning: attr_enum(element, "Binning")?,
        });
        add_attribute_reference(element, "ID", node, ReferenceKind::DetectorRef, model);
        Ok(node)
    }
}

impl OmeModelObject for DetectorSettings {
    fn kind(&self) -> ObjectKind {
        ObjectKind::DetectorSettings
    }

    fn id(&self) -> Option<&str> {
        None
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        write_attribute_reference(&mut element, "ID", model, node, ReferenceKind::DetectorRef);
        element.set_optional_attribute("Gain", self.gain);
        element.set_optional_attribute("Offset", self.offset);
        element.set_optional_attribute("Binning", self.binning);
        element
    }
}

// =============================================================================
// Plane
// =============================================================================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Plane {
    pub the_z: Option<NonNegativeInteger>,
    pub the_c: Option<NonNegativeInteger>,
    pub the_t: Option<NonNegativeInteger>,
    pub delta_t: Option<f64>,
    pub exposure_time: Option<f64>,
    pub position_x: Option<f64>,
    pub position_y: Option<f64>,
    pub position_z: Option<f64>,
}

impl Plane {
    pub const ELEMENT: &'static str = "Plane";

    pub fn from_element<E: DomElement>(element: &E, model: &mut OmeModel) -> ModelResult<NodeId> {
        check_tag(element, Self::ELEMENT);
        let node = model.insert(Plane {
            the_z: attr_parse(element, Self::ELEMENT, "TheZ")?,
            the_c: attr_parse(element, Self::ELEMENT, "TheC")?,
            the_t: attr_parse(element, Self::ELEMENT, "TheT")?,
            delta_t: attr_parse(element, Self::ELEMENT, "DeltaT")?,
            exposure_time: attr_parse(element, Self::ELEMENT, "ExposureTime")?,
            position_x: attr_parse(element, Self::ELEMENT, "PositionX")?,
            position_y: attr_parse(element, Self::ELEMENT, "PositionY")?,
            position_z: attr_parse(element, Self::ELEMENT, "PositionZ")?,
        });
        add_child_references(element, node, ReferenceKind::AnnotationRef, model)?;
        Ok(node)
    }
}

impl OmeModelObject for Plane {
    fn kind(&self) -> ObjectKind {
        ObjectKind::Plane
    }

    fn id(&self) -> Option<&str> {
        None
    }

    fn to_element(&self, node: NodeId, model: &OmeModel) -> XmlElement {
        let mut element = XmlElement::new(Self::ELEMENT);
        element.set_optional_attribute("TheZ", self.the_z);
        element.set_optional_attribute("TheC", self.the_c);
        element.set_optional_attribute("TheT", self.the_t);
        element.set_optional_attribute("DeltaT", self.delta_t);
        element.set_optional_attribute("ExposureTime", self.exposure_time);
        element.set_optional_attribute("PositionX", self.position_x);
        element.set_optional_attribute("PositionY", self.position_y);
        element.set_optional_attribute("PositionZ", self.position_z);
        write_child_references(&mut element, model, node, ReferenceKind::AnnotationRef);
        element
    }
}
