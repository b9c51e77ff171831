//! Schema enumerations.
//!
//! Every enumeration parses from its exact schema string and formats back to
//! it. Values outside the enumeration fail with [`EnumerationError`], which
//! aborts construction of the element that carried them.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::EnumerationError;

/// Defines a schema enumeration with its string mapping.
macro_rules! ome_enumeration {
    (
        $(#[$meta:meta])*
        $name:ident {
            $($(#[$vmeta:meta])* $variant:ident => $value:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $value)] $variant),+
        }

        impl $name {
            /// All enumerators in schema order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The schema string for this enumerator.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $value),+
                }
            }
        }

        impl FromStr for $name {
            type Err = EnumerationError;

            fn from_str(value: &str) -> Result<Self, Self::Err> {
                match value {
                    $($value => Ok($name::$variant),)+
                    _ => Err(EnumerationError::new(stringify!($name), value)),
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

ome_enumeration! {
    /// Order in which planes are stored in a Pixels block (fastest varying first).
    DimensionOrder {
        Xyzct => "XYZCT",
        Xyztc => "XYZTC",
        Xyctz => "XYCTZ",
        Xyczt => "XYCZT",
        Xytcz => "XYTCZ",
        Xytzc => "XYTZC",
    }
}

ome_enumeration! {
    /// Storage type of a single sample.
    PixelType {
        Int8 => "int8",
        Int16 => "int16",
        Int32 => "int32",
        Uint8 => "uint8",
        Uint16 => "uint16",
        Uint32 => "uint32",
        Float => "float",
        Double => "double",
        Complex => "complex",
        DoubleComplex => "double-complex",
        Bit => "bit",
    }
}

impl PixelType {
    /// Storage size of one sample in bytes (`bit` is reported as 1).
    pub const fn bytes_per_pixel(self) -> usize {
        match self {
            PixelType::Int8 | PixelType::Uint8 | PixelType::Bit => 1,
            PixelType::Int16 | PixelType::Uint16 => 2,
            PixelType::Int32 | PixelType::Uint32 | PixelType::Float => 4,
            PixelType::Double | PixelType::Complex => 8,
            PixelType::DoubleComplex => 16,
        }
    }
}

ome_enumeration! {
    /// Kind of detector.
    DetectorType {
        Ccd => "CCD",
        IntensifiedCcd => "IntensifiedCCD",
        AnalogVideo => "AnalogVideo",
        Pmt => "PMT",
        Photodiode => "Photodiode",
        Spectroscopy => "Spectroscopy",
        LifetimeImaging => "LifetimeImaging",
        CorrelationSpectroscopy => "CorrelationSpectroscopy",
        Ftir => "FTIR",
        Emccd => "EMCCD",
        Apd => "APD",
        Cmos => "CMOS",
        Ebccd => "EBCCD",
        Other => "Other",
    }
}

ome_enumeration! {
    /// Immersion medium an objective is designed for.
    Immersion {
        Oil => "Oil",
        Water => "Water",
        WaterDipping => "WaterDipping",
        Air => "Air",
        Multi => "Multi",
        Glycerol => "Glycerol",
        Other => "Other",
    }
}

ome_enumeration! {
    /// Medium actually used with an objective during acquisition.
    Medium {
        Air => "Air",
        Oil => "Oil",
        Water => "Water",
        Glycerol => "Glycerol",
        Other => "Other",
    }
}

ome_enumeration! {
    /// Acquisition technique of a channel.
    AcquisitionMode {
        WideField => "WideField",
        LaserScanningConfocalMicroscopy => "LaserScanningConfocalMicroscopy",
        SpinningDiskConfocal => "SpinningDiskConfocal",
        SlitScanConfocal => "SlitScanConfocal",
        MultiPhotonMicroscopy => "MultiPhotonMicroscopy",
        StructuredIllumination => "StructuredIllumination",
        SingleMoleculeImaging => "SingleMoleculeImaging",
        TotalInternalReflection => "TotalInternalReflection",
        FluorescenceLifetime => "FluorescenceLifetime",
        SpectralImaging => "SpectralImaging",
        FluorescenceCorrelationSpectroscopy => "FluorescenceCorrelationSpectroscopy",
        NearFieldScanningOpticalMicroscopy => "NearFieldScanningOpticalMicroscopy",
        SecondHarmonicGenerationImaging => "SecondHarmonicGenerationImaging",
        Palm => "PALM",
        Storm => "STORM",
        Sted => "STED",
        Tirf => "TIRF",
        Fsm => "FSM",
        Lcm => "LCM",
        Other => "Other",
        BrightField => "BrightField",
        SweptFieldConfocal => "SweptFieldConfocal",
        Spim => "SPIM",
    }
}

ome_enumeration! {
    /// How a channel was illuminated.
    IlluminationType {
        Transmitted => "Transmitted",
        Epifluorescence => "Epifluorescence",
        Oblique => "Oblique",
        NonLinear => "NonLinear",
        Other => "Other",
    }
}

ome_enumeration! {
    /// Detector binning.
    Binning {
        OneByOne => "1x1",
        TwoByTwo => "2x2",
        FourByFour => "4x4",
        EightByEight => "8x8",
        Other => "Other",
    }
}

ome_enumeration! {
    /// Length units accepted for physical sizes.
    UnitsLength {
        Meter => "m",
        Centimeter => "cm",
        Millimeter => "mm",
        Micrometer => "µm",
        Nanometer => "nm",
        Picometer => "pm",
        Angstrom => "Å",
        Inch => "in",
        Foot => "ft",
        Pixel => "pixel",
        ReferenceFrame => "reference frame",
    }
}

impl Default for UnitsLength {
    /// Physical sizes are in micrometers unless stated otherwise.
    fn default() -> Self {
        UnitsLength::Micrometer
    }
}
