use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Real-valued backscatter / probability data
pub type Pixel = f32;

/// Band name of the VV polarization channel
pub const BAND_VV: &str = "VV";
/// Band name of the VH polarization channel
pub const BAND_VH: &str = "VH";
/// Band name of the local incidence angle channel
pub const BAND_ANGLE: &str = "angle";

/// Band schema of a Sentinel-1 dual-pol GRD acquisition
pub const S1_BANDS: [&str; 3] = [BAND_VV, BAND_VH, BAND_ANGLE];

/// Sentinel-1 acquisition mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AcquisitionMode {
    IW, // Interferometric Wide swath
    EW, // Extra Wide swath
    SM, // StripMap
    WV, // Wave
}

impl std::fmt::Display for AcquisitionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AcquisitionMode::IW => write!(f, "IW"),
            AcquisitionMode::EW => write!(f, "EW"),
            AcquisitionMode::SM => write!(f, "SM"),
            AcquisitionMode::WV => write!(f, "WV"),
        }
    }
}

/// Orbital pass direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrbitDirection {
    Ascending,
    Descending,
}

impl std::fmt::Display for OrbitDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrbitDirection::Ascending => write!(f, "ASCENDING"),
            OrbitDirection::Descending => write!(f, "DESCENDING"),
        }
    }
}

/// Acquisition metadata attached to an image
///
/// Monthly water-history images carry only a timestamp; Sentinel-1
/// acquisitions carry all three fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Acquisition {
    pub timestamp: Option<DateTime<Utc>>,
    pub mode: Option<AcquisitionMode>,
    pub direction: Option<OrbitDirection>,
}

impl Acquisition {
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            mode: None,
            direction: None,
        }
    }

    pub fn sentinel1(
        timestamp: DateTime<Utc>,
        mode: AcquisitionMode,
        direction: OrbitDirection,
    ) -> Self {
        Self {
            timestamp: Some(timestamp),
            mode: Some(mode),
            direction: Some(direction),
        }
    }
}

/// Flood classification codes
///
/// The classifier composes VV/VH anomaly flags with the historical
/// inundation flag (`+10`) and overwrites permanent open water with `20`,
/// so codes 4-9 and 14-19 can never occur.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FloodClass {
    /// No water, no anomaly flag
    NonWater = 0,
    /// VV anomaly only
    VvFlag = 1,
    /// VH anomaly only
    VhFlag = 2,
    /// VV and VH anomalies
    VvVhFlag = 3,
    /// Historically inundated, no anomaly flag
    PriorInundation = 10,
    /// Historically inundated, VV anomaly
    PriorInundationVv = 11,
    /// Historically inundated, VH anomaly
    PriorInundationVh = 12,
    /// Historically inundated, VV and VH anomalies
    PriorInundationVvVh = 13,
    /// Permanent open water, overrides all flags
    OpenWater = 20,
}

impl FloodClass {
    /// Decode a raster value into a class, if it is a member of the
    /// closed code set.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FloodClass::NonWater),
            1 => Some(FloodClass::VvFlag),
            2 => Some(FloodClass::VhFlag),
            3 => Some(FloodClass::VvVhFlag),
            10 => Some(FloodClass::PriorInundation),
            11 => Some(FloodClass::PriorInundationVv),
            12 => Some(FloodClass::PriorInundationVh),
            13 => Some(FloodClass::PriorInundationVvVh),
            20 => Some(FloodClass::OpenWater),
            _ => None,
        }
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// True when the VV anomaly flag contributed to this class
    pub fn vv_flagged(self) -> bool {
        matches!(
            self,
            FloodClass::VvFlag
                | FloodClass::VvVhFlag
                | FloodClass::PriorInundationVv
                | FloodClass::PriorInundationVvVh
        )
    }

    /// True when the VH anomaly flag contributed to this class
    pub fn vh_flagged(self) -> bool {
        matches!(
            self,
            FloodClass::VhFlag
                | FloodClass::VvVhFlag
                | FloodClass::PriorInundationVh
                | FloodClass::PriorInundationVvVh
        )
    }

    /// True for the historically inundated classes (codes 10-13)
    pub fn prior_inundation(self) -> bool {
        matches!(
            self,
            FloodClass::PriorInundation
                | FloodClass::PriorInundationVv
                | FloodClass::PriorInundationVh
                | FloodClass::PriorInundationVvVh
        )
    }
}

impl std::fmt::Display for FloodClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            FloodClass::NonWater => "non-water",
            FloodClass::VvFlag => "flood (VV)",
            FloodClass::VhFlag => "flood (VH)",
            FloodClass::VvVhFlag => "flood (VV+VH)",
            FloodClass::PriorInundation => "prior inundation",
            FloodClass::PriorInundationVv => "prior inundation, flood (VV)",
            FloodClass::PriorInundationVh => "prior inundation, flood (VH)",
            FloodClass::PriorInundationVvVh => "prior inundation, flood (VV+VH)",
            FloodClass::OpenWater => "permanent open water",
        };
        write!(f, "{}", label)
    }
}

/// Error types for flood mapping
#[derive(Debug, thiserror::Error)]
pub enum FloodError {
    #[error("Unknown band: {0}")]
    UnknownBand(String),

    #[error("Band count mismatch: expected {expected}, got {actual}")]
    BandMismatch { expected: usize, actual: usize },

    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    #[error("Data source error: {0}")]
    DataSource(String),

    #[error("Processing error: {0}")]
    Processing(String),
}

/// Result type for flood mapping operations
pub type FloodResult<T> = Result<T, FloodError>;
