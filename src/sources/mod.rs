//! Historical-water data sources
//!
//! The classifier separates flood water from permanent or seasonal water
//! using two collaborating datasets: a monthly global surface-water history
//! (always required) and an optional higher-resolution historical
//! inundation product. Both are injected behind traits so any backend that
//! can materialize the rasters plugs in; [`memory`] binds them to
//! pre-built in-memory values.
//!
//! Whether the optional product is attached is resolved once when the
//! [`FloodMapper`](crate::core::classify::FloodMapper) is configured, not
//! probed at classification time.

pub mod memory;

use crate::algebra::{Image, ImageCollection};
use crate::types::FloodResult;
use chrono::{DateTime, Utc};

// Re-export main types
pub use memory::{InundationProbabilityHistory, MonthlyWaterHistory};

/// Monthly class code: month had no valid observation
pub const WATER_HISTORY_NO_DATA: f32 = 0.0;
/// Monthly class code: observed, not water
pub const WATER_HISTORY_LAND: f32 = 1.0;
/// Monthly class code: observed as water
pub const WATER_HISTORY_WATER: f32 = 2.0;

/// Probability band: open water, high confidence
pub const BAND_P_WATER_HIGH: &str = "pDSWE1";
/// Probability band: open water, moderate confidence
pub const BAND_P_WATER_MODERATE: &str = "pDSWE2";
/// Probability band: potential wetland / partial surface water
pub const BAND_P_WETLAND: &str = "pDSWE3";

/// The three inundated-class probability bands, summed into the
/// historical inundation probability
pub const INUNDATION_BANDS: [&str; 3] =
    [BAND_P_WATER_HIGH, BAND_P_WATER_MODERATE, BAND_P_WETLAND];

/// Monthly global surface-water occurrence record
///
/// Each image covers one month; pixels carry the class codes
/// [`WATER_HISTORY_NO_DATA`], [`WATER_HISTORY_LAND`] and
/// [`WATER_HISTORY_WATER`].
pub trait SurfaceWaterHistory {
    fn monthly_history(&self) -> FloodResult<ImageCollection>;
}

/// Historical inundation probability product
///
/// Returns one image with the [`INUNDATION_BANDS`] probability bands (in
/// percent), computed over the acquisitions inside the date range and the
/// inclusive day-of-year window.
pub trait HistoricalInundation {
    fn class_probabilities(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        doy_start: u32,
        doy_end: u32,
    ) -> FloodResult<Image>;
}
