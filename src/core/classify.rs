//! Flood classification from backscatter Z-scores
//!
//! Combines per-band Z-score threshold flags with historical water
//! occurrence to separate flood water from permanent or seasonal water.
//! Classes: 0-3 encode the VV/VH flags, +10 marks historically inundated
//! ground, and 20 overrides everything as permanent open water.

use crate::algebra::Image;
use crate::sources::{
    HistoricalInundation, SurfaceWaterHistory, BAND_P_WATER_HIGH, BAND_P_WATER_MODERATE,
    BAND_P_WETLAND, WATER_HISTORY_NO_DATA, WATER_HISTORY_WATER,
};
use crate::types::{FloodResult, BAND_VH, BAND_VV};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Band name of the classification output
pub const FLOOD_CLASS_BAND: &str = "flood_class";

fn utc_date(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .expect("valid calendar date")
}

/// Flood classification parameters
///
/// The Z-score thresholds are mandatory; everything else defaults to the
/// published values: permanent open water at >= 90 % occurrence, historical
/// inundation at >= 25 %, historical window 2000-01-01 to 2018-01-01 over
/// the whole year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FloodMapParams {
    /// VV flag threshold: pixels with Z_VV <= this are flagged
    pub zvv_threshold: f32,
    /// VH flag threshold: pixels with Z_VH <= this are flagged
    pub zvh_threshold: f32,
    /// Water occurrence (%) at or above which a pixel is permanent open water
    pub pow_threshold: f32,
    /// Inundation probability (%) at or above which a pixel is historically inundated
    pub pin_threshold: f32,
    /// Prefer the historical inundation product over the occurrence record
    pub use_historical: bool,
    /// Start of the historical inundation query window
    pub historical_start: DateTime<Utc>,
    /// End (exclusive) of the historical inundation query window
    pub historical_end: DateTime<Utc>,
    /// First day-of-year of the seasonal window (inclusive)
    pub doy_start: u32,
    /// Last day-of-year of the seasonal window (inclusive)
    pub doy_end: u32,
}

impl FloodMapParams {
    pub fn new(zvv_threshold: f32, zvh_threshold: f32) -> Self {
        Self {
            zvv_threshold,
            zvh_threshold,
            pow_threshold: 90.0,
            pin_threshold: 25.0,
            use_historical: false,
            historical_start: utc_date(2000, 1, 1),
            historical_end: utc_date(2018, 1, 1),
            doy_start: 1,
            doy_end: 366,
        }
    }

    pub fn with_historical(mut self, use_historical: bool) -> Self {
        self.use_historical = use_historical;
        self
    }

    pub fn with_seasonal_window(mut self, doy_start: u32, doy_end: u32) -> Self {
        self.doy_start = doy_start;
        self.doy_end = doy_end;
        self
    }
}

/// Flood classifier over injected historical-water sources
///
/// The surface-water occurrence record is always required; the historical
/// inundation product is an optional capability attached at configuration
/// time. Requesting it without attaching it warns and falls back to the
/// occurrence record.
pub struct FloodMapper<'a> {
    surface_water: &'a dyn SurfaceWaterHistory,
    historical: Option<&'a dyn HistoricalInundation>,
}

impl<'a> FloodMapper<'a> {
    pub fn new(surface_water: &'a dyn SurfaceWaterHistory) -> Self {
        Self {
            surface_water,
            historical: None,
        }
    }

    pub fn with_historical(mut self, historical: &'a dyn HistoricalInundation) -> Self {
        self.historical = Some(historical);
        self
    }

    pub fn has_historical(&self) -> bool {
        self.historical.is_some()
    }

    /// Classify one Z-score image (bands VV and VH) into flood classes.
    ///
    /// The output is a single `flood_class` band carrying the input's
    /// acquisition timestamp, masked wherever the occurrence record has no
    /// valid historical observation.
    pub fn map_floods(&self, z: &Image, params: &FloodMapParams) -> FloodResult<Image> {
        let historical = match (params.use_historical, self.historical) {
            (true, Some(source)) => Some(source),
            (true, None) => {
                log::warn!(
                    "no historical inundation source attached; \
                     falling back to the surface-water occurrence record"
                );
                None
            }
            (false, _) => None,
        };

        // permanent open water from the monthly history
        let monthly = self.surface_water.monthly_history()?;
        log::debug!("surface-water history: {} monthly images", monthly.len());
        let valid_count = monthly
            .map(|m| Ok(m.gt_scalar(WATER_HISTORY_NO_DATA)))?
            .sum()?;
        let water_count = monthly
            .map(|m| Ok(m.eq_scalar(WATER_HISTORY_WATER)))?
            .sum()?;
        let occurrence_pct = water_count.divide(&valid_count)?.multiply_scalar(100.0);
        let validity_mask = valid_count.gt_scalar(0.0);
        let mut open_water = occurrence_pct.gte_scalar(params.pow_threshold);

        // historical inundation flag
        let inundation = match historical {
            Some(source) => {
                let probs = source.class_probabilities(
                    params.historical_start,
                    params.historical_end,
                    params.doy_start,
                    params.doy_end,
                )?;
                let p_high = probs.select(BAND_P_WATER_HIGH)?;
                let p_inundated = p_high
                    .add(&probs.select(BAND_P_WATER_MODERATE)?)?
                    .add(&probs.select(BAND_P_WETLAND)?)?;
                // high-confidence water frequent enough on its own also
                // counts as permanent open water
                open_water =
                    open_water.where_nonzero(&p_high.gte_scalar(params.pow_threshold), 1.0)?;
                p_inundated.gte_scalar(params.pin_threshold)
            }
            None => occurrence_pct.gte_scalar(params.pin_threshold),
        };

        // per-band flood flags; backscatter drops over flooded surfaces,
        // so low Z-scores mark likely floods
        let vv_flag = z.select(BAND_VV)?.lte_scalar(params.zvv_threshold);
        let vh_flag = z.select(BAND_VH)?.lte_scalar(params.zvh_threshold);

        let mut flood_class = vv_flag
            .add(&vh_flag.multiply_scalar(2.0))?
            .add(&inundation.multiply_scalar(10.0))?
            .where_nonzero(&open_water, 20.0)?
            .rename(&[FLOOD_CLASS_BAND])?
            .update_mask(&validity_mask)?;
        if let Some(t) = z.timestamp() {
            flood_class = flood_class.with_timestamp(t);
        }
        Ok(flood_class)
    }
}
