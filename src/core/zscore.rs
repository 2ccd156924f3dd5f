//! Baseline backscatter statistics and Z-scores for Sentinel-1 time series
//!
//! A baseline window fixes the reference distribution (per-pixel mean and
//! standard deviation of backscatter); every acquisition of the series is
//! then scored against it. Flooded surfaces show up as strongly negative
//! Z-scores because open water suppresses backscatter in both channels.

use crate::algebra::{Image, ImageCollection};
use crate::types::{AcquisitionMode, FloodResult, OrbitDirection, S1_BANDS};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Baseline period and acquisition geometry
///
/// Mean and standard deviation are computed from images inside
/// `[start, end)`; anomalies and Z-scores are computed for the whole
/// series (same mode and direction), not just the baseline window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BaselineWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub mode: AcquisitionMode,
    pub direction: OrbitDirection,
}

impl BaselineWindow {
    /// Baseline over `[start, end)` with the usual land-monitoring
    /// geometry: IW mode, descending pass.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start,
            end,
            mode: AcquisitionMode::IW,
            direction: OrbitDirection::Descending,
        }
    }

    pub fn with_mode(mut self, mode: AcquisitionMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_direction(mut self, direction: OrbitDirection) -> Self {
        self.direction = direction;
        self
    }
}

/// Consistent acquisition geometry, full time span
fn filter_series(collection: &ImageCollection, window: &BaselineWindow) -> ImageCollection {
    collection
        .filter_direction(window.direction)
        .filter_mode(window.mode)
}

/// Consistent acquisition geometry, baseline time span only
fn filter_baseline(collection: &ImageCollection, window: &BaselineWindow) -> ImageCollection {
    filter_series(collection, window).filter_date(window.start, window.end)
}

/// Per-pixel mean backscatter over the baseline window
pub fn baseline_mean(
    collection: &ImageCollection,
    window: &BaselineWindow,
) -> FloodResult<Image> {
    log::debug!(
        "baseline mean: {} {} {}..{}",
        window.mode,
        window.direction,
        window.start.format("%Y-%m-%d"),
        window.end.format("%Y-%m-%d")
    );
    filter_baseline(collection, window).mean()
}

/// Per-pixel standard deviation of backscatter over the baseline window
///
/// The reducer suffixes band names, so the output is re-labeled to the
/// acquisition schema (VV, VH, angle).
pub fn baseline_std_dev(
    collection: &ImageCollection,
    window: &BaselineWindow,
) -> FloodResult<Image> {
    filter_baseline(collection, window)
        .reduce_std_dev()?
        .rename(&S1_BANDS)
}

/// Backscatter anomaly (image minus baseline mean) for every image of the
/// series, acquisition timestamps preserved.
///
/// Note the asymmetry with [`baseline_mean`]: the whole series is mapped,
/// filtered only by mode and direction, so images outside the baseline
/// window are scored against the fixed reference period too.
pub fn anomaly(
    collection: &ImageCollection,
    window: &BaselineWindow,
) -> FloodResult<ImageCollection> {
    let basemean = baseline_mean(collection, window)?;
    filter_series(collection, window).map(|y| {
        let mut anom = y.subtract(&basemean)?;
        if let Some(t) = y.timestamp() {
            anom = anom.with_timestamp(t);
        }
        Ok(anom)
    })
}

/// Per-pixel backscatter Z-scores for every image of the series,
/// acquisition timestamps preserved
///
/// The baseline mean and standard deviation are computed once and reused
/// across the whole mapped series.
pub fn zscore(
    collection: &ImageCollection,
    window: &BaselineWindow,
) -> FloodResult<ImageCollection> {
    let anom = anomaly(collection, window)?;
    let basesd = baseline_std_dev(collection, window)?;
    anom.map(|y| {
        let mut z = y.divide(&basesd)?;
        if let Some(t) = y.timestamp() {
            z = z.with_timestamp(t);
        }
        Ok(z)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Acquisition, Pixel, BAND_ANGLE, BAND_VH, BAND_VV};
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use ndarray::Array2;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn s1_image(vv: Pixel, vh: Pixel, ts: DateTime<Utc>) -> Image {
        Image::new(vec![
            (BAND_VV, Array2::from_elem((1, 1), vv)),
            (BAND_VH, Array2::from_elem((1, 1), vh)),
            (BAND_ANGLE, Array2::from_elem((1, 1), 38.0)),
        ])
        .unwrap()
        .with_acquisition(Acquisition::sentinel1(
            ts,
            AcquisitionMode::IW,
            OrbitDirection::Descending,
        ))
    }

    fn series() -> ImageCollection {
        // baseline 2019: VV in {-10, -12, -14}, VH in {-16, -18, -20}
        // event image 2020-06-01 outside the baseline window
        ImageCollection::new(vec![
            s1_image(-10.0, -16.0, date(2019, 1, 10)),
            s1_image(-12.0, -18.0, date(2019, 5, 15)),
            s1_image(-14.0, -20.0, date(2019, 11, 20)),
            s1_image(-20.0, -26.0, date(2020, 6, 1)),
        ])
        .unwrap()
    }

    fn window() -> BaselineWindow {
        BaselineWindow::new(date(2019, 1, 1), date(2020, 1, 1))
    }

    #[test]
    fn test_baseline_mean_restricted_to_window() {
        let mean = baseline_mean(&series(), &window()).unwrap();
        assert_relative_eq!(mean.band(BAND_VV).unwrap()[[0, 0]], -12.0);
        assert_relative_eq!(mean.band(BAND_VH).unwrap()[[0, 0]], -18.0);
    }

    #[test]
    fn test_baseline_std_dev_relabeled() {
        let sd = baseline_std_dev(&series(), &window()).unwrap();
        assert_eq!(sd.band_names(), vec![BAND_VV, BAND_VH, BAND_ANGLE]);
        // population std dev of {-10, -12, -14}
        assert_relative_eq!(
            sd.band(BAND_VV).unwrap()[[0, 0]],
            (8.0f32 / 3.0).sqrt(),
            epsilon = 1e-5
        );
    }

    #[test]
    fn test_anomaly_covers_full_series() {
        let anom = anomaly(&series(), &window()).unwrap();
        // all four images are scored, not just the three baseline ones
        assert_eq!(anom.len(), 4);
        let event = &anom.images()[3];
        assert_eq!(event.timestamp(), Some(date(2020, 6, 1)));
        assert_relative_eq!(event.band(BAND_VV).unwrap()[[0, 0]], -8.0);
    }

    #[test]
    fn test_zscore_values_and_timestamps() {
        let z = zscore(&series(), &window()).unwrap();
        assert_eq!(z.len(), 4);
        let sd_vv = (8.0f32 / 3.0).sqrt();
        let event = &z.images()[3];
        assert_eq!(event.timestamp(), Some(date(2020, 6, 1)));
        assert_relative_eq!(
            event.band(BAND_VV).unwrap()[[0, 0]],
            -8.0 / sd_vv,
            epsilon = 1e-5
        );
        assert_eq!(event.band_names(), vec![BAND_VV, BAND_VH, BAND_ANGLE]);
    }

    #[test]
    fn test_geometry_filter_excludes_other_passes() {
        let mut images = series().images().to_vec();
        images.push(
            s1_image(-30.0, -30.0, date(2019, 6, 1)).with_acquisition(Acquisition::sentinel1(
                date(2019, 6, 1),
                AcquisitionMode::IW,
                OrbitDirection::Ascending,
            )),
        );
        let coll = ImageCollection::new(images).unwrap();
        let anom = anomaly(&coll, &window()).unwrap();
        assert_eq!(anom.len(), 4, "ascending pass must be excluded");

        let asc = anomaly(&coll, &window().with_direction(OrbitDirection::Ascending)).unwrap();
        assert_eq!(asc.len(), 1);
        assert_relative_eq!(asc.images()[0].band(BAND_VV).unwrap()[[0, 0]], 0.0);
    }

    #[test]
    fn test_empty_baseline_fails_at_evaluation() {
        let err = zscore(&series(), &window().with_mode(AcquisitionMode::EW)).unwrap_err();
        assert!(matches!(err, crate::types::FloodError::EmptyCollection(_)));
    }
}
