use crate::algebra::{Image, ImageCollection};
use crate::sources::{HistoricalInundation, SurfaceWaterHistory, INUNDATION_BANDS};
use crate::types::{FloodError, FloodResult};
use chrono::{DateTime, Utc};

/// In-memory monthly surface-water history
///
/// Wraps a pre-built collection of monthly class-code images.
#[derive(Debug, Clone)]
pub struct MonthlyWaterHistory {
    months: ImageCollection,
}

impl MonthlyWaterHistory {
    pub fn new(months: ImageCollection) -> Self {
        Self { months }
    }
}

impl SurfaceWaterHistory for MonthlyWaterHistory {
    fn monthly_history(&self) -> FloodResult<ImageCollection> {
        if self.months.is_empty() {
            return Err(FloodError::DataSource(
                "surface-water history holds no monthly images".to_string(),
            ));
        }
        Ok(self.months.clone())
    }
}

/// In-memory historical inundation probabilities
///
/// Wraps a collection of dated scene-level probability images (bands
/// [`INUNDATION_BANDS`], percent units). A query filters the scenes by
/// date range and day-of-year window and averages them into one
/// probability image.
#[derive(Debug, Clone)]
pub struct InundationProbabilityHistory {
    scenes: ImageCollection,
}

impl InundationProbabilityHistory {
    pub fn new(scenes: ImageCollection) -> FloodResult<Self> {
        if let Some(first) = scenes.images().first() {
            for band in INUNDATION_BANDS {
                first.band(band)?;
            }
        }
        Ok(Self { scenes })
    }
}

impl HistoricalInundation for InundationProbabilityHistory {
    fn class_probabilities(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        doy_start: u32,
        doy_end: u32,
    ) -> FloodResult<Image> {
        self.scenes
            .filter_date(start, end)
            .filter_day_of_year(doy_start, doy_end)
            .mean()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Acquisition;
    use approx::assert_relative_eq;
    use chrono::TimeZone;
    use ndarray::Array2;

    fn scene(p1: f32, ts: DateTime<Utc>) -> Image {
        Image::new(vec![
            ("pDSWE1", Array2::from_elem((1, 1), p1)),
            ("pDSWE2", Array2::from_elem((1, 1), 5.0)),
            ("pDSWE3", Array2::from_elem((1, 1), 2.0)),
        ])
        .unwrap()
        .with_acquisition(Acquisition::at(ts))
    }

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_probabilities_filtered_and_averaged() {
        let source = InundationProbabilityHistory::new(
            ImageCollection::new(vec![
                scene(10.0, date(2001, 3, 1)),
                scene(30.0, date(2005, 3, 10)),
                scene(90.0, date(2019, 3, 1)), // outside the date range
                scene(50.0, date(2006, 9, 1)), // outside the DOY window
            ])
            .unwrap(),
        )
        .unwrap();

        let probs = source
            .class_probabilities(date(2000, 1, 1), date(2018, 1, 1), 32, 120)
            .unwrap();
        assert_relative_eq!(probs.band("pDSWE1").unwrap()[[0, 0]], 20.0);
    }

    #[test]
    fn test_missing_probability_band_rejected() {
        let bad = Image::single("pDSWE1", Array2::zeros((1, 1)));
        let result = InundationProbabilityHistory::new(ImageCollection::new(vec![bad]).unwrap());
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_history_is_a_source_error() {
        let source = MonthlyWaterHistory::new(ImageCollection::new(Vec::new()).unwrap());
        assert!(matches!(
            source.monthly_history(),
            Err(FloodError::DataSource(_))
        ));
    }
}
