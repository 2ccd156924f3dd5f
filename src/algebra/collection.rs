use crate::algebra::image::{Band, Image};
use crate::types::{AcquisitionMode, FloodError, FloodResult, OrbitDirection, Pixel};
use chrono::{DateTime, Datelike, Utc};
use ndarray::{Array2, Zip};
use rayon::prelude::*;

/// Ordered collection of images sharing one band schema and shape
///
/// Filters return sub-collections; the reducers collapse the collection to
/// a single image, skipping masked pixels the way map-algebra reducers do
/// (a pixel is masked in the output only when it is masked in every input).
#[derive(Debug, Clone)]
pub struct ImageCollection {
    images: Vec<Image>,
}

impl ImageCollection {
    /// Build a collection, checking that every image carries the same
    /// band schema and shape.
    pub fn new(images: Vec<Image>) -> FloodResult<Self> {
        if let Some(first) = images.first() {
            let dim = first.dim();
            let names = first.band_names();
            for img in &images[1..] {
                if img.dim() != dim {
                    return Err(FloodError::ShapeMismatch {
                        expected: dim,
                        actual: img.dim(),
                    });
                }
                if img.band_names() != names {
                    return Err(FloodError::Processing(format!(
                        "band schema mismatch in collection: {:?} vs {:?}",
                        names,
                        img.band_names()
                    )));
                }
            }
        }
        Ok(Self { images })
    }

    fn from_filtered(images: Vec<Image>) -> Self {
        // subsets of a validated collection need no re-validation
        Self { images }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[Image] {
        &self.images
    }

    /// Images acquired in `[start, end)`; images without a timestamp never
    /// match a date filter.
    pub fn filter_date(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        let images: Vec<Image> = self
            .images
            .iter()
            .filter(|img| matches!(img.timestamp(), Some(t) if t >= start && t < end))
            .cloned()
            .collect();
        log::debug!(
            "date filter {}..{}: kept {} of {} images",
            start.format("%Y-%m-%d"),
            end.format("%Y-%m-%d"),
            images.len(),
            self.images.len()
        );
        Self::from_filtered(images)
    }

    /// Images whose day-of-year falls in the inclusive range. A range with
    /// `start > end` wraps around the new year, calendar-range style.
    pub fn filter_day_of_year(&self, start: u32, end: u32) -> Self {
        let images: Vec<Image> = self
            .images
            .iter()
            .filter(|img| match img.timestamp() {
                Some(t) => {
                    let doy = t.ordinal();
                    if start <= end {
                        doy >= start && doy <= end
                    } else {
                        doy >= start || doy <= end
                    }
                }
                None => false,
            })
            .cloned()
            .collect();
        log::debug!(
            "day-of-year filter {}..{}: kept {} of {} images",
            start,
            end,
            images.len(),
            self.images.len()
        );
        Self::from_filtered(images)
    }

    /// Images acquired in the given instrument mode
    pub fn filter_mode(&self, mode: AcquisitionMode) -> Self {
        let images: Vec<Image> = self
            .images
            .iter()
            .filter(|img| img.acquisition().mode == Some(mode))
            .cloned()
            .collect();
        Self::from_filtered(images)
    }

    /// Images acquired on the given orbital pass
    pub fn filter_direction(&self, direction: OrbitDirection) -> Self {
        let images: Vec<Image> = self
            .images
            .iter()
            .filter(|img| img.acquisition().direction == Some(direction))
            .cloned()
            .collect();
        Self::from_filtered(images)
    }

    /// Apply an image-to-image function to every element, images processed
    /// in parallel
    pub fn map<F>(&self, f: F) -> FloodResult<Self>
    where
        F: Fn(&Image) -> FloodResult<Image> + Sync,
    {
        let images = self
            .images
            .par_iter()
            .map(&f)
            .collect::<FloodResult<Vec<Image>>>()?;
        Self::new(images)
    }

    /// Per-pixel, per-band accumulation over all images. `finish` turns
    /// (sum, sum of squares, valid count) into the output pixel.
    fn reduce<F>(&self, what: &str, finish: F) -> FloodResult<Image>
    where
        F: Fn(Pixel, Pixel, Pixel) -> Pixel + Sync + Send,
    {
        let first = self
            .images
            .first()
            .ok_or_else(|| FloodError::EmptyCollection(format!("{} of empty collection", what)))?;
        let dim = first.dim();
        log::debug!("reducing {} images ({})", self.images.len(), what);

        let mut bands = Vec::with_capacity(first.band_count());
        for b in 0..first.band_count() {
            let mut sum = Array2::<Pixel>::zeros(dim);
            let mut sumsq = Array2::<Pixel>::zeros(dim);
            let mut count = Array2::<Pixel>::zeros(dim);
            for img in &self.images {
                Zip::from(&mut sum)
                    .and(&mut sumsq)
                    .and(&mut count)
                    .and(&img.bands[b].data)
                    .par_for_each(|s, sq, c, &v| {
                        if !v.is_nan() {
                            *s += v;
                            *sq += v * v;
                            *c += 1.0;
                        }
                    });
            }
            let data = Zip::from(&sum)
                .and(&sumsq)
                .and(&count)
                .par_map_collect(|&s, &sq, &c| finish(s, sq, c));
            bands.push(Band {
                name: first.bands[b].name.clone(),
                data,
            });
        }
        Ok(Image::from_bands(bands))
    }

    /// Per-pixel arithmetic mean over valid inputs; band names preserved
    pub fn mean(&self) -> FloodResult<Image> {
        self.reduce("mean", |s, _sq, c| if c > 0.0 { s / c } else { Pixel::NAN })
    }

    /// Per-pixel sum over valid inputs; band names preserved
    pub fn sum(&self) -> FloodResult<Image> {
        self.reduce("sum", |s, _sq, c| if c > 0.0 { s } else { Pixel::NAN })
    }

    /// Per-pixel population standard deviation over valid inputs.
    ///
    /// The reducer loses the input band names: output bands are suffixed
    /// `_stdDev` and must be renamed back by the caller if the acquisition
    /// schema is needed downstream.
    pub fn reduce_std_dev(&self) -> FloodResult<Image> {
        let reduced = self.reduce("stdDev", |s, sq, c| {
            if c > 0.0 {
                let mean = s / c;
                let var = (sq / c - mean * mean).max(0.0);
                var.sqrt()
            } else {
                Pixel::NAN
            }
        })?;
        let names: Vec<String> = reduced
            .band_names()
            .iter()
            .map(|n| format!("{}_stdDev", n))
            .collect();
        let names_ref: Vec<&str> = names.iter().map(String::as_str).collect();
        reduced.rename(&names_ref)
    }
}
