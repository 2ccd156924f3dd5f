use crate::types::{Acquisition, FloodError, FloodResult, Pixel};
use chrono::{DateTime, Utc};
use ndarray::{Array2, Zip};

/// A single named raster band
///
/// Masked (no-value) pixels are stored as NaN; arithmetic propagates them
/// and comparisons keep them masked rather than coercing to 0.
#[derive(Debug, Clone)]
pub(crate) struct Band {
    pub(crate) name: String,
    pub(crate) data: Array2<Pixel>,
}

/// Multi-band raster image with acquisition metadata
///
/// All bands share one shape. Boolean masks produced by the comparison
/// operations are 0/1 single-band images.
#[derive(Debug, Clone)]
pub struct Image {
    pub(crate) bands: Vec<Band>,
    pub(crate) acquisition: Acquisition,
}

impl Image {
    /// Create an image from named bands. All bands must share one shape.
    pub fn new<S: Into<String>>(bands: Vec<(S, Array2<Pixel>)>) -> FloodResult<Self> {
        let mut out = Vec::with_capacity(bands.len());
        let mut dim: Option<(usize, usize)> = None;
        for (name, data) in bands {
            match dim {
                None => dim = Some(data.dim()),
                Some(expected) if expected != data.dim() => {
                    return Err(FloodError::ShapeMismatch {
                        expected,
                        actual: data.dim(),
                    });
                }
                _ => {}
            }
            out.push(Band {
                name: name.into(),
                data,
            });
        }
        if out.is_empty() {
            return Err(FloodError::Processing(
                "image must have at least one band".to_string(),
            ));
        }
        Ok(Self {
            bands: out,
            acquisition: Acquisition::default(),
        })
    }

    pub(crate) fn from_bands(bands: Vec<Band>) -> Self {
        Self {
            bands,
            acquisition: Acquisition::default(),
        }
    }

    /// Create a single-band image
    pub fn single<S: Into<String>>(name: S, data: Array2<Pixel>) -> Self {
        Self {
            bands: vec![Band {
                name: name.into(),
                data,
            }],
            acquisition: Acquisition::default(),
        }
    }

    pub fn with_acquisition(mut self, acquisition: Acquisition) -> Self {
        self.acquisition = acquisition;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.acquisition.timestamp = Some(timestamp);
        self
    }

    pub fn acquisition(&self) -> &Acquisition {
        &self.acquisition
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.acquisition.timestamp
    }

    /// (rows, cols) of every band
    pub fn dim(&self) -> (usize, usize) {
        self.bands[0].data.dim()
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn band_names(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.name.as_str()).collect()
    }

    /// Pixel data of a named band
    pub fn band(&self, name: &str) -> FloodResult<&Array2<Pixel>> {
        self.bands
            .iter()
            .find(|b| b.name == name)
            .map(|b| &b.data)
            .ok_or_else(|| FloodError::UnknownBand(name.to_string()))
    }

    /// Single-band image holding the named band, metadata preserved
    pub fn select(&self, name: &str) -> FloodResult<Self> {
        let band = self
            .bands
            .iter()
            .find(|b| b.name == name)
            .ok_or_else(|| FloodError::UnknownBand(name.to_string()))?;
        Ok(Self {
            bands: vec![band.clone()],
            acquisition: self.acquisition,
        })
    }

    /// Relabel all bands. The reducers suffix band names, so callers that
    /// need the acquisition schema back must rename explicitly.
    pub fn rename(&self, names: &[&str]) -> FloodResult<Self> {
        if names.len() != self.bands.len() {
            return Err(FloodError::BandMismatch {
                expected: self.bands.len(),
                actual: names.len(),
            });
        }
        let bands = self
            .bands
            .iter()
            .zip(names)
            .map(|(b, &name)| Band {
                name: name.to_string(),
                data: b.data.clone(),
            })
            .collect();
        Ok(Self {
            bands,
            acquisition: self.acquisition,
        })
    }

    fn check_dim(&self, other: &Self) -> FloodResult<()> {
        if self.dim() != other.dim() {
            return Err(FloodError::ShapeMismatch {
                expected: self.dim(),
                actual: other.dim(),
            });
        }
        Ok(())
    }

    /// Per-pixel binary operation. Bands are paired positionally and the
    /// output keeps the left-hand names; arithmetic metadata is dropped,
    /// so timestamps must be re-attached by the caller.
    fn zip_with<F>(&self, other: &Self, f: F) -> FloodResult<Self>
    where
        F: Fn(Pixel, Pixel) -> Pixel,
    {
        self.check_dim(other)?;
        if self.bands.len() != other.bands.len() {
            return Err(FloodError::BandMismatch {
                expected: self.bands.len(),
                actual: other.bands.len(),
            });
        }
        let bands = self
            .bands
            .iter()
            .zip(&other.bands)
            .map(|(a, b)| Band {
                name: a.name.clone(),
                data: Zip::from(&a.data).and(&b.data).map_collect(|&x, &y| f(x, y)),
            })
            .collect();
        Ok(Self {
            bands,
            acquisition: Acquisition::default(),
        })
    }

    fn map_pixels<F>(&self, f: F) -> Self
    where
        F: Fn(Pixel) -> Pixel,
    {
        let bands = self
            .bands
            .iter()
            .map(|b| Band {
                name: b.name.clone(),
                data: b.data.mapv(&f),
            })
            .collect();
        Self {
            bands,
            acquisition: Acquisition::default(),
        }
    }

    pub fn add(&self, other: &Self) -> FloodResult<Self> {
        self.zip_with(other, |a, b| a + b)
    }

    pub fn subtract(&self, other: &Self) -> FloodResult<Self> {
        self.zip_with(other, |a, b| a - b)
    }

    pub fn multiply(&self, other: &Self) -> FloodResult<Self> {
        self.zip_with(other, |a, b| a * b)
    }

    /// Pixelwise division; 0/0 follows IEEE and yields a masked pixel.
    pub fn divide(&self, other: &Self) -> FloodResult<Self> {
        self.zip_with(other, |a, b| a / b)
    }

    pub fn multiply_scalar(&self, value: Pixel) -> Self {
        self.map_pixels(|v| v * value)
    }

    fn cmp_scalar<F>(&self, threshold: Pixel, pred: F) -> Self
    where
        F: Fn(Pixel, Pixel) -> bool,
    {
        self.map_pixels(|v| {
            if v.is_nan() {
                Pixel::NAN
            } else if pred(v, threshold) {
                1.0
            } else {
                0.0
            }
        })
    }

    /// 0/1 mask of pixels `> threshold`; masked pixels stay masked
    pub fn gt_scalar(&self, threshold: Pixel) -> Self {
        self.cmp_scalar(threshold, |v, t| v > t)
    }

    /// 0/1 mask of pixels `>= threshold`; masked pixels stay masked
    pub fn gte_scalar(&self, threshold: Pixel) -> Self {
        self.cmp_scalar(threshold, |v, t| v >= t)
    }

    /// 0/1 mask of pixels `<= threshold`; masked pixels stay masked
    pub fn lte_scalar(&self, threshold: Pixel) -> Self {
        self.cmp_scalar(threshold, |v, t| v <= t)
    }

    /// 0/1 mask of pixels `== value`; masked pixels stay masked
    pub fn eq_scalar(&self, value: Pixel) -> Self {
        self.cmp_scalar(value, |v, t| v == t)
    }

    /// Conditional overwrite: wherever `test` is valid and non-zero,
    /// replace the pixel with `value`. Masked pixels of `self` stay
    /// masked and masked test pixels leave the input untouched.
    ///
    /// A single-band test applies to every band.
    pub fn where_nonzero(&self, test: &Self, value: Pixel) -> FloodResult<Self> {
        self.check_dim(test)?;
        if test.bands.len() != 1 && test.bands.len() != self.bands.len() {
            return Err(FloodError::BandMismatch {
                expected: self.bands.len(),
                actual: test.bands.len(),
            });
        }
        let bands = self
            .bands
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let t = &test.bands[if test.bands.len() == 1 { 0 } else { i }].data;
                Band {
                    name: b.name.clone(),
                    data: Zip::from(&b.data).and(t).map_collect(|&v, &t| {
                        if v.is_nan() {
                            v
                        } else if !t.is_nan() && t != 0.0 {
                            value
                        } else {
                            v
                        }
                    }),
                }
            })
            .collect();
        Ok(Self {
            bands,
            acquisition: self.acquisition,
        })
    }

    /// Mask out pixels wherever `mask` is zero or itself masked.
    ///
    /// A single-band mask applies to every band.
    pub fn update_mask(&self, mask: &Self) -> FloodResult<Self> {
        self.check_dim(mask)?;
        if mask.bands.len() != 1 && mask.bands.len() != self.bands.len() {
            return Err(FloodError::BandMismatch {
                expected: self.bands.len(),
                actual: mask.bands.len(),
            });
        }
        let bands = self
            .bands
            .iter()
            .enumerate()
            .map(|(i, b)| {
                let m = &mask.bands[if mask.bands.len() == 1 { 0 } else { i }].data;
                Band {
                    name: b.name.clone(),
                    data: Zip::from(&b.data).and(m).map_collect(|&v, &m| {
                        if m.is_nan() || m == 0.0 {
                            Pixel::NAN
                        } else {
                            v
                        }
                    }),
                }
            })
            .collect();
        Ok(Self {
            bands,
            acquisition: self.acquisition,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_band() -> Image {
        Image::new(vec![
            ("VV", array![[1.0, 2.0], [Pixel::NAN, 4.0]]),
            ("VH", array![[10.0, 20.0], [30.0, 40.0]]),
        ])
        .unwrap()
    }

    #[test]
    fn test_select_unknown_band() {
        let img = two_band();
        assert!(matches!(
            img.select("HH"),
            Err(FloodError::UnknownBand(_))
        ));
        assert_eq!(img.select("VH").unwrap().band_names(), vec!["VH"]);
    }

    #[test]
    fn test_arithmetic_propagates_mask() {
        let img = two_band();
        let sum = img.add(&img).unwrap();
        let vv = sum.band("VV").unwrap();
        assert_eq!(vv[[0, 0]], 2.0);
        assert!(vv[[1, 0]].is_nan());
    }

    #[test]
    fn test_comparison_propagates_mask() {
        let img = two_band();
        let mask = img.select("VV").unwrap().lte_scalar(2.0);
        let band = mask.band("VV").unwrap();
        assert_eq!(band[[0, 0]], 1.0);
        assert_eq!(band[[1, 1]], 0.0);
        assert!(band[[1, 0]].is_nan());
    }

    #[test]
    fn test_multiply_intersects_masks() {
        let a = Image::single("m", array![[1.0, 1.0], [0.0, Pixel::NAN]]);
        let b = Image::single("m", array![[1.0, 0.0], [1.0, 1.0]]);
        let both = a.multiply(&b).unwrap();
        let band = both.band("m").unwrap();
        assert_eq!(band[[0, 0]], 1.0);
        assert_eq!(band[[0, 1]], 0.0);
        assert_eq!(band[[1, 0]], 0.0);
        assert!(band[[1, 1]].is_nan());
    }

    #[test]
    fn test_rename_arity() {
        let img = two_band();
        assert!(img.rename(&["a"]).is_err());
        let renamed = img.rename(&["a", "b"]).unwrap();
        assert_eq!(renamed.band_names(), vec!["a", "b"]);
    }

    #[test]
    fn test_where_nonzero_keeps_masked_pixels() {
        let img = Image::single("x", array![[0.0, 1.0], [Pixel::NAN, 3.0]]);
        let test = Image::single("t", array![[1.0, 0.0], [1.0, Pixel::NAN]]);
        let out = img.where_nonzero(&test, 20.0).unwrap();
        let band = out.band("x").unwrap();
        assert_eq!(band[[0, 0]], 20.0);
        assert_eq!(band[[0, 1]], 1.0);
        assert!(band[[1, 0]].is_nan(), "masked input must stay masked");
        assert_eq!(band[[1, 1]], 3.0, "masked test leaves input untouched");
    }

    #[test]
    fn test_update_mask() {
        let img = Image::single("x", array![[5.0, 6.0], [7.0, 8.0]]);
        let mask = Image::single("m", array![[1.0, 0.0], [Pixel::NAN, 2.0]]);
        let out = img.update_mask(&mask).unwrap();
        let band = out.band("x").unwrap();
        assert_eq!(band[[0, 0]], 5.0);
        assert!(band[[0, 1]].is_nan());
        assert!(band[[1, 0]].is_nan());
        assert_eq!(band[[1, 1]], 8.0);
    }

    #[test]
    fn test_shape_mismatch() {
        let a = Image::single("x", Array2::zeros((2, 2)));
        let b = Image::single("x", Array2::zeros((3, 2)));
        assert!(matches!(
            a.add(&b),
            Err(FloodError::ShapeMismatch { .. })
        ));
    }
}
