//! s1flood: Sentinel-1 Z-score flood mapping
//!
//! This library classifies flood water in Sentinel-1 backscatter time series
//! by scoring each acquisition against a per-pixel baseline distribution
//! (Z-score) and combining the anomaly flags with historical water
//! occurrence, so that flood water is separated from permanent and seasonal
//! water.
//!
//! The formulas are written against a small in-memory image algebra
//! ([`algebra`]); the historical-water datasets are injected behind the
//! [`sources`] traits.

pub mod algebra;
pub mod core;
pub mod sources;
pub mod types;

// Re-export main types and functions for easier access
pub use types::{
    Acquisition, AcquisitionMode, FloodClass, FloodError, FloodResult, OrbitDirection, Pixel,
    BAND_ANGLE, BAND_VH, BAND_VV, S1_BANDS,
};

pub use algebra::{Image, ImageCollection};

pub use crate::core::{
    anomaly, baseline_mean, baseline_std_dev, class_color, zscore, BaselineWindow, FloodMapParams,
    FloodMapper, FLOOD_CLASS_BAND, FLOOD_PALETTE,
};

pub use sources::{HistoricalInundation, SurfaceWaterHistory};
