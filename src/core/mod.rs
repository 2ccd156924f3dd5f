//! Core flood-mapping algorithms

pub mod classify;
pub mod palette;
pub mod zscore;

// Re-export main types
pub use classify::{FloodMapParams, FloodMapper, FLOOD_CLASS_BAND};
pub use palette::{class_color, FLOOD_PALETTE};
pub use zscore::{anomaly, baseline_mean, baseline_std_dev, zscore, BaselineWindow};
