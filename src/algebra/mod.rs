//! In-memory image algebra
//!
//! Multi-band masked rasters and time-stamped collections with the
//! map-algebra primitives the flood-mapping formulas are written against:
//! filtering, per-pixel arithmetic and comparison, conditional overwrite,
//! band selection/rename and collection-wide reduction.

pub mod collection;
pub mod image;

// Re-export main types
pub use collection::ImageCollection;
pub use image::Image;
