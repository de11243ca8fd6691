//! Frame preprocessing: luminance extraction and adaptive binarization.

pub mod binarization;
pub mod luminance;

pub use binarization::{binarize, BinarizeError, BinarizeOptions};
pub use luminance::{luminance_grid, GeometryError};
