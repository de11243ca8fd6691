//! Data types shared across the pipeline: frame views, luminance grids
//! and binary bitmaps.

pub mod frame;
pub mod luma;
pub mod matrix;

pub use frame::{CropRect, FrameBufferView, PixelFormat};
pub use luma::LuminanceGrid;
pub use matrix::BinaryBitmap;
