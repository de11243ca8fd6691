#![warn(missing_docs)]

//! Camera viewfinder capture and barcode decoding.
//!
//! The crate is organized as a pipeline: a camera backend delivers
//! [`models::FrameBufferView`] frames, [`utils`] converts them to
//! luminance and binarizes them, [`decoder`] reads QR, EAN-13, UPC-A
//! and Code 128 symbols out of the bitmap, and [`session`] ties it all
//! to a camera lifecycle with at-most-once result delivery. [`events`]
//! routes host UI events into the session and [`tools`] synthesizes
//! frames for tests and offline runs.

pub mod camera;
pub mod config;
pub mod decoder;
pub mod events;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod tools;
pub mod utils;

pub use camera::{CameraControl, CameraError, MockCamera};
pub use config::ScanConfig;
pub use decoder::{DecodeOptions, Symbology};
pub use models::{CropRect, FrameBufferView, PixelFormat};
pub use pipeline::{process_frame, FrameOutcome};
pub use session::{CaptureSession, ResultSink, SessionError, SessionState};
