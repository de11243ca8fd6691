//! Camera control abstraction.
//!
//! The capture session drives any backend through [`CameraControl`]; the
//! in-tree [`MockCamera`] stands in for real hardware in tests and the
//! synthetic tools.

mod mock;

pub use mock::MockCamera;

use std::sync::Arc;

use thiserror::Error;

use crate::models::FrameBufferView;

/// Closed camera error taxonomy.
///
/// Backend-specific status codes are translated into these variants at
/// the boundary, once, so the rest of the crate never sees raw codes.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum CameraError {
    /// No camera unit is present or it vanished mid-session.
    #[error("camera unavailable")]
    Unavailable,
    /// A parameter was rejected by the backend.
    #[error("invalid parameter")]
    InvalidParameter,
    /// The application lacks camera access permission.
    #[error("camera permission denied")]
    PermissionDenied,
    /// The camera is temporarily busy with another request.
    #[error("camera busy")]
    Busy,
    /// The backend ran out of memory or handles.
    #[error("camera resource exhausted")]
    ResourceExhausted,
    /// The requested mode is not supported by this unit.
    #[error("operation not supported")]
    Unsupported,
    /// The operation was already performed; safe to treat as done.
    #[error("operation already completed")]
    AlreadyDone,
    /// Registering the frame callback failed.
    #[error("callback registration failed")]
    RegistrationFailed,
    /// Another process holds the camera exclusively.
    #[error("camera in use by another client")]
    DeviceInUse,
}

/// Frame delivery callback, invoked by the backend for every preview
/// frame while the viewfinder runs. The view borrows backend-owned
/// memory and is only valid for the duration of the call.
pub type FrameCallback = Arc<dyn Fn(&FrameBufferView<'_>) + Send + Sync + 'static>;

/// Minimal control surface of a camera backend.
///
/// The call order is open, start_viewfinder, stop_viewfinder, close.
/// `close` consumes the handle, so a closed camera cannot be touched
/// again through it.
pub trait CameraControl {
    /// Backend handle to an opened unit.
    type Handle: Send;

    /// Acquire the camera unit.
    fn open(&self) -> Result<Self::Handle, CameraError>;

    /// Start preview frame delivery to `on_frame`.
    fn start_viewfinder(
        &self,
        handle: &Self::Handle,
        on_frame: FrameCallback,
    ) -> Result<(), CameraError>;

    /// Stop preview frame delivery.
    fn stop_viewfinder(&self, handle: &Self::Handle) -> Result<(), CameraError>;

    /// Release the camera unit.
    fn close(&self, handle: Self::Handle) -> Result<(), CameraError>;
}
