//! Capture session lifecycle.
//!
//! A [`CaptureSession`] owns one camera acquisition from open to close.
//! Lifecycle transitions go through a single atomic state word with
//! compare-and-swap, so concurrent stop requests, frame callbacks, and
//! the starting thread agree on exactly one winner for every transition.
//! Resource release is additionally guarded per step, which makes
//! teardown idempotent even if a backend reports spurious success.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use log::{debug, trace, warn};
use thiserror::Error;

use crate::camera::{CameraControl, CameraError, FrameCallback};
use crate::config::ScanConfig;
use crate::decoder::Symbology;
use crate::models::FrameBufferView;
use crate::pipeline::{process_frame, FrameOutcome};

/// Where a session's lifecycle currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SessionState {
    /// Created, not yet started.
    Idle = 0,
    /// `start` is acquiring the camera.
    CameraOpening = 1,
    /// Viewfinder runs, scanning not yet enabled.
    ViewfinderActive = 2,
    /// Frames are being decoded.
    Scanning = 3,
    /// A stop winner is releasing resources.
    Stopping = 4,
    /// All resources released; terminal.
    Stopped = 5,
}

impl SessionState {
    fn from_u8(v: u8) -> SessionState {
        match v {
            0 => SessionState::Idle,
            1 => SessionState::CameraOpening,
            2 => SessionState::ViewfinderActive,
            3 => SessionState::Scanning,
            4 => SessionState::Stopping,
            _ => SessionState::Stopped,
        }
    }
}

/// Consumer of decoded payloads.
///
/// Called at most once per session, after the viewfinder is stopped and
/// the camera closed.
pub trait ResultSink: Send + Sync {
    /// Receive the winning decode of the session.
    fn on_decoded(&self, bytes: &[u8], symbology: Symbology);
}

impl<T: ResultSink + ?Sized> ResultSink for Arc<T> {
    fn on_decoded(&self, bytes: &[u8], symbology: Symbology) {
        (**self).on_decoded(bytes, symbology);
    }
}

/// Errors surfaced by session control calls.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The camera backend refused an operation.
    #[error("camera: {0}")]
    Camera(#[from] CameraError),
    /// `start` was called on a session that already left `Idle`.
    #[error("session already started")]
    AlreadyStarted,
    /// The session was stopped while the operation was in flight.
    #[error("session stopped")]
    Stopped,
}

/// One camera acquisition with at-most-once decode delivery.
pub struct CaptureSession<C: CameraControl, S: ResultSink> {
    camera: C,
    sink: S,
    config: ScanConfig,
    state: AtomicU8,
    handle: Mutex<Option<C::Handle>>,
    viewfinder_released: AtomicBool,
    camera_closed: AtomicBool,
}

fn lock_ignore_poison<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl<C, S> CaptureSession<C, S>
where
    C: CameraControl + Send + Sync + 'static,
    C::Handle: Send,
    S: ResultSink + 'static,
{
    /// Build a session over `camera`, delivering results to `sink`.
    pub fn new(camera: C, sink: S, config: ScanConfig) -> Arc<Self> {
        Arc::new(Self {
            camera,
            sink,
            config,
            state: AtomicU8::new(SessionState::Idle as u8),
            handle: Mutex::new(None),
            viewfinder_released: AtomicBool::new(false),
            camera_closed: AtomicBool::new(false),
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        SessionState::from_u8(self.state.load(Ordering::Acquire))
    }

    fn transition(&self, from: SessionState, to: SessionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Open the camera, start the viewfinder and enable scanning.
    ///
    /// Only the first call on an `Idle` session proceeds; later calls
    /// fail with [`SessionError::AlreadyStarted`]. On any backend
    /// failure the session lands in `Stopped` with everything it did
    /// acquire released again.
    pub fn start(self: &Arc<Self>) -> Result<(), SessionError> {
        if !self.transition(SessionState::Idle, SessionState::CameraOpening) {
            return Err(SessionError::AlreadyStarted);
        }

        // The handle slot stays locked until the viewfinder is running,
        // so a concurrent stop waits in teardown rather than observing a
        // half-acquired camera.
        let mut guard = lock_ignore_poison(&self.handle);

        let handle = match self.camera.open() {
            Ok(h) => h,
            Err(err) => {
                self.state.store(SessionState::Stopped as u8, Ordering::Release);
                return Err(err.into());
            }
        };

        let weak: Weak<Self> = Arc::downgrade(self);
        let callback: FrameCallback = Arc::new(move |frame: &FrameBufferView<'_>| {
            if let Some(session) = weak.upgrade() {
                session.on_frame(frame);
            }
        });

        if let Err(err) = self.camera.start_viewfinder(&handle, callback) {
            if let Err(close_err) = self.camera.close(handle) {
                if close_err != CameraError::AlreadyDone {
                    warn!("close after failed start: {close_err}");
                }
            }
            self.camera_closed.store(true, Ordering::Release);
            self.state.store(SessionState::Stopped as u8, Ordering::Release);
            return Err(err.into());
        }

        *guard = Some(handle);
        drop(guard);

        if !self.transition(SessionState::CameraOpening, SessionState::ViewfinderActive) {
            // A stop raced us; its teardown owns cleanup from here.
            return Err(SessionError::Stopped);
        }
        debug!("viewfinder active");

        if !self.transition(SessionState::ViewfinderActive, SessionState::Scanning) {
            return Err(SessionError::Stopped);
        }
        trace!("scanning enabled");
        Ok(())
    }

    /// Request that the session stop.
    ///
    /// Safe to call from any thread any number of times; exactly one
    /// caller performs the release work, everyone else returns once the
    /// state is already on its way down.
    pub fn request_stop(&self) {
        loop {
            let current = self.state();
            match current {
                SessionState::Idle => {
                    if self.transition(SessionState::Idle, SessionState::Stopped) {
                        return;
                    }
                }
                SessionState::CameraOpening
                | SessionState::ViewfinderActive
                | SessionState::Scanning => {
                    if self.transition(current, SessionState::Stopping) {
                        self.teardown();
                        return;
                    }
                }
                SessionState::Stopping | SessionState::Stopped => return,
            }
        }
    }

    /// Release the viewfinder and the camera, each exactly once, then
    /// land in `Stopped`. Only the thread that won a transition into
    /// `Stopping` may call this.
    fn teardown(&self) {
        let mut guard = lock_ignore_poison(&self.handle);
        if let Some(handle) = guard.take() {
            if !self.viewfinder_released.swap(true, Ordering::AcqRel) {
                match self.camera.stop_viewfinder(&handle) {
                    Ok(()) | Err(CameraError::AlreadyDone) => {}
                    Err(err) => warn!("stop viewfinder: {err}"),
                }
            }
            if !self.camera_closed.swap(true, Ordering::AcqRel) {
                match self.camera.close(handle) {
                    Ok(()) | Err(CameraError::AlreadyDone) => {}
                    Err(err) => warn!("close camera: {err}"),
                }
            }
        }
        drop(guard);
        self.state.store(SessionState::Stopped as u8, Ordering::Release);
        debug!("session stopped");
    }

    /// Frame callback body. Frames arriving outside `Scanning` are
    /// discarded; the first decoded frame wins the stop transition,
    /// tears the session down and only then reaches the sink.
    fn on_frame(self: &Arc<Self>, frame: &FrameBufferView<'_>) {
        if self.state() != SessionState::Scanning {
            trace!("frame discarded outside scanning");
            return;
        }
        match process_frame(frame, &self.config) {
            FrameOutcome::Decoded { bytes, symbology } => {
                if self.transition(SessionState::Scanning, SessionState::Stopping) {
                    self.teardown();
                    self.sink.on_decoded(&bytes, symbology);
                } else {
                    trace!("decode lost the stop race");
                }
            }
            FrameOutcome::NotFound => {}
            FrameOutcome::Skipped(reason) => {
                debug!("frame skipped: {reason:?}");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::MockCamera;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingSink {
        hits: StdMutex<Vec<(Vec<u8>, Symbology)>>,
    }

    impl ResultSink for RecordingSink {
        fn on_decoded(&self, bytes: &[u8], symbology: Symbology) {
            lock_ignore_poison(&self.hits).push((bytes.to_vec(), symbology));
        }
    }

    fn session_with(
        camera: MockCamera,
    ) -> Arc<CaptureSession<MockCamera, Arc<RecordingSink>>> {
        CaptureSession::new(camera, Arc::new(RecordingSink::default()), ScanConfig::default())
    }

    #[test]
    fn start_then_stop_releases_everything_once() {
        let camera = MockCamera::new();
        let session = session_with(camera.clone());

        session.start().unwrap();
        assert_eq!(session.state(), SessionState::Scanning);
        assert!(camera.is_streaming());

        session.request_stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert!(!camera.is_streaming());
        assert!(!camera.is_open());
        assert_eq!(camera.stop_calls(), 1);
        assert_eq!(camera.close_calls(), 1);

        session.request_stop();
        assert_eq!(camera.stop_calls(), 1);
        assert_eq!(camera.close_calls(), 1);
    }

    #[test]
    fn second_start_is_rejected() {
        let session = session_with(MockCamera::new());
        session.start().unwrap();
        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
        session.request_stop();
        assert_eq!(session.start(), Err(SessionError::AlreadyStarted));
    }

    #[test]
    fn failed_open_lands_in_stopped_without_teardown_calls() {
        let camera = MockCamera::failing_open(CameraError::Busy);
        let session = session_with(camera.clone());

        assert_eq!(session.start(), Err(SessionError::Camera(CameraError::Busy)));
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(camera.stop_calls(), 0);
        assert_eq!(camera.close_calls(), 0);
    }

    #[test]
    fn failed_start_viewfinder_closes_the_camera() {
        let camera = MockCamera::failing_start(CameraError::RegistrationFailed);
        let session = session_with(camera.clone());

        assert_eq!(
            session.start(),
            Err(SessionError::Camera(CameraError::RegistrationFailed))
        );
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(camera.close_calls(), 1);
        assert!(!camera.is_open());
    }

    #[test]
    fn stop_on_idle_session_skips_the_camera() {
        let camera = MockCamera::new();
        let session = session_with(camera.clone());
        session.request_stop();
        assert_eq!(session.state(), SessionState::Stopped);
        assert_eq!(camera.open_calls(), 0);
        assert_eq!(camera.close_calls(), 0);
    }
}
