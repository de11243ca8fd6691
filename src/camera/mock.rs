//! In-memory camera backend for tests and synthetic runs.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{CameraControl, CameraError, FrameCallback};
use crate::models::FrameBufferView;

#[derive(Default)]
struct MockState {
    open_calls: AtomicUsize,
    start_calls: AtomicUsize,
    stop_calls: AtomicUsize,
    close_calls: AtomicUsize,
    opened: AtomicBool,
    streaming: AtomicBool,
    callback: Mutex<Option<FrameCallback>>,
    fail_open: Mutex<Option<CameraError>>,
    fail_start: Mutex<Option<CameraError>>,
}

/// Scriptable camera backend.
///
/// Clones share one underlying unit, so a test can keep a handle on the
/// mock after moving a clone into the session. Frames are delivered
/// synchronously from [`MockCamera::push_frame`] on the caller's thread.
#[derive(Clone, Default)]
pub struct MockCamera {
    state: Arc<MockState>,
}

/// Opaque handle handed out by [`MockCamera::open`].
#[derive(Debug)]
pub struct MockHandle(());

impl MockCamera {
    /// A mock that accepts every call.
    pub fn new() -> Self {
        Self::default()
    }

    /// A mock whose `open` fails with the given error.
    pub fn failing_open(err: CameraError) -> Self {
        let mock = Self::new();
        *lock_ignore_poison(&mock.state.fail_open) = Some(err);
        mock
    }

    /// A mock whose `start_viewfinder` fails with the given error.
    pub fn failing_start(err: CameraError) -> Self {
        let mock = Self::new();
        *lock_ignore_poison(&mock.state.fail_start) = Some(err);
        mock
    }

    /// Deliver one frame to the registered callback, if streaming.
    /// Returns whether a callback ran.
    pub fn push_frame(&self, frame: &FrameBufferView<'_>) -> bool {
        if !self.state.streaming.load(Ordering::Acquire) {
            return false;
        }
        let cb = lock_ignore_poison(&self.state.callback).clone();
        match cb {
            Some(cb) => {
                cb(frame);
                true
            }
            None => false,
        }
    }

    /// Number of `open` calls so far.
    pub fn open_calls(&self) -> usize {
        self.state.open_calls.load(Ordering::Relaxed)
    }

    /// Number of `start_viewfinder` calls so far.
    pub fn start_calls(&self) -> usize {
        self.state.start_calls.load(Ordering::Relaxed)
    }

    /// Number of `stop_viewfinder` calls so far.
    pub fn stop_calls(&self) -> usize {
        self.state.stop_calls.load(Ordering::Relaxed)
    }

    /// Number of `close` calls so far.
    pub fn close_calls(&self) -> usize {
        self.state.close_calls.load(Ordering::Relaxed)
    }

    /// Whether the unit is currently open.
    pub fn is_open(&self) -> bool {
        self.state.opened.load(Ordering::Acquire)
    }

    /// Whether frames are currently being delivered.
    pub fn is_streaming(&self) -> bool {
        self.state.streaming.load(Ordering::Acquire)
    }
}

fn lock_ignore_poison<'a, T>(m: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
    match m.lock() {
        Ok(g) => g,
        Err(poisoned) => poisoned.into_inner(),
    }
}

impl CameraControl for MockCamera {
    type Handle = MockHandle;

    fn open(&self) -> Result<MockHandle, CameraError> {
        self.state.open_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = *lock_ignore_poison(&self.state.fail_open) {
            return Err(err);
        }
        if self.state.opened.swap(true, Ordering::AcqRel) {
            return Err(CameraError::DeviceInUse);
        }
        Ok(MockHandle(()))
    }

    fn start_viewfinder(
        &self,
        _handle: &MockHandle,
        on_frame: FrameCallback,
    ) -> Result<(), CameraError> {
        self.state.start_calls.fetch_add(1, Ordering::Relaxed);
        if let Some(err) = *lock_ignore_poison(&self.state.fail_start) {
            return Err(err);
        }
        if self.state.streaming.swap(true, Ordering::AcqRel) {
            return Err(CameraError::AlreadyDone);
        }
        *lock_ignore_poison(&self.state.callback) = Some(on_frame);
        Ok(())
    }

    fn stop_viewfinder(&self, _handle: &MockHandle) -> Result<(), CameraError> {
        self.state.stop_calls.fetch_add(1, Ordering::Relaxed);
        if !self.state.streaming.swap(false, Ordering::AcqRel) {
            return Err(CameraError::AlreadyDone);
        }
        *lock_ignore_poison(&self.state.callback) = None;
        Ok(())
    }

    fn close(&self, _handle: MockHandle) -> Result<(), CameraError> {
        self.state.close_calls.fetch_add(1, Ordering::Relaxed);
        if !self.state.opened.swap(false, Ordering::AcqRel) {
            return Err(CameraError::AlreadyDone);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn lifecycle_counters() {
        let cam = MockCamera::new();
        let handle = cam.open().unwrap();
        assert!(cam.is_open());

        let hits = Arc::new(AtomicUsize::new(0));
        let hits_cb = Arc::clone(&hits);
        let cb: FrameCallback = Arc::new(move |_| {
            hits_cb.fetch_add(1, Ordering::Relaxed);
        });
        cam.start_viewfinder(&handle, cb).unwrap();

        let data = vec![0u8; 16];
        let frame = FrameBufferView::gray(&data, 4, 4);
        assert!(cam.push_frame(&frame));
        assert_eq!(hits.load(Ordering::Relaxed), 1);

        cam.stop_viewfinder(&handle).unwrap();
        assert!(!cam.push_frame(&frame));
        assert_eq!(cam.stop_viewfinder(&handle), Err(CameraError::AlreadyDone));

        cam.close(handle).unwrap();
        assert!(!cam.is_open());
        assert_eq!(cam.open_calls(), 1);
        assert_eq!(cam.close_calls(), 1);
    }

    #[test]
    fn scripted_open_failure() {
        let cam = MockCamera::failing_open(CameraError::Busy);
        assert_eq!(cam.open().err(), Some(CameraError::Busy));
        assert!(!cam.is_open());
    }

    #[test]
    fn double_open_is_device_in_use() {
        let cam = MockCamera::new();
        let _h = cam.open().unwrap();
        assert_eq!(cam.open().err(), Some(CameraError::DeviceInUse));
    }
}
