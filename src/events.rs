//! Host event dispatch.
//!
//! The host application feeds UI and system events through
//! [`dispatch_event`]; a tap stops the scan, application exit stops the
//! scan and ends the loop. Everything else is ignored so hosts can
//! forward their raw event stream without filtering.

use std::sync::Arc;

use log::{debug, trace};

use crate::camera::CameraControl;
use crate::session::{CaptureSession, ResultSink};

/// Pointer gesture kinds as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gesture {
    /// Press and release in place.
    Tap,
    /// Pointer moved while pressed.
    Move,
    /// Pointer released after a move.
    Release,
    /// Downward swipe.
    SwipeDown,
}

/// Events the session reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// The host created the viewfinder surface; hints may be applied.
    ViewfinderSurfaceReady,
    /// A pointer gesture on the viewfinder.
    Gesture(Gesture),
    /// The application is shutting down.
    AppExit,
    /// Anything the host forwarded that the session has no use for.
    Unknown,
}

/// Presentation hints for the viewfinder surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceHints {
    /// Mirror the preview horizontally.
    pub mirror: bool,
    /// Stacking order relative to the host UI.
    pub z_order: i32,
    /// Whether the surface is shown at all.
    pub visible: bool,
}

impl Default for SurfaceHints {
    fn default() -> Self {
        Self { mirror: true, z_order: 1, visible: true }
    }
}

/// Source of host events, polled by [`run_event_loop`].
pub trait EventSource {
    /// Next event, or `None` when the source is exhausted.
    fn next_event(&mut self) -> Option<Event>;
}

/// Surface the viewfinder renders into.
pub trait DisplaySurface {
    /// Apply presentation hints to the surface.
    fn configure(&mut self, hints: &SurfaceHints);
}

/// Whether the event loop should keep running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlFlow {
    /// Keep polling for events.
    Continue,
    /// Leave the loop.
    Exit,
}

/// React to one host event.
pub fn dispatch_event<C, S>(
    session: &Arc<CaptureSession<C, S>>,
    surface: &mut dyn DisplaySurface,
    event: Event,
) -> ControlFlow
where
    C: CameraControl + Send + Sync + 'static,
    C::Handle: Send,
    S: ResultSink + 'static,
{
    match event {
        Event::ViewfinderSurfaceReady => {
            surface.configure(&SurfaceHints::default());
            ControlFlow::Continue
        }
        Event::Gesture(Gesture::Tap) => {
            debug!("tap: stopping scan");
            session.request_stop();
            ControlFlow::Continue
        }
        Event::Gesture(g) => {
            trace!("gesture ignored: {g:?}");
            ControlFlow::Continue
        }
        Event::AppExit => {
            debug!("app exit: stopping scan");
            session.request_stop();
            ControlFlow::Exit
        }
        Event::Unknown => ControlFlow::Continue,
    }
}

/// Drain `source`, dispatching each event until exit or exhaustion.
pub fn run_event_loop<C, S>(
    session: &Arc<CaptureSession<C, S>>,
    source: &mut dyn EventSource,
    surface: &mut dyn DisplaySurface,
) where
    C: CameraControl + Send + Sync + 'static,
    C::Handle: Send,
    S: ResultSink + 'static,
{
    while let Some(event) = source.next_event() {
        if dispatch_event(session, surface, event) == ControlFlow::Exit {
            break;
        }
    }
}
