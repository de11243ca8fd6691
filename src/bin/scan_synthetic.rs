//! Run the full capture pipeline over synthetic frames.
//!
//! Drives a mock camera through a complete session: a flat frame is
//! discarded, then a rendered QR frame stops the session with a decode.

use std::sync::{Arc, Mutex};

use viewscan::decoder::qr::EcLevel;
use viewscan::models::FrameBufferView;
use viewscan::tools::{flat_frame, qr_frame};
use viewscan::{CaptureSession, MockCamera, ResultSink, ScanConfig, SessionState, Symbology};

struct PrintSink {
    result: Mutex<Option<(Vec<u8>, Symbology)>>,
}

impl ResultSink for PrintSink {
    fn on_decoded(&self, bytes: &[u8], symbology: Symbology) {
        if let Ok(mut slot) = self.result.lock() {
            *slot = Some((bytes.to_vec(), symbology));
        }
    }
}

fn main() {
    env_logger::init();

    let camera = MockCamera::new();
    let sink = Arc::new(PrintSink { result: Mutex::new(None) });
    let session = CaptureSession::new(camera.clone(), Arc::clone(&sink), ScanConfig::default());

    if let Err(err) = session.start() {
        eprintln!("session start failed: {err}");
        std::process::exit(1);
    }

    let blank = flat_frame(700, 700, 128);
    camera.push_frame(&FrameBufferView::gray(blank.samples(), 700, 700));
    println!("blank frame pushed, state: {:?}", session.state());

    let symbol = match qr_frame(b"HELLO-WORLD", EcLevel::M, 4, 20, 700, 700) {
        Ok(grid) => grid,
        Err(err) => {
            eprintln!("synthesis failed: {err}");
            std::process::exit(1);
        }
    };
    camera.push_frame(&FrameBufferView::gray(symbol.samples(), 700, 700));

    assert_eq!(session.state(), SessionState::Stopped);
    match sink.result.lock().ok().and_then(|slot| slot.clone()) {
        Some((bytes, symbology)) => {
            println!("decoded {:?}: {}", symbology, String::from_utf8_lossy(&bytes));
        }
        None => {
            eprintln!("no decode delivered");
            std::process::exit(1);
        }
    }
}
