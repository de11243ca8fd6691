//! Full pipeline runs over synthetic camera frames.

use std::sync::{Arc, Mutex};

use viewscan::decoder::qr::EcLevel;
use viewscan::decoder::{ean13_check_digit, CodeSet};
use viewscan::models::FrameBufferView;
use viewscan::tools::{code128_frame, ean13_frame, flat_frame, qr_frame};
use viewscan::{
    process_frame, CaptureSession, FrameOutcome, MockCamera, ResultSink, ScanConfig,
    SessionState, Symbology,
};

#[derive(Default)]
struct RecordingSink {
    hits: Mutex<Vec<(Vec<u8>, Symbology)>>,
}

impl RecordingSink {
    fn decoded(&self) -> Vec<(Vec<u8>, Symbology)> {
        self.hits.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

impl ResultSink for RecordingSink {
    fn on_decoded(&self, bytes: &[u8], symbology: Symbology) {
        if let Ok(mut g) = self.hits.lock() {
            g.push((bytes.to_vec(), symbology));
        }
    }
}

#[test]
fn qr_frame_ends_the_session_with_a_decode() {
    let camera = MockCamera::new();
    let sink = Arc::new(RecordingSink::default());
    let session =
        CaptureSession::new(camera.clone(), Arc::clone(&sink), ScanConfig::default());
    session.start().unwrap();

    let grid = qr_frame(b"HELLO-WORLD", EcLevel::M, 4, 20, 700, 700).unwrap();
    let delivered = camera.push_frame(&FrameBufferView::gray(grid.samples(), 700, 700));
    assert!(delivered);

    assert_eq!(session.state(), SessionState::Stopped);
    assert_eq!(
        sink.decoded(),
        vec![(b"HELLO-WORLD".to_vec(), Symbology::Qr)]
    );
    assert_eq!(camera.stop_calls(), 1);
    assert_eq!(camera.close_calls(), 1);
}

#[test]
fn low_contrast_frames_keep_the_session_scanning() {
    let camera = MockCamera::new();
    let sink = Arc::new(RecordingSink::default());
    let session =
        CaptureSession::new(camera.clone(), Arc::clone(&sink), ScanConfig::default());
    session.start().unwrap();

    let gray = flat_frame(700, 700, 128);
    for _ in 0..5 {
        camera.push_frame(&FrameBufferView::gray(gray.samples(), 700, 700));
    }

    assert_eq!(session.state(), SessionState::Scanning);
    assert!(sink.decoded().is_empty());
    session.request_stop();
}

#[test]
fn ean13_decodes_through_the_pipeline() {
    let mut digits = [4u8, 0, 0, 6, 3, 8, 1, 3, 3, 3, 9, 3, 0];
    digits[12] = ean13_check_digit(&digits[..12]);

    let grid = ean13_frame(&digits, 4, 640, 480);
    let frame = FrameBufferView::gray(grid.samples(), 640, 480);
    assert_eq!(
        process_frame(&frame, &ScanConfig::default()),
        FrameOutcome::Decoded { bytes: b"4006381333931".to_vec(), symbology: Symbology::Ean13 }
    );
}

#[test]
fn upca_classification_through_the_pipeline() {
    let mut digits = [0u8, 0, 3, 6, 0, 0, 0, 2, 9, 1, 4, 5, 0];
    digits[12] = ean13_check_digit(&digits[..12]);

    let grid = ean13_frame(&digits, 4, 640, 480);
    let frame = FrameBufferView::gray(grid.samples(), 640, 480);
    assert_eq!(
        process_frame(&frame, &ScanConfig::default()),
        FrameOutcome::Decoded { bytes: b"036000291452".to_vec(), symbology: Symbology::UpcA }
    );
}

#[test]
fn code128_decodes_through_the_pipeline() {
    let grid = code128_frame("WS-7", CodeSet::B, 4, 640, 480).unwrap();
    let frame = FrameBufferView::gray(grid.samples(), 640, 480);
    assert_eq!(
        process_frame(&frame, &ScanConfig::default()),
        FrameOutcome::Decoded { bytes: b"WS-7".to_vec(), symbology: Symbology::Code128 }
    );
}

#[test]
fn striped_noise_frame_is_not_a_barcode() {
    // One-pixel vertical stripes over the whole frame: high contrast,
    // plenty of runs, but no symbol in any symbology.
    let mut data = vec![0u8; 640 * 480];
    for row in data.chunks_mut(640) {
        for (x, px) in row.iter_mut().enumerate() {
            if x % 2 == 0 {
                *px = 255;
            }
        }
    }
    let frame = FrameBufferView::gray(&data, 640, 480);
    assert_eq!(process_frame(&frame, &ScanConfig::default()), FrameOutcome::NotFound);
}

#[test]
fn pipeline_is_deterministic_per_frame() {
    let grid = qr_frame(b"REPEAT", EcLevel::L, 2, 8, 400, 400).unwrap();
    let frame = FrameBufferView::gray(grid.samples(), 400, 400);
    let config = ScanConfig::default();
    assert_eq!(process_frame(&frame, &config), process_frame(&frame, &config));
}
