//! Decode a symbol from an image file.
//!
//! Usage: scan_image <path>

use viewscan::models::FrameBufferView;
use viewscan::{process_frame, FrameOutcome, ScanConfig};

fn main() {
    env_logger::init();

    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: scan_image <path>");
        std::process::exit(2);
    };

    let img = match image::open(&path) {
        Ok(img) => img.to_luma8(),
        Err(err) => {
            eprintln!("cannot open {path}: {err}");
            std::process::exit(1);
        }
    };

    let (width, height) = (img.width() as usize, img.height() as usize);
    let frame = FrameBufferView::gray(img.as_raw(), width, height);

    match process_frame(&frame, &ScanConfig::default()) {
        FrameOutcome::Decoded { bytes, symbology } => {
            println!("{:?}: {}", symbology, String::from_utf8_lossy(&bytes));
        }
        FrameOutcome::NotFound => {
            println!("no symbol found");
            std::process::exit(1);
        }
        FrameOutcome::Skipped(reason) => {
            println!("frame skipped: {reason:?}");
            std::process::exit(1);
        }
    }
}
