use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};

use viewscan::decoder::qr::EcLevel;
use viewscan::models::{FrameBufferView, PixelFormat};
use viewscan::tools::qr_frame;
use viewscan::utils::{binarize, luminance_grid, BinarizeOptions};

fn bench_luminance(c: &mut Criterion) {
    let mut group = c.benchmark_group("luminance");

    let gray = vec![200u8; 1280 * 720];
    let gray_view = FrameBufferView::gray(&gray, 1280, 720);
    group.bench_function("gray8_720p", |b| {
        b.iter(|| luminance_grid(black_box(&gray_view), None))
    });

    let rgb = vec![180u8; 1280 * 720 * 3];
    let rgb_view = FrameBufferView {
        data: &rgb,
        format: PixelFormat::Rgb24,
        width: 1280,
        height: 720,
        stride: 1280 * 3,
    };
    group.bench_function("rgb24_720p", |b| {
        b.iter(|| luminance_grid(black_box(&rgb_view), None))
    });

    group.finish();
}

fn bench_binarize(c: &mut Criterion) {
    let grid = qr_frame(b"BENCHMARK", EcLevel::M, 4, 20, 700, 700).unwrap();
    let opts = BinarizeOptions::default();
    c.bench_function("binarize_700px_symbol", |b| {
        b.iter(|| binarize(black_box(&grid), &opts))
    });
}

criterion_group!(benches, bench_luminance, bench_binarize);
criterion_main!(benches);
