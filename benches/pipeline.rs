//! Benchmarks for the texport pipeline.

use std::io::Cursor;

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use serde_json::json;

use texport::{inspect_png, scan_png_alpha, LodSpec};

/// PNG signature length; `inspect_png` expects the stream just past it.
const SIGNATURE_LEN: u64 = 8;

fn encode_png(image: image::DynamicImage) -> Vec<u8> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
    bytes.into_inner()
}

fn after_signature(bytes: &[u8]) -> Cursor<&[u8]> {
    let mut cursor = Cursor::new(bytes);
    cursor.set_position(SIGNATURE_LEN);
    cursor
}

// -- PNG scan benchmarks --

fn bench_png_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("png_scan");

    let small = encode_png(image::DynamicImage::ImageRgba8(image::RgbaImage::from_pixel(
        16,
        16,
        image::Rgba([255, 0, 0, 128]),
    )));

    // Large opaque image: the scan should not depend on pixel data size
    let large = encode_png(image::DynamicImage::ImageRgb8(image::RgbImage::from_fn(
        1024,
        1024,
        |x, y| image::Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8]),
    )));

    group.bench_function("scan_alpha_small", |b| {
        b.iter(|| scan_png_alpha(&mut after_signature(black_box(&small))).unwrap())
    });

    group.bench_function("scan_alpha_large", |b| {
        b.iter(|| scan_png_alpha(&mut after_signature(black_box(&large))).unwrap())
    });

    group.bench_function("inspect_large", |b| {
        b.iter(|| inspect_png(&mut after_signature(black_box(&large))).unwrap())
    });

    group.finish();
}

// -- LOD parsing benchmarks --

fn bench_lod_parsing(c: &mut Criterion) {
    let mut group = c.benchmark_group("lod_parsing");

    let native = json!([64, [128, 256], 512, [1024, 1024]]);
    let encoded = json!("[64, [128, 256], 512, [1024, 1024]]");

    group.bench_function("parse_native", |b| {
        b.iter(|| LodSpec::parse(black_box(&native)).unwrap())
    });

    group.bench_function("parse_json_string", |b| {
        b.iter(|| LodSpec::parse(black_box(&encoded)).unwrap())
    });

    group.finish();
}

criterion_group!(benches, bench_png_scan, bench_lod_parsing);
criterion_main!(benches);
