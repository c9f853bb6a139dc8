use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use ela_forensics::{
    Aggregation,
    analysis::ela::{ElaAnalyzer, recompress_jpeg},
};
use image::{Rgb, RgbImage};

fn textured(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            ((x * 7 + y * 3) % 256) as u8,
            ((x ^ y) % 256) as u8,
            ((x * y) % 256) as u8,
        ])
    })
}

fn bench_ela(c: &mut Criterion) {
    let image = textured(512, 512);

    c.bench_function("recompress_jpeg 512x512 q90", |b| {
        b.iter(|| recompress_jpeg(black_box(&image), 90))
    });

    let pixel_count = ElaAnalyzer::new(90, 50).unwrap();
    c.bench_function("ela pixel_count 512x512", |b| {
        b.iter(|| pixel_count.analyze_rgb(black_box(&image)))
    });

    let regions = pixel_count.with_aggregation(Aggregation::connected_regions());
    c.bench_function("ela connected_regions 512x512", |b| {
        b.iter(|| regions.analyze_rgb(black_box(&image)))
    });

    let batch = vec![image.clone(); 8];
    c.bench_function("ela batch of 8", |b| {
        b.iter(|| pixel_count.analyze_batch(black_box(&batch)))
    });
}

criterion_group!(benches, bench_ela);
criterion_main!(benches);
