#![allow(dead_code)]

use ela_forensics::analysis::ela::recompress_jpeg;
use image::{Rgb, RgbImage};

/// Smooth diagonal gradient: little high-frequency content for JPEG to lose.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            (x * 255 / width.max(1)) as u8,
            (y * 255 / height.max(1)) as u8,
            ((x + y) * 255 / (width + height).max(1)) as u8,
        ])
    })
}

/// Deterministic per-channel noise from a linear congruential generator.
pub fn noise(width: u32, height: u32, seed: u32) -> RgbImage {
    let mut state = seed;
    RgbImage::from_fn(width, height, |_, _| {
        let mut next = || {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (state >> 24) as u8
        };
        Rgb([next(), next(), next()])
    })
}

/// Gradient saved once at `quality`, then overwritten with a noise patch at
/// (`x`, `y`) of `size` x `size` pixels.
pub fn spliced(width: u32, height: u32, quality: u8, x: u32, y: u32, size: u32) -> RgbImage {
    let mut image = recompress_jpeg(&gradient(width, height), quality).unwrap();
    let patch = noise(size, size, 7);
    image::imageops::replace(&mut image, &patch, x as i64, y as i64);
    image
}
