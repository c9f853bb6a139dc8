use image::{GrayImage, Luma, Rgb, RgbImage};
use ndarray::Array2;

/// ITU-R BT.601 luma in 16.16 fixed point, matching PIL's `convert("L")`.
pub fn luma(pixel: &Rgb<u8>) -> u8 {
    let weighted = 19595 * pixel[0] as u32 + 38470 * pixel[1] as u32 + 7471 * pixel[2] as u32;
    ((weighted + 0x8000) >> 16) as u8
}

pub fn rgb_to_gray(image: &RgbImage) -> GrayImage {
    let (width, height) = image.dimensions();
    let mut gray = GrayImage::new(width, height);

    for (x, y, pixel) in image.enumerate_pixels() {
        gray.put_pixel(x, y, Luma([luma(pixel)]));
    }

    gray
}

/// Per-pixel, per-channel `|a - b|`. Both images must share dimensions.
pub fn absolute_difference(a: &RgbImage, b: &RgbImage) -> RgbImage {
    let (width, height) = a.dimensions();
    let mut diff = RgbImage::new(width, height);

    for (x, y, pa) in a.enumerate_pixels() {
        let pb = b.get_pixel(x, y);
        diff.put_pixel(
            x,
            y,
            Rgb([
                pa[0].abs_diff(pb[0]),
                pa[1].abs_diff(pb[1]),
                pa[2].abs_diff(pb[2]),
            ]),
        );
    }

    diff
}

pub fn gray_to_array(image: &GrayImage) -> Array2<f64> {
    let (width, height) = image.dimensions();
    let mut arr = Array2::zeros((height as usize, width as usize));

    for (x, y, pixel) in image.enumerate_pixels() {
        arr[[y as usize, x as usize]] = pixel[0] as f64;
    }

    arr
}

pub fn array_to_gray(arr: &Array2<f64>) -> GrayImage {
    let (height, width) = arr.dim();
    let mut image = GrayImage::new(width as u32, height as u32);

    for ((y, x), &value) in arr.indexed_iter() {
        image.put_pixel(x as u32, y as u32, Luma([value.clamp(0.0, 255.0) as u8]));
    }

    image
}

pub fn calculate_histogram(image: &GrayImage) -> [u32; 256] {
    let mut histogram = [0u32; 256];

    for pixel in image.pixels() {
        histogram[pixel[0] as usize] += 1;
    }

    histogram
}

/// Largest intensity present, or 0 for an empty image.
pub fn max_intensity(image: &GrayImage) -> u8 {
    calculate_histogram(image)
        .iter()
        .rposition(|&count| count > 0)
        .map(|v| v as u8)
        .unwrap_or(0)
}
