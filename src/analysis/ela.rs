use image::{DynamicImage, GrayImage, ImageFormat, Luma, Rgb, RgbImage, codecs::jpeg::JpegEncoder};
use log::{debug, info};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use statrs::statistics::Statistics;

use crate::{
    ElaResult,
    analysis::regions::Aggregation,
    error::{ForensicsError, Result},
    image_utils::{absolute_difference, array_to_gray, gray_to_array, max_intensity, rgb_to_gray},
};

pub const DEFAULT_QUALITY: u8 = 90;
pub const DEFAULT_THRESHOLD: u8 = 50;

const HIGHLIGHT: Rgb<u8> = Rgb([255, 0, 0]);
const MASK_ON: Luma<u8> = Luma([255]);

/// Error Level Analysis: recompress as JPEG, diff against the input and
/// flag pixels whose rescaled difference exceeds a threshold.
///
/// The threshold is `u8`, so every representable value is valid. Quality
/// outside 1..=100 is rejected rather than clamped.
#[derive(Debug, Clone, Copy)]
pub struct ElaAnalyzer {
    quality: u8,
    threshold: u8,
    aggregation: Aggregation,
    parallel: bool,
}

impl ElaAnalyzer {
    pub fn new(quality: u8, threshold: u8) -> Result<Self> {
        validate_quality(quality)?;

        Ok(Self {
            quality,
            threshold,
            aggregation: Aggregation::PixelCount,
            parallel: true,
        })
    }

    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn analyze(&self, image: &DynamicImage) -> Result<ElaResult> {
        self.analyze_rgb(&image.to_rgb8())
    }

    pub fn analyze_rgb(&self, image: &RgbImage) -> Result<ElaResult> {
        ensure_non_empty(image)?;

        let recompressed = recompress_jpeg(image, self.quality)?;
        self.compare(image, &recompressed)
    }

    /// Runs the difference, rescale, statistics and masking stages against an
    /// already recompressed copy of `original`.
    pub fn compare(&self, original: &RgbImage, recompressed: &RgbImage) -> Result<ElaResult> {
        ensure_non_empty(original)?;
        if original.dimensions() != recompressed.dimensions() {
            return Err(ForensicsError::InvalidParameter(format!(
                "recompressed image is {:?}, original is {:?}",
                recompressed.dimensions(),
                original.dimensions()
            )));
        }

        let raw = rgb_to_gray(&absolute_difference(original, recompressed));
        let (difference_image, max_difference) = rescale(&raw);

        if max_difference == 0 {
            debug!("Recompression left the image unchanged; difference is all zero");
        }

        let dispersion = difference_image
            .pixels()
            .map(|p| p[0] as f64)
            .population_std_dev();
        let mean_difference = difference_image.pixels().map(|p| p[0] as f64).mean();

        let mask = anomaly_mask(&difference_image, self.threshold);
        let anomaly_count = mask.pixels().filter(|p| p[0] > 0).count();
        let highlight_image = highlight(original, &mask);
        let regions = self.aggregation.regions(&mask);

        debug!(
            "ELA q={} t={} on {}x{}: max={} std={:.2} anomalous={} regions={}",
            self.quality,
            self.threshold,
            original.width(),
            original.height(),
            max_difference,
            dispersion,
            anomaly_count,
            regions.len()
        );

        Ok(ElaResult {
            difference_image,
            highlight_image,
            dispersion,
            anomaly_count,
            mean_difference,
            max_difference,
            quality: self.quality,
            threshold: self.threshold,
            aggregation: self.aggregation,
            regions,
        })
    }

    /// Analyzes every image independently. Results keep input order.
    pub fn analyze_batch(&self, images: &[RgbImage]) -> Vec<Result<ElaResult>> {
        info!(
            "Running ELA on {} image(s) (parallel: {})",
            images.len(),
            self.parallel
        );

        if self.parallel {
            images
                .par_iter()
                .map(|image| self.analyze_rgb(image))
                .collect()
        } else {
            images.iter().map(|image| self.analyze_rgb(image)).collect()
        }
    }
}

fn ensure_non_empty(image: &RgbImage) -> Result<()> {
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(ForensicsError::InvalidParameter(format!(
            "image must be non-empty, got {}x{}",
            width, height
        )));
    }
    Ok(())
}

pub fn validate_quality(quality: u8) -> Result<()> {
    if !(1..=100).contains(&quality) {
        return Err(ForensicsError::InvalidParameter(format!(
            "quality must be between 1 and 100, got {}",
            quality
        )));
    }
    Ok(())
}

/// JPEG round trip at `quality`. Fails with `DecodeError` if either leg of
/// the codec fails or the decoded raster changes size.
pub fn recompress_jpeg(image: &RgbImage, quality: u8) -> Result<RgbImage> {
    let mut buffer = Vec::new();

    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    image.write_with_encoder(encoder).map_err(|e| {
        ForensicsError::DecodeError(format!("JPEG encode at quality {}: {}", quality, e))
    })?;

    let recompressed = image::load_from_memory_with_format(&buffer, ImageFormat::Jpeg)
        .map_err(|e| ForensicsError::DecodeError(format!("JPEG decode: {}", e)))?
        .to_rgb8();

    if recompressed.dimensions() != image.dimensions() {
        return Err(ForensicsError::DecodeError(format!(
            "decoded {:?}, expected {:?}",
            recompressed.dimensions(),
            image.dimensions()
        )));
    }

    Ok(recompressed)
}

/// Stretches `gray` so its maximum maps to 255, rounding halves to even.
/// Returns the stretched image and the original maximum. An all-zero image
/// is returned unchanged.
pub fn rescale(gray: &GrayImage) -> (GrayImage, u8) {
    let max_value = max_intensity(gray);
    let scale = if max_value == 0 {
        1.0
    } else {
        255.0 / max_value as f64
    };

    let scaled = gray_to_array(gray).mapv(|v| (v * scale).round_ties_even());
    (array_to_gray(&scaled), max_value)
}

/// 255 where `difference > threshold`, 0 elsewhere.
pub fn anomaly_mask(difference: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = difference.dimensions();
    let mut mask = GrayImage::new(width, height);

    for (x, y, pixel) in difference.enumerate_pixels() {
        if pixel[0] > threshold {
            mask.put_pixel(x, y, MASK_ON);
        }
    }

    mask
}

pub fn highlight(original: &RgbImage, mask: &GrayImage) -> RgbImage {
    let mut highlighted = original.clone();

    for (x, y, pixel) in mask.enumerate_pixels() {
        if pixel[0] > 0 {
            highlighted.put_pixel(x, y, HIGHLIGHT);
        }
    }

    highlighted
}
