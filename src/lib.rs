use std::{fs, path::Path};

use image::{DynamicImage, GrayImage, RgbImage};
use log::info;
use serde::{Deserialize, Serialize};

use crate::{
    analysis::ela::{DEFAULT_QUALITY, DEFAULT_THRESHOLD, ElaAnalyzer, validate_quality},
    error::Result,
};

pub mod analysis;
pub mod detection;
pub mod error;
pub mod image_utils;
pub mod report;

pub use analysis::regions::Aggregation;
pub use detection::{ClassificationPolicy, RiskLevel, classify};

/// Tunable parameters for a full ELA assessment.
///
/// Every field has a documented default so a partial JSON document is a
/// valid configuration. Call [`ElaConfig::validate`] (or load through
/// [`ElaConfig::from_json_str`]) before use.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElaConfig {
    /// JPEG recompression quality, 1..=100.
    pub quality: u8,
    /// Rescaled difference intensity a pixel must strictly exceed to be anomalous.
    pub threshold: u8,
    pub aggregation: Aggregation,
    pub policy: ClassificationPolicy,
    /// Fan batch analysis out over the rayon pool.
    pub parallel: bool,
}

impl Default for ElaConfig {
    fn default() -> Self {
        Self {
            quality: DEFAULT_QUALITY,
            threshold: DEFAULT_THRESHOLD,
            aggregation: Aggregation::default(),
            policy: ClassificationPolicy::default(),
            parallel: true,
        }
    }
}

impl ElaConfig {
    pub fn validate(&self) -> Result<()> {
        validate_quality(self.quality)?;
        self.policy.validate()
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn analyzer(&self) -> Result<ElaAnalyzer> {
        Ok(ElaAnalyzer::new(self.quality, self.threshold)?
            .with_aggregation(self.aggregation)
            .with_parallel(self.parallel))
    }
}

/// Runs ELA and risk classification over a single image.
#[derive(Debug, Clone)]
pub struct ForensicsAnalyzer {
    original: RgbImage,
    config: ElaConfig,
    path: Option<String>,
}

impl ForensicsAnalyzer {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();
        let original = image::open(&path)?.to_rgb8();

        info!(
            "Loaded {} ({}x{})",
            path_str,
            original.width(),
            original.height()
        );

        Ok(Self {
            original,
            config: ElaConfig::default(),
            path: Some(path_str),
        })
    }

    pub fn from_image(image: DynamicImage) -> Self {
        Self::from_rgb(image.to_rgb8())
    }

    pub fn from_rgb(image: RgbImage) -> Self {
        Self {
            original: image,
            config: ElaConfig::default(),
            path: None,
        }
    }

    pub fn with_config(mut self, config: ElaConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &ElaConfig {
        &self.config
    }

    pub fn image(&self) -> &RgbImage {
        &self.original
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn ela(&self) -> Result<ElaResult> {
        self.config.analyzer()?.analyze_rgb(&self.original)
    }

    pub fn assess(&self) -> Result<Assessment> {
        let result = self.ela()?;
        let risk = self.config.policy.evaluate(&result)?;

        Ok(Assessment {
            source: self.path.clone(),
            result,
            risk,
        })
    }
}

/// Output of one ELA pass. Built once by [`ElaAnalyzer`] and read-only afterwards.
#[derive(Debug, Clone)]
pub struct ElaResult {
    pub(crate) difference_image: GrayImage,
    pub(crate) highlight_image: RgbImage,
    pub(crate) dispersion: f64,
    pub(crate) anomaly_count: usize,
    pub(crate) mean_difference: f64,
    pub(crate) max_difference: u8,
    pub(crate) quality: u8,
    pub(crate) threshold: u8,
    pub(crate) aggregation: Aggregation,
    pub(crate) regions: Vec<SRegion>,
}

impl ElaResult {
    /// Grayscale difference rescaled so its brightest pixel is 255.
    pub fn difference_image(&self) -> &GrayImage {
        &self.difference_image
    }

    /// The input with every anomalous pixel painted pure red.
    pub fn highlight_image(&self) -> &RgbImage {
        &self.highlight_image
    }

    /// Population standard deviation of the rescaled difference image.
    pub fn dispersion(&self) -> f64 {
        self.dispersion
    }

    /// Pixels whose rescaled difference strictly exceeds the threshold.
    pub fn anomaly_count(&self) -> usize {
        self.anomaly_count
    }

    pub fn mean_difference(&self) -> f64 {
        self.mean_difference
    }

    /// Largest grayscale difference before rescaling.
    pub fn max_difference(&self) -> u8 {
        self.max_difference
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Bounding boxes of anomalous regions; empty under [`Aggregation::PixelCount`].
    pub fn regions(&self) -> &[SRegion] {
        &self.regions
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.difference_image.dimensions()
    }

    pub fn pixel_count(&self) -> usize {
        let (width, height) = self.dimensions();
        width as usize * height as usize
    }

    pub fn anomaly_ratio(&self) -> f64 {
        self.anomaly_count as f64 / self.pixel_count() as f64
    }

    /// The count the configured aggregation strategy reports.
    pub fn anomaly_measure(&self) -> usize {
        match self.aggregation {
            Aggregation::PixelCount => self.anomaly_count,
            Aggregation::ConnectedRegions { .. } => self.regions.len(),
        }
    }

    /// False for coordinates outside the image.
    pub fn is_anomalous(&self, x: u32, y: u32) -> bool {
        self.difference_image
            .get_pixel_checked(x, y)
            .is_some_and(|p| p[0] > self.threshold)
    }

    pub fn save_difference<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.difference_image.save(path)?;
        Ok(())
    }

    pub fn save_highlight<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        self.highlight_image.save(path)?;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl SRegion {
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x - self.x < self.width && y - self.y < self.height
    }
}

#[derive(Debug, Clone)]
pub struct Assessment {
    pub source: Option<String>,
    pub result: ElaResult,
    pub risk: RiskLevel,
}
