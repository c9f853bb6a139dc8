use image::{GrayImage, Rgb, RgbImage};
use imageproc::{drawing::draw_hollow_rect_mut, rect::Rect};

use crate::{ElaResult, SRegion};

#[derive(Debug, Clone, Copy)]
pub enum ColorScheme {
    /// Blue through green to red.
    HeatMap,
    Grayscale,
    SingleColor(Rgb<u8>),
}

#[derive(Debug, Clone)]
pub struct VisualizationConfig {
    pub color_scheme: ColorScheme,
    pub overlay_opacity: f32,
    pub border_thickness: u32,
    pub border_color: Rgb<u8>,
}

impl Default for VisualizationConfig {
    fn default() -> Self {
        Self {
            color_scheme: ColorScheme::HeatMap,
            overlay_opacity: 0.5,
            border_thickness: 2,
            border_color: Rgb([255, 0, 0]),
        }
    }
}

/// Renders ELA output for human review.
pub struct Visualizer {
    config: VisualizationConfig,
}

impl Default for Visualizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Visualizer {
    pub fn new() -> Self {
        Self {
            config: VisualizationConfig::default(),
        }
    }

    pub fn with_config(config: VisualizationConfig) -> Self {
        Self { config }
    }

    pub fn create_heatmap(&self, gray: &GrayImage) -> RgbImage {
        let (width, height) = gray.dimensions();
        let mut heatmap = RgbImage::new(width, height);

        for (x, y, pixel) in gray.enumerate_pixels() {
            heatmap.put_pixel(x, y, self.intensity_to_color(pixel[0] as f32 / 255.0));
        }

        heatmap
    }

    fn intensity_to_color(&self, intensity: f32) -> Rgb<u8> {
        let t = intensity.clamp(0.0, 1.0);

        match self.config.color_scheme {
            ColorScheme::HeatMap => {
                let (r, g, b) = if t < 0.5 {
                    let s = t / 0.5;
                    (0.0, s, 1.0 - s)
                } else {
                    let s = (t - 0.5) / 0.5;
                    (s, 1.0 - s, 0.0)
                };
                Rgb([(r * 255.0) as u8, (g * 255.0) as u8, (b * 255.0) as u8])
            }
            ColorScheme::Grayscale => {
                let v = (t * 255.0) as u8;
                Rgb([v, v, v])
            }
            ColorScheme::SingleColor(base) => Rgb([
                (base[0] as f32 * t) as u8,
                (base[1] as f32 * t) as u8,
                (base[2] as f32 * t) as u8,
            ]),
        }
    }

    /// Alpha-blends `heatmap` over `original`. Both must share dimensions.
    pub fn overlay_heatmap(&self, original: &RgbImage, heatmap: &RgbImage) -> RgbImage {
        let alpha = self.config.overlay_opacity.clamp(0.0, 1.0);
        let mut blended = original.clone();

        for (x, y, pixel) in blended.enumerate_pixels_mut() {
            let heat = heatmap.get_pixel(x, y);
            for c in 0..3 {
                pixel[c] = ((1.0 - alpha) * pixel[c] as f32 + alpha * heat[c] as f32) as u8;
            }
        }

        blended
    }

    /// Copy of `original` with a hollow box around each region.
    pub fn annotate_regions(&self, original: &RgbImage, regions: &[SRegion]) -> RgbImage {
        let mut annotated = original.clone();

        for region in regions {
            for inset in 0..self.config.border_thickness {
                let width = region.width.saturating_sub(2 * inset);
                let height = region.height.saturating_sub(2 * inset);
                if width == 0 || height == 0 {
                    break;
                }

                let rect = Rect::at((region.x + inset) as i32, (region.y + inset) as i32)
                    .of_size(width, height);
                draw_hollow_rect_mut(&mut annotated, rect, self.config.border_color);
            }
        }

        annotated
    }

    pub fn visualize_ela(&self, original: &RgbImage, result: &ElaResult) -> RgbImage {
        let heatmap = self.create_heatmap(result.difference_image());
        let blended = self.overlay_heatmap(original, &heatmap);
        self.annotate_regions(&blended, result.regions())
    }
}
