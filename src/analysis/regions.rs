use std::collections::HashMap;

use image::{GrayImage, Luma};
use imageproc::region_labelling::{Connectivity, connected_components};
use serde::{Deserialize, Serialize};

use crate::SRegion;

pub const DEFAULT_MIN_REGION_AREA: u32 = 25;

/// How anomalous pixels are counted for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum Aggregation {
    /// Every anomalous pixel counts on its own.
    #[default]
    PixelCount,
    /// 8-connected groups of anomalous pixels whose bounding box covers at
    /// least `min_area` pixels.
    ConnectedRegions { min_area: u32 },
}

impl Aggregation {
    pub fn connected_regions() -> Self {
        Aggregation::ConnectedRegions {
            min_area: DEFAULT_MIN_REGION_AREA,
        }
    }

    pub fn regions(&self, mask: &GrayImage) -> Vec<SRegion> {
        match *self {
            Aggregation::PixelCount => Vec::new(),
            Aggregation::ConnectedRegions { min_area } => find_regions(mask, min_area),
        }
    }
}

/// Bounding boxes of the non-zero components of `mask`, ordered top to
/// bottom then left to right.
pub fn find_regions(mask: &GrayImage, min_area: u32) -> Vec<SRegion> {
    let labels = connected_components(mask, Connectivity::Eight, Luma([0u8]));

    // label -> (min_x, min_y, max_x, max_y)
    let mut bounds: HashMap<u32, (u32, u32, u32, u32)> = HashMap::new();

    for (x, y, label) in labels.enumerate_pixels() {
        if label[0] == 0 {
            continue;
        }

        bounds
            .entry(label[0])
            .and_modify(|b| {
                b.0 = b.0.min(x);
                b.1 = b.1.min(y);
                b.2 = b.2.max(x);
                b.3 = b.3.max(y);
            })
            .or_insert((x, y, x, y));
    }

    let mut regions = bounds
        .into_values()
        .map(|(min_x, min_y, max_x, max_y)| SRegion {
            x: min_x,
            y: min_y,
            width: max_x - min_x + 1,
            height: max_y - min_y + 1,
        })
        .filter(|region| region.area() >= min_area as u64)
        .collect::<Vec<_>>();

    regions.sort_by_key(|r| (r.y, r.x));
    regions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mask_with(points: &[(u32, u32)]) -> GrayImage {
        let mut mask = GrayImage::new(20, 20);
        for &(x, y) in points {
            mask.put_pixel(x, y, Luma([255]));
        }
        mask
    }

    #[test]
    fn test_pixel_count_yields_no_regions() {
        let mask = mask_with(&[(1, 1), (2, 2)]);
        assert!(Aggregation::PixelCount.regions(&mask).is_empty());
    }

    #[test]
    fn test_diagonal_pixels_join_one_region() {
        let mask = mask_with(&[(1, 1), (2, 2), (3, 3)]);
        let regions = find_regions(&mask, 1);

        assert_eq!(
            regions,
            vec![SRegion { x: 1, y: 1, width: 3, height: 3 }]
        );
    }

    #[test]
    fn test_min_area_filters_specks() {
        let mut points = vec![(15, 2)];
        for y in 10..14 {
            for x in 4..9 {
                points.push((x, y));
            }
        }
        let mask = mask_with(&points);

        let all = find_regions(&mask, 1);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0], SRegion { x: 15, y: 2, width: 1, height: 1 });

        let filtered = Aggregation::ConnectedRegions { min_area: 4 }.regions(&mask);
        assert_eq!(
            filtered,
            vec![SRegion { x: 4, y: 10, width: 5, height: 4 }]
        );
    }

    #[test]
    fn test_empty_mask() {
        assert!(find_regions(&GrayImage::new(8, 8), 1).is_empty());
    }
}
