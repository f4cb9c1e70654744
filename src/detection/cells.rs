use image::GrayImage;
use std::collections::HashSet;
use tracing::{debug, trace, warn};

use crate::config::CellConfig;
use crate::detection::contours::{BorderKind, ContourTree};
use crate::detection::preprocessing;
use crate::models::{GridGeometry, NormalizedImage, RegionOfInterest};

/// Finds digit-shaped contours and maps each to its grid cell
pub struct CellExtractor {
    config: CellConfig,
}

impl CellExtractor {
    pub fn new(config: CellConfig) -> Self {
        Self { config }
    }

    /// Dark ink as foreground after blur and Otsu binarisation
    pub fn digit_mask(&self, gray: &GrayImage) -> GrayImage {
        let blurred = preprocessing::apply_blur(gray, self.config.blur_sigma);
        preprocessing::binarize_dark_foreground(&blurred)
    }

    pub fn extract(&self, image: &NormalizedImage, geometry: &GridGeometry) -> Vec<RegionOfInterest> {
        let mask = self.digit_mask(&image.gray);
        self.extract_from_mask(image, &mask, geometry)
    }

    /// Same as [`extract`](Self::extract) with a precomputed [`digit_mask`](Self::digit_mask)
    pub fn extract_from_mask(
        &self,
        image: &NormalizedImage,
        mask: &GrayImage,
        geometry: &GridGeometry,
    ) -> Vec<RegionOfInterest> {
        let tree = ContourTree::from_mask(mask);
        let max_area =
            (image.width() as f64 * image.height() as f64) / self.config.max_area_divisor;

        // Ids of every size-eligible component, in traversal order. A component
        // nested inside one already seen (a stroke fragment inside the loop of
        // a 4, 6, 8 or 9) loses to the first one.
        let mut seen: HashSet<usize> = HashSet::new();
        let mut regions = Vec::new();

        for node in &tree.nodes {
            // Holes are the inside of a loop, never a digit on their own
            if node.kind == BorderKind::Hole {
                continue;
            }
            let area = node.blob.area;
            if area > max_area || area < self.config.min_area {
                trace!(id = node.id, area, "contour outside digit size range");
                continue;
            }

            let owner = tree.enclosing_outer(node.id);
            if owner.is_some_and(|id| seen.contains(&id)) {
                trace!(id = node.id, ?owner, "contour nested in a seen digit");
                seen.insert(node.id);
                continue;
            }
            seen.insert(node.id);

            let Some(crop) = node.blob.extract_roi(&image.gray) else {
                continue;
            };
            let (position, clamped) = geometry.locate(node.blob.min_x, node.blob.min_y);
            if clamped {
                warn!(
                    x = node.blob.min_x,
                    y = node.blob.min_y,
                    row = position.row,
                    col = position.col,
                    "digit position outside the grid, clamped"
                );
            }

            regions.push(RegionOfInterest {
                image: crop,
                position,
                blob: node.blob,
                number: None,
            });
        }

        debug!(
            contours = tree.len(),
            regions = regions.len(),
            "digit regions extracted"
        );
        regions
    }
}

impl Default for CellExtractor {
    fn default() -> Self {
        Self::new(CellConfig::default())
    }
}
