use image::GrayImage;
use tracing::{debug, warn};

use crate::config::GeometryConfig;
use crate::detection::contours::ContourTree;
use crate::detection::morphology::{self, LineElement, Orientation};
use crate::detection::preprocessing;
use crate::models::{EstimateQuality, GeometryEstimate, GridGeometry, NormalizedImage};

/// Estimates the pixel size of one grid cell from the printed grid lines
pub struct GridGeometryEstimator {
    config: GeometryConfig,
}

impl GridGeometryEstimator {
    pub fn new(config: GeometryConfig) -> Self {
        Self { config }
    }

    /// Binary image holding only the long horizontal and vertical strokes
    pub fn grid_mask(&self, gray: &GrayImage) -> GrayImage {
        let inverted = preprocessing::invert(gray);
        let bw = preprocessing::adaptive_threshold_gaussian(
            &inverted,
            self.config.adaptive_block_size,
            self.config.adaptive_offset,
        );

        // The adaptive threshold leaves gaps along the lines, fill them first
        let fill_h = LineElement::for_span(&bw, self.config.fill_divisor, Orientation::Horizontal);
        let fill_v = LineElement::for_span(&bw, self.config.fill_divisor, Orientation::Vertical);
        let refined = morphology::close(&bw, fill_h);
        let refined = morphology::close(&refined, fill_v);

        // Strip digit strokes, only runs of a quarter span survive
        let strip_h = LineElement::for_span(&bw, self.config.strip_divisor, Orientation::Horizontal);
        let strip_v = LineElement::for_span(&bw, self.config.strip_divisor, Orientation::Vertical);
        let horizontal = morphology::open(&refined, strip_h);
        let vertical = morphology::open(&refined, strip_v);

        preprocessing::saturating_sum(&horizontal, &vertical)
    }

    pub fn estimate(&self, image: &NormalizedImage) -> GeometryEstimate {
        let nominal = GridGeometry::nominal(image.width(), image.height());
        if !self.config.enabled {
            return GeometryEstimate {
                geometry: nominal,
                complete_rows: 0,
                quality: EstimateQuality::Nominal,
            };
        }

        let mask = self.grid_mask(&image.gray);
        self.estimate_from_mask(&mask, nominal)
    }

    /// Group inner contours into runs of one grid row and take the median of
    /// per-row median widths and heights.
    pub fn estimate_from_mask(&self, mask: &GrayImage, nominal: GridGeometry) -> GeometryEstimate {
        let tree = ContourTree::from_mask(mask);
        let side = mask.height() as f64;
        let outer_limit = side * side / self.config.outer_area_divisor;
        let per_row = self.config.cells_per_row.max(1);

        let mut row_widths: Vec<f64> = Vec::new();
        let mut row_heights: Vec<f64> = Vec::new();
        let mut run_w: Vec<f64> = Vec::with_capacity(per_row);
        let mut run_h: Vec<f64> = Vec::with_capacity(per_row);

        for node in &tree.nodes {
            if node.blob.area > outer_limit {
                continue;
            }
            run_w.push(node.blob.width() as f64);
            run_h.push(node.blob.height() as f64);

            if run_w.len() == per_row {
                row_widths.extend(median(&mut run_w));
                row_heights.extend(median(&mut run_h));
                run_w.clear();
                run_h.clear();
            }
        }

        let complete_rows = row_widths.len();
        debug!(
            contours = tree.len(),
            complete_rows,
            leftover = run_w.len(),
            "grid contours grouped"
        );

        if complete_rows > 0 {
            if let (Some(cell_width), Some(cell_height)) =
                (median(&mut row_widths), median(&mut row_heights))
            {
                debug!(cell_width, cell_height, "cell size estimated");
                return GeometryEstimate {
                    geometry: GridGeometry {
                        cell_width,
                        cell_height,
                    },
                    complete_rows,
                    quality: EstimateQuality::Full,
                };
            }
        }

        let geometry = match (median(&mut run_w), median(&mut run_h)) {
            (Some(cell_width), Some(cell_height)) => GridGeometry {
                cell_width,
                cell_height,
            },
            _ => nominal,
        };
        warn!(
            partial = run_w.len(),
            cell_width = geometry.cell_width,
            cell_height = geometry.cell_height,
            "no complete grid row found, using best-effort cell size"
        );

        GeometryEstimate {
            geometry,
            complete_rows: 0,
            quality: EstimateQuality::Degenerate,
        }
    }
}

impl Default for GridGeometryEstimator {
    fn default() -> Self {
        Self::new(GeometryConfig::default())
    }
}

/// Median of `values`, averaging the middle pair for even counts
pub fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(|a, b| a.total_cmp(b));
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}
