use image::{DynamicImage, GrayImage, Luma, RgbImage};
use tracing::debug;

use crate::config::NormalizeConfig;
use crate::detection::contours::{ContourNode, ContourTree};
use crate::detection::preprocessing;
use crate::error::{Result, ScanError};
use crate::models::{Blob, GRID_SIZE, NormalizedImage};

/// White band added around the image before edge detection. A frame drawn
/// right on the image edge only gets a closed border against it.
const EDGE_PAD: u32 = 2;

/// A component nested in an image-wide border is taken as the grid when its
/// box covers between these fractions of the border's box
const INNER_FRAME_MIN: f64 = 0.25;
const INNER_FRAME_MAX: f64 = 0.9;

/// Crops a photographed puzzle to its outer frame and resizes it to a square
pub struct ImageNormalizer {
    config: NormalizeConfig,
}

impl ImageNormalizer {
    pub fn new(config: NormalizeConfig) -> Self {
        Self { config }
    }

    pub fn normalize(&self, img: &DynamicImage) -> Result<NormalizedImage> {
        let size = self.config.canonical_size;
        if size < GRID_SIZE as u32 {
            return Err(ScanError::InvalidConfig {
                reason: format!("normalize.canonical_size {} is below {}", size, GRID_SIZE),
            });
        }
        let resized = preprocessing::resize_square(&img.to_rgb8(), size);

        let gray = image::imageops::grayscale(&resized);
        let padded = preprocessing::pad(&gray, EDGE_PAD, Luma([255]));
        let edges =
            preprocessing::detect_edges(&padded, self.config.canny_low, self.config.canny_high);

        let tree = ContourTree::from_mask(&edges);
        let frame = select_frame(&tree, &edges).ok_or(ScanError::NoGridBoundaryFound)?;
        let (x, y, width, height) = unpad(&frame.blob, size);

        debug!(
            x,
            y,
            width,
            height,
            contours = tree.len(),
            "grid boundary located"
        );

        let cropped: RgbImage = image::imageops::crop_imm(&resized, x, y, width, height).to_image();
        let display = preprocessing::resize_square(&cropped, size);
        let gray = image::imageops::grayscale(&display);

        Ok(NormalizedImage { gray, display })
    }
}

impl Default for ImageNormalizer {
    fn default() -> Self {
        Self::new(NormalizeConfig::default())
    }
}

/// Largest external border of the padded edge map.
///
/// If that border runs along the whole image it is either a grid cropped to
/// its frame or the edge of a dark background. A clearly smaller component
/// directly inside it means the latter, and that component is the grid.
fn select_frame<'a>(tree: &'a ContourTree, edges: &GrayImage) -> Option<&'a ContourNode> {
    let outermost = tree.largest_external()?;
    if !spans_image(&outermost.blob, edges.width(), edges.height()) {
        return Some(outermost);
    }

    let outer_area = outermost.blob.box_area() as f64;
    match tree.largest_enclosed_by(outermost.id) {
        Some(inner) => {
            let ratio = inner.blob.box_area() as f64 / outer_area;
            if (INNER_FRAME_MIN..INNER_FRAME_MAX).contains(&ratio) {
                debug!(ratio, "grid found inside image-wide border");
                Some(inner)
            } else {
                Some(outermost)
            }
        }
        None => Some(outermost),
    }
}

fn spans_image(blob: &Blob, width: u32, height: u32) -> bool {
    blob.min_x <= EDGE_PAD
        && blob.min_y <= EDGE_PAD
        && blob.max_x + EDGE_PAD + 1 >= width
        && blob.max_y + EDGE_PAD + 1 >= height
}

/// Map a box from padded edge-map coordinates back onto the `size` x `size`
/// image as `(x, y, width, height)`
fn unpad(blob: &Blob, size: u32) -> (u32, u32, u32, u32) {
    let last = size - 1;
    let x0 = blob.min_x.saturating_sub(EDGE_PAD).min(last);
    let y0 = blob.min_y.saturating_sub(EDGE_PAD).min(last);
    let x1 = blob.max_x.saturating_sub(EDGE_PAD).min(last);
    let y1 = blob.max_y.saturating_sub(EDGE_PAD).min(last);
    (x0, y0, x1 - x0 + 1, y1 - y0 + 1)
}
