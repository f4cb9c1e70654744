mod common;

use common::*;
use image::{GrayImage, Luma, Rgb, RgbImage};
use sudokuscan::synthetic::{SheetLayout, draw_digit};

fn normalized(placements: &[(usize, usize, u8)]) -> NormalizedImage {
    ImageNormalizer::default()
        .normalize(&puzzle_image(placements))
        .expect("Failed to normalize synthetic puzzle")
}

#[test]
fn test_estimate_close_to_ninth_of_image() {
    let image = normalized(&[(0, 0, 5), (3, 3, 8), (7, 1, 4)]);
    let estimate = GridGeometryEstimator::default().estimate(&image);

    assert_eq!(estimate.quality, EstimateQuality::Full);
    assert!(estimate.complete_rows >= 9);

    let nominal = 500.0 / 9.0;
    assert!(
        (estimate.geometry.cell_width - nominal).abs() < 4.0,
        "cell width {} too far from {}",
        estimate.geometry.cell_width,
        nominal
    );
    assert!((estimate.geometry.cell_height - nominal).abs() < 4.0);
}

#[test]
fn test_estimate_is_deterministic() {
    let image = normalized(&[(2, 5, 6), (6, 6, 1)]);
    let estimator = GridGeometryEstimator::default();

    let first = estimator.estimate(&image);
    let second = estimator.estimate(&image);
    assert_eq!(first, second);
}

#[test]
fn test_grid_mask_strips_digits() {
    let image = normalized(&[(4, 4, 8)]);
    let mask = GridGeometryEstimator::default().grid_mask(&image.gray);

    // Centre of cell (4, 4) holds the 8's middle bar but no grid line
    let c = 4.5 * 500.0 / 9.0;
    let (cx, cy) = (c as u32, c as u32);
    for dy in 0..5 {
        for dx in 0..5 {
            assert_eq!(mask.get_pixel(cx - 2 + dx, cy - 2 + dy)[0], 0);
        }
    }
}

#[test]
fn test_gridless_image_degrades() {
    let mut display = RgbImage::from_pixel(500, 500, Rgb([255, 255, 255]));
    draw_digit(&mut display, 8, 200, 200, &SheetLayout::default());
    let gray = GrayImage::from_fn(500, 500, |x, y| Luma([display.get_pixel(x, y)[0]]));
    let image = NormalizedImage { gray, display };

    let estimate = GridGeometryEstimator::default().estimate(&image);
    assert_eq!(estimate.quality, EstimateQuality::Degenerate);
    assert_eq!(estimate.complete_rows, 0);
    assert!(estimate.geometry.cell_width > 0.0);
    assert!(estimate.geometry.cell_height > 0.0);
}

#[test]
fn test_disabled_estimation_uses_nominal() {
    let image = normalized(&[]);
    let mut config = ScanConfig::default();
    config.geometry.enabled = false;

    let estimate = GridGeometryEstimator::new(config.geometry).estimate(&image);
    assert_eq!(estimate.geometry, GridGeometry::nominal(500, 500));
    assert_eq!(estimate.quality, EstimateQuality::Nominal);
    assert_eq!(estimate.complete_rows, 0);
}
