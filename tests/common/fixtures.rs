use image::{DynamicImage, GrayImage};
use std::path::PathBuf;
use sudokuscan::config::ReferenceConfig;
use sudokuscan::synthetic::{SheetLayout, render_reference_sheet, render_sheet};
use sudokuscan::{Pipeline, ReferenceDigitSet};
use tempfile::TempDir;

/// Puzzle sheet with the default layout as a decoded image
pub fn puzzle_image(placements: &[(usize, usize, u8)]) -> DynamicImage {
    DynamicImage::ImageRgb8(render_sheet(&SheetLayout::default(), placements))
}

/// Reference set extracted from a synthetic reference sheet, the same way
/// `sudokuscan references` builds one
pub fn extracted_references() -> ReferenceDigitSet {
    extracted_references_for(&SheetLayout::default())
}

/// Reference set extracted from a reference sheet drawn with `layout`
pub fn extracted_references_for(layout: &SheetLayout) -> ReferenceDigitSet {
    let sheet = DynamicImage::ImageRgb8(render_reference_sheet(layout));
    let extraction = Pipeline::default()
        .extract_regions(&sheet)
        .expect("Failed to extract reference sheet");
    ReferenceDigitSet::from_regions(&extraction.regions).expect("Incomplete reference sheet")
}

/// 498 x 498 sheet whose outer frame lines sit on the image edge
pub fn frame_on_edge_layout() -> SheetLayout {
    SheetLayout {
        margin: 0,
        cell: 55,
        ..SheetLayout::default()
    }
}

/// Sheet rendered at exactly 500 x 500 pixels
pub fn canonical_layout() -> SheetLayout {
    SheetLayout {
        margin: 24,
        cell: 50,
        line_width: 2,
        ..SheetLayout::default()
    }
}

/// Writes a puzzle sheet to a temp PNG and returns its path.
/// The directory must be kept alive while the file is used.
pub fn puzzle_file(placements: &[(usize, usize, u8)]) -> (PathBuf, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let path = dir.path().join("puzzle.png");
    render_sheet(&SheetLayout::default(), placements)
        .save(&path)
        .expect("Failed to save puzzle image");
    (path, dir)
}

/// Reference config pointing at a fresh temp directory
pub fn temp_reference_config() -> (ReferenceConfig, TempDir) {
    let dir = TempDir::new().expect("Failed to create temp directory");
    let config = ReferenceConfig {
        directory: dir.path().join("numbers"),
        extension: "png".to_string(),
    };
    (config, dir)
}

/// Nine distinct flat images, enough to satisfy the reference set shape
pub fn flat_images() -> Vec<GrayImage> {
    (0..9u8)
        .map(|i| GrayImage::from_pixel(10, 10, image::Luma([i * 25])))
        .collect()
}
