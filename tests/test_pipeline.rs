//! End-to-end scans of synthetic puzzle sheets

mod common;

use common::*;
use std::sync::{Arc, Mutex};
use sudokuscan::synthetic::{SheetLayout, render_reference_sheet, render_sheet};
use sudokuscan::{Stage, StageObserver, generate_references, scan_file};

#[test]
fn test_single_digit_scan() -> anyhow::Result<()> {
    let references = extracted_references();
    let output = Pipeline::default().run(&puzzle_image(&[(0, 0, 5)]), &references)?;

    let mut expected = [[0u8; 9]; 9];
    expected[0][0] = 5;
    assert_eq!(output.grid.cells, expected);
    assert_eq!(output.regions.len(), 1);
    assert_eq!(output.regions[0].number, Some(5));

    Ok(())
}

#[test]
fn test_scattered_digits_scan() -> anyhow::Result<()> {
    let placements = [
        (0, 0, 5),
        (1, 3, 7),
        (2, 6, 1),
        (4, 4, 8),
        (6, 2, 3),
        (7, 7, 4),
        (8, 8, 9),
    ];
    let references = extracted_references();
    let output = Pipeline::default().run(&puzzle_image(&placements), &references)?;

    for &(row, col, digit) in &placements {
        assert_eq!(output.grid.get(row, col), digit, "cell ({}, {})", row, col);
    }
    assert_eq!(output.grid.filled(), placements.len());

    Ok(())
}

#[test]
fn test_500px_sheet_scan() -> anyhow::Result<()> {
    let layout = canonical_layout();
    assert_eq!(layout.canvas_size(), 500);
    let references = extracted_references_for(&layout);

    let input = image::DynamicImage::ImageRgb8(render_sheet(&layout, &[(0, 0, 5)]));
    let output = Pipeline::default().run(&input, &references)?;

    let mut expected = [[0u8; 9]; 9];
    expected[0][0] = 5;
    assert_eq!(output.grid.cells, expected);

    Ok(())
}

#[test]
fn test_sheet_with_frame_on_image_edge_scans() -> anyhow::Result<()> {
    let layout = frame_on_edge_layout();
    let references = extracted_references_for(&layout);

    let input = image::DynamicImage::ImageRgb8(render_sheet(&layout, &[(0, 0, 5), (7, 3, 6)]));
    let extraction = Pipeline::default().extract_regions(&input)?;
    assert_eq!(extraction.geometry.quality, EstimateQuality::Full);
    assert_eq!(extraction.regions.len(), 2);

    let output = Pipeline::default().run(&input, &references)?;
    assert_eq!(output.grid.get(0, 0), 5);
    assert_eq!(output.grid.get(7, 3), 6);
    assert_eq!(output.grid.filled(), 2);

    Ok(())
}

#[test]
fn test_empty_puzzle_scans_to_zeros() -> anyhow::Result<()> {
    let references = extracted_references();
    let output = Pipeline::default().run(&puzzle_image(&[]), &references)?;

    assert_eq!(output.grid.filled(), 0);
    assert!(output.regions.is_empty());

    Ok(())
}

#[test]
fn test_reference_generation_then_scan_from_files() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let sheet_path = dir.path().join("sheet.png");
    render_reference_sheet(&SheetLayout::default()).save(&sheet_path)?;

    let mut config = ScanConfig::default();
    config.references.directory = dir.path().join("numbers");

    let written = generate_references(&sheet_path, &config)?;
    assert_eq!(written.len(), 9);
    assert!(written.iter().all(|p| p.exists()));

    let (puzzle_path, _puzzle_dir) = puzzle_file(&[(3, 5, 6), (5, 0, 2)]);
    let output = scan_file(&puzzle_path, config)?;
    assert_eq!(output.grid.get(3, 5), 6);
    assert_eq!(output.grid.get(5, 0), 2);
    assert_eq!(output.grid.filled(), 2);

    Ok(())
}

#[test]
fn test_incomplete_reference_sheet_is_rejected() -> anyhow::Result<()> {
    let (path, _dir) = puzzle_file(&[(0, 0, 1), (0, 1, 2)]);
    let (reference_config, _ref_dir) = temp_reference_config();
    let config = ScanConfig {
        references: reference_config,
        ..ScanConfig::default()
    };

    let result = generate_references(&path, &config);
    assert!(matches!(result, Err(ScanError::ReferenceGeneration { .. })));

    Ok(())
}

#[test]
fn test_scan_without_references_fails() {
    let (path, _dir) = puzzle_file(&[(0, 0, 5)]);
    let (reference_config, _ref_dir) = temp_reference_config();
    let config = ScanConfig {
        references: reference_config,
        ..ScanConfig::default()
    };

    let result = scan_file(&path, config);
    assert!(matches!(
        result,
        Err(ScanError::MissingReferenceDigit { digit: 1, .. })
    ));
}

#[test]
fn test_missing_input_file() {
    let result = scan_file(std::path::Path::new("nonexistent_puzzle.png"), ScanConfig::default());
    assert!(result.is_err());
}

/// Records which stages were observed
#[derive(Default)]
struct StageLog {
    stages: Mutex<Vec<Stage>>,
}

impl StageObserver for StageLog {
    fn observe(&self, stage: Stage, _image: &image::DynamicImage) -> sudokuscan::Result<()> {
        self.stages.lock().unwrap().push(stage);
        Ok(())
    }
}

#[test]
fn test_observer_sees_stages_without_changing_result() -> anyhow::Result<()> {
    let references = extracted_references();
    let input = puzzle_image(&[(2, 2, 9), (6, 6, 4)]);

    let plain = Pipeline::default().run(&input, &references)?;

    let log = Arc::new(StageLog::default());
    let observed = Pipeline::default()
        .with_observer(log.clone())
        .run(&input, &references)?;

    assert_eq!(plain.grid, observed.grid);

    let stages = log.stages.lock().unwrap().clone();
    assert_eq!(
        &stages[..5],
        &[
            Stage::Input,
            Stage::Normalized,
            Stage::GridMask,
            Stage::DigitMask,
            Stage::Regions
        ]
    );
    assert_eq!(stages.iter().filter(|s| **s == Stage::Crop).count(), 2);

    Ok(())
}

#[test]
fn test_debug_dir_layout() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("debug");
    let references = extracted_references();

    Pipeline::default()
        .with_debug(debug_dir.clone())?
        .run(&puzzle_image(&[(1, 1, 3)]), &references)?;

    for file in [
        "00_input/01.png",
        "01_normalized/01.png",
        "02_grid_mask/01.png",
        "03_digit_mask/01.png",
        "04_regions/01.png",
        "05_crop/01.png",
    ] {
        assert!(debug_dir.join(file).exists(), "missing {}", file);
    }

    Ok(())
}

#[test]
fn test_debug_dir_must_be_empty() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    std::fs::write(dir.path().join("leftover.txt"), "x")?;

    let result = Pipeline::default().with_debug(dir.path().to_path_buf());
    assert!(matches!(result, Err(ScanError::DebugDirNotEmpty { .. })));

    Ok(())
}
