//! Tunable parameters for every stage of a scan.
//!
//! Defaults reproduce the heuristics the recognizer was tuned with on
//! photographed 9x9 puzzle sheets. A config can be stored as JSON and passed to
//! the CLI with `--config`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, ScanError};
use crate::models::GRID_SIZE;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub normalize: NormalizeConfig,
    pub geometry: GeometryConfig,
    pub cells: CellConfig,
    pub references: ReferenceConfig,
    pub assembly: AssemblyConfig,
}

/// Canonical resize and outer-frame detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizeConfig {
    /// Side of the square every input is resized to
    pub canonical_size: u32,
    pub canny_low: f32,
    pub canny_high: f32,
}

impl Default for NormalizeConfig {
    fn default() -> Self {
        Self {
            canonical_size: 500,
            canny_low: 50.0,
            canny_high: 200.0,
        }
    }
}

/// Cell size estimation from grid lines
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryConfig {
    /// When false the nominal `size / 9` cell is used without looking at the image
    pub enabled: bool,
    /// Odd neighbourhood size of the adaptive threshold
    pub adaptive_block_size: u32,
    /// Constant subtracted from the local mean (negative raises the bar)
    pub adaptive_offset: f32,
    /// Gap-filling structuring element is `span / fill_divisor` long
    pub fill_divisor: u32,
    /// Stroke-stripping structuring element is `span / strip_divisor` long
    pub strip_divisor: u32,
    /// Contours larger than `side^2 / outer_area_divisor` are the outer frame
    pub outer_area_divisor: f64,
    pub cells_per_row: usize,
}

impl Default for GeometryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            adaptive_block_size: 11,
            adaptive_offset: -2.0,
            fill_divisor: 50,
            strip_divisor: 4,
            outer_area_divisor: 2.0,
            cells_per_row: 9,
        }
    }
}

/// Digit region detection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CellConfig {
    /// Sigma matching a 5x5 Gaussian kernel
    pub blur_sigma: f32,
    /// Contours larger than `side^2 / max_area_divisor` cannot be a single digit
    pub max_area_divisor: f64,
    /// Specks below this enclosed area are ignored
    pub min_area: f64,
}

impl Default for CellConfig {
    fn default() -> Self {
        Self {
            blur_sigma: 1.1,
            max_area_divisor: 81.0,
            min_area: 4.0,
        }
    }
}

/// Where reference digit images live: `<directory>/<digit>.<extension>`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReferenceConfig {
    pub directory: PathBuf,
    pub extension: String,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("numbers"),
            extension: "png".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AssemblyConfig {
    pub collision: CollisionPolicy,
}

/// What to do when two classified regions land in the same cell
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CollisionPolicy {
    /// Fail the run with `DuplicatePosition`
    #[default]
    Reject,
    /// Later region overwrites the earlier one
    LastWins,
}

impl ScanConfig {
    /// Load a config file, rejecting values the stages cannot run with
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| ScanError::io(path, e))?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check sizes, divisors and sigmas that the image operations require to
    /// be positive
    pub fn validate(&self) -> Result<()> {
        let n = &self.normalize;
        let g = &self.geometry;
        let c = &self.cells;
        let checks = [
            (
                n.canonical_size >= GRID_SIZE as u32,
                "normalize.canonical_size must be at least 9",
            ),
            (
                n.canny_low >= 0.0 && n.canny_low <= n.canny_high,
                "normalize.canny_low must be between 0 and normalize.canny_high",
            ),
            (
                g.adaptive_block_size >= 3 && g.adaptive_block_size % 2 == 1,
                "geometry.adaptive_block_size must be odd and at least 3",
            ),
            (g.fill_divisor > 0, "geometry.fill_divisor must be positive"),
            (g.strip_divisor > 0, "geometry.strip_divisor must be positive"),
            (
                g.outer_area_divisor > 0.0,
                "geometry.outer_area_divisor must be positive",
            ),
            (g.cells_per_row > 0, "geometry.cells_per_row must be positive"),
            (c.blur_sigma > 0.0, "cells.blur_sigma must be positive"),
            (
                c.max_area_divisor > 0.0,
                "cells.max_area_divisor must be positive",
            ),
            (c.min_area >= 0.0, "cells.min_area must not be negative"),
            (
                !self.references.extension.is_empty(),
                "references.extension must not be empty",
            ),
        ];

        match checks.iter().find(|(ok, _)| !ok) {
            Some((_, reason)) => Err(ScanError::InvalidConfig {
                reason: reason.to_string(),
            }),
            None => Ok(()),
        }
    }

    pub fn to_json_file(&self, path: &Path) -> Result<()> {
        let text = serde_json::to_string_pretty(self).map_err(|source| ScanError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, text).map_err(|e| ScanError::io(path, e))
    }
}
