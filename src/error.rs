//! Error types for the sudokuscan library

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for sudokuscan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Everything that can abort a scan run
#[derive(Error, Debug)]
pub enum ScanError {
    /// Input image could not be opened or decoded
    #[error("Failed to load image {}: {source}", .path.display())]
    ImageLoad {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// A crop or debug image could not be written
    #[error("Failed to save image {}: {source}", .path.display())]
    ImageSave {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("I/O error at {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Normalization found no outer frame to crop to
    #[error("No grid boundary found in image")]
    NoGridBoundaryFound,

    /// A reference digit file is absent
    #[error(
        "Reference digit {digit} not found at {}, generate the reference set first",
        .path.display()
    )]
    MissingReferenceDigit { digit: u8, path: PathBuf },

    /// A reference set built in memory does not hold one image per digit
    #[error("Reference set must contain exactly 9 images, found {found}")]
    InvalidReferenceSet { found: usize },

    /// Two regions resolved to the same grid cell
    #[error("Grid cell ({row}, {col}) claimed twice: {first} then {second}")]
    DuplicatePosition {
        row: usize,
        col: usize,
        first: u8,
        second: u8,
    },

    /// Classifier was handed a crop with no pixels
    #[error("Cannot classify an empty region")]
    EmptyRegion,

    #[error("Debug directory is not empty: {}", .path.display())]
    DebugDirNotEmpty { path: PathBuf },

    #[error("Invalid configuration file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A configuration value that would make a stage meaningless or panic
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    /// A reference sheet did not produce a crop for every digit
    #[error("Reference generation failed: {reason}")]
    ReferenceGeneration { reason: String },
}

impl ScanError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// True when retrying with a different input image is the only remedy.
    ///
    /// Reference, configuration and filesystem errors are fixed elsewhere and
    /// would fail again for any image.
    pub fn is_fatal_for_image(&self) -> bool {
        matches!(
            self,
            ScanError::ImageLoad { .. }
                | ScanError::NoGridBoundaryFound
                | ScanError::DuplicatePosition { .. }
                | ScanError::EmptyRegion
        )
    }
}
