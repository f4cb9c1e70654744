#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from sudokuscan for tests
pub use sudokuscan::synthetic::SheetLayout;
pub use sudokuscan::{
    CellExtractor, CollisionPolicy, DigitClassifier, EstimateQuality, GridGeometry,
    GridGeometryEstimator, ImageNormalizer, NormalizedImage, Pipeline, ReferenceDigitSet,
    ScanConfig, ScanError,
};
