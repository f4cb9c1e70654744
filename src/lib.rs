pub mod assembly;
pub mod config;
pub mod detection;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod synthetic;

pub use config::{CollisionPolicy, ScanConfig};
pub use detection::{
    CellExtractor, Classification, DigitClassifier, GridGeometryEstimator, ImageNormalizer,
    ReferenceDigitSet,
};
pub use error::{Result, ScanError};
pub use models::{
    Blob, EstimateQuality, GeometryEstimate, GridGeometry, GridPosition, NormalizedImage,
    PuzzleGrid, RegionOfInterest,
};
pub use pipeline::{
    DebugDirObserver, Extraction, Pipeline, ScanOutput, Stage, StageObserver, generate_references,
    load_image, scan_file,
};
