pub mod preprocessing;
pub mod morphology;
pub mod contours;
pub mod normalize;
pub mod grid;
pub mod cells;
pub mod ssim;
pub mod references;
pub mod classify;

pub use cells::CellExtractor;
pub use classify::{Classification, DigitClassifier};
pub use grid::GridGeometryEstimator;
pub use normalize::ImageNormalizer;
pub use references::ReferenceDigitSet;
