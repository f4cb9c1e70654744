use image::{DynamicImage, ImageReader, Rgb};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use crate::assembly;
use crate::config::ScanConfig;
use crate::detection::cells::CellExtractor;
use crate::detection::classify::DigitClassifier;
use crate::detection::grid::GridGeometryEstimator;
use crate::detection::normalize::ImageNormalizer;
use crate::detection::references::ReferenceDigitSet;
use crate::error::{Result, ScanError};
use crate::models::{
    GeometryEstimate, GridGeometry, NormalizedImage, PuzzleGrid, RegionOfInterest,
};

/// Points in a scan where observers are shown an intermediate image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Input,
    Normalized,
    GridMask,
    DigitMask,
    Regions,
    Crop,
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Input => "input",
            Stage::Normalized => "normalized",
            Stage::GridMask => "grid_mask",
            Stage::DigitMask => "digit_mask",
            Stage::Regions => "regions",
            Stage::Crop => "crop",
        }
    }

    fn index(&self) -> usize {
        match self {
            Stage::Input => 0,
            Stage::Normalized => 1,
            Stage::GridMask => 2,
            Stage::DigitMask => 3,
            Stage::Regions => 4,
            Stage::Crop => 5,
        }
    }
}

/// Side-effecting hook called after key stages.
///
/// Observers never influence the result; a failing observer is logged and
/// the scan carries on.
pub trait StageObserver: Send + Sync {
    fn observe(&self, stage: Stage, image: &DynamicImage) -> Result<()>;
}

/// Saves every observed image as `<dir>/<NN>_<stage>/<MM>.png`
pub struct DebugDirObserver {
    output_dir: PathBuf,
    counters: Mutex<HashMap<Stage, usize>>,
}

impl DebugDirObserver {
    /// The directory must be empty or non-existent
    pub fn new(output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let mut entries =
                std::fs::read_dir(&output_dir).map_err(|e| ScanError::io(&output_dir, e))?;
            if entries.next().is_some() {
                return Err(ScanError::DebugDirNotEmpty { path: output_dir });
            }
        } else {
            std::fs::create_dir_all(&output_dir).map_err(|e| ScanError::io(&output_dir, e))?;
        }

        Ok(Self {
            output_dir,
            counters: Mutex::new(HashMap::new()),
        })
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}

impl StageObserver for DebugDirObserver {
    fn observe(&self, stage: Stage, image: &DynamicImage) -> Result<()> {
        let seq = {
            let mut counters = self.counters.lock().unwrap_or_else(|e| e.into_inner());
            let n = counters.entry(stage).or_insert(0);
            *n += 1;
            *n
        };

        let step_dir = self
            .output_dir
            .join(format!("{:02}_{}", stage.index(), stage.name()));
        std::fs::create_dir_all(&step_dir).map_err(|e| ScanError::io(&step_dir, e))?;

        let path = step_dir.join(format!("{:02}.png", seq));
        image.save(&path).map_err(|source| ScanError::ImageSave {
            path: path.clone(),
            source,
        })?;
        debug!(path = %path.display(), "debug image saved");
        Ok(())
    }
}

/// Normalized image, geometry and unlabelled regions of one photograph
#[derive(Debug, Clone)]
pub struct Extraction {
    pub normalized: NormalizedImage,
    pub geometry: GeometryEstimate,
    pub regions: Vec<RegionOfInterest>,
}

/// Final artifacts of a scan
#[derive(Debug, Clone)]
pub struct ScanOutput {
    pub grid: PuzzleGrid,
    pub regions: Vec<RegionOfInterest>,
    pub geometry: GeometryEstimate,
}

/// Runs normalize → estimate → extract → classify → assemble
pub struct Pipeline {
    config: ScanConfig,
    observers: Vec<Arc<dyn StageObserver>>,
}

impl Pipeline {
    pub fn new(config: ScanConfig) -> Self {
        Self {
            config,
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub fn with_observer(mut self, observer: Arc<dyn StageObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Save intermediate images under `output_dir`, which must be empty
    pub fn with_debug(self, output_dir: PathBuf) -> Result<Self> {
        let observer = DebugDirObserver::new(output_dir)?;
        Ok(self.with_observer(Arc::new(observer)))
    }

    fn notify(&self, stage: Stage, image: impl FnOnce() -> DynamicImage) {
        if self.observers.is_empty() {
            return;
        }
        let image = image();
        for observer in &self.observers {
            if let Err(e) = observer.observe(stage, &image) {
                warn!(stage = stage.name(), error = %e, "stage observer failed");
            }
        }
    }

    /// Everything up to, but not including, classification
    pub fn extract_regions(&self, input: &DynamicImage) -> Result<Extraction> {
        self.config.validate()?;
        self.notify(Stage::Input, || input.clone());

        let normalized = ImageNormalizer::new(self.config.normalize.clone()).normalize(input)?;
        self.notify(Stage::Normalized, || {
            DynamicImage::ImageRgb8(normalized.display.clone())
        });

        let estimator = GridGeometryEstimator::new(self.config.geometry.clone());
        let geometry = if self.config.geometry.enabled {
            let mask = estimator.grid_mask(&normalized.gray);
            self.notify(Stage::GridMask, || DynamicImage::ImageLuma8(mask.clone()));
            estimator.estimate_from_mask(
                &mask,
                GridGeometry::nominal(normalized.width(), normalized.height()),
            )
        } else {
            estimator.estimate(&normalized)
        };

        let extractor = CellExtractor::new(self.config.cells.clone());
        let mask = extractor.digit_mask(&normalized.gray);
        self.notify(Stage::DigitMask, || DynamicImage::ImageLuma8(mask.clone()));
        let regions = extractor.extract_from_mask(&normalized, &mask, &geometry.geometry);

        self.notify(Stage::Regions, || {
            let mut canvas = normalized.display.clone();
            for region in &regions {
                let b = region.blob;
                let rect = Rect::at(b.min_x as i32, b.min_y as i32).of_size(b.width(), b.height());
                draw_hollow_rect_mut(&mut canvas, rect, Rgb([0, 255, 0]));
            }
            DynamicImage::ImageRgb8(canvas)
        });
        for region in &regions {
            self.notify(Stage::Crop, || DynamicImage::ImageLuma8(region.image.clone()));
        }

        Ok(Extraction {
            normalized,
            geometry,
            regions,
        })
    }

    /// Scan one photograph into a grid
    pub fn run(&self, input: &DynamicImage, references: &ReferenceDigitSet) -> Result<ScanOutput> {
        let extraction = self.extract_regions(input)?;

        let classifier = DigitClassifier::new(references);
        let regions = classifier.classify_regions(extraction.regions)?;
        let grid = assembly::assemble(&regions, self.config.assembly.collision)?;

        info!(
            regions = regions.len(),
            filled = grid.filled(),
            cell_width = extraction.geometry.geometry.cell_width,
            cell_height = extraction.geometry.geometry.cell_height,
            "scan complete"
        );

        Ok(ScanOutput {
            grid,
            regions,
            geometry: extraction.geometry,
        })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// Decode an image file
pub fn load_image(path: &Path) -> Result<DynamicImage> {
    ImageReader::open(path)
        .map_err(|e| ScanError::io(path, e))?
        .decode()
        .map_err(|source| ScanError::ImageLoad {
            path: path.to_path_buf(),
            source,
        })
}

/// Load references per `config` and scan the image at `path`
pub fn scan_file(path: &Path, config: ScanConfig) -> Result<ScanOutput> {
    let input = load_image(path)?;
    let references = ReferenceDigitSet::load(&config.references)?;
    Pipeline::new(config).run(&input, &references)
}

/// Extract regions from a known-good sheet and store them as references
pub fn generate_references(path: &Path, config: &ScanConfig) -> Result<Vec<PathBuf>> {
    let input = load_image(path)?;
    let extraction = Pipeline::new(config.clone()).extract_regions(&input)?;
    let references = ReferenceDigitSet::from_regions(&extraction.regions)?;
    references.write_to_dir(&config.references)
}
