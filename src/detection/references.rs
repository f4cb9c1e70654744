use image::GrayImage;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::ReferenceConfig;
use crate::detection::preprocessing;
use crate::error::{Result, ScanError};
use crate::models::{GRID_SIZE, RegionOfInterest};

/// One grayscale example image per digit, index `i` holding digit `i + 1`
#[derive(Debug, Clone)]
pub struct ReferenceDigitSet {
    images: Vec<GrayImage>,
}

impl ReferenceDigitSet {
    pub fn from_images(images: Vec<GrayImage>) -> Result<Self> {
        if images.len() != GRID_SIZE {
            return Err(ScanError::InvalidReferenceSet {
                found: images.len(),
            });
        }
        Ok(Self { images })
    }

    /// Path of the file holding `digit` under `config`
    pub fn path_for(config: &ReferenceConfig, digit: u8) -> PathBuf {
        config
            .directory
            .join(format!("{}.{}", digit, config.extension))
    }

    /// Load `<directory>/1.<ext>` through `<directory>/9.<ext>`
    pub fn load(config: &ReferenceConfig) -> Result<Self> {
        let mut images = Vec::with_capacity(GRID_SIZE);
        for digit in 1..=GRID_SIZE as u8 {
            let path = Self::path_for(config, digit);
            if !path.exists() {
                return Err(ScanError::MissingReferenceDigit { digit, path });
            }
            let img = image::open(&path).map_err(|source| ScanError::ImageLoad {
                path: path.clone(),
                source,
            })?;
            images.push(preprocessing::to_grayscale(&img));
        }
        debug!(directory = %config.directory.display(), "reference digits loaded");
        Self::from_images(images)
    }

    /// Build a set from the regions of a known-good sheet where digit `d`
    /// sits in column `d - 1`. A later region in the same column replaces an
    /// earlier one.
    pub fn from_regions(regions: &[RegionOfInterest]) -> Result<Self> {
        let mut slots: Vec<Option<GrayImage>> = vec![None; GRID_SIZE];
        for region in regions {
            let slot = &mut slots[region.position.col];
            if slot.is_some() {
                warn!(
                    digit = region.position.col + 1,
                    "several regions for one reference digit, keeping the last"
                );
            }
            *slot = Some(region.image.clone());
        }

        let missing: Vec<String> = slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_none())
            .map(|(i, _)| (i + 1).to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ScanError::ReferenceGeneration {
                reason: format!("no region found for digit(s) {}", missing.join(", ")),
            });
        }

        Self::from_images(slots.into_iter().flatten().collect())
    }

    /// Write every digit to `<directory>/<digit>.<ext>`, creating the directory
    pub fn write_to_dir(&self, config: &ReferenceConfig) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&config.directory)
            .map_err(|e| ScanError::io(&config.directory, e))?;

        let mut written = Vec::with_capacity(GRID_SIZE);
        for (digit, img) in self.iter() {
            let path = Self::path_for(config, digit);
            save_gray(img, &path)?;
            written.push(path);
        }
        info!(count = written.len(), directory = %config.directory.display(), "reference digits written");
        Ok(written)
    }

    pub fn get(&self, digit: u8) -> Option<&GrayImage> {
        (digit as usize).checked_sub(1).and_then(|i| self.images.get(i))
    }

    /// `(digit, image)` pairs in ascending digit order
    pub fn iter(&self) -> impl Iterator<Item = (u8, &GrayImage)> + '_ {
        self.images
            .iter()
            .enumerate()
            .map(|(i, img)| (i as u8 + 1, img))
    }
}

fn save_gray(img: &GrayImage, path: &Path) -> Result<()> {
    img.save(path).map_err(|source| ScanError::ImageSave {
        path: path.to_path_buf(),
        source,
    })
}
