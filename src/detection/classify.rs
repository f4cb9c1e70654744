use image::GrayImage;
use image::imageops::FilterType;
use tracing::trace;

use crate::detection::references::ReferenceDigitSet;
use crate::detection::ssim::structural_similarity;
use crate::error::{Result, ScanError};
use crate::models::RegionOfInterest;

/// Best matching digit and its similarity score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub digit: u8,
    pub score: f64,
}

/// Labels digit crops by structural similarity against a reference set
pub struct DigitClassifier<'a> {
    references: &'a ReferenceDigitSet,
}

impl<'a> DigitClassifier<'a> {
    pub fn new(references: &'a ReferenceDigitSet) -> Self {
        Self { references }
    }

    /// Similarity of `crop` against every reference, in digit order
    pub fn scores(&self, crop: &GrayImage) -> Result<Vec<(u8, f64)>> {
        if crop.width() == 0 || crop.height() == 0 {
            return Err(ScanError::EmptyRegion);
        }

        Ok(self
            .references
            .iter()
            .map(|(digit, reference)| {
                let score = if crop.dimensions() == reference.dimensions() {
                    structural_similarity(crop, reference)
                } else {
                    let resized = image::imageops::resize(
                        crop,
                        reference.width(),
                        reference.height(),
                        FilterType::Triangle,
                    );
                    structural_similarity(&resized, reference)
                };
                (digit, score)
            })
            .collect())
    }

    /// Highest scoring digit; the lowest digit wins a tie
    pub fn classify(&self, crop: &GrayImage) -> Result<Classification> {
        let mut best: Option<Classification> = None;
        for (digit, score) in self.scores(crop)? {
            trace!(digit, score, "reference similarity");
            if best.is_none_or(|b| score > b.score) {
                best = Some(Classification { digit, score });
            }
        }
        best.ok_or(ScanError::InvalidReferenceSet { found: 0 })
    }

    /// Label every region, preserving order
    pub fn classify_regions(&self, regions: Vec<RegionOfInterest>) -> Result<Vec<RegionOfInterest>> {
        regions
            .into_iter()
            .map(|region| {
                let found = self.classify(&region.image)?;
                Ok(region.classified(found.digit))
            })
            .collect()
    }
}
