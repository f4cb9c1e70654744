use image::{GrayImage, RgbImage};

/// Axis-aligned pixel extent of a traced contour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Blob {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    /// Area enclosed by the traced border polygon
    pub area: f64,
}

impl Blob {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    pub fn box_area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    /// Crop this blob's bounding box out of `img`, clamped to the image
    pub fn extract_roi(&self, img: &GrayImage) -> Option<GrayImage> {
        if self.min_x >= img.width() || self.min_y >= img.height() {
            return None;
        }
        let width = self.width().min(img.width() - self.min_x);
        let height = self.height().min(img.height() - self.min_y);
        if width == 0 || height == 0 {
            return None;
        }

        Some(image::imageops::crop_imm(img, self.min_x, self.min_y, width, height).to_image())
    }
}

/// The photograph after cropping to the grid frame and resizing to a square
#[derive(Debug, Clone)]
pub struct NormalizedImage {
    pub gray: GrayImage,
    /// Color copy at the same size, used only for visualisation
    pub display: RgbImage,
}

impl NormalizedImage {
    pub fn width(&self) -> u32 {
        self.gray.width()
    }

    pub fn height(&self) -> u32 {
        self.gray.height()
    }
}

/// Pixel size of one grid cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridGeometry {
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridGeometry {
    /// Cell size obtained by dividing the image into nine equal parts
    pub fn nominal(width: u32, height: u32) -> Self {
        Self {
            cell_width: width as f64 / GRID_SIZE as f64,
            cell_height: height as f64 / GRID_SIZE as f64,
        }
    }

    /// Map the top-left pixel of a region to its grid cell.
    ///
    /// Exact halves round to the even index. Returns the cell and whether the
    /// rounded index had to be clamped.
    pub fn locate(&self, x: u32, y: u32) -> (GridPosition, bool) {
        let row = (y as f64 / self.cell_height).round_ties_even();
        let col = (x as f64 / self.cell_width).round_ties_even();
        let clamp = |v: f64| {
            if !v.is_finite() || v < 0.0 {
                (0, true)
            } else if v > (GRID_SIZE - 1) as f64 {
                (GRID_SIZE - 1, true)
            } else {
                (v as usize, false)
            }
        };
        let (row, row_clamped) = clamp(row);
        let (col, col_clamped) = clamp(col);
        (GridPosition { row, col }, row_clamped || col_clamped)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EstimateQuality {
    /// At least one complete row of cells backed the estimate
    Full,
    /// Fewer than nine inner contours; best-effort value
    Degenerate,
    /// Estimation was disabled and the image was split into nine equal parts
    Nominal,
}

/// Outcome of cell size estimation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeometryEstimate {
    pub geometry: GridGeometry,
    pub complete_rows: usize,
    pub quality: EstimateQuality,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    pub row: usize,
    pub col: usize,
}

/// A crop suspected to contain exactly one digit
#[derive(Debug, Clone, PartialEq)]
pub struct RegionOfInterest {
    pub image: GrayImage,
    pub position: GridPosition,
    /// Bounding box in normalized-image coordinates
    pub blob: Blob,
    pub number: Option<u8>,
}

impl RegionOfInterest {
    /// Consume the region and return it labelled with `number`
    pub fn classified(self, number: u8) -> Self {
        Self {
            number: Some(number),
            ..self
        }
    }
}

pub const GRID_SIZE: usize = 9;

/// 9x9 digit matrix, 0 meaning empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PuzzleGrid {
    pub cells: [[u8; GRID_SIZE]; GRID_SIZE],
}

impl PuzzleGrid {
    pub fn get(&self, row: usize, col: usize) -> u8 {
        self.cells[row][col]
    }

    pub fn filled(&self) -> usize {
        self.cells.iter().flatten().filter(|&&v| v != 0).count()
    }

    pub fn rows(&self) -> Vec<Vec<u8>> {
        self.cells.iter().map(|r| r.to_vec()).collect()
    }
}

impl std::fmt::Display for PuzzleGrid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in &self.cells {
            let line: Vec<String> = row.iter().map(|v| v.to_string()).collect();
            writeln!(f, "{}", line.join(" "))?;
        }
        Ok(())
    }
}
