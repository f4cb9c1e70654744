use tracing::warn;

use crate::config::CollisionPolicy;
use crate::error::{Result, ScanError};
use crate::models::{PuzzleGrid, RegionOfInterest};

/// Fold classified regions into a 9x9 grid, leaving unfilled cells at 0.
///
/// Regions without a number are skipped.
pub fn assemble(regions: &[RegionOfInterest], policy: CollisionPolicy) -> Result<PuzzleGrid> {
    let mut grid = PuzzleGrid::default();

    for region in regions {
        let Some(number) = region.number else {
            continue;
        };
        let (row, col) = (region.position.row, region.position.col);
        let current = grid.cells[row][col];

        if current != 0 {
            match policy {
                CollisionPolicy::Reject => {
                    return Err(ScanError::DuplicatePosition {
                        row,
                        col,
                        first: current,
                        second: number,
                    });
                }
                CollisionPolicy::LastWins => {
                    warn!(row, col, first = current, second = number, "grid cell overwritten");
                }
            }
        }
        grid.cells[row][col] = number;
    }

    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Blob, GridPosition};
    use image::GrayImage;

    fn region(row: usize, col: usize, number: Option<u8>) -> RegionOfInterest {
        RegionOfInterest {
            image: GrayImage::new(1, 1),
            position: GridPosition { row, col },
            blob: Blob {
                min_x: 0,
                min_y: 0,
                max_x: 0,
                max_y: 0,
                area: 0.0,
            },
            number,
        }
    }

    #[test]
    fn places_numbers_and_leaves_zeros() {
        let grid = assemble(
            &[region(0, 0, Some(5)), region(8, 3, Some(2)), region(4, 4, None)],
            CollisionPolicy::Reject,
        )
        .unwrap();
        assert_eq!(grid.get(0, 0), 5);
        assert_eq!(grid.get(8, 3), 2);
        assert_eq!(grid.get(4, 4), 0);
        assert_eq!(grid.filled(), 2);
    }

    #[test]
    fn collision_rejected_by_default() {
        let err = assemble(
            &[region(2, 2, Some(1)), region(2, 2, Some(7))],
            CollisionPolicy::default(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ScanError::DuplicatePosition {
                row: 2,
                col: 2,
                first: 1,
                second: 7
            }
        ));
    }

    #[test]
    fn last_write_wins_when_allowed() {
        let grid = assemble(
            &[region(2, 2, Some(1)), region(2, 2, Some(7))],
            CollisionPolicy::LastWins,
        )
        .unwrap();
        assert_eq!(grid.get(2, 2), 7);
    }
}
