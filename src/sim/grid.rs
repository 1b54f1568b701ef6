// Mapping between (x, y) cells and flat buffer offsets

use tracing::warn;

use crate::sim::error::FluidError;

/// Geometry of a square N×N grid with a one-cell boundary ring.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Grid {
    size: usize,
}

impl Grid {
    pub fn new(size: usize) -> Self {
        Grid { size }
    }

    /// The side length N
    pub fn size(&self) -> usize {
        self.size
    }

    /// The number of cells, N²
    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    /// Whether `(x, y)` lies on the grid at all (boundary ring included)
    pub fn contains(&self, x: i64, y: i64) -> bool {
        let n = self.size as i64;
        (0..n).contains(&x) && (0..n).contains(&y)
    }

    /// Checked row-major offset `x + y * N`.
    ///
    /// Returns
    /// - The offset, or `FluidError::OutOfRange` if either axis falls outside `[0, N - 1]`
    pub fn offset(&self, x: i64, y: i64) -> Result<usize, FluidError> {
        if !self.contains(x, y) {
            return Err(FluidError::OutOfRange {
                x,
                y,
                size: self.size,
            });
        }

        Ok(x as usize + y as usize * self.size)
    }

    /// Row-major offset clamped into `[0, N² - 1]`. The clamp applies to the
    /// offset, not to each axis, so an out-of-range x wraps into a
    /// neighbouring row. Any clamping is reported since it means the caller
    /// passed bad coordinates.
    ///
    /// This is the lenient path for callers that must not fail; the forcing
    /// and read accessors on `Fluid` use the checked `offset` instead.
    pub fn clamped_offset(&self, x: i64, y: i64) -> usize {
        let raw = x + y * self.size as i64;
        let max = self.cell_count() as i64 - 1;

        if raw < 0 || raw > max {
            warn!(
                "Offset for cell ({}, {}) clamped into [0, {}] on a {}x{} grid",
                x, y, max, self.size, self.size
            );
        }

        raw.clamp(0, max.max(0)) as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_is_row_major() {
        let grid = Grid::new(8);

        assert_eq!(grid.offset(0, 0), Ok(0));
        assert_eq!(grid.offset(3, 0), Ok(3));
        assert_eq!(grid.offset(0, 1), Ok(8));
        assert_eq!(grid.offset(5, 4), Ok(37));
        assert_eq!(grid.offset(7, 7), Ok(63));
    }

    #[test]
    fn test_offset_rejects_out_of_range() {
        let grid = Grid::new(8);

        for (x, y) in [(-1, 0), (0, -1), (8, 0), (0, 8), (8, 8)] {
            assert_eq!(
                grid.offset(x, y),
                Err(FluidError::OutOfRange { x, y, size: 8 }),
                "({x}, {y}) should be rejected"
            );
        }
    }

    #[test]
    fn test_clamped_offset_stays_in_buffer() {
        let grid = Grid::new(8);

        assert_eq!(grid.clamped_offset(-3, 0), 0);
        assert_eq!(grid.clamped_offset(0, -1), 0);
        assert_eq!(grid.clamped_offset(7, 7), 63);
        assert_eq!(grid.clamped_offset(8, 7), 63);
        assert_eq!(grid.clamped_offset(100, 100), 63);

        // clamping is on the offset, so x = 8 spills onto the next row
        assert_eq!(grid.clamped_offset(8, 2), 24);
    }

    #[test]
    fn test_contains() {
        let grid = Grid::new(4);

        assert!(grid.contains(0, 0));
        assert!(grid.contains(3, 3));
        assert!(!grid.contains(4, 0));
        assert!(!grid.contains(2, -1));
        assert_eq!(grid.cell_count(), 16);
    }
}
