//! Cell geometry and grid <-> world conversion

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Size of one grid cell in world units plus the gap between cells.
///
/// Cell `i` along an axis starts at `i * (size + margin) + margin`, so the
/// grid has a leading margin before the first cell. The trailing margin of a
/// cell belongs to that cell when mapping world positions back to the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackGeometry {
    pub cell_width: f32,
    pub cell_height: f32,
    pub cell_margin: f32,
}

impl Default for TrackGeometry {
    fn default() -> Self {
        Self {
            cell_width: 20.0,
            cell_height: 20.0,
            cell_margin: 2.0,
        }
    }
}

impl TrackGeometry {
    pub fn new(cell_width: f32, cell_height: f32, cell_margin: f32) -> Self {
        Self {
            cell_width,
            cell_height,
            cell_margin,
        }
    }

    /// Scale cells so a `rows` x `cols` grid fills a `width` x `height` viewport.
    ///
    /// Cell sizes are whole units (integer division), margins are kept.
    pub fn fit_to(width: u32, height: u32, rows: usize, cols: usize, cell_margin: f32) -> Self {
        let cell_width = (width as usize / cols.max(1)) as f32;
        let cell_height = (height as usize / rows.max(1)) as f32;
        Self {
            cell_width,
            cell_height,
            cell_margin,
        }
    }

    /// Distance between the origins of two neighbouring columns
    pub fn column_pitch(&self) -> f32 {
        self.cell_width + self.cell_margin
    }

    /// Distance between the origins of two neighbouring rows
    pub fn row_pitch(&self) -> f32 {
        self.cell_height + self.cell_margin
    }

    /// World-space center of cell `(row, col)`
    pub fn cell_center(&self, row: usize, col: usize) -> Vec2 {
        Vec2::new(
            col as f32 * self.column_pitch() + self.cell_margin + self.cell_width / 2.0,
            row as f32 * self.row_pitch() + self.cell_margin + self.cell_height / 2.0,
        )
    }

    /// Grid `(row, col)` containing a world position.
    ///
    /// The result is not bounds-checked and goes negative left of / above the
    /// grid.
    pub fn cell_at(&self, position: Vec2) -> (i64, i64) {
        let col = ((position.x - self.cell_margin) / self.column_pitch()).floor() as i64;
        let row = ((position.y - self.cell_margin) / self.row_pitch()).floor() as i64;
        (row, col)
    }

    /// Total world-space extent of a `rows` x `cols` grid, margins included
    pub fn extent(&self, rows: usize, cols: usize) -> Vec2 {
        Vec2::new(
            cols as f32 * self.column_pitch() + self.cell_margin,
            rows as f32 * self.row_pitch() + self.cell_margin,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_geometry() {
        let geometry = TrackGeometry::default();
        assert_eq!(geometry.cell_width, 20.0);
        assert_eq!(geometry.cell_height, 20.0);
        assert_eq!(geometry.cell_margin, 2.0);
        assert_eq!(geometry.column_pitch(), 22.0);
    }

    #[test]
    fn test_cell_center() {
        let geometry = TrackGeometry::default();
        assert_eq!(geometry.cell_center(0, 0), Vec2::new(12.0, 12.0));
        assert_eq!(geometry.cell_center(2, 3), Vec2::new(3.0 * 22.0 + 12.0, 2.0 * 22.0 + 12.0));
    }

    #[test]
    fn test_cell_at_floors_negative_positions() {
        let geometry = TrackGeometry::default();
        assert_eq!(geometry.cell_at(Vec2::new(1.0, 1.0)), (-1, -1));
        assert_eq!(geometry.cell_at(Vec2::new(2.0, 2.0)), (0, 0));
        assert_eq!(geometry.cell_at(Vec2::new(23.9, 23.9)), (0, 0));
        assert_eq!(geometry.cell_at(Vec2::new(24.0, 24.0)), (1, 1));
    }

    #[test]
    fn test_cell_center_round_trip() {
        let geometry = TrackGeometry::new(17.0, 9.0, 3.0);
        for row in 0..12 {
            for col in 0..15 {
                let center = geometry.cell_center(row, col);
                assert_eq!(geometry.cell_at(center), (row as i64, col as i64));
            }
        }
    }

    #[test]
    fn test_fit_to_viewport() {
        let geometry = TrackGeometry::fit_to(1000, 1000, 27, 19, 2.0);
        assert_eq!(geometry.cell_width, 52.0); // 1000 / 19
        assert_eq!(geometry.cell_height, 37.0); // 1000 / 27
        assert_eq!(geometry.cell_margin, 2.0);
    }

    #[test]
    fn test_extent() {
        let geometry = TrackGeometry::default();
        assert_eq!(geometry.extent(3, 4), Vec2::new(4.0 * 22.0 + 2.0, 3.0 * 22.0 + 2.0));
    }
}
