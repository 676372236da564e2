//! Serialized track layout
//!
//! The on-disk format is the JSON record written by the track editor:
//!
//! ```json
//! { "layout": [[0, 1, 1], [0, 1, 0]], "start_pos": [0, 1] }
//! ```

use serde::{Deserialize, Serialize};

use crate::error::TrackLoadError;

/// Raw track layout as stored on disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackLayout {
    /// Rows of cell values, 0 = wall, anything else is drivable
    pub layout: Vec<Vec<u32>>,
    /// Designated start cell as `[row, col]`
    #[serde(default)]
    pub start_pos: Option<[usize; 2]>,
}

impl TrackLayout {
    pub fn new(layout: Vec<Vec<u32>>, start_pos: Option<[usize; 2]>) -> Self {
        Self { layout, start_pos }
    }

    pub fn from_json(source: &str) -> Result<Self, TrackLoadError> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Check shape and start cell, returning `(rows, cols)`
    pub fn validate(&self) -> Result<(usize, usize), TrackLoadError> {
        let rows = self.layout.len();
        let cols = self.layout.first().map_or(0, Vec::len);
        if rows == 0 || cols == 0 {
            return Err(TrackLoadError::Empty);
        }

        for (row, cells) in self.layout.iter().enumerate() {
            if cells.len() != cols {
                return Err(TrackLoadError::Ragged {
                    row,
                    expected: cols,
                    found: cells.len(),
                });
            }
        }

        if let Some([row, col]) = self.start_pos {
            if row >= rows || col >= cols {
                return Err(TrackLoadError::StartOutOfBounds {
                    row,
                    col,
                    rows,
                    cols,
                });
            }
            if self.layout[row][col] == 0 {
                return Err(TrackLoadError::StartOnWall { row, col });
            }
        }

        Ok((rows, cols))
    }
}
