//! Immutable grid track

use std::path::Path;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{NoValidSpawnError, TrackLoadError};
use crate::geometry::TrackGeometry;
use crate::layout::TrackLayout;

/// Spawn sampling gives up after this many rejected cells
pub const DEFAULT_SPAWN_ATTEMPTS: usize = 10_000;

/// Direction a freshly spawned car faces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Heading {
    /// Facing increasing columns (0 degrees)
    East,
    /// Facing decreasing columns (180 degrees)
    West,
}

impl Heading {
    pub fn degrees(self) -> f32 {
        match self {
            Heading::East => 0.0,
            Heading::West => 180.0,
        }
    }
}

/// Spawn pose on the grid: a drivable cell with two free cells ahead
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub row: usize,
    pub col: usize,
    pub heading: Heading,
}

/// Static track: drivable/wall grid, start cell and cell geometry
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    cells: Vec<u32>,
    rows: usize,
    cols: usize,
    start_cell: Option<(usize, usize)>,
    geometry: TrackGeometry,
    /// Drivable cells in row-major order, cached for spawn sampling
    drivable: Vec<(usize, usize)>,
}

impl Track {
    /// Build a track from a parsed layout
    pub fn from_layout(layout: &TrackLayout, geometry: TrackGeometry) -> Result<Self, TrackLoadError> {
        let (rows, cols) = layout.validate()?;

        let cells: Vec<u32> = layout.layout.iter().flatten().copied().collect();
        let drivable = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| (row, col)))
            .filter(|&(row, col)| cells[row * cols + col] > 0)
            .collect();

        Ok(Self {
            cells,
            rows,
            cols,
            start_cell: layout.start_pos.map(|[row, col]| (row, col)),
            geometry,
            drivable,
        })
    }

    /// Parse the JSON layout format
    pub fn from_json(source: &str, geometry: TrackGeometry) -> Result<Self, TrackLoadError> {
        let layout = TrackLayout::from_json(source)?;
        Self::from_layout(&layout, geometry)
    }

    /// Load a JSON layout file
    pub fn load(path: impl AsRef<Path>, geometry: TrackGeometry) -> Result<Self, TrackLoadError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| TrackLoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let track = Self::from_json(&source, geometry)?;
        log::info!(
            "Loaded track {:?}: {}x{} cells, start {:?}",
            path,
            track.rows,
            track.cols,
            track.start_cell
        );
        Ok(track)
    }

    /// Serializable layout that reproduces this track exactly
    pub fn to_layout(&self) -> TrackLayout {
        let layout = self.cells.chunks(self.cols).map(<[u32]>::to_vec).collect();
        TrackLayout::new(layout, self.start_cell.map(|(row, col)| [row, col]))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        self.to_layout().to_json()
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn start_cell(&self) -> Option<(usize, usize)> {
        self.start_cell
    }

    pub fn geometry(&self) -> &TrackGeometry {
        &self.geometry
    }

    /// Raw cell value, `None` out of bounds
    pub fn cell(&self, row: i64, col: i64) -> Option<u32> {
        if row < 0 || col < 0 {
            return None;
        }
        let (row, col) = (row as usize, col as usize);
        if row >= self.rows || col >= self.cols {
            return None;
        }
        Some(self.cells[row * self.cols + col])
    }

    /// Out-of-bounds cells count as walls
    pub fn is_wall(&self, row: i64, col: i64) -> bool {
        self.cell(row, col).map_or(true, |value| value == 0)
    }

    fn is_drivable(&self, row: usize, col: usize) -> bool {
        !self.is_wall(row as i64, col as i64)
    }

    pub fn drivable_cells(&self) -> &[(usize, usize)] {
        &self.drivable
    }

    /// World-space center of a cell
    pub fn grid_to_world(&self, row: usize, col: usize) -> Vec2 {
        self.geometry.cell_center(row, col)
    }

    /// Grid `(row, col)` of a world position, unchecked
    pub fn world_to_grid(&self, position: Vec2) -> (i64, i64) {
        self.geometry.cell_at(position)
    }

    /// Whether a world position falls on a wall or off the grid
    pub fn is_wall_at(&self, position: Vec2) -> bool {
        let (row, col) = self.world_to_grid(position);
        self.is_wall(row, col)
    }

    /// Spawn heading for a cell, if it has two drivable cells straight ahead.
    ///
    /// Facing east is preferred over facing west.
    pub fn spawn_heading(&self, row: usize, col: usize) -> Option<Heading> {
        if col + 2 < self.cols && self.is_drivable(row, col + 1) && self.is_drivable(row, col + 2)
        {
            Some(Heading::East)
        } else if col >= 2 && self.is_drivable(row, col - 1) && self.is_drivable(row, col - 2) {
            Some(Heading::West)
        } else {
            None
        }
    }

    /// Sample drivable cells uniformly until one has a straight corridor.
    ///
    /// Fails after `max_attempts` rejected samples, or immediately when the
    /// grid has no drivable cell at all.
    pub fn pick_random_spawn<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        max_attempts: usize,
    ) -> Result<Spawn, NoValidSpawnError> {
        if self.drivable.is_empty() {
            return Err(NoValidSpawnError { attempts: 0 });
        }

        for _ in 0..max_attempts {
            let (row, col) = self.drivable[rng.random_range(0..self.drivable.len())];
            if let Some(heading) = self.spawn_heading(row, col) {
                log::debug!("Spawn at ({}, {}) facing {:?}", row, col, heading);
                return Ok(Spawn { row, col, heading });
            }
        }

        Err(NoValidSpawnError {
            attempts: max_attempts,
        })
    }
}
