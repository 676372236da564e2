//! Grid tracks for gridracer
//!
//! A track is a rectangular grid of cells (0 = wall, anything else is
//! drivable) plus the geometry that maps cells to world coordinates.
//! Tracks are immutable once loaded; loading a new layout builds a new
//! [`Track`] instead of editing the old one.

pub mod error;
pub mod geometry;
pub mod layout;
pub mod track;

pub use error::{NoValidSpawnError, TrackLoadError};
pub use geometry::TrackGeometry;
pub use layout::TrackLayout;
pub use track::{Heading, Spawn, Track, DEFAULT_SPAWN_ATTEMPTS};
