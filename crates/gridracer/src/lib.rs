//! # Gridracer
//!
//! Cars with distance sensors learn to drive a grid track by neuro-evolution.

pub mod config;
pub mod headless;

// Re-export core modules for convenience
pub use gridracer_core::car;
pub use gridracer_core::track;
pub use gridracer_core::{Population, PopulationConfig};

use anyhow::{Context, Result};

/// Load the configured track, scaling cells to the viewport when one is set
pub fn load_track(config: &config::TrackConfig) -> Result<track::Track> {
    let source = std::fs::read_to_string(&config.path)
        .with_context(|| format!("Failed to read track {}", config.path.display()))?;
    let layout = track::TrackLayout::from_json(&source)
        .with_context(|| format!("Failed to parse track {}", config.path.display()))?;

    let geometry = match config.viewport {
        Some([width, height]) => {
            let (rows, cols) = layout.validate()?;
            track::TrackGeometry::fit_to(width, height, rows, cols, config.geometry.cell_margin)
        }
        None => config.geometry,
    };

    let track = track::Track::from_layout(&layout, geometry)
        .with_context(|| format!("Invalid track {}", config.path.display()))?;
    log::info!(
        "Loaded track {}: {}x{} cells, start {:?}",
        config.path.display(),
        track.rows(),
        track.cols(),
        track.start_cell()
    );
    Ok(track)
}
