//! Error types for the CA track-reconstruction pipeline.
//!
//! Config errors are typed and detected at construction time (spec §7); the
//! pipeline stages themselves are total functions and never fail at runtime —
//! degenerate geometry is counted, not raised (see [`crate::cells::CellFormer`]
//! and [`crate::neighbours::NeighbourLinker`]).

use thiserror::Error;

/// Errors surfaced when building a [`crate::config::PipelineConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    #[error("cell_angle must lie in (0, pi/2), got {0}")]
    InvalidCellAngle(f64),

    #[error("neigh_angle must lie in (0, pi), got {0}")]
    InvalidNeighAngle(f64),

    #[error("min_track_length must be >= 1, got {0}")]
    InvalidMinTrackLength(usize),
}
