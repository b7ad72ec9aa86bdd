//! Pipeline configuration.
//!
//! Mirrors the validated-config-struct pattern used throughout the detection
//! stack (`TrackingConfig`, `GhostScoreConfig`): a plain `Default` for quick
//! construction, plus a fallible constructor for callers building the config
//! from untrusted input (a CLI flag, a config file).

use crate::error::ConfigError;

/// The four recognized options from spec §6 (`volume_ids` belongs to the
/// external loader, not the core).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Cone half-angle (radians) used by the `CellFormer`. Must lie in (0, pi/2).
    pub cell_angle: f64,
    /// Continuity angle bound (radians) used by the `NeighbourLinker`. Must lie in (0, pi).
    pub neigh_angle: f64,
    /// Minimum extracted chain length, in cells. Must be >= 1.
    pub min_track_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            cell_angle: 1.0,
            neigh_angle: 1.0,
            min_track_length: 3,
        }
    }
}

impl PipelineConfig {
    /// Build a config, validating every field per spec §6/§7.
    pub fn new(
        cell_angle: f64,
        neigh_angle: f64,
        min_track_length: usize,
    ) -> Result<Self, ConfigError> {
        let cfg = Self {
            cell_angle,
            neigh_angle,
            min_track_length,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.cell_angle > 0.0 && self.cell_angle < std::f64::consts::FRAC_PI_2) {
            return Err(ConfigError::InvalidCellAngle(self.cell_angle));
        }
        if !(self.neigh_angle > 0.0 && self.neigh_angle < std::f64::consts::PI) {
            return Err(ConfigError::InvalidNeighAngle(self.neigh_angle));
        }
        if self.min_track_length < 1 {
            return Err(ConfigError::InvalidMinTrackLength(self.min_track_length));
        }
        Ok(())
    }
}
