//! Cellular-automaton track reconstruction for layered cylindrical detectors.
//!
//! Four stages, strictly pipelined: `hits -> CellFormer -> NeighbourLinker ->
//! Evolver -> TrackExtractor`, plus an Evaluator that scores the result
//! against ground truth. See [`driver::run`] for the single entry point.

pub mod cells;
pub mod config;
pub mod driver;
pub mod error;
pub mod evaluator;
pub mod evolver;
pub mod hits;
pub mod neighbours;
pub mod tracks;
pub mod truth;

pub use cells::{Cell, CellFormer, CellTable};
pub use config::PipelineConfig;
pub use driver::{run, Driver};
pub use error::ConfigError;
pub use evaluator::{EvaluationReport, Evaluator, LevelReport};
pub use evolver::Evolver;
pub use hits::{Hit, HitTable};
pub use neighbours::{CellularAutomaton, NeighbourLinker};
pub use tracks::{TrackExtractor, Tracks};
pub use truth::Truth;
