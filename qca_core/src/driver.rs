//! Driver — sequences the four pipeline stages and exposes the aggregate
//! result.

use crate::cells::{CellFormer, CellTable};
use crate::config::PipelineConfig;
use crate::evolver::Evolver;
use crate::hits::HitTable;
use crate::neighbours::{CellularAutomaton, NeighbourLinker};
use crate::tracks::{TrackExtractor, Tracks};
use tracing::instrument;

/// The artefacts produced by one pipeline run: formed cells, the evolved
/// cell graph, and the extracted tracks. Each stage's output is immutable
/// once the next stage has consumed it.
pub struct Driver {
    cells: CellTable,
    cell_automaton: CellularAutomaton,
    tracks: Tracks,
    config: PipelineConfig,
    cells_degenerate: usize,
}

impl Driver {
    pub fn cells(&self) -> &CellTable {
        &self.cells
    }

    pub fn cell_automaton(&self) -> &CellularAutomaton {
        &self.cell_automaton
    }

    pub fn tracks(&self) -> &Tracks {
        &self.tracks
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Number of inner hits dropped by the CellFormer for lying at the
    /// detector origin (spec §7 DegenerateGeometry).
    pub fn cells_degenerate(&self) -> usize {
        self.cells_degenerate
    }
}

/// Run stages 4.1–4.4 in order: `hits -> CellFormer -> NeighbourLinker ->
/// Evolver -> TrackExtractor`.
#[instrument(skip(hits))]
pub fn run(hits: &HitTable, config: PipelineConfig) -> Driver {
    let mut former = CellFormer::new(config.cell_angle);
    let cells = former.form(hits);

    let linker = NeighbourLinker::new(config.neigh_angle);
    let mut cell_automaton = linker.link(&cells);

    Evolver::evolve(&mut cell_automaton);

    let extractor = TrackExtractor::new(config.min_track_length);
    let tracks = extractor.extract(&cell_automaton);

    Driver {
        cells,
        cell_automaton,
        tracks,
        config,
        cells_degenerate: former.degenerate_count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hits::Hit;

    #[test]
    fn empty_hits_produce_empty_everything_scenario_f() {
        let hits = HitTable::from_rows(vec![]);
        let config = PipelineConfig::default();
        let result = run(&hits, config);
        assert!(result.cells().is_empty());
        assert!(result.cell_automaton().is_empty());
        assert_eq!(result.tracks().total_chains(), 0);
    }

    #[test]
    fn driver_runs_end_to_end_on_a_straight_chain() {
        let rows = (1..=5)
            .map(|k| Hit::new(k, k, 10.0 * k as f64, 0.0, 0.0))
            .collect();
        let hits = HitTable::from_rows(rows);
        let config = PipelineConfig::new(0.1, 0.1, 2).unwrap();
        let result = run(&hits, config);
        assert_eq!(result.cells().len(), 4);
        assert_eq!(result.tracks().total_chains(), 1);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::hits::Hit;
    use proptest::prelude::*;

    proptest! {
        /// Property 9 (spec §8): identical input produces identical output.
        #[test]
        fn identical_input_yields_identical_output(
            n_layers in 1usize..10,
            cell_angle in 0.05f64..1.5,
            neigh_angle in 0.05f64..3.0,
            min_track_length in 1usize..5,
        ) {
            let rows: Vec<Hit> = (1..=n_layers as i64)
                .map(|k| Hit::new(k, k, 10.0 * k as f64, 0.0, 0.0))
                .collect();
            let hits_a = HitTable::from_rows(rows.clone());
            let hits_b = HitTable::from_rows(rows);
            let config = PipelineConfig::new(cell_angle, neigh_angle, min_track_length).unwrap();

            let result_a = run(&hits_a, config);
            let result_b = run(&hits_b, config);

            prop_assert_eq!(result_a.cells().len(), result_b.cells().len());
            prop_assert_eq!(result_a.cell_automaton().states(), result_b.cell_automaton().states());
            prop_assert_eq!(result_a.tracks().by_length(), result_b.tracks().by_length());
        }
    }
}
