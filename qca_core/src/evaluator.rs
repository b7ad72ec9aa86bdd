//! Stage 5 — Evaluator: compare reconstruction against truth, reporting
//! efficiency/purity at the cells, neighbours, and tracks level.

use crate::cells::CellTable;
use crate::driver::Driver;
use crate::neighbours::CellularAutomaton;
use crate::tracks::Tracks;
use crate::truth::Truth;
use serde::Serialize;
use std::collections::HashSet;
use tracing::instrument;

/// `true_count`, `rec_count`, `true_rec_count` for one evaluation level, plus
/// the derived ratios. A zero denominator reports as `None` ("not
/// available") rather than propagating a division error, per spec §4.5/§7.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LevelReport {
    pub true_count: usize,
    pub rec_count: usize,
    pub true_rec_count: usize,
}

impl LevelReport {
    pub fn efficiency(&self) -> Option<f64> {
        if self.true_count == 0 {
            None
        } else {
            Some(self.true_rec_count as f64 / self.true_count as f64)
        }
    }

    pub fn purity(&self) -> Option<f64> {
        if self.rec_count == 0 {
            None
        } else {
            Some(self.true_rec_count as f64 / self.rec_count as f64)
        }
    }
}

/// The three per-level reports produced by one evaluation run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub cells: LevelReport,
    pub neighbours: LevelReport,
    pub tracks: LevelReport,
}

impl std::fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        fn ratio(r: Option<f64>) -> String {
            r.map(|v| format!("{v:.4}")).unwrap_or_else(|| "n/a".to_string())
        }
        writeln!(
            f,
            "cells:      efficiency={} purity={} ({}/{} true, {} reconstructed)",
            ratio(self.cells.efficiency()),
            ratio(self.cells.purity()),
            self.cells.true_rec_count,
            self.cells.true_count,
            self.cells.rec_count
        )?;
        writeln!(
            f,
            "neighbours: efficiency={} purity={} ({}/{} true, {} reconstructed)",
            ratio(self.neighbours.efficiency()),
            ratio(self.neighbours.purity()),
            self.neighbours.true_rec_count,
            self.neighbours.true_count,
            self.neighbours.rec_count
        )?;
        write!(
            f,
            "tracks:     efficiency={} purity={} ({}/{} true, {} reconstructed)",
            ratio(self.tracks.efficiency()),
            ratio(self.tracks.purity()),
            self.tracks.true_rec_count,
            self.tracks.true_count,
            self.tracks.rec_count
        )
    }
}

pub struct Evaluator;

impl Evaluator {
    #[instrument(skip(driver, truth))]
    pub fn evaluate(driver: &Driver, truth: &Truth) -> EvaluationReport {
        let cells = Self::evaluate_cells(driver.cells(), truth);
        let neighbours = Self::evaluate_neighbours(driver.cells(), driver.cell_automaton(), truth);
        let tracks = Self::evaluate_tracks(
            driver.cells(),
            driver.tracks(),
            truth,
            driver.config().min_track_length,
        );
        EvaluationReport {
            cells,
            neighbours,
            tracks,
        }
    }

    fn evaluate_cells(cells: &CellTable, truth: &Truth) -> LevelReport {
        let mut true_rec_count = 0;
        for (cell_id, _) in cells.iter() {
            let (inner, outer) = cells.hit_pair(cell_id);
            if let (Some(pi), Some(po)) = (truth.particle_of(inner), truth.particle_of(outer)) {
                if pi == po {
                    true_rec_count += 1;
                }
            }
        }
        LevelReport {
            true_count: truth.true_cell_count(),
            rec_count: cells.len(),
            true_rec_count,
        }
    }

    fn evaluate_neighbours(
        cells: &CellTable,
        ca: &CellularAutomaton,
        truth: &Truth,
    ) -> LevelReport {
        let mut rec_count = 0;
        let mut true_rec_count = 0;

        for (outer_id, neighs) in ca.all_inner_neighs().iter().enumerate() {
            for &inner_id in neighs {
                rec_count += 1;
                let (i_inner, i_outer) = cells.hit_pair(inner_id);
                let (_o_inner, o_outer) = cells.hit_pair(outer_id);
                // shared hit: i_outer == o_inner, giving three distinct hits
                // i_inner, i_outer(==o_inner), o_outer.
                let particles = [
                    truth.particle_of(i_inner),
                    truth.particle_of(i_outer),
                    truth.particle_of(o_outer),
                ];
                if let [Some(a), Some(b), Some(c)] = particles {
                    if a == b && b == c {
                        true_rec_count += 1;
                    }
                }
            }
        }

        LevelReport {
            true_count: truth.true_neighbour_count(),
            rec_count,
            true_rec_count,
        }
    }

    fn evaluate_tracks(
        cells: &CellTable,
        tracks: &Tracks,
        truth: &Truth,
        min_track_length: usize,
    ) -> LevelReport {
        let truth_dict = truth.track_dict();
        let mut true_rec_count = 0;

        for (&length, chains) in tracks.by_length() {
            let Some(truth_tracks) = truth_dict.get(&length) else {
                continue;
            };
            let truth_set: HashSet<&Vec<i64>> = truth_tracks.iter().collect();
            for chain in chains {
                let sorted = Tracks::sorted_hit_view(chain, cells);
                if truth_set.contains(&sorted) {
                    true_rec_count += 1;
                }
            }
        }

        LevelReport {
            true_count: truth.true_track_count(min_track_length),
            rec_count: tracks.total_chains(),
            true_rec_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PipelineConfig;
    use crate::driver;
    use crate::hits::{Hit, HitTable};
    use approx::assert_relative_eq;

    #[test]
    fn partial_efficiency_and_purity_compute_correct_ratios() {
        let report = LevelReport {
            true_count: 3,
            rec_count: 4,
            true_rec_count: 2,
        };
        assert_relative_eq!(report.efficiency().unwrap(), 2.0 / 3.0, epsilon = 1e-9);
        assert_relative_eq!(report.purity().unwrap(), 0.5, epsilon = 1e-9);
    }

    fn straight_particle(ids: &[i64], layer_start: i64, x_start: f64) -> Vec<Hit> {
        ids.iter()
            .enumerate()
            .map(|(k, &id)| {
                Hit::new(
                    id,
                    layer_start + k as i64,
                    x_start + 10.0 * k as f64,
                    0.0,
                    0.0,
                )
            })
            .collect()
    }

    #[test]
    fn perfect_two_particle_event_scores_unity_scenario_e() {
        let mut rows = straight_particle(&[1, 2, 3, 4, 5], 1, 0.0);
        rows.extend(straight_particle(&[6, 7, 8, 9, 10], 1, 1000.0));
        let hits = HitTable::from_rows(rows.clone());

        let truth_rows: Vec<(i64, i64)> = [1, 2, 3, 4, 5]
            .iter()
            .map(|&id| (id, 100))
            .chain([6, 7, 8, 9, 10].iter().map(|&id| (id, 200)))
            .collect();
        let truth = Truth::from_rows(truth_rows);

        let config = PipelineConfig::new(0.1, 0.1, 3).unwrap();
        let result = driver::run(&hits, config);
        let report = Evaluator::evaluate(&result, &truth);

        assert_eq!(report.cells.efficiency(), Some(1.0));
        assert_eq!(report.cells.purity(), Some(1.0));
        assert_eq!(report.tracks.efficiency(), Some(1.0));
        assert_eq!(report.tracks.purity(), Some(1.0));
    }

    #[test]
    fn empty_input_reports_not_available_scenario_f() {
        let hits = HitTable::from_rows(vec![]);
        let truth = Truth::from_rows(vec![]);
        let config = PipelineConfig::new(0.1, 0.1, 3).unwrap();
        let result = driver::run(&hits, config);
        let report = Evaluator::evaluate(&result, &truth);

        assert_eq!(report.cells.efficiency(), None);
        assert_eq!(report.cells.purity(), None);
        assert_eq!(report.neighbours.efficiency(), None);
        assert_eq!(report.tracks.efficiency(), None);
    }
}
