//! Stage 2 — NeighbourLinker: connect cells across layer triads with an
//! angular continuity gate, producing the cell graph the Evolver walks.

use crate::cells::CellTable;
use serde::Serialize;
use tracing::{instrument, warn};

/// `cell_id -> { state, inner_neighs }`. `state` starts at 1 for every cell;
/// `inner_neighs(c)` holds the cells on the previous layer that share `c`'s
/// inner hit and pass the continuity angle gate.
///
/// Invariant: for every edge `c -> n`, `n`'s inner hit lies on an earlier
/// layer than `c`'s inner hit — the graph is a DAG whose topological order is
/// the radial layer order, since neighbours are only ever drawn from the
/// previous layer's cell range.
#[derive(Debug, Clone, Serialize)]
pub struct CellularAutomaton {
    states: Vec<i64>,
    inner_neighs: Vec<Vec<usize>>,
}

impl CellularAutomaton {
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn state(&self, cell_id: usize) -> i64 {
        self.states[cell_id]
    }

    pub fn states(&self) -> &[i64] {
        &self.states
    }

    pub fn inner_neighs(&self, cell_id: usize) -> &[usize] {
        &self.inner_neighs[cell_id]
    }

    pub fn all_inner_neighs(&self) -> &[Vec<usize>] {
        &self.inner_neighs
    }

    /// Replace the full state vector (used by the Evolver's sweep, which
    /// commits a shadow copy once a sweep completes).
    pub fn set_states(&mut self, states: Vec<i64>) {
        debug_assert_eq!(states.len(), self.states.len());
        self.states = states;
    }

    fn new(n_cells: usize) -> Self {
        Self {
            states: vec![1; n_cells],
            inner_neighs: vec![Vec::new(); n_cells],
        }
    }
}

/// Links cells whose outer-inner hit pair matches and whose edge vectors
/// stay within `max_angle` of each other.
pub struct NeighbourLinker {
    max_angle: f64,
}

impl NeighbourLinker {
    pub fn new(max_angle: f64) -> Self {
        Self { max_angle }
    }

    /// Angle between two edge vectors, clamped against floating-point drift
    /// before `acos` per spec §4.2.
    fn edge_angle(v_i: nalgebra::Vector3<f64>, v_o: nalgebra::Vector3<f64>) -> Option<f64> {
        let (n_i, n_o) = (v_i.norm(), v_o.norm());
        if n_i == 0.0 || n_o == 0.0 {
            return None;
        }
        let cos_theta = (v_i.dot(&v_o) / (n_i * n_o)).clamp(-1.0, 1.0);
        Some(cos_theta.acos())
    }

    #[instrument(skip(self, cells), fields(max_angle = self.max_angle))]
    pub fn link(&self, cells: &CellTable) -> CellularAutomaton {
        let mut ca = CellularAutomaton::new(cells.len());
        let layers: Vec<i64> = cells.layer_ranges().keys().copied().collect();

        for pair in layers.windows(2) {
            let (inner_layer, outer_layer) = (pair[0], pair[1]);
            let (i_begin, i_end) = cells.layer_range(inner_layer).unwrap();
            let (o_begin, o_end) = cells.layer_range(outer_layer).unwrap();

            let mut triad_edges = 0usize;
            for o_id in o_begin..o_end {
                let o_cell = cells.cell(o_id);
                for i_id in i_begin..i_end {
                    let i_cell = cells.cell(i_id);
                    if i_cell.outer_hit_id != o_cell.inner_hit_id {
                        continue;
                    }
                    let v_i = i_cell.outer_pos - i_cell.inner_pos;
                    let v_o = o_cell.outer_pos - o_cell.inner_pos;
                    match Self::edge_angle(v_i, v_o) {
                        Some(theta) if theta <= self.max_angle => {
                            ca.inner_neighs[o_id].push(i_id);
                            triad_edges += 1;
                        }
                        _ => {}
                    }
                }
            }
            if triad_edges == 0 {
                warn!(inner_layer, outer_layer, "layer triad produced no edges");
            }
        }

        let total_edges: usize = ca.inner_neighs.iter().map(Vec::len).sum();
        tracing::info!(edges = total_edges, "neighbour linking complete");
        ca
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use crate::cells::CellFormer;
    use crate::hits::{Hit, HitTable};
    use proptest::prelude::*;

    fn zigzag_chain(offsets: &[f64]) -> HitTable {
        HitTable::from_rows(
            offsets
                .iter()
                .enumerate()
                .map(|(k, &dy)| Hit::new(k as i64 + 1, k as i64 + 1, 10.0 * (k as f64 + 1.0), dy, 0.0))
                .collect(),
        )
    }

    proptest! {
        /// Property 3 (spec §8): every edge connects a shared hit and stays
        /// within the configured continuity angle.
        #[test]
        fn every_edge_respects_the_continuity_angle(
            offsets in proptest::collection::vec(-5.0f64..5.0, 3..8),
            max_angle in 0.05f64..3.0,
        ) {
            let hits = zigzag_chain(&offsets);
            let cells = CellFormer::new(1.4).form(&hits);
            let ca = NeighbourLinker::new(max_angle).link(&cells);

            for (o_id, neighs) in ca.all_inner_neighs().iter().enumerate() {
                for &i_id in neighs {
                    let o_cell = cells.cell(o_id);
                    let i_cell = cells.cell(i_id);
                    prop_assert_eq!(i_cell.outer_hit_id, o_cell.inner_hit_id);
                    let v_i = i_cell.outer_pos - i_cell.inner_pos;
                    let v_o = o_cell.outer_pos - o_cell.inner_pos;
                    let theta = NeighbourLinker::edge_angle(v_i, v_o).unwrap();
                    prop_assert!(theta <= max_angle + 1e-9);
                }
            }
        }
    }
}
