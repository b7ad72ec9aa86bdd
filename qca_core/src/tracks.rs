//! Stage 4 — TrackExtractor: enumerate maximal chains by recursive descent
//! through inner neighbours, carving the graph as longer chains are claimed.

use crate::cells::CellTable;
use crate::neighbours::CellularAutomaton;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::instrument;

/// `track_length -> chains of that length`. Each chain is `[c_1, …, c_L]`
/// with `c_1` outermost, `c_{i+1} ∈ inner_neighs(c_i)` (pre-carving).
#[derive(Debug, Clone, Default, Serialize)]
pub struct Tracks {
    by_length: BTreeMap<usize, Vec<Vec<usize>>>,
}

impl Tracks {
    pub fn by_length(&self) -> &BTreeMap<usize, Vec<Vec<usize>>> {
        &self.by_length
    }

    pub fn total_chains(&self) -> usize {
        self.by_length.values().map(Vec::len).sum()
    }

    pub fn chains(&self) -> impl Iterator<Item = &Vec<usize>> {
        self.by_length.values().flatten()
    }

    /// Hit view of a chain: `[outer(c_1), inner(c_1), inner(c_2), …,
    /// inner(c_L)]`, the telescoping shared-hit sequence of L+1 distinct
    /// hit_ids (consecutive cells share a hit by construction).
    pub fn hit_view(chain: &[usize], cells: &CellTable) -> Vec<i64> {
        let mut hits = Vec::with_capacity(chain.len() + 1);
        let (first_inner, first_outer) = cells.hit_pair(chain[0]);
        hits.push(first_outer);
        hits.push(first_inner);
        for &c in &chain[1..] {
            let (inner, _outer) = cells.hit_pair(c);
            hits.push(inner);
        }
        hits
    }

    /// Same as [`Self::hit_view`] but sorted ascending, for comparison
    /// against truth tracks.
    pub fn sorted_hit_view(chain: &[usize], cells: &CellTable) -> Vec<i64> {
        let mut hits = Self::hit_view(chain, cells);
        hits.sort_unstable();
        hits
    }
}

/// A mutable working copy of the cell graph: carving removes vertices and
/// purges them from every remaining neighbour list without disturbing the
/// original evolved `CellularAutomaton`.
struct WorkingGraph {
    states: Vec<i64>,
    inner_neighs: Vec<Vec<usize>>,
    removed: Vec<bool>,
}

impl WorkingGraph {
    fn from_ca(ca: &CellularAutomaton) -> Self {
        Self {
            states: ca.states().to_vec(),
            inner_neighs: ca.all_inner_neighs().to_vec(),
            removed: vec![false; ca.len()],
        }
    }

    fn neighs(&self, c: usize) -> &[usize] {
        &self.inner_neighs[c]
    }

    /// Seeds at exactly `state == length`, still present, ascending cell_id.
    fn seeds_at(&self, length: i64) -> Vec<usize> {
        (0..self.states.len())
            .filter(|&c| !self.removed[c] && self.states[c] == length)
            .collect()
    }

    /// Explicit-stack DFS enumerating every path from `seed` inward through
    /// `inner_neighs`, terminating each path at a cell with no (remaining)
    /// inner neighbours. Avoids recursion so pathological chains can't blow
    /// the call stack.
    fn enumerate_paths_from(&self, seed: usize) -> Vec<Vec<usize>> {
        let mut results = Vec::new();
        let mut stack: Vec<(usize, usize)> = vec![(seed, 0)];

        loop {
            let (cell, idx) = *stack.last().unwrap();
            let neighs = self.neighs(cell);
            if neighs.is_empty() {
                results.push(stack.iter().map(|&(c, _)| c).collect());
                stack.pop();
            } else if idx < neighs.len() {
                let child = neighs[idx];
                stack.last_mut().unwrap().1 += 1;
                stack.push((child, 0));
            } else {
                stack.pop();
            }
            if stack.is_empty() {
                break;
            }
        }
        results
    }

    fn carve(&mut self, cell_ids: &HashSet<usize>) {
        for &c in cell_ids {
            self.removed[c] = true;
        }
        for neighs in &mut self.inner_neighs {
            neighs.retain(|n| !cell_ids.contains(n));
        }
    }
}

pub struct TrackExtractor {
    min_length: usize,
}

impl TrackExtractor {
    pub fn new(min_length: usize) -> Self {
        Self { min_length }
    }

    /// Enumerate maximal chains in descending length order, carving each
    /// length bucket's cells out of the graph before moving to the next
    /// (shorter) bucket — a greedy longest-track-first policy, per spec §4.4.
    #[instrument(skip(self, ca))]
    pub fn extract(&self, ca: &CellularAutomaton) -> Tracks {
        let mut graph = WorkingGraph::from_ca(ca);
        let mut tracks = Tracks::default();

        let s_max = ca.states().iter().copied().max().unwrap_or(0);
        if (s_max as usize) < self.min_length {
            return tracks;
        }

        for length in (self.min_length as i64..=s_max).rev() {
            let seeds = graph.seeds_at(length);
            let mut surviving = Vec::new();
            let mut used = HashSet::new();

            for seed in seeds {
                for path in graph.enumerate_paths_from(seed) {
                    if path.len() >= length as usize {
                        used.extend(path.iter().copied());
                        surviving.push(path);
                    }
                }
            }

            if !surviving.is_empty() {
                graph.carve(&used);
                tracing::info!(length, count = surviving.len(), "tracks extracted");
                tracks.by_length.insert(length as usize, surviving);
            }
        }

        tracks
    }
}
