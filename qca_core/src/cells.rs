//! Stage 1 — CellFormer: pair hits on adjacent layers into directed doublets
//! ("cells") using a geometric cone test.

use crate::hits::HitTable;
use nalgebra::Vector3;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// A directed doublet `(inner_hit, outer_hit)` on consecutive layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cell {
    pub inner_hit_id: i64,
    pub outer_hit_id: i64,
    pub inner_pos: Vector3<f64>,
    pub outer_pos: Vector3<f64>,
}

/// Cells indexed by dense `cell_id`, grouped by the layer their inner hit sits on.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CellTable {
    cells: Vec<Cell>,
    /// layer_id -> [begin, end) range of cell_ids whose inner hit lies on that layer.
    /// Partitions `[0, cells.len())` exactly, in formation order.
    layer_ranges: BTreeMap<i64, (usize, usize)>,
}

impl CellTable {
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn cell(&self, cell_id: usize) -> &Cell {
        &self.cells[cell_id]
    }

    pub fn hit_pair(&self, cell_id: usize) -> (i64, i64) {
        let c = &self.cells[cell_id];
        (c.inner_hit_id, c.outer_hit_id)
    }

    pub fn positions(&self, cell_id: usize) -> (Vector3<f64>, Vector3<f64>) {
        let c = &self.cells[cell_id];
        (c.inner_pos, c.outer_pos)
    }

    /// Range of cell_ids whose inner hit lies on `layer_id`, or `None` if the
    /// layer never appeared as an inner layer during formation.
    pub fn layer_range(&self, layer_id: i64) -> Option<(usize, usize)> {
        self.layer_ranges.get(&layer_id).copied()
    }

    pub fn layer_ranges(&self) -> &BTreeMap<i64, (usize, usize)> {
        &self.layer_ranges
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &Cell)> {
        self.cells.iter().enumerate()
    }
}

/// Forms cells from adjacent-layer hit pairs via a cone test.
pub struct CellFormer {
    min_angle: f64,
    /// Count of inner hits rejected for lying at the detector origin
    /// (undefined radial axis); spec §7 DegenerateGeometry.
    degenerate_count: usize,
}

impl CellFormer {
    pub fn new(min_angle: f64) -> Self {
        Self {
            min_angle,
            degenerate_count: 0,
        }
    }

    pub fn degenerate_count(&self) -> usize {
        self.degenerate_count
    }

    /// Cone test from spec §4.1: `d = r . u`, `rho = |r - d*u|`, in-cone iff
    /// `d > 0 && rho < d * tan(min_angle)`. Returns `None` if `p_i` is at the
    /// origin (undefined axis) — the caller is expected to count that as
    /// degenerate geometry, not to treat it as a rejected-but-valid pair.
    fn in_cone(p_i: Vector3<f64>, p_o: Vector3<f64>, min_angle: f64) -> Option<bool> {
        let r_i = p_i.norm();
        if r_i == 0.0 {
            return None;
        }
        let u = p_i / r_i;
        let r = p_o - p_i;
        let d = r.dot(&u);
        if d <= 0.0 {
            return Some(false);
        }
        let rho = (r - u * d).norm();
        Some(rho < d * min_angle.tan())
    }

    /// All cells formed from one inner hit against every outer hit on the
    /// next layer, plus how many were dropped as degenerate. Factored out so
    /// the `parallel` feature can fan this out across inner hits while
    /// keeping the non-parallel path identical in behaviour.
    fn form_from_inner(
        inner: &crate::hits::Hit,
        outer_hits: &[crate::hits::Hit],
        min_angle: f64,
    ) -> (Vec<Cell>, usize) {
        let p_i = inner.position();
        let mut cells = Vec::new();
        let mut degenerate = 0usize;
        for outer in outer_hits {
            let p_o = outer.position();
            match Self::in_cone(p_i, p_o, min_angle) {
                None => {
                    degenerate += 1;
                    debug!(hit_id = inner.hit_id, "dropped: inner hit at origin");
                }
                Some(true) => cells.push(Cell {
                    inner_hit_id: inner.hit_id,
                    outer_hit_id: outer.hit_id,
                    inner_pos: p_i,
                    outer_pos: p_o,
                }),
                Some(false) => {}
            }
        }
        (cells, degenerate)
    }

    /// Enumerate adjacent layer pairs in sorted layer order, forming cells
    /// for every inner/outer hit pair inside the cone.
    #[instrument(skip(self, hits), fields(min_angle = self.min_angle))]
    pub fn form(&mut self, hits: &HitTable) -> CellTable {
        let layers = hits.sorted_layers();
        let mut cells = Vec::new();
        let mut layer_ranges = BTreeMap::new();

        for pair in layers.windows(2) {
            let (inner_layer, outer_layer) = (pair[0], pair[1]);
            let begin = cells.len();
            let outer_hits = hits.layer_hits(outer_layer);

            #[cfg(feature = "parallel")]
            let per_inner: Vec<(Vec<Cell>, usize)> = {
                use rayon::prelude::*;
                hits.layer_hits(inner_layer)
                    .par_iter()
                    .map(|inner| Self::form_from_inner(inner, outer_hits, self.min_angle))
                    .collect()
            };
            #[cfg(not(feature = "parallel"))]
            let per_inner: Vec<(Vec<Cell>, usize)> = hits
                .layer_hits(inner_layer)
                .iter()
                .map(|inner| Self::form_from_inner(inner, outer_hits, self.min_angle))
                .collect();

            // `par_iter().map(...).collect::<Vec<_>>()` preserves input
            // order regardless of thread scheduling, so flattening here
            // keeps cell_id assignment deterministic either way.
            for (found, degenerate) in per_inner {
                self.degenerate_count += degenerate;
                cells.extend(found);
            }

            layer_ranges.insert(inner_layer, (begin, cells.len()));
        }

        tracing::info!(cells = cells.len(), "cell formation complete");
        CellTable {
            cells,
            layer_ranges,
        }
    }
}
