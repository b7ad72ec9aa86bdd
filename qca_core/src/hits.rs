//! Hit and HitTable — the detector's raw input, read-only after ingestion.

use nalgebra::Vector3;
use serde::Serialize;
use std::collections::BTreeMap;

/// A single detector record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Hit {
    pub hit_id: i64,
    /// Logically ordered radially outward (e.g. `100 * volume + layer`).
    pub layer_id: i64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Hit {
    pub fn new(hit_id: i64, layer_id: i64, x: f64, y: f64, z: f64) -> Self {
        Self {
            hit_id,
            layer_id,
            x,
            y,
            z,
        }
    }

    pub fn position(&self) -> Vector3<f64> {
        Vector3::new(self.x, self.y, self.z)
    }
}

/// Ordered sequence of hits, queryable by layer. Read-only after construction.
///
/// Hits are expected pre-deduplicated per (particle, layer) by the external
/// loader; this type does not itself enforce that invariant.
#[derive(Debug, Clone, Default)]
pub struct HitTable {
    hits: Vec<Hit>,
    /// hit_id -> index into `hits`, for O(1) lookup from a cell's hit_id.
    by_id: BTreeMap<i64, usize>,
    /// layer_id -> contiguous range of indices in `hits` (after sort).
    layer_ranges: BTreeMap<i64, (usize, usize)>,
}

impl HitTable {
    /// Build a table from arbitrary row order, sorting primarily by `layer_id`.
    pub fn from_rows(mut rows: Vec<Hit>) -> Self {
        rows.sort_by_key(|h| h.layer_id);

        let mut layer_ranges = BTreeMap::new();
        let mut start = 0usize;
        for i in 0..=rows.len() {
            let boundary = i == rows.len() || rows[i].layer_id != rows[start].layer_id;
            if boundary && i > start {
                layer_ranges.insert(rows[start].layer_id, (start, i));
                start = i;
            }
        }

        let by_id = rows.iter().enumerate().map(|(i, h)| (h.hit_id, i)).collect();

        Self {
            hits: rows,
            by_id,
            layer_ranges,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    /// Distinct layer_id values, ascending.
    pub fn sorted_layers(&self) -> Vec<i64> {
        self.layer_ranges.keys().copied().collect()
    }

    /// All hits on the given layer, in table order.
    pub fn layer_hits(&self, layer_id: i64) -> &[Hit] {
        match self.layer_ranges.get(&layer_id) {
            Some(&(start, end)) => &self.hits[start..end],
            None => &[],
        }
    }

    pub fn hit(&self, hit_id: i64) -> Option<&Hit> {
        self.by_id.get(&hit_id).map(|&i| &self.hits[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Hit> {
        self.hits.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn h(id: i64, layer: i64) -> Hit {
        Hit::new(id, layer, id as f64, 0.0, 0.0)
    }

    #[test]
    fn groups_by_layer_regardless_of_input_order() {
        let table = HitTable::from_rows(vec![h(3, 2), h(1, 1), h(2, 1), h(4, 2)]);
        assert_eq!(table.sorted_layers(), vec![1, 2]);
        assert_eq!(table.layer_hits(1).len(), 2);
        assert_eq!(table.layer_hits(2).len(), 2);
        assert_eq!(table.layer_hits(99), &[] as &[Hit]);
    }

    #[test]
    fn looks_up_hit_by_id() {
        let table = HitTable::from_rows(vec![h(10, 1)]);
        assert_eq!(table.hit(10).unwrap().layer_id, 1);
        assert!(table.hit(11).is_none());
    }

    #[test]
    fn empty_table_has_no_layers() {
        let table = HitTable::from_rows(vec![]);
        assert!(table.is_empty());
        assert!(table.sorted_layers().is_empty());
    }
}
