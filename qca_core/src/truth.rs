//! Ground-truth table, used only by the Evaluator.

use std::collections::{BTreeMap, HashMap};

/// `hit_id -> particle_id`, one row per hit. Used solely to score
/// reconstruction quality; never consulted by stages 4.1–4.4.
#[derive(Debug, Clone, Default)]
pub struct Truth {
    particle_of: HashMap<i64, i64>,
    /// particle_id -> sorted ascending hit_ids belonging to that particle.
    hits_per_particle: BTreeMap<i64, Vec<i64>>,
}

impl Truth {
    pub fn from_rows(rows: Vec<(i64, i64)>) -> Self {
        let particle_of: HashMap<i64, i64> = rows.iter().copied().collect();
        let mut hits_per_particle: BTreeMap<i64, Vec<i64>> = BTreeMap::new();
        for (hit_id, particle_id) in rows {
            hits_per_particle.entry(particle_id).or_default().push(hit_id);
        }
        for hits in hits_per_particle.values_mut() {
            hits.sort_unstable();
        }
        Self {
            particle_of,
            hits_per_particle,
        }
    }

    pub fn particle_of(&self, hit_id: i64) -> Option<i64> {
        self.particle_of.get(&hit_id).copied()
    }

    /// `track_length (cells) -> sorted hit_id sequences`, one entry per
    /// particle with at least two hits. A particle with H hits spans H-1
    /// cells, so it is filed under key `H - 1`.
    pub fn track_dict(&self) -> BTreeMap<usize, Vec<Vec<i64>>> {
        let mut dict: BTreeMap<usize, Vec<Vec<i64>>> = BTreeMap::new();
        for hits in self.hits_per_particle.values() {
            if hits.len() >= 2 {
                dict.entry(hits.len() - 1).or_default().push(hits.clone());
            }
        }
        dict
    }

    /// spec §4.5 cells-level true_count: sum over particles of (hits-1), clamped at 0.
    pub fn true_cell_count(&self) -> usize {
        self.hits_per_particle
            .values()
            .map(|hits| hits.len().saturating_sub(1))
            .sum()
    }

    /// spec §4.5 neighbours-level true_count: sum over particles of max(hits-2, 0).
    pub fn true_neighbour_count(&self) -> usize {
        self.hits_per_particle
            .values()
            .map(|hits| hits.len().saturating_sub(2))
            .sum()
    }

    /// spec §4.5/§9 tracks-level true_count: particles with >= min_length + 1 hits.
    pub fn true_track_count(&self, min_length: usize) -> usize {
        self.hits_per_particle
            .values()
            .filter(|hits| hits.len() >= min_length + 1)
            .count()
    }
}
