//! Synthetic event generation for the demo harness — stands in for the
//! dataset loader the core specification treats as an external collaborator.

use qca_core::{Hit, Truth};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A synthesized event: hits plus the particle assignment each came from.
pub struct SyntheticEvent {
    pub hits: Vec<Hit>,
    pub truth_rows: Vec<(i64, i64)>,
}

impl SyntheticEvent {
    pub fn truth(&self) -> Truth {
        Truth::from_rows(self.truth_rows.clone())
    }
}

/// Build `n_particles` straight radial tracks of `hits_per_particle` hits
/// each (one hit per layer, 1..=hits_per_particle), fanned out at distinct
/// angles so no two tracks coincide, plus `n_background` unattached noise
/// hits scattered across the same layers.
pub fn straight_tracks(
    n_particles: usize,
    hits_per_particle: usize,
    n_background: usize,
    seed: u64,
) -> SyntheticEvent {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut hits = Vec::new();
    let mut truth_rows = Vec::new();
    let mut next_hit_id = 1i64;

    for p in 0..n_particles {
        let particle_id = 1000 + p as i64;
        let phi = (p as f64) * std::f64::consts::TAU / (n_particles.max(1) as f64);
        for layer in 1..=hits_per_particle as i64 {
            let r = 10.0 * layer as f64;
            let hit_id = next_hit_id;
            next_hit_id += 1;
            hits.push(Hit::new(hit_id, layer, r * phi.cos(), r * phi.sin(), 0.0));
            truth_rows.push((hit_id, particle_id));
        }
    }

    for _ in 0..n_background {
        let layer = rng.gen_range(1..=hits_per_particle as i64);
        let r = 10.0 * layer as f64;
        let phi: f64 = rng.gen_range(0.0..std::f64::consts::TAU);
        let hit_id = next_hit_id;
        next_hit_id += 1;
        hits.push(Hit::new(hit_id, layer, r * phi.cos(), r * phi.sin(), 0.0));
        // background hits belong to no reconstructible particle.
        truth_rows.push((hit_id, -1));
    }

    SyntheticEvent { hits, truth_rows }
}
