//! CSV ingestion — the external loader collaborator from spec §1/§6. Reads
//! already-finalised Hits/Truth tables; no event selection, pT cuts, or
//! volume remapping happen here (that pre-filtering is itself out of the
//! core's scope and is not reproduced by this thin demo harness).

use anyhow::{Context, Result};
use qca_core::{Hit, Truth};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct HitRow {
    hit_id: i64,
    layer_id: i64,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Debug, Deserialize)]
struct TruthRow {
    hit_id: i64,
    particle_id: i64,
}

pub fn load_hits(path: impl AsRef<Path>) -> Result<Vec<Hit>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening hits csv at {}", path.display()))?;
    let mut hits = Vec::new();
    for record in reader.deserialize() {
        let row: HitRow = record.with_context(|| format!("parsing row in {}", path.display()))?;
        hits.push(Hit::new(row.hit_id, row.layer_id, row.x, row.y, row.z));
    }
    Ok(hits)
}

pub fn load_truth(path: impl AsRef<Path>) -> Result<Truth> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("opening truth csv at {}", path.display()))?;
    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: TruthRow = record.with_context(|| format!("parsing row in {}", path.display()))?;
        rows.push((row.hit_id, row.particle_id));
    }
    Ok(Truth::from_rows(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_hits_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hit_id,layer_id,x,y,z").unwrap();
        writeln!(file, "1,1,10.0,0.0,0.0").unwrap();
        writeln!(file, "2,2,20.0,0.0,0.0").unwrap();
        let hits = load_hits(file.path()).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].hit_id, 1);
    }

    #[test]
    fn loads_truth_csv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "hit_id,particle_id").unwrap();
        writeln!(file, "1,100").unwrap();
        let truth = load_truth(file.path()).unwrap();
        assert_eq!(truth.particle_of(1), Some(100));
    }
}
