//! qca-sim — demo harness for the cellular-automaton track reconstruction
//! pipeline. Synthesizes a small event or loads one from CSV, runs the
//! driver, and prints the evaluation report. This binary sits outside the
//! specified core: it plays the role of the external loader collaborator.

mod loader;
mod scenarios;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use qca_core::{driver, HitTable, PipelineConfig};
use tracing::info;

#[derive(Parser)]
#[command(name = "qca-sim", about = "Run the CA track pipeline against an event")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Cone half-angle (radians) for cell formation.
    #[arg(long, default_value_t = 0.1, global = true)]
    cell_angle: f64,

    /// Continuity angle bound (radians) for neighbour linking.
    #[arg(long, default_value_t = 0.1, global = true)]
    neigh_angle: f64,

    /// Minimum extracted chain length, in cells.
    #[arg(long, default_value_t = 3, global = true)]
    min_track_length: usize,

    /// Output format for the evaluation report.
    #[arg(long, value_enum, default_value_t = OutputFormat::Text, global = true)]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a synthetic event and run the pipeline against it.
    Synth {
        #[arg(long, default_value_t = 5)]
        particles: usize,
        #[arg(long, default_value_t = 6)]
        hits_per_particle: usize,
        #[arg(long, default_value_t = 0)]
        background: usize,
        #[arg(long, default_value_t = 42)]
        seed: u64,
    },
    /// Load hits/truth CSVs and run the pipeline against them.
    Load {
        #[arg(long)]
        hits: std::path::PathBuf,
        #[arg(long)]
        truth: std::path::PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::new(cli.cell_angle, cli.neigh_angle, cli.min_track_length)?;

    let (hits, truth) = match cli.command {
        Command::Synth {
            particles,
            hits_per_particle,
            background,
            seed,
        } => {
            let event = scenarios::straight_tracks(particles, hits_per_particle, background, seed);
            info!(hits = event.hits.len(), "synthesized event");
            let truth = event.truth();
            (HitTable::from_rows(event.hits), truth)
        }
        Command::Load { hits, truth } => {
            let hit_rows = loader::load_hits(&hits)?;
            let truth = loader::load_truth(&truth)?;
            info!(hits = hit_rows.len(), path = %hits.display(), "loaded hits");
            (HitTable::from_rows(hit_rows), truth)
        }
    };

    let result = driver::run(&hits, config);
    info!(
        cells = result.cells().len(),
        tracks = result.tracks().total_chains(),
        degenerate = result.cells_degenerate(),
        "pipeline complete"
    );

    let report = qca_core::Evaluator::evaluate(&result, &truth);
    match cli.format {
        OutputFormat::Text => println!("{report}"),
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report).context("serializing report")?);
        }
    }

    Ok(())
}
