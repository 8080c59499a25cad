//! vertex-pipeline - Demo Entry Point
//!
//! Meshes a unit cuboid through the standard operations on the batch mesher
//! and reports what was produced.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use vertex_pipeline::{
    config::RenderConfig,
    mesher::BatchMesher,
    model::Model,
    pipeline::{
        ColourMultiplier, LightMatrixBrightness, OperationRef, OperationRegistry,
        PlanarLightModel, SpriteRegion, SpriteUvTransform, VertexSource, VertexTransform,
    },
    types::Vector3,
};

#[derive(Debug, Parser)]
#[command(name = "vertex-pipeline", version, about = "Mesh a demo cuboid through the vertex pipeline")]
struct Cli {
    /// Config file (defaults to the platform config directory)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Worker thread count
    #[arg(long, value_name = "N")]
    threads: Option<usize>,

    /// Force lighting on
    #[arg(long, conflicts_with = "no_lighting")]
    lighting: bool,

    /// Force lighting off
    #[arg(long)]
    no_lighting: bool,

    /// Colour multiplier as RRGGBBAA hex
    #[arg(long, value_name = "RRGGBBAA", value_parser = parse_rgba, default_value = "E0E0FFFF")]
    tint: u32,

    /// Print the compiled operation order
    #[arg(long)]
    explain: bool,

    /// Print the output vertices as JSON
    #[arg(long)]
    json: bool,
}

fn parse_rgba(value: &str) -> Result<u32, String> {
    let hex = value.trim_start_matches('#').trim_start_matches("0x");
    if hex.len() != 8 {
        return Err(format!("expected 8 hex digits, got '{}'", value));
    }
    u32::from_str_radix(hex, 16).map_err(|e| format!("invalid colour '{}': {}", value, e))
}

fn load_config(cli: &Cli) -> RenderConfig {
    let mut config = match cli.config.clone().or_else(RenderConfig::default_path) {
        Some(path) => RenderConfig::load_or_default(path),
        None => RenderConfig::default(),
    };
    if let Some(threads) = cli.threads {
        config.workers.threads = threads;
    }
    if cli.lighting {
        config.modes.compute_lighting = true;
    }
    if cli.no_lighting {
        config.modes.compute_lighting = false;
    }
    config
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli);

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_filter)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting vertex-pipeline demo");

    let registry = OperationRegistry::shared();
    let model: Arc<dyn VertexSource> = Arc::new(Model::cuboid(
        &registry,
        Vector3::ZERO,
        Vector3::new(1.0, 1.0, 1.0),
    ));

    let operations: Vec<OperationRef> = vec![
        Arc::new(VertexTransform::new(&registry).translate(Vector3::new(8.0, 64.0, 8.0))),
        Arc::new(ColourMultiplier::new(&registry, cli.tint)),
        Arc::new(PlanarLightModel::standard(&registry)),
        Arc::new(SpriteUvTransform::new(
            &registry,
            SpriteRegion::new(0.0, 0.0, 0.0625, 0.0625),
        )),
        Arc::new(LightMatrixBrightness::new(&registry)),
    ];

    let mesher = BatchMesher::new(registry.clone(), config).with_operations(operations);

    if cli.explain {
        let plan = mesher
            .explain(model.clone())
            .context("Failed to build pipeline")?;
        for (position, op) in plan.order.iter().enumerate() {
            println!("{:>2}. {} ({:?})", position, op.name(), op.operation_id());
        }
    }

    let output = mesher.mesh(model).context("Failed to mesh model")?;
    tracing::info!(
        "Meshed {} vertices in {} batches on {} workers",
        output.vertices.len(),
        output.batches,
        output.workers
    );

    if cli.json {
        let json = serde_json::to_string_pretty(&output.vertices)
            .context("Failed to serialize output")?;
        println!("{}", json);
    }

    tracing::info!("Shutting down...");
    Ok(())
}
