//! gencache CLI
//!
//! Drives the generation cache against a template-based mock backend and
//! inspects persisted learned state.

use anyhow::Result;
use clap::{Parser, Subcommand};
use gencache_core::Category;
use gencache_engine::{FallbackOrchestrator, LearningEngine};
use gencache_telemetry::PersistenceService;
use metrics_exporter_prometheus::PrometheusHandle;
use rand::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

mod config;
mod mock;

use config::AppConfig;
use mock::{sample_prompts, TemplateGenerator};

#[derive(Parser, Debug)]
#[command(name = "gencache")]
#[command(author, version, about = "Approximate generation cache with adaptive fallback")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "gencache.yaml", global = true)]
    config: String,

    /// Snapshot file path (overrides the configuration file)
    #[arg(short, long, global = true)]
    snapshot: Option<PathBuf>,

    /// Never serve from learned patterns
    #[arg(long, global = true)]
    no_adaptive: bool,

    /// Accuracy a category needs before serving from learned patterns
    #[arg(long, global = true)]
    ready_accuracy: Option<f64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Send simulated requests through the cache
    Simulate {
        /// Number of requests to send
        #[arg(short, long, default_value = "40")]
        requests: usize,

        /// Restrict traffic to one category
        #[arg(long, value_parser = parse_category)]
        category: Option<Category>,

        /// Simulated backend latency in milliseconds
        #[arg(long, default_value = "0")]
        latency_ms: u64,

        /// Probability that a backend call fails
        #[arg(long, default_value = "0.0")]
        failure_rate: f64,

        /// Run the optimizer after this many requests
        #[arg(long)]
        optimize_after: Option<usize>,

        /// Print the Prometheus exposition at the end
        #[arg(long)]
        metrics: bool,
    },

    /// Print per-category statistics of the persisted learned state
    Stats,
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse().map_err(|e: gencache_core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose);

    // Load configuration
    let config = AppConfig::load(&cli.config, &cli)?;
    info!(
        "Configuration loaded, snapshot: {:?}",
        config.persistence.snapshot_path
    );

    let persistence = PersistenceService::new(config.persistence.clone())?;
    let engine = Arc::new(LearningEngine::with_persistence(
        config.engine.clone(),
        persistence,
    )?);

    match cli.command {
        Commands::Simulate {
            requests,
            category,
            latency_ms,
            failure_rate,
            optimize_after,
            metrics,
        } => {
            let metrics_handle = init_metrics()?;
            let orchestrator = FallbackOrchestrator::new(engine, config.orchestrator.clone());
            let generator =
                TemplateGenerator::new(Duration::from_millis(latency_ms), failure_rate);

            simulate(&orchestrator, &generator, requests, category, optimize_after).await;

            orchestrator.engine().flush().await;
            println!("{}", serde_json::to_string_pretty(&orchestrator.status())?);

            if metrics {
                println!("{}", metrics_handle.render());
            }
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&engine.stats())?);
            println!("Training history: {} examples", engine.history_len());
        }
    }

    Ok(())
}

async fn simulate(
    orchestrator: &FallbackOrchestrator,
    generator: &TemplateGenerator,
    requests: usize,
    category: Option<Category>,
    optimize_after: Option<usize>,
) {
    info!("Simulating {} requests", requests);

    for i in 0..requests {
        if optimize_after == Some(i) {
            let report = orchestrator.optimize();
            info!("Optimizer report: {:?}", report);
        }

        let (category, input) = {
            let mut rng = rand::thread_rng();
            let category = category.unwrap_or_else(|| {
                *Category::ALL.choose(&mut rng).unwrap_or(&Category::Movie)
            });
            let prompt = sample_prompts(category)
                .choose(&mut rng)
                .copied()
                .unwrap_or_default();
            // Small variations so not every repeat is an exact cache hit
            let input = if rng.gen_bool(0.5) {
                format!("{prompt}, take {}", rng.gen_range(1..4))
            } else {
                prompt.to_string()
            };
            (category, input)
        };

        match orchestrator.generate_with(category, &input, generator).await {
            Ok(output) => {
                let served_by = match output.provenance() {
                    Some(provenance) => format!("cache ({:?})", provenance.source),
                    None => "backend or memo".to_string(),
                };
                info!("[{}] {} -> {}", i + 1, category, served_by);
            }
            Err(e) => warn!("[{}] {} failed: {}", i + 1, category, e),
        }
    }
}

/// Initialize tracing/logging
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("gencache=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("gencache=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Initialize metrics exporter and return handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "gencache_requests_total",
        "Requests answered, by category and source (cache, adaptive, external)"
    );
    metrics::describe_counter!(
        "gencache_failures_total",
        "Requests that failed, by category and kind (external, config)"
    );
    metrics::describe_histogram!(
        "gencache_external_latency_us",
        metrics::Unit::Microseconds,
        "External generator latency in microseconds by category"
    );

    info!("Metrics exporter initialized");
    Ok(handle)
}
