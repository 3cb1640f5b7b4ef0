use anyhow::Result;
use clap::{Parser, Subcommand};
use outagescope::classify::ImpactRanker;
use outagescope::graph::MetricsUpdate;
use outagescope::pipeline::TelemetryUpdate;
use outagescope::{Config, SharedGraph};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(
    name = "outagescope",
    about = "Blast-radius, timeline, and similarity analytics for service incidents",
    version,
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the dependency graph with derived metrics
    Graph {
        /// Config file (TOML); defaults are built in
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Estimate the blast radius of a failure at a root service
    BlastRadius {
        /// Suspected root-cause service
        #[arg(long)]
        root: String,

        /// Override the impacted-service-count weight
        #[arg(long)]
        alpha: Option<f64>,

        /// Override the traffic-volume weight
        #[arg(long)]
        beta: Option<f64>,

        /// Override the criticality weight
        #[arg(long)]
        gamma: Option<f64>,

        /// Override the max-depth weight
        #[arg(long)]
        delta: Option<f64>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Build an incident timeline from a JSON telemetry event log
    Timeline {
        /// Path to a JSON array of raw telemetry events
        #[arg(long)]
        events: PathBuf,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Rank historical incidents by similarity to a current snapshot
    Similar {
        /// Path to a JSON feature snapshot of the current incident
        #[arg(long)]
        snapshot: PathBuf,

        /// Path to the JSON incident history
        #[arg(long)]
        history: PathBuf,

        /// How many matches to return
        #[arg(long)]
        top_n: Option<usize>,

        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Inject a telemetry update and rank root-cause suspects
    Inject {
        /// Service the update belongs to (unknown names are added)
        #[arg(long)]
        service: String,

        #[arg(long, default_value_t = 0.0)]
        error_rate: f64,

        #[arg(long, default_value_t = 0.0)]
        latency: f64,

        #[arg(long, default_value_t = 0.0)]
        cpu: f64,

        #[arg(long, default_value_t = 0)]
        downstream: u32,

        #[arg(long, default_value_t = 0.0)]
        traffic: f64,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Graph { config } => {
            let config = Config::load(config.as_deref());
            let graph = config.build_graph();
            print_json(&graph.view())?;
        }
        Commands::BlastRadius {
            root,
            alpha,
            beta,
            gamma,
            delta,
            config,
        } => {
            let config = Config::load(config.as_deref());
            let graph = config.build_graph();

            let mut weights = config.blast;
            if let Some(alpha) = alpha {
                weights.alpha = alpha;
            }
            if let Some(beta) = beta {
                weights.beta = beta;
            }
            if let Some(gamma) = gamma {
                weights.gamma = gamma;
            }
            if let Some(delta) = delta {
                weights.delta = delta;
            }

            let report = outagescope::estimate_blast_radius(&graph, &root, Some(weights))?;
            print_json(&report)?;
        }
        Commands::Timeline { events, config } => {
            let config = Config::load(config.as_deref());
            let events = load_events(&events)?;
            let timeline = config.correlator().generate_timeline(&events);
            print_json(&timeline)?;
        }
        Commands::Similar {
            snapshot,
            history,
            top_n,
            config,
        } => {
            let config = Config::load(config.as_deref());
            let raw = std::fs::read_to_string(&snapshot)?;
            let current: outagescope::IncidentFeatures = serde_json::from_str(&raw)?;
            let history = outagescope::similarity::load_history(&history)?;
            let top_n = top_n.unwrap_or(config.similarity.top_n);
            let matches = outagescope::find_similar(&current, &history, top_n);
            print_json(&matches)?;
        }
        Commands::Inject {
            service,
            error_rate,
            latency,
            cpu,
            downstream,
            traffic,
            config,
        } => {
            let config = Config::load(config.as_deref());
            let graph = SharedGraph::new(config.build_graph());
            let analysis = outagescope::run_pipeline(
                &graph,
                TelemetryUpdate {
                    service,
                    metrics: MetricsUpdate {
                        error_rate,
                        latency,
                        cpu_usage: cpu,
                        downstream_failures: downstream,
                        traffic_volume: traffic,
                    },
                },
                &ImpactRanker,
            );
            print_json(&analysis)?;
        }
    }

    Ok(())
}

fn load_events(path: &Path) -> Result<Vec<serde_json::Value>> {
    let raw = std::fs::read_to_string(path)?;
    Ok(serde_json::from_str(&raw)?)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
