use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::{debug, info};

use tube_vibes::config::resolve_config;
use tube_vibes::orchestrator::{run_dashboard, Selection};
use tube_vibes::AnalysisMode;

/// Tube Vibes - per-category video analytics
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Directory holding the per-category CSV files (overrides config and TUBE_VIBES_DATA_DIR)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Output directory for generated files (default: "out")
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Path to YAML config file (overrides TUBE_VIBES_CONFIG environment variable)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Category to analyse
    #[arg(long, default_value = "entertainment")]
    category: String,

    /// Analysis type: "engagement" or "trends"
    #[arg(short, long, default_value = "engagement")]
    mode: AnalysisMode,

    /// Keyword to search for in titles and descriptions
    #[arg(short, long)]
    search: Option<String>,

    /// Number of entries in each ranking (overrides config)
    #[arg(long)]
    top_n: Option<usize>,

    /// Write chart exports for every available category, not just the selected one
    #[arg(long)]
    export_all: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_thread_ids(false)
        .with_line_number(true)
        .init();

    info!("Starting tube_vibes");

    let args = Args::parse();

    // Config precedence: CLI flag > environment > file > defaults
    let mut cfg = resolve_config(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        debug!("Using data dir from --data-dir argument: {}", dir.display());
        cfg.data_dir = dir;
    }
    if let Some(n) = args.top_n {
        cfg.top_n = n;
    }

    let selection = Selection {
        category: args.category,
        mode: args.mode,
        search: args.search,
        top_n: cfg.top_n,
        word_cloud_limit: cfg.word_cloud_limit,
    };

    let markdown = run_dashboard(&cfg, &selection, &args.output_dir, args.export_all)?;
    println!("{}", markdown);
    Ok(())
}
