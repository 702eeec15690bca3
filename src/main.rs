//! TreeTimer Studio CLI
//!
//! Builds per-rank call trees from TreeTimer results, groups ranks by call
//! tree topology and writes aggregated reports and flamegraphs.

use anyhow::Result;
use clap::{Parser, Subcommand};
use env_logger::Env;
use std::path::PathBuf;

use treetimer_studio::commands::{
    display_version, execute_analyze, execute_tree, validate_args, validate_report_file,
    AnalyzeArgs, TreeArgs,
};
use treetimer_studio::flamegraph::FlamegraphConfig;
use treetimer_studio::utils::config::{
    DEFAULT_MIN_PERCENT, DEFAULT_PROCESS_ID, DEFAULT_RUN_ID, DEFAULT_TOLERANCE,
};

/// TreeTimer Studio - cross-rank call tree analysis
#[derive(Parser, Debug)]
#[command(name = "treetimer")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze every rank of a results directory
    Analyze {
        /// Directory holding results.<rank>.json files
        #[arg(short, long, env = "TREETIMER_RESULTS_DIR")]
        results_dir: PathBuf,

        /// Run id selecting the aggregate rows
        #[arg(long, default_value_t = DEFAULT_RUN_ID)]
        run_id: u64,

        /// Process id selecting the aggregate rows
        #[arg(long, default_value_t = DEFAULT_PROCESS_ID)]
        process_id: u64,

        /// Output path for JSON report
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,

        /// Directory for SVG flamegraphs (optional)
        #[arg(short, long)]
        flamegraph_dir: Option<PathBuf>,

        /// Flamegraph title
        #[arg(long)]
        title: Option<String>,

        /// Flamegraph width in pixels
        #[arg(long, default_value = "1200")]
        width: usize,

        /// Include per-rank hotspot tables in the report
        #[arg(long)]
        hotspots: bool,

        /// Allowed gap between summed exclusive time and walltime (seconds)
        #[arg(long, default_value_t = DEFAULT_TOLERANCE)]
        tolerance: f64,

        /// Print text summary to stdout
        #[arg(long)]
        summary: bool,
    },

    /// Print one rank's call tree
    Tree {
        /// Path to a results.<rank>.json file
        #[arg(short, long)]
        file: PathBuf,

        #[arg(long, default_value_t = DEFAULT_RUN_ID)]
        run_id: u64,

        #[arg(long, default_value_t = DEFAULT_PROCESS_ID)]
        process_id: u64,

        /// Hide subtrees below this percentage of walltime
        #[arg(long, default_value_t = DEFAULT_MIN_PERCENT)]
        min_percent: f64,
    },

    /// Validate a report JSON file
    Validate {
        /// Path to report JSON file
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Display version information
    Version,
}

fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(log_level)).init();

    match cli.command {
        Commands::Analyze {
            results_dir,
            run_id,
            process_id,
            output,
            flamegraph_dir,
            title,
            width,
            hotspots,
            tolerance,
            summary,
        } => {
            let fg_config = flamegraph_dir.as_ref().map(|_| {
                let config = FlamegraphConfig::new().with_width(width);
                match title {
                    Some(title) => config.with_title(title),
                    None => config,
                }
            });

            let args = AnalyzeArgs {
                results_dir,
                run_id,
                process_id,
                output_json: output,
                flamegraph_dir,
                flamegraph_config: fg_config,
                include_hotspots: hotspots,
                tolerance,
                print_summary: summary,
            };

            // Validate args first
            validate_args(&args)?;

            execute_analyze(args)?;
        }

        Commands::Tree {
            file,
            run_id,
            process_id,
            min_percent,
        } => {
            execute_tree(&TreeArgs {
                file,
                run_id,
                process_id,
                min_percent,
            })?;
        }

        Commands::Validate { file } => {
            validate_report_file(&file)?;
        }

        Commands::Version => {
            display_version();
        }
    }

    Ok(())
}
