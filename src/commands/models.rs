use crate::flamegraph::FlamegraphConfig;
use crate::utils::config::{
    DEFAULT_MIN_PERCENT, DEFAULT_PROCESS_ID, DEFAULT_RUN_ID, DEFAULT_TOLERANCE,
};
use std::path::PathBuf;

/// Arguments for the analyze command
///
/// **Public** - used by main.rs to construct from CLI args
#[derive(Debug, Clone)]
pub struct AnalyzeArgs {
    /// Directory holding `results.<rank>.json` files
    pub results_dir: PathBuf,

    /// Run and process selecting the aggregate rows of every rank
    pub run_id: u64,
    pub process_id: u64,

    /// Output path for the JSON report
    pub output_json: PathBuf,

    /// Directory for per-group SVG flamegraphs (optional)
    pub flamegraph_dir: Option<PathBuf>,

    /// Flamegraph configuration
    pub flamegraph_config: Option<FlamegraphConfig>,

    /// Include per-rank hotspot tables in the report
    pub include_hotspots: bool,

    /// Allowed gap between summed exclusive time and walltime
    pub tolerance: f64,

    /// Print text summary to stdout
    pub print_summary: bool,
}

impl Default for AnalyzeArgs {
    fn default() -> Self {
        Self {
            results_dir: PathBuf::from("."),
            run_id: DEFAULT_RUN_ID,
            process_id: DEFAULT_PROCESS_ID,
            output_json: PathBuf::from("report.json"),
            flamegraph_dir: None,
            flamegraph_config: None,
            include_hotspots: false,
            tolerance: DEFAULT_TOLERANCE,
            print_summary: false,
        }
    }
}

/// Arguments for the tree command
#[derive(Debug, Clone)]
pub struct TreeArgs {
    /// One rank's dataset file
    pub file: PathBuf,

    pub run_id: u64,
    pub process_id: u64,

    /// Hide subtrees below this percentage of walltime
    pub min_percent: f64,
}

impl Default for TreeArgs {
    fn default() -> Self {
        Self {
            file: PathBuf::new(),
            run_id: DEFAULT_RUN_ID,
            process_id: DEFAULT_PROCESS_ID,
            min_percent: DEFAULT_MIN_PERCENT,
        }
    }
}
