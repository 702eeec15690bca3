//! Configuration and constants for the CLI and library.

/// Current analysis report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Absolute tolerance when checking that exclusive times add up to walltime
pub const DEFAULT_TOLERANCE: f64 = 1e-9;

// TreeTimer databases key aggregate rows by SQL run/process ids, which are
// not the MPI rank. Almost every database holds a single run and process.
pub const DEFAULT_RUN_ID: u64 = 1;
pub const DEFAULT_PROCESS_ID: u64 = 1;

/// Per-rank dataset files are named `results.<rank>.json`
pub const RESULTS_FILE_PREFIX: &str = "results.";
pub const RESULTS_FILE_SUFFIX: &str = ".json";

/// Type name that marks the program root call path
pub const ROOT_TYPE_NAME: &str = "Program";

/// Type name of plain function blocks (excluded from the non-function breakdown)
pub const METHOD_TYPE_NAME: &str = "Method";

/// Subtrees smaller than this percentage of the root are hidden in text trees
pub const DEFAULT_MIN_PERCENT: f64 = 3.0;

/// Collapsed stack weights are integers, so seconds are scaled to microseconds
pub const MICROS_PER_SECOND: f64 = 1_000_000.0;

/// Upper bound for the `--min-percent` display option
pub const MAX_PRUNE_PERCENT: f64 = 100.0;
