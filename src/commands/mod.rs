//! CLI command implementations.
//!
//! Each command is implemented in its own module.
//! Commands orchestrate the various library components to perform user tasks.

pub mod analyze;
pub mod models;
pub mod tree;
pub mod utils;

// Re-export main command functions
pub use analyze::{execute_analyze, validate_args, write_flamegraphs};
pub use models::{AnalyzeArgs, TreeArgs};
pub use tree::{execute_tree, render_rank_tree, validate_tree_args};
pub use utils::{display_version, validate_report_file};
