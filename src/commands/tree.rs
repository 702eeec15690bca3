//! Tree command implementation.
//!
//! Prints one rank's call tree as indented text.

use super::models::TreeArgs;
use crate::calltree::{build_tree, validate};
use crate::flamegraph::render_tree_text;
use crate::repository::load_repository;
use crate::utils::config::MAX_PRUNE_PERCENT;
use anyhow::{Context, Result};
use log::info;

/// Execute the tree command
///
/// **Public** - main entry point called from main.rs
pub fn execute_tree(args: &TreeArgs) -> Result<()> {
    validate_tree_args(args)?;

    let text = render_rank_tree(args)?;
    println!("{}", text);
    Ok(())
}

/// Load a rank file and render its call tree
///
/// **Public** - returns the text instead of printing it
pub fn render_rank_tree(args: &TreeArgs) -> Result<String> {
    let repo = load_repository(&args.file, args.run_id, args.process_id)
        .with_context(|| format!("Failed to load {}", args.file.display()))?;
    let tree = build_tree(&repo).context("Failed to build call tree")?;

    let totals = validate(&tree);
    info!(
        "{} nodes, walltime {:.6}s, {:.1}% outside functions",
        tree.node_count(),
        totals.root_inclusive,
        totals.non_method_fraction() * 100.0
    );

    Ok(render_tree_text(&tree, args.min_percent / 100.0))
}

/// Validate tree arguments
pub fn validate_tree_args(args: &TreeArgs) -> Result<()> {
    if args.file.as_os_str().is_empty() {
        anyhow::bail!("Input file cannot be empty");
    }

    if !(0.0..=MAX_PRUNE_PERCENT).contains(&args.min_percent) {
        anyhow::bail!(
            "min-percent must be between 0 and {} (got {})",
            MAX_PRUNE_PERCENT,
            args.min_percent
        );
    }

    Ok(())
}
