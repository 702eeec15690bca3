//! Analyze command implementation.
//!
//! The analyze command:
//! 1. Discovers the per-rank dataset files
//! 2. Builds and validates every rank's call tree
//! 3. Groups ranks by topology and aggregates each group
//! 4. Builds the grand total
//! 5. Writes the JSON report
//! 6. Generates flamegraphs

use super::models::AnalyzeArgs;
use crate::aggregator::{
    build_collapsed_stacks, collect_hotspots, grand_total, group_and_aggregate, HotspotTable, Rank,
};
use crate::calltree::{build_tree_with_corrections, validate, CallPathNode, ResidualCorrection};
use crate::flamegraph::{generate_flamegraph, generate_text_summary, FlamegraphConfig};
use crate::output::{write_report, write_svg, AnalysisReport, RankFailure, RankHotspots, RankValidation};
use crate::repository::{discover_rank_files, load_repository};
use crate::utils::error::FlamegraphError;
use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Everything extracted from one rank's dataset
struct RankOutcome {
    tree: CallPathNode,
    corrections: Vec<ResidualCorrection>,
    hotspots: Option<HotspotTable>,
}

/// Execute the analyze command
///
/// **Public** - main entry point called from main.rs
///
/// A rank that cannot be loaded or built is recorded in the report's
/// failures and skipped. Ranks whose exclusive times do not add up are
/// logged and flagged in the report.
///
/// # Errors
/// * the results directory cannot be listed or holds no rank files
/// * a grouped tree does not match its group during aggregation
/// * report or flamegraph files cannot be written
pub fn execute_analyze(args: AnalyzeArgs) -> Result<AnalysisReport> {
    let start_time = Instant::now();

    info!("Starting analysis of: {}", args.results_dir.display());

    // Step 1: Discover rank files
    info!("Step 1/6: Discovering rank files...");
    let rank_files = discover_rank_files(&args.results_dir)
        .context("Failed to list results directory")?;
    if rank_files.is_empty() {
        anyhow::bail!(
            "No results.<rank>.json files found in {}",
            args.results_dir.display()
        );
    }

    let mut report = AnalysisReport::new(args.run_id, args.process_id);
    report.rank_count = rank_files.len();

    // Step 2: Build and validate per-rank trees
    info!("Step 2/6: Building call trees for {} ranks...", rank_files.len());
    let mut trees: Vec<(Rank, CallPathNode)> = Vec::with_capacity(rank_files.len());

    for (rank, path) in &rank_files {
        match process_rank(&args, path) {
            Ok(outcome) => {
                let totals = validate(&outcome.tree);
                let entry = RankValidation::new(*rank, &totals, args.tolerance, outcome.corrections);
                if !entry.consistent {
                    warn!(
                        "Rank {}: exclusive times sum to {:.9}s but walltime is {:.9}s",
                        rank, entry.sum_exclusive, entry.root_inclusive
                    );
                }
                report.validation.push(entry);

                if let Some(table) = outcome.hotspots {
                    report.hotspots.push(RankHotspots { rank: *rank, table });
                }
                trees.push((*rank, outcome.tree));
            }
            Err(e) => {
                error!("Rank {} skipped: {:#}", rank, e);
                report.failures.push(RankFailure {
                    rank: *rank,
                    error: format!("{:#}", e),
                });
            }
        }
    }

    // Step 3: Group and aggregate
    info!("Step 3/6: Grouping {} trees by topology...", trees.len());
    report.groups = group_and_aggregate(trees).context("Topology aggregation failed")?;

    for (idx, group) in report.groups.iter().enumerate() {
        debug!("  group {}: ranks {:?}", idx, group.ranks);
    }

    // Step 4: Grand total
    info!("Step 4/6: Building grand total...");
    report.grand_total = grand_total(report.groups.iter().map(|g| &g.tree));

    // Step 5: Write report
    info!("Step 5/6: Writing report...");
    write_report(&report, &args.output_json).context("Failed to write analysis report")?;
    info!("✓ Report written to: {}", args.output_json.display());

    // Step 6: Flamegraphs
    match &args.flamegraph_dir {
        Some(dir) => {
            info!("Step 6/6: Generating flamegraphs...");
            let config = args.flamegraph_config.clone().unwrap_or_default();
            write_flamegraphs(&report, dir, &config)?;
        }
        None => info!("Step 6/6: Skipping flamegraph generation (not requested)"),
    }

    if args.print_summary {
        println!("\n{}", "=".repeat(80));
        println!("TREETIMER ANALYSIS");
        println!("{}", "=".repeat(80));
        println!("Results: {}", args.results_dir.display());
        println!("Run/Process: {}/{}", args.run_id, args.process_id);
        println!("\n{}", generate_text_summary(&report));
        println!("{}", "=".repeat(80));
    }

    if !report.failures.is_empty() {
        warn!("{} of {} ranks failed", report.failures.len(), report.rank_count);
    }

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(report)
}

/// Load one rank and build its tree
///
/// **Private** - internal helper for execute_analyze
fn process_rank(args: &AnalyzeArgs, path: &Path) -> Result<RankOutcome> {
    let repo = load_repository(path, args.run_id, args.process_id)
        .with_context(|| format!("Failed to load {}", path.display()))?;

    let (tree, corrections) =
        build_tree_with_corrections(&repo).context("Failed to build call tree")?;

    let hotspots = if args.include_hotspots {
        Some(collect_hotspots(&repo).context("Failed to collect hotspots")?)
    } else {
        None
    };

    Ok(RankOutcome {
        tree,
        corrections,
        hotspots,
    })
}

/// Write `group_<idx>.svg` per group and `total.svg` for the grand total
///
/// Trees without any measurable exclusive time are skipped with a warning.
pub fn write_flamegraphs(
    report: &AnalysisReport,
    dir: &Path,
    config: &FlamegraphConfig,
) -> Result<Vec<PathBuf>> {
    let mut targets: Vec<(String, PathBuf, &CallPathNode)> = report
        .groups
        .iter()
        .enumerate()
        .map(|(idx, group)| {
            (
                format!("{} (group {}, {} ranks)", config.title, idx, group.ranks.len()),
                dir.join(format!("group_{}.svg", idx)),
                &group.tree,
            )
        })
        .collect();
    if let Some(total) = &report.grand_total {
        targets.push((
            format!("{} (all ranks)", config.title),
            dir.join("total.svg"),
            total,
        ));
    }

    let mut written = Vec::new();
    for (title, path, tree) in targets {
        let stacks = build_collapsed_stacks(tree);
        let group_config = config.clone().with_title(title);

        let svg = match generate_flamegraph(&stacks, Some(&group_config)) {
            Ok(svg) => svg,
            Err(FlamegraphError::EmptyStacks) => {
                warn!("No measurable time for {}, skipping", path.display());
                continue;
            }
            Err(e) => return Err(e).context("Failed to generate flamegraph"),
        };

        write_svg(&svg, &path).context("Failed to write flamegraph SVG")?;
        info!("✓ Flamegraph written to: {}", path.display());
        written.push(path);
    }

    Ok(written)
}

/// Validate analyze arguments
///
/// **Public** - can be called before execute_analyze for early validation
pub fn validate_args(args: &AnalyzeArgs) -> Result<()> {
    if args.results_dir.as_os_str().is_empty() {
        anyhow::bail!("Results directory cannot be empty");
    }

    if args.output_json.as_os_str().is_empty() {
        anyhow::bail!("Output path cannot be empty");
    }

    if !args.tolerance.is_finite() || args.tolerance < 0.0 {
        anyhow::bail!("Tolerance must be a finite, non-negative number");
    }

    if let Some(config) = &args.flamegraph_config {
        if config.width == 0 {
            anyhow::bail!("Flamegraph width must be greater than 0");
        }
    }

    Ok(())
}
