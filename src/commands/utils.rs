//! Report validation and version display commands.

use crate::output::read_report;
use crate::utils::config::SCHEMA_VERSION;
use anyhow::{Context, Result};
use std::path::Path;

/// Validate an analysis report JSON file
///
/// Fails when the file cannot be parsed or when any rank failed or did not
/// add up.
pub fn validate_report_file(file_path: &Path) -> Result<()> {
    println!("Validating report: {}", file_path.display());

    let report = read_report(file_path)
        .with_context(|| format!("Failed to read {}", file_path.display()))?;

    println!("✓ Valid report JSON");
    println!("  Version: {}", report.version);
    println!("  Generated: {}", report.generated_at);
    println!("  Ranks: {}", report.rank_count);
    println!("  Topology Groups: {}", report.groups.len());
    println!("  Failed Ranks: {}", report.failures.len());

    let inconsistent: Vec<u32> = report.inconsistent_ranks().map(|v| v.rank).collect();
    println!("  Inconsistent Ranks: {}", inconsistent.len());

    if !report.failures.is_empty() || !inconsistent.is_empty() {
        anyhow::bail!(
            "Report has {} failed and {} inconsistent ranks",
            report.failures.len(),
            inconsistent.len()
        );
    }

    Ok(())
}

/// Display version information
pub fn display_version() {
    println!("TreeTimer Studio v{}", env!("CARGO_PKG_VERSION"));
    println!("Report Schema: v{}", SCHEMA_VERSION);
    println!();
    println!("Cross-rank call tree analysis for TreeTimer profiling results.");
}
