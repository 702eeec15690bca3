//! Analysis report schema.
//!
//! The report is the JSON document written by `treetimer analyze`. It is
//! versioned so downstream tooling can reject files it does not understand.

use crate::aggregator::{AggregatedGroup, HotspotTable, Rank};
use crate::calltree::{CallPathNode, ResidualCorrection, ValidationReport};
use crate::utils::config::SCHEMA_VERSION;
use serde::{Deserialize, Serialize};

/// Full result of analysing one results directory
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Schema version
    pub version: String,

    /// RFC 3339 timestamp
    pub generated_at: String,

    pub run_id: u64,
    pub process_id: u64,

    /// Ranks discovered on disk, including failed ones
    pub rank_count: usize,

    /// One entry per topology group, in first-appearance order
    pub groups: Vec<AggregatedGroup>,

    /// Union of every group's tree; absent when no rank succeeded
    pub grand_total: Option<CallPathNode>,

    pub validation: Vec<RankValidation>,

    /// Ranks that could not be loaded or built; they belong to no group
    #[serde(default)]
    pub failures: Vec<RankFailure>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hotspots: Vec<RankHotspots>,
}

impl AnalysisReport {
    /// Empty report stamped with the current schema version and time
    pub fn new(run_id: u64, process_id: u64) -> Self {
        Self {
            version: SCHEMA_VERSION.to_string(),
            generated_at: chrono::Utc::now().to_rfc3339(),
            run_id,
            process_id,
            rank_count: 0,
            groups: Vec::new(),
            grand_total: None,
            validation: Vec::new(),
            failures: Vec::new(),
            hotspots: Vec::new(),
        }
    }

    /// Number of ranks whose tree was built
    pub fn successful_ranks(&self) -> usize {
        self.groups.iter().map(|g| g.ranks.len()).sum()
    }

    /// Validation entries whose exclusive times do not add up
    pub fn inconsistent_ranks(&self) -> impl Iterator<Item = &RankValidation> {
        self.validation.iter().filter(|v| !v.consistent)
    }
}

/// Per-rank timing sanity check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankValidation {
    pub rank: Rank,
    pub sum_exclusive: f64,
    pub root_inclusive: f64,
    pub non_method_exclusive_sum: f64,

    /// Whether the totals agree within the analysis tolerance
    pub consistent: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub residual_corrections: Vec<ResidualCorrection>,
}

impl RankValidation {
    pub fn new(
        rank: Rank,
        report: &ValidationReport,
        tolerance: f64,
        residual_corrections: Vec<ResidualCorrection>,
    ) -> Self {
        Self {
            rank,
            sum_exclusive: report.sum_exclusive,
            root_inclusive: report.root_inclusive,
            non_method_exclusive_sum: report.non_method_exclusive_sum,
            consistent: report.is_consistent(tolerance),
            residual_corrections,
        }
    }
}

/// A rank that could not be loaded or built
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankFailure {
    pub rank: Rank,
    pub error: String,
}

/// Flat hotspot view of one rank
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankHotspots {
    pub rank: Rank,
    pub table: HotspotTable,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report_is_stamped() {
        let report = AnalysisReport::new(2, 1);

        assert_eq!(report.version, SCHEMA_VERSION);
        assert!(chrono::DateTime::parse_from_rfc3339(&report.generated_at).is_ok());
        assert_eq!(report.successful_ranks(), 0);
    }

    #[test]
    fn test_rank_validation_flags_inconsistency() {
        let totals = ValidationReport {
            sum_exclusive: 10.5,
            root_inclusive: 10.0,
            non_method_exclusive_sum: 1.0,
        };
        let entry = RankValidation::new(4, &totals, 1e-9, Vec::new());

        assert!(!entry.consistent);

        let mut report = AnalysisReport::new(1, 1);
        report.validation.push(entry);
        assert_eq!(report.inconsistent_ranks().count(), 1);
    }

    #[test]
    fn test_optional_sections_default() {
        let json = r#"{
            "version": "1.0.0",
            "generated_at": "2024-01-01T00:00:00+00:00",
            "run_id": 1,
            "process_id": 1,
            "rank_count": 0,
            "groups": [],
            "grand_total": null,
            "validation": []
        }"#;
        let report: AnalysisReport = serde_json::from_str(json).unwrap();

        assert!(report.failures.is_empty());
        assert!(report.hotspots.is_empty());
    }
}
