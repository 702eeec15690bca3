//! Flat hotspot table and per-type time breakdown.
//!
//! The hotspot table answers "which functions cost the most" regardless of
//! the call path that reached them. It is computed from the raw repository
//! rows, not from the call tree, so the two views never double count and are
//! validated independently.

use crate::calltree::builder::exclusive_time;
use crate::calltree::{CallPathNode, NodeType};
use crate::repository::NodeRepository;
use crate::utils::error::RepositoryError;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// Timing of every call path sharing one name, merged
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotRecord {
    pub name: String,

    /// Type of the first call path seen with this name
    pub node_type: NodeType,

    pub call_count: u64,
    pub min_time: f64,
    pub avg_time: f64,
    pub max_time: f64,
    pub inclusive_time: f64,
    pub exclusive_time: f64,

    /// Exclusive time as a fraction of the run's walltime
    pub exclusive_fraction: f64,
}

/// Hotspot records of one rank, sorted by name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HotspotTable {
    /// Inclusive time of the program root
    pub root_inclusive: f64,
    pub records: Vec<HotspotRecord>,
}

impl HotspotTable {
    /// Sum of exclusive time over all records
    pub fn sum_exclusive(&self) -> f64 {
        self.records.iter().map(|r| r.exclusive_time).sum()
    }

    /// Sum of exclusive time over records that are not plain functions
    pub fn non_method_exclusive_sum(&self) -> f64 {
        self.records
            .iter()
            .filter(|r| r.node_type != NodeType::Method)
            .map(|r| r.exclusive_time)
            .sum()
    }

    /// Records ordered by exclusive time, most expensive first
    pub fn sorted_by_exclusive(&self) -> Vec<&HotspotRecord> {
        let mut sorted: Vec<&HotspotRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| b.exclusive_time.total_cmp(&a.exclusive_time));
        sorted
    }

    /// The `top_n` most expensive records
    pub fn top(&self, top_n: usize) -> Vec<&HotspotRecord> {
        let mut sorted = self.sorted_by_exclusive();
        sorted.truncate(top_n);
        sorted
    }
}

/// Build the flat hotspot table of one rank
///
/// **Public** - main entry point for the hotspot view
///
/// # Algorithm
/// 1. Compute exclusive time of every call path from its own row and its
///    children's rows (negative residuals clamp to zero)
/// 2. Merge call paths with the same name by summing every timing field
/// 3. Express exclusive time as a fraction of the root's inclusive time
pub fn collect_hotspots<R: NodeRepository + ?Sized>(
    repo: &R,
) -> Result<HotspotTable, RepositoryError> {
    let root_inclusive = repo.details(repo.root_key()?)?.inclusive_time();
    let mut merged: BTreeMap<String, HotspotRecord> = BTreeMap::new();

    let keys = repo.call_path_keys();
    debug!("Collecting hotspots from {} call paths", keys.len());

    for key in keys {
        let details = repo.details(key)?;
        let child_keys = repo.child_keys(key)?;
        let inclusive = details.inclusive_time();
        let (exclusive, residual) = exclusive_time(repo, inclusive, &child_keys)?;
        if residual < 0.0 {
            debug!("Hotspot residual {:e}s for '{}' clamped", residual, details.name);
        }

        match merged.entry(details.name.clone()) {
            Entry::Vacant(slot) => {
                slot.insert(HotspotRecord {
                    name: details.name,
                    node_type: details.node_type,
                    call_count: details.call_count,
                    min_time: details.min_time,
                    avg_time: details.avg_time,
                    max_time: details.max_time,
                    inclusive_time: inclusive,
                    exclusive_time: exclusive,
                    exclusive_fraction: 0.0,
                });
            }
            Entry::Occupied(mut slot) => {
                let record = slot.get_mut();
                record.call_count += details.call_count;
                record.min_time += details.min_time;
                record.avg_time += details.avg_time;
                record.max_time += details.max_time;
                record.inclusive_time += inclusive;
                record.exclusive_time += exclusive;
            }
        }
    }

    let records = merged
        .into_values()
        .map(|mut record| {
            record.exclusive_fraction = fraction(record.exclusive_time, root_inclusive);
            record
        })
        .collect();

    Ok(HotspotTable {
        root_inclusive,
        records,
    })
}

/// Exclusive time summed per node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeBreakdown {
    /// Walltime of the run (root inclusive time)
    pub root_time: f64,

    /// Type name -> summed exclusive time
    pub by_type: BTreeMap<String, f64>,
}

impl TypeBreakdown {
    /// Percentage of walltime spent in blocks of `type_name`
    pub fn percentage(&self, type_name: &str) -> Option<f64> {
        self.by_type
            .get(type_name)
            .map(|time| fraction(*time, self.root_time) * 100.0)
    }

    /// Get human-readable summary
    ///
    /// **Public** - for logging and terminal output
    pub fn summary(&self) -> String {
        let parts: Vec<String> = self
            .by_type
            .keys()
            .map(|name| format!("{}: {:.1}%", name, self.percentage(name).unwrap_or(0.0)))
            .collect();
        format!("Walltime: {:.6}s | {}", self.root_time, parts.join(" | "))
    }
}

/// Group a tree's exclusive time by node type
pub fn exclusive_time_by_type(tree: &CallPathNode) -> TypeBreakdown {
    let mut by_type: BTreeMap<String, f64> = BTreeMap::new();
    for node in tree.iter() {
        *by_type.entry(node.node_type().to_string()).or_insert(0.0) += node.exclusive_time();
    }

    TypeBreakdown {
        root_time: tree.inclusive_time(),
        by_type,
    }
}

fn fraction(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole
    } else {
        0.0
    }
}
