//! Flattening and sanity checks over a built call tree.

use super::node::{CallPathNode, NodeType};
use serde::{Deserialize, Serialize};

/// One row of a flattened call tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRecord {
    /// Nesting depth, the root is 0
    pub depth: usize,
    pub name: String,
    pub node_type: NodeType,
    pub inclusive_time: f64,
    pub exclusive_time: f64,
}

/// Flatten a tree into pre-order rows for tabular export
pub fn flatten(tree: &CallPathNode) -> Vec<FlatRecord> {
    tree.walk()
        .map(|(depth, node)| FlatRecord {
            depth,
            name: node.name().to_string(),
            node_type: node.node_type().clone(),
            inclusive_time: node.inclusive_time(),
            exclusive_time: node.exclusive_time(),
        })
        .collect()
}

/// Totals used to check that all walltime is attributed somewhere
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Sum of exclusive time over every node
    pub sum_exclusive: f64,

    /// Inclusive time of the root (the run's walltime)
    pub root_inclusive: f64,

    /// Sum of exclusive time over nodes that are not plain functions
    pub non_method_exclusive_sum: f64,
}

impl ValidationReport {
    /// `sum_exclusive - root_inclusive`; positive when clamps added time
    pub fn discrepancy(&self) -> f64 {
        self.sum_exclusive - self.root_inclusive
    }

    /// True when exclusive times add up to walltime within `tolerance`
    pub fn is_consistent(&self, tolerance: f64) -> bool {
        self.discrepancy().abs() <= tolerance
    }

    /// Share of walltime spent outside plain function bodies
    pub fn non_method_fraction(&self) -> f64 {
        if self.root_inclusive > 0.0 {
            self.non_method_exclusive_sum / self.root_inclusive
        } else {
            0.0
        }
    }
}

/// Compute the validation totals of a tree
pub fn validate(tree: &CallPathNode) -> ValidationReport {
    let mut sum_exclusive = 0.0;
    let mut non_method_exclusive_sum = 0.0;

    for node in tree.iter() {
        sum_exclusive += node.exclusive_time();
        if *node.node_type() != NodeType::Method {
            non_method_exclusive_sum += node.exclusive_time();
        }
    }

    ValidationReport {
        sum_exclusive,
        root_inclusive: tree.inclusive_time(),
        non_method_exclusive_sum,
    }
}
