//! Build collapsed stack format from a call tree.
//!
//! Collapsed stacks are the input format for flamegraph generation.
//! Format: "parent;child;grandchild weight"
//!
//! Example: "ProgramRoot;solve;MPI_Allreduce 125000"
//! This means: MPI_Allreduce, called from solve, spent 0.125s outside any
//! child block. Weights are exclusive time in microseconds.

use crate::calltree::CallPathNode;
use crate::utils::config::MICROS_PER_SECOND;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single collapsed stack entry
///
/// **Public** - used by flamegraph generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollapsedStack {
    /// Stack trace as semicolon-separated string
    pub stack: String,

    /// Weight (exclusive microseconds of the last frame)
    pub weight: u64,
}

impl CollapsedStack {
    /// Create a new collapsed stack
    pub fn new(stack: String, weight: u64) -> Self {
        Self { stack, weight }
    }

    /// Format as the standard collapsed stack line
    ///
    /// **Public** - used when passing to inferno
    pub fn to_line(&self) -> String {
        format!("{} {}", self.stack, self.weight)
    }
}

/// Build collapsed stacks from a call tree
///
/// **Public** - main entry point for stack building
///
/// # Returns
/// One stack per distinct name path with non-zero exclusive time, sorted by
/// weight (descending). Distinct call paths that print the same name path
/// are summed.
pub fn build_collapsed_stacks(tree: &CallPathNode) -> Vec<CollapsedStack> {
    let mut stack_map: HashMap<String, u64> = HashMap::new();
    // Frame names of the current path, indexed by depth
    let mut frames: Vec<String> = Vec::new();

    for (depth, node) in tree.walk() {
        frames.truncate(depth);
        frames.push(frame_name(node.name()));

        let weight = to_micros(node.exclusive_time());
        if weight > 0 {
            *stack_map.entry(frames.join(";")).or_insert(0) += weight;
        }
    }

    let mut stacks: Vec<CollapsedStack> = stack_map
        .into_iter()
        .map(|(stack, weight)| CollapsedStack::new(stack, weight))
        .collect();

    stacks.sort_by(|a, b| b.weight.cmp(&a.weight).then_with(|| a.stack.cmp(&b.stack)));

    debug!("Built {} unique collapsed stacks", stacks.len());

    stacks
}

/// `;` separates frames and the last space separates the weight
fn frame_name(name: &str) -> String {
    name.replace(';', ":").replace(char::is_whitespace, "_")
}

fn to_micros(seconds: f64) -> u64 {
    (seconds * MICROS_PER_SECOND).round().max(0.0) as u64
}
