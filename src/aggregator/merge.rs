//! Elementwise aggregation of topologically identical call trees.
//!
//! An aggregate is seeded from the first tree of a group and extended with
//! every other member. Each node keeps one timing sample per contributing
//! rank. Finalizing sums the samples back into a plain call tree.

use super::grouper::{group_by_topology, RankGroup};
use super::topology::{canonical_children, canonical_order, topologically_equal, topology_cmp};
use crate::calltree::{CallPathNode, NodeType};
use crate::utils::error::AggregateError;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Rank identifier of an independent process
pub type Rank = u32;

/// One rank's timing for one node position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimingSample {
    pub inclusive: f64,
    pub exclusive: f64,
}

impl TimingSample {
    fn of(node: &CallPathNode) -> Self {
        Self {
            inclusive: node.inclusive_time(),
            exclusive: node.exclusive_time(),
        }
    }
}

/// One node position of a group-merged tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateCallPathNode {
    name: String,
    node_type: NodeType,

    /// Index-aligned with `ranks`
    samples: Vec<TimingSample>,
    ranks: Vec<Rank>,

    /// Positionally aligned with the seed tree's children
    children: Vec<AggregateCallPathNode>,
}

impl AggregateCallPathNode {
    /// Start an aggregate from a group's first tree
    pub fn seed(tree: &CallPathNode, rank: Rank) -> Self {
        Self {
            name: tree.name().to_string(),
            node_type: tree.node_type().clone(),
            samples: vec![TimingSample::of(tree)],
            ranks: vec![rank],
            children: tree
                .children()
                .iter()
                .map(|child| Self::seed(child, rank))
                .collect(),
        }
    }

    /// Append another member of the group
    ///
    /// # Errors
    /// * `AggregateError::TopologyMismatch` - `tree` does not have the shape
    ///   this aggregate was seeded with. The aggregate is left untouched.
    pub fn extend(&mut self, tree: &CallPathNode, rank: Rank) -> Result<(), AggregateError> {
        if !topologically_equal(self, tree) {
            let (path, reason) = describe_divergence(self, tree);
            return Err(AggregateError::TopologyMismatch { rank, path, reason });
        }
        self.append(tree, rank);
        Ok(())
    }

    /// Collapse the samples of every node into their sum
    pub fn finalize(&self) -> CallPathNode {
        CallPathNode::new(
            self.name.clone(),
            self.node_type.clone(),
            self.samples.iter().map(|s| s.inclusive).sum(),
            self.samples.iter().map(|s| s.exclusive).sum(),
            self.children.iter().map(Self::finalize).collect(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    pub fn samples(&self) -> &[TimingSample] {
        &self.samples
    }

    pub fn ranks(&self) -> &[Rank] {
        &self.ranks
    }

    pub fn children(&self) -> &[AggregateCallPathNode] {
        &self.children
    }

    /// Mean inclusive time per contributing rank
    pub fn mean_inclusive(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        self.samples.iter().map(|s| s.inclusive).sum::<f64>() / self.samples.len() as f64
    }

    /// Append without checking; `tree` must be topologically equal to `self`.
    /// Children are matched through canonical order so members that
    /// discovered their children in another order still line up.
    fn append(&mut self, tree: &CallPathNode, rank: Rank) {
        self.samples.push(TimingSample::of(tree));
        self.ranks.push(rank);

        let slots = canonical_order(&self.children);
        let incoming = canonical_children(tree);
        for (slot, child) in slots.into_iter().zip(incoming) {
            self.children[slot].append(child, rank);
        }
    }
}

/// Locate the first place where `tree` stops matching `agg`.
/// Only called when the two are known to differ.
fn describe_divergence(agg: &AggregateCallPathNode, tree: &CallPathNode) -> (String, String) {
    let mut path = agg.name().to_string();
    let mut agg = agg;
    let mut tree = tree;

    loop {
        if agg.name() != tree.name() {
            return (path, format!("expected '{}', found '{}'", agg.name(), tree.name()));
        }
        if agg.node_type() != tree.node_type() {
            return (
                path,
                format!("expected type {}, found {}", agg.node_type(), tree.node_type()),
            );
        }

        let expected = canonical_children(agg);
        let found = canonical_children(tree);
        if expected.len() != found.len() {
            return (
                path,
                format!("expected {} children, found {}", expected.len(), found.len()),
            );
        }

        let diverging = expected
            .into_iter()
            .zip(found)
            .find(|(a, t)| topology_cmp(*a, *t) != Ordering::Equal);
        match diverging {
            Some((a, t)) => {
                path.push(';');
                path.push_str(a.name());
                agg = a;
                tree = t;
            }
            None => return (path, "shapes differ".to_string()),
        }
    }
}

/// Finalized tree of one topology group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedGroup {
    /// Ranks in the group, in input order
    pub ranks: Vec<Rank>,

    /// Elementwise sum of the members' trees
    pub tree: CallPathNode,
}

/// Merge every member of a group into one aggregate
pub fn aggregate_group(group: &RankGroup) -> Result<AggregateCallPathNode, AggregateError> {
    let mut aggregate =
        AggregateCallPathNode::seed(group.representative(), group.representative_rank());
    for (rank, tree) in group.others() {
        aggregate.extend(tree, *rank)?;
    }
    Ok(aggregate)
}

/// Group trees by topology and sum each group elementwise
///
/// **Public** - main entry point for cross-rank aggregation
///
/// # Errors
/// * `AggregateError::TopologyMismatch` - a grouped tree did not match its
///   group; this indicates a grouping bug and must be treated as fatal
pub fn group_and_aggregate(
    trees: Vec<(Rank, CallPathNode)>,
) -> Result<Vec<AggregatedGroup>, AggregateError> {
    let groups = group_by_topology(trees);

    let aggregated = groups
        .iter()
        .map(|group| {
            let aggregate = aggregate_group(group)?;
            debug!(
                "Aggregated group of {} ranks rooted at '{}'",
                group.len(),
                aggregate.name()
            );
            Ok(AggregatedGroup {
                ranks: group.ranks(),
                tree: aggregate.finalize(),
            })
        })
        .collect::<Result<Vec<_>, AggregateError>>()?;

    info!("Aggregated {} topology groups", aggregated.len());
    Ok(aggregated)
}
