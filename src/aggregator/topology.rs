//! Structural comparison of call trees, ignoring timing.
//!
//! Two trees have the same topology when their roots share name and type and
//! their children, each sorted independently into canonical order, are
//! pairwise equal with the same arity. Canonical order is the total order
//! `(name, type, canonically ordered children)`; it is used for comparison
//! and alignment only, never for the stored child order.

use crate::aggregator::merge::AggregateCallPathNode;
use crate::calltree::{CallPathNode, NodeType};
use std::cmp::Ordering;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Anything shaped like a call tree
pub trait Topology: Sized {
    fn topology_name(&self) -> &str;
    fn topology_type(&self) -> &NodeType;
    fn topology_children(&self) -> &[Self];
}

impl Topology for CallPathNode {
    fn topology_name(&self) -> &str {
        self.name()
    }

    fn topology_type(&self) -> &NodeType {
        self.node_type()
    }

    fn topology_children(&self) -> &[Self] {
        self.children()
    }
}

impl Topology for AggregateCallPathNode {
    fn topology_name(&self) -> &str {
        self.name()
    }

    fn topology_type(&self) -> &NodeType {
        self.node_type()
    }

    fn topology_children(&self) -> &[Self] {
        self.children()
    }
}

/// Total order over tree shapes
pub fn topology_cmp<A: Topology, B: Topology>(a: &A, b: &B) -> Ordering {
    a.topology_name()
        .cmp(b.topology_name())
        .then_with(|| a.topology_type().cmp(b.topology_type()))
        .then_with(|| {
            let left = canonical_children(a);
            let right = canonical_children(b);
            left.iter()
                .zip(&right)
                .map(|(l, r)| topology_cmp(*l, *r))
                .find(|ord| ord.is_ne())
                .unwrap_or_else(|| left.len().cmp(&right.len()))
        })
}

/// True when both trees have the same shape
pub fn topologically_equal<A: Topology, B: Topology>(a: &A, b: &B) -> bool {
    topology_cmp(a, b) == Ordering::Equal
}

/// Strict "sorts before" relation used to canonicalize sibling order
pub fn topology_less<A: Topology, B: Topology>(a: &A, b: &B) -> bool {
    topology_cmp(a, b) == Ordering::Less
}

/// Structural hash, equal for every pair of topologically equal trees
pub fn topology_hash<T: Topology>(node: &T) -> u64 {
    let mut child_hashes: Vec<u64> = node.topology_children().iter().map(topology_hash).collect();
    // Sorting makes the hash independent of sibling order
    child_hashes.sort_unstable();

    let mut hasher = DefaultHasher::new();
    node.topology_name().hash(&mut hasher);
    node.topology_type().hash(&mut hasher);
    child_hashes.hash(&mut hasher);
    hasher.finish()
}

/// Indices of `nodes` in canonical order. The sort is stable, so siblings
/// with identical shapes keep their discovery order.
pub(crate) fn canonical_order<T: Topology>(nodes: &[T]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..nodes.len()).collect();
    order.sort_by(|&x, &y| topology_cmp(&nodes[x], &nodes[y]));
    order
}

/// Children of `node` in canonical order
pub(crate) fn canonical_children<T: Topology>(node: &T) -> Vec<&T> {
    let children = node.topology_children();
    canonical_order(children)
        .into_iter()
        .map(|idx| &children[idx])
        .collect()
}
