//! Lazy depth-first traversal of a call tree.
//!
//! Both iterators visit the root first, then each child's full subtree in
//! `children` order. They borrow the tree and are cheap to create, so every
//! traversal simply starts a fresh one.

use super::node::CallPathNode;
use std::iter::FusedIterator;

/// Pre-order iterator over the nodes of a tree
#[derive(Debug, Clone)]
pub struct TreeIter<'a> {
    stack: Vec<&'a CallPathNode>,
}

impl<'a> TreeIter<'a> {
    pub(crate) fn new(root: &'a CallPathNode) -> Self {
        Self { stack: vec![root] }
    }

    /// Exclusive time of every node, in traversal order
    pub fn exclusive_times(self) -> impl Iterator<Item = f64> + 'a {
        self.map(CallPathNode::exclusive_time)
    }

    /// Inclusive time of every node, in traversal order
    pub fn inclusive_times(self) -> impl Iterator<Item = f64> + 'a {
        self.map(CallPathNode::inclusive_time)
    }
}

impl<'a> Iterator for TreeIter<'a> {
    type Item = &'a CallPathNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        // Reversed so the first child is popped next
        self.stack.extend(node.children().iter().rev());
        Some(node)
    }
}

impl FusedIterator for TreeIter<'_> {}

/// Pre-order iterator yielding each node with its depth (root = 0)
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    stack: Vec<(usize, &'a CallPathNode)>,
}

impl<'a> Walk<'a> {
    pub(crate) fn new(root: &'a CallPathNode) -> Self {
        Self {
            stack: vec![(0, root)],
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = (usize, &'a CallPathNode);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        self.stack
            .extend(node.children().iter().rev().map(|child| (depth + 1, child)));
        Some((depth, node))
    }
}

impl FusedIterator for Walk<'_> {}
