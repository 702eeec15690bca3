//! Grand-total tree across all topology groups.
//!
//! Groups differ in shape by definition, so they cannot be summed position by
//! position. The grand total is a union instead: children with the same name
//! and type are merged recursively, the rest are carried over as they are.

use crate::calltree::CallPathNode;
use log::debug;

/// Union-merge finalized group trees into one tree
///
/// Returns `None` when there is nothing to merge. The first tree's root
/// name is kept.
pub fn grand_total<'a>(trees: impl IntoIterator<Item = &'a CallPathNode>) -> Option<CallPathNode> {
    let mut trees = trees.into_iter();
    let mut total = trees.next()?.clone();
    let mut merged = 1usize;

    for tree in trees {
        merge_into(&mut total, tree);
        merged += 1;
    }

    debug!(
        "Grand total over {} trees has {} nodes",
        merged,
        total.node_count()
    );
    Some(total)
}

fn merge_into(target: &mut CallPathNode, source: &CallPathNode) {
    target.inclusive_time += source.inclusive_time;
    target.exclusive_time += source.exclusive_time;

    for child in &source.children {
        let existing = target
            .children
            .iter_mut()
            .find(|c| c.name == child.name && c.node_type == child.node_type);
        match existing {
            Some(existing) => merge_into(existing, child),
            None => target.children.push(child.clone()),
        }
    }
}
