//! Partition ranks into groups that share one call tree topology.
//!
//! Real MPI programs usually produce one to three distinct topologies
//! (boundary ranks often take a different control path), so a greedy scan
//! over existing groups is cheap. Structural hashes narrow the scan to
//! groups that can possibly match; the result is the same as a plain scan.

use super::merge::Rank;
use super::topology::{topologically_equal, topology_hash};
use crate::calltree::CallPathNode;
use log::{debug, info};
use std::collections::HashMap;

/// Ranks whose call trees share one topology
#[derive(Debug, Clone, PartialEq)]
pub struct RankGroup {
    representative_rank: Rank,
    representative: CallPathNode,

    /// Remaining members, in input order
    others: Vec<(Rank, CallPathNode)>,
}

impl RankGroup {
    fn new(rank: Rank, tree: CallPathNode) -> Self {
        Self {
            representative_rank: rank,
            representative: tree,
            others: Vec::new(),
        }
    }

    /// First tree that joined the group, the one others are compared with
    pub fn representative(&self) -> &CallPathNode {
        &self.representative
    }

    pub fn representative_rank(&self) -> Rank {
        self.representative_rank
    }

    /// Members after the representative
    pub fn others(&self) -> &[(Rank, CallPathNode)] {
        &self.others
    }

    /// Every member, representative first
    pub fn members(&self) -> impl Iterator<Item = (Rank, &CallPathNode)> + '_ {
        std::iter::once((self.representative_rank, &self.representative))
            .chain(self.others.iter().map(|(rank, tree)| (*rank, tree)))
    }

    /// Ranks of all members, representative first
    pub fn ranks(&self) -> Vec<Rank> {
        self.members().map(|(rank, _)| rank).collect()
    }

    pub fn len(&self) -> usize {
        1 + self.others.len()
    }

    /// Always false; a group is created with its representative
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Greedy single-pass grouping by topology
///
/// **Public** - used before elementwise aggregation
///
/// Each tree joins the first group, in creation order, whose representative
/// is topologically equal to it, or starts a new group.
pub fn group_by_topology(trees: impl IntoIterator<Item = (Rank, CallPathNode)>) -> Vec<RankGroup> {
    let mut groups: Vec<RankGroup> = Vec::new();
    // structural hash -> indices into `groups`, in creation order
    let mut buckets: HashMap<u64, Vec<usize>> = HashMap::new();
    let mut rank_count = 0usize;

    for (rank, tree) in trees {
        rank_count += 1;
        let candidates = buckets.entry(topology_hash(&tree)).or_default();

        let existing = candidates
            .iter()
            .copied()
            .find(|&idx| topologically_equal(groups[idx].representative(), &tree));

        match existing {
            Some(idx) => {
                debug!("Rank {} joins topology group {}", rank, idx);
                groups[idx].others.push((rank, tree));
            }
            None => {
                debug!("Rank {} starts topology group {}", rank, groups.len());
                candidates.push(groups.len());
                groups.push(RankGroup::new(rank, tree));
            }
        }
    }

    info!(
        "Partitioned {} ranks into {} topology groups",
        rank_count,
        groups.len()
    );
    groups
}
