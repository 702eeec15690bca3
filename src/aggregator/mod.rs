//! Cross-rank aggregation of call trees, plus the flat views derived from
//! them.
//!
//! This module transforms per-rank call trees into:
//! - Topology groups (ranks sharing one call tree shape)
//! - One elementwise-summed tree per group, and a grand total
//! - Flat hotspot tables and per-type breakdowns
//! - Collapsed stacks (for flamegraph generation)

pub mod grouper;
pub mod merge;
pub mod metrics;
pub mod stack_builder;
pub mod topology;
pub mod total;

// Re-export main types and functions
pub use grouper::{group_by_topology, RankGroup};
pub use merge::{
    aggregate_group, group_and_aggregate, AggregateCallPathNode, AggregatedGroup, Rank,
    TimingSample,
};
pub use metrics::{collect_hotspots, exclusive_time_by_type, HotspotRecord, HotspotTable, TypeBreakdown};
pub use stack_builder::{build_collapsed_stacks, CollapsedStack};
pub use topology::{topologically_equal, topology_cmp, topology_hash, topology_less, Topology};
pub use total::grand_total;
