//! Per-rank call trees.
//!
//! This module reconstructs the call tree of one rank from its profiling
//! records and provides:
//! - Exclusive ("self") time derived from inclusive time
//! - Lazy depth-first traversal
//! - Flattening and walltime validation

pub mod builder;
pub mod iter;
pub mod node;
pub mod validate;

// Re-export main types and functions
pub use builder::{build_tree, build_tree_with_corrections, ResidualCorrection};
pub use iter::{TreeIter, Walk};
pub use node::{CallPathNode, NodeType};
pub use validate::{flatten, validate, FlatRecord, ValidationReport};
