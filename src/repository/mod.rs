//! Access to the profiling records of a single rank.
//!
//! A TreeTimer database stores one aggregate timing row per call path and a
//! parent link for every call path. The [`NodeRepository`] trait is the only
//! surface the tree builder and the hotspot metrics query; [`MemoryRepository`]
//! implements it over a JSON export of the database tables.

pub mod loader;
pub mod memory;
pub mod schema;

use crate::calltree::NodeType;
use crate::utils::error::RepositoryError;
use serde::{Deserialize, Serialize};
use std::fmt;

// Re-export main types and functions
pub use loader::{discover_rank_files, load_dataset, load_repository};
pub use memory::MemoryRepository;
pub use schema::{Dataset, DatasetBuilder};

/// Opaque identity of a call path (the `CallPathID` column)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CallPathKey(pub u64);

impl fmt::Display for CallPathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Aggregate timing details stored for one call path
#[derive(Debug, Clone, PartialEq)]
pub struct CallPathDetails {
    /// Profile node name (the same name may appear under several call paths)
    pub name: String,

    /// Category of the profiled block
    pub node_type: NodeType,

    /// Fastest single call, seconds
    pub min_time: f64,

    /// Mean call duration, seconds
    pub avg_time: f64,

    /// Slowest single call, seconds
    pub max_time: f64,

    /// Number of calls
    pub call_count: u64,
}

impl CallPathDetails {
    /// Total time spent in this call path including its descendants
    pub fn inclusive_time(&self) -> f64 {
        self.avg_time * self.call_count as f64
    }
}

/// Query surface over one rank's profiling records.
pub trait NodeRepository {
    /// Key of the single call path tagged as the program root
    fn root_key(&self) -> Result<CallPathKey, RepositoryError>;

    /// Timing details of a call path
    fn details(&self, key: CallPathKey) -> Result<CallPathDetails, RepositoryError>;

    /// Direct children of a call path, in repository order
    fn child_keys(&self, key: CallPathKey) -> Result<Vec<CallPathKey>, RepositoryError>;

    /// Every call path that has an aggregate timing row
    fn call_path_keys(&self) -> Vec<CallPathKey>;
}
