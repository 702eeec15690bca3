//! JSON schema of an exported TreeTimer database.
//!
//! Each rank writes its own database. The export keeps the three tables the
//! call tree is reconstructed from, with the column names lower-cased:
//! `ProfileNodeData`, `CallPathData` and `AggregateTime`.

use crate::calltree::NodeType;
use crate::utils::config::{DEFAULT_PROCESS_ID, DEFAULT_RUN_ID};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// All tables of one rank's database
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default)]
    pub profile_nodes: Vec<ProfileNodeRow>,

    #[serde(default)]
    pub call_paths: Vec<CallPathRow>,

    #[serde(default)]
    pub aggregate_times: Vec<AggregateTimeRow>,
}

/// A profiled block, identified by name only
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileNodeRow {
    pub profile_node_id: u64,
    pub node_name: String,
    pub type_name: String,
}

/// A call path: a profile node reached through a specific parent call path
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPathRow {
    pub call_path_id: u64,
    pub profile_node_id: u64,

    /// `null` (or 0, as written by older exporters) for the root
    #[serde(default)]
    pub parent_node_id: Option<u64>,
}

impl CallPathRow {
    /// Parent call path id, treating the legacy `0` sentinel as no parent
    pub fn parent(&self) -> Option<u64> {
        self.parent_node_id.filter(|&id| id != 0)
    }
}

/// Aggregate wall-clock timing of one call path for one run and process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateTimeRow {
    pub call_path_id: u64,

    #[serde(default = "default_run_id")]
    pub run_id: u64,

    #[serde(default = "default_process_id")]
    pub process_id: u64,

    pub min_wall_time: f64,
    pub avg_wall_time: f64,
    pub max_wall_time: f64,
    pub count: u64,
}

fn default_run_id() -> u64 {
    DEFAULT_RUN_ID
}

fn default_process_id() -> u64 {
    DEFAULT_PROCESS_ID
}

impl Dataset {
    /// Start building a dataset programmatically
    pub fn builder() -> DatasetBuilder {
        DatasetBuilder::default()
    }
}

/// Incremental construction of a [`Dataset`], one call path at a time.
///
/// Profile nodes are shared between call paths with the same name and type,
/// as they are in a real database. Timing rows are written for the default
/// run and process.
#[derive(Debug, Default)]
pub struct DatasetBuilder {
    dataset: Dataset,
    profile_ids: HashMap<(String, String), u64>,
}

impl DatasetBuilder {
    /// Add a call path with a single timing row where min = avg = max
    pub fn call_path(
        self,
        id: u64,
        parent: Option<u64>,
        name: &str,
        node_type: NodeType,
        avg_time: f64,
        count: u64,
    ) -> Self {
        self.call_path_with_range(id, parent, name, node_type, (avg_time, avg_time, avg_time), count)
    }

    /// Add a call path with explicit `(min, avg, max)` call times
    pub fn call_path_with_range(
        mut self,
        id: u64,
        parent: Option<u64>,
        name: &str,
        node_type: NodeType,
        (min_time, avg_time, max_time): (f64, f64, f64),
        count: u64,
    ) -> Self {
        self = self.untimed_call_path(id, parent, name, node_type);
        self.dataset.aggregate_times.push(AggregateTimeRow {
            call_path_id: id,
            run_id: DEFAULT_RUN_ID,
            process_id: DEFAULT_PROCESS_ID,
            min_wall_time: min_time,
            avg_wall_time: avg_time,
            max_wall_time: max_time,
            count,
        });
        self
    }

    /// Add a call path without any timing row
    pub fn untimed_call_path(
        mut self,
        id: u64,
        parent: Option<u64>,
        name: &str,
        node_type: NodeType,
    ) -> Self {
        let profile_node_id = self.profile_node(name, &node_type);
        self.dataset.call_paths.push(CallPathRow {
            call_path_id: id,
            profile_node_id,
            parent_node_id: parent,
        });
        self
    }

    pub fn build(self) -> Dataset {
        self.dataset
    }

    fn profile_node(&mut self, name: &str, node_type: &NodeType) -> u64 {
        let key = (name.to_string(), node_type.as_str().to_string());
        if let Some(&id) = self.profile_ids.get(&key) {
            return id;
        }

        let id = self.dataset.profile_nodes.len() as u64 + 1;
        self.dataset.profile_nodes.push(ProfileNodeRow {
            profile_node_id: id,
            node_name: key.0.clone(),
            type_name: key.1.clone(),
        });
        self.profile_ids.insert(key, id);
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shares_profile_nodes() {
        let dataset = Dataset::builder()
            .call_path(1, None, "ProgramRoot", NodeType::Program, 10.0, 1)
            .call_path(2, Some(1), "solve", NodeType::Method, 2.0, 2)
            .call_path(3, Some(2), "solve", NodeType::Method, 1.0, 1)
            .build();

        assert_eq!(dataset.profile_nodes.len(), 2);
        assert_eq!(dataset.call_paths.len(), 3);
        assert_eq!(dataset.call_paths[1].profile_node_id, dataset.call_paths[2].profile_node_id);
    }

    #[test]
    fn test_zero_parent_means_root() {
        let row = CallPathRow {
            call_path_id: 1,
            profile_node_id: 1,
            parent_node_id: Some(0),
        };
        assert_eq!(row.parent(), None);
    }

    #[test]
    fn test_run_and_process_default_when_absent() {
        let row: AggregateTimeRow = serde_json::from_str(
            r#"{"call_path_id": 4, "min_wall_time": 0.5, "avg_wall_time": 1.0, "max_wall_time": 1.5, "count": 3}"#,
        )
        .unwrap();

        assert_eq!(row.run_id, DEFAULT_RUN_ID);
        assert_eq!(row.process_id, DEFAULT_PROCESS_ID);
        assert_eq!(row.count, 3);
    }
}
