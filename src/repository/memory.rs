//! In-memory node repository over an exported dataset.

use super::schema::{AggregateTimeRow, Dataset};
use super::{CallPathDetails, CallPathKey, NodeRepository};
use crate::calltree::NodeType;
use crate::utils::error::RepositoryError;
use log::debug;
use std::collections::HashMap;

/// Indexed view of one rank's tables, restricted to a single run and process.
#[derive(Debug, Clone)]
pub struct MemoryRepository {
    /// profile_node_id -> (name, type)
    profile_nodes: HashMap<u64, (String, NodeType)>,

    /// Call paths in table order, with their profile node id
    call_paths: Vec<(CallPathKey, u64)>,
    profile_of: HashMap<CallPathKey, u64>,

    /// Children keep the table order of their call path rows
    children: HashMap<CallPathKey, Vec<CallPathKey>>,

    aggregates: HashMap<CallPathKey, AggregateTimeRow>,
}

impl MemoryRepository {
    /// Index a dataset, keeping only the timing rows of `run_id`/`process_id`
    pub fn from_dataset(dataset: Dataset, run_id: u64, process_id: u64) -> Self {
        let profile_nodes = dataset
            .profile_nodes
            .into_iter()
            .map(|row| {
                let node_type = NodeType::from(row.type_name);
                (row.profile_node_id, (row.node_name, node_type))
            })
            .collect();

        let mut call_paths = Vec::with_capacity(dataset.call_paths.len());
        let mut profile_of = HashMap::with_capacity(dataset.call_paths.len());
        let mut children: HashMap<CallPathKey, Vec<CallPathKey>> = HashMap::new();

        for row in &dataset.call_paths {
            let key = CallPathKey(row.call_path_id);
            if profile_of.contains_key(&key) {
                debug!("Ignoring duplicate call path row for {}", key);
                continue;
            }
            profile_of.insert(key, row.profile_node_id);
            call_paths.push((key, row.profile_node_id));
            if let Some(parent) = row.parent() {
                children.entry(CallPathKey(parent)).or_default().push(key);
            }
        }

        let mut aggregates = HashMap::new();
        let mut skipped = 0usize;
        for row in dataset.aggregate_times {
            if row.run_id != run_id || row.process_id != process_id {
                skipped += 1;
                continue;
            }
            // A database holds one row per call path, run and process
            aggregates.entry(CallPathKey(row.call_path_id)).or_insert(row);
        }

        debug!(
            "Indexed {} call paths, {} timing rows (run {}, process {}, {} rows skipped)",
            call_paths.len(),
            aggregates.len(),
            run_id,
            process_id,
            skipped
        );

        Self {
            profile_nodes,
            call_paths,
            profile_of,
            children,
            aggregates,
        }
    }

    /// Number of call paths in the dataset
    pub fn len(&self) -> usize {
        self.call_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.call_paths.is_empty()
    }

    fn profile_node(&self, key: CallPathKey) -> Result<&(String, NodeType), RepositoryError> {
        let profile_node = *self
            .profile_of
            .get(&key)
            .ok_or(RepositoryError::UnknownCallPath(key))?;

        self.profile_nodes
            .get(&profile_node)
            .ok_or(RepositoryError::MissingProfileNode {
                call_path: key,
                profile_node,
            })
    }
}

impl NodeRepository for MemoryRepository {
    fn root_key(&self) -> Result<CallPathKey, RepositoryError> {
        let roots: Vec<CallPathKey> = self
            .call_paths
            .iter()
            .filter(|(_, profile_node)| {
                matches!(
                    self.profile_nodes.get(profile_node),
                    Some((_, NodeType::Program))
                )
            })
            .map(|(key, _)| *key)
            .collect();

        match roots.as_slice() {
            [] => Err(RepositoryError::MissingRoot),
            [root] => Ok(*root),
            many => Err(RepositoryError::AmbiguousRoot(many.len())),
        }
    }

    fn details(&self, key: CallPathKey) -> Result<CallPathDetails, RepositoryError> {
        let (name, node_type) = self.profile_node(key)?;
        let row = self
            .aggregates
            .get(&key)
            .ok_or(RepositoryError::MissingAggregate(key))?;

        Ok(CallPathDetails {
            name: name.clone(),
            node_type: node_type.clone(),
            min_time: row.min_wall_time,
            avg_time: row.avg_wall_time,
            max_time: row.max_wall_time,
            call_count: row.count,
        })
    }

    fn child_keys(&self, key: CallPathKey) -> Result<Vec<CallPathKey>, RepositoryError> {
        if !self.profile_of.contains_key(&key) {
            return Err(RepositoryError::UnknownCallPath(key));
        }
        Ok(self.children.get(&key).cloned().unwrap_or_default())
    }

    fn call_path_keys(&self) -> Vec<CallPathKey> {
        self.call_paths
            .iter()
            .map(|(key, _)| *key)
            .filter(|key| self.aggregates.contains_key(key))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::schema::AggregateTimeRow;

    fn sample_repository() -> MemoryRepository {
        let dataset = Dataset::builder()
            .call_path(1, None, "ProgramRoot", NodeType::Program, 10.0, 1)
            .call_path(2, Some(1), "solve", NodeType::Method, 3.0, 2)
            .call_path(3, Some(1), "MPI_Allreduce", NodeType::MpiSyncCall, 0.5, 4)
            .build();
        MemoryRepository::from_dataset(dataset, 1, 1)
    }

    #[test]
    fn test_root_and_children() {
        let repo = sample_repository();

        assert_eq!(repo.root_key().unwrap(), CallPathKey(1));
        assert_eq!(
            repo.child_keys(CallPathKey(1)).unwrap(),
            vec![CallPathKey(2), CallPathKey(3)]
        );
        assert!(repo.child_keys(CallPathKey(3)).unwrap().is_empty());
    }

    #[test]
    fn test_details_inclusive_time() {
        let repo = sample_repository();
        let details = repo.details(CallPathKey(3)).unwrap();

        assert_eq!(details.name, "MPI_Allreduce");
        assert_eq!(details.node_type, NodeType::MpiSyncCall);
        assert_eq!(details.call_count, 4);
        assert_eq!(details.inclusive_time(), 2.0);
    }

    #[test]
    fn test_unknown_call_path() {
        let repo = sample_repository();
        assert_eq!(
            repo.child_keys(CallPathKey(42)),
            Err(RepositoryError::UnknownCallPath(CallPathKey(42)))
        );
        assert_eq!(
            repo.details(CallPathKey(42)),
            Err(RepositoryError::UnknownCallPath(CallPathKey(42)))
        );
    }

    #[test]
    fn test_missing_root() {
        let dataset = Dataset::builder()
            .call_path(1, None, "main", NodeType::Method, 1.0, 1)
            .build();
        let repo = MemoryRepository::from_dataset(dataset, 1, 1);

        assert_eq!(repo.root_key(), Err(RepositoryError::MissingRoot));
    }

    #[test]
    fn test_ambiguous_root() {
        let dataset = Dataset::builder()
            .call_path(1, None, "ProgramRoot", NodeType::Program, 1.0, 1)
            .call_path(2, None, "SecondRoot", NodeType::Program, 1.0, 1)
            .build();
        let repo = MemoryRepository::from_dataset(dataset, 1, 1);

        assert_eq!(repo.root_key(), Err(RepositoryError::AmbiguousRoot(2)));
    }

    #[test]
    fn test_timing_rows_filtered_by_run_and_process() {
        let mut dataset = Dataset::builder()
            .call_path(1, None, "ProgramRoot", NodeType::Program, 10.0, 1)
            .untimed_call_path(2, Some(1), "solve", NodeType::Method)
            .build();
        dataset.aggregate_times.push(AggregateTimeRow {
            call_path_id: 2,
            run_id: 2,
            process_id: 1,
            min_wall_time: 1.0,
            avg_wall_time: 1.0,
            max_wall_time: 1.0,
            count: 1,
        });
        let repo = MemoryRepository::from_dataset(dataset, 1, 1);

        assert_eq!(
            repo.details(CallPathKey(2)),
            Err(RepositoryError::MissingAggregate(CallPathKey(2)))
        );
        assert_eq!(repo.call_path_keys(), vec![CallPathKey(1)]);
    }
}
