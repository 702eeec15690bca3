//! Reconstruct a rank's call tree from its node repository.
//!
//! The repository only knows parent links and per-call-path aggregate rows.
//! The builder walks it depth-first from the program root and derives every
//! node's exclusive time by subtracting the inclusive time of its direct
//! children, read from the children's own rows.

use super::node::CallPathNode;
use crate::repository::{CallPathKey, NodeRepository};
use crate::utils::error::{BuildError, RepositoryError};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

/// A negative exclusive-time residual that was clamped to zero.
///
/// Instrumentation overhead makes children occasionally add up to slightly
/// more than their parent. This is expected and never aborts a build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResidualCorrection {
    pub key: CallPathKey,
    pub name: String,

    /// The negative value that was replaced by zero
    pub residual: f64,
}

/// Build the call tree of one rank
///
/// **Public** - main entry point for tree construction
///
/// # Errors
/// * `RepositoryError::MissingRoot` - no call path is tagged as program root
/// * any other repository error raised while walking the tree
/// * `BuildError::CycleDetected` - a call path is its own ancestor
///
/// No partial tree is ever returned.
pub fn build_tree<R: NodeRepository + ?Sized>(repo: &R) -> Result<CallPathNode, BuildError> {
    build_tree_with_corrections(repo).map(|(tree, _)| tree)
}

/// Build the call tree and also return every residual clamp applied
pub fn build_tree_with_corrections<R: NodeRepository + ?Sized>(
    repo: &R,
) -> Result<(CallPathNode, Vec<ResidualCorrection>), BuildError> {
    let root = repo.root_key()?;
    debug!("Building call tree from root {}", root);

    let mut builder = TreeBuilder {
        repo,
        path: Vec::new(),
        corrections: Vec::new(),
    };
    let tree = builder.visit(root)?;

    if !builder.corrections.is_empty() {
        info!(
            "Clamped {} negative exclusive-time residuals to zero",
            builder.corrections.len()
        );
    }
    debug!("Built call tree with {} nodes", tree.node_count());

    Ok((tree, builder.corrections))
}

/// Exclusive time of a call path with the given inclusive time and children.
///
/// Returns `(exclusive, residual)`: `exclusive` is clamped at zero while
/// `residual` is the raw difference, so callers can tell a clamp happened.
pub(crate) fn exclusive_time<R: NodeRepository + ?Sized>(
    repo: &R,
    inclusive: f64,
    child_keys: &[CallPathKey],
) -> Result<(f64, f64), RepositoryError> {
    if child_keys.is_empty() {
        return Ok((inclusive, inclusive));
    }

    let mut children_total = 0.0;
    for &child in child_keys {
        children_total += repo.details(child)?.inclusive_time();
    }

    let residual = inclusive - children_total;
    Ok((residual.max(0.0), residual))
}

struct TreeBuilder<'a, R: ?Sized> {
    repo: &'a R,

    /// Keys on the current descent path
    path: Vec<CallPathKey>,

    corrections: Vec<ResidualCorrection>,
}

impl<R: NodeRepository + ?Sized> TreeBuilder<'_, R> {
    fn visit(&mut self, key: CallPathKey) -> Result<CallPathNode, BuildError> {
        if self.path.contains(&key) {
            return Err(BuildError::CycleDetected(key));
        }

        let details = self.repo.details(key)?;
        let child_keys = self.repo.child_keys(key)?;

        let inclusive = details.inclusive_time();
        let (exclusive, residual) = exclusive_time(self.repo, inclusive, &child_keys)?;
        if residual < 0.0 {
            warn!(
                "Negative exclusive time {:e}s for '{}' ({}), clamped to zero",
                residual, details.name, key
            );
            self.corrections.push(ResidualCorrection {
                key,
                name: details.name.clone(),
                residual,
            });
        }

        self.path.push(key);
        let children = child_keys
            .iter()
            .map(|&child| self.visit(child))
            .collect::<Result<Vec<_>, _>>()?;
        self.path.pop();

        Ok(CallPathNode {
            name: details.name,
            node_type: details.node_type,
            inclusive_time: inclusive,
            exclusive_time: exclusive,
            children,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calltree::NodeType;
    use crate::repository::schema::Dataset;
    use crate::repository::MemoryRepository;

    #[test]
    fn test_leaf_exclusive_equals_inclusive() {
        let repo = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, None, "ProgramRoot", NodeType::Program, 3.0, 1)
                .build(),
            1,
            1,
        );

        let tree = build_tree(&repo).unwrap();
        assert_eq!(tree.inclusive_time(), 3.0);
        assert_eq!(tree.exclusive_time(), 3.0);
        assert!(tree.is_leaf());
    }

    #[test]
    fn test_exclusive_uses_call_counts() {
        // solve: avg 1.5s x 4 calls = 6s inclusive
        let repo = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, None, "ProgramRoot", NodeType::Program, 10.0, 1)
                .call_path(2, Some(1), "solve", NodeType::Method, 1.5, 4)
                .build(),
            1,
            1,
        );

        let tree = build_tree(&repo).unwrap();
        assert_eq!(tree.exclusive_time(), 4.0);
        assert_eq!(tree.children()[0].inclusive_time(), 6.0);
    }

    #[test]
    fn test_negative_residual_is_recorded() {
        let repo = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, None, "ProgramRoot", NodeType::Program, 5.0, 1)
                .call_path(2, Some(1), "a", NodeType::Method, 3.0, 1)
                .call_path(3, Some(1), "b", NodeType::Method, 2.0000001, 1)
                .build(),
            1,
            1,
        );

        let (tree, corrections) = build_tree_with_corrections(&repo).unwrap();
        assert_eq!(tree.exclusive_time(), 0.0);
        assert_eq!(corrections.len(), 1);
        assert_eq!(corrections[0].key, CallPathKey(1));
        assert!(corrections[0].residual < 0.0);
    }

    #[test]
    fn test_cycle_is_rejected() {
        // 2 -> 3 -> 2 hangs off the root
        let repo = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, None, "ProgramRoot", NodeType::Program, 5.0, 1)
                .call_path(2, Some(3), "a", NodeType::Method, 1.0, 1)
                .call_path(3, Some(2), "b", NodeType::Method, 1.0, 1)
                .call_path(4, Some(1), "entry", NodeType::Method, 1.0, 1)
                .build(),
            1,
            1,
        );
        // Not reachable from the root, so the build succeeds
        assert!(build_tree(&repo).is_ok());

        let looping = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, Some(2), "ProgramRoot", NodeType::Program, 5.0, 1)
                .call_path(2, Some(1), "a", NodeType::Method, 1.0, 1)
                .build(),
            1,
            1,
        );
        assert_eq!(
            build_tree(&looping),
            Err(BuildError::CycleDetected(CallPathKey(1)))
        );
    }

    #[test]
    fn test_missing_child_row_fails_the_build() {
        let repo = MemoryRepository::from_dataset(
            Dataset::builder()
                .call_path(1, None, "ProgramRoot", NodeType::Program, 5.0, 1)
                .untimed_call_path(2, Some(1), "a", NodeType::Method)
                .build(),
            1,
            1,
        );

        assert_eq!(
            build_tree(&repo),
            Err(BuildError::Repository(RepositoryError::MissingAggregate(
                CallPathKey(2)
            )))
        );
    }
}
