use pretty_assertions::assert_eq;
use treetimer_studio::aggregator::{
    build_collapsed_stacks, collect_hotspots, grand_total, group_and_aggregate, group_by_topology,
    topologically_equal, topology_cmp, topology_hash, topology_less, AggregateCallPathNode,
};
use treetimer_studio::calltree::{build_tree, validate, CallPathNode, NodeType};
use treetimer_studio::repository::{Dataset, MemoryRepository};
use treetimer_studio::utils::error::AggregateError;
use std::cmp::Ordering;

fn rank_tree(root: f64, compute: f64, mpi: f64) -> CallPathNode {
    let dataset = Dataset::builder()
        .call_path(1, None, "ProgramRoot", NodeType::Program, root, 1)
        .call_path(2, Some(1), "compute", NodeType::ComputeLoop, compute, 1)
        .call_path(3, Some(1), "MPI_Allreduce", NodeType::MpiSyncCall, mpi, 1)
        .build();
    build_tree(&MemoryRepository::from_dataset(dataset, 1, 1)).unwrap()
}

fn shape(children: &[(&str, NodeType)]) -> CallPathNode {
    let children: Vec<CallPathNode> = children
        .iter()
        .map(|(name, node_type)| CallPathNode::leaf(*name, node_type.clone(), 1.0))
        .collect();
    let total = 1.0 + children.len() as f64;
    CallPathNode::new("ProgramRoot", NodeType::Program, total, 1.0, children)
}

#[test]
fn test_matching_ranks_form_one_group() {
    let groups = group_and_aggregate(vec![
        (0, rank_tree(10.0, 6.0, 2.0)),
        (1, rank_tree(12.0, 7.0, 2.0)),
    ])
    .unwrap();

    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].ranks, vec![0, 1]);

    let tree = &groups[0].tree;
    assert_eq!(tree.inclusive_time(), 22.0);
    assert_eq!(tree.exclusive_time(), 5.0);
    assert_eq!(tree.children()[0].exclusive_time(), 13.0);
    assert_eq!(tree.children()[1].exclusive_time(), 4.0);
}

#[test]
fn test_extra_child_splits_groups() {
    let three = shape(&[
        ("a", NodeType::Method),
        ("b", NodeType::Method),
        ("c", NodeType::Method),
    ]);
    let two = shape(&[("a", NodeType::Method), ("b", NodeType::Method)]);

    let groups = group_and_aggregate(vec![(0, three.clone()), (1, two.clone())]).unwrap();

    assert_eq!(groups.len(), 2);
    assert_eq!(groups[0].ranks, vec![0]);
    assert_eq!(groups[1].ranks, vec![1]);
    assert_eq!(groups[0].tree, three);
    assert_eq!(groups[1].tree, two);
}

#[test]
fn test_topology_equality_is_an_equivalence() {
    let a = shape(&[("x", NodeType::Method), ("y", NodeType::Loop)]);
    let b = shape(&[("y", NodeType::Loop), ("x", NodeType::Method)]);
    let c = shape(&[("x", NodeType::Method), ("y", NodeType::Loop)]);
    let d = shape(&[("x", NodeType::Method), ("y", NodeType::ComputeLoop)]);

    // reflexive
    assert!(topologically_equal(&a, &a));
    // symmetric
    assert!(topologically_equal(&a, &b));
    assert!(topologically_equal(&b, &a));
    // transitive
    assert!(topologically_equal(&b, &c));
    assert!(topologically_equal(&a, &c));

    assert!(!topologically_equal(&a, &d));
    assert_eq!(topology_hash(&a), topology_hash(&b));
}

#[test]
fn test_topology_ordering_is_total() {
    let a = shape(&[("x", NodeType::Method)]);
    let b = shape(&[("y", NodeType::Method)]);

    assert!(topology_less(&a, &b) ^ topology_less(&b, &a));
    assert_eq!(topology_cmp(&a, &b), topology_cmp(&b, &a).reverse());
    assert_eq!(topology_cmp(&a, &a), Ordering::Equal);
}

#[test]
fn test_leaf_differs_from_interior_node() {
    let leaf = CallPathNode::leaf("solve", NodeType::Method, 1.0);
    let interior = CallPathNode::new(
        "solve",
        NodeType::Method,
        2.0,
        1.0,
        vec![CallPathNode::leaf("kernel", NodeType::ComputeLoop, 1.0)],
    );

    assert!(!topologically_equal(&leaf, &interior));
}

#[test]
fn test_timing_never_affects_topology() {
    assert!(topologically_equal(
        &rank_tree(10.0, 6.0, 2.0),
        &rank_tree(99.0, 1.0, 0.5)
    ));
}

#[test]
fn test_grouping_is_idempotent() {
    let trees = vec![
        (0, rank_tree(10.0, 6.0, 2.0)),
        (1, shape(&[("a", NodeType::Method)])),
        (2, rank_tree(11.0, 6.5, 2.5)),
        (3, shape(&[("a", NodeType::Method)])),
    ];
    let first = group_and_aggregate(trees).unwrap();

    let regrouped = group_by_topology(
        first
            .iter()
            .enumerate()
            .map(|(idx, group)| (idx as u32, group.tree.clone())),
    );

    assert_eq!(regrouped.len(), first.len());
    assert!(regrouped.iter().all(|g| g.len() == 1));
}

#[test]
fn test_seed_then_finalize_reproduces_tree() {
    let tree = rank_tree(10.0, 6.0, 2.0);
    assert_eq!(AggregateCallPathNode::seed(&tree, 0).finalize(), tree);
}

#[test]
fn test_failed_extend_leaves_aggregate_untouched() {
    let mut aggregate = AggregateCallPathNode::seed(&rank_tree(10.0, 6.0, 2.0), 0);
    let before = aggregate.clone();

    let result = aggregate.extend(&shape(&[("compute", NodeType::ComputeLoop)]), 1);

    assert!(matches!(result, Err(AggregateError::TopologyMismatch { rank: 1, .. })));
    assert_eq!(aggregate, before);
}

#[test]
fn test_grand_total_preserves_inclusive_invariant() {
    let groups = group_and_aggregate(vec![
        (0, rank_tree(10.0, 6.0, 2.0)),
        (1, shape(&[("compute", NodeType::ComputeLoop), ("io", NodeType::LibraryCall)])),
        (2, rank_tree(12.0, 7.0, 2.0)),
    ])
    .unwrap();
    let total = grand_total(groups.iter().map(|g| &g.tree)).unwrap();

    for node in total.iter() {
        let expected = node.exclusive_time() + node.children_inclusive_time();
        assert!((node.inclusive_time() - expected).abs() < 1e-9, "{}", node.name());
    }
    assert!(validate(&total).is_consistent(1e-9));
    assert_eq!(total.children().len(), 3);
}

#[test]
fn test_hotspots_merge_same_named_paths() {
    let dataset = Dataset::builder()
        .call_path(1, None, "ProgramRoot", NodeType::Program, 10.0, 1)
        .call_path(2, Some(1), "predict", NodeType::Method, 3.0, 1)
        .call_path(3, Some(2), "MPI_Waitall", NodeType::MpiSyncCall, 1.0, 1)
        .call_path(4, Some(1), "correct", NodeType::Method, 4.0, 1)
        .call_path(5, Some(4), "MPI_Waitall", NodeType::MpiSyncCall, 0.5, 2)
        .build();
    let repo = MemoryRepository::from_dataset(dataset, 1, 1);

    let table = collect_hotspots(&repo).unwrap();
    let waitall = table
        .records
        .iter()
        .find(|r| r.name == "MPI_Waitall")
        .unwrap();

    assert_eq!(table.records.len(), 4);
    assert_eq!(waitall.call_count, 3);
    assert_eq!(waitall.exclusive_time, 2.0);
    assert!((waitall.exclusive_fraction - 0.2).abs() < 1e-12);
    assert!((table.sum_exclusive() - validate(&build_tree(&repo).unwrap()).sum_exclusive).abs() < 1e-9);
}

#[test]
fn test_collapsed_stacks_follow_call_paths() {
    let stacks = build_collapsed_stacks(&rank_tree(10.0, 6.0, 2.0));
    let lines: Vec<String> = stacks.iter().map(|s| s.to_line()).collect();

    assert_eq!(
        lines,
        [
            "ProgramRoot;compute 6000000",
            "ProgramRoot 2000000",
            "ProgramRoot;MPI_Allreduce 2000000",
        ]
    );
}
