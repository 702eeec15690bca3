//! Terminal renderings of call trees and analysis reports.

use crate::aggregator::exclusive_time_by_type;
use crate::calltree::{CallPathNode, NodeType};
use crate::output::schema::AnalysisReport;

const RESET: &str = "\x1b[0m";

/// Number of nodes listed in the summary's hot node table
const SUMMARY_HOT_NODES: usize = 10;

/// Render a call tree as indented text, one line per node
///
/// **Public** - used by `treetimer tree`
///
/// Every line reads `name [type] inclusive exclusive` in seconds. Subtrees
/// whose inclusive time is below `min_fraction` of the root's are pruned and
/// replaced by a single marker line. The root is always shown.
pub fn render_tree_text(tree: &CallPathNode, min_fraction: f64) -> String {
    let threshold = tree.inclusive_time() * min_fraction;
    let mut lines = Vec::new();
    render_node(tree, 0, threshold, &mut lines);
    lines.join("\n")
}

fn render_node(node: &CallPathNode, depth: usize, threshold: f64, lines: &mut Vec<String>) {
    let indent = "  ".repeat(depth);
    lines.push(format!(
        "{}{} [{}] {:.6}s {:.6}s",
        indent,
        node.name(),
        node.node_type(),
        node.inclusive_time(),
        node.exclusive_time()
    ));

    let mut pruned = 0usize;
    for child in node.children() {
        if child.inclusive_time() < threshold {
            pruned += child.node_count();
        } else {
            render_node(child, depth + 1, threshold, lines);
        }
    }

    if pruned > 0 {
        lines.push(format!("{}  ... {} nodes pruned", indent, pruned));
    }
}

/// ANSI colour for a node type
fn get_ansi_color(node_type: &NodeType) -> &'static str {
    match node_type {
        NodeType::Program => "\x1b[36m",                      // Cyan
        NodeType::Method => "\x1b[32m",                       // Green
        NodeType::Loop | NodeType::ComputeLoop => "\x1b[33m", // Yellow
        NodeType::MpiCommCall => "\x1b[34m",                  // Blue
        NodeType::MpiSyncCall => "\x1b[31;1m",                // Red
        NodeType::LibraryCall => "\x1b[35m",                  // Magenta
        NodeType::Other(_) => "\x1b[90m",                     // Gray
    }
}

/// Generate a human-readable summary of an analysis report
///
/// **Public** - printed by `treetimer analyze --summary`
pub fn generate_text_summary(report: &AnalysisReport) -> String {
    let mut lines = Vec::new();

    lines.push("  TOPOLOGY GROUPS".to_string());
    lines.push("  ┏━━━━━━━┳━━━━━━━━━┳━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━━━┓".to_string());
    lines.push(format!(
        "  ┃ {:^5} ┃ {:^7} ┃ {:<28} ┃ {:^14} ┃",
        "GROUP", "RANKS", "Members", "WALLTIME (s)"
    ));
    lines.push("  ┣━━━━━━━╋━━━━━━━━━╋━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━━━┫".to_string());
    for (idx, group) in report.groups.iter().enumerate() {
        lines.push(format!(
            "  ┃ {:>5} ┃ {:>7} ┃ {:<28} ┃ {:>14.6} ┃",
            idx,
            group.ranks.len(),
            truncate(&format_ranks(&group.ranks), 28),
            group.tree.inclusive_time()
        ));
    }
    lines.push("  ┗━━━━━━━┻━━━━━━━━━┻━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━━━┛".to_string());

    if let Some(total) = &report.grand_total {
        lines.push(String::new());
        lines.push("  HOTTEST NODES (all ranks)".to_string());

        let mut nodes: Vec<&CallPathNode> = total.iter().collect();
        nodes.sort_by(|a, b| b.exclusive_time().total_cmp(&a.exclusive_time()));
        let walltime = total.inclusive_time();

        for node in nodes.iter().take(SUMMARY_HOT_NODES) {
            let percentage = if walltime > 0.0 {
                node.exclusive_time() / walltime * 100.0
            } else {
                0.0
            };
            let color = get_ansi_color(node.node_type());
            lines.push(format!(
                "  └─ {}{:<32}{} {:<13} {:>14.6}s {:>6.1}%",
                color,
                truncate(node.name(), 32),
                RESET,
                node.node_type().as_str(),
                node.exclusive_time(),
                percentage
            ));
        }

        lines.push(String::new());
        lines.push(format!("  {}", exclusive_time_by_type(total).summary()));
    }

    let inconsistent: Vec<String> = report
        .inconsistent_ranks()
        .map(|v| {
            format!(
                "rank {} (exclusive {:.6}s vs walltime {:.6}s)",
                v.rank, v.sum_exclusive, v.root_inclusive
            )
        })
        .collect();
    if !inconsistent.is_empty() {
        lines.push(String::new());
        lines.push("  INCONSISTENT RANKS".to_string());
        lines.extend(inconsistent.into_iter().map(|line| format!("   - {}", line)));
    }

    if !report.failures.is_empty() {
        lines.push(String::new());
        lines.push("  FAILED RANKS".to_string());
        for failure in &report.failures {
            lines.push(format!("   - rank {}: {}", failure.rank, failure.error));
        }
    }

    lines.push(String::new());
    lines.push(format!(
        "   ({} of {} ranks analysed in {} groups)",
        report.successful_ranks(),
        report.rank_count,
        report.groups.len()
    ));

    lines.join("\n")
}

/// Compact rank list, e.g. `0-3,7,9-10`
fn format_ranks(ranks: &[u32]) -> String {
    let mut sorted = ranks.to_vec();
    sorted.sort_unstable();

    let mut parts = Vec::new();
    let mut iter = sorted.into_iter().peekable();
    while let Some(start) = iter.next() {
        let mut end = start;
        while iter.peek() == Some(&(end + 1)) {
            end += 1;
            iter.next();
        }
        if start == end {
            parts.push(start.to_string());
        } else {
            parts.push(format!("{}-{}", start, end));
        }
    }
    parts.join(",")
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let tail: String = text
        .chars()
        .rev()
        .take(width.saturating_sub(3))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    format!("...{}", tail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::AggregatedGroup;
    use crate::output::schema::RankFailure;

    fn sample_tree() -> CallPathNode {
        CallPathNode::new(
            "ProgramRoot",
            NodeType::Program,
            100.0,
            10.0,
            vec![
                CallPathNode::new(
                    "solve",
                    NodeType::Method,
                    88.0,
                    8.0,
                    vec![CallPathNode::leaf("kernel", NodeType::ComputeLoop, 80.0)],
                ),
                CallPathNode::leaf("MPI_Barrier", NodeType::MpiSyncCall, 2.0),
            ],
        )
    }

    #[test]
    fn test_render_tree_indents_by_depth() {
        let text = render_tree_text(&sample_tree(), 0.0);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "ProgramRoot [Program] 100.000000s 10.000000s");
        assert_eq!(lines[2], "    kernel [ComputeLoop] 80.000000s 80.000000s");
    }

    #[test]
    fn test_render_tree_prunes_small_subtrees() {
        let text = render_tree_text(&sample_tree(), 0.03);

        assert!(!text.contains("MPI_Barrier"));
        assert!(text.contains("  ... 1 nodes pruned"));
        assert!(text.contains("kernel"));
    }

    #[test]
    fn test_render_tree_has_no_blank_lines() {
        let text = render_tree_text(&sample_tree(), 0.03);

        assert!(!text.ends_with('\n'));
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().all(|line| !line.trim().is_empty()));
    }

    #[test]
    fn test_format_ranks() {
        assert_eq!(format_ranks(&[3, 0, 1, 2, 7, 9, 10]), "0-3,7,9-10");
        assert_eq!(format_ranks(&[]), "");
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 6), "...hij");
    }

    #[test]
    fn test_summary_lists_groups_and_failures() {
        let mut report = AnalysisReport::new(1, 1);
        report.rank_count = 3;
        report.groups.push(AggregatedGroup {
            ranks: vec![0, 1],
            tree: sample_tree(),
        });
        report.grand_total = Some(sample_tree());
        report.failures.push(RankFailure {
            rank: 2,
            error: "no program root found".to_string(),
        });

        let summary = generate_text_summary(&report);

        assert!(summary.contains("TOPOLOGY GROUPS"));
        assert!(summary.contains("0-1"));
        assert!(summary.contains("rank 2: no program root found"));
        assert!(summary.contains("(2 of 3 ranks analysed in 1 groups)"));
    }
}
