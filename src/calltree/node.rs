//! Call tree node and node type definitions.

use super::iter::{TreeIter, Walk};
use crate::utils::config::{METHOD_TYPE_NAME, ROOT_TYPE_NAME};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Category of a profiled block, as recorded in the `TypeName` column
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum NodeType {
    /// The program root (whole-run walltime)
    Program,
    /// A function
    Method,
    /// A loop without a compute classification
    Loop,
    /// A compute block
    ComputeLoop,
    /// MPI point-to-point or collective communication
    MpiCommCall,
    /// MPI synchronization (barriers, waits, reductions)
    MpiSyncCall,
    /// Call into an external library
    LibraryCall,
    /// Any type name this tool does not know about
    Other(String),
}

impl NodeType {
    /// Database spelling of the type name
    pub fn as_str(&self) -> &str {
        match self {
            NodeType::Program => ROOT_TYPE_NAME,
            NodeType::Method => METHOD_TYPE_NAME,
            NodeType::Loop => "Loop",
            NodeType::ComputeLoop => "ComputeLoop",
            NodeType::MpiCommCall => "MPICommCall",
            NodeType::MpiSyncCall => "MPISyncCall",
            NodeType::LibraryCall => "LibraryCall",
            NodeType::Other(name) => name,
        }
    }

    /// True for MPI communication and synchronization blocks
    pub fn is_mpi(&self) -> bool {
        matches!(self, NodeType::MpiCommCall | NodeType::MpiSyncCall)
    }
}

impl FromStr for NodeType {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            ROOT_TYPE_NAME => NodeType::Program,
            METHOD_TYPE_NAME => NodeType::Method,
            "Loop" => NodeType::Loop,
            "ComputeLoop" => NodeType::ComputeLoop,
            "MPICommCall" => NodeType::MpiCommCall,
            "MPISyncCall" => NodeType::MpiSyncCall,
            "LibraryCall" => NodeType::LibraryCall,
            other => NodeType::Other(other.to_string()),
        })
    }
}

impl From<String> for NodeType {
    fn from(name: String) -> Self {
        match name.parse() {
            Ok(NodeType::Other(_)) => NodeType::Other(name),
            Ok(known) => known,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for NodeType {
    fn from(name: &str) -> Self {
        NodeType::from(name.to_string())
    }
}

impl From<NodeType> for String {
    fn from(node_type: NodeType) -> Self {
        match node_type {
            NodeType::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node of a rank's reconstructed call tree.
///
/// Trees are immutable once built: fields are only readable from outside the
/// crate, and aggregation always produces new trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallPathNode {
    pub(crate) name: String,
    pub(crate) node_type: NodeType,

    /// Seconds, including descendants
    pub(crate) inclusive_time: f64,

    /// Seconds, excluding descendants. Never negative.
    pub(crate) exclusive_time: f64,

    /// Discovery order, not necessarily first-call order
    #[serde(default)]
    pub(crate) children: Vec<CallPathNode>,
}

impl CallPathNode {
    pub fn new(
        name: impl Into<String>,
        node_type: NodeType,
        inclusive_time: f64,
        exclusive_time: f64,
        children: Vec<CallPathNode>,
    ) -> Self {
        Self {
            name: name.into(),
            node_type,
            inclusive_time,
            exclusive_time,
            children,
        }
    }

    /// A node without children, whose exclusive time equals its inclusive time
    pub fn leaf(name: impl Into<String>, node_type: NodeType, time: f64) -> Self {
        Self::new(name, node_type, time, time, Vec::new())
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn node_type(&self) -> &NodeType {
        &self.node_type
    }

    pub fn inclusive_time(&self) -> f64 {
        self.inclusive_time
    }

    pub fn exclusive_time(&self) -> f64 {
        self.exclusive_time
    }

    pub fn children(&self) -> &[CallPathNode] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Lazy depth-first pre-order traversal starting at this node
    pub fn iter(&self) -> TreeIter<'_> {
        TreeIter::new(self)
    }

    /// Pre-order traversal yielding `(depth, node)`, the root at depth 0
    pub fn walk(&self) -> Walk<'_> {
        Walk::new(self)
    }

    /// Number of nodes in this subtree
    pub fn node_count(&self) -> usize {
        self.iter().count()
    }

    /// Sum of the children's inclusive times
    pub fn children_inclusive_time(&self) -> f64 {
        self.children.iter().map(|c| c.inclusive_time).sum()
    }
}

impl<'a> IntoIterator for &'a CallPathNode {
    type Item = &'a CallPathNode;
    type IntoIter = TreeIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_type_parsing() {
        assert_eq!("Program".parse::<NodeType>().unwrap(), NodeType::Program);
        assert_eq!("MPISyncCall".parse::<NodeType>().unwrap(), NodeType::MpiSyncCall);
        assert_eq!(
            "Spray".parse::<NodeType>().unwrap(),
            NodeType::Other("Spray".to_string())
        );
    }

    #[test]
    fn test_node_type_serde_uses_database_names() {
        let json = serde_json::to_string(&NodeType::MpiCommCall).unwrap();
        assert_eq!(json, "\"MPICommCall\"");

        let parsed: NodeType = serde_json::from_str("\"Combustion\"").unwrap();
        assert_eq!(parsed, NodeType::Other("Combustion".to_string()));
    }

    #[test]
    fn test_children_inclusive_time() {
        let tree = CallPathNode::new(
            "ProgramRoot",
            NodeType::Program,
            10.0,
            2.0,
            vec![
                CallPathNode::leaf("compute", NodeType::ComputeLoop, 6.0),
                CallPathNode::leaf("MPI_Wait", NodeType::MpiSyncCall, 2.0),
            ],
        );

        assert_eq!(tree.children_inclusive_time(), 8.0);
        assert_eq!(tree.node_count(), 3);
        assert!(!tree.is_leaf());
    }
}
