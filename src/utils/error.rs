//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use crate::repository::CallPathKey;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a node repository while answering queries
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("No call path is tagged as the program root")]
    MissingRoot,

    #[error("Expected exactly one program root, found {0}")]
    AmbiguousRoot(usize),

    #[error("Unknown call path: {0}")]
    UnknownCallPath(CallPathKey),

    #[error("No aggregate timing row for call path {0}")]
    MissingAggregate(CallPathKey),

    #[error("Call path {call_path} references missing profile node {profile_node}")]
    MissingProfileNode {
        call_path: CallPathKey,
        profile_node: u64,
    },
}

/// Errors that can occur while loading a rank dataset from disk
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Errors that abort the construction of a single rank's call tree
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuildError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Call path {0} is its own ancestor")]
    CycleDetected(CallPathKey),
}

/// Errors raised while merging topologically grouped trees
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AggregateError {
    #[error("Rank {rank} diverges from its group at '{path}': {reason}")]
    TopologyMismatch {
        rank: u32,
        path: String,
        reason: String,
    },
}

/// Errors that can occur during flamegraph generation
#[derive(Error, Debug)]
pub enum FlamegraphError {
    #[error("Empty stack data")]
    EmptyStacks,

    #[error("Failed to render flamegraph: {0}")]
    RenderFailed(String),

    #[error("Flamegraph output is not valid UTF-8")]
    InvalidUtf8(#[from] std::string::FromUtf8Error),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),
}
