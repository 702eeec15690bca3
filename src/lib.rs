//! TreeTimer Studio
//!
//! Cross-rank call tree analysis for TreeTimer profiling results.
//!
//! Every MPI rank writes its own profiling records. This crate rebuilds each
//! rank's call tree with inclusive and exclusive time, groups ranks whose
//! trees share a topology, sums each group elementwise and renders the
//! result as JSON reports, text trees and flamegraphs.
//!
//! This crate provides the core implementation for the `treetimer` CLI tool.
//!
//! ## Getting Started
//!
//! ```bash
//! treetimer analyze --results-dir ./results --summary
//! treetimer tree --file ./results/results.0.json
//! ```

pub mod aggregator;
pub mod calltree;
pub mod commands;
pub mod flamegraph;
pub mod output;
pub mod repository;
pub mod utils;
