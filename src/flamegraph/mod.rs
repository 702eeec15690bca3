//! Flamegraph and text rendering.
//!
//! This module converts collapsed stacks into interactive SVG flamegraphs
//! using the inferno library, and renders call trees and reports as text.

pub mod generator;
pub mod text;

// Re-export main types
pub use generator::{generate_flamegraph, render_flamegraph, FlamegraphConfig};
pub use text::{generate_text_summary, render_tree_text};
