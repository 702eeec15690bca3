//! SVG flamegraph generation with inferno.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::error::FlamegraphError;
use inferno::flamegraph::{self, Options};
use log::{debug, info};
use std::io::Write;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,

    /// Unit shown in tooltips
    pub count_name: String,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: "TreeTimer Call Tree".to_string(),
            width: 1200,
            count_name: "us".to_string(),
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - no stack carries any weight
/// * `FlamegraphError::RenderFailed` - inferno failed to render the stacks
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, FlamegraphError> {
    let mut svg = Vec::new();
    render_flamegraph(stacks, config, &mut svg)?;

    info!("Flamegraph rendered ({} bytes)", svg.len());
    Ok(String::from_utf8(svg)?)
}

/// Render collapsed stacks as SVG into `writer`
///
/// # Errors
/// * `FlamegraphError::EmptyStacks` - no stack carries any weight
/// * `FlamegraphError::RenderFailed` - inferno failed, including write errors
pub fn render_flamegraph<W: Write>(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
    writer: W,
) -> Result<(), FlamegraphError> {
    let default_config = FlamegraphConfig::default();
    let config = config.unwrap_or(&default_config);

    let lines: Vec<String> = stacks
        .iter()
        .filter(|s| s.weight > 0)
        .map(CollapsedStack::to_line)
        .collect();

    if lines.is_empty() {
        return Err(FlamegraphError::EmptyStacks);
    }

    debug!("Rendering flamegraph '{}' from {} stacks", config.title, lines.len());

    let mut options = Options::default();
    options.title = config.title.clone();
    options.count_name = config.count_name.clone();
    options.image_width = Some(config.width);

    flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), writer)
        .map_err(|e| FlamegraphError::RenderFailed(e.to_string()))
}
