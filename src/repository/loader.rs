//! Loading per-rank datasets from a results directory.

use super::memory::MemoryRepository;
use super::schema::Dataset;
use crate::utils::config::{RESULTS_FILE_PREFIX, RESULTS_FILE_SUFFIX};
use crate::utils::error::LoadError;
use log::{debug, info};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Read one rank's exported dataset
///
/// **Public** - used by the analyze and tree commands
///
/// # Errors
/// * `LoadError::Io` - file cannot be opened
/// * `LoadError::Json` - file is not a valid dataset export
pub fn load_dataset(path: impl AsRef<Path>) -> Result<Dataset, LoadError> {
    let path = path.as_ref();
    debug!("Reading dataset from: {}", path.display());

    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset: Dataset = serde_json::from_reader(BufReader::new(file))?;

    debug!(
        "Dataset loaded: {} profile nodes, {} call paths, {} timing rows",
        dataset.profile_nodes.len(),
        dataset.call_paths.len(),
        dataset.aggregate_times.len()
    );

    Ok(dataset)
}

/// Read a dataset and index it for one run and process
pub fn load_repository(
    path: impl AsRef<Path>,
    run_id: u64,
    process_id: u64,
) -> Result<MemoryRepository, LoadError> {
    let dataset = load_dataset(path)?;
    Ok(MemoryRepository::from_dataset(dataset, run_id, process_id))
}

/// Find every `results.<rank>.json` file directly inside `dir`
///
/// **Public** - entry point of the multi-rank pipeline
///
/// # Returns
/// `(rank, path)` pairs sorted by rank. Files that do not follow the naming
/// scheme are ignored.
pub fn discover_rank_files(dir: impl AsRef<Path>) -> Result<Vec<(u32, PathBuf)>, LoadError> {
    let dir = dir.as_ref();
    if !dir.is_dir() {
        return Err(LoadError::NotADirectory(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut ranks = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }

        let rank = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(parse_rank_file_name);
        if let Some(rank) = rank {
            ranks.push((rank, path));
        }
    }

    ranks.sort_by_key(|(rank, _)| *rank);
    info!("Found {} rank datasets in {}", ranks.len(), dir.display());

    Ok(ranks)
}

/// Extract the rank from a `results.<rank>.json` file name
fn parse_rank_file_name(name: &str) -> Option<u32> {
    let digits = name
        .strip_prefix(RESULTS_FILE_PREFIX)?
        .strip_suffix(RESULTS_FILE_SUFFIX)?;

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rank_file_name() {
        assert_eq!(parse_rank_file_name("results.0.json"), Some(0));
        assert_eq!(parse_rank_file_name("results.127.json"), Some(127));
        assert_eq!(parse_rank_file_name("results..json"), None);
        assert_eq!(parse_rank_file_name("results.+3.json"), None);
        assert_eq!(parse_rank_file_name("results.3.db"), None);
        assert_eq!(parse_rank_file_name("summary.json"), None);
    }
}
