//! Discovery of the ordered set of underlying source units for a dataset root.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// The literal separator used by the `file=` native ID form. Source labels and
/// local IDs must never contain it.
pub const ID_SEPARATOR: &str = "::";

/// Marker files that identify a directory as an acquisition source unit
pub const DEFAULT_SOURCE_MARKERS: &[&str] = &[
    "analysis.baf",
    "analysis.yep",
    "analysis.tdf",
    "analysis.tsf",
    "fid",
];

/// Errors describing an unusable dataset configuration
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("The dataset root {0} could not be read: {1}")]
    UnreadableRoot(PathBuf, #[source] io::Error),
    #[error("The dataset root {0} does not denote a recognizable source unit")]
    NoSourceUnits(PathBuf),
    #[error("The identifier component {0:?} contains the reserved separator \"::\"")]
    ReservedSeparator(String),
    #[error("The native ID {0:?} is registered more than once")]
    DuplicateNativeId(String),
}

/**
A path to one underlying data unit of a dataset.

A source collection owns zero or more nested acquisition collections; those
are enumerated through the vendor provider, not here. The label feeds the
`file=<label>::<localId>` native ID form.
*/
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SourceCollection {
    pub path: PathBuf,
    pub label: String,
}

impl SourceCollection {
    pub fn from_path<P: Into<PathBuf>>(path: P) -> Result<Self, ConfigurationError> {
        let path: PathBuf = path.into();
        let label = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        if label.contains(ID_SEPARATOR) {
            return Err(ConfigurationError::ReservedSeparator(label));
        }
        Ok(Self { path, label })
    }
}

fn is_source_unit(path: &Path, markers: &[&str]) -> bool {
    path.is_dir() && markers.iter().any(|m| path.join(m).exists())
}

/**
Discover the ordered set of source units beneath `root` using the default
marker set.

The ordering is deterministic across runs since ordinal assignment depends
on it: child sources are sorted lexicographically by path.
*/
pub fn resolve_sources(root: &Path) -> Result<Vec<SourceCollection>, ConfigurationError> {
    resolve_sources_with_markers(root, DEFAULT_SOURCE_MARKERS)
}

/// As [`resolve_sources`], with a caller-supplied marker file set
pub fn resolve_sources_with_markers(
    root: &Path,
    markers: &[&str],
) -> Result<Vec<SourceCollection>, ConfigurationError> {
    if root.is_file() {
        // The root names the data unit directly
        return Ok(vec![SourceCollection::from_path(root)?]);
    }

    if is_source_unit(root, markers) {
        return Ok(vec![SourceCollection::from_path(root)?]);
    }

    let listing = fs::read_dir(root)
        .map_err(|e| ConfigurationError::UnreadableRoot(root.to_path_buf(), e))?;

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry in listing {
        let entry = entry.map_err(|e| ConfigurationError::UnreadableRoot(root.to_path_buf(), e))?;
        let path = entry.path();
        if is_source_unit(&path, markers) {
            paths.push(path);
        }
    }

    if paths.is_empty() {
        return Err(ConfigurationError::NoSourceUnits(root.to_path_buf()));
    }

    paths.sort();
    log::debug!(
        "resolved {} source unit(s) under {}",
        paths.len(),
        root.display()
    );
    paths.into_iter().map(SourceCollection::from_path).collect()
}
