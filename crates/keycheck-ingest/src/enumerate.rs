//! Submission file enumeration by per-type filename patterns.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::debug;

use keycheck_model::FileType;
use keycheck_schema::SchemaGraph;

use crate::error::{IngestError, Result};

/// Lists the regular files of `dir`, sorted by file name.
pub fn list_submission_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;
    for entry_result in entries {
        let entry = entry_result.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

/// Groups submission files by the file type whose pattern matches them.
///
/// More than one physical file may share a declared type; files within a type
/// keep name order. File names matching no declared pattern are skipped (a
/// submission may carry documentation or checksum files alongside the data).
pub fn enumerate_submission(
    dir: &Path,
    graph: &SchemaGraph,
) -> Result<BTreeMap<FileType, Vec<PathBuf>>> {
    let files = list_submission_files(dir)?;

    let mut patterns = Vec::with_capacity(graph.len());
    for schema in graph.schemas() {
        let regex = Regex::new(&schema.pattern).map_err(|source| IngestError::Pattern {
            file_type: schema.file_type.to_string(),
            pattern: schema.pattern.clone(),
            source,
        })?;
        patterns.push((schema.file_type.clone(), regex));
    }

    let mut grouped: BTreeMap<FileType, Vec<PathBuf>> = BTreeMap::new();
    for path in files {
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        match patterns.iter().find(|(_, regex)| regex.is_match(name)) {
            Some((file_type, _)) => grouped.entry(file_type.clone()).or_default().push(path),
            None => debug!(file = name, "no file type pattern matched; skipping"),
        }
    }
    Ok(grouped)
}
