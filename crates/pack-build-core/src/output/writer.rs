//! All-or-nothing writing of engine output into the bundle directory.
//!
//! Every file is first written next to its target under a `.tmp` suffix.
//! Only when all temp files exist are they renamed into place; a failure in
//! either phase removes what this call created, so a failed build never leaves
//! a half-written `dist-umd/` or `dist-browser/` behind.
//!
//! Output filenames come from the engine, so each one is checked to stay
//! inside the bundle directory before anything is written.

use std::fs;
use std::path::{Path, PathBuf};

use path_clean::PathClean;
use rolldown::BundleOutput;
use rolldown_common::Output;

use crate::{Error, Result};

/// One file of engine output, relative to the bundle directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile<'a> {
    pub filename: &'a str,
    pub contents: &'a [u8],
}

impl<'a> OutputFile<'a> {
    pub fn new(filename: &'a str, contents: &'a [u8]) -> Self {
        Self { filename, contents }
    }
}

/// Write every chunk and asset of `output` into `dir`.
///
/// Returns the written paths in engine order.
pub fn write_bundle(output: &BundleOutput, dir: &Path) -> Result<Vec<PathBuf>> {
    let files: Vec<OutputFile<'_>> = output
        .assets
        .iter()
        .map(|item| match item {
            Output::Chunk(chunk) => OutputFile::new(chunk.filename.as_str(), chunk.code.as_bytes()),
            Output::Asset(asset) => {
                OutputFile::new(asset.filename.as_str(), asset.source.as_bytes())
            }
        })
        .collect();

    write_files(&files, dir)
}

/// Write `files` into `dir` atomically as a group.
pub fn write_files(files: &[OutputFile<'_>], dir: &Path) -> Result<Vec<PathBuf>> {
    let dir = normalize_dir(dir)?;

    fs::create_dir_all(&dir).map_err(|e| {
        Error::WriteFailure(format!(
            "Failed to create output directory '{}': {}",
            dir.display(),
            e
        ))
    })?;

    let mut operations = Vec::with_capacity(files.len());
    for file in files {
        operations.push((validate_output_path(&dir, file.filename)?, file.contents));
    }

    commit(&operations)?;

    let written: Vec<PathBuf> = operations.into_iter().map(|(path, _)| path).collect();
    tracing::debug!(dir = %dir.display(), files = written.len(), "bundle written");
    Ok(written)
}

fn normalize_dir(dir: &Path) -> Result<PathBuf> {
    let cleaned = dir.clean();
    if cleaned.is_absolute() {
        return Ok(cleaned);
    }

    let cwd = std::env::current_dir()
        .map_err(|e| Error::InvalidOutputPath(format!("Failed to get current directory: {}", e)))?;
    Ok(cwd.join(cleaned).clean())
}

/// Resolve `filename` under `base_dir`, rejecting anything that escapes it.
pub(crate) fn validate_output_path(base_dir: &Path, filename: &str) -> Result<PathBuf> {
    if filename.is_empty() {
        return Err(Error::InvalidOutputPath("Empty output filename".to_string()));
    }
    if filename.contains('\0') {
        return Err(Error::InvalidOutputPath(
            "Filename contains null byte".to_string(),
        ));
    }

    let full_path = base_dir.join(Path::new(filename).clean()).clean();
    if full_path == base_dir || !full_path.starts_with(base_dir) {
        return Err(Error::InvalidOutputPath(format!(
            "Path '{}' escapes output directory '{}'",
            filename,
            base_dir.display()
        )));
    }

    Ok(full_path)
}

fn temp_path_for(target: &Path) -> PathBuf {
    let mut name = target.as_os_str().to_owned();
    name.push(".tmp");
    PathBuf::from(name)
}

fn commit(operations: &[(PathBuf, &[u8])]) -> Result<()> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(operations.len());

    for (target, contents) in operations {
        if let Some(parent) = target.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                remove_all(staged.iter().map(|(tmp, _)| tmp.as_path()));
                return Err(Error::WriteFailure(format!(
                    "Failed to create directory '{}': {}",
                    parent.display(),
                    e
                )));
            }
        }

        let temp = temp_path_for(target);
        if let Err(e) = fs::write(&temp, contents) {
            remove_all(staged.iter().map(|(tmp, _)| tmp.as_path()));
            return Err(Error::WriteFailure(format!(
                "Failed to write temporary file '{}': {}",
                temp.display(),
                e
            )));
        }
        staged.push((temp, target.as_path()));
    }

    for (index, (temp, target)) in staged.iter().enumerate() {
        if let Err(e) = fs::rename(temp, target) {
            remove_all(staged[..index].iter().map(|(_, done)| *done));
            remove_all(staged[index..].iter().map(|(tmp, _)| tmp.as_path()));
            return Err(Error::WriteFailure(format!(
                "Failed to rename '{}' to '{}': {}",
                temp.display(),
                target.display(),
                e
            )));
        }
    }

    Ok(())
}

fn remove_all<'a>(paths: impl Iterator<Item = &'a Path>) {
    for path in paths {
        if path.exists() {
            if let Err(e) = fs::remove_file(path) {
                tracing::warn!(path = %path.display(), error = %e, "failed to clean up after write failure");
            }
        }
    }
}
