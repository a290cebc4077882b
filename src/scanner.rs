//! Directory scanning for configuration sources.
//!
//! Walks the configured directories in order (non-recursive) and returns the
//! files whose names match a pattern set, sorted by filename within each
//! directory. Missing or unreadable directories are skipped with a log entry.

use crate::paths::{absolute_normalized, display_path};
use crate::pattern::PatternSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// A located configuration source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDescriptor {
    /// Absolute, normalized path to the file.
    pub path: PathBuf,
    /// The configured directory string the file was found under.
    pub directory: String,
    pub file_name: String,
    /// Patterns that matched the file name, in declaration order.
    pub matched_patterns: Vec<String>,
}

impl fmt::Display for SourceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", display_path(&self.path))
    }
}

/// Scans an ordered list of directories.
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    base_dir: PathBuf,
    directories: Vec<String>,
}

impl DirectoryScanner {
    /// Scanner resolving relative directories against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>, directories: Vec<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            directories,
        }
    }

    pub fn directories(&self) -> &[String] {
        &self.directories
    }

    /// Scan every directory for files matching `patterns`.
    ///
    /// Result order is directory order, then filename order. An empty result
    /// is not an error here.
    pub fn scan(&self, patterns: &PatternSet) -> Vec<SourceDescriptor> {
        let mut matches = Vec::new();

        for directory in &self.directories {
            info!(
                directory = %directory,
                patterns = ?patterns.sources(),
                "Scanning directory for configuration files"
            );
            let dir_path = absolute_normalized(&self.base_dir, Path::new(directory));

            if !dir_path.exists() {
                warn!(path = %dir_path.display(), "Configuration directory does not exist");
                continue;
            }
            if !dir_path.is_dir() {
                warn!(path = %dir_path.display(), "Configuration path is not a directory");
                continue;
            }

            match scan_directory(&dir_path, directory, patterns) {
                Ok(found) => {
                    info!(
                        directory = %directory,
                        count = found.len(),
                        files = ?found.iter().map(|d| d.file_name.as_str()).collect::<Vec<_>>(),
                        "Found matching files"
                    );
                    matches.extend(found);
                }
                Err(e) => {
                    error!(
                        directory = %directory,
                        error = %e,
                        "Failed to scan directory for configuration files"
                    );
                }
            }
        }

        info!(count = matches.len(), "Total configuration files found");
        matches
    }
}

fn scan_directory(
    dir_path: &Path,
    directory: &str,
    patterns: &PatternSet,
) -> std::io::Result<Vec<SourceDescriptor>> {
    let mut found = Vec::new();

    for entry in std::fs::read_dir(dir_path)? {
        let entry = entry?;
        let path = entry.path();
        // Follows symlinks, like a regular-file check on the target
        if !path.is_file() {
            continue;
        }
        let Some(file_name) = entry.file_name().to_str().map(str::to_string) else {
            warn!(path = %path.display(), "Skipping file with non UTF-8 name");
            continue;
        };
        let matched_patterns = patterns.matching(&file_name);
        if matched_patterns.is_empty() {
            continue;
        }
        found.push(SourceDescriptor {
            path: dir_path.join(&file_name),
            directory: directory.to_string(),
            file_name,
            matched_patterns,
        });
    }

    found.sort_by(|a, b| a.file_name.cmp(&b.file_name));
    Ok(found)
}
