use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::dicomdir::check_file;
use crate::error::{DirError, Result};
use crate::models::FileCheck;
use crate::options::DirOptions;
use crate::storage::BACKUP_EXTENSION;

/// How the command line inputs are turned into fileset relative names.
#[derive(Debug, Clone, Default)]
pub struct InputScan {
    pub recurse: bool,
    /// Wildcard applied to file names found while recursing.
    pub pattern: Option<String>,
    /// Files to leave out, typically the DICOMDIR being written.
    pub exclude: Vec<PathBuf>,
}

fn relative_name(directory: &Path, path: &Path) -> Option<String> {
    let relative = path.strip_prefix(directory).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}

impl InputScan {
    fn excluded(&self, path: &Path) -> bool {
        let is_backup = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(BACKUP_EXTENSION));
        is_backup || self.exclude.iter().any(|e| e == path)
    }

    /// Names below `directory` for `inputs`; no inputs means the whole directory.
    /// Directories are only entered when recursing.
    pub fn collect(&self, directory: &Path, inputs: &[String]) -> Result<Vec<String>> {
        let pattern = match &self.pattern {
            Some(p) => Some(glob::Pattern::new(p).map_err(|e| {
                DirError::IllegalParameter(format!("invalid file pattern {p}: {e}"))
            })?),
            None => None,
        };
        let defaults = [".".to_string()];
        let inputs = if inputs.is_empty() && self.recurse {
            &defaults[..]
        } else {
            inputs
        };

        let mut names = Vec::new();
        for input in inputs {
            let path = directory.join(input);
            if path.is_dir() {
                if !self.recurse {
                    warn!("ignoring directory because --recurse not specified: {input}");
                    continue;
                }
                let files = WalkDir::new(&path)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(|e| e.ok())
                    .filter(|e| e.file_type().is_file())
                    .filter(|e| {
                        pattern.as_ref().map_or(true, |p| {
                            p.matches(&e.file_name().to_string_lossy())
                        })
                    });
                for entry in files {
                    if self.excluded(entry.path()) {
                        continue;
                    }
                    if let Some(name) = relative_name(directory, entry.path()) {
                        names.push(name);
                    }
                }
            } else if self.excluded(&path) {
                debug!("skipping {input}");
            } else {
                names.push(input.trim_start_matches("./").to_string());
            }
        }
        names.dedup();
        Ok(names)
    }
}

/// Checks every file against `options` in parallel; the order of `names` is kept.
pub fn check_files(names: &[String], directory: &Path, options: &DirOptions) -> Vec<FileCheck> {
    names
        .par_iter()
        .map(|name| match check_file(name, directory, options) {
            Ok(kind) => FileCheck::passed(name, &kind.to_string()),
            Err(e) => FileCheck::failed(name, e.kind(), e.to_string()),
        })
        .collect()
}
