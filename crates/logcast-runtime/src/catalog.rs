//! Named scripts available to the runner.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::RunnerError;

/// A runnable script.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScriptInfo {
    /// Name used to start the script (file stem for scanned scripts).
    pub name: String,
    pub path: PathBuf,
}

/// Name → path registry, ordered by name.
#[derive(Debug, Clone, Default)]
pub struct ScriptCatalog {
    scripts: BTreeMap<String, PathBuf>,
}

impl ScriptCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every regular file in `dir` (non-recursive) under its file stem.
    ///
    /// Hidden files are skipped. When two files share a stem, the first in
    /// file-name order wins.
    pub fn scan(dir: impl AsRef<Path>) -> Result<Self, RunnerError> {
        let dir = dir.as_ref();
        let read_dir = std::fs::read_dir(dir).map_err(|e| RunnerError::Catalog {
            path: dir.to_path_buf(),
            reason: e.to_string(),
        })?;

        let mut files: Vec<PathBuf> = read_dir
            .filter_map(Result::ok)
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| !n.starts_with('.'))
            })
            .collect();
        files.sort();

        let mut catalog = Self::new();
        for path in files {
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if catalog.scripts.contains_key(name) {
                warn!(script = name, path = %path.display(), "duplicate script name, skipping");
                continue;
            }
            catalog.scripts.insert(name.to_string(), path.clone());
        }

        debug!(dir = %dir.display(), scripts = catalog.len(), "scanned scripts directory");
        Ok(catalog)
    }

    /// Register or replace a script.
    pub fn insert(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.scripts.insert(name.into(), path.into());
    }

    /// Builder-style [`ScriptCatalog::insert`].
    #[must_use]
    pub fn with_script(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.insert(name, path);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Path> {
        self.scripts.get(name).map(PathBuf::as_path)
    }

    pub fn list(&self) -> Vec<ScriptInfo> {
        self.scripts
            .iter()
            .map(|(name, path)| ScriptInfo {
                name: name.clone(),
                path: path.clone(),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.scripts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
