//! Checker configuration.

use std::path::PathBuf;

/// Configuration for a compatibility run.
#[derive(Debug, Clone)]
pub struct CheckerConfig {
    /// Root of the previously released snapshot.
    pub old_dir: PathBuf,

    /// Root of the candidate snapshot.
    pub new_dir: PathBuf,

    /// Extra import search roots for the old snapshot.
    pub old_include: Vec<PathBuf>,

    /// Extra import search roots for the new snapshot.
    pub new_include: Vec<PathBuf>,

    /// IDL frontend (default: "idl").
    pub format: String,

    /// Require reviewed-list entries for fields that become stable.
    pub require_stability_review: bool,

    /// Print phase progress to stderr.
    pub verbose: bool,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            old_dir: PathBuf::from("old"),
            new_dir: PathBuf::from("new"),
            old_include: Vec::new(),
            new_include: Vec::new(),
            format: "idl".to_string(),
            require_stability_review: false,
            verbose: false,
        }
    }
}

impl CheckerConfig {
    /// Creates a configuration for the given snapshot pair.
    pub fn new(old_dir: impl Into<PathBuf>, new_dir: impl Into<PathBuf>) -> Self {
        Self {
            old_dir: old_dir.into(),
            new_dir: new_dir.into(),
            ..Self::default()
        }
    }

    /// Import search roots for the old snapshot: the root itself first.
    pub fn old_import_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.old_dir.clone())
            .chain(self.old_include.iter().cloned())
            .collect()
    }

    /// Import search roots for the new snapshot: the root itself first.
    pub fn new_import_dirs(&self) -> Vec<PathBuf> {
        std::iter::once(self.new_dir.clone())
            .chain(self.new_include.iter().cloned())
            .collect()
    }
}
