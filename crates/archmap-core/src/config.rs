//! Analyzer configuration: input roots, walk filters, worker count, and
//! output location. Loadable from a JSON file; CLI flags override fields.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{ArchmapError, ArchmapResult};

/// Default cap on a single source file; larger files are skipped with a
/// warning so no read can stall the run unboundedly.
pub const DEFAULT_MAX_FILE_BYTES: u64 = 2 * 1024 * 1024;

pub const DEFAULT_WORKERS: usize = 4;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields, rename_all = "camelCase")]
pub struct AnalyzerConfig {
    /// Filesystem roots to analyze.
    pub roots: Vec<PathBuf>,

    /// Glob patterns excluded from the walk (in addition to VCS ignore
    /// files and the implicit `.git` / output-dir skips).
    pub exclude_globs: Vec<String>,

    /// Maximum directory depth below each root; `None` is unbounded.
    pub max_depth: Option<usize>,

    pub follow_symlinks: bool,

    pub max_file_bytes: u64,

    /// Extraction worker threads.
    pub workers: usize,

    pub output_dir: PathBuf,

    /// Label of the synthesized System root node.
    pub system_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            roots: vec![PathBuf::from(".")],
            exclude_globs: Vec::new(),
            max_depth: None,
            follow_symlinks: false,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            workers: DEFAULT_WORKERS,
            output_dir: PathBuf::from("archmap-out"),
            system_name: "System".to_string(),
        }
    }
}

impl AnalyzerConfig {
    pub fn new(root: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            roots: vec![root.into()],
            output_dir: output_dir.into(),
            ..Self::default()
        }
    }

    /// Load a config from a JSON file. Unknown keys are rejected so a
    /// typoed option fails loudly instead of being ignored.
    pub fn from_file(path: &Path) -> ArchmapResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&text)
            .map_err(|e| ArchmapError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ArchmapResult<()> {
        if self.roots.is_empty() {
            return Err(ArchmapError::Config("at least one root is required".into()));
        }
        if self.workers == 0 {
            return Err(ArchmapError::Config("workers must be >= 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AnalyzerConfig::default();
        assert!(!config.follow_symlinks);
        assert_eq!(config.max_file_bytes, DEFAULT_MAX_FILE_BYTES);
        assert_eq!(config.workers, DEFAULT_WORKERS);
        assert!(config.max_depth.is_none());
    }

    #[test]
    fn test_validate_rejects_empty_roots() {
        let config = AnalyzerConfig {
            roots: vec![],
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_zero_workers() {
        let config = AnalyzerConfig {
            workers: 0,
            ..AnalyzerConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archmap.json");
        let json = r#"{
            "roots": ["src"],
            "excludeGlobs": ["**/generated/**"],
            "maxDepth": 12,
            "followSymlinks": true,
            "systemName": "Payments"
        }"#;
        std::fs::write(&path, json).unwrap();

        let config = AnalyzerConfig::from_file(&path).unwrap();
        assert_eq!(config.roots, vec![PathBuf::from("src")]);
        assert_eq!(config.exclude_globs, vec!["**/generated/**".to_string()]);
        assert_eq!(config.max_depth, Some(12));
        assert!(config.follow_symlinks);
        assert_eq!(config.system_name, "Payments");
        // Unspecified fields fall back to defaults.
        assert_eq!(config.workers, DEFAULT_WORKERS);
    }

    #[test]
    fn test_from_file_bad_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AnalyzerConfig::from_file(&path).is_err());
    }
}
