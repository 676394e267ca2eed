//! Error and warning types for the archmap core library.

use std::path::PathBuf;

use serde::Serialize;

/// Top-level error enum. Only two conditions are fatal to a whole run:
/// an unreadable analysis root and a failed output write. Everything else
/// degrades into a [`Warning`] carried alongside the successful result.
#[derive(Debug, thiserror::Error)]
pub enum ArchmapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Emit error: {0}")]
    Emit(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Analysis cancelled")]
    Cancelled,
}

pub type ArchmapResult<T> = Result<T, ArchmapError>;

/// Non-fatal conditions aggregated during a run and reported in the
/// warnings summary. A run always produces best-effort output plus this
/// list, never a silent partial result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Warning {
    /// A source unit could not be scanned; it yields zero facts.
    Parse { path: String, detail: String },

    /// A file was skipped before extraction (unreadable, oversized).
    SkippedFile { path: String, detail: String },

    /// A declaration matched more than one role marker; the first rule
    /// in declared order won.
    ClassificationAmbiguity { name: String, chosen: String },

    /// A declared dependency did not resolve to any known node and was
    /// routed to the synthetic External node.
    UnresolvedDependency { from: String, to: String },
}

impl Warning {
    pub fn skipped(path: &std::path::Path, detail: impl Into<String>) -> Self {
        Warning::SkippedFile {
            path: path.display().to_string(),
            detail: detail.into(),
        }
    }

    pub fn parse(path: impl Into<String>, detail: impl Into<String>) -> Self {
        Warning::Parse {
            path: path.into(),
            detail: detail.into(),
        }
    }

    /// One-line rendering for the CLI summary.
    pub fn describe(&self) -> String {
        match self {
            Warning::Parse { path, detail } => format!("parse: {path}: {detail}"),
            Warning::SkippedFile { path, detail } => format!("skipped: {path}: {detail}"),
            Warning::ClassificationAmbiguity { name, chosen } => {
                format!("ambiguous role for {name}, classified as {chosen}")
            }
            Warning::UnresolvedDependency { from, to } => {
                format!("unresolved dependency {from} -> {to} (routed to External)")
            }
        }
    }
}

/// Cancellation token checked between files during extraction. Cloning
/// shares the underlying flag.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(std::sync::Arc<std::sync::atomic::AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, std::sync::atomic::Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(std::sync::atomic::Ordering::Relaxed)
    }
}

/// Files produced by a run, returned so the orchestrating layer can
/// surface them without re-listing the output directory.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunOutputs {
    pub dsl: Option<PathBuf>,
    pub class_diagram: Option<PathBuf>,
    pub report: Option<PathBuf>,
    pub model_json: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_token_roundtrip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn test_warning_describe() {
        let w = Warning::UnresolvedDependency {
            from: "UserService".to_string(),
            to: "UserRepository".to_string(),
        };
        assert!(w.describe().contains("UserService"));
        assert!(w.describe().contains("External"));
    }

    #[test]
    fn test_io_error_converts() {
        let err: ArchmapError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, ArchmapError::Io(_)));
    }
}
