//! Source tree walking: enumerates analyzable files under the configured
//! roots, applying exclude globs, depth limits, and symlink policy.

use std::path::{Path, PathBuf};

use ignore::overrides::OverrideBuilder;
use ignore::WalkBuilder;
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::config::AnalyzerConfig;
use crate::errors::{ArchmapError, ArchmapResult, Warning};

// ---------------------------------------------------------------------------
// Language detection
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Java,
    Kotlin,
    TypeScript,
    Python,
}

impl Language {
    pub fn as_str(self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::TypeScript => "typescript",
            Language::Python => "python",
        }
    }
}

const LANGUAGE_BY_EXTENSION: &[(&str, Language)] = &[
    ("java", Language::Java),
    ("kt", Language::Kotlin),
    ("kts", Language::Kotlin),
    ("ts", Language::TypeScript),
    ("tsx", Language::TypeScript),
    ("py", Language::Python),
];

pub fn detect_language(path: &Path) -> Option<Language> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    LANGUAGE_BY_EXTENSION
        .iter()
        .find(|(e, _)| *e == ext)
        .map(|(_, lang)| *lang)
}

// ---------------------------------------------------------------------------
// Walk output
// ---------------------------------------------------------------------------

/// A file selected by the walk, before its content is loaded.
#[derive(Clone, Debug)]
pub struct SourceFile {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: Language,
}

/// A loaded source unit, ready for extraction. Transient: dropped as soon
/// as its facts are harvested.
#[derive(Clone, Debug)]
pub struct SourceUnit {
    pub path: PathBuf,
    pub relative_path: String,
    pub language: Language,
    pub text: String,
    pub content_hash: String,
}

fn relative_to(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
}

/// Lexical containment check. Both sides are resolved against the current
/// directory first, so a relative `dir` still matches `./`-prefixed walk
/// paths (plain `starts_with` compares components and treats those as
/// different).
fn is_within(path: &Path, dir: &Path) -> bool {
    match (std::path::absolute(path), std::path::absolute(dir)) {
        (Ok(path), Ok(dir)) => path.starts_with(dir),
        _ => path.starts_with(dir),
    }
}

/// Enumerate source files under every configured root.
///
/// An unreadable root is fatal; individual walk errors degrade into
/// [`Warning::SkippedFile`]. Results are sorted by path per root, so an
/// unchanged tree always walks identically.
pub fn scan_sources(config: &AnalyzerConfig) -> ArchmapResult<(Vec<SourceFile>, Vec<Warning>)> {
    let mut files = Vec::new();
    let mut warnings = Vec::new();

    for root in &config.roots {
        // The root itself must be readable; this is the one fatal IO case.
        std::fs::metadata(root)?;

        let mut overrides = OverrideBuilder::new(root);
        for glob in &config.exclude_globs {
            overrides
                .add(&format!("!{glob}"))
                .map_err(|e| ArchmapError::Config(format!("bad exclude glob {glob:?}: {e}")))?;
        }
        let overrides = overrides
            .build()
            .map_err(|e| ArchmapError::Config(format!("exclude globs: {e}")))?;

        let walker = WalkBuilder::new(root)
            .max_depth(config.max_depth)
            .follow_links(config.follow_symlinks)
            .overrides(overrides)
            .sort_by_file_path(|a, b| a.cmp(b))
            .build();

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    warnings.push(Warning::SkippedFile {
                        path: root.display().to_string(),
                        detail: e.to_string(),
                    });
                    continue;
                }
            };
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            let path = entry.into_path();
            // Never descend into our own output.
            if is_within(&path, &config.output_dir) {
                continue;
            }
            let Some(language) = detect_language(&path) else {
                continue;
            };
            files.push(SourceFile {
                relative_path: relative_to(root, &path),
                path,
                language,
            });
        }
    }

    debug!(files = files.len(), "source scan complete");
    Ok((files, warnings))
}

/// Load one source unit. Oversized or unreadable files become
/// [`Warning::SkippedFile`]; invalid UTF-8 is a [`Warning::Parse`]
/// (the unit is malformed, not missing).
pub fn load_source_unit(file: &SourceFile, max_file_bytes: u64) -> Result<SourceUnit, Warning> {
    let metadata = std::fs::metadata(&file.path)
        .map_err(|e| Warning::skipped(&file.path, e.to_string()))?;
    if metadata.len() > max_file_bytes {
        return Err(Warning::skipped(
            &file.path,
            format!("{} bytes exceeds cap of {max_file_bytes}", metadata.len()),
        ));
    }

    let bytes =
        std::fs::read(&file.path).map_err(|e| Warning::skipped(&file.path, e.to_string()))?;
    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let content_hash = format!("{:x}", hasher.finalize());

    let text = String::from_utf8(bytes)
        .map_err(|_| Warning::parse(file.relative_path.clone(), "invalid UTF-8"))?;

    Ok(SourceUnit {
        path: file.path.clone(),
        relative_path: file.relative_path.clone(),
        language: file.language,
        text,
        content_hash,
    })
}
