//! Run orchestration: walk, extract, build, project, emit. Each stage
//! consumes the previous stage's output and nothing else, so the whole
//! run reads left to right.

use std::time::Instant;

use rayon::prelude::*;
use rayon::ThreadPoolBuilder;
use serde::Serialize;
use tracing::{info, warn};

use crate::analyzer::facts::{extract_facts, Fact};
use crate::analyzer::walker::{load_source_unit, scan_sources, SourceFile};
use crate::config::AnalyzerConfig;
use crate::emit;
use crate::errors::{ArchmapError, ArchmapResult, CancelToken, RunOutputs, Warning};
use crate::model::{ModelBuilder, ModelGraph};
use crate::view::{standard_views, View};

/// Run counters, carried into the report and `model.json`.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RunStats {
    pub files_scanned: usize,
    pub files_loaded: usize,
    pub facts_extracted: usize,
    pub duration_ms: u64,
}

/// Content digest of one analyzed file, carried into `model.json` so an
/// unchanged-tree re-run can be verified input-first.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SourceDigest {
    pub path: String,
    pub sha256: String,
}

/// Everything a completed run produced.
#[derive(Debug)]
pub struct AnalysisOutcome {
    pub model: ModelGraph,
    pub views: Vec<View>,
    pub warnings: Vec<Warning>,
    pub stats: RunStats,
    pub sources: Vec<SourceDigest>,
    pub outputs: RunOutputs,
}

#[derive(Debug, Default)]
struct FileOutcome {
    facts: Vec<Fact>,
    warnings: Vec<Warning>,
    digest: Option<SourceDigest>,
}

fn process_file(
    file: &SourceFile,
    max_file_bytes: u64,
    cancel: &CancelToken,
) -> Result<FileOutcome, ArchmapError> {
    if cancel.is_cancelled() {
        return Err(ArchmapError::Cancelled);
    }
    let mut outcome = FileOutcome::default();
    match load_source_unit(file, max_file_bytes) {
        Ok(unit) => {
            outcome.digest = Some(SourceDigest {
                path: unit.relative_path.clone(),
                sha256: unit.content_hash.clone(),
            });
            let harvest = extract_facts(&unit);
            outcome.facts = harvest.facts;
            outcome.warnings = harvest.warnings;
        }
        Err(warning) => outcome.warnings.push(warning),
    }
    Ok(outcome)
}

/// Load and extract every scanned file. With more than one worker the
/// files are processed on a dedicated rayon pool; if the pool cannot be
/// built the run degrades to sequential extraction instead of failing.
/// Result order matches input order either way.
fn extract_all(
    files: &[SourceFile],
    config: &AnalyzerConfig,
    cancel: &CancelToken,
) -> ArchmapResult<Vec<FileOutcome>> {
    let job = |file: &SourceFile| process_file(file, config.max_file_bytes, cancel);

    if config.workers > 1 {
        match ThreadPoolBuilder::new().num_threads(config.workers).build() {
            Ok(pool) => {
                return pool.install(|| files.par_iter().map(|file| job(file)).collect())
            }
            Err(e) => {
                warn!(error = %e, "thread pool unavailable, extracting sequentially");
            }
        }
    }
    files.iter().map(|file| job(file)).collect()
}

/// Run a full analysis and write every output artifact.
pub fn run_analysis(config: &AnalyzerConfig) -> ArchmapResult<AnalysisOutcome> {
    run_analysis_with_cancel(config, &CancelToken::new())
}

/// As [`run_analysis`], checking the token between files; a cancelled
/// run fails with [`ArchmapError::Cancelled`] before writing outputs.
pub fn run_analysis_with_cancel(
    config: &AnalyzerConfig,
    cancel: &CancelToken,
) -> ArchmapResult<AnalysisOutcome> {
    config.validate()?;
    let started = Instant::now();

    let (files, mut warnings) = scan_sources(config)?;
    let mut stats = RunStats {
        files_scanned: files.len(),
        ..RunStats::default()
    };
    info!(files = files.len(), roots = config.roots.len(), "scan complete");

    let mut facts: Vec<Fact> = Vec::new();
    let mut sources: Vec<SourceDigest> = Vec::new();
    for outcome in extract_all(&files, config, cancel)? {
        if let Some(digest) = outcome.digest {
            stats.files_loaded += 1;
            sources.push(digest);
        }
        facts.extend(outcome.facts);
        warnings.extend(outcome.warnings);
    }
    stats.facts_extracted = facts.len();
    info!(facts = facts.len(), "extraction complete");

    let builder = ModelBuilder::new(config.system_name.as_str());
    let (model, build_warnings) = builder.build(&facts);
    warnings.extend(build_warnings);

    let views = standard_views(&model);
    stats.duration_ms = started.elapsed().as_millis() as u64;
    let outputs = emit::write_all(config, &model, &views, &warnings, &stats, &sources)?;
    info!(
        nodes = model.node_count(),
        edges = model.edges().len(),
        warnings = warnings.len(),
        ms = stats.duration_ms,
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        model,
        views,
        warnings,
        stats,
        sources,
        outputs,
    })
}
