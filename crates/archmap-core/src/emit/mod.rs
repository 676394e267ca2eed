//! Output generation. Both text grammars are produced through a small
//! statement tree rather than string concatenation, so nesting and
//! indentation are correct by construction.

pub mod dsl;
pub mod plantuml;
pub mod report;

use std::path::Path;

use tracing::info;

use crate::analyzer::pipeline::{RunStats, SourceDigest};
use crate::config::AnalyzerConfig;
use crate::errors::{ArchmapError, ArchmapResult, RunOutputs, Warning};
use crate::model::ModelGraph;
use crate::view::View;

// ---------------------------------------------------------------------------
// Statement tree
// ---------------------------------------------------------------------------

/// One statement of a brace-structured output grammar.
#[derive(Clone, Debug)]
pub enum Stmt {
    Line(String),
    Block { header: String, body: Vec<Stmt> },
}

impl Stmt {
    pub fn line(text: impl Into<String>) -> Self {
        Stmt::Line(text.into())
    }

    pub fn block(header: impl Into<String>, body: Vec<Stmt>) -> Self {
        Stmt::Block {
            header: header.into(),
            body,
        }
    }
}

const INDENT: &str = "    ";

/// Render a statement list with four-space indentation and a trailing
/// newline. Rendering is infallible; all validation happened while the
/// tree was built.
pub fn render(stmts: &[Stmt]) -> String {
    let mut out = String::new();
    for stmt in stmts {
        render_into(&mut out, stmt, 0);
    }
    out
}

fn render_into(out: &mut String, stmt: &Stmt, depth: usize) {
    match stmt {
        Stmt::Line(text) => {
            if text.is_empty() {
                out.push('\n');
            } else {
                for _ in 0..depth {
                    out.push_str(INDENT);
                }
                out.push_str(text);
                out.push('\n');
            }
        }
        Stmt::Block { header, body } => {
            for _ in 0..depth {
                out.push_str(INDENT);
            }
            out.push_str(header);
            out.push_str(" {\n");
            for child in body {
                render_into(out, child, depth + 1);
            }
            for _ in 0..depth {
                out.push_str(INDENT);
            }
            out.push_str("}\n");
        }
    }
}

/// Escape a string for use inside double quotes in either grammar.
pub fn quote(text: &str) -> String {
    let escaped = text.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

// ---------------------------------------------------------------------------
// File output
// ---------------------------------------------------------------------------

fn write_file(path: &Path, content: &str) -> ArchmapResult<()> {
    std::fs::write(path, content)
        .map_err(|e| ArchmapError::Emit(format!("{}: {e}", path.display())))
}

/// Write every artifact of a run into the configured output directory.
/// Any write failure is fatal; earlier outputs are left behind as-is.
pub fn write_all(
    config: &AnalyzerConfig,
    graph: &ModelGraph,
    views: &[View],
    warnings: &[Warning],
    stats: &RunStats,
    sources: &[SourceDigest],
) -> ArchmapResult<RunOutputs> {
    std::fs::create_dir_all(&config.output_dir).map_err(|e| {
        ArchmapError::Emit(format!("{}: {e}", config.output_dir.display()))
    })?;

    let dsl_path = config.output_dir.join("workspace.dsl");
    write_file(&dsl_path, &dsl::workspace_dsl(graph, views, &config.system_name))?;

    let puml_path = config.output_dir.join("classes.puml");
    write_file(&puml_path, &plantuml::class_diagram(graph, &config.system_name))?;

    let report_path = config.output_dir.join("analysis-report.md");
    write_file(
        &report_path,
        &report::analysis_report(graph, warnings, stats, &config.system_name),
    )?;

    let json_path = config.output_dir.join("model.json");
    let document = report::model_document(graph, &config.system_name, stats, sources);
    write_file(&json_path, &serde_json::to_string_pretty(&document)?)?;

    info!(dir = %config.output_dir.display(), "outputs written");
    Ok(RunOutputs {
        dsl: Some(dsl_path),
        class_diagram: Some(puml_path),
        report: Some(report_path),
        model_json: Some(json_path),
    })
}
