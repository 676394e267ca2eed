//! The human-readable run report and the machine-readable model dump.

use serde::Serialize;

use crate::analyzer::pipeline::{RunStats, SourceDigest};
use crate::errors::Warning;
use crate::model::{Level, ModelGraph, SYSTEM_NODE_ID};

/// Serialized as `model.json`; the full graph plus run provenance and
/// the per-file input digests (comparing `sources` across two runs shows
/// whether a model diff traces back to an input change).
#[derive(Debug, Serialize)]
pub struct ModelDocument<'a> {
    pub system: &'a str,
    pub stats: &'a RunStats,
    pub sources: &'a [SourceDigest],
    pub graph: &'a ModelGraph,
}

pub fn model_document<'a>(
    graph: &'a ModelGraph,
    system_name: &'a str,
    stats: &'a RunStats,
    sources: &'a [SourceDigest],
) -> ModelDocument<'a> {
    ModelDocument {
        system: system_name,
        stats,
        sources,
        graph,
    }
}

fn class_count_under(graph: &ModelGraph, container_id: &str) -> usize {
    graph
        .children_of(container_id)
        .iter()
        .map(|component| graph.children_of(&component.id).len())
        .sum()
}

/// Render `analysis-report.md`.
pub fn analysis_report(
    graph: &ModelGraph,
    warnings: &[Warning],
    stats: &RunStats,
    system_name: &str,
) -> String {
    let mut out = String::new();
    out.push_str(&format!("# Architecture analysis: {system_name}\n\n"));

    out.push_str("## Summary\n\n");
    out.push_str("| Metric | Value |\n|---|---|\n");
    out.push_str(&format!("| Files scanned | {} |\n", stats.files_scanned));
    out.push_str(&format!("| Files analyzed | {} |\n", stats.files_loaded));
    out.push_str(&format!("| Facts extracted | {} |\n", stats.facts_extracted));
    out.push_str(&format!("| Model nodes | {} |\n", graph.node_count()));
    out.push_str(&format!("| Model edges | {} |\n", graph.edges().len()));
    out.push_str(&format!("| Warnings | {} |\n", warnings.len()));
    out.push_str(&format!("| Duration (ms) | {} |\n\n", stats.duration_ms));

    out.push_str("## Containers\n\n");
    let containers: Vec<_> = graph
        .children_of(SYSTEM_NODE_ID)
        .into_iter()
        .filter(|n| n.level == Level::Container)
        .collect();
    if containers.is_empty() {
        out.push_str("No containers were derived from the scanned sources.\n\n");
    } else {
        for container in containers {
            out.push_str(&format!(
                "- **{}** (`{}`): {} classes\n",
                container.label,
                container.id,
                class_count_under(graph, &container.id),
            ));
        }
        out.push('\n');
    }

    out.push_str("## Warnings\n\n");
    if warnings.is_empty() {
        out.push_str("None.\n");
    } else {
        for warning in warnings {
            out.push_str(&format!("- {}\n", warning.describe()));
        }
    }

    out
}
