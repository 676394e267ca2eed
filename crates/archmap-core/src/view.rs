//! View projection: derives each diagram level from the unified graph by
//! rolling edges up to the requested abstraction level. Projection only
//! borrows the graph; every view is an independent snapshot.

use indexmap::IndexMap;
use serde::Serialize;

use crate::model::{Level, ModelGraph, NodeKind, RelationKind};

/// A node as it appears in one view; a flattened copy of the model node.
#[derive(Clone, Debug, Serialize)]
pub struct ViewNode {
    pub id: String,
    pub label: String,
    pub kind: NodeKind,
    pub level: Level,
}

/// An aggregated edge between two view nodes. `relations` lists the
/// distinct relation kinds folded into this edge, sorted.
#[derive(Clone, Debug, Serialize)]
pub struct ViewEdge {
    pub source: String,
    pub target: String,
    pub relations: Vec<RelationKind>,
    pub label: String,
}

#[derive(Clone, Debug, Serialize)]
pub struct View {
    pub name: String,
    pub level: Level,
    pub nodes: Vec<ViewNode>,
    pub edges: Vec<ViewEdge>,
}

fn view_name(level: Level) -> &'static str {
    match level {
        Level::System => "System Context",
        Level::Container => "Container",
        Level::Component => "Component",
        Level::Class => "Class",
    }
}

/// Project the graph onto one abstraction level.
///
/// Nodes at or above the level are kept in graph insertion order. Every
/// non-containment edge has both endpoints folded to their ancestor at
/// the level; edges that collapse onto a single node are dropped, and
/// parallel edges between the same pair merge into one aggregate edge.
pub fn project(graph: &ModelGraph, level: Level) -> View {
    let nodes: Vec<ViewNode> = graph
        .nodes()
        .filter(|n| n.level.rank() <= level.rank())
        .map(|n| ViewNode {
            id: n.id.clone(),
            label: n.label.clone(),
            kind: n.kind,
            level: n.level,
        })
        .collect();

    let mut folded: IndexMap<(String, String), ViewEdge> = IndexMap::new();
    for edge in graph.edges() {
        if edge.relation == RelationKind::Contains {
            continue;
        }
        let Some(source) = graph.ancestor_at_level(&edge.source, level) else {
            continue;
        };
        let Some(target) = graph.ancestor_at_level(&edge.target, level) else {
            continue;
        };
        if source.id == target.id {
            continue;
        }
        let entry = folded
            .entry((source.id.clone(), target.id.clone()))
            .or_insert_with(|| ViewEdge {
                source: source.id.clone(),
                target: target.id.clone(),
                relations: Vec::new(),
                label: edge.label.clone(),
            });
        if !entry.relations.contains(&edge.relation) {
            entry.relations.push(edge.relation);
            entry.relations.sort();
        }
    }

    View {
        name: view_name(level).to_string(),
        level,
        nodes,
        edges: folded.into_values().collect(),
    }
}

/// The standard set of views, coarsest first.
pub fn standard_views(graph: &ModelGraph) -> Vec<View> {
    [Level::System, Level::Container, Level::Component, Level::Class]
        .into_iter()
        .map(|level| project(graph, level))
        .collect()
}
