//! The unified architecture graph: node/edge records and the arena they
//! live in. Nodes are owned exclusively by [`ModelGraph`]; the projector
//! and emitters only ever borrow them.

pub mod builder;
pub mod rules;

use std::collections::{BTreeMap, HashSet};

use indexmap::IndexMap;
use serde::Serialize;

pub use builder::{ModelBuilder, DATABASE_NODE_ID, EXTERNAL_NODE_ID, SYSTEM_NODE_ID};
pub use rules::{default_rules, ContainerRule, RuleKind};

// ---------------------------------------------------------------------------
// Node and edge records
// ---------------------------------------------------------------------------

/// C4 abstraction level, ordered from coarsest to finest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    System,
    Container,
    Component,
    Class,
}

impl Level {
    /// Coarse-to-fine rank; smaller is coarser.
    pub fn rank(self) -> u8 {
        match self {
            Level::System => 0,
            Level::Container => 1,
            Level::Component => 2,
            Level::Class => 3,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Level::System => "System",
            Level::Container => "Container",
            Level::Component => "Component",
            Level::Class => "Class",
        }
    }
}

/// Structural role of a node, used for styling and stereotypes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    System,
    Container,
    Database,
    External,
    Component,
    Service,
    Controller,
    Repository,
    Entity,
    Config,
    Class,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::System => "System",
            NodeKind::Container => "Container",
            NodeKind::Database => "Database",
            NodeKind::External => "External",
            NodeKind::Component => "Component",
            NodeKind::Service => "Service",
            NodeKind::Controller => "Controller",
            NodeKind::Repository => "Repository",
            NodeKind::Entity => "Entity",
            NodeKind::Config => "Config",
            NodeKind::Class => "Class",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum RelationKind {
    Contains,
    DependsOn,
    PersistsTo,
}

impl RelationKind {
    pub fn name(self) -> &'static str {
        match self {
            RelationKind::Contains => "Contains",
            RelationKind::DependsOn => "DependsOn",
            RelationKind::PersistsTo => "PersistsTo",
        }
    }
}

/// A node in the unified graph. `id` is the normalized fully-qualified
/// name and is stable across runs on an unchanged tree.
#[derive(Clone, Debug, Serialize)]
pub struct ModelNode {
    pub id: String,
    pub level: Level,
    pub label: String,
    pub kind: NodeKind,
    pub metadata: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct ModelEdge {
    pub source: String,
    pub target: String,
    pub relation: RelationKind,
    pub label: String,
}

// ---------------------------------------------------------------------------
// Id normalization
// ---------------------------------------------------------------------------

/// Normalize a fully-qualified name into a stable node id: trimmed,
/// generic parameters stripped, path separators folded to dots.
pub fn normalize_id(qualified_name: &str) -> String {
    let trimmed = qualified_name.trim();
    let without_generics = match trimmed.find('<') {
        Some(pos) => &trimmed[..pos],
        None => trimmed,
    };
    without_generics
        .replace("::", ".")
        .replace('/', ".")
        .trim_matches('.')
        .to_string()
}

/// Convert a node id into an identifier valid in both output grammars.
pub fn sanitize_identifier(id: &str) -> String {
    let mut out = String::with_capacity(id.len());
    for c in id.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
        } else {
            out.push('_');
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

// ---------------------------------------------------------------------------
// Graph arena
// ---------------------------------------------------------------------------

/// Insertion-ordered arena of nodes plus an edge list. Edges reference
/// nodes by id; `Contains` edges are constrained to a forest (at most one
/// parent per node).
#[derive(Clone, Debug, Default, Serialize)]
pub struct ModelGraph {
    nodes: IndexMap<String, ModelNode>,
    edges: Vec<ModelEdge>,
    #[serde(skip)]
    edge_seen: HashSet<(String, String, RelationKind)>,
}

impl ModelGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node, or merge it into an existing node with the same id.
    /// Merging keeps the first-seen label and level and unions metadata
    /// without overwriting existing keys, so insertion is idempotent.
    pub fn upsert_node(&mut self, node: ModelNode) -> &ModelNode {
        let id = node.id.clone();
        match self.nodes.entry(id) {
            indexmap::map::Entry::Occupied(mut occupied) => {
                let existing = occupied.get_mut();
                for (key, value) in node.metadata {
                    existing.metadata.entry(key).or_insert(value);
                }
                occupied.into_mut()
            }
            indexmap::map::Entry::Vacant(vacant) => vacant.insert(node),
        }
    }

    /// Add an edge if an identical (source, target, relation) edge is not
    /// already present. A `Contains` edge is also dropped when the target
    /// already has a different parent, preserving the forest invariant.
    pub fn add_edge(&mut self, edge: ModelEdge) -> bool {
        let key = (edge.source.clone(), edge.target.clone(), edge.relation);
        if self.edge_seen.contains(&key) {
            return false;
        }
        if edge.relation == RelationKind::Contains && self.parent_of(&edge.target).is_some() {
            return false;
        }
        self.edge_seen.insert(key);
        self.edges.push(edge);
        true
    }

    pub fn node(&self, id: &str) -> Option<&ModelNode> {
        self.nodes.get(id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ModelNode> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[ModelEdge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// `Contains` parent of a node, if any.
    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.edges
            .iter()
            .find(|e| e.relation == RelationKind::Contains && e.target == id)
            .map(|e| e.source.as_str())
    }

    /// Direct `Contains` children of a node, in edge insertion order.
    pub fn children_of<'a>(&'a self, id: &str) -> Vec<&'a ModelNode> {
        self.edges
            .iter()
            .filter(|e| e.relation == RelationKind::Contains && e.source == id)
            .filter_map(|e| self.nodes.get(&e.target))
            .collect()
    }

    /// Walk parent pointers until a node at level `level` (or the root)
    /// is reached. Returns the node itself when it already sits at or
    /// above the requested level.
    pub fn ancestor_at_level<'a>(&'a self, id: &str, level: Level) -> Option<&'a ModelNode> {
        let mut current = self.nodes.get(id)?;
        while current.level.rank() > level.rank() {
            match self.parent_of(&current.id) {
                Some(parent_id) => current = self.nodes.get(parent_id)?,
                None => break,
            }
        }
        Some(current)
    }

    /// Verify the `Contains` subgraph is a forest: every non-root node
    /// has exactly one parent and parent-pointer walks terminate.
    pub fn assert_containment(&self) -> Result<(), String> {
        for node in self.nodes.values() {
            let parents: Vec<&str> = self
                .edges
                .iter()
                .filter(|e| e.relation == RelationKind::Contains && e.target == node.id)
                .map(|e| e.source.as_str())
                .collect();
            if parents.len() > 1 {
                return Err(format!("node {} has {} Contains parents", node.id, parents.len()));
            }
            // Parent-pointer walk with a visited set catches cycles.
            let mut visited: HashSet<&str> = HashSet::new();
            let mut current = node.id.as_str();
            while let Some(parent) = self.parent_of(current) {
                if !visited.insert(current) {
                    return Err(format!("Contains cycle through {}", node.id));
                }
                current = parent;
            }
        }
        Ok(())
    }

    /// Merge another graph into this one through the same merge-by-id
    /// path used for facts. Supports cross-run landscape aggregation.
    pub fn absorb(&mut self, other: ModelGraph) {
        let ModelGraph { nodes, edges, .. } = other;
        for (_, node) in nodes {
            self.upsert_node(node);
        }
        for edge in edges {
            self.add_edge(edge);
        }
    }
}
