//! Graph construction: folds extracted facts into the unified
//! architecture graph. Facts are sorted before insertion, so the result
//! is identical for any permutation of the input.

use std::collections::BTreeMap;

use tracing::debug;

use crate::analyzer::facts::{Fact, FactKind};
use crate::errors::Warning;
use crate::model::rules::{assign_container, default_rules, ContainerRule, ContainerSpec};
use crate::model::{normalize_id, Level, ModelEdge, ModelGraph, ModelNode, NodeKind, RelationKind};

/// Root node of every graph: the software system under analysis.
pub const SYSTEM_NODE_ID: &str = "system";

/// Synthetic sink for dependencies that resolve to nothing in the scanned
/// tree. Sits at system level with no parent, so it survives rollup to
/// every view.
pub const EXTERNAL_NODE_ID: &str = "external";

/// Synthetic database container, present whenever repositories are.
pub const DATABASE_NODE_ID: &str = "database";

const DEPENDS_LABEL: &str = "uses";
const PERSISTS_LABEL: &str = "reads from and writes to";

pub struct ModelBuilder {
    rules: Vec<ContainerRule>,
    system_name: String,
}

impl ModelBuilder {
    pub fn new(system_name: impl Into<String>) -> Self {
        Self {
            rules: default_rules(),
            system_name: system_name.into(),
        }
    }

    /// Replace the container-assignment rule list; order is precedence.
    pub fn with_rules(mut self, rules: Vec<ContainerRule>) -> Self {
        self.rules = rules;
        self
    }

    /// Build the unified graph from a batch of facts.
    ///
    /// Insertion order is derived from a sort over (normalized id,
    /// path, line), never from input order. Dependency edges that cannot
    /// be resolved are routed to the External node and reported.
    pub fn build(&self, facts: &[Fact]) -> (ModelGraph, Vec<Warning>) {
        let mut graph = ModelGraph::new();
        let mut warnings = Vec::new();

        let mut ordered: Vec<&Fact> = facts.iter().collect();
        ordered.sort_by(|a, b| {
            (normalize_id(&a.qualified_name), &a.relative_path, a.line).cmp(&(
                normalize_id(&b.qualified_name),
                &b.relative_path,
                b.line,
            ))
        });

        graph.upsert_node(ModelNode {
            id: SYSTEM_NODE_ID.to_string(),
            level: Level::System,
            label: self.system_name.clone(),
            kind: NodeKind::System,
            metadata: BTreeMap::new(),
        });

        // Pass 1: containment skeleton plus the class nodes themselves.
        let mut has_repositories = false;
        for fact in &ordered {
            let container = assign_container(fact, &self.rules);
            self.ensure_container(&mut graph, container);
            let component_id = self.ensure_component(&mut graph, container, fact);

            let class_id = normalize_id(&fact.qualified_name);
            graph.upsert_node(ModelNode {
                id: class_id.clone(),
                level: Level::Class,
                label: fact.declared_name.clone(),
                kind: class_node_kind(fact.kind),
                metadata: class_metadata(fact),
            });
            graph.add_edge(contains(&component_id, &class_id));

            if fact.kind == FactKind::Repository {
                has_repositories = true;
            }
        }

        if has_repositories {
            self.ensure_database(&mut graph);
        }

        // Name resolution tables: exact normalized id first, then unique
        // simple names. Both built from the sorted fact list.
        let mut by_simple_name: BTreeMap<&str, Option<String>> = BTreeMap::new();
        for fact in &ordered {
            let id = normalize_id(&fact.qualified_name);
            by_simple_name
                .entry(fact.declared_name.as_str())
                .and_modify(|slot| {
                    // Two distinct declarations share the name: ambiguous,
                    // resolution refuses rather than guessing.
                    if slot.as_deref() != Some(id.as_str()) {
                        *slot = None;
                    }
                })
                .or_insert(Some(id));
        }

        // Pass 2: dependency edges.
        for fact in &ordered {
            let source_id = normalize_id(&fact.qualified_name);
            for dep in &fact.declared_dependencies {
                let target_id = resolve(&graph, &by_simple_name, dep);
                let Some(target_id) = target_id else {
                    graph.upsert_node(external_node());
                    graph.add_edge(ModelEdge {
                        source: source_id.clone(),
                        target: EXTERNAL_NODE_ID.to_string(),
                        relation: RelationKind::DependsOn,
                        label: DEPENDS_LABEL.to_string(),
                    });
                    warnings.push(Warning::UnresolvedDependency {
                        from: fact.declared_name.clone(),
                        to: dep.clone(),
                    });
                    continue;
                };
                if target_id == source_id {
                    continue;
                }
                let relation = dependency_relation(&graph, fact, &target_id);
                graph.add_edge(ModelEdge {
                    source: source_id.clone(),
                    target: target_id,
                    relation,
                    label: match relation {
                        RelationKind::PersistsTo => PERSISTS_LABEL.to_string(),
                        _ => DEPENDS_LABEL.to_string(),
                    },
                });
            }
            if fact.kind == FactKind::Repository {
                graph.add_edge(ModelEdge {
                    source: source_id,
                    target: DATABASE_NODE_ID.to_string(),
                    relation: RelationKind::PersistsTo,
                    label: PERSISTS_LABEL.to_string(),
                });
            }
        }

        debug_assert!(graph.assert_containment().is_ok());
        debug!(
            nodes = graph.node_count(),
            edges = graph.edges().len(),
            warnings = warnings.len(),
            "model built"
        );
        (graph, warnings)
    }

    fn ensure_container(&self, graph: &mut ModelGraph, spec: &ContainerSpec) {
        if !graph.contains_node(spec.id) {
            graph.upsert_node(ModelNode {
                id: spec.id.to_string(),
                level: Level::Container,
                label: spec.label.to_string(),
                kind: NodeKind::Container,
                metadata: container_metadata(spec),
            });
            graph.add_edge(contains(SYSTEM_NODE_ID, spec.id));
        }
    }

    /// Component nodes group classes by package within a container.
    fn ensure_component(
        &self,
        graph: &mut ModelGraph,
        container: &ContainerSpec,
        fact: &Fact,
    ) -> String {
        let package = if fact.package.is_empty() {
            "root"
        } else {
            fact.package.as_str()
        };
        let component_id = normalize_id(&format!("{}.{package}", container.id));
        if !graph.contains_node(&component_id) {
            let label = package.rsplit('.').next().unwrap_or(package).to_string();
            let mut metadata = BTreeMap::new();
            metadata.insert("package".to_string(), package.to_string());
            graph.upsert_node(ModelNode {
                id: component_id.clone(),
                level: Level::Component,
                label,
                kind: NodeKind::Component,
                metadata,
            });
            graph.add_edge(contains(container.id, &component_id));
        }
        component_id
    }

    fn ensure_database(&self, graph: &mut ModelGraph) {
        let mut metadata = BTreeMap::new();
        metadata.insert("technology".to_string(), "Relational database".to_string());
        graph.upsert_node(ModelNode {
            id: DATABASE_NODE_ID.to_string(),
            level: Level::Container,
            label: "Database".to_string(),
            kind: NodeKind::Database,
            metadata,
        });
        graph.add_edge(contains(SYSTEM_NODE_ID, DATABASE_NODE_ID));
    }
}

fn contains(source: &str, target: &str) -> ModelEdge {
    ModelEdge {
        source: source.to_string(),
        target: target.to_string(),
        relation: RelationKind::Contains,
        label: String::new(),
    }
}

fn external_node() -> ModelNode {
    ModelNode {
        id: EXTERNAL_NODE_ID.to_string(),
        level: Level::System,
        label: "External Dependencies".to_string(),
        kind: NodeKind::External,
        metadata: BTreeMap::new(),
    }
}

fn class_node_kind(kind: FactKind) -> NodeKind {
    match kind {
        FactKind::Controller => NodeKind::Controller,
        FactKind::Service => NodeKind::Service,
        FactKind::Repository => NodeKind::Repository,
        FactKind::Entity => NodeKind::Entity,
        FactKind::Config => NodeKind::Config,
        FactKind::Other => NodeKind::Class,
    }
}

fn class_metadata(fact: &Fact) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    metadata.insert("path".to_string(), fact.relative_path.clone());
    metadata.insert("language".to_string(), fact.language.as_str().to_string());
    metadata.insert("line".to_string(), fact.line.to_string());
    metadata.insert("role".to_string(), fact.kind.name().to_string());
    if !fact.package.is_empty() {
        metadata.insert("package".to_string(), fact.package.clone());
    }
    metadata
}

fn container_metadata(spec: &ContainerSpec) -> BTreeMap<String, String> {
    let mut metadata = BTreeMap::new();
    if !spec.technology.is_empty() {
        metadata.insert("technology".to_string(), spec.technology.to_string());
    }
    if !spec.description.is_empty() {
        metadata.insert("description".to_string(), spec.description.to_string());
    }
    metadata
}

/// A repository's dependency on an entity is persistence, not a plain
/// call edge.
fn dependency_relation(graph: &ModelGraph, fact: &Fact, target_id: &str) -> RelationKind {
    if fact.kind == FactKind::Repository
        && graph
            .node(target_id)
            .map(|n| n.kind == NodeKind::Entity)
            .unwrap_or(false)
    {
        RelationKind::PersistsTo
    } else {
        RelationKind::DependsOn
    }
}

fn resolve(
    graph: &ModelGraph,
    by_simple_name: &BTreeMap<&str, Option<String>>,
    dep: &str,
) -> Option<String> {
    let normalized = normalize_id(dep);
    if graph.contains_node(&normalized) {
        return Some(normalized);
    }
    by_simple_name.get(dep).and_then(|slot| slot.clone())
}
