//! Structurizr-style workspace DSL generation.
//!
//! The model section mirrors the graph's containment forest (system,
//! containers, components); relationships are taken from the component
//! projection, the finest level the DSL grammar expresses. Classes only
//! appear in the PlantUML output.

use crate::model::{
    sanitize_identifier, Level, ModelGraph, ModelNode, NodeKind, RelationKind, SYSTEM_NODE_ID,
};
use crate::view::{project, View, ViewEdge};

use super::{quote, render, Stmt};

fn ident(node: &ModelNode) -> String {
    sanitize_identifier(&node.id)
}

fn relation_phrase(kind: RelationKind) -> &'static str {
    match kind {
        RelationKind::Contains => "contains",
        RelationKind::DependsOn => "uses",
        RelationKind::PersistsTo => "reads from and writes to",
    }
}

fn edge_label(edge: &ViewEdge) -> String {
    if edge.relations.len() <= 1 {
        edge.label.clone()
    } else {
        // Aggregated edge: name every folded relation kind.
        edge.relations
            .iter()
            .map(|r| relation_phrase(*r))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

fn component_stmt(component: &ModelNode, graph: &ModelGraph) -> Stmt {
    let class_count = graph.children_of(&component.id).len();
    let description = format!("{class_count} building blocks");
    Stmt::line(format!(
        "{} = component {} {}",
        ident(component),
        quote(&component.label),
        quote(&description),
    ))
}

fn container_stmt(container: &ModelNode, graph: &ModelGraph) -> Stmt {
    let technology = container
        .metadata
        .get("technology")
        .map(String::as_str)
        .unwrap_or("");
    let header = format!(
        "{} = container {} {}",
        ident(container),
        quote(&container.label),
        quote(technology),
    );
    let mut body: Vec<Stmt> = Vec::new();
    if container.kind == NodeKind::Database {
        body.push(Stmt::line("tags \"Database\""));
    }
    for component in graph.children_of(&container.id) {
        body.push(component_stmt(component, graph));
    }
    Stmt::block(header, body)
}

fn model_stmts(graph: &ModelGraph, component_view: &View) -> Vec<Stmt> {
    let mut body: Vec<Stmt> = Vec::new();

    // External sink first so later relationship statements can reference
    // it regardless of declaration order.
    if let Some(external) = graph.nodes().find(|n| n.kind == NodeKind::External) {
        body.push(Stmt::block(
            format!(
                "{} = softwareSystem {}",
                ident(external),
                quote(&external.label)
            ),
            vec![Stmt::line("tags \"External\"")],
        ));
    }

    if let Some(system) = graph.node(SYSTEM_NODE_ID) {
        let mut system_body: Vec<Stmt> = Vec::new();
        for container in graph.children_of(SYSTEM_NODE_ID) {
            system_body.push(container_stmt(container, graph));
        }
        body.push(Stmt::block(
            format!("{} = softwareSystem {}", ident(system), quote(&system.label)),
            system_body,
        ));
    }

    body.push(Stmt::line(""));
    for edge in &component_view.edges {
        let source = sanitize_identifier(&edge.source);
        let target = sanitize_identifier(&edge.target);
        body.push(Stmt::line(format!(
            "{source} -> {target} {}",
            quote(&edge_label(edge))
        )));
    }

    body
}

fn views_stmts(graph: &ModelGraph) -> Vec<Stmt> {
    let system_ident = graph
        .node(SYSTEM_NODE_ID)
        .map(ident)
        .unwrap_or_else(|| SYSTEM_NODE_ID.to_string());
    let defaults = || vec![Stmt::line("include *"), Stmt::line("autoLayout")];

    let mut body = vec![
        Stmt::block(
            format!("systemContext {system_ident} \"SystemContext\""),
            defaults(),
        ),
        Stmt::block(format!("container {system_ident} \"Containers\""), defaults()),
    ];
    for container in graph.children_of(SYSTEM_NODE_ID) {
        let container_ident = ident(container);
        body.push(Stmt::block(
            format!("component {container_ident} \"Components_{container_ident}\""),
            defaults(),
        ));
    }

    body.push(Stmt::block(
        "styles",
        vec![
            Stmt::block(
                "element \"Database\"",
                vec![Stmt::line("shape Cylinder")],
            ),
            Stmt::block(
                "element \"External\"",
                vec![Stmt::line("background #999999")],
            ),
        ],
    ));
    body
}

/// Render the full workspace document.
pub fn workspace_dsl(graph: &ModelGraph, views: &[View], system_name: &str) -> String {
    let component_view;
    let component = match views.iter().find(|v| v.level == Level::Component) {
        Some(view) => view,
        None => {
            component_view = project(graph, Level::Component);
            &component_view
        }
    };

    let tree = vec![Stmt::block(
        format!("workspace {}", quote(system_name)),
        vec![
            Stmt::block("model", model_stmts(graph, component)),
            Stmt::line(""),
            Stmt::block("views", views_stmts(graph)),
        ],
    )];
    render(&tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::facts::{Fact, FactKind, Language};
    use crate::model::ModelBuilder;
    use crate::view::standard_views;

    fn fact(name: &str, package: &str, kind: FactKind, deps: &[&str]) -> Fact {
        Fact {
            declared_name: name.to_string(),
            qualified_name: format!("{package}.{name}"),
            kind,
            language: Language::Java,
            declared_dependencies: deps.iter().map(|d| d.to_string()).collect(),
            package: package.to_string(),
            relative_path: format!("src/{name}.java"),
            line: 1,
        }
    }

    fn sample() -> (ModelGraph, Vec<View>) {
        let facts = vec![
            fact("UserController", "com.ex.web", FactKind::Controller, &["UserService"]),
            fact("UserService", "com.ex.service", FactKind::Service, &["UserRepository"]),
            fact("UserRepository", "com.ex.repo", FactKind::Repository, &["User"]),
            fact("User", "com.ex.domain", FactKind::Entity, &[]),
        ];
        let (graph, _) = ModelBuilder::new("Shop").build(&facts);
        let views = standard_views(&graph);
        (graph, views)
    }

    #[test]
    fn test_workspace_structure() {
        let (graph, views) = sample();
        let out = workspace_dsl(&graph, &views, "Shop");

        assert!(out.starts_with("workspace \"Shop\" {\n"));
        assert!(out.contains("system = softwareSystem \"Shop\""));
        assert!(out.contains("web = container \"Web Application\" \"HTTP API\""));
        assert!(out.contains("database = container \"Database\""));
        assert!(out.contains("tags \"Database\""));
        assert!(out.contains("shape Cylinder"));
        assert!(out.contains("systemContext system \"SystemContext\""));
        // Balanced braces.
        assert_eq!(out.matches('{').count(), out.matches('}').count());
    }

    #[test]
    fn test_component_relationships_present() {
        let (graph, views) = sample();
        let out = workspace_dsl(&graph, &views, "Shop");
        assert!(out.contains("web_com_ex_web -> services_com_ex_service \"uses\""));
        assert!(out.contains(
            "persistence_com_ex_repo -> database \"reads from and writes to\""
        ));
    }

    #[test]
    fn test_output_is_deterministic() {
        let (graph, views) = sample();
        assert_eq!(
            workspace_dsl(&graph, &views, "Shop"),
            workspace_dsl(&graph, &views, "Shop")
        );
    }
}
