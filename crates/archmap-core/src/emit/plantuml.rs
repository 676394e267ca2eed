//! PlantUML class-diagram generation from the class level of the graph.
//! Declarations are grouped into `package` blocks; repositories render
//! as interfaces and every classified role carries a stereotype.

use indexmap::IndexMap;

use crate::model::{sanitize_identifier, Level, ModelGraph, ModelNode, NodeKind, RelationKind};

use super::{render, Stmt};

fn stereotype(kind: NodeKind) -> Option<&'static str> {
    match kind {
        NodeKind::Controller => Some("controller"),
        NodeKind::Service => Some("service"),
        NodeKind::Repository => Some("repository"),
        NodeKind::Entity => Some("entity"),
        NodeKind::Config => Some("configuration"),
        _ => None,
    }
}

fn declaration(node: &ModelNode) -> Stmt {
    let keyword = if node.kind == NodeKind::Repository {
        "interface"
    } else {
        "class"
    };
    let alias = sanitize_identifier(&node.id);
    let mut line = format!("{keyword} \"{}\" as {alias}", node.label);
    if let Some(tag) = stereotype(node.kind) {
        line.push_str(&format!(" <<{tag}>>"));
    }
    Stmt::line(line)
}

fn arrow_label(relation: RelationKind) -> &'static str {
    match relation {
        RelationKind::PersistsTo => "persists",
        _ => "uses",
    }
}

/// Render the class diagram. Only class-level nodes and the edges
/// between them appear; containers and synthetic nodes belong to the
/// workspace DSL.
pub fn class_diagram(graph: &ModelGraph, system_name: &str) -> String {
    let mut stmts = vec![
        Stmt::line("@startuml"),
        Stmt::line(format!("title {system_name} class diagram")),
        Stmt::line("hide empty members"),
        Stmt::line(""),
    ];

    // Group declarations by package, preserving first-seen order.
    let mut by_package: IndexMap<String, Vec<&ModelNode>> = IndexMap::new();
    for node in graph.nodes().filter(|n| n.level == Level::Class) {
        let package = node
            .metadata
            .get("package")
            .cloned()
            .unwrap_or_default();
        by_package.entry(package).or_default().push(node);
    }

    for (package, nodes) in &by_package {
        if package.is_empty() {
            for node in nodes {
                stmts.push(declaration(node));
            }
        } else {
            stmts.push(Stmt::block(
                format!("package \"{package}\""),
                nodes.iter().map(|n| declaration(n)).collect(),
            ));
        }
    }

    stmts.push(Stmt::line(""));
    for edge in graph.edges() {
        if edge.relation == RelationKind::Contains {
            continue;
        }
        let class_endpoints = [edge.source.as_str(), edge.target.as_str()]
            .into_iter()
            .all(|id| {
                graph
                    .node(id)
                    .map(|n| n.level == Level::Class)
                    .unwrap_or(false)
            });
        if !class_endpoints {
            continue;
        }
        stmts.push(Stmt::line(format!(
            "{} ..> {} : {}",
            sanitize_identifier(&edge.source),
            sanitize_identifier(&edge.target),
            arrow_label(edge.relation),
        )));
    }

    stmts.push(Stmt::line(""));
    stmts.push(Stmt::line("@enduml"));
    render(&stmts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::facts::{Fact, FactKind, Language};
    use crate::model::ModelBuilder;

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

    fn sample() -> ModelGraph {
        let facts = vec![
            fact("UserController", "com.ex.web", FactKind::Controller, &["UserService"]),
            fact("UserService", "com.ex.service", FactKind::Service, &["UserRepository"]),
            fact("UserRepository", "com.ex.repo", FactKind::Repository, &["User"]),
            fact("User", "com.ex.domain", FactKind::Entity, &[]),
        ];
        ModelBuilder::new("Shop").build(&facts).0
    }

    #[test]
    fn test_diagram_frame_and_declarations() {
        let out = class_diagram(&sample(), "Shop");
        assert!(out.starts_with("@startuml\n"));
        assert!(out.ends_with("@enduml\n"));
        assert!(out.contains("package \"com.ex.web\" {"));
        assert!(out.contains(
            "class \"UserController\" as com_ex_web_UserController <<controller>>"
        ));
        assert!(out.contains(
            "interface \"UserRepository\" as com_ex_repo_UserRepository <<repository>>"
        ));
        assert!(out.contains("class \"User\" as com_ex_domain_User <<entity>>"));
    }

    #[test]
    fn test_arrows_between_classes_only() {
        let out = class_diagram(&sample(), "Shop");
        assert!(out.contains(
            "com_ex_web_UserController ..> com_ex_service_UserService : uses"
        ));
        assert!(out.contains(
            "com_ex_repo_UserRepository ..> com_ex_domain_User : persists"
        ));
        // The repository-to-database edge targets a container and stays
        // out of the class diagram.
        assert!(!out.contains("..> database"));
    }

    #[test]
    fn test_unclassified_has_no_stereotype() {
        let facts = vec![fact("Util", "com.ex", FactKind::Other, &[])];
        let (graph, _) = ModelBuilder::new("Shop").build(&facts);
        let out = class_diagram(&graph, "Shop");
        assert!(out.contains("class \"Util\" as com_ex_Util\n"));
    }
}
