//! Container-assignment rules. A fixed, ordered rule list maps each
//! class-level fact to its C4 container; first match wins, so precedence
//! is the declaration order and new-language support stays additive.

use crate::analyzer::facts::{Fact, FactKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RuleKind {
    /// Explicit role marker found by the extractor (annotation, base
    /// type, or naming convention).
    RoleMarker,
    /// A path segment of the source file names a conventional layer.
    PathConvention,
    /// Catch-all; always matches.
    Fallback,
}

/// Predicate half of a rule, kept as data so rule lists can be inspected
/// and reordered by callers.
#[derive(Clone, Debug)]
pub enum Predicate {
    Role(FactKind),
    PathSegment(&'static [&'static str]),
    Always,
}

/// The container a matching fact is assigned to.
#[derive(Clone, Debug)]
pub struct ContainerSpec {
    pub id: &'static str,
    pub label: &'static str,
    pub technology: &'static str,
    pub description: &'static str,
}

#[derive(Clone, Debug)]
pub struct ContainerRule {
    pub kind: RuleKind,
    pub predicate: Predicate,
    pub container: ContainerSpec,
}

impl ContainerRule {
    pub fn matches(&self, fact: &Fact) -> bool {
        match &self.predicate {
            Predicate::Role(kind) => fact.kind == *kind,
            Predicate::PathSegment(segments) => fact
                .relative_path
                .split(['/', '\\'])
                .any(|segment| {
                    let lowered = segment.to_ascii_lowercase();
                    segments.contains(&lowered.as_str())
                }),
            Predicate::Always => true,
        }
    }
}

const WEB: ContainerSpec = ContainerSpec {
    id: "web",
    label: "Web Application",
    technology: "HTTP API",
    description: "Request handling and API endpoints",
};

const SERVICES: ContainerSpec = ContainerSpec {
    id: "services",
    label: "Service Layer",
    technology: "Business logic",
    description: "Domain services and orchestration",
};

const PERSISTENCE: ContainerSpec = ContainerSpec {
    id: "persistence",
    label: "Persistence Layer",
    technology: "Data access",
    description: "Repositories and mapped entities",
};

const CONFIGURATION: ContainerSpec = ContainerSpec {
    id: "configuration",
    label: "Configuration",
    technology: "Wiring",
    description: "Framework and application configuration",
};

const UNCLASSIFIED: ContainerSpec = ContainerSpec {
    id: "unclassified",
    label: "Unclassified",
    technology: "",
    description: "Building blocks with no recognized role",
};

/// Default precedence: explicit role markers first (Controller > Service
/// > Repository > Entity > Config, matching the marker priority used at
/// extraction), then path conventions, then the fallback.
pub fn default_rules() -> Vec<ContainerRule> {
    vec![
        rule(RuleKind::RoleMarker, Predicate::Role(FactKind::Controller), WEB),
        rule(RuleKind::RoleMarker, Predicate::Role(FactKind::Service), SERVICES),
        rule(RuleKind::RoleMarker, Predicate::Role(FactKind::Repository), PERSISTENCE),
        rule(RuleKind::RoleMarker, Predicate::Role(FactKind::Entity), PERSISTENCE),
        rule(RuleKind::RoleMarker, Predicate::Role(FactKind::Config), CONFIGURATION),
        rule(
            RuleKind::PathConvention,
            Predicate::PathSegment(&["controller", "controllers", "web", "api", "rest"]),
            WEB,
        ),
        rule(
            RuleKind::PathConvention,
            Predicate::PathSegment(&["service", "services", "business"]),
            SERVICES,
        ),
        rule(
            RuleKind::PathConvention,
            Predicate::PathSegment(&[
                "repository",
                "repositories",
                "dao",
                "persistence",
                "entity",
                "entities",
                "domain",
                "model",
            ]),
            PERSISTENCE,
        ),
        rule(
            RuleKind::PathConvention,
            Predicate::PathSegment(&["config", "configuration"]),
            CONFIGURATION,
        ),
        rule(RuleKind::Fallback, Predicate::Always, UNCLASSIFIED),
    ]
}

fn rule(kind: RuleKind, predicate: Predicate, container: ContainerSpec) -> ContainerRule {
    ContainerRule {
        kind,
        predicate,
        container,
    }
}

/// Evaluate the rule list in declared order. A list that matches nothing
/// (possible with caller-supplied rules, including an empty list) falls
/// back to the Unclassified container.
pub fn assign_container<'r>(fact: &Fact, rules: &'r [ContainerRule]) -> &'r ContainerSpec {
    static FALLBACK: ContainerSpec = UNCLASSIFIED;
    rules
        .iter()
        .find(|rule| rule.matches(fact))
        .map(|rule| &rule.container)
        .unwrap_or(&FALLBACK)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::facts::Language;

    fn fact(name: &str, kind: FactKind, path: &str) -> Fact {
        Fact {
            declared_name: name.to_string(),
            qualified_name: name.to_string(),
            kind,
            language: Language::Java,
            declared_dependencies: Vec::new(),
            package: String::new(),
            relative_path: path.to_string(),
            line: 1,
        }
    }

    #[test]
    fn test_role_marker_beats_path() {
        let rules = default_rules();
        // Lives under a persistence-looking path, but carries a
        // Controller role marker.
        let f = fact("UserController", FactKind::Controller, "src/domain/UserController.java");
        assert_eq!(assign_container(&f, &rules).id, "web");
    }

    #[test]
    fn test_path_convention_applies_to_other() {
        let rules = default_rules();
        let f = fact("Helper", FactKind::Other, "src/services/Helper.java");
        assert_eq!(assign_container(&f, &rules).id, "services");
    }

    #[test]
    fn test_fallback() {
        let rules = default_rules();
        let f = fact("Util", FactKind::Other, "src/misc/Util.java");
        assert_eq!(assign_container(&f, &rules).id, "unclassified");
    }

    #[test]
    fn test_entity_goes_to_persistence() {
        let rules = default_rules();
        let f = fact("User", FactKind::Entity, "src/x/User.java");
        assert_eq!(assign_container(&f, &rules).id, "persistence");
    }

    #[test]
    fn test_empty_rule_list_falls_back() {
        let f = fact("Util", FactKind::Other, "src/Util.java");
        assert_eq!(assign_container(&f, &[]).id, "unclassified");
    }

    #[test]
    fn test_exhausted_rule_list_falls_back() {
        // A caller-supplied list with no Fallback rule and no match must
        // not hand out the last rule's container.
        let rules = vec![super::rule(
            RuleKind::RoleMarker,
            Predicate::Role(FactKind::Controller),
            WEB,
        )];
        let f = fact("TaxHelper", FactKind::Service, "src/misc/TaxHelper.java");
        assert_eq!(assign_container(&f, &rules).id, "unclassified");
    }

    #[test]
    fn test_rule_order_is_precedence() {
        // Reversing the list changes the outcome for a fact matching
        // several rules, demonstrating configurable precedence.
        let mut rules = default_rules();
        rules.retain(|r| r.kind != RuleKind::Fallback);
        rules.reverse();
        rules.push(super::rule(RuleKind::Fallback, Predicate::Always, UNCLASSIFIED));
        let f = fact("UserController", FactKind::Controller, "src/service/UserController.java");
        assert_eq!(assign_container(&f, &rules).id, "services");
    }
}
