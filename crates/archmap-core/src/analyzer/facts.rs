//! Structural fact extraction from source text.
//!
//! Pure syntax-level pattern matching: regex line scanning classifies
//! declarations by framework-style annotations, base-type names, and
//! naming conventions. No semantic resolution happens here; ambiguous
//! declarations fall back to [`FactKind::Other`] and malformed input
//! yields zero facts instead of an error.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::errors::Warning;

pub use crate::analyzer::walker::{Language, SourceUnit};

// ---------------------------------------------------------------------------
// Fact types
// ---------------------------------------------------------------------------

/// Role of a declared building block, in marker-priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FactKind {
    Controller,
    Service,
    Repository,
    Entity,
    Config,
    Other,
}

impl FactKind {
    pub fn name(self) -> &'static str {
        match self {
            FactKind::Controller => "Controller",
            FactKind::Service => "Service",
            FactKind::Repository => "Repository",
            FactKind::Entity => "Entity",
            FactKind::Config => "Config",
            FactKind::Other => "Other",
        }
    }
}

/// One structural declaration found in a source unit. Immutable once
/// created; a file may yield zero or more facts.
#[derive(Clone, Debug, Serialize)]
pub struct Fact {
    pub declared_name: String,
    pub qualified_name: String,
    pub kind: FactKind,
    pub language: Language,
    /// Referenced type names in first-appearance order, deduplicated.
    pub declared_dependencies: Vec<String>,
    pub package: String,
    pub relative_path: String,
    pub line: u64,
}

/// Extraction result for one unit: facts plus any non-fatal findings.
#[derive(Debug, Default)]
pub struct FactHarvest {
    pub facts: Vec<Fact>,
    pub warnings: Vec<Warning>,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

/// Convert a file path to a dotted module name (extension stripped).
pub fn to_module_name(path: &str) -> String {
    let without_ext = Path::new(path).with_extension("");
    let parts: Vec<&str> = without_ext
        .components()
        .filter_map(|c| match c {
            std::path::Component::Normal(os) => os.to_str(),
            _ => None,
        })
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();
    parts.join(".")
}

/// Type names that never count as an architectural dependency.
fn is_builtin_type(name: &str) -> bool {
    matches!(
        name,
        "String"
            | "Integer"
            | "Int"
            | "Long"
            | "Double"
            | "Float"
            | "Boolean"
            | "Byte"
            | "Short"
            | "Character"
            | "Object"
            | "Void"
            | "Number"
            | "List"
            | "ArrayList"
            | "LinkedList"
            | "Map"
            | "HashMap"
            | "Set"
            | "HashSet"
            | "Collection"
            | "Iterable"
            | "Iterator"
            | "Optional"
            | "Stream"
            | "BigDecimal"
            | "BigInteger"
            | "LocalDate"
            | "LocalDateTime"
            | "LocalTime"
            | "Instant"
            | "Date"
            | "Duration"
            | "UUID"
            | "Exception"
            | "RuntimeException"
            | "Throwable"
            | "Error"
            | "StringBuilder"
            | "StringBuffer"
            | "Array"
            | "Promise"
            | "Record"
            | "Partial"
            | "Readonly"
            | "Pageable"
            | "Page"
            | "ResponseEntity"
            | "HttpStatus"
            | "Mono"
            | "Flux"
    )
}

static TYPE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[A-Z][A-Za-z0-9_]*").unwrap());

/// Collect capitalized type tokens from a raw type expression
/// (`Map<String, UserDto>` yields `UserDto`), filtering builtins.
fn harvest_type_tokens(raw: &str, out: &mut Vec<String>, self_name: &str) {
    for m in TYPE_TOKEN_RE.find_iter(raw) {
        push_dependency(out, m.as_str(), self_name);
    }
}

fn push_dependency(deps: &mut Vec<String>, name: &str, self_name: &str) {
    if name.is_empty() || name == self_name || is_builtin_type(name) {
        return;
    }
    if !deps.iter().any(|d| d == name) {
        deps.push(name.to_string());
    }
}

/// Lowest-priority role marker: naming-convention suffixes.
fn kind_from_suffix(name: &str) -> Option<FactKind> {
    if name.ends_with("Controller") || name.ends_with("Endpoint") || name.ends_with("Resource") {
        Some(FactKind::Controller)
    } else if name.ends_with("Service")
        || name.ends_with("ServiceImpl")
        || name.ends_with("Manager")
        || name.ends_with("Processor")
    {
        Some(FactKind::Service)
    } else if name.ends_with("Repository") || name.ends_with("Dao") {
        Some(FactKind::Repository)
    } else if name.ends_with("Config") || name.ends_with("Configuration") {
        Some(FactKind::Config)
    } else {
        None
    }
}

/// Map an annotation/decorator name to a role. The priority order here
/// matches [`FactKind`]'s declaration order.
fn kind_from_annotation(name: &str) -> Option<FactKind> {
    match name {
        "RestController" | "Controller" => Some(FactKind::Controller),
        "Service" | "Component" | "Injectable" => Some(FactKind::Service),
        "Repository" => Some(FactKind::Repository),
        "Entity" | "Document" | "Table" => Some(FactKind::Entity),
        "Configuration" | "SpringBootApplication" | "Module" => Some(FactKind::Config),
        _ => None,
    }
}

/// Pick the winning role from collected markers; priority is FactKind
/// declaration order. Returns the winner plus whether the choice was
/// ambiguous (two or more distinct roles matched).
fn classify(markers: &[FactKind]) -> (Option<FactKind>, bool) {
    let mut distinct: Vec<FactKind> = Vec::new();
    for kind in markers {
        if !distinct.contains(kind) {
            distinct.push(*kind);
        }
    }
    if distinct.is_empty() {
        return (None, false);
    }
    let order = [
        FactKind::Controller,
        FactKind::Service,
        FactKind::Repository,
        FactKind::Entity,
        FactKind::Config,
    ];
    let winner = order
        .iter()
        .copied()
        .find(|k| distinct.contains(k))
        .unwrap_or(FactKind::Other);
    (Some(winner), distinct.len() > 1)
}

// ---------------------------------------------------------------------------
// Java / Kotlin patterns
// ---------------------------------------------------------------------------

static JAVA_PACKAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*package\s+([A-Za-z0-9_.]+)\s*;?").unwrap());

static ANNOTATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*@([A-Za-z_][A-Za-z0-9_]*)").unwrap());

static JAVA_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:public\s+|private\s+|protected\s+)?(?:abstract\s+|final\s+|static\s+|sealed\s+)*(class|interface|enum|record)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static KOTLIN_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:public\s+|internal\s+|private\s+)?(?:abstract\s+|open\s+|data\s+|sealed\s+)*(class|interface|object)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static EXTENDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bextends\s+([A-Za-z0-9_.<>,\s]+?)(?:\bimplements\b|\{|$)").unwrap());

static IMPLEMENTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bimplements\s+([A-Za-z0-9_.<>,\s]+?)(?:\{|$)").unwrap());

static JAVA_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:private|protected|public)\s+(?:final\s+|static\s+|transient\s+)*([A-Z][A-Za-z0-9_]*(?:<[^;={]*>)?)\s+[a-z_][A-Za-z0-9_]*\s*[;=]",
    )
    .unwrap()
});

static NEW_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bnew\s+([A-Z][A-Za-z0-9_]*)\s*[(<]").unwrap());

static REPOSITORY_BASE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(JpaRepository|CrudRepository|MongoRepository|PagingAndSortingRepository|ReactiveCrudRepository)\b",
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// TypeScript patterns
// ---------------------------------------------------------------------------

static TS_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:export\s+)?(?:default\s+)?(?:abstract\s+)?(class|interface)\s+([A-Za-z_][A-Za-z0-9_]*)",
    )
    .unwrap()
});

static TS_CTOR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*constructor\s*\(([^)]*)").unwrap());

/// `name: Type` parameter annotations; shared by the TypeScript
/// constructor scanner and the Kotlin primary-constructor scanner.
static PARAM_TYPE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r":\s*([A-Z][A-Za-z0-9_]*)").unwrap());

/// Kotlin property declarations (`val repo: OrderRepository`).
static KOTLIN_PROPERTY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^\s*(?:private\s+|protected\s+|internal\s+|public\s+)?(?:lateinit\s+)?(?:val|var)\s+[a-z_][A-Za-z0-9_]*\s*:\s*([A-Z][A-Za-z0-9_<>,.\s]*)",
    )
    .unwrap()
});

// ---------------------------------------------------------------------------
// Python patterns
// ---------------------------------------------------------------------------

static PY_CLASS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*class\s+([A-Za-z_][A-Za-z0-9_]*)\s*(?:\(([^)]*)\))?\s*:").unwrap()
});

static PY_CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b([A-Z][A-Za-z0-9_]*)\s*\(").unwrap());

// ---------------------------------------------------------------------------
// Java / Kotlin extraction
// ---------------------------------------------------------------------------

fn java_like_facts(unit: &SourceUnit, kotlin: bool) -> FactHarvest {
    let mut harvest = FactHarvest::default();
    let mut package = String::new();
    // Role markers seen since the previous declaration.
    let mut pending_markers: Vec<FactKind> = Vec::new();

    let class_re: &Regex = if kotlin { &KOTLIN_CLASS_RE } else { &JAVA_CLASS_RE };

    for (index, line) in unit.text.lines().enumerate() {
        let line_number = (index + 1) as u64;

        if let Some(caps) = JAVA_PACKAGE_RE.captures(line) {
            package = caps[1].to_string();
            continue;
        }

        // An annotation can share its line with the declaration
        // (`@Service public class Foo`), so the class scan continues on
        // the text after the annotation.
        let mut decl_line = line;
        if let Some(caps) = ANNOTATION_RE.captures(line) {
            if let Some(kind) = kind_from_annotation(&caps[1]) {
                pending_markers.push(kind);
            }
            decl_line = &line[caps.get(0).map(|m| m.end()).unwrap_or(0)..];
        }

        if let Some(caps) = class_re.captures(decl_line) {
            let declared_name = caps[2].to_string();
            let decl_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let remainder = &decl_line[decl_end..];

            let mut markers = std::mem::take(&mut pending_markers);
            if REPOSITORY_BASE_RE.is_match(remainder) {
                markers.push(FactKind::Repository);
            }

            let (annotated, ambiguous) = classify(&markers);
            let kind = annotated
                .or_else(|| kind_from_suffix(&declared_name))
                .unwrap_or(FactKind::Other);
            if ambiguous {
                harvest.warnings.push(Warning::ClassificationAmbiguity {
                    name: declared_name.clone(),
                    chosen: kind.name().to_string(),
                });
            }

            let mut deps = Vec::new();
            if kotlin {
                kotlin_signature_deps(remainder, &mut deps, &declared_name);
            } else {
                if let Some(ext) = EXTENDS_RE.captures(remainder) {
                    harvest_supertypes(&ext[1], &mut deps, &declared_name);
                }
                if let Some(imp) = IMPLEMENTS_RE.captures(remainder) {
                    harvest_supertypes(&imp[1], &mut deps, &declared_name);
                }
            }

            let qualified_name = if package.is_empty() {
                declared_name.clone()
            } else {
                format!("{package}.{declared_name}")
            };
            harvest.facts.push(Fact {
                declared_name,
                qualified_name,
                kind,
                language: unit.language,
                declared_dependencies: deps,
                package: package.clone(),
                relative_path: unit.relative_path.clone(),
                line: line_number,
            });
            continue;
        }

        // Everything below attaches dependencies to the current fact.
        let Some(current) = harvest.facts.last_mut() else {
            continue;
        };
        let self_name = current.declared_name.clone();

        if kotlin {
            if let Some(caps) = KOTLIN_PROPERTY_RE.captures(line) {
                harvest_type_tokens(&caps[1], &mut current.declared_dependencies, &self_name);
            }
        } else {
            if let Some(caps) = JAVA_FIELD_RE.captures(line) {
                harvest_type_tokens(&caps[1], &mut current.declared_dependencies, &self_name);
            }
            for caps in NEW_TYPE_RE.captures_iter(line) {
                push_dependency(&mut current.declared_dependencies, &caps[1], &self_name);
            }
            // Constructor injection: `public Foo(Bar bar, Baz baz) {`.
            if let Some(params) = constructor_params(line, &self_name) {
                harvest_type_tokens(&params, &mut current.declared_dependencies, &self_name);
            }
        }
    }

    harvest
}

/// Dependencies declared in a Kotlin class signature: primary-constructor
/// parameter types (`class Foo(private val repo: FooRepository)`) and the
/// supertype list after the `:` (`class Bar : BaseBar(), Audited`).
fn kotlin_signature_deps(remainder: &str, deps: &mut Vec<String>, self_name: &str) {
    let rest = remainder.trim_start();
    let after = if let Some(inner) = rest.strip_prefix('(') {
        let close = inner.find(')').unwrap_or(inner.len());
        for caps in PARAM_TYPE_RE.captures_iter(&inner[..close]) {
            push_dependency(deps, &caps[1], self_name);
        }
        inner.get(close + 1..).unwrap_or("")
    } else {
        rest
    };
    if let Some(supertypes) = after.trim_start().strip_prefix(':') {
        harvest_supertypes(supertypes, deps, self_name);
    }
}

/// Supertype lists may carry generics whose arguments are the real
/// dependency (`JpaRepository<User, Long>` depends on `User`), so every
/// capitalized token is harvested; repository base interfaces themselves
/// are part of the builtin-ish filter below.
fn harvest_supertypes(raw: &str, deps: &mut Vec<String>, self_name: &str) {
    for m in TYPE_TOKEN_RE.find_iter(raw) {
        let name = m.as_str();
        if REPOSITORY_BASE_RE.is_match(name) {
            continue;
        }
        push_dependency(deps, name, self_name);
    }
}

/// If the line declares a constructor of `class_name`, return its raw
/// parameter list.
fn constructor_params(line: &str, class_name: &str) -> Option<String> {
    let trimmed = line.trim_start();
    let rest = trimmed
        .strip_prefix("public ")
        .or_else(|| trimmed.strip_prefix("protected "))
        .or_else(|| trimmed.strip_prefix("private "))
        .unwrap_or(trimmed);
    let rest = rest.strip_prefix(class_name)?;
    let rest = rest.trim_start();
    let inner = rest.strip_prefix('(')?;
    let close = inner.find(')')?;
    Some(inner[..close].to_string())
}

// ---------------------------------------------------------------------------
// TypeScript extraction
// ---------------------------------------------------------------------------

fn typescript_facts(unit: &SourceUnit) -> FactHarvest {
    let mut harvest = FactHarvest::default();
    let module_name = to_module_name(&unit.relative_path);
    let mut pending_markers: Vec<FactKind> = Vec::new();

    for (index, line) in unit.text.lines().enumerate() {
        let line_number = (index + 1) as u64;

        if let Some(caps) = ANNOTATION_RE.captures(line) {
            if let Some(kind) = kind_from_annotation(&caps[1]) {
                pending_markers.push(kind);
            }
            continue;
        }

        if let Some(caps) = TS_CLASS_RE.captures(line) {
            let declared_name = caps[2].to_string();
            let decl_end = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let remainder = &line[decl_end..];

            let markers = std::mem::take(&mut pending_markers);
            let (annotated, ambiguous) = classify(&markers);
            let kind = annotated
                .or_else(|| kind_from_suffix(&declared_name))
                .unwrap_or(FactKind::Other);
            if ambiguous {
                harvest.warnings.push(Warning::ClassificationAmbiguity {
                    name: declared_name.clone(),
                    chosen: kind.name().to_string(),
                });
            }

            let mut deps = Vec::new();
            if let Some(ext) = EXTENDS_RE.captures(remainder) {
                harvest_supertypes(&ext[1], &mut deps, &declared_name);
            }
            if let Some(imp) = IMPLEMENTS_RE.captures(remainder) {
                harvest_supertypes(&imp[1], &mut deps, &declared_name);
            }

            harvest.facts.push(Fact {
                qualified_name: format!("{module_name}.{declared_name}"),
                declared_name,
                kind,
                language: unit.language,
                declared_dependencies: deps,
                package: module_name.clone(),
                relative_path: unit.relative_path.clone(),
                line: line_number,
            });
            continue;
        }

        let Some(current) = harvest.facts.last_mut() else {
            continue;
        };
        let self_name = current.declared_name.clone();

        if let Some(caps) = TS_CTOR_RE.captures(line) {
            for ty in PARAM_TYPE_RE.captures_iter(&caps[1]) {
                push_dependency(&mut current.declared_dependencies, &ty[1], &self_name);
            }
        }
        for caps in NEW_TYPE_RE.captures_iter(line) {
            push_dependency(&mut current.declared_dependencies, &caps[1], &self_name);
        }
    }

    harvest
}

// ---------------------------------------------------------------------------
// Python extraction
// ---------------------------------------------------------------------------

fn python_facts(unit: &SourceUnit) -> FactHarvest {
    let mut harvest = FactHarvest::default();
    let module_name = to_module_name(&unit.relative_path);

    for (index, line) in unit.text.lines().enumerate() {
        let line_number = (index + 1) as u64;

        if let Some(caps) = PY_CLASS_RE.captures(line) {
            let declared_name = caps[1].to_string();
            let kind = kind_from_suffix(&declared_name).unwrap_or(FactKind::Other);

            let mut deps = Vec::new();
            if let Some(bases) = caps.get(2) {
                harvest_type_tokens(bases.as_str(), &mut deps, &declared_name);
            }
            harvest.facts.push(Fact {
                qualified_name: format!("{module_name}.{declared_name}"),
                declared_name,
                kind,
                language: unit.language,
                declared_dependencies: deps,
                package: module_name.clone(),
                relative_path: unit.relative_path.clone(),
                line: line_number,
            });
            continue;
        }

        let Some(current) = harvest.facts.last_mut() else {
            continue;
        };
        let self_name = current.declared_name.clone();
        for caps in PY_CALL_RE.captures_iter(line) {
            push_dependency(&mut current.declared_dependencies, &caps[1], &self_name);
        }
    }

    harvest
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Extract structural facts from one source unit. Never fails: a unit
/// the scanner cannot make sense of simply yields zero facts.
pub fn extract_facts(unit: &SourceUnit) -> FactHarvest {
    match unit.language {
        Language::Java => java_like_facts(unit, false),
        Language::Kotlin => java_like_facts(unit, true),
        Language::TypeScript => typescript_facts(unit),
        Language::Python => python_facts(unit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn unit(path: &str, language: Language, text: &str) -> SourceUnit {
        SourceUnit {
            path: PathBuf::from(path),
            relative_path: path.to_string(),
            language,
            text: text.to_string(),
            content_hash: String::new(),
        }
    }

    // -- Java ---------------------------------------------------------------

    #[test]
    fn test_java_rest_controller() {
        let src = "\
package com.example.web;

import com.example.service.UserService;

@RestController
public class UserController {
    private final UserService userService;

    public UserController(UserService userService) {
        this.userService = userService;
    }
}
";
        let harvest = extract_facts(&unit("src/UserController.java", Language::Java, src));
        assert_eq!(harvest.facts.len(), 1);
        let fact = &harvest.facts[0];
        assert_eq!(fact.declared_name, "UserController");
        assert_eq!(fact.qualified_name, "com.example.web.UserController");
        assert_eq!(fact.kind, FactKind::Controller);
        assert_eq!(fact.declared_dependencies, vec!["UserService"]);
        assert!(harvest.warnings.is_empty());
    }

    #[test]
    fn test_java_service_with_field_and_new() {
        let src = "\
package com.example;

@Service
public class OrderService {
    private OrderRepository repo;

    public void place() {
        var v = new OrderValidator();
    }
}
";
        let harvest = extract_facts(&unit("OrderService.java", Language::Java, src));
        let fact = &harvest.facts[0];
        assert_eq!(fact.kind, FactKind::Service);
        assert_eq!(
            fact.declared_dependencies,
            vec!["OrderRepository", "OrderValidator"]
        );
    }

    #[test]
    fn test_java_repository_base_type() {
        let src = "\
package com.example.repo;

public interface UserRepository extends JpaRepository<User, Long> {
}
";
        let harvest = extract_facts(&unit("UserRepository.java", Language::Java, src));
        let fact = &harvest.facts[0];
        assert_eq!(fact.kind, FactKind::Repository);
        // The generic argument is the persisted entity; the base
        // interface itself is filtered out.
        assert_eq!(fact.declared_dependencies, vec!["User"]);
    }

    #[test]
    fn test_java_entity() {
        let src = "\
package com.example.domain;

@Entity
public class User {
    private String name;
}
";
        let harvest = extract_facts(&unit("User.java", Language::Java, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Entity);
        assert!(harvest.facts[0].declared_dependencies.is_empty());
    }

    #[test]
    fn test_java_suffix_inference() {
        let src = "\
package com.example;

public class PaymentProcessor {
}
";
        let harvest = extract_facts(&unit("PaymentProcessor.java", Language::Java, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
    }

    #[test]
    fn test_java_unmarked_is_other() {
        let src = "package com.example;\n\npublic class Util {\n}\n";
        let harvest = extract_facts(&unit("Util.java", Language::Java, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Other);
    }

    #[test]
    fn test_java_ambiguous_markers_warn_first_wins() {
        let src = "\
package com.example;

@Service
@Entity
public class Odd {
}
";
        let harvest = extract_facts(&unit("Odd.java", Language::Java, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
        assert_eq!(harvest.warnings.len(), 1);
        assert!(matches!(
            harvest.warnings[0],
            Warning::ClassificationAmbiguity { .. }
        ));
    }

    #[test]
    fn test_java_annotation_and_class_on_one_line() {
        let src = "\
package com.example;

@Service public class InlineService {
}
";
        let harvest = extract_facts(&unit("InlineService.java", Language::Java, src));
        assert_eq!(harvest.facts.len(), 1);
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
        assert_eq!(harvest.facts[0].declared_name, "InlineService");
    }

    #[test]
    fn test_java_multiple_declarations_per_file() {
        let src = "\
package com.example;

@Service
public class A {
}

@Repository
class B {
}
";
        let harvest = extract_facts(&unit("AB.java", Language::Java, src));
        assert_eq!(harvest.facts.len(), 2);
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
        assert_eq!(harvest.facts[1].kind, FactKind::Repository);
    }

    #[test]
    fn test_java_extends_dependency() {
        let src = "\
package com.example;

public class AdminController extends BaseController {
}
";
        let harvest = extract_facts(&unit("AdminController.java", Language::Java, src));
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["BaseController"]);
        assert_eq!(harvest.facts[0].kind, FactKind::Controller);
    }

    #[test]
    fn test_java_builtins_filtered() {
        let src = "\
package com.example;

@Service
public class CatalogService {
    private Map<String, ProductDto> cache;
    private List<String> names;
}
";
        let harvest = extract_facts(&unit("CatalogService.java", Language::Java, src));
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["ProductDto"]);
    }

    #[test]
    fn test_java_malformed_yields_zero_facts() {
        let src = "this is not java at all {{{ ;;; ))\n%%%\n";
        let harvest = extract_facts(&unit("garbage.java", Language::Java, src));
        assert!(harvest.facts.is_empty());
        assert!(harvest.warnings.is_empty());
    }

    // -- Kotlin -------------------------------------------------------------

    #[test]
    fn test_kotlin_annotated_class() {
        let src = "\
package com.example

@Service
class BillingService(private val repo: BillingRepository) {
}
";
        let harvest = extract_facts(&unit("BillingService.kt", Language::Kotlin, src));
        assert_eq!(harvest.facts.len(), 1);
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
        assert_eq!(harvest.facts[0].qualified_name, "com.example.BillingService");
        // Primary-constructor injection counts as a dependency.
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["BillingRepository"]);
    }

    #[test]
    fn test_kotlin_supertype_dependency() {
        let src = "\
package com.example

class AdminController : BaseController() {
}
";
        let harvest = extract_facts(&unit("AdminController.kt", Language::Kotlin, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Controller);
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["BaseController"]);
    }

    #[test]
    fn test_kotlin_ctor_params_and_supertypes_combine() {
        let src = "\
package com.example

class OrderService(val repo: OrderRepository, val clock: TimeSource) : BaseService(), Audited {
}
";
        let harvest = extract_facts(&unit("OrderService.kt", Language::Kotlin, src));
        assert_eq!(
            harvest.facts[0].declared_dependencies,
            vec!["OrderRepository", "TimeSource", "BaseService", "Audited"]
        );
    }

    #[test]
    fn test_kotlin_repository_base_interface() {
        let src = "\
package com.example.repo

interface UserRepository : CrudRepository<User, Long> {
}
";
        let harvest = extract_facts(&unit("UserRepository.kt", Language::Kotlin, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Repository);
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["User"]);
    }

    #[test]
    fn test_kotlin_body_property_dependency() {
        let src = "\
package com.example

@Service
class MailService {
    lateinit var sender: SmtpSender
    private val retries: Int = 3
}
";
        let harvest = extract_facts(&unit("MailService.kt", Language::Kotlin, src));
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["SmtpSender"]);
    }

    // -- TypeScript ---------------------------------------------------------

    #[test]
    fn test_typescript_nest_controller() {
        let src = "\
import { Controller } from '@nestjs/common';

@Controller()
export class CatsController {
    constructor(private readonly catsService: CatsService) {}
}
";
        let harvest = extract_facts(&unit("src/cats.controller.ts", Language::TypeScript, src));
        assert_eq!(harvest.facts.len(), 1);
        let fact = &harvest.facts[0];
        assert_eq!(fact.kind, FactKind::Controller);
        assert_eq!(fact.qualified_name, "src.cats.controller.CatsController");
        assert_eq!(fact.declared_dependencies, vec!["CatsService"]);
    }

    #[test]
    fn test_typescript_injectable_service() {
        let src = "\
@Injectable()
export class CatsService {
    find() {
        return new CatFinder();
    }
}
";
        let harvest = extract_facts(&unit("src/cats.service.ts", Language::TypeScript, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Service);
        assert_eq!(harvest.facts[0].declared_dependencies, vec!["CatFinder"]);
    }

    #[test]
    fn test_typescript_interface_suffix() {
        let src = "export interface OrderRepository {\n}\n";
        let harvest = extract_facts(&unit("src/order.repo.ts", Language::TypeScript, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Repository);
    }

    // -- Python -------------------------------------------------------------

    #[test]
    fn test_python_suffix_and_bases() {
        let src = "\
class UserService(BaseService):
    def __init__(self):
        self.repo = UserRepository()
";
        let harvest = extract_facts(&unit("app/user_service.py", Language::Python, src));
        assert_eq!(harvest.facts.len(), 1);
        let fact = &harvest.facts[0];
        assert_eq!(fact.kind, FactKind::Service);
        assert_eq!(fact.qualified_name, "app.user_service.UserService");
        assert_eq!(
            fact.declared_dependencies,
            vec!["BaseService", "UserRepository"]
        );
    }

    #[test]
    fn test_python_plain_class_is_other() {
        let src = "class Widget:\n    pass\n";
        let harvest = extract_facts(&unit("w.py", Language::Python, src));
        assert_eq!(harvest.facts[0].kind, FactKind::Other);
    }

    // -- Helpers ------------------------------------------------------------

    #[test]
    fn test_to_module_name() {
        assert_eq!(to_module_name("src/api/user.ts"), "src.api.user");
        assert_eq!(to_module_name("a/b/c.py"), "a.b.c");
    }

    #[test]
    fn test_dependency_order_and_dedupe() {
        let mut deps = Vec::new();
        push_dependency(&mut deps, "B", "Me");
        push_dependency(&mut deps, "A", "Me");
        push_dependency(&mut deps, "B", "Me");
        push_dependency(&mut deps, "Me", "Me");
        push_dependency(&mut deps, "String", "Me");
        assert_eq!(deps, vec!["B", "A"]);
    }

    #[test]
    fn test_classify_priority() {
        let (kind, ambiguous) = classify(&[FactKind::Entity, FactKind::Controller]);
        assert_eq!(kind, Some(FactKind::Controller));
        assert!(ambiguous);
        let (kind, ambiguous) = classify(&[FactKind::Repository]);
        assert_eq!(kind, Some(FactKind::Repository));
        assert!(!ambiguous);
        assert_eq!(classify(&[]), (None, false));
    }
}
