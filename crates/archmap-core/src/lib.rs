//! archmap-core: static source analysis into a C4 architecture model.
//!
//! The library walks one or more source roots, extracts structural facts
//! from Java, Kotlin, TypeScript, and Python files by syntax-level
//! pattern matching, folds the facts into a unified architecture graph,
//! projects the graph onto the four C4 abstraction levels, and writes a
//! Structurizr-style workspace DSL, a PlantUML class diagram, a markdown
//! report, and a JSON dump of the model.
//!
//! ```no_run
//! use archmap_core::{run_analysis, AnalyzerConfig};
//!
//! # fn main() -> archmap_core::ArchmapResult<()> {
//! let config = AnalyzerConfig::new("./my-project", "./archmap-out");
//! let outcome = run_analysis(&config)?;
//! println!("{} nodes, {} warnings", outcome.model.node_count(), outcome.warnings.len());
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod config;
pub mod emit;
pub mod errors;
pub mod model;
pub mod view;

pub use analyzer::pipeline::{
    run_analysis, run_analysis_with_cancel, AnalysisOutcome, RunStats, SourceDigest,
};
pub use config::AnalyzerConfig;
pub use errors::{ArchmapError, ArchmapResult, CancelToken, RunOutputs, Warning};
pub use model::{Level, ModelGraph, NodeKind, RelationKind};
pub use view::{project, standard_views, View};
