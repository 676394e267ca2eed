//! Command-line front end for archmap-core.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use archmap_core::{run_analysis, AnalyzerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "archmap",
    version,
    about = "Derive a C4 architecture model (Structurizr DSL + PlantUML) from source code"
)]
struct Cli {
    /// Root directory to analyze. May be repeated for multi-root runs.
    #[arg(value_name = "ROOT")]
    roots: Vec<PathBuf>,

    /// Output directory for generated artifacts.
    #[arg(short, long, value_name = "DIR")]
    output: Option<PathBuf>,

    /// Glob pattern to exclude from the walk. May be repeated.
    #[arg(long = "exclude", value_name = "GLOB")]
    exclude: Vec<String>,

    /// Maximum directory depth below each root.
    #[arg(long, value_name = "N")]
    max_depth: Option<usize>,

    /// Follow symbolic links while walking.
    #[arg(long)]
    follow_symlinks: bool,

    /// Extraction worker threads.
    #[arg(long, value_name = "N")]
    workers: Option<usize>,

    /// JSON config file; command-line flags override its fields.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Label of the analyzed software system.
    #[arg(long, value_name = "NAME")]
    system_name: Option<String>,

    /// Increase log verbosity (-v: debug, -vv: trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn into_config(self) -> archmap_core::ArchmapResult<AnalyzerConfig> {
        let mut config = match &self.config {
            Some(path) => AnalyzerConfig::from_file(path)?,
            None => AnalyzerConfig::default(),
        };
        if !self.roots.is_empty() {
            config.roots = self.roots;
        }
        if let Some(output) = self.output {
            config.output_dir = output;
        }
        if !self.exclude.is_empty() {
            config.exclude_globs = self.exclude;
        }
        if let Some(depth) = self.max_depth {
            config.max_depth = Some(depth);
        }
        if self.follow_symlinks {
            config.follow_symlinks = true;
        }
        if let Some(workers) = self.workers {
            config.workers = workers;
        }
        if let Some(name) = self.system_name {
            config.system_name = name;
        }
        Ok(config)
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("ARCHMAP_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.into_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("archmap: {e}");
            return ExitCode::FAILURE;
        }
    };

    match run_analysis(&config) {
        Ok(outcome) => {
            println!(
                "analyzed {} files: {} nodes, {} edges, {} warnings",
                outcome.stats.files_loaded,
                outcome.model.node_count(),
                outcome.model.edges().len(),
                outcome.warnings.len(),
            );
            for path in [
                outcome.outputs.dsl,
                outcome.outputs.class_diagram,
                outcome.outputs.report,
                outcome.outputs.model_json,
            ]
            .into_iter()
            .flatten()
            {
                println!("  wrote {}", path.display());
            }
            if !outcome.warnings.is_empty() {
                eprintln!("warnings:");
                for warning in &outcome.warnings {
                    eprintln!("  {}", warning.describe());
                }
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("archmap: {e}");
            ExitCode::FAILURE
        }
    }
}
