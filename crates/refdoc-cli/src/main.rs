//! Refdoc CLI - convert TypeDoc reflection JSON into DocFX YAML

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use refdoc_core::{transform, Config, Diagnostics, Node, Severity};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

mod config_file;
mod docfx;
mod output;

use config_file::{parse_external_link, Overrides, RepoConfig};

#[derive(Parser)]
#[command(name = "refdoc")]
#[command(version = refdoc_core::VERSION)]
#[command(about = "Convert TypeDoc reflection JSON into DocFX YAML", long_about = None)]
struct Cli {
    /// Reflection JSON produced by TypeDoc
    input: PathBuf,

    /// Directory receiving the YAML files
    output: PathBuf,

    /// Repository config JSON (`{"repo": ..., "branch": ...}`), used with --base-path
    repo_config: Option<PathBuf>,

    /// Treat modules as a nesting level
    #[arg(long, alias = "hasModule")]
    has_module: bool,

    /// Keep declaration order instead of sorting alphabetically
    #[arg(long, alias = "disableAlphabetOrder")]
    disable_alphabet_order: bool,

    /// Source repository URL
    #[arg(long, alias = "sourceUrl")]
    source_url: Option<String>,

    /// Source repository branch
    #[arg(long, alias = "sourceBranch")]
    source_branch: Option<String>,

    /// Path of the documented sources inside the repository
    #[arg(long, alias = "basePath")]
    base_path: Option<String>,

    /// Package name (defaults to the project name)
    #[arg(long)]
    package: Option<String>,

    /// Documentation base for an external library, e.g. "typescript=https://..."
    #[arg(long = "external-link", value_name = "LIBRARY=URL", value_parser = parse_external_link)]
    external_links: Vec<(String, String)>,

    /// Configuration file (refdoc.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Exit with an error when any error diagnostic was reported
    #[arg(long)]
    strict: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn overrides(&self) -> Overrides {
        Overrides {
            has_module: self.has_module,
            disable_alphabet_order: self.disable_alphabet_order,
            source_url: self.source_url.clone(),
            source_branch: self.source_branch.clone(),
            base_path: self.base_path.clone(),
            package: self.package.clone(),
            external_links: self.external_links.clone(),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(&cli)
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let base = match &cli.config {
        Some(path) => config_file::load_config(path)
            .with_context(|| format!("Failed to load config '{}'", path.display()))?,
        None => Config::default(),
    };
    let repo = match &cli.repo_config {
        Some(path) => Some(
            RepoConfig::from_path(path)
                .with_context(|| format!("Failed to load repository config '{}'", path.display()))?,
        ),
        None => None,
    };
    Ok(config_file::layer(base, repo, &cli.overrides()))
}

fn run(cli: &Cli) -> Result<()> {
    let config = load_config(cli)?;

    let json = fs::read_to_string(&cli.input)
        .with_context(|| format!("Failed to read '{}'", cli.input.display()))?;
    let project: Node = serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse reflection JSON '{}'", cli.input.display()))?;

    let output = transform(&project, &config);
    let written = output::write_output(&output, &cli.output)?;
    info!(
        files = written.len(),
        dir = %cli.output.display(),
        "documentation written"
    );

    report(&output.diagnostics);
    let errors = output.diagnostics.count(Severity::Error);
    if cli.strict && errors > 0 {
        return Err(anyhow::anyhow!("{errors} error diagnostic(s) reported"));
    }
    Ok(())
}

fn report(diagnostics: &Diagnostics) {
    for diagnostic in diagnostics.iter() {
        match diagnostic.severity() {
            Severity::Warning => warn!("{diagnostic}"),
            Severity::Error => error!("{diagnostic}"),
        }
    }
    if !diagnostics.is_empty() {
        info!(
            warnings = diagnostics.count(Severity::Warning),
            errors = diagnostics.count(Severity::Error),
            "diagnostics"
        );
    }
}
