//! Configuration layering
//!
//! `refdoc.toml` first, then the repository config JSON, then command-line
//! flags.

use std::path::Path;

use refdoc_core::{Config, RepositoryContext};
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to parse repository config: {0}")]
    RepoConfig(#[from] serde_json::Error),

    #[error("invalid external link '{0}', expected LIBRARY=URL")]
    ExternalLink(String),
}

/// Load a `refdoc.toml` file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed.
pub fn load_config(path: impl AsRef<Path>) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse configuration from TOML text.
///
/// # Errors
///
/// Returns an error on invalid TOML or unknown keys.
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    Ok(toml::from_str(content)?)
}

/// Repository metadata file (`{ "repo": ..., "branch": ... }`)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoConfig {
    pub repo: String,
    pub branch: String,
}

impl RepoConfig {
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// # Errors
    ///
    /// Returns an error if the text is not a repository config object.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }
}

/// Parse a `LIBRARY=URL` flag value.
///
/// # Errors
///
/// Returns an error when either side of `=` is missing.
pub fn parse_external_link(value: &str) -> Result<(String, String), ConfigError> {
    match value.split_once('=') {
        Some((library, url)) if !library.trim().is_empty() && !url.trim().is_empty() => {
            Ok((library.trim().to_string(), url.trim().to_string()))
        }
        _ => Err(ConfigError::ExternalLink(value.to_string())),
    }
}

/// Settings given on the command line
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub has_module: bool,
    pub disable_alphabet_order: bool,
    pub source_url: Option<String>,
    pub source_branch: Option<String>,
    pub base_path: Option<String>,
    pub package: Option<String>,
    pub external_links: Vec<(String, String)>,
}

/// Apply the repository config and flag overrides on top of a base config
pub fn layer(mut config: Config, repo: Option<RepoConfig>, overrides: &Overrides) -> Config {
    // the repository config file only counts together with a base path
    let from_file = repo.zip(overrides.base_path.as_ref()).map(|(repo, base)| {
        RepositoryContext::new(repo.repo, repo.branch, base.as_str())
    });
    let from_flags = overrides
        .source_url
        .as_ref()
        .zip(overrides.source_branch.as_ref())
        .map(|(url, branch)| {
            RepositoryContext::new(
                url.as_str(),
                branch.as_str(),
                overrides.base_path.clone().unwrap_or_default(),
            )
        });
    if let Some(repository) = from_file.or(from_flags) {
        config.repository = Some(repository);
    }

    if overrides.has_module {
        config.module_grouping = true;
    }
    if overrides.disable_alphabet_order {
        config.alphabetical_order = false;
    }
    if let Some(package) = &overrides.package {
        config.package = Some(package.clone());
    }
    for (library, url) in &overrides.external_links {
        config.external_links.insert(library.clone(), url.clone());
    }
    config
}
