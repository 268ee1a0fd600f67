//! Transformation settings
//!
//! One explicit value threaded into every phase's entry point.

use std::collections::BTreeMap;

use serde::Deserialize;

use crate::ordering::SiblingOrder;

/// Settings consumed by the core pipeline
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct Config {
    /// Treat module wrapper nodes as a nesting level
    pub module_grouping: bool,
    /// Order siblings alphabetically instead of by declaration
    pub alphabetical_order: bool,
    /// Documentation base URL per external library
    pub external_links: BTreeMap<String, String>,
    /// Repository used to build source hrefs
    pub repository: Option<RepositoryContext>,
    /// Package name overriding the project name
    pub package: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            module_grouping: false,
            alphabetical_order: true,
            external_links: BTreeMap::new(),
            repository: None,
            package: None,
        }
    }
}

impl Config {
    #[must_use]
    pub fn with_module_grouping(mut self, enabled: bool) -> Self {
        self.module_grouping = enabled;
        self
    }

    #[must_use]
    pub fn with_alphabetical_order(mut self, enabled: bool) -> Self {
        self.alphabetical_order = enabled;
        self
    }

    #[must_use]
    pub fn with_external_link(mut self, library: impl Into<String>, base: impl Into<String>) -> Self {
        self.external_links.insert(library.into(), base.into());
        self
    }

    #[must_use]
    pub fn with_repository(mut self, repository: RepositoryContext) -> Self {
        self.repository = Some(repository);
        self
    }

    #[must_use]
    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }

    pub fn sibling_order(&self) -> SiblingOrder {
        SiblingOrder::from_flag(self.alphabetical_order)
    }

    /// Documentation URL of `name` in an external library, if configured
    pub fn external_link(&self, library: &str, name: &str) -> Option<String> {
        self.external_links
            .get(library)
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), name))
    }
}

/// Repository coordinates used for source links
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct RepositoryContext {
    pub repo_url: String,
    pub branch: String,
    /// Path of the analyzed sources inside the repository
    #[serde(default)]
    pub base_path: String,
}

impl RepositoryContext {
    pub fn new(
        repo_url: impl Into<String>,
        branch: impl Into<String>,
        base_path: impl Into<String>,
    ) -> Self {
        Self {
            repo_url: repo_url.into(),
            branch: branch.into(),
            base_path: base_path.into(),
        }
    }

    /// Browsable URL of a source line
    pub fn source_href(&self, path: &str, line: u32) -> String {
        let segments: Vec<&str> = [
            self.base_path.trim_matches('/'),
            path.trim_start_matches("./").trim_start_matches('/'),
        ]
        .into_iter()
        .filter(|s| !s.is_empty() && *s != ".")
        .collect();

        format!(
            "{}/blob/{}/{}#L{}",
            self.repo_url.trim_end_matches('/'),
            self.branch,
            segments.join("/"),
            line
        )
    }
}
