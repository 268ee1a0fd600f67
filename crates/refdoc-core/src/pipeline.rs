//! Pipeline entry point
//!
//! Runs the phases strictly in sequence; each phase consumes the complete
//! output of the previous one.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::diagnostics::Diagnostics;
use crate::flatten::{flatten, Page};
use crate::package::{build_package_indexes, PackageIndex};
use crate::reflection::Node;
use crate::resolver::resolve_all;
use crate::toc::{build_toc, TocNode};
use crate::walker::walk;

/// Everything a run produces
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformOutput {
    /// Package of the top-level declarations
    pub package: String,
    pub pages: Vec<Page>,
    pub toc: TocNode,
    pub packages: Vec<PackageIndex>,
    pub diagnostics: Diagnostics,
}

/// Transform a reflection tree into pages, a TOC and package indexes
#[instrument(level = "debug", skip_all)]
pub fn transform(project: &Node, config: &Config) -> TransformOutput {
    let walked = walk(project, config);
    let mut diagnostics = walked.diagnostics;

    let (roots, unresolved) = resolve_all(walked.roots, &walked.uids, config);
    diagnostics.extend(unresolved);

    let flattened = flatten(&roots, config);
    let toc = build_toc(&roots, &flattened, &walked.package, config);
    let packages = build_package_indexes(&flattened.pages);

    debug!(
        pages = flattened.pages.len(),
        packages = packages.len(),
        diagnostics = diagnostics.len(),
        "transform finished"
    );
    TransformOutput {
        package: walked.package,
        pages: flattened.pages,
        toc,
        packages,
        diagnostics,
    }
}
