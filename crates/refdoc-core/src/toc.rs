//! Navigation tree
//!
//! Mirrors the nesting of the resolved roots (before orphan grouping), with
//! every entry pointing at the page its record was flattened into.

use std::collections::BTreeSet;

use serde::Serialize;
use tracing::{debug, instrument};

use crate::config::Config;
use crate::flatten::{sibling_key, Flattened, Page};
use crate::ordering::SiblingOrder;
use crate::record::{EntityKind, EntityRecord, ResolvedRef};
use crate::resolver::ResolvedRoot;

/// Entry of the navigation tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TocNode {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(rename = "items", skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TocNode>,
}

impl TocNode {
    fn group(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            uid: None,
            href: None,
            children: Vec::new(),
        }
    }

    fn for_page(name: impl Into<String>, page: &Page) -> Self {
        Self {
            name: name.into(),
            uid: Some(page.uid.clone()),
            href: Some(page.href.clone()),
            children: Vec::new(),
        }
    }

    pub fn child_names(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.name.as_str()).collect()
    }
}

/// Build the navigation tree rooted at the package
#[instrument(level = "debug", skip_all, fields(package = %package))]
pub fn build_toc(
    roots: &[ResolvedRoot],
    flattened: &Flattened,
    package: &str,
    config: &Config,
) -> TocNode {
    let records: Vec<&EntityRecord<ResolvedRef>> = roots.iter().map(|r| &r.record).collect();
    let mut toc = TocNode::group(package);
    toc.children = level(records, flattened, config.sibling_order(), None);
    debug!(entries = toc.children.len(), "built toc");
    toc
}

fn level<'a>(
    mut records: Vec<&'a EntityRecord<ResolvedRef>>,
    flattened: &Flattened,
    order: SiblingOrder,
    module: Option<&'a EntityRecord<ResolvedRef>>,
) -> Vec<TocNode> {
    let module_name = module.map(|m| m.name.as_str());
    order.sort_by_name(&mut records, |record| sibling_key(record, module_name));

    // a module's own package page is already linked from the module entry
    let mut seen: BTreeSet<&str> = module
        .and_then(|m| flattened.page(&m.uid))
        .map(|p| p.uid.as_str())
        .into_iter()
        .collect();

    let mut nodes = Vec::new();
    for record in records {
        match record.kind {
            EntityKind::Constructor => {}
            EntityKind::Module => {
                let page = flattened.page(&record.uid);
                let mut node = match page {
                    Some(page) => TocNode::for_page(&record.name, page),
                    None => TocNode::group(&record.name),
                };
                node.children = level(
                    record.children.iter().collect(),
                    flattened,
                    order,
                    Some(record),
                );
                nodes.push(node);
            }
            _ => {
                let Some(page) = flattened.page_of(&record.uid) else {
                    continue;
                };
                if !seen.insert(page.uid.as_str()) {
                    continue;
                }
                let name = if page.synthetic {
                    &page.primary.name
                } else {
                    &record.name
                };
                nodes.push(TocNode::for_page(name, page));
            }
        }
    }
    nodes
}
