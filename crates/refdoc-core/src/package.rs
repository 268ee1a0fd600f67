//! Package indexes
//!
//! Navigation metadata listing every page per package. Always sorted by uid,
//! whatever the sibling ordering setting.

use std::collections::BTreeMap;

use tracing::debug;

use crate::flatten::Page;
use crate::ordering::compare_uids;
use crate::record::EntityKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub uid: String,
    pub name: String,
    pub kind: EntityKind,
}

/// Pages belonging to one package
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageIndex {
    pub package: String,
    pub members: Vec<IndexEntry>,
}

impl PackageIndex {
    pub fn member_uids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.uid.as_str()).collect()
    }
}

/// One index per package, ordered by package name
pub fn build_package_indexes(pages: &[Page]) -> Vec<PackageIndex> {
    let mut by_package: BTreeMap<&str, Vec<IndexEntry>> = BTreeMap::new();
    for page in pages {
        by_package
            .entry(page.package.as_str())
            .or_default()
            .push(IndexEntry {
                uid: page.primary.uid.clone(),
                name: page.primary.name.clone(),
                kind: page.primary.kind,
            });
    }

    let mut indexes: Vec<PackageIndex> = by_package
        .into_iter()
        .map(|(package, mut members)| {
            members.sort_by(|a, b| compare_uids(&a.uid, &b.uid));
            PackageIndex {
                package: package.to_string(),
                members,
            }
        })
        .collect();
    indexes.sort_by(|a, b| compare_uids(&a.package, &b.package));
    debug!(packages = indexes.len(), "built package indexes");
    indexes
}
