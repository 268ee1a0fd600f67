//! Reference resolution
//!
//! Maps every raw reference of a walked root onto a [`ResolvedRef`]. Each
//! reference is looked up exactly once against the frozen [`UidTable`]; the
//! resolver never follows the target's own references, so cycles between
//! declarations cannot recurse.

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::diagnostics::{Diagnostics, TransformError};
use crate::record::{EntityRecord, RawRef, RefField, RefMapper, RefTarget, ResolvedRef};
use crate::uid::UidTable;

/// Per-root mapping of reference targets to their resolution
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferenceMap {
    entries: BTreeMap<RefTarget, ResolvedRef>,
}

impl ReferenceMap {
    pub fn get(&self, target: &RefTarget) -> Option<&ResolvedRef> {
        self.entries.get(target)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct resolutions, ordered by display name
    pub fn references(&self) -> Vec<ResolvedRef> {
        let mut refs: Vec<ResolvedRef> = self.entries.values().cloned().collect();
        refs.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.cmp(b)));
        refs.dedup();
        refs
    }
}

/// A root record with every reference resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoot {
    pub record: EntityRecord<ResolvedRef>,
    pub references: ReferenceMap,
}

struct Resolver<'a> {
    uids: &'a UidTable,
    config: &'a Config,
    root: &'a str,
    references: ReferenceMap,
    diagnostics: Diagnostics,
}

impl Resolver<'_> {
    fn lookup(&self, reference: &RawRef) -> ResolvedRef {
        let uid = match &reference.target {
            RefTarget::Id(id) => self.uids.get(*id),
            RefTarget::Name(name) => self.uids.lookup_name(name),
        };
        if let Some(uid) = uid {
            return ResolvedRef::Resolved {
                uid: uid.to_string(),
                name: reference.name.clone(),
            };
        }

        let external = reference
            .package
            .as_deref()
            .and_then(|library| self.config.external_link(library, &reference.name));
        match external {
            Some(href) => ResolvedRef::External {
                name: reference.name.clone(),
                href,
            },
            None => ResolvedRef::Unresolved {
                name: reference.name.clone(),
            },
        }
    }
}

impl RefMapper<RawRef, ResolvedRef> for Resolver<'_> {
    fn map_ref(&mut self, owner: &str, field: RefField, reference: RawRef) -> ResolvedRef {
        let resolved = self.lookup(&reference);
        if resolved.is_unresolved() {
            self.diagnostics.push(
                Some(self.root),
                TransformError::UnresolvedReference {
                    owner: owner.to_string(),
                    field,
                    name: reference.name.clone(),
                },
            );
        }
        self.references
            .entries
            .entry(reference.target)
            .or_insert_with(|| resolved.clone());
        resolved
    }
}

/// Resolve one root against the uid table
pub fn resolve(
    root: EntityRecord<RawRef>,
    uids: &UidTable,
    config: &Config,
) -> (ResolvedRoot, Diagnostics) {
    let root_uid = root.uid.clone();
    let mut resolver = Resolver {
        uids,
        config,
        root: &root_uid,
        references: ReferenceMap::default(),
        diagnostics: Diagnostics::new(),
    };
    let record = root.map_refs(&mut resolver);

    let resolved = ResolvedRoot {
        record,
        references: resolver.references,
    };
    (resolved, resolver.diagnostics)
}

/// Resolve every root, in order
#[instrument(level = "debug", skip_all, fields(roots = roots.len()))]
pub fn resolve_all(
    roots: Vec<EntityRecord<RawRef>>,
    uids: &UidTable,
    config: &Config,
) -> (Vec<ResolvedRoot>, Diagnostics) {
    let mut diagnostics = Diagnostics::new();
    let resolved: Vec<ResolvedRoot> = roots
        .into_iter()
        .map(|root| {
            let (resolved, found) = resolve(root, uids, config);
            diagnostics.extend(found);
            resolved
        })
        .collect();

    debug!(
        references = resolved.iter().map(|r| r.references.len()).sum::<usize>(),
        unresolved = diagnostics.len(),
        "resolved references"
    );
    (resolved, diagnostics)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{EntityKind, LinkedText};
    use crate::uid::StagedUids;

    fn table() -> UidTable {
        let mut uids = UidTable::new();
        let mut staged = StagedUids::default();
        staged.claim(Some(1), "Widget", "Widget");
        staged.claim(Some(2), "Widget.render", "render");
        uids.commit(staged).unwrap();
        uids
    }

    #[test]
    fn test_three_way_resolution() {
        let mut record: EntityRecord<RawRef> =
            EntityRecord::new("Button", "Button", EntityKind::Class, "ui");
        record.extends.push(RawRef::id(1, "Widget"));
        record.see_also.push(RawRef::name("render"));
        record.implements.push(RawRef {
            target: RefTarget::Name("EventTarget".to_string()),
            name: "EventTarget".to_string(),
            package: Some("typescript".to_string()),
        });
        record.summary = LinkedText::reference(RawRef::name("Missing"));

        let config = Config::default().with_external_link("typescript", "https://ts.dev/api/");
        let (resolved, diagnostics) = resolve(record, &table(), &config);
        let record = resolved.record;

        assert_eq!(
            record.extends,
            vec![ResolvedRef::Resolved {
                uid: "Widget".to_string(),
                name: "Widget".to_string()
            }]
        );
        assert_eq!(record.see_also[0].uid(), Some("Widget.render"));
        assert_eq!(
            record.implements[0],
            ResolvedRef::External {
                name: "EventTarget".to_string(),
                href: "https://ts.dev/api/EventTarget".to_string()
            }
        );
        assert!(record.summary.refs().next().unwrap().is_unresolved());

        assert_eq!(diagnostics.len(), 1);
        let diagnostic = diagnostics.iter().next().unwrap();
        assert_eq!(diagnostic.root.as_deref(), Some("Button"));
        assert_eq!(
            diagnostic.error,
            TransformError::UnresolvedReference {
                owner: "Button".to_string(),
                field: RefField::Summary,
                name: "Missing".to_string()
            }
        );
        assert_eq!(resolved.references.len(), 4);
    }

    #[test]
    fn test_external_library_without_base_is_unresolved() {
        let mut record: EntityRecord<RawRef> =
            EntityRecord::new("f", "f", EntityKind::Function, "ui");
        record.see_also.push(RawRef {
            target: RefTarget::Name("Promise".to_string()),
            name: "Promise".to_string(),
            package: Some("typescript".to_string()),
        });
        let (resolved, diagnostics) = resolve(record, &table(), &Config::default());
        assert!(resolved.record.see_also[0].is_unresolved());
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_self_reference_resolves_once() {
        let mut record: EntityRecord<RawRef> =
            EntityRecord::new("Widget", "Widget", EntityKind::Class, "ui");
        record.see_also.push(RawRef::id(1, "Widget"));
        record.see_also.push(RawRef::id(1, "Widget"));
        let (resolved, diagnostics) = resolve(record, &table(), &Config::default());
        assert!(diagnostics.is_empty());
        assert_eq!(resolved.references.references().len(), 1);
    }

    #[test]
    fn test_failures_do_not_stop_other_roots() {
        let mut broken: EntityRecord<RawRef> =
            EntityRecord::new("a", "a", EntityKind::Function, "ui");
        broken.see_also.push(RawRef::name("nowhere"));
        let mut fine: EntityRecord<RawRef> =
            EntityRecord::new("b", "b", EntityKind::Function, "ui");
        fine.see_also.push(RawRef::name("Widget"));

        let (resolved, diagnostics) =
            resolve_all(vec![broken, fine], &table(), &Config::default());
        assert_eq!(resolved.len(), 2);
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(resolved[1].record.see_also[0].uid(), Some("Widget"));
    }
}
