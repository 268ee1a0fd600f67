//! Page flattening
//!
//! Turns resolved entity trees into page-sized output units:
//!
//! - constructors are never pages of their own
//! - every class, interface and enum is one page holding its members
//! - package-scope functions, variables and type aliases are collected into
//!   one synthetic page per package, created at the first such declaration
//! - modules are never pages of their own kind; each module gets its package
//!   page (even without orphans) and its documentation moves there
//! - nested declarations (object literal properties, inline types) are
//!   inlined after their parent, so every record has a page

use std::collections::BTreeMap;

use tracing::{debug, instrument};

use crate::config::Config;
use crate::ordering::SiblingOrder;
use crate::record::{EntityKind, EntityRecord, ResolvedRef};
use crate::resolver::{ReferenceMap, ResolvedRoot};

/// One output unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub uid: String,
    /// File name of the rendered page
    pub href: String,
    pub package: String,
    /// Leading record (children detached)
    pub primary: EntityRecord<ResolvedRef>,
    /// Members in page order, nested declarations right after their parent
    pub members: Vec<EntityRecord<ResolvedRef>>,
    /// Record uid -> uids of its direct members on this page
    pub layout: BTreeMap<String, Vec<String>>,
    /// Distinct references of the owning roots, ordered by name
    pub references: Vec<ResolvedRef>,
    /// Package page grouping orphan declarations
    pub synthetic: bool,
}

impl Page {
    pub fn member_uids(&self) -> Vec<&str> {
        self.members.iter().map(|m| m.uid.as_str()).collect()
    }

    /// Direct members of the primary or of a member
    pub fn children_of(&self, uid: &str) -> &[String] {
        self.layout.get(uid).map_or(&[], Vec::as_slice)
    }

    /// Whether a uid is the page itself or one of its members
    pub fn holds(&self, uid: &str) -> bool {
        self.uid == uid || self.members.iter().any(|m| m.uid == uid)
    }
}

/// Record uid -> uid of the page it ends up on
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageMap {
    pages: BTreeMap<String, String>,
}

impl PageMap {
    pub fn get(&self, record_uid: &str) -> Option<&str> {
        self.pages.get(record_uid).map(String::as_str)
    }

    fn insert(&mut self, record_uid: &str, page_uid: &str) {
        self.pages
            .insert(record_uid.to_string(), page_uid.to_string());
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// Pages in emission order plus the record-to-page mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flattened {
    pub pages: Vec<Page>,
    pub page_map: PageMap,
}

impl Flattened {
    /// Page by its own uid
    pub fn page(&self, uid: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.uid == uid)
    }

    /// Page a record was placed on
    pub fn page_of(&self, record_uid: &str) -> Option<&Page> {
        self.page_map.get(record_uid).and_then(|uid| self.page(uid))
    }
}

/// File name of a page: `/` becomes `.`, anything from `(` on is cut
pub fn page_href(uid: &str) -> String {
    let stem = uid.split('(').next().unwrap_or(uid);
    format!("{}.yml", stem.replace('/', "."))
}

/// Name a record sorts by among its siblings.
///
/// Orphans sort under the name of the package page they are folded into, so
/// the page sequence and the TOC agree on where that page appears.
pub(crate) fn sibling_key<'a>(
    record: &'a EntityRecord<ResolvedRef>,
    module_name: Option<&'a str>,
) -> &'a str {
    if groups_into_package(record.kind) {
        module_name.unwrap_or(&record.package)
    } else {
        &record.name
    }
}

fn groups_into_package(kind: EntityKind) -> bool {
    !kind.owns_page() && !matches!(kind, EntityKind::Module | EntityKind::Constructor)
}

struct Flattener {
    order: SiblingOrder,
    pages: Vec<Page>,
    /// package -> index of its synthetic page
    package_pages: BTreeMap<String, usize>,
    page_map: PageMap,
}

impl Flattener {
    fn level<'r>(
        &mut self,
        mut items: Vec<(&'r EntityRecord<ResolvedRef>, &'r ReferenceMap)>,
        module: Option<&'r EntityRecord<ResolvedRef>>,
    ) {
        let module_name = module.map(|m| m.name.as_str());
        self.order
            .sort_by_name(&mut items, |(record, _)| sibling_key(record, module_name));

        for (record, references) in items {
            match record.kind {
                EntityKind::Constructor => {}
                EntityKind::Module => {
                    let children = record.children.iter().map(|c| (c, references)).collect();
                    self.level(children, Some(record));
                    // placed at its first orphan, or after the module's pages
                    let index = self.package_page_index(&record.uid, Some(record));
                    self.pages[index].references.extend(references.references());
                }
                kind if kind.owns_page() => self.type_page(record, references),
                _ => self.orphan(record, references, module),
            }
        }
    }

    fn type_page(&mut self, record: &EntityRecord<ResolvedRef>, references: &ReferenceMap) {
        for descendant in record.descendants() {
            self.page_map.insert(&descendant.uid, &record.uid);
        }

        let (primary, members) = record.clone().detach_children();
        self.pages.push(Page {
            uid: primary.uid.clone(),
            href: page_href(&primary.uid),
            package: primary.package.clone(),
            primary,
            members,
            layout: BTreeMap::new(),
            references: references.references(),
            synthetic: false,
        });
    }

    fn orphan(
        &mut self,
        record: &EntityRecord<ResolvedRef>,
        references: &ReferenceMap,
        module: Option<&EntityRecord<ResolvedRef>>,
    ) {
        let index = self.package_page_index(&record.package, module);
        let page = &mut self.pages[index];
        for descendant in record.descendants() {
            self.page_map.insert(&descendant.uid, &page.uid);
        }
        page.members.push(record.clone());
        page.references.extend(references.references());
    }

    /// Index of the package page, created on first use
    fn package_page_index(
        &mut self,
        package: &str,
        module: Option<&EntityRecord<ResolvedRef>>,
    ) -> usize {
        if let Some(&index) = self.package_pages.get(package) {
            return index;
        }
        self.pages.push(package_page(package, module));
        let index = self.pages.len() - 1;
        self.package_pages.insert(package.to_string(), index);
        if let Some(module) = module {
            self.page_map.insert(&module.uid, package);
        }
        index
    }

    fn finish(self) -> Flattened {
        let order = self.order;
        let pages = self
            .pages
            .into_iter()
            .map(|mut page| {
                let mut top = std::mem::take(&mut page.members);
                order.sort_by_name(&mut top, |m| m.name.as_str());
                inline(order, top, &page.uid, &mut page.layout, &mut page.members);
                page.references
                    .sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.cmp(b)));
                page.references.dedup();
                page
            })
            .collect();
        Flattened {
            pages,
            page_map: self.page_map,
        }
    }
}

/// Append sorted records depth first, recording each parent's direct members
fn inline(
    order: SiblingOrder,
    records: Vec<EntityRecord<ResolvedRef>>,
    parent: &str,
    layout: &mut BTreeMap<String, Vec<String>>,
    out: &mut Vec<EntityRecord<ResolvedRef>>,
) {
    layout.insert(
        parent.to_string(),
        records.iter().map(|r| r.uid.clone()).collect(),
    );
    for record in records {
        let (record, mut children) = record.detach_children();
        let uid = record.uid.clone();
        out.push(record);
        if !children.is_empty() {
            order.sort_by_name(&mut children, |c| c.name.as_str());
            inline(order, children, &uid, layout, out);
        }
    }
}

fn package_page(package: &str, module: Option<&EntityRecord<ResolvedRef>>) -> Page {
    let name = module.map_or(package, |m| m.name.as_str());
    let mut primary = EntityRecord::new(package, name, EntityKind::Package, package);
    if let Some(module) = module {
        primary.id = module.id;
        primary.summary = module.summary.clone();
        primary.remarks = module.remarks.clone();
        primary.see_also = module.see_also.clone();
        primary.deprecated = module.deprecated.clone();
        primary.source = module.source.clone();
    }
    Page {
        uid: package.to_string(),
        href: page_href(package),
        package: package.to_string(),
        primary,
        members: Vec::new(),
        layout: BTreeMap::new(),
        references: Vec::new(),
        synthetic: true,
    }
}

/// Flatten resolved roots into pages
#[instrument(level = "debug", skip_all, fields(roots = roots.len()))]
pub fn flatten(roots: &[ResolvedRoot], config: &Config) -> Flattened {
    let mut flattener = Flattener {
        order: config.sibling_order(),
        pages: Vec::new(),
        package_pages: BTreeMap::new(),
        page_map: PageMap::default(),
    };
    let items = roots
        .iter()
        .map(|root| (&root.record, &root.references))
        .collect();
    flattener.level(items, None);

    let flattened = flattener.finish();
    debug!(
        pages = flattened.pages.len(),
        records = flattened.page_map.len(),
        "flattened pages"
    );
    flattened
}
