//! Entity records: the canonical documentation unit
//!
//! Records are generic over the representation of their cross-references.
//! The tree walker produces `EntityRecord<RawRef>`; the reference resolver
//! maps every reference exactly once and yields `EntityRecord<ResolvedRef>`,
//! so a raw node identity cannot reach a later phase.

use std::fmt;

use crate::reflection::NodeId;

/// Kind of documented entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// Synthetic package page grouping orphan declarations
    Package,
    Module,
    Class,
    Interface,
    Enum,
    EnumMember,
    Function,
    Variable,
    Property,
    Method,
    Constructor,
    Accessor,
    TypeAlias,
    TypeLiteral,
}

impl EntityKind {
    /// Name used by the documentation site for the item type
    pub fn display_name(&self) -> &'static str {
        match self {
            EntityKind::Package => "package",
            EntityKind::Module => "module",
            EntityKind::Class => "class",
            EntityKind::Interface => "interface",
            EntityKind::Enum => "enum",
            EntityKind::EnumMember => "field",
            EntityKind::Function => "function",
            EntityKind::Variable => "variable",
            EntityKind::Property => "property",
            EntityKind::Method => "method",
            EntityKind::Constructor => "constructor",
            EntityKind::Accessor => "property",
            EntityKind::TypeAlias => "typealias",
            EntityKind::TypeLiteral => "typeliteral",
        }
    }

    /// Kinds that always get a page of their own
    pub fn owns_page(&self) -> bool {
        matches!(
            self,
            EntityKind::Class | EntityKind::Interface | EntityKind::Enum
        )
    }

    /// Package-scope declarations collected into the package page
    pub fn is_orphan(&self) -> bool {
        matches!(
            self,
            EntityKind::Function | EntityKind::Variable | EntityKind::TypeAlias
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// What a reference points at before resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RefTarget {
    /// Declaration identity from the reflection tree
    Id(NodeId),
    /// Qualified or simple name written in a comment or type
    Name(String),
}

impl fmt::Display for RefTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Id(id) => write!(f, "#{id}"),
            RefTarget::Name(name) => f.write_str(name),
        }
    }
}

/// Reference as written in the reflection tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RawRef {
    pub target: RefTarget,
    /// Display name
    pub name: String,
    /// Library the target originates from, when known
    pub package: Option<String>,
}

impl RawRef {
    pub fn id(id: NodeId, name: impl Into<String>) -> Self {
        Self {
            target: RefTarget::Id(id),
            name: name.into(),
            package: None,
        }
    }

    pub fn name(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            target: RefTarget::Name(name.clone()),
            name,
            package: None,
        }
    }
}

/// Outcome of resolving one reference
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResolvedRef {
    /// Points at an entity in the output set
    Resolved { uid: String, name: String },
    /// Points at another library's documentation
    External { name: String, href: String },
    /// Nothing to point at; only the display name survives
    Unresolved { name: String },
}

impl ResolvedRef {
    pub fn name(&self) -> &str {
        match self {
            ResolvedRef::Resolved { name, .. }
            | ResolvedRef::External { name, .. }
            | ResolvedRef::Unresolved { name } => name,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        match self {
            ResolvedRef::Resolved { uid, .. } => Some(uid),
            _ => None,
        }
    }

    pub fn is_unresolved(&self) -> bool {
        matches!(self, ResolvedRef::Unresolved { .. })
    }
}

/// Field of a record a reference was found in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefField {
    Summary,
    Remarks,
    Extends,
    Implements,
    SeeAlso,
    ParameterType,
    ParameterDescription,
    ReturnType,
    ReturnDescription,
}

impl fmt::Display for RefField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RefField::Summary => "summary",
            RefField::Remarks => "remarks",
            RefField::Extends => "extends",
            RefField::Implements => "implements",
            RefField::SeeAlso => "see also",
            RefField::ParameterType => "parameter type",
            RefField::ParameterDescription => "parameter description",
            RefField::ReturnType => "return type",
            RefField::ReturnDescription => "return description",
        };
        f.write_str(name)
    }
}

/// Maps references of one representation onto another
pub trait RefMapper<R, S> {
    /// Map one reference found in `field` of the record `owner`
    fn map_ref(&mut self, owner: &str, field: RefField, reference: R) -> S;
}

/// Piece of linked text
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment<R> {
    Text(String),
    Ref(R),
}

/// Text interleaved with references, used for prose and type expressions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedText<R> {
    pub fragments: Vec<Fragment<R>>,
}

impl<R> Default for LinkedText<R> {
    fn default() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }
}

impl<R> LinkedText<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        let mut linked = Self::new();
        linked.push_text(text);
        linked
    }

    pub fn reference(reference: R) -> Self {
        Self {
            fragments: vec![Fragment::Ref(reference)],
        }
    }

    /// Append text, merging with a trailing text fragment
    pub fn push_text(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text.is_empty() {
            return;
        }
        if let Some(Fragment::Text(last)) = self.fragments.last_mut() {
            last.push_str(&text);
        } else {
            self.fragments.push(Fragment::Text(text));
        }
    }

    pub fn push_ref(&mut self, reference: R) {
        self.fragments.push(Fragment::Ref(reference));
    }

    pub fn append(&mut self, other: LinkedText<R>) {
        for fragment in other.fragments {
            match fragment {
                Fragment::Text(text) => self.push_text(text),
                Fragment::Ref(r) => self.push_ref(r),
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    pub fn refs(&self) -> impl Iterator<Item = &R> {
        self.fragments.iter().filter_map(|f| match f {
            Fragment::Ref(r) => Some(r),
            Fragment::Text(_) => None,
        })
    }

    /// Render with references replaced by the given display function
    pub fn render(&self, mut show: impl FnMut(&R) -> String) -> String {
        let mut out = String::new();
        for fragment in &self.fragments {
            match fragment {
                Fragment::Text(text) => out.push_str(text),
                Fragment::Ref(r) => out.push_str(&show(r)),
            }
        }
        out
    }

    pub fn map_refs<S>(
        self,
        owner: &str,
        field: RefField,
        mapper: &mut impl RefMapper<R, S>,
    ) -> LinkedText<S> {
        LinkedText {
            fragments: self
                .fragments
                .into_iter()
                .map(|f| match f {
                    Fragment::Text(text) => Fragment::Text(text),
                    Fragment::Ref(r) => Fragment::Ref(mapper.map_ref(owner, field, r)),
                })
                .collect(),
        }
    }
}

impl LinkedText<RawRef> {
    /// Text with references shown by display name
    pub fn to_plain(&self) -> String {
        self.render(|r| r.name.clone())
    }
}

impl LinkedText<ResolvedRef> {
    pub fn to_plain(&self) -> String {
        self.render(|r| r.name().to_string())
    }
}

/// Declaration syntax of an entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syntax<R> {
    /// Declaration line, e.g. `function f(a: string): void`
    pub content: String,
    pub type_parameters: Vec<String>,
    pub parameters: Vec<ParameterDoc<R>>,
    /// Return type for callables, declared type for properties and variables
    pub returns: Option<ReturnDoc<R>>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDoc<R> {
    pub name: String,
    pub ty: LinkedText<R>,
    pub description: LinkedText<R>,
    pub optional: bool,
    pub default_value: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReturnDoc<R> {
    pub ty: LinkedText<R>,
    pub description: LinkedText<R>,
}

impl<R> Syntax<R> {
    pub fn map_refs<S>(self, owner: &str, mapper: &mut impl RefMapper<R, S>) -> Syntax<S> {
        Syntax {
            content: self.content,
            type_parameters: self.type_parameters,
            parameters: self
                .parameters
                .into_iter()
                .map(|p| ParameterDoc {
                    name: p.name,
                    ty: p.ty.map_refs(owner, RefField::ParameterType, mapper),
                    description: p
                        .description
                        .map_refs(owner, RefField::ParameterDescription, mapper),
                    optional: p.optional,
                    default_value: p.default_value,
                })
                .collect(),
            returns: self.returns.map(|r| ReturnDoc {
                ty: r.ty.map_refs(owner, RefField::ReturnType, mapper),
                description: r
                    .description
                    .map_refs(owner, RefField::ReturnDescription, mapper),
            }),
        }
    }
}

/// Link back to the declaration in the source repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLink {
    pub path: String,
    pub line: u32,
    /// Browsable URL, present when a repository context is configured
    pub href: Option<String>,
}

/// One documented entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRecord<R> {
    pub uid: String,
    /// Identity of the originating node; `None` for synthetic records
    pub id: Option<NodeId>,
    pub name: String,
    pub full_name: String,
    pub package: String,
    pub kind: EntityKind,
    pub summary: LinkedText<R>,
    pub remarks: LinkedText<R>,
    pub syntax: Option<Syntax<R>>,
    pub extends: Vec<R>,
    pub implements: Vec<R>,
    pub see_also: Vec<R>,
    pub examples: Vec<String>,
    pub deprecated: Option<String>,
    pub is_static: bool,
    pub is_optional: bool,
    /// Initializer of enum members
    pub value: Option<String>,
    pub source: Option<SourceLink>,
    /// Nested records in source order
    pub children: Vec<EntityRecord<R>>,
}

impl<R> EntityRecord<R> {
    /// Create an empty record
    pub fn new(
        uid: impl Into<String>,
        name: impl Into<String>,
        kind: EntityKind,
        package: impl Into<String>,
    ) -> Self {
        let uid = uid.into();
        Self {
            full_name: uid.clone(),
            uid,
            id: None,
            name: name.into(),
            package: package.into(),
            kind,
            summary: LinkedText::new(),
            remarks: LinkedText::new(),
            syntax: None,
            extends: Vec::new(),
            implements: Vec::new(),
            see_also: Vec::new(),
            examples: Vec::new(),
            deprecated: None,
            is_static: false,
            is_optional: false,
            value: None,
            source: None,
            children: Vec::new(),
        }
    }

    /// Uids of direct children, in order
    pub fn child_uids(&self) -> Vec<&str> {
        self.children.iter().map(|c| c.uid.as_str()).collect()
    }

    /// This record and every nested record, depth first
    pub fn descendants(&self) -> Vec<&EntityRecord<R>> {
        let mut out = vec![self];
        for child in &self.children {
            out.extend(child.descendants());
        }
        out
    }

    /// Split off the children, leaving a leaf record
    pub fn detach_children(mut self) -> (Self, Vec<Self>) {
        let children = std::mem::take(&mut self.children);
        (self, children)
    }

    /// Every reference held by this record (children excluded)
    pub fn own_refs(&self) -> Vec<&R> {
        let mut refs: Vec<&R> = Vec::new();
        refs.extend(self.summary.refs());
        refs.extend(self.remarks.refs());
        refs.extend(self.extends.iter());
        refs.extend(self.implements.iter());
        refs.extend(self.see_also.iter());
        if let Some(syntax) = &self.syntax {
            for p in &syntax.parameters {
                refs.extend(p.ty.refs());
                refs.extend(p.description.refs());
            }
            if let Some(r) = &syntax.returns {
                refs.extend(r.ty.refs());
                refs.extend(r.description.refs());
            }
        }
        refs
    }

    /// Map every reference in this record and its children
    pub fn map_refs<S>(self, mapper: &mut impl RefMapper<R, S>) -> EntityRecord<S> {
        let owner = self.uid.clone();

        let summary = self.summary.map_refs(&owner, RefField::Summary, mapper);
        let remarks = self.remarks.map_refs(&owner, RefField::Remarks, mapper);
        let syntax = self.syntax.map(|s| s.map_refs(&owner, mapper));
        let extends = self
            .extends
            .into_iter()
            .map(|r| mapper.map_ref(&owner, RefField::Extends, r))
            .collect();
        let implements = self
            .implements
            .into_iter()
            .map(|r| mapper.map_ref(&owner, RefField::Implements, r))
            .collect();
        let see_also = self
            .see_also
            .into_iter()
            .map(|r| mapper.map_ref(&owner, RefField::SeeAlso, r))
            .collect();

        let children = self
            .children
            .into_iter()
            .map(|c| c.map_refs(mapper))
            .collect();

        EntityRecord {
            uid: self.uid,
            id: self.id,
            name: self.name,
            full_name: self.full_name,
            package: self.package,
            kind: self.kind,
            summary,
            remarks,
            syntax,
            extends,
            implements,
            see_also,
            examples: self.examples,
            deprecated: self.deprecated,
            is_static: self.is_static,
            is_optional: self.is_optional,
            value: self.value,
            source: self.source,
            children,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl RefMapper<RawRef, String> for Upper {
        fn map_ref(&mut self, owner: &str, field: RefField, reference: RawRef) -> String {
            format!("{owner}/{field}/{}", reference.name.to_uppercase())
        }
    }

    #[test]
    fn test_linked_text_merges_text() {
        let mut text: LinkedText<RawRef> = LinkedText::plain("Array");
        text.push_text("<");
        text.push_ref(RawRef::id(3, "Item"));
        text.push_text(">");
        assert_eq!(text.fragments.len(), 3);
        assert_eq!(text.to_plain(), "Array<Item>");
    }

    #[test]
    fn test_map_refs_visits_every_field() {
        let mut record: EntityRecord<RawRef> =
            EntityRecord::new("A", "A", EntityKind::Class, "pkg");
        record.summary = LinkedText::reference(RawRef::name("b"));
        record.extends.push(RawRef::id(1, "base"));
        record.see_also.push(RawRef::name("c"));
        let mut child = EntityRecord::new("A.m", "m", EntityKind::Method, "pkg");
        child.syntax = Some(Syntax {
            content: "m(): D".to_string(),
            type_parameters: Vec::new(),
            parameters: Vec::new(),
            returns: Some(ReturnDoc {
                ty: LinkedText::reference(RawRef::name("d")),
                description: LinkedText::new(),
            }),
        });
        record.children.push(child);

        let mapped = record.map_refs(&mut Upper);
        assert_eq!(mapped.summary.refs().next().unwrap(), "A/summary/B");
        assert_eq!(mapped.extends, vec!["A/extends/BASE".to_string()]);
        assert_eq!(mapped.see_also, vec!["A/see also/C".to_string()]);

        let returns = mapped.children[0].syntax.as_ref().unwrap().returns.as_ref().unwrap();
        assert_eq!(returns.ty.refs().next().unwrap(), "A.m/return type/D");
    }

    #[test]
    fn test_descendants_and_child_uids() {
        let mut record: EntityRecord<RawRef> =
            EntityRecord::new("A", "A", EntityKind::Class, "pkg");
        record
            .children
            .push(EntityRecord::new("A.x", "x", EntityKind::Property, "pkg"));
        record
            .children
            .push(EntityRecord::new("A.y", "y", EntityKind::Property, "pkg"));

        assert_eq!(record.child_uids(), vec!["A.x", "A.y"]);
        assert_eq!(record.descendants().len(), 3);

        let (leaf, children) = record.detach_children();
        assert!(leaf.children.is_empty());
        assert_eq!(children.len(), 2);
    }
}
