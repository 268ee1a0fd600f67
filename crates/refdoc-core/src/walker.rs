//! Tree walker - reflection tree to entity records
//!
//! Descends the reflection tree, assigns every documented declaration a uid
//! derived from its qualified name and builds one [`EntityRecord`] per
//! declaration (one per signature for overloaded callables). Hidden
//! declarations are dropped here; malformed nodes are skipped together with
//! their subtree.

use tracing::debug;

use crate::comment::{parse_links, DocParts};
use crate::config::Config;
use crate::diagnostics::{Diagnostics, TransformError};
use crate::record::{
    EntityKind, EntityRecord, ParameterDoc, RawRef, ReturnDoc, SourceLink, Syntax,
};
use crate::reflection::{Node, NodeKind, Signature, TypeRef};
use crate::syntax::{declaration_content, signature_content, type_text, type_text_or_any, GenericScope};
use crate::uid::{StagedUids, UidTable};

/// Result of walking one reflection tree
#[derive(Debug, Clone)]
pub struct WalkOutput {
    /// Package of top-level declarations
    pub package: String,
    /// Top-level records in declaration order
    pub roots: Vec<EntityRecord<RawRef>>,
    pub uids: UidTable,
    pub diagnostics: Diagnostics,
}

/// Walk a reflection tree
pub fn walk(project: &Node, config: &Config) -> WalkOutput {
    TreeWalker::new(config).walk(project)
}

/// Naming context of the declarations being visited
#[derive(Debug, Clone)]
struct Scope {
    /// Uid of the enclosing record, `None` at package level
    prefix: Option<String>,
    package: String,
    generics: GenericScope,
}

impl Scope {
    fn child_uid(&self, name: &str) -> String {
        match &self.prefix {
            Some(prefix) => format!("{prefix}.{name}"),
            None => name.to_string(),
        }
    }
}

/// Per-root state, committed or discarded as a unit
struct RootState {
    root: String,
    staged: StagedUids,
    diagnostics: Diagnostics,
}

/// Converts reflection nodes into entity records
pub struct TreeWalker<'a> {
    config: &'a Config,
}

impl<'a> TreeWalker<'a> {
    pub fn new(config: &'a Config) -> Self {
        Self { config }
    }

    /// Walk a project node (or a single declaration)
    pub fn walk(&self, project: &Node) -> WalkOutput {
        let package = self
            .config
            .package
            .clone()
            .or_else(|| project.name.as_deref().map(|n| strip_quotes(n).to_string()))
            .unwrap_or_else(|| "index".to_string());

        let mut out = WalkOutput {
            package: package.clone(),
            roots: Vec::new(),
            uids: UidTable::new(),
            diagnostics: Diagnostics::new(),
        };
        out.uids.reserve(package.clone());

        let scope = Scope {
            prefix: None,
            package,
            generics: GenericScope::default(),
        };
        let mut anonymous = 0;
        if project.kind() == Some(NodeKind::Project) {
            self.walk_top_level(&project.children, &scope, &mut anonymous, &mut out);
        } else {
            self.walk_top_level(std::slice::from_ref(project), &scope, &mut anonymous, &mut out);
        }

        debug!(
            package = %out.package,
            roots = out.roots.len(),
            uids = out.uids.len(),
            diagnostics = out.diagnostics.len(),
            "walked reflection tree"
        );
        out
    }

    fn walk_top_level(
        &self,
        nodes: &[Node],
        scope: &Scope,
        anonymous: &mut usize,
        out: &mut WalkOutput,
    ) {
        for node in nodes {
            let (kind, name) = match classify(node) {
                Ok(classified) => classified,
                Err(err) => {
                    out.diagnostics.push(None, err);
                    continue;
                }
            };
            if node.is_hidden() {
                continue;
            }

            let transparent = kind == NodeKind::Project
                || (kind == NodeKind::Module && !self.config.module_grouping);
            if transparent {
                self.walk_top_level(&node.children, scope, anonymous, out);
                continue;
            }

            let mut state = RootState {
                root: scope.child_uid(strip_quotes(name)),
                staged: StagedUids::default(),
                diagnostics: Diagnostics::new(),
            };
            let records = self.build(node, kind, name, scope, anonymous, &mut state);

            out.diagnostics.extend(state.diagnostics);
            match out.uids.commit(state.staged) {
                Ok(()) => out.roots.extend(records),
                Err(err) => {
                    debug!(root = %state.root, "dropping root with colliding uids");
                    out.diagnostics.push(Some(&state.root), err);
                }
            }
        }
    }

    fn build(
        &self,
        node: &Node,
        kind: NodeKind,
        raw_name: &str,
        scope: &Scope,
        anonymous: &mut usize,
        state: &mut RootState,
    ) -> Vec<EntityRecord<RawRef>> {
        let (name, uid) = if kind == NodeKind::TypeLiteral || raw_name.starts_with("__") {
            let index = *anonymous;
            *anonymous += 1;
            (
                "(anonymous)".to_string(),
                scope.child_uid(&format!("__anonymous_{index}")),
            )
        } else {
            let name = strip_quotes(raw_name).to_string();
            let uid = scope.child_uid(&name);
            (name, uid)
        };

        let generics = scope.generics.with(&node.type_parameter);
        let doc = DocParts::parse(node.doc_comment());

        if kind.is_callable() && !node.signatures.is_empty() {
            return node
                .signatures
                .iter()
                .enumerate()
                .map(|(i, signature)| {
                    let uid = if i == 0 {
                        uid.clone()
                    } else {
                        format!("{uid}_{i}")
                    };
                    state.staged.claim(node.id, uid.as_str(), name.as_str());
                    self.callable_record(node, kind, &name, uid, signature, scope, &generics, doc.clone())
                })
                .collect();
        }

        state.staged.claim(node.id, uid.as_str(), name.as_str());
        let mut record = self.base_record(node, kind, &name, uid, scope, &doc);

        let returns = matches!(
            kind,
            NodeKind::Property | NodeKind::Variable | NodeKind::Accessor | NodeKind::TypeAlias
        )
        .then(|| ReturnDoc {
            ty: type_text_or_any(node.declared_type(), &generics),
            description: doc.returns.clone(),
        });
        record.syntax = Some(Syntax {
            content: declaration_content(kind, &name, node, &generics),
            type_parameters: node.type_parameter.iter().map(|p| p.name.clone()).collect(),
            parameters: Vec::new(),
            returns,
        });
        record.extends = heritage_refs(&node.extended_types, &generics);
        record.implements = heritage_refs(&node.implemented_types, &generics);

        let child_scope = Scope {
            prefix: Some(record.uid.clone()),
            package: record.package.clone(),
            generics,
        };
        let mut child_anonymous = 0;
        for child in &node.children {
            let (child_kind, child_name) = match classify(child) {
                Ok(classified) => classified,
                Err(err) => {
                    state.diagnostics.push(Some(&state.root), err);
                    continue;
                }
            };
            if child.is_hidden() {
                continue;
            }
            let children = self.build(
                child,
                child_kind,
                child_name,
                &child_scope,
                &mut child_anonymous,
                state,
            );
            record.children.extend(children);
        }

        vec![record]
    }

    fn base_record(
        &self,
        node: &Node,
        kind: NodeKind,
        name: &str,
        uid: String,
        scope: &Scope,
        doc: &DocParts,
    ) -> EntityRecord<RawRef> {
        let package = if kind == NodeKind::Module {
            uid.clone()
        } else {
            scope.package.clone()
        };
        let mut record = EntityRecord::new(uid, name, entity_kind(kind), package);
        record.id = node.id;
        record.summary = doc.summary.clone();
        record.remarks = doc.remarks.clone();
        record.see_also = doc.see_also.clone();
        record.examples = doc.examples.clone();
        record.deprecated = doc.deprecated.clone();
        record.is_static = node.flags.is_static;
        record.is_optional = node.flags.is_optional;
        if kind == NodeKind::EnumMember {
            record.value = node.default_value.clone();
        }
        record.source = self.source_link(node);
        record
    }

    #[allow(clippy::too_many_arguments)]
    fn callable_record(
        &self,
        node: &Node,
        kind: NodeKind,
        name: &str,
        uid: String,
        signature: &Signature,
        scope: &Scope,
        generics: &GenericScope,
        node_doc: DocParts,
    ) -> EntityRecord<RawRef> {
        let doc = DocParts::parse(signature.comment.as_ref()).or_else(node_doc);
        let generics = generics.with(&signature.type_parameter);
        let mut record = self.base_record(node, kind, name, uid, scope, &doc);

        let parameters = signature
            .parameters
            .iter()
            .map(|param| {
                let own = param
                    .comment
                    .as_ref()
                    .and_then(|c| c.short_text.as_deref().or(c.text.as_deref()))
                    .map(|text| parse_links(text.trim()));
                ParameterDoc {
                    name: param.name.clone(),
                    ty: type_text_or_any(param.ty.as_ref(), &generics),
                    description: own
                        .or_else(|| doc.params.get(&param.name).cloned())
                        .unwrap_or_default(),
                    optional: param.flags.is_optional || param.default_value.is_some(),
                    default_value: param.default_value.clone(),
                }
            })
            .collect();

        let returns = (kind != NodeKind::Constructor).then(|| ReturnDoc {
            ty: type_text_or_any(signature.ty.as_ref(), &generics),
            description: doc.returns.clone(),
        });

        record.syntax = Some(Syntax {
            content: signature_content(kind, name, signature, node.flags.is_static, &generics),
            type_parameters: signature
                .type_parameter
                .iter()
                .map(|p| p.name.clone())
                .collect(),
            parameters,
            returns,
        });
        record
    }

    fn source_link(&self, node: &Node) -> Option<SourceLink> {
        let location = node.sources.first()?;
        let href = self
            .config
            .repository
            .as_ref()
            .map(|repo| repo.source_href(&location.file_name, location.line));
        Some(SourceLink {
            path: location.file_name.clone(),
            line: location.line,
            href,
        })
    }
}

/// Check the required fields of a node
fn classify(node: &Node) -> Result<(NodeKind, &str), TransformError> {
    if node.id.is_none() {
        return Err(TransformError::MalformedNode {
            id: None,
            field: "id",
        });
    }
    let name = node
        .name
        .as_deref()
        .filter(|n| !n.is_empty())
        .ok_or(TransformError::MalformedNode {
            id: node.id,
            field: "name",
        })?;
    let kind_string = node
        .kind_string
        .as_deref()
        .ok_or(TransformError::MalformedNode {
            id: node.id,
            field: "kindString",
        })?;
    let kind = NodeKind::from_kind_string(kind_string).ok_or_else(|| {
        TransformError::UnsupportedKind {
            name: name.to_string(),
            kind: kind_string.to_string(),
        }
    })?;
    Ok((kind, name))
}

fn entity_kind(kind: NodeKind) -> EntityKind {
    match kind {
        NodeKind::Project => EntityKind::Package,
        NodeKind::Module => EntityKind::Module,
        NodeKind::Class => EntityKind::Class,
        NodeKind::Interface => EntityKind::Interface,
        NodeKind::Enum => EntityKind::Enum,
        NodeKind::EnumMember => EntityKind::EnumMember,
        NodeKind::Function => EntityKind::Function,
        NodeKind::Variable => EntityKind::Variable,
        NodeKind::Property => EntityKind::Property,
        NodeKind::Method => EntityKind::Method,
        NodeKind::Constructor => EntityKind::Constructor,
        NodeKind::Accessor => EntityKind::Accessor,
        NodeKind::TypeAlias => EntityKind::TypeAlias,
        NodeKind::TypeLiteral => EntityKind::TypeLiteral,
        NodeKind::ObjectLiteral => EntityKind::Variable,
    }
}

fn heritage_refs(types: &[TypeRef], generics: &GenericScope) -> Vec<RawRef> {
    types
        .iter()
        .filter_map(|ty| type_text(ty, generics).refs().next().cloned())
        .collect()
}

/// External module names arrive quoted (`"src/util"`)
fn strip_quotes(name: &str) -> &str {
    name.trim_matches('"')
}
