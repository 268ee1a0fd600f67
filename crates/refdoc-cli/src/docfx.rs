//! DocFX UniversalReference YAML rendering

use refdoc_core::record::{ParameterDoc, ReturnDoc, SourceLink, Syntax};
use refdoc_core::{EntityRecord, LinkedText, PackageIndex, Page, ResolvedRef, TocNode};
use serde::Serialize;

/// First line of every YAML reference file
pub const YAML_HEADER: &str = "### YamlMime:UniversalReference";

const LANGS: &[&str] = &["typeScript"];

#[derive(Debug, Serialize)]
pub struct ReferenceFile {
    pub items: Vec<Item>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub uid: String,
    pub name: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
    pub langs: Vec<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub syntax: Option<SyntaxModel>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub extends: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    #[serde(rename = "seealsoContent", skip_serializing_if = "Option::is_none")]
    pub see_also: Option<String>,
    #[serde(rename = "example", skip_serializing_if = "Vec::is_empty")]
    pub examples: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deprecated: Option<Deprecated>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub numeric_value: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_static: bool,
    pub package: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceModel>,
}

#[derive(Debug, Serialize)]
pub struct SyntaxModel {
    pub content: String,
    #[serde(rename = "typeParameters", skip_serializing_if = "Vec::is_empty")]
    pub type_parameters: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterModel>,
    #[serde(rename = "return", skip_serializing_if = "Option::is_none")]
    pub returns: Option<ReturnModel>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterModel {
    pub id: String,
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub optional: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReturnModel {
    #[serde(rename = "type")]
    pub types: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Deprecated {
    pub content: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceModel {
    pub path: String,
    pub start_line: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Reference {
    pub uid: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

/// Reference inside prose
fn prose_link(reference: &ResolvedRef) -> String {
    match reference {
        ResolvedRef::Resolved { uid, .. } => format!("<xref:{uid}>"),
        ResolvedRef::External { name, href } => format!("[{name}]({href})"),
        ResolvedRef::Unresolved { name } => format!("`{name}`"),
    }
}

/// Reference inside a type expression
fn type_link(reference: &ResolvedRef) -> String {
    match reference {
        ResolvedRef::Resolved { uid, .. } => uid.clone(),
        ResolvedRef::External { name, .. } | ResolvedRef::Unresolved { name } => name.clone(),
    }
}

fn prose(text: &LinkedText<ResolvedRef>) -> Option<String> {
    let rendered = text.render(prose_link);
    let trimmed = rendered.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn type_list(text: &LinkedText<ResolvedRef>) -> Vec<String> {
    let rendered = text.render(type_link);
    if rendered.is_empty() {
        Vec::new()
    } else {
        vec![rendered]
    }
}

fn syntax_model(syntax: &Syntax<ResolvedRef>) -> SyntaxModel {
    SyntaxModel {
        content: syntax.content.clone(),
        type_parameters: syntax.type_parameters.clone(),
        parameters: syntax.parameters.iter().map(parameter_model).collect(),
        returns: syntax.returns.as_ref().map(return_model),
    }
}

fn parameter_model(param: &ParameterDoc<ResolvedRef>) -> ParameterModel {
    ParameterModel {
        id: param.name.clone(),
        types: type_list(&param.ty),
        description: prose(&param.description),
        optional: param.optional,
        default_value: param.default_value.clone(),
    }
}

fn return_model(returns: &ReturnDoc<ResolvedRef>) -> ReturnModel {
    ReturnModel {
        types: type_list(&returns.ty),
        description: prose(&returns.description),
    }
}

fn source_model(source: &SourceLink) -> SourceModel {
    SourceModel {
        path: source.path.clone(),
        start_line: source.line,
        remote: source.href.clone(),
    }
}

fn heritage(refs: &[ResolvedRef]) -> Vec<String> {
    refs.iter().map(type_link).collect()
}

/// YAML item of one record; `children` lists its direct members on the page
pub fn item(record: &EntityRecord<ResolvedRef>, children: Vec<String>) -> Item {
    let see_also = (!record.see_also.is_empty()).then(|| {
        record
            .see_also
            .iter()
            .map(|r| format!("- {}", prose_link(r)))
            .collect::<Vec<_>>()
            .join("\n")
    });

    Item {
        uid: record.uid.clone(),
        name: record.name.clone(),
        full_name: record.full_name.clone(),
        children,
        langs: LANGS.iter().map(|l| (*l).to_string()).collect(),
        kind: record.kind.display_name().to_string(),
        summary: prose(&record.summary),
        remarks: prose(&record.remarks),
        syntax: record.syntax.as_ref().map(syntax_model),
        extends: heritage(&record.extends),
        implements: heritage(&record.implements),
        see_also,
        examples: record.examples.clone(),
        deprecated: record.deprecated.clone().map(|content| Deprecated { content }),
        numeric_value: record.value.clone(),
        is_static: record.is_static,
        package: record.package.clone(),
        source: record.source.as_ref().map(source_model),
    }
}

fn reference(resolved: &ResolvedRef) -> Option<Reference> {
    match resolved {
        ResolvedRef::Resolved { uid, name } => Some(Reference {
            uid: uid.clone(),
            name: name.clone(),
            href: None,
        }),
        ResolvedRef::External { name, href } => Some(Reference {
            uid: name.clone(),
            name: name.clone(),
            href: Some(href.clone()),
        }),
        ResolvedRef::Unresolved { .. } => None,
    }
}

/// Reference file of one page
pub fn page_file(page: &Page) -> ReferenceFile {
    let mut items = vec![item(&page.primary, page.children_of(&page.uid).to_vec())];
    items.extend(
        page.members
            .iter()
            .map(|m| item(m, page.children_of(&m.uid).to_vec())),
    );

    ReferenceFile {
        items,
        references: page.references.iter().filter_map(reference).collect(),
    }
}

/// Reference file listing every package index
pub fn index_file(indexes: &[PackageIndex]) -> ReferenceFile {
    let items = indexes
        .iter()
        .map(|index| Item {
            uid: index.package.clone(),
            name: index.package.clone(),
            full_name: index.package.clone(),
            children: index.members.iter().map(|m| m.uid.clone()).collect(),
            langs: LANGS.iter().map(|l| (*l).to_string()).collect(),
            kind: "package".to_string(),
            summary: None,
            remarks: None,
            syntax: None,
            extends: Vec::new(),
            implements: Vec::new(),
            see_also: None,
            examples: Vec::new(),
            deprecated: None,
            numeric_value: None,
            is_static: false,
            package: index.package.clone(),
            source: None,
        })
        .collect();
    let references = indexes
        .iter()
        .flat_map(|index| &index.members)
        .map(|member| Reference {
            uid: member.uid.clone(),
            name: member.name.clone(),
            href: None,
        })
        .collect();
    ReferenceFile { items, references }
}

/// Serialize a reference file with the YAML MIME header
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_reference(file: &ReferenceFile) -> Result<String, serde_yaml::Error> {
    Ok(format!("{YAML_HEADER}\n{}", serde_yaml::to_string(file)?))
}

/// Serialize the navigation tree; `toc.yml` carries no MIME header
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_toc(toc: &TocNode) -> Result<String, serde_yaml::Error> {
    serde_yaml::to_string(std::slice::from_ref(toc))
}
