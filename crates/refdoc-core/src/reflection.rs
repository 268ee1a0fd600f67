//! Reflection tree produced by the static analyzer
//!
//! The shape mirrors the TypeDoc JSON document: every declaration is a
//! [`Node`] with a kind string, flags, an optional documentation comment,
//! ordered children and call signatures. Fields are optional where the
//! analyzer may omit them; the tree walker decides what a well-formed node is.

use serde::{Deserialize, Deserializer};

/// Identity the analyzer assigns to each declaration
pub type NodeId = u64;

/// A raw declaration node
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Node {
    #[serde(default)]
    pub id: Option<NodeId>,
    #[serde(default)]
    pub name: Option<String>,
    /// Human readable kind ("Class", "Method", "External module", ...)
    #[serde(default)]
    pub kind_string: Option<String>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub children: Vec<Node>,
    #[serde(default)]
    pub signatures: Vec<Signature>,
    /// Getter of an accessor
    #[serde(default, deserialize_with = "one_or_many")]
    pub get_signature: Vec<Signature>,
    /// Setter of an accessor
    #[serde(default, deserialize_with = "one_or_many")]
    pub set_signature: Vec<Signature>,
    /// Declared type of properties, variables and type aliases
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub extended_types: Vec<TypeRef>,
    #[serde(default)]
    pub implemented_types: Vec<TypeRef>,
    #[serde(default, alias = "typeParameters")]
    pub type_parameter: Vec<TypeParameter>,
    #[serde(default)]
    pub sources: Vec<SourceLocation>,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl Node {
    /// Create a well-formed node of the given kind
    pub fn new(id: NodeId, name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            id: Some(id),
            name: Some(name.into()),
            kind_string: Some(kind.as_str().to_string()),
            ..Self::default()
        }
    }

    /// Parsed kind, `None` when the kind string is absent or unknown
    pub fn kind(&self) -> Option<NodeKind> {
        self.kind_string.as_deref().and_then(NodeKind::from_kind_string)
    }

    /// Declared type; accessors carry it on their getter or setter
    pub fn declared_type(&self) -> Option<&TypeRef> {
        self.ty
            .as_ref()
            .or_else(|| self.get_signature.first().and_then(|s| s.ty.as_ref()))
            .or_else(|| {
                self.set_signature
                    .first()
                    .and_then(|s| s.parameters.first())
                    .and_then(|p| p.ty.as_ref())
            })
    }

    /// Node comment, falling back to the accessor signatures
    pub fn doc_comment(&self) -> Option<&Comment> {
        self.comment.as_ref().or_else(|| {
            self.get_signature
                .iter()
                .chain(&self.set_signature)
                .find_map(|s| s.comment.as_ref())
        })
    }

    /// Whether the declaration is excluded from the published output
    pub fn is_hidden(&self) -> bool {
        if self.flags.is_private {
            return true;
        }
        let hidden_by = |comment: &Comment| {
            comment.has_tag("internal") || comment.has_tag("hidden") || comment.has_tag("ignore")
        };
        self.doc_comment().is_some_and(hidden_by)
            || self
                .signatures
                .first()
                .and_then(|s| s.comment.as_ref())
                .is_some_and(hidden_by)
    }

    #[must_use]
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    #[must_use]
    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    #[must_use]
    pub fn with_signature(mut self, signature: Signature) -> Self {
        self.signatures.push(signature);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comment = Some(comment);
        self
    }

    #[must_use]
    pub fn with_getter(mut self, signature: Signature) -> Self {
        self.get_signature.push(signature);
        self
    }

    #[must_use]
    pub fn with_type(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn extending(mut self, ty: TypeRef) -> Self {
        self.extended_types.push(ty);
        self
    }

    #[must_use]
    pub fn implementing(mut self, ty: TypeRef) -> Self {
        self.implemented_types.push(ty);
        self
    }

    #[must_use]
    pub fn with_source(mut self, file_name: impl Into<String>, line: u32) -> Self {
        self.sources.push(SourceLocation {
            file_name: file_name.into(),
            line,
            character: 0,
        });
        self
    }

    #[must_use]
    pub fn private(mut self) -> Self {
        self.flags.is_private = true;
        self
    }

    #[must_use]
    pub fn static_member(mut self) -> Self {
        self.flags.is_static = true;
        self
    }
}

/// Closed set of declaration kinds the walker understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Project,
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
    /// Named object literal (`const defaults = { ... }`)
    ObjectLiteral,
}

impl NodeKind {
    /// Map an analyzer kind string onto a kind
    pub fn from_kind_string(kind: &str) -> Option<Self> {
        let kind = match kind {
            "Project" => NodeKind::Project,
            "Module" | "External module" | "Namespace" => NodeKind::Module,
            "Class" => NodeKind::Class,
            "Interface" => NodeKind::Interface,
            "Enumeration" | "Enum" => NodeKind::Enum,
            "Enumeration member" | "Enumeration Member" | "Enum member" => NodeKind::EnumMember,
            "Function" => NodeKind::Function,
            "Variable" => NodeKind::Variable,
            "Property" => NodeKind::Property,
            "Method" => NodeKind::Method,
            "Constructor" => NodeKind::Constructor,
            "Accessor" => NodeKind::Accessor,
            "Type alias" => NodeKind::TypeAlias,
            "Type literal" => NodeKind::TypeLiteral,
            "Object literal" => NodeKind::ObjectLiteral,
            _ => return None,
        };
        Some(kind)
    }

    /// Canonical kind string
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeKind::Project => "Project",
            NodeKind::Module => "Module",
            NodeKind::Class => "Class",
            NodeKind::Interface => "Interface",
            NodeKind::Enum => "Enumeration",
            NodeKind::EnumMember => "Enumeration member",
            NodeKind::Function => "Function",
            NodeKind::Variable => "Variable",
            NodeKind::Property => "Property",
            NodeKind::Method => "Method",
            NodeKind::Constructor => "Constructor",
            NodeKind::Accessor => "Accessor",
            NodeKind::TypeAlias => "Type alias",
            NodeKind::TypeLiteral => "Type literal",
            NodeKind::ObjectLiteral => "Object literal",
        }
    }

    /// Kinds whose signatures produce one record each
    pub fn is_callable(&self) -> bool {
        matches!(
            self,
            NodeKind::Function | NodeKind::Method | NodeKind::Constructor
        )
    }
}

/// TypeDoc writes accessor signatures as a list in older releases and as a
/// single object in newer ones
fn one_or_many<'de, D>(deserializer: D) -> Result<Vec<Signature>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Signature>),
        One(Signature),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::Many(signatures) => signatures,
        OneOrMany::One(signature) => vec![signature],
    })
}

/// Visibility and modifier flags
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Flags {
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_protected: bool,
    #[serde(default)]
    pub is_static: bool,
    #[serde(default)]
    pub is_optional: bool,
    #[serde(default)]
    pub is_exported: bool,
}

/// Documentation comment attached to a node, signature or parameter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(default)]
    pub short_text: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub returns: Option<String>,
    #[serde(default)]
    pub tags: Vec<CommentTag>,
}

impl Comment {
    /// Comment with only a summary line
    pub fn summary(text: impl Into<String>) -> Self {
        Self {
            short_text: Some(text.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>, text: impl Into<String>) -> Self {
        self.tags.push(CommentTag {
            tag: tag.into(),
            text: text.into(),
            param: None,
        });
        self
    }

    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|t| t.tag.eq_ignore_ascii_case(name))
    }

    /// Texts of every tag with the given name, in declaration order
    pub fn tag_texts<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tags
            .iter()
            .filter(move |t| t.tag.eq_ignore_ascii_case(name))
            .map(|t| t.text.trim())
    }
}

/// A block tag such as `@see` or `@param`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommentTag {
    pub tag: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub param: Option<String>,
}

/// One call signature of a function, method or constructor
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signature {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub parameters: Vec<Parameter>,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,
    #[serde(default, alias = "typeParameters")]
    pub type_parameter: Vec<TypeParameter>,
}

impl Signature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    #[must_use]
    pub fn returning(mut self, ty: TypeRef) -> Self {
        self.ty = Some(ty);
        self
    }

    #[must_use]
    pub fn with_comment(mut self, comment: Comment) -> Self {
        self.comment = Some(comment);
        self
    }
}

/// A signature parameter
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    pub name: String,
    #[serde(default, rename = "type")]
    pub ty: Option<TypeRef>,
    #[serde(default)]
    pub comment: Option<Comment>,
    #[serde(default)]
    pub flags: Flags,
    #[serde(default)]
    pub default_value: Option<String>,
}

impl Parameter {
    pub fn new(name: impl Into<String>, ty: TypeRef) -> Self {
        Self {
            name: name.into(),
            ty: Some(ty),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn optional(mut self) -> Self {
        self.flags.is_optional = true;
        self
    }
}

/// A generic type parameter declaration
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TypeParameter {
    pub name: String,
    /// Constraint (`T extends Foo`)
    #[serde(default, rename = "type")]
    pub constraint: Option<TypeRef>,
}

/// Type expression as emitted by the analyzer
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type")]
pub enum TypeRef {
    #[serde(rename = "intrinsic")]
    Intrinsic { name: String },
    #[serde(rename = "reference")]
    Reference {
        name: String,
        #[serde(default)]
        id: Option<NodeId>,
        /// Library the referenced declaration originates from
        #[serde(default)]
        package: Option<String>,
        #[serde(default, rename = "typeArguments")]
        type_arguments: Vec<TypeRef>,
    },
    #[serde(rename = "array")]
    Array {
        #[serde(rename = "elementType")]
        element_type: Box<TypeRef>,
    },
    #[serde(rename = "union")]
    Union { types: Vec<TypeRef> },
    #[serde(rename = "intersection")]
    Intersection { types: Vec<TypeRef> },
    #[serde(rename = "tuple")]
    Tuple {
        #[serde(default)]
        elements: Vec<TypeRef>,
    },
    /// Inline object or function type
    #[serde(rename = "reflection")]
    Reflection {
        #[serde(default)]
        declaration: Option<Box<Node>>,
    },
    #[serde(rename = "stringLiteral")]
    StringLiteral { value: String },
    #[serde(rename = "typeParameter")]
    TypeParameter { name: String },
    #[serde(other)]
    Unknown,
}

impl TypeRef {
    pub fn intrinsic(name: impl Into<String>) -> Self {
        TypeRef::Intrinsic { name: name.into() }
    }

    /// Reference to a declaration in the same reflection tree
    pub fn reference(name: impl Into<String>, id: NodeId) -> Self {
        TypeRef::Reference {
            name: name.into(),
            id: Some(id),
            package: None,
            type_arguments: Vec::new(),
        }
    }

    /// Reference to a declaration from another library
    pub fn external(name: impl Into<String>, package: impl Into<String>) -> Self {
        TypeRef::Reference {
            name: name.into(),
            id: None,
            package: Some(package.into()),
            type_arguments: Vec::new(),
        }
    }
}

/// Declaration site
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub file_name: String,
    #[serde(default)]
    pub line: u32,
    #[serde(default)]
    pub character: u32,
}
