//! Declaration syntax rendering
//!
//! Type expressions become [`LinkedText`] so that every named type stays a
//! reference the resolver can map; declaration lines are plain text.

use crate::record::{LinkedText, RawRef, RefTarget};
use crate::reflection::{Node, NodeKind, Signature, TypeParameter, TypeRef};

/// Type parameter names visible at a declaration
#[derive(Debug, Clone, Default)]
pub struct GenericScope {
    names: Vec<String>,
}

impl GenericScope {
    /// Extend the scope with more type parameters
    #[must_use]
    pub fn with(&self, params: &[TypeParameter]) -> Self {
        let mut names = self.names.clone();
        names.extend(params.iter().map(|p| p.name.clone()));
        Self { names }
    }

    fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }
}

/// Render a type expression
pub fn type_text(ty: &TypeRef, generics: &GenericScope) -> LinkedText<RawRef> {
    let mut out = LinkedText::new();
    write_type(&mut out, ty, generics);
    out
}

/// Render an optional type, falling back to `any`
pub fn type_text_or_any(ty: Option<&TypeRef>, generics: &GenericScope) -> LinkedText<RawRef> {
    ty.map_or_else(|| LinkedText::plain("any"), |t| type_text(t, generics))
}

fn write_type(out: &mut LinkedText<RawRef>, ty: &TypeRef, generics: &GenericScope) {
    match ty {
        TypeRef::Intrinsic { name } | TypeRef::TypeParameter { name } => out.push_text(name),
        TypeRef::Reference {
            name,
            id,
            package,
            type_arguments,
        } => {
            if id.is_none() && package.is_none() && generics.contains(name) {
                out.push_text(name);
            } else {
                out.push_ref(RawRef {
                    target: id.map_or_else(|| RefTarget::Name(name.clone()), RefTarget::Id),
                    name: name.clone(),
                    package: package.clone(),
                });
            }
            if !type_arguments.is_empty() {
                out.push_text("<");
                write_list(out, type_arguments, ", ", generics);
                out.push_text(">");
            }
        }
        TypeRef::Array { element_type } => {
            let compound = matches!(
                element_type.as_ref(),
                TypeRef::Union { .. } | TypeRef::Intersection { .. }
            );
            if compound {
                out.push_text("(");
            }
            write_type(out, element_type, generics);
            if compound {
                out.push_text(")");
            }
            out.push_text("[]");
        }
        TypeRef::Union { types } => write_list(out, types, " | ", generics),
        TypeRef::Intersection { types } => write_list(out, types, " & ", generics),
        TypeRef::Tuple { elements } => {
            out.push_text("[");
            write_list(out, elements, ", ", generics);
            out.push_text("]");
        }
        TypeRef::Reflection { declaration } => match declaration.as_deref() {
            Some(decl) => write_inline_declaration(out, decl, generics),
            None => out.push_text("object"),
        },
        TypeRef::StringLiteral { value } => out.push_text(format!("\"{value}\"")),
        TypeRef::Unknown => out.push_text("unknown"),
    }
}

fn write_list(out: &mut LinkedText<RawRef>, types: &[TypeRef], sep: &str, generics: &GenericScope) {
    for (i, ty) in types.iter().enumerate() {
        if i > 0 {
            out.push_text(sep);
        }
        write_type(out, ty, generics);
    }
}

fn write_inline_declaration(out: &mut LinkedText<RawRef>, decl: &Node, generics: &GenericScope) {
    if let Some(signature) = decl.signatures.first() {
        let generics = generics.with(&signature.type_parameter);
        write_parameters(out, signature, &generics);
        out.push_text(" => ");
        out.append(type_text_or_any(signature.ty.as_ref(), &generics));
        return;
    }

    if decl.children.is_empty() {
        out.push_text("{}");
        return;
    }

    out.push_text("{ ");
    for (i, member) in decl.children.iter().enumerate() {
        if i > 0 {
            out.push_text("; ");
        }
        out.push_text(member.name.as_deref().unwrap_or("?"));
        if member.flags.is_optional {
            out.push_text("?");
        }
        out.push_text(": ");
        if member.kind() == Some(NodeKind::Method) {
            if let Some(signature) = member.signatures.first() {
                write_parameters(out, signature, generics);
                out.push_text(" => ");
                out.append(type_text_or_any(signature.ty.as_ref(), generics));
                continue;
            }
        }
        out.append(type_text_or_any(member.declared_type(), generics));
    }
    out.push_text(" }");
}

fn write_parameters(out: &mut LinkedText<RawRef>, signature: &Signature, generics: &GenericScope) {
    out.push_text("(");
    for (i, param) in signature.parameters.iter().enumerate() {
        if i > 0 {
            out.push_text(", ");
        }
        out.push_text(&param.name);
        if param.flags.is_optional {
            out.push_text("?");
        }
        out.push_text(": ");
        out.append(type_text_or_any(param.ty.as_ref(), generics));
    }
    out.push_text(")");
}

fn type_params_suffix(params: &[TypeParameter]) -> String {
    if params.is_empty() {
        return String::new();
    }
    let names: Vec<&str> = params.iter().map(|p| p.name.as_str()).collect();
    format!("<{}>", names.join(", "))
}

/// Declaration line of a callable signature
pub fn signature_content(
    kind: NodeKind,
    name: &str,
    signature: &Signature,
    is_static: bool,
    generics: &GenericScope,
) -> String {
    let mut params = LinkedText::new();
    write_parameters(&mut params, signature, generics);
    let params = params.to_plain();
    let type_params = type_params_suffix(&signature.type_parameter);
    let returns = type_text_or_any(signature.ty.as_ref(), generics).to_plain();
    let prefix = if is_static { "static " } else { "" };

    match kind {
        NodeKind::Constructor => format!("constructor{params}"),
        NodeKind::Function => format!("function {name}{type_params}{params}: {returns}"),
        _ => format!("{prefix}{name}{type_params}{params}: {returns}"),
    }
}

/// Declaration line of a non-callable node
pub fn declaration_content(kind: NodeKind, name: &str, node: &Node, generics: &GenericScope) -> String {
    let type_params = type_params_suffix(&node.type_parameter);
    let declared = || type_text_or_any(node.declared_type(), generics).to_plain();
    let heritage = |keyword: &str, types: &[TypeRef]| {
        if types.is_empty() {
            return String::new();
        }
        let rendered: Vec<String> = types
            .iter()
            .map(|t| type_text(t, generics).to_plain())
            .collect();
        format!(" {keyword} {}", rendered.join(", "))
    };

    match kind {
        NodeKind::Class => format!(
            "class {name}{type_params}{}{}",
            heritage("extends", &node.extended_types),
            heritage("implements", &node.implemented_types)
        ),
        NodeKind::Interface => format!(
            "interface {name}{type_params}{}",
            heritage("extends", &node.extended_types)
        ),
        NodeKind::Enum => format!("enum {name}"),
        NodeKind::EnumMember => match &node.default_value {
            Some(value) => format!("{name} = {value}"),
            None => name.to_string(),
        },
        NodeKind::Module | NodeKind::Project => format!("module {name}"),
        NodeKind::TypeAlias => format!("type {name}{type_params} = {}", declared()),
        NodeKind::Variable => format!("const {name}: {}", declared()),
        NodeKind::ObjectLiteral => format!("const {name} = {{ ... }}"),
        NodeKind::Accessor => {
            let prefix = if node.flags.is_static { "static " } else { "" };
            let access = match (node.get_signature.is_empty(), node.set_signature.is_empty()) {
                (false, true) => "get ",
                (true, false) => "set ",
                _ => "",
            };
            format!("{prefix}{access}{name}: {}", declared())
        }
        NodeKind::Property | NodeKind::TypeLiteral => {
            let prefix = if node.flags.is_static { "static " } else { "" };
            let optional = if node.flags.is_optional { "?" } else { "" };
            format!("{prefix}{name}{optional}: {}", declared())
        }
        NodeKind::Function | NodeKind::Method | NodeKind::Constructor => {
            format!("{name}(): {}", declared())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflection::Parameter;

    fn generics(names: &[&str]) -> GenericScope {
        let params: Vec<TypeParameter> = names
            .iter()
            .map(|n| TypeParameter {
                name: (*n).to_string(),
                constraint: None,
            })
            .collect();
        GenericScope::default().with(&params)
    }

    #[test]
    fn test_reference_with_arguments() {
        let ty = TypeRef::Reference {
            name: "Map".to_string(),
            id: None,
            package: Some("typescript".to_string()),
            type_arguments: vec![TypeRef::intrinsic("string"), TypeRef::reference("Widget", 4)],
        };
        let text = type_text(&ty, &GenericScope::default());
        assert_eq!(text.to_plain(), "Map<string, Widget>");

        let refs: Vec<&RawRef> = text.refs().collect();
        assert_eq!(refs.len(), 2);
        assert_eq!(refs[0].package.as_deref(), Some("typescript"));
        assert_eq!(refs[1].target, RefTarget::Id(4));
    }

    #[test]
    fn test_type_parameter_not_a_reference() {
        let ty = TypeRef::Reference {
            name: "T".to_string(),
            id: None,
            package: None,
            type_arguments: Vec::new(),
        };
        let text = type_text(&ty, &generics(&["T"]));
        assert_eq!(text.refs().count(), 0);
        assert_eq!(text.to_plain(), "T");
    }

    #[test]
    fn test_array_of_union() {
        let ty = TypeRef::Array {
            element_type: Box::new(TypeRef::Union {
                types: vec![TypeRef::intrinsic("string"), TypeRef::intrinsic("number")],
            }),
        };
        assert_eq!(
            type_text(&ty, &GenericScope::default()).to_plain(),
            "(string | number)[]"
        );
    }

    #[test]
    fn test_inline_object_type() {
        let decl = Node::new(10, "__type", NodeKind::TypeLiteral).with_children([
            Node::new(11, "x", NodeKind::Property).with_type(TypeRef::intrinsic("number")),
            Node::new(12, "y", NodeKind::Property).with_type(TypeRef::intrinsic("number")),
        ]);
        let ty = TypeRef::Reflection {
            declaration: Some(Box::new(decl)),
        };
        assert_eq!(
            type_text(&ty, &GenericScope::default()).to_plain(),
            "{ x: number; y: number }"
        );
    }

    #[test]
    fn test_signature_content() {
        let signature = Signature::new("greet")
            .with_parameter(Parameter::new("who", TypeRef::intrinsic("string")))
            .with_parameter(Parameter::new("times", TypeRef::intrinsic("number")).optional())
            .returning(TypeRef::intrinsic("void"));
        let scope = GenericScope::default();

        assert_eq!(
            signature_content(NodeKind::Function, "greet", &signature, false, &scope),
            "function greet(who: string, times?: number): void"
        );
        assert_eq!(
            signature_content(NodeKind::Method, "greet", &signature, true, &scope),
            "static greet(who: string, times?: number): void"
        );
        assert_eq!(
            signature_content(NodeKind::Constructor, "constructor", &signature, false, &scope),
            "constructor(who: string, times?: number)"
        );
    }

    #[test]
    fn test_class_declaration() {
        let node = Node::new(1, "Button", NodeKind::Class)
            .extending(TypeRef::reference("Widget", 2))
            .implementing(TypeRef::reference("Clickable", 3));
        assert_eq!(
            declaration_content(NodeKind::Class, "Button", &node, &GenericScope::default()),
            "class Button extends Widget implements Clickable"
        );
    }

    #[test]
    fn test_accessor_and_object_literal_declarations() {
        let radius = Node::new(1, "radius", NodeKind::Accessor)
            .with_getter(Signature::new("__get").returning(TypeRef::intrinsic("number")));
        assert_eq!(
            declaration_content(NodeKind::Accessor, "radius", &radius, &GenericScope::default()),
            "get radius: number"
        );

        let defaults = Node::new(2, "defaults", NodeKind::ObjectLiteral);
        assert_eq!(
            declaration_content(NodeKind::ObjectLiteral, "defaults", &defaults, &GenericScope::default()),
            "const defaults = { ... }"
        );
    }
}
