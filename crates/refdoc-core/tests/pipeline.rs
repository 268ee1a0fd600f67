//! Integration tests for the full transformation pipeline

use std::collections::BTreeSet;

use refdoc_core::{
    transform, Config, EntityKind, Node, ResolvedRef, Severity, TransformError, TransformOutput,
};
use serde_json::json;

fn parse(value: serde_json::Value) -> Node {
    serde_json::from_value(value).unwrap()
}

fn method(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "kindString": "Method",
        "signatures": [{ "name": name, "type": { "type": "intrinsic", "name": "void" } }]
    })
}

fn function(id: u64, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "kindString": "Function",
        "signatures": [{ "name": name, "type": { "type": "intrinsic", "name": "void" } }]
    })
}

fn sample_project() -> Node {
    parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "A",
                "kindString": "Class",
                "children": [method(2, "m2"), method(3, "m1")]
            },
            function(4, "f2"),
            function(5, "f1")
        ]
    }))
}

fn page_uids(output: &TransformOutput) -> Vec<&str> {
    output.pages.iter().map(|p| p.uid.as_str()).collect()
}

#[test]
fn test_class_and_orphans_alphabetical() {
    let output = transform(&sample_project(), &Config::default());

    assert_eq!(page_uids(&output), vec!["A", "P"]);
    assert_eq!(output.pages[0].member_uids(), vec!["A.m1", "A.m2"]);
    assert_eq!(output.pages[1].member_uids(), vec!["f1", "f2"]);
    assert_eq!(output.pages[1].primary.kind, EntityKind::Package);

    assert_eq!(output.toc.name, "P");
    assert_eq!(output.toc.child_names(), vec!["A", "P"]);

    assert_eq!(output.packages.len(), 1);
    assert_eq!(output.packages[0].package, "P");
    assert_eq!(output.packages[0].member_uids(), vec!["A", "P"]);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_source_order() {
    let config = Config::default().with_alphabetical_order(false);
    let output = transform(&sample_project(), &config);

    assert_eq!(page_uids(&output), vec!["A", "P"]);
    assert_eq!(output.pages[0].member_uids(), vec!["A.m2", "A.m1"]);
    assert_eq!(output.pages[1].member_uids(), vec!["f2", "f1"]);
    // the index ignores the ordering setting
    assert_eq!(output.packages[0].member_uids(), vec!["A", "P"]);
}

#[test]
fn test_page_uids_are_unique() {
    let project = parse(json!({
        "id": 0,
        "name": "lib",
        "kindString": "Project",
        "children": [
            { "id": 1, "name": "Widget", "kindString": "Class" },
            { "id": 2, "name": "Gadget", "kindString": "Interface" },
            { "id": 3, "name": "Color", "kindString": "Enumeration", "children": [
                { "id": 4, "name": "Red", "kindString": "Enumeration member", "defaultValue": "0" }
            ]},
            function(5, "make"),
            { "id": 6, "name": "VERSION", "kindString": "Variable", "type": { "type": "intrinsic", "name": "string" } },
            { "id": 7, "name": "Handler", "kindString": "Type alias", "type": { "type": "intrinsic", "name": "Function" } }
        ]
    }));
    let output = transform(&project, &Config::default());

    let uids: BTreeSet<&str> = output.pages.iter().map(|p| p.uid.as_str()).collect();
    assert_eq!(uids.len(), output.pages.len());
    assert_eq!(page_uids(&output), vec!["Color", "Gadget", "lib", "Widget"]);
    assert_eq!(output.pages[2].member_uids(), vec!["Handler", "make", "VERSION"]);
}

#[test]
fn test_constructor_never_a_page() {
    let project = parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [{
            "id": 1,
            "name": "Widget",
            "kindString": "Class",
            "children": [{
                "id": 2,
                "name": "constructor",
                "kindString": "Constructor",
                "signatures": [{
                    "name": "new Widget",
                    "parameters": [{ "name": "id", "type": { "type": "intrinsic", "name": "string" } }],
                    "type": { "type": "reference", "name": "Widget", "id": 1 }
                }]
            }]
        }]
    }));
    let output = transform(&project, &Config::default());

    assert_eq!(page_uids(&output), vec!["Widget"]);
    let constructor = &output.pages[0].members[0];
    assert_eq!(constructor.kind, EntityKind::Constructor);
    assert_eq!(
        constructor.syntax.as_ref().unwrap().content,
        "constructor(id: string)"
    );
}

#[test]
fn test_transform_is_idempotent() {
    let project = sample_project();
    let config = Config::default();
    assert_eq!(transform(&project, &config), transform(&project, &config));
}

#[test]
fn test_references_resolve_three_ways() {
    let project = parse(json!({
        "id": 0,
        "name": "ui",
        "kindString": "Project",
        "children": [
            { "id": 1, "name": "Widget", "kindString": "Class" },
            {
                "id": 2,
                "name": "Button",
                "kindString": "Class",
                "comment": { "shortText": "A clickable {@link Widget}. See {@link Nowhere}." },
                "extendedTypes": [{ "type": "reference", "name": "Widget", "id": 1 }],
                "implementedTypes": [{ "type": "reference", "name": "EventTarget", "package": "typescript" }]
            }
        ]
    }));
    let config = Config::default().with_external_link("typescript", "https://ts.dev/api");
    let output = transform(&project, &config);

    let button = &output.pages[0].primary;
    assert_eq!(button.uid, "Button");
    assert_eq!(
        button.extends,
        vec![ResolvedRef::Resolved {
            uid: "Widget".to_string(),
            name: "Widget".to_string()
        }]
    );
    assert_eq!(
        button.implements,
        vec![ResolvedRef::External {
            name: "EventTarget".to_string(),
            href: "https://ts.dev/api/EventTarget".to_string()
        }]
    );
    let summary: Vec<&ResolvedRef> = button.summary.refs().collect();
    assert_eq!(summary[0].uid(), Some("Widget"));
    assert!(summary[1].is_unresolved());

    let unresolved = output
        .diagnostics
        .matching(|e| matches!(e, TransformError::UnresolvedReference { .. }));
    assert_eq!(unresolved.len(), 1);
    assert_eq!(output.diagnostics.count(Severity::Error), 0);

    for page in &output.pages {
        for reference in &page.references {
            if let Some(uid) = reference.uid() {
                assert!(output.pages.iter().any(|p| p.uid == uid || p.member_uids().contains(&uid)));
            }
        }
    }
}

#[test]
fn test_faulty_roots_do_not_abort_the_run() {
    let project = parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            { "id": 1, "name": "A", "kindString": "Class" },
            { "id": 2, "name": "A", "kindString": "Interface" },
            { "name": "Broken", "kindString": "Class" },
            { "id": 4, "name": "Odd", "kindString": "Call signature" },
            { "id": 5, "name": "B", "kindString": "Class" }
        ]
    }));
    let output = transform(&project, &Config::default());

    assert_eq!(page_uids(&output), vec!["A", "B"]);
    assert_eq!(output.diagnostics.count(Severity::Error), 2);
    assert_eq!(output.diagnostics.count(Severity::Warning), 1);
    assert!(output
        .diagnostics
        .iter()
        .any(|d| d.error == TransformError::DuplicateUid { uid: "A".to_string() }));
}

#[test]
fn test_module_grouping() {
    let project = parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "\"geometry\"",
                "kindString": "External module",
                "comment": { "shortText": "Shapes and measures." },
                "children": [
                    { "id": 2, "name": "Circle", "kindString": "Class" },
                    function(3, "area")
                ]
            },
            function(4, "main")
        ]
    }));

    let flat = transform(&project, &Config::default());
    assert_eq!(page_uids(&flat), vec!["Circle", "P"]);
    assert_eq!(flat.pages[1].member_uids(), vec!["area", "main"]);

    let grouped = transform(&project, &Config::default().with_module_grouping(true));
    assert_eq!(page_uids(&grouped), vec!["geometry.Circle", "geometry", "P"]);
    let geometry = &grouped.pages[1];
    assert_eq!(geometry.primary.summary.to_plain(), "Shapes and measures.");
    assert_eq!(geometry.member_uids(), vec!["geometry.area"]);

    assert_eq!(grouped.toc.child_names(), vec!["geometry", "P"]);
    assert_eq!(grouped.toc.children[0].child_names(), vec!["Circle"]);

    let packages: Vec<&str> = grouped.packages.iter().map(|p| p.package.as_str()).collect();
    assert_eq!(packages, vec!["geometry", "P"]);
}

#[test]
fn test_hidden_declarations_are_excluded() {
    let project = parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "A",
                "kindString": "Class",
                "children": [
                    method(2, "shown"),
                    { "id": 3, "name": "secret", "kindString": "Property", "flags": { "isPrivate": true } }
                ]
            },
            {
                "id": 4,
                "name": "helper",
                "kindString": "Function",
                "signatures": [{ "name": "helper", "comment": { "tags": [{ "tag": "internal", "text": "" }] } }]
            }
        ]
    }));
    let output = transform(&project, &Config::default());

    assert_eq!(page_uids(&output), vec!["A"]);
    assert_eq!(output.pages[0].member_uids(), vec!["A.shown"]);
}

/// Every resolved uid in the output must name a page or a page member
fn assert_resolved_uids_are_published(output: &TransformOutput) {
    let published = |uid: &str| output.pages.iter().any(|p| p.holds(uid));
    for page in &output.pages {
        for record in std::iter::once(&page.primary).chain(&page.members) {
            for uid in record.own_refs().into_iter().filter_map(ResolvedRef::uid) {
                assert!(published(uid), "{} links to {uid}, which is on no page", record.uid);
            }
        }
        for uid in page.references.iter().filter_map(ResolvedRef::uid) {
            assert!(published(uid), "page {} lists {uid}, which is on no page", page.uid);
        }
    }
}

fn linking_class(id: u64, name: &str, text: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "kindString": "Class", "comment": { "shortText": text } })
}

fn module_only_classes() -> Node {
    parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "\"geometry\"",
                "kindString": "External module",
                "comment": { "shortText": "Shapes." },
                "children": [{ "id": 2, "name": "Circle", "kindString": "Class" }]
            },
            linking_class(3, "Doc", "See {@link geometry}.")
        ]
    }))
}

fn object_literal() -> Node {
    parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "defaults",
                "kindString": "Object literal",
                "children": [
                    { "id": 2, "name": "size", "kindString": "Variable", "type": { "type": "intrinsic", "name": "number" } }
                ]
            },
            {
                "id": 3,
                "name": "options",
                "kindString": "Variable",
                "children": [{
                    "id": 4,
                    "name": "__type",
                    "kindString": "Type literal",
                    "children": [
                        { "id": 5, "name": "verbose", "kindString": "Property", "type": { "type": "intrinsic", "name": "boolean" } }
                    ]
                }]
            },
            linking_class(6, "Doc", "Start from {@link defaults} and tune {@link size} or {@link verbose}.")
        ]
    }))
}

fn overloaded_method() -> Node {
    parse(json!({
        "id": 0,
        "name": "P",
        "kindString": "Project",
        "children": [
            {
                "id": 1,
                "name": "A",
                "kindString": "Class",
                "children": [{
                    "id": 2,
                    "name": "render",
                    "kindString": "Method",
                    "signatures": [
                        { "name": "render", "type": { "type": "intrinsic", "name": "void" } },
                        {
                            "name": "render",
                            "parameters": [{ "name": "into", "type": { "type": "reference", "name": "B", "id": 3 } }],
                            "type": { "type": "intrinsic", "name": "void" }
                        }
                    ]
                }]
            },
            linking_class(3, "B", "Uses {@link render}.")
        ]
    }))
}

#[test]
fn test_module_link_lands_on_module_page() {
    let output = transform(&module_only_classes(), &Config::default().with_module_grouping(true));

    assert_eq!(page_uids(&output), vec!["Doc", "geometry.Circle", "geometry"]);
    let geometry = &output.pages[2];
    assert!(geometry.members.is_empty());
    assert_eq!(geometry.primary.summary.to_plain(), "Shapes.");

    let doc = &output.pages[0].primary;
    let target: Vec<Option<&str>> = doc.summary.refs().map(ResolvedRef::uid).collect();
    assert_eq!(target, vec![Some("geometry")]);
    assert_eq!(output.toc.children[1].href.as_deref(), Some("geometry.yml"));
}

#[test]
fn test_object_literal_members_are_published() {
    let output = transform(&object_literal(), &Config::default());

    assert_eq!(page_uids(&output), vec!["Doc", "P"]);
    let package = &output.pages[1];
    assert_eq!(
        package.member_uids(),
        vec![
            "defaults",
            "defaults.size",
            "options",
            "options.__anonymous_0",
            "options.__anonymous_0.verbose",
        ]
    );
    assert_eq!(package.members[0].name, "defaults");

    let doc = &output.pages[0].primary;
    let targets: Vec<Option<&str>> = doc.summary.refs().map(ResolvedRef::uid).collect();
    assert_eq!(
        targets,
        vec![
            Some("defaults"),
            Some("defaults.size"),
            Some("options.__anonymous_0.verbose"),
        ]
    );
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_overloaded_target_resolves_by_name() {
    let output = transform(&overloaded_method(), &Config::default());

    assert_eq!(output.pages[0].member_uids(), vec!["A.render", "A.render_1"]);
    let b = &output.pages[1].primary;
    let targets: Vec<Option<&str>> = b.summary.refs().map(ResolvedRef::uid).collect();
    assert_eq!(targets, vec![Some("A.render")]);
    assert!(output.diagnostics.is_empty());
}

#[test]
fn test_resolved_uids_are_always_published() {
    let grouped = Config::default().with_module_grouping(true);
    let cases = [
        (sample_project(), Config::default()),
        (module_only_classes(), grouped.clone()),
        (module_only_classes(), Config::default()),
        (object_literal(), Config::default()),
        (object_literal(), grouped),
        (overloaded_method(), Config::default().with_alphabetical_order(false)),
    ];
    for (project, config) in &cases {
        assert_resolved_uids_are_published(&transform(project, config));
    }
}
