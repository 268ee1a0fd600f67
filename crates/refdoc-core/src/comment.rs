//! Documentation comment extraction
//!
//! Splits an analyzer comment into summary, remarks, tag sections and inline
//! links. Link targets are kept as unresolved name references.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::record::{LinkedText, RawRef};
use crate::reflection::Comment;

/// Parsed documentation of one declaration
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocParts {
    pub summary: LinkedText<RawRef>,
    pub remarks: LinkedText<RawRef>,
    /// Parameter name -> description
    pub params: BTreeMap<String, LinkedText<RawRef>>,
    pub returns: LinkedText<RawRef>,
    pub see_also: Vec<RawRef>,
    pub examples: Vec<String>,
    pub deprecated: Option<String>,
}

impl DocParts {
    /// Parse a comment; `None` yields empty parts
    pub fn parse(comment: Option<&Comment>) -> Self {
        let mut doc = DocParts::default();
        let Some(comment) = comment else {
            return doc;
        };

        if let Some(short) = comment.short_text.as_deref() {
            doc.summary = parse_links(short.trim());
        }
        if let Some(text) = comment.text.as_deref() {
            doc.remarks = parse_links(text.trim());
        }
        if let Some(returns) = comment.returns.as_deref() {
            doc.returns = parse_links(returns.trim());
        }

        for tag in &comment.tags {
            let text = tag.text.trim();
            match tag.tag.to_lowercase().as_str() {
                "param" => {
                    if let Some((name, desc)) = param_tag(tag.param.as_deref(), text) {
                        doc.params.insert(name, parse_links(desc));
                    }
                }
                "returns" | "return" => {
                    if doc.returns.is_empty() {
                        doc.returns = parse_links(text);
                    }
                }
                "see" => {
                    if let Some(target) = see_target(text) {
                        doc.see_also.push(target);
                    }
                }
                "example" => doc.examples.push(text.to_string()),
                "deprecated" => doc.deprecated = Some(text.to_string()),
                _ => {}
            }
        }

        doc
    }

    /// Fill gaps from a fallback comment (node comment behind a signature comment)
    #[must_use]
    pub fn or_else(mut self, fallback: DocParts) -> Self {
        if self.summary.is_empty() {
            self.summary = fallback.summary;
        }
        if self.remarks.is_empty() {
            self.remarks = fallback.remarks;
        }
        if self.returns.is_empty() {
            self.returns = fallback.returns;
        }
        for (name, desc) in fallback.params {
            self.params.entry(name).or_insert(desc);
        }
        if self.see_also.is_empty() {
            self.see_also = fallback.see_also;
        }
        if self.examples.is_empty() {
            self.examples = fallback.examples;
        }
        if self.deprecated.is_none() {
            self.deprecated = fallback.deprecated;
        }
        self
    }
}

fn link_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            Regex::new(r"\{@link(?:code|plain)?\s+([^}\s|]+)(?:\s*\|\s*|\s+)?([^}]*)\}|\[\[([^\]|]+)(?:\|([^\]]*))?\]\]").ok()
        })
        .as_ref()
}

/// Turn `{@link Target}`, `{@link Target | text}` and `[[Target]]` into references
pub fn parse_links(text: &str) -> LinkedText<RawRef> {
    let Some(pattern) = link_pattern() else {
        return LinkedText::plain(text);
    };
    let mut linked = LinkedText::new();
    let mut last = 0;

    for caps in pattern.captures_iter(text) {
        let Some(whole) = caps.get(0) else {
            continue;
        };
        linked.push_text(&text[last..whole.start()]);

        let (target, label) = match (caps.get(1), caps.get(3)) {
            (Some(target), _) => (target.as_str(), caps.get(2)),
            (None, Some(target)) => (target.as_str(), caps.get(4)),
            (None, None) => continue,
        };
        let target = target.trim();
        let label = label
            .map(|m| m.as_str().trim())
            .filter(|l| !l.is_empty())
            .unwrap_or(target);

        linked.push_ref(RawRef {
            target: crate::record::RefTarget::Name(target.to_string()),
            name: label.to_string(),
            package: None,
        });
        last = whole.end();
    }

    linked.push_text(&text[last..]);
    linked
}

fn param_tag<'a>(param: Option<&'a str>, text: &'a str) -> Option<(String, &'a str)> {
    if let Some(name) = param {
        return Some((name.to_string(), text));
    }
    // "name description" when the analyzer did not split the tag
    let mut parts = text.splitn(2, char::is_whitespace);
    let name = parts.next().filter(|n| !n.is_empty())?;
    Some((name.to_string(), parts.next().unwrap_or("").trim()))
}

fn see_target(text: &str) -> Option<RawRef> {
    let linked = parse_links(text);
    if let Some(first) = linked.refs().next() {
        return Some(first.clone());
    }
    let name = text.split_whitespace().next()?;
    Some(RawRef::name(name))
}
