//! Diagnostics collected while transforming
//!
//! Faults never abort the run. Each is recorded against the root it
//! occurred in and reported once the pipeline has finished.

use std::fmt;

use thiserror::Error;

use crate::reflection::NodeId;
use crate::record::RefField;

/// A fault found while transforming one root
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransformError {
    #[error("unresolved reference `{name}` in {field} of `{owner}`")]
    UnresolvedReference {
        owner: String,
        field: RefField,
        name: String,
    },

    #[error("duplicate uid `{uid}`")]
    DuplicateUid { uid: String },

    #[error("malformed node{}: missing {field}", display_id(.id))]
    MalformedNode { id: Option<NodeId>, field: &'static str },

    #[error("unsupported node kind `{kind}` for `{name}`")]
    UnsupportedKind { name: String, kind: String },
}

fn display_id(id: &Option<NodeId>) -> String {
    id.map(|id| format!(" #{id}")).unwrap_or_default()
}

impl TransformError {
    pub fn severity(&self) -> Severity {
        match self {
            TransformError::UnresolvedReference { .. } | TransformError::UnsupportedKind { .. } => {
                Severity::Warning
            }
            TransformError::DuplicateUid { .. } | TransformError::MalformedNode { .. } => {
                Severity::Error
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A recorded fault
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Uid (or name) of the root being processed
    pub root: Option<String>,
    pub error: TransformError,
}

impl Diagnostic {
    pub fn new(root: Option<String>, error: TransformError) -> Self {
        Self { root, error }
    }

    pub fn severity(&self) -> Severity {
        self.error.severity()
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            Some(root) => write!(f, "{}: [{}] {}", self.severity(), root, self.error),
            None => write!(f, "{}: {}", self.severity(), self.error),
        }
    }
}

/// Ordered collection of diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, root: Option<&str>, error: TransformError) {
        self.entries
            .push(Diagnostic::new(root.map(str::to_string), error));
    }

    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|d| d.severity() == severity)
            .count()
    }

    pub fn has_errors(&self) -> bool {
        self.count(Severity::Error) > 0
    }

    /// Diagnostics matching a predicate on the error
    pub fn matching(&self, pred: impl Fn(&TransformError) -> bool) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| pred(&d.error)).collect()
    }
}

impl IntoIterator for Diagnostics {
    type Item = Diagnostic;
    type IntoIter = std::vec::IntoIter<Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
