//! Refdoc Core - documentation model for TypeScript API reflection trees
//!
//! This crate turns a TypeDoc reflection tree into cross-referenced
//! documentation units:
//! - Walker: uid assignment and entity records
//! - Resolver: cross-reference resolution against the uid table
//! - Flatten: page-sized output units and orphan grouping
//! - TOC: navigation tree mirroring the declaration nesting
//! - Package: per-package indexes
//!
//! The crate performs no I/O; reading the reflection JSON and writing the
//! rendered output is left to the caller.

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Reflection tree - the analyzer's view of the documented sources
pub mod reflection;

/// Entity records and cross-reference representations
pub mod record;

/// Transformation settings
pub mod config;

/// Diagnostics collected during a run
pub mod diagnostics;

/// Sibling ordering rules
pub mod ordering;

/// Documentation comment parsing
pub mod comment;

/// Declaration syntax rendering
pub mod syntax;

/// Uid assignment table
pub mod uid;

/// Tree walker - reflection tree to entity records
pub mod walker;

/// Reference resolver
pub mod resolver;

/// Page flattening
pub mod flatten;

/// Navigation tree
pub mod toc;

/// Package indexes
pub mod package;

mod pipeline;

pub use config::{Config, RepositoryContext};
pub use diagnostics::{Diagnostic, Diagnostics, Severity, TransformError};
pub use flatten::{Flattened, Page, PageMap};
pub use package::{IndexEntry, PackageIndex};
pub use pipeline::{transform, TransformOutput};
pub use record::{EntityKind, EntityRecord, LinkedText, RawRef, ResolvedRef};
pub use reflection::{Node, NodeKind};
pub use toc::TocNode;
