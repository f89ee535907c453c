//! Core types for plume.
//!
//! This crate turns a directory entry into a fully resolved [`Node`]:
//!
//! - **Type classification** via ordered predicates ([`NodeType`])
//! - **Symlink resolution** one hop at a time, with loop detection ([`Destination`])
//! - **Spec matching** against user-defined presentation rules ([`NodeSpec`])
//! - **Derived views** such as visibility, sort keys and table rows
//!
//! Everything a node needs beyond its own path lives in a shared, read-only
//! [`ListContext`].
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use plume_core::{ListContext, ListOptions, Node, NodeSpec, SortField, SpecPattern};
//!
//! let ctx = Arc::new(ListContext::new(ListOptions::default()));
//! let rust = NodeSpec::new(SpecPattern::Extension("rs".into())).with_icon("rust");
//! let specs = vec![Arc::new(rust)];
//!
//! let mut node = Node::new("main.rs", "/project/src/main.rs", ctx);
//! node.match_specs(&specs);
//!
//! if node.is_visible() {
//!     println!("{} {:?}", node.formatted_name(), node.sort_key(SortField::Name));
//! }
//! ```

mod config;
mod context;
mod error;
mod git;
mod icons;
mod markup;
mod node;
mod node_type;
mod spec;
pub mod stats;
mod symlink;

pub use config::{
    DEFAULT_TIME_FMT, DetailColumn, DetailSet, IconStyle, ListOptions, ListOptionsBuilder,
    SortField, SortKey, UnitSystem,
};
pub use context::ListContext;
pub use error::{ListError, ListWarning, WarningKind};
pub use git::{CLEAN_STATUS, GitContext, formatted_status};
pub use icons::IconTable;
pub use markup::escape_markup;
pub use node::{Node, SortValue, TableRow};
pub use node_type::NodeType;
pub use spec::{
    HIDDEN_IMPORTANCE, IMPORTANCE_RANGE, MatchedSpecs, NodeSpec, SPEC_FILE_NAME, SpecAttr,
    SpecPattern, SpecValue,
};
pub use symlink::{Destination, resolve as resolve_symlink};
