//! Directory listing pipeline for plume.
//!
//! This crate drives `plume-core`: it enumerates a directory, builds a
//! [`Node`] per entry, matches specs, then filters and sorts the result.
//! It also owns the collaborators the core only consumes as data:
//!
//! - **Spec files** discovered in the listed directory and its ancestors
//! - **Git status** of the enclosing work tree (feature `git`)
//!
//! # Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use plume_list::{ListOptions, Lister, load_specs};
//!
//! let dir = Path::new(".");
//! let options = ListOptions::default();
//! let specs = load_specs(dir, options.depth).unwrap();
//!
//! let listing = Lister::new(options).with_specs(specs).list(dir).unwrap();
//! for row in listing.rows() {
//!     println!("{}", row["name"]);
//! }
//! ```

mod git;
mod lister;
mod specs;

pub use git::git_context;
pub use lister::{Lister, Listing, filter_nodes, sort_nodes};
pub use specs::{
    SpecError, builtin_specs, discover_spec_files, load_specs, parse_specs, read_spec_file,
    user_spec_file,
};

// Re-export core types for convenience
pub use plume_core::{
    DEFAULT_TIME_FMT, DetailColumn, DetailSet, GitContext, IconStyle, IconTable, ListError,
    ListOptions, ListWarning, Node, NodeSpec, NodeType, SPEC_FILE_NAME, SortField, SortKey,
    TableRow, UnitSystem, WarningKind,
};
