//! Directory lister: enumerate, resolve, filter and sort nodes.

use std::cmp::Reverse;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use plume_core::{
    Destination, GitContext, IconTable, ListContext, ListError, ListOptions, ListWarning, Node,
    NodeSpec, NodeType, TableRow, WarningKind,
};

use crate::git::git_context;

/// Lists one directory into sorted, filtered nodes.
pub struct Lister {
    options: ListOptions,
    specs: Vec<Arc<NodeSpec>>,
    icons: IconTable,
    git: Option<GitContext>,
}

impl Lister {
    /// Create a lister with no specs and built-in icons.
    pub fn new(options: ListOptions) -> Self {
        Self {
            options,
            specs: Vec::new(),
            icons: IconTable::builtin(),
            git: None,
        }
    }

    /// Specs to match against every node, highest precedence first.
    pub fn with_specs(mut self, specs: Vec<Arc<NodeSpec>>) -> Self {
        self.specs = specs;
        self
    }

    pub fn with_icons(mut self, icons: IconTable) -> Self {
        self.icons = icons;
        self
    }

    /// Use a fixed git state instead of querying the repository.
    pub fn with_git(mut self, git: GitContext) -> Self {
        self.git = Some(git);
        self
    }

    /// List the contents of `dir`.
    ///
    /// Fails only if `dir` itself is unusable. Problems with individual
    /// entries end up as node state and warnings.
    pub fn list(&self, dir: &Path) -> Result<Listing, ListError> {
        let root = dir.canonicalize().map_err(|e| ListError::io(dir, e))?;
        if !root.is_dir() {
            return Err(ListError::NotADirectory { path: root });
        }

        let git = match &self.git {
            Some(git) => git.clone(),
            None => git_context(&root),
        };
        let ctx = Arc::new(
            ListContext::new(self.options.clone())
                .with_icons(self.icons.clone())
                .with_git(git),
        );

        let mut warnings = Vec::new();
        let mut nodes = self.collect_nodes(&root, &ctx, &mut warnings)?;
        let total = nodes.len();

        filter_nodes(&mut nodes, &self.options);
        sort_nodes(&mut nodes, &self.options);
        debug!(
            root = %root.display(),
            total,
            shown = nodes.len(),
            warnings = warnings.len(),
            "listed directory"
        );

        Ok(Listing {
            root,
            hidden: total - nodes.len(),
            nodes,
            warnings,
            context: ctx,
        })
    }

    fn collect_nodes(
        &self,
        root: &Path,
        ctx: &Arc<ListContext>,
        warnings: &mut Vec<ListWarning>,
    ) -> Result<Vec<Node>, ListError> {
        let entries = fs::read_dir(root).map_err(|e| ListError::io(root, e))?;

        let mut nodes = Vec::new();
        for entry_result in entries {
            let entry = match entry_result {
                Ok(e) => e,
                Err(err) => {
                    warnings.push(ListWarning::read_error(root, &err));
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            let mut node = Node::new(name, entry.path(), Arc::clone(ctx));
            node.match_specs(&self.specs);

            if let Some(warning) = warning_for(&node) {
                warnings.push(warning);
            }
            nodes.push(node);
        }
        Ok(nodes)
    }
}

/// Anomaly worth reporting for a node, if any. Forces classification.
fn warning_for(node: &Node) -> Option<ListWarning> {
    if !node.exists() {
        return Some(ListWarning::new(
            node.path(),
            "Entry vanished before it could be stated",
            WarningKind::MetadataError,
        ));
    }
    match node.dest() {
        Some(Destination::Loop(target)) => Some(ListWarning::symlink_loop(node.path(), target)),
        Some(Destination::Node(dest)) if !dest.exists() => {
            Some(ListWarning::broken_symlink(node.path(), dest.name()))
        }
        _ => None,
    }
}

/// Drop nodes that should not be shown.
pub fn filter_nodes(nodes: &mut Vec<Node>, options: &ListOptions) {
    nodes.retain(|node| {
        if !node.is_visible() {
            return false;
        }
        let is_dir = node.node_type() == NodeType::Dir;
        !((options.no_dirs && is_dir) || (options.no_files && !is_dir))
    });
}

/// Stable sort by the configured field, then group directories first.
pub fn sort_nodes(nodes: &mut [Node], options: &ListOptions) {
    let field = options.sort.field;
    if options.sort.reverse {
        nodes.sort_by_cached_key(|node| Reverse(node.sort_key(field)));
    } else {
        nodes.sort_by_cached_key(|node| node.sort_key(field));
    }
    if options.dirs_first {
        nodes.sort_by_key(|node| !node.is_dir());
    }
}

/// Result of listing one directory.
#[derive(Debug)]
pub struct Listing {
    /// Canonical path of the listed directory.
    pub root: PathBuf,
    /// Visible nodes in display order.
    pub nodes: Vec<Node>,
    /// Number of entries filtered out.
    pub hidden: usize,
    /// Non-fatal problems found while listing.
    pub warnings: Vec<ListWarning>,
    context: Arc<ListContext>,
}

impl Listing {
    pub fn options(&self) -> &ListOptions {
        &self.context.options
    }

    pub fn is_git_managed(&self) -> bool {
        self.context.git.is_managed()
    }

    /// Table rows of the nodes that produce one.
    pub fn rows(&self) -> impl Iterator<Item = &TableRow> {
        self.nodes.iter().filter_map(Node::table_row)
    }

    /// Column keys for the table, in order.
    pub fn columns(&self) -> Vec<&'static str> {
        self.options().columns()
    }

    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
