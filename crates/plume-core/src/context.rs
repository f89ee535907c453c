//! Read-only state shared by every node of one listing.

use crate::config::ListOptions;
use crate::git::GitContext;
use crate::icons::IconTable;

/// Options, icon tables and git state for one listing.
///
/// Built once per invocation and never mutated while nodes are alive.
#[derive(Debug, Clone, Default)]
pub struct ListContext {
    pub options: ListOptions,
    pub icons: IconTable,
    pub git: GitContext,
}

impl ListContext {
    /// Context with built-in icons and no git state.
    pub fn new(options: ListOptions) -> Self {
        Self {
            options,
            icons: IconTable::builtin(),
            git: GitContext::unmanaged(),
        }
    }

    pub fn with_icons(mut self, icons: IconTable) -> Self {
        self.icons = icons;
        self
    }

    pub fn with_git(mut self, git: GitContext) -> Self {
        self.git = git;
        self
    }
}
