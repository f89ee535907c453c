//! Git state shared by every node of a listing.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use compact_str::CompactString;

/// Status code of a clean or untracked-clean path.
pub const CLEAN_STATUS: &str = "  ";

/// Git state of the listing root, supplied once per listing.
#[derive(Debug, Clone, Default)]
pub struct GitContext {
    root: Option<PathBuf>,
    statuses: HashMap<PathBuf, CompactString>,
}

impl GitContext {
    /// Context for a directory outside version control.
    pub fn unmanaged() -> Self {
        Self::default()
    }

    /// Context for a repository work tree, with statuses keyed by path relative to `root`.
    pub fn managed(root: impl Into<PathBuf>, statuses: HashMap<PathBuf, CompactString>) -> Self {
        Self {
            root: Some(root.into()),
            statuses,
        }
    }

    pub fn is_managed(&self) -> bool {
        self.root.is_some()
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    /// Path relative to the work tree root, if `path` lies inside it.
    pub fn relative<'p>(&self, path: &'p Path) -> Option<&'p Path> {
        let root = self.root.as_deref()?;
        path.strip_prefix(root).ok()
    }

    /// Two-character status of a root-relative path.
    pub fn status_of(&self, relative: &Path) -> &str {
        self.statuses
            .get(relative)
            .map(|status| status.as_str())
            .unwrap_or(CLEAN_STATUS)
    }
}

/// Colour a two-character status: index column green, work-tree column red.
pub fn formatted_status(status: &str) -> String {
    match status {
        "??" | "!!" => format!("[dim]{status}[/]"),
        _ => {
            let mut chars = status.chars();
            let index = chars.next().unwrap_or(' ');
            let worktree = chars.next().unwrap_or(' ');
            format!("{}{}", colored(index, "green"), colored(worktree, "red"))
        }
    }
}

fn colored(code: char, color: &str) -> String {
    if code == ' ' {
        code.to_string()
    } else {
        format!("[{color}]{code}[/]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unmanaged_context() {
        let git = GitContext::unmanaged();
        assert!(!git.is_managed());
        assert!(git.relative(Path::new("/repo/file")).is_none());
    }

    #[test]
    fn test_status_lookup() {
        let statuses = HashMap::from([(PathBuf::from("src/main.rs"), CompactString::new(" M"))]);
        let git = GitContext::managed("/repo", statuses);

        let relative = git.relative(Path::new("/repo/src/main.rs")).unwrap();
        assert_eq!(git.status_of(relative), " M");
        assert_eq!(git.status_of(Path::new("README.md")), CLEAN_STATUS);
        assert!(git.relative(Path::new("/elsewhere/file")).is_none());
    }

    #[test]
    fn test_formatted_status() {
        assert_eq!(formatted_status("  "), "  ");
        assert_eq!(formatted_status("M "), "[green]M[/] ");
        assert_eq!(formatted_status("AM"), "[green]A[/][red]M[/]");
        assert_eq!(formatted_status("??"), "[dim]??[/]");
    }
}
