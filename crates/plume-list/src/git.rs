//! Git status retrieval for the listing root.

use std::path::Path;

use plume_core::GitContext;

#[cfg(feature = "git")]
mod imp {
    use std::collections::HashMap;
    use std::path::{Path, PathBuf};

    use compact_str::CompactString;
    use git2::{Repository, Status, StatusOptions};
    use tracing::debug;

    use plume_core::GitContext;

    pub fn git_context(dir: &Path) -> GitContext {
        let repo = match Repository::discover(dir) {
            Ok(repo) => repo,
            Err(err) => {
                debug!(dir = %dir.display(), error = %err, "not inside a git repository");
                return GitContext::unmanaged();
            }
        };
        let Some(workdir) = repo.workdir() else {
            debug!(dir = %dir.display(), "bare repository, ignoring git status");
            return GitContext::unmanaged();
        };
        let root = workdir.canonicalize().unwrap_or_else(|_| workdir.to_path_buf());

        let mut options = StatusOptions::new();
        options
            .include_untracked(true)
            .include_ignored(true)
            .recurse_untracked_dirs(false)
            .recurse_ignored_dirs(false);

        let statuses = match repo.statuses(Some(&mut options)) {
            Ok(statuses) => statuses,
            Err(err) => {
                debug!(root = %root.display(), error = %err, "could not read git status");
                return GitContext::managed(root, HashMap::new());
            }
        };

        let mut map = HashMap::new();
        for entry in statuses.iter() {
            let Some(path) = entry.path() else {
                continue;
            };
            if let Some(code) = status_code(entry.status()) {
                map.insert(PathBuf::from(path), code);
            }
        }
        debug!(root = %root.display(), entries = map.len(), "read git status");
        GitContext::managed(root, map)
    }

    /// Porcelain-style two-character code for a status, or `None` when clean.
    pub fn status_code(status: Status) -> Option<CompactString> {
        if status.is_empty() {
            return None;
        }
        if status.contains(Status::IGNORED) {
            return Some("!!".into());
        }
        if status.contains(Status::CONFLICTED) {
            return Some("UU".into());
        }
        if status.contains(Status::WT_NEW) && !status.intersects(index_flags()) {
            return Some("??".into());
        }

        let index = if status.contains(Status::INDEX_NEW) {
            'A'
        } else if status.contains(Status::INDEX_MODIFIED) {
            'M'
        } else if status.contains(Status::INDEX_DELETED) {
            'D'
        } else if status.contains(Status::INDEX_RENAMED) {
            'R'
        } else if status.contains(Status::INDEX_TYPECHANGE) {
            'T'
        } else {
            ' '
        };
        let worktree = if status.contains(Status::WT_MODIFIED) {
            'M'
        } else if status.contains(Status::WT_DELETED) {
            'D'
        } else if status.contains(Status::WT_RENAMED) {
            'R'
        } else if status.contains(Status::WT_TYPECHANGE) {
            'T'
        } else {
            ' '
        };

        let mut code = CompactString::default();
        code.push(index);
        code.push(worktree);
        Some(code)
    }

    fn index_flags() -> Status {
        Status::INDEX_NEW
            | Status::INDEX_MODIFIED
            | Status::INDEX_DELETED
            | Status::INDEX_RENAMED
            | Status::INDEX_TYPECHANGE
    }

}

/// Git state for a listing of `dir`. Unmanaged outside a work tree.
#[cfg(feature = "git")]
pub fn git_context(dir: &Path) -> GitContext {
    imp::git_context(dir)
}

/// Git support is compiled out; every directory is unmanaged.
#[cfg(not(feature = "git"))]
pub fn git_context(_dir: &Path) -> GitContext {
    GitContext::unmanaged()
}
