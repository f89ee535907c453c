//! One-hop symlink resolution with cycle detection.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace};

use crate::context::ListContext;
use crate::node::Node;

/// Where a symlink points.
#[derive(Debug)]
pub enum Destination {
    /// Node for the next hop. May not exist (broken link).
    Node(Box<Node>),
    /// Raw one-hop target of a link that loops back onto itself.
    Loop(String),
}

impl Destination {
    pub fn is_loop(&self) -> bool {
        matches!(self, Destination::Loop(_))
    }

    pub fn node(&self) -> Option<&Node> {
        match self {
            Destination::Node(node) => Some(node),
            Destination::Loop(_) => None,
        }
    }

    /// The raw link target as read from the file system.
    pub fn target(&self) -> &str {
        match self {
            Destination::Node(node) => node.name(),
            Destination::Loop(target) => target,
        }
    }
}

/// Resolve one hop of the symlink at `link_path`.
///
/// The returned node is constructed but not classified, so the next hop is
/// only resolved when somebody asks for it.
pub fn resolve(link_path: &Path, ctx: &Arc<ListContext>) -> io::Result<Destination> {
    let target = fs::read_link(link_path)?;
    let raw = target.to_string_lossy().into_owned();

    if is_cycle(link_path) {
        debug!(path = %link_path.display(), target = %raw, "symlink loop detected");
        return Ok(Destination::Loop(raw));
    }

    let dest_path = absolute_target(link_path, &target);
    trace!(path = %link_path.display(), dest = %dest_path.display(), "resolved symlink hop");
    Ok(Destination::Node(Box::new(Node::new(
        raw,
        dest_path,
        Arc::clone(ctx),
    ))))
}

/// Relative targets are relative to the directory holding the link.
fn absolute_target(link_path: &Path, target: &Path) -> PathBuf {
    if target.is_absolute() {
        return target.to_path_buf();
    }
    match link_path.parent() {
        Some(parent) => parent.join(target),
        None => target.to_path_buf(),
    }
}

/// Full canonicalization fails with `ELOOP` for cyclic chains and for chains
/// longer than the platform hop limit. Any other failure (such as a missing
/// target) is not a cycle.
fn is_cycle(link_path: &Path) -> bool {
    match fs::canonicalize(link_path) {
        Ok(_) => false,
        Err(err) => is_loop_error(&err),
    }
}

#[cfg(unix)]
fn is_loop_error(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ELOOP)
}

#[cfg(not(unix))]
fn is_loop_error(err: &io::Error) -> bool {
    // ERROR_CANT_RESOLVE_FILENAME
    err.raw_os_error() == Some(1921)
}
