//! Classification of file system entries into a closed set of kinds.

use std::fs::{self, FileType};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::FileTypeExt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Type of file system node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    File,
    Dir,
    Symlink,
    Fifo,
    Socket,
    BlockDevice,
    CharDevice,
    Unknown,
}

type Predicate = fn(&FileType) -> bool;

/// Ordered type tests. Symlinks must be tested before directories and files.
const TYPE_TESTS: &[(NodeType, Predicate)] = &[
    (NodeType::Symlink, is_symlink),
    (NodeType::Dir, is_dir),
    (NodeType::File, is_file),
    (NodeType::Fifo, is_fifo),
    (NodeType::Socket, is_socket),
    (NodeType::BlockDevice, is_block_device),
    (NodeType::CharDevice, is_char_device),
];

impl NodeType {
    /// Classify the entry at `path` without following symlinks.
    ///
    /// Returns [`NodeType::Unknown`] when the path cannot be stated.
    pub fn classify(path: &Path) -> Self {
        match fs::symlink_metadata(path) {
            Ok(metadata) => Self::from_file_type(&metadata.file_type()),
            Err(_) => NodeType::Unknown,
        }
    }

    /// Classify an already-obtained (non-following) file type.
    pub fn from_file_type(file_type: &FileType) -> Self {
        TYPE_TESTS
            .iter()
            .find(|(_, test)| test(file_type))
            .map(|(node_type, _)| *node_type)
            .unwrap_or(NodeType::Unknown)
    }

    /// Single character used in the `type` column.
    pub fn type_char(self) -> char {
        match self {
            NodeType::File => '-',
            NodeType::Dir => 'd',
            NodeType::Symlink => 'l',
            NodeType::Fifo => 'p',
            NodeType::Socket => 's',
            NodeType::BlockDevice => 'b',
            NodeType::CharDevice => 'c',
            NodeType::Unknown => '?',
        }
    }
}

fn is_symlink(file_type: &FileType) -> bool {
    file_type.is_symlink()
}

fn is_dir(file_type: &FileType) -> bool {
    file_type.is_dir()
}

fn is_file(file_type: &FileType) -> bool {
    file_type.is_file()
}

// Special files only exist on unix.

#[cfg(unix)]
fn is_fifo(file_type: &FileType) -> bool {
    file_type.is_fifo()
}

#[cfg(not(unix))]
fn is_fifo(_file_type: &FileType) -> bool {
    false
}

#[cfg(unix)]
fn is_socket(file_type: &FileType) -> bool {
    file_type.is_socket()
}

#[cfg(not(unix))]
fn is_socket(_file_type: &FileType) -> bool {
    false
}

#[cfg(unix)]
fn is_block_device(file_type: &FileType) -> bool {
    file_type.is_block_device()
}

#[cfg(not(unix))]
fn is_block_device(_file_type: &FileType) -> bool {
    false
}

#[cfg(unix)]
fn is_char_device(file_type: &FileType) -> bool {
    file_type.is_char_device()
}

#[cfg(not(unix))]
fn is_char_device(_file_type: &FileType) -> bool {
    false
}
