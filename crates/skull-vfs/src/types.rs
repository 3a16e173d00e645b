//! Core storage types
//!
//! This module contains the fundamental types used throughout the
//! storage layer:
//! - Node handles and classification tags
//! - Directory entries returned by `readdir`
//! - Name limits shared with the initrd image format

use alloc::string::String;
use serde::{Deserialize, Serialize};

/// Maximum length of a node name, in bytes.
pub const NAME_MAX: usize = 127;

/// Handle to a node in the filesystem arena.
///
/// Handles are stable for the lifetime of the node. Parent-to-child
/// edges inside a directory own the child; the child-to-parent
/// back-reference is a plain handle and owns nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(pub u32);

/// Node classification.
///
/// Exactly one kind per node, fixed at creation. Only `File` and
/// `Directory` have behavior today; the device, pipe, symlink and
/// mountpoint tags are stored but have none.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Regular file
    File,
    /// Directory
    Directory,
    /// Character device
    CharDevice,
    /// Block device
    BlockDevice,
    /// Pipe
    Pipe,
    /// Symbolic link (no traversal)
    Symlink,
    /// Mountpoint (no indirection)
    Mountpoint,
}

/// A directory entry returned by `readdir`.
///
/// A fresh value is constructed per call; callers may hold any number
/// of entries at once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirEntry {
    /// Entry name (not a full path)
    pub name: String,
    /// Inode of the named node within its backing store (0 = unassigned)
    pub inode: u32,
}
