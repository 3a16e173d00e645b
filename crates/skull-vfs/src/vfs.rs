//! The filesystem context: node arena, root registry, and the
//! dispatch layer.
//!
//! `Vfs` owns every node in a single arena keyed by `NodeId`. The four
//! dispatch entry points (`read`, `write`, `readdir`, `finddir`) are
//! thin forwards to the node's backing store; invoking an operation a
//! store does not implement is not an error and yields the neutral
//! result (0 bytes transferred, or `None`).
//!
//! The context is built once by a mount constructor (see `bootstrap`)
//! and its root is never reassigned. Mutation goes through `&mut self`,
//! so the single-threaded, non-reentrant model of the kernel is
//! enforced by the borrow checker instead of a lock.

use alloc::collections::BTreeMap;

use crate::error::FsError;
use crate::node::{Backing, Node};
use crate::types::{DirEntry, NodeId};
use crate::{initrd, minimal, skullfs};

/// Backing store selector used to end an arena borrow before
/// delegating to a store that needs `&mut Vfs`.
enum Store {
    Skull,
    Initrd,
    Minimal,
    None,
}

/// The filesystem context.
pub struct Vfs {
    /// Node arena; parent-to-child edges own their target through the
    /// entry collections stored in here
    nodes: BTreeMap<NodeId, Node>,
    /// Next arena handle
    next_id: u32,
    /// Next SkullFS inode number (store-local, 0 = unassigned)
    next_skull_inode: u32,
    /// The mounted root; set once at construction
    root: NodeId,
}

impl Vfs {
    /// Build a context around the given root node.
    pub(crate) fn new_with(root_node: Node) -> Self {
        let mut vfs = Self {
            nodes: BTreeMap::new(),
            next_id: 0,
            next_skull_inode: 1,
            root: NodeId(0),
        };
        vfs.root = vfs.alloc(root_node);
        vfs
    }

    /// The mounted root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Look up a node by handle.
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Place a node in the arena.
    pub(crate) fn alloc(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, node);
        id
    }

    /// Drop a node and its owned payload. The payload's non-owning
    /// parent back-reference is not followed.
    pub(crate) fn free(&mut self, id: NodeId) {
        self.nodes.remove(&id);
    }

    pub(crate) fn take_skull_inode(&mut self) -> u32 {
        let inode = self.next_skull_inode;
        self.next_skull_inode += 1;
        inode
    }

    // ========== Dispatch layer ==========

    /// Read up to `buf.len()` bytes at `offset`.
    ///
    /// Returns the byte count the backing store reports; a short count
    /// signals end-of-data, never an error. Nodes without read
    /// behavior yield 0.
    pub fn read(&self, id: NodeId, offset: u32, buf: &mut [u8]) -> u32 {
        let node = match self.nodes.get(&id) {
            Some(node) => node,
            None => return 0,
        };
        match &node.backing {
            Backing::SkullFile(Some(data)) => data.read_at(offset, buf),
            Backing::InitrdFile(file) => file.read_at(offset, buf),
            _ => 0,
        }
    }

    /// Write `bytes` at `offset`.
    ///
    /// Nodes without write behavior yield 0; this is how every
    /// read-only store rejects mutation.
    pub fn write(&mut self, id: NodeId, offset: u32, bytes: &[u8]) -> u32 {
        let node = match self.nodes.get_mut(&id) {
            Some(node) => node,
            None => return 0,
        };
        if matches!(node.backing, Backing::SkullFile(_)) {
            skullfs::write_node(node, offset, bytes)
        } else {
            0
        }
    }

    /// List the directory entry at `index`.
    ///
    /// Valid only for directories; indices 0 and 1 are `"."` and
    /// `".."` in stores that implement them. Iteration is dense and
    /// ends at the first `None`. Every call returns a freshly
    /// constructed entry.
    pub fn readdir(&self, id: NodeId, index: u32) -> Option<DirEntry> {
        let node = self.nodes.get(&id)?;
        if !node.is_directory() {
            return None;
        }
        match &node.backing {
            Backing::SkullDir(_) => skullfs::readdir_at(self, id, index),
            Backing::InitrdDir(_) => initrd::readdir_at(self, id, index),
            Backing::MinimalDir(_) => minimal::readdir_at(self, id, index),
            _ => None,
        }
    }

    /// Find a child of a directory by exact, case-sensitive name.
    ///
    /// Takes `&mut self` because the initrd store synthesizes file
    /// nodes on demand.
    pub fn finddir(&mut self, id: NodeId, name: &str) -> Option<NodeId> {
        let node = self.nodes.get(&id)?;
        if !node.is_directory() {
            return None;
        }
        let store = match &node.backing {
            Backing::SkullDir(_) => Store::Skull,
            Backing::InitrdDir(_) => Store::Initrd,
            Backing::MinimalDir(_) => Store::Minimal,
            _ => Store::None,
        };
        match store {
            Store::Skull => skullfs::finddir_at(self, id, name),
            Store::Initrd => initrd::finddir_at(self, id, name),
            Store::Minimal => minimal::finddir_at(self, id, name),
            Store::None => None,
        }
    }

    /// Open hook. No current store installs open behavior.
    pub fn open(&mut self, _id: NodeId) {}

    /// Close hook. No current store installs close behavior.
    pub fn close(&mut self, _id: NodeId) {}

    /// Kind-checked access to a directory node, shared by the
    /// structural operations.
    pub(crate) fn require_dir(&self, id: NodeId) -> Result<&Node, FsError> {
        let node = self.nodes.get(&id).ok_or(FsError::NotFound)?;
        if !node.is_directory() {
            return Err(FsError::NotADirectory);
        }
        Ok(node)
    }
}

#[cfg(test)]
#[path = "vfs_tests.rs"]
mod vfs_tests;
