//! SkullFS - the writable in-memory filesystem.
//!
//! The only backing store that can create files and directories at
//! runtime. Directory listings are name-unique collections of owned
//! child handles, newest first; each directory keeps a non-owning
//! back-reference to its parent to answer `".."`. File payloads grow
//! by capacity doubling and are allocated lazily on the first write.

use alloc::string::{String, ToString};

use crate::error::FsError;
use crate::node::{self, Backing, DirData, FileBuf, Node};
use crate::types::{DirEntry, NodeId, NodeKind, NAME_MAX};
use crate::vfs::Vfs;

/// Check a candidate entry name: non-empty, within `NAME_MAX`, no
/// separator.
fn validate_name(name: &str) -> Result<(), FsError> {
    if name.is_empty() || name.len() > NAME_MAX || name.contains('/') {
        return Err(FsError::InvalidName);
    }
    Ok(())
}

/// Access the SkullFS listing of a directory node, or `ReadOnly` when
/// the directory belongs to another store.
fn skull_dir(node: &Node) -> Result<&DirData, FsError> {
    match &node.backing {
        Backing::SkullDir(dir) => Ok(dir),
        _ => Err(FsError::ReadOnly),
    }
}

impl Vfs {
    /// Mount a fresh SkullFS: a root directory (its own parent for
    /// `".."` purposes) holding the default `dev`, `proc` and `tmp`
    /// directories.
    pub fn mount_skullfs() -> Result<Vfs, FsError> {
        let root_node = Node::new(
            String::from("/"),
            NodeKind::Directory,
            Backing::SkullDir(DirData::new(None)),
        );
        let mut vfs = Vfs::new_with(root_node);

        let inode = vfs.take_skull_inode();
        if let Some(root) = vfs.node_mut(vfs.root()) {
            root.inode = inode;
        }

        let root = vfs.root();
        vfs.create_dir(root, "dev")?;
        vfs.create_dir(root, "proc")?;
        vfs.create_dir(root, "tmp")?;
        Ok(vfs)
    }

    /// Create a file under `parent`.
    ///
    /// The file starts at length 0 with no payload; the buffer is
    /// allocated on the first write. The new entry is prepended to the
    /// parent's listing.
    pub fn create_file(&mut self, parent: NodeId, name: &str) -> Result<NodeId, FsError> {
        validate_name(name)?;
        let parent_node = self.require_dir(parent)?;
        skull_dir(parent_node)?;
        if finddir_at(self, parent, name).is_some() {
            return Err(FsError::AlreadyExists);
        }

        let mut node = Node::new(
            name.to_string(),
            NodeKind::File,
            Backing::SkullFile(None),
        );
        node.inode = self.take_skull_inode();
        let id = self.alloc(node);

        self.link(parent, name, id)?;
        Ok(id)
    }

    /// Create a directory under `parent`, recording `parent` as the
    /// new directory's non-owning back-reference.
    pub fn create_dir(&mut self, parent: NodeId, name: &str) -> Result<NodeId, FsError> {
        validate_name(name)?;
        let parent_node = self.require_dir(parent)?;
        skull_dir(parent_node)?;
        if finddir_at(self, parent, name).is_some() {
            return Err(FsError::AlreadyExists);
        }

        let mut node = Node::new(
            name.to_string(),
            NodeKind::Directory,
            Backing::SkullDir(DirData::new(Some(parent))),
        );
        node.inode = self.take_skull_inode();
        let id = self.alloc(node);

        self.link(parent, name, id)?;
        Ok(id)
    }

    /// Delete the entry `name` inside `parent`.
    ///
    /// The virtual `"."`/`".."` names never resolve here: only real
    /// entries can be deleted. A directory must be empty of real
    /// entries; there is no recursive delete. On success the entry is
    /// unlinked and the node freed together with its owned payload.
    pub fn delete(&mut self, parent: NodeId, name: &str) -> Result<(), FsError> {
        let parent_node = self.require_dir(parent)?;
        let dir = skull_dir(parent_node)?;
        let target = dir.find(name).ok_or(FsError::NotFound)?;

        if let Some(node) = self.node(target) {
            if let Backing::SkullDir(target_dir) = &node.backing {
                if !target_dir.entries.is_empty() {
                    return Err(FsError::DirectoryNotEmpty);
                }
            }
        }

        if let Some(parent_node) = self.node_mut(parent) {
            if let Backing::SkullDir(dir) = &mut parent_node.backing {
                dir.remove(name);
            }
        }
        self.free(target);
        Ok(())
    }

    /// Insert an owned child edge, rolling the node back on a
    /// duplicate (the existence check above makes that unreachable in
    /// a single-threaded context, but the edit stays atomic).
    fn link(&mut self, parent: NodeId, name: &str, child: NodeId) -> Result<(), FsError> {
        let inserted = match self.node_mut(parent) {
            Some(parent_node) => match &mut parent_node.backing {
                Backing::SkullDir(dir) => dir.insert(name.to_string(), child),
                _ => false,
            },
            None => false,
        };
        if !inserted {
            self.free(child);
            return Err(FsError::AlreadyExists);
        }
        Ok(())
    }
}

/// Write through a SkullFS file node, allocating the payload on first
/// use and keeping `length` equal to the buffer size.
///
/// A write whose end does not fit the 32-bit file size reports 0 bytes
/// and leaves the node untouched.
pub(crate) fn write_node(node: &mut Node, offset: u32, bytes: &[u8]) -> u32 {
    let end = match node::end_offset(offset, bytes.len()) {
        Some(end) => end,
        None => return 0,
    };
    let data = match &mut node.backing {
        Backing::SkullFile(slot) => slot.get_or_insert_with(|| FileBuf::for_len(end)),
        _ => return 0,
    };
    let written = data.write_at(offset, bytes);
    node.length = data.size();
    written
}

/// `readdir` for a SkullFS directory: `"."`, `".."`, then the stored
/// entries in insertion order (newest first).
pub(crate) fn readdir_at(vfs: &Vfs, id: NodeId, index: u32) -> Option<DirEntry> {
    let node = vfs.node(id)?;
    let dir = match &node.backing {
        Backing::SkullDir(dir) => dir,
        _ => return None,
    };

    if index == 0 {
        return Some(DirEntry {
            name: String::from("."),
            inode: node.inode,
        });
    }
    if index == 1 {
        let inode = dir
            .parent
            .and_then(|p| vfs.node(p))
            .map(|p| p.inode)
            .unwrap_or(node.inode);
        return Some(DirEntry {
            name: String::from(".."),
            inode,
        });
    }

    let slot = dir.entries.get(index as usize - 2)?;
    let inode = vfs.node(slot.node).map(|n| n.inode).unwrap_or(0);
    Some(DirEntry {
        name: slot.name.clone(),
        inode,
    })
}

/// `finddir` for a SkullFS directory: `"."` and `".."` resolve before
/// the entry scan; the root's `".."` aliases the root.
pub(crate) fn finddir_at(vfs: &Vfs, id: NodeId, name: &str) -> Option<NodeId> {
    let node = vfs.node(id)?;
    let dir = match &node.backing {
        Backing::SkullDir(dir) => dir,
        _ => return None,
    };

    if name == "." {
        return Some(id);
    }
    if name == ".." {
        return Some(dir.parent.unwrap_or(id));
    }
    dir.find(name)
}

#[cfg(test)]
#[path = "skullfs_tests.rs"]
mod skullfs_tests;
