//! Built-in fallback tree.
//!
//! A fixed-capacity directory store used only when neither the initrd
//! nor SkullFS could be mounted at boot. The tree is `/` containing
//! `dev` and `proc`, nothing can be created or deleted, and `".."`
//! aliases the directory itself.

use alloc::string::String;

use crate::node::{Backing, MinimalDir, Node};
use crate::types::{DirEntry, NodeId, NodeKind};
use crate::vfs::Vfs;

impl Vfs {
    /// Mount the built-in fallback tree.
    pub fn mount_minimal() -> Vfs {
        let root_node = Node::new(
            String::from("/"),
            NodeKind::Directory,
            Backing::MinimalDir(MinimalDir::new()),
        );
        let mut vfs = Vfs::new_with(root_node);
        let root = vfs.root();

        let dev = vfs.alloc(Node::new(
            String::from("dev"),
            NodeKind::Directory,
            Backing::MinimalDir(MinimalDir::new()),
        ));
        let proc = vfs.alloc(Node::new(
            String::from("proc"),
            NodeKind::Directory,
            Backing::MinimalDir(MinimalDir::new()),
        ));

        if let Some(node) = vfs.node_mut(root) {
            if let Backing::MinimalDir(dir) = &mut node.backing {
                dir.add(String::from("dev"), dev);
                dir.add(String::from("proc"), proc);
            }
        }
        vfs
    }
}

/// `readdir` for a minimal directory: `"."`, `".."`, then the fixed
/// entries in insertion order.
pub(crate) fn readdir_at(vfs: &Vfs, id: NodeId, index: u32) -> Option<DirEntry> {
    let node = vfs.node(id)?;
    let dir = match &node.backing {
        Backing::MinimalDir(dir) => dir,
        _ => return None,
    };

    if index == 0 {
        return Some(DirEntry {
            name: String::from("."),
            inode: node.inode,
        });
    }
    if index == 1 {
        return Some(DirEntry {
            name: String::from(".."),
            inode: node.inode,
        });
    }

    let (name, child) = dir.entries.get(index as usize - 2)?;
    let inode = vfs.node(*child).map(|n| n.inode).unwrap_or(0);
    Some(DirEntry {
        name: name.clone(),
        inode,
    })
}

/// `finddir` for a minimal directory; `"."` and `".."` both resolve to
/// the directory itself.
pub(crate) fn finddir_at(vfs: &mut Vfs, id: NodeId, name: &str) -> Option<NodeId> {
    let node = vfs.node(id)?;
    let dir = match &node.backing {
        Backing::MinimalDir(dir) => dir,
        _ => return None,
    };

    if name == "." || name == ".." {
        return Some(id);
    }
    dir.find(name)
}
