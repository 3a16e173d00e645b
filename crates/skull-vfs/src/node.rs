//! Node structure and per-store payloads.
//!
//! A `Node` is the uniform unit of the filesystem graph. Its behavior
//! is selected by the `Backing` payload, a closed set of backing-store
//! variants: the dispatch layer matches on the variant instead of
//! probing function pointers.

use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;

use crate::types::{NodeId, NodeKind};

/// Initial capacity of a file buffer, in bytes.
pub(crate) const FILE_BUF_INITIAL_CAPACITY: u32 = 256;

/// Entry limit of a minimal fallback directory.
pub(crate) const MINIMAL_DIR_CAPACITY: usize = 10;

/// A node in the filesystem graph.
pub struct Node {
    /// Node name (bounded by `NAME_MAX`)
    pub name: String,
    /// Classification tag, fixed at creation
    pub kind: NodeKind,
    /// Store-local inode number (0 = unassigned)
    pub inode: u32,
    /// Size in bytes; meaningful for files, 0 for directories
    pub length: u32,
    /// Permission mask (stored, never enforced)
    pub mask: u32,
    /// Owning user id (stored, never enforced)
    pub uid: u32,
    /// Owning group id (stored, never enforced)
    pub gid: u32,
    /// Reserved stream offset for sequential access; unused by the
    /// name-based operations
    pub cursor: u32,
    /// Backing-store payload
    pub(crate) backing: Backing,
}

impl Node {
    pub(crate) fn new(name: String, kind: NodeKind, backing: Backing) -> Self {
        Self {
            name,
            kind,
            inode: 0,
            length: 0,
            mask: 0,
            uid: 0,
            gid: 0,
            cursor: 0,
            backing,
        }
    }

    /// True if this node is a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }

    /// True if this node is a regular file.
    pub fn is_file(&self) -> bool {
        self.kind == NodeKind::File
    }
}

/// Backing-store payload, owned by the node.
///
/// Destroying a node frees its payload; the non-owning parent
/// back-reference inside `DirData` is never followed on destruction.
pub(crate) enum Backing {
    /// SkullFS file buffer; `None` until the first write
    SkullFile(Option<FileBuf>),
    /// SkullFS directory listing
    SkullDir(DirData),
    /// Initrd root: the parsed manifest plus the shared blob
    InitrdDir(InitrdDir),
    /// Initrd file: a read-only window into the shared blob
    InitrdFile(InitrdFile),
    /// Built-in fallback directory with fixed capacity
    MinimalDir(MinimalDir),
}

/// Growable file payload for SkullFS.
///
/// `data.len()` is the logical size. Capacity starts at 256 bytes and
/// doubles until it covers the requested size; it never shrinks.
pub(crate) struct FileBuf {
    data: Vec<u8>,
    capacity: u32,
}

impl FileBuf {
    /// Allocate a buffer sized for an initial write of `len` bytes.
    pub(crate) fn for_len(len: u32) -> Self {
        let capacity = if len > 0 {
            len
        } else {
            FILE_BUF_INITIAL_CAPACITY
        };
        Self {
            data: Vec::with_capacity(capacity as usize),
            capacity,
        }
    }

    /// Logical size in bytes.
    pub(crate) fn size(&self) -> u32 {
        self.data.len() as u32
    }

    #[cfg(test)]
    pub(crate) fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Double the capacity until it covers `new_size`.
    fn grow_to(&mut self, new_size: u32) {
        if new_size <= self.capacity {
            return;
        }
        let mut capacity = self.capacity as u64;
        while capacity < new_size as u64 {
            capacity *= 2;
        }
        let capacity = capacity.min(u32::MAX as u64) as u32;
        self.data
            .reserve_exact(capacity as usize - self.data.len());
        self.capacity = capacity;
    }

    /// Copy out up to `buf.len()` bytes starting at `offset`.
    ///
    /// Reads past end-of-buffer return 0; reads that overrun the end
    /// are clamped to the bytes available.
    pub(crate) fn read_at(&self, offset: u32, buf: &mut [u8]) -> u32 {
        let size = self.data.len();
        let offset = offset as usize;
        if offset >= size {
            return 0;
        }
        let n = core::cmp::min(buf.len(), size - offset);
        buf[..n].copy_from_slice(&self.data[offset..offset + n]);
        n as u32
    }

    /// Copy `bytes` in at `offset`, growing the buffer as needed.
    ///
    /// The gap between the old size and `offset` is zero-filled.
    /// Growth happens before any byte is copied, so a caller never
    /// observes a partial mutation. A write whose end does not fit the
    /// 32-bit file size is not performed and reports 0 bytes.
    pub(crate) fn write_at(&mut self, offset: u32, bytes: &[u8]) -> u32 {
        let end = match end_offset(offset, bytes.len()) {
            Some(end) => end as usize,
            None => return 0,
        };
        if end > self.data.len() {
            self.grow_to(end as u32);
            self.data.resize(end, 0);
        }
        self.data[offset as usize..end].copy_from_slice(bytes);
        bytes.len() as u32
    }
}

/// End of a write of `len` bytes at `offset`, or `None` when it does
/// not fit the 32-bit file size.
pub(crate) fn end_offset(offset: u32, len: usize) -> Option<u32> {
    let end = (offset as u64).checked_add(len as u64)?;
    if end > u32::MAX as u64 {
        return None;
    }
    Some(end as u32)
}

/// SkullFS directory listing.
pub(crate) struct DirData {
    /// Owned child edges, newest first (entries are prepended)
    pub(crate) entries: Vec<DirSlot>,
    /// Non-owning back-reference for `".."`; `None` at the root
    pub(crate) parent: Option<NodeId>,
}

pub(crate) struct DirSlot {
    pub(crate) name: String,
    pub(crate) node: NodeId,
}

impl DirData {
    pub(crate) fn new(parent: Option<NodeId>) -> Self {
        Self {
            entries: Vec::new(),
            parent,
        }
    }

    pub(crate) fn find(&self, name: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|slot| slot.name == name)
            .map(|slot| slot.node)
    }

    /// Prepend an entry; fails when the name is already taken.
    pub(crate) fn insert(&mut self, name: String, node: NodeId) -> bool {
        if self.find(&name).is_some() {
            return false;
        }
        self.entries.insert(0, DirSlot { name, node });
        true
    }

    /// Remove an entry by name, returning the child handle.
    pub(crate) fn remove(&mut self, name: &str) -> Option<NodeId> {
        let pos = self.entries.iter().position(|slot| slot.name == name)?;
        Some(self.entries.remove(pos).node)
    }
}

/// One record of the initrd manifest.
#[derive(Clone)]
pub(crate) struct InitrdRecord {
    pub(crate) name: String,
    pub(crate) offset: u32,
    pub(crate) length: u32,
}

/// Initrd root payload: manifest records plus the shared data blob.
pub(crate) struct InitrdDir {
    pub(crate) records: Vec<InitrdRecord>,
    pub(crate) blob: Rc<[u8]>,
}

/// Initrd file payload: a window into the shared blob.
pub(crate) struct InitrdFile {
    pub(crate) blob: Rc<[u8]>,
    pub(crate) offset: u32,
    pub(crate) length: u32,
}

/// Fixed-capacity directory for the built-in fallback tree.
pub(crate) struct MinimalDir {
    pub(crate) entries: Vec<(String, NodeId)>,
}

impl MinimalDir {
    pub(crate) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add an entry; silently ignored once the directory is full.
    pub(crate) fn add(&mut self, name: String, node: NodeId) {
        if self.entries.len() >= MINIMAL_DIR_CAPACITY {
            return;
        }
        self.entries.push((name, node));
    }

    pub(crate) fn find(&self, name: &str) -> Option<NodeId> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, id)| *id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::string::ToString;

    #[test]
    fn file_buf_round_trip() {
        let mut buf = FileBuf::for_len(0);
        assert_eq!(buf.write_at(0, b"hello"), 5);
        assert_eq!(buf.size(), 5);

        let mut out = [0u8; 5];
        assert_eq!(buf.read_at(0, &mut out), 5);
        assert_eq!(&out, b"hello");
    }

    #[test]
    fn file_buf_read_clamps_at_eof() {
        let mut buf = FileBuf::for_len(0);
        buf.write_at(0, b"abc");

        let mut out = [0u8; 8];
        assert_eq!(buf.read_at(1, &mut out), 2);
        assert_eq!(&out[..2], b"bc");
        assert_eq!(buf.read_at(3, &mut out), 0);
        assert_eq!(buf.read_at(100, &mut out), 0);
    }

    #[test]
    fn file_buf_capacity_doubles() {
        let mut buf = FileBuf::for_len(0);
        buf.write_at(0, b"x");
        assert_eq!(buf.capacity(), FILE_BUF_INITIAL_CAPACITY);

        let big = [7u8; 300];
        buf.write_at(0, &big);
        assert_eq!(buf.capacity(), FILE_BUF_INITIAL_CAPACITY * 2);
        assert_eq!(buf.size(), 300);
    }

    #[test]
    fn file_buf_zero_fills_gap() {
        let mut buf = FileBuf::for_len(0);
        buf.write_at(10, b"tail");
        assert_eq!(buf.size(), 14);

        let mut out = [0xffu8; 14];
        assert_eq!(buf.read_at(0, &mut out), 14);
        assert_eq!(&out[..10], &[0u8; 10]);
        assert_eq!(&out[10..], b"tail");
    }

    #[test]
    fn file_buf_rejects_unrepresentable_end() {
        let mut buf = FileBuf::for_len(0);
        buf.write_at(0, b"abc");
        assert_eq!(buf.write_at(u32::MAX, b"x"), 0);
        assert_eq!(buf.write_at(u32::MAX - 1, b"xy"), 0);
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn dir_data_rejects_duplicate_names() {
        let mut dir = DirData::new(None);
        assert!(dir.insert("a".to_string(), NodeId(1)));
        assert!(!dir.insert("a".to_string(), NodeId(2)));
        assert_eq!(dir.find("a"), Some(NodeId(1)));
    }

    #[test]
    fn dir_data_prepends_entries() {
        let mut dir = DirData::new(None);
        dir.insert("first".to_string(), NodeId(1));
        dir.insert("second".to_string(), NodeId(2));
        assert_eq!(dir.entries[0].name, "second");
        assert_eq!(dir.entries[1].name, "first");
    }

    #[test]
    fn minimal_dir_caps_entries() {
        let mut dir = MinimalDir::new();
        for i in 0u32..20 {
            dir.add(alloc::format!("e{}", i), NodeId(i));
        }
        assert_eq!(dir.entries.len(), MINIMAL_DIR_CAPACITY);
    }
}
