//! Initrd - the read-only boot ramdisk.
//!
//! An initrd image is a flat manifest blob produced at build time by
//! `mkinitrd`: a magic-tagged header, a packed record table, then the
//! raw file data. The store keeps only the parsed record table and a
//! shared handle to the blob; file nodes are synthesized on demand by
//! `finddir`, each wrapping a read-only window into the blob. There is
//! no write, create or delete - mutation is rejected by the dispatch
//! layer's absent-capability rule, not by this store.
//!
//! # Image layout
//!
//! All integers little-endian, no padding:
//!
//! ```text
//! magic      8 bytes   "INITRD\0\0" (first 6 compared)
//! count      u32       number of records
//! records    count * { name: 64 bytes NUL-padded, offset: u32, length: u32 }
//! data       raw file contents; offsets are absolute from blob start
//! ```

use alloc::rc::Rc;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

use crate::error::FsError;
use crate::node::{Backing, InitrdDir, InitrdFile, InitrdRecord, Node};
use crate::types::{DirEntry, NodeId, NodeKind};
use crate::vfs::Vfs;

/// Image magic, including the two padding NULs.
pub const INITRD_MAGIC: [u8; 8] = *b"INITRD\0\0";

/// Bytes of magic actually compared when validating an image.
pub const INITRD_MAGIC_CHECKED: usize = 6;

/// Header size: magic plus record count.
pub const INITRD_HEADER_LEN: usize = 12;

/// Size of the name field inside a record.
pub const INITRD_NAME_LEN: usize = 64;

/// Size of one packed record.
pub const INITRD_RECORD_LEN: usize = INITRD_NAME_LEN + 8;

fn read_u32(bytes: &[u8]) -> u32 {
    let mut raw = [0u8; 4];
    raw.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(raw)
}

/// Parse and validate the manifest of an initrd image.
fn parse_records(blob: &[u8]) -> Result<Vec<InitrdRecord>, FsError> {
    if blob.len() < INITRD_HEADER_LEN {
        return Err(FsError::BadImage);
    }
    if blob[..INITRD_MAGIC_CHECKED] != INITRD_MAGIC[..INITRD_MAGIC_CHECKED] {
        return Err(FsError::BadImage);
    }

    let count = read_u32(&blob[8..12]) as usize;
    let table_end = count
        .checked_mul(INITRD_RECORD_LEN)
        .and_then(|len| len.checked_add(INITRD_HEADER_LEN))
        .ok_or(FsError::BadImage)?;
    if table_end > blob.len() {
        return Err(FsError::BadImage);
    }

    let mut records = Vec::with_capacity(count);
    for i in 0..count {
        let raw = &blob[INITRD_HEADER_LEN + i * INITRD_RECORD_LEN..];
        let name_field = &raw[..INITRD_NAME_LEN];
        let name_len = name_field
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(INITRD_NAME_LEN);
        let name = core::str::from_utf8(&name_field[..name_len])
            .map_err(|_| FsError::BadImage)?
            .to_string();

        let offset = read_u32(&raw[INITRD_NAME_LEN..]);
        let length = read_u32(&raw[INITRD_NAME_LEN + 4..]);
        // u64 arithmetic: offset + length must not wrap on 32-bit.
        if offset as u64 + length as u64 > blob.len() as u64 {
            return Err(FsError::BadImage);
        }

        records.push(InitrdRecord {
            name,
            offset,
            length,
        });
    }
    Ok(records)
}

impl Vfs {
    /// Mount an initrd image as the filesystem root.
    ///
    /// The blob is copied once into shared storage; every synthesized
    /// file node reads through the same copy.
    pub fn mount_initrd(blob: &[u8]) -> Result<Vfs, FsError> {
        let records = parse_records(blob)?;
        let blob: Rc<[u8]> = Rc::from(blob);
        let root = Node::new(
            String::from("initrd"),
            NodeKind::Directory,
            Backing::InitrdDir(InitrdDir { records, blob }),
        );
        Ok(Vfs::new_with(root))
    }
}

impl InitrdFile {
    /// Copy out up to `buf.len()` bytes at `offset` within the file,
    /// clamped to the record length.
    pub(crate) fn read_at(&self, offset: u32, buf: &mut [u8]) -> u32 {
        if offset >= self.length {
            return 0;
        }
        let n = core::cmp::min(buf.len() as u32, self.length - offset) as usize;
        let start = (self.offset + offset) as usize;
        buf[..n].copy_from_slice(&self.blob[start..start + n]);
        n as u32
    }
}

/// `readdir` for the initrd root: the i-th record's name, straight
/// from the manifest. The store implements no `"."`/`".."` entries.
pub(crate) fn readdir_at(vfs: &Vfs, id: NodeId, index: u32) -> Option<DirEntry> {
    let node = vfs.node(id)?;
    let dir = match &node.backing {
        Backing::InitrdDir(dir) => dir,
        _ => return None,
    };
    let record = dir.records.get(index as usize)?;
    Some(DirEntry {
        name: record.name.clone(),
        inode: index + 1,
    })
}

/// `finddir` for the initrd root: linear scan of the manifest; a hit
/// synthesizes a fresh file node over the record's slice of the blob.
/// Synthesized nodes are owned by the caller that looked them up and
/// have no destroy path - the blob behind them is shared and
/// immutable.
pub(crate) fn finddir_at(vfs: &mut Vfs, id: NodeId, name: &str) -> Option<NodeId> {
    let (record, blob, index) = {
        let node = vfs.node(id)?;
        let dir = match &node.backing {
            Backing::InitrdDir(dir) => dir,
            _ => return None,
        };
        let index = dir.records.iter().position(|r| r.name == name)?;
        (dir.records[index].clone(), dir.blob.clone(), index)
    };

    let mut node = Node::new(
        record.name,
        NodeKind::File,
        Backing::InitrdFile(InitrdFile {
            blob,
            offset: record.offset,
            length: record.length,
        }),
    );
    node.inode = index as u32 + 1;
    node.length = record.length;
    Some(vfs.alloc(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a well-formed image from (name, contents) pairs, the same
    /// layout mkinitrd produces.
    fn build_image(files: &[(&str, &[u8])]) -> Vec<u8> {
        let mut image = Vec::new();
        image.extend_from_slice(&INITRD_MAGIC);
        image.extend_from_slice(&(files.len() as u32).to_le_bytes());

        let mut offset = INITRD_HEADER_LEN + files.len() * INITRD_RECORD_LEN;
        for (name, contents) in files {
            let mut field = [0u8; INITRD_NAME_LEN];
            field[..name.len()].copy_from_slice(name.as_bytes());
            image.extend_from_slice(&field);
            image.extend_from_slice(&(offset as u32).to_le_bytes());
            image.extend_from_slice(&(contents.len() as u32).to_le_bytes());
            offset += contents.len();
        }
        for (_, contents) in files {
            image.extend_from_slice(contents);
        }
        image
    }

    #[test]
    fn mounts_and_lists_manifest_order() {
        let image = build_image(&[("boot.cfg", b"splash=1"), ("motd", b"hi")]);
        let vfs = Vfs::mount_initrd(&image).unwrap();
        let root = vfs.root();

        assert_eq!(vfs.readdir(root, 0).unwrap().name, "boot.cfg");
        assert_eq!(vfs.readdir(root, 1).unwrap().name, "motd");
        assert!(vfs.readdir(root, 2).is_none());
    }

    #[test]
    fn finddir_synthesizes_independent_nodes() {
        let image = build_image(&[("motd", b"hello")]);
        let mut vfs = Vfs::mount_initrd(&image).unwrap();
        let root = vfs.root();

        let a = vfs.finddir(root, "motd").unwrap();
        let b = vfs.finddir(root, "motd").unwrap();
        assert_ne!(a, b);

        let node = vfs.node(a).unwrap();
        assert!(node.is_file());
        assert_eq!(node.length, 5);
        assert_eq!(node.inode, 1);
    }

    #[test]
    fn read_clamps_to_record_length() {
        let image = build_image(&[("motd", b"hello")]);
        let mut vfs = Vfs::mount_initrd(&image).unwrap();
        let root = vfs.root();
        let file = vfs.finddir(root, "motd").unwrap();

        let mut buf = [0u8; 16];
        assert_eq!(vfs.read(file, 0, &mut buf), 5);
        assert_eq!(&buf[..5], b"hello");
        assert_eq!(vfs.read(file, 3, &mut buf), 2);
        assert_eq!(&buf[..2], b"lo");
        assert_eq!(vfs.read(file, 5, &mut buf), 0);
    }

    #[test]
    fn write_yields_zero_through_dispatch() {
        let image = build_image(&[("motd", b"hello")]);
        let mut vfs = Vfs::mount_initrd(&image).unwrap();
        let root = vfs.root();
        let file = vfs.finddir(root, "motd").unwrap();

        assert_eq!(vfs.write(file, 0, b"HELLO"), 0);
        assert_eq!(vfs.write(root, 0, b"HELLO"), 0);

        let mut buf = [0u8; 5];
        vfs.read(file, 0, &mut buf);
        assert_eq!(&buf, b"hello");
    }

    #[test]
    fn rejects_bad_magic() {
        let mut image = build_image(&[("motd", b"hi")]);
        image[0] = b'X';
        assert_eq!(Vfs::mount_initrd(&image).err(), Some(FsError::BadImage));
    }

    #[test]
    fn rejects_truncated_header() {
        assert!(Vfs::mount_initrd(b"INITRD").is_err());
    }

    #[test]
    fn rejects_truncated_record_table() {
        let mut image = Vec::new();
        image.extend_from_slice(&INITRD_MAGIC);
        image.extend_from_slice(&5u32.to_le_bytes());
        assert!(Vfs::mount_initrd(&image).is_err());
    }

    #[test]
    fn rejects_out_of_range_record() {
        let mut image = build_image(&[("motd", b"hi")]);
        // Corrupt the record length so it points past the blob.
        let length_at = INITRD_HEADER_LEN + INITRD_NAME_LEN + 4;
        image[length_at..length_at + 4].copy_from_slice(&0xffffu32.to_le_bytes());
        assert!(Vfs::mount_initrd(&image).is_err());
    }

    #[test]
    fn rejects_wrapping_record_count() {
        // 0x2000_0000 * 72 wraps to 0 in 32-bit arithmetic; the
        // checked math must reject it on every pointer width.
        let mut image = Vec::new();
        image.extend_from_slice(&INITRD_MAGIC);
        image.extend_from_slice(&0x2000_0000u32.to_le_bytes());
        assert_eq!(Vfs::mount_initrd(&image).err(), Some(FsError::BadImage));
    }

    #[test]
    fn rejects_wrapping_record_range() {
        let mut image = build_image(&[("motd", b"hi")]);
        let offset_at = INITRD_HEADER_LEN + INITRD_NAME_LEN;
        image[offset_at..offset_at + 4].copy_from_slice(&u32::MAX.to_le_bytes());
        image[offset_at + 4..offset_at + 8].copy_from_slice(&u32::MAX.to_le_bytes());
        assert_eq!(Vfs::mount_initrd(&image).err(), Some(FsError::BadImage));
    }

    #[test]
    fn unknown_name_is_none() {
        let image = build_image(&[("motd", b"hi")]);
        let mut vfs = Vfs::mount_initrd(&image).unwrap();
        let root = vfs.root();
        assert!(vfs.finddir(root, "nope").is_none());
        assert!(vfs.finddir(root, "MOTD").is_none());
    }

    #[test]
    fn empty_image_mounts() {
        let image = build_image(&[]);
        let vfs = Vfs::mount_initrd(&image).unwrap();
        assert!(vfs.readdir(vfs.root(), 0).is_none());
    }
}
