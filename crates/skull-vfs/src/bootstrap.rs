//! Boot-time mounting.
//!
//! The kernel mounts exactly one root, trying backing stores in a
//! fixed priority order: the initrd image handed over by the boot
//! loader, then a fresh SkullFS, then the built-in fallback tree.
//! Whatever mounts first stays the root for the life of the context;
//! there is no remount.

use crate::vfs::Vfs;

impl Vfs {
    /// Mount the root filesystem.
    ///
    /// Tries the given initrd image first; a missing or malformed
    /// image falls through to SkullFS, and the fallback tree covers
    /// the path where even that fails. The returned context is the
    /// root registry: its root is set here, once.
    pub fn boot(initrd: Option<&[u8]>) -> Vfs {
        if let Some(blob) = initrd {
            if let Ok(vfs) = Vfs::mount_initrd(blob) {
                return vfs;
            }
        }
        match Vfs::mount_skullfs() {
            Ok(vfs) => vfs,
            Err(_) => Vfs::mount_minimal(),
        }
    }
}
