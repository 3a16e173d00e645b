//! Skull OS Storage Layer
//!
//! The storage core of the Skull OS kernel: a virtual-filesystem
//! abstraction over a closed set of backing stores, plus the path
//! resolver that turns strings into nodes.
//!
//! - **Types**: `NodeId`, `NodeKind`, `DirEntry` and the name limit
//! - **Node**: the uniform node structure and per-store payloads
//! - **Vfs**: the filesystem context - node arena, root registry, and
//!   the dispatch layer (`read`/`write`/`readdir`/`finddir`)
//! - **Path**: `resolve` and `split` for walking path strings
//! - **SkullFS**: the writable in-memory filesystem
//! - **Initrd**: the read-only boot ramdisk and its image format
//! - **Minimal**: the built-in fallback tree
//! - **Bootstrap**: the fixed-order mount chain run once at boot
//!
//! # Design Principles
//!
//! 1. **One arena, stable handles**: every node lives in the `Vfs`
//!    arena; directory entries own child handles, `".."` is a plain
//!    non-owning handle, so ownership cycles cannot form.
//! 2. **Closed dispatch**: behavior is selected by matching the
//!    node's backing variant - no function pointers, no null checks.
//! 3. **Neutral results on the data plane**: a store that does not
//!    implement an operation yields 0 bytes or `None`, never a fault;
//!    structural operations report typed `FsError`s.
//! 4. **Single-threaded by construction**: mutation needs `&mut Vfs`,
//!    which is the kernel's run-to-completion model made explicit.

#![no_std]
extern crate alloc;

pub mod bootstrap;
pub mod error;
pub mod initrd;
pub mod minimal;
pub mod node;
pub mod path;
pub mod skullfs;
pub mod types;
pub mod vfs;

// Re-export main types
pub use error::FsError;
pub use initrd::{
    INITRD_HEADER_LEN, INITRD_MAGIC, INITRD_MAGIC_CHECKED, INITRD_NAME_LEN, INITRD_RECORD_LEN,
};
pub use node::Node;
pub use path::{basename, SEPARATOR};
pub use types::{DirEntry, NodeId, NodeKind, NAME_MAX};
pub use vfs::Vfs;
