//! Error types for the storage layer.

use serde::{Deserialize, Serialize};

/// Errors from storage operations.
///
/// The four dispatch entry points (`read`, `write`, `readdir`,
/// `finddir`) never produce these: an absent capability yields the
/// neutral result (0 bytes, `None`). Structural operations (create,
/// delete, resolve, mount) report the precise failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsError {
    /// Name or path did not resolve
    NotFound,

    /// Operation requires a directory
    NotADirectory,

    /// Operation requires a file
    NotAFile,

    /// Name already occupied in the target directory
    AlreadyExists,

    /// Directory still holds real entries
    DirectoryNotEmpty,

    /// Name is empty, too long, or contains a separator
    InvalidName,

    /// Target backing store does not support mutation
    ReadOnly,

    /// Initrd image failed validation
    BadImage,
}
