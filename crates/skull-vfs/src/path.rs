//! Path resolution.
//!
//! Turns slash-separated path strings into node handles. Paths are
//! absolute or root-relative (there is no working directory at this
//! layer); consecutive separators collapse, so `"a//b"` walks the same
//! components as `"/a/b"`, and a trailing separator is ignored.

use alloc::vec::Vec;

use crate::error::FsError;
use crate::types::NodeId;
use crate::vfs::Vfs;

/// Path component separator.
pub const SEPARATOR: char = '/';

/// The final component of a path, verbatim.
///
/// Everything after the last separator; the whole path when there is
/// none; empty for a path ending in a separator.
pub fn basename(path: &str) -> &str {
    match path.rfind(SEPARATOR) {
        Some(pos) => &path[pos + 1..],
        None => path,
    }
}

impl Vfs {
    /// Resolve a path to a node.
    ///
    /// Walks non-empty components left to right from the root,
    /// requiring a directory at each step. `""`, `"/"` and any path of
    /// only separators resolve to the root. Any failed lookup aborts
    /// the whole resolution; there is no partial result.
    ///
    /// Takes `&mut self` because lookups may synthesize initrd nodes.
    pub fn resolve(&mut self, path: &str) -> Result<NodeId, FsError> {
        let mut current = self.root();
        for component in path.split(SEPARATOR).filter(|c| !c.is_empty()) {
            self.require_dir(current)?;
            current = self
                .finddir(current, component)
                .ok_or(FsError::NotFound)?;
        }
        Ok(current)
    }

    /// Split a path into its parent directory node and verbatim leaf
    /// name, for create/delete operations.
    ///
    /// Only the components before the last are walked; the leaf is
    /// returned as written and is not looked up, so it need not exist
    /// yet. A path with no leaf (empty, or separators only) cannot
    /// name anything to create and is `InvalidName`.
    pub fn split<'p>(&mut self, path: &'p str) -> Result<(NodeId, &'p str), FsError> {
        let mut components: Vec<&str> =
            path.split(SEPARATOR).filter(|c| !c.is_empty()).collect();
        let leaf = components.pop().ok_or(FsError::InvalidName)?;

        let mut current = self.root();
        for component in components {
            self.require_dir(current)?;
            current = self
                .finddir(current, component)
                .ok_or(FsError::NotFound)?;
        }
        self.require_dir(current)?;
        Ok((current, leaf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fs_with_tree() -> Vfs {
        let mut vfs = Vfs::mount_skullfs().unwrap();
        let root = vfs.root();
        let tmp = vfs.finddir(root, "tmp").unwrap();
        let sub = vfs.create_dir(tmp, "sub").unwrap();
        let file = vfs.create_file(sub, "x.txt").unwrap();
        vfs.write(file, 0, b"data");
        vfs
    }

    #[test]
    fn empty_and_root_paths_resolve_to_root() {
        let mut vfs = fs_with_tree();
        let root = vfs.root();
        assert_eq!(vfs.resolve(""), Ok(root));
        assert_eq!(vfs.resolve("/"), Ok(root));
        assert_eq!(vfs.resolve("///"), Ok(root));
    }

    #[test]
    fn resolve_matches_stepwise_lookup() {
        let mut vfs = fs_with_tree();
        let root = vfs.root();
        let tmp = vfs.finddir(root, "tmp").unwrap();
        let sub = vfs.finddir(tmp, "sub").unwrap();

        assert_eq!(vfs.resolve("/tmp/sub"), Ok(sub));
        assert_eq!(vfs.resolve("tmp/sub"), Ok(sub));
    }

    #[test]
    fn separators_collapse_and_trailing_is_ignored() {
        let mut vfs = fs_with_tree();
        let a = vfs.resolve("/tmp//sub").unwrap();
        let b = vfs.resolve("/tmp/sub/").unwrap();
        let c = vfs.resolve("/tmp/sub").unwrap();
        assert_eq!(a, c);
        assert_eq!(b, c);
    }

    #[test]
    fn missing_component_aborts_resolution() {
        let mut vfs = fs_with_tree();
        assert_eq!(vfs.resolve("/tmp/nope/x.txt"), Err(FsError::NotFound));
        assert_eq!(vfs.resolve("/nope"), Err(FsError::NotFound));
    }

    #[test]
    fn file_in_the_middle_is_not_a_directory() {
        let mut vfs = fs_with_tree();
        assert_eq!(
            vfs.resolve("/tmp/sub/x.txt/deeper"),
            Err(FsError::NotADirectory)
        );
    }

    #[test]
    fn dot_components_walk_in_place() {
        let mut vfs = fs_with_tree();
        let plain = vfs.resolve("/tmp/sub").unwrap();
        let dotted = vfs.resolve("/tmp/./sub").unwrap();
        let backed = vfs.resolve("/tmp/sub/../sub").unwrap();
        assert_eq!(dotted, plain);
        assert_eq!(backed, plain);
    }

    #[test]
    fn split_returns_parent_and_verbatim_leaf() {
        let mut vfs = fs_with_tree();
        let tmp = vfs.resolve("/tmp").unwrap();

        let (parent, leaf) = vfs.split("/tmp/new.txt").unwrap();
        assert_eq!(parent, tmp);
        assert_eq!(leaf, "new.txt");

        // The leaf need not exist - that's the point for creation.
        assert!(vfs.create_file(parent, leaf).is_ok());
    }

    #[test]
    fn split_of_root_only_paths_fails() {
        let mut vfs = fs_with_tree();
        assert_eq!(vfs.split("/").err(), Some(FsError::InvalidName));
        assert_eq!(vfs.split("").err(), Some(FsError::InvalidName));
    }

    #[test]
    fn split_single_component_parents_at_root() {
        let mut vfs = fs_with_tree();
        let root = vfs.root();
        let (parent, leaf) = vfs.split("notes.txt").unwrap();
        assert_eq!(parent, root);
        assert_eq!(leaf, "notes.txt");
    }

    #[test]
    fn basename_takes_the_last_component() {
        assert_eq!(basename("/tmp/sub/x.txt"), "x.txt");
        assert_eq!(basename("x.txt"), "x.txt");
        assert_eq!(basename("/tmp/"), "");
        assert_eq!(basename(""), "");
    }
}
