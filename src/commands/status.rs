//! Report which nodes of a local tree the store already holds

use crate::cid::Cid;
use crate::error::StorageError;
use crate::ignore::IgnorePredicate;
use crate::store::BlobStore;
use crate::tree::builder::TreeBuilder;
use crate::tree::node::Node;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusEntry {
    /// Relative to the traversal root; empty for the root itself
    pub path: PathBuf,
    pub cid: Cid,
    pub present: bool,
}

/// One entry per node, children before parents. Nothing is written to `store`.
pub fn status<S>(
    root: &Path,
    ignore: impl IgnorePredicate + 'static,
    store: &S,
) -> Result<Vec<StatusEntry>, StorageError>
where
    S: BlobStore + ?Sized,
{
    let mut entries = Vec::new();
    let mut check = |path: &Path, cid: &Cid, _: &Node| -> Result<(), StorageError> {
        entries.push(StatusEntry {
            path: path.to_path_buf(),
            cid: *cid,
            present: store.has(cid)?,
        });
        Ok(())
    };

    TreeBuilder::new(root)
        .with_ignore(ignore)
        .traverse(&mut check)?;
    Ok(entries)
}
