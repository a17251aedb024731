//! Top-down walk of a stored DAG, starting from a root CID

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::BlobStore;
use crate::tree::builder::Visitor;
use crate::tree::node::Node;
use crate::tree::path::validate_link_name;
use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

/// Fetch `root` from `store` and visit it, then every descendant, parents first
///
/// Link names are validated before they are joined onto the path, so a hostile tree can
/// never make a visitor see `..` or an absolute component.
#[instrument(skip(store, visitor), fields(root = %root))]
pub fn traverse_remote<S, V>(store: &S, root: &Cid, visitor: &mut V) -> Result<(), StorageError>
where
    S: BlobStore + ?Sized,
    V: Visitor + ?Sized,
{
    walk(store, root, PathBuf::new(), visitor)
}

fn walk<S, V>(store: &S, cid: &Cid, path: PathBuf, visitor: &mut V) -> Result<(), StorageError>
where
    S: BlobStore + ?Sized,
    V: Visitor + ?Sized,
{
    let node = store.get(cid)?;
    visitor.visit(&path, cid, &node)?;

    if let Node::Tree(tree) = &node {
        debug!(path = %path.display(), links = tree.len(), "Descending into tree");
        for link in tree.links() {
            validate_link_name(&link.name)?;
            walk(store, &link.cid, join(&path, &link.name), visitor)?;
        }
    }
    Ok(())
}

fn join(parent: &Path, name: &str) -> PathBuf {
    if parent.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        parent.join(name)
    }
}
