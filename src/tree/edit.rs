//! Path edits on stored trees
//!
//! Every edit rewrites the trees along the path bottom-up and returns the new root; the
//! old root stays valid because nodes are never mutated in place.

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::BlobStore;
use crate::tree::node::{Node, TreeNode};
use crate::tree::path::validate_link_name;
use tracing::debug;

/// Point `path` under `root` at `child`, creating missing intermediate trees
///
/// An absent root, or a missing link along the way, is treated as an empty tree. A leaf
/// in the middle of the path is `StorageError::NotATree`. An empty path replaces the
/// root with `child`.
pub fn put_path<S: BlobStore + ?Sized>(
    store: &S,
    root: Option<&Cid>,
    path: &[&str],
    child: &Cid,
) -> Result<Cid, StorageError> {
    for name in path {
        validate_link_name(name)?;
    }

    let Some((name, rest)) = path.split_first() else {
        return Ok(*child);
    };

    let tree = match root {
        Some(cid) => load_tree(store, cid, name)?,
        None => TreeNode::new(),
    };

    let existing = match tree.get_link(name) {
        Ok(cid) => Some(cid),
        Err(e) if e.is_not_found() => None,
        Err(e) => return Err(e),
    };

    let updated_child = put_path(store, existing.as_ref(), rest, child)?;
    let cid = store.add(&Node::Tree(tree.set_link(*name, updated_child)))?;
    debug!(name = %name, cid = %cid, "Rewrote tree");
    Ok(cid)
}

/// Drop the final link of `path` under `root`
///
/// Missing names anywhere on the path leave the tree unchanged and return `root`.
pub fn remove_path<S: BlobStore + ?Sized>(
    store: &S,
    root: &Cid,
    path: &[&str],
) -> Result<Cid, StorageError> {
    let Some((name, rest)) = path.split_first() else {
        return Err(StorageError::InvalidPath(
            "Cannot remove the root of a tree".to_string(),
        ));
    };

    let tree = load_tree(store, root, name)?;
    let next = if rest.is_empty() {
        tree.remove_link(name)
    } else {
        match tree.get_link(name) {
            Ok(child) => {
                let updated = remove_path(store, &child, rest)?;
                if updated == child {
                    return Ok(*root);
                }
                tree.set_link(*name, updated)
            }
            Err(e) if e.is_not_found() => return Ok(*root),
            Err(e) => return Err(e),
        }
    };

    if next == tree {
        return Ok(*root);
    }
    store.add(&Node::Tree(next))
}

fn load_tree<S: BlobStore + ?Sized>(
    store: &S,
    cid: &Cid,
    below: &str,
) -> Result<TreeNode, StorageError> {
    match store.get(cid)? {
        Node::Tree(tree) => Ok(tree),
        Node::Leaf(_) => Err(StorageError::NotATree(format!(
            "{} (parent of {:?})",
            cid, below
        ))),
    }
}
