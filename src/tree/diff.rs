//! Structural diff between two DAG roots

use crate::cid::{Cid, ContentType};
use crate::error::StorageError;
use crate::store::BlobStore;
use crate::tree::node::{Link, Node, TreeNode};
use std::cmp::Ordering;
use std::fmt;
use tracing::{debug, instrument};

/// Kind of change at a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    /// One-character marker used in diff listings
    pub fn symbol(&self) -> char {
        match self {
            ChangeKind::Added => '+',
            ChangeKind::Removed => '-',
            ChangeKind::Modified => '*',
        }
    }
}

/// A single change, addressed by link names from the root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub path: Vec<String>,
    pub kind: ChangeKind,
}

impl DiffEntry {
    pub fn new(path: Vec<String>, kind: ChangeKind) -> Self {
        Self { path, kind }
    }

    /// Slash-separated path with a leading slash; the root is "/"
    pub fn path_string(&self) -> String {
        format!("/{}", self.path.join("/"))
    }
}

impl fmt::Display for DiffEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.kind.symbol(), self.path_string())
    }
}

/// Compare the trees rooted at `from` and `to`
///
/// Equal CIDs short-circuit without touching the store, so unchanged subtrees are never
/// fetched. Entries come out depth-first in link-name order, which makes the result a
/// function of content alone.
#[instrument(skip(store), fields(from = %from, to = %to))]
pub fn diff<S: BlobStore + ?Sized>(
    store: &S,
    from: &Cid,
    to: &Cid,
) -> Result<Vec<DiffEntry>, StorageError> {
    let mut entries = Vec::new();
    let mut path = Vec::new();
    diff_node(store, from, to, &mut path, &mut entries)?;
    debug!(changes = entries.len(), "Diff completed");
    Ok(entries)
}

fn diff_node<S: BlobStore + ?Sized>(
    store: &S,
    from: &Cid,
    to: &Cid,
    path: &mut Vec<String>,
    entries: &mut Vec<DiffEntry>,
) -> Result<(), StorageError> {
    if from == to {
        return Ok(());
    }

    match (from.content_type(), to.content_type()) {
        (ContentType::Tree, ContentType::Tree) => {
            let from_tree = fetch_tree(store, from, path)?;
            let to_tree = fetch_tree(store, to, path)?;
            diff_links(store, from_tree.links(), to_tree.links(), path, entries)
        }
        (ContentType::Raw, ContentType::Raw) if from.hash_algorithm() != to.hash_algorithm() => {
            // Same bytes hashed with different algorithms are not a change.
            if store.get(from)? != store.get(to)? {
                entries.push(DiffEntry::new(path.clone(), ChangeKind::Modified));
            }
            Ok(())
        }
        // Leaf digests differ, or the node kind changed at this path.
        _ => {
            entries.push(DiffEntry::new(path.clone(), ChangeKind::Modified));
            Ok(())
        }
    }
}

fn diff_links<S: BlobStore + ?Sized>(
    store: &S,
    from: &[Link],
    to: &[Link],
    path: &mut Vec<String>,
    entries: &mut Vec<DiffEntry>,
) -> Result<(), StorageError> {
    let (mut i, mut j) = (0, 0);
    while i < from.len() || j < to.len() {
        let order = match (from.get(i), to.get(j)) {
            (Some(a), Some(b)) => a.name.cmp(&b.name),
            (Some(_), None) => Ordering::Less,
            (None, _) => Ordering::Greater,
        };

        match order {
            Ordering::Less => {
                entries.push(child_entry(path, &from[i].name, ChangeKind::Removed));
                i += 1;
            }
            Ordering::Greater => {
                entries.push(child_entry(path, &to[j].name, ChangeKind::Added));
                j += 1;
            }
            Ordering::Equal => {
                path.push(from[i].name.clone());
                let result = diff_node(store, &from[i].cid, &to[j].cid, path, entries);
                path.pop();
                result?;
                i += 1;
                j += 1;
            }
        }
    }
    Ok(())
}

fn fetch_tree<S: BlobStore + ?Sized>(
    store: &S,
    cid: &Cid,
    path: &[String],
) -> Result<TreeNode, StorageError> {
    match store.get(cid)? {
        Node::Tree(tree) => Ok(tree),
        Node::Leaf(_) => Err(StorageError::NotATree(format!("/{}", path.join("/")))),
    }
}

fn child_entry(path: &[String], name: &str, kind: ChangeKind) -> DiffEntry {
    let mut child = path.to_vec();
    child.push(name.to_string());
    DiffEntry::new(child, kind)
}
