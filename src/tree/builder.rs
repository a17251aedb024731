//! Tree builder: hashes a local directory into a Merkle DAG

use crate::cid::Cid;
use crate::error::StorageError;
use crate::ignore::{IgnorePredicate, IgnoreRules};
use crate::tree::node::{Node, TreeNode};
use crate::tree::walker::{self, EntryKind};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{error, info, instrument, trace};

/// Receives every node produced (or fetched) by a traversal
///
/// This is where push, status, pull and in-memory staging attach their side effects;
/// traversals themselves never write to a store.
pub trait Visitor {
    /// `path` is relative to the traversal root; the root itself is the empty path.
    fn visit(&mut self, path: &Path, cid: &Cid, node: &Node) -> Result<(), StorageError>;
}

impl<F> Visitor for F
where
    F: FnMut(&Path, &Cid, &Node) -> Result<(), StorageError>,
{
    fn visit(&mut self, path: &Path, cid: &Cid, node: &Node) -> Result<(), StorageError> {
        self(path, cid, node)
    }
}

struct Discard;

impl Visitor for Discard {
    fn visit(&mut self, _path: &Path, _cid: &Cid, _node: &Node) -> Result<(), StorageError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct TraversalStats {
    files: usize,
    directories: usize,
    bytes: u64,
}

/// Tree builder for hashing local filesystem trees
pub struct TreeBuilder {
    root: PathBuf,
    ignore: Box<dyn IgnorePredicate>,
}

impl TreeBuilder {
    /// Create a builder for `root` using the built-in ignore rules
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ignore: Box::new(IgnoreRules::builtin()),
        }
    }

    /// Replace the ignore predicate. It sees paths relative to the root.
    pub fn with_ignore(mut self, ignore: impl IgnorePredicate + 'static) -> Self {
        self.ignore = Box::new(ignore);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the tree depth-first, post-order, and return the root CID
    ///
    /// Children are hashed before their parent, so a tree node is only built once every
    /// child CID is known. Identical trees yield identical root CIDs on any machine.
    #[instrument(skip(self, visitor), fields(root = %self.root.display()))]
    pub fn traverse<V: Visitor + ?Sized>(&self, visitor: &mut V) -> Result<Cid, StorageError> {
        let start = Instant::now();
        info!("Starting traversal");

        let mut stats = TraversalStats::default();
        let cid = match self.traverse_path(&self.root, Path::new(""), visitor, &mut stats) {
            Ok(cid) => cid,
            Err(e) => {
                error!("Traversal failed: {}", e);
                return Err(e);
            }
        };

        info!(
            root_cid = %cid,
            files = stats.files,
            directories = stats.directories,
            bytes = stats.bytes,
            duration_ms = start.elapsed().as_millis() as u64,
            "Traversal completed"
        );
        Ok(cid)
    }

    /// Root CID without side effects
    pub fn compute_root(&self) -> Result<Cid, StorageError> {
        self.traverse(&mut Discard)
    }

    fn traverse_path<V: Visitor + ?Sized>(
        &self,
        full: &Path,
        relative: &Path,
        visitor: &mut V,
        stats: &mut TraversalStats,
    ) -> Result<Cid, StorageError> {
        let metadata = fs::metadata(full)
            .map_err(|e| StorageError::io(format!("Failed to stat {:?}", full), e))?;

        if metadata.is_dir() {
            self.hash_directory(full, relative, visitor, stats)
        } else if metadata.is_file() {
            self.hash_file(full, relative, visitor, stats)
        } else {
            Err(StorageError::InvalidPath(format!(
                "Not a file or directory: {:?}",
                full
            )))
        }
    }

    fn hash_directory<V: Visitor + ?Sized>(
        &self,
        full: &Path,
        relative: &Path,
        visitor: &mut V,
        stats: &mut TraversalStats,
    ) -> Result<Cid, StorageError> {
        let mut links = Vec::new();

        for entry in walker::list_children(full)? {
            let child_relative = relative.join(&entry.name);
            if self.ignore.is_ignored(&child_relative) {
                trace!(path = %child_relative.display(), "Ignored");
                continue;
            }

            let child_cid = match entry.kind {
                EntryKind::Directory => {
                    self.hash_directory(&entry.path, &child_relative, visitor, stats)?
                }
                EntryKind::File => self.hash_file(&entry.path, &child_relative, visitor, stats)?,
            };
            links.push((entry.name, child_cid));
        }

        let node = Node::Tree(TreeNode::try_from_links(links)?);
        let cid = node.cid();
        trace!(path = %relative.display(), cid = %cid, "Hashed directory");

        stats.directories += 1;
        visitor.visit(relative, &cid, &node)?;
        Ok(cid)
    }

    fn hash_file<V: Visitor + ?Sized>(
        &self,
        full: &Path,
        relative: &Path,
        visitor: &mut V,
        stats: &mut TraversalStats,
    ) -> Result<Cid, StorageError> {
        let content = fs::read(full).map_err(|e| {
            error!("Failed to read file: {}", e);
            StorageError::io(format!("Failed to read file {:?}", full), e)
        })?;

        stats.files += 1;
        stats.bytes += content.len() as u64;

        let node = Node::Leaf(content);
        let cid = node.cid();
        trace!(path = %relative.display(), cid = %cid, "Hashed file");

        visitor.visit(relative, &cid, &node)?;
        Ok(cid)
    }
}

/// Hash `root` with `ignore`, reporting every node to `visitor`
pub fn traverse<V: Visitor + ?Sized>(
    root: &Path,
    ignore: impl IgnorePredicate + 'static,
    visitor: &mut V,
) -> Result<Cid, StorageError> {
    TreeBuilder::new(root).with_ignore(ignore).traverse(visitor)
}
