//! Diff between references that may be local paths or stored roots

use crate::cid::Cid;
use crate::error::{ApiError, StorageError};
use crate::ignore::{IgnorePredicate, IgnoreRules};
use crate::store::{BlobStore, MemoryStore, Multiplex};
use crate::tags::TagStore;
use crate::tree::builder::TreeBuilder;
use crate::tree::diff::{diff, DiffEntry};
use crate::tree::node::Node;
use crate::tree::path::canonicalize_root;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

/// One side of a diff
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// Local tree, hashed in memory without touching any store
    Path(PathBuf),
    Cid(Cid),
}

impl Reference {
    /// An existing path wins, then a decodable CID
    pub fn parse(input: &str) -> Result<Self, ApiError> {
        Self::resolve(input, None)
    }

    /// Like `parse`, falling back to a tag lookup in `tags`
    pub fn resolve(input: &str, tags: Option<&dyn TagStore>) -> Result<Self, ApiError> {
        let path = Path::new(input);
        if path.exists() {
            return Ok(Reference::Path(canonicalize_root(path)?));
        }
        if let Ok(cid) = Cid::decode(input) {
            return Ok(Reference::Cid(cid));
        }
        if let Some(tags) = tags {
            match tags.get(input) {
                Ok(cid) => return Ok(Reference::Cid(cid)),
                Err(e) if e.is_not_found() => {}
                Err(StorageError::InvalidTagName(_)) => {}
                Err(e) => return Err(e.into()),
            }
        }
        Err(ApiError::InvalidReference(input.to_string()))
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reference::Path(path) => write!(f, "{}", path.display()),
            Reference::Cid(cid) => write!(f, "{}", cid),
        }
    }
}

/// Hash `root` into a fresh in-memory store holding every node of the tree
pub fn build_in_memory(
    root: &Path,
    ignore: impl IgnorePredicate + 'static,
) -> Result<(Cid, MemoryStore), StorageError> {
    let store = MemoryStore::new();
    let mut stage = |_: &Path, cid: &Cid, node: &Node| -> Result<(), StorageError> {
        store.insert(*cid, node.clone());
        Ok(())
    };
    let cid = TreeBuilder::new(root)
        .with_ignore(ignore)
        .traverse(&mut stage)?;
    debug!(root = %cid, nodes = store.len(), "Staged tree in memory");
    Ok((cid, store))
}

/// Diff two references, overlaying locally hashed trees on top of `store`
pub fn diff_references(
    store: Arc<dyn BlobStore>,
    from: &Reference,
    to: &Reference,
) -> Result<Vec<DiffEntry>, ApiError> {
    let mut layered = Multiplex::new(store);
    let from = stage(&mut layered, from)?;
    let to = stage(&mut layered, to)?;
    Ok(diff(&layered, &from, &to)?)
}

fn stage(layered: &mut Multiplex, reference: &Reference) -> Result<Cid, ApiError> {
    match reference {
        Reference::Cid(cid) => Ok(*cid),
        Reference::Path(path) => {
            let (cid, staged) = build_in_memory(path, IgnoreRules::for_root(path))?;
            layered.push_front(Arc::new(staged));
            Ok(cid)
        }
    }
}
