//! Upload a local tree, skipping every node the store already holds

use crate::cid::Cid;
use crate::error::StorageError;
use crate::ignore::IgnorePredicate;
use crate::store::BlobStore;
use crate::tree::builder::TreeBuilder;
use crate::tree::node::Node;
use std::path::Path;
use tracing::{debug, info, trace};

/// Outcome of a push
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushReport {
    pub root: Cid,
    /// Nodes written to the store
    pub uploaded: usize,
    /// Nodes the store already had
    pub skipped: usize,
}

/// Hash `root` and add every node missing from `store`
///
/// Children are visited before their parents, so a tree node only lands in the store
/// after everything it links to.
pub fn push<S>(
    root: &Path,
    ignore: impl IgnorePredicate + 'static,
    store: &S,
) -> Result<PushReport, StorageError>
where
    S: BlobStore + ?Sized,
{
    let mut uploaded = 0;
    let mut skipped = 0;

    let mut upload = |path: &Path, cid: &Cid, node: &Node| -> Result<(), StorageError> {
        if store.has(cid)? {
            trace!(path = %path.display(), cid = %cid, "Already present");
            skipped += 1;
            return Ok(());
        }
        let stored = store.add(node)?;
        if stored != *cid {
            return Err(StorageError::Integrity {
                expected: cid.to_string(),
                actual: stored.to_string(),
            });
        }
        debug!(path = %path.display(), cid = %cid, "Uploaded");
        uploaded += 1;
        Ok(())
    };

    let cid = TreeBuilder::new(root)
        .with_ignore(ignore)
        .traverse(&mut upload)?;

    info!(root = %cid, uploaded, skipped, "Push completed");
    Ok(PushReport {
        root: cid,
        uploaded,
        skipped,
    })
}
