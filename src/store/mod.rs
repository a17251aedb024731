//! Blob Store
//!
//! Content-addressed storage of encoded DAG nodes. Keys are CIDs (their string form on
//! disk and on the wire); values are the encoded bytes of exactly one node.
//!
//! Every backend upholds the integrity contract: if `has(cid)` is true, `get(cid)`
//! returns a node whose bytes hash to `cid`.

pub mod file;
pub mod memory;
pub mod multiplex;
pub mod remote;
pub mod wire;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use multiplex::Multiplex;
pub use remote::RemoteStore;

use crate::cid::Cid;
use crate::error::StorageError;
use crate::tree::node::Node;
use std::sync::Arc;
use tracing::error;

/// Blob Store interface
pub trait BlobStore: Send + Sync {
    /// Whether `cid` is present. Backend and transport failures are returned as errors.
    fn has(&self, cid: &Cid) -> Result<bool, StorageError>;

    /// Fetch and decode the node addressed by `cid`; a missing key is `StorageError::NotFound`
    fn get(&self, cid: &Cid) -> Result<Node, StorageError>;

    /// Store `node` under its CID and return that CID. Adding a present node is a no-op.
    fn add(&self, node: &Node) -> Result<Cid, StorageError>;
}

impl<T: BlobStore + ?Sized> BlobStore for &T {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        (**self).has(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        (**self).get(cid)
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        (**self).add(node)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for Box<T> {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        (**self).has(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        (**self).get(cid)
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        (**self).add(node)
    }
}

impl<T: BlobStore + ?Sized> BlobStore for Arc<T> {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        (**self).has(cid)
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        (**self).get(cid)
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        (**self).add(node)
    }
}

/// Decode bytes fetched for `cid`, refusing bytes that do not hash to it
pub(crate) fn decode_verified(cid: &Cid, bytes: Vec<u8>) -> Result<Node, StorageError> {
    if !cid.verify(&bytes) {
        let actual = Cid::hash_with(cid.hash_algorithm(), cid.content_type(), &bytes);
        error!(expected = %cid, actual = %actual, "Stored bytes do not match their CID");
        return Err(StorageError::Integrity {
            expected: cid.to_string(),
            actual: actual.to_string(),
        });
    }
    Ok(Node::decode(cid.content_type(), bytes)?)
}
