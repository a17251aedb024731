//! Process-lifetime blob store, used for throwaway trees such as diffing a local path

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::BlobStore;
use crate::tree::node::Node;
use parking_lot::RwLock;
use std::collections::HashMap;

/// In-memory implementation of BlobStore
#[derive(Debug, Default)]
pub struct MemoryStore {
    nodes: RwLock<HashMap<Cid, Node>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node whose CID the caller already computed
    pub(crate) fn insert(&self, cid: Cid, node: Node) {
        self.nodes.write().entry(cid).or_insert(node);
    }

    pub fn len(&self) -> usize {
        self.nodes.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.read().is_empty()
    }

    /// All stored CIDs in sorted order
    pub fn cids(&self) -> Vec<Cid> {
        let mut cids: Vec<Cid> = self.nodes.read().keys().copied().collect();
        cids.sort();
        cids
    }
}

impl BlobStore for MemoryStore {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        Ok(self.nodes.read().contains_key(cid))
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        self.nodes
            .read()
            .get(cid)
            .cloned()
            .ok_or(StorageError::NotFound(*cid))
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        let cid = node.cid();
        self.nodes.write().entry(cid).or_insert_with(|| node.clone());
        Ok(cid)
    }
}
