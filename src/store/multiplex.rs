//! Layered store: an ordered chain of inner stores queried in priority order

use crate::cid::Cid;
use crate::error::StorageError;
use crate::store::BlobStore;
use crate::tree::node::Node;
use std::sync::Arc;
use tracing::trace;

/// Reads fall through the chain; writes go to the first store only
#[derive(Clone, Default)]
pub struct Multiplex {
    stores: Vec<Arc<dyn BlobStore>>,
}

impl Multiplex {
    pub fn new(primary: Arc<dyn BlobStore>) -> Self {
        Self {
            stores: vec![primary],
        }
    }

    /// Put `store` ahead of every other store; it becomes the write target
    pub fn push_front(&mut self, store: Arc<dyn BlobStore>) -> &mut Self {
        self.stores.insert(0, store);
        self
    }

    /// Add a fallback consulted after every other store
    pub fn push_back(&mut self, store: Arc<dyn BlobStore>) -> &mut Self {
        self.stores.push(store);
        self
    }

    pub fn len(&self) -> usize {
        self.stores.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl BlobStore for Multiplex {
    fn has(&self, cid: &Cid) -> Result<bool, StorageError> {
        if self.stores.is_empty() {
            return Err(StorageError::NoBackend);
        }
        for store in &self.stores {
            if store.has(cid)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get(&self, cid: &Cid) -> Result<Node, StorageError> {
        if self.stores.is_empty() {
            return Err(StorageError::NoBackend);
        }
        for (index, store) in self.stores.iter().enumerate() {
            match store.get(cid) {
                Ok(node) => return Ok(node),
                Err(StorageError::NotFound(_)) => {
                    trace!(cid = %cid, layer = index, "Miss, trying next store");
                }
                Err(e) => return Err(e),
            }
        }
        Err(StorageError::NotFound(*cid))
    }

    fn add(&self, node: &Node) -> Result<Cid, StorageError> {
        match self.stores.first() {
            Some(primary) => primary.add(node),
            None => Err(StorageError::NoBackend),
        }
    }
}
