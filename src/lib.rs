//! Multiverse: Content-Addressed File Tree Sync
//!
//! Hashes local directory trees into a Merkle DAG of immutable blobs addressed by CIDs,
//! pushes and pulls them through pluggable blob stores, names roots with tags, and
//! computes structural diffs between any two trees.

pub mod cid;
pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod ignore;
pub mod logging;
pub mod store;
pub mod tags;
pub mod tree;
pub mod types;

pub use cid::{Cid, ContentType, HashAlgorithm};
pub use error::{ApiError, DecodeError, StorageError};
pub use store::BlobStore;
pub use tags::TagStore;
pub use tree::{Node, TreeNode};
