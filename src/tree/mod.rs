//! Filesystem Merkle DAG
//!
//! Represents a directory tree as a DAG of content-addressed nodes, where every node
//! (file or directory) is identified by the hash of its canonical encoding.

pub mod builder;
pub mod diff;
pub mod edit;
pub mod hasher;
pub mod mirror;
pub mod node;
pub mod path;
pub mod walker;

pub use builder::{traverse, TreeBuilder, Visitor};
pub use diff::{diff, ChangeKind, DiffEntry};
pub use mirror::traverse_remote;
pub use node::{Link, Node, TreeNode};
