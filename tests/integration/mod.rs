//! Integration tests module
//!
//! Each submodule covers one component end to end.

mod config_integration;
mod diff_engine;
mod remote_store;
mod tree_determinism;
