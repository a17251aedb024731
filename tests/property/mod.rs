//! Property-based tests module

mod determinism;
