//! Core types for the content-addressed file tree engine.

/// Digest: 256-bit output of a supported hash algorithm
pub type Digest = [u8; 32];

/// Length in bytes of every supported digest
pub const DIGEST_LEN: usize = 32;
