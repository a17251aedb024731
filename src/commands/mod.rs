//! Commands
//!
//! Entry points behind the CLI. Each command takes its stores as explicit handles, so
//! several stores can be used side by side in one process.

pub mod diff;
pub mod pull;
pub mod push;
pub mod status;

pub use diff::{build_in_memory, diff_references, Reference};
pub use pull::{pull, PullReport};
pub use push::{push, PushReport};
pub use status::{status, StatusEntry};
