//! CLI parse: clap types for multi. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// multi - content-addressed file tree sync
#[derive(Parser, Debug)]
#[command(name = "multi")]
#[command(about = "Hash, push, pull and diff directory trees as content-addressed DAGs")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace directory holding .multiverse.toml
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Remote to use (defaults to default_remote from the config)
    #[arg(long, short = 'r')]
    pub remote: Option<String>,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    pub verbose: bool,

    /// Disable logging entirely
    #[arg(long, short = 'q')]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Upload a local tree, skipping blobs the remote already has
    Push {
        /// Directory or file to push
        #[arg(default_value = ".")]
        path: PathBuf,
        /// Point this tag at the pushed root
        #[arg(long)]
        tag: Option<String>,
    },
    /// Materialize a stored tree into an empty directory
    Pull {
        /// Root CID or tag name
        reference: String,
        /// Target directory (must be absent or empty)
        #[arg(default_value = ".")]
        dir: PathBuf,
    },
    /// Show which nodes of a local tree the remote already has
    Status {
        #[arg(default_value = ".")]
        path: PathBuf,
    },
    /// Show added, removed and modified paths between two trees
    Diff {
        /// Local path, CID or tag name
        from: String,
        /// Local path, CID or tag name
        to: String,
    },
    /// Manage tags on the remote
    Tag {
        #[command(subcommand)]
        command: TagCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum TagCommands {
    /// Point a tag at a CID (or at another tag's target)
    Set { name: String, target: String },
    /// Print the CID a tag points at
    Get { name: String },
    /// List all tags
    List {
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
}
