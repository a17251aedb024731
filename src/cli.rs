//! CLI domain: parse, route, output, and presentation only.
//! No domain orchestration; single route table dispatches to commands.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::map_error;
pub use parse::{Cli, Commands, TagCommands};
pub use presentation::{
    format_diff, format_pull_report, format_push_report, format_status, format_tag_list_json,
    format_tag_list_text,
};
pub use route::RunContext;
