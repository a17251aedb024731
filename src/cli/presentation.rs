//! CLI presentation: text and json formatters per command family.

mod sync;
mod tags;

pub use sync::{format_diff, format_pull_report, format_push_report, format_status};
pub use tags::{format_tag_list_json, format_tag_list_text};
