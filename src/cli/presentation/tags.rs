//! Tag presentation: list formatters.

use crate::cid::Cid;
use crate::error::ApiError;
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;

pub fn format_tag_list_text(tags: &[(String, Cid)]) -> String {
    if tags.is_empty() {
        return "No tags.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Tag", "CID"]);
    for (name, cid) in tags {
        table.add_row(vec![name.clone(), cid.to_string()]);
    }
    table.to_string()
}

pub fn format_tag_list_json(tags: &[(String, Cid)]) -> Result<String, ApiError> {
    let rows: Vec<serde_json::Value> = tags
        .iter()
        .map(|(name, cid)| serde_json::json!({ "tag": name, "cid": cid }))
        .collect();
    serde_json::to_string_pretty(&rows)
        .map_err(|e| ApiError::ConfigError(format!("Failed to render tags: {}", e)))
}
