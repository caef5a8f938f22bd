//! Output formatting for search results.
//!
//! Supports human-readable terminal output and JSON for scripting. Results
//! arrive already ranked and grouped by kind; formatting only lays them out.

use waystone_core::engine::ResultSet;

/// Formats a result set as pretty-printed JSON.
pub fn format_json(results: &ResultSet) -> String {
    serde_json::to_string_pretty(results).unwrap_or_else(|_| "{}".to_string())
}

/// Formats a result set for human-readable terminal output.
pub fn format_human(results: &ResultSet) -> String {
    if results.is_empty() {
        return format!("No results for \"{}\"", results.query);
    }

    let count = results.entry_count();
    let entry_word = if count == 1 { "entry" } else { "entries" };
    let mut output = format!("{} {} for \"{}\":\n", count, entry_word, results.query);

    if results.partial {
        output.push_str("(some index shards could not be loaded; results may be incomplete)\n");
    }

    for group in &results.groups {
        output.push_str(&format!("\n{}\n", group.kind.label()));
        for entry in &group.entries {
            match &entry.scope {
                Some(scope) => output.push_str(&format!("  {} ({})\n", entry.name, scope)),
                None => output.push_str(&format!("  {}\n", entry.name)),
            }
            output.push_str(&format!("      {}\n", entry.anchor_url));
        }
    }

    if results.truncated {
        output.push_str(&format!(
            "\nMore matches exist; showing the first {}.\n",
            count
        ));
    }

    output.trim_end().to_string()
}
