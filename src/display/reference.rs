//! Group, category and party display formatting

use std::fmt::Display;

use tabled::Tabled;

use crate::models::Rankable;
use crate::services::Choice;

use super::render_table;

#[derive(Tabled)]
struct ReferenceRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Used")]
    used: u32,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format groups, categories or parties as a table
pub fn format_reference_list<E: Rankable>(kind: &str, rows: &[E]) -> String {
    if rows.is_empty() {
        return format!("No {} entries found.\n", kind.to_lowercase());
    }

    let rows = rows
        .iter()
        .map(|row| ReferenceRow {
            id: row.id().to_string(),
            name: row.name().to_string(),
            used: row.times_used(),
            status: if row.is_active() { "active" } else { "inactive" },
        })
        .collect();

    render_table(rows)
}

/// Format a ranked selection list, one numbered line per entry
pub fn format_choices<Id: Display>(title: &str, choices: &[Choice<Id>]) -> String {
    let mut output = format!("{}:\n", title);

    if choices.is_empty() {
        output.push_str("  (none)\n");
        return output;
    }

    for (i, choice) in choices.iter().enumerate() {
        output.push_str(&format!("  {:>2}. {} [{}]\n", i + 1, choice.label, choice.id));
    }

    output
}
