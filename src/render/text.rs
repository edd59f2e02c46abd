//! Plain-text adapter for headless output
//!
//! Tables are laid out in aligned columns using display width so that
//! emoji permission flags and CJK names line up.

use super::View;
use unicode_width::UnicodeWidthStr;

pub fn to_text(view: &View) -> String {
    match view {
        View::Table(table) => {
            let mut widths: Vec<usize> = table.headers.iter().map(|h| h.width()).collect();
            for row in &table.rows {
                for (i, cell) in row.iter().enumerate() {
                    if let Some(w) = widths.get_mut(i) {
                        *w = (*w).max(cell.as_text().width());
                    }
                }
            }

            let mut lines = Vec::with_capacity(table.rows.len() + 2);
            lines.push(format_row(table.headers.iter().map(String::as_str), &widths));
            lines.push(
                widths
                    .iter()
                    .map(|w| "-".repeat(*w))
                    .collect::<Vec<_>>()
                    .join("-+-"),
            );
            for row in &table.rows {
                lines.push(format_row(row.iter().map(|c| c.as_text()), &widths));
            }
            lines.join("\n")
        }
        View::Placeholder(message) => message.clone(),
        View::Text(text) => text.clone(),
    }
}

fn format_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize]) -> String {
    cells
        .zip(widths)
        .map(|(cell, width)| pad(cell, *width))
        .collect::<Vec<_>>()
        .join(" | ")
        .trim_end()
        .to_string()
}

fn pad(cell: &str, width: usize) -> String {
    let fill = width.saturating_sub(cell.width());
    format!("{}{}", cell, " ".repeat(fill))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_table, TableKind};
    use serde_json::json;

    #[test]
    fn test_table_columns_align() {
        let payload = json!([
            {"email": "a@x.com", "username": "alice"},
            {"email": "longer@example.com", "username": "bo"},
        ]);
        let text = to_text(&render_table(TableKind::Mappings, &payload));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "Email              | Username");
        assert_eq!(lines[2], "a@x.com            | alice");
        assert_eq!(lines[3], "longer@example.com | bo");
    }

    #[test]
    fn test_placeholder_is_plain_message() {
        let text = to_text(&render_table(TableKind::AuditLog, &json!([])));
        assert_eq!(text, "No logs found.");
    }
}
