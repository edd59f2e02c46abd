//! HTML fragment adapter
//!
//! Produces the same Bootstrap-flavoured markup the dashboard page expects:
//! striped tables, muted placeholders, `<pre>` diagnostics and a dismissible
//! alert for the banner. All server-supplied text is escaped.

use super::{Cell, View};
use crate::notify::Notification;

const TABLE_CLASS: &str = "table table-bordered table-striped";

pub fn to_html(view: &View) -> String {
    match view {
        View::Table(table) => {
            let mut out = format!("<table class=\"{}\">", TABLE_CLASS);
            out.push_str("<thead><tr>");
            for header in &table.headers {
                out.push_str(&format!("<th>{}</th>", escape(header)));
            }
            out.push_str("</tr></thead><tbody>");
            for row in &table.rows {
                out.push_str("<tr>");
                for cell in row {
                    out.push_str(&format!("<td>{}</td>", cell_html(cell)));
                }
                out.push_str("</tr>");
            }
            out.push_str("</tbody></table>");
            out
        }
        View::Placeholder(message) => {
            format!("<p class=\"text-muted\">{}</p>", escape(message))
        }
        View::Text(text) => format!("<pre>{}</pre>", escape(text)),
    }
}

/// Alert markup for the banner region; a dismissed alert loses the `show` class
pub fn banner_html(notification: &Notification) -> String {
    let visibility = if notification.dismissed {
        "fade"
    } else {
        "fade show"
    };
    format!(
        "<div class=\"alert alert-{} alert-dismissible {}\" role=\"alert\">{}\
         <button type=\"button\" class=\"btn-close\" data-bs-dismiss=\"alert\" \
         aria-label=\"Close\"></button></div>",
        notification.severity.as_str(),
        visibility,
        escape(&notification.message)
    )
}

fn cell_html(cell: &Cell) -> String {
    match cell {
        Cell::Text(text) => escape(text),
        Cell::Image { src, alt } => format!(
            "<img src=\"{}\" alt=\"{}\" width=\"40\" class=\"rounded-circle\">",
            escape(src),
            escape(alt)
        ),
    }
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NotificationId, Severity};
    use crate::render::{render_table, TableKind};
    use serde_json::json;

    #[test]
    fn test_empty_collaborators_has_no_table_element() {
        let html = to_html(&render_table(TableKind::Collaborators, &json!([])));
        assert_eq!(html, "<p class=\"text-muted\">No collaborators found.</p>");
        assert!(!html.contains("<table"));
    }

    #[test]
    fn test_table_has_one_body_row_per_record() {
        let payload = json!([
            {"email": "a@x.com", "username": "alice"},
            {"email": "b@x.com", "username": "bob"},
        ]);
        let html = to_html(&render_table(TableKind::Mappings, &payload));
        assert!(html.starts_with("<table class=\"table table-bordered table-striped\">"));
        assert!(html.contains("<td>a@x.com</td><td>alice</td>"));
        let body = html.split("<tbody>").nth(1).unwrap();
        assert_eq!(body.matches("<tr>").count(), 2);
    }

    #[test]
    fn test_server_text_is_escaped() {
        let payload = json!([{"email": "<script>x</script>", "username": "a&b"}]);
        let html = to_html(&render_table(TableKind::Mappings, &payload));
        assert!(html.contains("&lt;script&gt;x&lt;/script&gt;"));
        assert!(html.contains("a&amp;b"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn test_banner_reflects_severity_and_dismissal() {
        let mut notification = Notification {
            id: NotificationId(1),
            message: "added".to_string(),
            severity: Severity::Success,
            dismissed: false,
        };
        let html = banner_html(&notification);
        assert!(html.contains("alert alert-success alert-dismissible fade show"));
        assert!(html.contains(">added<"));

        notification.dismissed = true;
        assert!(!banner_html(&notification).contains("fade show"));
    }
}
