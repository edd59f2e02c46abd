//! Form panel: the current tab's input fields and action hints

use crate::tui::app::Tab;
use crate::tui::form::Form;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Rows needed to draw `form` (fields, hint line, borders)
pub fn height(form: &Form) -> u16 {
    form.fields.len() as u16 + 3
}

pub fn render(f: &mut Frame, area: Rect, tab: Tab, form: &Form, theme: &Theme) {
    let label_width = form
        .fields
        .iter()
        .map(|field| field.label.len())
        .max()
        .unwrap_or(0);

    let mut lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let focused = i == form.focused;
            let marker = if focused { "▸ " } else { "  " };
            let label = Span::styled(
                format!("{}{:<width$} : ", marker, field.label, width = label_width),
                if focused {
                    Style::default()
                        .fg(theme.highlight)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(theme.foreground)
                },
            );
            let value = if field.value.is_empty() {
                Span::styled(field.hint, Style::default().fg(theme.muted))
            } else {
                Span::styled(field.value.clone(), Style::default().fg(theme.foreground))
            };
            let mut spans = vec![label, value];
            if focused {
                spans.push(Span::styled("█", Style::default().fg(theme.highlight)));
            }
            Line::from(spans)
        })
        .collect();

    let mut hints: Vec<Span> = Vec::new();
    for (key, action) in tab.actions() {
        hints.push(Span::styled(
            format!(" {} ", key),
            Style::default().fg(theme.background).bg(theme.title),
        ));
        hints.push(Span::styled(
            format!(" {}  ", action),
            Style::default().fg(theme.muted),
        ));
    }
    lines.push(Line::from(hints));

    let panel = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.highlight))
            .title(Line::styled(
                format!(" {} ", tab.name()),
                Style::default().fg(theme.title),
            )),
    );
    f.render_widget(panel, area);
}
