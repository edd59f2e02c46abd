//! Region panel: draws one [`View`] from the surface
//!
//! Tables become a ratatui `Table` with columns sized to their content,
//! placeholders a dimmed line, and diagnostic text a scrollable paragraph.
//! A region that was never written shows a short hint instead.

use crate::controller::Region;
use crate::render::{Cell as ViewCell, Table as ViewTable, View};
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Constraint, Rect},
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Widest a single column may grow before it is truncated
const MAX_COLUMN_WIDTH: usize = 48;

pub fn render(
    f: &mut Frame,
    area: Rect,
    region: Region,
    view: Option<&View>,
    scroll: u16,
    theme: &Theme,
) {
    let title = match view {
        Some(v) if v.is_table() => format!(" {} ({}) ", region.title(), v.row_count()),
        _ => format!(" {} ", region.title()),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(theme.border))
        .title(Line::styled(title, Style::default().fg(theme.title)));

    match view {
        None => {
            let hint = Paragraph::new("Nothing loaded yet.")
                .style(Style::default().fg(theme.muted))
                .block(block);
            f.render_widget(hint, area);
        }
        Some(View::Placeholder(message)) => {
            let placeholder = Paragraph::new(message.as_str())
                .style(
                    Style::default()
                        .fg(theme.muted)
                        .add_modifier(Modifier::ITALIC),
                )
                .block(block);
            f.render_widget(placeholder, area);
        }
        Some(View::Text(text)) => {
            let paragraph = Paragraph::new(text.as_str())
                .style(Style::default().fg(theme.foreground))
                .wrap(Wrap { trim: false })
                .scroll((scroll, 0))
                .block(block);
            f.render_widget(paragraph, area);
        }
        Some(View::Table(table)) => render_table(f, area, table, scroll, block, theme),
    }
}

fn render_table(
    f: &mut Frame,
    area: Rect,
    table: &ViewTable,
    scroll: u16,
    block: Block,
    theme: &Theme,
) {
    let widths: Vec<Constraint> = column_widths(table)
        .into_iter()
        .map(|w| Constraint::Length(w as u16))
        .collect();

    let header = Row::new(table.headers.iter().map(|h| Cell::from(h.as_str())))
        .style(
            Style::default()
                .fg(theme.highlight)
                .add_modifier(Modifier::BOLD),
        )
        .bottom_margin(0);

    let rows = table
        .rows
        .iter()
        .skip(scroll as usize)
        .enumerate()
        .map(|(i, row)| {
            let style = if i % 2 == 1 {
                Style::default().bg(theme.selection)
            } else {
                Style::default()
            };
            Row::new(row.iter().map(|cell| Cell::from(cell_text(cell)))).style(style)
        });

    let widget = Table::new(rows, widths)
        .header(header)
        .column_spacing(2)
        .style(Style::default().fg(theme.foreground))
        .block(block);
    f.render_widget(widget, area);
}

/// Terminal text for a cell; images show their alt text
fn cell_text(cell: &ViewCell) -> String {
    match cell {
        ViewCell::Text(text) => text.clone(),
        ViewCell::Image { alt, .. } => format!("◉ {}", alt),
    }
}

/// Display width of each column: widest of header and cells, capped
fn column_widths(table: &ViewTable) -> Vec<usize> {
    let mut widths: Vec<usize> = table.headers.iter().map(|h| h.width()).collect();
    for row in &table.rows {
        for (i, cell) in row.iter().enumerate() {
            if let Some(w) = widths.get_mut(i) {
                *w = (*w).max(cell_text(cell).width());
            }
        }
    }
    widths
        .into_iter()
        .map(|w| w.min(MAX_COLUMN_WIDTH))
        .collect()
}
