// Title bar component
//
// App name, backend in use and the tab strip.

use crate::tui::app::{App, Tab};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        " 🔑 Access Console ",
        Style::default().fg(theme.title).add_modifier(Modifier::BOLD),
    )];

    for tab in Tab::ALL {
        let style = if tab == app.tab {
            Style::default()
                .fg(theme.background)
                .bg(theme.highlight)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.foreground)
        };
        spans.push(Span::raw(" "));
        spans.push(Span::styled(format!(" {} ", tab.name()), style));
    }

    let title = Paragraph::new(Line::from(spans)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(theme.border_type)
            .border_style(Style::default().fg(theme.title))
            .title_top(Line::from(format!(" {} ", app.backend_label)).right_aligned()),
    );

    f.render_widget(title, area);
}
