// Status bar component
//
// Uptime, key help and the most recent warning from the log buffer (the
// detail behind a failure notification lands there).

use crate::logging::LogLevel;
use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const KEY_HELP: &str = "←/→ tab │ Tab field │ ↑/↓ scroll │ Esc dismiss │ Ctrl-Q quit";

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let mut spans = vec![Span::styled(
        format!(" {} │ {}", app.uptime(), KEY_HELP),
        Style::default().fg(theme.status_bar),
    )];

    if let Some(entry) = app.log_buffer.latest(LogLevel::Warn) {
        let color = match entry.level {
            LogLevel::Error => theme.danger,
            _ => theme.warning,
        };
        spans.push(Span::styled(
            format!(
                " │ {} {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.message
            ),
            Style::default().fg(color),
        ));
    }

    let status = Paragraph::new(Line::from(spans)).block(Block::default().borders(Borders::TOP));
    f.render_widget(status, area);
}
