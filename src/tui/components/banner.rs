//! Notification banner overlay
//!
//! Draws the notifier's current message in the top-right corner, on top of
//! all other content, colored by severity. Dismissed notifications are not
//! drawn; the notifier owns the timing.

use crate::notify::Notification;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthStr;

/// Room for borders, padding and the close hint
const CHROME_WIDTH: u16 = 12;

pub fn render(f: &mut Frame, area: Rect, notification: &Notification, theme: &Theme) {
    if !notification.is_visible() {
        return;
    }

    let color = theme.severity(notification.severity);
    let max_width = area.width.saturating_sub(4).max(10);
    let width = (notification.message.width() as u16 + CHROME_WIDTH).min(max_width);
    let inner_width = width.saturating_sub(4).max(1);
    let lines = (notification.message.width() as u16).div_ceil(inner_width).max(1);
    let height = (lines + 2).min(area.height);

    let banner_area = Rect::new(
        area.right().saturating_sub(width + 1),
        area.y + 1,
        width,
        height,
    );

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(theme.border_type)
        .border_style(Style::default().fg(color))
        .title(Span::styled(
            format!(" {} ", notification.severity.as_str()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        ))
        .title_bottom(Line::from(" Esc ").right_aligned())
        .style(Style::default().bg(theme.background));

    let text = Paragraph::new(notification.message.as_str())
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.foreground))
        .block(block);

    f.render_widget(Clear, banner_area);
    f.render_widget(text, banner_area);
}
