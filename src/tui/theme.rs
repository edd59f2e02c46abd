// Colors for the console TUI
//
// One palette (One Half Dark). Severity colors match the banner styles of
// the web dashboard: success green, info cyan, warning yellow, danger red.

use crate::notify::Severity;
use ratatui::style::Color;
use ratatui::widgets::BorderType;

#[derive(Debug, Clone)]
pub struct Theme {
    pub title: Color,
    pub border: Color,
    pub highlight: Color,
    pub status_bar: Color,
    pub background: Color,
    pub foreground: Color,
    pub muted: Color,
    pub selection: Color,
    pub success: Color,
    pub info: Color,
    pub warning: Color,
    pub danger: Color,
    pub border_type: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            title: Color::Rgb(86, 182, 194),
            border: Color::Rgb(220, 223, 228),
            highlight: Color::Rgb(229, 192, 123),
            status_bar: Color::Rgb(220, 223, 228),
            background: Color::Rgb(40, 44, 52),
            foreground: Color::Rgb(220, 223, 228),
            muted: Color::Rgb(127, 132, 142),
            selection: Color::Rgb(71, 78, 93),
            success: Color::Rgb(152, 195, 121),
            info: Color::Rgb(86, 182, 194),
            warning: Color::Rgb(229, 192, 123),
            danger: Color::Rgb(224, 108, 117),
            border_type: BorderType::Rounded,
        }
    }
}

impl Theme {
    pub fn severity(&self, severity: Severity) -> Color {
        match severity {
            Severity::Success => self.success,
            Severity::Info => self.info,
            Severity::Warning => self.warning,
            Severity::Danger => self.danger,
        }
    }
}
