// Views module - lays out one frame
//
// Shell: title bar on top, status bar at the bottom. The content slot holds
// the current tab's form followed by its regions, split evenly. The
// notification banner is drawn last so it sits above everything.

use super::app::App;
use super::components::{banner, form_panel, region_panel, status_bar, title_bar};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    widgets::Block,
    Frame,
};

pub fn draw(f: &mut Frame, app: &App) {
    let bg_block = Block::default().style(Style::default().bg(app.theme.background));
    f.render_widget(bg_block, f.area());

    let form = app.form();
    let form_height = if form.is_empty() {
        0
    } else {
        form_panel::height(form)
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(form_height),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(f.area());

    title_bar::render(f, chunks[0], app);
    if !form.is_empty() {
        form_panel::render(f, chunks[1], app.tab, form, &app.theme);
    }

    let regions = app.tab.regions();
    let region_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Ratio(1, regions.len().max(1) as u32);
            regions.len()
        ])
        .split(chunks[2]);
    for (region, area) in regions.iter().zip(region_areas.iter()) {
        let view = app.surface.get(*region);
        region_panel::render(
            f,
            *area,
            *region,
            view.as_ref(),
            app.scroll_offset(*region),
            &app.theme,
        );
    }

    status_bar::render(f, chunks[3], app);

    if let Some(notification) = app.notifier().visible() {
        banner::render(f, f.area(), &notification, &app.theme);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::console::Console;
    use crate::controller::{Controller, MemorySurface, WritePolicy};
    use crate::logging::LogBuffer;
    use crate::notify::{Notifier, Severity};
    use crate::tui::app::Tab;
    use ratatui::{backend::TestBackend, Terminal};
    use std::sync::Arc;

    fn screen(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer
            .content()
            .chunks(buffer.area.width as usize)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn app() -> App {
        let surface = MemorySurface::new();
        let controller = Controller::new(
            Arc::new(MockBackend::new()),
            Arc::new(surface.clone()),
            Notifier::default(),
            WritePolicy::default(),
        );
        App::new(Console::new(controller), surface, LogBuffer::new(), "mock")
    }

    #[tokio::test]
    async fn test_draws_tab_form_and_regions() {
        let mut app = app();
        app.set_tab(Tab::Repos);
        let screen = screen(&app);
        assert!(screen.contains("Access Console"));
        assert!(screen.contains("Repositories"));
        assert!(screen.contains("Authenticated User"));
        assert!(screen.contains("Username"));
    }

    #[tokio::test]
    async fn test_banner_shows_visible_notification() {
        let app = app();
        app.notifier().notify("Mapping added successfully!", Severity::Success);
        assert!(screen(&app).contains("Mapping added successfully!"));

        app.notifier().dismiss();
        assert!(!screen(&app).contains("Mapping added successfully!"));
    }
}
