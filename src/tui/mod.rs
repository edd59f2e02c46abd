// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard and mouse input, timer ticks)
// - Rendering the UI
//
// Console operations run as background tasks. Their results land in the
// shared surface and notifier, which the next frame picks up.

pub mod app;
pub mod components;
pub mod form;
pub mod input;
pub mod theme;
pub mod views;

use crate::console::Console;
use crate::controller::MemorySurface;
use crate::logging::LogBuffer;
use anyhow::{Context, Result};
use app::{App, Trigger};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;

/// Rows moved by PageUp/PageDown
const PAGE: i32 = 10;

/// Run the TUI
///
/// Sets up the terminal, loads the startup regions, runs the event loop
/// and restores the terminal when done.
pub async fn run_tui(
    console: Console,
    surface: MemorySurface,
    log_buffer: LogBuffer,
    backend_label: String,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let mut app = App::new(console, surface, log_buffer, backend_label);
    // Startup loads are fire-and-forget; failures surface as notifications
    app.console.start();

    let result = run_event_loop(&mut terminal, &mut app).await;

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Redraws on every input event and on a 200ms tick, so background results
/// and banner dismissals show up without a keypress.
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| views::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    match event::read() {
                        Ok(Event::Key(key_event)) => handle_key_event(app, key_event),
                        Ok(Event::Mouse(mouse_event)) => handle_mouse_event(app, mouse_event),
                        _ => {}
                    }
                }
            } => {}

            _ = tick_interval.tick() => {}
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Global → Navigation/actions → Form editing
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    let key = key_event.code;

    match key_event.kind {
        KeyEventKind::Press | KeyEventKind::Repeat => {
            if handle_global_keys(app, &key_event) {
                return;
            }
            if handle_action_keys(app, key) {
                return;
            }
            handle_form_keys(app, &key_event);
        }
        KeyEventKind::Release => {
            app.handle_key_release(key);
        }
    }
}

/// Quit and field clearing; these use Ctrl so plain letters stay typeable
fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    if !key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return false;
    }
    match key_event.code {
        KeyCode::Char('c') | KeyCode::Char('q') => {
            app.should_quit = true;
            true
        }
        KeyCode::Char('u') => {
            if let Some(form) = app.form_mut() {
                form.clear_focused();
            }
            true
        }
        _ => false,
    }
}

/// Keys routed through the InputHandler (debounced or repeating)
fn handle_action_keys(app: &mut App, key: KeyCode) -> bool {
    let trigger = match key {
        KeyCode::Enter => Some(Trigger::Primary),
        KeyCode::F(n @ 2..=4) => Some(Trigger::Secondary(n)),
        KeyCode::F(5) => Some(Trigger::Reload),
        KeyCode::Esc
        | KeyCode::Left
        | KeyCode::Right
        | KeyCode::Tab
        | KeyCode::BackTab
        | KeyCode::Up
        | KeyCode::Down
        | KeyCode::PageUp
        | KeyCode::PageDown => None,
        _ => return false,
    };

    if !app.handle_key_press(key) {
        return true;
    }

    if let Some(trigger) = trigger {
        app.trigger(trigger);
        return true;
    }

    match key {
        KeyCode::Esc => app.notifier().dismiss(),
        KeyCode::Left => app.set_tab(app.tab.prev()),
        KeyCode::Right => app.set_tab(app.tab.next()),
        KeyCode::Tab => {
            if let Some(form) = app.form_mut() {
                form.focus_next();
            }
        }
        KeyCode::BackTab => {
            if let Some(form) = app.form_mut() {
                form.focus_prev();
            }
        }
        KeyCode::Up => app.scroll_by(-1),
        KeyCode::Down => app.scroll_by(1),
        KeyCode::PageUp => app.scroll_by(-PAGE),
        KeyCode::PageDown => app.scroll_by(PAGE),
        _ => {}
    }
    true
}

/// Typing goes straight to the focused field, no debounce
fn handle_form_keys(app: &mut App, key_event: &KeyEvent) {
    let Some(form) = app.form_mut() else {
        return;
    };
    match key_event.code {
        KeyCode::Char(c) => form.push_char(c),
        KeyCode::Backspace => form.backspace(),
        _ => {}
    }
}

/// Handle mouse input
fn handle_mouse_event(app: &mut App, mouse_event: MouseEvent) {
    match mouse_event.kind {
        MouseEventKind::ScrollUp => app.scroll_by(-1),
        MouseEventKind::ScrollDown => app.scroll_by(1),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockBackend;
    use crate::controller::{Controller, WritePolicy};
    use crate::notify::{Notifier, Severity};
    use crate::tui::app::Tab;
    use std::sync::Arc;

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

    fn press(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
        handle_key_event(app, KeyEvent::new(code, modifiers));
        let mut release = KeyEvent::new(code, modifiers);
        release.kind = KeyEventKind::Release;
        handle_key_event(app, release);
    }

    #[tokio::test]
    async fn test_letters_are_typed_not_commands() {
        let mut app = app();
        for c in "quit".chars() {
            press(&mut app, KeyCode::Char(c), KeyModifiers::NONE);
        }
        assert!(!app.should_quit);
        assert_eq!(app.form().value(0), "quit");

        press(&mut app, KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(app.form().value(0), "qui");

        press(&mut app, KeyCode::Char('u'), KeyModifiers::CONTROL);
        assert_eq!(app.form().value(0), "");

        press(&mut app, KeyCode::Char('q'), KeyModifiers::CONTROL);
        assert!(app.should_quit);
    }

    #[tokio::test]
    async fn test_navigation_keys() {
        let mut app = app();
        press(&mut app, KeyCode::Right, KeyModifiers::NONE);
        assert_eq!(app.tab, Tab::Search);
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        press(&mut app, KeyCode::Left, KeyModifiers::NONE);
        assert_eq!(app.tab, Tab::AuditLog);

        app.set_tab(Tab::Mappings);
        press(&mut app, KeyCode::Tab, KeyModifiers::NONE);
        assert_eq!(app.form().focused, 1);
        press(&mut app, KeyCode::BackTab, KeyModifiers::NONE);
        assert_eq!(app.form().focused, 0);
    }

    #[tokio::test]
    async fn test_esc_dismisses_banner() {
        let mut app = app();
        app.notifier().notify("Search completed", Severity::Info);
        assert!(app.notifier().visible().is_some());
        press(&mut app, KeyCode::Esc, KeyModifiers::NONE);
        assert!(app.notifier().visible().is_none());
    }
}
