use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::{App, Focus};
use crate::config;
use crate::ui;

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
}

impl EventLoopState {
    pub fn new() -> Self {
        Self { pending_gg: false }
    }
}

/// Main terminal event loop: handles input and UI drawing.
/// Returns `Ok(())` when shutdown is requested.
pub fn run(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        let display = app.display_indices();
        terminal.draw(|f| ui::draw(f, app, &display, &settings.ui))?;

        if event::poll(Duration::from_millis(250))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, app, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Apply one key press to `app`. Returns `true` when the user asked to quit.
pub fn handle_key_event(key: KeyEvent, app: &mut App, state: &mut EventLoopState) -> bool {
    if app.prompt.is_some() {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.cancel_prompt(),
            KeyCode::Enter => app.submit_prompt(),
            KeyCode::Tab | KeyCode::BackTab => app.prompt_next_field(),
            KeyCode::Backspace => app.prompt_pop_char(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.prompt_push_char(c);
                }
            }
            _ => {}
        }
        return false;
    }

    if app.filter_mode {
        state.pending_gg = false;
        match key.code {
            KeyCode::Esc => app.clear_filter(),
            KeyCode::Backspace => app.pop_filter_char(),
            KeyCode::Char('j') | KeyCode::Char('n')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.next();
            }
            KeyCode::Char('k') | KeyCode::Char('p')
                if key.modifiers.contains(KeyModifiers::CONTROL) =>
            {
                app.prev();
            }
            KeyCode::Down => app.next(),
            KeyCode::Up => app.prev(),
            KeyCode::Char(c) => {
                if !c.is_control() {
                    app.push_filter_char(c);
                }
            }
            KeyCode::Enter => app.exit_filter_mode(),
            _ => {}
        }
        return false;
    }

    match key.code {
        KeyCode::Char('q') => {
            state.pending_gg = false;
            return true;
        }
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            return true;
        }
        KeyCode::Char('g') => {
            if state.pending_gg {
                state.pending_gg = false;
                app.first();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => {
            state.pending_gg = false;
            app.last();
        }
        KeyCode::Char('j') | KeyCode::Down => {
            state.pending_gg = false;
            app.next();
        }
        KeyCode::Char('k') | KeyCode::Up => {
            state.pending_gg = false;
            app.prev();
        }
        KeyCode::Tab | KeyCode::BackTab => {
            state.pending_gg = false;
            app.toggle_focus();
        }
        KeyCode::Char('h') | KeyCode::Left => {
            state.pending_gg = false;
            app.focus = Focus::Categories;
        }
        KeyCode::Char('l') | KeyCode::Right => {
            state.pending_gg = false;
            app.focus = Focus::Files;
        }
        KeyCode::Enter => {
            state.pending_gg = false;
            match app.focus {
                Focus::Categories => app.focus = Focus::Files,
                Focus::Files => app.download_selected(),
            }
        }
        KeyCode::Char('d') => {
            state.pending_gg = false;
            app.download_selected();
        }
        KeyCode::Char('u') => {
            state.pending_gg = false;
            app.open_upload_prompt();
        }
        KeyCode::Char('n') => {
            state.pending_gg = false;
            app.open_new_category_prompt();
        }
        KeyCode::Char('/') => {
            state.pending_gg = false;
            app.enter_filter_mode();
        }
        KeyCode::Char('K') => {
            state.pending_gg = false;
            app.toggle_metadata_window();
        }
        KeyCode::Char('r') => {
            state.pending_gg = false;
            app.refresh();
            app.set_info("Refreshed");
        }
        KeyCode::Esc => {
            state.pending_gg = false;
            app.metadata_view = None;
            app.status = None;
        }
        KeyCode::Char(_) => {
            // g pending should clear on any other printable char
            state.pending_gg = false;
        }
        _ => {}
    }

    false
}
