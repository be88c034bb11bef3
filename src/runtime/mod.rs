use std::env;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::library::Library;
use crate::logging;

mod event_loop;
mod settings;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = settings::CliArgs::parse(env::args().skip(1));
    let settings = settings::resolve_settings(&cli);

    if cli.print_config {
        print!("{}", settings.to_toml()?);
        return Ok(());
    }

    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("audioshelf: logging disabled: {e}");
    }
    tracing::info!(root = %settings.library.root.display(), "starting");

    let library = Library::new(settings.library.clone());
    let mut app = App::new(library, settings.ui.sort_entries);
    app.refresh();

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result: Result<(), Box<dyn std::error::Error>> = (|| {
        let mut state = event_loop::EventLoopState::new();
        event_loop::run(&mut terminal, &settings, &mut app, &mut state)
    })();

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    tracing::info!("exiting");
    run_result
}
