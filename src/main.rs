// main.rs

mod app;
mod pipeline;
mod store;
mod task;
mod tui;

use crate::app::App;
use crate::store::{TaskStore, data_dir};
use crossterm::{
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};
use std::fs::OpenOptions;
use std::io::{self};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// The terminal owns stdout, so log records go to a file next to the data.
fn init_logging() {
    let path = data_dir().join("taskhub.log");
    match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => {
            tracing_subscriber::fmt()
                .with_env_filter(
                    EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()),
                )
                .with_writer(Arc::new(file))
                .with_ansi(false)
                .init();
        }
        Err(e) => eprintln!("Failed to open log file {}: {}", path.display(), e),
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Load persisted tasks or start fresh
    let mut app = App::new(TaskStore::new(TaskStore::default_path()));

    // Run the TUI event loop (blocks until exit)
    let res = tui::run_app(&mut terminal, &mut app);

    // Restore terminal state
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Handle errors from the event loop if any
    if let Err(err) = res {
        eprintln!("Application error: {}", err);
    }

    Ok(())
}
