use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::{error::Error, io, sync::Arc, time::Duration};

mod app;

use app::api::HttpTodoApi;
use app::config::Config;

// Start the app.
// The terminal handling follows the ratatui list example:
// https://github.com/ratatui-org/ratatui/blob/main/examples/list.rs
pub fn main() -> Result<(), Box<dyn Error>> {
    let config = Config::from_env()?;
    let _log_guard = app::logging::init(&config)?;
    tracing::info!(api_url = %config.api_url, "Starting todo client");

    // Network calls run here while the UI keeps the main thread
    let runtime = tokio::runtime::Runtime::new()?;
    let api = Arc::new(HttpTodoApi::new(&config.api_url)?);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create an app with 250 ms tick
    let tick_rate = Duration::from_millis(250);
    let app = app::ui::App::new(api, runtime.handle().clone());
    let res = app::ui::run_app(&mut terminal, app, tick_rate);

    // Restore previous terminal state after exit
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        tracing::error!(error = %err, "UI loop failed");
        println!("{err:?}");
    }

    // Requests still in flight are abandoned
    runtime.shutdown_background();
    Ok(())
}
