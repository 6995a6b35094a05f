//! Main UI rendering and coordination

use anyhow::Result;
use crossterm::{
    event::{self, Event},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::time::Duration;

use super::app::App;
use super::components::{InputDialog, LogsDialog, ProjectsList, StatusBar, TodosList};
use super::events::handle_events;
use super::layout::LayoutManager;
use crate::config::Config;
use crate::sync::SyncService;

/// Run the main TUI application
pub async fn run_app(sync_service: SyncService, config: &Config) -> Result<()> {
    // Terminal initialization
    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create application state
    let mut app = App::new();
    app.sidebar_width = config.ui.sidebar_width;

    // Initial snapshot in the background, then keep polling
    app.start_sync(&sync_service);
    sync_service.start_polling(&config.sync);

    // Main application loop
    let res = run_ui(&mut terminal, &mut app, &sync_service).await;

    app.shutdown();
    sync_service.stop_polling();

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

/// Main UI loop
async fn run_ui(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    app: &mut App,
    sync_service: &SyncService,
) -> Result<()> {
    let mut project_changes = sync_service.projects().subscribe();
    let mut todo_changes = sync_service.todos().subscribe();

    loop {
        terminal.draw(|f| render_ui(f, app, sync_service))?;

        // Handle events with a timeout to allow for async operations
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                handle_events(Event::Key(key), app, sync_service);
            }
        }

        // Re-read the collections whenever their views changed
        let projects_changed = project_changes.has_changed().unwrap_or(false);
        let todos_changed = todo_changes.has_changed().unwrap_or(false);
        if projects_changed || todos_changed {
            project_changes.mark_unchanged();
            todo_changes.mark_unchanged();
            app.reload(sync_service);
        }

        app.poll_background(sync_service).await;

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Main UI rendering function
fn render_ui(f: &mut ratatui::Frame, app: &App, sync_service: &SyncService) {
    // Calculate layouts
    let chunks = LayoutManager::main_layout(f.area());
    let top_chunks = LayoutManager::top_pane_layout(chunks[0], app.sidebar_width);

    // Render components
    ProjectsList::render(f, top_chunks[0], app);
    TodosList::render(f, top_chunks[1], app);
    StatusBar::render(
        f,
        chunks[1],
        app,
        sync_service.pending_count(),
        sync_service.failures().len(),
    );

    // Overlays
    InputDialog::render(f, app);
    if app.show_logs {
        LogsDialog::render(f, crate::logger::global());
    }
}
