use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Terminal, backend::CrosstermBackend};

use super::app::{App, AppAction};
use super::rendering::ui;

pub async fn run_tui(mut app: App) -> Result<(), Box<dyn std::error::Error>> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    // Make sure an open preview does not leave its staged copy behind.
    app.preview.close();

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        app.clear_status_message_if_expired();

        terminal.draw(|f| ui(f, app))?;

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if handle_key(app, key.code).await == AppAction::Quit {
                        return Ok(());
                    }
                }
            }
        }
    }
}

async fn handle_key(app: &mut App, code: KeyCode) -> AppAction {
    match code {
        KeyCode::Esc => {
            // Cancellation routes to the preview first, then help, then quit.
            if app.preview.is_open() {
                app.preview.close();
            } else if app.show_help {
                app.toggle_help();
            } else {
                return AppAction::Quit;
            }
        }
        KeyCode::Char('q') => {
            if app.preview.is_open() {
                app.preview.close();
            } else {
                return AppAction::Quit;
            }
        }
        KeyCode::Char('h') => app.toggle_help(),
        KeyCode::Down | KeyCode::Char('j') => {
            if !app.preview.is_open() {
                app.next();
            }
        }
        KeyCode::Up | KeyCode::Char('k') => {
            if !app.preview.is_open() {
                app.previous();
            }
        }
        KeyCode::Enter => {
            if app.preview.is_open() {
                app.confirm_preview_download();
            } else if !app.pipeline.is_processing() {
                app.start_processing().await;
            }
        }
        KeyCode::Char('d') => {
            if !app.preview.is_open() && app.finished {
                app.download_all();
            }
        }
        KeyCode::Char('p') => {
            if !app.preview.is_open() {
                app.open_preview();
            }
        }
        KeyCode::Char('+') | KeyCode::Char('=') => app.preview.zoom_in(),
        KeyCode::Char('-') => app.preview.zoom_out(),
        KeyCode::Char('x') | KeyCode::Delete => {
            if !app.preview.is_open() && !app.pipeline.is_processing() {
                app.remove_selected();
            }
        }
        _ => {}
    }
    AppAction::Continue
}
