//! coinview — paginated CoinGecko markets table in the terminal.
//!
//! Synchronous TUI event loop with a background worker thread for the
//! API calls. The loop sends fetch commands over an mpsc channel; the
//! worker runs them on its own tokio runtime and replies with results
//! tagged by the request sequence that issued them, so a superseded
//! response never overwrites a newer one.

use std::io;
use std::sync::{mpsc, Arc, Mutex};

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{debug, error, info};

use coinview::api::fetch_coins_markets;
use coinview::app::App;
use coinview::models::{MarketRecord, MarketsQuery};
use coinview::ui::{events::EventHandler, render};

/// The original front-end's retry hint, misspelling included.
const RETRY_HINT: &str = "Please wait and try aagin later";

/// Commands sent to the worker thread.
#[derive(Debug, Clone)]
enum AppCommand {
    /// Fetch one page of markets. `seq` identifies the request so the
    /// event loop can drop results superseded by a newer command.
    FetchMarkets { query: MarketsQuery, seq: u64 },
}

/// Results sent back by the worker thread.
#[derive(Debug)]
enum AppResult {
    MarketsLoaded {
        seq: u64,
        records: Vec<MarketRecord>,
    },

    FetchFailed {
        seq: u64,
        message: String,
    },
}

/// Initializes daily-rolling file logging.
///
/// The TUI owns stdout, so logs go to
/// `<data dir>/coinview/logs/coinview.log`; control the level with
/// `RUST_LOG` (default `coinview=debug,info`).
fn init_logging() -> Result<()> {
    use tracing_appender::rolling::{RollingFileAppender, Rotation};
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let log_dir = dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("coinview")
        .join("logs");
    std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let file_appender = RollingFileAppender::new(Rotation::DAILY, log_dir.clone(), "coinview.log");

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coinview=debug,info".into()),
        )
        .init();

    info!(?log_dir, "Logging initialized");
    Ok(())
}

fn main() -> Result<()> {
    init_logging().unwrap_or_else(|e| {
        eprintln!("Warning: failed to initialize logging: {}", e);
    });

    info!("coinview starting up");
    println!("Loading markets...");

    // First page before entering the alternate screen; a failure still
    // starts the UI, with an empty table and the notification queued.
    let runtime = tokio::runtime::Runtime::new()?;
    let query = MarketsQuery::default();
    let app = match runtime.block_on(fetch_coins_markets(&query)) {
        Ok(records) => {
            info!(records = records.len(), "Initial page loaded");
            App::with_records(records)
        }
        Err(e) => {
            error!(error = ?e, "Initial fetch failed");
            let mut app = App::new();
            app.notify(format!("{}. {}", e, RETRY_HINT));
            app
        }
    };

    debug!("Setting up terminal");
    let mut terminal = setup_terminal()?;

    let app = Arc::new(Mutex::new(app));
    let (command_tx, command_rx) = mpsc::channel::<AppCommand>();
    let (result_tx, result_rx) = mpsc::channel::<AppResult>();

    info!("Spawning background worker thread");
    spawn_background_worker(command_rx, result_tx);

    let events = EventHandler::new();

    info!("Starting event loop");
    let result = run(&mut terminal, app, &events, command_tx, result_rx);

    debug!("Restoring terminal");
    restore_terminal(&mut terminal)?;

    match &result {
        Ok(_) => info!("Application exited normally"),
        Err(e) => error!(error = ?e, "Application exited with error"),
    }

    result
}

/// Worker thread: receives fetch commands, runs them on its own tokio
/// runtime, sends tagged results back. Blocking here never blocks the
/// UI loop.
fn spawn_background_worker(
    command_rx: mpsc::Receiver<AppCommand>,
    result_tx: mpsc::Sender<AppResult>,
) {
    std::thread::spawn(move || {
        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                error!(error = ?e, "Failed to create worker runtime");
                return;
            }
        };

        while let Ok(command) = command_rx.recv() {
            info!(?command, "Worker received command");

            match command {
                AppCommand::FetchMarkets { query, seq } => {
                    let result = runtime.block_on(fetch_coins_markets(&query));

                    match result {
                        Ok(records) => {
                            info!(seq, records = records.len(), "Markets loaded");
                            let _ = result_tx.send(AppResult::MarketsLoaded { seq, records });
                        }
                        Err(e) => {
                            error!(seq, error = ?e, "Markets fetch failed");
                            let _ = result_tx.send(AppResult::FetchFailed {
                                seq,
                                message: format!("{}. {}", e, RETRY_HINT),
                            });
                        }
                    }
                }
            }
        }

        info!("Worker thread exiting (channel closed)");
    });
}

/// Main loop: settle worker results, render, handle input, tick.
fn run(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: Arc<Mutex<App>>,
    events: &EventHandler,
    command_tx: mpsc::Sender<AppCommand>,
    result_rx: mpsc::Receiver<AppResult>,
) -> Result<()> {
    loop {
        {
            let app_lock = app.lock().unwrap();
            if !app_lock.is_running() {
                break;
            }
        }

        // Settle worker results without blocking. `apply_*` drop any
        // result whose sequence was superseded in the meantime.
        match result_rx.try_recv() {
            Ok(AppResult::MarketsLoaded { seq, records }) => {
                let mut app_lock = app.lock().unwrap();
                app_lock.apply_records(seq, records);
            }
            Ok(AppResult::FetchFailed { seq, message }) => {
                let mut app_lock = app.lock().unwrap();
                app_lock.apply_fetch_error(seq, message);
            }
            Err(mpsc::TryRecvError::Empty) => {}
            Err(mpsc::TryRecvError::Disconnected) => {
                error!("Worker thread disconnected");
            }
        }

        {
            let app_clone = app.clone();
            terminal.draw(|frame| {
                let app_lock = app_clone.lock().unwrap();
                render(frame, &app_lock);
            })?;
        }

        if let Ok(event) = events.next() {
            let mut app_lock = app.lock().unwrap();
            handle_event(&mut app_lock, event, &command_tx);
        }

        {
            let mut app_lock = app.lock().unwrap();
            app_lock.tick();
        }
    }

    Ok(())
}

/// Sends the fetch command for a freshly issued sequence.
fn send_fetch(app: &App, seq: u64, command_tx: &mpsc::Sender<AppCommand>) {
    let _ = command_tx.send(AppCommand::FetchMarkets {
        query: app.query,
        seq,
    });
}

/// Maps an input event onto the application state. Every query control
/// issues exactly one fetch command.
fn handle_event(app: &mut App, event: coinview::ui::events::Event, command_tx: &mpsc::Sender<AppCommand>) {
    use coinview::ui::events::{
        is_currency_event, is_down_event, is_enter_event, is_escape_event, is_next_page_event,
        is_ordering_event, is_page_size_event, is_previous_page_event, is_quit_event,
        is_refresh_event, is_up_event, Event,
    };

    match event {
        Event::Key(_) if is_quit_event(&event) => {
            if app.is_awaiting_quit_confirmation() {
                info!("User confirmed quit");
                app.quit();
            } else {
                info!("User requested quit (awaiting confirmation)");
                app.request_quit();
            }
        }

        // Detail view: Enter confirms, Esc performs the same clearing.
        Event::Key(_) if (is_enter_event(&event) || is_escape_event(&event)) && app.is_on_detail() => {
            debug!("User closed detail view");
            app.close_detail();
        }

        Event::Key(_) if is_up_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            app.navigate_up();
        }
        Event::Key(_) if is_down_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            app.navigate_down();
        }

        Event::Key(_) if is_enter_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            if let Some(record) = app.selected_record() {
                info!(coin = %record.id, "User opened detail view");
            }
            app.open_detail();
        }

        Event::Key(_) if is_currency_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.toggle_currency();
            info!(currency = app.query.vs_currency.label(), seq, "User toggled currency");
            send_fetch(app, seq, command_tx);
        }

        Event::Key(_) if is_ordering_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.toggle_ordering();
            info!(order = app.query.order.api_value(), seq, "User toggled ordering");
            send_fetch(app, seq, command_tx);
        }

        Event::Key(_) if is_next_page_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.next_page();
            debug!(page = app.query.page, seq, "User moved to next page");
            send_fetch(app, seq, command_tx);
        }

        Event::Key(_) if is_previous_page_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.previous_page();
            debug!(page = app.query.page, seq, "User moved to previous page");
            send_fetch(app, seq, command_tx);
        }

        Event::Key(_) if is_page_size_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.cycle_page_size();
            debug!(per_page = app.query.per_page, seq, "User changed page size");
            send_fetch(app, seq, command_tx);
        }

        Event::Key(_) if is_refresh_event(&event) && app.is_on_table() => {
            app.cancel_quit();
            let seq = app.refresh();
            debug!(seq, "User requested refresh");
            send_fetch(app, seq, command_tx);
        }

        Event::Tick => {}

        Event::Key(_) => {
            app.cancel_quit();
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<io::Stdout>>> {
    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend).map_err(|e| e.into())
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>) -> Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;
    Ok(())
}
