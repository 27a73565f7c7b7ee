use clap::Parser;
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use pgnav::{
    async_task::{self, Task, TaskResult},
    cli::{Cli, Commands},
    config::Config,
    error::{PgnavError, Result},
    event, main_lib, ui,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{io, path::Path, sync::Arc, time::Duration};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

/// Environment variable naming the log file for interactive runs
const LOG_ENV: &str = "PGNAV_LOG";

fn init_logging(verbose: bool) -> Result<()> {
    // The TUI owns the terminal, so interactive logging only goes to a file
    if let Ok(log_file) = std::env::var(LOG_ENV) {
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .map_err(|e| PgnavError::Config(format!("cannot open log file {}: {}", log_file, e)))?;
        env_logger::Builder::new()
            .target(env_logger::Target::Pipe(Box::new(file)))
            .filter_level(if verbose {
                log::LevelFilter::Trace
            } else {
                log::LevelFilter::Debug
            })
            .init();
        log::info!("pgnav starting up");
    } else if verbose {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Debug)
            .init();
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;
    let config = Config::load(cli.config.as_deref())?;

    match cli.command.unwrap_or(Commands::Run {
        catalog: None,
        json: None,
    }) {
        Commands::Run { catalog, json } => {
            run_interactive(config, catalog.as_deref(), json.as_deref()).await
        }
        Commands::Screenshot {
            catalog,
            json,
            script,
            output,
            width,
            height,
        } => {
            let screen =
                main_lib::run_screenshot(config, &catalog, json.as_deref(), &script, width, height)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, screen)?;
                    println!("Screenshot saved to: {}", path.display());
                }
                None => print!("{}", screen),
            }
            Ok(())
        }
        Commands::Filter { catalog, query } => main_lib::run_filter(&catalog, &query),
    }
}

async fn run_interactive(config: Config, catalog: Option<&Path>, json: Option<&Path>) -> Result<()> {
    let loader = Arc::new(main_lib::open_catalog(catalog)?);
    let mut app = main_lib::build_app(config, catalog, json)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Setup async task channels
    let (task_sender, task_receiver) = mpsc::channel::<Task>(32);
    let (result_sender, mut result_receiver) = mpsc::channel::<TaskResult>(32);

    // Start background worker
    let cancellation_token = CancellationToken::new();
    let worker_handle = tokio::spawn(async_task::run_worker(
        task_receiver,
        result_sender,
        loader,
        cancellation_token.clone(),
    ));

    // Root listing
    event::dispatch_tasks(&mut app, &task_sender);

    // Main application loop
    let tick_rate = Duration::from_millis(250);
    let mut needs_redraw = true;
    loop {
        if needs_redraw {
            terminal.draw(|f| ui::draw(f, &mut app))?;
            needs_redraw = false;
        }

        if crossterm::event::poll(tick_rate)? {
            let event = crossterm::event::read()?;
            match event::handle_event(event, &mut app, &task_sender) {
                Ok(changed) => needs_redraw |= changed,
                Err(e) => {
                    app.status_message = format!("Error handling event: {}", e);
                    needs_redraw = true;
                }
            }
        }

        // Handle async task results
        while let Ok(result) = result_receiver.try_recv() {
            app.handle_task_result(result);
            needs_redraw = true;
        }
        // Installing children can trigger follow-up effects
        if event::dispatch_tasks(&mut app, &task_sender) > 0 {
            needs_redraw = true;
        }

        if app.should_quit {
            break;
        }
    }

    // Cleanup
    cancellation_token.cancel();
    if tokio::time::timeout(Duration::from_secs(1), worker_handle).await.is_err() {
        log::warn!("main: worker did not stop in time");
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    Ok(())
}
