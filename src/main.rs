//! fkm - Fedora Kernel Manager

mod app;
mod commands;
mod config;
mod constants;
mod headless;
mod system;
mod ui;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use app::App;
use commands::CommandMessage;
use config::AppConfig;
use headless::Query;

/// Fedora Kernel Manager
#[derive(Parser)]
#[command(name = "fkm")]
#[command(author, version)]
#[command(about = "Fedora Kernel Manager - TUI for kernel packages, GRUB entries and rescue kernels")]
struct Cli {
    /// Configuration file (default: ~/.config/fkm/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List installed kernel packages
    Kernels {
        /// Print JSON instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// List GRUB boot entries
    BootEntries {
        #[arg(long)]
        json: bool,
    },
    /// List rescue files that do not belong to the running kernel
    Rescue {
        #[arg(long)]
        json: bool,
    },
    /// Show the dnf install-only limit
    Limit {
        #[arg(long)]
        json: bool,
    },
    /// Print the effective configuration
    Config,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Set up logging to file
    let log_dir = constants::fkm_data_dir();
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, constants::TRACE_LOG_FILE);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!("fkm {} starting", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref());

    match cli.command {
        None => run_tui(&config).await,
        Some(Commands::Kernels { json }) => headless::run(Query::Kernels, json, &config).await,
        Some(Commands::BootEntries { json }) => {
            headless::run(Query::BootEntries, json, &config).await
        }
        Some(Commands::Rescue { json }) => headless::run(Query::Rescue, json, &config).await,
        Some(Commands::Limit { json }) => headless::run(Query::Limit, json, &config).await,
        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
            Ok(())
        }
    }
}

async fn run_tui(config: &AppConfig) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Create command channel and app state
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<CommandMessage>(constants::COMMAND_CHANNEL_SIZE);
    let mut app = App::new(config, cmd_tx);

    // Run the app
    let result = run_app(&mut terminal, &mut app, &mut cmd_rx).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    // Print log path
    if let Some(path) = &app.screen_log_path {
        println!("Screen log: {}", path.display());
    }

    if let Err(err) = result {
        eprintln!("Error: {err:?}");
        return Err(err);
    }

    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    cmd_rx: &mut mpsc::Receiver<CommandMessage>,
) -> Result<()> {
    app.start_initial_command();

    // Create async event stream for responsive input
    let mut event_stream = EventStream::new();

    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        let timeout = Duration::from_millis(constants::EVENT_POLL_TIMEOUT_MS);

        tokio::select! {
            biased;  // Prioritize in order: keys, commands, timeout

            // Terminal key events (instant response)
            Some(Ok(event)) = event_stream.next() => {
                if let Event::Key(key) = event {
                    if key.kind == KeyEventKind::Press {
                        app.handle_key(key.code);
                    }
                }
            }
            // Finished commands from worker tasks
            Some(msg) = cmd_rx.recv() => {
                app.handle_command_message(msg);
            }
            // Timeout for spinner animation and redraw
            _ = tokio::time::sleep(timeout) => {}
        }

        // Update spinner animation
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
