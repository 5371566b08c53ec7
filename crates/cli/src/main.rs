//! searchbar: drive the incremental search controller from a terminal.
//!
//! Each stdin line replaces the query, as if it had been typed; lines starting
//! with `:` are key presses (`:down`, `:enter`, `:esc`, ...). Every snapshot the
//! controller publishes is printed to stdout.

mod input;
mod render;

use clap::Parser;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};

use input::{parse_input, Input};
use searchbar_core::{
    load_config, load_config_file, CachedProvider, ConfigError, ControllerOptions, Direction,
    SearchConfig, SearchController, SearchError, SearchHandle, SearchProvider, Transport,
};
use searchbar_http::HttpProvider;

// ---------------------------------------------------------------------------
// CLI definition (clap derive)
// ---------------------------------------------------------------------------

/// Debounced article search with popular-search suggestions, driven from stdin.
#[derive(Parser)]
#[command(name = "searchbar", version, about, long_about = None)]
struct Cli {
    /// Backend base URL, e.g. http://localhost:3000
    #[arg(long)]
    endpoint: Option<String>,

    /// Wire protocol: rest or graphql
    #[arg(long)]
    transport: Option<Transport>,

    /// Debounce delay in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Config file (default: ./.searchbar.toml if present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Disable the in-memory response cache
    #[arg(long)]
    no_cache: bool,

    /// Print snapshots as JSON lines instead of text
    #[arg(long)]
    json: bool,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied.
    fn resolve_config(&self) -> Result<SearchConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config_file(path)?,
            None => {
                let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
                    path: ".".to_string(),
                    source,
                })?;
                load_config(&cwd)?
            }
        };
        if let Some(endpoint) = &self.endpoint {
            config.endpoint = endpoint.clone();
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(ms) = self.debounce_ms {
            config.debounce_ms = ms;
        }
        if self.no_cache {
            config.cache = false;
        }
        config.validate()?;
        Ok(config)
    }
}

// ---------------------------------------------------------------------------
// Graceful shutdown signal
// ---------------------------------------------------------------------------

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();

    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received SIGINT, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to register SIGTERM handler");
                let _ = ctrl_c.await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = ctrl_c.await;
        info!("Received Ctrl+C, shutting down...");
    }
}

// ---------------------------------------------------------------------------
// Session
// ---------------------------------------------------------------------------

fn apply(handle: &SearchHandle, input: Input) -> Result<(), SearchError> {
    match input {
        Input::Query(text) => handle.set_query(text),
        Input::Down => handle.move_selection(Direction::Down),
        Input::Up => handle.move_selection(Direction::Up),
        Input::Enter => handle.confirm_selection(),
        Input::Escape => handle.dismiss(),
        Input::Blur => handle.blur(),
        Input::Focus => handle.focus(),
        Input::Pick(title) => handle.select_by_pointer(title),
        Input::Clear => handle.clear(),
        Input::Refresh => handle.refresh_popular(),
        Input::Quit => handle.close(),
    }
}

/// Feed stdin into a controller until EOF, `:quit`, or a shutdown signal.
/// Returns the process exit code.
async fn run<P: SearchProvider>(provider: P, options: ControllerOptions, json: bool) -> i32 {
    let handle = SearchController::spawn(provider, options);

    let mut snapshots = handle.subscribe();
    let printer = tokio::spawn(async move {
        while snapshots.changed().await.is_ok() {
            let snapshot = snapshots.borrow_and_update().clone();
            println!("{}", render::render(&snapshot, json));
        }
    });

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut status = 0;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let line = match line {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        error!(error = %e, "Failed to read stdin");
                        status = 1;
                        break;
                    }
                };
                let input = match parse_input(&line) {
                    Ok(input) => input,
                    Err(message) => {
                        warn!("{message}");
                        continue;
                    }
                };
                let quit = input == Input::Quit;
                if let Err(e) = apply(&handle, input) {
                    error!(error = %e, "Controller stopped unexpectedly");
                    status = 1;
                    break;
                }
                if quit {
                    break;
                }
            }
            _ = &mut shutdown => break,
        }
    }

    let _ = handle.close();
    drop(handle);
    if let Err(e) = printer.await {
        error!(error = %e, "Snapshot printer failed");
    }
    status
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("searchbar=info".parse().unwrap()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = cli.resolve_config().unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });
    let provider = HttpProvider::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Error: {e}");
        std::process::exit(1);
    });

    let options = ControllerOptions::from(&config);
    let code = if config.cache {
        run(CachedProvider::new(provider), options, cli.json).await
    } else {
        run(provider, options, cli.json).await
    };
    // Exit directly: the stdin reader may still be parked on a blocking read.
    std::process::exit(code);
}
