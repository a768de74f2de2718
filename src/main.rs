//! clipvault - An Ephemeral Shared Clipboard over HTTP
//!
//! This is the main entry point for the clipvault server.
//! It parses configuration, sets up the store and the background expiry
//! sweeper, and serves the HTTP surface until shutdown.

use clipvault::http::{build_router, AppState};
use clipvault::storage::{ClipboardStore, ExpirySweeper, SweeperConfig, DEFAULT_WINDOW};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// Server configuration
struct Config {
    /// Host to bind to
    host: String,
    /// Port to listen on
    port: u16,
    /// Inactivity window after which an unread clip is evicted
    window: Duration,
    /// Interval between background eviction sweeps
    sweep_interval: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: clipvault::DEFAULT_HOST.to_string(),
            // The PORT environment variable is honored unless --port is given
            port: std::env::var("PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(clipvault::DEFAULT_PORT),
            window: DEFAULT_WINDOW,
            sweep_interval: Duration::from_secs(1),
        }
    }
}

impl Config {
    /// Parse configuration from command-line arguments
    fn from_args() -> Self {
        let mut config = Config::default();
        let args: Vec<String> = std::env::args().collect();

        let mut i = 1;
        while i < args.len() {
            match args[i].as_str() {
                "--host" | "-h" => {
                    if i + 1 < args.len() {
                        config.host = args[i + 1].clone();
                        i += 2;
                    } else {
                        eprintln!("Error: --host requires a value");
                        std::process::exit(1);
                    }
                }
                "--port" | "-p" => {
                    if i + 1 < args.len() {
                        config.port = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid port number");
                            std::process::exit(1);
                        });
                        i += 2;
                    } else {
                        eprintln!("Error: --port requires a value");
                        std::process::exit(1);
                    }
                }
                "--window-secs" | "-w" => {
                    if i + 1 < args.len() {
                        let secs: u64 = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid window length");
                            std::process::exit(1);
                        });
                        config.window = Duration::from_secs(secs);
                        i += 2;
                    } else {
                        eprintln!("Error: --window-secs requires a value");
                        std::process::exit(1);
                    }
                }
                "--sweep-interval-secs" => {
                    if i + 1 < args.len() {
                        let secs: u64 = args[i + 1].parse().unwrap_or_else(|_| {
                            eprintln!("Error: invalid sweep interval");
                            std::process::exit(1);
                        });
                        config.sweep_interval = Duration::from_secs(secs);
                        i += 2;
                    } else {
                        eprintln!("Error: --sweep-interval-secs requires a value");
                        std::process::exit(1);
                    }
                }
                "--help" => {
                    print_help();
                    std::process::exit(0);
                }
                "--version" | "-v" => {
                    println!("clipvault version {}", clipvault::VERSION);
                    std::process::exit(0);
                }
                _ => {
                    eprintln!("Unknown argument: {}", args[i]);
                    print_help();
                    std::process::exit(1);
                }
            }
        }

        config
    }

    /// Returns the bind address as a string
    fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn print_help() {
    println!(
        r#"
clipvault - An Ephemeral Shared Clipboard over HTTP

USAGE:
    clipvault [OPTIONS]

OPTIONS:
    -h, --host <HOST>                Host to bind to (default: 127.0.0.1)
    -p, --port <PORT>                Port to listen on (default: $PORT or 5050)
    -w, --window-secs <SECS>         Inactivity window before a clip is
                                     evicted (default: 900)
        --sweep-interval-secs <SECS> Interval between eviction sweeps
                                     (default: 1)
    -v, --version                    Print version information
        --help                       Print this help message

EXAMPLES:
    clipvault                        # Start on 127.0.0.1:5050
    clipvault --port 8080            # Start on port 8080
    clipvault --window-secs 60       # Clips expire after a minute idle

USING IT:
    $ curl -X POST 'localhost:5050/copy?data=hello'
    {{"id":"3f2a9c01d4e8"}}
    $ curl 'localhost:5050/paste?id=3f2a9c01d4e8'
    hello
    $ curl -X POST 'localhost:5050/delete?id=3f2a9c01d4e8'
"#
    );
}

fn print_banner(config: &Config) {
    println!(
        r#"
clipvault v{} - Ephemeral Shared Clipboard
──────────────────────────────────────────
Server started on {}
Clips expire after {}s of inactivity.

Use Ctrl+C to shutdown gracefully.
"#,
        clipvault::VERSION,
        config.bind_address(),
        config.window.as_secs()
    );
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command-line arguments
    let config = Config::from_args();

    // Set up logging (RUST_LOG overrides the default level)
    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    // Print the banner
    print_banner(&config);

    // Create the store (shared across all request tasks)
    let store = Arc::new(ClipboardStore::with_window(config.window));
    info!(
        window_secs = config.window.as_secs(),
        "Clipboard store initialized"
    );

    // Start the background expiry sweeper
    let _sweeper = ExpirySweeper::start(
        Arc::clone(&store),
        SweeperConfig {
            interval: config.sweep_interval,
        },
    );

    // Build the router and bind the listener
    let router = build_router(AppState { store });
    let listener = TcpListener::bind(config.bind_address()).await?;
    info!("Listening on {}", config.bind_address());

    // Serve until Ctrl+C
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    signal::ctrl_c()
        .await
        .expect("Failed to install Ctrl+C handler");
    info!("Shutdown signal received, stopping server...");
}
