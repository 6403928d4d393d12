//! Shared utilities for demos.
//!
//! Provides common functionality used across all demos:
//! - Command-line argument parsing
//! - Logging initialization
//! - Graceful exit handling

#![allow(dead_code)]

// ============================================================================
// Imports
// ============================================================================

use obs_remote::client::{DEFAULT_HOST, DEFAULT_PORT};
use tracing_subscriber::EnvFilter;

// ============================================================================
// Types
// ============================================================================

/// Command-line arguments for demos.
#[derive(Debug, Clone)]
pub struct Args {
    pub host: String,
    pub port: u16,
    pub password: Option<String>,
    pub debug: bool,
    pub no_wait: bool,
    /// Positional arguments left after flags.
    pub rest: Vec<String>,
}

impl Args {
    /// Parse command-line arguments.
    ///
    /// Recognizes `--host <h>`, `--port <p>`, `--password <pw>`, `--debug`
    /// and `--no-wait`. `OBS_PASSWORD` is used when no password flag is given.
    pub fn parse() -> Self {
        let mut args = Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            password: std::env::var("OBS_PASSWORD").ok(),
            debug: false,
            no_wait: false,
            rest: Vec::new(),
        };

        let mut iter = std::env::args().skip(1);
        while let Some(arg) = iter.next() {
            match arg.as_str() {
                "--host" => args.host = iter.next().unwrap_or(args.host),
                "--port" => {
                    args.port = iter
                        .next()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(args.port);
                }
                "--password" => args.password = iter.next(),
                "--debug" => args.debug = true,
                "--no-wait" => args.no_wait = true,
                _ => args.rest.push(arg),
            }
        }

        args
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Initialize tracing/logging.
pub fn init_logging(debug: bool) {
    let filter = if debug {
        "obs_remote=debug"
    } else {
        "obs_remote=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}

/// Wait for Ctrl+C or skip if `--no-wait` flag is set.
pub async fn wait_for_exit(no_wait: bool) {
    if no_wait {
        println!("[--no-wait] Skipping wait");
        return;
    }

    println!("Press Ctrl+C to exit...");
    tokio::signal::ctrl_c().await.ok();
}
