//! Print every event the server pushes.
//!
//! Demonstrates:
//! - Subscribing to lifecycle and update events
//! - Unsubscribing a listener
//! - Observing `socket.close` when OBS shuts down
//!
//! Usage:
//!   cargo run --example 003_event_monitor
//!   cargo run --example 003_event_monitor -- --no-wait
//!   cargo run --example 003_event_monitor -- --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use common::Args;
use obs_remote::{EventEmitter, EventName, ObsRemote, Result};

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let args = Args::parse();
    common::init_logging(args.debug);

    if let Err(e) = run(args).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    println!("=== 003: Event Monitor ===\n");

    let obs = ObsRemote::builder()
        .host(&args.host)
        .port(args.port)
        .debug(args.debug)
        .build()?;

    // ========================================================================
    // Subscribe
    // ========================================================================

    println!("[1] Subscribing to all events...");

    let received = Arc::new(AtomicUsize::new(0));
    for event in EventName::ALL {
        let received = Arc::clone(&received);
        obs.on(event, move |payload| {
            received.fetch_add(1, Ordering::Relaxed);
            println!("    [{event}] {payload}");
        });
    }

    let first_ready = obs.on(EventName::Ready, |_| println!("    ✓ Session ready"));
    println!("    ✓ {} listeners\n", EventName::ALL.len() + 1);

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[2] Connecting...");
    obs.connect().await?;
    obs.login(args.password.as_deref()).await?;
    obs.unsubscribe(first_ready);
    println!();

    // ========================================================================
    // Listen
    // ========================================================================

    println!("[3] Listening (switch scenes or start a stream in OBS)...");
    common::wait_for_exit(args.no_wait).await;

    obs.close();
    println!(
        "\n=== Done ({} events) ===",
        received.load(Ordering::Relaxed)
    );

    Ok(())
}
