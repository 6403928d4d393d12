//! Connect, authenticate and query the server.
//!
//! Demonstrates:
//! - Building a client with host and port
//! - The connect handshake and its `ConnectInfo`
//! - Logging in when the server requires a password
//! - Reading fields from a reply
//!
//! Usage:
//!   cargo run --example 001_connect
//!   cargo run --example 001_connect -- --host 192.168.1.20 --port 4444
//!   cargo run --example 001_connect -- --password hunter2 --debug

mod common;

// ============================================================================
// Imports
// ============================================================================

use common::Args;
use obs_remote::{ObsRemote, Result};

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
    println!("=== 001: Connect ===\n");

    // ========================================================================
    // Connect
    // ========================================================================

    println!("[1] Connecting to {}:{}...", args.host, args.port);

    let obs = ObsRemote::builder()
        .host(&args.host)
        .port(args.port)
        .debug(args.debug)
        .build()?;

    let info = obs.connect().await?;

    println!("    ✓ Connected");
    println!("    Version:       {}", info.version);
    println!("    Auth required: {}\n", info.auth_required);

    // ========================================================================
    // Login
    // ========================================================================

    println!("[2] Logging in...");
    obs.login(args.password.as_deref()).await?;
    println!("    ✓ Session {}\n", obs.state());

    // ========================================================================
    // Query
    // ========================================================================

    println!("[3] Querying server...");

    let scenes = obs.get_scene_list().await?;
    println!("    Current scene: {}", scenes.get_string("current-scene"));

    let status = obs.get_streaming_status().await?;
    println!("    Streaming:     {}", status.get_bool("streaming"));
    println!("    Recording:     {}\n", status.get_bool("recording"));

    obs.close();
    println!("=== Done ===");

    Ok(())
}
