//! Cycle through scenes.
//!
//! Demonstrates:
//! - Listing scenes
//! - Switching the program scene
//! - Handling a server-side error reply
//!
//! Usage:
//!   cargo run --example 002_scene_switch
//!   cargo run --example 002_scene_switch -- "Scene A" "Scene B"
//!   cargo run --example 002_scene_switch -- --password hunter2

mod common;

// ============================================================================
// Imports
// ============================================================================

use std::time::Duration;

use common::Args;
use obs_remote::{Error, ObsRemote, Result};

// ============================================================================
// Constants
// ============================================================================

const DWELL: Duration = Duration::from_secs(2);

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
    println!("=== 002: Scene Switch ===\n");

    let obs = ObsRemote::builder()
        .host(&args.host)
        .port(args.port)
        .build()?;

    obs.connect().await?;
    obs.login(args.password.as_deref()).await?;

    // ========================================================================
    // List Scenes
    // ========================================================================

    println!("[1] Listing scenes...");

    let reply = obs.get_scene_list().await?;
    let original = reply.get_string("current-scene");

    let mut names: Vec<String> = reply
        .get("scenes")
        .and_then(|v| v.as_array())
        .map(|scenes| {
            scenes
                .iter()
                .filter_map(|s| s.get("name").and_then(|n| n.as_str()))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    for name in &names {
        let marker = if *name == original { "*" } else { " " };
        println!("    {marker} {name}");
    }
    println!();

    if !args.rest.is_empty() {
        names = args.rest.clone();
    }

    // ========================================================================
    // Switch
    // ========================================================================

    println!("[2] Switching scenes...");

    for name in &names {
        match obs.set_current_scene(name.as_str()).await {
            Ok(_) => println!("    ✓ {name}"),
            Err(Error::Server { error, .. }) => println!("    ✗ {name}: {error}"),
            Err(e) => return Err(e),
        }
        tokio::time::sleep(DWELL).await;
    }
    println!();

    println!("[3] Restoring {original}...");
    obs.set_current_scene(original).await?;
    println!("    ✓ Restored\n");

    obs.close();
    println!("=== Done ===");

    Ok(())
}
