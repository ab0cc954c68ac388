//! Captcha Race
//!
//! This example races a captcha solution against a detected failure and a
//! deadline, the smallest useful race-driven machine.
//!
//! Key concepts:
//! - Watchers are named after the state they lead to
//! - The deadline is an ordinary watcher
//! - Losing watchers keep running and are ignored
//!
//! Run with: cargo run --example captcha_race

use raceway::builder::{deadline_state, terminal, StateGraphBuilder, StateMachineBuilder};
use raceway::race::{timers, WatcherSet};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .init();

    println!("=== Captcha Race Example ===\n");

    let graph = StateGraphBuilder::<String, ()>::new()
        .state(
            "solving",
            deadline_state(Duration::from_millis(500), || {
                WatcherSet::new()
                    .with(
                        "solved",
                        timers::after(Duration::from_millis(120), "03AGdBq2...".to_string()),
                    )
                    .with(
                        "rejected",
                        timers::after(Duration::from_millis(300), "ERROR_CAPTCHA_UNSOLVABLE".to_string()),
                    )
            }),
        )
        .state("solved", terminal())
        .state("rejected", terminal())
        .state("timeout", terminal())
        .build()
        .expect("graph is well formed");

    let mut machine = StateMachineBuilder::new()
        .states(graph)
        .build()
        .expect("machine builds");

    match machine.start("solving", &()).await {
        Ok(outcome) => println!("\n  Finished in '{}'", outcome.state()),
        Err(e) => println!("\n  Error: {}", e),
    }

    println!("  Path: {:?}", machine.history().get_path());

    println!("\n=== Example Complete ===");
}
