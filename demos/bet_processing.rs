//! Bet Processing
//!
//! This example drives a stake submission through a race-driven machine:
//! after the stake is sent the page either confirms it, reports an error,
//! or asks to reopen the bet because the odds moved.
//!
//! Key concepts:
//! - An application-owned context passed to every entry action
//! - Entry actions that do real work before arming their watchers
//! - A timeout state that escalates instead of ending quietly
//! - Stopping from outside through a `StopHandle`
//!
//! Run with: cargo run --example bet_processing

use raceway::builder::{StateBuilder, StateGraphBuilder, StateMachineBuilder};
use raceway::race::{timers, CollaboratorError, Watcher, WatcherSet};
use raceway::watchers;
use raceway::StopHandle;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Shared data of one bet, owned by the application.
#[derive(Clone, Default)]
struct BetContext {
    step: Arc<Mutex<String>>,
    odds_changes_left: Arc<Mutex<u32>>,
    stop: Arc<Mutex<Option<StopHandle>>>,
}

impl BetContext {
    fn set_step(&self, step: &str) {
        info!(step, "bet processing step");
        *self.step.lock().unwrap() = step.to_string();
    }

    fn step(&self) -> String {
        self.step.lock().unwrap().clone()
    }

    /// Abort processing, like a user closing the coupon.
    fn stop_processing(&self) {
        if let Some(handle) = self.stop.lock().unwrap().as_ref() {
            handle.stop();
        }
    }
}

async fn submit_stake(ctx: &BetContext) -> Result<(), CollaboratorError> {
    ctx.set_step("beforeStart");
    timers::sleep(Duration::from_millis(20)).await;
    ctx.set_step("start");
    Ok(())
}

fn stake_watchers(ctx: &BetContext) -> WatcherSet<&'static str> {
    let odds_changed = {
        let mut left = ctx.odds_changes_left.lock().unwrap();
        if *left > 0 {
            *left -= 1;
            true
        } else {
            false
        }
    };

    let confirmation: Watcher<&'static str> = if odds_changed {
        timers::pending()
    } else {
        timers::after(Duration::from_millis(150), "Ставка принята")
    };
    let reopen: Watcher<&'static str> = if odds_changed {
        timers::after(Duration::from_millis(60), "Коэффициент изменился")
    } else {
        timers::pending()
    };

    watchers! {
        "success" => confirmation,
        "error" => timers::poll(|| None::<&'static str>, Duration::from_secs(2), Duration::from_millis(50)),
        "reopen" => reopen,
        "timeout" => timers::timeout(Duration::from_secs(2)),
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== Bet Processing Example ===\n");

    let ctx = BetContext {
        odds_changes_left: Arc::new(Mutex::new(1)),
        ..BetContext::default()
    };

    let graph = StateGraphBuilder::<&'static str, BetContext>::new()
        .state(
            "submit",
            StateBuilder::new().entry(|ctx: &BetContext| {
                let ctx = ctx.clone();
                async move {
                    submit_stake(&ctx).await?;
                    Ok::<_, CollaboratorError>(stake_watchers(&ctx))
                }
            }),
        )
        .state(
            "reopen",
            StateBuilder::new().entry(|ctx: &BetContext| {
                let ctx = ctx.clone();
                async move {
                    ctx.set_step("reopen");
                    timers::sleep(Duration::from_millis(30)).await;
                    ctx.set_step("reopened");
                    Ok(watchers! { "submit" => Watcher::resolves(async { "reopened" }) })
                }
            }),
        )
        .state(
            "success",
            StateBuilder::new()
                .entry(|ctx: &BetContext| {
                    ctx.set_step("success");
                    async { Ok(WatcherSet::new()) }
                })
                .terminal(),
        )
        .state(
            "error",
            StateBuilder::new()
                .entry(|ctx: &BetContext| {
                    ctx.set_step("error");
                    async { Ok(WatcherSet::new()) }
                })
                .terminal(),
        )
        .state(
            "timeout",
            StateBuilder::new()
                .entry(|ctx: &BetContext| {
                    ctx.set_step("error");
                    println!("  [Notify] Stake was not confirmed in time");
                    async { Ok(WatcherSet::new()) }
                })
                .terminal(),
        )
        .build()
        .expect("graph is well formed");

    let mut machine = StateMachineBuilder::new()
        .states(graph)
        .build()
        .expect("machine builds");
    *ctx.stop.lock().unwrap() = Some(machine.stop_handle());

    let watchdog = ctx.clone();
    tokio::spawn(async move {
        timers::sleep(Duration::from_secs(10)).await;
        watchdog.stop_processing();
    });

    match machine.start("submit", &ctx).await {
        Ok(outcome) => println!("\n  Finished in '{}' (step: {})", outcome.state(), ctx.step()),
        Err(e) => println!("\n  Error: {}", e),
    }

    println!("  Path: {:?}", machine.history().get_path());

    println!("\n=== Example Complete ===");
}
