//! Drive a reveal session from the terminal.
//!
//! The command plays the host role: it schedules the tick loop,
//! simulates the asset load as a spawned task, taps for the user, and
//! prints every session event as one JSON line. Aborting the loader
//! task on teardown is the disposer that keeps a late completion from
//! ever touching a dead session.

use std::time::Duration as StdDuration;

use capsule_core::{
    AccessController, AccessState, AssetOutcome, CapsuleStore, Clock, Event, MarkOutcome, Phase,
    RevealConfig, RevealSession, SystemClock,
};
use clap::Args;
use tokio::sync::oneshot;

use crate::common;

#[derive(Args)]
pub struct OpenArgs {
    /// Capsule id
    id: String,
    /// Simulated asset load latency in milliseconds
    #[arg(long, default_value = "300")]
    asset_delay_ms: u64,
    /// Simulate a failed asset load
    #[arg(long)]
    fail_asset: bool,
    /// Keep waiting for a locked capsule instead of exiting
    #[arg(long)]
    wait: bool,
    /// Override the configured animation speed
    #[arg(long)]
    speed: Option<f64>,
    /// Override the configured minimum dwell, for scripting
    #[arg(long)]
    dwell_ms: Option<u64>,
}

enum SessionEnd {
    Locked,
    Revealed,
}

pub fn run(args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_session(args))
}

async fn run_session(args: OpenArgs) -> Result<(), Box<dyn std::error::Error>> {
    let id = common::parse_id(&args.id)?;
    let mut store = common::open_store()?;
    // A fetch failure is fatal to the session; it propagates as-is.
    let mut item = store.fetch(id)?;

    let mut config = RevealConfig::load().unwrap_or_default();
    if let Some(speed) = args.speed {
        config.animation.open_speed = speed;
    }
    if let Some(dwell) = args.dwell_ms {
        config.min_dwell_ms = dwell;
    }

    let clock = SystemClock;
    let (mut session, started) = RevealSession::new(&item, &config, clock.now());
    print_event(&started)?;

    // Simulated asset load. The JoinHandle doubles as the disposer:
    // aborting it on teardown structurally cancels the callback.
    let (tx, mut rx) = oneshot::channel();
    let delay = args.asset_delay_ms;
    let fail = args.fail_asset;
    let loader = tokio::spawn(async move {
        tokio::time::sleep(StdDuration::from_millis(delay)).await;
        let outcome = if fail {
            AssetOutcome::Failed {
                reason: "simulated asset failure".into(),
            }
        } else {
            AssetOutcome::Ready
        };
        let _ = tx.send(outcome);
    });

    // The search must never hang on a loader that goes silent.
    let asset_deadline =
        clock.now() + chrono::Duration::milliseconds((config.min_dwell_ms + delay + 10_000) as i64);

    let tick_ms = config.countdown_tick_ms.clamp(50, 250);
    let mut ticker = tokio::time::interval(StdDuration::from_millis(tick_ms));
    let mut asset_delivered = false;
    let mut tapped_while_locked = false;

    let end = loop {
        ticker.tick().await;
        let now = clock.now();

        if !asset_delivered {
            match rx.try_recv() {
                Ok(outcome) => {
                    asset_delivered = true;
                    for event in session.asset_loaded(outcome, now) {
                        print_event(&event)?;
                    }
                }
                Err(oneshot::error::TryRecvError::Empty) => {
                    if now >= asset_deadline {
                        asset_delivered = true;
                        loader.abort();
                        let timed_out = AssetOutcome::Failed {
                            reason: "asset load timed out".into(),
                        };
                        for event in session.asset_loaded(timed_out, now) {
                            print_event(&event)?;
                        }
                    }
                }
                Err(oneshot::error::TryRecvError::Closed) => {
                    asset_delivered = true;
                    let dropped = AssetOutcome::Failed {
                        reason: "asset loader dropped".into(),
                    };
                    for event in session.asset_loaded(dropped, now) {
                        print_event(&event)?;
                    }
                }
            }
        }

        for event in session.tick(now) {
            print_event(&event)?;
        }

        match session.phase() {
            Phase::Idle(AccessState::Locked) => {
                if !tapped_while_locked {
                    tapped_while_locked = true;
                    for event in session.tap(now) {
                        print_event(&event)?;
                    }
                }
                if !args.wait {
                    break SessionEnd::Locked;
                }
            }
            Phase::Idle(AccessState::Unlocked) => {
                // The CLI taps on the user's behalf.
                for event in session.tap(now) {
                    print_event(&event)?;
                }
            }
            Phase::Revealed => break SessionEnd::Revealed,
            _ => {}
        }
    };

    session.dispose();
    loader.abort();

    match end {
        SessionEnd::Locked => {
            let remaining = AccessController::remaining(clock.now(), item.unlock_at());
            println!(
                "Capsule is locked for another {}. Re-run with --wait to stay.",
                common::format_duration(remaining)
            );
        }
        SessionEnd::Revealed => {
            let now = clock.now();
            if AccessController::mark_viewed(&mut store, &mut item, now) == MarkOutcome::Marked {
                print_event(&Event::ViewedMarked {
                    capsule_id: item.id,
                    at: now,
                })?;
            }
            println!("{}", item.message);
        }
    }
    Ok(())
}

fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}
