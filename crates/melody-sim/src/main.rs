//! Melody simulator entry point.
//!
//! Plays the host's part: polls the engine on a fixed cadence, reports
//! interrupted casts through the stop channel, and leaves the world when
//! the configured run time is up.

use std::error::Error;

use melody_core::clock::{Clock, SystemClock};
use melody_core::event::DomainEvent;
use melody_sequencer::application::driver::MelodyDriver;
use tracing_subscriber::EnvFilter;

mod host;
mod settings;

use host::SimulatedHost;
use settings::SimSettings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    let settings = SimSettings::from_env()?;
    tracing::info!(?settings, "Starting melody simulation");

    let host = SimulatedHost::new(
        settings.cast_duration,
        settings.fizzle_rate,
        settings.seed,
        SystemClock.now(),
    )?;
    let mut driver = MelodyDriver::new(host, SystemClock);
    let notifier = driver.stop_notifier();

    if !driver.start(&settings.slots) {
        return Err("the simulated host declined the melody".into());
    }

    let deadline = tokio::time::Instant::now() + settings.run_for;
    let mut interval = tokio::time::interval(settings.tick);
    while tokio::time::Instant::now() < deadline && driver.status().active {
        interval.tick().await;

        let now = driver.clock().now();
        if let Some(reason) = driver.host_mut().update(now) {
            if !notifier.notify(reason) {
                tracing::warn!(?reason, "stop notification dropped");
            }
        }
        driver.poll();

        for event in driver.take_events() {
            tracing::info!(
                event_type = event.event_type(),
                payload = %event.to_payload(),
                "melody event"
            );
        }
    }

    driver.on_world_exit();
    let status = serde_json::to_string(&driver.status())?;
    tracing::info!(%status, "Simulation finished");

    Ok(())
}
