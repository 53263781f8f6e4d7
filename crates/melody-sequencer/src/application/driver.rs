//! Host-facing driver.
//!
//! Bundles a [`Sequencer`] with the host adapter and clock it runs against,
//! and turns the host's asynchronous stop notifications into messages on a
//! channel. The host keeps a [`StopNotifier`] wherever it learns that an
//! action stopped and calls [`MelodyDriver::poll`] from its main loop; queued
//! notifications are applied in arrival order before each tick.

use melody_core::clock::Clock;
use melody_core::host::{ActionSlot, HostAdapter, StopReason};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::query_handlers::{MelodyStatus, melody_status};
use crate::domain::config::MelodyConfig;
use crate::domain::events::{EndReason, MelodyEvent};
use crate::domain::sequencer::Sequencer;

/// Cloneable handle for reporting stopped actions to a [`MelodyDriver`].
#[derive(Debug, Clone)]
pub struct StopNotifier {
    tx: UnboundedSender<StopReason>,
}

impl StopNotifier {
    /// Queues a stop notification. Returns `false` if the driver is gone.
    #[must_use = "a `false` return means the notification was lost"]
    pub fn notify(&self, reason: StopReason) -> bool {
        self.tx.send(reason).is_ok()
    }
}

/// Runs one [`Sequencer`] against a host.
#[derive(Debug)]
pub struct MelodyDriver<H, C> {
    sequencer: Sequencer,
    host: H,
    clock: C,
    stop_tx: UnboundedSender<StopReason>,
    stop_rx: UnboundedReceiver<StopReason>,
}

impl<H: HostAdapter, C: Clock> MelodyDriver<H, C> {
    /// Creates a driver with the default configuration.
    #[must_use]
    pub fn new(host: H, clock: C) -> Self {
        Self::with_config(MelodyConfig::default(), host, clock)
    }

    /// Creates a driver with `config`.
    #[must_use]
    pub fn with_config(config: MelodyConfig, host: H, clock: C) -> Self {
        let (stop_tx, stop_rx) = mpsc::unbounded_channel();
        Self {
            sequencer: Sequencer::new(config),
            host,
            clock,
            stop_tx,
            stop_rx,
        }
    }

    /// Returns a handle the host uses to report stopped actions.
    #[must_use]
    pub fn stop_notifier(&self) -> StopNotifier {
        StopNotifier {
            tx: self.stop_tx.clone(),
        }
    }

    /// Starts a run. Stop notifications already queued are applied to the
    /// previous run first.
    pub fn start(&mut self, slots: &[ActionSlot]) -> bool {
        self.drain_stop_notifications();
        self.sequencer.start(slots, &mut self.host, &self.clock)
    }

    /// Ends the current run.
    pub fn end(&mut self) {
        self.sequencer.end(&mut self.host, &self.clock);
    }

    /// One host polling cycle: apply queued stop notifications, then tick.
    pub fn poll(&mut self) {
        self.drain_stop_notifications();
        self.sequencer.tick(&mut self.host, &self.clock);
    }

    /// Delivers a stop notification immediately, bypassing the queue.
    pub fn on_stop_notified(&mut self, reason: StopReason) {
        self.sequencer
            .on_stop_notified(reason, &mut self.host, &self.clock);
    }

    /// Lifecycle hook for the entity leaving the world or the controlled
    /// entity changing. Queued notifications belong to the old run and are
    /// discarded.
    pub fn on_world_exit(&mut self) {
        let mut discarded = 0_usize;
        while self.stop_rx.try_recv().is_ok() {
            discarded += 1;
        }
        if discarded > 0 {
            tracing::debug!(discarded, "dropping stop notifications on world exit");
        }
        self.sequencer
            .end_with(EndReason::WorldExit, &mut self.host, &self.clock);
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> MelodyStatus {
        melody_status(&self.sequencer)
    }

    /// The underlying sequencer.
    #[must_use]
    pub fn sequencer(&self) -> &Sequencer {
        &self.sequencer
    }

    /// Drains events recorded by the sequencer.
    pub fn take_events(&mut self) -> Vec<MelodyEvent> {
        self.sequencer.take_events()
    }

    /// The host adapter.
    #[must_use]
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host adapter.
    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The clock.
    #[must_use]
    pub fn clock(&self) -> &C {
        &self.clock
    }

    fn drain_stop_notifications(&mut self) {
        while let Ok(reason) = self.stop_rx.try_recv() {
            self.sequencer
                .on_stop_notified(reason, &mut self.host, &self.clock);
        }
    }
}
