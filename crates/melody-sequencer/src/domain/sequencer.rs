//! The melody sequencer.
//!
//! A single-threaded cooperative state machine. It owns the run (the ordered
//! slots being cycled), the current position and the failure counter, and is
//! mutated only through [`Sequencer::start`], [`Sequencer::end`],
//! [`Sequencer::tick`] and [`Sequencer::on_stop_notified`]. None of these
//! block; each returns as soon as it has decided what to do this cycle.

use chrono::{DateTime, Utc};
use melody_core::clock::Clock;
use melody_core::error::MelodyError;
use melody_core::event::EventMetadata;
use melody_core::host::{ActionSlot, EntityInfo, HostAdapter, Severity, Stance, StopReason};
use uuid::Uuid;

use super::config::MelodyConfig;
use super::events::{
    ActionPerformed, EndReason, MelodyEvent, MelodyEventKind, RetriesReset, RewindSkipped,
    Rewound, RunEnded, RunStarted, TargetMissing,
};

const STARTED_MESSAGE: &str = "You begin playing a melody.";
const ENDED_MESSAGE: &str = "Your melody has ended.";

/// Cycles a bounded list of loadout slots for one controlled entity.
#[derive(Debug, Default)]
pub struct Sequencer {
    config: MelodyConfig,
    /// Slots of the current run; empty when idle.
    actions: Vec<ActionSlot>,
    /// `None` until the first advancing tick of a run.
    current_index: Option<usize>,
    retry_count: u32,
    cast_window_last_visible_at: Option<DateTime<Utc>>,
    /// When the cast window last went from hidden to visible.
    cast_window_visible_since: Option<DateTime<Utc>>,
    action_started_at: Option<DateTime<Utc>>,
    /// Number of events recorded over the sequencer's lifetime.
    version: i64,
    uncommitted_events: Vec<MelodyEvent>,
}

impl Sequencer {
    /// Creates an idle sequencer with the given configuration.
    #[must_use]
    pub fn new(config: MelodyConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Returns the configuration in use.
    #[must_use]
    pub fn config(&self) -> &MelodyConfig {
        &self.config
    }

    /// Whether no run is in progress.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.actions.is_empty()
    }

    /// Slots of the current run.
    #[must_use]
    pub fn actions(&self) -> &[ActionSlot] {
        &self.actions
    }

    /// Position within the run, once the first advancing tick has happened.
    #[must_use]
    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Failures accumulated since the last reset.
    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Events recorded since the last [`Sequencer::take_events`].
    #[must_use]
    pub fn uncommitted_events(&self) -> &[MelodyEvent] {
        &self.uncommitted_events
    }

    /// Drains the recorded events.
    pub fn take_events(&mut self) -> Vec<MelodyEvent> {
        std::mem::take(&mut self.uncommitted_events)
    }

    /// Starts a run over `requested`, reporting a rejection to the player.
    ///
    /// Returns whether the run was accepted. See [`Sequencer::try_start`].
    pub fn start(
        &mut self,
        requested: &[ActionSlot],
        host: &mut dyn HostAdapter,
        clock: &dyn Clock,
    ) -> bool {
        match self.try_start(requested, host, clock) {
            Ok(()) => true,
            Err(err) => {
                tracing::info!(error = %err, "melody start declined");
                host.notify(&err.to_string(), Severity::Warning);
                false
            }
        }
    }

    /// Starts a run over `requested`.
    ///
    /// An empty request ends any current run and is accepted. A rejected
    /// request leaves the sequencer exactly as it was and is not reported to
    /// the host; that is left to the caller.
    ///
    /// # Errors
    ///
    /// Returns the first failed precondition: too many actions, world not
    /// active, no controlled entity, an entity that may not run melodies, is
    /// stunned or is not standing, or a slot that is out of range or empty.
    pub fn try_start(
        &mut self,
        requested: &[ActionSlot],
        host: &mut dyn HostAdapter,
        clock: &dyn Clock,
    ) -> Result<(), MelodyError> {
        if requested.is_empty() {
            self.end(host, clock);
            return Ok(());
        }

        self.check_start(requested, host)?;

        if !self.is_idle() {
            tracing::debug!(previous = ?self.actions, "replacing melody in progress");
        }

        self.reset_run();
        self.actions = requested.to_vec();
        self.record(
            MelodyEventKind::RunStarted(RunStarted {
                actions: self.actions.clone(),
            }),
            clock,
        );
        tracing::info!(actions = ?self.actions, "melody started");
        host.notify(STARTED_MESSAGE, Severity::Info);
        Ok(())
    }

    fn check_start(
        &self,
        requested: &[ActionSlot],
        host: &dyn HostAdapter,
    ) -> Result<(), MelodyError> {
        if requested.len() > self.config.max_actions {
            return Err(MelodyError::TooManyActions {
                requested: requested.len(),
                max: self.config.max_actions,
            });
        }
        if !host.is_world_active() {
            return Err(MelodyError::WorldInactive);
        }
        let entity = host
            .controlled_entity()
            .ok_or(MelodyError::NoControlledEntity)?;
        let info = host.entity_info(entity);
        if !info.melody_capable {
            return Err(MelodyError::NotPermitted);
        }
        if info.stunned {
            return Err(MelodyError::Stunned);
        }
        if info.stance != Stance::Standing {
            return Err(MelodyError::NotStanding);
        }
        for &slot in requested {
            if slot.0 >= self.config.loadout_slots {
                return Err(MelodyError::SlotOutOfRange(slot));
            }
            if host.loadout_slot(slot).is_none() {
                return Err(MelodyError::EmptySlot(slot));
            }
        }
        Ok(())
    }

    /// Ends the current run. Does nothing when idle.
    pub fn end(&mut self, host: &mut dyn HostAdapter, clock: &dyn Clock) {
        self.end_with(EndReason::Requested, host, clock);
    }

    /// Ends the current run, recording `reason`. Does nothing when idle.
    pub fn end_with(&mut self, reason: EndReason, host: &mut dyn HostAdapter, clock: &dyn Clock) {
        if self.is_idle() {
            return;
        }

        self.actions.clear();
        self.reset_run();
        self.record(MelodyEventKind::RunEnded(RunEnded { reason }), clock);
        tracing::info!(?reason, "melody ended");
        host.notify(ENDED_MESSAGE, Severity::Info);
    }

    /// Advances the run by at most one action. Call once per host polling
    /// cycle.
    pub fn tick(&mut self, host: &mut dyn HostAdapter, clock: &dyn Clock) {
        if self.is_idle() {
            return;
        }

        let info = match self.check_health(host) {
            Ok(info) => info,
            Err(reason) => {
                self.end_with(reason, host, clock);
                return;
            }
        };

        let now = clock.now();

        // A missing indicator counts as visible: wait until it exists and closes.
        if host.cast_window_visible().unwrap_or(true) {
            let visible_since = *self.cast_window_visible_since.get_or_insert(now);
            self.cast_window_last_visible_at = Some(now);
            // Only a window open the whole time since the attempt began counts.
            let sustained = self.action_started_at.is_some_and(|started| {
                now - started.max(visible_since) > self.config.healthy_cast_grace
            });
            if sustained && self.retry_count > 0 {
                let previous = self.retry_count;
                self.retry_count = 0;
                self.record(MelodyEventKind::RetriesReset(RetriesReset { previous }), clock);
                tracing::debug!(previous, "healthy cast, failure count reset");
            }
            return;
        }
        self.cast_window_visible_since = None;

        if self
            .cast_window_last_visible_at
            .is_some_and(|last| now - last < self.config.post_cast_cooldown)
        {
            tracing::trace!("cast window settling");
            return;
        }

        if info.busy || info.stance != Stance::Standing {
            tracing::trace!(busy = info.busy, stance = ?info.stance, "deferring melody");
            return;
        }

        if info.performing {
            host.abort_current_action();
        }

        let index = self.advance();
        let slot = self.actions[index];

        let Some(action) = host.loadout_slot(slot) else {
            tracing::trace!(index, %slot, "slot emptied, skipping");
            return;
        };

        let needs_target = host
            .action_definition(action)
            .is_some_and(|definition| definition.requires_single_target);
        if needs_target && !host.has_target_selected() {
            self.retry_count = self.retry_count.saturating_add(1);
            self.record(
                MelodyEventKind::TargetMissing(TargetMissing {
                    slot,
                    retry_count: self.retry_count,
                }),
                clock,
            );
            tracing::debug!(index, %slot, retry_count = self.retry_count, "no target selected");
            host.notify(
                &format!("You must select a target for song gem {slot}."),
                Severity::Warning,
            );
            return;
        }

        host.perform(slot);
        self.action_started_at = Some(now);
        self.record(
            MelodyEventKind::ActionPerformed(ActionPerformed { index, slot }),
            clock,
        );
        tracing::debug!(index, %slot, "performing");
    }

    /// Handles the host reporting that an in-flight action stopped.
    ///
    /// A retryable interruption bumps the failure count and rewinds so the
    /// same action is tried again, except on every `rewind_limit`-th failure,
    /// where the run moves on. Any other reason ends the run.
    pub fn on_stop_notified(
        &mut self,
        reason: StopReason,
        host: &mut dyn HostAdapter,
        clock: &dyn Clock,
    ) {
        if self.is_idle() {
            return;
        }
        if reason.0 != self.config.retryable_stop_code {
            self.end_with(EndReason::Interrupted { code: reason.0 }, host, clock);
            return;
        }

        self.retry_count = self.retry_count.saturating_add(1);
        let retry_count = self.retry_count;

        if let Some(0) = retry_count.checked_rem(self.config.rewind_limit) {
            self.record(
                MelodyEventKind::RewindSkipped(RewindSkipped {
                    index: self.current_index,
                    retry_count,
                }),
                clock,
            );
            tracing::debug!(retry_count, "interrupted, moving on");
        } else {
            let index = self.rewind();
            self.record(
                MelodyEventKind::Rewound(Rewound { index, retry_count }),
                clock,
            );
            tracing::debug!(index, retry_count, "interrupted, rewinding");
        }
    }

    /// Checks the conditions that end a run outright.
    fn check_health(&self, host: &dyn HostAdapter) -> Result<EntityInfo, EndReason> {
        if !host.is_world_active() {
            return Err(EndReason::WorldInactive);
        }
        let entity = host.controlled_entity().ok_or(EndReason::EntityMissing)?;
        let info = host.entity_info(entity);
        if info.stance == Stance::Sitting {
            return Err(EndReason::Sitting);
        }
        if info.stunned {
            return Err(EndReason::Stunned);
        }
        if self.retry_count >= self.config.end_limit {
            return Err(EndReason::RetryLimit);
        }
        Ok(info)
    }

    fn advance(&mut self) -> usize {
        let next = match self.current_index {
            Some(index) if index + 1 < self.actions.len() => index + 1,
            _ => 0,
        };
        self.current_index = Some(next);
        next
    }

    fn rewind(&mut self) -> usize {
        let previous = match self.current_index {
            Some(index) if index > 0 => index - 1,
            _ => self.actions.len() - 1,
        };
        self.current_index = Some(previous);
        previous
    }

    fn reset_run(&mut self) {
        self.current_index = None;
        self.retry_count = 0;
        self.cast_window_last_visible_at = None;
        self.cast_window_visible_since = None;
        self.action_started_at = None;
    }

    fn record(&mut self, kind: MelodyEventKind, clock: &dyn Clock) {
        self.version += 1;
        self.uncommitted_events.push(MelodyEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                sequence_number: self.version,
                occurred_at: clock.now(),
            },
            kind,
        });
    }
}
