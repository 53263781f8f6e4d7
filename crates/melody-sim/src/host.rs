//! A simulated game standing in for a real host.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use melody_core::host::{
    ActionDefinition, ActionId, ActionSlot, EntityHandle, EntityInfo, HostAdapter, Severity,
    Stance, StopReason,
};
use melody_sequencer::domain::config::{LOADOUT_SLOTS, RETRYABLE_STOP_CODE};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const BARD: EntityHandle = EntityHandle(1);

#[derive(Debug, Clone, Copy)]
struct Cast {
    slot: ActionSlot,
    ends_at: DateTime<Utc>,
    fizzles: bool,
}

/// One standing bard with a full loadout. Casts hold the cast window open
/// for a fixed duration; some are interrupted half way through.
#[derive(Debug)]
pub struct SimulatedHost {
    now: DateTime<Utc>,
    cast_duration: TimeDelta,
    fizzle_rate: f64,
    rng: StdRng,
    casting: Option<Cast>,
}

impl SimulatedHost {
    /// Creates a simulated host.
    ///
    /// # Errors
    ///
    /// Returns an error if `cast_duration` does not fit a `TimeDelta`.
    pub fn new(
        cast_duration: Duration,
        fizzle_rate: f64,
        seed: u64,
        now: DateTime<Utc>,
    ) -> Result<Self, String> {
        let cast_duration = TimeDelta::from_std(cast_duration)
            .map_err(|e| format!("cast duration out of range: {e}"))?;
        Ok(Self {
            now,
            cast_duration,
            fizzle_rate,
            rng: StdRng::seed_from_u64(seed),
            casting: None,
        })
    }

    /// Moves simulated time to `now`, finishing or interrupting the cast in
    /// flight. Returns the stop notification to deliver, if any.
    pub fn update(&mut self, now: DateTime<Utc>) -> Option<StopReason> {
        self.now = now;
        let cast = self.casting?;
        if cast.fizzles && now >= cast.ends_at - self.cast_duration / 2 {
            self.casting = None;
            tracing::info!(slot = %cast.slot, "cast interrupted");
            return Some(StopReason(RETRYABLE_STOP_CODE));
        }
        if now >= cast.ends_at {
            self.casting = None;
            tracing::debug!(slot = %cast.slot, "cast complete");
        }
        None
    }
}

impl HostAdapter for SimulatedHost {
    fn is_world_active(&self) -> bool {
        true
    }

    fn controlled_entity(&self) -> Option<EntityHandle> {
        Some(BARD)
    }

    fn entity_info(&self, _entity: EntityHandle) -> EntityInfo {
        EntityInfo {
            stance: Stance::Standing,
            stunned: false,
            performing: self.casting.is_some(),
            busy: false,
            melody_capable: true,
        }
    }

    fn loadout_slot(&self, slot: ActionSlot) -> Option<ActionId> {
        (slot.0 < LOADOUT_SLOTS).then(|| ActionId(700 + u32::from(slot.0)))
    }

    fn action_definition(&self, _action: ActionId) -> Option<ActionDefinition> {
        Some(ActionDefinition::default())
    }

    fn has_target_selected(&self) -> bool {
        false
    }

    fn cast_window_visible(&self) -> Option<bool> {
        Some(self.casting.is_some())
    }

    fn perform(&mut self, slot: ActionSlot) {
        let fizzles = self.rng.random_bool(self.fizzle_rate);
        self.casting = Some(Cast {
            slot,
            ends_at: self.now + self.cast_duration,
            fizzles,
        });
        tracing::info!(%slot, "casting");
    }

    fn abort_current_action(&mut self) {
        if let Some(cast) = self.casting.take() {
            tracing::debug!(slot = %cast.slot, "cast aborted");
        }
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        tracing::info!(target: "chat", ?severity, "{message}");
    }
}
