//! Sequencer configuration.

use chrono::TimeDelta;

/// Most actions one run may hold.
pub const MAX_ACTIONS: usize = 5;

/// Number of loadout slots; valid slot indices are `0..LOADOUT_SLOTS`.
pub const LOADOUT_SLOTS: u8 = 8;

/// Every `REWIND_LIMIT`-th consecutive retryable failure advances instead of
/// rewinding.
pub const REWIND_LIMIT: u32 = 8;

/// Accumulated failures at which the next tick ends the run.
pub const END_LIMIT: u32 = 15;

/// A cast window visible this long after an attempt began resets the
/// failure counter.
pub const HEALTHY_CAST_GRACE_MS: i64 = 1_000;

/// Delay after the cast window closes before the next action fires.
pub const POST_CAST_COOLDOWN_MS: i64 = 150;

/// Stop reason code the host uses for an attempt that may be retried.
pub const RETRYABLE_STOP_CODE: u8 = 3;

/// Tunables for a [`Sequencer`](super::sequencer::Sequencer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MelodyConfig {
    /// Most actions one run may hold.
    pub max_actions: usize,
    /// Number of loadout slots.
    pub loadout_slots: u8,
    /// Rewind/advance modulus for retryable failures.
    pub rewind_limit: u32,
    /// Failure count that ends the run.
    pub end_limit: u32,
    /// Sustained cast duration that counts as healthy.
    pub healthy_cast_grace: TimeDelta,
    /// Settle time after the cast window closes.
    pub post_cast_cooldown: TimeDelta,
    /// Reason code treated as a retryable interruption.
    pub retryable_stop_code: u8,
}

impl Default for MelodyConfig {
    fn default() -> Self {
        Self {
            max_actions: MAX_ACTIONS,
            loadout_slots: LOADOUT_SLOTS,
            rewind_limit: REWIND_LIMIT,
            end_limit: END_LIMIT,
            healthy_cast_grace: TimeDelta::milliseconds(HEALTHY_CAST_GRACE_MS),
            post_cast_cooldown: TimeDelta::milliseconds(POST_CAST_COOLDOWN_MS),
            retryable_stop_code: RETRYABLE_STOP_CODE,
        }
    }
}
