//! Domain events for the melody sequencer.

use melody_core::event::{DomainEvent, EventMetadata};
use melody_core::host::ActionSlot;
use serde::{Deserialize, Serialize};

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EndReason {
    /// Explicit `end` call.
    Requested,
    /// The world stopped being active.
    WorldInactive,
    /// The controlled entity disappeared.
    EntityMissing,
    /// The entity sat down.
    Sitting,
    /// The entity was stunned.
    Stunned,
    /// Too many failures accumulated.
    RetryLimit,
    /// The host stopped an action for a non-retryable reason.
    Interrupted {
        /// The host's reason code.
        code: u8,
    },
    /// The entity left the world or the controlled entity changed.
    WorldExit,
}

/// Emitted when a run is accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunStarted {
    /// The slots the run cycles through.
    pub actions: Vec<ActionSlot>,
}

/// Emitted when the host is asked to perform an action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionPerformed {
    /// Position within the run.
    pub index: usize,
    /// Loadout slot performed.
    pub slot: ActionSlot,
}

/// Emitted when a retryable interruption moves the position back.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rewound {
    /// Position after rewinding.
    pub index: usize,
    /// Failure count after this interruption.
    pub retry_count: u32,
}

/// Emitted when a retryable interruption lands on the rewind modulus and the
/// run moves on instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RewindSkipped {
    /// Position left in place.
    pub index: Option<usize>,
    /// Failure count after this interruption.
    pub retry_count: u32,
}

/// Emitted when an action needing a target was due and none was selected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetMissing {
    /// The slot that was skipped.
    pub slot: ActionSlot,
    /// Failure count after this skip.
    pub retry_count: u32,
}

/// Emitted when a sustained healthy cast clears the failure count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetriesReset {
    /// Failure count before the reset.
    pub previous: u32,
}

/// Emitted when a run ends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunEnded {
    /// Why it ended.
    pub reason: EndReason,
}

/// Event payload variants for the melody sequencer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum MelodyEventKind {
    /// A run was accepted.
    RunStarted(RunStarted),
    /// An action was performed.
    ActionPerformed(ActionPerformed),
    /// The position was rewound.
    Rewound(Rewound),
    /// A rewind was skipped.
    RewindSkipped(RewindSkipped),
    /// A targeted action had no target.
    TargetMissing(TargetMissing),
    /// The failure count was reset.
    RetriesReset(RetriesReset),
    /// The run ended.
    RunEnded(RunEnded),
}

impl MelodyEventKind {
    /// Returns the event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted(_) => "melody.run_started",
            Self::ActionPerformed(_) => "melody.action_performed",
            Self::Rewound(_) => "melody.rewound",
            Self::RewindSkipped(_) => "melody.rewind_skipped",
            Self::TargetMissing(_) => "melody.target_missing",
            Self::RetriesReset(_) => "melody.retries_reset",
            Self::RunEnded(_) => "melody.run_ended",
        }
    }
}

/// Domain event envelope for the melody sequencer.
#[derive(Debug, Clone)]
pub struct MelodyEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: MelodyEventKind,
}

impl DomainEvent for MelodyEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn to_payload(&self) -> serde_json::Value {
        // Serialization of derived Serialize types to Value is infallible.
        serde_json::to_value(&self.kind).expect("MelodyEventKind serialization is infallible")
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
