//! Query handlers for the melody sequencer.

use melody_core::host::ActionSlot;
use serde::Serialize;

use crate::domain::sequencer::Sequencer;

/// Read-only view of a sequencer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MelodyStatus {
    /// Whether a run is in progress.
    pub active: bool,
    /// Slots of the current run.
    pub actions: Vec<ActionSlot>,
    /// Position within the run, once it has begun.
    pub current_index: Option<usize>,
    /// Failures accumulated since the last reset.
    pub retry_count: u32,
}

/// Builds a [`MelodyStatus`] for `sequencer`.
#[must_use]
pub fn melody_status(sequencer: &Sequencer) -> MelodyStatus {
    MelodyStatus {
        active: !sequencer.is_idle(),
        actions: sequencer.actions().to_vec(),
        current_index: sequencer.current_index(),
        retry_count: sequencer.retry_count(),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use melody_core::host::ActionSlot;
    use melody_test_support::{ManualClock, ScriptedHost};

    use super::melody_status;
    use crate::domain::sequencer::Sequencer;

    #[test]
    fn test_melody_status_reflects_running_sequencer() {
        // Arrange
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap());
        let mut host = ScriptedHost::bard(&[2, 4]);
        let mut sequencer = Sequencer::default();
        assert!(sequencer.start(&[ActionSlot(2), ActionSlot(4)], &mut host, &clock));
        sequencer.tick(&mut host, &clock);

        // Act
        let status = melody_status(&sequencer);

        // Assert
        assert!(status.active);
        assert_eq!(status.current_index, Some(0));
        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["actions"], serde_json::json!([2, 4]));
        assert_eq!(json["retry_count"], 0);
    }

    #[test]
    fn test_melody_status_of_idle_sequencer() {
        let status = melody_status(&Sequencer::default());

        assert!(!status.active);
        assert!(status.actions.is_empty());
        assert_eq!(status.current_index, None);
    }
}
