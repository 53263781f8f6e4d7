//! Domain error types.

use thiserror::Error;

use crate::host::ActionSlot;

/// Reasons a melody run can be declined.
///
/// The `Display` text is what the player sees, so it is phrased for them
/// rather than for a log reader.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MelodyError {
    /// The world is not joined.
    #[error("You must be in the world to play a melody.")]
    WorldInactive,

    /// There is no controlled entity.
    #[error("You have no character to play a melody with.")]
    NoControlledEntity,

    /// The controlled entity's class or role cannot run melodies.
    #[error("Only a bard can play a melody.")]
    NotPermitted,

    /// The controlled entity is stunned.
    #[error("You cannot play a melody while stunned.")]
    Stunned,

    /// The controlled entity is not standing.
    #[error("You must be standing to play a melody.")]
    NotStanding,

    /// More actions were requested than a run may hold.
    #[error("A melody can only consist of {max} songs")]
    TooManyActions {
        /// Number of actions requested.
        requested: usize,
        /// Configured maximum.
        max: usize,
    },

    /// A slot index lies outside the loadout.
    #[error("Song gem {} does not exist.", .0.display_number())]
    SlotOutOfRange(ActionSlot),

    /// A slot holds no action.
    #[error("Song gem {} is empty.", .0.display_number())]
    EmptySlot(ActionSlot),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_too_many_actions_message_names_the_limit() {
        let err = MelodyError::TooManyActions {
            requested: 6,
            max: 5,
        };

        assert_eq!(err.to_string(), "A melody can only consist of 5 songs");
    }

    #[test]
    fn test_slot_messages_use_one_based_numbers() {
        assert_eq!(
            MelodyError::EmptySlot(ActionSlot(0)).to_string(),
            "Song gem 1 is empty."
        );
        assert_eq!(
            MelodyError::SlotOutOfRange(ActionSlot(9)).to_string(),
            "Song gem 10 does not exist."
        );
    }
}
