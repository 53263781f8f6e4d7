//! Host adapter abstraction.
//!
//! The engine never reaches into host memory or global state. Everything it
//! needs to observe or command is expressed through [`HostAdapter`], which the
//! host implements and hands to the engine on every call.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Index into the controlled entity's loadout (zero-based).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActionSlot(pub u8);

impl ActionSlot {
    /// The one-based number players use to refer to this slot.
    #[must_use]
    pub fn display_number(self) -> u16 {
        u16::from(self.0) + 1
    }
}

impl fmt::Display for ActionSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_number())
    }
}

/// Host identifier of a predefined action (a spell, song, ability).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionId(pub u32);

/// Opaque handle to an entity in the host world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityHandle(pub u32);

/// Body stance of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stance {
    /// Upright and able to act.
    Standing,
    /// Seated; ends any run in progress.
    Sitting,
    /// Crouched; actions are deferred until the entity stands.
    Ducking,
    /// Lying on the ground (feigning, knocked down).
    Lying,
}

/// Point-in-time view of the controlled entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityInfo {
    /// Current stance.
    pub stance: Stance,
    /// Whether the entity is stunned.
    pub stunned: bool,
    /// Whether the entity is performing one of the engine's long-running
    /// actions right now.
    pub performing: bool,
    /// Whether the host is in a non-transactable condition (trading,
    /// looting and similar).
    pub busy: bool,
    /// Whether the entity's class or role may run melodies at all.
    pub melody_capable: bool,
}

/// Static properties of an action that matter to sequencing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActionDefinition {
    /// The action needs one designated target to be selected.
    pub requires_single_target: bool,
}

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    /// Routine feedback.
    Info,
    /// Something the player should act on.
    Warning,
}

/// Reason code attached to a host stop notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopReason(pub u8);

/// Capability set the host exposes to the engine.
///
/// Queries take `&self`; commands take `&mut self`. Implementations must not
/// deliver a stop notification for an abort requested through
/// [`HostAdapter::abort_current_action`], since that abort is part of normal
/// cycling rather than an interruption.
pub trait HostAdapter {
    /// Whether the world is joined and active.
    fn is_world_active(&self) -> bool;

    /// The entity this engine acts for, if any.
    fn controlled_entity(&self) -> Option<EntityHandle>;

    /// Current state of `entity`.
    fn entity_info(&self, entity: EntityHandle) -> EntityInfo;

    /// The action held in `slot`, or `None` when the slot is empty.
    fn loadout_slot(&self, slot: ActionSlot) -> Option<ActionId>;

    /// Definition of `action`, or `None` when the host does not know it.
    fn action_definition(&self, action: ActionId) -> Option<ActionDefinition>;

    /// Whether a target is currently selected.
    fn has_target_selected(&self) -> bool;

    /// Visibility of the "currently casting" indicator. `None` means the
    /// indicator does not exist right now.
    fn cast_window_visible(&self) -> Option<bool>;

    /// Begins the action in `slot`. Completion or interruption is reported
    /// later through a stop notification.
    fn perform(&mut self, slot: ActionSlot);

    /// Aborts the action currently in flight.
    fn abort_current_action(&mut self);

    /// Shows `message` to the player.
    fn notify(&mut self, message: &str, severity: Severity);
}
