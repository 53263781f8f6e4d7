//! Scripted host — a recording `HostAdapter` whose world tests set directly.

use std::collections::HashMap;

use melody_core::host::{
    ActionDefinition, ActionId, ActionSlot, EntityHandle, EntityInfo, HostAdapter, Severity,
    Stance,
};

const SLOTS: usize = 8;
const ENTITY: EntityHandle = EntityHandle(1);

/// A host whose state is plain public fields, recording every command the
/// engine issues.
#[derive(Debug, Clone)]
pub struct ScriptedHost {
    /// Reported by `is_world_active`.
    pub world_active: bool,
    /// The controlled entity; `None` means there is none.
    pub entity: Option<EntityInfo>,
    /// Loadout contents by slot.
    pub loadout: [Option<ActionId>; SLOTS],
    /// Known action definitions.
    pub definitions: HashMap<ActionId, ActionDefinition>,
    /// When set, `action_definition` knows no action at all.
    pub unknown_actions: bool,
    /// Reported by `has_target_selected`.
    pub target_selected: bool,
    /// Reported by `cast_window_visible`.
    pub cast_window: Option<bool>,
    performed: Vec<ActionSlot>,
    aborts: usize,
    notifications: Vec<(String, Severity)>,
}

impl ScriptedHost {
    /// A standing, melody-capable entity in an active world with the given
    /// slots populated and the cast window hidden.
    #[must_use]
    pub fn bard(populated: &[u8]) -> Self {
        let mut loadout = [None; SLOTS];
        for &slot in populated {
            loadout[usize::from(slot)] = Some(ActionId(100 + u32::from(slot)));
        }
        Self {
            world_active: true,
            entity: Some(EntityInfo {
                stance: Stance::Standing,
                stunned: false,
                performing: false,
                busy: false,
                melody_capable: true,
            }),
            loadout,
            definitions: HashMap::new(),
            unknown_actions: false,
            target_selected: false,
            cast_window: Some(false),
            performed: Vec::new(),
            aborts: 0,
            notifications: Vec::new(),
        }
    }

    /// Mutable access to the controlled entity.
    ///
    /// # Panics
    ///
    /// Panics if there is no controlled entity.
    pub fn entity_mut(&mut self) -> &mut EntityInfo {
        self.entity.as_mut().expect("scripted host has no entity")
    }

    /// Empties `slot`.
    pub fn clear_slot(&mut self, slot: ActionSlot) {
        self.loadout[usize::from(slot.0)] = None;
    }

    /// Marks the action in `slot` as needing a single target.
    ///
    /// # Panics
    ///
    /// Panics if `slot` is empty.
    pub fn require_target(&mut self, slot: ActionSlot) {
        let action = self.loadout[usize::from(slot.0)].expect("slot is empty");
        self.definitions.insert(
            action,
            ActionDefinition {
                requires_single_target: true,
            },
        );
    }

    /// Slots performed so far, in order.
    #[must_use]
    pub fn performed(&self) -> &[ActionSlot] {
        &self.performed
    }

    /// Number of abort requests.
    #[must_use]
    pub fn abort_count(&self) -> usize {
        self.aborts
    }

    /// Every notification shown, in order.
    #[must_use]
    pub fn notifications(&self) -> &[(String, Severity)] {
        &self.notifications
    }

    /// Notification texts only.
    #[must_use]
    pub fn messages(&self) -> Vec<&str> {
        self.notifications.iter().map(|(m, _)| m.as_str()).collect()
    }
}

impl HostAdapter for ScriptedHost {
    fn is_world_active(&self) -> bool {
        self.world_active
    }

    fn controlled_entity(&self) -> Option<EntityHandle> {
        self.entity.map(|_| ENTITY)
    }

    fn entity_info(&self, _entity: EntityHandle) -> EntityInfo {
        self.entity.expect("entity_info called without an entity")
    }

    fn loadout_slot(&self, slot: ActionSlot) -> Option<ActionId> {
        self.loadout.get(usize::from(slot.0)).copied().flatten()
    }

    fn action_definition(&self, action: ActionId) -> Option<ActionDefinition> {
        if self.unknown_actions {
            return None;
        }
        Some(self.definitions.get(&action).copied().unwrap_or_default())
    }

    fn has_target_selected(&self) -> bool {
        self.target_selected
    }

    fn cast_window_visible(&self) -> Option<bool> {
        self.cast_window
    }

    fn perform(&mut self, slot: ActionSlot) {
        self.performed.push(slot);
    }

    fn abort_current_action(&mut self) {
        self.aborts += 1;
    }

    fn notify(&mut self, message: &str, severity: Severity) {
        self.notifications.push((message.to_owned(), severity));
    }
}
