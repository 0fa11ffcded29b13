//! At-most-once bookkeeping for reminder windows.
//!
//! The tracker remembers which entities already fired in their current
//! window. It is owned by the scheduler loop and never shared.

use chrono::{DateTime, TimeZone};
use std::collections::HashSet;
use std::fmt;

use crate::core::types::{SlotId, TaskId};

/// Kind of entity a reminder belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Task,
    Slot,
}

/// An entity that can be reminded about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Entity {
    Task(TaskId),
    Slot(SlotId),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Task(_) => EntityKind::Task,
            Entity::Slot(_) => EntityKind::Slot,
        }
    }
}

impl From<TaskId> for Entity {
    fn from(id: TaskId) -> Self {
        Entity::Task(id)
    }
}

impl From<SlotId> for Entity {
    fn from(id: SlotId) -> Self {
        Entity::Slot(id)
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Entity::Task(id) => write!(f, "task:{}", id),
            Entity::Slot(id) => write!(f, "slot:{}", id),
        }
    }
}

/// Set of entities already notified in their current window.
#[derive(Debug, Default)]
pub struct DebounceTracker {
    tasks: HashSet<TaskId>,
    slots: HashSet<SlotId>,
}

impl DebounceTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// True when no reminder has fired yet for the entity's current window.
    pub fn should_notify(&self, entity: Entity) -> bool {
        !self.contains(entity)
    }

    /// Record that the entity fired in its current window.
    pub fn mark_notified(&mut self, entity: Entity) {
        match entity {
            Entity::Task(id) => {
                self.tasks.insert(id);
            }
            Entity::Slot(id) => {
                self.slots.insert(id);
            }
        }
    }

    /// Drop the entry for `entity` once `reference` is no longer in the future.
    ///
    /// Returns true when an entry was removed.
    pub fn clear_if_expired<Tz: TimeZone>(
        &mut self,
        entity: Entity,
        now: &DateTime<Tz>,
        reference: &DateTime<Tz>,
    ) -> bool {
        if reference > now {
            return false;
        }
        self.forget(entity)
    }

    /// Drop the entry for `entity` unconditionally.
    pub fn forget(&mut self, entity: Entity) -> bool {
        match entity {
            Entity::Task(id) => self.tasks.remove(&id),
            Entity::Slot(id) => self.slots.remove(&id),
        }
    }

    /// Keep only the entries for which `keep` returns true.
    ///
    /// Returns the number of entries dropped.
    pub fn retain(&mut self, mut keep: impl FnMut(Entity) -> bool) -> usize {
        let before = self.len();
        self.tasks.retain(|id| keep(Entity::Task(*id)));
        self.slots.retain(|id| keep(Entity::Slot(*id)));
        before - self.len()
    }

    /// Check whether the entity has an entry.
    pub fn contains(&self, entity: Entity) -> bool {
        match entity {
            Entity::Task(id) => self.tasks.contains(&id),
            Entity::Slot(id) => self.slots.contains(&id),
        }
    }

    /// Number of entries of the given kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Task => self.tasks.len(),
            EntityKind::Slot => self.slots.len(),
        }
    }

    /// Total number of entries.
    pub fn len(&self) -> usize {
        self.tasks.len() + self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forget every entry.
    pub fn reset(&mut self) {
        self.tasks.clear();
        self.slots.clear();
    }
}
