//! In-memory planner store.
//!
//! Provides a thread-safe store for tests, demos and the `memory` backend.
//! Data is not persisted across restarts.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;
use std::sync::atomic::{AtomicI64, Ordering};

use super::{Store, StoreError, group_by_day};
use crate::core::deadline::parse_deadline;
use crate::core::slot::{ClassSlot, parse_start_time, parse_weekday};
use crate::core::task::{ReminderPolicy, Task};
use crate::core::types::{SlotId, TaskId};

/// In-memory store with the planner's editing operations.
pub struct InMemoryStore {
    tasks: RwLock<HashMap<TaskId, Task>>,
    slots: RwLock<HashMap<SlotId, ClassSlot>>,
    next_id: AtomicI64,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tasks: RwLock::new(HashMap::new()),
            slots: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    fn allocate_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn reserve_id(&self, id: i64) {
        self.next_id.fetch_max(id.saturating_add(1), Ordering::SeqCst);
    }

    /// Insert a task under its own identifier.
    pub fn insert_task(&self, task: Task) -> Result<(), StoreError> {
        validate_task(&task)?;
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        if tasks.contains_key(&task.id) {
            return Err(StoreError::DuplicateKey(format!("task: {}", task.id)));
        }
        self.reserve_id(task.id.get());
        tasks.insert(task.id, task);
        Ok(())
    }

    /// Add a new, incomplete task and return it with its assigned id.
    pub fn add_task(
        &self,
        title: impl Into<String>,
        description: impl Into<String>,
        deadline: impl Into<String>,
        reminder: ReminderPolicy,
    ) -> Result<Task, StoreError> {
        let task = Task::new(TaskId::new(self.allocate_id()), title, deadline)
            .with_description(description)
            .with_reminder(reminder);
        self.insert_task(task.clone())?;
        Ok(task)
    }

    /// Set a task's completed flag.
    pub fn set_task_completed(&self, id: TaskId, completed: bool) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task: {}", id)))?;
        task.completed = completed;
        Ok(())
    }

    /// Change a task's reminder policy.
    pub fn set_task_reminder(&self, id: TaskId, reminder: ReminderPolicy) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        let task = tasks
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task: {}", id)))?;
        task.reminder = reminder;
        Ok(())
    }

    /// Delete a task.
    pub fn delete_task(&self, id: TaskId) -> Result<(), StoreError> {
        let mut tasks = self.tasks.write().map_err(|_| StoreError::LockPoisoned)?;
        tasks
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("task: {}", id)))?;
        Ok(())
    }

    /// Insert a class slot under its own identifier.
    pub fn insert_slot(&self, slot: ClassSlot) -> Result<(), StoreError> {
        validate_slot(&slot)?;
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        if slots.contains_key(&slot.id) {
            return Err(StoreError::DuplicateKey(format!("slot: {}", slot.id)));
        }
        self.reserve_id(slot.id.get());
        slots.insert(slot.id, slot);
        Ok(())
    }

    /// Add a new class slot and return it with its assigned id.
    pub fn add_slot(
        &self,
        weekday: impl Into<String>,
        subject: impl Into<String>,
        start_time: impl Into<String>,
        reminder_minutes: u32,
    ) -> Result<ClassSlot, StoreError> {
        let slot = ClassSlot::new(SlotId::new(self.allocate_id()), weekday, subject, start_time)
            .with_reminder_minutes(reminder_minutes);
        self.insert_slot(slot.clone())?;
        Ok(slot)
    }

    /// Delete a class slot.
    pub fn delete_slot(&self, id: SlotId) -> Result<(), StoreError> {
        let mut slots = self.slots.write().map_err(|_| StoreError::LockPoisoned)?;
        slots
            .remove(&id)
            .ok_or_else(|| StoreError::NotFound(format!("slot: {}", id)))?;
        Ok(())
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_task(task: &Task) -> Result<(), StoreError> {
    // Offset-free layouts never hit a DST gap in UTC, so this only checks shape.
    parse_deadline(&task.deadline, &Utc)
        .map(|_| ())
        .map_err(|e| StoreError::InvalidRecord(format!("task {}: {}", task.id, e)))
}

fn validate_slot(slot: &ClassSlot) -> Result<(), StoreError> {
    if parse_weekday(&slot.weekday).is_none() {
        return Err(StoreError::InvalidRecord(format!(
            "slot {}: unknown weekday '{}'",
            slot.id, slot.weekday
        )));
    }
    if parse_start_time(&slot.start_time).is_none() {
        return Err(StoreError::InvalidRecord(format!(
            "slot {}: start time '{}' is not HH:MM",
            slot.id, slot.start_time
        )));
    }
    Ok(())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let tasks = self.tasks.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut result: Vec<_> = tasks.values().cloned().collect();
        result.sort_by(|a, b| a.deadline.cmp(&b.deadline).then(a.id.cmp(&b.id)));
        Ok(result)
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        let slots = self.slots.read().map_err(|_| StoreError::LockPoisoned)?;
        let mut result: Vec<_> = slots.values().cloned().collect();
        result.sort_by(|a, b| a.start_time.cmp(&b.start_time).then(a.id.cmp(&b.id)));
        Ok(group_by_day(result))
    }
}
