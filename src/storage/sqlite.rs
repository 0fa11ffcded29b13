//! SQLite planner reader.
//!
//! Reads tasks and class slots from an existing planner database. The
//! tables belong to the planner; this backend never creates or migrates
//! them.

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;

use super::{Store, StoreError, group_by_day, policy_or_none};
use crate::core::slot::ClassSlot;
use crate::core::task::Task;
use crate::core::types::{SlotId, TaskId};

/// Table and column names of a planner database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteLayout {
    pub task_table: &'static str,
    /// Task columns: id, title, description, deadline, completed, reminder.
    pub task_columns: [&'static str; 6],
    pub slot_table: &'static str,
    /// Slot columns: id, weekday, subject, start time, reminder minutes.
    pub slot_columns: [&'static str; 5],
}

impl SqliteLayout {
    /// `tasks` and `class_slots` tables.
    pub const STANDARD: SqliteLayout = SqliteLayout {
        task_table: "tasks",
        task_columns: ["id", "title", "description", "deadline", "completed", "reminder"],
        slot_table: "class_slots",
        slot_columns: ["id", "weekday", "subject", "start_time", "reminder_minutes"],
    };

    /// `tugas` and `jadwal_kelas` tables written by the Indonesian planner UI.
    pub const INDONESIAN: SqliteLayout = SqliteLayout {
        task_table: "tugas",
        task_columns: ["id", "judul", "deskripsi", "deadline", "selesai", "reminder"],
        slot_table: "jadwal_kelas",
        slot_columns: ["id", "hari", "mata_kuliah", "jam_mulai", "reminder"],
    };

    fn task_query(&self) -> String {
        let [id, title, description, deadline, completed, reminder] = self.task_columns;
        format!(
            "SELECT {id}, {title}, {description}, {deadline}, {completed}, {reminder} \
             FROM {table} ORDER BY {deadline} ASC, {id} ASC",
            table = self.task_table,
        )
    }

    fn slot_query(&self) -> String {
        let [id, weekday, subject, start_time, reminder] = self.slot_columns;
        format!(
            "SELECT {id}, {weekday}, {subject}, {start_time}, {reminder} \
             FROM {table} ORDER BY {start_time} ASC, {id} ASC",
            table = self.slot_table,
        )
    }
}

impl Default for SqliteLayout {
    fn default() -> Self {
        Self::STANDARD
    }
}

// Planner databases declare most columns nullable.
type TaskRow = (
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    Option<bool>,
    Option<String>,
);
type SlotRow = (i64, Option<String>, Option<String>, Option<String>, Option<i64>);

/// SQLite store backend.
pub struct SqliteStore {
    pool: SqlitePool,
    layout: SqliteLayout,
}

impl SqliteStore {
    /// Open an existing planner database.
    ///
    /// Fails if the file does not exist.
    pub async fn new(path: impl AsRef<Path>, layout: SqliteLayout) -> Result<Self, StoreError> {
        let path_str = path.as_ref().to_string_lossy();
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path_str))
            .map_err(|e| StoreError::Other(e.to_string()))?
            .create_if_missing(false);

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        Ok(Self { pool, layout })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: SqlitePool, layout: SqliteLayout) -> Self {
        Self { pool, layout }
    }

    /// The underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn layout(&self) -> &SqliteLayout {
        &self.layout
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn task_from_row(row: TaskRow) -> Option<Task> {
    let (id, title, description, deadline, completed, reminder) = row;
    let (Some(title), Some(deadline)) = (title, deadline) else {
        tracing::warn!(task_id = id, "Skipping task row with missing title or deadline");
        return None;
    };
    let context = format!("task {}", id);
    Some(
        Task::new(TaskId::new(id), title, deadline)
            .with_description(description.unwrap_or_default())
            .with_completed(completed.unwrap_or(false))
            .with_reminder(policy_or_none(reminder.as_deref().unwrap_or("NONE"), &context)),
    )
}

fn slot_from_row(row: SlotRow) -> Option<ClassSlot> {
    let (id, weekday, subject, start_time, reminder) = row;
    let (Some(weekday), Some(subject), Some(start_time)) = (weekday, subject, start_time) else {
        tracing::warn!(slot_id = id, "Skipping class slot row with missing day, subject or start time");
        return None;
    };
    let reminder = reminder.unwrap_or(0);
    let minutes = u32::try_from(reminder).unwrap_or_else(|_| {
        tracing::warn!(slot_id = id, reminder, "Ignoring out-of-range reminder minutes");
        0
    });
    Some(
        ClassSlot::new(SlotId::new(id), weekday, subject, start_time)
            .with_reminder_minutes(minutes),
    )
}

#[async_trait]
impl Store for SqliteStore {
    async fn fetch_tasks(&self) -> Result<Vec<Task>, StoreError> {
        let rows: Vec<TaskRow> = sqlx::query_as(&self.layout.task_query())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        Ok(rows.into_iter().filter_map(task_from_row).collect())
    }

    async fn fetch_schedules_by_day(&self) -> Result<BTreeMap<String, Vec<ClassSlot>>, StoreError> {
        let rows: Vec<SlotRow> = sqlx::query_as(&self.layout.slot_query())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::Other(e.to_string()))?;

        Ok(group_by_day(rows.into_iter().filter_map(slot_from_row)))
    }
}
