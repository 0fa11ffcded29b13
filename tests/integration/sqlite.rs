//! SQLite store integration tests.
//!
//! The store reads an existing planner database; these tests create one in
//! a temporary directory the way the planner UI would.

use duebell::{ReminderScheduler, SlotId, SqliteLayout, SqliteStore, Store, TaskId};
use duebell::{Entity, due_reminders};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tempfile::TempDir;

use crate::common::{recording_dispatcher, wib};

async fn create_planner_db(path: &Path) {
    let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
        .unwrap()
        .create_if_missing(true);
    let pool = SqlitePoolOptions::new().connect_with(options).await.unwrap();
    sqlx::raw_sql(
        r#"
        CREATE TABLE tugas (id INTEGER PRIMARY KEY, judul TEXT, deskripsi TEXT,
            deadline TEXT, selesai BOOLEAN, reminder TEXT);
        CREATE TABLE jadwal_kelas (id INTEGER PRIMARY KEY, hari TEXT,
            mata_kuliah TEXT, jam_mulai TEXT, reminder INTEGER);
        INSERT INTO tugas VALUES (1, 'Laporan', '', '2025-01-13 10:00', 0, 'HOURLY_ON_DUE_DAY');
        INSERT INTO tugas VALUES (2, 'Makalah', NULL, '2025-01-13T09:00', 0, '15');
        INSERT INTO tugas VALUES (3, 'Kuis', NULL, 'besok pagi', 0, '10');
        INSERT INTO tugas VALUES (4, NULL, NULL, '2025-01-13T09:00', NULL, '15');
        INSERT INTO jadwal_kelas VALUES (1, 'Senin', 'Basis Data', '09:00', 15);
        INSERT INTO jadwal_kelas VALUES (2, 'Selasa', 'Jaringan', '09:00', 15);
        INSERT INTO jadwal_kelas VALUES (3, NULL, 'Sistem Operasi', '09:00', 15);
        "#,
    )
    .execute(&pool)
    .await
    .unwrap();
    pool.close().await;
}

#[tokio::test]
async fn test_scheduler_over_planner_database() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("planner.db");
    create_planner_db(&db_path).await;

    let store = Arc::new(SqliteStore::new(&db_path, SqliteLayout::INDONESIAN).await.unwrap());
    let (dispatcher, _bus, notifier) = recording_dispatcher();
    let mut scheduler =
        ReminderScheduler::with_store(Arc::clone(&store)).with_dispatcher(dispatcher);

    // Monday 08:45:05: Makalah is 15 minutes out, Basis Data starts at 09:00,
    // Laporan's hourly window is not open (minute 45). Rows with NULL
    // required cells are skipped without failing the tick.
    let report = scheduler.tick(wib(2025, 1, 13, 8, 45, 5)).await.unwrap();
    assert_eq!(report.tasks_checked, 3);
    assert_eq!(report.slots_checked, 2);
    assert_eq!(report.unparseable, 1);
    assert_eq!(
        report.notified,
        vec![Entity::Task(TaskId::new(2)), Entity::Slot(SlotId::new(1))]
    );

    // Top of the hour on the due day.
    let report = scheduler.tick(wib(2025, 1, 13, 9, 0, 10)).await.unwrap();
    assert_eq!(report.notified, vec![Entity::Task(TaskId::new(1))]);
    assert_eq!(notifier.count(), 3);

    store.close().await;
}

#[tokio::test]
async fn test_completed_row_stops_reminders() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("planner.db");
    create_planner_db(&db_path).await;

    let store = SqliteStore::new(&db_path, SqliteLayout::INDONESIAN).await.unwrap();
    sqlx::query("UPDATE tugas SET selesai = 1 WHERE id = 2")
        .execute(store.pool())
        .await
        .unwrap();

    let due = due_reminders(&store, &wib(2025, 1, 13, 8, 45, 5)).await.unwrap();
    assert_eq!(due.len(), 1);
    assert_eq!(due[0].entity, Entity::Slot(SlotId::new(1)));

    let tasks = store.fetch_tasks().await.unwrap();
    assert!(tasks.iter().any(|t| t.id == TaskId::new(2) && t.completed));
    store.close().await;
}

#[tokio::test]
async fn test_wrong_layout_fails_tick() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("planner.db");
    create_planner_db(&db_path).await;

    let store = SqliteStore::new(&db_path, SqliteLayout::STANDARD).await.unwrap();
    let mut scheduler = ReminderScheduler::new(store);
    assert!(scheduler.tick(wib(2025, 1, 13, 8, 45, 5)).await.is_err());
}
