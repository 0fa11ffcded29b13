//! Configuration integration tests.

use duebell::config::{ConfigLoader, NotifierConfig, StorageConfig};
use duebell::{Entity, InMemoryStore, ReminderScheduler, SlotId, TaskId, due_reminders};
use std::io::Write;
use tempfile::NamedTempFile;

use crate::common::{recording_dispatcher, wib};

const PLANNER_YAML: &str = r#"
tick_interval_secs: 10
app_name: Planner
notifier:
  type: none
seed:
  tasks:
    - id: 1
      title: Essay
      deadline: "2025-01-13T15:00"
      reminder: "30"
    - id: 2
      title: Reading
      deadline: "2025-01-13 18:00"
      reminder: HOURLY_ON_DUE_DAY
    - id: 3
      title: Archived
      deadline: "2025-01-13T15:00"
      completed: true
      reminder: "30"
  class_slots:
    - id: 4
      weekday: Senin
      subject: Algorithms
      start_time: "14:45"
      reminder_minutes: 15
    - id: 5
      weekday: Tuesday
      subject: Physics
      start_time: "14:45"
      reminder_minutes: 15
"#;

fn seeded_store(yaml: &str) -> (duebell::DuebellConfig, InMemoryStore) {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(yaml.as_bytes()).unwrap();

    let config = ConfigLoader::load(file.path()).unwrap();
    let store = InMemoryStore::new();
    for task in &config.seed.tasks {
        store.insert_task(task.clone()).unwrap();
    }
    for slot in &config.seed.class_slots {
        store.insert_slot(slot.clone()).unwrap();
    }
    (config, store)
}

#[tokio::test]
async fn test_seeded_store_from_file() {
    let (config, store) = seeded_store(PLANNER_YAML);
    assert_eq!(config.storage, StorageConfig::Memory);
    assert_eq!(config.notifier, NotifierConfig::None);

    let due = due_reminders(&store, &wib(2025, 1, 13, 14, 30, 10)).await.unwrap();
    let entities: Vec<Entity> = due.iter().map(|r| r.entity).collect();
    assert_eq!(
        entities,
        vec![Entity::Task(TaskId::new(1)), Entity::Slot(SlotId::new(4))]
    );
}

#[tokio::test]
async fn test_configured_interval_drives_scheduler() {
    let (config, store) = seeded_store(PLANNER_YAML);
    let (dispatcher, _bus, notifier) = recording_dispatcher();

    let mut scheduler = ReminderScheduler::new(store)
        .with_dispatcher(dispatcher)
        .with_tick_interval(config.tick_interval())
        .unwrap();
    assert_eq!(scheduler.tick_interval().as_secs(), 10);

    // Hourly reminder for Reading at 15:00:05 on the due day.
    let report = scheduler.tick(wib(2025, 1, 13, 15, 0, 5)).await.unwrap();
    assert_eq!(report.notified, vec![Entity::Task(TaskId::new(2))]);
    assert_eq!(notifier.count(), 1);
}

#[test]
fn test_invalid_seed_rejected_by_store() {
    let yaml = r#"
seed:
  tasks:
    - id: 1
      title: Broken
      deadline: "next friday"
"#;
    let config = ConfigLoader::parse(yaml).unwrap();
    let store = InMemoryStore::new();
    assert!(store.insert_task(config.seed.tasks[0].clone()).is_err());
}
