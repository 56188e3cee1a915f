use chrono::{Days, NaiveDate};
use serde_json::Value;
use wazwez_core::form::FormField;
use wazwez_core::storage::MemoryStore;
use wazwez_core::task::Task;
use wazwez_core::{AppConfig, Board, KeyValueStore};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date")
}

fn open(store: &MemoryStore) -> Board<MemoryStore> {
    Board::open(store.clone(), AppConfig::default(), today())
}

fn stored_tasks(store: &MemoryStore) -> Vec<Task> {
    let raw = store.raw("wazwez_tasks").expect("tasks persisted");
    serde_json::from_str(&raw).expect("task json")
}

fn stored_json(store: &MemoryStore, key: &str) -> Value {
    let raw = store.raw(key).expect("key persisted");
    serde_json::from_str(&raw).expect("json")
}

fn yes(_: &str) -> bool {
    true
}

#[test]
fn buy_milk_is_persisted_with_the_next_id() {
    let store = MemoryStore::new();
    store
        .set_item("wazwez_task_counter", "6")
        .expect("seed counter");
    let mut board = open(&store);

    board.controller_mut().toggle_form(today());
    let storage = board.storage().clone();
    board
        .controller_mut()
        .input(FormField::Name, "Buy milk", &storage);
    board
        .controller_mut()
        .input(FormField::Date, "", &storage);
    let id = board.submit_form(today()).expect("task created");
    assert_eq!(id, 7);

    let tasks = stored_json(&store, "wazwez_tasks");
    assert_eq!(
        tasks,
        serde_json::json!([{
            "id": 7,
            "title": "Buy milk",
            "description": "",
            "date": "Today",
            "rawDate": "2026-10-16",
            "completed": false,
            "subtasks": []
        }])
    );
    assert_eq!(stored_json(&store, "wazwez_task_counter"), serde_json::json!(7));
    assert!(store.raw("wazwez_temp_form_data").is_none());
}

#[test]
fn completing_then_restoring_keeps_only_the_title() {
    let store = MemoryStore::new();
    let mut board = open(&store);
    let repo = board.repository_mut();
    let id = repo
        .create_task(
            "Plan trip",
            "pack bags",
            today().checked_add_days(Days::new(9)),
            today(),
        )
        .expect("created");
    repo.add_subtask(id, "book hotel").expect("subtask");

    let ticket = board.set_checked(id, true).expect("scheduled");
    assert!(board.finish(ticket));
    assert!(board.repository().tasks().is_empty());
    assert_eq!(
        stored_json(&store, "wazwez_completed_tasks"),
        serde_json::json!([{ "id": id, "title": "Plan trip" }])
    );

    let restored = board
        .restore_completed(id, today())
        .expect("restored");
    assert_ne!(restored, id);
    assert!(board.repository().completed().is_empty());

    let view = board.view(today());
    assert_eq!(view.tasks.len(), 1);
    assert_eq!(view.tasks[0].title, "Plan trip");
    assert_eq!(view.tasks[0].description, "");
    assert_eq!(view.tasks[0].date_label, "Today");
    assert!(view.tasks[0].subtasks.is_empty());
    assert_eq!(view.completed_label, "Completed (0)");
}

#[test]
fn empty_subtask_is_never_persisted() {
    let store = MemoryStore::new();
    let mut board = open(&store);
    let repo = board.repository_mut();
    let id = repo
        .create_task("Groceries", "", None, today())
        .expect("created");

    assert!(repo.add_subtask(id, "   ").is_none());
    let sub = repo.add_subtask(id, "eggs").expect("subtask");
    assert!(repo.edit_subtask(id, &sub, ""));

    let tasks = stored_tasks(&store);
    assert_eq!(tasks.len(), 1);
    assert!(tasks[0].subtasks.is_empty());
}

#[test]
fn deleting_the_only_task_removes_its_subtasks() {
    let store = MemoryStore::new();
    let mut board = open(&store);
    let id = board
        .repository_mut()
        .create_task("Lonely", "", None, today())
        .expect("created");
    board
        .repository_mut()
        .add_subtask(id, "step")
        .expect("subtask");
    board.controller_mut().overlays_mut().toggle_subtask_section(id);

    let ticket = board.request_delete(id, &yes).expect("scheduled");
    assert!(board.finish(ticket));

    assert!(stored_tasks(&store).is_empty());
    assert_eq!(board.controller().overlays().active_dropdown_count(), 0);
}

#[test]
fn reload_compacts_blank_titles_once() {
    let store = MemoryStore::new();
    store
        .set_item(
            "wazwez_tasks",
            r#"[
                {"id":1,"title":"Keep","rawDate":"2026-10-17","subtasks":[{"id":"1-1","text":"a"},{"id":"1-2","text":" "}]},
                {"id":2,"title":"  ","rawDate":"2026-10-17"},
                {"id":3,"title":"Also keep","rawDate":"2026-12-25","completed":true}
            ]"#,
        )
        .expect("seed tasks");

    let board = open(&store);
    let first: Vec<(u64, String, String)> = board
        .repository()
        .tasks()
        .iter()
        .map(|t| (t.id, t.title.clone(), t.date.clone()))
        .collect();
    assert_eq!(
        first,
        vec![
            (1, "Keep".to_string(), "Tomorrow".to_string()),
            (3, "Also keep".to_string(), "25 Dec 2026".to_string()),
        ]
    );
    assert_eq!(board.repository().tasks()[0].subtasks.len(), 1);

    let compacted = stored_tasks(&store);
    assert_eq!(compacted.len(), 2);

    let again = open(&store);
    assert_eq!(again.repository().tasks(), board.repository().tasks());
    assert_eq!(stored_tasks(&store), compacted);
    assert_eq!(again.repository().task_counter(), 3);
}

#[test]
fn one_bad_entry_does_not_lose_the_rest() {
    let store = MemoryStore::new();
    store
        .set_item(
            "wazwez_tasks",
            r#"[
                {"id":1,"title":"Keep","rawDate":"2026-10-16"},
                {"id":2,"title":null,"rawDate":"2026-10-16"}
            ]"#,
        )
        .expect("seed tasks");

    let mut board = open(&store);
    let id = board
        .repository_mut()
        .create_task("New", "", None, today())
        .expect("created");
    assert_eq!(id, 2);

    let titles: Vec<String> = stored_tasks(&store)
        .into_iter()
        .map(|t| t.title)
        .collect();
    assert_eq!(titles, vec!["Keep".to_string(), "New".to_string()]);
}

#[test]
fn broken_storage_behaves_as_empty() {
    let store = MemoryStore::new();
    store
        .set_item("wazwez_tasks", "{not json")
        .expect("seed");
    store
        .set_item("wazwez_temp_form_data", "{oops")
        .expect("seed");

    let mut board = open(&store);
    assert!(board.repository().tasks().is_empty());
    assert!(!board.controller().form().is_visible());

    store.set_read_only(true);
    let id = board
        .repository_mut()
        .create_task("Still works", "", None, today());
    assert_eq!(id, Some(1));
    assert_eq!(board.repository().tasks().len(), 1);
}
