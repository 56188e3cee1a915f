use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{
  debug,
  info,
  warn
};

use crate::storage::{
  KeyValueStore,
  Storage
};
use crate::task::{
  COMPLETED_FALLBACK_TITLE,
  CompletedTask,
  Subtask,
  Task,
  TaskId,
  subtask_counter_of,
  subtask_id
};

/// Decodes stored entries one at a time;
/// unreadable ones are skipped.
fn decode_entries<T: DeserializeOwned>(
  key: &str,
  entries: Vec<Value>
) -> Vec<T> {
  entries
    .into_iter()
    .enumerate()
    .filter_map(|(index, entry)| {
      serde_json::from_value(entry)
        .map_err(|err| {
          warn!(
            key,
            index,
            error = %err,
            "dropping unreadable stored entry"
          );
        })
        .ok()
    })
    .collect()
}

/// Authoritative in-memory task lists.
/// Every mutation ends in a full
/// [`TaskRepository::snapshot`]; there is
/// no incremental write path.
#[derive(Debug)]
pub struct TaskRepository<S> {
  storage:         Storage<S>,
  tasks:           Vec<Task>,
  completed:       Vec<CompletedTask>,
  task_counter:    u64,
  subtask_counter: u64
}

impl<S: KeyValueStore> TaskRepository<S> {
  pub fn new(storage: Storage<S>) -> Self {
    Self {
      storage,
      tasks: vec![],
      completed: vec![],
      task_counter: 0,
      subtask_counter: 0
    }
  }

  pub fn open(
    storage: Storage<S>,
    today: NaiveDate
  ) -> Self {
    let mut repo = Self::new(storage);
    repo.restore(today);
    repo
  }

  pub fn storage(&self) -> &Storage<S> {
    &self.storage
  }

  pub fn tasks(&self) -> &[Task] {
    &self.tasks
  }

  pub fn completed(
    &self
  ) -> &[CompletedTask] {
    &self.completed
  }

  pub fn task(
    &self,
    id: TaskId
  ) -> Option<&Task> {
    self.tasks.iter().find(|t| t.id == id)
  }

  pub fn completed_task(
    &self,
    id: TaskId
  ) -> Option<&CompletedTask> {
    self
      .completed
      .iter()
      .find(|t| t.id == id)
  }

  pub fn task_counter(&self) -> u64 {
    self.task_counter
  }

  pub fn subtask_counter(&self) -> u64 {
    self.subtask_counter
  }

  fn task_mut(
    &mut self,
    id: TaskId
  ) -> Option<&mut Task> {
    self
      .tasks
      .iter_mut()
      .find(|t| t.id == id)
  }

  /// Loads both lists and the counters.
  /// Unreadable entries and tasks with
  /// blank titles are dropped and, when
  /// any were, the cleaned list is written
  /// straight back. Returns the number of
  /// dropped tasks.
  #[tracing::instrument(skip(self))]
  pub fn restore(
    &mut self,
    today: NaiveDate
  ) -> usize {
    let keys = self.storage.keys().clone();

    let stored: Vec<Value> = self
      .storage
      .load(&keys.tasks, Vec::new());
    let before = stored.len();
    let mut tasks: Vec<Task> =
      decode_entries(&keys.tasks, stored)
        .into_iter()
        .filter(|t: &Task| !t.is_blank())
        .collect();
    let dropped = before - tasks.len();
    for task in &mut tasks {
      task
        .subtasks
        .retain(|s| !s.is_blank());
      task.refresh_date_label(today);
    }

    self.tasks = tasks;
    let stored_completed: Vec<Value> = self
      .storage
      .load(&keys.completed, Vec::new());
    let completed_before =
      stored_completed.len();
    self.completed = decode_entries(
      &keys.completed,
      stored_completed
    );

    if dropped > 0 {
      warn!(
        dropped,
        "dropped unreadable or untitled \
         tasks; compacting stored list"
      );
      self.save_tasks();
    }
    if self.completed.len()
      != completed_before
    {
      self.save_completed();
    }

    self.initialize_counters();

    info!(
      tasks = self.tasks.len(),
      completed = self.completed.len(),
      task_counter = self.task_counter,
      subtask_counter =
        self.subtask_counter,
      "restored task lists"
    );
    dropped
  }

  /// Counters never fall behind ids
  /// already in use.
  fn initialize_counters(&mut self) {
    let keys = self.storage.keys().clone();

    let stored_task: u64 = self
      .storage
      .load(&keys.task_counter, 0);
    let max_task_id = self
      .tasks
      .iter()
      .map(|t| t.id)
      .chain(
        self.completed.iter().map(|t| t.id)
      )
      .max()
      .unwrap_or(0);
    self.task_counter =
      stored_task.max(max_task_id);
    if self.task_counter != stored_task {
      debug!(
        stored = stored_task,
        raised = self.task_counter,
        "raising task counter"
      );
      self.storage.save(
        &keys.task_counter,
        &self.task_counter
      );
    }

    let stored_subtask: u64 = self
      .storage
      .load(&keys.subtask_counter, 0);
    let max_subtask = self
      .tasks
      .iter()
      .flat_map(|t| t.subtasks.iter())
      .filter_map(|s| {
        subtask_counter_of(&s.id)
      })
      .max()
      .unwrap_or(0);
    self.subtask_counter =
      stored_subtask.max(max_subtask);
    if self.subtask_counter
      != stored_subtask
    {
      debug!(
        stored = stored_subtask,
        raised = self.subtask_counter,
        "raising subtask counter"
      );
      self.storage.save(
        &keys.subtask_counter,
        &self.subtask_counter
      );
    }
  }

  fn persisted_tasks(&self) -> Vec<Task> {
    self
      .tasks
      .iter()
      .filter(|t| !t.is_blank())
      .map(Task::persisted)
      .collect()
  }

  fn save_tasks(&self) {
    let tasks = self.persisted_tasks();
    self.storage.save(
      &self.storage.keys().tasks,
      &tasks
    );
  }

  fn save_completed(&self) {
    self.storage.save(
      &self.storage.keys().completed,
      &self.completed
    );
  }

  /// Rewrites both persisted lists from
  /// the current model.
  #[tracing::instrument(skip(self))]
  pub fn snapshot(&self) {
    self.save_tasks();
    self.save_completed();
    debug!(
      tasks = self.tasks.len(),
      completed = self.completed.len(),
      "snapshot written"
    );
  }

  fn next_task_id(&mut self) -> TaskId {
    self.task_counter += 1;
    self.storage.save(
      &self.storage.keys().task_counter,
      &self.task_counter
    );
    self.task_counter
  }

  fn next_subtask_id(
    &mut self,
    task_id: TaskId
  ) -> String {
    self.subtask_counter += 1;
    self.storage.save(
      &self.storage.keys().subtask_counter,
      &self.subtask_counter
    );
    subtask_id(
      task_id,
      self.subtask_counter
    )
  }

  /// A blank name is ignored, not an
  /// error. The date defaults to today.
  #[tracing::instrument(skip(
    self,
    description
  ))]
  pub fn create_task(
    &mut self,
    name: &str,
    description: &str,
    date: Option<NaiveDate>,
    today: NaiveDate
  ) -> Option<TaskId> {
    let title = name.trim();
    if title.is_empty() {
      debug!("ignoring task with empty name");
      return None;
    }

    let id = self.next_task_id();
    let task = Task::new(
      id,
      title.to_string(),
      description.trim().to_string(),
      date.unwrap_or(today),
      today
    );
    self.tasks.push(task);
    self.snapshot();

    info!(id, "task created");
    Some(id)
  }

  #[tracing::instrument(skip(self))]
  pub fn rename(
    &mut self,
    id: TaskId,
    title: &str
  ) -> bool {
    let title = title.trim();
    if title.is_empty() {
      debug!(id, "ignoring rename to empty title");
      return false;
    }
    let Some(task) = self.task_mut(id)
    else {
      return false;
    };
    task.title = title.to_string();
    self.snapshot();
    true
  }

  /// Ticks or unticks a task without
  /// archiving it.
  #[tracing::instrument(skip(self))]
  pub fn set_checked(
    &mut self,
    id: TaskId,
    checked: bool
  ) -> bool {
    let Some(task) = self.task_mut(id)
    else {
      return false;
    };
    task.completed = checked;
    self.snapshot();
    true
  }

  /// Removes the task together with its
  /// subtasks.
  #[tracing::instrument(skip(self))]
  pub fn delete(
    &mut self,
    id: TaskId
  ) -> bool {
    let before = self.tasks.len();
    self.tasks.retain(|t| t.id != id);
    if self.tasks.len() == before {
      return false;
    }
    self.snapshot();
    info!(id, "task deleted");
    true
  }

  /// Moves a task to the completed list.
  /// Only id and title survive.
  #[tracing::instrument(skip(self))]
  pub fn complete(
    &mut self,
    id: TaskId
  ) -> Option<CompletedTask> {
    let idx = self
      .tasks
      .iter()
      .position(|t| t.id == id)?;
    let record =
      self.tasks.remove(idx).into_completed();
    self.completed.push(record.clone());
    self.snapshot();
    info!(id, "task completed");
    Some(record)
  }

  /// Brings an archived task back as a new
  /// bare task dated today.
  #[tracing::instrument(skip(self))]
  pub fn restore_from_completed(
    &mut self,
    id: TaskId,
    today: NaiveDate
  ) -> Option<TaskId> {
    let idx = self
      .completed
      .iter()
      .position(|t| t.id == id)?;
    let record = self.completed.remove(idx);
    let title = if record.title.trim().is_empty()
    {
      COMPLETED_FALLBACK_TITLE
    } else {
      record.title.as_str()
    };

    let new_id =
      self.create_task(title, "", None, today);
    info!(id, ?new_id, "completed task restored");
    new_id
  }

  #[tracing::instrument(skip(self))]
  pub fn delete_permanently(
    &mut self,
    id: TaskId
  ) -> bool {
    let before = self.completed.len();
    self.completed.retain(|t| t.id != id);
    if self.completed.len() == before {
      return false;
    }
    self.snapshot();
    info!(id, "completed task deleted permanently");
    true
  }

  /// Blank text is ignored.
  #[tracing::instrument(skip(self))]
  pub fn add_subtask(
    &mut self,
    task_id: TaskId,
    text: &str
  ) -> Option<String> {
    let text = text.trim();
    if text.is_empty() {
      debug!(task_id, "ignoring empty subtask");
      return None;
    }
    self.task(task_id)?;

    let id = self.next_subtask_id(task_id);
    let subtask =
      Subtask::new(id.clone(), text.to_string());
    self.task_mut(task_id)?.subtasks.push(subtask);
    self.snapshot();
    Some(id)
  }

  /// Text may become blank while being
  /// edited; such subtasks stay in memory
  /// but are left out of snapshots.
  #[tracing::instrument(skip(self))]
  pub fn edit_subtask(
    &mut self,
    task_id: TaskId,
    subtask_id: &str,
    text: &str
  ) -> bool {
    let Some(subtask) = self
      .task_mut(task_id)
      .and_then(|t| t.subtask_mut(subtask_id))
    else {
      return false;
    };
    subtask.text = text.trim().to_string();
    self.snapshot();
    true
  }

  #[tracing::instrument(skip(self))]
  pub fn set_subtask_checked(
    &mut self,
    task_id: TaskId,
    subtask_id: &str,
    checked: bool
  ) -> bool {
    let Some(subtask) = self
      .task_mut(task_id)
      .and_then(|t| t.subtask_mut(subtask_id))
    else {
      return false;
    };
    subtask.completed = checked;
    self.snapshot();
    true
  }

  #[tracing::instrument(skip(self))]
  pub fn delete_subtask(
    &mut self,
    task_id: TaskId,
    subtask_id: &str
  ) -> bool {
    let Some(task) = self.task_mut(task_id)
    else {
      return false;
    };
    let before = task.subtasks.len();
    task.subtasks.retain(|s| s.id != subtask_id);
    if task.subtasks.len() == before {
      return false;
    }
    self.snapshot();
    true
  }

  /// Empties both lists, resets the
  /// counters and removes every known key.
  #[tracing::instrument(skip(self))]
  pub fn clear_all(&mut self) {
    self.tasks.clear();
    self.completed.clear();
    self.task_counter = 0;
    self.subtask_counter = 0;
    self.storage.clear_all();
    info!("cleared all task data");
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::TaskRepository;
  use crate::storage::{
    KeyValueStore,
    MemoryStore,
    Storage
  };

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 10, 16)
      .expect("valid date")
  }

  fn repo(
    backend: &MemoryStore
  ) -> TaskRepository<MemoryStore> {
    TaskRepository::open(
      Storage::new(backend.clone(), "t"),
      today()
    )
  }

  #[test]
  fn blank_titles_are_compacted_on_restore()
  {
    let backend = MemoryStore::new();
    backend
      .set_item(
        "t_tasks",
        r#"[
          {"id":1,"title":"Keep","rawDate":"2026-10-16","subtasks":[{"id":"1-3","text":"step"}]},
          {"id":2,"title":"   ","rawDate":"2026-10-16"},
          {"id":3,"title":"Also keep","rawDate":"2026-10-20","subtasks":[{"id":"3-1","text":""}]}
        ]"#
      )
      .expect("seed tasks");

    let mut repo = repo(&backend);
    assert_eq!(repo.tasks().len(), 2);
    assert!(repo.tasks()[1].subtasks.is_empty());
    assert_eq!(repo.tasks()[1].date, "20 Oct 2026");

    let stored = backend
      .raw("t_tasks")
      .expect("compacted list written");
    assert!(!stored.contains("\"id\":2"));

    assert_eq!(repo.restore(today()), 0);
    assert_eq!(repo.task_counter(), 3);
    assert_eq!(repo.subtask_counter(), 3);
  }

  #[test]
  fn unreadable_entries_do_not_sink_the_list()
  {
    let backend = MemoryStore::new();
    backend
      .set_item(
        "t_tasks",
        r#"[
          {"id":1,"title":"Keep","rawDate":"2026-10-16"},
          {"id":2,"title":null,"rawDate":"2026-10-16"},
          null,
          {"id":4,"title":"No date"}
        ]"#
      )
      .expect("seed tasks");
    backend
      .set_item(
        "t_completed_tasks",
        r#"[{"id":6,"title":"Done"},{"title":"no id"}]"#
      )
      .expect("seed completed");

    let mut repo = repo(&backend);
    let titles: Vec<&str> = repo
      .tasks()
      .iter()
      .map(|t| t.title.as_str())
      .collect();
    assert_eq!(titles, vec!["Keep"]);
    assert_eq!(repo.completed().len(), 1);

    let stored: Vec<serde_json::Value> =
      serde_json::from_str(
        &backend.raw("t_tasks").expect("tasks")
      )
      .expect("task json");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], "Keep");
    let completed: Vec<serde_json::Value> =
      serde_json::from_str(
        &backend
          .raw("t_completed_tasks")
          .expect("completed")
      )
      .expect("completed json");
    assert_eq!(
      completed,
      vec![serde_json::json!({"id": 6, "title": "Done"})]
    );

    let next = repo
      .create_task("New", "", None, today())
      .expect("create");
    assert_eq!(next, 7);
    assert_eq!(repo.tasks().len(), 2);
  }

  #[test]
  fn counters_survive_reload() {
    let backend = MemoryStore::new();
    let mut first = repo(&backend);
    let a = first
      .create_task("a", "", None, today())
      .expect("create a");
    first.delete(a);

    let mut second = repo(&backend);
    let b = second
      .create_task("b", "", None, today())
      .expect("create b");
    assert_eq!(b, a + 1);

    let sub = second
      .add_subtask(b, "step")
      .expect("add subtask");
    assert_eq!(sub, format!("{b}-1"));
    let third = repo(&backend);
    assert_eq!(third.subtask_counter(), 1);
  }

  #[test]
  fn rename_ignores_blank_and_unknown() {
    let backend = MemoryStore::new();
    let mut repo = repo(&backend);
    let id = repo
      .create_task("Old", "", None, today())
      .expect("create");

    assert!(!repo.rename(id, "  "));
    assert!(!repo.rename(id + 10, "New"));
    assert!(repo.rename(id, " New "));
    assert_eq!(
      repo.task(id).map(|t| t.title.as_str()),
      Some("New")
    );
  }

  #[test]
  fn blank_subtask_edit_is_not_persisted()
  {
    let backend = MemoryStore::new();
    let mut repo = repo(&backend);
    let id = repo
      .create_task("Trip", "", None, today())
      .expect("create");
    let sub = repo
      .add_subtask(id, "pack")
      .expect("add subtask");

    assert!(repo.edit_subtask(id, &sub, "   "));
    assert_eq!(
      repo.task(id).map(|t| t.subtasks.len()),
      Some(1)
    );

    let reloaded = self::repo(&backend);
    assert_eq!(
      reloaded
        .task(id)
        .map(|t| t.subtasks.len()),
      Some(0)
    );
  }

  #[test]
  fn storage_failure_keeps_model_usable() {
    let backend = MemoryStore::new();
    let mut repo = repo(&backend);
    backend.set_read_only(true);

    let id = repo
      .create_task("Offline", "", None, today())
      .expect("create while read-only");
    assert_eq!(repo.tasks().len(), 1);
    assert!(repo.add_subtask(id, "still works").is_some());
    assert!(backend.is_empty());
  }

  #[test]
  fn clear_all_resets_everything() {
    let backend = MemoryStore::new();
    let mut repo = repo(&backend);
    let id = repo
      .create_task("x", "", None, today())
      .expect("create");
    repo.complete(id);
    repo.clear_all();

    assert!(repo.tasks().is_empty());
    assert!(repo.completed().is_empty());
    assert_eq!(repo.task_counter(), 0);
    assert!(backend.is_empty());
  }
}
