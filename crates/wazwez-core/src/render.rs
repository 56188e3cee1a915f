use chrono::NaiveDate;

use crate::controller::Overlays;
use crate::datetime::{
  format_date_for_display,
  format_input_date
};
use crate::task::{
  CompletedTask,
  Subtask,
  Task,
  TaskId
};
use crate::transitions::{
  ElementKey,
  Transitions
};

pub const VISIBLE_CLASS: &str =
  "dropdown-active";
pub const HIDDEN_CLASS: &str = "hidden";
pub const ARROW_ROTATED_CLASS: &str =
  "arrow-rotated";
pub const LEAVING_CLASS: &str =
  "task-leaving";
pub const CHECKED_CLASS: &str =
  "checked";
pub const STRUCK_CLASS: &str =
  "line-through";

#[must_use]
pub fn visibility_class(
  open: bool
) -> &'static str {
  if open {
    VISIBLE_CLASS
  } else {
    HIDDEN_CLASS
  }
}

#[must_use]
pub fn arrow_class(
  open: bool
) -> &'static str {
  if open { ARROW_ROTATED_CLASS } else { "" }
}

/// Display order of the active list. The
/// stored order is always creation order.
#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
)]
pub enum SortOption {
  #[default]
  Default,
  Date,
  Title
}

impl SortOption {
  pub const ALL: [SortOption; 3] = [
    SortOption::Default,
    SortOption::Date,
    SortOption::Title
  ];

  #[must_use]
  pub fn key(self) -> &'static str {
    match self {
      | Self::Default => "default",
      | Self::Date => "date",
      | Self::Title => "title"
    }
  }

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | Self::Default => "Default",
      | Self::Date => "Date",
      | Self::Title => "Name"
    }
  }
}

#[must_use]
pub fn sorted(
  tasks: &[Task],
  sort: SortOption
) -> Vec<&Task> {
  let mut out: Vec<&Task> =
    tasks.iter().collect();
  match sort {
    | SortOption::Default => {}
    | SortOption::Date => {
      out.sort_by_key(|t| {
        (t.raw_date, t.id)
      })
    }
    | SortOption::Title => {
      out.sort_by_cached_key(|t| {
        (t.title.to_lowercase(), t.id)
      })
    }
  }
  out
}

#[derive(Debug, Clone, PartialEq)]
pub struct SubtaskView {
  pub id:        String,
  pub text:      String,
  pub completed: bool
}

#[derive(Debug, Clone, PartialEq)]
pub struct TaskView {
  pub id:            TaskId,
  pub title:         String,
  pub description:   String,
  pub date_label:    String,
  pub raw_date:      String,
  pub completed:     bool,
  pub leaving:       bool,
  pub menu_open:     bool,
  pub subtasks_open: bool,
  pub subtasks:      Vec<SubtaskView>,
  /// "done/total", empty without
  /// subtasks.
  pub progress:      String
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletedView {
  pub id:        TaskId,
  pub title:     String,
  pub menu_open: bool,
  pub leaving:   bool
}

fn subtask_view(
  subtask: &Subtask
) -> SubtaskView {
  SubtaskView {
    id:        subtask.id.clone(),
    text:      subtask.text.clone(),
    completed: subtask.completed
  }
}

#[must_use]
pub fn task_view(
  task: &Task,
  today: NaiveDate,
  overlays: &Overlays,
  transitions: &Transitions
) -> TaskView {
  let done = task
    .subtasks
    .iter()
    .filter(|s| s.completed)
    .count();
  let progress =
    if task.subtasks.is_empty() {
      String::new()
    } else {
      format!(
        "{done}/{}",
        task.subtasks.len()
      )
    };

  TaskView {
    id: task.id,
    title: task.title.clone(),
    description: task
      .description
      .clone(),
    date_label:
      format_date_for_display(
        task.raw_date,
        today
      ),
    raw_date: format_input_date(
      task.raw_date
    ),
    completed: task.completed,
    leaving: transitions.is_pending(
      ElementKey::Task(task.id)
    ),
    menu_open: overlays
      .is_task_dropdown_open(task.id),
    subtasks_open: overlays
      .is_subtask_section_open(task.id),
    subtasks: task
      .subtasks
      .iter()
      .map(subtask_view)
      .collect(),
    progress
  }
}

#[must_use]
pub fn completed_view(
  record: &CompletedTask,
  overlays: &Overlays,
  transitions: &Transitions
) -> CompletedView {
  CompletedView {
    id:        record.id,
    title:     record.title.clone(),
    menu_open: overlays
      .is_completed_dropdown_open(
        record.id
      ),
    leaving:   transitions.is_pending(
      ElementKey::Completed(record.id)
    )
  }
}

#[must_use]
pub fn completed_count_label(
  count: usize
) -> String {
  format!("Completed ({count})")
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::task::Subtask;
  use crate::transitions::PendingAction;

  fn day(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn task(
    id: TaskId,
    title: &str,
    date: NaiveDate
  ) -> Task {
    Task::new(
      id,
      title.to_string(),
      String::new(),
      date,
      date
    )
  }

  #[test]
  fn sort_options_reorder_a_copy() {
    let tasks = vec![
      task(1, "walk dog", day(2026, 10, 20)),
      task(2, "Buy milk", day(2026, 10, 18)),
      task(3, "call bank", day(2026, 10, 18)),
    ];

    let ids = |sort| {
      sorted(&tasks, sort)
        .iter()
        .map(|t| t.id)
        .collect::<Vec<_>>()
    };
    assert_eq!(
      ids(SortOption::Default),
      vec![1, 2, 3]
    );
    assert_eq!(
      ids(SortOption::Date),
      vec![2, 3, 1]
    );
    assert_eq!(
      ids(SortOption::Title),
      vec![2, 3, 1]
    );
  }

  #[test]
  fn task_view_reflects_overlays_and_transitions()
  {
    let today = day(2026, 10, 16);
    let mut t =
      task(5, "Clean", day(2026, 10, 17));
    t.subtasks.push(Subtask {
      id:        "5-1".into(),
      text:      "kitchen".into(),
      completed: true
    });
    t.subtasks.push(Subtask::new(
      "5-2".into(),
      "hall".into()
    ));

    let mut overlays = Overlays::default();
    overlays.toggle_subtask_section(5);
    let mut transitions =
      Transitions::new();
    transitions.begin(
      ElementKey::Task(5),
      PendingAction::Delete
    );

    let view = task_view(
      &t,
      today,
      &overlays,
      &transitions
    );
    assert_eq!(view.date_label, "Tomorrow");
    assert_eq!(view.raw_date, "2026-10-17");
    assert_eq!(view.progress, "1/2");
    assert!(view.subtasks_open);
    assert!(!view.menu_open);
    assert!(view.leaving);
  }

  #[test]
  fn visibility_classes() {
    assert_eq!(
      visibility_class(true),
      "dropdown-active"
    );
    assert_eq!(
      visibility_class(false),
      "hidden"
    );
    assert_eq!(arrow_class(false), "");
    assert_eq!(
      completed_count_label(3),
      "Completed (3)"
    );
  }
}
