use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::datetime::format_date_for_display;

pub type TaskId = u64;

/// Title an archived task gets when its own title was empty.
pub const COMPLETED_FALLBACK_TITLE: &str = "Completed Task";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: String,

    #[serde(default)]
    pub text: String,

    #[serde(default)]
    pub completed: bool,
}

impl Subtask {
    pub fn new(id: String, text: String) -> Self {
        Self {
            id,
            text,
            completed: false,
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,

    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Display label ("Today", "Tomorrow", "05 Nov 2026"), derived from
    /// `raw_date` against the day it was last rendered.
    #[serde(default)]
    pub date: String,

    pub raw_date: NaiveDate,

    #[serde(default)]
    pub completed: bool,

    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Task {
    pub fn new(
        id: TaskId,
        title: String,
        description: String,
        raw_date: NaiveDate,
        today: NaiveDate,
    ) -> Self {
        Self {
            id,
            title,
            description,
            date: format_date_for_display(raw_date, today),
            raw_date,
            completed: false,
            subtasks: vec![],
        }
    }

    pub fn is_blank(&self) -> bool {
        self.title.trim().is_empty()
    }

    pub fn refresh_date_label(&mut self, today: NaiveDate) {
        self.date = format_date_for_display(self.raw_date, today);
    }

    pub fn subtask_mut(&mut self, subtask_id: &str) -> Option<&mut Subtask> {
        self.subtasks.iter_mut().find(|s| s.id == subtask_id)
    }

    /// Copy suitable for persistence: subtasks with empty text are left out.
    pub fn persisted(&self) -> Self {
        let mut out = self.clone();
        out.subtasks.retain(|s| !s.is_blank());
        out
    }

    /// Archive this task. Description, date and subtasks do not survive.
    pub fn into_completed(self) -> CompletedTask {
        let title = if self.is_blank() {
            COMPLETED_FALLBACK_TITLE.to_string()
        } else {
            self.title
        };
        CompletedTask { id: self.id, title }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompletedTask {
    pub id: TaskId,

    #[serde(default)]
    pub title: String,
}

/// Subtask ids are `"{task_id}-{counter}"`.
pub fn subtask_id(task_id: TaskId, counter: u64) -> String {
    format!("{task_id}-{counter}")
}

/// Counter part of a subtask id, when it has the `"{task_id}-{counter}"` shape.
pub fn subtask_counter_of(subtask_id: &str) -> Option<u64> {
    subtask_id
        .rsplit_once('-')
        .and_then(|(_, n)| n.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let today = day(2026, 10, 16);
        let mut task = Task::new(3, "Buy milk".into(), String::new(), today, today);
        task.subtasks.push(Subtask::new(subtask_id(3, 1), "oat".into()));

        let json = serde_json::to_value(&task).expect("serialize");
        assert_eq!(json["rawDate"], "2026-10-16");
        assert_eq!(json["date"], "Today");
        assert_eq!(json["subtasks"][0]["id"], "3-1");
        assert_eq!(json["completed"], false);
    }

    #[test]
    fn archiving_keeps_only_id_and_title() {
        let today = day(2026, 10, 16);
        let mut task = Task::new(7, "Pay rent".into(), "by card".into(), today, today);
        task.subtasks.push(Subtask::new("7-1".into(), "log in".into()));

        let done = task.into_completed();
        assert_eq!(
            done,
            CompletedTask {
                id: 7,
                title: "Pay rent".into()
            }
        );
        let json = serde_json::to_value(&done).expect("serialize");
        assert_eq!(json.as_object().map(|o| o.len()), Some(2));
    }

    #[test]
    fn archiving_blank_title_uses_fallback() {
        let today = day(2026, 10, 16);
        let task = Task::new(1, "  ".into(), String::new(), today, today);
        assert_eq!(task.into_completed().title, COMPLETED_FALLBACK_TITLE);
    }

    #[test]
    fn persisted_copy_drops_blank_subtasks() {
        let today = day(2026, 10, 16);
        let mut task = Task::new(2, "Clean".into(), String::new(), today, today);
        task.subtasks.push(Subtask::new("2-1".into(), "kitchen".into()));
        task.subtasks.push(Subtask::new("2-2".into(), "   ".into()));

        let persisted = task.persisted();
        assert_eq!(persisted.subtasks.len(), 1);
        assert_eq!(persisted.subtasks[0].id, "2-1");
        assert_eq!(task.subtasks.len(), 2);
    }

    #[test]
    fn reads_subtask_counter_from_id() {
        assert_eq!(subtask_counter_of("12-40"), Some(40));
        assert_eq!(subtask_counter_of("legacy"), None);
    }
}
