use chrono::NaiveDate;
use tracing::{
  debug,
  info
};

use crate::config::AppConfig;
use crate::controller::{
  InteractionController,
  ProfileAction
};
use crate::form::FormField;
use crate::render::{
  CompletedView,
  SortOption,
  TaskView,
  completed_count_label,
  completed_view,
  sorted,
  task_view
};
use crate::repository::TaskRepository;
use crate::storage::{
  KeyValueStore,
  Storage
};
use crate::task::TaskId;
use crate::transitions::{
  ElementKey,
  PendingAction,
  Ticket,
  Transitions
};

pub const DELETE_TASK_PROMPT: &str =
  "Are you sure you want to delete \
   this task?";
pub const DELETE_PERMANENTLY_PROMPT:
  &str = "Delete this task permanently? \
          This cannot be undone.";
pub const LOGOUT_PROMPT: &str =
  "Are you sure you want to logout?";

/// Interactive yes/no question.
pub trait Confirm {
  fn confirm(&self, message: &str) -> bool;
}

impl<F> Confirm for F
where
  F: Fn(&str) -> bool
{
  fn confirm(&self, message: &str) -> bool {
    self(message)
  }
}

/// Everything one page needs: the task
/// model, pending transitions and the
/// interaction state.
#[derive(Debug)]
pub struct Board<S> {
  config:      AppConfig,
  repository:  TaskRepository<S>,
  transitions: Transitions,
  controller:  InteractionController
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardView {
  pub tasks:           Vec<TaskView>,
  pub completed:       Vec<CompletedView>,
  pub completed_label: String,
  pub completed_open:  bool,
  pub sort:            SortOption
}

impl<S: KeyValueStore> Board<S> {
  #[tracing::instrument(skip(
    backend, config
  ))]
  pub fn open(
    backend: S,
    config: AppConfig,
    today: NaiveDate
  ) -> Self {
    let storage = Storage::new(
      backend,
      &config.storage.namespace
    );
    let repository =
      TaskRepository::open(storage, today);
    let mut controller =
      InteractionController::new(
        config.limits.clone(),
        today
      );
    controller
      .initialize(repository.storage());

    info!(
      namespace = %config.storage.namespace,
      "board opened"
    );
    Self {
      config,
      repository,
      transitions: Transitions::new(),
      controller
    }
  }

  pub fn config(&self) -> &AppConfig {
    &self.config
  }

  pub fn repository(
    &self
  ) -> &TaskRepository<S> {
    &self.repository
  }

  pub fn repository_mut(
    &mut self
  ) -> &mut TaskRepository<S> {
    &mut self.repository
  }

  pub fn controller(
    &self
  ) -> &InteractionController {
    &self.controller
  }

  pub fn controller_mut(
    &mut self
  ) -> &mut InteractionController {
    &mut self.controller
  }

  pub fn transitions(&self) -> &Transitions {
    &self.transitions
  }

  pub fn storage(&self) -> &Storage<S> {
    self.repository.storage()
  }

  /// Delay before a ticket's timer should
  /// fire.
  pub fn delay_ms(
    &self,
    ticket: Ticket
  ) -> u32 {
    self
      .transitions
      .action(ticket.key)
      .map(|action| {
        action.delay_ms(
          &self.config.transitions
        )
      })
      .unwrap_or(0)
  }

  pub fn form_input(
    &mut self,
    field: FormField,
    value: &str
  ) {
    self.controller.input(
      field,
      value,
      self.repository.storage()
    );
  }

  /// Validates the form and creates the
  /// task. Errors stay on the form.
  #[tracing::instrument(skip(self))]
  pub fn submit_form(
    &mut self,
    today: NaiveDate
  ) -> Result<TaskId, Vec<String>> {
    let valid = match self
      .controller
      .form()
      .validate(self.controller.limits())
    {
      | Ok(valid) => valid,
      | Err(errors) => {
        debug!(count = errors.len(), "form rejected");
        self
          .controller
          .form_mut()
          .set_errors(errors.clone());
        return Err(errors);
      }
    };

    let Some(id) =
      self.repository.create_task(
        &valid.name,
        &valid.description,
        valid.date,
        today
      )
    else {
      return Err(vec![
        crate::form::NAME_REQUIRED
          .to_string(),
      ]);
    };

    let storage = self.repository.storage();
    storage.remove(&storage.keys().form_draft);

    let form = self.controller.form_mut();
    form.clear_errors();
    form.hide(today);
    Ok(id)
  }

  /// Checking starts the completion
  /// transition; unchecking during it
  /// cancels the archive.
  #[tracing::instrument(skip(self))]
  pub fn set_checked(
    &mut self,
    id: TaskId,
    checked: bool
  ) -> Option<Ticket> {
    let key = ElementKey::Task(id);
    if !checked {
      if self.transitions.action(key)
        == Some(PendingAction::Complete)
      {
        self.transitions.cancel(key);
      }
      self.repository.set_checked(id, false);
      return None;
    }

    if self.transitions.is_pending(key) {
      return None;
    }
    if !self.repository.set_checked(id, true)
    {
      return None;
    }
    self
      .transitions
      .begin(key, PendingAction::Complete)
  }

  #[tracing::instrument(skip(
    self, confirm
  ))]
  pub fn request_delete(
    &mut self,
    id: TaskId,
    confirm: &dyn Confirm
  ) -> Option<Ticket> {
    self
      .controller
      .overlays_mut()
      .close_task_dropdowns();
    let key = ElementKey::Task(id);
    if self.repository.task(id).is_none()
      || self.transitions.is_pending(key)
    {
      return None;
    }
    if !confirm.confirm(DELETE_TASK_PROMPT)
    {
      debug!(id, "delete declined");
      return None;
    }
    self
      .transitions
      .begin(key, PendingAction::Delete)
  }

  #[tracing::instrument(skip(
    self, confirm
  ))]
  pub fn request_delete_permanently(
    &mut self,
    id: TaskId,
    confirm: &dyn Confirm
  ) -> Option<Ticket> {
    self
      .controller
      .overlays_mut()
      .close_completed_dropdowns();
    let key = ElementKey::Completed(id);
    if self
      .repository
      .completed_task(id)
      .is_none()
      || self.transitions.is_pending(key)
    {
      return None;
    }
    if !confirm
      .confirm(DELETE_PERMANENTLY_PROMPT)
    {
      debug!(id, "permanent delete declined");
      return None;
    }
    self.transitions.begin(
      key,
      PendingAction::DeletePermanently
    )
  }

  /// Runs the model change behind a
  /// ticket, unless it went stale.
  #[tracing::instrument(skip(self))]
  pub fn finish(
    &mut self,
    ticket: Ticket
  ) -> bool {
    let Some(action) =
      self.transitions.finish(ticket)
    else {
      return false;
    };

    let applied = match (ticket.key, action)
    {
      | (
        ElementKey::Task(id),
        PendingAction::Delete
      ) => self.repository.delete(id),
      | (
        ElementKey::Task(id),
        PendingAction::Complete
      ) => {
        self.repository.complete(id).is_some()
      }
      | (
        ElementKey::Completed(id),
        PendingAction::DeletePermanently
      ) => {
        self
          .repository
          .delete_permanently(id)
      }
      | (key, action) => {
        debug!(?key, ?action, "transition does not apply to element");
        false
      }
    };

    if applied {
      let (ElementKey::Task(id)
      | ElementKey::Completed(id)) =
        ticket.key;
      self.controller.overlays_mut().forget(id);
    }
    applied
  }

  #[tracing::instrument(skip(self))]
  pub fn restore_completed(
    &mut self,
    id: TaskId,
    today: NaiveDate
  ) -> Option<TaskId> {
    self
      .controller
      .overlays_mut()
      .close_completed_dropdowns();
    if self
      .transitions
      .is_pending(ElementKey::Completed(id))
    {
      return None;
    }
    self
      .repository
      .restore_from_completed(id, today)
  }

  /// Same title rules as the form: blank
  /// or over-long titles are ignored.
  pub fn rename(
    &mut self,
    id: TaskId,
    title: &str
  ) -> bool {
    self
      .controller
      .overlays_mut()
      .close_task_dropdowns();
    let max =
      self.controller.limits().title_max_chars;
    let length = title.trim().chars().count();
    if length > max {
      debug!(
        id,
        length,
        max,
        "ignoring rename over title limit"
      );
      return false;
    }
    self.repository.rename(id, title)
  }

  /// Returns true when the user logged
  /// out.
  pub fn profile_action(
    &mut self,
    action: ProfileAction,
    confirm: &dyn Confirm
  ) -> bool {
    self
      .controller
      .overlays_mut()
      .close_profile();
    match action {
      | ProfileAction::Logout => {
        let confirmed =
          confirm.confirm(LOGOUT_PROMPT);
        if confirmed {
          info!("user logged out");
        }
        confirmed
      }
      | other => {
        info!(action = other.label(), "profile menu action");
        false
      }
    }
  }

  pub fn teardown(
    &mut self,
    today: NaiveDate
  ) {
    self.transitions.clear();
    self
      .controller
      .teardown(self.repository.storage(), today);
  }

  /// Pure projection of the current state.
  pub fn view(
    &self,
    today: NaiveDate
  ) -> BoardView {
    let overlays =
      self.controller.overlays();
    let sort = self.controller.sort();
    BoardView {
      tasks: sorted(
        self.repository.tasks(),
        sort
      )
      .into_iter()
      .map(|task| {
        task_view(
          task,
          today,
          overlays,
          &self.transitions
        )
      })
      .collect(),
      completed: self
        .repository
        .completed()
        .iter()
        .map(|record| {
          completed_view(
            record,
            overlays,
            &self.transitions
          )
        })
        .collect(),
      completed_label:
        completed_count_label(
          self.repository.completed().len()
        ),
      completed_open: overlays
        .is_completed_section_open(),
      sort
    }
  }
}
