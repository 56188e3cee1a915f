use std::collections::BTreeSet;

use chrono::NaiveDate;
use tracing::{
  debug,
  info
};

use crate::config::LimitSection;
use crate::form::{
  FormDraft,
  FormField,
  TaskForm
};
use crate::render::SortOption;
use crate::storage::{
  KeyValueStore,
  Storage
};
use crate::task::TaskId;

/// Where a document-level click landed,
/// as far as the overlays care.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ClickTarget {
  TaskMenu(TaskId),
  TaskMenuTrigger(TaskId),
  CompletedMenu(TaskId),
  CompletedMenuTrigger(TaskId),
  SubtaskTrigger(TaskId),
  ProfileMenu,
  ProfileTrigger,
  SortMenu,
  SortTrigger,
  TaskForm,
  AddTaskButton,
  Outside
}

impl ClickTarget {
  /// Inside a tracked menu or on one of
  /// their triggers.
  #[must_use]
  pub fn is_tracked(self) -> bool {
    !matches!(self, Self::Outside)
  }
}

/// Entries of the profile menu. They
/// have no backing feature beyond a log
/// line, except logout which asks first.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum ProfileAction {
  ProfileSettings,
  AccountSettings,
  DarkMode,
  HelpAndSupport,
  Logout
}

impl ProfileAction {
  pub const ALL: [ProfileAction; 5] = [
    ProfileAction::ProfileSettings,
    ProfileAction::AccountSettings,
    ProfileAction::DarkMode,
    ProfileAction::HelpAndSupport,
    ProfileAction::Logout
  ];

  #[must_use]
  pub fn label(self) -> &'static str {
    match self {
      | Self::ProfileSettings => {
        "Profile Settings"
      }
      | Self::AccountSettings => {
        "Account Settings"
      }
      | Self::DarkMode => "Dark Mode",
      | Self::HelpAndSupport => {
        "Help & Support"
      }
      | Self::Logout => "Logout"
    }
  }
}

/// Open/closed state of every menu,
/// dropdown and collapsible section.
#[derive(
  Debug, Clone, Default, PartialEq, Eq,
)]
pub struct Overlays {
  profile_open:           bool,
  sort_open:              bool,
  completed_section_open: bool,
  task_dropdowns:         BTreeSet<TaskId>,
  completed_dropdowns:    BTreeSet<TaskId>,
  subtask_sections:       BTreeSet<TaskId>
}

impl Overlays {
  pub fn is_profile_open(&self) -> bool {
    self.profile_open
  }

  pub fn is_sort_open(&self) -> bool {
    self.sort_open
  }

  pub fn is_completed_section_open(
    &self
  ) -> bool {
    self.completed_section_open
  }

  pub fn is_task_dropdown_open(
    &self,
    id: TaskId
  ) -> bool {
    self.task_dropdowns.contains(&id)
  }

  pub fn is_completed_dropdown_open(
    &self,
    id: TaskId
  ) -> bool {
    self
      .completed_dropdowns
      .contains(&id)
  }

  pub fn is_subtask_section_open(
    &self,
    id: TaskId
  ) -> bool {
    self.subtask_sections.contains(&id)
  }

  pub fn toggle_profile(&mut self) {
    self.profile_open =
      !self.profile_open;
  }

  pub fn close_profile(&mut self) {
    self.profile_open = false;
  }

  pub fn toggle_sort(&mut self) {
    self.sort_open = !self.sort_open;
  }

  pub fn close_sort(&mut self) {
    self.sort_open = false;
  }

  pub fn toggle_completed_section(
    &mut self
  ) {
    self.completed_section_open =
      !self.completed_section_open;
  }

  /// Opening one task dropdown closes
  /// the others.
  pub fn toggle_task_dropdown(
    &mut self,
    id: TaskId
  ) {
    let was_open =
      self.task_dropdowns.contains(&id);
    self.task_dropdowns.clear();
    if !was_open {
      self.task_dropdowns.insert(id);
    }
  }

  pub fn close_task_dropdowns(
    &mut self
  ) {
    self.task_dropdowns.clear();
  }

  pub fn toggle_completed_dropdown(
    &mut self,
    id: TaskId
  ) {
    let was_open = self
      .completed_dropdowns
      .contains(&id);
    self.completed_dropdowns.clear();
    if !was_open {
      self.completed_dropdowns.insert(id);
    }
  }

  pub fn close_completed_dropdowns(
    &mut self
  ) {
    self.completed_dropdowns.clear();
  }

  pub fn toggle_subtask_section(
    &mut self,
    id: TaskId
  ) {
    if !self.subtask_sections.remove(&id)
    {
      self.subtask_sections.insert(id);
    }
  }

  pub fn close_subtask_sections(
    &mut self
  ) {
    self.subtask_sections.clear();
  }

  /// Drops state keyed by an id that no
  /// longer has an element.
  pub fn forget(&mut self, id: TaskId) {
    self.task_dropdowns.remove(&id);
    self.completed_dropdowns.remove(&id);
    self.subtask_sections.remove(&id);
  }

  pub fn active_dropdown_count(
    &self
  ) -> usize {
    self.task_dropdowns.len()
      + self.completed_dropdowns.len()
      + self.subtask_sections.len()
  }

  pub fn has_active_dropdowns(
    &self
  ) -> bool {
    self.active_dropdown_count() > 0
  }

  /// Closes the floating menus. Subtask
  /// sections are expansions, not menus,
  /// and stay as they are.
  fn close_menus(&mut self) -> bool {
    let any_open = self.profile_open
      || self.sort_open
      || !self.task_dropdowns.is_empty()
      || !self
        .completed_dropdowns
        .is_empty();
    self.close_profile();
    self.close_sort();
    self.close_task_dropdowns();
    self.close_completed_dropdowns();
    any_open
  }

  pub fn close_all(&mut self) {
    self.close_menus();
    self.close_subtask_sections();
  }
}

/// Interaction state of one mounted page:
/// overlays, the add-task form and the
/// chosen sort order.
#[derive(Debug, Clone)]
pub struct InteractionController {
  overlays:    Overlays,
  form:        TaskForm,
  sort:        SortOption,
  limits:      LimitSection,
  initialized: bool
}

impl InteractionController {
  pub fn new(
    limits: LimitSection,
    today: NaiveDate
  ) -> Self {
    Self {
      overlays: Overlays::default(),
      form: TaskForm::new(today),
      sort: SortOption::default(),
      limits,
      initialized: false
    }
  }

  /// Restores the persisted form draft.
  #[tracing::instrument(skip(
    self, storage
  ))]
  pub fn initialize<S: KeyValueStore>(
    &mut self,
    storage: &Storage<S>
  ) {
    if self.initialized {
      return;
    }

    let draft: Option<FormDraft> =
      storage.load(
        &storage.keys().form_draft,
        None
      );
    if let Some(draft) = draft {
      debug!(
        has_description =
          !draft.description.is_empty(),
        "restoring form draft"
      );
      self.form.apply_draft(draft);
    }

    self.initialized = true;
    info!("interaction controller initialized");
  }

  /// Closes everything and drops the
  /// form draft.
  #[tracing::instrument(skip(
    self, storage
  ))]
  pub fn teardown<S: KeyValueStore>(
    &mut self,
    storage: &Storage<S>,
    today: NaiveDate
  ) {
    self.overlays.close_all();
    self.form.hide(today);
    self.form.clear_errors();
    storage
      .remove(&storage.keys().form_draft);
    self.initialized = false;
    info!("interaction controller torn down");
  }

  pub fn is_initialized(&self) -> bool {
    self.initialized
  }

  pub fn overlays(&self) -> &Overlays {
    &self.overlays
  }

  pub fn overlays_mut(
    &mut self
  ) -> &mut Overlays {
    &mut self.overlays
  }

  pub fn form(&self) -> &TaskForm {
    &self.form
  }

  pub fn form_mut(
    &mut self
  ) -> &mut TaskForm {
    &mut self.form
  }

  pub fn limits(&self) -> &LimitSection {
    &self.limits
  }

  pub fn sort(&self) -> SortOption {
    self.sort
  }

  pub fn select_sort(
    &mut self,
    sort: SortOption
  ) {
    debug!(sort = sort.key(), "sort option selected");
    self.sort = sort;
    self.overlays.close_sort();
  }

  pub fn toggle_form(
    &mut self,
    today: NaiveDate
  ) {
    self.form.toggle(today);
  }

  /// Records an input change; the draft
  /// is persisted only while the form is
  /// open.
  pub fn input<S: KeyValueStore>(
    &mut self,
    field: FormField,
    value: &str,
    storage: &Storage<S>
  ) {
    self.form.set_field(field, value);
    if self.form.is_visible() {
      storage.save(
        &storage.keys().form_draft,
        self.form.draft()
      );
    }
  }

  /// Returns whether anything closed.
  pub fn outside_click(
    &mut self,
    target: ClickTarget,
    today: NaiveDate
  ) -> bool {
    if target.is_tracked() {
      return false;
    }
    self.sweep(today)
  }

  pub fn escape(
    &mut self,
    today: NaiveDate
  ) -> bool {
    self.sweep(today)
  }

  fn sweep(
    &mut self,
    today: NaiveDate
  ) -> bool {
    let closed_menus =
      self.overlays.close_menus();
    let form_was_open =
      self.form.is_visible();
    self.form.hide(today);
    closed_menus || form_was_open
  }
}
