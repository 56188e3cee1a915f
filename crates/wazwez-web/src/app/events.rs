use wasm_bindgen::JsCast;
use wazwez_core::controller::ClickTarget;
use wazwez_core::task::TaskId;

/// Attribute carrying a task id, and the
/// target an element inside it stands
/// for.
const KEYED: [(&str, fn(TaskId) -> ClickTarget);
  5] = [
  (
    "data-task-dropdown-menu",
    ClickTarget::TaskMenu
  ),
  (
    "data-task-dropdown",
    ClickTarget::TaskMenuTrigger
  ),
  (
    "data-completed-dropdown-menu",
    ClickTarget::CompletedMenu
  ),
  (
    "data-completed-dropdown",
    ClickTarget::CompletedMenuTrigger
  ),
  (
    "data-subtask-toggle",
    ClickTarget::SubtaskTrigger
  )
];

const FIXED: [(&str, ClickTarget); 6] = [
  (
    "#profileDropdown",
    ClickTarget::ProfileMenu
  ),
  (
    "#profileContainer",
    ClickTarget::ProfileTrigger
  ),
  (
    "#sortDropdownMenu",
    ClickTarget::SortMenu
  ),
  (
    "#sortDropdownContainer",
    ClickTarget::SortTrigger
  ),
  (
    "#taskInputForm",
    ClickTarget::TaskForm
  ),
  (
    "#addTaskBtn",
    ClickTarget::AddTaskButton
  )
];

pub fn parse_task_id(
  raw: &str
) -> Option<TaskId> {
  raw.trim().parse().ok()
}

pub fn keyed_target(
  attribute: &str,
  raw: &str
) -> Option<ClickTarget> {
  let (_, build) = KEYED
    .iter()
    .find(|(name, _)| *name == attribute)?;
  parse_task_id(raw).map(build)
}

pub fn is_escape(key: &str) -> bool {
  key == "Escape" || key == "Esc"
}

/// Walks up from the clicked node to the
/// nearest tracked menu or trigger.
pub fn classify(
  target: Option<web_sys::EventTarget>
) -> ClickTarget {
  let Some(element) = target.and_then(
    |target| {
      target
        .dyn_into::<web_sys::Element>()
        .ok()
    }
  ) else {
    return ClickTarget::Outside;
  };

  for (attribute, _) in KEYED {
    let found = element
      .closest(&format!("[{attribute}]"))
      .ok()
      .flatten();
    let hit = found
      .and_then(|found| {
        found.get_attribute(attribute)
      })
      .and_then(|raw| {
        keyed_target(attribute, &raw)
      });
    if let Some(hit) = hit {
      return hit;
    }
  }

  FIXED
    .into_iter()
    .find(|(selector, _)| {
      element
        .closest(selector)
        .ok()
        .flatten()
        .is_some()
    })
    .map_or(
      ClickTarget::Outside,
      |(_, target)| target
    )
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn keyed_attributes_map_to_targets() {
    assert_eq!(
      keyed_target(
        "data-task-dropdown",
        "12"
      ),
      Some(ClickTarget::TaskMenuTrigger(
        12
      ))
    );
    assert_eq!(
      keyed_target("data-subtask-toggle", " 3 "),
      Some(ClickTarget::SubtaskTrigger(3))
    );
    assert_eq!(
      keyed_target("data-subtask-for", "3"),
      None
    );
    assert_eq!(
      keyed_target(
        "data-task-dropdown",
        "abc"
      ),
      None
    );
    assert_eq!(
      keyed_target("data-unknown", "1"),
      None
    );
  }

  #[test]
  fn escape_keys() {
    assert!(is_escape("Escape"));
    assert!(is_escape("Esc"));
    assert!(!is_escape("Enter"));
  }
}
