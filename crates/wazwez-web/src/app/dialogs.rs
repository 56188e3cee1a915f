use wazwez_core::Confirm;

pub const RENAME_PROMPT: &str =
  "Edit task name:";

/// `window.confirm`. Without a window
/// nothing is ever confirmed.
pub struct BrowserConfirm;

impl Confirm for BrowserConfirm {
  fn confirm(&self, message: &str) -> bool {
    web_sys::window()
      .and_then(|window| {
        window
          .confirm_with_message(message)
          .ok()
      })
      .unwrap_or(false)
  }
}

/// `None` when the prompt was dismissed.
pub fn prompt_rename(
  current: &str
) -> Option<String> {
  web_sys::window().and_then(|window| {
    window
      .prompt_with_message_and_default(
        RENAME_PROMPT,
        current
      )
      .ok()
      .flatten()
  })
}
