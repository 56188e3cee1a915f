use std::collections::HashMap;

use gloo::timers::callback::Timeout;
use wazwez_core::transitions::{
  ElementKey,
  Ticket
};

/// Live browser timers behind pending
/// transitions. Dropping a `Timeout`
/// clears it.
#[derive(Default)]
pub struct TransitionTimers {
  live: HashMap<ElementKey, Timeout>
}

impl TransitionTimers {
  /// Replaces any timer already held for
  /// the ticket's element.
  pub fn arm(
    &mut self,
    ticket: Ticket,
    timeout: Timeout
  ) {
    self.live.insert(ticket.key, timeout);
  }

  pub fn cancel(&mut self, key: ElementKey) {
    if self.live.remove(&key).is_some() {
      tracing::debug!(
        ?key,
        "transition timer cancelled"
      );
    }
  }

  /// Forgets timers whose transition is
  /// over. Never called from inside a
  /// timer callback, so a running
  /// `Timeout` is never dropped.
  pub fn prune(
    &mut self,
    still_pending: impl Fn(ElementKey) -> bool
  ) {
    self
      .live
      .retain(|key, _| still_pending(*key));
  }

  pub fn clear(&mut self) {
    self.live.clear();
  }
}
