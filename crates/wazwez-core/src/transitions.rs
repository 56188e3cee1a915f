use std::collections::BTreeMap;

use tracing::{
  debug,
  trace
};

use crate::config::TransitionSection;
use crate::task::TaskId;

/// Rendered element a transition is
/// attached to.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub enum ElementKey {
  Task(TaskId),
  Completed(TaskId)
}

/// Model change that runs once the
/// element has finished fading out.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum PendingAction {
  Delete,
  Complete,
  DeletePermanently
}

impl PendingAction {
  #[must_use]
  pub fn delay_ms(
    self,
    cfg: &TransitionSection
  ) -> u32 {
    match self {
      | Self::Complete => cfg
        .complete_delay_ms
        .saturating_add(cfg.fade_ms),
      | Self::Delete
      | Self::DeletePermanently => {
        cfg.fade_ms
      }
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
  Hash,
)]
pub struct Ticket {
  pub key:    ElementKey,
  generation: u64
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
  generation: u64,
  action:     PendingAction
}

/// At most one transition per element.
/// A ticket only completes while it is
/// still the current one for its key.
#[derive(Debug, Default)]
pub struct Transitions {
  next_generation: u64,
  in_flight:
    BTreeMap<ElementKey, InFlight>
}

impl Transitions {
  pub fn new() -> Self {
    Self::default()
  }

  /// `None` when the element is already
  /// transitioning.
  pub fn begin(
    &mut self,
    key: ElementKey,
    action: PendingAction
  ) -> Option<Ticket> {
    if self.in_flight.contains_key(&key)
    {
      debug!(
        ?key,
        ?action,
        "transition already in flight"
      );
      return None;
    }

    self.next_generation =
      self.next_generation.wrapping_add(1);
    let generation =
      self.next_generation;
    self.in_flight.insert(
      key,
      InFlight {
        generation,
        action
      }
    );
    trace!(?key, ?action, generation, "transition started");
    Some(Ticket {
      key,
      generation
    })
  }

  pub fn cancel(
    &mut self,
    key: ElementKey
  ) -> Option<PendingAction> {
    let cancelled = self
      .in_flight
      .remove(&key)
      .map(|f| f.action);
    if cancelled.is_some() {
      debug!(?key, "transition cancelled");
    }
    cancelled
  }

  /// Consumes a ticket. Stale tickets
  /// (cancelled, or superseded by a
  /// newer transition) yield `None`.
  pub fn finish(
    &mut self,
    ticket: Ticket
  ) -> Option<PendingAction> {
    match self.in_flight.get(&ticket.key)
    {
      | Some(current)
        if current.generation
          == ticket.generation =>
      {
        let action = current.action;
        self.in_flight.remove(&ticket.key);
        Some(action)
      }
      | _ => {
        debug!(
          key = ?ticket.key,
          "ignoring stale transition \
           ticket"
        );
        None
      }
    }
  }

  pub fn action(
    &self,
    key: ElementKey
  ) -> Option<PendingAction> {
    self
      .in_flight
      .get(&key)
      .map(|f| f.action)
  }

  pub fn is_pending(
    &self,
    key: ElementKey
  ) -> bool {
    self.in_flight.contains_key(&key)
  }

  pub fn len(&self) -> usize {
    self.in_flight.len()
  }

  pub fn is_empty(&self) -> bool {
    self.in_flight.is_empty()
  }

  pub fn clear(&mut self) {
    self.in_flight.clear();
  }
}
