mod dialogs;
mod events;
mod storage;
mod timers;

use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use gloo::events::EventListener;
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wazwez_core::controller::ProfileAction;
use wazwez_core::datetime;
use wazwez_core::form::FormField;
use wazwez_core::render::SortOption;
use wazwez_core::task::TaskId;
use wazwez_core::transitions::{
  ElementKey,
  Ticket
};
use wazwez_core::{
  AppConfig,
  Board
};
use yew::functional::UseForceUpdateHandle;
use yew::{
  Callback,
  Html,
  function_component,
  html,
  use_effect_with,
  use_force_update,
  use_mut_ref
};

use self::dialogs::{
  BrowserConfirm,
  prompt_rename
};
use self::storage::LocalStore;
use self::timers::TransitionTimers;
use crate::components::{
  CompletedSection,
  Header,
  TaskActions,
  TaskFormView,
  TaskItem
};

const APP_CONFIG_TOML: &str =
  include_str!("../assets/wazwez.toml");

/// How long a timer waits before trying
/// again when the board is borrowed.
const BUSY_RETRY_MS: u32 = 16;

type SharedBoard =
  Rc<RefCell<Board<LocalStore>>>;

fn today() -> NaiveDate {
  datetime::today()
}

fn open_board() -> Board<LocalStore> {
  let config = AppConfig::load_or_default(
    APP_CONFIG_TOML
  );
  Board::open(
    LocalStore::open(),
    config,
    today()
  )
}

fn finish_transition(
  board: &SharedBoard,
  refresh: &UseForceUpdateHandle,
  ticket: Ticket
) {
  let Ok(mut guard) =
    board.try_borrow_mut()
  else {
    tracing::debug!(
      key = ?ticket.key,
      "board busy; retrying transition"
    );
    let board = board.clone();
    let refresh = refresh.clone();
    Timeout::new(BUSY_RETRY_MS, move || {
      finish_transition(
        &board, &refresh, ticket
      );
    })
    .forget();
    return;
  };

  let applied = guard.finish(ticket);
  drop(guard);
  if applied {
    refresh.force_update();
  }
}

/// What every callback needs: the board,
/// the live timers and a way to re-render.
#[derive(Clone)]
struct Handle {
  board:   SharedBoard,
  timers:  Rc<RefCell<TransitionTimers>>,
  refresh: UseForceUpdateHandle
}

impl Handle {
  fn update<R>(
    &self,
    f: impl FnOnce(&mut Board<LocalStore>) -> R
  ) -> R {
    let out = f(&mut self.board.borrow_mut());
    self.refresh.force_update();
    out
  }

  fn schedule(
    &self,
    ticket: Option<Ticket>
  ) {
    let Some(ticket) = ticket else {
      return;
    };
    let delay =
      self.board.borrow().delay_ms(ticket);
    let timeout = {
      let board = self.board.clone();
      let refresh = self.refresh.clone();
      Timeout::new(delay, move || {
        finish_transition(
          &board, &refresh, ticket
        );
      })
    };

    let board = self.board.borrow();
    let mut timers = self.timers.borrow_mut();
    timers.prune(|key| {
      board.transitions().is_pending(key)
    });
    timers.arm(ticket, timeout);
    tracing::debug!(
      key = ?ticket.key,
      delay,
      "transition timer armed"
    );
  }

  fn cancel(&self, key: ElementKey) {
    self.timers.borrow_mut().cancel(key);
  }

  fn callback<T: 'static>(
    &self,
    f: impl Fn(&Handle, T) + 'static
  ) -> Callback<T> {
    let handle = self.clone();
    Callback::from(move |arg: T| {
      f(&handle, arg)
    })
  }
}

#[function_component(App)]
pub fn app() -> Html {
  let board = use_mut_ref(open_board);
  let timers =
    use_mut_ref(TransitionTimers::default);
  let refresh = use_force_update();
  let handle = Handle {
    board,
    timers,
    refresh
  };

  {
    let handle = handle.clone();
    use_effect_with((), move |_| {
      let document = web_sys::window()
        .and_then(|window| {
          window.document()
        });

      let listeners =
        document.map(|document| {
          let on_click = {
            let handle = handle.clone();
            EventListener::new(
              &document,
              "click",
              move |event| {
                let target =
                  events::classify(
                    event.target()
                  );
                let Ok(mut board) =
                  handle.board.try_borrow_mut()
                else {
                  return;
                };
                let closed = board
                  .controller_mut()
                  .outside_click(target, today());
                drop(board);
                if closed {
                  handle.refresh.force_update();
                }
              }
            )
          };
          let on_keydown = {
            let handle = handle.clone();
            EventListener::new(
              &document,
              "keydown",
              move |event| {
                let is_escape = event
                  .dyn_ref::<web_sys::KeyboardEvent>()
                  .is_some_and(|key| {
                    events::is_escape(&key.key())
                  });
                if !is_escape {
                  return;
                }
                let Ok(mut board) =
                  handle.board.try_borrow_mut()
                else {
                  return;
                };
                let closed = board
                  .controller_mut()
                  .escape(today());
                drop(board);
                if closed {
                  handle.refresh.force_update();
                }
              }
            )
          };
          [on_click, on_keydown]
        });
      if listeners.is_none() {
        tracing::warn!(
          "no document; outside clicks \
           and Escape are not tracked"
        );
      }

      move || {
        drop(listeners);
        handle.timers.borrow_mut().clear();
        handle
          .board
          .borrow_mut()
          .teardown(today());
      }
    });
  }

  let on_toggle_form = handle.callback(
    |h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .toggle_form(today())
      });
    }
  );
  let on_cancel_form = handle.callback(
    |h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .form_mut()
          .hide(today())
      });
    }
  );
  let on_form_input = handle.callback(
    |h, (field, value): (FormField, String)| {
      h.update(|b| b.form_input(field, &value));
    }
  );
  let on_expand_description =
    handle.callback(|h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .form_mut()
          .expand_description()
      });
    });
  let on_expand_date =
    handle.callback(|h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .form_mut()
          .expand_date()
      });
    });
  let on_submit = handle.callback(
    |h, (): ()| {
      let result =
        h.update(|b| b.submit_form(today()));
      if let Err(errors) = result {
        tracing::debug!(
          ?errors,
          "task form has errors"
        );
      }
    }
  );

  let on_toggle_profile = handle.callback(
    |h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .overlays_mut()
          .toggle_profile()
      });
    }
  );
  let on_profile_action = handle.callback(
    |h, action: ProfileAction| {
      h.update(|b| {
        b.profile_action(
          action,
          &BrowserConfirm
        )
      });
    }
  );
  let on_toggle_sort = handle.callback(
    |h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .overlays_mut()
          .toggle_sort()
      });
    }
  );
  let on_select_sort = handle.callback(
    |h, sort: SortOption| {
      h.update(|b| {
        b.controller_mut().select_sort(sort)
      });
    }
  );

  let task_actions = TaskActions {
    on_check: handle.callback(
      |h, (id, checked): (TaskId, bool)| {
        if !checked {
          h.cancel(ElementKey::Task(id));
        }
        let ticket = h
          .update(|b| b.set_checked(id, checked));
        h.schedule(ticket);
      }
    ),
    on_toggle_menu: handle.callback(
      |h, id: TaskId| {
        h.update(|b| {
          b.controller_mut()
            .overlays_mut()
            .toggle_task_dropdown(id)
        });
      }
    ),
    on_rename: handle.callback(
      |h, id: TaskId| {
        let current = h
          .board
          .borrow()
          .repository()
          .task(id)
          .map(|task| task.title.clone());
        let Some(current) = current else {
          return;
        };
        let answer = prompt_rename(&current);
        h.update(|b| match answer {
          | Some(title) => b.rename(id, &title),
          | None => {
            b.controller_mut()
              .overlays_mut()
              .close_task_dropdowns();
            false
          }
        });
      }
    ),
    on_delete: handle.callback(
      |h, id: TaskId| {
        let ticket = h.update(|b| {
          b.request_delete(id, &BrowserConfirm)
        });
        h.schedule(ticket);
      }
    ),
    on_toggle_subtasks: handle.callback(
      |h, id: TaskId| {
        h.update(|b| {
          b.controller_mut()
            .overlays_mut()
            .toggle_subtask_section(id)
        });
      }
    ),
    on_add_subtask: handle.callback(
      |h, (id, text): (TaskId, String)| {
        h.update(|b| {
          b.repository_mut()
            .add_subtask(id, &text)
        });
      }
    ),
    on_edit_subtask: handle.callback(
      |h,
       (id, sub, text): (
        TaskId,
        String,
        String
      )| {
        h.update(|b| {
          b.repository_mut()
            .edit_subtask(id, &sub, &text)
        });
      }
    ),
    on_check_subtask: handle.callback(
      |h,
       (id, sub, checked): (
        TaskId,
        String,
        bool
      )| {
        h.update(|b| {
          b.repository_mut()
            .set_subtask_checked(
              id, &sub, checked
            )
        });
      }
    ),
    on_delete_subtask: handle.callback(
      |h, (id, sub): (TaskId, String)| {
        h.update(|b| {
          b.repository_mut()
            .delete_subtask(id, &sub)
        });
      }
    )
  };

  let on_toggle_completed =
    handle.callback(|h, (): ()| {
      h.update(|b| {
        b.controller_mut()
          .overlays_mut()
          .toggle_completed_section()
      });
    });
  let on_toggle_completed_menu =
    handle.callback(|h, id: TaskId| {
      h.update(|b| {
        b.controller_mut()
          .overlays_mut()
          .toggle_completed_dropdown(id)
      });
    });
  let on_restore = handle.callback(
    |h, id: TaskId| {
      h.update(|b| {
        b.restore_completed(id, today())
      });
    }
  );
  let on_delete_permanently =
    handle.callback(|h, id: TaskId| {
      let ticket = h.update(|b| {
        b.request_delete_permanently(
          id,
          &BrowserConfirm
        )
      });
      h.schedule(ticket);
    });

  let board = handle.board.borrow();
  let view = board.view(today());
  let controller = board.controller();
  let overlays = controller.overlays();
  let form = controller.form();

  html! {
    <main class="app">
      <Header
        profile_open={overlays.is_profile_open()}
        sort_open={overlays.is_sort_open()}
        sort={view.sort}
        {on_toggle_profile}
        {on_profile_action}
        {on_toggle_sort}
        {on_select_sort}
        {on_toggle_form}
      />

      <TaskFormView
        visible={form.is_visible()}
        draft={form.draft().clone()}
        errors={form.errors().to_vec()}
        description_expanded={form.description_expanded()}
        date_expanded={form.date_expanded()}
        on_input={on_form_input}
        {on_expand_description}
        {on_expand_date}
        {on_submit}
        on_cancel={on_cancel_form}
      />

      <ul class="task-list">
        {
          for view.tasks.into_iter().map(|task| {
            let key = task.id.to_string();
            html! {
              <TaskItem
                {key}
                {task}
                actions={task_actions.clone()}
              />
            }
          })
        }
      </ul>

      <CompletedSection
        label={view.completed_label}
        open={view.completed_open}
        items={view.completed}
        on_toggle={on_toggle_completed}
        on_toggle_menu={on_toggle_completed_menu}
        {on_restore}
        on_delete={on_delete_permanently}
      />
    </main>
  }
}
