use wazwez_core::controller::ProfileAction;
use wazwez_core::form::{FormDraft, FormField};
use wazwez_core::render::{
    CHECKED_CLASS, CompletedView, LEAVING_CLASS, STRUCK_CLASS, SortOption, SubtaskView, TaskView,
    arrow_class, visibility_class,
};
use wazwez_core::task::TaskId;
use yew::{
    Callback, Html, KeyboardEvent, Properties, TargetCast, classes, function_component, html,
    use_state,
};

fn input_value(e: &web_sys::Event) -> Option<String> {
    e.target_dyn_into::<web_sys::HtmlInputElement>()
        .map(|input| input.value())
        .or_else(|| {
            e.target_dyn_into::<web_sys::HtmlTextAreaElement>()
                .map(|area| area.value())
        })
}

fn input_checked(e: &web_sys::Event) -> Option<bool> {
    e.target_dyn_into::<web_sys::HtmlInputElement>()
        .map(|input| input.checked())
}

#[derive(Properties, PartialEq)]
pub struct HeaderProps {
    pub profile_open: bool,
    pub sort_open: bool,
    pub sort: SortOption,
    pub on_toggle_profile: Callback<()>,
    pub on_profile_action: Callback<ProfileAction>,
    pub on_toggle_sort: Callback<()>,
    pub on_select_sort: Callback<SortOption>,
    pub on_toggle_form: Callback<()>,
}

#[function_component(Header)]
pub fn header(props: &HeaderProps) -> Html {
    let on_toggle_profile = props.on_toggle_profile.clone();
    let on_toggle_sort = props.on_toggle_sort.clone();
    let on_toggle_form = props.on_toggle_form.clone();

    html! {
        <header class="header">
            <h1>{ "My Tasks" }</h1>
            <div class="header-actions">
                <div id="sortDropdownContainer" class="sort-container">
                    <button class="btn" onclick={move |_| on_toggle_sort.emit(())}>
                        { format!("Sort: {}", props.sort.label()) }
                    </button>
                    <div id="sortDropdownMenu" class={classes!("menu", visibility_class(props.sort_open))}>
                        {
                            for SortOption::ALL.into_iter().map(|option| {
                                let on_select_sort = props.on_select_sort.clone();
                                html! {
                                    <label class="menu-item">
                                        <input
                                            type="radio"
                                            name="sortOption"
                                            value={option.key()}
                                            checked={props.sort == option}
                                            onchange={move |_| on_select_sort.emit(option)}
                                        />
                                        <span>{ option.label() }</span>
                                    </label>
                                }
                            })
                        }
                    </div>
                </div>

                <button id="addTaskBtn" class="btn primary" onclick={move |_| on_toggle_form.emit(())}>
                    { "Add task" }
                </button>

                <div id="profileContainer" class="profile-container">
                    <button class="avatar" onclick={move |_| on_toggle_profile.emit(())}>{ "W" }</button>
                    <div id="profileDropdown" class={classes!("menu", visibility_class(props.profile_open))}>
                        {
                            for ProfileAction::ALL.into_iter().map(|action| {
                                let on_profile_action = props.on_profile_action.clone();
                                html! {
                                    <div class="menu-item" onclick={move |e: yew::MouseEvent| {
                                        e.stop_propagation();
                                        on_profile_action.emit(action);
                                    }}>
                                        { action.label() }
                                    </div>
                                }
                            })
                        }
                    </div>
                </div>
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub struct TaskFormProps {
    pub visible: bool,
    pub draft: FormDraft,
    pub errors: Vec<String>,
    pub description_expanded: bool,
    pub date_expanded: bool,
    pub on_input: Callback<(FormField, String)>,
    pub on_expand_description: Callback<()>,
    pub on_expand_date: Callback<()>,
    pub on_submit: Callback<()>,
    pub on_cancel: Callback<()>,
}

#[function_component(TaskFormView)]
pub fn task_form_view(props: &TaskFormProps) -> Html {
    let field_input = |field: FormField| {
        let on_input = props.on_input.clone();
        Callback::from(move |e: web_sys::InputEvent| {
            if let Some(value) = input_value(&e) {
                on_input.emit((field, value));
            }
        })
    };
    let on_name_keydown = {
        let on_submit = props.on_submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                on_submit.emit(());
            }
        })
    };
    let on_submit = props.on_submit.clone();
    let on_cancel = props.on_cancel.clone();
    let on_expand_description = props.on_expand_description.clone();
    let on_expand_date = props.on_expand_date.clone();

    html! {
        <div id="taskInputForm" class={classes!("task-form", visibility_class(props.visible))}>
            <input
                class="task-name-input"
                placeholder="Task name"
                value={props.draft.name.clone()}
                oninput={field_input(FormField::Name)}
                onkeydown={on_name_keydown}
            />
            {
                if props.description_expanded {
                    html! {
                        <textarea
                            class="task-description-input"
                            placeholder="Description"
                            value={props.draft.description.clone()}
                            oninput={field_input(FormField::Description)}
                        />
                    }
                } else {
                    html! {
                        <button class="link" onclick={move |_| on_expand_description.emit(())}>
                            { "Description" }
                        </button>
                    }
                }
            }
            {
                if props.date_expanded {
                    html! {
                        <input
                            type="date"
                            class="task-date-input"
                            value={props.draft.date.clone()}
                            oninput={field_input(FormField::Date)}
                        />
                    }
                } else {
                    html! {
                        <button class="link" onclick={move |_| on_expand_date.emit(())}>
                            { "Date" }
                        </button>
                    }
                }
            }
            {
                if props.errors.is_empty() {
                    html! {}
                } else {
                    html! {
                        <ul class="form-errors">
                            { for props.errors.iter().map(|message| html! { <li>{ message }</li> }) }
                        </ul>
                    }
                }
            }
            <div class="actions">
                <button class="btn" onclick={move |_| on_cancel.emit(())}>{ "Cancel" }</button>
                <button class="btn primary" onclick={move |_| on_submit.emit(())}>{ "Add task" }</button>
            </div>
        </div>
    }
}

/// Callbacks shared by every task row.
#[derive(Clone, PartialEq)]
pub struct TaskActions {
    pub on_check: Callback<(TaskId, bool)>,
    pub on_toggle_menu: Callback<TaskId>,
    pub on_rename: Callback<TaskId>,
    pub on_delete: Callback<TaskId>,
    pub on_toggle_subtasks: Callback<TaskId>,
    pub on_add_subtask: Callback<(TaskId, String)>,
    pub on_edit_subtask: Callback<(TaskId, String, String)>,
    pub on_check_subtask: Callback<(TaskId, String, bool)>,
    pub on_delete_subtask: Callback<(TaskId, String)>,
}

#[derive(Properties, PartialEq)]
pub struct TaskItemProps {
    pub task: TaskView,
    pub actions: TaskActions,
}

#[function_component(TaskItem)]
pub fn task_item(props: &TaskItemProps) -> Html {
    let task = &props.task;
    let id = task.id;
    let actions = &props.actions;

    let on_check = {
        let on_check = actions.on_check.clone();
        Callback::from(move |e: web_sys::Event| {
            if let Some(checked) = input_checked(&e) {
                on_check.emit((id, checked));
            }
        })
    };
    let on_toggle_menu = actions.on_toggle_menu.clone();
    let on_rename = actions.on_rename.clone();
    let on_delete = actions.on_delete.clone();
    let on_toggle_subtasks = actions.on_toggle_subtasks.clone();

    html! {
        <li
            class={classes!("task-item", task.leaving.then_some(LEAVING_CLASS))}
            data-task-id={id.to_string()}
        >
            <div class="task-row">
                <input
                    type="checkbox"
                    class={classes!("task-checkbox", task.completed.then_some(CHECKED_CLASS))}
                    checked={task.completed}
                    onchange={on_check}
                />
                <div class="task-body">
                    <span class={classes!("task-title", task.completed.then_some(STRUCK_CLASS))}>
                        { &task.title }
                    </span>
                    {
                        if task.description.is_empty() {
                            html! {}
                        } else {
                            html! { <p class="task-description">{ &task.description }</p> }
                        }
                    }
                    <span class="task-date" data-date={task.raw_date.clone()}>{ &task.date_label }</span>
                </div>
                <button
                    class="subtask-toggle"
                    data-subtask-toggle={id.to_string()}
                    onclick={move |_| on_toggle_subtasks.emit(id)}
                >
                    <span class={classes!("arrow", arrow_class(task.subtasks_open))}>{ "▸" }</span>
                    { &task.progress }
                </button>
                <div class="task-menu">
                    <button
                        class="menu-trigger"
                        data-task-dropdown={id.to_string()}
                        onclick={move |_| on_toggle_menu.emit(id)}
                    >
                        { "⋯" }
                    </button>
                    <div
                        class={classes!("menu", visibility_class(task.menu_open))}
                        data-task-dropdown-menu={id.to_string()}
                    >
                        <div class="menu-item" onclick={move |_| on_rename.emit(id)}>{ "Rename" }</div>
                        <div class="menu-item danger" onclick={move |_| on_delete.emit(id)}>{ "Delete" }</div>
                    </div>
                </div>
            </div>
            <SubtaskSection
                task_id={id}
                open={task.subtasks_open}
                subtasks={task.subtasks.clone()}
                actions={actions.clone()}
            />
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct SubtaskSectionProps {
    pub task_id: TaskId,
    pub open: bool,
    pub subtasks: Vec<SubtaskView>,
    pub actions: TaskActions,
}

#[function_component(SubtaskSection)]
pub fn subtask_section(props: &SubtaskSectionProps) -> Html {
    let pending = use_state(String::new);
    let task_id = props.task_id;

    let on_pending_input = {
        let pending = pending.clone();
        Callback::from(move |e: web_sys::InputEvent| {
            if let Some(value) = input_value(&e) {
                pending.set(value);
            }
        })
    };
    let submit = {
        let pending = pending.clone();
        let on_add_subtask = props.actions.on_add_subtask.clone();
        move || {
            on_add_subtask.emit((task_id, (*pending).clone()));
            pending.set(String::new());
        }
    };
    let on_pending_keydown = {
        let submit = submit.clone();
        Callback::from(move |e: KeyboardEvent| {
            if e.key() == "Enter" {
                e.prevent_default();
                submit();
            }
        })
    };

    html! {
        <div
            class={classes!("subtask-section", visibility_class(props.open))}
            data-subtask-for={task_id.to_string()}
        >
            <ul class="subtask-list">
                {
                    for props.subtasks.iter().map(|subtask| {
                        let sub_id = subtask.id.clone();
                        let on_check = {
                            let on_check_subtask = props.actions.on_check_subtask.clone();
                            let sub_id = sub_id.clone();
                            Callback::from(move |e: web_sys::Event| {
                                if let Some(checked) = input_checked(&e) {
                                    on_check_subtask.emit((task_id, sub_id.clone(), checked));
                                }
                            })
                        };
                        let on_edit = {
                            let on_edit_subtask = props.actions.on_edit_subtask.clone();
                            let sub_id = sub_id.clone();
                            Callback::from(move |e: web_sys::Event| {
                                if let Some(text) = input_value(&e) {
                                    on_edit_subtask.emit((task_id, sub_id.clone(), text));
                                }
                            })
                        };
                        let on_delete = {
                            let on_delete_subtask = props.actions.on_delete_subtask.clone();
                            let sub_id = sub_id.clone();
                            Callback::from(move |_: yew::MouseEvent| {
                                on_delete_subtask.emit((task_id, sub_id.clone()))
                            })
                        };

                        html! {
                            <li class="subtask-item" key={sub_id.clone()} data-subtask-id={sub_id}>
                                <input type="checkbox" checked={subtask.completed} onchange={on_check} />
                                <input
                                    class={classes!("subtask-text", subtask.completed.then_some(STRUCK_CLASS))}
                                    value={subtask.text.clone()}
                                    onchange={on_edit}
                                />
                                <button class="subtask-delete" onclick={on_delete}>{ "×" }</button>
                            </li>
                        }
                    })
                }
            </ul>
            <input
                class="subtask-input"
                placeholder="Add a subtask"
                value={(*pending).clone()}
                oninput={on_pending_input}
                onkeydown={on_pending_keydown}
            />
            <button class="btn" onclick={move |_| submit()}>{ "Add" }</button>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct CompletedSectionProps {
    pub label: String,
    pub open: bool,
    pub items: Vec<CompletedView>,
    pub on_toggle: Callback<()>,
    pub on_toggle_menu: Callback<TaskId>,
    pub on_restore: Callback<TaskId>,
    pub on_delete: Callback<TaskId>,
}

#[function_component(CompletedSection)]
pub fn completed_section(props: &CompletedSectionProps) -> Html {
    let on_toggle = props.on_toggle.clone();

    html! {
        <section class="completed-section">
            <button class="completed-header" onclick={move |_| on_toggle.emit(())}>
                <span class={classes!("arrow", arrow_class(props.open))}>{ "▸" }</span>
                { &props.label }
            </button>
            <ul class={classes!("completed-list", visibility_class(props.open))}>
                {
                    for props.items.iter().map(|item| {
                        let id = item.id;
                        let on_toggle_menu = props.on_toggle_menu.clone();
                        let on_restore = props.on_restore.clone();
                        let on_delete = props.on_delete.clone();
                        html! {
                            <li
                                key={id.to_string()}
                                class={classes!("completed-item", item.leaving.then_some(LEAVING_CLASS))}
                                data-completed-task-id={id.to_string()}
                            >
                                <span class={classes!("task-title", STRUCK_CLASS)}>{ &item.title }</span>
                                <button
                                    class="menu-trigger"
                                    data-completed-dropdown={id.to_string()}
                                    onclick={move |_| on_toggle_menu.emit(id)}
                                >
                                    { "⋯" }
                                </button>
                                <div
                                    class={classes!("menu", visibility_class(item.menu_open))}
                                    data-completed-dropdown-menu={id.to_string()}
                                >
                                    <div class="menu-item" onclick={move |_| on_restore.emit(id)}>{ "Restore" }</div>
                                    <div class="menu-item danger" onclick={move |_| on_delete.emit(id)}>
                                        { "Delete permanently" }
                                    </div>
                                </div>
                            </li>
                        }
                    })
                }
            </ul>
        </section>
    }
}
