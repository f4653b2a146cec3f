use std::collections::HashMap;

use chrono::{Datelike, Duration};
use sauron::{
    html::{attributes, attributes::*, *},
    prelude::*,
};
use taskflow_client::{DropOutcome, KanbanDrag, PendingSync, StoreError, TaskStore};
use taskflow_shared::{
    calendar, Priority, Status, Task, TaskDraft, TaskEdit, TaskId, TaskPatch, UserId,
};
use web_sys::{console, window};

mod api;

pub use api::FetchRepository;

#[derive(Debug, Clone, PartialEq)]
pub enum Page {
    Dashboard,
    Tasks,
    Board,
    Calendar,
}

impl Page {
    fn to_path(&self) -> &'static str {
        match self {
            Page::Dashboard => "/",
            Page::Tasks => "/tasks",
            Page::Board => "/kanban",
            Page::Calendar => "/calendar",
        }
    }

    fn from_path(path: &str) -> Self {
        match path {
            "/tasks" => Page::Tasks,
            "/kanban" => Page::Board,
            "/calendar" => Page::Calendar,
            _ => Page::Dashboard,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Msg {
    NavigateTo(Page),

    // Session
    SetUserInput(String),
    SignIn,
    SignOut,

    // Store results
    Settled(Result<(), String>),
    DismissError,

    // New task form
    SetNewTitle(String),
    SetNewDescription(String),
    SetNewDueDate(String),
    SetNewPriority(Priority),
    SetNewSubtasks(String),
    CreateTask,

    // Task list
    ToggleSubtask(TaskId, String),
    SetSubtaskInput(TaskId, String),
    AddSubtask(TaskId),
    RemoveSubtask(TaskId, String),
    DeleteTask(TaskId),

    // Edit form
    EditTask(TaskId),
    SetEditTitle(String),
    SetEditDescription(String),
    SetEditDueDate(String),
    SetEditPriority(Priority),
    SetEditStatus(Status),
    SaveEdit,
    CancelEdit,

    // Kanban board
    DragStart(TaskId),
    /// Drop target id under the pointer; anything but a column id is
    /// outside the board.
    DragOver(String),
    DragEnd,
    DragCancel,

    // Calendar
    ShiftMonth(i32),
    Reschedule(TaskId, i64),
}

#[derive(Clone)]
struct NewTaskForm {
    title: String,
    description: String,
    due_date: String,
    priority: Priority,
    subtasks: String,
}

impl Default for NewTaskForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            priority: Priority::Medium,
            subtasks: String::new(),
        }
    }
}

#[derive(Clone)]
pub struct Model {
    current_page: Page,
    store: TaskStore<FetchRepository>,
    drag: KanbanDrag,
    user_input: String,
    new_task: NewTaskForm,
    subtask_inputs: HashMap<TaskId, String>,
    editing: Option<(TaskId, TaskEdit)>,
    edit_error: Option<String>,
    calendar_month: (i32, u32),
}

impl Default for Model {
    fn default() -> Self {
        let store = TaskStore::new(FetchRepository::default());
        let today = store.clock().today();
        Self {
            current_page: Page::Dashboard,
            store,
            drag: KanbanDrag::new(),
            user_input: String::new(),
            new_task: NewTaskForm::default(),
            subtask_inputs: HashMap::new(),
            editing: None,
            edit_error: None,
            calendar_month: (today.year(), today.month()),
        }
    }
}

impl Application for Model {
    type MSG = Msg;

    fn init(&mut self) -> Cmd<Msg> {
        if let Some(window) = window() {
            if let Ok(pathname) = window.location().pathname() {
                self.current_page = Page::from_path(&pathname);
            }
        }
        Cmd::none()
    }

    fn update(&mut self, msg: Msg) -> Cmd<Msg> {
        match msg {
            Msg::NavigateTo(page) => {
                if let Some(history) = window().and_then(|w| w.history().ok()) {
                    let _ = history.push_state_with_url(
                        &wasm_bindgen::JsValue::NULL,
                        "",
                        Some(page.to_path()),
                    );
                }
                self.drag.cancel();
                self.current_page = page;
                Cmd::none()
            }
            Msg::SetUserInput(user) => {
                self.user_input = user;
                Cmd::none()
            }
            Msg::SignIn => {
                let user = self.user_input.trim();
                if user.is_empty() {
                    return Cmd::none();
                }
                sync(self.store.set_user(Some(UserId::new(user))))
            }
            Msg::SignOut => {
                self.drag.cancel();
                self.subtask_inputs.clear();
                self.editing = None;
                sync(self.store.set_user(None))
            }
            Msg::Settled(Ok(())) => Cmd::none(),
            Msg::Settled(Err(error)) => {
                log_error(&error);
                Cmd::none()
            }
            Msg::DismissError => {
                self.store.clear_error();
                Cmd::none()
            }
            Msg::SetNewTitle(task_title) => {
                self.new_task.title = task_title;
                Cmd::none()
            }
            Msg::SetNewDescription(description) => {
                self.new_task.description = description;
                Cmd::none()
            }
            Msg::SetNewDueDate(due_date) => {
                self.new_task.due_date = due_date;
                Cmd::none()
            }
            Msg::SetNewPriority(priority) => {
                self.new_task.priority = priority;
                Cmd::none()
            }
            Msg::SetNewSubtasks(subtasks) => {
                self.new_task.subtasks = subtasks;
                Cmd::none()
            }
            Msg::CreateTask => {
                let form = &self.new_task;
                let draft = TaskDraft::new(form.title.clone(), form.due_date.clone())
                    .description(form.description.clone())
                    .priority(form.priority)
                    .subtasks_csv(&form.subtasks);
                let cmd = dispatch(self.store.add(draft));
                if self.store.last_error().is_none() {
                    self.new_task = NewTaskForm::default();
                }
                cmd
            }
            Msg::ToggleSubtask(task_id, subtask_id) => {
                match self.store.task(&task_id).and_then(|t| t.toggle_subtask(&subtask_id)) {
                    Some(patch) => dispatch(self.store.update(&task_id, patch)),
                    None => Cmd::none(),
                }
            }
            Msg::SetSubtaskInput(task_id, subtask_title) => {
                self.subtask_inputs.insert(task_id, subtask_title);
                Cmd::none()
            }
            Msg::AddSubtask(task_id) => {
                let subtask_title = self.subtask_inputs.remove(&task_id).unwrap_or_default();
                let Some(task) = self.store.task(&task_id) else {
                    return Cmd::none();
                };
                match task.add_subtask(&subtask_title) {
                    Ok(patch) => dispatch(self.store.update(&task_id, patch)),
                    Err(err) => dispatch(Err(StoreError::from(err))),
                }
            }
            Msg::RemoveSubtask(task_id, subtask_id) => {
                match self.store.task(&task_id).and_then(|t| t.remove_subtask(&subtask_id)) {
                    Some(patch) => dispatch(self.store.update(&task_id, patch)),
                    None => Cmd::none(),
                }
            }
            Msg::DeleteTask(task_id) => {
                let confirmed = window()
                    .and_then(|w| w.confirm_with_message("Delete this task?").ok())
                    .unwrap_or(false);
                if !confirmed {
                    return Cmd::none();
                }
                self.subtask_inputs.remove(&task_id);
                if matches!(&self.editing, Some((editing, _)) if editing == &task_id) {
                    self.editing = None;
                }
                dispatch(self.store.remove(&task_id))
            }
            Msg::DragStart(task_id) => {
                self.drag.start(&self.store, &task_id);
                Cmd::none()
            }
            Msg::EditTask(task_id) => {
                if let Some(task) = self.store.task(&task_id) {
                    self.editing = Some((task_id, TaskEdit::of(&task)));
                    self.edit_error = None;
                }
                Cmd::none()
            }
            Msg::SetEditTitle(task_title) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.title = task_title;
                }
                Cmd::none()
            }
            Msg::SetEditDescription(description) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.description = description;
                }
                Cmd::none()
            }
            Msg::SetEditDueDate(due_date) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.due_date = due_date;
                }
                Cmd::none()
            }
            Msg::SetEditPriority(priority) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.priority = priority;
                }
                Cmd::none()
            }
            Msg::SetEditStatus(status) => {
                if let Some((_, edit)) = &mut self.editing {
                    edit.status = status;
                }
                Cmd::none()
            }
            Msg::SaveEdit => {
                let Some((task_id, edit)) = self.editing.take() else {
                    return Cmd::none();
                };
                let Some(task) = self.store.task(&task_id) else {
                    return Cmd::none();
                };
                match edit.diff(&task) {
                    Ok(Some(patch)) => {
                        self.edit_error = None;
                        dispatch(self.store.update(&task_id, patch))
                    }
                    Ok(None) => {
                        self.edit_error = None;
                        Cmd::none()
                    }
                    Err(err) => {
                        // Keep the form open so the input can be corrected.
                        self.edit_error = Some(err.to_string());
                        self.editing = Some((task_id, edit));
                        Cmd::none()
                    }
                }
            }
            Msg::CancelEdit => {
                self.editing = None;
                self.edit_error = None;
                Cmd::none()
            }
            Msg::DragOver(target_id) => {
                self.drag.hover_target(&target_id);
                Cmd::none()
            }
            Msg::DragEnd => match self.drag.release(&self.store) {
                Ok(DropOutcome::Committed(pending)) => sync(pending),
                Ok(_) => Cmd::none(),
                Err(err) => {
                    log_error(&err.to_string());
                    Cmd::none()
                }
            },
            Msg::DragCancel => {
                self.drag.cancel();
                Cmd::none()
            }
            Msg::ShiftMonth(delta) => {
                let (year, month) = self.calendar_month;
                let index = year * 12 + month as i32 - 1 + delta;
                self.calendar_month = (index.div_euclid(12), index.rem_euclid(12) as u32 + 1);
                Cmd::none()
            }
            Msg::Reschedule(task_id, days) => {
                let Some(task) = self.store.task(&task_id) else {
                    return Cmd::none();
                };
                let patch = TaskPatch::new().due_date(task.due_date + Duration::days(days));
                dispatch(self.store.update(&task_id, patch))
            }
        }
    }

    fn view(&self) -> Node<Msg> {
        div(
            [class("min-h-screen bg-ctp-base text-ctp-text")],
            [
                self.view_header(),
                self.view_error(),
                div(
                    [class("max-w-6xl mx-auto px-6 py-8")],
                    [if self.store.user().is_none() {
                        self.view_signed_out()
                    } else {
                        match self.current_page {
                            Page::Dashboard => self.view_dashboard(),
                            Page::Tasks => self.view_tasks_page(),
                            Page::Board => self.view_board(),
                            Page::Calendar => self.view_calendar(),
                        }
                    }],
                ),
            ],
        )
    }
}

impl Model {
    fn view_header(&self) -> Node<Msg> {
        header([class("bg-ctp-mantle shadow-lg border-b border-ctp-surface0")], [
            div([class("max-w-6xl mx-auto px-6 py-4")], [
                div([class("flex items-center justify-between")], [
                    h1([class("text-2xl font-bold text-ctp-text")], [text("TaskFlow")]),
                    nav([class("flex space-x-8")], [
                        self.nav_link("Dashboard", Page::Dashboard),
                        self.nav_link("Tasks", Page::Tasks),
                        self.nav_link("Kanban", Page::Board),
                        self.nav_link("Calendar", Page::Calendar),
                    ]),
                    self.view_session(),
                ]),
            ]),
        ])
    }

    fn nav_link(&self, link_label: &str, page: Page) -> Node<Msg> {
        let is_active = self.current_page == page;
        a(
            [
                href(page.to_path()),
                on_click(move |event| {
                    event.prevent_default();
                    Msg::NavigateTo(page.clone())
                }),
                class(&format!(
                    "px-3 py-2 rounded-md text-sm font-medium transition-colors duration-200 {}",
                    if is_active {
                        "bg-ctp-blue text-ctp-base"
                    } else {
                        "text-ctp-subtext1 hover:text-ctp-text hover:bg-ctp-surface0"
                    }
                )),
            ],
            [text(link_label)],
        )
    }

    fn view_session(&self) -> Node<Msg> {
        match self.store.user() {
            Some(user) => div([class("flex items-center gap-3")], [
                span([class("text-sm text-ctp-subtext1")], [text(&format!("Signed in as {}", user))]),
                button(
                    [
                        on_click(|_| Msg::SignOut),
                        class("px-3 py-1 rounded-md text-sm bg-ctp-surface1 hover:bg-ctp-surface2"),
                    ],
                    [text("Sign out")],
                ),
            ]),
            None => div([class("flex items-center gap-2")], [
                input(
                    [
                        r#type("text"),
                        placeholder("User id"),
                        value(&self.user_input),
                        on_input(|event| Msg::SetUserInput(event.value())),
                        class("px-3 py-1 bg-ctp-surface0 border border-ctp-surface2 rounded-md text-sm"),
                    ],
                    [],
                ),
                button(
                    [
                        on_click(|_| Msg::SignIn),
                        class("px-3 py-1 rounded-md text-sm bg-ctp-blue text-ctp-base"),
                    ],
                    [text("Sign in")],
                ),
            ]),
        }
    }

    fn view_error(&self) -> Node<Msg> {
        match self.store.last_error() {
            Some(error) => div(
                [class("max-w-6xl mx-auto mt-4 px-4 py-3 rounded-md bg-ctp-red/20 text-ctp-red flex justify-between")],
                [
                    span([], [text(&error)]),
                    button([on_click(|_| Msg::DismissError)], [text("✕")]),
                ],
            ),
            None => span([], []),
        }
    }

    fn view_signed_out(&self) -> Node<Msg> {
        div([class("text-center py-12")], [
            h2([class("text-xl font-semibold mb-2")], [text("Welcome to TaskFlow")]),
            p([class("text-ctp-subtext0")], [text("Sign in to see your tasks.")]),
        ])
    }

    fn view_dashboard(&self) -> Node<Msg> {
        let stats = self.store.stats();
        div([class("space-y-8")], [
            if self.store.is_loading() {
                p([class("text-ctp-subtext0")], [text("Loading your tasks...")])
            } else {
                span([], [])
            },
            div([class("grid grid-cols-1 md:grid-cols-4 gap-6")], [
                self.stat_card("Pending", &stats.pending.to_string(), "⏳"),
                self.stat_card("Done this week", &stats.completed_this_week.to_string(), "✅"),
                self.stat_card("Overdue", &stats.overdue.to_string(), "⚠️"),
                self.stat_card("Average progress", &format!("{}%", stats.average_progress), "📈"),
            ]),
            div(
                [class("p-6 bg-ctp-surface0 rounded-lg")],
                stats
                    .by_priority
                    .iter()
                    .map(|(priority, count)| {
                        self.progress_bar(priority.label(), *count, stats.total, priority_color(*priority))
                    })
                    .collect::<Vec<_>>(),
            ),
            self.view_create_form(),
        ])
    }

    fn stat_card(&self, card_title: &str, count: &str, icon: &str) -> Node<Msg> {
        div([class("p-6 bg-ctp-surface0 rounded-lg border border-ctp-surface1")], [
            div([class("flex items-center justify-between")], [
                span([class("text-ctp-subtext1")], [text(card_title)]),
                span([class("text-2xl")], [text(icon)]),
            ]),
            div([class("text-3xl font-bold mt-2")], [text(count)]),
        ])
    }

    fn progress_bar(&self, bar_label: &str, count: usize, total: usize, color_class: &str) -> Node<Msg> {
        let percent = if total == 0 { 0 } else { count * 100 / total };
        div([class("mb-3")], [
            div([class("flex justify-between text-sm mb-1")], [
                span([], [text(bar_label)]),
                span([], [text(&format!("{} tasks", count))]),
            ]),
            div([class("w-full h-2 bg-ctp-surface1 rounded-full")], [div(
                [
                    class(&format!("h-2 rounded-full {}", color_class)),
                    attributes::styles([("width", format!("{}%", percent))]),
                ],
                [],
            )]),
        ])
    }

    fn view_create_form(&self) -> Node<Msg> {
        let form = &self.new_task;
        div([class("p-6 bg-ctp-surface1 rounded-lg border border-ctp-surface2")], [
            h2([class("text-xl font-semibold mb-4 pb-2 border-b border-ctp-surface2")], [text("New Task")]),
            div([class("space-y-4")], [
                input(
                    [
                        r#type("text"),
                        placeholder("Title"),
                        value(&form.title),
                        on_input(|event| Msg::SetNewTitle(event.value())),
                        class("w-full px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md"),
                    ],
                    [],
                ),
                textarea(
                    [
                        placeholder("Description"),
                        value(&form.description),
                        on_input(|event| Msg::SetNewDescription(event.value())),
                        class("w-full px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md h-20"),
                    ],
                    [],
                ),
                input(
                    [
                        r#type("date"),
                        value(&form.due_date),
                        on_input(|event| Msg::SetNewDueDate(event.value())),
                        class("px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md"),
                    ],
                    [],
                ),
                div(
                    [class("flex gap-2")],
                    Priority::ALL
                        .iter()
                        .map(|&priority| {
                            button(
                                [
                                    on_click(move |_| Msg::SetNewPriority(priority)),
                                    class(&format!(
                                        "px-3 py-1 rounded-md text-sm {}",
                                        if form.priority == priority {
                                            "bg-ctp-blue text-ctp-base"
                                        } else {
                                            "bg-ctp-surface0"
                                        }
                                    )),
                                ],
                                [text(priority.label())],
                            )
                        })
                        .collect::<Vec<_>>(),
                ),
                input(
                    [
                        r#type("text"),
                        placeholder("Subtasks, comma separated (optional)"),
                        value(&form.subtasks),
                        on_input(|event| Msg::SetNewSubtasks(event.value())),
                        class("w-full px-3 py-2 bg-ctp-surface0 border border-ctp-surface2 rounded-md"),
                    ],
                    [],
                ),
                button(
                    [
                        on_click(|_| Msg::CreateTask),
                        class("bg-ctp-blue hover:bg-ctp-sapphire text-ctp-base font-medium px-6 py-2 rounded-md"),
                    ],
                    [text("Add Task")],
                ),
            ]),
        ])
    }

    fn view_tasks_page(&self) -> Node<Msg> {
        let tasks = self.store.tasks();
        if tasks.is_empty() {
            return div([class("text-center py-12")], [
                h3([class("text-lg font-medium mb-2")], [text("No tasks yet")]),
                p([class("text-ctp-subtext0")], [text("Create one from the dashboard.")]),
            ]);
        }
        div(
            [class("space-y-4")],
            tasks.iter().map(|task| self.view_task(task)).collect::<Vec<_>>(),
        )
    }

    fn view_task(&self, task: &Task) -> Node<Msg> {
        if let Some((editing, edit)) = &self.editing {
            if editing == &task.id {
                return self.view_edit_form(edit);
            }
        }
        let overdue = task.is_overdue(self.store.clock().today());
        let task_id = task.id.clone();
        div(
            [
                class(&format!(
                    "border rounded-xl p-6 bg-ctp-surface0 {}",
                    if overdue { "border-ctp-red" } else { "border-ctp-surface1" }
                )),
            ],
            [
                div([class("flex items-start justify-between gap-4")], [
                    div([class("flex-1 min-w-0")], [
                        h3([class("text-lg font-semibold")], [text(&task.title)]),
                        p([class("text-sm text-ctp-subtext1 break-words")], [text(&task.description)]),
                        p([class("text-xs text-ctp-subtext0 mt-2")], [text(&format!(
                            "Due {} · {} · {}{}",
                            task.due_date.format("%Y-%m-%d"),
                            task.priority.label(),
                            task.status.label(),
                            if overdue { " · overdue" } else { "" }
                        ))]),
                    ]),
                    button(
                        [
                            on_click({
                                let task_id = task_id.clone();
                                move |_| Msg::EditTask(task_id.clone())
                            }),
                            r#type("button"),
                            class("w-8 h-8 rounded-lg bg-ctp-blue/20 text-ctp-blue hover:bg-ctp-blue/30"),
                        ],
                        [text("✏️")],
                    ),
                    button(
                        [
                            on_click({
                                let task_id = task_id.clone();
                                move |_| Msg::DeleteTask(task_id.clone())
                            }),
                            r#type("button"),
                            class("w-8 h-8 rounded-lg bg-ctp-red/20 text-ctp-red hover:bg-ctp-red/30"),
                        ],
                        [text("🗑️")],
                    ),
                ]),
                self.progress_bar("Progress", task.progress as usize, 100, "bg-ctp-green"),
                ul(
                    [class("space-y-1")],
                    task.subtasks
                        .iter()
                        .map(|subtask| self.view_subtask(&task_id, subtask))
                        .collect::<Vec<_>>(),
                ),
                div([class("flex gap-2 mt-3")], [
                    input(
                        [
                            r#type("text"),
                            placeholder("New subtask"),
                            value(self.subtask_inputs.get(&task_id).cloned().unwrap_or_default()),
                            on_input({
                                let task_id = task_id.clone();
                                move |event| Msg::SetSubtaskInput(task_id.clone(), event.value())
                            }),
                            class("flex-1 px-3 py-1 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-sm"),
                        ],
                        [],
                    ),
                    button(
                        [
                            on_click({
                                let task_id = task_id.clone();
                                move |_| Msg::AddSubtask(task_id.clone())
                            }),
                            class("px-3 py-1 rounded-md text-sm bg-ctp-surface2"),
                        ],
                        [text("Add")],
                    ),
                ]),
            ],
        )
    }

    fn view_edit_form(&self, edit: &TaskEdit) -> Node<Msg> {
        let field_class = "w-full px-3 py-2 bg-ctp-surface1 border border-ctp-surface2 rounded-md text-ctp-text \
            focus:outline-none focus:ring-2 focus:ring-ctp-blue focus:border-transparent";
        div([class("border rounded-xl p-6 bg-ctp-surface0 border-ctp-blue")], [
            div([class("space-y-3")], [
                input(
                    [
                        r#type("text"),
                        value(&edit.title),
                        on_input(|event| Msg::SetEditTitle(event.value())),
                        class(field_class),
                    ],
                    [],
                ),
                textarea(
                    [
                        value(&edit.description),
                        on_input(|event| Msg::SetEditDescription(event.value())),
                        class(&format!("{} h-20 resize-y", field_class)),
                    ],
                    [],
                ),
                input(
                    [
                        r#type("date"),
                        value(&edit.due_date),
                        on_input(|event| Msg::SetEditDueDate(event.value())),
                        class(field_class),
                    ],
                    [],
                ),
                div(
                    [class("flex gap-2")],
                    Priority::ALL
                        .iter()
                        .map(|&priority| {
                            choice_button(
                                priority.label(),
                                edit.priority == priority,
                                Msg::SetEditPriority(priority),
                            )
                        })
                        .collect::<Vec<_>>(),
                ),
                div(
                    [class("flex gap-2")],
                    Status::COLUMNS
                        .iter()
                        .map(|&status| {
                            choice_button(status.label(), edit.status == status, Msg::SetEditStatus(status))
                        })
                        .collect::<Vec<_>>(),
                ),
                match &self.edit_error {
                    Some(error) => p([class("text-sm text-ctp-red")], [text(error)]),
                    None => span([], []),
                },
                div([class("flex gap-2")], [
                    button(
                        [
                            on_click(|_| Msg::SaveEdit),
                            class("bg-ctp-green hover:bg-ctp-teal text-ctp-base font-medium px-4 py-2 rounded-md"),
                        ],
                        [text("Save")],
                    ),
                    button(
                        [
                            on_click(|_| Msg::CancelEdit),
                            class("bg-ctp-overlay0 hover:bg-ctp-overlay1 text-ctp-text font-medium px-4 py-2 rounded-md"),
                        ],
                        [text("Cancel")],
                    ),
                ]),
            ]),
        ])
    }

    fn view_subtask(&self, task_id: &TaskId, subtask: &taskflow_shared::Subtask) -> Node<Msg> {
        let toggle = {
            let task_id = task_id.clone();
            let subtask_id = subtask.id.clone();
            move |_| Msg::ToggleSubtask(task_id.clone(), subtask_id.clone())
        };
        let remove = {
            let task_id = task_id.clone();
            let subtask_id = subtask.id.clone();
            move |_| Msg::RemoveSubtask(task_id.clone(), subtask_id.clone())
        };
        li([class("flex items-center gap-2 text-sm")], [
            button(
                [
                    on_click(toggle),
                    class(&format!(
                        "w-5 h-5 rounded border-2 flex items-center justify-center {}",
                        if subtask.completed {
                            "bg-ctp-green border-ctp-green"
                        } else {
                            "border-ctp-surface2 hover:border-ctp-blue"
                        }
                    )),
                ],
                [if subtask.completed {
                    span([class("text-ctp-base text-xs font-bold")], [text("✓")])
                } else {
                    span([], [])
                }],
            ),
            span(
                [class(if subtask.completed {
                    "line-through text-ctp-overlay1"
                } else {
                    "text-ctp-text"
                })],
                [text(&subtask.title)],
            ),
            button([on_click(remove), class("text-ctp-red")], [text("✕")]),
        ])
    }

    fn view_board(&self) -> Node<Msg> {
        let tasks = self.store.tasks();
        let columns = self.drag.columns(&tasks);
        div(
            [
                class(&format!(
                    "grid grid-cols-1 md:grid-cols-3 gap-6 select-none {}",
                    if self.drag.is_dragging() { "cursor-grabbing" } else { "" }
                )),
                on_mouseup(|_| Msg::DragEnd),
                on_mouseleave(|_| Msg::DragCancel),
            ],
            columns
                .iter()
                .map(|column| {
                    let status = column.status;
                    div(
                        [
                            id(status.as_str()),
                            class("bg-ctp-surface0 border border-ctp-surface1 rounded-lg p-4 min-h-[400px]"),
                            on_mouseenter(move |_| Msg::DragOver(status.as_str().to_string())),
                            on_mouseleave(|_| Msg::DragOver("board".to_string())),
                        ],
                        [
                            h2([class("text-xl font-bold mb-4 flex justify-between")], [
                                text(status.label()),
                                span([class("text-sm px-2 rounded-full bg-ctp-base")], [text(&column.tasks.len().to_string())]),
                            ]),
                            div(
                                [class("space-y-3 min-h-[200px]")],
                                column.tasks.iter().map(|task| self.view_card(task)).collect::<Vec<_>>(),
                            ),
                        ],
                    )
                })
                .collect::<Vec<_>>(),
        )
    }

    fn view_card(&self, task: &Task) -> Node<Msg> {
        let is_dragged = self.drag.dragged() == Some(&task.id);
        let task_id = task.id.clone();
        div(
            [
                on_mousedown(move |_| Msg::DragStart(task_id.clone())),
                class(&format!(
                    "rounded-lg p-4 border border-ctp-surface2 bg-ctp-mantle cursor-grab border-l-4 {} {}",
                    status_border(task.status),
                    if is_dragged { "opacity-50" } else { "" }
                )),
            ],
            [
                h4([class("font-semibold")], [text(&task.title)]),
                p([class("text-sm text-ctp-subtext1 line-clamp-3")], [text(&task.description)]),
                p([class("text-xs text-ctp-subtext0 mt-2")], [text(&format!("Due {}", task.due_date.format("%Y-%m-%d")))]),
                div([class("text-xs font-medium mt-2")], [text(&format!("Progress: {}%", task.progress))]),
            ],
        )
    }

    fn view_calendar(&self) -> Node<Msg> {
        let (year, month) = self.calendar_month;
        let tasks = self.store.tasks();
        let days = calendar::agenda(&tasks, year, month);
        div([class("space-y-6")], [
            div([class("flex items-center justify-between")], [
                button([on_click(|_| Msg::ShiftMonth(-1)), class("px-3 py-1 rounded-md bg-ctp-surface1")], [text("‹")]),
                h2([class("text-xl font-semibold")], [text(&format!("{}-{:02}", year, month))]),
                button([on_click(|_| Msg::ShiftMonth(1)), class("px-3 py-1 rounded-md bg-ctp-surface1")], [text("›")]),
            ]),
            if days.is_empty() {
                p([class("text-ctp-subtext0")], [text("Nothing due this month.")])
            } else {
                div(
                    [class("space-y-4")],
                    days.iter()
                        .map(|(day, due)| {
                            div([class("p-4 bg-ctp-surface0 rounded-lg")], [
                                h3([class("font-semibold mb-2")], [text(&day.format("%a %d").to_string())]),
                                ul(
                                    [class("space-y-1")],
                                    due.iter().map(|task| self.view_agenda_item(task)).collect::<Vec<_>>(),
                                ),
                            ])
                        })
                        .collect::<Vec<_>>(),
                )
            },
        ])
    }

    fn view_agenda_item(&self, task: &Task) -> Node<Msg> {
        let task_id = task.id.clone();
        li([class("flex items-center justify-between text-sm")], [
            span(
                [class(if task.status == Status::Done { "text-ctp-green" } else { "text-ctp-blue" })],
                [text(&task.title)],
            ),
            button(
                [
                    on_click(move |_| Msg::Reschedule(task_id.clone(), 1)),
                    class("px-2 rounded-md bg-ctp-surface1"),
                ],
                [text("+1 day")],
            ),
        ])
    }
}

fn choice_button(choice: &str, is_chosen: bool, msg: Msg) -> Node<Msg> {
    button(
        [
            on_click(move |_| msg.clone()),
            class(&format!(
                "px-3 py-1 rounded-md text-sm {}",
                if is_chosen { "bg-ctp-blue text-ctp-base" } else { "bg-ctp-surface1" }
            )),
        ],
        [text(choice)],
    )
}

fn sync(pending: PendingSync) -> Cmd<Msg> {
    Cmd::new(async move { Msg::Settled(pending.await.map_err(|e| e.to_string())) })
}

/// Errors raised before any request is sent only need logging here.
fn dispatch(result: Result<PendingSync, StoreError>) -> Cmd<Msg> {
    match result {
        Ok(pending) => sync(pending),
        Err(err) => {
            log_error(&err.to_string());
            Cmd::none()
        }
    }
}

fn log_error(error: &str) {
    console::log_1(&format!("Error: {}", error).into());
}

fn priority_color(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "bg-ctp-green",
        Priority::Medium => "bg-ctp-yellow",
        Priority::High => "bg-ctp-red",
    }
}

fn status_border(status: Status) -> &'static str {
    match status {
        Status::Todo => "border-l-ctp-blue",
        Status::Doing => "border-l-ctp-peach",
        Status::Done => "border-l-ctp-green",
    }
}

#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    Program::mount_to_body(Model::default());
}
