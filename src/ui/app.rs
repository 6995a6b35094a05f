//! Application state and business logic

use ratatui::widgets::ListState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::constants::{
    ERROR_EMPTY_INPUT, ERROR_MUTATION_FAILED, ERROR_NO_PROJECT_SELECTED, ERROR_PROJECT_NOT_FOUND,
    ERROR_PROJECT_SYNCING, SUCCESS_PROJECT_CREATED, SUCCESS_PROJECT_DELETED, SUCCESS_PROJECT_UPDATED,
    SIDEBAR_DEFAULT_WIDTH, SUCCESS_SYNCED, SUCCESS_TODO_CREATED, SUCCESS_TODO_DELETED, SUCCESS_TODO_UPDATED,
};
use crate::models::{Project, Todo};
use crate::sync::{CollectionError, MutationHandle, SyncService, SyncStatus};

/// Which list has keyboard focus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    Projects,
    Todos,
}

/// What the inline input line is editing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    AddProject,
    AddTodo,
    RenameProject(i32),
    EditDescription(i32),
    EditTodo(i32),
}

/// One line for the status bar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }
}

/// Application state
pub struct App {
    pub should_quit: bool,
    pub projects: Vec<Project>,
    pub todos: Vec<Todo>,
    pub focus: Pane,
    /// Project whose todos are shown, by id
    pub current_project: Option<i32>,
    /// The current project disappeared from the server
    pub project_missing: bool,
    pub project_list_state: ListState,
    pub todo_list_state: ListState,
    pub input_mode: InputMode,
    pub input: String,
    pub status: Option<StatusMessage>,
    pub show_logs: bool,
    pub sidebar_width: u16,
    pub syncing: bool,
    pub last_sync_status: SyncStatus,
    pub sync_task: Option<JoinHandle<SyncStatus>>,
    feedback_tx: mpsc::UnboundedSender<StatusMessage>,
    feedback_rx: mpsc::UnboundedReceiver<StatusMessage>,
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a new App instance
    #[must_use]
    pub fn new() -> Self {
        let (feedback_tx, feedback_rx) = mpsc::unbounded_channel();

        Self {
            should_quit: false,
            projects: Vec::new(),
            todos: Vec::new(),
            focus: Pane::Projects,
            current_project: None,
            project_missing: false,
            project_list_state: ListState::default(),
            todo_list_state: ListState::default(),
            input_mode: InputMode::Normal,
            input: String::new(),
            status: None,
            show_logs: false,
            sidebar_width: SIDEBAR_DEFAULT_WIDTH,
            syncing: false,
            last_sync_status: SyncStatus::Idle,
            sync_task: None,
            feedback_tx,
            feedback_rx,
        }
    }

    /// Re-read both collections and fix up the selections.
    pub fn reload(&mut self, sync: &SyncService) {
        self.projects = sync.get_projects();

        if let Some(id) = self.current_project {
            let id = sync.projects().resolve(id);
            self.current_project = Some(id);

            match self.projects.iter().position(|project| project.id == id) {
                Some(index) => {
                    self.project_list_state.select(Some(index));
                    self.project_missing = false;
                }
                None if sync.projects().is_loaded() && !self.project_missing => {
                    self.project_missing = true;
                    self.status = Some(StatusMessage::error(ERROR_PROJECT_NOT_FOUND));
                }
                None => {}
            }
        } else if let Some(first) = self.projects.first() {
            self.current_project = Some(first.id);
            self.project_list_state.select(Some(0));
        }

        self.todos = match self.current_project {
            Some(id) if !self.project_missing => sync.get_todos_for_project(id),
            _ => Vec::new(),
        };
        clamp(&mut self.todo_list_state, self.todos.len());
        if self.projects.is_empty() {
            self.project_list_state.select(None);
        }
    }

    #[must_use]
    pub fn selected_project(&self) -> Option<&Project> {
        let id = self.current_project?;
        self.projects.iter().find(|project| project.id == id)
    }

    #[must_use]
    pub fn selected_todo(&self) -> Option<&Todo> {
        self.todo_list_state.selected().and_then(|index| self.todos.get(index))
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Pane::Projects => Pane::Todos,
            Pane::Todos => Pane::Projects,
        };
    }

    /// Move the selection of the focused list by `delta` rows.
    pub fn move_selection(&mut self, delta: isize, sync: &SyncService) {
        match self.focus {
            Pane::Projects => {
                if self.projects.is_empty() {
                    return;
                }
                let current = self.project_list_state.selected().unwrap_or(0);
                let index = step(current, delta, self.projects.len());
                self.project_list_state.select(Some(index));
                self.current_project = Some(self.projects[index].id);
                self.project_missing = false;
                self.todo_list_state.select(None);
                self.reload(sync);
            }
            Pane::Todos => {
                if self.todos.is_empty() {
                    return;
                }
                let current = self.todo_list_state.selected().unwrap_or(0);
                self.todo_list_state.select(Some(step(current, delta, self.todos.len())));
            }
        }
    }

    /// Open the input line for `mode`, prefilled with `initial`.
    pub fn start_input(&mut self, mode: InputMode, initial: &str) {
        self.input_mode = mode;
        self.input = initial.to_string();
    }

    pub fn cancel_input(&mut self) {
        self.input_mode = InputMode::Normal;
        self.input.clear();
    }

    /// `a`: add to the focused list
    pub fn begin_add(&mut self) {
        match self.focus {
            Pane::Projects => self.start_input(InputMode::AddProject, ""),
            Pane::Todos if self.current_project.is_some() && !self.project_missing => {
                self.start_input(InputMode::AddTodo, "")
            }
            Pane::Todos => self.status = Some(StatusMessage::error(ERROR_NO_PROJECT_SELECTED)),
        }
    }

    /// `e`: rename the selected project or edit the selected todo
    pub fn begin_edit(&mut self) {
        match self.focus {
            Pane::Projects => {
                if let Some(project) = self.selected_project() {
                    let (id, name) = (project.id, project.name.clone());
                    self.start_input(InputMode::RenameProject(id), &name);
                }
            }
            Pane::Todos => {
                if let Some(todo) = self.selected_todo() {
                    let (id, text) = (todo.id, todo.text.clone());
                    self.start_input(InputMode::EditTodo(id), &text);
                }
            }
        }
    }

    /// `d`: edit the description of the selected project
    pub fn begin_edit_description(&mut self) {
        if let Some(project) = self.selected_project() {
            let (id, description) = (project.id, project.description.clone().unwrap_or_default());
            self.start_input(InputMode::EditDescription(id), &description);
        }
    }

    /// Apply the input line. Only a description may be submitted empty, which clears it.
    pub fn submit_input(&mut self, sync: &SyncService) {
        let mode = self.input_mode;
        let input = std::mem::take(&mut self.input);
        self.input_mode = InputMode::Normal;

        let text = input.trim();
        if text.is_empty() && !matches!(mode, InputMode::EditDescription(_)) {
            self.status = Some(StatusMessage::error(ERROR_EMPTY_INPUT));
            return;
        }

        match mode {
            InputMode::Normal => {}
            InputMode::AddProject => {
                let result = sync.create_project(text, None);
                self.track(result, SUCCESS_PROJECT_CREATED);
                if let Some(last) = sync.get_projects().last() {
                    self.current_project = Some(last.id);
                    self.project_missing = false;
                }
            }
            InputMode::AddTodo => match self.current_project {
                Some(project_id) => {
                    let result = sync.create_todo(project_id, text);
                    self.track(result, SUCCESS_TODO_CREATED);
                }
                None => self.status = Some(StatusMessage::error(ERROR_NO_PROJECT_SELECTED)),
            },
            InputMode::RenameProject(id) => {
                let result = sync.rename_project(id, text);
                self.track(result, SUCCESS_PROJECT_UPDATED);
            }
            InputMode::EditDescription(id) => {
                let description = (!text.is_empty()).then(|| text.to_string());
                let result = sync.set_project_description(id, description);
                self.track(result, SUCCESS_PROJECT_UPDATED);
            }
            InputMode::EditTodo(id) => {
                let result = sync.edit_todo(id, text);
                self.track(result, SUCCESS_TODO_UPDATED);
            }
        }
        self.reload(sync);
    }

    /// `Space`: toggle the selected todo
    pub fn toggle_selected_todo(&mut self, sync: &SyncService) {
        if let Some(id) = self.selected_todo().map(|todo| todo.id) {
            let result = sync.toggle_todo(id);
            self.track(result, SUCCESS_TODO_UPDATED);
            self.reload(sync);
        }
    }

    /// `x`: delete the selection of the focused list
    pub fn delete_selected(&mut self, sync: &SyncService) {
        match self.focus {
            Pane::Projects => {
                if let Some(id) = self.selected_project().map(|project| project.id) {
                    let result = sync.delete_project(id);
                    self.track(result, SUCCESS_PROJECT_DELETED);
                    self.current_project = None;
                    self.todo_list_state.select(None);
                }
            }
            Pane::Todos => {
                if let Some(id) = self.selected_todo().map(|todo| todo.id) {
                    let result = sync.delete_todo(id);
                    self.track(result, SUCCESS_TODO_DELETED);
                }
            }
        }
        self.reload(sync);
    }

    /// `r`: run a sync in the background unless one is running
    pub fn start_sync(&mut self, sync: &SyncService) {
        if self.sync_task.is_some() {
            return;
        }
        self.syncing = true;
        let svc = sync.clone();
        self.sync_task = Some(tokio::spawn(async move { svc.sync().await }));
    }

    /// Cancel a manual sync still running when the app quits.
    pub fn shutdown(&mut self) {
        if let Some(handle) = self.sync_task.take() {
            handle.abort();
        }
        self.syncing = false;
    }

    /// Collect finished background work: sync results and mutation outcomes.
    pub async fn poll_background(&mut self, sync: &SyncService) {
        if let Some(handle) = self.sync_task.take_if(|handle| handle.is_finished()) {
            self.syncing = false;
            match handle.await {
                Ok(status) => {
                    self.status = Some(match &status {
                        SyncStatus::Error { message } => StatusMessage::error(format!("❌ {message}")),
                        _ => StatusMessage::info(SUCCESS_SYNCED),
                    });
                    self.last_sync_status = status;
                }
                Err(join_err) => {
                    self.status = Some(StatusMessage::error(format!("Sync task error: {join_err}")));
                }
            }
            self.reload(sync);
        }

        while let Ok(message) = self.feedback_rx.try_recv() {
            // errors stay up until something else is reported
            if message.is_error || !self.status.as_ref().is_some_and(|status| status.is_error) {
                self.status = Some(message);
            }
        }
    }

    /// Report the outcome of a mutation in the status bar once the Gateway answers.
    fn track<E: Send + 'static>(&mut self, result: Result<MutationHandle<E>, CollectionError>, success: &'static str) {
        let handle = match result {
            Ok(handle) => handle,
            Err(err) => {
                self.status = Some(describe(&err));
                return;
            }
        };

        self.status = None;
        let feedback = self.feedback_tx.clone();
        tokio::spawn(async move {
            let message = match handle.outcome().await {
                Ok(_) => StatusMessage::info(success),
                Err(err) => describe(&err),
            };
            let _ = feedback.send(message);
        });
    }
}

fn describe(err: &CollectionError) -> StatusMessage {
    match err {
        CollectionError::Unconfirmed { kind: "project", .. } => StatusMessage::error(ERROR_PROJECT_SYNCING),
        CollectionError::NotFound { kind: "project", .. } => StatusMessage::error(ERROR_PROJECT_NOT_FOUND),
        CollectionError::Gateway(gateway) => StatusMessage::error(format!("{ERROR_MUTATION_FAILED}: {}", gateway.message())),
        other => StatusMessage::error(format!("❌ {other}")),
    }
}

fn step(current: usize, delta: isize, len: usize) -> usize {
    current.saturating_add_signed(delta).min(len - 1)
}

fn clamp(state: &mut ListState, len: usize) {
    match (state.selected(), len) {
        (_, 0) => state.select(None),
        (None, _) => state.select(Some(0)),
        (Some(index), len) if index >= len => state.select(Some(len - 1)),
        _ => {}
    }
}
