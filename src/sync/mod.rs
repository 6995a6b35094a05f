//! Client-side synchronization for todosync.
//!
//! Each entity table is mirrored by a [`Collection`]: a snapshot of the
//! server rows with the user's pending mutations replayed on top. Mutations
//! show in the view at once and are forwarded to the Gateway in the
//! background; periodic refreshes reconcile the mirror with the server.
//!
//! [`SyncService`] bundles the project and todo collections behind one
//! [`GatewayClient`] and offers the operations the view layer issues.

pub mod collection;
pub mod entity;
pub mod error;
pub mod mutation;
pub mod projects;
pub mod todos;

pub use collection::{Collection, MutationHandle};
pub use entity::{Remote, SyncEntity};
pub use error::CollectionError;
pub use mutation::{MutationFailure, MutationKind};
pub use projects::ProjectSource;
pub use todos::TodoSource;

use std::sync::Arc;

use log::{error, info};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::client::GatewayClient;
use crate::config::SyncConfig;
use crate::models::{Project, Todo};

/// Project and todo collections sharing one Gateway client.
///
/// Cloning is cheap; clones share the collections.
#[derive(Clone)]
pub struct SyncService {
    client: Arc<dyn GatewayClient>,
    projects: Collection<Project>,
    todos: Collection<Todo>,
    sync_in_progress: Arc<Mutex<bool>>,
    pollers: Arc<std::sync::Mutex<Vec<JoinHandle<()>>>>,
}

/// Outcome of a manual sync, for the status bar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    Idle,
    /// Another sync was already running
    InProgress,
    Success,
    Error {
        /// Human-readable error message describing what went wrong
        message: String,
    },
}

impl SyncService {
    pub fn new(client: Arc<dyn GatewayClient>) -> Self {
        let projects = Collection::new(Arc::new(ProjectSource::new(Arc::clone(&client))));
        let todos = Collection::new(Arc::new(TodoSource::new(Arc::clone(&client))));

        Self {
            client,
            projects,
            todos,
            sync_in_progress: Arc::new(Mutex::new(false)),
            pollers: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    pub fn projects(&self) -> &Collection<Project> {
        &self.projects
    }

    pub fn todos(&self) -> &Collection<Todo> {
        &self.todos
    }

    /// Refreshes projects, then todos. Only one sync runs at a time.
    pub async fn sync(&self) -> SyncStatus {
        {
            let mut sync_guard = self.sync_in_progress.lock().await;
            if *sync_guard {
                return SyncStatus::InProgress;
            }
            *sync_guard = true;
        }

        let status = self.perform_sync().await;

        *self.sync_in_progress.lock().await = false;
        status
    }

    async fn perform_sync(&self) -> SyncStatus {
        info!("🔄 Starting sync via {} client...", self.client.kind());

        if let Err(e) = self.projects.refresh().await {
            error!("❌ Failed to sync projects: {e}");
            return SyncStatus::Error {
                message: format!("Failed to sync projects: {e}"),
            };
        }

        if let Err(e) = self.todos.refresh().await {
            error!("❌ Failed to sync todos: {e}");
            return SyncStatus::Error {
                message: format!("Failed to sync todos: {e}"),
            };
        }

        info!(
            "✅ Synced {} projects and {} todos",
            self.projects.len(),
            self.todos.len()
        );
        SyncStatus::Success
    }

    /// Starts background refreshes at the configured intervals.
    /// Restarting replaces the previous pollers.
    pub fn start_polling(&self, config: &SyncConfig) {
        let mut pollers = self.pollers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for poller in pollers.drain(..) {
            poller.abort();
        }
        pollers.push(self.projects.start_polling(config.project_poll_interval()));
        pollers.push(self.todos.start_polling(config.todo_poll_interval()));
    }

    pub fn stop_polling(&self) {
        let mut pollers = self.pollers.lock().unwrap_or_else(std::sync::PoisonError::into_inner);
        for poller in pollers.drain(..) {
            poller.abort();
        }
    }

    /// Rejected mutations of both collections still awaiting the revert of the next sync.
    pub fn failures(&self) -> Vec<MutationFailure> {
        let mut failures = self.projects.failures();
        failures.extend(self.todos.failures());
        failures
    }

    /// Mutations of both collections not yet reflected in a snapshot.
    pub fn pending_count(&self) -> usize {
        self.projects.pending_count() + self.todos.pending_count()
    }
}
