use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::GatewayClient;
use crate::gateway::GatewayResult;
use crate::models::{CreateTodo, Project, Todo, UpdateTodo};
use crate::sync::{CollectionError, MutationHandle, Remote, SyncEntity, SyncService};

impl SyncEntity for Todo {
    type Patch = UpdateTodo;
    const KIND: &'static str = "todo";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn diff(before: &Self, after: &Self) -> Option<UpdateTodo> {
        let patch = UpdateTodo {
            text: (before.text != after.text).then(|| after.text.clone()),
            completed: (before.completed != after.completed).then_some(after.completed),
            project_id: (before.project_id != after.project_id).then_some(after.project_id),
            user_ids: (before.user_ids != after.user_ids).then(|| after.user_ids.clone()),
        };
        (!patch.is_empty()).then_some(patch)
    }

    fn apply(&mut self, patch: &UpdateTodo) {
        if let Some(text) = &patch.text {
            self.text = text.clone();
        }
        if let Some(completed) = patch.completed {
            self.completed = completed;
        }
        if let Some(project_id) = patch.project_id {
            self.project_id = project_id;
        }
        if let Some(user_ids) = &patch.user_ids {
            self.user_ids = user_ids.clone();
        }
    }
}

/// Todo procedures of a [`GatewayClient`], as a collection remote.
pub struct TodoSource {
    client: Arc<dyn GatewayClient>,
}

impl TodoSource {
    pub fn new(client: Arc<dyn GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Remote<Todo> for TodoSource {
    async fn fetch_all(&self) -> GatewayResult<Vec<Todo>> {
        self.client.get_todos().await
    }

    async fn create(&self, todo: &Todo) -> GatewayResult<Todo> {
        let input = CreateTodo {
            text: todo.text.clone(),
            completed: todo.completed,
            project_id: todo.project_id,
            user_ids: todo.user_ids.clone(),
        };
        self.client.create_todo(input).await
    }

    async fn update(&self, id: i32, patch: &UpdateTodo) -> GatewayResult<Todo> {
        self.client.update_todo(id, patch.clone()).await
    }

    async fn delete(&self, id: i32) -> GatewayResult<Todo> {
        self.client.delete_todo(id).await
    }
}

impl SyncService {
    /// Todos of project `project_id` in display order. Accepts a provisional project id.
    pub fn get_todos_for_project(&self, project_id: i32) -> Vec<Todo> {
        let project_id = self.projects.resolve(project_id);
        self.todos.filter(|todo| todo.project_id == project_id)
    }

    /// Adds a todo to project `project_id` optimistically.
    ///
    /// # Errors
    /// Returns `NotFound` when the project is not in the view, and
    /// `Unconfirmed` while the project itself is still waiting for its server id.
    pub fn create_todo(&self, project_id: i32, text: &str) -> Result<MutationHandle<Todo>, CollectionError> {
        let project = self.projects.get(project_id).ok_or(CollectionError::NotFound {
            kind: Project::KIND,
            id: project_id,
        })?;
        if project.id < 0 {
            return Err(CollectionError::Unconfirmed {
                kind: Project::KIND,
                id: project.id,
            });
        }

        let todo = Todo {
            id: self.todos.provisional_id(),
            text: text.trim().to_string(),
            completed: false,
            project_id: project.id,
            user_ids: None,
            created_at: Utc::now(),
        };
        self.todos.insert(todo)
    }

    pub fn edit_todo(&self, id: i32, text: &str) -> Result<MutationHandle<Todo>, CollectionError> {
        let text = text.trim().to_string();
        self.todos.update(id, move |todo| todo.text = text)
    }

    /// Flips the completed flag of todo `id`.
    pub fn toggle_todo(&self, id: i32) -> Result<MutationHandle<Todo>, CollectionError> {
        self.todos.update(id, |todo| todo.completed = !todo.completed)
    }

    pub fn delete_todo(&self, id: i32) -> Result<MutationHandle<Todo>, CollectionError> {
        self.todos.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn toggling_twice_yields_no_patch() {
        let todo = Todo {
            id: 3,
            text: "Buy milk".to_string(),
            completed: false,
            project_id: 1,
            user_ids: Some(vec!["u1".to_string()]),
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        };
        let mut toggled = todo.clone();
        toggled.completed = true;

        let patch = Todo::diff(&todo, &toggled).unwrap();
        assert_eq!(patch.completed, Some(true));
        assert_eq!(patch.text, None);

        toggled.completed = false;
        assert!(Todo::diff(&todo, &toggled).is_none());
    }
}
