use log::{info, warn};
use sea_orm::{ActiveValue, IntoActiveModel};

use crate::models::{encode_user_ids, CreateTodo, Todo, UpdateTodo};
use crate::repositories::{ProjectRepository, TodoRepository};

use super::{is_record_not_updated, validate, Gateway, GatewayError, GatewayResult};

fn todo_not_found(id: i32) -> GatewayError {
    GatewayError::not_found(format!("Todo {id} not found"))
}

impl Gateway {
    /// `todos.getAll`: every todo in creation order.
    pub async fn get_todos(&self) -> GatewayResult<Vec<Todo>> {
        let rows = TodoRepository::get_all(&self.store.conn).await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    /// `todos.create`: insert a todo into an existing project.
    pub async fn create_todo(&self, input: CreateTodo) -> GatewayResult<Todo> {
        let input = validate::create_todo(input)?;
        self.ensure_project_exists(input.project_id).await?;

        let model = TodoRepository::insert(
            &self.store.conn,
            input.text,
            input.completed,
            input.project_id,
            encode_user_ids(&input.user_ids),
        )
        .await?;

        info!("✅ Created todo {} in project {}", model.id, model.project_id);
        Ok(model.into())
    }

    /// `todos.update`: apply the provided fields to an existing todo.
    pub async fn update_todo(&self, id: i32, data: UpdateTodo) -> GatewayResult<Todo> {
        validate::record_id(id)?;
        let data = validate::update_todo(data)?;

        let Some(existing) = TodoRepository::get_by_id(&self.store.conn, id).await? else {
            warn!("⚠️  Update of missing todo {id}");
            return Err(todo_not_found(id));
        };

        // NOT_FOUND on update is reserved for the todo itself
        if let Some(project_id) = data.project_id {
            if ProjectRepository::get_by_id(&self.store.conn, project_id).await?.is_none() {
                return Err(GatewayError::validation(format!(
                    "project_id {project_id} does not reference an existing project"
                )));
            }
        }

        let mut active = existing.into_active_model();
        if let Some(text) = data.text {
            active.text = ActiveValue::Set(text);
        }
        if let Some(completed) = data.completed {
            active.completed = ActiveValue::Set(completed);
        }
        if let Some(project_id) = data.project_id {
            active.project_id = ActiveValue::Set(project_id);
        }
        if let Some(user_ids) = data.user_ids {
            active.user_ids = ActiveValue::Set(encode_user_ids(&user_ids));
        }

        match TodoRepository::update(&self.store.conn, active).await {
            Ok(model) => {
                info!("✅ Updated todo {id}");
                Ok(model.into())
            }
            Err(err) if is_record_not_updated(&err) => Err(todo_not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// `todos.delete`: remove a todo, returning its prior value.
    pub async fn delete_todo(&self, id: i32) -> GatewayResult<Todo> {
        validate::record_id(id)?;

        let Some(existing) = TodoRepository::get_by_id(&self.store.conn, id).await? else {
            warn!("⚠️  Delete of missing todo {id}");
            return Err(todo_not_found(id));
        };

        if TodoRepository::delete(&self.store.conn, id).await? == 0 {
            return Err(todo_not_found(id));
        }

        info!("🗑️  Deleted todo {id}");
        Ok(existing.into())
    }

    async fn ensure_project_exists(&self, project_id: i32) -> GatewayResult<()> {
        match ProjectRepository::get_by_id(&self.store.conn, project_id).await? {
            Some(_) => Ok(()),
            None => Err(GatewayError::not_found(format!("Project {project_id} not found"))),
        }
    }
}
