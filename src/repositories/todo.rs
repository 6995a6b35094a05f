//! Todo repository for database operations.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue, ColumnTrait, ConnectionTrait, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
};

use crate::entities::todo;

/// Repository for todo-related database operations.
pub struct TodoRepository;

impl TodoRepository {
    /// Get all todos in creation order.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .order_by_asc(todo::Column::CreatedAt)
            .order_by_asc(todo::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get a single todo by id.
    pub async fn get_by_id<C>(conn: &C, id: i32) -> Result<Option<todo::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find_by_id(id).one(conn).await?)
    }

    /// Count the todos of a project.
    pub async fn count_for_project<C>(conn: &C, project_id: i32) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        Ok(todo::Entity::find()
            .filter(todo::Column::ProjectId.eq(project_id))
            .count(conn)
            .await?)
    }

    /// Insert a todo. The id is assigned by the database and `created_at` is stamped here.
    pub async fn insert<C>(
        conn: &C,
        text: String,
        completed: bool,
        project_id: i32,
        user_ids: Option<String>,
    ) -> Result<todo::Model>
    where
        C: ConnectionTrait,
    {
        let model = todo::ActiveModel {
            id: ActiveValue::NotSet,
            text: ActiveValue::Set(text),
            completed: ActiveValue::Set(completed),
            created_at: ActiveValue::Set(Utc::now()),
            project_id: ActiveValue::Set(project_id),
            user_ids: ActiveValue::Set(user_ids),
        };
        Ok(model.insert(conn).await?)
    }

    /// Update a todo in the database.
    pub async fn update<C>(conn: &C, todo: todo::ActiveModel) -> Result<todo::Model>
    where
        C: ConnectionTrait,
    {
        Ok(todo.update(conn).await?)
    }

    /// Delete a todo by id, returning the number of rows removed.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = todo::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }
}
