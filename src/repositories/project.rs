//! Project repository for database operations.

use anyhow::Result;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectionTrait, EntityTrait, QueryOrder};

use crate::entities::project;

/// Repository for project-related database operations.
pub struct ProjectRepository;

impl ProjectRepository {
    /// Get all projects in creation order.
    pub async fn get_all<C>(conn: &C) -> Result<Vec<project::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(project::Entity::find()
            .order_by_asc(project::Column::CreatedAt)
            .order_by_asc(project::Column::Id)
            .all(conn)
            .await?)
    }

    /// Get a single project by id.
    pub async fn get_by_id<C>(conn: &C, id: i32) -> Result<Option<project::Model>>
    where
        C: ConnectionTrait,
    {
        Ok(project::Entity::find_by_id(id).one(conn).await?)
    }

    /// Insert a project. The id is assigned by the database and `created_at` is stamped here.
    pub async fn insert<C>(
        conn: &C,
        name: String,
        description: Option<String>,
        shared_user_ids: Option<String>,
    ) -> Result<project::Model>
    where
        C: ConnectionTrait,
    {
        let model = project::ActiveModel {
            id: ActiveValue::NotSet,
            name: ActiveValue::Set(name),
            description: ActiveValue::Set(description),
            shared_user_ids: ActiveValue::Set(shared_user_ids),
            created_at: ActiveValue::Set(Utc::now()),
        };
        Ok(model.insert(conn).await?)
    }

    /// Update a project in the database.
    pub async fn update<C>(conn: &C, project: project::ActiveModel) -> Result<project::Model>
    where
        C: ConnectionTrait,
    {
        Ok(project.update(conn).await?)
    }

    /// Delete a project by id, returning the number of rows removed.
    ///
    /// Todos of the project go with it through the cascading foreign key.
    pub async fn delete<C>(conn: &C, id: i32) -> Result<u64>
    where
        C: ConnectionTrait,
    {
        let result = project::Entity::delete_by_id(id).exec(conn).await?;
        Ok(result.rows_affected)
    }
}
