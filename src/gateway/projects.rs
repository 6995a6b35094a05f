use log::{info, warn};
use sea_orm::{ActiveValue, IntoActiveModel};

use crate::models::{encode_user_ids, CreateProject, Project, UpdateProject};
use crate::repositories::{ProjectRepository, TodoRepository};

use super::{is_record_not_updated, validate, Gateway, GatewayError, GatewayResult};

fn project_not_found(id: i32) -> GatewayError {
    GatewayError::not_found(format!("Project {id} not found"))
}

impl Gateway {
    /// `projects.getAll`: every project in creation order.
    pub async fn get_projects(&self) -> GatewayResult<Vec<Project>> {
        let rows = ProjectRepository::get_all(&self.store.conn).await?;
        Ok(rows.into_iter().map(Project::from).collect())
    }

    /// `projects.create`: insert a project and return the stored row.
    pub async fn create_project(&self, input: CreateProject) -> GatewayResult<Project> {
        let input = validate::create_project(input)?;

        let model = ProjectRepository::insert(
            &self.store.conn,
            input.name,
            input.description,
            encode_user_ids(&input.shared_user_ids),
        )
        .await?;

        info!("✅ Created project {} ({})", model.id, model.name);
        Ok(model.into())
    }

    /// `projects.update`: apply the provided fields to an existing project.
    pub async fn update_project(&self, id: i32, data: UpdateProject) -> GatewayResult<Project> {
        validate::record_id(id)?;
        let data = validate::update_project(data)?;

        let Some(existing) = ProjectRepository::get_by_id(&self.store.conn, id).await? else {
            warn!("⚠️  Update of missing project {id}");
            return Err(project_not_found(id));
        };

        let mut active = existing.into_active_model();
        if let Some(name) = data.name {
            active.name = ActiveValue::Set(name);
        }
        if let Some(description) = data.description {
            active.description = ActiveValue::Set(description);
        }
        if let Some(shared_user_ids) = data.shared_user_ids {
            active.shared_user_ids = ActiveValue::Set(encode_user_ids(&shared_user_ids));
        }

        match ProjectRepository::update(&self.store.conn, active).await {
            Ok(model) => {
                info!("✅ Updated project {id}");
                Ok(model.into())
            }
            Err(err) if is_record_not_updated(&err) => Err(project_not_found(id)),
            Err(err) => Err(err.into()),
        }
    }

    /// `projects.delete`: remove a project (and, by cascade, its todos).
    ///
    /// Returns the row as it was before deletion.
    pub async fn delete_project(&self, id: i32) -> GatewayResult<Project> {
        validate::record_id(id)?;

        let Some(existing) = ProjectRepository::get_by_id(&self.store.conn, id).await? else {
            warn!("⚠️  Delete of missing project {id}");
            return Err(project_not_found(id));
        };

        let todos = TodoRepository::count_for_project(&self.store.conn, id).await?;
        if ProjectRepository::delete(&self.store.conn, id).await? == 0 {
            return Err(project_not_found(id));
        }

        info!("🗑️  Deleted project {id} ({}) and its {todos} todos", existing.name);
        Ok(existing.into())
    }
}
