use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::client::GatewayClient;
use crate::gateway::GatewayResult;
use crate::models::{CreateProject, Project, UpdateProject};
use crate::sync::{CollectionError, MutationHandle, Remote, SyncEntity, SyncService};

impl SyncEntity for Project {
    type Patch = UpdateProject;
    const KIND: &'static str = "project";

    fn id(&self) -> i32 {
        self.id
    }

    fn set_id(&mut self, id: i32) {
        self.id = id;
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn diff(before: &Self, after: &Self) -> Option<UpdateProject> {
        let patch = UpdateProject {
            name: (before.name != after.name).then(|| after.name.clone()),
            description: (before.description != after.description).then(|| after.description.clone()),
            shared_user_ids: (before.shared_user_ids != after.shared_user_ids).then(|| after.shared_user_ids.clone()),
        };
        (!patch.is_empty()).then_some(patch)
    }

    fn apply(&mut self, patch: &UpdateProject) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(shared_user_ids) = &patch.shared_user_ids {
            self.shared_user_ids = shared_user_ids.clone();
        }
    }
}

/// Project procedures of a [`GatewayClient`], as a collection remote.
pub struct ProjectSource {
    client: Arc<dyn GatewayClient>,
}

impl ProjectSource {
    pub fn new(client: Arc<dyn GatewayClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Remote<Project> for ProjectSource {
    async fn fetch_all(&self) -> GatewayResult<Vec<Project>> {
        self.client.get_projects().await
    }

    async fn create(&self, project: &Project) -> GatewayResult<Project> {
        let input = CreateProject {
            name: project.name.clone(),
            description: project.description.clone(),
            shared_user_ids: project.shared_user_ids.clone(),
        };
        self.client.create_project(input).await
    }

    async fn update(&self, id: i32, patch: &UpdateProject) -> GatewayResult<Project> {
        self.client.update_project(id, patch.clone()).await
    }

    async fn delete(&self, id: i32) -> GatewayResult<Project> {
        self.client.delete_project(id).await
    }
}

impl SyncService {
    /// Projects in display order, pending changes included.
    pub fn get_projects(&self) -> Vec<Project> {
        self.projects.list()
    }

    /// Project `id` as currently seen. Provisional ids of confirmed projects still resolve.
    pub fn get_project(&self, id: i32) -> Option<Project> {
        self.projects.get(id)
    }

    /// Adds a project optimistically. It is listed immediately under a provisional id.
    ///
    /// # Errors
    /// Returns an error if the provisional id is already taken. Gateway failures
    /// arrive through the returned handle.
    pub fn create_project(&self, name: &str, description: Option<String>) -> Result<MutationHandle<Project>, CollectionError> {
        let project = Project {
            id: self.projects.provisional_id(),
            name: name.trim().to_string(),
            description,
            shared_user_ids: None,
            created_at: Utc::now(),
        };
        self.projects.insert(project)
    }

    pub fn rename_project(&self, id: i32, name: &str) -> Result<MutationHandle<Project>, CollectionError> {
        let name = name.trim().to_string();
        self.projects.update(id, move |project| project.name = name)
    }

    /// Sets or clears (`None`) the description of project `id`.
    pub fn set_project_description(
        &self,
        id: i32,
        description: Option<String>,
    ) -> Result<MutationHandle<Project>, CollectionError> {
        self.projects.update(id, move |project| project.description = description)
    }

    /// Deletes project `id`. Its todos are removed by the store and disappear
    /// from the todo view at the next todo refresh.
    pub fn delete_project(&self, id: i32) -> Result<MutationHandle<Project>, CollectionError> {
        self.projects.delete(id)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn home() -> Project {
        Project {
            id: 1,
            name: "Home".to_string(),
            description: Some("chores".to_string()),
            shared_user_ids: None,
            created_at: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn diff_carries_only_changed_fields() {
        let before = home();
        let mut after = before.clone();
        after.description = None;

        let patch = Project::diff(&before, &after).unwrap();
        assert_eq!(
            patch,
            UpdateProject {
                description: Some(None),
                ..Default::default()
            }
        );
        assert!(Project::diff(&before, &before.clone()).is_none());
    }

    #[test]
    fn apply_leaves_other_fields_alone() {
        let mut project = home();
        project.apply(&UpdateProject {
            name: Some("House".to_string()),
            ..Default::default()
        });
        assert_eq!(project.name, "House");
        assert_eq!(project.description.as_deref(), Some("chores"));
    }
}
