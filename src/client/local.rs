//! In-process Gateway client.

use async_trait::async_trait;

use crate::gateway::{Gateway, GatewayResult};
use crate::models::{CreateProject, CreateTodo, Project, Todo, UpdateProject, UpdateTodo};

use super::GatewayClient;

/// Calls the procedures of a [`Gateway`] living in the same process.
#[derive(Clone, Debug)]
pub struct LocalClient {
    gateway: Gateway,
}

impl LocalClient {
    pub fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }
}

#[async_trait]
impl GatewayClient for LocalClient {
    fn kind(&self) -> &str {
        "local"
    }

    async fn get_projects(&self) -> GatewayResult<Vec<Project>> {
        self.gateway.get_projects().await
    }

    async fn create_project(&self, input: CreateProject) -> GatewayResult<Project> {
        self.gateway.create_project(input).await
    }

    async fn update_project(&self, id: i32, data: UpdateProject) -> GatewayResult<Project> {
        self.gateway.update_project(id, data).await
    }

    async fn delete_project(&self, id: i32) -> GatewayResult<Project> {
        self.gateway.delete_project(id).await
    }

    async fn get_todos(&self) -> GatewayResult<Vec<Todo>> {
        self.gateway.get_todos().await
    }

    async fn create_todo(&self, input: CreateTodo) -> GatewayResult<Todo> {
        self.gateway.create_todo(input).await
    }

    async fn update_todo(&self, id: i32, data: UpdateTodo) -> GatewayResult<Todo> {
        self.gateway.update_todo(id, data).await
    }

    async fn delete_todo(&self, id: i32) -> GatewayResult<Todo> {
        self.gateway.delete_todo(id).await
    }
}
