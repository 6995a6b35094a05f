//! Client side of the Remote Procedure Gateway.
//!
//! [`GatewayClient`] is the typed handle the sync collections talk to. Two
//! implementations exist: [`LocalClient`] calls the procedures of an
//! in-process [`crate::gateway::Gateway`], [`HttpClient`] speaks the JSON
//! wire format of [`crate::gateway::http`].

use async_trait::async_trait;

use crate::gateway::GatewayResult;
use crate::models::{CreateProject, CreateTodo, Project, Todo, UpdateProject, UpdateTodo};

pub mod http;
pub mod local;

pub use http::HttpClient;
pub use local::LocalClient;

/// Typed access to the Gateway procedures.
#[async_trait]
pub trait GatewayClient: Send + Sync {
    /// Short name used in log lines (e.g. "local", "http").
    fn kind(&self) -> &str;

    // projects
    async fn get_projects(&self) -> GatewayResult<Vec<Project>>;
    async fn create_project(&self, input: CreateProject) -> GatewayResult<Project>;
    async fn update_project(&self, id: i32, data: UpdateProject) -> GatewayResult<Project>;
    async fn delete_project(&self, id: i32) -> GatewayResult<Project>;

    // todos
    async fn get_todos(&self) -> GatewayResult<Vec<Todo>>;
    async fn create_todo(&self, input: CreateTodo) -> GatewayResult<Todo>;
    async fn update_todo(&self, id: i32, data: UpdateTodo) -> GatewayResult<Todo>;
    async fn delete_todo(&self, id: i32) -> GatewayResult<Todo>;
}
