//! JSON-over-HTTP surface of the Gateway.
//!
//! Procedure paths use tRPC-style `entity.operation` names: queries are
//! `GET`, mutations are `POST` with a JSON body.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use log::{info, warn};
use serde_json::{json, Value};

use crate::models::{
    CreateProject, CreateTodo, DeleteRequest, Project, Todo, UpdateProject, UpdateRequest, UpdateTodo,
};

use super::{Gateway, GatewayError, GatewayResult};

pub const PROJECTS_GET_ALL: &str = "/api/projects.getAll";
pub const PROJECTS_CREATE: &str = "/api/projects.create";
pub const PROJECTS_UPDATE: &str = "/api/projects.update";
pub const PROJECTS_DELETE: &str = "/api/projects.delete";
pub const TODOS_GET_ALL: &str = "/api/todos.getAll";
pub const TODOS_CREATE: &str = "/api/todos.create";
pub const TODOS_UPDATE: &str = "/api/todos.update";
pub const TODOS_DELETE: &str = "/api/todos.delete";

/// Build the router exposing every procedure.
pub fn router(gateway: Gateway) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(PROJECTS_GET_ALL, get(get_projects))
        .route(PROJECTS_CREATE, post(create_project))
        .route(PROJECTS_UPDATE, post(update_project))
        .route(PROJECTS_DELETE, post(delete_project))
        .route(TODOS_GET_ALL, get(get_todos))
        .route(TODOS_CREATE, post(create_todo))
        .route(TODOS_UPDATE, post(update_todo))
        .route(TODOS_DELETE, post(delete_todo))
        .with_state(gateway)
}

/// Bind `bind_address` and serve until Ctrl-C.
pub async fn serve(gateway: Gateway, bind_address: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind_address)
        .await
        .with_context(|| format!("Failed to bind {bind_address}"))?;
    info!("🚀 Gateway listening on http://{}", listener.local_addr()?);

    axum::serve(listener, router(gateway))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Gateway server failed")?;

    info!("👋 Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("⚠️  Failed to listen for Ctrl-C: {e}");
        std::future::pending::<()>().await;
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Store(_) | Self::Transport(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(self.to_body())).into_response()
    }
}

/// Malformed JSON is a validation failure like any other bad input.
fn body<T>(payload: Result<Json<T>, JsonRejection>) -> GatewayResult<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| GatewayError::validation(rejection.body_text()))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn get_projects(State(gateway): State<Gateway>) -> GatewayResult<Json<Vec<Project>>> {
    Ok(Json(gateway.get_projects().await?))
}

async fn create_project(
    State(gateway): State<Gateway>,
    payload: Result<Json<CreateProject>, JsonRejection>,
) -> GatewayResult<Json<Project>> {
    Ok(Json(gateway.create_project(body(payload)?).await?))
}

async fn update_project(
    State(gateway): State<Gateway>,
    payload: Result<Json<UpdateRequest<UpdateProject>>, JsonRejection>,
) -> GatewayResult<Json<Project>> {
    let request = body(payload)?;
    Ok(Json(gateway.update_project(request.id, request.data).await?))
}

async fn delete_project(
    State(gateway): State<Gateway>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> GatewayResult<Json<Project>> {
    Ok(Json(gateway.delete_project(body(payload)?.id).await?))
}

async fn get_todos(State(gateway): State<Gateway>) -> GatewayResult<Json<Vec<Todo>>> {
    Ok(Json(gateway.get_todos().await?))
}

async fn create_todo(
    State(gateway): State<Gateway>,
    payload: Result<Json<CreateTodo>, JsonRejection>,
) -> GatewayResult<Json<Todo>> {
    Ok(Json(gateway.create_todo(body(payload)?).await?))
}

async fn update_todo(
    State(gateway): State<Gateway>,
    payload: Result<Json<UpdateRequest<UpdateTodo>>, JsonRejection>,
) -> GatewayResult<Json<Todo>> {
    let request = body(payload)?;
    Ok(Json(gateway.update_todo(request.id, request.data).await?))
}

async fn delete_todo(
    State(gateway): State<Gateway>,
    payload: Result<Json<DeleteRequest>, JsonRejection>,
) -> GatewayResult<Json<Todo>> {
    Ok(Json(gateway.delete_todo(body(payload)?.id).await?))
}
