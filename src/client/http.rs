//! HTTP Gateway client.

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::{de::DeserializeOwned, Serialize};

use crate::gateway::http::{
    PROJECTS_CREATE, PROJECTS_DELETE, PROJECTS_GET_ALL, PROJECTS_UPDATE, TODOS_CREATE, TODOS_DELETE, TODOS_GET_ALL,
    TODOS_UPDATE,
};
use crate::gateway::{ErrorBody, GatewayError, GatewayResult};
use crate::models::{
    CreateProject, CreateTodo, DeleteRequest, Project, Todo, UpdateProject, UpdateRequest, UpdateTodo,
};

use super::GatewayClient;

/// Talks to a Gateway served by [`crate::gateway::http::serve`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpClient {
    /// Create a client for the server at `base_url` (e.g. `http://127.0.0.1:3000`).
    pub fn new(base_url: impl Into<String>) -> GatewayResult<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| GatewayError::transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn query<T: DeserializeOwned>(&self, path: &str) -> GatewayResult<T> {
        debug!("GET {path}");
        let response = self
            .http
            .get(self.url(path))
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;
        Self::decode(response).await
    }

    async fn mutate<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> GatewayResult<T> {
        debug!("POST {path}");
        let response = self
            .http
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .map_err(|e| GatewayError::transport(e.to_string()))?;
        Self::decode(response).await
    }

    /// Success bodies decode into `T`; failure bodies decode into the error taxonomy.
    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> GatewayResult<T> {
        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|e| GatewayError::transport(format!("Invalid response body: {e}")));
        }

        match response.json::<ErrorBody>().await {
            Ok(body) => Err(GatewayError::from_body(body)),
            Err(_) => Err(GatewayError::transport(format!("Unexpected HTTP status {status}"))),
        }
    }
}

#[async_trait]
impl GatewayClient for HttpClient {
    fn kind(&self) -> &str {
        "http"
    }

    async fn get_projects(&self) -> GatewayResult<Vec<Project>> {
        self.query(PROJECTS_GET_ALL).await
    }

    async fn create_project(&self, input: CreateProject) -> GatewayResult<Project> {
        self.mutate(PROJECTS_CREATE, &input).await
    }

    async fn update_project(&self, id: i32, data: UpdateProject) -> GatewayResult<Project> {
        self.mutate(PROJECTS_UPDATE, &UpdateRequest { id, data }).await
    }

    async fn delete_project(&self, id: i32) -> GatewayResult<Project> {
        self.mutate(PROJECTS_DELETE, &DeleteRequest { id }).await
    }

    async fn get_todos(&self) -> GatewayResult<Vec<Todo>> {
        self.query(TODOS_GET_ALL).await
    }

    async fn create_todo(&self, input: CreateTodo) -> GatewayResult<Todo> {
        self.mutate(TODOS_CREATE, &input).await
    }

    async fn update_todo(&self, id: i32, data: UpdateTodo) -> GatewayResult<Todo> {
        self.mutate(TODOS_UPDATE, &UpdateRequest { id, data }).await
    }

    async fn delete_todo(&self, id: i32) -> GatewayResult<Todo> {
        self.mutate(TODOS_DELETE, &DeleteRequest { id }).await
    }
}
