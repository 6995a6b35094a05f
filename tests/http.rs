use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use todosync::client::{GatewayClient, HttpClient};
use todosync::gateway::http::{router, PROJECTS_CREATE, PROJECTS_GET_ALL, PROJECTS_UPDATE, TODOS_CREATE};
use todosync::gateway::{ErrorBody, Gateway, GatewayError};
use todosync::models::{CreateProject, CreateTodo, Project, UpdateProject};
use todosync::storage::Store;

async fn app() -> axum::Router {
    router(Gateway::new(Store::in_memory().await.unwrap()))
}

fn post_json(path: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .await
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: serde_json::Value = read_json(response).await;
    assert_eq!(body, serde_json::json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_create_then_list_projects() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(PROJECTS_CREATE, serde_json::json!({ "name": "Home" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Project = read_json(response).await;
    assert_eq!(created.name, "Home");

    let response = app
        .oneshot(Request::builder().uri(PROJECTS_GET_ALL).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let all: Vec<Project> = read_json(response).await;
    assert_eq!(all, vec![created]);
}

#[tokio::test]
async fn test_errors_map_to_status_and_code() {
    let app = app().await;

    let response = app
        .clone()
        .oneshot(post_json(PROJECTS_CREATE, serde_json::json!({ "name": "" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.code, "BAD_REQUEST");

    let response = app
        .clone()
        .oneshot(post_json(
            PROJECTS_UPDATE,
            serde_json::json!({ "id": 41, "data": { "name": "Nope" } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = read_json(response).await;
    assert_eq!(body.code, "NOT_FOUND");

    let response = app
        .clone()
        .oneshot(post_json(TODOS_CREATE, serde_json::json!({ "text": "Buy milk", "project_id": 3 })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // malformed JSON is a validation failure
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(PROJECTS_CREATE)
                .header("content-type", "application/json")
                .body(Body::from("{ not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_null_clears_and_absent_keeps() {
    let app = app().await;
    let response = app
        .clone()
        .oneshot(post_json(
            PROJECTS_CREATE,
            serde_json::json!({ "name": "Home", "description": "chores" }),
        ))
        .await
        .unwrap();
    let created: Project = read_json(response).await;

    let response = app
        .clone()
        .oneshot(post_json(
            PROJECTS_UPDATE,
            serde_json::json!({ "id": created.id, "data": { "name": "House" } }),
        ))
        .await
        .unwrap();
    let renamed: Project = read_json(response).await;
    assert_eq!(renamed.description.as_deref(), Some("chores"));

    let response = app
        .oneshot(post_json(
            PROJECTS_UPDATE,
            serde_json::json!({ "id": created.id, "data": { "description": null } }),
        ))
        .await
        .unwrap();
    let cleared: Project = read_json(response).await;
    assert_eq!(cleared.name, "House");
    assert_eq!(cleared.description, None);
}

#[tokio::test]
async fn test_http_client_round_trip_against_live_server() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = app().await;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = HttpClient::new(format!("http://{address}/")).unwrap();
    assert_eq!(client.kind(), "http");

    let home = client
        .create_project(CreateProject {
            name: "Home".to_string(),
            ..Default::default()
        })
        .await
        .unwrap();
    let milk = client
        .create_todo(CreateTodo {
            text: "Buy milk".to_string(),
            project_id: home.id,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(client.get_todos().await.unwrap(), vec![milk]);

    let renamed = client
        .update_project(
            home.id,
            UpdateProject {
                name: Some("House".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "House");

    // server-side failures come back as the same error kinds
    let err = client.delete_todo(999).await.unwrap_err();
    assert!(err.is_not_found());
    let err = client
        .create_project(CreateProject::default())
        .await
        .unwrap_err();
    assert!(matches!(err, GatewayError::Validation(_)));

    client.delete_project(home.id).await.unwrap();
    assert!(client.get_todos().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_http_client_unreachable_server_is_transport_error() {
    // bind then drop to get a port nobody listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    drop(listener);

    let client = HttpClient::new(format!("http://{address}")).unwrap();
    let err = client.get_projects().await.unwrap_err();
    assert!(matches!(err, GatewayError::Transport(_)));
}
