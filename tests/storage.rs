use todosync::repositories::{ProjectRepository, TodoRepository};
use todosync::storage::Store;

#[tokio::test]
async fn test_insert_assigns_ids_and_timestamps() {
    let store = Store::in_memory().await.unwrap();
    assert!(ProjectRepository::get_all(&store.conn).await.unwrap().is_empty());

    let home = ProjectRepository::insert(&store.conn, "Home".to_string(), None, None).await.unwrap();
    let work = ProjectRepository::insert(&store.conn, "Work".to_string(), Some("office".to_string()), None)
        .await
        .unwrap();

    assert!(home.id > 0);
    assert!(work.id > home.id);
    assert!(work.created_at >= home.created_at);

    let all = ProjectRepository::get_all(&store.conn).await.unwrap();
    let names: Vec<_> = all.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Home", "Work"]);
}

#[tokio::test]
async fn test_deleting_project_cascades_to_todos() {
    let store = Store::in_memory().await.unwrap();
    let project = ProjectRepository::insert(&store.conn, "Home".to_string(), None, None).await.unwrap();
    let other = ProjectRepository::insert(&store.conn, "Other".to_string(), None, None).await.unwrap();

    for text in ["Buy milk", "Walk dog"] {
        TodoRepository::insert(&store.conn, text.to_string(), false, project.id, None)
            .await
            .unwrap();
    }
    TodoRepository::insert(&store.conn, "Keep me".to_string(), false, other.id, None)
        .await
        .unwrap();
    assert_eq!(TodoRepository::count_for_project(&store.conn, project.id).await.unwrap(), 2);

    assert_eq!(ProjectRepository::delete(&store.conn, project.id).await.unwrap(), 1);

    assert_eq!(TodoRepository::count_for_project(&store.conn, project.id).await.unwrap(), 0);
    assert_eq!(TodoRepository::get_all(&store.conn).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_todo_requires_existing_project() {
    let store = Store::in_memory().await.unwrap();
    let result = TodoRepository::insert(&store.conn, "Orphan".to_string(), false, 42, None).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_delete_missing_row_affects_nothing() {
    let store = Store::in_memory().await.unwrap();
    assert_eq!(ProjectRepository::delete(&store.conn, 7).await.unwrap(), 0);
    assert_eq!(TodoRepository::delete(&store.conn, 7).await.unwrap(), 0);
}

#[tokio::test]
async fn test_file_database_persists_between_opens() {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("todos.db").display());

    {
        let store = Store::open(&url).await.unwrap();
        ProjectRepository::insert(&store.conn, "Saved".to_string(), None, None).await.unwrap();
    }

    let store = Store::open(&url).await.unwrap();
    let all = ProjectRepository::get_all(&store.conn).await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].name, "Saved");
}
