//! Wire-level data types shared by the Gateway, its clients and the sync collections.
//!
//! These are the shapes that cross the remote procedure boundary. Store rows
//! ([`crate::entities`]) keep user id lists as serialized text; here they are
//! real lists.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::entities::{project, todo};

/// A project row as seen by clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: i32,
    pub name: String,
    pub description: Option<String>,
    pub shared_user_ids: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// A todo row as seen by clients.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub id: i32,
    pub text: String,
    pub completed: bool,
    pub project_id: i32,
    pub user_ids: Option<Vec<String>>,
    pub created_at: DateTime<Utc>,
}

/// Input of `projects.create`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateProject {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub shared_user_ids: Option<Vec<String>>,
}

/// Input of `projects.update`. Absent fields stay unchanged; an explicit
/// `null` clears a nullable field.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateProject {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub shared_user_ids: Option<Option<Vec<String>>>,
}

/// Input of `todos.create`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CreateTodo {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
    pub project_id: i32,
    #[serde(default)]
    pub user_ids: Option<Vec<String>>,
}

/// Input of `todos.update`. Same absent/null convention as [`UpdateProject`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdateTodo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_id: Option<i32>,
    #[serde(default, deserialize_with = "double_option", skip_serializing_if = "Option::is_none")]
    pub user_ids: Option<Option<Vec<String>>>,
}

/// `{ id, data }` envelope of the update procedures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UpdateRequest<T> {
    pub id: i32,
    pub data: T,
}

/// `{ id }` envelope of the delete procedures.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteRequest {
    pub id: i32,
}

impl UpdateProject {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.description.is_none() && self.shared_user_ids.is_none()
    }
}

impl UpdateTodo {
    pub fn is_empty(&self) -> bool {
        self.text.is_none() && self.completed.is_none() && self.project_id.is_none() && self.user_ids.is_none()
    }
}

/// Present-but-null becomes `Some(None)`; serde's default would fold it into `None`.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Serialize a user id list for its text column.
pub(crate) fn encode_user_ids(ids: &Option<Vec<String>>) -> Option<String> {
    ids.as_ref()
        .map(|ids| serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string()))
}

/// Parse a user id column back into a list. Unparseable text reads as absent.
pub(crate) fn decode_user_ids(raw: Option<&str>) -> Option<Vec<String>> {
    raw.and_then(|raw| serde_json::from_str(raw).ok())
}

impl From<project::Model> for Project {
    fn from(model: project::Model) -> Self {
        Self {
            shared_user_ids: decode_user_ids(model.shared_user_ids.as_deref()),
            id: model.id,
            name: model.name,
            description: model.description,
            created_at: model.created_at,
        }
    }
}

impl From<todo::Model> for Todo {
    fn from(model: todo::Model) -> Self {
        Self {
            user_ids: decode_user_ids(model.user_ids.as_deref()),
            id: model.id,
            text: model.text,
            completed: model.completed,
            project_id: model.project_id,
            created_at: model.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_project_distinguishes_null_from_absent() {
        let absent: UpdateProject = serde_json::from_str(r#"{"name":"Work"}"#).unwrap();
        assert_eq!(absent.description, None);

        let cleared: UpdateProject = serde_json::from_str(r#"{"description":null}"#).unwrap();
        assert_eq!(cleared.description, Some(None));
        assert!(!cleared.is_empty());

        let json = serde_json::to_value(&cleared).unwrap();
        assert_eq!(json, serde_json::json!({ "description": null }));
    }

    #[test]
    fn user_ids_survive_the_text_column() {
        let ids = Some(vec!["u1".to_string(), "u2".to_string()]);
        let encoded = encode_user_ids(&ids);
        assert_eq!(encoded.as_deref(), Some(r#"["u1","u2"]"#));
        assert_eq!(decode_user_ids(encoded.as_deref()), ids);
        assert_eq!(decode_user_ids(Some("not json")), None);
        assert_eq!(decode_user_ids(None), None);
    }
}
