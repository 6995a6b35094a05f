//! Input shape checks run before any store access.

use crate::constants::{PROJECT_NAME_MAX_LEN, TODO_TEXT_MAX_LEN};
use crate::models::{CreateProject, CreateTodo, UpdateProject, UpdateTodo};

use super::{GatewayError, GatewayResult};

/// Trim and length-check a required text field.
fn required_text(field: &str, value: &str, max_len: usize) -> GatewayResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(GatewayError::validation(format!("{field} must not be blank")));
    }
    if trimmed.chars().count() > max_len {
        return Err(GatewayError::validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(trimmed.to_string())
}

fn user_ids(field: &str, ids: Option<&Vec<String>>) -> GatewayResult<()> {
    if let Some(ids) = ids {
        if ids.iter().any(|id| id.trim().is_empty()) {
            return Err(GatewayError::validation(format!("{field} must not contain blank ids")));
        }
    }
    Ok(())
}

fn id(field: &str, value: i32) -> GatewayResult<()> {
    if value <= 0 {
        return Err(GatewayError::validation(format!("{field} must be a positive integer")));
    }
    Ok(())
}

pub fn record_id(value: i32) -> GatewayResult<()> {
    id("id", value)
}

pub fn create_project(mut input: CreateProject) -> GatewayResult<CreateProject> {
    input.name = required_text("name", &input.name, PROJECT_NAME_MAX_LEN)?;
    user_ids("shared_user_ids", input.shared_user_ids.as_ref())?;
    Ok(input)
}

pub fn update_project(mut data: UpdateProject) -> GatewayResult<UpdateProject> {
    if data.is_empty() {
        return Err(GatewayError::validation("at least one field must be provided"));
    }
    if let Some(name) = data.name.as_deref() {
        data.name = Some(required_text("name", name, PROJECT_NAME_MAX_LEN)?);
    }
    user_ids("shared_user_ids", data.shared_user_ids.as_ref().and_then(Option::as_ref))?;
    Ok(data)
}

pub fn create_todo(mut input: CreateTodo) -> GatewayResult<CreateTodo> {
    input.text = required_text("text", &input.text, TODO_TEXT_MAX_LEN)?;
    id("project_id", input.project_id)?;
    user_ids("user_ids", input.user_ids.as_ref())?;
    Ok(input)
}

pub fn update_todo(mut data: UpdateTodo) -> GatewayResult<UpdateTodo> {
    if data.is_empty() {
        return Err(GatewayError::validation("at least one field must be provided"));
    }
    if let Some(text) = data.text.as_deref() {
        data.text = Some(required_text("text", text, TODO_TEXT_MAX_LEN)?);
    }
    if let Some(project_id) = data.project_id {
        id("project_id", project_id)?;
    }
    user_ids("user_ids", data.user_ids.as_ref().and_then(Option::as_ref))?;
    Ok(data)
}
