use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::error::ApiError;
use crate::tasks::repo_types::{TaskPriority, TaskStatus};

const TITLE_MAX_LEN: usize = 255;

fn validate_title(title: &str, errors: &mut Vec<String>) {
    if title.trim().is_empty() {
        errors.push("title must not be empty".to_string());
    }
    if title.len() > TITLE_MAX_LEN {
        errors.push(format!("title must be at most {} characters", TITLE_MAX_LEN));
    }
}

/// Request body for task creation. Status and priority fall back to their
/// column defaults when omitted.
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

impl CreateTaskRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        validate_title(&self.title, &mut errors);
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// Partial update; absent fields leave the stored record untouched.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub due_date: Option<OffsetDateTime>,
}

impl UpdateTaskRequest {
    pub fn validate(&self) -> Result<(), ApiError> {
        let mut errors = Vec::new();
        if let Some(title) = &self.title {
            validate_title(title, &mut errors);
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(ApiError::Validation(errors))
        }
    }
}

/// Query-string filters for the task list. Absent filter = no constraint.
#[derive(Debug, Default, Deserialize)]
pub struct TaskFilters {
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DeleteTaskResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_defaults_status_and_priority_to_absent() {
        let req: CreateTaskRequest = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        assert_eq!(req.title, "Buy milk");
        assert!(req.status.is_none());
        assert!(req.priority.is_none());
        assert!(req.due_date.is_none());
        assert!(req.validate().is_ok());
    }

    #[test]
    fn create_accepts_explicit_enum_values_and_due_date() {
        let req: CreateTaskRequest = serde_json::from_str(
            r#"{"title":"Ship release","status":"in-progress","priority":"high","due_date":"2024-12-31T23:59:59Z"}"#,
        )
        .unwrap();
        assert_eq!(req.status, Some(TaskStatus::InProgress));
        assert_eq!(req.priority, Some(TaskPriority::High));
        assert!(req.due_date.is_some());
    }

    #[test]
    fn create_rejects_blank_and_oversized_titles() {
        let blank = CreateTaskRequest {
            title: "   ".into(),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        assert!(matches!(
            blank.validate(),
            Err(ApiError::Validation(_))
        ));

        let oversized = CreateTaskRequest {
            title: "x".repeat(256),
            description: None,
            status: None,
            priority: None,
            due_date: None,
        };
        assert!(oversized.validate().is_err());
    }

    #[test]
    fn update_allows_fully_empty_patch() {
        let req: UpdateTaskRequest = serde_json::from_str("{}").unwrap();
        assert!(req.validate().is_ok());
        assert!(req.title.is_none());
    }

    #[test]
    fn update_rejects_blank_title_when_present() {
        let req = UpdateTaskRequest {
            title: Some("".into()),
            ..Default::default()
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn filters_deserialize_from_query_values() {
        let filters: TaskFilters =
            serde_json::from_str(r#"{"status":"done","search":"milk"}"#).unwrap();
        assert_eq!(filters.status, Some(TaskStatus::Done));
        assert!(filters.priority.is_none());
        assert_eq!(filters.search.as_deref(), Some("milk"));
    }
}
