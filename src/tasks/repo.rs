use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::error::ApiError;
use crate::tasks::dto::{CreateTaskRequest, TaskFilters, UpdateTaskRequest};
use crate::tasks::repo_types::Task;

fn not_found(id: Uuid) -> ApiError {
    ApiError::NotFound(format!("Task with ID {} not found", id))
}

/// Ownership-scoped list query. The owner predicate is unconditional;
/// filters are appended only when present and combine with AND. Ordering is
/// newest-first with the id as a stable tie-break.
pub(crate) fn build_list_query(
    user_id: Uuid,
    filters: &TaskFilters,
) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new(
        "SELECT id, user_id, title, description, status, priority, due_date, created_at, updated_at \
         FROM tasks WHERE user_id = ",
    );
    qb.push_bind(user_id);

    if let Some(status) = filters.status {
        qb.push(" AND status = ");
        qb.push_bind(status);
    }
    if let Some(priority) = filters.priority {
        qb.push(" AND priority = ");
        qb.push_bind(priority);
    }
    if let Some(search) = &filters.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (title ILIKE ");
        qb.push_bind(pattern.clone());
        qb.push(" OR description ILIKE ");
        qb.push_bind(pattern);
        qb.push(")");
    }

    qb.push(" ORDER BY created_at DESC, id");
    qb
}

pub async fn list(
    db: &PgPool,
    user_id: Uuid,
    filters: &TaskFilters,
) -> Result<Vec<Task>, ApiError> {
    let mut qb = build_list_query(user_id, filters);
    let tasks = qb.build_query_as::<Task>().fetch_all(db).await?;
    Ok(tasks)
}

pub async fn insert(
    db: &PgPool,
    user_id: Uuid,
    req: CreateTaskRequest,
) -> Result<Task, ApiError> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        INSERT INTO tasks (user_id, title, description, status, priority, due_date)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, user_id, title, description, status, priority, due_date, created_at, updated_at
        "#,
    )
    .bind(user_id)
    .bind(&req.title)
    .bind(&req.description)
    .bind(req.status.unwrap_or_default())
    .bind(req.priority.unwrap_or_default())
    .bind(req.due_date)
    .fetch_one(db)
    .await?;
    Ok(task)
}

/// A task that does not exist and a task owned by someone else are the
/// same NotFound to the caller.
pub async fn find_one(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<Task, ApiError> {
    let task = sqlx::query_as::<_, Task>(
        r#"
        SELECT id, user_id, title, description, status, priority, due_date, created_at, updated_at
        FROM tasks
        WHERE id = $1 AND user_id = $2
        "#,
    )
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await?;
    task.ok_or_else(|| not_found(id))
}

/// Re-fetches through [`find_one`] so ownership is re-checked on every
/// mutation, merges the patch, then persists the whole row.
pub async fn update(
    db: &PgPool,
    user_id: Uuid,
    id: Uuid,
    patch: &UpdateTaskRequest,
) -> Result<Task, ApiError> {
    let mut task = find_one(db, user_id, id).await?;
    task.apply(patch);

    let updated = sqlx::query_as::<_, Task>(
        r#"
        UPDATE tasks
        SET title = $1, description = $2, status = $3, priority = $4, due_date = $5,
            updated_at = now()
        WHERE id = $6 AND user_id = $7
        RETURNING id, user_id, title, description, status, priority, due_date, created_at, updated_at
        "#,
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.status)
    .bind(task.priority)
    .bind(task.due_date)
    .bind(id)
    .bind(user_id)
    .fetch_one(db)
    .await?;
    Ok(updated)
}

pub async fn delete(db: &PgPool, user_id: Uuid, id: Uuid) -> Result<(), ApiError> {
    find_one(db, user_id, id).await?;
    sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
        .bind(id)
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::repo_types::{TaskPriority, TaskStatus};

    #[test]
    fn list_query_always_scopes_to_owner_and_orders_newest_first() {
        let qb = build_list_query(Uuid::new_v4(), &TaskFilters::default());
        let sql = qb.sql();
        assert!(sql.contains("WHERE user_id = $1"));
        assert!(sql.ends_with("ORDER BY created_at DESC, id"));
        assert!(!sql.contains("AND status"));
        assert!(!sql.contains("AND priority"));
        assert!(!sql.contains("ILIKE"));
    }

    #[test]
    fn status_filter_adds_a_single_predicate() {
        let filters = TaskFilters {
            status: Some(TaskStatus::Done),
            ..Default::default()
        };
        let qb = build_list_query(Uuid::new_v4(), &filters);
        let sql = qb.sql();
        assert!(sql.contains("AND status = $2"));
        assert!(!sql.contains("priority = "));
    }

    #[test]
    fn search_matches_title_or_description_case_insensitively() {
        let filters = TaskFilters {
            search: Some("milk".into()),
            ..Default::default()
        };
        let qb = build_list_query(Uuid::new_v4(), &filters);
        let sql = qb.sql();
        assert!(sql.contains("(title ILIKE $2 OR description ILIKE $3)"));
    }

    #[test]
    fn all_filters_combine_with_and() {
        let filters = TaskFilters {
            status: Some(TaskStatus::InProgress),
            priority: Some(TaskPriority::High),
            search: Some("report".into()),
        };
        let qb = build_list_query(Uuid::new_v4(), &filters);
        let sql = qb.sql();
        assert!(sql.contains("AND status = $2"));
        assert!(sql.contains("AND priority = $3"));
        assert!(sql.contains("(title ILIKE $4 OR description ILIKE $5)"));
        assert!(sql.ends_with("ORDER BY created_at DESC, id"));
    }

    #[test]
    fn not_found_message_carries_the_id() {
        let id = Uuid::new_v4();
        let err = not_found(id);
        assert!(err.to_string().contains(&id.to_string()));
    }
}
