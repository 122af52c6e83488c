use sqlx::PgPool;
use uuid::Uuid;

use super::dto::{SortField, SortOrder, UpdateTask};
use super::repo_types::Task;

impl Task {
    pub async fn list_by_user(
        db: &PgPool,
        user_id: Uuid,
        completed: Option<bool>,
        sort: SortField,
        order: SortOrder,
        limit: i64,
        offset: i64,
    ) -> anyhow::Result<Vec<Task>> {
        // sort column and direction come from a fixed whitelist, never from
        // raw client input
        let query = format!(
            r#"
            SELECT id, user_id, title, description, completed, created_at, updated_at
            FROM tasks
            WHERE user_id = $1 AND ($2::boolean IS NULL OR completed = $2)
            ORDER BY {} {}
            LIMIT $3 OFFSET $4
            "#,
            sort.column(),
            order.keyword(),
        );
        let rows = sqlx::query_as::<_, Task>(&query)
            .bind(user_id)
            .bind(completed)
            .bind(limit)
            .bind(offset)
            .fetch_all(db)
            .await?;
        Ok(rows)
    }

    pub async fn create(
        db: &PgPool,
        user_id: Uuid,
        title: &str,
        description: Option<&str>,
        completed: bool,
    ) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, description, completed)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, description, completed, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(title)
        .bind(description)
        .bind(completed)
        .fetch_one(db)
        .await?;
        Ok(task)
    }

    pub async fn get(db: &PgPool, user_id: Uuid, task_id: Uuid) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, description, completed, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    /// Partial update; absent fields keep their current value.
    pub async fn update(
        db: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
        changes: &UpdateTask,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                description = COALESCE($4, description),
                completed = COALESCE($5, completed),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(changes.title.as_deref())
        .bind(changes.description.as_deref())
        .bind(changes.completed)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }

    pub async fn delete(db: &PgPool, user_id: Uuid, task_id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .execute(db)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn set_completed(
        db: &PgPool,
        user_id: Uuid,
        task_id: Uuid,
        completed: bool,
    ) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET completed = $3, updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, description, completed, created_at, updated_at
            "#,
        )
        .bind(task_id)
        .bind(user_id)
        .bind(completed)
        .fetch_optional(db)
        .await?;
        Ok(task)
    }
}
