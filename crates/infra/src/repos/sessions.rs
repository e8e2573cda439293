use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::SessionRow;

#[derive(Debug, Clone)]
pub struct CreateSession {
    pub code: String,
    pub owner_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub team_filter: serde_json::Value,
    pub t_format: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub join_token: Uuid,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateSession,
) -> SqlxResult<SessionRow> {
    sqlx::query_as::<_, SessionRow>(
        r#"
        INSERT INTO sessions (code, owner_id, kind, title, description, icon_url,
                              team_filter, t_format, min_players, max_players, join_token)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        RETURNING id, code, owner_id, kind, title, description, icon_url, team_filter,
                  t_format, min_players, max_players, join_token, started_at,
                  created_at, updated_at
        "#,
    )
    .bind(data.code)
    .bind(data.owner_id)
    .bind(data.kind)
    .bind(data.title)
    .bind(data.description)
    .bind(data.icon_url)
    .bind(data.team_filter)
    .bind(data.t_format)
    .bind(data.min_players)
    .bind(data.max_players)
    .bind(data.join_token)
    .fetch_one(executor)
    .await
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<SessionRow>> {
    sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, code, owner_id, kind, title, description, icon_url, team_filter,
               t_format, min_players, max_players, join_token, started_at,
               created_at, updated_at
        FROM sessions
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn get_by_code<'e>(
    executor: impl PgExecutor<'e>,
    code: &str,
) -> SqlxResult<Option<SessionRow>> {
    sqlx::query_as::<_, SessionRow>(
        r#"
        SELECT id, code, owner_id, kind, title, description, icon_url, team_filter,
               t_format, min_players, max_players, join_token, started_at,
               created_at, updated_at
        FROM sessions
        WHERE code = $1
        "#,
    )
    .bind(code)
    .fetch_optional(executor)
    .await
}

/// Take a row lock on the session for the rest of the transaction.
///
/// Writers that replace a session's fixture set call this first so two
/// concurrent restarts of the same session are applied one after the other.
pub async fn lock_for_update<'e>(executor: impl PgExecutor<'e>, id: Uuid) -> SqlxResult<bool> {
    let locked: Option<Uuid> =
        sqlx::query_scalar("SELECT id FROM sessions WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(executor)
            .await?;

    Ok(locked.is_some())
}

pub async fn mark_started<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    started_at: DateTime<Utc>,
) -> SqlxResult<()> {
    sqlx::query(
        r#"
        UPDATE sessions
        SET started_at = $2,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(started_at)
    .execute(executor)
    .await?;

    Ok(())
}
