use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::SessionPlayerRow;

#[derive(Debug, Clone)]
pub struct CreateSessionPlayer {
    pub session_id: Uuid,
    pub display_name: String,
    pub user_id: Option<Uuid>,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateSessionPlayer,
) -> SqlxResult<SessionPlayerRow> {
    sqlx::query_as::<_, SessionPlayerRow>(
        r#"
        INSERT INTO session_players (session_id, display_name, user_id)
        VALUES ($1, $2, $3)
        RETURNING id, session_id, display_name, user_id, team_id, created_at
        "#,
    )
    .bind(data.session_id)
    .bind(data.display_name)
    .bind(data.user_id)
    .fetch_one(executor)
    .await
}

pub async fn list_by_session<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
) -> SqlxResult<Vec<SessionPlayerRow>> {
    sqlx::query_as::<_, SessionPlayerRow>(
        r#"
        SELECT id, session_id, display_name, user_id, team_id, created_at
        FROM session_players
        WHERE session_id = $1
        ORDER BY created_at ASC, display_name ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

pub async fn count_by_session<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
) -> SqlxResult<i64> {
    sqlx::query_scalar("SELECT COUNT(*) FROM session_players WHERE session_id = $1")
        .bind(session_id)
        .fetch_one(executor)
        .await
}

/// Returns false when no player with that id exists.
pub async fn set_team<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    team_id: i32,
) -> SqlxResult<bool> {
    let result = sqlx::query("UPDATE session_players SET team_id = $2 WHERE id = $1")
        .bind(id)
        .bind(team_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Returns false when the player is not seated in that session.
pub async fn set_team_in_session<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
    id: Uuid,
    team_id: i32,
) -> SqlxResult<bool> {
    let result =
        sqlx::query("UPDATE session_players SET team_id = $3 WHERE id = $2 AND session_id = $1")
            .bind(session_id)
            .bind(id)
            .bind(team_id)
            .execute(executor)
            .await?;

    Ok(result.rows_affected() > 0)
}
