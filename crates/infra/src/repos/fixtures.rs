use sqlx::{PgExecutor, Result as SqlxResult};
use uuid::Uuid;

use crate::models::FixtureRow;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "fixture_status", rename_all = "snake_case")]
pub enum FixtureStatus {
    Assigned,
    InProgress,
    Finished,
}

#[derive(Debug, Clone)]
pub struct CreateFixture {
    pub session_id: Uuid,
    pub round_name: String,
    pub leg: i32,
    pub position: i32,
    pub home_player_id: Uuid,
    pub away_player_id: Uuid,
    pub home_team_id: i32,
    pub away_team_id: i32,
}

#[derive(Debug, Clone)]
pub struct UpdateFixtureScore {
    pub status: FixtureStatus,
    pub home_goals: i32,
    pub away_goals: i32,
    pub went_penalties: bool,
    pub home_pen: i32,
    pub away_pen: i32,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

pub async fn create<'e>(
    executor: impl PgExecutor<'e>,
    data: CreateFixture,
) -> SqlxResult<FixtureRow> {
    sqlx::query_as::<_, FixtureRow>(
        r#"
        INSERT INTO fixtures (session_id, round_name, leg, position, status,
                              home_player_id, away_player_id, home_team_id, away_team_id)
        VALUES ($1, $2, $3, $4, 'assigned', $5, $6, $7, $8)
        RETURNING id, session_id, round_name, leg, position, status,
                  home_player_id, away_player_id, home_team_id, away_team_id,
                  home_goals, away_goals, went_penalties, home_pen, away_pen,
                  created_at, updated_at
        "#,
    )
    .bind(data.session_id)
    .bind(data.round_name)
    .bind(data.leg)
    .bind(data.position)
    .bind(data.home_player_id)
    .bind(data.away_player_id)
    .bind(data.home_team_id)
    .bind(data.away_team_id)
    .fetch_one(executor)
    .await
}

/// Insert a whole fixture set in one statement.
pub async fn create_many<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
    fixtures: &[CreateFixture],
) -> SqlxResult<u64> {
    if fixtures.is_empty() {
        return Ok(0);
    }

    let round_names: Vec<String> = fixtures.iter().map(|f| f.round_name.clone()).collect();
    let legs: Vec<i32> = fixtures.iter().map(|f| f.leg).collect();
    let positions: Vec<i32> = fixtures.iter().map(|f| f.position).collect();
    let home_players: Vec<Uuid> = fixtures.iter().map(|f| f.home_player_id).collect();
    let away_players: Vec<Uuid> = fixtures.iter().map(|f| f.away_player_id).collect();
    let home_teams: Vec<i32> = fixtures.iter().map(|f| f.home_team_id).collect();
    let away_teams: Vec<i32> = fixtures.iter().map(|f| f.away_team_id).collect();

    let result = sqlx::query(
        r#"
        INSERT INTO fixtures (session_id, round_name, leg, position, status,
                              home_player_id, away_player_id, home_team_id, away_team_id)
        SELECT $1, t.round_name, t.leg, t.position, 'assigned'::fixture_status,
               t.home_player_id, t.away_player_id, t.home_team_id, t.away_team_id
        FROM UNNEST($2::text[], $3::int4[], $4::int4[], $5::uuid[], $6::uuid[], $7::int4[], $8::int4[])
            AS t(round_name, leg, position, home_player_id, away_player_id, home_team_id, away_team_id)
        "#,
    )
    .bind(session_id)
    .bind(round_names)
    .bind(legs)
    .bind(positions)
    .bind(home_players)
    .bind(away_players)
    .bind(home_teams)
    .bind(away_teams)
    .execute(executor)
    .await?;

    Ok(result.rows_affected())
}

pub async fn delete_by_session<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
) -> SqlxResult<u64> {
    let result = sqlx::query("DELETE FROM fixtures WHERE session_id = $1")
        .bind(session_id)
        .execute(executor)
        .await?;

    Ok(result.rows_affected())
}

pub async fn get_by_id<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
) -> SqlxResult<Option<FixtureRow>> {
    sqlx::query_as::<_, FixtureRow>(
        r#"
        SELECT id, session_id, round_name, leg, position, status,
               home_player_id, away_player_id, home_team_id, away_team_id,
               home_goals, away_goals, went_penalties, home_pen, away_pen,
               created_at, updated_at
        FROM fixtures
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(executor)
    .await
}

pub async fn find_by_round<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
    round_name: &str,
    leg: i32,
) -> SqlxResult<Option<FixtureRow>> {
    sqlx::query_as::<_, FixtureRow>(
        r#"
        SELECT id, session_id, round_name, leg, position, status,
               home_player_id, away_player_id, home_team_id, away_team_id,
               home_goals, away_goals, went_penalties, home_pen, away_pen,
               created_at, updated_at
        FROM fixtures
        WHERE session_id = $1 AND round_name = $2 AND leg = $3
        ORDER BY position ASC
        LIMIT 1
        "#,
    )
    .bind(session_id)
    .bind(round_name)
    .bind(leg)
    .fetch_optional(executor)
    .await
}

pub async fn list_by_session<'e>(
    executor: impl PgExecutor<'e>,
    session_id: Uuid,
) -> SqlxResult<Vec<FixtureRow>> {
    sqlx::query_as::<_, FixtureRow>(
        r#"
        SELECT id, session_id, round_name, leg, position, status,
               home_player_id, away_player_id, home_team_id, away_team_id,
               home_goals, away_goals, went_penalties, home_pen, away_pen,
               created_at, updated_at
        FROM fixtures
        WHERE session_id = $1
        ORDER BY position ASC
        "#,
    )
    .bind(session_id)
    .fetch_all(executor)
    .await
}

/// Re-point an existing fixture at new players/teams and reset it to an
/// unplayed `assigned` fixture.
pub async fn reassign<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: CreateFixture,
) -> SqlxResult<FixtureRow> {
    sqlx::query_as::<_, FixtureRow>(
        r#"
        UPDATE fixtures
        SET home_player_id = $2,
            away_player_id = $3,
            home_team_id = $4,
            away_team_id = $5,
            status = 'assigned',
            home_goals = 0,
            away_goals = 0,
            went_penalties = FALSE,
            home_pen = 0,
            away_pen = 0,
            updated_at = NOW()
        WHERE id = $1
        RETURNING id, session_id, round_name, leg, position, status,
                  home_player_id, away_player_id, home_team_id, away_team_id,
                  home_goals, away_goals, went_penalties, home_pen, away_pen,
                  created_at, updated_at
        "#,
    )
    .bind(id)
    .bind(data.home_player_id)
    .bind(data.away_player_id)
    .bind(data.home_team_id)
    .bind(data.away_team_id)
    .fetch_one(executor)
    .await
}

/// Returns false when the fixture does not exist.
pub async fn update_score<'e>(
    executor: impl PgExecutor<'e>,
    id: Uuid,
    data: UpdateFixtureScore,
) -> SqlxResult<bool> {
    let result = sqlx::query(
        r#"
        UPDATE fixtures
        SET status = $2,
            home_goals = $3,
            away_goals = $4,
            went_penalties = $5,
            home_pen = $6,
            away_pen = $7,
            updated_at = $8
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(data.status)
    .bind(data.home_goals)
    .bind(data.away_goals)
    .bind(data.went_penalties)
    .bind(data.home_pen)
    .bind(data.away_pen)
    .bind(data.updated_at)
    .execute(executor)
    .await?;

    Ok(result.rows_affected() > 0)
}
