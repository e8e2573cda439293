use chrono::{DateTime, Utc};

use infra::db::Db;
use infra::models::{FixtureRow, SessionPlayerRow, SessionRow, TeamRow};
use infra::repos::{
    fixtures, session_players, sessions, teams, CreateFixture, CreateSession,
    CreateSessionPlayer, TeamQuery, UpdateFixtureScore,
};

use crate::domain::{
    Assignment, Fixture, FixtureId, FixtureStatus, NewFixture, NewParticipant, NewSession,
    Participant, ParticipantId, ScoreFields, Session, SessionId, TeamFilter, TeamId, TeamRef,
};

use super::{SessionStore, StoreError, StoreResult};

/// Postgres-backed store over the `infra` repositories.
#[derive(Clone)]
pub struct PgStore {
    db: Db,
}

impl PgStore {
    pub fn new(db: Db) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &Db {
        &self.db
    }
}

fn db_error(e: sqlx::Error) -> StoreError {
    // Log the real error server-side; callers only see an opaque failure
    tracing::error!("Database error: {e}");
    StoreError::Db(e)
}

fn session_from_row(row: SessionRow) -> StoreResult<Session> {
    Ok(Session {
        id: row.id,
        code: row.code,
        owner_id: row.owner_id,
        kind: row
            .kind
            .parse()
            .map_err(|_| StoreError::Corrupt(format!("session kind {}", row.kind)))?,
        title: row.title,
        description: row.description,
        icon_url: row.icon_url,
        team_filter: serde_json::from_value(row.team_filter)?,
        format: row.t_format,
        min_players: row.min_players,
        max_players: row.max_players,
        join_token: row.join_token,
        started_at: row.started_at,
        created_at: row.created_at,
    })
}

fn participant_from_row(row: SessionPlayerRow) -> Participant {
    Participant {
        id: row.id,
        display_name: row.display_name,
        user_id: row.user_id,
        team_id: row.team_id,
    }
}

fn team_from_row(row: TeamRow) -> TeamRef {
    TeamRef {
        id: row.id,
        name: row.name,
        short_name: row.short_name,
        icon_url: row.icon_url,
        country: row.country,
        stars: row.stars,
    }
}

fn status_from_row(status: fixtures::FixtureStatus) -> FixtureStatus {
    match status {
        fixtures::FixtureStatus::Assigned => FixtureStatus::Assigned,
        fixtures::FixtureStatus::InProgress => FixtureStatus::InProgress,
        fixtures::FixtureStatus::Finished => FixtureStatus::Finished,
    }
}

fn status_to_row(status: FixtureStatus) -> fixtures::FixtureStatus {
    match status {
        FixtureStatus::Assigned => fixtures::FixtureStatus::Assigned,
        FixtureStatus::InProgress => fixtures::FixtureStatus::InProgress,
        FixtureStatus::Finished => fixtures::FixtureStatus::Finished,
    }
}

fn fixture_from_row(row: FixtureRow) -> Fixture {
    Fixture {
        id: row.id,
        session_id: row.session_id,
        round_name: row.round_name,
        leg: row.leg,
        position: row.position,
        status: status_from_row(row.status),
        home_participant_id: row.home_player_id,
        away_participant_id: row.away_player_id,
        home_team_id: row.home_team_id,
        away_team_id: row.away_team_id,
        home_goals: row.home_goals,
        away_goals: row.away_goals,
        went_to_penalties: row.went_penalties,
        home_penalty: row.home_pen,
        away_penalty: row.away_pen,
        updated_at: row.updated_at,
    }
}

fn create_fixture(session_id: SessionId, fixture: NewFixture) -> CreateFixture {
    CreateFixture {
        session_id,
        round_name: fixture.round_name,
        leg: fixture.leg,
        position: fixture.position,
        home_player_id: fixture.home_participant_id,
        away_player_id: fixture.away_participant_id,
        home_team_id: fixture.home_team_id,
        away_team_id: fixture.away_team_id,
    }
}

impl SessionStore for PgStore {
    async fn create_session(&self, data: NewSession) -> StoreResult<Session> {
        let team_filter = serde_json::to_value(&data.team_filter)?;
        let row = sessions::create(
            &self.db,
            CreateSession {
                code: data.code,
                owner_id: data.owner_id,
                kind: data.kind.as_str().to_string(),
                title: data.title,
                description: data.description,
                icon_url: data.icon_url,
                team_filter,
                t_format: data.format.map(|f| f.as_str().to_string()),
                min_players: data.min_players,
                max_players: data.max_players,
                join_token: data.join_token,
            },
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            e => db_error(e),
        })?;

        session_from_row(row)
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<Option<Session>> {
        sessions::get_by_id(&self.db, id)
            .await
            .map_err(db_error)?
            .map(session_from_row)
            .transpose()
    }

    async fn get_session_by_code(&self, code: &str) -> StoreResult<Option<Session>> {
        sessions::get_by_code(&self.db, code)
            .await
            .map_err(db_error)?
            .map(session_from_row)
            .transpose()
    }

    async fn mark_session_started(&self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()> {
        sessions::mark_started(&self.db, id, at)
            .await
            .map_err(db_error)
    }

    async fn add_participant(
        &self,
        session_id: SessionId,
        data: NewParticipant,
    ) -> StoreResult<Participant> {
        let row = session_players::create(
            &self.db,
            CreateSessionPlayer {
                session_id,
                display_name: data.display_name,
                user_id: data.user_id,
            },
        )
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                StoreError::AlreadyExists
            }
            sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                StoreError::NotFound("session")
            }
            e => db_error(e),
        })?;

        Ok(participant_from_row(row))
    }

    async fn get_participants(&self, session_id: SessionId) -> StoreResult<Vec<Participant>> {
        let rows = session_players::list_by_session(&self.db, session_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(participant_from_row).collect())
    }

    async fn count_participants(&self, session_id: SessionId) -> StoreResult<i64> {
        session_players::count_by_session(&self.db, session_id)
            .await
            .map_err(db_error)
    }

    async fn set_participant_team(
        &self,
        participant_id: ParticipantId,
        team_id: TeamId,
    ) -> StoreResult<()> {
        if session_players::set_team(&self.db, participant_id, team_id)
            .await
            .map_err(db_error)?
        {
            Ok(())
        } else {
            Err(StoreError::NotFound("participant"))
        }
    }

    async fn get_teams(&self, filter: Option<&TeamFilter>) -> StoreResult<Vec<TeamRef>> {
        let query = filter
            .map(|f| TeamQuery {
                min_stars: f.min_stars,
                max_stars: f.max_stars,
                countries: f.countries().to_vec(),
            })
            .unwrap_or_default();

        let rows = teams::list(&self.db, &query).await.map_err(db_error)?;
        Ok(rows.into_iter().map(team_from_row).collect())
    }

    async fn get_teams_by_ids(&self, ids: &[TeamId]) -> StoreResult<Vec<TeamRef>> {
        let rows = teams::list_by_ids(&self.db, ids)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(team_from_row).collect())
    }

    async fn replace_fixtures(
        &self,
        session_id: SessionId,
        assignments: &[Assignment],
        new_fixtures: Vec<NewFixture>,
    ) -> StoreResult<u64> {
        let rows: Vec<CreateFixture> = new_fixtures
            .into_iter()
            .map(|f| create_fixture(session_id, f))
            .collect();

        let mut tx = self.db.begin().await.map_err(db_error)?;

        // Serializes concurrent restarts of the same session
        if !sessions::lock_for_update(&mut *tx, session_id)
            .await
            .map_err(db_error)?
        {
            return Err(StoreError::NotFound("session"));
        }

        for assignment in assignments {
            let updated = session_players::set_team_in_session(
                &mut *tx,
                session_id,
                assignment.participant_id,
                assignment.team_id,
            )
            .await
            .map_err(db_error)?;
            if !updated {
                return Err(StoreError::NotFound("participant"));
            }
        }

        let discarded = fixtures::delete_by_session(&mut *tx, session_id)
            .await
            .map_err(db_error)?;
        let inserted = fixtures::create_many(&mut *tx, session_id, &rows)
            .await
            .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        tracing::info!(
            session = %session_id,
            players = assignments.len(),
            discarded,
            inserted,
            "Replaced fixture set"
        );

        Ok(inserted)
    }

    async fn upsert_single_fixture(
        &self,
        session_id: SessionId,
        round_name: &str,
        leg: i32,
        fixture: NewFixture,
    ) -> StoreResult<Fixture> {
        let data = create_fixture(session_id, fixture);

        let mut tx = self.db.begin().await.map_err(db_error)?;

        if !sessions::lock_for_update(&mut *tx, session_id)
            .await
            .map_err(db_error)?
        {
            return Err(StoreError::NotFound("session"));
        }

        let existing = fixtures::find_by_round(&mut *tx, session_id, round_name, leg)
            .await
            .map_err(db_error)?;

        let row = match existing {
            Some(existing) => fixtures::reassign(&mut *tx, existing.id, data).await,
            None => fixtures::create(&mut *tx, data).await,
        }
        .map_err(db_error)?;

        tx.commit().await.map_err(db_error)?;

        Ok(fixture_from_row(row))
    }

    async fn get_fixture(&self, id: FixtureId) -> StoreResult<Option<Fixture>> {
        let row = fixtures::get_by_id(&self.db, id)
            .await
            .map_err(db_error)?;
        Ok(row.map(fixture_from_row))
    }

    async fn list_fixtures(&self, session_id: SessionId) -> StoreResult<Vec<Fixture>> {
        let rows = fixtures::list_by_session(&self.db, session_id)
            .await
            .map_err(db_error)?;
        Ok(rows.into_iter().map(fixture_from_row).collect())
    }

    async fn update_fixture_score(
        &self,
        fixture_id: FixtureId,
        score: ScoreFields,
    ) -> StoreResult<()> {
        let updated = fixtures::update_score(
            &self.db,
            fixture_id,
            UpdateFixtureScore {
                status: status_to_row(score.status),
                home_goals: score.home_goals,
                away_goals: score.away_goals,
                went_penalties: score.went_to_penalties,
                home_pen: score.home_penalty,
                away_pen: score.away_penalty,
                updated_at: score.updated_at,
            },
        )
        .await
        .map_err(db_error)?;

        if !updated {
            return Err(StoreError::NotFound("fixture"));
        }
        Ok(())
    }
}
