//! The durable record keeper behind the service layer.

pub mod memory;
pub mod postgres;

use std::future::Future;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::{
    Assignment, Fixture, FixtureId, NewFixture, NewParticipant, NewSession, Participant,
    ParticipantId, ScoreFields, Session, SessionId, TeamFilter, TeamId, TeamRef,
};

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Db(#[from] sqlx::Error),

    #[error("invalid stored data: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("record already exists")]
    AlreadyExists,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("corrupt record: {0}")]
    Corrupt(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Sessions, players, the team catalog and fixtures.
///
/// `replace_fixtures` and `upsert_single_fixture` must be all-or-nothing and
/// serialized per session.
pub trait SessionStore {
    fn create_session(&self, data: NewSession)
        -> impl Future<Output = StoreResult<Session>> + Send;

    fn get_session(&self, id: SessionId)
        -> impl Future<Output = StoreResult<Option<Session>>> + Send;

    fn get_session_by_code(
        &self,
        code: &str,
    ) -> impl Future<Output = StoreResult<Option<Session>>> + Send;

    fn mark_session_started(
        &self,
        id: SessionId,
        at: DateTime<Utc>,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    /// Fails with `AlreadyExists` when the display name or user is already
    /// in the session.
    fn add_participant(
        &self,
        session_id: SessionId,
        data: NewParticipant,
    ) -> impl Future<Output = StoreResult<Participant>> + Send;

    fn get_participants(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = StoreResult<Vec<Participant>>> + Send;

    fn count_participants(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = StoreResult<i64>> + Send;

    /// Record a single player's team outside of a tournament start.
    fn set_participant_team(
        &self,
        participant_id: ParticipantId,
        team_id: TeamId,
    ) -> impl Future<Output = StoreResult<()>> + Send;

    fn get_teams(
        &self,
        filter: Option<&TeamFilter>,
    ) -> impl Future<Output = StoreResult<Vec<TeamRef>>> + Send;

    fn get_teams_by_ids(
        &self,
        ids: &[TeamId],
    ) -> impl Future<Output = StoreResult<Vec<TeamRef>>> + Send;

    /// Record each participant's team, discard every fixture of the session
    /// and insert `fixtures` in their place. Either all of it lands or none
    /// of it does. Returns the number of fixtures inserted.
    fn replace_fixtures(
        &self,
        session_id: SessionId,
        assignments: &[Assignment],
        fixtures: Vec<NewFixture>,
    ) -> impl Future<Output = StoreResult<u64>> + Send;

    /// Create or re-point the fixture keyed by `(session, round_name, leg)`.
    fn upsert_single_fixture(
        &self,
        session_id: SessionId,
        round_name: &str,
        leg: i32,
        fixture: NewFixture,
    ) -> impl Future<Output = StoreResult<Fixture>> + Send;

    fn get_fixture(&self, id: FixtureId)
        -> impl Future<Output = StoreResult<Option<Fixture>>> + Send;

    /// Fixtures of the session ordered by position.
    fn list_fixtures(
        &self,
        session_id: SessionId,
    ) -> impl Future<Output = StoreResult<Vec<Fixture>>> + Send;

    fn update_fixture_score(
        &self,
        fixture_id: FixtureId,
        score: ScoreFields,
    ) -> impl Future<Output = StoreResult<()>> + Send;
}
