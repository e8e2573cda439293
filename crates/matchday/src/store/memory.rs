use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::assignment::filter_teams;
use crate::domain::{
    Assignment, Fixture, FixtureId, FixtureStatus, NewFixture, NewParticipant, NewSession,
    Participant, ParticipantId, ScoreFields, Session, SessionId, TeamFilter, TeamId, TeamRef,
};

use super::{SessionStore, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Inner {
    sessions: Vec<Session>,
    participants: Vec<(SessionId, Participant)>,
    teams: Vec<TeamRef>,
    fixtures: Vec<Fixture>,
}

impl Inner {
    fn require_session(&self, id: SessionId) -> StoreResult<()> {
        if self.sessions.iter().any(|s| s.id == id) {
            Ok(())
        } else {
            Err(StoreError::NotFound("session"))
        }
    }
}

/// Process-local store. Every operation runs under one lock, so fixture
/// replacement is atomic and serialized across sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn with_teams(teams: Vec<TeamRef>) -> Self {
        let store = Self::default();
        store.inner.lock().teams = teams;
        store
    }

    pub fn insert_team(&self, team: TeamRef) {
        self.inner.lock().teams.push(team);
    }
}

impl SessionStore for MemoryStore {
    async fn create_session(&self, data: NewSession) -> StoreResult<Session> {
        let mut inner = self.inner.lock();
        if inner.sessions.iter().any(|s| s.code == data.code) {
            return Err(StoreError::AlreadyExists);
        }

        let session = Session {
            id: Uuid::new_v4(),
            code: data.code,
            owner_id: data.owner_id,
            kind: data.kind,
            title: data.title,
            description: data.description,
            icon_url: data.icon_url,
            team_filter: data.team_filter,
            format: data.format.map(|f| f.as_str().to_string()),
            min_players: data.min_players,
            max_players: data.max_players,
            join_token: data.join_token,
            started_at: None,
            created_at: Utc::now(),
        };
        inner.sessions.push(session.clone());
        Ok(session)
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<Option<Session>> {
        let inner = self.inner.lock();
        Ok(inner.sessions.iter().find(|s| s.id == id).cloned())
    }

    async fn get_session_by_code(&self, code: &str) -> StoreResult<Option<Session>> {
        let inner = self.inner.lock();
        Ok(inner.sessions.iter().find(|s| s.code == code).cloned())
    }

    async fn mark_session_started(&self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let session = inner
            .sessions
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(StoreError::NotFound("session"))?;
        session.started_at = Some(at);
        Ok(())
    }

    async fn add_participant(
        &self,
        session_id: SessionId,
        data: NewParticipant,
    ) -> StoreResult<Participant> {
        let mut inner = self.inner.lock();
        inner.require_session(session_id)?;

        let taken = inner
            .participants
            .iter()
            .filter(|(sid, _)| *sid == session_id)
            .any(|(_, p)| {
                p.display_name == data.display_name
                    || (data.user_id.is_some() && p.user_id == data.user_id)
            });
        if taken {
            return Err(StoreError::AlreadyExists);
        }

        let participant = Participant {
            id: Uuid::new_v4(),
            display_name: data.display_name,
            user_id: data.user_id,
            team_id: None,
        };
        inner.participants.push((session_id, participant.clone()));
        Ok(participant)
    }

    async fn get_participants(&self, session_id: SessionId) -> StoreResult<Vec<Participant>> {
        let inner = self.inner.lock();
        Ok(inner
            .participants
            .iter()
            .filter(|(sid, _)| *sid == session_id)
            .map(|(_, p)| p.clone())
            .collect())
    }

    async fn count_participants(&self, session_id: SessionId) -> StoreResult<i64> {
        let inner = self.inner.lock();
        Ok(inner
            .participants
            .iter()
            .filter(|(sid, _)| *sid == session_id)
            .count() as i64)
    }

    async fn set_participant_team(
        &self,
        participant_id: ParticipantId,
        team_id: TeamId,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let (_, participant) = inner
            .participants
            .iter_mut()
            .find(|(_, p)| p.id == participant_id)
            .ok_or(StoreError::NotFound("participant"))?;
        participant.team_id = Some(team_id);
        Ok(())
    }

    async fn get_teams(&self, filter: Option<&TeamFilter>) -> StoreResult<Vec<TeamRef>> {
        let teams = self.inner.lock().teams.clone();
        Ok(match filter {
            Some(filter) => filter_teams(teams, filter),
            None => teams,
        })
    }

    async fn get_teams_by_ids(&self, ids: &[TeamId]) -> StoreResult<Vec<TeamRef>> {
        let inner = self.inner.lock();
        Ok(inner
            .teams
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }

    async fn replace_fixtures(
        &self,
        session_id: SessionId,
        assignments: &[Assignment],
        fixtures: Vec<NewFixture>,
    ) -> StoreResult<u64> {
        let mut inner = self.inner.lock();
        inner.require_session(session_id)?;

        // Check every participant before touching anything
        let seated = |id: ParticipantId| {
            inner
                .participants
                .iter()
                .any(|(sid, p)| *sid == session_id && p.id == id)
        };
        if !assignments.iter().all(|a| seated(a.participant_id)) {
            return Err(StoreError::NotFound("participant"));
        }

        for assignment in assignments {
            if let Some((_, participant)) = inner
                .participants
                .iter_mut()
                .find(|(_, p)| p.id == assignment.participant_id)
            {
                participant.team_id = Some(assignment.team_id);
            }
        }

        let now = Utc::now();
        inner.fixtures.retain(|f| f.session_id != session_id);
        let count = fixtures.len() as u64;
        inner.fixtures.extend(
            fixtures
                .into_iter()
                .map(|new| Fixture::from_new(Uuid::new_v4(), session_id, new, now)),
        );
        Ok(count)
    }

    async fn upsert_single_fixture(
        &self,
        session_id: SessionId,
        round_name: &str,
        leg: i32,
        fixture: NewFixture,
    ) -> StoreResult<Fixture> {
        let mut inner = self.inner.lock();
        inner.require_session(session_id)?;

        let now = Utc::now();
        let existing = inner
            .fixtures
            .iter_mut()
            .filter(|f| f.session_id == session_id && f.round_name == round_name && f.leg == leg)
            .min_by_key(|f| f.position);

        if let Some(existing) = existing {
            existing.home_participant_id = fixture.home_participant_id;
            existing.away_participant_id = fixture.away_participant_id;
            existing.home_team_id = fixture.home_team_id;
            existing.away_team_id = fixture.away_team_id;
            existing.status = FixtureStatus::Assigned;
            existing.home_goals = 0;
            existing.away_goals = 0;
            existing.went_to_penalties = false;
            existing.home_penalty = 0;
            existing.away_penalty = 0;
            existing.updated_at = now;
            return Ok(existing.clone());
        }

        let created = Fixture::from_new(Uuid::new_v4(), session_id, fixture, now);
        inner.fixtures.push(created.clone());
        Ok(created)
    }

    async fn get_fixture(&self, id: FixtureId) -> StoreResult<Option<Fixture>> {
        let inner = self.inner.lock();
        Ok(inner.fixtures.iter().find(|f| f.id == id).cloned())
    }

    async fn list_fixtures(&self, session_id: SessionId) -> StoreResult<Vec<Fixture>> {
        let inner = self.inner.lock();
        let mut fixtures: Vec<Fixture> = inner
            .fixtures
            .iter()
            .filter(|f| f.session_id == session_id)
            .cloned()
            .collect();
        fixtures.sort_by_key(|f| f.position);
        Ok(fixtures)
    }

    async fn update_fixture_score(
        &self,
        fixture_id: FixtureId,
        score: ScoreFields,
    ) -> StoreResult<()> {
        let mut inner = self.inner.lock();
        let fixture = inner
            .fixtures
            .iter_mut()
            .find(|f| f.id == fixture_id)
            .ok_or(StoreError::NotFound("fixture"))?;
        fixture.apply_score(&score);
        Ok(())
    }
}
