mod common;

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use common::*;
use matchday::domain::{
    Assignment, Fixture, FixtureId, FixtureStatus, NewFixture, NewParticipant, NewSession,
    Participant, ParticipantId, ScoreFields, Session, SessionId, SessionKind, TeamFilter, TeamId,
    TeamRef, TournamentFormat,
};
use matchday::schedule;
use matchday::scoring::ScoreReport;
use matchday::services::{CreateSessionInput, StartTournamentInput};
use matchday::store::StoreResult;
use matchday::{
    DomainError, MatchService, MemoryStore, ServiceError, SessionStore, StoreError,
    ValidationError,
};
use uuid::Uuid;

/// Memory store whose fixture replace always fails, as a dropped
/// connection would mid-transaction.
struct FailingReplaceStore(MemoryStore);

impl SessionStore for FailingReplaceStore {
    async fn create_session(&self, data: NewSession) -> StoreResult<Session> {
        self.0.create_session(data).await
    }

    async fn get_session(&self, id: SessionId) -> StoreResult<Option<Session>> {
        self.0.get_session(id).await
    }

    async fn get_session_by_code(&self, code: &str) -> StoreResult<Option<Session>> {
        self.0.get_session_by_code(code).await
    }

    async fn mark_session_started(&self, id: SessionId, at: DateTime<Utc>) -> StoreResult<()> {
        self.0.mark_session_started(id, at).await
    }

    async fn add_participant(
        &self,
        session_id: SessionId,
        data: NewParticipant,
    ) -> StoreResult<Participant> {
        self.0.add_participant(session_id, data).await
    }

    async fn get_participants(&self, session_id: SessionId) -> StoreResult<Vec<Participant>> {
        self.0.get_participants(session_id).await
    }

    async fn count_participants(&self, session_id: SessionId) -> StoreResult<i64> {
        self.0.count_participants(session_id).await
    }

    async fn set_participant_team(
        &self,
        participant_id: ParticipantId,
        team_id: TeamId,
    ) -> StoreResult<()> {
        self.0.set_participant_team(participant_id, team_id).await
    }

    async fn get_teams(&self, filter: Option<&TeamFilter>) -> StoreResult<Vec<TeamRef>> {
        self.0.get_teams(filter).await
    }

    async fn get_teams_by_ids(&self, ids: &[TeamId]) -> StoreResult<Vec<TeamRef>> {
        self.0.get_teams_by_ids(ids).await
    }

    async fn replace_fixtures(
        &self,
        _session_id: SessionId,
        _assignments: &[Assignment],
        _fixtures: Vec<NewFixture>,
    ) -> StoreResult<u64> {
        Err(StoreError::Corrupt("connection reset".to_string()))
    }

    async fn upsert_single_fixture(
        &self,
        session_id: SessionId,
        round_name: &str,
        leg: i32,
        fixture: NewFixture,
    ) -> StoreResult<Fixture> {
        self.0
            .upsert_single_fixture(session_id, round_name, leg, fixture)
            .await
    }

    async fn get_fixture(&self, id: FixtureId) -> StoreResult<Option<Fixture>> {
        self.0.get_fixture(id).await
    }

    async fn list_fixtures(&self, session_id: SessionId) -> StoreResult<Vec<Fixture>> {
        self.0.list_fixtures(session_id).await
    }

    async fn update_fixture_score(
        &self,
        fixture_id: FixtureId,
        score: ScoreFields,
    ) -> StoreResult<()> {
        self.0.update_fixture_score(fixture_id, score).await
    }
}

/// Tournament with the host plus `guests` seated. Returns the code.
async fn tournament_with(ctx: &TestContext, format: TournamentFormat, guests: usize) -> String {
    let code = create_session(ctx, SessionKind::Tournament, Some(format), None).await;
    seat_guests(ctx, &code, guests).await;
    code
}

async fn proposed_batch(ctx: &TestContext, code: &str, seed: u64) -> Vec<Assignment> {
    ctx.service
        .propose_tournament_assignments(host(), code, &mut seeded_rng(seed))
        .await
        .expect("Proposal should succeed")
        .iter()
        .map(|p| p.assignment())
        .collect()
}

fn start_input(assignments: Vec<Assignment>) -> StartTournamentInput {
    StartTournamentInput { assignments }
}

#[tokio::test]
async fn test_proposal_is_not_persisted() {
    let ctx = setup_service();
    let filter = TeamFilter {
        min_stars: Some(3),
        ..TeamFilter::default()
    };
    let code = create_session(
        &ctx,
        SessionKind::Tournament,
        Some(TournamentFormat::League),
        Some(filter),
    )
    .await;
    seat_guests(&ctx, &code, 3).await;

    let proposed = ctx
        .service
        .propose_tournament_assignments(host(), &code, &mut seeded_rng(1))
        .await
        .unwrap();

    assert_eq!(proposed.len(), 4);
    assert!(proposed.iter().all(|p| p.team.stars >= 3));
    let teams: HashSet<i32> = proposed.iter().map(|p| p.team.id).collect();
    assert_eq!(teams.len(), 4);

    let summary = ctx.service.get_session(&code).await.unwrap();
    assert!(summary.players.iter().all(|p| p.team_id.is_none()));
    assert!(summary.started_at.is_none());
}

#[tokio::test]
async fn test_proposal_with_too_few_teams() {
    let ctx = setup_service();
    let filter = TeamFilter {
        countries: Some(vec!["IT".to_string()]),
        ..TeamFilter::default()
    };
    let code = create_session(
        &ctx,
        SessionKind::Tournament,
        Some(TournamentFormat::League),
        Some(filter),
    )
    .await;
    seat_guests(&ctx, &code, 2).await;

    let err = ctx
        .service
        .propose_tournament_assignments(host(), &code, &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::InsufficientTeams {
            required: 3,
            available: 2
        })
    ));
}

#[tokio::test]
async fn test_start_league_persists_everything() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 4).await;
    let batch = proposed_batch(&ctx, &code, 3).await;

    let created = ctx
        .service
        .start_tournament(host(), &code, start_input(batch.clone()), &mut seeded_rng(3))
        .await
        .expect("Start should succeed");

    assert_eq!(created, 10);

    let summary = ctx.service.get_session(&code).await.unwrap();
    assert!(summary.started_at.is_some());
    for assignment in &batch {
        let player = summary
            .players
            .iter()
            .find(|p| p.id == assignment.participant_id)
            .unwrap();
        assert_eq!(player.team_id, Some(assignment.team_id));
    }

    let fixtures = ctx.service.list_fixtures(&code).await.unwrap();
    assert_eq!(fixtures.len(), 10);
    let positions: Vec<i32> = fixtures.iter().map(|f| f.fixture.position).collect();
    assert_eq!(positions, (1..=10).collect::<Vec<_>>());
    assert!(fixtures
        .iter()
        .all(|f| f.home_player.is_some() && f.away_team.is_some()));
}

#[tokio::test]
async fn test_failed_replace_leaves_teams_unassigned() {
    let identity = StaticIdentity::default().with(HOST_TOKEN, Uuid::new_v4());
    let service = MatchService::new(
        FailingReplaceStore(MemoryStore::with_teams(catalog())),
        identity,
    );
    let mut input = CreateSessionInput::new(SessionKind::Tournament, "Cup");
    input.format = Some(TournamentFormat::League);
    let code = service
        .create_session(host(), input, &mut seeded_rng(1))
        .await
        .unwrap()
        .code;
    service.join_session(&code, "Ana").await.unwrap();

    let batch: Vec<Assignment> = service
        .propose_tournament_assignments(host(), &code, &mut seeded_rng(1))
        .await
        .unwrap()
        .iter()
        .map(|p| p.assignment())
        .collect();
    let err = service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "db_error");
    assert!(!err.is_client_error());

    let summary = service.get_session(&code).await.unwrap();
    assert!(
        summary.players.iter().all(|p| p.team_id.is_none()),
        "No team should be recorded when the fixture write fails"
    );
    assert!(summary.started_at.is_none());
    assert!(service.list_fixtures(&code).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replace_with_unseated_player_changes_nothing() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 2).await;
    let mut batch = proposed_batch(&ctx, &code, 4).await;
    let store = ctx.service.store();
    let session = store.get_session_by_code(&code).await.unwrap().unwrap();
    let fixtures = schedule::generate(TournamentFormat::League, &batch, &mut seeded_rng(4)).unwrap();

    batch[2].participant_id = Uuid::new_v4();
    let err = store
        .replace_fixtures(session.id, &batch, fixtures)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound("participant")));
    let players = store.get_participants(session.id).await.unwrap();
    assert!(players.iter().all(|p| p.team_id.is_none()));
    assert!(store.list_fixtures(session.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_set_participant_team_directly() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 1).await;
    let store = ctx.service.store();
    let session = store.get_session_by_code(&code).await.unwrap().unwrap();
    let players = store.get_participants(session.id).await.unwrap();

    store.set_participant_team(players[1].id, 6).await.unwrap();
    let err = store
        .set_participant_team(Uuid::new_v4(), 6)
        .await
        .unwrap_err();

    assert!(matches!(err, StoreError::NotFound("participant")));
    let players = store.get_participants(session.id).await.unwrap();
    assert_eq!(players[0].team_id, None);
    assert_eq!(players[1].team_id, Some(6));
}

#[tokio::test]
async fn test_start_single_elim_with_bye() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::SingleElim, 4).await;
    let batch = proposed_batch(&ctx, &code, 8).await;

    let created = ctx
        .service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(8))
        .await
        .unwrap();

    assert_eq!(created, 2);
    let fixtures = ctx.service.list_fixtures(&code).await.unwrap();
    assert!(fixtures.iter().all(|f| f.fixture.round_name == "R1"));
}

#[tokio::test]
async fn test_restart_replaces_fixture_set() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 3).await;
    let batch = proposed_batch(&ctx, &code, 1).await;

    ctx.service
        .start_tournament(host(), &code, start_input(batch.clone()), &mut seeded_rng(1))
        .await
        .unwrap();
    let reduced: Vec<Assignment> = batch.iter().take(2).copied().collect();
    let created = ctx
        .service
        .start_tournament(host(), &code, start_input(reduced), &mut seeded_rng(1))
        .await
        .unwrap();

    assert_eq!(created, 1);
    assert_eq!(ctx.service.list_fixtures(&code).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_replacing_league_with_knockout_leaves_only_knockout() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 5).await;
    let batch = proposed_batch(&ctx, &code, 2).await;
    let store = ctx.service.store();
    let session = store.get_session_by_code(&code).await.unwrap().unwrap();

    let league = schedule::generate(TournamentFormat::League, &batch, &mut seeded_rng(2)).unwrap();
    store.replace_fixtures(session.id, &batch, league).await.unwrap();
    assert_eq!(store.list_fixtures(session.id).await.unwrap().len(), 15);

    let knockout =
        schedule::generate(TournamentFormat::SingleElim, &batch, &mut seeded_rng(2)).unwrap();
    store.replace_fixtures(session.id, &batch, knockout).await.unwrap();

    let stored = store.list_fixtures(session.id).await.unwrap();
    assert_eq!(stored.len(), 3);
    assert!(stored.iter().all(|f| f.round_name == "R1"));
}

#[tokio::test]
async fn test_unsupported_format_writes_nothing() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::GroupsCup, 3).await;
    let batch = proposed_batch(&ctx, &code, 1).await;

    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Domain(DomainError::UnsupportedFormat(ref f)) if f == "groups_cup"
    ));
    assert_eq!(err.code(), "unsupported_format");
    let summary = ctx.service.get_session(&code).await.unwrap();
    assert!(summary.started_at.is_none());
    assert!(summary.players.iter().all(|p| p.team_id.is_none()));
    assert!(ctx.service.list_fixtures(&code).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_failed_restart_keeps_previous_fixtures() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 3).await;
    let batch = proposed_batch(&ctx, &code, 1).await;
    ctx.service
        .start_tournament(host(), &code, start_input(batch.clone()), &mut seeded_rng(1))
        .await
        .unwrap();

    let mut duplicated = batch.clone();
    duplicated[1].team_id = duplicated[0].team_id;
    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(duplicated), &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::DuplicateTeam(_))
    ));
    assert_eq!(ctx.service.list_fixtures(&code).await.unwrap().len(), 6);
}

#[tokio::test]
async fn test_start_without_format() {
    let ctx = setup_service();
    let code = create_session(&ctx, SessionKind::Tournament, None, None).await;
    seat_guests(&ctx, &code, 1).await;
    let batch = proposed_batch(&ctx, &code, 1).await;

    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert!(matches!(err, ServiceError::FormatNotSet));
    assert_eq!(err.code(), "tournament_format_not_set");
}

#[tokio::test]
async fn test_start_rejects_foreign_players_and_unknown_teams() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 2).await;
    let mut batch = proposed_batch(&ctx, &code, 1).await;

    let stranger = Uuid::new_v4();
    let mut with_stranger = batch.clone();
    with_stranger[0].participant_id = stranger;
    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(with_stranger), &mut seeded_rng(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidAssignment(id) if id == stranger));

    batch[0].team_id = 404;
    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(1))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ServiceError::Validation(ValidationError::Invalid(_))
    ));
    assert!(ctx.service.list_fixtures(&code).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_start_needs_two_assignments() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 2).await;
    let batch = proposed_batch(&ctx, &code, 1).await;

    let err = ctx
        .service
        .start_tournament(host(), &code, start_input(batch[..1].to_vec()), &mut seeded_rng(1))
        .await
        .unwrap_err();

    assert_eq!(err.code(), "not_enough_players");
}

#[tokio::test]
async fn test_only_owner_starts_tournament() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 2).await;
    let batch = proposed_batch(&ctx, &code, 1).await;

    let err = ctx
        .service
        .start_tournament(guest(), &code, start_input(batch), &mut seeded_rng(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
    assert!(err.is_client_error());

    let friendly = create_session(&ctx, SessionKind::Friendly, None, None).await;
    let err = ctx
        .service
        .propose_tournament_assignments(host(), &friendly, &mut seeded_rng(1))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::InvalidSessionType(_)));
}

#[tokio::test]
async fn test_start_input_accepts_player_id_field() {
    let input: StartTournamentInput = serde_json::from_value(serde_json::json!({
        "assignments": [
            { "playerId": "7d1c3f1e-8f58-4b5b-9d65-0f0b8f6c2a11", "teamId": 3 },
            { "participantId": "0b9e1f4c-2d7a-4c36-8a55-7a3c9d2e5f10", "teamId": 4 }
        ]
    }))
    .unwrap();

    assert_eq!(input.assignments.len(), 2);
    assert_eq!(input.assignments[0].team_id, 3);
}

#[tokio::test]
async fn test_submit_score_and_standings() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 1).await;
    let batch = proposed_batch(&ctx, &code, 6).await;
    ctx.service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(6))
        .await
        .unwrap();
    let fixture = ctx.service.list_fixtures(&code).await.unwrap()[0].fixture.clone();

    let scored = ctx
        .service
        .submit_score(host(), fixture.id, ScoreReport::regulation(2, 1))
        .await
        .expect("Owner should record the score");
    assert_eq!(scored.status, FixtureStatus::Finished);

    let stored = ctx
        .service
        .store()
        .get_fixture(fixture.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!((stored.home_goals, stored.away_goals), (2, 1));
    assert_eq!(stored.status, FixtureStatus::Finished);

    let table = ctx.service.session_standings(&code).await.unwrap();
    assert_eq!(table[0].participant_id, fixture.home_participant_id);
    assert_eq!(table[0].points, 3);
    assert_eq!(table[1].points, 0);

    ctx.service
        .submit_score(host(), fixture.id, ScoreReport::regulation(0, 0).with_penalties(3, 4))
        .await
        .expect("Overwriting a result is allowed");
    let table = ctx.service.session_standings(&code).await.unwrap();
    assert!(table.iter().all(|row| row.points == 1));
}

#[tokio::test]
async fn test_submit_score_checks() {
    let ctx = setup_service();
    let code = tournament_with(&ctx, TournamentFormat::League, 1).await;
    let batch = proposed_batch(&ctx, &code, 6).await;
    ctx.service
        .start_tournament(host(), &code, start_input(batch), &mut seeded_rng(6))
        .await
        .unwrap();
    let fixture_id = ctx.service.list_fixtures(&code).await.unwrap()[0].fixture.id;

    let err = ctx
        .service
        .submit_score(guest(), fixture_id, ScoreReport::regulation(1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));

    let err = ctx
        .service
        .submit_score(host(), Uuid::new_v4(), ScoreReport::regulation(1, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::NotFound("fixture")));

    let err = ctx
        .service
        .submit_score(host(), fixture_id, ScoreReport::regulation(1, -2))
        .await
        .unwrap_err();
    assert_eq!(err.code(), "bad_request");

    let untouched = ctx.service.list_fixtures(&code).await.unwrap();
    assert_eq!(untouched[0].fixture.status, FixtureStatus::Assigned);
}

#[tokio::test]
async fn test_sessions_with_custom_capacity() {
    let ctx = setup_service();
    let mut input = CreateSessionInput::new(SessionKind::Tournament, "Mini cup");
    input.format = Some(TournamentFormat::SingleElim);
    input.min_players = Some(4);
    input.max_players = Some(4);

    let created = ctx
        .service
        .create_session(host(), input, &mut seeded_rng(12))
        .await
        .unwrap();
    seat_guests(&ctx, &created.code, 3).await;

    let batch = proposed_batch(&ctx, &created.code, 12).await;
    let count = ctx
        .service
        .start_tournament(host(), &created.code, start_input(batch), &mut seeded_rng(12))
        .await
        .unwrap();
    assert_eq!(count, 2);
}
