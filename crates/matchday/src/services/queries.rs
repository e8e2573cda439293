use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Fixture, Participant, ParticipantId, TeamId, TeamRef};
use crate::error::ServiceError;
use crate::identity::IdentityProvider;
use crate::standings::{self, StandingRow};
use crate::store::SessionStore;

use super::{MatchService, PlayerSummary};

/// A fixture with its players and teams resolved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureDetails {
    #[serde(flatten)]
    pub fixture: Fixture,
    pub home_player: Option<PlayerSummary>,
    pub away_player: Option<PlayerSummary>,
    pub home_team: Option<TeamRef>,
    pub away_team: Option<TeamRef>,
}

/// Parse a comma-separated id list, skipping anything that is not a number.
pub fn parse_team_ids(raw: &str) -> Vec<TeamId> {
    raw.split(',')
        .filter_map(|part| part.trim().parse().ok())
        .collect()
}

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    /// Fixtures of a session in position order.
    pub async fn list_fixtures(&self, code: &str) -> Result<Vec<FixtureDetails>, ServiceError> {
        let session = self.load_session(code).await?;
        let fixtures = self.store.list_fixtures(session.id).await?;

        let players: HashMap<ParticipantId, Participant> = self
            .store
            .get_participants(session.id)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect();

        let mut team_ids: Vec<TeamId> = fixtures
            .iter()
            .flat_map(|f| [f.home_team_id, f.away_team_id])
            .collect();
        team_ids.sort_unstable();
        team_ids.dedup();
        let teams: HashMap<TeamId, TeamRef> = self
            .store
            .get_teams_by_ids(&team_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t))
            .collect();

        let player = |id: ParticipantId| players.get(&id).cloned().map(PlayerSummary::from);
        let team = |id: TeamId| teams.get(&id).cloned();

        Ok(fixtures
            .into_iter()
            .map(|fixture| FixtureDetails {
                home_player: player(fixture.home_participant_id),
                away_player: player(fixture.away_participant_id),
                home_team: team(fixture.home_team_id),
                away_team: team(fixture.away_team_id),
                fixture,
            })
            .collect())
    }

    pub async fn session_standings(&self, code: &str) -> Result<Vec<StandingRow>, ServiceError> {
        let session = self.load_session(code).await?;
        let participants = self.store.get_participants(session.id).await?;
        let fixtures = self.store.list_fixtures(session.id).await?;
        Ok(standings::compute(&participants, &fixtures))
    }

    /// The team catalog, or only the listed teams when `ids` is given.
    pub async fn list_teams(&self, ids: Option<&[TeamId]>) -> Result<Vec<TeamRef>, ServiceError> {
        let teams = match ids {
            Some([]) => Vec::new(),
            Some(ids) => self.store.get_teams_by_ids(ids).await?,
            None => self.store.get_teams(None).await?,
        };
        Ok(teams)
    }
}
