use rand::Rng;
use serde::Serialize;

use crate::assignment::pair_friendly;
use crate::domain::{Fixture, NewFixture, Participant, SessionKind, TeamId, TeamRef};
use crate::error::ServiceError;
use crate::identity::IdentityProvider;
use crate::schedule::FIRST_ROUND;
use crate::store::SessionStore;

use super::{require_kind, MatchService};

/// One side of a friendly, with what a client needs to render it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendlySide {
    pub player: String,
    pub team_id: TeamId,
    pub team_name: String,
    pub team_short_name: String,
    pub team_icon_url: Option<String>,
}

impl FriendlySide {
    fn new(participant: &Participant, team: &TeamRef) -> Self {
        Self {
            player: participant.display_name.clone(),
            team_id: team.id,
            team_name: team.name.clone(),
            team_short_name: team.short_name.clone(),
            team_icon_url: team.icon_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendlyAssignment {
    #[serde(skip)]
    pub fixture: Fixture,
    pub home: FriendlySide,
    pub away: FriendlySide,
}

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    /// Draw two players and two teams for a friendly and (re)write its
    /// single fixture.
    pub async fn assign_friendly<R>(
        &self,
        credential: Option<&str>,
        code: &str,
        rng: &mut R,
    ) -> Result<FriendlyAssignment, ServiceError>
    where
        R: Rng + ?Sized,
    {
        let (session, _) = self
            .load_owned_session(credential, code, "assign teams")
            .await?;
        require_kind(&session, SessionKind::Friendly)?;

        let participants = self.store.get_participants(session.id).await?;
        let teams = self.store.get_teams(Some(&session.team_filter)).await?;

        let draw = pair_friendly(participants, teams, rng)?;
        let new_fixture = NewFixture::between(
            FIRST_ROUND,
            1,
            &draw.home_assignment(),
            &draw.away_assignment(),
        );

        let fixture = self
            .store
            .upsert_single_fixture(session.id, FIRST_ROUND, 1, new_fixture)
            .await?;

        tracing::info!(
            session = %session.code,
            fixture = %fixture.id,
            home_team = draw.home.1.id,
            away_team = draw.away.1.id,
            "Friendly assigned"
        );

        Ok(FriendlyAssignment {
            fixture,
            home: FriendlySide::new(&draw.home.0, &draw.home.1),
            away: FriendlySide::new(&draw.away.0, &draw.away.1),
        })
    }
}
