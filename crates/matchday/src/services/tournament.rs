use std::collections::HashSet;

use chrono::Utc;
use rand::Rng;
use serde::Deserialize;

use crate::assignment::{assign_all, validate_batch, ProposedAssignment};
use crate::domain::{Assignment, SessionKind, TeamId, TournamentFormat};
use crate::error::{ServiceError, ValidationError};
use crate::identity::IdentityProvider;
use crate::schedule;
use crate::store::SessionStore;

use super::{require_kind, MatchService};

#[derive(Debug, Clone, Deserialize)]
pub struct StartTournamentInput {
    pub assignments: Vec<Assignment>,
}

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    /// Propose a team for every seated player. Nothing is persisted; the
    /// host accepts or rerolls before starting.
    pub async fn propose_tournament_assignments<R>(
        &self,
        credential: Option<&str>,
        code: &str,
        rng: &mut R,
    ) -> Result<Vec<ProposedAssignment>, ServiceError>
    where
        R: Rng + ?Sized,
    {
        let (session, _) = self
            .load_owned_session(credential, code, "assign teams")
            .await?;
        require_kind(&session, SessionKind::Tournament)?;

        let participants = self.store.get_participants(session.id).await?;
        let teams = self.store.get_teams(Some(&session.team_filter)).await?;

        Ok(assign_all(participants, teams, rng)?)
    }

    /// Start (or restart) a tournament from an accepted assignment batch.
    ///
    /// The whole fixture set is computed before anything is written, so a
    /// rejected start leaves the previous fixtures in place. Returns the
    /// number of fixtures created.
    pub async fn start_tournament<R>(
        &self,
        credential: Option<&str>,
        code: &str,
        input: StartTournamentInput,
        rng: &mut R,
    ) -> Result<u64, ServiceError>
    where
        R: Rng + ?Sized,
    {
        let (session, _) = self
            .load_owned_session(credential, code, "start the tournament")
            .await?;
        require_kind(&session, SessionKind::Tournament)?;
        let format = session.format.as_deref().ok_or(ServiceError::FormatNotSet)?;

        let assignments = input.assignments;
        validate_batch(&assignments)?;

        let seated: HashSet<_> = self
            .store
            .get_participants(session.id)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        if let Some(stranger) = assignments
            .iter()
            .find(|a| !seated.contains(&a.participant_id))
        {
            return Err(ServiceError::InvalidAssignment(stranger.participant_id));
        }
        self.ensure_teams_exist(&assignments).await?;

        let format: TournamentFormat = format.parse()?;
        let fixtures = schedule::generate(format, &assignments, rng)?;

        let created = self
            .store
            .replace_fixtures(session.id, &assignments, fixtures)
            .await?;
        self.store
            .mark_session_started(session.id, Utc::now())
            .await?;

        tracing::info!(
            session = %session.code,
            format = %format,
            players = assignments.len(),
            fixtures = created,
            "Tournament started"
        );

        Ok(created)
    }

    async fn ensure_teams_exist(&self, assignments: &[Assignment]) -> Result<(), ServiceError> {
        let ids: Vec<TeamId> = assignments.iter().map(|a| a.team_id).collect();
        let known: HashSet<TeamId> = self
            .store
            .get_teams_by_ids(&ids)
            .await?
            .into_iter()
            .map(|t| t.id)
            .collect();

        match ids.into_iter().find(|id| !known.contains(id)) {
            Some(unknown) => Err(ValidationError::Invalid(format!("unknown team {unknown}")).into()),
            None => Ok(()),
        }
    }
}
