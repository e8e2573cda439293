use chrono::Utc;

use crate::domain::{Fixture, FixtureId};
use crate::error::ServiceError;
use crate::identity::{require_caller, require_owner, IdentityProvider};
use crate::scoring::{self, ScoreReport};
use crate::store::SessionStore;

use super::MatchService;

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    /// Record the result of a fixture. Only the owner of the fixture's
    /// session may do this; a finished fixture is overwritten.
    pub async fn submit_score(
        &self,
        credential: Option<&str>,
        fixture_id: FixtureId,
        report: ScoreReport,
    ) -> Result<Fixture, ServiceError> {
        report.validate()?;
        let caller = require_caller(&self.identity, credential).await?;

        let fixture = self
            .store
            .get_fixture(fixture_id)
            .await?
            .ok_or(ServiceError::NotFound("fixture"))?;
        let session = self
            .store
            .get_session(fixture.session_id)
            .await?
            .ok_or(ServiceError::NotFound("session"))?;
        require_owner(&session, caller, "submit scores")?;

        let fixture = scoring::finalize(fixture, &report, Utc::now())?;
        self.store
            .update_fixture_score(fixture.id, fixture.score_fields())
            .await?;

        tracing::info!(
            session = %session.code,
            fixture = %fixture.id,
            home_goals = fixture.home_goals,
            away_goals = fixture.away_goals,
            penalties = fixture.went_to_penalties,
            "Score recorded"
        );

        Ok(fixture)
    }
}
