//! Request-level workflows over the store.
//!
//! Each workflow authenticates the caller where it mutates, loads what it
//! needs, runs the pure core to completion and only then writes.

pub mod friendly;
pub mod queries;
pub mod scores;
pub mod sessions;
pub mod tournament;

pub use friendly::{FriendlyAssignment, FriendlySide};
pub use queries::{parse_team_ids, FixtureDetails};
pub use sessions::{CreateSessionInput, CreatedSession, PlayerSummary, SessionSummary};
pub use tournament::StartTournamentInput;

use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::{Session, SessionKind};
use crate::error::ServiceError;
use crate::identity::{require_caller, require_owner, IdentityProvider};
use crate::store::SessionStore;

pub struct MatchService<S, I> {
    store: S,
    identity: I,
    base_url: String,
}

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    pub fn new(store: S, identity: I) -> Self {
        Self {
            store,
            identity,
            base_url: String::new(),
        }
    }

    pub fn from_config(store: S, identity: I, config: &AppConfig) -> Self {
        Self::new(store, identity).with_base_url(config.app_base_url.clone())
    }

    /// Prefix for join links handed back by `create_session`.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn load_session(&self, code: &str) -> Result<Session, ServiceError> {
        self.store
            .get_session_by_code(code)
            .await?
            .ok_or(ServiceError::NotFound("session"))
    }

    /// Load the session and check that the caller owns it.
    async fn load_owned_session(
        &self,
        credential: Option<&str>,
        code: &str,
        action: &'static str,
    ) -> Result<(Session, Uuid), ServiceError> {
        let caller = require_caller(&self.identity, credential).await?;
        let session = self.load_session(code).await?;
        require_owner(&session, caller, action)?;
        Ok((session, caller))
    }
}

fn require_kind(session: &Session, kind: SessionKind) -> Result<(), ServiceError> {
    if session.kind != kind {
        return Err(ServiceError::InvalidSessionType(match kind {
            SessionKind::Friendly => "only friendly matches can assign via this operation",
            SessionKind::Tournament => "only tournaments support this operation",
        }));
    }
    Ok(())
}
