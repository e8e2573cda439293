use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, RngExt};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    NewParticipant, NewSession, Participant, ParticipantId, SessionId, SessionKind, TeamFilter,
    TeamId, TournamentFormat,
};
use crate::error::{ServiceError, ValidationError};
use crate::identity::{require_caller, IdentityProvider};
use crate::store::{SessionStore, StoreError};

use super::MatchService;

pub const JOIN_CODE_LEN: usize = 6;
const MAX_CODE_ATTEMPTS: usize = 5;

pub const MIN_PLAYERS: i32 = 2;
pub const MAX_PLAYERS: i32 = 64;
const DEFAULT_MIN_PLAYERS: i32 = 2;
const DEFAULT_MAX_PLAYERS: i32 = 32;

const HOST_DISPLAY_NAME: &str = "Host";

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionInput {
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub team_filter: Option<TeamFilter>,
    #[serde(rename = "tFormat")]
    pub format: Option<TournamentFormat>,
    pub min_players: Option<i32>,
    pub max_players: Option<i32>,
}

impl CreateSessionInput {
    pub fn new(kind: SessionKind, title: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            description: None,
            icon_url: None,
            team_filter: None,
            format: None,
            min_players: None,
            max_players: None,
        }
    }

    fn validate(&self) -> Result<(), ValidationError> {
        check_length("title", &self.title, 1, 120)?;
        if let Some(description) = &self.description {
            check_length("description", description, 0, 500)?;
        }
        if let Some(icon_url) = &self.icon_url {
            url::Url::parse(icon_url)
                .map_err(|e| ValidationError::Invalid(format!("iconUrl: {e}")))?;
        }
        if let Some(filter) = &self.team_filter {
            filter.validate()?;
        }

        for (field, value) in [
            ("minPlayers", self.min_players),
            ("maxPlayers", self.max_players),
        ] {
            if value.is_some_and(|v| !(MIN_PLAYERS..=MAX_PLAYERS).contains(&v)) {
                return Err(ValidationError::OutOfRange {
                    field,
                    min: MIN_PLAYERS as i64,
                    max: MAX_PLAYERS as i64,
                });
            }
        }
        if self.player_bounds().0 > self.player_bounds().1 {
            return Err(ValidationError::Invalid(
                "minPlayers must not exceed maxPlayers".to_string(),
            ));
        }
        Ok(())
    }

    fn player_bounds(&self) -> (i32, i32) {
        (
            self.min_players.unwrap_or(DEFAULT_MIN_PLAYERS),
            self.max_players.unwrap_or(DEFAULT_MAX_PLAYERS),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatedSession {
    pub code: String,
    pub join_url: String,
    pub join_token: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerSummary {
    pub id: ParticipantId,
    pub display_name: String,
    pub team_id: Option<TeamId>,
}

impl From<Participant> for PlayerSummary {
    fn from(p: Participant) -> Self {
        Self {
            id: p.id,
            display_name: p.display_name,
            team_id: p.team_id,
        }
    }
}

/// Public view of a session. The join token is never part of it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSummary {
    pub id: SessionId,
    pub code: String,
    #[serde(rename = "type")]
    pub kind: SessionKind,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub t_format: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub started_at: Option<DateTime<Utc>>,
    pub players: Vec<PlayerSummary>,
    pub players_count: usize,
}

fn check_length(
    field: &'static str,
    value: &str,
    min: usize,
    max: usize,
) -> Result<(), ValidationError> {
    let len = value.chars().count();
    if len < min || len > max {
        return Err(ValidationError::Length { field, min, max });
    }
    Ok(())
}

/// Six uppercase letters or digits.
pub fn generate_join_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..JOIN_CODE_LEN)
        .map(|_| char::from(rng.sample(Alphanumeric)).to_ascii_uppercase())
        .collect()
}

impl<S, I> MatchService<S, I>
where
    S: SessionStore,
    I: IdentityProvider,
{
    /// Create a session owned by the caller and seat them as its host.
    pub async fn create_session<R>(
        &self,
        credential: Option<&str>,
        input: CreateSessionInput,
        rng: &mut R,
    ) -> Result<CreatedSession, ServiceError>
    where
        R: Rng + ?Sized,
    {
        input.validate()?;
        let caller = require_caller(&self.identity, credential).await?;

        let (min_players, max_players) = input.player_bounds();
        let join_token = Uuid::new_v4();

        let mut attempt = 0;
        let session = loop {
            attempt += 1;
            let data = NewSession {
                code: generate_join_code(rng),
                owner_id: caller,
                kind: input.kind,
                title: input.title.clone(),
                description: input.description.clone(),
                icon_url: input.icon_url.clone(),
                team_filter: input.team_filter.clone().unwrap_or_default(),
                format: input.format,
                min_players,
                max_players,
                join_token,
            };
            match self.store.create_session(data).await {
                Ok(session) => break session,
                Err(StoreError::AlreadyExists) if attempt < MAX_CODE_ATTEMPTS => {
                    tracing::debug!(attempt, "Join code collision, retrying");
                }
                Err(e) => return Err(e.into()),
            }
        };

        // The host may already be seated; that is not a failure.
        match self
            .store
            .add_participant(
                session.id,
                NewParticipant {
                    display_name: HOST_DISPLAY_NAME.to_string(),
                    user_id: Some(caller),
                },
            )
            .await
        {
            Ok(_) | Err(StoreError::AlreadyExists) => {}
            Err(e) => return Err(e.into()),
        }

        tracing::info!(
            session = %session.code,
            kind = session.kind.as_str(),
            owner = %caller,
            "Session created"
        );

        Ok(CreatedSession {
            join_url: format!(
                "{}/{}/{}",
                self.base_url,
                session.kind.join_path(),
                session.code
            ),
            code: session.code,
            join_token: session.join_token,
        })
    }

    pub async fn get_session(&self, code: &str) -> Result<SessionSummary, ServiceError> {
        let session = self.load_session(code).await?;
        let players: Vec<PlayerSummary> = self
            .store
            .get_participants(session.id)
            .await?
            .into_iter()
            .map(PlayerSummary::from)
            .collect();

        Ok(SessionSummary {
            id: session.id,
            code: session.code,
            kind: session.kind,
            title: session.title,
            description: session.description,
            icon_url: session.icon_url,
            t_format: session.format,
            min_players: session.min_players,
            max_players: session.max_players,
            started_at: session.started_at,
            players_count: players.len(),
            players,
        })
    }

    /// Seat a guest under `display_name`. No credential is needed.
    pub async fn join_session(
        &self,
        code: &str,
        display_name: &str,
    ) -> Result<Participant, ServiceError> {
        let display_name = display_name.trim();
        check_length("displayName", display_name, 2, 40)?;

        let session = self.load_session(code).await?;
        let seated = self.store.count_participants(session.id).await?;
        if seated >= i64::from(session.max_players) {
            return Err(ServiceError::CapacityReached);
        }

        let participant = self
            .store
            .add_participant(
                session.id,
                NewParticipant {
                    display_name: display_name.to_string(),
                    user_id: None,
                },
            )
            .await
            .map_err(|e| match e {
                StoreError::AlreadyExists => ServiceError::DisplayNameTaken,
                e => e.into(),
            })?;

        tracing::info!(session = %session.code, player = %participant.id, "Player joined");
        Ok(participant)
    }
}
