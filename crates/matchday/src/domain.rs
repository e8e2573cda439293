use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::{DomainError, ValidationError};

pub type ParticipantId = Uuid;
pub type TeamId = i32;
pub type SessionId = Uuid;
pub type FixtureId = Uuid;

pub const MIN_STARS: i16 = 1;
pub const MAX_STARS: i16 = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionKind {
    Friendly,
    Tournament,
}

impl SessionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionKind::Friendly => "friendly",
            SessionKind::Tournament => "tournament",
        }
    }

    /// Path segment used in join links.
    pub fn join_path(&self) -> &'static str {
        match self {
            SessionKind::Friendly => "game",
            SessionKind::Tournament => "tournament",
        }
    }
}

impl FromStr for SessionKind {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "friendly" => Ok(SessionKind::Friendly),
            "tournament" => Ok(SessionKind::Tournament),
            other => Err(ValidationError::Invalid(format!(
                "unknown session type: {other}"
            ))),
        }
    }
}

/// Tournament formats a session may be configured with.
///
/// Only `League` and `SingleElim` have a fixture generator; the other two are
/// accepted as configuration and rejected when a tournament is started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentFormat {
    League,
    SingleElim,
    GroupsCup,
    DoubleElim,
}

impl TournamentFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentFormat::League => "league",
            TournamentFormat::SingleElim => "single_elim",
            TournamentFormat::GroupsCup => "groups_cup",
            TournamentFormat::DoubleElim => "double_elim",
        }
    }
}

impl fmt::Display for TournamentFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TournamentFormat {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "league" => Ok(TournamentFormat::League),
            "single_elim" => Ok(TournamentFormat::SingleElim),
            "groups_cup" => Ok(TournamentFormat::GroupsCup),
            "double_elim" => Ok(TournamentFormat::DoubleElim),
            other => Err(DomainError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    pub display_name: String,
    pub user_id: Option<Uuid>,
    pub team_id: Option<TeamId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRef {
    pub id: TeamId,
    pub name: String,
    pub short_name: String,
    pub icon_url: Option<String>,
    pub country: String,
    pub stars: i16,
}

/// Declarative restriction of the team catalog.
///
/// Every field is optional: an absent bound leaves that axis unconstrained,
/// and an absent or empty country list accepts every country.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TeamFilter {
    pub min_stars: Option<i16>,
    pub max_stars: Option<i16>,
    pub countries: Option<Vec<String>>,
}

impl TeamFilter {
    pub fn matches(&self, team: &TeamRef) -> bool {
        if self.min_stars.is_some_and(|min| team.stars < min) {
            return false;
        }
        if self.max_stars.is_some_and(|max| team.stars > max) {
            return false;
        }
        match &self.countries {
            Some(countries) if !countries.is_empty() => countries.contains(&team.country),
            _ => true,
        }
    }

    /// Boundary check applied before a filter is stored or used.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [("minStars", self.min_stars), ("maxStars", self.max_stars)] {
            if let Some(stars) = value {
                if !(MIN_STARS..=MAX_STARS).contains(&stars) {
                    return Err(ValidationError::OutOfRange {
                        field,
                        min: MIN_STARS as i64,
                        max: MAX_STARS as i64,
                    });
                }
            }
        }
        if let (Some(min), Some(max)) = (self.min_stars, self.max_stars) {
            if min > max {
                return Err(ValidationError::Invalid(
                    "minStars must not exceed maxStars".to_string(),
                ));
            }
        }
        Ok(())
    }

    pub fn countries(&self) -> &[String] {
        self.countries.as_deref().unwrap_or(&[])
    }
}

/// One participant paired with one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    #[serde(alias = "playerId")]
    pub participant_id: ParticipantId,
    pub team_id: TeamId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureStatus {
    Assigned,
    InProgress,
    Finished,
}

/// A generated fixture before the store has given it an id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewFixture {
    pub round_name: String,
    pub leg: i32,
    pub position: i32,
    pub home_participant_id: ParticipantId,
    pub away_participant_id: ParticipantId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
}

impl NewFixture {
    pub fn between(
        round_name: impl Into<String>,
        position: i32,
        home: &Assignment,
        away: &Assignment,
    ) -> Self {
        Self {
            round_name: round_name.into(),
            leg: 1,
            position,
            home_participant_id: home.participant_id,
            away_participant_id: away.participant_id,
            home_team_id: home.team_id,
            away_team_id: away.team_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: FixtureId,
    pub session_id: SessionId,
    pub round_name: String,
    pub leg: i32,
    pub position: i32,
    pub status: FixtureStatus,
    pub home_participant_id: ParticipantId,
    pub away_participant_id: ParticipantId,
    pub home_team_id: TeamId,
    pub away_team_id: TeamId,
    pub home_goals: i32,
    pub away_goals: i32,
    pub went_to_penalties: bool,
    pub home_penalty: i32,
    pub away_penalty: i32,
    pub updated_at: DateTime<Utc>,
}

impl Fixture {
    /// Materialize a freshly generated fixture with default score fields.
    pub fn from_new(
        id: FixtureId,
        session_id: SessionId,
        new: NewFixture,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            session_id,
            round_name: new.round_name,
            leg: new.leg,
            position: new.position,
            status: FixtureStatus::Assigned,
            home_participant_id: new.home_participant_id,
            away_participant_id: new.away_participant_id,
            home_team_id: new.home_team_id,
            away_team_id: new.away_team_id,
            home_goals: 0,
            away_goals: 0,
            went_to_penalties: false,
            home_penalty: 0,
            away_penalty: 0,
            updated_at: now,
        }
    }
}

/// The score columns written when a result is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreFields {
    pub status: FixtureStatus,
    pub home_goals: i32,
    pub away_goals: i32,
    pub went_to_penalties: bool,
    pub home_penalty: i32,
    pub away_penalty: i32,
    pub updated_at: DateTime<Utc>,
}

impl Fixture {
    pub fn score_fields(&self) -> ScoreFields {
        ScoreFields {
            status: self.status,
            home_goals: self.home_goals,
            away_goals: self.away_goals,
            went_to_penalties: self.went_to_penalties,
            home_penalty: self.home_penalty,
            away_penalty: self.away_penalty,
            updated_at: self.updated_at,
        }
    }

    pub fn apply_score(&mut self, score: &ScoreFields) {
        self.status = score.status;
        self.home_goals = score.home_goals;
        self.away_goals = score.away_goals;
        self.went_to_penalties = score.went_to_penalties;
        self.home_penalty = score.home_penalty;
        self.away_penalty = score.away_penalty;
        self.updated_at = score.updated_at;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: SessionId,
    pub code: String,
    pub owner_id: Uuid,
    pub kind: SessionKind,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub team_filter: TeamFilter,
    /// Raw configured format; parsed when the tournament is started so an
    /// unrecognised value surfaces as `UnsupportedFormat` at that point.
    pub format: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub join_token: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewSession {
    pub code: String,
    pub owner_id: Uuid,
    pub kind: SessionKind,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub team_filter: TeamFilter,
    pub format: Option<TournamentFormat>,
    pub min_players: i32,
    pub max_players: i32,
    pub join_token: Uuid,
}

#[derive(Debug, Clone)]
pub struct NewParticipant {
    pub display_name: String,
    pub user_id: Option<Uuid>,
}
