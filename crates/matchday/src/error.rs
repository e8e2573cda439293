use thiserror::Error;

use crate::store::StoreError;

/// Precondition failures of the assignment and scheduling algorithms.
///
/// Retrying with the same input yields the same failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    #[error("at least two participants are required, found {found}")]
    InsufficientParticipants { found: usize },

    #[error("not enough teams available: {required} required, {available} eligible")]
    InsufficientTeams { required: usize, available: usize },

    #[error("cannot draw {required} items from a pool of {available}")]
    InsufficientPool { required: usize, available: usize },

    #[error("tournament format {0} not supported")]
    UnsupportedFormat(String),
}

/// Bad input shape or range, reported before any state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },

    #[error("participant {0} appears more than once in the assignment batch")]
    DuplicateParticipant(uuid::Uuid),

    #[error("team {0} is assigned to more than one participant")]
    DuplicateTeam(i32),

    #[error("{0}")]
    Invalid(String),
}

/// Everything a caller of the service layer can get back.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("authentication required")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(&'static str),

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("invalid session type: {0}")]
    InvalidSessionType(&'static str),

    #[error("tournament format is not set")]
    FormatNotSet,

    #[error("player {0} does not belong to this session")]
    InvalidAssignment(uuid::Uuid),

    #[error("this session is full")]
    CapacityReached,

    #[error("display name already taken")]
    DisplayNameTaken,

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("store error")]
    Store(#[from] StoreError),
}

impl ServiceError {
    /// Stable machine-readable code for presenting the failure.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Unauthorized => "unauthorized",
            ServiceError::Forbidden(_) => "forbidden",
            ServiceError::NotFound(_) => "not_found",
            ServiceError::InvalidSessionType(_) => "invalid_session_type",
            ServiceError::FormatNotSet => "tournament_format_not_set",
            ServiceError::InvalidAssignment(_) => "invalid_assignment",
            ServiceError::CapacityReached => "capacity_reached",
            ServiceError::DisplayNameTaken => "insert_failed",
            ServiceError::Validation(_) => "bad_request",
            ServiceError::Domain(DomainError::InsufficientParticipants { .. }) => {
                "not_enough_players"
            }
            ServiceError::Domain(DomainError::InsufficientTeams { .. }) => "filter_no_teams",
            ServiceError::Domain(DomainError::InsufficientPool { .. }) => "not_enough_teams",
            ServiceError::Domain(DomainError::UnsupportedFormat(_)) => "unsupported_format",
            ServiceError::Store(_) => "db_error",
        }
    }

    /// True when the caller can fix the request and retry.
    pub fn is_client_error(&self) -> bool {
        !matches!(self, ServiceError::Store(_))
    }
}
