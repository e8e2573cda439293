//! Random pairing of participants and teams.
//!
//! All randomness comes from the caller's generator so a seeded `StdRng`
//! reproduces a draw exactly.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::domain::{Assignment, Participant, TeamFilter, TeamRef};
use crate::error::{DomainError, ValidationError};

/// Draw `count` elements without replacement, in uniformly random order.
///
/// The whole pool is shuffled and a prefix taken, so every ordering of the
/// drawn subset is equally likely.
pub fn draw<T, R>(mut pool: Vec<T>, count: usize, rng: &mut R) -> Result<Vec<T>, DomainError>
where
    R: Rng + ?Sized,
{
    if pool.len() < count {
        return Err(DomainError::InsufficientPool {
            required: count,
            available: pool.len(),
        });
    }

    pool.shuffle(rng);
    pool.truncate(count);
    Ok(pool)
}

/// Keep the teams accepted by `filter`, preserving catalog order.
pub fn filter_teams(teams: Vec<TeamRef>, filter: &TeamFilter) -> Vec<TeamRef> {
    teams.into_iter().filter(|team| filter.matches(team)).collect()
}

/// Outcome of a friendly draw: `home.0` plays with `home.1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FriendlyDraw {
    pub home: (Participant, TeamRef),
    pub away: (Participant, TeamRef),
}

impl FriendlyDraw {
    pub fn home_assignment(&self) -> Assignment {
        Assignment {
            participant_id: self.home.0.id,
            team_id: self.home.1.id,
        }
    }

    pub fn away_assignment(&self) -> Assignment {
        Assignment {
            participant_id: self.away.0.id,
            team_id: self.away.1.id,
        }
    }
}

/// Pick two participants and two distinct teams for a one-off match.
pub fn pair_friendly<R>(
    participants: Vec<Participant>,
    eligible_teams: Vec<TeamRef>,
    rng: &mut R,
) -> Result<FriendlyDraw, DomainError>
where
    R: Rng + ?Sized,
{
    if participants.len() < 2 {
        return Err(DomainError::InsufficientParticipants {
            found: participants.len(),
        });
    }
    if eligible_teams.len() < 2 {
        return Err(DomainError::InsufficientTeams {
            required: 2,
            available: eligible_teams.len(),
        });
    }

    let mut players = draw(participants, 2, rng)?;
    let mut teams = draw(eligible_teams, 2, rng)?;

    let away = (players.swap_remove(1), teams.swap_remove(1));
    let home = (players.swap_remove(0), teams.swap_remove(0));

    Ok(FriendlyDraw { home, away })
}

/// A proposed participant/team pairing, with display data for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProposedAssignment {
    pub participant: Participant,
    pub team: TeamRef,
}

impl ProposedAssignment {
    pub fn assignment(&self) -> Assignment {
        Assignment {
            participant_id: self.participant.id,
            team_id: self.team.id,
        }
    }
}

/// Give every participant a distinct team.
///
/// Both lists are shuffled independently before zipping, which yields a
/// uniformly random perfect matching between participants and drawn teams.
pub fn assign_all<R>(
    participants: Vec<Participant>,
    eligible_teams: Vec<TeamRef>,
    rng: &mut R,
) -> Result<Vec<ProposedAssignment>, DomainError>
where
    R: Rng + ?Sized,
{
    if participants.len() < 2 {
        return Err(DomainError::InsufficientParticipants {
            found: participants.len(),
        });
    }
    if eligible_teams.len() < participants.len() {
        return Err(DomainError::InsufficientTeams {
            required: participants.len(),
            available: eligible_teams.len(),
        });
    }

    let count = participants.len();
    let players = draw(participants, count, rng)?;
    let teams = draw(eligible_teams, count, rng)?;

    Ok(players
        .into_iter()
        .zip(teams)
        .map(|(participant, team)| ProposedAssignment { participant, team })
        .collect())
}

/// Reject a batch in which a participant or a team appears twice.
pub fn validate_batch(assignments: &[Assignment]) -> Result<(), ValidationError> {
    let mut participants = HashSet::with_capacity(assignments.len());
    let mut teams = HashSet::with_capacity(assignments.len());

    for assignment in assignments {
        if !participants.insert(assignment.participant_id) {
            return Err(ValidationError::DuplicateParticipant(
                assignment.participant_id,
            ));
        }
        if !teams.insert(assignment.team_id) {
            return Err(ValidationError::DuplicateTeam(assignment.team_id));
        }
    }

    Ok(())
}
