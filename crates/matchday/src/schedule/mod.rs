//! Turns a finalized assignment batch into an ordered fixture set.
//!
//! Positions are 1-based and contiguous across the whole output, so array
//! order, insertion order and display order coincide.

pub mod knockout;
pub mod round_robin;

use rand::Rng;

use crate::domain::{Assignment, NewFixture, TournamentFormat};
use crate::error::DomainError;

/// Round label of a friendly match and of the first knockout round.
pub const FIRST_ROUND: &str = "R1";

/// Generate the fixtures for `format`.
///
/// Formats without a generator fail with `UnsupportedFormat` before any
/// fixture is produced.
pub fn generate<R>(
    format: TournamentFormat,
    assignments: &[Assignment],
    rng: &mut R,
) -> Result<Vec<NewFixture>, DomainError>
where
    R: Rng + ?Sized,
{
    let fixtures = match format {
        TournamentFormat::League => {
            ensure_pairable(assignments)?;
            round_robin::generate(assignments)
        }
        TournamentFormat::SingleElim => {
            ensure_pairable(assignments)?;
            knockout::first_round(assignments, rng)
        }
        TournamentFormat::GroupsCup | TournamentFormat::DoubleElim => {
            return Err(DomainError::UnsupportedFormat(format.to_string()));
        }
    };

    tracing::debug!(
        format = %format,
        participants = assignments.len(),
        fixtures = fixtures.len(),
        "Generated fixture set"
    );

    Ok(fixtures)
}

fn ensure_pairable(assignments: &[Assignment]) -> Result<(), DomainError> {
    if assignments.len() < 2 {
        return Err(DomainError::InsufficientParticipants {
            found: assignments.len(),
        });
    }
    Ok(())
}

/// Hands out the global ordering key.
#[derive(Debug)]
pub(crate) struct PositionCounter(i32);

impl PositionCounter {
    pub(crate) fn new() -> Self {
        Self(1)
    }

    pub(crate) fn next(&mut self) -> i32 {
        let position = self.0;
        self.0 += 1;
        position
    }
}
