use rand::seq::SliceRandom;
use rand::Rng;

use crate::domain::{Assignment, NewFixture};

use super::{PositionCounter, FIRST_ROUND};

/// First round of a single-elimination bracket.
///
/// The batch is reseeded with a fresh shuffle and walked in consecutive
/// pairs. With an odd count the last seed has a bye: it gets no fixture and
/// is considered through to the next round. Later rounds are not generated.
pub fn first_round<R>(assignments: &[Assignment], rng: &mut R) -> Vec<NewFixture>
where
    R: Rng + ?Sized,
{
    let mut seeds = assignments.to_vec();
    seeds.shuffle(rng);

    if let Some(bye) = seeds.chunks_exact(2).remainder().first() {
        tracing::debug!(participant = %bye.participant_id, "Bye in first knockout round");
    }

    let mut positions = PositionCounter::new();
    seeds
        .chunks_exact(2)
        .map(|pair| NewFixture::between(FIRST_ROUND, positions.next(), &pair[0], &pair[1]))
        .collect()
}
