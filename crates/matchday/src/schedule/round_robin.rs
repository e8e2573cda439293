use crate::domain::{Assignment, NewFixture};

use super::PositionCounter;

/// Name of league matchday `round` (1-based).
pub fn round_name(round: usize) -> String {
    format!("MD{round}")
}

/// Single round-robin by the circle method.
///
/// With an odd count a bye slot is appended; whoever faces it sits the
/// round out and no fixture is produced. Slot 0 stays fixed while the rest
/// rotate one place per round, so every pair meets exactly once over `m - 1`
/// rounds. The lower index of each pairing plays at home.
pub fn generate(assignments: &[Assignment]) -> Vec<NewFixture> {
    let mut slots: Vec<Option<&Assignment>> = assignments.iter().map(Some).collect();
    if slots.len() % 2 == 1 {
        slots.push(None);
    }

    let m = slots.len();
    if m < 2 {
        return Vec::new();
    }

    let mut positions = PositionCounter::new();
    let mut fixtures = Vec::with_capacity(assignments.len() * (assignments.len() - 1) / 2);

    for round in 1..m {
        let name = round_name(round);

        for i in 0..m / 2 {
            if let (Some(home), Some(away)) = (slots[i], slots[m - 1 - i]) {
                fixtures.push(NewFixture::between(name.as_str(), positions.next(), home, away));
            }
        }

        // slot 0 stays, the last slot moves to index 1
        slots[1..].rotate_right(1);
    }

    fixtures
}
