use std::cmp::Ordering;
use std::collections::HashMap;

use serde::Serialize;

use crate::domain::{Fixture, FixtureStatus, Participant, ParticipantId, TeamId};

pub const POINTS_FOR_WIN: i32 = 3;
pub const POINTS_FOR_DRAW: i32 = 1;

/// One row of a session table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StandingRow {
    pub participant_id: ParticipantId,
    pub display_name: String,
    pub team_id: Option<TeamId>,
    pub played: i32,
    pub won: i32,
    pub drawn: i32,
    pub lost: i32,
    pub goals_for: i32,
    pub goals_against: i32,
    pub goal_difference: i32,
    pub points: i32,
}

impl StandingRow {
    fn new(participant: &Participant) -> Self {
        Self {
            participant_id: participant.id,
            display_name: participant.display_name.clone(),
            team_id: participant.team_id,
            played: 0,
            won: 0,
            drawn: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_difference: 0,
            points: 0,
        }
    }

    fn record(&mut self, scored: i32, conceded: i32) {
        self.played += 1;
        self.goals_for += scored;
        self.goals_against += conceded;
        self.goal_difference = self.goals_for - self.goals_against;
        match scored.cmp(&conceded) {
            Ordering::Greater => {
                self.won += 1;
                self.points += POINTS_FOR_WIN;
            }
            Ordering::Equal => {
                self.drawn += 1;
                self.points += POINTS_FOR_DRAW;
            }
            Ordering::Less => self.lost += 1,
        }
    }
}

/// Aggregate finished fixtures into a table.
///
/// Regulation goals decide the result; a shoot-out does not change it.
/// Every participant gets a row, even without a finished match. Rows are
/// ordered by points, goal difference, goals scored, then name.
pub fn compute(participants: &[Participant], fixtures: &[Fixture]) -> Vec<StandingRow> {
    let mut rows: HashMap<ParticipantId, StandingRow> = participants
        .iter()
        .map(|p| (p.id, StandingRow::new(p)))
        .collect();

    for fixture in fixtures
        .iter()
        .filter(|f| f.status == FixtureStatus::Finished)
    {
        if let Some(home) = rows.get_mut(&fixture.home_participant_id) {
            home.record(fixture.home_goals, fixture.away_goals);
        }
        if let Some(away) = rows.get_mut(&fixture.away_participant_id) {
            away.record(fixture.away_goals, fixture.home_goals);
        }
    }

    let mut table: Vec<StandingRow> = rows.into_values().collect();
    table.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then(b.goal_difference.cmp(&a.goal_difference))
            .then(b.goals_for.cmp(&a.goals_for))
            .then_with(|| a.display_name.cmp(&b.display_name))
    });
    table
}
