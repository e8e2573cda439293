use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::{Fixture, FixtureStatus};
use crate::error::ValidationError;

/// A reported result. Penalty counts only matter when `went_to_penalties`.
/// Both goal counts are required on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct ScoreReport {
    pub home_goals: i32,
    pub away_goals: i32,
    #[serde(rename = "went_penalties", default)]
    pub went_to_penalties: bool,
    #[serde(rename = "home_pen", default)]
    pub home_penalty: i32,
    #[serde(rename = "away_pen", default)]
    pub away_penalty: i32,
}

impl ScoreReport {
    pub fn regulation(home_goals: i32, away_goals: i32) -> Self {
        Self {
            home_goals,
            away_goals,
            ..Self::default()
        }
    }

    pub fn with_penalties(mut self, home_penalty: i32, away_penalty: i32) -> Self {
        self.went_to_penalties = true;
        self.home_penalty = home_penalty;
        self.away_penalty = away_penalty;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let fields = [
            ("home_goals", self.home_goals),
            ("away_goals", self.away_goals),
            ("home_pen", self.home_penalty),
            ("away_pen", self.away_penalty),
        ];
        for (field, value) in fields {
            if value < 0 {
                return Err(ValidationError::OutOfRange {
                    field,
                    min: 0,
                    max: i32::MAX as i64,
                });
            }
        }
        Ok(())
    }
}

/// Close out a fixture with a reported result.
///
/// A fixture that is already finished is overwritten; nothing checks that
/// penalties follow a drawn regulation score.
pub fn finalize(
    mut fixture: Fixture,
    report: &ScoreReport,
    now: DateTime<Utc>,
) -> Result<Fixture, ValidationError> {
    report.validate()?;

    fixture.home_goals = report.home_goals;
    fixture.away_goals = report.away_goals;
    fixture.went_to_penalties = report.went_to_penalties;
    if report.went_to_penalties {
        fixture.home_penalty = report.home_penalty;
        fixture.away_penalty = report.away_penalty;
    } else {
        fixture.home_penalty = 0;
        fixture.away_penalty = 0;
    }
    fixture.status = FixtureStatus::Finished;
    fixture.updated_at = now;

    Ok(fixture)
}
