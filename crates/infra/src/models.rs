use crate::repos::fixtures::FixtureStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionRow {
    pub id: Uuid,
    pub code: String,
    pub owner_id: Uuid,
    pub kind: String,
    pub title: String,
    pub description: Option<String>,
    pub icon_url: Option<String>,
    pub team_filter: serde_json::Value, // JSONB field
    pub t_format: Option<String>,
    pub min_players: i32,
    pub max_players: i32,
    pub join_token: Uuid,
    pub started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct SessionPlayerRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub display_name: String,
    pub user_id: Option<Uuid>,
    pub team_id: Option<i32>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct TeamRow {
    pub id: i32,
    pub name: String,
    pub short_name: String,
    pub icon_url: Option<String>,
    pub country: String,
    pub stars: i16,
}

#[derive(Debug, Clone, FromRow)]
pub struct FixtureRow {
    pub id: Uuid,
    pub session_id: Uuid,
    pub round_name: String,
    pub leg: i32,
    pub position: i32,
    pub status: FixtureStatus,
    pub home_player_id: Uuid,
    pub away_player_id: Uuid,
    pub home_team_id: i32,
    pub away_team_id: i32,
    pub home_goals: i32,
    pub away_goals: i32,
    pub went_penalties: bool,
    pub home_pen: i32,
    pub away_pen: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
