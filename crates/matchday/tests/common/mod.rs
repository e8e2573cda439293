#![allow(dead_code)]

use std::collections::HashMap;

use matchday::domain::{Assignment, Participant, SessionKind, TeamFilter, TeamRef, TournamentFormat};
use matchday::identity::IdentityProvider;
use matchday::services::CreateSessionInput;
use matchday::{MatchService, MemoryStore};
use rand::rngs::StdRng;
use rand::SeedableRng;
use uuid::Uuid;

pub const HOST_TOKEN: &str = "host-token";
pub const GUEST_TOKEN: &str = "guest-token";
pub const BASE_URL: &str = "https://matchday.test";

pub fn seeded_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

pub fn team(id: i32, country: &str, stars: i16) -> TeamRef {
    TeamRef {
        id,
        name: format!("Team {id}"),
        short_name: format!("T{id}"),
        icon_url: None,
        country: country.to_string(),
        stars,
    }
}

/// Eight teams across three countries and every star rating.
pub fn catalog() -> Vec<TeamRef> {
    vec![
        team(1, "ES", 5),
        team(2, "ES", 4),
        team(3, "EN", 5),
        team(4, "EN", 3),
        team(5, "IT", 2),
        team(6, "IT", 1),
        team(7, "ES", 3),
        team(8, "EN", 4),
    ]
}

pub fn participant(name: &str) -> Participant {
    Participant {
        id: Uuid::new_v4(),
        display_name: name.to_string(),
        user_id: None,
        team_id: None,
    }
}

pub fn participants(n: usize) -> Vec<Participant> {
    (1..=n).map(|i| participant(&format!("Player {i}"))).collect()
}

/// `n` assignments with team ids `1..=n`.
pub fn assignments(n: usize) -> Vec<Assignment> {
    (1..=n)
        .map(|i| Assignment {
            participant_id: Uuid::new_v4(),
            team_id: i as i32,
        })
        .collect()
}

/// Maps fixed tokens to user ids.
#[derive(Debug, Clone, Default)]
pub struct StaticIdentity {
    tokens: HashMap<String, Uuid>,
}

impl StaticIdentity {
    pub fn with(mut self, token: &str, user_id: Uuid) -> Self {
        self.tokens.insert(token.to_string(), user_id);
        self
    }
}

impl IdentityProvider for StaticIdentity {
    async fn resolve_caller(&self, credential: &str) -> Option<Uuid> {
        self.tokens.get(credential).copied()
    }
}

pub type TestService = MatchService<MemoryStore, StaticIdentity>;

pub struct TestContext {
    pub service: TestService,
    pub host_id: Uuid,
    pub guest_id: Uuid,
}

pub fn setup_service() -> TestContext {
    let host_id = Uuid::new_v4();
    let guest_id = Uuid::new_v4();
    let identity = StaticIdentity::default()
        .with(HOST_TOKEN, host_id)
        .with(GUEST_TOKEN, guest_id);

    TestContext {
        service: MatchService::new(MemoryStore::with_teams(catalog()), identity)
            .with_base_url(BASE_URL),
        host_id,
        guest_id,
    }
}

pub fn host() -> Option<&'static str> {
    Some(HOST_TOKEN)
}

pub fn guest() -> Option<&'static str> {
    Some(GUEST_TOKEN)
}

/// Create a session owned by the host and return its code.
pub async fn create_session(
    ctx: &TestContext,
    kind: SessionKind,
    format: Option<TournamentFormat>,
    filter: Option<TeamFilter>,
) -> String {
    let mut input = CreateSessionInput::new(kind, "Friday night");
    input.format = format;
    input.team_filter = filter;

    ctx.service
        .create_session(host(), input, &mut rand::rng())
        .await
        .expect("Failed to create session")
        .code
}

/// Seat `n` guests next to the host.
pub async fn seat_guests(ctx: &TestContext, code: &str, n: usize) -> Vec<Participant> {
    let mut seated = Vec::with_capacity(n);
    for i in 1..=n {
        let player = ctx
            .service
            .join_session(code, &format!("Guest {i}"))
            .await
            .expect("Failed to join session");
        seated.push(player);
    }
    seated
}
