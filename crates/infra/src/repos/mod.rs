pub mod fixtures;
pub mod session_players;
pub mod sessions;
pub mod teams;

pub use fixtures::{CreateFixture, FixtureStatus, UpdateFixtureScore};
pub use session_players::CreateSessionPlayer;
pub use sessions::CreateSession;
pub use teams::TeamQuery;
