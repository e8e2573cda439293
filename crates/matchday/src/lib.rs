//! Session, team-assignment and fixture core of the match organizer.
//!
//! The pure algorithms live in [`assignment`], [`schedule`], [`scoring`] and
//! [`standings`]. [`services::MatchService`] runs them against a
//! [`store::SessionStore`] on behalf of an authenticated caller.

pub mod assignment;
pub mod config;
pub mod domain;
pub mod error;
pub mod identity;
pub mod schedule;
pub mod scoring;
pub mod services;
pub mod standings;
pub mod store;
pub mod telemetry;

pub use error::{DomainError, ServiceError, ValidationError};
pub use identity::IdentityProvider;
pub use services::MatchService;
pub use store::{MemoryStore, PgStore, SessionStore, StoreError};
