//! Database integration for seeding fixture data.
//!
//! The [`Seeder`] runs the seeding stages in dependency order against any
//! [`challengr::DocumentStore`], keeping the identifiers each stage produces
//! so later stages can resolve their references.

mod ids;
mod rekey;
mod seeder;
mod verify;

pub use ids::{IdMap, SeedIds};
pub use rekey::{match_inserted, rekey_invite_keys};
pub use seeder::{SeedError, SeedProgress, SeedSummary, Seeder, Stage, connect, seed};
pub use verify::{IntegrityViolation, verify_store};
