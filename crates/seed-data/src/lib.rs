//! Fixture loading for Challengr.
//!
//! Brings a document store from any prior state to the known demo state:
//! all five collections cleared, then users, leagues, games, challenges and
//! comments inserted in dependency order with their references resolved to
//! the ids the store assigned.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use seed_data::prelude::*;
//!
//! let config = StoreConfig::from_env().await.map_err(SeedError::Connection)?;
//! let store = connect(&config).await?;
//! let summary = seed(store, &FixtureSet::challengr()).await?;
//! ```

pub mod db;
pub mod fixtures;

pub mod prelude {
    //! Convenient re-exports for common usage.

    pub use crate::db::{
        IdMap, IntegrityViolation, SeedError, SeedIds, SeedProgress, SeedSummary, Seeder, Stage,
        connect, seed, verify_store,
    };
    pub use crate::fixtures::FixtureSet;
    pub use challengr::{Database, DocumentStore, MemoryStore, MongoStore, StoreConfig};
}
