pub mod app;
pub mod config;
pub mod database;
pub mod errors;
pub mod models;
pub mod store;

pub use config::StoreConfig;
pub use database::Database;
pub use errors::StoreError;
pub use store::{DocumentStore, MemoryStore, MongoStore};
