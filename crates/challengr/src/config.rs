//! Store connection configuration.

use std::env;

use mongodb::options::ClientOptions;
use tracing::info;

use crate::app::APP_NAME;
use crate::errors::StoreError;

/// Environment variable holding the MongoDB connection string.
pub const MONGODB_URI_VAR: &str = "MONGODB_URI";

/// Connection string used when `MONGODB_URI` is not set.
pub const DEFAULT_MONGODB_URI: &str = "mongodb://localhost/challengr";

/// Where the document store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Full connection string.
    pub uri: String,
    /// Database selected on connect.
    pub database: String,
}

impl StoreConfig {
    /// Reads the connection string from the environment, falling back to the
    /// local default.
    pub async fn from_env() -> Result<Self, StoreError> {
        Self::from_uri(env::var(MONGODB_URI_VAR).ok()).await
    }

    /// Builds a config from an optional connection string.
    ///
    /// Blank values count as unset. The database name is the one the driver
    /// reads from the URI, otherwise the application name. Fails when the
    /// connection string does not parse.
    pub async fn from_uri(uri: Option<String>) -> Result<Self, StoreError> {
        let uri = match uri.map(|u| u.trim().to_string()) {
            Some(u) if !u.is_empty() => u,
            _ => {
                info!("{MONGODB_URI_VAR} not set, using default: {DEFAULT_MONGODB_URI}");
                DEFAULT_MONGODB_URI.to_string()
            }
        };

        let options = ClientOptions::parse(&uri).await?;
        let database = options.default_database.unwrap_or_else(|| {
            info!("No database in connection string, using {APP_NAME}");
            APP_NAME.to_string()
        });

        Ok(Self { uri, database })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_uri() {
        let config = StoreConfig::from_uri(None).await.unwrap();
        assert_eq!(config.uri, DEFAULT_MONGODB_URI);
        assert_eq!(config.database, "challengr");
    }

    #[tokio::test]
    async fn test_blank_uri_falls_back() {
        let config = StoreConfig::from_uri(Some("   ".to_string())).await.unwrap();
        assert_eq!(config.uri, DEFAULT_MONGODB_URI);
    }

    #[tokio::test]
    async fn test_database_from_path() {
        let config = StoreConfig::from_uri(Some(
            "mongodb://user:pw@db.example:27017/leagues?retryWrites=true".to_string(),
        ))
        .await
        .unwrap();
        assert_eq!(config.database, "leagues");
    }

    #[tokio::test]
    async fn test_percent_encoded_database_matches_driver() {
        let uri = "mongodb://localhost/chal%6Cengr".to_string();
        let config = StoreConfig::from_uri(Some(uri.clone())).await.unwrap();
        let driver = ClientOptions::parse(&uri).await.unwrap();

        assert_eq!(config.database, "challengr");
        assert_eq!(Some(config.database), driver.default_database);
    }

    #[tokio::test]
    async fn test_database_defaults_to_app_name() {
        let config = StoreConfig::from_uri(Some("mongodb://localhost:27017/?w=majority".to_string()))
            .await
            .unwrap();
        assert_eq!(config.database, APP_NAME);

        let config = StoreConfig::from_uri(Some("mongodb://localhost:27017".to_string()))
            .await
            .unwrap();
        assert_eq!(config.database, APP_NAME);
    }

    #[tokio::test]
    async fn test_malformed_uri_is_rejected() {
        let err = StoreConfig::from_uri(Some("not-a-uri".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Database(_)));
    }
}
