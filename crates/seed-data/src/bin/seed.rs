//! Seeds the Challengr demo data into MongoDB.
//!
//! Run with:
//! ```
//! cargo run -p seed-data --bin seed
//! ```
//!
//! The connection string comes from `MONGODB_URI` (a `.env` file is read
//! first) and defaults to `mongodb://localhost/challengr`.

use challengr::{StoreConfig, app::app_title};
use seed_data::db::{SeedError, connect, seed};
use seed_data::fixtures::FixtureSet;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("{}", app_title());

    if let Err(e) = run().await {
        tracing::error!("Seeding failed: {e}");
        return Err(e.into());
    }

    Ok(())
}

async fn run() -> Result<(), SeedError> {
    let config = StoreConfig::from_env()
        .await
        .map_err(SeedError::Connection)?;
    let store = connect(&config).await?;

    let summary = seed(store, &FixtureSet::challengr()).await?;

    // Summary output
    tracing::info!("Seed completed in {} ms", summary.elapsed_ms);
    tracing::info!("  Users: {}", summary.users);
    tracing::info!("  Leagues: {}", summary.leagues);
    tracing::info!("  Games: {}", summary.games);
    tracing::info!("  Challenges: {}", summary.challenges);
    tracing::info!("  Comments: {}", summary.comments);

    Ok(())
}
