//! Staged fixture loading.
//!
//! Seeding runs as a fixed sequence of [`Stage`]s. Each stage waits for the
//! previous one and feeds on the identifiers it produced. Nothing is rolled
//! back on failure: the stages that completed stay applied and are listed in
//! [`SeedProgress`].

use std::fmt;
use std::time::Instant;

use challengr::{
    Database, DocumentStore, MongoStore, StoreConfig, StoreError,
    models::{Challenge, Comment, Entity, Game, League, User, collections},
};
use mongodb::bson::oid::ObjectId;
use thiserror::Error;
use tracing::{info, warn};

use super::ids::{IdMap, SeedIds};
use super::rekey::rekey_invite_keys;
use crate::fixtures::{
    ChallengeFixture, CommentFixture, FixtureSet, GameFixture, LeagueFixture, UserFixture,
};

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to connect to store: {0}")]
    Connection(#[source] StoreError),

    #[error("Failed to clear {collection}: {source}")]
    Deletion {
        collection: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to insert into {collection}: {source}")]
    Insertion {
        collection: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to read back {collection}: {source}")]
    Read {
        collection: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Failed to disconnect: {0}")]
    Disconnect(#[source] StoreError),

    #[error("Referential inconsistency in {collection}: {detail}")]
    ReferentialInconsistency {
        collection: &'static str,
        detail: String,
    },

    #[error("Unknown {kind} reference: {label}")]
    UnknownReference { kind: &'static str, label: String },

    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

impl SeedError {
    pub(crate) fn deletion(collection: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Deletion { collection, source }
    }

    pub(crate) fn insertion(collection: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Insertion { collection, source }
    }

    pub(crate) fn read(collection: &'static str) -> impl FnOnce(StoreError) -> Self {
        move |source| Self::Read { collection, source }
    }
}

/// One step of the seeding sequence, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Delete every document in all five collections.
    Clear,
    Users,
    /// Insert leagues with their members resolved.
    Leagues,
    /// Rewrite each league's invite key to its own id.
    LeagueInviteKeys,
    /// Insert games with private owners resolved.
    Games,
    Challenges,
    Comments,
}

impl Stage {
    pub const ALL: [Stage; 7] = [
        Stage::Clear,
        Stage::Users,
        Stage::Leagues,
        Stage::LeagueInviteKeys,
        Stage::Games,
        Stage::Challenges,
        Stage::Comments,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Clear => "clear",
            Stage::Users => "users",
            Stage::Leagues => "leagues",
            Stage::LeagueInviteKeys => "league_invite_keys",
            Stage::Games => "games",
            Stage::Challenges => "challenges",
            Stage::Comments => "comments",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What has been applied to the store so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedProgress {
    /// Stages that ran to completion, in order.
    pub completed: Vec<Stage>,
    /// Stage that failed, if any. Later stages never ran.
    pub failed: Option<Stage>,
    pub ids: SeedIds,
}

impl SeedProgress {
    pub fn is_complete(&self) -> bool {
        self.completed.len() == Stage::ALL.len()
    }
}

/// Counts reported after a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub leagues: usize,
    pub games: usize,
    pub challenges: usize,
    pub comments: usize,
    pub elapsed_ms: u64,
}

/// Seeds a [`FixtureSet`] into a document store.
pub struct Seeder<S> {
    db: Database<S>,
    progress: SeedProgress,
}

impl<S: DocumentStore> Seeder<S> {
    /// Creates a seeder over an already connected store.
    pub fn new(store: S) -> Self {
        Self {
            db: Database::new(store),
            progress: SeedProgress::default(),
        }
    }

    pub fn database(&self) -> &Database<S> {
        &self.db
    }

    pub fn progress(&self) -> &SeedProgress {
        &self.progress
    }

    /// Validates `fixtures` and then runs every stage in order.
    ///
    /// Stops at the first failing stage and records it in the progress; the
    /// store keeps whatever earlier stages wrote.
    pub async fn run(&mut self, fixtures: &FixtureSet) -> Result<&SeedIds, SeedError> {
        fixtures.validate()?;
        self.progress = SeedProgress::default();

        for stage in Stage::ALL {
            if let Err(e) = self.run_stage(stage, fixtures).await {
                warn!("Seeding stopped at stage {stage}: {e}");
                self.progress.failed = Some(stage);
                return Err(e);
            }
            self.progress.completed.push(stage);
        }

        Ok(&self.progress.ids)
    }

    async fn run_stage(&mut self, stage: Stage, fixtures: &FixtureSet) -> Result<(), SeedError> {
        match stage {
            Stage::Clear => self.clear_all().await,
            Stage::Users => {
                self.progress.ids.users = self.seed_users(&fixtures.users).await?;
                Ok(())
            }
            Stage::Leagues => {
                self.progress.ids.leagues = self
                    .seed_leagues(&fixtures.leagues, &self.progress.ids.users)
                    .await?;
                Ok(())
            }
            Stage::LeagueInviteKeys => {
                rekey_invite_keys(&self.db, self.progress.ids.leagues.ids()).await?;
                info!("Leagues inserted with invite key");
                Ok(())
            }
            Stage::Games => {
                self.progress.ids.games = self
                    .seed_games(&fixtures.games, &self.progress.ids.leagues)
                    .await?;
                Ok(())
            }
            Stage::Challenges => {
                self.progress.ids.challenges = self
                    .seed_challenges(&fixtures.challenges, &self.progress.ids)
                    .await?;
                Ok(())
            }
            Stage::Comments => {
                self.progress.ids.comments = self
                    .seed_comments(&fixtures.comments, &self.progress.ids)
                    .await?;
                Ok(())
            }
        }
    }

    async fn clear<T: Entity>(&self, message: &str) -> Result<(), SeedError> {
        self.db
            .clear::<T>()
            .await
            .map_err(SeedError::deletion(T::COLLECTION))?;
        info!("{message}");
        Ok(())
    }

    /// Empties all five collections.
    pub async fn clear_all(&self) -> Result<(), SeedError> {
        self.clear::<User>("Users deleted").await?;
        self.clear::<League>("Leagues deleted").await?;
        self.clear::<Game>("Games deleted").await?;
        self.clear::<Challenge>("Challenges deleted").await?;
        self.clear::<Comment>("Comments deleted").await?;
        Ok(())
    }

    async fn insert<T: Entity>(&self, items: &[T]) -> Result<Vec<ObjectId>, SeedError> {
        self.db
            .insert_all(items)
            .await
            .map_err(SeedError::insertion(T::COLLECTION))
    }

    pub async fn seed_users(&self, users: &[UserFixture]) -> Result<IdMap, SeedError> {
        let records: Vec<User> = users
            .iter()
            .map(|u| User {
                id: None,
                username: u.username.clone(),
                email: u.email.clone(),
                password: u.password.clone(),
                picture_url: u.picture_url.clone(),
            })
            .collect();

        let ids = self.insert(&records).await?;
        info!("Users created");

        IdMap::from_inserted(
            "user",
            collections::USERS,
            users.iter().map(|u| u.label.as_str()),
            ids,
        )
    }

    pub async fn seed_leagues(
        &self,
        leagues: &[LeagueFixture],
        users: &IdMap,
    ) -> Result<IdMap, SeedError> {
        let records = leagues
            .iter()
            .map(|l| {
                Ok(League {
                    id: None,
                    name: l.name.clone(),
                    members: users.resolve_all(&l.members)?,
                    description: l.description.clone(),
                    invite_key: l.invite_key.clone(),
                    image_url: l.image_url.clone(),
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let ids = self.insert(&records).await?;
        info!("Leagues inserted");

        IdMap::from_inserted(
            "league",
            collections::LEAGUES,
            leagues.iter().map(|l| l.label.as_str()),
            ids,
        )
    }

    pub async fn seed_games(&self, games: &[GameFixture], leagues: &IdMap) -> Result<IdMap, SeedError> {
        let records = games
            .iter()
            .map(|g| {
                Ok(Game {
                    id: None,
                    name: g.name.clone(),
                    description: g.description.clone(),
                    is_private: g.is_private,
                    owner_leagues: leagues.resolve_all(&g.owner_leagues)?,
                    emoji: g.emoji.clone(),
                    image_url: g.image_url.clone(),
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let ids = self.insert(&records).await?;
        info!("Games inserted");

        IdMap::from_inserted(
            "game",
            collections::GAMES,
            games.iter().map(|g| g.label.as_str()),
            ids,
        )
    }

    pub async fn seed_challenges(
        &self,
        challenges: &[ChallengeFixture],
        ids: &SeedIds,
    ) -> Result<IdMap, SeedError> {
        let records = challenges
            .iter()
            .map(|c| {
                Ok(Challenge {
                    id: None,
                    contenders: ids.users.resolve_all(&c.contenders)?,
                    winners: ids.users.resolve_all(&c.winners)?,
                    stake: c.stake,
                    is_completed: c.is_completed,
                    league: ids.leagues.get(&c.league)?,
                    game: ids.games.get(&c.game)?,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let inserted = self.insert(&records).await?;
        info!("Challenges inserted");

        IdMap::from_inserted(
            "challenge",
            collections::CHALLENGES,
            challenges.iter().map(|c| c.label.as_str()),
            inserted,
        )
    }

    pub async fn seed_comments(
        &self,
        comments: &[CommentFixture],
        ids: &SeedIds,
    ) -> Result<IdMap, SeedError> {
        let records = comments
            .iter()
            .map(|c| {
                Ok(Comment {
                    id: None,
                    content: c.content.clone(),
                    rating: c.rating,
                    user: ids.users.get(&c.user)?,
                    challenge: ids.challenges.get(&c.challenge)?,
                })
            })
            .collect::<Result<Vec<_>, SeedError>>()?;

        let inserted = self.insert(&records).await?;
        info!("Comments inserted");

        IdMap::from_inserted(
            "comment",
            collections::COMMENTS,
            comments.iter().map(|c| c.label.as_str()),
            inserted,
        )
    }

    /// Releases the store connection.
    pub async fn disconnect(self) -> Result<SeedProgress, SeedError> {
        self.db.disconnect().await.map_err(SeedError::Disconnect)?;
        info!("DB disconnected");
        Ok(self.progress)
    }
}

/// Opens the MongoDB store described by `config`.
///
/// Any failure here, including a malformed connection string, happens before
/// the store is touched and is reported as [`SeedError::Connection`].
pub async fn connect(config: &StoreConfig) -> Result<MongoStore, SeedError> {
    MongoStore::connect(config)
        .await
        .map_err(SeedError::Connection)
}

/// Seeds `fixtures` into `store` and disconnects.
///
/// On failure the store is left as the completed stages wrote it and the
/// connection is not explicitly closed.
pub async fn seed<S: DocumentStore>(store: S, fixtures: &FixtureSet) -> Result<SeedSummary, SeedError> {
    let start = Instant::now();
    let mut seeder = Seeder::new(store);

    seeder.run(fixtures).await?;
    let progress = seeder.disconnect().await?;

    Ok(SeedSummary {
        users: progress.ids.users.len(),
        leagues: progress.ids.leagues.len(),
        games: progress.ids.games.len(),
        challenges: progress.ids.challenges.len(),
        comments: progress.ids.comments.len(),
        elapsed_ms: start.elapsed().as_millis() as u64,
    })
}
