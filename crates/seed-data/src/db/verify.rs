//! Post-seed integrity checks.

use std::collections::{HashMap, HashSet};
use std::fmt;

use challengr::{
    Database, DocumentStore,
    models::{Challenge, Comment, Entity, Game, League, User, collections},
};
use mongodb::bson::oid::ObjectId;

use super::SeedError;

/// A broken relationship found in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityViolation {
    /// A document was read back without an `_id`.
    MissingId { collection: &'static str },
    /// `field` on a document points at nothing.
    DanglingReference {
        collection: &'static str,
        document: Option<ObjectId>,
        field: &'static str,
        target: ObjectId,
    },
    WinnerNotContender {
        challenge: Option<ObjectId>,
        user: ObjectId,
    },
    DuplicateInviteKey { key: String },
    /// The league's invite key is not its own id.
    ForeignInviteKey { league: ObjectId, key: String },
}

impl fmt::Display for IntegrityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingId { collection } => write!(f, "{collection}: document without _id"),
            Self::DanglingReference {
                collection,
                document,
                field,
                target,
            } => write!(
                f,
                "{collection} {}: {field} -> {target} does not exist",
                display_id(document)
            ),
            Self::WinnerNotContender { challenge, user } => {
                write!(
                    f,
                    "challenge {}: winner {user} is not a contender",
                    display_id(challenge)
                )
            }
            Self::DuplicateInviteKey { key } => write!(f, "invite key {key} used by several leagues"),
            Self::ForeignInviteKey { league, key } => {
                write!(f, "league {league}: invite key {key} is not its own id")
            }
        }
    }
}

fn display_id(id: &Option<ObjectId>) -> String {
    id.map_or_else(|| "<no id>".to_string(), |id| id.to_hex())
}

async fn load<S: DocumentStore, T: Entity>(db: &Database<S>) -> Result<Vec<T>, SeedError> {
    db.find_all::<T>().await.map_err(SeedError::read(T::COLLECTION))
}

fn id_set<T: Entity>(items: &[T], violations: &mut Vec<IntegrityViolation>) -> HashSet<ObjectId> {
    let mut ids = HashSet::with_capacity(items.len());
    for item in items {
        match item.id() {
            Some(id) => {
                ids.insert(id);
            }
            None => violations.push(IntegrityViolation::MissingId {
                collection: T::COLLECTION,
            }),
        }
    }
    ids
}

struct Checker<'a> {
    violations: &'a mut Vec<IntegrityViolation>,
}

impl Checker<'_> {
    fn reference(
        &mut self,
        collection: &'static str,
        document: Option<ObjectId>,
        field: &'static str,
        target: ObjectId,
        known: &HashSet<ObjectId>,
    ) {
        if !known.contains(&target) {
            self.violations.push(IntegrityViolation::DanglingReference {
                collection,
                document,
                field,
                target,
            });
        }
    }
}

/// Reads all five collections and reports every broken relationship.
///
/// An empty result means challenge, comment, league and game references all
/// resolve, winners are contenders and invite keys are unique self-ids.
pub async fn verify_store<S: DocumentStore>(
    db: &Database<S>,
) -> Result<Vec<IntegrityViolation>, SeedError> {
    let users: Vec<User> = load(db).await?;
    let leagues: Vec<League> = load(db).await?;
    let games: Vec<Game> = load(db).await?;
    let challenges: Vec<Challenge> = load(db).await?;
    let comments: Vec<Comment> = load(db).await?;

    let mut violations = Vec::new();
    let user_ids = id_set(&users, &mut violations);
    let league_ids = id_set(&leagues, &mut violations);
    let game_ids = id_set(&games, &mut violations);
    let challenge_ids = id_set(&challenges, &mut violations);
    id_set(&comments, &mut violations);

    let mut check = Checker {
        violations: &mut violations,
    };

    let mut key_owners: HashMap<&str, usize> = HashMap::new();
    for league in &leagues {
        for member in &league.members {
            check.reference(collections::LEAGUES, league.id, "members", *member, &user_ids);
        }
        *key_owners.entry(league.invite_key.as_str()).or_default() += 1;
        if let Some(id) = league.id {
            if league.invite_key != id.to_hex() {
                check.violations.push(IntegrityViolation::ForeignInviteKey {
                    league: id,
                    key: league.invite_key.clone(),
                });
            }
        }
    }

    for game in &games {
        for owner in &game.owner_leagues {
            check.reference(collections::GAMES, game.id, "ownerLeagues", *owner, &league_ids);
        }
    }

    for challenge in &challenges {
        let c = collections::CHALLENGES;
        check.reference(c, challenge.id, "league", challenge.league, &league_ids);
        check.reference(c, challenge.id, "game", challenge.game, &game_ids);
        for contender in &challenge.contenders {
            check.reference(c, challenge.id, "contenders", *contender, &user_ids);
        }
        for winner in &challenge.winners {
            check.reference(c, challenge.id, "winners", *winner, &user_ids);
        }
        for stray in challenge.stray_winners() {
            check.violations.push(IntegrityViolation::WinnerNotContender {
                challenge: challenge.id,
                user: *stray,
            });
        }
    }

    for comment in &comments {
        let c = collections::COMMENTS;
        check.reference(c, comment.id, "user", comment.user, &user_ids);
        check.reference(c, comment.id, "challenge", comment.challenge, &challenge_ids);
    }

    let mut duplicates: Vec<_> = key_owners
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(key, _)| IntegrityViolation::DuplicateInviteKey {
            key: key.to_string(),
        })
        .collect();
    duplicates.sort_by(|a, b| a.to_string().cmp(&b.to_string()));
    violations.extend(duplicates);

    Ok(violations)
}
