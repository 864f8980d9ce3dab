//! Persisted Challengr documents.
//!
//! Relationships are stored as `ObjectId` references only; nothing is
//! embedded. Field names are camelCase on the wire.

use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// A document type stored in its own collection.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync {
    /// Collection the documents live in.
    const COLLECTION: &'static str;

    /// Store-assigned identifier, if the document has been inserted.
    fn id(&self) -> Option<ObjectId>;
}

pub mod collections {
    pub const USERS: &str = "users";
    pub const LEAGUES: &str = "leagues";
    pub const GAMES: &str = "games";
    pub const CHALLENGES: &str = "challenges";
    pub const COMMENTS: &str = "comments";

    /// All collections, in the order they are cleared.
    pub const ALL: [&str; 5] = [USERS, LEAGUES, GAMES, CHALLENGES, COMMENTS];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub username: String,
    pub email: String,
    /// Pre-hashed credential.
    pub password: String,
    pub picture_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct League {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    #[serde(default)]
    pub members: Vec<ObjectId>,
    pub description: String,
    /// Token required to join. Set to the hex form of the league's own id
    /// once the league has been inserted.
    pub invite_key: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    /// Leagues owning a private game. Empty for public games.
    #[serde(default)]
    pub owner_leagues: Vec<ObjectId>,
    pub emoji: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Challenge {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    #[serde(default)]
    pub contenders: Vec<ObjectId>,
    #[serde(default)]
    pub winners: Vec<ObjectId>,
    pub stake: i32,
    pub is_completed: bool,
    pub league: ObjectId,
    pub game: ObjectId,
}

impl Challenge {
    /// Winners that are not among the contenders.
    pub fn stray_winners(&self) -> impl Iterator<Item = &ObjectId> {
        self.winners
            .iter()
            .filter(|w| !self.contenders.contains(w))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none", default)]
    pub id: Option<ObjectId>,
    pub content: String,
    pub rating: i32,
    /// Author.
    pub user: ObjectId,
    pub challenge: ObjectId,
}

macro_rules! impl_entity {
    ($ty:ty, $collection:expr) => {
        impl Entity for $ty {
            const COLLECTION: &'static str = $collection;

            fn id(&self) -> Option<ObjectId> {
                self.id
            }
        }
    };
}

impl_entity!(User, collections::USERS);
impl_entity!(League, collections::LEAGUES);
impl_entity!(Game, collections::GAMES);
impl_entity!(Challenge, collections::CHALLENGES);
impl_entity!(Comment, collections::COMMENTS);

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::{self, Bson};

    fn league() -> League {
        League {
            id: None,
            name: "Clash of clans".to_string(),
            members: vec![ObjectId::new()],
            description: "Only one will survive !".to_string(),
            invite_key: "1234".to_string(),
            image_url: "http://example.com/clans.png".to_string(),
        }
    }

    #[test]
    fn test_camel_case_field_names() {
        let doc = bson::to_document(&league()).unwrap();
        assert!(doc.contains_key("inviteKey"));
        assert!(doc.contains_key("imageUrl"));
        assert!(!doc.contains_key("invite_key"));

        let json = serde_json::to_value(Game {
            id: None,
            name: "Torse pong".to_string(),
            description: String::new(),
            is_private: true,
            owner_leagues: Vec::new(),
            emoji: "🫁".to_string(),
            image_url: String::new(),
        })
        .unwrap();
        assert_eq!(json["isPrivate"], true);
        assert!(json.get("ownerLeagues").is_some());
    }

    #[test]
    fn test_id_omitted_until_assigned() {
        let mut league = league();
        let doc = bson::to_document(&league).unwrap();
        assert!(!doc.contains_key("_id"));

        let id = ObjectId::new();
        league.id = Some(id);
        let doc = bson::to_document(&league).unwrap();
        assert_eq!(doc.get("_id"), Some(&Bson::ObjectId(id)));

        let back: League = bson::from_document(doc).unwrap();
        assert_eq!(back, league);
    }

    #[test]
    fn test_missing_owner_leagues_defaults_empty() {
        let doc = bson::doc! {
            "name": "Beer pong",
            "description": "Le jeu du beerpong, classique",
            "isPrivate": false,
            "emoji": "🍻",
            "imageUrl": "",
        };
        let game: Game = bson::from_document(doc).unwrap();
        assert!(game.owner_leagues.is_empty());
        assert!(game.id.is_none());
    }

    #[test]
    fn test_stray_winners() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let outsider = ObjectId::new();
        let challenge = Challenge {
            id: None,
            contenders: vec![a, b],
            winners: vec![b, outsider],
            stake: 10,
            is_completed: true,
            league: ObjectId::new(),
            game: ObjectId::new(),
        };
        let stray: Vec<_> = challenge.stray_winners().collect();
        assert_eq!(stray, vec![&outsider]);
    }
}
