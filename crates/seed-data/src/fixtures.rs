//! Literal demo data for Challengr.
//!
//! Records point at each other by label instead of by position, so the
//! loader can resolve references through identifier maps once the
//! referenced records have been inserted. Serialized field names are
//! camelCase, matching the stored documents.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::db::SeedError;

/// Highest rating a comment may carry.
pub const MAX_RATING: i32 = 5;

/// bcrypt hash of the demo password `password`.
const DEMO_PASSWORD_HASH: &str = "$2b$10$HaYr5pczWlGBayK1XxoYpuJoarEHbmmc3S6/k.T5/JtR8Jh2Fsh3W";

/// Invite key every league starts with before it is re-keyed to its own id.
pub const PLACEHOLDER_INVITE_KEY: &str = "1234";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFixture {
    pub label: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub picture_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeagueFixture {
    pub label: String,
    pub name: String,
    /// User labels.
    pub members: Vec<String>,
    pub description: String,
    pub invite_key: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameFixture {
    pub label: String,
    pub name: String,
    pub description: String,
    pub is_private: bool,
    /// League labels. Only allowed on private games.
    #[serde(default)]
    pub owner_leagues: Vec<String>,
    pub emoji: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeFixture {
    pub label: String,
    /// User labels.
    pub contenders: Vec<String>,
    /// User labels, each also listed in `contenders`.
    #[serde(default)]
    pub winners: Vec<String>,
    pub stake: i32,
    pub is_completed: bool,
    pub league: String,
    pub game: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentFixture {
    pub label: String,
    pub content: String,
    pub rating: i32,
    pub user: String,
    pub challenge: String,
}

/// A complete, self-contained set of records to seed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FixtureSet {
    pub users: Vec<UserFixture>,
    pub leagues: Vec<LeagueFixture>,
    pub games: Vec<GameFixture>,
    pub challenges: Vec<ChallengeFixture>,
    pub comments: Vec<CommentFixture>,
}

fn labels(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn user(label: &str, picture: &str) -> UserFixture {
    UserFixture {
        label: label.to_string(),
        username: label.to_string(),
        email: format!("{label}@gmail.com"),
        password: DEMO_PASSWORD_HASH.to_string(),
        picture_url: format!(
            "http://res.cloudinary.com/dwfrbljbo/image/upload/ar_1.0,c_thumb,g_face,w_0.6,z_0.7/r_max/co_black,e_outline/v1/challengr/{picture}"
        ),
    }
}

fn league(label: &str, name: &str, members: &[&str], description: &str, image: &str) -> LeagueFixture {
    LeagueFixture {
        label: label.to_string(),
        name: name.to_string(),
        members: labels(members),
        description: description.to_string(),
        invite_key: PLACEHOLDER_INVITE_KEY.to_string(),
        image_url: format!(
            "http://res.cloudinary.com/dwfrbljbo/image/upload/c_fill,g_faces,h_500,w_500/v1/challengr/{image}"
        ),
    }
}

fn challenge(
    label: &str,
    contenders: &[&str],
    winners: &[&str],
    stake: i32,
    league: &str,
    game: &str,
) -> ChallengeFixture {
    ChallengeFixture {
        label: label.to_string(),
        contenders: labels(contenders),
        winners: labels(winners),
        stake,
        is_completed: !winners.is_empty(),
        league: league.to_string(),
        game: game.to_string(),
    }
}

fn comment(label: &str, content: &str, rating: i32, user: &str, challenge: &str) -> CommentFixture {
    CommentFixture {
        label: label.to_string(),
        content: content.to_string(),
        rating,
        user: user.to_string(),
        challenge: challenge.to_string(),
    }
}

impl FixtureSet {
    /// The Challengr demo data: 3 users, 2 leagues, 4 games, 6 challenges
    /// and 4 comments.
    pub fn challengr() -> Self {
        let users = vec![
            user("alexandre", "kmynmzlrmkc5ifecqtvx"),
            user("anh", "fzfv6acsgpi2ab07byb8"),
            user("brian", "yv9jpxk7ltepsrd5pkdp"),
        ];

        let leagues = vec![
            league(
                "titans",
                "Clash of titans",
                &["alexandre", "anh", "brian"],
                "Long live Eldians !",
                "sp9x47jts5sb8bgwwiky",
            ),
            league(
                "clans",
                "Clash of clans",
                &["alexandre", "anh"],
                "Only one will survive !",
                "obvoe2bmigjhkhz9uipn",
            ),
        ];

        let games = vec![
            GameFixture {
                label: "beer-pong".to_string(),
                name: "Beer pong".to_string(),
                description: "Le jeu du beerpong, classique".to_string(),
                is_private: false,
                owner_leagues: Vec::new(),
                emoji: "🍻".to_string(),
                image_url: "https://www.jeux-alcool.com/wp-content/uploads/2017/03/beerPong.jpeg"
                    .to_string(),
            },
            GameFixture {
                label: "torse-pong".to_string(),
                name: "Torse pong".to_string(),
                description: "Utilise ton torse pour mettre la balle dans le gobelet".to_string(),
                is_private: true,
                owner_leagues: labels(&["clans"]),
                emoji: "🫁".to_string(),
                image_url: "https://i0.wp.com/godrunkyourself.com/wp-content/uploads/2020/04/AdobeStock_137721763-1-1440x960.jpeg".to_string(),
            },
            GameFixture {
                label: "bird-box".to_string(),
                name: "Bird box challenge".to_string(),
                description: "Ce défi est tiré du film Bird Box sorti le 21 décembre 201880. Il consiste, comme dans le film, à se déplacer les yeux bandés d'un point A à un point B".to_string(),
                is_private: false,
                owner_leagues: Vec::new(),
                emoji: "😝".to_string(),
                image_url: "https://d1fmx1rbmqrxrr.cloudfront.net/cnet/i/edit/2019/01/birdbox-netflix-big.jpg".to_string(),
            },
            GameFixture {
                label: "rock-scissors-paper".to_string(),
                name: "Rock Scissors Paper".to_string(),
                description: "The classic one".to_string(),
                is_private: false,
                owner_leagues: Vec::new(),
                emoji: "⚔️".to_string(),
                image_url: "https://cdn-europe1.lanmedia.fr/var/europe1/storage/images/europe1/international/la-recette-pour-gagner-a-pierre-feuille-ciseaux-768904/15409112-1-fre-FR/La-recette-pour-gagner-a-pierre-feuille-ciseaux.jpg".to_string(),
            },
        ];

        let challenges = vec![
            challenge(
                "titans-beer-pong-1",
                &["alexandre", "anh", "brian"],
                &["anh"],
                40,
                "titans",
                "beer-pong",
            ),
            challenge(
                "clans-torse-pong-1",
                &["alexandre", "anh"],
                &["anh"],
                30,
                "clans",
                "torse-pong",
            ),
            challenge(
                "titans-beer-pong-2",
                &["alexandre", "anh", "brian"],
                &["alexandre"],
                20,
                "titans",
                "beer-pong",
            ),
            challenge(
                "clans-torse-pong-2",
                &["alexandre", "anh"],
                &["alexandre"],
                15,
                "clans",
                "torse-pong",
            ),
            challenge(
                "titans-beer-pong-open",
                &["alexandre", "anh", "brian"],
                &[],
                22,
                "titans",
                "beer-pong",
            ),
            challenge(
                "clans-torse-pong-open",
                &["alexandre", "anh"],
                &[],
                30,
                "clans",
                "torse-pong",
            ),
        ];

        let comments = vec![
            comment(
                "never-lose",
                "Awesome ! I'll never lose at this game !",
                5,
                "alexandre",
                "titans-beer-pong-1",
            ),
            comment(
                "suck-at-beerpong",
                "Damned ! I suck at beerpong !",
                2,
                "anh",
                "titans-beer-pong-1",
            ),
            comment(
                "intense",
                "Oh yeah ! This game was intense",
                4,
                "alexandre",
                "clans-torse-pong-1",
            ),
            comment(
                "again-soon",
                "Let's do this again soon",
                5,
                "alexandre",
                "titans-beer-pong-2",
            ),
        ];

        Self {
            users,
            leagues,
            games,
            challenges,
            comments,
        }
    }

    /// Checks the set is internally consistent before anything touches the
    /// store: labels are unique, every reference resolves, winners are
    /// contenders, stakes are positive, ratings are in range and only
    /// private games have owners.
    pub fn validate(&self) -> Result<(), SeedError> {
        let users = unique_labels("user", self.users.iter().map(|u| u.label.as_str()))?;
        let leagues = unique_labels("league", self.leagues.iter().map(|l| l.label.as_str()))?;
        let games = unique_labels("game", self.games.iter().map(|g| g.label.as_str()))?;
        let challenges = unique_labels(
            "challenge",
            self.challenges.iter().map(|c| c.label.as_str()),
        )?;
        unique_labels("comment", self.comments.iter().map(|c| c.label.as_str()))?;

        for league in &self.leagues {
            for member in &league.members {
                ensure_known("user", &users, member)?;
            }
        }

        for game in &self.games {
            if !game.is_private && !game.owner_leagues.is_empty() {
                return Err(SeedError::InvalidFixture(format!(
                    "public game '{}' has owner leagues",
                    game.label
                )));
            }
            for owner in &game.owner_leagues {
                ensure_known("league", &leagues, owner)?;
            }
        }

        for challenge in &self.challenges {
            for contender in &challenge.contenders {
                ensure_known("user", &users, contender)?;
            }
            for winner in &challenge.winners {
                ensure_known("user", &users, winner)?;
                if !challenge.contenders.contains(winner) {
                    return Err(SeedError::InvalidFixture(format!(
                        "challenge '{}': winner '{}' is not a contender",
                        challenge.label, winner
                    )));
                }
            }
            if challenge.stake <= 0 {
                return Err(SeedError::InvalidFixture(format!(
                    "challenge '{}' has non-positive stake {}",
                    challenge.label, challenge.stake
                )));
            }
            ensure_known("league", &leagues, &challenge.league)?;
            ensure_known("game", &games, &challenge.game)?;
        }

        for comment in &self.comments {
            if !(0..=MAX_RATING).contains(&comment.rating) {
                return Err(SeedError::InvalidFixture(format!(
                    "comment '{}' has rating {} outside 0..={MAX_RATING}",
                    comment.label, comment.rating
                )));
            }
            ensure_known("user", &users, &comment.user)?;
            ensure_known("challenge", &challenges, &comment.challenge)?;
        }

        Ok(())
    }
}

fn unique_labels<'a>(
    kind: &'static str,
    labels: impl Iterator<Item = &'a str>,
) -> Result<HashSet<&'a str>, SeedError> {
    let mut seen = HashSet::new();
    for label in labels {
        if !seen.insert(label) {
            return Err(SeedError::InvalidFixture(format!(
                "duplicate {kind} label '{label}'"
            )));
        }
    }
    Ok(seen)
}

fn ensure_known(kind: &'static str, known: &HashSet<&str>, label: &str) -> Result<(), SeedError> {
    if known.contains(label) {
        Ok(())
    } else {
        Err(SeedError::UnknownReference {
            kind,
            label: label.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challengr_fixture_counts() {
        let fixtures = FixtureSet::challengr();
        assert_eq!(fixtures.users.len(), 3);
        assert_eq!(fixtures.leagues.len(), 2);
        assert_eq!(fixtures.games.len(), 4);
        assert_eq!(fixtures.challenges.len(), 6);
        assert_eq!(fixtures.comments.len(), 4);
        assert!(fixtures.validate().is_ok());
    }

    #[test]
    fn test_completed_challenges_have_winners() {
        let fixtures = FixtureSet::challengr();
        for c in &fixtures.challenges {
            assert_eq!(c.is_completed, !c.winners.is_empty(), "{}", c.label);
        }
        let completed = fixtures.challenges.iter().filter(|c| c.is_completed).count();
        assert_eq!(completed, 4);
    }

    #[test]
    fn test_only_private_games_have_owners() {
        let fixtures = FixtureSet::challengr();
        for game in &fixtures.games {
            assert_eq!(game.is_private, !game.owner_leagues.is_empty(), "{}", game.label);
        }
    }

    #[test]
    fn test_winner_must_be_contender() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.challenges[1].winners = labels(&["brian"]);

        let err = fixtures.validate().unwrap_err();
        assert!(matches!(err, SeedError::InvalidFixture(msg) if msg.contains("not a contender")));
    }

    #[test]
    fn test_unknown_reference() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.comments[0].challenge = "no-such-challenge".to_string();

        match fixtures.validate() {
            Err(SeedError::UnknownReference { kind, label }) => {
                assert_eq!(kind, "challenge");
                assert_eq!(label, "no-such-challenge");
            }
            other => panic!("expected unknown reference, got {other:?}"),
        }
    }

    #[test]
    fn test_duplicate_label() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.games[3].label = "beer-pong".to_string();
        assert!(matches!(
            fixtures.validate(),
            Err(SeedError::InvalidFixture(msg)) if msg.contains("duplicate game label")
        ));
    }

    #[test]
    fn test_completion_is_not_tied_to_winners() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.challenges[0].is_completed = false;
        assert!(fixtures.validate().is_ok());

        let mut fixtures = FixtureSet::challengr();
        fixtures.challenges[4].is_completed = true;
        assert!(fixtures.validate().is_ok());
    }

    #[test]
    fn test_rating_and_stake_bounds() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.comments[2].rating = 6;
        assert!(fixtures.validate().is_err());

        let mut fixtures = FixtureSet::challengr();
        fixtures.challenges[3].stake = 0;
        assert!(fixtures.validate().is_err());
    }

    #[test]
    fn test_public_game_with_owner_rejected() {
        let mut fixtures = FixtureSet::challengr();
        fixtures.games[0].owner_leagues = labels(&["titans"]);
        assert!(fixtures.validate().is_err());
    }

    #[test]
    fn test_fixture_set_from_json() {
        let json = r#"{
            "users": [
                {"label": "kim", "username": "kim", "email": "kim@example.com",
                 "password": "hash", "pictureUrl": ""}
            ],
            "leagues": [
                {"label": "solo", "name": "Solo", "members": ["kim"], "description": "",
                 "inviteKey": "1234", "imageUrl": ""}
            ],
            "games": [
                {"label": "darts", "name": "Darts", "description": "", "isPrivate": false,
                 "emoji": "🎯", "imageUrl": ""}
            ],
            "challenges": [
                {"label": "practice", "contenders": ["kim"], "stake": 1,
                 "isCompleted": false, "league": "solo", "game": "darts"}
            ],
            "comments": []
        }"#;

        let fixtures: FixtureSet = serde_json::from_str(json).unwrap();
        assert!(fixtures.games[0].owner_leagues.is_empty());
        assert!(fixtures.challenges[0].winners.is_empty());
        assert!(fixtures.validate().is_ok());

        let value = serde_json::to_value(&fixtures.leagues[0]).unwrap();
        assert_eq!(value["inviteKey"], "1234");
        assert!(value.get("invite_key").is_none());
    }
}
