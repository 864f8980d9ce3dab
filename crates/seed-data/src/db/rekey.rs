//! Two-phase invite key assignment.
//!
//! A league's invite key is its own id, which only exists once the league has
//! been inserted. So: insert, read the leagues back, patch the key, clear the
//! collection and insert the patched records again under the same ids.

use std::collections::HashMap;

use challengr::{Database, DocumentStore, models::League, models::collections};
use mongodb::bson::oid::ObjectId;

use super::SeedError;

/// Orders read-back leagues to match `inserted`.
///
/// Fails when the read-back holds a different number of leagues, a league
/// without an id, or ids that were not part of the insert.
pub fn match_inserted(fetched: Vec<League>, inserted: &[ObjectId]) -> Result<Vec<League>, SeedError> {
    let inconsistent = |detail: String| SeedError::ReferentialInconsistency {
        collection: collections::LEAGUES,
        detail,
    };

    if fetched.len() != inserted.len() {
        return Err(inconsistent(format!(
            "read back {} leagues, inserted {}",
            fetched.len(),
            inserted.len()
        )));
    }

    let mut by_id = HashMap::with_capacity(fetched.len());
    for league in fetched {
        let id = league
            .id
            .ok_or_else(|| inconsistent(format!("league '{}' read back without an id", league.name)))?;
        by_id.insert(id, league);
    }

    inserted
        .iter()
        .map(|id| {
            by_id
                .remove(id)
                .ok_or_else(|| inconsistent(format!("league {id} missing from read-back")))
        })
        .collect()
}

/// Rewrites every league's invite key to its own id.
///
/// `inserted` are the league ids in fixture order. Returns the re-inserted
/// leagues in the same order.
pub async fn rekey_invite_keys<S: DocumentStore>(
    db: &Database<S>,
    inserted: &[ObjectId],
) -> Result<Vec<League>, SeedError> {
    let fetched: Vec<League> = db
        .find_all()
        .await
        .map_err(SeedError::read(collections::LEAGUES))?;

    let leagues: Vec<League> = match_inserted(fetched, inserted)?
        .into_iter()
        .map(|mut league| {
            if let Some(id) = league.id {
                league.invite_key = id.to_hex();
            }
            league
        })
        .collect();

    db.clear::<League>()
        .await
        .map_err(SeedError::deletion(collections::LEAGUES))?;

    let reinserted = db
        .insert_all(&leagues)
        .await
        .map_err(SeedError::insertion(collections::LEAGUES))?;

    if reinserted != inserted {
        return Err(SeedError::ReferentialInconsistency {
            collection: collections::LEAGUES,
            detail: "re-inserted leagues came back with different ids".to_string(),
        });
    }

    Ok(leagues)
}

#[cfg(test)]
mod tests {
    use super::*;
    use challengr::MemoryStore;
    use challengr::errors::Operation;

    fn league(name: &str) -> League {
        League {
            id: None,
            name: name.to_string(),
            members: Vec::new(),
            description: String::new(),
            invite_key: "1234".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_match_inserted_reorders_by_id() {
        let a = ObjectId::new();
        let b = ObjectId::new();
        let fetched = vec![
            League { id: Some(b), ..league("b") },
            League { id: Some(a), ..league("a") },
        ];

        let ordered = match_inserted(fetched, &[a, b]).unwrap();
        assert_eq!(ordered[0].name, "a");
        assert_eq!(ordered[1].name, "b");
    }

    #[test]
    fn test_match_inserted_count_mismatch() {
        let a = ObjectId::new();
        let fetched = vec![League { id: Some(a), ..league("a") }];
        let err = match_inserted(fetched, &[a, ObjectId::new()]).unwrap_err();
        assert!(matches!(err, SeedError::ReferentialInconsistency { .. }));
    }

    #[test]
    fn test_match_inserted_foreign_id() {
        let fetched = vec![League {
            id: Some(ObjectId::new()),
            ..league("stranger")
        }];
        let err = match_inserted(fetched, &[ObjectId::new()]).unwrap_err();
        assert!(err.to_string().contains("missing from read-back"));
    }

    #[tokio::test]
    async fn test_rekey_sets_invite_key_to_own_id() {
        let db = Database::new(MemoryStore::new());
        let ids = db
            .insert_all(&[league("titans"), league("clans")])
            .await
            .unwrap();

        let leagues = rekey_invite_keys(&db, &ids).await.unwrap();
        assert_eq!(leagues.len(), 2);

        let stored: Vec<League> = db.find_all().await.unwrap();
        assert_eq!(stored.len(), 2);
        for (league, id) in stored.iter().zip(&ids) {
            assert_eq!(league.id, Some(*id));
            assert_eq!(league.invite_key, id.to_hex());
        }
        assert_ne!(stored[0].invite_key, stored[1].invite_key);
    }

    #[tokio::test]
    async fn test_rekey_detects_extra_league() {
        let db = Database::new(MemoryStore::new());
        let ids = db.insert_all(&[league("titans")]).await.unwrap();
        db.insert_all(&[league("intruder")]).await.unwrap();

        let err = rekey_invite_keys(&db, &ids).await.unwrap_err();
        assert!(matches!(err, SeedError::ReferentialInconsistency { .. }));

        // Nothing was cleared.
        assert_eq!(db.store().count("leagues").await, 2);
    }

    #[tokio::test]
    async fn test_rekey_read_failure() {
        let db = Database::new(MemoryStore::new());
        let ids = db.insert_all(&[league("titans")]).await.unwrap();
        db.store().inject_fault(Operation::Find, "leagues").await;

        let err = rekey_invite_keys(&db, &ids).await.unwrap_err();
        assert!(matches!(err, SeedError::Read { collection: "leagues", .. }));
    }
}
