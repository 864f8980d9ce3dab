use std::collections::HashMap;

use mongodb::bson::oid::ObjectId;

use super::SeedError;

/// Label → store-assigned id, for one kind of record.
///
/// Keeps insertion order so the ids can be compared against what the store
/// returns on a later read or re-insert.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IdMap {
    kind: &'static str,
    order: Vec<ObjectId>,
    by_label: HashMap<String, ObjectId>,
}

impl IdMap {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            ..Default::default()
        }
    }

    /// Pairs the labels of a batch with the ids the store returned for it.
    ///
    /// The two sequences must be the same length; anything else means the
    /// store and the fixtures disagree about what was inserted.
    pub fn from_inserted<'a>(
        kind: &'static str,
        collection: &'static str,
        labels: impl ExactSizeIterator<Item = &'a str>,
        ids: Vec<ObjectId>,
    ) -> Result<Self, SeedError> {
        if labels.len() != ids.len() {
            return Err(SeedError::ReferentialInconsistency {
                collection,
                detail: format!("inserted {} records but got {} ids", labels.len(), ids.len()),
            });
        }

        let by_label = labels
            .zip(ids.iter().copied())
            .map(|(label, id)| (label.to_string(), id))
            .collect();

        Ok(Self {
            kind,
            order: ids,
            by_label,
        })
    }

    pub fn get(&self, label: &str) -> Result<ObjectId, SeedError> {
        self.by_label
            .get(label)
            .copied()
            .ok_or_else(|| SeedError::UnknownReference {
                kind: self.kind,
                label: label.to_string(),
            })
    }

    pub fn resolve_all(&self, labels: &[String]) -> Result<Vec<ObjectId>, SeedError> {
        labels.iter().map(|label| self.get(label)).collect()
    }

    /// Ids in insertion order.
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Identifier maps produced by the seeding stages.
#[derive(Debug, Clone, PartialEq)]
pub struct SeedIds {
    pub users: IdMap,
    pub leagues: IdMap,
    pub games: IdMap,
    pub challenges: IdMap,
    pub comments: IdMap,
}

impl Default for SeedIds {
    fn default() -> Self {
        Self {
            users: IdMap::new("user"),
            leagues: IdMap::new("league"),
            games: IdMap::new("game"),
            challenges: IdMap::new("challenge"),
            comments: IdMap::new("comment"),
        }
    }
}
