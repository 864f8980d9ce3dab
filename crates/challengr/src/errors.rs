use mongodb::bson;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] bson::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] bson::de::Error),

    #[error("Store assigned a non-ObjectId identifier in {collection}")]
    UnexpectedId { collection: String },

    #[error("Duplicate _id {id} in {collection}")]
    DuplicateId { collection: String, id: String },

    #[error("Store is disconnected")]
    Disconnected,

    #[error("Simulated {operation} failure on {collection}")]
    Fault {
        operation: Operation,
        collection: String,
    },
}

/// Store primitive an error or fault relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Delete,
    Insert,
    Find,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Operation::Delete => "delete",
            Operation::Insert => "insert",
            Operation::Find => "find",
        };
        f.write_str(s)
    }
}
