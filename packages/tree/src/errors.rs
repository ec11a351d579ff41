//! Error types for the content tree

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TreeError {
    #[error("Node not found: {0}")]
    NotFound(String),

    #[error("Reference {0} is not a child of the target container")]
    InvalidReference(String),

    #[error("Unknown node type: {0}")]
    UnknownType(String),

    #[error("Moving {source_id} next to {target_id} would create a cycle")]
    CycleDetected { source_id: String, target_id: String },

    #[error("The root container has no parent")]
    RootHasNoParent,

    #[error("Node {0} is not attached to the tree")]
    Detached(String),

    #[error("Node {0} is already attached")]
    AlreadyAttached(String),

    #[error("Corrupt tree: {0}")]
    Corrupt(String),

    #[error("Invalid payload: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for TreeError {
    fn from(e: serde_json::Error) -> Self {
        TreeError::Payload(e.to_string())
    }
}

pub type TreeResult<T> = Result<T, TreeError>;
