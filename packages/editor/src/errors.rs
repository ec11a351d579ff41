//! Error types for the editor

use folio_tree::TreeError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("No node is selected")]
    NoSelection,

    #[error("Cannot {0} the root container")]
    RootNotAllowed(&'static str),
}

impl EditorError {
    /// Whether the failure is an unresolved identity
    pub fn is_not_found(&self) -> bool {
        matches!(self, EditorError::Tree(TreeError::NotFound(_)))
    }
}

pub type EditorResult<T> = Result<T, EditorError>;
