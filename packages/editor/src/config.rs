//! Editor configuration

use serde::{Deserialize, Serialize};

/// What happens to a removed node's subtree
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RemovalPolicy {
    /// Keep removed nodes in the tree's node map (unreachable, but serialized)
    #[default]
    Retain,
    /// Drop the removed node and all of its descendants
    Purge,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorConfig {
    #[serde(default)]
    pub removal_policy: RemovalPolicy,
}

impl EditorConfig {
    pub fn with_removal_policy(mut self, policy: RemovalPolicy) -> Self {
        self.removal_policy = policy;
        self
    }
}
