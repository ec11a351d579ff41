use anyhow::Context;
use folio_editor::{EditorConfig, RemovalPolicy};
use folio_tree::StaticCatalog;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_NAME: &str = "folio.config.json";

/// Folio configuration file format
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// What `removeNode` does with the removed subtree
    #[serde(default)]
    pub removal_policy: RemovalPolicy,

    /// Optional path to a JSON type catalog; the built-in document types
    /// are used when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog: Option<String>,

    /// Directory holding document files
    #[serde(default = "default_document_dir")]
    pub document_dir: String,
}

fn default_document_dir() -> String {
    "documents".to_string()
}

impl Config {
    /// Load config from a directory
    pub fn load(cwd: &str) -> anyhow::Result<Self> {
        let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Invalid {}", config_path.display()))?;
            Ok(config)
        } else {
            // Return default config if none exists
            Ok(Config::default())
        }
    }

    /// Get absolute path to the document directory
    pub fn get_document_dir(&self, cwd: &str) -> PathBuf {
        PathBuf::from(cwd).join(&self.document_dir)
    }

    pub fn editor_config(&self) -> EditorConfig {
        EditorConfig::default().with_removal_policy(self.removal_policy)
    }

    /// Load the configured type catalog
    pub fn load_catalog(&self, cwd: &str) -> anyhow::Result<StaticCatalog> {
        match &self.catalog {
            Some(path) => {
                let path = Path::new(cwd).join(path);
                let content = std::fs::read_to_string(&path)
                    .with_context(|| format!("Cannot read catalog {}", path.display()))?;
                Ok(StaticCatalog::from_json(&content)?)
            }
            None => Ok(StaticCatalog::document_types()),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            removal_policy: RemovalPolicy::default(),
            catalog: None,
            document_dir: default_document_dir(),
        }
    }
}
