//! Node type catalog
//!
//! The catalog maps a type tag to the attribute keys it declares and their
//! default values. It is consulted once, when a node is created; attributes
//! are never validated against it afterwards.

use crate::node::{Attributes, RESERVED_KEYS};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One declared attribute of a node type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertySpec {
    pub key: String,
    #[serde(default)]
    pub default_value: Value,
}

impl PropertySpec {
    pub fn new(key: impl Into<String>, default_value: impl Into<Value>) -> Self {
        Self {
            key: key.into(),
            default_value: default_value.into(),
        }
    }
}

/// Registry of node types known to the document
pub trait TypeCatalog {
    /// Declared properties of `node_type` in declaration order, or `None`
    /// when the type is unknown
    fn properties(&self, node_type: &str) -> Option<&[PropertySpec]>;

    /// Attribute bag seeded with the declared defaults
    fn defaults(&self, node_type: &str) -> Option<Attributes> {
        self.properties(node_type).map(|props| {
            props
                .iter()
                .map(|p| (p.key.clone(), p.default_value.clone()))
                .collect()
        })
    }
}

/// Catalog backed by an in-memory table, loadable from JSON:
///
/// ```json
/// { "paragraph": [{ "key": "content", "defaultValue": "" }] }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StaticCatalog {
    types: HashMap<String, Vec<PropertySpec>>,
}

impl StaticCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in document types: sections, paragraphs and images
    pub fn document_types() -> Self {
        Self::new()
            .with_type("section", vec![PropertySpec::new("name", "")])
            .with_type("paragraph", vec![PropertySpec::new("content", "")])
            .with_type("image", vec![PropertySpec::new("url", "")])
    }

    pub fn with_type(mut self, node_type: impl Into<String>, properties: Vec<PropertySpec>) -> Self {
        self.types.insert(node_type.into(), properties);
        self
    }

    /// Parse a catalog, rejecting properties that shadow `type` or `children`
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let catalog: Self = serde_json::from_str(json)?;
        for (node_type, properties) in &catalog.types {
            if let Some(reserved) = properties
                .iter()
                .find(|p| RESERVED_KEYS.contains(&p.key.as_str()))
            {
                return Err(serde::de::Error::custom(format!(
                    "type {} declares reserved key {}",
                    node_type, reserved.key
                )));
            }
        }
        Ok(catalog)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &str> {
        self.types.keys().map(String::as_str)
    }
}

impl TypeCatalog for StaticCatalog {
    fn properties(&self, node_type: &str) -> Option<&[PropertySpec]> {
        self.types.get(node_type).map(Vec::as_slice)
    }
}
