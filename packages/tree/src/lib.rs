//! # Folio Tree
//!
//! In-memory content tree for structured documents.
//!
//! ```text
//! Tree (root container, sole owner)
//!  ├── children: ["1", "2"]          ← top-level reading order
//!  └── nodes: { id → Node }
//!        Node { type, attributes, children: [id...], parent: NodeKey }
//! ```
//!
//! The tree mints identities from a counter that never goes backwards,
//! resolves ids (with `"root"` addressing the container itself), and
//! serializes to and from a flat, identity-indexed payload.
//!
//! ## Usage
//!
//! ```rust
//! use folio_tree::{Attributes, NodeKey, Placement, Tree, TreePayload};
//!
//! let mut tree = Tree::from_payload(TreePayload::empty_document())?;
//! let id = tree.create_node("paragraph", Attributes::new());
//! tree.attach(&NodeKey::from("2"), &id, &Placement::Append)?;
//!
//! assert_eq!(tree.parent_of(&id)?, NodeKey::from("2"));
//! # Ok::<(), folio_tree::TreeError>(())
//! ```

mod catalog;
mod errors;
mod id_generator;
mod node;
mod payload;
mod tree;

pub use catalog::{PropertySpec, StaticCatalog, TypeCatalog};
pub use errors::{TreeError, TreeResult};
pub use id_generator::IdGenerator;
pub use node::{
    Attributes, Children, Node, NodeId, NodeKey, Placement, Position, RESERVED_KEYS, ROOT_KEY,
};
pub use payload::{NodeRecord, TreePayload};
pub use tree::{NodeRef, Tree};
