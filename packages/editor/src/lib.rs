//! # Folio Editor
//!
//! Document facade over the content tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ payload (JSON) → folio-tree: Tree + Nodes    │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: Document                            │
//! │  - create / move / remove / update / select │
//! │  - one change:node per structural change    │
//! │  - selection tracking                       │
//! └─────────────────────────────────────────────┘
//!           ↓                         ↓
//!   observers (UI)         collaboration channel
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use folio_editor::{Document, DocumentEvent};
//! use folio_tree::{NodeKey, Position, StaticCatalog};
//!
//! let mut doc = Document::empty_document(StaticCatalog::document_types())?;
//! doc.subscribe(|event: &DocumentEvent, _tree: &folio_tree::Tree| println!("{}", event));
//!
//! let id = doc.create_child("paragraph", "2")?;
//! doc.move_node("4", "5", Position::Before)?;
//! assert_eq!(doc.tree().parent_of(&id)?, NodeKey::from("2"));
//! # Ok::<(), folio_editor::EditorError>(())
//! ```

mod collab;
mod config;
mod document;
mod errors;
mod events;
mod library;
mod mutations;

pub use collab::{ChangeBody, CollabChannel, CollabMessage, NullChannel, RecordingChannel};
pub use config::{EditorConfig, RemovalPolicy};
pub use document::Document;
pub use errors::{EditorError, EditorResult};
pub use events::{DocumentEvent, Listener, ListenerId, Listeners};
pub use library::{DocumentEntry, DocumentList};
pub use mutations::{Mutation, MutationResult};
