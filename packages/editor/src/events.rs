//! # Change Notifications
//!
//! Observers register a callback on the [`Document`](crate::Document).
//! Callbacks run synchronously, in registration order, right after the
//! mutation they describe has been committed and before the intent returns.

use folio_tree::{NodeKey, Tree};
use std::fmt;

/// Notification emitted by the document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentEvent {
    /// The node's own state or its child list changed
    ChangeNode(NodeKey),
    /// The selection moved to this node
    SelectNode(NodeKey),
}

impl DocumentEvent {
    pub const CHANGE_NODE: &'static str = "change:node";
    pub const SELECT_NODE: &'static str = "select:node";

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            DocumentEvent::ChangeNode(_) => Self::CHANGE_NODE,
            DocumentEvent::SelectNode(_) => Self::SELECT_NODE,
        }
    }

    pub fn key(&self) -> &NodeKey {
        match self {
            DocumentEvent::ChangeNode(key) | DocumentEvent::SelectNode(key) => key,
        }
    }
}

impl fmt::Display for DocumentEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.key())
    }
}

/// Observer callback. Receives the event and the tree as it is after the change.
pub type Listener = Box<dyn FnMut(&DocumentEvent, &Tree)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Registered observers, in registration order
#[derive(Default)]
pub struct Listeners {
    next_id: u64,
    entries: Vec<(ListenerId, Listener)>,
}

impl Listeners {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.entries.push((id, listener));
        id
    }

    /// Returns `false` if the id was not registered
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    pub fn emit(&mut self, event: &DocumentEvent, tree: &Tree) {
        for (_, listener) in &mut self.entries {
            listener(event, tree);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl fmt::Debug for Listeners {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.entries.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn test_event_names() {
        assert_eq!(DocumentEvent::ChangeNode(NodeKey::Root).name(), "change:node");
        assert_eq!(
            DocumentEvent::SelectNode(NodeKey::from("3")).to_string(),
            "select:node(3)"
        );
    }

    #[test]
    fn test_listeners_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut listeners = Listeners::new();

        for tag in ["a", "b"] {
            let log = Rc::clone(&log);
            listeners.subscribe(Box::new(move |event, _| {
                log.borrow_mut().push(format!("{}:{}", tag, event));
            }));
        }

        listeners.emit(&DocumentEvent::ChangeNode(NodeKey::Root), &Tree::new());

        assert_eq!(
            *log.borrow(),
            vec!["a:change:node(root)", "b:change:node(root)"]
        );
    }

    #[test]
    fn test_unsubscribe() {
        let count = Rc::new(RefCell::new(0));
        let mut listeners = Listeners::new();

        let counter = Rc::clone(&count);
        let id = listeners.subscribe(Box::new(move |_, _| *counter.borrow_mut() += 1));

        assert!(listeners.unsubscribe(id));
        assert!(!listeners.unsubscribe(id));

        listeners.emit(&DocumentEvent::ChangeNode(NodeKey::Root), &Tree::new());
        assert_eq!(*count.borrow(), 0);
        assert!(listeners.is_empty());
    }
}
