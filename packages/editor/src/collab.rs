//! # Collaboration Messages
//!
//! Every edit to the selected node is published to remote collaborators as
//! a fire-and-forget message. Delivery is the channel's concern. Sending
//! never fails from the document's point of view and incoming messages are
//! not handled here.
//!
//! ```json
//! { "type": "change:node", "body": { "key": "3", "node": { "type": "paragraph", "children": [], "content": "..." } } }
//! ```

use folio_tree::{Node, NodeId, NodeRecord};
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, warn};

/// Outbound message announcing a node's new state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollabMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub body: ChangeBody,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeBody {
    pub key: NodeId,
    pub node: NodeRecord,
}

impl CollabMessage {
    pub const CHANGE_NODE: &'static str = "change:node";

    pub fn change_node(node: &Node) -> Self {
        Self {
            kind: Self::CHANGE_NODE.to_string(),
            body: ChangeBody {
                key: node.id().to_string(),
                node: NodeRecord::from(node),
            },
        }
    }
}

/// Outbound side of the collaboration transport
pub trait CollabChannel {
    fn send(&mut self, message: CollabMessage);
}

/// Drops every message (documents without collaborators)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

impl CollabChannel for NullChannel {
    fn send(&mut self, message: CollabMessage) {
        debug!(key = %message.body.key, "No collaboration channel, message dropped");
    }
}

/// Keeps every message in memory. Clones share the same buffer.
#[derive(Debug, Default, Clone)]
pub struct RecordingChannel {
    messages: Rc<RefCell<Vec<CollabMessage>>>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<CollabMessage> {
        self.messages.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.messages.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.borrow().is_empty()
    }

    /// Remove and return everything recorded so far
    pub fn drain(&self) -> Vec<CollabMessage> {
        std::mem::take(&mut *self.messages.borrow_mut())
    }
}

impl CollabChannel for RecordingChannel {
    fn send(&mut self, message: CollabMessage) {
        self.messages.borrow_mut().push(message);
    }
}

impl CollabChannel for mpsc::UnboundedSender<CollabMessage> {
    fn send(&mut self, message: CollabMessage) {
        let key = message.body.key.clone();
        if mpsc::UnboundedSender::send(self, message).is_err() {
            warn!(key = %key, "Collaboration channel closed, message dropped");
        }
    }
}

impl CollabChannel for broadcast::Sender<CollabMessage> {
    fn send(&mut self, message: CollabMessage) {
        let key = message.body.key.clone();
        match broadcast::Sender::send(self, message) {
            Ok(subscribers) => debug!(key = %key, subscribers, "Broadcast node change"),
            Err(_) => debug!(key = %key, "No collaborators subscribed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_tree::Attributes;
    use serde_json::json;

    fn paragraph() -> Node {
        let mut attrs = Attributes::new();
        attrs.insert("content".into(), json!("Hello"));
        Node::new("3", "paragraph", attrs)
    }

    #[test]
    fn test_message_wire_shape() {
        let message = CollabMessage::change_node(&paragraph());
        let value = serde_json::to_value(&message).unwrap();

        assert_eq!(
            value,
            json!({
                "type": "change:node",
                "body": {
                    "key": "3",
                    "node": { "type": "paragraph", "children": [], "content": "Hello" }
                }
            })
        );
    }

    #[test]
    fn test_recording_channel_shares_buffer() {
        let recorder = RecordingChannel::new();
        let mut sender = recorder.clone();

        sender.send(CollabMessage::change_node(&paragraph()));

        assert_eq!(recorder.len(), 1);
        assert_eq!(recorder.drain()[0].body.key, "3");
        assert!(recorder.is_empty());
    }

    #[test]
    fn test_unbounded_sender_delivers() {
        let (mut tx, mut rx) = mpsc::unbounded_channel::<CollabMessage>();
        CollabChannel::send(&mut tx, CollabMessage::change_node(&paragraph()));

        let received = rx.try_recv().unwrap();
        assert_eq!(received.kind, "change:node");
    }

    #[test]
    fn test_closed_sender_does_not_panic() {
        let (mut tx, rx) = mpsc::unbounded_channel::<CollabMessage>();
        drop(rx);
        CollabChannel::send(&mut tx, CollabMessage::change_node(&paragraph()));
    }

    #[test]
    fn test_broadcast_without_subscribers_is_fine() {
        let (mut tx, _) = broadcast::channel::<CollabMessage>(8);
        CollabChannel::send(&mut tx, CollabMessage::change_node(&paragraph()));
    }
}
