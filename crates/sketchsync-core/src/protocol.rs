//! Synchronization protocol between editing clients.
//!
//! Every message travels on a named channel as the JSON array
//! `[author, data]`. The kind (`new`, `change`, `delete`) is carried by the
//! transport as the event name. `data` is a serialized shape for `new` and
//! `change` and a bare shape id for `delete`.

use crate::document::Document;
use crate::shapes::{Shape, ShapeId};
use crate::svg::{self, ImportError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while decoding inbound messages.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("Unknown message kind: {0}")]
    UnknownKind(String),
    #[error("Malformed envelope: {0}")]
    Envelope(#[from] serde_json::Error),
    #[error("Undecodable shape: {0}")]
    Shape(#[from] ImportError),
}

/// Event name of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    New,
    Change,
    Delete,
}

impl MessageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageKind::New => "new",
            MessageKind::Change => "change",
            MessageKind::Delete => "delete",
        }
    }
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MessageKind {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "new" => Ok(MessageKind::New),
            "change" => Ok(MessageKind::Change),
            "delete" => Ok(MessageKind::Delete),
            other => Err(ProtocolError::UnknownKind(other.to_string())),
        }
    }
}

/// Wire payload: `[author, data]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope(pub String, pub String);

impl Envelope {
    pub fn author(&self) -> &str {
        &self.0
    }

    pub fn data(&self) -> &str {
        &self.1
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A message waiting to be handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub channel: String,
    pub kind: MessageKind,
    /// JSON-encoded [`Envelope`].
    pub payload: String,
}

/// Effect of an applied inbound message on the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    /// A shape was appended on top of the drawing.
    Created(ShapeId),
    /// A shape was replaced in place.
    Changed(ShapeId),
    /// A shape was removed.
    Deleted(ShapeId),
}

/// Encodes outbound messages and applies inbound ones.
#[derive(Debug, Clone)]
pub struct SyncProtocol {
    author: String,
    channel: String,
    /// Pending outgoing messages.
    outgoing: Vec<OutboundMessage>,
}

impl SyncProtocol {
    pub fn new(author: impl Into<String>, channel: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            channel: channel.into(),
            outgoing: Vec::new(),
        }
    }

    /// Local identity, used for self-echo suppression.
    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Queue a message carrying `data`.
    pub fn send(&mut self, kind: MessageKind, data: String) {
        let envelope = Envelope(self.author.clone(), data);
        if let Ok(payload) = envelope.to_json() {
            log::debug!("Queueing {} on {}", kind, self.channel);
            self.outgoing.push(OutboundMessage {
                channel: self.channel.clone(),
                kind,
                payload,
            });
        }
    }

    /// Queue a `new` or `change` message carrying the shape's markup.
    pub fn send_shape(&mut self, kind: MessageKind, shape: &Shape) {
        self.send(kind, svg::write_shape(shape));
    }

    /// Take pending outgoing messages (drains the queue).
    pub fn take_outgoing(&mut self) -> Vec<OutboundMessage> {
        std::mem::take(&mut self.outgoing)
    }

    /// Check if there are pending outgoing messages.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Apply an inbound message to the document.
    ///
    /// Nothing is reported back to the sender: messages from the local
    /// author, undecodable payloads, and changes or deletes of unknown ids are
    /// logged and dropped, returning `None`.
    pub fn receive(&self, doc: &mut Document, kind: MessageKind, payload: &str) -> Option<RemoteEvent> {
        let envelope = match Envelope::from_json(payload) {
            Ok(envelope) => envelope,
            Err(e) => {
                log::warn!("Dropping {} message: {}", kind, e);
                return None;
            }
        };
        if envelope.author() == self.author {
            log::debug!("Ignoring own {} message", kind);
            return None;
        }

        match kind {
            MessageKind::New => {
                let shape = decode_shape(kind, envelope.data())?;
                let id = shape.id().to_string();
                if doc.contains(&id) {
                    // Redelivered message.
                    doc.replace(shape);
                    log::debug!("Shape {} from {} already present, replaced", id, envelope.author());
                    return Some(RemoteEvent::Changed(id));
                }
                doc.push(shape);
                log::debug!("Shape {} created by {}", id, envelope.author());
                Some(RemoteEvent::Created(id))
            }
            MessageKind::Change => {
                let shape = decode_shape(kind, envelope.data())?;
                let id = shape.id().to_string();
                if doc.replace(shape).is_none() {
                    log::debug!("Dropping change of unknown shape {}", id);
                    return None;
                }
                log::debug!("Shape {} changed by {}", id, envelope.author());
                Some(RemoteEvent::Changed(id))
            }
            MessageKind::Delete => {
                let id = envelope.data().trim();
                if doc.remove(id).is_none() {
                    log::debug!("Dropping delete of unknown shape {}", id);
                    return None;
                }
                log::debug!("Shape {} deleted by {}", id, envelope.author());
                Some(RemoteEvent::Deleted(id.to_string()))
            }
        }
    }
}

fn decode_shape(kind: MessageKind, data: &str) -> Option<Shape> {
    match svg::import_fragment(data) {
        Ok(Some(shape)) => Some(shape),
        Ok(None) => {
            log::debug!("Dropping {} message without a supported shape", kind);
            None
        }
        Err(e) => {
            log::warn!("Dropping {} message: {}", kind, ProtocolError::from(e));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{Line, Rectangle};

    fn envelope(author: &str, data: &str) -> String {
        Envelope(author.into(), data.into()).to_json().unwrap()
    }

    fn rect_markup(id: &str, x: f64) -> String {
        svg::write_shape(&Shape::Rect(Rectangle::new(id.into(), x, 0.0, 10.0, 10.0)))
    }

    #[test]
    fn test_envelope_is_json_array() {
        let json = envelope("alice", "alice_shape_0");
        assert_eq!(json, r#"["alice","alice_shape_0"]"#);
        let parsed = Envelope::from_json(&json).unwrap();
        assert_eq!(parsed.author(), "alice");
        assert_eq!(parsed.data(), "alice_shape_0");
    }

    #[test]
    fn test_message_kind_names() {
        assert_eq!("change".parse::<MessageKind>().unwrap(), MessageKind::Change);
        assert_eq!(MessageKind::Delete.to_string(), "delete");
        assert!(matches!(
            "move".parse::<MessageKind>(),
            Err(ProtocolError::UnknownKind(_))
        ));
    }

    #[test]
    fn test_send_queues_envelope() {
        let mut sync = SyncProtocol::new("alice", "img_0");
        sync.send(MessageKind::Delete, "alice_shape_3".into());
        assert!(sync.has_outgoing());

        let out = sync.take_outgoing();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].channel, "img_0");
        assert_eq!(out[0].kind, MessageKind::Delete);
        assert_eq!(out[0].payload, r#"["alice","alice_shape_3"]"#);
        assert!(!sync.has_outgoing());
    }

    #[test]
    fn test_self_echo_is_ignored() {
        let sync = SyncProtocol::new("alice", "img_0");
        let mut doc = Document::new();
        let payload = envelope("alice", &rect_markup("alice_shape_0", 0.0));
        assert_eq!(sync.receive(&mut doc, MessageKind::New, &payload), None);
        assert!(doc.is_empty());

        doc.push(Shape::Rect(Rectangle::new("alice_shape_0".into(), 0.0, 0.0, 1.0, 1.0)));
        let payload = envelope("alice", "alice_shape_0");
        assert_eq!(sync.receive(&mut doc, MessageKind::Delete, &payload), None);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_new_appends_on_top() {
        let sync = SyncProtocol::new("bob", "img_0");
        let mut doc = Document::new();
        doc.push(Shape::Line(Line::new("bob_shape_0".into(), 0.0, 0.0, 1.0, 1.0)));

        let payload = envelope("alice", &rect_markup("alice_shape_0", 5.0));
        assert_eq!(
            sync.receive(&mut doc, MessageKind::New, &payload),
            Some(RemoteEvent::Created("alice_shape_0".into()))
        );
        assert_eq!(doc.index_of("alice_shape_0"), Some(1));

        // Redelivery does not duplicate.
        assert_eq!(
            sync.receive(&mut doc, MessageKind::New, &payload),
            Some(RemoteEvent::Changed("alice_shape_0".into()))
        );
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_change_replaces_in_place() {
        let sync = SyncProtocol::new("bob", "img_0");
        let mut doc = Document::new();
        doc.push(Shape::Rect(Rectangle::new("alice_shape_0".into(), 0.0, 0.0, 10.0, 10.0)));
        doc.push(Shape::Line(Line::new("bob_shape_0".into(), 0.0, 0.0, 1.0, 1.0)));

        let payload = envelope("alice", &rect_markup("alice_shape_0", 42.0));
        assert_eq!(
            sync.receive(&mut doc, MessageKind::Change, &payload),
            Some(RemoteEvent::Changed("alice_shape_0".into()))
        );
        assert_eq!(doc.index_of("alice_shape_0"), Some(0));
        assert_eq!(doc.get("alice_shape_0").unwrap().border().unwrap().x0, 42.0);
    }

    #[test]
    fn test_unknown_ids_are_benign() {
        let sync = SyncProtocol::new("bob", "img_0");
        let mut doc = Document::new();

        let change = envelope("alice", &rect_markup("alice_shape_7", 1.0));
        assert_eq!(sync.receive(&mut doc, MessageKind::Change, &change), None);
        let delete = envelope("alice", "alice_shape_7");
        assert_eq!(sync.receive(&mut doc, MessageKind::Delete, &delete), None);
        assert!(doc.is_empty());
    }

    #[test]
    fn test_malformed_payloads_are_dropped() {
        let sync = SyncProtocol::new("bob", "img_0");
        let mut doc = Document::new();
        assert_eq!(sync.receive(&mut doc, MessageKind::New, "not json"), None);
        let bad_xml = envelope("alice", "<rect");
        assert_eq!(sync.receive(&mut doc, MessageKind::New, &bad_xml), None);
        let unsupported = envelope("alice", r#"<circle r="2"/>"#);
        assert_eq!(sync.receive(&mut doc, MessageKind::New, &unsupported), None);
        assert!(doc.is_empty());
    }
}
