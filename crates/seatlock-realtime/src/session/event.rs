//! Events that drive a session.

use crate::message::types::InboundMessage;

/// Input to [`SessionAdapter`](super::SessionAdapter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A raw text frame from the transport.
    Frame(String),
    /// An already-parsed message.
    Message(InboundMessage),
    /// The transport closed. Terminal.
    Disconnected,
}

impl From<InboundMessage> for SessionEvent {
    fn from(msg: InboundMessage) -> Self {
        Self::Message(msg)
    }
}
