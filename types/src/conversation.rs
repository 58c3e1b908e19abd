//! Conversations and transcript records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::NonEmptyString;
use crate::ids::{ConversationId, LocalMessageId, MessageId, PipelineId, UserId};

/// Where a chat message is grounded: a pipeline's documents, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatContext {
    /// Document-less chat against the general pipeline.
    General,
    Pipeline(PipelineId),
}

impl ChatContext {
    #[must_use]
    pub fn pipeline(self) -> Option<PipelineId> {
        match self {
            ChatContext::General => None,
            ChatContext::Pipeline(id) => Some(id),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(rename = "conversation_id")]
    pub id: ConversationId,
    #[serde(rename = "user_id")]
    pub owner: UserId,
    /// `None` for conversations held in the general, document-less context.
    #[serde(rename = "pipeline_id", default)]
    pub pipeline: Option<PipelineId>,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_message_at: Option<DateTime<Utc>>,
    /// Derived server-side for list display.
    #[serde(default)]
    pub first_message_content: Option<String>,
}

impl Conversation {
    /// Short preview for conversation cards.
    #[must_use]
    pub fn preview(&self) -> &str {
        let content = self.first_message_content.as_deref().unwrap_or("");
        match content.char_indices().nth(40) {
            Some((idx, _)) => &content[..idx],
            None => content,
        }
    }
}

/// Who authored a confirmed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Bot,
}

/// A server-stored message fetched from a conversation's transcript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    #[serde(rename = "message_id")]
    pub id: MessageId,
    #[serde(rename = "conversation_id")]
    pub conversation: ConversationId,
    #[serde(rename = "sender_type")]
    pub sender: Sender,
    #[serde(rename = "message_text")]
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// Local echo of a just-sent user message, awaiting its round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingMessage {
    pub local_id: LocalMessageId,
    pub text: NonEmptyString,
    pub sent_at: DateTime<Utc>,
}

impl PendingMessage {
    #[must_use]
    pub fn new(text: NonEmptyString) -> Self {
        Self {
            local_id: LocalMessageId::generate(),
            text,
            sent_at: Utc::now(),
        }
    }
}

/// A transcript record as the client stores it.
///
/// Optimistic echoes carry a [`LocalMessageId`] and server records a
/// [`MessageId`]; the two never share a field, so superseding a pending echo
/// on confirmation is enforced by the type system rather than by an id
/// convention. The send response names the conversation but not the stored
/// user message id, so an acknowledged user turn sits in `Delivered` until
/// the next transcript fetch replaces it with a `Confirmed` record.
#[derive(Debug, Clone)]
pub enum ChatEntry {
    /// Awaiting the round trip; rendered dimmed, removed on failure.
    Pending(PendingMessage),
    /// User turn acknowledged by a completed round trip.
    Delivered {
        conversation: ConversationId,
        text: NonEmptyString,
        sent_at: DateTime<Utc>,
    },
    /// Authoritative server record.
    Confirmed(Message),
}

impl ChatEntry {
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            ChatEntry::Pending(pending) => pending.text.as_str(),
            ChatEntry::Delivered { text, .. } => text.as_str(),
            ChatEntry::Confirmed(message) => &message.text,
        }
    }

    #[must_use]
    pub fn sender(&self) -> Sender {
        match self {
            ChatEntry::Pending(_) | ChatEntry::Delivered { .. } => Sender::User,
            ChatEntry::Confirmed(message) => message.sender,
        }
    }

    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            ChatEntry::Pending(pending) => pending.sent_at,
            ChatEntry::Delivered { sent_at, .. } => *sent_at,
            ChatEntry::Confirmed(message) => message.timestamp,
        }
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        matches!(self, ChatEntry::Pending(_))
    }
}

/// One grounding citation attached to a bot reply.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInfo {
    pub file_name: String,
    pub chunk_index: u32,
    pub similarity_score: f64,
    pub text_preview: String,
}

/// The chat endpoint's response to a sent message.
///
/// `conversation` is authoritative: when the send created a brand-new
/// conversation it names the new id, and the caller must thread it back into
/// the view state and conversation list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatReply {
    #[serde(rename = "message_id")]
    pub message: MessageId,
    #[serde(rename = "conversation_id")]
    pub conversation: ConversationId,
    pub response: String,
    #[serde(default)]
    pub sources: Vec<SourceInfo>,
    #[serde(default)]
    pub has_context: bool,
}

impl ChatReply {
    /// The bot turn as a confirmed transcript record, stamped at arrival.
    #[must_use]
    pub fn bot_message(&self) -> Message {
        Message {
            id: self.message,
            conversation: self.conversation,
            sender: Sender::Bot,
            text: self.response.clone(),
            timestamp: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_at_forty_chars() {
        let conversation = Conversation {
            id: ConversationId::new(501),
            owner: UserId::new(1),
            pipeline: Some(PipelineId::new(7)),
            created_at: Utc::now(),
            last_message_at: None,
            first_message_content: Some("x".repeat(100)),
        };
        assert_eq!(conversation.preview().chars().count(), 40);
    }

    #[test]
    fn preview_handles_short_and_missing_content() {
        let mut conversation = Conversation {
            id: ConversationId::new(501),
            owner: UserId::new(1),
            pipeline: None,
            created_at: Utc::now(),
            last_message_at: None,
            first_message_content: Some("hi".into()),
        };
        assert_eq!(conversation.preview(), "hi");
        conversation.first_message_content = None;
        assert_eq!(conversation.preview(), "");
    }

    #[test]
    fn pending_entries_report_user_sender() {
        let entry = ChatEntry::Pending(PendingMessage::new(
            NonEmptyString::new("What is mitosis?").unwrap(),
        ));
        assert_eq!(entry.sender(), Sender::User);
        assert!(entry.is_pending());
        assert_eq!(entry.text(), "What is mitosis?");
    }

    #[test]
    fn reply_builds_bot_message() {
        let reply = ChatReply {
            message: MessageId::new(9001),
            conversation: ConversationId::new(501),
            response: "Cell division.".into(),
            sources: Vec::new(),
            has_context: true,
        };
        let message = reply.bot_message();
        assert_eq!(message.sender, Sender::Bot);
        assert_eq!(message.conversation, ConversationId::new(501));
        assert_eq!(message.text, "Cell division.");
    }

    #[test]
    fn message_wire_shape_matches_backend() {
        let json = r#"{
            "message_id": 9001,
            "conversation_id": 501,
            "sender_type": "bot",
            "message_text": "Cell division.",
            "timestamp": "2026-02-01T12:00:00Z"
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert_eq!(message.id, MessageId::new(9001));
        assert_eq!(message.sender, Sender::Bot);
    }
}
