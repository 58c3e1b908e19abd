//! Core domain types for the HoosStudying client.
//!
//! This crate contains pure domain types with no IO, no async, and minimal dependencies.
//! Everything here can be used from any layer of the application.

// Pedantic lint configuration - these are intentional design choices
#![allow(clippy::missing_errors_doc)] // Result-returning functions are self-explanatory

mod conversation;
mod document;
mod ids;
mod pipeline;
mod user;

pub use conversation::{
    ChatContext, ChatEntry, ChatReply, Conversation, Message, PendingMessage, Sender, SourceInfo,
};
pub use document::{DocumentMetadata, PipelineDocument};
pub use ids::{
    ConversationId, DocumentId, LocalMessageId, MessageId, PipelineId, TagId, UserId,
};
pub use pipeline::{
    GENERAL_PIPELINE_NAME, Pipeline, PipelineDraft, Tag, TagDraft, TagKind, ValidationError,
};
pub use user::User;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A string guaranteed to be non-empty (after trimming).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NonEmptyString(String);

#[derive(Debug, Error)]
#[error("content must not be empty")]
pub struct EmptyStringError;

impl NonEmptyString {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyStringError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyStringError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for NonEmptyString {
    type Error = EmptyStringError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonEmptyString> for String {
    fn from(value: NonEmptyString) -> Self {
        value.0
    }
}

impl std::ops::Deref for NonEmptyString {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl AsRef<str> for NonEmptyString {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl std::fmt::Display for NonEmptyString {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_string_rejects_empty() {
        assert!(NonEmptyString::new("").is_err());
        assert!(NonEmptyString::new("   ").is_err());
        assert!(NonEmptyString::new("hello").is_ok());
    }

    #[test]
    fn non_empty_string_round_trips_serde() {
        let value = NonEmptyString::new("mitosis").unwrap();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, "\"mitosis\"");
        let back: NonEmptyString = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn non_empty_string_deserialization_rejects_blank() {
        let result: Result<NonEmptyString, _> = serde_json::from_str("\"  \"");
        assert!(result.is_err());
    }
}
