//! Pipelines and their tags.
//!
//! A pipeline is a named collection of uploaded documents. Every non-general
//! pipeline carries exactly one system tag (its category) and any number of
//! custom tags. The distinguished "general" pipeline represents document-less
//! chat and is tracked separately from the browsable list.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::{PipelineId, TagId, UserId};

/// Sentinel name of the per-user document-less pipeline.
pub const GENERAL_PIPELINE_NAME: &str = "general";

const NAME_MAX_CHARS: usize = 50;
const DESCRIPTION_MAX_CHARS: usize = 500;
const TAG_NAME_MAX_CHARS: usize = 50;

/// Whether a tag comes from the fixed category taxonomy or was user-created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TagKind {
    /// One per pipeline, chosen from the server-provided taxonomy. Drives
    /// category grouping and header coloring.
    System,
    /// Decorative, user-defined. Zero or more per pipeline.
    Custom,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    #[serde(rename = "tag_id")]
    pub id: TagId,
    pub name: String,
    /// Hex color, e.g. `#3B82F6`.
    pub color: String,
    #[serde(rename = "tag_type")]
    pub kind: TagKind,
}

impl Tag {
    #[must_use]
    pub fn is_system(&self) -> bool {
        self.kind == TagKind::System
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    #[serde(rename = "pipeline_id")]
    pub id: PipelineId,
    #[serde(rename = "user_id")]
    pub owner: UserId,
    #[serde(rename = "pipeline_name")]
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Derived server-side; refreshed after document mutations.
    #[serde(default)]
    pub number_of_documents: Option<u64>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}

impl Pipeline {
    /// Whether this is the distinguished document-less pipeline.
    #[must_use]
    pub fn is_general(&self) -> bool {
        self.name == GENERAL_PIPELINE_NAME
    }

    /// The pipeline's category tag, if any.
    #[must_use]
    pub fn system_tag(&self) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.is_system())
    }

    /// User-defined tags, in creation order.
    pub fn custom_tags(&self) -> impl Iterator<Item = &Tag> {
        self.tags.iter().filter(|tag| !tag.is_system())
    }
}

/// Why a draft failed client-side validation.
///
/// These are the only business rules the client enforces itself; everything
/// else is the backend's call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("name must not be empty")]
    NameEmpty,
    #[error("name must be at most 50 characters")]
    NameTooLong,
    #[error("description must not be empty")]
    DescriptionEmpty,
    #[error("description must be at most 500 characters")]
    DescriptionTooLong,
    #[error("a category must be selected")]
    CategoryMissing,
    #[error("tag name must not be empty")]
    TagNameEmpty,
    #[error("tag name must be at most 50 characters")]
    TagNameTooLong,
    #[error("a tag color must be selected")]
    ColorMissing,
}

/// Validated input for pipeline create and edit.
///
/// Construction is the validation: an invalid draft cannot exist, so the
/// orchestration layer never re-checks fields before submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDraft {
    name: String,
    description: String,
    system_tag: TagId,
}

impl PipelineDraft {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        system_tag: Option<TagId>,
    ) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::NameEmpty);
        }
        if name.chars().count() > NAME_MAX_CHARS {
            return Err(ValidationError::NameTooLong);
        }

        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(ValidationError::DescriptionEmpty);
        }
        if description.chars().count() > DESCRIPTION_MAX_CHARS {
            return Err(ValidationError::DescriptionTooLong);
        }

        let system_tag = system_tag.ok_or(ValidationError::CategoryMissing)?;

        Ok(Self {
            name,
            description,
            system_tag,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn system_tag(&self) -> TagId {
        self.system_tag
    }
}

/// Validated input for custom tag creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagDraft {
    name: String,
    color: String,
}

impl TagDraft {
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into().trim().to_string();
        if name.is_empty() {
            return Err(ValidationError::TagNameEmpty);
        }
        if name.chars().count() > TAG_NAME_MAX_CHARS {
            return Err(ValidationError::TagNameTooLong);
        }

        let color = color.into().trim().to_string();
        if color.is_empty() {
            return Err(ValidationError::ColorMissing);
        }

        Ok(Self { name, color })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag(id: u64, kind: TagKind) -> Tag {
        Tag {
            id: TagId::new(id),
            name: format!("tag-{id}"),
            color: "#3B82F6".into(),
            kind,
        }
    }

    fn pipeline(name: &str, tags: Vec<Tag>) -> Pipeline {
        Pipeline {
            id: PipelineId::new(7),
            owner: UserId::new(1),
            name: name.into(),
            description: "course material".into(),
            created_at: None,
            number_of_documents: Some(2),
            tags,
        }
    }

    #[test]
    fn general_pipeline_is_recognized_by_sentinel_name() {
        assert!(pipeline(GENERAL_PIPELINE_NAME, Vec::new()).is_general());
        assert!(!pipeline("Biology 101", Vec::new()).is_general());
    }

    #[test]
    fn system_tag_lookup_skips_custom_tags() {
        let p = pipeline(
            "Biology 101",
            vec![tag(1, TagKind::Custom), tag(2, TagKind::System)],
        );
        assert_eq!(p.system_tag().map(|t| t.id), Some(TagId::new(2)));
        assert_eq!(p.custom_tags().count(), 1);
    }

    #[test]
    fn draft_requires_all_fields() {
        assert_eq!(
            PipelineDraft::new("", "desc", Some(TagId::new(1))),
            Err(ValidationError::NameEmpty)
        );
        assert_eq!(
            PipelineDraft::new("name", "   ", Some(TagId::new(1))),
            Err(ValidationError::DescriptionEmpty)
        );
        assert_eq!(
            PipelineDraft::new("name", "desc", None),
            Err(ValidationError::CategoryMissing)
        );
        assert!(PipelineDraft::new("name", "desc", Some(TagId::new(1))).is_ok());
    }

    #[test]
    fn draft_enforces_length_bounds() {
        let long_name = "x".repeat(51);
        assert_eq!(
            PipelineDraft::new(long_name, "desc", Some(TagId::new(1))),
            Err(ValidationError::NameTooLong)
        );
        let long_desc = "x".repeat(501);
        assert_eq!(
            PipelineDraft::new("name", long_desc, Some(TagId::new(1))),
            Err(ValidationError::DescriptionTooLong)
        );
    }

    #[test]
    fn draft_trims_whitespace() {
        let draft = PipelineDraft::new("  Biology 101  ", " cells ", Some(TagId::new(1))).unwrap();
        assert_eq!(draft.name(), "Biology 101");
        assert_eq!(draft.description(), "cells");
    }

    #[test]
    fn tag_draft_validates_name_and_color() {
        assert_eq!(
            TagDraft::new("", "#fff"),
            Err(ValidationError::TagNameEmpty)
        );
        assert_eq!(
            TagDraft::new("exam", "  "),
            Err(ValidationError::ColorMissing)
        );
        let draft = TagDraft::new("exam", "#10B981").unwrap();
        assert_eq!(draft.name(), "exam");
        assert_eq!(draft.color(), "#10B981");
    }
}
