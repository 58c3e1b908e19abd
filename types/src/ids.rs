//! Typed identifiers for every backend entity.
//!
//! All surrogate keys are assigned by the backend and treated as opaque.
//! [`LocalMessageId`] is the one client-generated identifier; it backs the
//! optimistic transcript echo and shares no representation with server ids,
//! so a pending record can never be mistaken for a confirmed one.

use std::fmt;

use uuid::Uuid;

macro_rules! numeric_id {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            #[must_use]
            pub const fn value(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

numeric_id!(UserId);
numeric_id!(PipelineId);
numeric_id!(TagId);
numeric_id!(ConversationId);
numeric_id!(MessageId);
numeric_id!(DocumentId);

/// Client-generated identifier for an optimistic transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct LocalMessageId(Uuid);

impl LocalMessageId {
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for LocalMessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "local-{}", self.0)
    }
}

impl Default for LocalMessageId {
    fn default() -> Self {
        Self::generate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_ids_serialize_transparently() {
        let id = PipelineId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: PipelineId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn local_ids_are_unique() {
        assert_ne!(LocalMessageId::generate(), LocalMessageId::generate());
    }
}
