//! The authenticated principal as the backend records it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::UserId;

/// A user record synced from the backend on sign-in.
///
/// Immutable from the client's perspective except for the name, which is
/// captured exactly once when `needs_name` is set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "user_id")]
    pub id: UserId,
    /// Identity-provider uid; opaque to the client.
    pub provider_uid: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// True when this sign-in created the record.
    #[serde(default)]
    pub created_user: bool,
    /// True until the one-time name capture has run.
    #[serde(default)]
    pub needs_name: bool,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Display name for list headers and message attribution.
    #[must_use]
    pub fn display_name(&self) -> String {
        let name = format!("{} {}", self.first_name, self.last_name);
        if name.trim().is_empty() {
            self.email.clone()
        } else {
            name.trim().to_string()
        }
    }

    /// Record the one-time name capture locally after the gateway accepts it.
    pub fn set_name(&mut self, first_name: String, last_name: String) {
        self.first_name = first_name;
        self.last_name = last_name;
        self.needs_name = false;
    }
}
