//! Object-storage locator resolution.
//!
//! Stored files are referenced by an opaque locator in their metadata; this
//! module exchanges a locator for a time-limited retrieval URL used for
//! in-terminal preview hints and downloads. The storage provider itself is an
//! external collaborator; only the resolve contract lives here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Gateway, Result, Session, check};

#[derive(Serialize)]
struct ResolveRequest<'a> {
    storage_path: &'a str,
}

/// A time-limited retrieval URL.
#[derive(Debug, Clone, Deserialize)]
pub struct ResolvedUrl {
    pub download_url: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl ResolvedUrl {
    /// Whether the URL is still usable, treating an absent expiry as live.
    #[must_use]
    pub fn is_live(&self) -> bool {
        self.expires_at.is_none_or(|at| at > Utc::now())
    }
}

impl Gateway {
    pub async fn resolve_download_url(
        &self,
        session: &Session,
        storage_path: &str,
    ) -> Result<ResolvedUrl> {
        let response = self
            .http()
            .post(self.storage_endpoint().to_string())
            .bearer_auth(session.token())
            .json(&ResolveRequest { storage_path })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn resolved_url_liveness() {
        let live = ResolvedUrl {
            download_url: "https://storage.example/file".into(),
            expires_at: Some(Utc::now() + Duration::minutes(10)),
        };
        assert!(live.is_live());

        let expired = ResolvedUrl {
            download_url: "https://storage.example/file".into(),
            expires_at: Some(Utc::now() - Duration::minutes(10)),
        };
        assert!(!expired.is_live());

        let no_expiry = ResolvedUrl {
            download_url: "https://storage.example/file".into(),
            expires_at: None,
        };
        assert!(no_expiry.is_live());
    }
}
