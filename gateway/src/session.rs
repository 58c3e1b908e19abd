//! Identity provider client and the explicit session credential.
//!
//! The session token is a value, not an ambient global: every gateway
//! operation that needs a credential takes a [`Session`] parameter, and the
//! only place tokens are minted is this module. Session-state changes are
//! broadcast over a [`tokio::sync::watch`] channel the application subscribes
//! to once at startup; dropping the receiver is the unsubscribe.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::watch;

use hoos_config::IdentityConfig;

use crate::{GatewayError, Result};

/// Bearer credential for gateway calls.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    token: String,
}

impl Session {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }
}

// Redact the token so it cannot leak through logs or error messages.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Session(<redacted>)")
    }
}

/// Current authentication state, as broadcast to subscribers.
#[derive(Debug, Clone, Default)]
pub enum AuthState {
    #[default]
    SignedOut,
    SignedIn(Session),
}

impl AuthState {
    #[must_use]
    pub fn session(&self) -> Option<&Session> {
        match self {
            AuthState::SignedOut => None,
            AuthState::SignedIn(session) => Some(session),
        }
    }
}

// The sign-in surface answers in camelCase, the token-refresh surface in
// snake_case; aliases accept both.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(alias = "idToken")]
    id_token: String,
    #[serde(alias = "refreshToken")]
    refresh_token: String,
    #[serde(alias = "expiresIn")]
    expires_in: String,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Debug, Clone)]
struct Credentials {
    refresh_token: String,
    expires_at: DateTime<Utc>,
}

/// Client for the identity provider's REST surface.
pub struct Identity {
    http: reqwest::Client,
    config: IdentityConfig,
    state: watch::Sender<AuthState>,
    credentials: Option<Credentials>,
}

impl Identity {
    #[must_use]
    pub fn new(config: IdentityConfig) -> Self {
        let (state, _) = watch::channel(AuthState::SignedOut);
        Self {
            http: crate::build_client(),
            config,
            state,
            credentials: None,
        }
    }

    /// Subscribe to session-state changes. Intended to be called once at
    /// startup; dropping the receiver ends the subscription.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    pub async fn sign_in(&mut self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}?key={}", self.config.signin_endpoint, self.config.api_key);
        self.request_token(&url, &serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        }))
        .await
    }

    pub async fn sign_up(&mut self, email: &str, password: &str) -> Result<Session> {
        let url = format!("{}?key={}", self.config.signup_endpoint, self.config.api_key);
        self.request_token(&url, &serde_json::json!({
            "email": email,
            "password": password,
            "returnSecureToken": true,
        }))
        .await
    }

    /// Exchange the refresh token for a fresh session. Fails with
    /// [`GatewayError::Identity`] when no one is signed in.
    pub async fn refresh(&mut self) -> Result<Session> {
        let refresh_token = self
            .credentials
            .as_ref()
            .map(|c| c.refresh_token.clone())
            .ok_or_else(|| GatewayError::Identity("not signed in".to_string()))?;
        let url = format!("{}?key={}", self.config.token_endpoint, self.config.api_key);
        self.request_token(&url, &serde_json::json!({
            "grant_type": "refresh_token",
            "refresh_token": refresh_token,
        }))
        .await
    }

    /// Drop the credential and broadcast the signed-out state.
    pub fn sign_out(&mut self) {
        self.credentials = None;
        let _ = self.state.send(AuthState::SignedOut);
    }

    /// Whether the current session expires within the next minute.
    #[must_use]
    pub fn needs_refresh(&self) -> bool {
        self.credentials
            .as_ref()
            .is_some_and(|c| c.expires_at - Utc::now() < Duration::seconds(60))
    }

    async fn request_token(&mut self, url: &str, body: &serde_json::Value) -> Result<Session> {
        let response = self.http.post(url).json(body).send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("sign-in rejected ({status})"));
            return Err(GatewayError::Identity(message));
        }

        let token: TokenResponse = response.json().await?;
        let expires_in: i64 = token.expires_in.parse().unwrap_or(3600);
        self.credentials = Some(Credentials {
            refresh_token: token.refresh_token,
            expires_at: Utc::now() + Duration::seconds(expires_in),
        });

        let session = Session::new(token.id_token);
        let _ = self.state.send(AuthState::SignedIn(session.clone()));
        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_debug_redacts_token() {
        let session = Session::new("secret-token");
        assert_eq!(format!("{session:?}"), "Session(<redacted>)");
    }

    #[test]
    fn auth_state_exposes_session_only_when_signed_in() {
        assert!(AuthState::SignedOut.session().is_none());
        let state = AuthState::SignedIn(Session::new("t"));
        assert_eq!(state.session().map(Session::token), Some("t"));
    }

    #[test]
    fn token_response_accepts_provider_field_names() {
        let json = r#"{"idToken": "a", "refreshToken": "b", "expiresIn": "3600"}"#;
        let token: TokenResponse = serde_json::from_str(json).unwrap();
        assert_eq!(token.id_token, "a");
        assert_eq!(token.refresh_token, "b");
    }
}
