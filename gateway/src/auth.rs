//! Principal verification and the one-time name update.

use serde::Serialize;

use hoos_types::User;

use crate::{Gateway, Result, Session, check};

#[derive(Serialize)]
struct VerifyRequest<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct UpdateNameRequest<'a> {
    first_name: &'a str,
    last_name: &'a str,
}

impl Gateway {
    /// Verify the identity token and sync the principal into the backend,
    /// creating the record on first sign-in.
    pub async fn verify(&self, session: &Session) -> Result<User> {
        let response = self
            .http()
            .post(self.url("/api/auth/verify"))
            .json(&VerifyRequest {
                token: session.token(),
            })
            .send()
            .await?;
        let mut user: User = check(response).await?.json().await?;
        // The backend stores empty names for brand-new principals; the
        // name-capture prompt keys off this flag.
        user.needs_name = user.first_name.trim().is_empty();
        Ok(user)
    }

    /// Set the user's name. The backend accepts this exactly once per
    /// principal, while the name is still missing.
    pub async fn update_name(
        &self,
        session: &Session,
        first_name: &str,
        last_name: &str,
    ) -> Result<()> {
        let response = self
            .http()
            .post(self.url("/api/auth/user/update-name"))
            .bearer_auth(session.token())
            .json(&UpdateNameRequest {
                first_name,
                last_name,
            })
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
