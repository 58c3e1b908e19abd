//! Conversation listing, transcripts, and deletion.

use hoos_types::{Conversation, ConversationId, Message, PipelineId};

use crate::{Gateway, Result, Session, check};

impl Gateway {
    /// All conversations held in a pipeline, most recently active first
    /// (backend order; the client never re-sorts).
    pub async fn conversations(
        &self,
        session: &Session,
        pipeline: PipelineId,
    ) -> Result<Vec<Conversation>> {
        let response = self
            .http()
            .get(self.url(&format!(
                "/api/conversation/pipeline/{}/conversations",
                pipeline.value()
            )))
            .bearer_auth(session.token())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Full transcript, a total order by timestamp.
    pub async fn messages(
        &self,
        session: &Session,
        conversation: ConversationId,
    ) -> Result<Vec<Message>> {
        let response = self
            .http()
            .get(self.url(&format!(
                "/api/conversation/conversation/{}/messages",
                conversation.value()
            )))
            .bearer_auth(session.token())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn delete_conversation(
        &self,
        session: &Session,
        conversation: ConversationId,
    ) -> Result<()> {
        let response = self
            .http()
            .delete(self.url(&format!("/api/chat/conversation/{}", conversation.value())))
            .bearer_auth(session.token())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
