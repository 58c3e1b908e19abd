//! The chat endpoint.

use serde::Serialize;

use hoos_types::{ChatReply, ConversationId, PipelineId};

use crate::{Gateway, Result, Session, check};

#[derive(Serialize)]
struct ChatMessageRequest<'a> {
    message_text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    conversation_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pipeline_id: Option<u64>,
}

impl Gateway {
    /// Send a message and wait for the grounded reply.
    ///
    /// With no `conversation`, the backend creates one in the named pipeline
    /// (or the general context when `pipeline` is also `None`) and returns
    /// its id in the reply; the caller must thread that id back into the
    /// view state so the follow-up send reuses it.
    pub async fn send_message(
        &self,
        session: &Session,
        text: &str,
        conversation: Option<ConversationId>,
        pipeline: Option<PipelineId>,
    ) -> Result<ChatReply> {
        let response = self
            .http()
            .post(self.url("/api/chat/message"))
            .bearer_auth(session.token())
            .json(&ChatMessageRequest {
                message_text: text,
                conversation_id: conversation.map(ConversationId::value),
                pipeline_id: pipeline.map(PipelineId::value),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}
