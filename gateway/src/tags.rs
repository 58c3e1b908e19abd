//! Custom tag creation and deletion.

use serde::Serialize;

use hoos_types::{PipelineId, Tag, TagDraft, TagId};

use crate::{Gateway, Result, Session, check};

#[derive(Serialize)]
struct CreateTagRequest<'a> {
    name: &'a str,
    color: &'a str,
    pipeline_id: u64,
}

impl Gateway {
    pub async fn create_custom_tag(
        &self,
        session: &Session,
        pipeline: PipelineId,
        draft: &TagDraft,
    ) -> Result<Tag> {
        let response = self
            .http()
            .post(self.url("/api/tag/create-custom-tag/"))
            .bearer_auth(session.token())
            .json(&CreateTagRequest {
                name: draft.name(),
                color: draft.color(),
                pipeline_id: pipeline.value(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn delete_custom_tag(
        &self,
        session: &Session,
        pipeline: PipelineId,
        tag: TagId,
    ) -> Result<()> {
        let response = self
            .http()
            .delete(self.url(&format!(
                "/api/tag/delete-custom-tag/{}/{}",
                pipeline.value(),
                tag.value()
            )))
            .bearer_auth(session.token())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
