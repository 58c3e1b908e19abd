//! Pipeline CRUD and the system-tag taxonomy.

use serde::Serialize;

use hoos_types::{Pipeline, PipelineDraft, PipelineId, Tag};

use crate::{Gateway, Result, Session, check};

#[derive(Serialize)]
struct TokenBody<'a> {
    token: &'a str,
}

#[derive(Serialize)]
struct CreatePipelineRequest<'a> {
    pipeline_name: &'a str,
    pipeline_description: &'a str,
    system_tag_id: u64,
}

#[derive(Serialize)]
struct EditPipelineRequest<'a> {
    pipeline_id: u64,
    pipeline_name: &'a str,
    pipeline_description: &'a str,
    system_tag_id: u64,
}

impl Gateway {
    /// The user's distinguished general (document-less) pipeline.
    pub async fn default_pipeline(&self, session: &Session) -> Result<Pipeline> {
        let response = self
            .http()
            .post(self.url("/api/pipeline/get-default-pipeline"))
            .json(&TokenBody {
                token: session.token(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Every pipeline except the general one, in backend order.
    pub async fn non_default_pipelines(&self, session: &Session) -> Result<Vec<Pipeline>> {
        let response = self
            .http()
            .post(self.url("/api/pipeline/get-non-default-pipelines"))
            .json(&TokenBody {
                token: session.token(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// The fixed category taxonomy pipelines choose their system tag from.
    pub async fn system_tags(&self, session: &Session) -> Result<Vec<Tag>> {
        let response = self
            .http()
            .post(self.url("/api/tag/get-system-tags"))
            .json(&TokenBody {
                token: session.token(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn create_pipeline(
        &self,
        session: &Session,
        draft: &PipelineDraft,
    ) -> Result<Pipeline> {
        let response = self
            .http()
            .post(self.url("/api/pipeline/create-new-pipeline"))
            .bearer_auth(session.token())
            .json(&CreatePipelineRequest {
                pipeline_name: draft.name(),
                pipeline_description: draft.description(),
                system_tag_id: draft.system_tag().value(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Rewrite name, description, and system tag. Custom tags are untouched.
    pub async fn edit_pipeline(
        &self,
        session: &Session,
        pipeline: PipelineId,
        draft: &PipelineDraft,
    ) -> Result<Pipeline> {
        let response = self
            .http()
            .post(self.url("/api/pipeline/edit-pipeline"))
            .bearer_auth(session.token())
            .json(&EditPipelineRequest {
                pipeline_id: pipeline.value(),
                pipeline_name: draft.name(),
                pipeline_description: draft.description(),
                system_tag_id: draft.system_tag().value(),
            })
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    /// Terminal: the backend cascades to the pipeline's documents and
    /// conversations.
    pub async fn delete_pipeline(&self, session: &Session, pipeline: PipelineId) -> Result<()> {
        let response = self
            .http()
            .delete(self.url(&format!("/api/pipeline/delete-pipeline/{}", pipeline.value())))
            .bearer_auth(session.token())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }
}
