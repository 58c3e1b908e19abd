//! Document listing, metadata, deletion, and upload.

use serde::Deserialize;

use hoos_types::{DocumentId, DocumentMetadata, PipelineDocument, PipelineId};

use crate::{Gateway, Result, Session, check};

#[derive(Deserialize)]
struct DocumentListResponse {
    #[serde(default)]
    documents: Vec<PipelineDocument>,
}

/// What the upload endpoint reports after ingesting a file.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: String,
    pub file_name: String,
    #[serde(default)]
    pub chunk_count: u32,
    #[serde(default)]
    pub embedding_count: u32,
}

impl Gateway {
    pub async fn documents(
        &self,
        session: &Session,
        pipeline: PipelineId,
    ) -> Result<Vec<PipelineDocument>> {
        let response = self
            .http()
            .get(self.url(&format!("/api/pipeline/{}/documents", pipeline.value())))
            .bearer_auth(session.token())
            .send()
            .await?;
        let list: DocumentListResponse = check(response).await?.json().await?;
        Ok(list.documents)
    }

    /// Extended metadata for one document; fetched on demand, never with the
    /// list.
    pub async fn document_metadata(
        &self,
        session: &Session,
        document: DocumentId,
    ) -> Result<DocumentMetadata> {
        let response = self
            .http()
            .get(self.url(&format!(
                "/api/document/get-document-metadata/{}",
                document.value()
            )))
            .bearer_auth(session.token())
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }

    pub async fn delete_document(
        &self,
        session: &Session,
        pipeline: PipelineId,
        document: DocumentId,
    ) -> Result<()> {
        let response = self
            .http()
            .delete(self.url(&format!(
                "/api/document/delete-document/{}/{}",
                pipeline.value(),
                document.value()
            )))
            .bearer_auth(session.token())
            .send()
            .await?;
        check(response).await?;
        Ok(())
    }

    /// Multipart upload into a pipeline. The session token travels as a form
    /// field alongside the file, matching the ingestion endpoint's contract.
    pub async fn upload_document(
        &self,
        session: &Session,
        pipeline: PipelineId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome> {
        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("token", session.token().to_string())
            .text("pipeline_id", pipeline.value().to_string());

        let response = self
            .http()
            .post(self.url("/api/upload-simple"))
            .multipart(form)
            .send()
            .await?;
        Ok(check(response).await?.json().await?)
    }
}
