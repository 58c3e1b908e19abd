//! Gateway round trips against a mock backend.

use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hoos_gateway::{Gateway, GatewayError, Session};
use hoos_types::{ConversationId, MessageId, PipelineDraft, PipelineId, Sender, TagId};

fn session() -> Session {
    Session::new("id-token-abc")
}

#[tokio::test]
async fn verify_syncs_user_and_derives_needs_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .and(body_partial_json(json!({"token": "id-token-abc"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": 1,
            "provider_uid": "uid-1",
            "first_name": "",
            "last_name": "",
            "email": "student@virginia.edu",
            "created_user": true
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let user = gateway.verify(&session()).await.unwrap();
    assert!(user.created_user);
    assert!(user.needs_name, "empty first name must trigger name capture");
}

#[tokio::test]
async fn send_message_returns_reply_with_new_conversation_id() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(header("authorization", "Bearer id-token-abc"))
        .and(body_partial_json(json!({
            "message_text": "What is mitosis?",
            "pipeline_id": 7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 9001,
            "conversation_id": 501,
            "response": "Mitosis is cell division.",
            "sources": [{
                "file_name": "bio.pdf",
                "chunk_index": 3,
                "similarity_score": 0.91,
                "text_preview": "mitosis..."
            }],
            "has_context": true
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let reply = gateway
        .send_message(&session(), "What is mitosis?", None, Some(PipelineId::new(7)))
        .await
        .unwrap();

    assert_eq!(reply.conversation, ConversationId::new(501));
    assert_eq!(reply.message, MessageId::new(9001));
    assert!(reply.has_context);
    assert_eq!(reply.sources.len(), 1);
    assert_eq!(reply.bot_message().sender, Sender::Bot);
}

#[tokio::test]
async fn send_message_omits_absent_optional_fields() {
    let server = MockServer::start().await;
    // The general context names neither a conversation nor a pipeline; the
    // request body must omit the keys rather than send nulls.
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({"message_text": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 1,
            "conversation_id": 2,
            "response": "hello",
            "sources": [],
            "has_context": false
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let reply = gateway.send_message(&session(), "hi", None, None).await.unwrap();
    assert_eq!(reply.conversation, ConversationId::new(2));
}

#[tokio::test]
async fn create_pipeline_posts_draft_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pipeline/create-new-pipeline"))
        .and(body_partial_json(json!({
            "pipeline_name": "Biology 101",
            "pipeline_description": "cells and such",
            "system_tag_id": 12
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipeline_id": 7,
            "user_id": 1,
            "pipeline_name": "Biology 101",
            "description": "cells and such",
            "number_of_documents": 0,
            "tags": [{"tag_id": 12, "name": "Science", "color": "#10B981", "tag_type": "system"}]
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let draft = PipelineDraft::new("Biology 101", "cells and such", Some(TagId::new(12))).unwrap();
    let pipeline = gateway.create_pipeline(&session(), &draft).await.unwrap();
    assert_eq!(pipeline.id, PipelineId::new(7));
    assert_eq!(pipeline.system_tag().unwrap().name, "Science");
}

#[tokio::test]
async fn document_list_unwraps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/pipeline/7/documents"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "documents": [{
                "document_id": 3,
                "file_name": "notes.pdf",
                "file_type": "pdf",
                "upload_date": "2026-01-15T09:30:00Z",
                "is_active": true
            }]
        })))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let documents = gateway.documents(&session(), PipelineId::new(7)).await.unwrap();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].file_name, "notes.pdf");
}

#[tokio::test]
async fn unauthorized_maps_to_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/auth/verify"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let err = gateway.verify(&session()).await.unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn server_error_carries_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/pipeline/delete-pipeline/7"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let err = gateway
        .delete_pipeline(&session(), PipelineId::new(7))
        .await
        .unwrap_err();
    match err {
        GatewayError::Status { status, body } => {
            assert_eq!(status.as_u16(), 500);
            assert_eq!(body, "boom");
        }
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn conversations_and_messages_deserialize() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversation/pipeline/7/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "conversation_id": 501,
            "user_id": 1,
            "pipeline_id": 7,
            "created_at": "2026-02-01T12:00:00Z",
            "last_message_at": "2026-02-01T12:05:00Z",
            "first_message_content": "What is mitosis?"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversation/conversation/501/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "message_id": 9000,
                "conversation_id": 501,
                "sender_type": "user",
                "message_text": "What is mitosis?",
                "timestamp": "2026-02-01T12:00:00Z"
            },
            {
                "message_id": 9001,
                "conversation_id": 501,
                "sender_type": "bot",
                "message_text": "Cell division.",
                "timestamp": "2026-02-01T12:00:05Z"
            }
        ])))
        .mount(&server)
        .await;

    let gateway = Gateway::with_origin(server.uri());
    let conversations = gateway.conversations(&session(), PipelineId::new(7)).await.unwrap();
    assert_eq!(conversations.len(), 1);
    assert_eq!(conversations[0].preview(), "What is mitosis?");

    let messages = gateway
        .messages(&session(), ConversationId::new(501))
        .await
        .unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].sender, Sender::Bot);
}
