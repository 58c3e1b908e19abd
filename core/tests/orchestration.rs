//! Orchestration round trips: gateway call -> store mutation -> view state.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hoos_core::{App, Bootstrap, Pane, Severity, View};
use hoos_gateway::{Gateway, Session};
use hoos_types::{
    ConversationId, NonEmptyString, Pipeline, PipelineDraft, PipelineId, Sender, Tag, TagId,
    TagKind, User, UserId,
};

fn science_tag() -> Tag {
    Tag {
        id: TagId::new(12),
        name: "Science".into(),
        color: "#10B981".into(),
        kind: TagKind::System,
    }
}

fn custom_tag(id: u64, name: &str) -> Tag {
    Tag {
        id: TagId::new(id),
        name: name.into(),
        color: "#EC4899".into(),
        kind: TagKind::Custom,
    }
}

fn pipeline(id: u64, name: &str, tags: Vec<Tag>) -> Pipeline {
    Pipeline {
        id: PipelineId::new(id),
        owner: UserId::new(1),
        name: name.into(),
        description: "course material".into(),
        created_at: None,
        number_of_documents: Some(2),
        tags,
    }
}

fn bootstrap(pipelines: Vec<Pipeline>) -> Bootstrap {
    Bootstrap {
        user: User {
            id: UserId::new(1),
            provider_uid: "uid-1".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "ada@virginia.edu".into(),
            created_user: false,
            needs_name: false,
            created_at: None,
        },
        default_pipeline: pipeline(1, "general", Vec::new()),
        pipelines,
        taxonomy: vec![science_tag()],
    }
}

fn app_for(server: &MockServer, pipelines: Vec<Pipeline>) -> App {
    App::new(
        Gateway::with_origin(server.uri()),
        Session::new("id-token"),
        bootstrap(pipelines),
    )
}

/// Drain spawned chat round trips until the outstanding one settles.
async fn settle_chat(app: &mut App) {
    for _ in 0..200 {
        app.process_chat_outcomes();
        if !app.chat_in_flight() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("chat round trip never settled");
}

async fn mock_conversations(server: &MockServer, pipeline_id: u64, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path(format!(
            "/api/conversation/pipeline/{pipeline_id}/conversations"
        )))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn first_send_creates_conversation_and_second_send_reuses_it() {
    let server = MockServer::start().await;
    // The landing starts empty; after the send mints a conversation, the
    // refetch sees it.
    Mock::given(method("GET"))
        .and(path("/api/conversation/pipeline/7/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mock_conversations(
        &server,
        7,
        json!([{
            "conversation_id": 501,
            "user_id": 1,
            "pipeline_id": 7,
            "created_at": "2026-02-01T12:00:00Z",
            "first_message_content": "What is mitosis?"
        }]),
    )
    .await;

    // The first send carries no conversation id; the backend mints 501.
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({
            "message_text": "What is mitosis?",
            "pipeline_id": 7
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 9001,
            "conversation_id": 501,
            "response": "Mitosis is cell division.",
            "sources": [],
            "has_context": true
        })))
        .expect(1)
        .mount(&server)
        .await;
    // The follow-up must name conversation 501 rather than minting another.
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({
            "message_text": "And meiosis?",
            "conversation_id": 501
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 9003,
            "conversation_id": 501,
            "response": "Meiosis halves the chromosome count.",
            "sources": [],
            "has_context": true
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_for(&server, vec![pipeline(7, "Biology 101", vec![science_tag()])]);
    app.open_pipeline_browser();
    app.select_pipeline(PipelineId::new(7)).await;
    assert_eq!(
        app.view(),
        View::Detail {
            pipeline: PipelineId::new(7),
            pane: Pane::ChatLanding
        }
    );

    app.send_message(NonEmptyString::new("What is mitosis?").unwrap());
    assert!(app.chat_in_flight(), "send control must be disabled");
    settle_chat(&mut app).await;

    // The reply threads the new conversation into the view and the list.
    assert_eq!(app.view().conversation(), Some(ConversationId::new(501)));
    assert!(app.stores().conversations.contains(ConversationId::new(501)));
    let entries = app.stores().messages.entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].sender(), Sender::User);
    assert_eq!(entries[0].text(), "What is mitosis?");
    assert!(!entries[0].is_pending());
    assert_eq!(entries[1].sender(), Sender::Bot);
    assert_eq!(entries[1].text(), "Mitosis is cell division.");

    app.send_message(NonEmptyString::new("And meiosis?").unwrap());
    settle_chat(&mut app).await;
    assert_eq!(app.view().conversation(), Some(ConversationId::new(501)));
    assert_eq!(app.stores().messages.entries().len(), 4);

    // Mock expectations verify exactly one create and one reuse.
}

#[tokio::test]
async fn failed_send_removes_echo_and_leaves_stores_untouched() {
    let server = MockServer::start().await;
    mock_conversations(&server, 7, json!([])).await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .respond_with(ResponseTemplate::new(500).set_body_string("rag backend down"))
        .mount(&server)
        .await;

    let mut app = app_for(&server, vec![pipeline(7, "Biology 101", vec![science_tag()])]);
    app.open_pipeline_browser();
    app.select_pipeline(PipelineId::new(7)).await;

    app.send_message(NonEmptyString::new("hello?").unwrap());
    assert_eq!(app.stores().messages.entries().len(), 1);
    settle_chat(&mut app).await;

    assert!(app.stores().messages.is_empty(), "echo must not survive a failure");
    assert!(app.stores().conversations.items().is_empty());
    let notification = app.notification().expect("failure must notify");
    assert_eq!(notification.severity, Severity::Error);
    // A new user action is required; the control re-enables.
    assert!(!app.chat_in_flight());
}

#[tokio::test]
async fn deleting_open_conversation_lands_on_chat_landing() {
    let server = MockServer::start().await;
    mock_conversations(
        &server,
        7,
        json!([{
            "conversation_id": 501,
            "user_id": 1,
            "pipeline_id": 7,
            "created_at": "2026-02-01T12:00:00Z"
        }]),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/conversation/conversation/501/messages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "message_id": 9000,
            "conversation_id": 501,
            "sender_type": "user",
            "message_text": "What is mitosis?",
            "timestamp": "2026-02-01T12:00:00Z"
        }])))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/chat/conversation/501"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut app = app_for(&server, vec![pipeline(7, "Biology 101", vec![science_tag()])]);
    app.open_pipeline_browser();
    app.select_pipeline(PipelineId::new(7)).await;
    app.select_conversation(ConversationId::new(501)).await;
    assert_eq!(app.stores().messages.entries().len(), 1);

    app.delete_conversation(ConversationId::new(501)).await;

    assert!(!app.stores().conversations.contains(ConversationId::new(501)));
    assert_eq!(
        app.view(),
        View::Detail {
            pipeline: PipelineId::new(7),
            pane: Pane::ChatLanding
        }
    );
    assert!(app.stores().messages.is_empty());
}

#[tokio::test]
async fn deleting_open_pipeline_resets_view_and_detail_state() {
    let server = MockServer::start().await;
    mock_conversations(
        &server,
        7,
        json!([{
            "conversation_id": 501,
            "user_id": 1,
            "pipeline_id": 7,
            "created_at": "2026-02-01T12:00:00Z"
        }]),
    )
    .await;
    Mock::given(method("DELETE"))
        .and(path("/api/pipeline/delete-pipeline/7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut app = app_for(
        &server,
        vec![pipeline(7, "Biology 101", vec![science_tag(), custom_tag(5, "exam")])],
    );
    app.open_pipeline_browser();
    app.select_pipeline(PipelineId::new(7)).await;
    assert!(!app.stores().conversations.items().is_empty());

    app.delete_pipeline(PipelineId::new(7)).await;

    assert_eq!(app.view(), View::PipelineList);
    assert!(app.stores().pipelines.get(PipelineId::new(7)).is_none());
    // No stale pointer: nothing from the deleted pipeline renders.
    assert!(app.stores().conversations.items().is_empty());
    assert!(app.stores().messages.is_empty());
    assert!(app.stores().documents.items().is_empty());
}

#[tokio::test]
async fn edit_applies_new_values_and_preserves_custom_tags() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pipeline/edit-pipeline"))
        .and(body_partial_json(json!({
            "pipeline_id": 7,
            "pipeline_name": "Cell Biology",
            "system_tag_id": 13
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pipeline_id": 7,
            "user_id": 1,
            "pipeline_name": "Cell Biology",
            "description": "now with meiosis",
            "tags": [{"tag_id": 13, "name": "Biology", "color": "#84CC16", "tag_type": "system"}]
        })))
        .mount(&server)
        .await;

    let mut app = app_for(
        &server,
        vec![pipeline(7, "Biology 101", vec![science_tag(), custom_tag(5, "exam")])],
    );
    let draft =
        PipelineDraft::new("Cell Biology", "now with meiosis", Some(TagId::new(13))).unwrap();
    app.edit_pipeline(PipelineId::new(7), draft).await;

    let entry = app.stores().pipelines.get(PipelineId::new(7)).unwrap();
    assert_eq!(entry.name, "Cell Biology");
    assert_eq!(entry.description, "now with meiosis");
    assert_eq!(entry.system_tag().unwrap().name, "Biology");
    let customs: Vec<_> = entry.custom_tags().map(|t| t.name.as_str()).collect();
    assert_eq!(customs, vec!["exam"]);
}

#[tokio::test]
async fn tag_create_then_delete_round_trips_the_tag_set() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/tag/create-custom-tag/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tag_id": 99,
            "name": "midterm",
            "color": "#F97316",
            "tag_type": "custom"
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/tag/delete-custom-tag/7/99"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .mount(&server)
        .await;

    let mut app = app_for(
        &server,
        vec![pipeline(7, "Biology 101", vec![science_tag(), custom_tag(5, "exam")])],
    );
    let p = PipelineId::new(7);
    let before: Vec<TagId> = app
        .stores()
        .pipelines
        .get(p)
        .unwrap()
        .custom_tags()
        .map(|t| t.id)
        .collect();

    app.create_tag(p, hoos_types::TagDraft::new("midterm", "#F97316").unwrap())
        .await;
    assert_eq!(app.stores().pipelines.get(p).unwrap().custom_tags().count(), 2);

    app.delete_tag(p, TagId::new(99)).await;
    let after: Vec<TagId> = app
        .stores()
        .pipelines
        .get(p)
        .unwrap()
        .custom_tags()
        .map(|t| t.id)
        .collect();
    assert_eq!(before, after);
}

#[tokio::test]
async fn failed_create_leaves_pipeline_list_unchanged() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pipeline/create-new-pipeline"))
        .respond_with(ResponseTemplate::new(500).set_body_string("nope"))
        .mount(&server)
        .await;

    let mut app = app_for(&server, vec![pipeline(7, "Biology 101", vec![science_tag()])]);
    let draft = PipelineDraft::new("Chemistry", "acids", Some(TagId::new(12))).unwrap();
    app.create_pipeline(draft).await;

    assert_eq!(app.stores().pipelines.items().len(), 1);
    assert_eq!(app.notification().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn auth_rejection_forces_sign_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/pipeline/create-new-pipeline"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let mut app = app_for(&server, Vec::new());
    let draft = PipelineDraft::new("Chemistry", "acids", Some(TagId::new(12))).unwrap();
    app.create_pipeline(draft).await;

    assert!(app.take_signed_out());
    assert!(!app.take_signed_out(), "flag resets on read");
}

#[tokio::test]
async fn conversation_fetch_failure_is_nonfatal() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversation/pipeline/7/conversations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut app = app_for(&server, vec![pipeline(7, "Biology 101", vec![science_tag()])]);
    app.open_pipeline_browser();
    app.select_pipeline(PipelineId::new(7)).await;

    // Still lands in the detail view with an empty list and a notification.
    assert_eq!(app.view().pipeline(), Some(PipelineId::new(7)));
    assert!(app.stores().conversations.items().is_empty());
    assert_eq!(app.notification().unwrap().severity, Severity::Error);
}

#[tokio::test]
async fn general_chat_send_tracks_implicit_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({"message_text": "hi"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 1,
            "conversation_id": 600,
            "response": "hello!",
            "sources": [],
            "has_context": false
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({"message_text": "again", "conversation_id": 600})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message_id": 2,
            "conversation_id": 600,
            "response": "hello again!",
            "sources": [],
            "has_context": false
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut app = app_for(&server, Vec::new());
    assert_eq!(app.view(), View::GeneralChat);

    app.send_message(NonEmptyString::new("hi").unwrap());
    settle_chat(&mut app).await;
    assert_eq!(app.stores().messages.entries().len(), 2);

    app.send_message(NonEmptyString::new("again").unwrap());
    settle_chat(&mut app).await;
    assert_eq!(app.stores().messages.entries().len(), 4);
}
