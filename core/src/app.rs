//! The coordinator: one instance per logged-in session.
//!
//! Every user action funnels through [`App::dispatch`] as a [`Command`] and
//! follows the same shape: validate, call the gateway, apply the minimal
//! store mutation on success, notify. A failed call leaves every store
//! untouched and degrades to a transient error notification; nothing here
//! retries and nothing is allowed to take the session down.
//!
//! Store mutations happen only on the task that owns the `App`. The chat
//! round trip is the one long-running operation: it runs as a spawned task
//! and delivers its outcome through a channel, drained once per frame by
//! [`App::process_chat_outcomes`], so a slow reply never blocks navigation.

use tokio::sync::mpsc;

use hoos_gateway::{Gateway, GatewayError, ResolvedUrl, Session};
use hoos_types::{
    ChatContext, ChatReply, Conversation, ConversationId, DocumentId, DocumentMetadata,
    LocalMessageId, NonEmptyString, PendingMessage, Pipeline, PipelineDraft, PipelineId, Tag,
    TagDraft, TagId, User,
};

use crate::grouping::CollapseState;
use crate::notify::{Notification, Notifications};
use crate::store::Stores;
use crate::view::{Pane, View};

/// Everything fetched at login, before the coordinator exists.
#[derive(Debug)]
pub struct Bootstrap {
    pub user: User,
    pub default_pipeline: Pipeline,
    pub pipelines: Vec<Pipeline>,
    pub taxonomy: Vec<Tag>,
}

impl Bootstrap {
    /// Sync the principal and fetch the initial lists.
    pub async fn load(gateway: &Gateway, session: &Session) -> Result<Self, GatewayError> {
        let user = gateway.verify(session).await?;
        let default_pipeline = gateway.default_pipeline(session).await?;
        let pipelines = gateway.non_default_pipelines(session).await?;
        let taxonomy = gateway.system_tags(session).await?;
        Ok(Self {
            user,
            default_pipeline,
            pipelines,
            taxonomy,
        })
    }
}

/// A user action, as produced by the input layer.
#[derive(Debug)]
pub enum Command {
    OpenPipelineBrowser,
    SelectGeneralChat,
    GoHome,
    ToggleFiles,
    ToggleCategory(String),
    SelectPipeline(PipelineId),
    SelectConversation(ConversationId),
    CreatePipeline(PipelineDraft),
    EditPipeline(PipelineId, PipelineDraft),
    DeletePipeline(PipelineId),
    CreateTag(PipelineId, TagDraft),
    DeleteTag(PipelineId, TagId),
    DeleteConversation(ConversationId),
    SendMessage(NonEmptyString),
    LoadDocumentMetadata(DocumentId),
    ResolveDownloadUrl,
    DeleteDocument(PipelineId, DocumentId),
    UploadDocument { file_name: String, bytes: Vec<u8> },
    UpdateName { first_name: String, last_name: String },
    DismissNotification,
}

#[derive(Debug)]
struct ChatSettled {
    reply: ChatReply,
    /// Refreshed list, present when the send created a brand-new
    /// conversation in a pipeline context.
    conversations: Option<Vec<Conversation>>,
}

/// What a spawned chat round trip reports back.
#[derive(Debug)]
pub struct ChatOutcome {
    local_id: LocalMessageId,
    context: ChatContext,
    result: Result<ChatSettled, GatewayError>,
}

pub struct App {
    gateway: Gateway,
    session: Session,
    user: User,
    stores: Stores,
    view: View,
    collapse: CollapseState,
    notifications: Notifications,
    /// The implicit current conversation of the general context; set by the
    /// first reply so follow-up sends reuse it.
    general_conversation: Option<ConversationId>,
    /// Send control is disabled while a round trip is outstanding.
    chat_in_flight: bool,
    chat_tx: mpsc::UnboundedSender<ChatOutcome>,
    chat_rx: mpsc::UnboundedReceiver<ChatOutcome>,
    metadata: Option<DocumentMetadata>,
    download: Option<ResolvedUrl>,
    signed_out: bool,
}

impl App {
    #[must_use]
    pub fn new(gateway: Gateway, session: Session, bootstrap: Bootstrap) -> Self {
        let (chat_tx, chat_rx) = mpsc::unbounded_channel();
        let view = View::initial(&bootstrap.default_pipeline);
        Self {
            gateway,
            session,
            user: bootstrap.user,
            stores: Stores::new(
                bootstrap.default_pipeline,
                bootstrap.pipelines,
                bootstrap.taxonomy,
            ),
            view,
            collapse: CollapseState::new(),
            notifications: Notifications::new(),
            general_conversation: None,
            chat_in_flight: false,
            chat_tx,
            chat_rx,
            metadata: None,
            download: None,
            signed_out: false,
        }
    }

    // ------------------------------------------------------------------
    // Read surface for rendering
    // ------------------------------------------------------------------

    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    #[must_use]
    pub fn view(&self) -> View {
        self.view
    }

    #[must_use]
    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    #[must_use]
    pub fn notification(&self) -> Option<&Notification> {
        self.notifications.current()
    }

    #[must_use]
    pub fn is_category_expanded(&self, category: &str) -> bool {
        self.collapse.is_expanded(category)
    }

    #[must_use]
    pub fn chat_in_flight(&self) -> bool {
        self.chat_in_flight
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&DocumentMetadata> {
        self.metadata.as_ref()
    }

    #[must_use]
    pub fn download(&self) -> Option<&ResolvedUrl> {
        self.download.as_ref()
    }

    /// True once an authentication rejection has forced sign-out; the caller
    /// returns to the unauthenticated view. Resets on read.
    pub fn take_signed_out(&mut self) -> bool {
        std::mem::take(&mut self.signed_out)
    }

    /// Per-frame housekeeping.
    pub fn tick(&mut self) {
        self.notifications.tick();
    }

    /// Surface a failure that happened outside the gateway (e.g. a local
    /// file read) through the normal notification path.
    pub fn notify_error(&mut self, message: impl Into<String>) {
        self.notifications.error(message);
    }

    /// Swap in a refreshed credential; subsequent operations carry it.
    pub fn set_session(&mut self, session: Session) {
        self.session = session;
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub async fn dispatch(&mut self, command: Command) {
        match command {
            Command::OpenPipelineBrowser => self.open_pipeline_browser(),
            Command::SelectGeneralChat => self.select_general_chat(),
            Command::GoHome => self.go_home(),
            Command::ToggleFiles => self.toggle_files().await,
            Command::ToggleCategory(name) => self.collapse.toggle(&name),
            Command::SelectPipeline(id) => self.select_pipeline(id).await,
            Command::SelectConversation(id) => self.select_conversation(id).await,
            Command::CreatePipeline(draft) => self.create_pipeline(draft).await,
            Command::EditPipeline(id, draft) => self.edit_pipeline(id, draft).await,
            Command::DeletePipeline(id) => self.delete_pipeline(id).await,
            Command::CreateTag(pipeline, draft) => self.create_tag(pipeline, draft).await,
            Command::DeleteTag(pipeline, tag) => self.delete_tag(pipeline, tag).await,
            Command::DeleteConversation(id) => self.delete_conversation(id).await,
            Command::SendMessage(text) => self.send_message(text),
            Command::LoadDocumentMetadata(id) => self.load_document_metadata(id).await,
            Command::ResolveDownloadUrl => self.resolve_download_url().await,
            Command::DeleteDocument(pipeline, id) => self.delete_document(pipeline, id).await,
            Command::UploadDocument { file_name, bytes } => {
                self.upload_document(file_name, bytes).await;
            }
            Command::UpdateName {
                first_name,
                last_name,
            } => self.update_name(first_name, last_name).await,
            Command::DismissNotification => self.notifications.dismiss(),
        }
    }

    // ------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------

    pub fn open_pipeline_browser(&mut self) {
        self.view = self.view.open_pipeline_browser();
    }

    pub fn select_general_chat(&mut self) {
        let was_detail = matches!(self.view, View::Detail { .. });
        self.view = self.view.select_general_chat();
        if was_detail {
            self.stores.clear_detail();
            self.metadata = None;
            self.download = None;
        }
    }

    /// Home affordance: back to the chat landing, selection discarded.
    pub fn go_home(&mut self) {
        let before = self.view;
        self.view = self.view.home();
        if self.view != before {
            self.stores.messages.clear();
        }
    }

    pub async fn select_pipeline(&mut self, pipeline: PipelineId) {
        self.view = self.view.select_pipeline(pipeline);
        self.stores.clear_detail();
        self.metadata = None;
        self.download = None;
        // The landing needs the conversation list; a failure is non-fatal
        // and leaves it empty.
        match self.gateway.conversations(&self.session, pipeline).await {
            Ok(list) => self.stores.conversations.replace_all(list),
            Err(err) => self.fail("Failed to load conversations", &err),
        }
    }

    pub async fn select_conversation(&mut self, conversation: ConversationId) {
        if self.view.pipeline().is_none() {
            return;
        }
        self.view = self.view.select_conversation(conversation);
        self.stores.messages.clear();
        match self.gateway.messages(&self.session, conversation).await {
            Ok(list) => self.stores.messages.replace_all(list),
            Err(err) => self.fail("Failed to load messages", &err),
        }
    }

    pub async fn toggle_files(&mut self) {
        let before = self.view;
        self.view = self.view.toggle_files();
        let entered_files = self.view != before
            && matches!(
                self.view,
                View::Detail {
                    pane: Pane::Files { .. },
                    ..
                }
            );
        if entered_files && let Some(pipeline) = self.view.pipeline() {
            match self.gateway.documents(&self.session, pipeline).await {
                Ok(list) => self.stores.documents.replace_all(list),
                Err(err) => self.fail("Failed to load documents", &err),
            }
        }
    }

    // ------------------------------------------------------------------
    // Pipeline CRUD
    // ------------------------------------------------------------------

    pub async fn create_pipeline(&mut self, draft: PipelineDraft) {
        match self.gateway.create_pipeline(&self.session, &draft).await {
            Ok(pipeline) => {
                self.stores.pipelines.insert(pipeline);
                self.notifications.success("Created pipeline");
            }
            Err(err) => self.fail("Failed to create pipeline", &err),
        }
    }

    pub async fn edit_pipeline(&mut self, pipeline: PipelineId, draft: PipelineDraft) {
        match self
            .gateway
            .edit_pipeline(&self.session, pipeline, &draft)
            .await
        {
            Ok(updated) => {
                self.stores.pipelines.apply_edit(&updated);
                self.notifications.success("Updated pipeline");
            }
            Err(err) => self.fail("Failed to update pipeline", &err),
        }
    }

    pub async fn delete_pipeline(&mut self, pipeline: PipelineId) {
        match self.gateway.delete_pipeline(&self.session, pipeline).await {
            Ok(()) => {
                self.stores.pipelines.remove(pipeline);
                let was_open = self.view.pipeline() == Some(pipeline);
                self.view = self.view.on_pipeline_deleted(pipeline);
                if was_open {
                    // Nothing from the deleted pipeline survives in view.
                    self.stores.clear_detail();
                    self.metadata = None;
                    self.download = None;
                }
                self.notifications.success("Deleted pipeline");
            }
            Err(err) => self.fail("Failed to delete pipeline", &err),
        }
    }

    // ------------------------------------------------------------------
    // Tags
    // ------------------------------------------------------------------

    pub async fn create_tag(&mut self, pipeline: PipelineId, draft: TagDraft) {
        match self
            .gateway
            .create_custom_tag(&self.session, pipeline, &draft)
            .await
        {
            Ok(tag) => {
                self.stores.pipelines.add_tag(pipeline, tag);
                self.notifications.success("Created tag");
            }
            Err(err) => self.fail("Failed to create tag", &err),
        }
    }

    pub async fn delete_tag(&mut self, pipeline: PipelineId, tag: TagId) {
        match self
            .gateway
            .delete_custom_tag(&self.session, pipeline, tag)
            .await
        {
            Ok(()) => {
                self.stores.pipelines.remove_tag(pipeline, tag);
                self.notifications.success("Deleted tag");
            }
            Err(err) => self.fail("Failed to delete tag", &err),
        }
    }

    // ------------------------------------------------------------------
    // Conversations
    // ------------------------------------------------------------------

    pub async fn delete_conversation(&mut self, conversation: ConversationId) {
        match self
            .gateway
            .delete_conversation(&self.session, conversation)
            .await
        {
            Ok(()) => {
                self.stores.conversations.remove(conversation);
                let before = self.view;
                self.view = self.view.on_conversation_deleted(conversation);
                if self.view != before {
                    self.stores.messages.clear();
                }
                self.notifications.success("Deleted conversation");
            }
            Err(err) => self.fail("Failed to delete conversation", &err),
        }
    }

    // ------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------

    /// Start a send. The echo appears immediately; the reply arrives through
    /// [`App::process_chat_outcomes`]. No-op while a send is outstanding or
    /// outside a chat context.
    pub fn send_message(&mut self, text: NonEmptyString) {
        if self.chat_in_flight {
            return;
        }
        let (context, conversation) = match self.view {
            View::GeneralChat => (ChatContext::General, self.general_conversation),
            View::Detail {
                pipeline,
                pane: Pane::ChatLanding,
            } => (ChatContext::Pipeline(pipeline), None),
            View::Detail {
                pipeline,
                pane: Pane::Conversation(id),
            } => (ChatContext::Pipeline(pipeline), Some(id)),
            _ => return,
        };

        let local_id = self
            .stores
            .messages
            .append_pending(PendingMessage::new(text.clone()));
        self.chat_in_flight = true;

        let gateway = self.gateway.clone();
        let session = self.session.clone();
        let tx = self.chat_tx.clone();
        let pipeline = context.pipeline();
        tokio::spawn(async move {
            let result = match gateway
                .send_message(&session, text.as_str(), conversation, pipeline)
                .await
            {
                Ok(reply) => {
                    // A brand-new conversation must become selectable, so the
                    // list is refetched in the same task. Its failure is not
                    // the send's failure: the reply still applies.
                    let conversations = match (conversation, pipeline) {
                        (None, Some(p)) => gateway.conversations(&session, p).await.ok(),
                        _ => None,
                    };
                    Ok(ChatSettled {
                        reply,
                        conversations,
                    })
                }
                Err(err) => Err(err),
            };
            let _ = tx.send(ChatOutcome {
                local_id,
                context,
                result,
            });
        });
    }

    /// Drain settled chat round trips; called once per frame on the task
    /// that owns the stores.
    pub fn process_chat_outcomes(&mut self) {
        while let Ok(outcome) = self.chat_rx.try_recv() {
            self.apply_chat_outcome(outcome);
        }
    }

    fn apply_chat_outcome(&mut self, outcome: ChatOutcome) {
        self.chat_in_flight = false;

        if self.chat_context() != Some(outcome.context) {
            // Navigated away mid-flight: the transcript it belongs to is no
            // longer observed, so the result is discarded. A conversation
            // created in the general context is still remembered.
            if let (ChatContext::General, Ok(settled)) = (outcome.context, &outcome.result) {
                self.general_conversation.get_or_insert(settled.reply.conversation);
            }
            tracing::debug!("Discarded chat outcome for a context no longer in view");
            return;
        }

        match outcome.result {
            Ok(settled) => {
                self.stores
                    .messages
                    .confirm(outcome.local_id, settled.reply.conversation);
                self.stores.messages.append_confirmed(settled.reply.bot_message());
                match outcome.context {
                    ChatContext::General => {
                        self.general_conversation = Some(settled.reply.conversation);
                    }
                    ChatContext::Pipeline(_) => {
                        self.view = self.view.select_conversation(settled.reply.conversation);
                        if let Some(list) = settled.conversations {
                            self.stores.conversations.replace_all(list);
                        }
                    }
                }
            }
            Err(err) => {
                self.stores.messages.remove_pending(outcome.local_id);
                self.fail("Failed to send message", &err);
            }
        }
    }

    /// The chat context currently on screen, if the view accepts sends.
    fn chat_context(&self) -> Option<ChatContext> {
        match self.view {
            View::GeneralChat => Some(ChatContext::General),
            View::Detail {
                pipeline,
                pane: Pane::ChatLanding | Pane::Conversation(_),
            } => Some(ChatContext::Pipeline(pipeline)),
            _ => None,
        }
    }

    // ------------------------------------------------------------------
    // Documents
    // ------------------------------------------------------------------

    pub async fn load_document_metadata(&mut self, document: DocumentId) {
        match self
            .gateway
            .document_metadata(&self.session, document)
            .await
        {
            Ok(metadata) => {
                self.metadata = Some(metadata);
                self.download = None;
            }
            Err(err) => self.fail("Failed to load document details", &err),
        }
    }

    pub async fn resolve_download_url(&mut self) {
        let Some(path) = self
            .metadata
            .as_ref()
            .and_then(|m| m.storage_path.clone())
        else {
            self.notifications.error("No stored file to link");
            return;
        };
        match self.gateway.resolve_download_url(&self.session, &path).await {
            Ok(resolved) => self.download = Some(resolved),
            Err(err) => self.fail("Failed to resolve download link", &err),
        }
    }

    pub async fn delete_document(&mut self, pipeline: PipelineId, document: DocumentId) {
        match self
            .gateway
            .delete_document(&self.session, pipeline, document)
            .await
        {
            Ok(()) => {
                self.stores.documents.remove(document);
                if self.metadata.as_ref().is_some_and(|m| m.document == document) {
                    self.metadata = None;
                    self.download = None;
                }
                self.notifications.success("Removed document");
                self.refresh_pipelines().await;
            }
            Err(err) => self.fail("Failed to remove document", &err),
        }
    }

    pub async fn upload_document(&mut self, file_name: String, bytes: Vec<u8>) {
        let Some(pipeline) = self.view.pipeline() else {
            self.notifications.error("Open a pipeline to upload into");
            return;
        };
        match self
            .gateway
            .upload_document(&self.session, pipeline, &file_name, bytes)
            .await
        {
            Ok(outcome) if outcome.success => {
                self.notifications
                    .success(format!("Uploaded {}", outcome.file_name));
                match self.gateway.documents(&self.session, pipeline).await {
                    Ok(list) => self.stores.documents.replace_all(list),
                    Err(err) => self.fail("Failed to refresh documents", &err),
                }
                self.refresh_pipelines().await;
            }
            Ok(outcome) => {
                let message = if outcome.message.is_empty() {
                    "Upload failed".to_string()
                } else {
                    outcome.message
                };
                self.notifications.error(message);
            }
            Err(err) => self.fail("Failed to upload document", &err),
        }
    }

    /// Refresh document counters after a document mutation. The result is
    /// explicit: a failed refresh surfaces instead of vanishing into a log.
    async fn refresh_pipelines(&mut self) {
        match self.gateway.non_default_pipelines(&self.session).await {
            Ok(list) => self.stores.pipelines.replace_all(list),
            Err(err) => self.fail("Failed to refresh pipelines", &err),
        }
    }

    // ------------------------------------------------------------------
    // User
    // ------------------------------------------------------------------

    /// The one-time name capture.
    pub async fn update_name(&mut self, first_name: String, last_name: String) {
        let first_name = first_name.trim().to_string();
        let last_name = last_name.trim().to_string();
        if first_name.is_empty() {
            self.notifications.error("First name is required");
            return;
        }
        match self
            .gateway
            .update_name(&self.session, &first_name, &last_name)
            .await
        {
            Ok(()) => {
                self.user.set_name(first_name, last_name);
                self.notifications
                    .success(format!("Welcome, {}", self.user.display_name()));
            }
            Err(err) => self.fail("Failed to save name", &err),
        }
    }

    // ------------------------------------------------------------------

    fn fail(&mut self, what: &str, err: &GatewayError) {
        tracing::warn!("{what}: {err}");
        if err.is_auth() {
            self.signed_out = true;
        }
        self.notifications.error(what.to_string());
    }
}
