//! In-memory entity stores mirroring server responses.
//!
//! Stores hold the authoritative list contents and mutate only in response
//! to successful gateway calls; a failed call leaves them untouched. The one
//! exception is the optimistic transcript echo, which is appended before the
//! round trip and superseded or removed when it resolves. The conversation
//! and message collections are replaced wholesale on each fetch, never
//! merged incrementally.

use hoos_types::{
    ChatEntry, Conversation, ConversationId, DocumentId, LocalMessageId, Message, PendingMessage,
    Pipeline, PipelineDocument, PipelineId, Tag, TagId,
};

/// The browsable pipelines, with the general pipeline tracked singly.
#[derive(Debug)]
pub struct PipelineStore {
    general: Pipeline,
    items: Vec<Pipeline>,
}

impl PipelineStore {
    #[must_use]
    pub fn new(general: Pipeline, items: Vec<Pipeline>) -> Self {
        Self { general, items }
    }

    #[must_use]
    pub fn general(&self) -> &Pipeline {
        &self.general
    }

    /// Non-general pipelines in backend order; never re-sorted client-side.
    #[must_use]
    pub fn items(&self) -> &[Pipeline] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: PipelineId) -> Option<&Pipeline> {
        self.items.iter().find(|p| p.id == id)
    }

    fn get_mut(&mut self, id: PipelineId) -> Option<&mut Pipeline> {
        self.items.iter_mut().find(|p| p.id == id)
    }

    /// Append a freshly created pipeline.
    pub fn insert(&mut self, pipeline: Pipeline) {
        self.items.push(pipeline);
    }

    /// Replace the whole list from a refetch (document counters and the
    /// like), preserving nothing local.
    pub fn replace_all(&mut self, items: Vec<Pipeline>) {
        self.items = items;
    }

    /// Apply a successful edit: exactly name, description, and system tag
    /// change; custom tags stay as they were.
    pub fn apply_edit(&mut self, updated: &Pipeline) -> bool {
        let Some(existing) = self.get_mut(updated.id) else {
            return false;
        };
        existing.name = updated.name.clone();
        existing.description = updated.description.clone();
        if let Some(system) = updated.tags.iter().find(|t| t.is_system()) {
            existing.tags.retain(|t| !t.is_system());
            existing.tags.insert(0, system.clone());
        }
        true
    }

    pub fn remove(&mut self, id: PipelineId) -> Option<Pipeline> {
        let index = self.items.iter().position(|p| p.id == id)?;
        Some(self.items.remove(index))
    }

    pub fn add_tag(&mut self, pipeline: PipelineId, tag: Tag) -> bool {
        match self.get_mut(pipeline) {
            Some(p) => {
                p.tags.push(tag);
                true
            }
            None => false,
        }
    }

    pub fn remove_tag(&mut self, pipeline: PipelineId, tag: TagId) -> bool {
        match self.get_mut(pipeline) {
            Some(p) => {
                let before = p.tags.len();
                p.tags.retain(|t| t.id != tag);
                p.tags.len() != before
            }
            None => false,
        }
    }
}

/// Conversations of the currently viewed pipeline.
#[derive(Debug, Default)]
pub struct ConversationStore {
    items: Vec<Conversation>,
}

impl ConversationStore {
    /// Wholesale replacement from a fetch.
    pub fn replace_all(&mut self, items: Vec<Conversation>) {
        self.items = items;
    }

    #[must_use]
    pub fn items(&self) -> &[Conversation] {
        &self.items
    }

    #[must_use]
    pub fn get(&self, id: ConversationId) -> Option<&Conversation> {
        self.items.iter().find(|c| c.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: ConversationId) -> bool {
        self.get(id).is_some()
    }

    pub fn remove(&mut self, id: ConversationId) -> bool {
        let before = self.items.len();
        self.items.retain(|c| c.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Transcript of the currently viewed conversation.
#[derive(Debug, Default)]
pub struct MessageStore {
    entries: Vec<ChatEntry>,
}

impl MessageStore {
    /// Wholesale replacement from a transcript fetch. The fetched list is a
    /// total order by timestamp; it is stored as received.
    pub fn replace_all(&mut self, messages: Vec<Message>) {
        self.entries = messages.into_iter().map(ChatEntry::Confirmed).collect();
    }

    #[must_use]
    pub fn entries(&self) -> &[ChatEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the optimistic echo for a just-sent user message.
    pub fn append_pending(&mut self, pending: PendingMessage) -> LocalMessageId {
        let id = pending.local_id;
        self.entries.push(ChatEntry::Pending(pending));
        id
    }

    /// Supersede a pending echo with its acknowledged form, carrying the
    /// authoritative conversation id from the reply.
    pub fn confirm(&mut self, local_id: LocalMessageId, conversation: ConversationId) -> bool {
        for entry in &mut self.entries {
            if let ChatEntry::Pending(pending) = entry
                && pending.local_id == local_id
            {
                *entry = ChatEntry::Delivered {
                    conversation,
                    text: pending.text.clone(),
                    sent_at: pending.sent_at,
                };
                return true;
            }
        }
        false
    }

    /// Drop a pending echo whose round trip failed.
    pub fn remove_pending(&mut self, local_id: LocalMessageId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| {
            !matches!(entry, ChatEntry::Pending(pending) if pending.local_id == local_id)
        });
        self.entries.len() != before
    }

    /// Append a confirmed record (the bot reply) preserving arrival order.
    pub fn append_confirmed(&mut self, message: Message) {
        self.entries.push(ChatEntry::Confirmed(message));
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Documents of the currently viewed pipeline's files pane.
#[derive(Debug, Default)]
pub struct DocumentStore {
    items: Vec<PipelineDocument>,
}

impl DocumentStore {
    pub fn replace_all(&mut self, items: Vec<PipelineDocument>) {
        self.items = items;
    }

    #[must_use]
    pub fn items(&self) -> &[PipelineDocument] {
        &self.items
    }

    pub fn remove(&mut self, id: DocumentId) -> bool {
        let before = self.items.len();
        self.items.retain(|d| d.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

/// Everything the coordinator owns.
#[derive(Debug)]
pub struct Stores {
    pub pipelines: PipelineStore,
    pub conversations: ConversationStore,
    pub messages: MessageStore,
    pub documents: DocumentStore,
    /// The fixed system-tag taxonomy, fetched once at startup.
    pub taxonomy: Vec<Tag>,
}

impl Stores {
    #[must_use]
    pub fn new(general: Pipeline, pipelines: Vec<Pipeline>, taxonomy: Vec<Tag>) -> Self {
        Self {
            pipelines: PipelineStore::new(general, pipelines),
            conversations: ConversationStore::default(),
            messages: MessageStore::default(),
            documents: DocumentStore::default(),
            taxonomy,
        }
    }

    /// Forget everything scoped to a pipeline detail view.
    pub fn clear_detail(&mut self) {
        self.conversations.clear();
        self.messages.clear();
        self.documents.clear();
    }
}
