//! The view-state machine.
//!
//! One explicit sum type owns "where the user is", and each variant carries
//! exactly the entity references valid in that state. A conversation id can
//! only exist inside a pipeline detail, so the "dangling selection after
//! delete" class of bug is unrepresentable rather than merely avoided.
//!
//! Transitions are pure: side effects (conversation and transcript fetches)
//! belong to the orchestration layer, which calls these methods and then
//! performs whatever IO the new state needs.

use hoos_types::{ConversationId, Pipeline, PipelineId};

/// Which pane of a pipeline detail is showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pane {
    /// Conversation list, nothing selected.
    ChatLanding,
    /// An open transcript.
    Conversation(ConversationId),
    /// The files table. The conversation selection survives the toggle so
    /// switching back lands where the user left off.
    Files {
        conversation: Option<ConversationId>,
    },
}

/// Top-level view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Document-less chat against the general pipeline.
    GeneralChat,
    /// The pipeline browser.
    PipelineList,
    /// Inside one pipeline.
    Detail { pipeline: PipelineId, pane: Pane },
}

impl View {
    /// Initial state, derived from the default pipeline returned at login.
    #[must_use]
    pub fn initial(default_pipeline: &Pipeline) -> Self {
        if default_pipeline.is_general() {
            View::GeneralChat
        } else {
            View::PipelineList
        }
    }

    /// The pipeline in view, if any.
    #[must_use]
    pub fn pipeline(self) -> Option<PipelineId> {
        match self {
            View::GeneralChat | View::PipelineList => None,
            View::Detail { pipeline, .. } => Some(pipeline),
        }
    }

    /// The open conversation. `None` in the files pane even when a selection
    /// is being preserved there: nothing is rendered from it.
    #[must_use]
    pub fn conversation(self) -> Option<ConversationId> {
        match self {
            View::Detail {
                pane: Pane::Conversation(id),
                ..
            } => Some(id),
            _ => None,
        }
    }

    /// Open the pipeline browser from general chat.
    #[must_use]
    pub fn open_pipeline_browser(self) -> Self {
        match self {
            View::GeneralChat => View::PipelineList,
            other => other,
        }
    }

    /// Enter a pipeline. Always lands on the chat landing; the caller owns
    /// fetching the conversation list.
    #[must_use]
    pub fn select_pipeline(self, pipeline: PipelineId) -> Self {
        View::Detail {
            pipeline,
            pane: Pane::ChatLanding,
        }
    }

    /// Open a conversation within the current pipeline. No-op outside a
    /// detail view, where no conversation list is on screen.
    #[must_use]
    pub fn select_conversation(self, conversation: ConversationId) -> Self {
        match self {
            View::Detail { pipeline, .. } => View::Detail {
                pipeline,
                pane: Pane::Conversation(conversation),
            },
            other => other,
        }
    }

    /// Flip between the files pane and the chat pane it was entered from.
    #[must_use]
    pub fn toggle_files(self) -> Self {
        let View::Detail { pipeline, pane } = self else {
            return self;
        };
        let pane = match pane {
            Pane::ChatLanding => Pane::Files { conversation: None },
            Pane::Conversation(id) => Pane::Files {
                conversation: Some(id),
            },
            Pane::Files {
                conversation: Some(id),
            } => Pane::Conversation(id),
            Pane::Files { conversation: None } => Pane::ChatLanding,
        };
        View::Detail { pipeline, pane }
    }

    /// The "home" affordance: unconditionally discard the conversation
    /// selection without leaving the pipeline.
    #[must_use]
    pub fn home(self) -> Self {
        match self {
            View::Detail { pipeline, .. } => View::Detail {
                pipeline,
                pane: Pane::ChatLanding,
            },
            other => other,
        }
    }

    /// The General Chat navigation item. From a pipeline detail it exits to
    /// the browser; from the browser it enters general chat.
    #[must_use]
    pub fn select_general_chat(self) -> Self {
        match self {
            View::Detail { .. } => View::PipelineList,
            View::PipelineList | View::GeneralChat => View::GeneralChat,
        }
    }

    /// React to a conversation deletion. The open transcript can never
    /// outlive its conversation.
    #[must_use]
    pub fn on_conversation_deleted(self, deleted: ConversationId) -> Self {
        match self {
            View::Detail {
                pipeline,
                pane: Pane::Conversation(id),
            } if id == deleted => View::Detail {
                pipeline,
                pane: Pane::ChatLanding,
            },
            View::Detail {
                pipeline,
                pane:
                    Pane::Files {
                        conversation: Some(id),
                    },
            } if id == deleted => View::Detail {
                pipeline,
                pane: Pane::Files { conversation: None },
            },
            other => other,
        }
    }

    /// React to a pipeline deletion: a detail view of the deleted pipeline
    /// resets to the browser rather than going stale.
    #[must_use]
    pub fn on_pipeline_deleted(self, deleted: PipelineId) -> Self {
        match self {
            View::Detail { pipeline, .. } if pipeline == deleted => View::PipelineList,
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoos_types::{GENERAL_PIPELINE_NAME, UserId};

    fn pipeline(name: &str) -> Pipeline {
        Pipeline {
            id: PipelineId::new(7),
            owner: UserId::new(1),
            name: name.into(),
            description: String::new(),
            created_at: None,
            number_of_documents: None,
            tags: Vec::new(),
        }
    }

    const P: PipelineId = PipelineId::new(7);
    const C: ConversationId = ConversationId::new(501);

    #[test]
    fn initial_state_follows_sentinel() {
        assert_eq!(
            View::initial(&pipeline(GENERAL_PIPELINE_NAME)),
            View::GeneralChat
        );
        assert_eq!(View::initial(&pipeline("Biology 101")), View::PipelineList);
    }

    #[test]
    fn selecting_pipeline_lands_on_chat_landing() {
        let view = View::PipelineList.select_pipeline(P);
        assert_eq!(
            view,
            View::Detail {
                pipeline: P,
                pane: Pane::ChatLanding
            }
        );
        assert_eq!(view.conversation(), None);
    }

    #[test]
    fn files_toggle_preserves_conversation_selection() {
        let open = View::PipelineList.select_pipeline(P).select_conversation(C);
        let files = open.toggle_files();
        assert_eq!(
            files,
            View::Detail {
                pipeline: P,
                pane: Pane::Files {
                    conversation: Some(C)
                }
            }
        );
        // Nothing renders from the preserved selection while in files.
        assert_eq!(files.conversation(), None);
        assert_eq!(files.toggle_files(), open);
    }

    #[test]
    fn files_toggle_without_selection_round_trips_to_landing() {
        let landing = View::PipelineList.select_pipeline(P);
        assert_eq!(landing.toggle_files().toggle_files(), landing);
    }

    #[test]
    fn home_discards_conversation_but_keeps_pipeline() {
        let view = View::PipelineList
            .select_pipeline(P)
            .select_conversation(C)
            .home();
        assert_eq!(
            view,
            View::Detail {
                pipeline: P,
                pane: Pane::ChatLanding
            }
        );
    }

    #[test]
    fn general_chat_item_exits_detail_to_browser() {
        let view = View::PipelineList.select_pipeline(P).select_general_chat();
        assert_eq!(view, View::PipelineList);
        assert_eq!(view.select_general_chat(), View::GeneralChat);
    }

    #[test]
    fn deleting_open_conversation_returns_to_landing() {
        let view = View::PipelineList
            .select_pipeline(P)
            .select_conversation(C)
            .on_conversation_deleted(C);
        assert_eq!(
            view,
            View::Detail {
                pipeline: P,
                pane: Pane::ChatLanding
            }
        );
    }

    #[test]
    fn deleting_other_conversation_is_a_no_op() {
        let view = View::PipelineList.select_pipeline(P).select_conversation(C);
        assert_eq!(view.on_conversation_deleted(ConversationId::new(999)), view);
    }

    #[test]
    fn deleting_preserved_selection_clears_it_in_files() {
        let view = View::PipelineList
            .select_pipeline(P)
            .select_conversation(C)
            .toggle_files()
            .on_conversation_deleted(C);
        assert_eq!(
            view,
            View::Detail {
                pipeline: P,
                pane: Pane::Files { conversation: None }
            }
        );
    }

    #[test]
    fn deleting_open_pipeline_resets_to_browser() {
        let view = View::PipelineList
            .select_pipeline(P)
            .select_conversation(C)
            .on_pipeline_deleted(P);
        assert_eq!(view, View::PipelineList);
    }
}
