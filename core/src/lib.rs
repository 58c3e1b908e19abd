//! Application state for the HoosStudying client.
//!
//! This crate is the navigation and state-synchronization core: the explicit
//! view-state machine ([`View`]), the entity stores mirroring server
//! responses ([`Stores`]), the pure category grouping, and the CRUD
//! orchestration that ties them to the remote gateway ([`App`]). Rendering
//! and input live elsewhere; nothing in here touches the terminal.

mod app;
pub mod grouping;
mod notify;
mod store;
mod view;

pub use app::{App, Bootstrap, ChatOutcome, Command};
pub use grouping::{CategoryGroup, CollapseState, FALLBACK_CATEGORY, group_by_category};
pub use notify::{Notification, Notifications, Severity};
pub use store::{ConversationStore, DocumentStore, MessageStore, PipelineStore, Stores};
pub use view::{Pane, View};
