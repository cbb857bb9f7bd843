//! # vellum-client
//!
//! Client-side core of the vellum document-collaboration tool: the
//! document-sidebar state machine, the authenticated-user session cache,
//! and the new-project form. The crate is UI-agnostic: it mutates its own
//! state and emits [`events::UiEvent`]s; rendering, routing, and flash
//! display belong to whatever shell embeds it.
//!
//! Concurrency follows the single-task cooperative model of a UI event
//! loop. Operations that can overlap declare a discipline from
//! [`task`]: restartable (latest wins, superseded effects never land) or
//! keep-latest (queued invocations collapse to the newest).

pub mod events;
pub mod project;
pub mod session;
pub mod sidebar;
pub mod task;

#[cfg(test)]
mod testutil;

pub use events::{EventSink, FlashLevel, FlashMessage, UiEvent};
pub use project::ProjectForm;
pub use session::AuthenticatedUser;
pub use sidebar::{DocumentSidebar, FieldValue, SidebarState};
