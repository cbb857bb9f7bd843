//! Events emitted toward the embedding UI.
//!
//! Flash notifications, route refreshes, and navigation are all rendered by
//! whatever shell embeds this crate; the core only emits them on a channel.

use serde::Serialize;
use tokio::sync::mpsc;

/// Severity of a flash notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashLevel {
    Success,
    Critical,
}

/// A transient notification banner.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FlashMessage {
    pub title: String,
    pub message: String,
    pub level: FlashLevel,
}

/// Everything the core asks the UI shell to do.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum UiEvent {
    Flash(FlashMessage),
    /// Re-run the current route's model.
    RefreshRoute,
    /// Navigate to a document's page.
    NavigateToDocument { doc_id: String, draft: bool },
    /// Navigate to a project's page.
    NavigateToProject { project_id: u64 },
}

/// Cloneable sender handle for [`UiEvent`]s.
#[derive(Debug, Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<UiEvent>,
}

impl EventSink {
    /// Create a sink plus the receiving end the UI shell drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<UiEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn emit(&self, event: UiEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!(error = %e, "Failed to emit UI event");
        }
    }

    pub fn flash_success(&self, title: &str, message: impl std::fmt::Display) {
        self.emit(UiEvent::Flash(FlashMessage {
            title: title.to_string(),
            message: message.to_string(),
            level: FlashLevel::Success,
        }));
    }

    pub fn flash_error(&self, title: &str, error: impl std::fmt::Display) {
        self.emit(UiEvent::Flash(FlashMessage {
            title: title.to_string(),
            message: error.to_string(),
            level: FlashLevel::Critical,
        }));
    }

    pub fn refresh_route(&self) {
        self.emit(UiEvent::RefreshRoute);
    }

    pub fn navigate_to_document(&self, doc_id: &str, draft: bool) {
        self.emit(UiEvent::NavigateToDocument {
            doc_id: doc_id.to_string(),
            draft,
        });
    }

    pub fn navigate_to_project(&self, project_id: u64) {
        self.emit(UiEvent::NavigateToProject { project_id });
    }
}
