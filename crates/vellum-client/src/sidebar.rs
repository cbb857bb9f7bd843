//! Document sidebar: metadata editing, draft visibility, and the
//! review/approval workflow.
//!
//! The sidebar owns a local projection of one document plus the flags that
//! drive its UI. Network effects follow three concurrency disciplines:
//! visibility toggling, the link-created timer, and doc-number polling are
//! restartable (latest wins); product saves are keep-latest; everything
//! else runs unqueued.

use std::sync::{Arc, Mutex};

use serde_json::{json, Map, Value};
use tracing::{debug, warn};

use vellum_api::{ApiClient, ApiError, DocEndpoint, Result};
use vellum_shared::{
    CustomEditableField, CustomFieldValue, Document, DocumentStatus, DocumentUser,
    DraftVisibility, DraftVisibilityIcon, UserProfile,
};

use crate::events::EventSink;
use crate::task::{KeepLatest, Restartable};

/// Poll attempts for a freshly published document's number.
const DOC_NUMBER_POLL_ATTEMPTS: usize = 10;

/// A value being saved to a document field.
#[derive(Debug, Clone)]
pub enum FieldValue {
    /// Free text; cleaned before sending.
    Text(String),
    /// People records; serialized to their emails.
    Users(Vec<DocumentUser>),
}

/// Everything the sidebar tracks for one document.
#[derive(Debug, Clone)]
pub struct SidebarState {
    /// Server-fetched projection; refreshed by doc-number polling.
    pub document: Document,

    // Locally edited copies of metadata fields.
    pub title: String,
    pub summary: String,
    pub product: String,
    pub approvers: Vec<DocumentUser>,
    pub contributors: Vec<DocumentUser>,

    /// One-way latch: set when a review request succeeds, so the UI flips
    /// to the published presentation without waiting for a re-fetch.
    /// `None` means "not published this session (as far as we know)".
    pub draft_was_published: Option<bool>,

    /// The draft's saved `isShareable` flag. Only meaningful for drafts.
    pub doc_is_shareable: bool,

    /// Intent icon set the moment a visibility option is picked, cleared
    /// when the toggle operation finishes.
    pub new_visibility_icon: Option<DraftVisibilityIcon>,

    /// Whether the initial shareable-flag fetch is still running.
    pub fetching_permissions: bool,

    /// Whether the "Link created!" confirmation is currently displayed.
    pub link_created_message_shown: bool,

    /// Set when doc-number polling exhausts its attempts; the published
    /// modal then hides the URL and share button.
    pub doc_number_lookup_failed: bool,

    pub archive_modal_shown: bool,
    pub delete_modal_shown: bool,
    pub request_review_modal_shown: bool,
    pub doc_published_modal_shown: bool,
}

impl SidebarState {
    fn new(document: Document) -> Self {
        let approvers = document
            .approvers
            .iter()
            .map(|e| DocumentUser::new(e.clone()))
            .collect();
        let contributors = document
            .contributors
            .iter()
            .map(|e| DocumentUser::new(e.clone()))
            .collect();
        Self {
            title: document.title.clone(),
            summary: document.summary.clone(),
            product: document.product.clone(),
            approvers,
            contributors,
            draft_was_published: None,
            doc_is_shareable: false,
            new_visibility_icon: None,
            fetching_permissions: false,
            link_created_message_shown: false,
            doc_number_lookup_failed: false,
            archive_modal_shown: false,
            delete_modal_shown: false,
            request_review_modal_shown: false,
            doc_published_modal_shown: false,
            document,
        }
    }

    /// Whether the doc is a draft. Once published this session, never a
    /// draft again, whatever later fetches say.
    pub fn is_draft(&self) -> bool {
        if self.draft_was_published == Some(true) {
            false
        } else {
            self.document.is_draft
        }
    }

    fn draft_is_shareable(&self) -> bool {
        self.is_draft() && self.doc_is_shareable
    }

    /// The saved visibility, which the toggle compares new selections to.
    pub fn draft_visibility(&self) -> DraftVisibility {
        if self.draft_is_shareable() {
            DraftVisibility::Shareable
        } else {
            DraftVisibility::Restricted
        }
    }

    /// Icon for the visibility toggle: loading while the saved flag is
    /// being fetched, then any pending intent, then the saved state.
    pub fn visibility_icon(&self) -> DraftVisibilityIcon {
        if self.fetching_permissions {
            return DraftVisibilityIcon::Loading;
        }
        if let Some(icon) = self.new_visibility_icon {
            return icon;
        }
        self.draft_visibility().icon()
    }

    /// Whether the share button is shown. `None` for published docs, where
    /// the decision belongs to the published-document header.
    pub fn share_button_shown(&self) -> Option<bool> {
        if !self.is_draft() {
            return None;
        }
        Some(self.doc_is_shareable)
    }

    /// Share link for the document: drafts always use the document URL;
    /// published docs prefer a short link when one is configured.
    pub fn share_url(&self, config: &vellum_api::ApiConfig) -> String {
        if self.is_draft() {
            return config.document_url(&self.document.object_id);
        }
        match &config.short_link_base_url {
            Some(base) => format!(
                "{base}{}/{}",
                self.document.doc_type.to_lowercase(),
                self.document.doc_number.to_lowercase()
            ),
            None => config.document_url(&self.document.object_id),
        }
    }

    /// Whether a blocking confirmation modal is open. Flash errors are
    /// suppressed while one is, to avoid stacking overlays.
    pub fn modal_is_shown(&self) -> bool {
        self.archive_modal_shown || self.delete_modal_shown || self.request_review_modal_shown
    }

    /// Whether metadata editing is disabled for `email`. Locked and
    /// off-app docs are never editable; in known lifecycle states editing
    /// is exclusive to the owner; unknown states are read-only.
    pub fn editing_is_disabled(&self, email: &str) -> bool {
        if self.document.locked || !self.document.app_created {
            return true;
        }
        let known_state = self.is_draft()
            || self.document.status == DocumentStatus::InReview
            || self.document.status == DocumentStatus::Approved;
        if known_state {
            !self.document.is_owner(email)
        } else {
            true
        }
    }

    pub fn footer_controls_disabled(&self) -> bool {
        self.document.locked || !self.document.app_created
    }

    pub fn footer_shown(&self, email: &str) -> bool {
        self.document.is_approver(email)
            || self.document.is_owner(email)
            || self.document.is_contributor(email)
    }

    pub fn approve_button_text(&self, email: &str) -> &'static str {
        if self.document.has_approved(email) {
            "Already approved"
        } else {
            "Approve"
        }
    }

    pub fn request_changes_button_text(&self, email: &str) -> &'static str {
        // FRDs can only be approved or not approved.
        if self.document.doc_type == "FRD" {
            if self.document.has_requested_changes(email) {
                "Already not approved"
            } else {
                "Not approved"
            }
        } else if self.document.has_requested_changes(email) {
            "Already requested changes"
        } else {
            "Request changes"
        }
    }

    /// Status the move-to-status button targets from the current one.
    pub fn move_to_status_target(&self) -> DocumentStatus {
        match self.document.status {
            DocumentStatus::InReview => DocumentStatus::Approved,
            _ => DocumentStatus::InReview,
        }
    }

    pub fn move_to_status_button_text(&self) -> String {
        format!("Move to {}", self.move_to_status_target())
    }
}

/// Stateful handle for one document's sidebar. Cheap to clone; clones share
/// the same state and supersession counters.
#[derive(Debug, Clone)]
pub struct DocumentSidebar {
    api: ApiClient,
    events: EventSink,
    profile: UserProfile,
    doc_id: String,
    state: Arc<Mutex<SidebarState>>,
    visibility_task: Arc<Restartable>,
    link_created_task: Arc<Restartable>,
    doc_number_task: Arc<Restartable>,
    product_saves: Arc<KeepLatest>,
}

impl DocumentSidebar {
    pub fn new(
        api: ApiClient,
        events: EventSink,
        profile: UserProfile,
        document: Document,
    ) -> Self {
        Self {
            doc_id: document.object_id.clone(),
            state: Arc::new(Mutex::new(SidebarState::new(document))),
            api,
            events,
            profile,
            visibility_task: Arc::new(Restartable::new()),
            link_created_task: Arc::new(Restartable::new()),
            doc_number_task: Arc::new(Restartable::new()),
            product_saves: Arc::new(KeepLatest::new()),
        }
    }

    pub fn doc_id(&self) -> &str {
        &self.doc_id
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> SidebarState {
        self.state.lock().unwrap().clone()
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut SidebarState) -> R) -> R {
        f(&mut self.state.lock().unwrap())
    }

    fn maybe_flash_error(&self, title: &str, error: &ApiError) {
        if !self.with_state(|s| s.modal_is_shown()) {
            self.events.flash_error(title, error);
        }
    }

    /// Fetch the draft's saved shareable flag. Run once when a draft's
    /// sidebar is mounted; fetch errors leave the flag restricted.
    pub async fn fetch_draft_permissions(&self) {
        self.with_state(|s| s.fetching_permissions = true);
        match self.api.draft_is_shareable(&self.doc_id).await {
            Ok(is_shareable) => {
                self.with_state(|s| s.doc_is_shareable = is_shareable);
            }
            Err(e) => {
                debug!(doc_id = %self.doc_id, error = %e, "Could not fetch draft permissions");
            }
        }
        self.with_state(|s| s.fetching_permissions = false);
    }

    /// Change the draft's visibility. Restartable: a newer selection
    /// supersedes the one in flight, and the superseded run's delayed
    /// effects never land.
    ///
    /// The two directions are deliberately asymmetric, matching the UI
    /// animation each drives.
    pub async fn set_draft_visibility(&self, target: DraftVisibility) {
        if self.with_state(|s| s.draft_visibility()) == target {
            return;
        }
        let token = self.visibility_task.start();
        let timings = self.api.config().timings.clone();

        match target {
            DraftVisibility::Restricted => {
                self.with_state(|s| {
                    s.new_visibility_icon = Some(DraftVisibilityIcon::Restricted)
                });

                // Fire and forget; a failure only flashes, the share
                // button has already animated out. The flash is still a
                // deferred effect, so it checks the token too.
                let api = self.api.clone();
                let events = self.events.clone();
                let doc_id = self.doc_id.clone();
                let put_token = token.clone();
                tokio::spawn(async move {
                    if let Err(e) = api.set_draft_shareable(&doc_id, false).await {
                        if put_token.is_current() {
                            events.flash_error("Unable to update draft visibility", e);
                        }
                    }
                });

                // Give the share button time to animate out, then drop it.
                tokio::time::sleep(timings.visibility_animation).await;
                if token.is_current() {
                    self.with_state(|s| s.doc_is_shareable = false);
                }
            }
            DraftVisibility::Shareable => {
                // Show the share button in its creating-link state before
                // the request settles.
                self.with_state(|s| {
                    s.new_visibility_icon = Some(DraftVisibilityIcon::Shareable);
                    s.doc_is_shareable = true;
                });

                let result = self.api.set_draft_shareable(&self.doc_id, true).await;
                if token.is_current() {
                    match result {
                        Ok(()) => self.spawn_link_created_timer(),
                        // The optimistic flag stays true on failure.
                        Err(e) => {
                            self.events.flash_error("Unable to update draft visibility", e)
                        }
                    }
                }
            }
        }

        if token.is_current() {
            self.with_state(|s| s.new_visibility_icon = None);
        }
    }

    /// Show the "Link created!" confirmation for a fixed interval.
    /// Restartable: re-creating the link restarts the timer.
    fn spawn_link_created_timer(&self) {
        let this = self.clone();
        tokio::spawn(async move {
            let token = this.link_created_task.start();
            this.with_state(|s| s.link_created_message_shown = true);
            tokio::time::sleep(this.api.config().timings.link_created_display).await;
            if token.is_current() {
                this.with_state(|s| s.link_created_message_shown = false);
            }
        });
    }

    /// PATCH the document, targeting the draft or published endpoint by
    /// current status. A route refresh is emitted after the call settles,
    /// success or failure.
    pub async fn patch_document(&self, fields: Map<String, Value>) -> Result<()> {
        let endpoint = if self.with_state(|s| s.is_draft()) {
            DocEndpoint::Drafts
        } else {
            DocEndpoint::Documents
        };

        let result = self.api.patch_document(endpoint, &self.doc_id, &fields).await;
        if let Err(e) = &result {
            self.maybe_flash_error("Unable to save document", e);
        }
        self.events.refresh_route();
        result
    }

    /// Save one metadata field. Text is cleaned, people lists are reduced
    /// to emails. Errors surface as a flash and are otherwise swallowed.
    pub async fn save(&self, field: &str, value: FieldValue) {
        if field.is_empty() {
            return;
        }
        let serialized = match value {
            FieldValue::Text(text) => Value::String(clean_string(&text)),
            FieldValue::Users(users) => {
                Value::Array(users.into_iter().map(|u| Value::String(u.email)).collect())
            }
        };

        let mut fields = Map::new();
        fields.insert(field.to_string(), serialized);
        if let Err(e) = self.patch_document(fields).await {
            self.events.flash_error("Unable to save document", e);
        }
    }

    pub async fn save_title(&self, title: String) {
        self.with_state(|s| s.title = title.clone());
        self.save("title", FieldValue::Text(title)).await;
    }

    pub async fn save_summary(&self, summary: String) {
        self.with_state(|s| s.summary = summary.clone());
        self.save("summary", FieldValue::Text(summary)).await;
    }

    /// Save the product/area field. Keep-latest: overlapping saves collapse
    /// to the most recent.
    pub async fn save_product(&self, product: String) {
        self.product_saves
            .run(|| async {
                self.with_state(|s| s.product = product.clone());
                self.save("product", FieldValue::Text(product.clone())).await;
            })
            .await;
    }

    /// Save a document-type-specific field via the `customFields` patch
    /// shape.
    pub async fn save_custom_field(
        &self,
        field_name: &str,
        mut field: CustomEditableField,
        value: CustomFieldValue,
    ) {
        let value = match value {
            CustomFieldValue::Text(text) => CustomFieldValue::Text(clean_string(&text)),
            people @ CustomFieldValue::People(_) => people,
        };
        field.name = field_name.to_string();
        field.value = Some(value);

        let mut fields = Map::new();
        fields.insert("customFields".to_string(), json!([field]));
        if let Err(e) = self.patch_document(fields).await {
            self.events.flash_error("Unable to save document", e);
        }
    }

    /// Submit the draft for review: save approvers, create the review,
    /// leave the draft view, and wait for the doc number to be assigned.
    /// On success the one-way published latch is set and the published
    /// modal opens; on failure the latch resets to unknown.
    pub async fn request_review(&self) -> Result<()> {
        let result = self.request_review_inner().await;
        if let Err(e) = &result {
            self.with_state(|s| s.draft_was_published = None);
            self.maybe_flash_error("Unable to request review", e);
        }
        result
    }

    async fn request_review_inner(&self) -> Result<()> {
        let approver_emails: Vec<Value> = self.with_state(|s| {
            s.approvers
                .iter()
                .map(|u| Value::String(u.email.clone()))
                .collect()
        });
        let mut fields = Map::new();
        fields.insert("approvers".to_string(), Value::Array(approver_emails));
        self.patch_document(fields).await?;

        self.api.create_review(&self.doc_id).await?;

        self.events.navigate_to_document(&self.doc_id, false);
        self.events.refresh_route();

        self.wait_for_doc_number().await;

        self.with_state(|s| {
            s.draft_was_published = Some(true);
            s.request_review_modal_shown = false;
            s.doc_published_modal_shown = true;
        });
        Ok(())
    }

    /// Bounded poll for the published document's number assignment: up to
    /// ten attempts, stopping at the first one without the provisional
    /// marker. Exhaustion degrades the published modal (no URL or share
    /// button) instead of failing the publish. Restartable.
    async fn wait_for_doc_number(&self) {
        let token = self.doc_number_task.start();
        let interval = self.api.config().timings.doc_number_poll_interval;

        for attempt in 1..=DOC_NUMBER_POLL_ATTEMPTS {
            match self.api.document(DocEndpoint::Documents, &self.doc_id).await {
                Ok(document) => {
                    if !token.is_current() {
                        return;
                    }
                    if !document.has_provisional_number() {
                        self.with_state(|s| s.document = document);
                        return;
                    }
                }
                Err(e) => {
                    // Counts as an unresolved attempt.
                    debug!(doc_id = %self.doc_id, attempt, error = %e, "Doc number poll failed");
                    if !token.is_current() {
                        return;
                    }
                }
            }
            tokio::time::sleep(interval).await;
            if !token.is_current() {
                return;
            }
        }

        warn!(doc_id = %self.doc_id, "Doc number was not assigned in time");
        self.with_state(|s| s.doc_number_lookup_failed = true);
    }

    /// Approve the document.
    pub async fn approve(&self) -> Result<()> {
        match self.api.approve(&self.doc_id).await {
            Ok(()) => {
                self.events.flash_success("Done!", "Document approved");
                self.events.refresh_route();
                Ok(())
            }
            Err(e) => {
                self.maybe_flash_error("Unable to approve", &e);
                Err(e)
            }
        }
    }

    /// Request changes (for FRDs: mark not approved).
    pub async fn request_changes(&self) -> Result<()> {
        match self.api.revoke_approval(&self.doc_id).await {
            Ok(()) => {
                let message = if self.with_state(|s| s.document.doc_type == "FRD") {
                    "Document marked as not approved"
                } else {
                    "Requested changes for document"
                };
                self.events.flash_success("Done!", message);
                self.events.refresh_route();
                Ok(())
            }
            Err(e) => {
                self.maybe_flash_error("Change request failed", &e);
                Err(e)
            }
        }
    }

    /// Move the document to a new lifecycle status.
    pub async fn change_document_status(&self, status: DocumentStatus) -> Result<()> {
        let mut fields = Map::new();
        fields.insert(
            "status".to_string(),
            Value::String(status.as_str().to_string()),
        );
        match self.patch_document(fields).await {
            Ok(()) => {
                self.events.flash_success(
                    "Done!",
                    format!("Document status changed to \"{status}\""),
                );
                self.events.refresh_route();
                Ok(())
            }
            Err(e) => {
                self.maybe_flash_error("Unable to change document status", &e);
                Err(e)
            }
        }
    }

    /// Delete the draft.
    pub async fn delete_draft(&self) -> Result<()> {
        match self.api.delete_draft(&self.doc_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                self.maybe_flash_error("Unable to delete draft", &e);
                Err(e)
            }
        }
    }

    pub fn update_approvers(&self, approvers: Vec<DocumentUser>) {
        self.with_state(|s| s.approvers = approvers);
    }

    pub fn update_contributors(&self, contributors: Vec<DocumentUser>) {
        self.with_state(|s| s.contributors = contributors);
    }

    pub fn set_archive_modal(&self, shown: bool) {
        self.with_state(|s| s.archive_modal_shown = shown);
    }

    pub fn set_delete_modal(&self, shown: bool) {
        self.with_state(|s| s.delete_modal_shown = shown);
    }

    pub fn set_request_review_modal(&self, shown: bool) {
        self.with_state(|s| s.request_review_modal_shown = shown);
    }

    pub fn set_doc_published_modal(&self, shown: bool) {
        self.with_state(|s| s.doc_published_modal_shown = shown);
    }
}

/// Collapse runs of whitespace (including newlines pasted into single-line
/// fields) and trim the ends.
fn clean_string(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
