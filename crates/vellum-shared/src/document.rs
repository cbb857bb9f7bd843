//! Document projection and related records.
//!
//! A [`Document`] is the client-side view of what the API returns for a
//! draft or published document. The sidebar keeps one of these plus a small
//! amount of local edit state; the server remains the source of truth.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a document.
///
/// The API transports this as a free-form string ("WIP", "In-Review", ...);
/// parsing is case- and separator-insensitive so older spellings keep
/// working. Unknown statuses are preserved verbatim in [`Other`].
///
/// [`Other`]: DocumentStatus::Other
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum DocumentStatus {
    Draft,
    InReview,
    Approved,
    Other(String),
}

impl DocumentStatus {
    /// Canonical display spelling, as shown in the sidebar.
    pub fn as_str(&self) -> &str {
        match self {
            DocumentStatus::Draft => "Draft",
            DocumentStatus::InReview => "In-Review",
            DocumentStatus::Approved => "Approved",
            DocumentStatus::Other(s) => s,
        }
    }
}

impl From<String> for DocumentStatus {
    fn from(raw: String) -> Self {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, '-' | '_' | ' '))
            .collect::<String>()
            .to_lowercase();
        match folded.as_str() {
            "draft" | "wip" => DocumentStatus::Draft,
            "inreview" => DocumentStatus::InReview,
            "approved" => DocumentStatus::Approved,
            _ => DocumentStatus::Other(raw),
        }
    }
}

impl From<DocumentStatus> for String {
    fn from(status: DocumentStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A person referenced by a document field (approver, contributor, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentUser {
    pub email: String,
    /// Avatar URL, when the directory knows one.
    #[serde(default)]
    pub img_url: Option<String>,
}

impl DocumentUser {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            img_url: None,
        }
    }
}

/// Value of a custom editable field.
///
/// The API models these as either a plain string ("STRING" fields) or a
/// list of people emails ("PEOPLE" fields).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CustomFieldValue {
    Text(String),
    People(Vec<String>),
}

/// A document-type-specific editable field (e.g. an RFC's "Stakeholders").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomEditableField {
    pub name: String,
    pub display_name: String,
    /// Field kind as reported by the API: "STRING" or "PEOPLE".
    #[serde(rename = "type")]
    pub field_type: String,
    #[serde(default)]
    pub value: Option<CustomFieldValue>,
}

/// Client-side projection of a document.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Server-issued opaque identifier.
    #[serde(rename = "objectID")]
    pub object_id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub summary: String,
    pub status: DocumentStatus,
    pub doc_type: String,
    /// Assigned number, e.g. "LAB-042". A trailing `?` marks a provisional
    /// number that the back end has not finalized yet.
    pub doc_number: String,
    #[serde(default)]
    pub product: String,
    /// Ordered; the first entry is the primary owner.
    #[serde(default)]
    pub owners: Vec<String>,
    #[serde(default)]
    pub approvers: Vec<String>,
    #[serde(default)]
    pub contributors: Vec<String>,
    #[serde(default)]
    pub approved_by: Vec<String>,
    #[serde(default)]
    pub changes_requested_by: Vec<String>,
    /// Custom editable fields keyed by field name.
    #[serde(default)]
    pub custom_editable_fields: BTreeMap<String, CustomEditableField>,
    #[serde(default)]
    pub is_draft: bool,
    /// Locked documents have unresolved header suggestions and cannot be
    /// edited until those are cleared.
    #[serde(default)]
    pub locked: bool,
    /// False for documents imported from outside the app; those are
    /// read-only here.
    #[serde(default)]
    pub app_created: bool,
    #[serde(default)]
    pub modified_time: Option<DateTime<Utc>>,
}

impl Document {
    pub fn primary_owner(&self) -> Option<&str> {
        self.owners.first().map(String::as_str)
    }

    pub fn is_owner(&self, email: &str) -> bool {
        self.primary_owner() == Some(email)
    }

    pub fn is_approver(&self, email: &str) -> bool {
        self.approvers.iter().any(|e| e == email)
    }

    pub fn is_contributor(&self, email: &str) -> bool {
        self.contributors.iter().any(|e| e == email)
    }

    pub fn has_approved(&self, email: &str) -> bool {
        self.approved_by.iter().any(|e| e == email)
    }

    pub fn has_requested_changes(&self, email: &str) -> bool {
        self.changes_requested_by.iter().any(|e| e == email)
    }

    /// Whether the doc number is still a placeholder awaiting assignment.
    pub fn has_provisional_number(&self) -> bool {
        self.doc_number.ends_with('?')
    }
}

/// A project record, as returned by `POST /projects`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
}
