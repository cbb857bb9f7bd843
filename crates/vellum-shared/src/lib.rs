//! # vellum-shared
//!
//! Domain types shared between the vellum client crates: documents and
//! their editable fields, user profiles, subscriptions, and the
//! draft-visibility presentation enums.
//!
//! Everything here is a plain serde-friendly projection of what the
//! collaboration API returns; the stateful logic lives in `vellum-client`.

pub mod document;
pub mod user;
pub mod visibility;

pub use document::{
    CustomEditableField, CustomFieldValue, Document, DocumentStatus, DocumentUser, Project,
};
pub use user::{Subscription, SubscriptionType, UserProfile};
pub use visibility::{DraftVisibility, DraftVisibilityIcon};
