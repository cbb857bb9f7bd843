//! # vellum-api
//!
//! Thin typed wrapper around the collaboration API: one method per
//! endpoint, JSON in and out, and a uniform error for anything non-2xx.
//! No retries and no state; the stateful orchestration lives in
//! `vellum-client`.

pub mod client;
pub mod config;

mod error;

pub use client::{ApiClient, DocEndpoint};
pub use config::{ApiConfig, Timings};
pub use error::{ApiError, Result};
