//! Client configuration loaded from environment variables.
//!
//! All settings have defaults that point at a local development server, so
//! the client can start with zero configuration.

use std::time::Duration;

/// Fixed delays used by the sidebar's timed behaviors.
///
/// Production values match the UI animations these delays exist for; tests
/// run with [`Timings::instant`] so nothing actually sleeps.
#[derive(Debug, Clone)]
pub struct Timings {
    /// How long the share button takes to animate out when a draft is
    /// switched back to restricted.
    pub visibility_animation: Duration,

    /// How long the "Link created!" confirmation stays visible.
    pub link_created_display: Duration,

    /// Pause between doc-number poll attempts after publishing.
    pub doc_number_poll_interval: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            visibility_animation: Duration::from_millis(300),
            link_created_display: Duration::from_secs(1),
            doc_number_poll_interval: Duration::from_secs(1),
        }
    }
}

impl Timings {
    /// Zero-delay profile for tests.
    pub fn instant() -> Self {
        Self {
            visibility_animation: Duration::ZERO,
            link_created_display: Duration::ZERO,
            doc_number_poll_interval: Duration::ZERO,
        }
    }
}

/// Configuration for the API client.
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Origin of the API server, without a trailing slash.
    /// Env: `VELLUM_BASE_URL`
    /// Default: `http://127.0.0.1:8000`
    pub base_url: String,

    /// API version segment, e.g. `v1` in `/api/v1/me`.
    /// Env: `VELLUM_API_VERSION`
    /// Default: `v1`
    pub api_version: String,

    /// Base URL for short links to published documents, normalized to end
    /// with a slash. `None` when unset or not a valid http(s) URL, in which
    /// case share links fall back to the document's own URL.
    /// Env: `VELLUM_SHORT_LINK_BASE_URL`
    pub short_link_base_url: Option<String>,

    /// Timer profile for the sidebar's delayed behaviors.
    pub timings: Timings,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            api_version: "v1".to_string(),
            short_link_base_url: None,
            timings: Timings::default(),
        }
    }
}

impl ApiConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("VELLUM_BASE_URL") {
            config.base_url = url.trim_end_matches('/').to_string();
        }

        if let Ok(version) = std::env::var("VELLUM_API_VERSION") {
            config.api_version = version;
        }

        if let Ok(url) = std::env::var("VELLUM_SHORT_LINK_BASE_URL") {
            config.short_link_base_url = normalize_short_link_base(&url);
            if config.short_link_base_url.is_none() {
                tracing::warn!(value = %url, "Invalid VELLUM_SHORT_LINK_BASE_URL, ignoring");
            }
        }

        config
    }

    /// Set and normalize the short-link base URL.
    pub fn with_short_link_base_url(mut self, url: &str) -> Self {
        self.short_link_base_url = normalize_short_link_base(url);
        self
    }

    /// URL of a document's own page, used as the share link for drafts and
    /// as the fallback when no short-link base is configured.
    pub fn document_url(&self, doc_id: &str) -> String {
        format!("{}/document/{doc_id}", self.base_url)
    }
}

/// Validate an http(s) URL and make sure it ends with a slash.
fn normalize_short_link_base(url: &str) -> Option<String> {
    let candidate = if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{url}/")
    };

    match reqwest::Url::parse(&candidate) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Some(candidate),
        _ => None,
    }
}
