//! Typed HTTP client for the collaboration API.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use vellum_shared::{Document, Project, UserProfile};

use crate::config::ApiConfig;
use crate::error::{ApiError, Result};

/// Which document endpoint a PATCH targets. Drafts and published documents
/// live under different paths but accept the same partial field map.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocEndpoint {
    Drafts,
    Documents,
}

impl DocEndpoint {
    fn segment(&self) -> &'static str {
        match self {
            DocEndpoint::Drafts => "drafts",
            DocEndpoint::Documents => "documents",
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareableBody {
    is_shareable: bool,
}

#[derive(Debug, Serialize)]
struct SubscriptionsBody<'a> {
    subscriptions: &'a [String],
}

#[derive(Debug, Serialize)]
struct CreateProjectBody<'a> {
    title: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<&'a str>,
}

/// One client per API server. Cheap to clone; the underlying reqwest client
/// pools connections.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: Arc<ApiConfig>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/api/{}{path}",
            self.config.base_url.trim_end_matches('/'),
            self.config.api_version
        )
    }

    /// Map non-2xx responses to [`ApiError::Status`], capturing the body
    /// for the error message.
    async fn check(response: reqwest::Response) -> Result<reqwest::Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status { status, body })
    }

    /// GET `/me`.
    pub async fn me(&self) -> Result<UserProfile> {
        let response = self.http.get(self.url("/me")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// GET `/me/subscriptions`. The server answers `null` for users who
    /// have never subscribed to anything.
    pub async fn subscriptions(&self) -> Result<Option<Vec<String>>> {
        let response = self.http.get(self.url("/me/subscriptions")).send().await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// POST `/me/subscriptions`, replacing the whole subscription index.
    pub async fn set_subscriptions(&self, product_areas: &[String]) -> Result<()> {
        debug!(count = product_areas.len(), "Saving subscription index");
        let response = self
            .http
            .post(self.url("/me/subscriptions"))
            .json(&SubscriptionsBody {
                subscriptions: product_areas,
            })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// GET `/drafts/{id}/shareable`.
    pub async fn draft_is_shareable(&self, doc_id: &str) -> Result<bool> {
        let response = self
            .http
            .get(self.url(&format!("/drafts/{doc_id}/shareable")))
            .send()
            .await?;
        let body: ShareableBody = Self::check(response).await?.json().await?;
        Ok(body.is_shareable)
    }

    /// PUT `/drafts/{id}/shareable`.
    pub async fn set_draft_shareable(&self, doc_id: &str, is_shareable: bool) -> Result<()> {
        debug!(doc_id, is_shareable, "Setting draft visibility");
        let response = self
            .http
            .put(self.url(&format!("/drafts/{doc_id}/shareable")))
            .json(&ShareableBody { is_shareable })
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// GET `/drafts/{id}` or `/documents/{id}`.
    pub async fn document(&self, endpoint: DocEndpoint, doc_id: &str) -> Result<Document> {
        let response = self
            .http
            .get(self.url(&format!("/{}/{doc_id}", endpoint.segment())))
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }

    /// PATCH `/drafts/{id}` or `/documents/{id}` with a partial field map.
    pub async fn patch_document(
        &self,
        endpoint: DocEndpoint,
        doc_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<()> {
        debug!(doc_id, fields = fields.len(), "Patching document");
        let response = self
            .http
            .patch(self.url(&format!("/{}/{doc_id}", endpoint.segment())))
            .json(fields)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// DELETE `/drafts/{id}`.
    pub async fn delete_draft(&self, doc_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/drafts/{doc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// POST `/reviews/{id}`: submit a draft for review.
    pub async fn create_review(&self, doc_id: &str) -> Result<()> {
        debug!(doc_id, "Requesting review");
        let response = self
            .http
            .post(self.url(&format!("/reviews/{doc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// POST `/approvals/{id}`: approve the document.
    pub async fn approve(&self, doc_id: &str) -> Result<()> {
        let response = self
            .http
            .post(self.url(&format!("/approvals/{doc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// DELETE `/approvals/{id}`: request changes / withdraw approval.
    pub async fn revoke_approval(&self, doc_id: &str) -> Result<()> {
        let response = self
            .http
            .delete(self.url(&format!("/approvals/{doc_id}")))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    /// POST `/projects`.
    pub async fn create_project(
        &self,
        title: &str,
        description: Option<&str>,
    ) -> Result<Project> {
        debug!(title, "Creating project");
        let response = self
            .http
            .post(self.url("/projects"))
            .json(&CreateProjectBody { title, description })
            .send()
            .await?;
        Ok(Self::check(response).await?.json().await?)
    }
}
