//! HTTP persistence gateway.
//!
//! Talks to the architectures REST API:
//!
//! | Operation | Request |
//! |-----------|---------|
//! | list      | `GET    {base}/architectures?skip=&limit=` |
//! | get       | `GET    {base}/architectures/{id}` |
//! | create    | `POST   {base}/architectures` |
//! | update    | `PUT    {base}/architectures/{id}` |
//! | delete    | `DELETE {base}/architectures/{id}` |
//! | duplicate | `POST   {base}/architectures/{id}/duplicate` |

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{ArchitectureError, ArchitectureResult};
use crate::metrics::ArchitectureMetrics;
use crate::repository::ArchitectureRepository;
use crate::snapshot::{
    ArchitectureList, CreateArchitecture, ListParams, SavedArchitecture, UpdateArchitecture,
};

/// [`ArchitectureRepository`] backed by the remote REST API
#[derive(Debug, Clone)]
pub struct HttpArchitectureRepository {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl HttpArchitectureRepository {
    /// Create a client for `base_url` (e.g. `http://localhost:8000/api/v1`)
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> ArchitectureResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self {
            client,
            base_url,
            token: token.filter(|t| !t.is_empty()),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/architectures{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(&self, request: RequestBuilder) -> ArchitectureResult<Response> {
        Ok(self.authorize(request).send().await?)
    }

    async fn fetch<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<Uuid>,
    ) -> ArchitectureResult<T> {
        let response = ensure_success(self.send(request).await?, id).await?;
        Ok(response.json::<T>().await?)
    }

    /// GET by id; a 404 is an absent architecture, not an error
    async fn find(&self, id: Uuid) -> ArchitectureResult<Option<SavedArchitecture>> {
        let response = self.send(self.client.get(self.url(&format!("/{id}")))).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, Some(id)).await?;
        Ok(Some(response.json::<SavedArchitecture>().await?))
    }

    async fn remove(&self, id: Uuid) -> ArchitectureResult<bool> {
        let response = self
            .send(self.client.delete(self.url(&format!("/{id}"))))
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        ensure_success(response, Some(id)).await?;
        Ok(true)
    }
}

/// Record the outcome of a gateway call
fn record<T>(operation: &'static str, result: ArchitectureResult<T>) -> ArchitectureResult<T> {
    match &result {
        Ok(_) => debug!(operation = operation, "Gateway request succeeded"),
        Err(e) => warn!(operation = operation, error = %e, "Gateway request failed"),
    }
    ArchitectureMetrics::record_gateway_request(operation, result.is_ok());
    result
}

async fn ensure_success(response: Response, id: Option<Uuid>) -> ArchitectureResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body, id))
}

/// Map a non-success status and body to a domain error
fn status_error(status: StatusCode, body: &str, id: Option<Uuid>) -> ArchitectureError {
    let message = error_detail(body).unwrap_or_else(|| {
        status
            .canonical_reason()
            .unwrap_or("unexpected response")
            .to_string()
    });

    match status {
        StatusCode::NOT_FOUND => match id {
            Some(id) => ArchitectureError::NotFound(id),
            None => ArchitectureError::Gateway {
                status: status.as_u16(),
                message,
            },
        },
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ArchitectureError::Unauthorized(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ArchitectureError::Validation(message)
        }
        _ => ArchitectureError::Gateway {
            status: status.as_u16(),
            message,
        },
    }
}

/// Human-readable message from an error body
///
/// Understands `{"detail": "..."}` and the list form
/// `{"detail": [{"loc": [...], "msg": "..."}]}`; other non-empty bodies are
/// returned as-is.
fn error_detail(body: &str) -> Option<String> {
    let body = body.trim();
    if body.is_empty() {
        return None;
    }

    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(message)) => Some(message),
        Some(serde_json::Value::Array(items)) => {
            let messages: Vec<String> = items
                .iter()
                .filter_map(|item| {
                    let msg = item.get("msg")?.as_str()?;
                    let field = item
                        .get("loc")
                        .and_then(|loc| loc.as_array())
                        .and_then(|loc| loc.last())
                        .and_then(|last| last.as_str());
                    Some(match field {
                        Some(field) => format!("{field}: {msg}"),
                        None => msg.to_string(),
                    })
                })
                .collect();
            (!messages.is_empty()).then(|| messages.join("; "))
        }
        Some(other) => Some(other.to_string()),
        None => Some(body.to_string()),
    }
}

#[async_trait]
impl ArchitectureRepository for HttpArchitectureRepository {
    async fn list(&self, params: ListParams) -> ArchitectureResult<ArchitectureList> {
        let request = self.client.get(self.url("")).query(&params);
        record("list", self.fetch(request, None).await)
    }

    async fn get(&self, id: Uuid) -> ArchitectureResult<Option<SavedArchitecture>> {
        record("get", self.find(id).await)
    }

    async fn create(&self, input: CreateArchitecture) -> ArchitectureResult<SavedArchitecture> {
        let request = self.client.post(self.url("")).json(&input);
        record("create", self.fetch(request, None).await)
    }

    async fn update(
        &self,
        id: Uuid,
        input: UpdateArchitecture,
    ) -> ArchitectureResult<SavedArchitecture> {
        let request = self.client.put(self.url(&format!("/{id}"))).json(&input);
        record("update", self.fetch(request, Some(id)).await)
    }

    async fn delete(&self, id: Uuid) -> ArchitectureResult<bool> {
        record("delete", self.remove(id).await)
    }

    async fn duplicate(&self, id: Uuid) -> ArchitectureResult<SavedArchitecture> {
        let request = self.client.post(self.url(&format!("/{id}/duplicate")));
        record("duplicate", self.fetch(request, Some(id)).await)
    }
}
