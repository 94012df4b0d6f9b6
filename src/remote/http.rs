//! HTTP implementation of the complaint gateway.
//!
//! Talks JSON to the municipal backend. The interesting part is the mapping
//! from HTTP responses onto the crate's error taxonomy, which is what the
//! optimistic-mutation rollback and the queue's retry policy key off.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::catalog::Category;
use crate::complaint::{Comment, Complaint, NewComplaint};
use crate::error::{CivicError, Result};
use crate::types::{Actor, ComplaintFilter, ComplaintStatus, ComplaintView};

use super::{ComplaintDetail, ComplaintGateway, Page};

const HEADER_ACTOR_ID: &str = "x-actor-id";
const HEADER_ACTOR_ROLE: &str = "x-actor-role";

pub struct HttpGateway {
    base: Url,
    http: reqwest::Client,
    token: Option<SecretString>,
}

impl HttpGateway {
    /// Build a gateway against `base_url` (e.g. `https://api.example.gov/v1`).
    pub fn new(base_url: &str, token: Option<SecretString>, timeout_secs: u64) -> Result<Self> {
        // A trailing slash makes Url::join treat the last segment as a
        // directory instead of replacing it.
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base = Url::parse(&normalized)
            .map_err(|e| CivicError::Config(format!("invalid API URL '{base_url}': {e}")))?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(HttpGateway { base, http, token })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base
            .join(path)
            .map_err(|e| CivicError::Config(format!("invalid endpoint '{path}': {e}")))
    }

    fn request(&self, method: reqwest::Method, url: Url, actor: Option<&Actor>) -> reqwest::RequestBuilder {
        let mut req = self.http.request(method, url);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.expose_secret());
        }
        if let Some(actor) = actor {
            req = req
                .header(HEADER_ACTOR_ID, &actor.id)
                .header(HEADER_ACTOR_ROLE, actor.role.to_string());
        }
        req
    }

    /// Run a request and decode the JSON body, or classify the failure.
    async fn execute<T: serde::de::DeserializeOwned>(
        &self,
        req: reqwest::RequestBuilder,
        complaint_id: Option<&str>,
    ) -> Result<T> {
        let resp = req.send().await?;
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.json::<T>().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        Err(classify(status, extract_message(&body), complaint_id))
    }
}

/// Map a non-success HTTP response onto the error taxonomy.
///
/// 409 comes back when the backend rejects a state change we considered
/// legal locally; it is surfaced as `InvalidTransition` and never retried.
fn classify(status: StatusCode, message: String, complaint_id: Option<&str>) -> CivicError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => CivicError::Unauthorized,
        StatusCode::NOT_FOUND => {
            CivicError::ComplaintNotFound(complaint_id.unwrap_or(&message).to_string())
        }
        StatusCode::CONFLICT => CivicError::InvalidTransition(message),
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            CivicError::Validation(message)
        }
        StatusCode::TOO_MANY_REQUESTS => {
            CivicError::Unavailable(format!("rate limited: {message}"))
        }
        s if s.is_server_error() => CivicError::Unavailable(format!("{s}: {message}")),
        s => CivicError::Api(format!("{s}: {message}")),
    }
}

/// Pull a human-readable message out of an error body. Backends answer with
/// `{"error": "..."}` or `{"message": "..."}`; fall back to the raw text.
fn extract_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: Option<String>,
        message: Option<String>,
    }

    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body)
        && let Some(msg) = parsed.error.or(parsed.message)
    {
        return msg;
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        "no error detail".to_string()
    } else {
        trimmed.to_string()
    }
}

fn filter_query(filter: &ComplaintFilter) -> Vec<(&'static str, String)> {
    let mut query = Vec::new();
    if let Some(status) = filter.status {
        query.push(("status", status.to_string()));
    }
    if let Some(category_id) = &filter.category_id {
        query.push(("category_id", category_id.clone()));
    }
    if let Some(priority) = filter.priority {
        query.push(("priority", priority.to_string()));
    }
    if let Some(after) = filter.submitted_after {
        query.push(("submitted_after", after.to_string()));
    }
    if let Some(before) = filter.submitted_before {
        query.push(("submitted_before", before.to_string()));
    }
    query
}

#[derive(Serialize)]
struct StatusUpdateBody<'a> {
    status: ComplaintStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    notes: Option<&'a str>,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    images: &'a [String],
}

#[derive(Serialize)]
struct AssignBody<'a> {
    employee_id: &'a str,
}

#[derive(Serialize)]
struct CommentBody<'a> {
    content: &'a str,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    images: &'a [String],
    is_official: bool,
}

#[derive(Deserialize)]
struct UpvoteResponse {
    upvoted: bool,
}

#[async_trait]
impl ComplaintGateway for HttpGateway {
    async fn create(&self, payload: &NewComplaint, actor: &Actor) -> Result<Complaint> {
        let url = self.endpoint("complaints")?;
        let req = self.request(reqwest::Method::POST, url, Some(actor)).json(payload);
        self.execute(req, None).await
    }

    async fn fetch_page(
        &self,
        view: ComplaintView,
        page: u32,
        per_page: u32,
        filter: &ComplaintFilter,
    ) -> Result<Page<Complaint>> {
        let url = self.endpoint("complaints")?;
        let mut query = vec![
            ("view", view.to_string()),
            ("page", page.to_string()),
            ("per_page", per_page.to_string()),
        ];
        query.extend(filter_query(filter));
        let req = self.request(reqwest::Method::GET, url, None).query(&query);
        self.execute(req, None).await
    }

    async fn fetch_complaint(&self, id: &str) -> Result<ComplaintDetail> {
        let url = self.endpoint(&format!("complaints/{id}"))?;
        let req = self.request(reqwest::Method::GET, url, None);
        self.execute(req, Some(id)).await
    }

    async fn update_status(
        &self,
        id: &str,
        new_status: ComplaintStatus,
        actor: &Actor,
        notes: Option<&str>,
        images: &[String],
    ) -> Result<Complaint> {
        let url = self.endpoint(&format!("complaints/{id}/status"))?;
        let body = StatusUpdateBody {
            status: new_status,
            notes,
            images,
        };
        let req = self.request(reqwest::Method::PATCH, url, Some(actor)).json(&body);
        self.execute(req, Some(id)).await
    }

    async fn assign(&self, id: &str, employee_id: &str, actor: &Actor) -> Result<Complaint> {
        let url = self.endpoint(&format!("complaints/{id}/assign"))?;
        let req = self
            .request(reqwest::Method::POST, url, Some(actor))
            .json(&AssignBody { employee_id });
        self.execute(req, Some(id)).await
    }

    async fn toggle_upvote(&self, id: &str, actor: &Actor) -> Result<bool> {
        let url = self.endpoint(&format!("complaints/{id}/upvote"))?;
        let req = self.request(reqwest::Method::POST, url, Some(actor));
        let resp: UpvoteResponse = self.execute(req, Some(id)).await?;
        Ok(resp.upvoted)
    }

    async fn add_comment(
        &self,
        id: &str,
        actor: &Actor,
        content: &str,
        images: &[String],
        is_official: bool,
    ) -> Result<Comment> {
        let url = self.endpoint(&format!("complaints/{id}/comments"))?;
        let body = CommentBody {
            content,
            images,
            is_official,
        };
        let req = self.request(reqwest::Method::POST, url, Some(actor)).json(&body);
        self.execute(req, Some(id)).await
    }

    async fn fetch_catalog(&self) -> Result<Vec<Category>> {
        let url = self.endpoint("catalog")?;
        let req = self.request(reqwest::Method::GET, url, None);
        self.execute(req, None).await
    }
}
