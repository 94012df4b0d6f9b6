//! The remote complaint repository.
//!
//! The backend owns the authoritative record; this module defines the
//! contract the rest of the client programs against, plus the HTTP
//! implementation. Transport details stay behind the trait so tests and
//! embedders can substitute their own gateway.

pub mod http;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::complaint::{Comment, Complaint, NewComplaint};
use crate::error::Result;
use crate::types::{Actor, ComplaintFilter, ComplaintStatus, ComplaintView, PageMeta};

pub use http::HttpGateway;

/// One page of results as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl<T> Page<T> {
    pub fn meta(&self) -> PageMeta {
        PageMeta {
            page: self.page,
            per_page: self.per_page,
            total: self.total,
            total_pages: self.total_pages,
        }
    }
}

/// A complaint plus its comment thread, as served by the detail endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplaintDetail {
    pub complaint: Complaint,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// Common interface to the complaint backend.
///
/// Every call settles with either the confirmed entity or a typed error from
/// the crate taxonomy; implementations map their transport's failures onto
/// it (see `http::classify_response`).
#[async_trait]
pub trait ComplaintGateway: Send + Sync {
    /// Create a complaint. The returned entity carries the server-assigned
    /// `id` and `complaint_number`.
    async fn create(&self, payload: &NewComplaint, actor: &Actor) -> Result<Complaint>;

    /// Fetch one page of a view under a filter.
    async fn fetch_page(
        &self,
        view: ComplaintView,
        page: u32,
        per_page: u32,
        filter: &ComplaintFilter,
    ) -> Result<Page<Complaint>>;

    /// Fetch a single complaint with its comment thread.
    async fn fetch_complaint(&self, id: &str) -> Result<ComplaintDetail>;

    /// Request a status change. The local lifecycle check runs before this
    /// is ever called; the backend revalidates and may still reject.
    async fn update_status(
        &self,
        id: &str,
        new_status: ComplaintStatus,
        actor: &Actor,
        notes: Option<&str>,
        images: &[String],
    ) -> Result<Complaint>;

    /// Assign a complaint to an employee.
    async fn assign(&self, id: &str, employee_id: &str, actor: &Actor) -> Result<Complaint>;

    /// Toggle the actor's upvote. Returns whether the actor has the upvote
    /// after the call settled, which is authoritative over local state.
    async fn toggle_upvote(&self, id: &str, actor: &Actor) -> Result<bool>;

    /// Append a comment.
    async fn add_comment(
        &self,
        id: &str,
        actor: &Actor,
        content: &str,
        images: &[String],
        is_official: bool,
    ) -> Result<Comment>;

    /// Fetch the category reference data.
    async fn fetch_catalog(&self) -> Result<Vec<Category>>;
}
