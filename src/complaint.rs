//! The complaint entity and its wire payloads.
//!
//! The remote gateway owns the authoritative record; every `Complaint` held
//! by this process is a client copy, either server-confirmed or an optimistic
//! placeholder awaiting confirmation.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::types::{ComplaintStatus, Priority};

/// A point on the map attached to a complaint.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// The central entity.
///
/// `id` is the server-assigned opaque identity; `complaint_number` is the
/// human-facing reference, unique and immutable once assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Complaint {
    pub id: String,
    pub complaint_number: String,
    pub title: String,
    pub description: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<String>,
    pub priority: Priority,
    pub status: ComplaintStatus,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(default)]
    pub upvote_count: u32,
    /// Viewer-relative: whether the current actor has upvoted this complaint.
    /// The sole source of truth for toggling.
    #[serde(default)]
    pub has_upvoted: bool,
    #[serde(default)]
    pub comment_count: u32,
    pub created_at: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_date: Option<Timestamp>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution_notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sla_deadline: Option<Timestamp>,
}

impl Complaint {
    /// Check the entity-level invariants that must hold for every copy:
    /// a resolution date exactly when resolved or closed, an assignee exactly
    /// when past `submitted`, and a well-formed complaint number.
    pub fn invariants_hold(&self) -> bool {
        let resolution_ok = self.resolution_date.is_some() == self.status.is_settled();
        let assignee_ok = self.assigned_to.is_some() == self.status.is_past_submitted();
        resolution_ok && assignee_ok && is_valid_complaint_number(&self.complaint_number)
    }
}

/// Server-assigned complaint numbers look like `#GRV-2024-0042`: a leading
/// `#` followed by uppercase alphanumerics and dashes.
pub fn is_valid_complaint_number(s: &str) -> bool {
    match s.strip_prefix('#') {
        Some(rest) => {
            !rest.is_empty()
                && rest
                    .chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '-')
        }
        None => false,
    }
}

/// A fully validated create payload, as sent to the gateway and as stored in
/// the pending queue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewComplaint {
    pub title: String,
    pub description: String,
    pub category_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<String>,
    pub priority: Priority,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
}

/// A comment on a complaint. Append-only; ordering is creation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub complaint_id: String,
    pub author_id: String,
    pub content: String,
    #[serde(default)]
    pub images: Vec<String>,
    /// True when authored by the staff member the complaint is assigned to.
    #[serde(default)]
    pub is_official: bool,
    pub created_at: Timestamp,
}
