use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CivicError;

pub const DEFAULT_PER_PAGE: u32 = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ComplaintStatus {
    #[default]
    Submitted,
    Acknowledged,
    InProgress,
    Resolved,
    Reopened,
    Closed,
    Rejected,
}

impl ComplaintStatus {
    /// Terminal statuses accept no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ComplaintStatus::Closed | ComplaintStatus::Rejected)
    }

    /// Whether the complaint has been picked up by staff. `assigned_to`
    /// must be set exactly for these statuses.
    pub fn is_past_submitted(&self) -> bool {
        !matches!(self, ComplaintStatus::Submitted)
    }

    /// Statuses that carry a resolution date.
    pub fn is_settled(&self) -> bool {
        matches!(self, ComplaintStatus::Resolved | ComplaintStatus::Closed)
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplaintStatus::Submitted => write!(f, "submitted"),
            ComplaintStatus::Acknowledged => write!(f, "acknowledged"),
            ComplaintStatus::InProgress => write!(f, "in_progress"),
            ComplaintStatus::Resolved => write!(f, "resolved"),
            ComplaintStatus::Reopened => write!(f, "reopened"),
            ComplaintStatus::Closed => write!(f, "closed"),
            ComplaintStatus::Rejected => write!(f, "rejected"),
        }
    }
}

impl FromStr for ComplaintStatus {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "submitted" => Ok(ComplaintStatus::Submitted),
            "acknowledged" => Ok(ComplaintStatus::Acknowledged),
            "in_progress" => Ok(ComplaintStatus::InProgress),
            "resolved" => Ok(ComplaintStatus::Resolved),
            "reopened" => Ok(ComplaintStatus::Reopened),
            "closed" => Ok(ComplaintStatus::Closed),
            "rejected" => Ok(ComplaintStatus::Rejected),
            _ => Err(CivicError::InvalidStatus(s.to_string())),
        }
    }
}

pub const VALID_STATUSES: &[&str] = &[
    "submitted",
    "acknowledged",
    "in_progress",
    "resolved",
    "reopened",
    "closed",
    "rejected",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
            Priority::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Priority {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            _ => Err(CivicError::InvalidPriority(s.to_string())),
        }
    }
}

pub const VALID_PRIORITIES: &[&str] = &["low", "medium", "high", "critical"];

/// Who is acting. Roles gate which lifecycle transitions an actor may request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    Citizen,
    Employee,
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Citizen => write!(f, "citizen"),
            Role::Employee => write!(f, "employee"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "citizen" => Ok(Role::Citizen),
            "employee" => Ok(Role::Employee),
            "admin" => Ok(Role::Admin),
            _ => Err(CivicError::InvalidRole(s.to_string())),
        }
    }
}

pub const VALID_ROLES: &[&str] = &["citizen", "employee", "admin"];

/// The acting user: an opaque id supplied by the session collaborator plus
/// the role the backend granted it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: String,
    pub role: Role,
}

impl Actor {
    pub fn new(id: impl Into<String>, role: Role) -> Self {
        Actor {
            id: id.into(),
            role,
        }
    }
}

/// The four independently paginated complaint lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComplaintView {
    /// Complaints the current actor submitted.
    Mine,
    /// Complaints assigned to the current actor (employee).
    Assigned,
    /// The public feed.
    Public,
    /// Every complaint (administrators).
    All,
}

pub const ALL_VIEWS: &[ComplaintView] = &[
    ComplaintView::Mine,
    ComplaintView::Assigned,
    ComplaintView::Public,
    ComplaintView::All,
];

impl fmt::Display for ComplaintView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComplaintView::Mine => write!(f, "mine"),
            ComplaintView::Assigned => write!(f, "assigned"),
            ComplaintView::Public => write!(f, "public"),
            ComplaintView::All => write!(f, "all"),
        }
    }
}

impl FromStr for ComplaintView {
    type Err = CivicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mine" => Ok(ComplaintView::Mine),
            "assigned" => Ok(ComplaintView::Assigned),
            "public" => Ok(ComplaintView::Public),
            "all" => Ok(ComplaintView::All),
            _ => Err(CivicError::InvalidView(s.to_string())),
        }
    }
}

pub const VALID_VIEWS: &[&str] = &["mine", "assigned", "public", "all"];

/// The active filter predicate for one view. Every field is conjunctive;
/// `None` means the dimension is unconstrained.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComplaintFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<ComplaintStatus>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_after: Option<jiff::Timestamp>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_before: Option<jiff::Timestamp>,
}

impl ComplaintFilter {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.category_id.is_none()
            && self.priority.is_none()
            && self.submitted_after.is_none()
            && self.submitted_before.is_none()
    }
}

/// Pagination metadata for one view, mirrored from the last confirmed page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub total_pages: u32,
}

impl Default for PageMeta {
    fn default() -> Self {
        PageMeta {
            page: 1,
            per_page: DEFAULT_PER_PAGE,
            total: 0,
            total_pages: 0,
        }
    }
}
