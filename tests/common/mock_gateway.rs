//! An in-memory backend for integration tests.
//!
//! Holds the "authoritative" complaint records the way the real service
//! would, with switches for the failure modes the client has to survive:
//! full outage, per-title create failures, rejected sessions, and a gate
//! that parks one call so a test can observe optimistic state mid-flight.

// Shared across test binaries; not every binary uses every switch.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use civiclink::{
    Actor, Category, CivicError, Comment, Complaint, ComplaintDetail, ComplaintFilter,
    ComplaintGateway, ComplaintStatus, ComplaintView, NewComplaint, Page, Result, SubCategory,
};

#[derive(Default)]
pub struct MockGateway {
    /// Server-side records, in creation order.
    complaints: Mutex<Vec<Complaint>>,
    /// Actor ids currently holding an upvote, per complaint id.
    upvotes: Mutex<HashSet<(String, String)>>,
    next_id: AtomicU32,

    /// Fail every call with `Unavailable` (the backend is unreachable).
    pub offline: AtomicBool,
    /// Fail every call with `Unauthorized` (the session is gone).
    pub unauthorized: AtomicBool,
    /// Titles whose create always fails with `Unavailable`.
    pub fail_create_titles: Mutex<HashSet<String>>,
    /// Fail the next mutating call with `Unavailable`.
    pub fail_next_mutation: AtomicBool,
    /// Titles created, in the order the server saw them.
    pub created_titles: Mutex<Vec<String>>,
    /// When set, `toggle_upvote` parks here: notifies the first cell on
    /// entry, waits on the second before proceeding.
    pub upvote_gate: Mutex<Option<(Arc<Notify>, Arc<Notify>)>>,
}

impl MockGateway {
    pub fn new() -> Self {
        MockGateway::default()
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn fail_creates_titled(&self, title: &str) {
        self.fail_create_titles.lock().insert(title.to_string());
    }

    pub fn heal_title(&self, title: &str) {
        self.fail_create_titles.lock().remove(title);
    }

    /// Seed a server-side record directly.
    pub fn seed(&self, complaint: Complaint) {
        self.complaints.lock().push(complaint);
    }

    /// Set the upvote tally on a server-side record (votes from others).
    pub fn seed_upvotes(&self, id: &str, count: u32) {
        if let Some(c) = self.complaints.lock().iter_mut().find(|c| c.id == id) {
            c.upvote_count = count;
        }
    }

    pub fn gate_upvotes(&self) -> (Arc<Notify>, Arc<Notify>) {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        *self.upvote_gate.lock() = Some((entered.clone(), release.clone()));
        (entered, release)
    }

    fn check_availability(&self) -> Result<()> {
        if self.unauthorized.load(Ordering::SeqCst) {
            return Err(CivicError::Unauthorized);
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(CivicError::Unavailable("connection refused".to_string()));
        }
        Ok(())
    }

    fn check_mutation_failure(&self) -> Result<()> {
        if self.fail_next_mutation.swap(false, Ordering::SeqCst) {
            return Err(CivicError::Unavailable("503 service unavailable".to_string()));
        }
        Ok(())
    }

    fn find(&self, id: &str) -> Result<Complaint> {
        self.complaints
            .lock()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| CivicError::ComplaintNotFound(id.to_string()))
    }

    fn update<F: FnOnce(&mut Complaint)>(&self, id: &str, f: F) -> Result<Complaint> {
        let mut complaints = self.complaints.lock();
        let complaint = complaints
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| CivicError::ComplaintNotFound(id.to_string()))?;
        f(complaint);
        Ok(complaint.clone())
    }
}

#[async_trait]
impl ComplaintGateway for MockGateway {
    async fn create(&self, payload: &NewComplaint, _actor: &Actor) -> Result<Complaint> {
        self.check_availability()?;
        if self.fail_create_titles.lock().contains(&payload.title) {
            return Err(CivicError::Unavailable(format!(
                "create rejected upstream for '{}'",
                payload.title
            )));
        }

        let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let complaint = Complaint {
            id: format!("srv-{n}"),
            complaint_number: format!("#GRV-2024-{n:04}"),
            title: payload.title.clone(),
            description: payload.description.clone(),
            category_id: payload.category_id.clone(),
            sub_category_id: payload.sub_category_id.clone(),
            priority: payload.priority,
            status: ComplaintStatus::Submitted,
            address: payload.address.clone(),
            landmark: payload.landmark.clone(),
            location: payload.location,
            images: payload.images.clone(),
            is_anonymous: payload.is_anonymous,
            upvote_count: 0,
            has_upvoted: false,
            comment_count: 0,
            created_at: jiff::Timestamp::now(),
            resolution_date: None,
            resolution_notes: None,
            assigned_to: None,
            sla_deadline: None,
        };
        self.created_titles.lock().push(payload.title.clone());
        self.complaints.lock().push(complaint.clone());
        Ok(complaint)
    }

    async fn fetch_page(
        &self,
        _view: ComplaintView,
        page: u32,
        per_page: u32,
        _filter: &ComplaintFilter,
    ) -> Result<Page<Complaint>> {
        self.check_availability()?;
        let complaints = self.complaints.lock();
        let total = complaints.len() as u64;
        let total_pages = total.div_ceil(per_page as u64) as u32;
        let start = ((page.saturating_sub(1)) * per_page) as usize;
        let data: Vec<Complaint> = complaints
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();
        Ok(Page {
            data,
            page,
            per_page,
            total,
            total_pages,
        })
    }

    async fn fetch_complaint(&self, id: &str) -> Result<ComplaintDetail> {
        self.check_availability()?;
        Ok(ComplaintDetail {
            complaint: self.find(id)?,
            comments: vec![],
        })
    }

    async fn update_status(
        &self,
        id: &str,
        new_status: ComplaintStatus,
        _actor: &Actor,
        notes: Option<&str>,
        _images: &[String],
    ) -> Result<Complaint> {
        self.check_availability()?;
        self.check_mutation_failure()?;
        let notes = notes.map(|s| s.to_string());
        self.update(id, |c| {
            c.status = new_status;
            if new_status.is_settled() {
                c.resolution_date = Some(jiff::Timestamp::now());
                c.resolution_notes = notes;
            }
        })
    }

    async fn assign(&self, id: &str, employee_id: &str, _actor: &Actor) -> Result<Complaint> {
        self.check_availability()?;
        self.check_mutation_failure()?;
        self.update(id, |c| {
            c.assigned_to = Some(employee_id.to_string());
            if c.status == ComplaintStatus::Submitted {
                c.status = ComplaintStatus::Acknowledged;
            }
        })
    }

    async fn toggle_upvote(&self, id: &str, actor: &Actor) -> Result<bool> {
        let gate = self.upvote_gate.lock().clone();
        if let Some((entered, release)) = gate {
            entered.notify_one();
            release.notified().await;
        }

        self.check_availability()?;
        self.check_mutation_failure()?;
        self.find(id)?;

        let key = (id.to_string(), actor.id.clone());
        let mut upvotes = self.upvotes.lock();
        let now_upvoted = if upvotes.remove(&key) {
            false
        } else {
            upvotes.insert(key);
            true
        };
        drop(upvotes);

        self.update(id, |c| {
            if now_upvoted {
                c.upvote_count += 1;
            } else {
                c.upvote_count = c.upvote_count.saturating_sub(1);
            }
        })?;
        Ok(now_upvoted)
    }

    async fn add_comment(
        &self,
        id: &str,
        actor: &Actor,
        content: &str,
        images: &[String],
        is_official: bool,
    ) -> Result<Comment> {
        self.check_availability()?;
        self.check_mutation_failure()?;
        let complaint = self.update(id, |c| c.comment_count += 1)?;
        Ok(Comment {
            id: format!("comment-{}-{}", complaint.id, complaint.comment_count),
            complaint_id: id.to_string(),
            author_id: actor.id.clone(),
            content: content.to_string(),
            images: images.to_vec(),
            is_official,
            created_at: jiff::Timestamp::now(),
        })
    }

    async fn fetch_catalog(&self) -> Result<Vec<Category>> {
        self.check_availability()?;
        Ok(vec![Category {
            id: "cat-infra".to_string(),
            name: "Infrastructure".to_string(),
            sub_categories: vec![SubCategory {
                id: "sub-lighting".to_string(),
                name: "Street lighting".to_string(),
                category_id: "cat-infra".to_string(),
            }],
        }])
    }
}
