//! The client facade.
//!
//! One `CivicClient` per process owns the store, both engines, the offline
//! queue, and the catalog cache. The presentation layer reads cloned
//! snapshots and calls the operations below; nothing else mutates the
//! collections.

use std::sync::Arc;

use crate::catalog::{Catalog, CatalogCache};
use crate::complaint::{Comment, Complaint, NewComplaint};
use crate::error::{CivicError, LastError, Result};
use crate::mutation::MutationEngine;
use crate::offline::{Draft, OfflineQueue, PendingSubmission, SyncReport};
use crate::pagination::{FetchOutcome, PaginationEngine};
use crate::remote::ComplaintGateway;
use crate::storage::DurableStore;
use crate::store::{ComplaintStore, ViewSnapshot};
use crate::types::{Actor, ComplaintFilter, ComplaintStatus, ComplaintView};

/// How a submission settled: confirmed by the backend, or parked in the
/// durable queue for the next sync.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    Created(Complaint),
    Queued(PendingSubmission),
}

pub struct CivicClient {
    gateway: Arc<dyn ComplaintGateway>,
    store: ComplaintStore,
    mutations: MutationEngine,
    pagination: PaginationEngine,
    offline: OfflineQueue,
    catalog: CatalogCache,
    actor: Actor,
}

impl CivicClient {
    pub fn new(
        gateway: Arc<dyn ComplaintGateway>,
        storage: Arc<dyn DurableStore>,
        actor: Actor,
    ) -> Result<Self> {
        let offline = OfflineQueue::open(storage)?;
        Ok(CivicClient {
            mutations: MutationEngine::new(gateway.clone()),
            pagination: PaginationEngine::new(gateway.clone()),
            gateway,
            store: ComplaintStore::new(),
            offline,
            catalog: CatalogCache::new(),
            actor,
        })
    }

    pub fn actor(&self) -> &Actor {
        &self.actor
    }

    // ---- read-only snapshots ----------------------------------------------

    pub fn view(&self, view: ComplaintView) -> ViewSnapshot {
        self.store.view_snapshot(view)
    }

    pub fn current(&self) -> Option<Complaint> {
        self.store.current()
    }

    pub fn current_comments(&self) -> Vec<Comment> {
        self.store.current_comments()
    }

    pub fn draft(&self) -> Option<Draft> {
        self.offline.draft()
    }

    pub fn pending(&self) -> Vec<PendingSubmission> {
        self.offline.entries()
    }

    pub fn pending_len(&self) -> usize {
        self.offline.len()
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.store.last_error()
    }

    // ---- catalog -----------------------------------------------------------

    /// The category catalog, fetched on first use and cached for the
    /// process lifetime.
    pub async fn catalog(&self) -> Result<&Catalog> {
        self.catalog.get_or_fetch(&self.gateway).await
    }

    // ---- draft -------------------------------------------------------------

    pub fn save_draft(&self, draft: Draft) -> Result<()> {
        self.offline.save_draft(draft)
    }

    pub fn clear_draft(&self) -> Result<()> {
        self.offline.clear_draft()
    }

    // ---- submission --------------------------------------------------------

    /// Validate and submit the saved draft. The draft is cleared once the
    /// submission is safely out of the slot (confirmed remotely or parked
    /// in the durable queue) and kept when validation rejects it.
    pub async fn submit_draft(&self) -> Result<SubmitOutcome> {
        let draft = self.offline.draft().ok_or_else(|| {
            CivicError::Validation("there is no draft to submit".to_string())
        })?;
        let payload = draft.into_submission()?;

        // Category consistency is checked against the catalog when we have
        // one; a never-fetched catalog must not block an offline submit.
        if let Some(catalog) = self.catalog.get() {
            catalog.validate_selection(&payload.category_id, payload.sub_category_id.as_deref())?;
        }

        let outcome = self.submit(payload).await?;
        self.offline.clear_draft()?;
        Ok(outcome)
    }

    /// Submit a payload. A transient failure (offline, backend down) parks
    /// it in the pending queue instead of losing it; validation and
    /// authorization failures propagate untouched.
    pub async fn submit(&self, payload: NewComplaint) -> Result<SubmitOutcome> {
        match self.gateway.create(&payload, &self.actor).await {
            Ok(complaint) => {
                self.store.insert_mine_front(complaint.clone());
                self.store.clear_last_error();
                Ok(SubmitOutcome::Created(complaint))
            }
            Err(err) if err.is_transient() => {
                tracing::warn!("create failed transiently, queueing submission: {err}");
                self.store.set_last_error(&err);
                let entry = self.offline.enqueue(payload)?;
                Ok(SubmitOutcome::Queued(entry))
            }
            Err(err) => {
                self.store.set_last_error(&err);
                Err(err)
            }
        }
    }

    /// Replay the pending queue. See `OfflineQueue::sync_pending`.
    pub async fn sync_pending(&self) -> Result<SyncReport> {
        self.offline
            .sync_pending(&self.gateway, &self.store, &self.actor)
            .await
    }

    // ---- reads -------------------------------------------------------------

    /// Fetch a page of a view under its current filter.
    pub async fn fetch_page(&self, view: ComplaintView, page: u32) -> Result<FetchOutcome> {
        let snapshot = self.store.view_snapshot(view);
        self.pagination
            .fetch(&self.store, view, page, snapshot.meta.per_page, snapshot.filter)
            .await
    }

    /// Fetch a page under an explicit filter. The caller owns the
    /// filter-change convention: a new predicate should come in with page 1.
    pub async fn fetch_page_with_filter(
        &self,
        view: ComplaintView,
        page: u32,
        filter: ComplaintFilter,
    ) -> Result<FetchOutcome> {
        let per_page = self.store.view_snapshot(view).meta.per_page;
        self.pagination
            .fetch(&self.store, view, page, per_page, filter)
            .await
    }

    /// Install a new filter for a view. Changing the predicate restarts the
    /// view at page 1; the engine itself never resets pages.
    pub async fn set_filter(
        &self,
        view: ComplaintView,
        filter: ComplaintFilter,
    ) -> Result<FetchOutcome> {
        let per_page = self.store.view_snapshot(view).meta.per_page;
        self.pagination
            .fetch(&self.store, view, 1, per_page, filter)
            .await
    }

    /// Load a complaint with its comment thread into the current-detail
    /// slot. On failure the previously open detail stays.
    pub async fn open_complaint(&self, id: &str) -> Result<()> {
        match self.gateway.fetch_complaint(id).await {
            Ok(detail) => {
                self.store.set_current_detail(detail);
                self.store.clear_last_error();
                Ok(())
            }
            Err(err) => {
                self.store.set_last_error(&err);
                Err(err)
            }
        }
    }

    pub fn close_complaint(&self) {
        self.store.clear_current();
    }

    // ---- mutations ---------------------------------------------------------

    pub async fn update_status(
        &self,
        id: &str,
        requested: ComplaintStatus,
        notes: Option<String>,
        images: Vec<String>,
    ) -> Result<()> {
        self.mutations
            .update_status(&self.store, id, requested, &self.actor, notes, images)
            .await
    }

    pub async fn assign(&self, id: &str, employee_id: &str) -> Result<()> {
        self.mutations
            .assign(&self.store, id, employee_id, &self.actor)
            .await
    }

    pub async fn toggle_upvote(&self, id: &str) -> Result<bool> {
        self.mutations
            .toggle_upvote(&self.store, id, &self.actor)
            .await
    }

    /// Add a comment. It counts as official exactly when the actor is the
    /// staff member the complaint is assigned to.
    pub async fn add_comment(
        &self,
        id: &str,
        content: String,
        images: Vec<String>,
    ) -> Result<Comment> {
        let is_official = self
            .store
            .get(id)
            .is_some_and(|c| c.assigned_to.as_deref() == Some(self.actor.id.as_str()));
        self.mutations
            .add_comment(&self.store, id, &self.actor, content, images, is_official)
            .await
    }
}
