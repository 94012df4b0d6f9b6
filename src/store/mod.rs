//! In-memory complaint collections.
//!
//! One owned store per client holds the four view collections, the current
//! detail, and the last-error value. All of it sits behind a single lock so
//! every multi-view change (an optimistic apply, a rollback, a page replace)
//! is one visible step: a reader never observes a complaint updated in
//! "mine" but stale in the detail pane.
//!
//! Writes funnel through the mutation engine, the pagination engine, and
//! the client facade; the presentation layer reads cloned snapshots.

use parking_lot::RwLock;

use crate::complaint::{Comment, Complaint};
use crate::error::{CivicError, LastError};
use crate::remote::ComplaintDetail;
use crate::types::{ComplaintFilter, ComplaintView, PageMeta};

/// Read-only copy of one view's collection and pagination state.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSnapshot {
    pub complaints: Vec<Complaint>,
    pub meta: PageMeta,
    pub filter: ComplaintFilter,
}

#[derive(Debug, Default)]
struct ViewState {
    complaints: Vec<Complaint>,
    meta: PageMeta,
    filter: ComplaintFilter,
    /// Monotonic token of the most recently issued fetch for this view.
    /// Responses carrying an older token are discarded.
    latest_request: u64,
}

#[derive(Default)]
struct StoreInner {
    mine: ViewState,
    assigned: ViewState,
    public_feed: ViewState,
    all: ViewState,
    current: Option<Complaint>,
    current_comments: Vec<Comment>,
    last_error: Option<LastError>,
}

impl StoreInner {
    fn view(&self, view: ComplaintView) -> &ViewState {
        match view {
            ComplaintView::Mine => &self.mine,
            ComplaintView::Assigned => &self.assigned,
            ComplaintView::Public => &self.public_feed,
            ComplaintView::All => &self.all,
        }
    }

    fn view_mut(&mut self, view: ComplaintView) -> &mut ViewState {
        match view {
            ComplaintView::Mine => &mut self.mine,
            ComplaintView::Assigned => &mut self.assigned,
            ComplaintView::Public => &mut self.public_feed,
            ComplaintView::All => &mut self.all,
        }
    }
}

/// Where one copy of a complaint was captured from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Location {
    View(ComplaintView),
    Current,
}

/// Pre-mutation copies of every location holding a complaint, taken before
/// an optimistic apply and replayed on remote failure.
#[derive(Debug)]
pub struct MutationSnapshot {
    id: String,
    copies: Vec<(Location, Complaint)>,
    /// Captured only when the current detail is the mutated complaint.
    comments: Option<Vec<Comment>>,
}

impl MutationSnapshot {
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The complaint as it was before the mutation was applied.
    pub fn original(&self) -> &Complaint {
        // A snapshot is only constructed with at least one copy.
        &self.copies[0].1
    }
}

#[derive(Default)]
pub struct ComplaintStore {
    inner: RwLock<StoreInner>,
}

impl ComplaintStore {
    pub fn new() -> Self {
        ComplaintStore::default()
    }

    // ---- read surface ------------------------------------------------------

    pub fn view_snapshot(&self, view: ComplaintView) -> ViewSnapshot {
        let inner = self.inner.read();
        let state = inner.view(view);
        ViewSnapshot {
            complaints: state.complaints.clone(),
            meta: state.meta,
            filter: state.filter.clone(),
        }
    }

    pub fn current(&self) -> Option<Complaint> {
        self.inner.read().current.clone()
    }

    pub fn current_comments(&self) -> Vec<Comment> {
        self.inner.read().current_comments.clone()
    }

    pub fn last_error(&self) -> Option<LastError> {
        self.inner.read().last_error.clone()
    }

    /// First copy of the complaint found in any location. All copies agree
    /// between mutations, so which one is irrelevant.
    pub fn get(&self, id: &str) -> Option<Complaint> {
        let inner = self.inner.read();
        for view in crate::types::ALL_VIEWS {
            if let Some(c) = inner.view(*view).complaints.iter().find(|c| c.id == id) {
                return Some(c.clone());
            }
        }
        inner.current.as_ref().filter(|c| c.id == id).cloned()
    }

    // ---- error surface -----------------------------------------------------

    pub fn set_last_error(&self, err: &CivicError) {
        self.inner.write().last_error = Some(LastError::from(err));
    }

    pub fn clear_last_error(&self) {
        self.inner.write().last_error = None;
    }

    // ---- mutation primitives (engine use) ----------------------------------

    /// Capture every copy of a complaint ahead of an optimistic apply.
    /// Returns `None` when no collection holds the id.
    pub fn snapshot(&self, id: &str) -> Option<MutationSnapshot> {
        let inner = self.inner.read();
        let mut copies = Vec::new();
        for view in crate::types::ALL_VIEWS {
            if let Some(c) = inner.view(*view).complaints.iter().find(|c| c.id == id) {
                copies.push((Location::View(*view), c.clone()));
            }
        }
        let mut comments = None;
        if let Some(c) = inner.current.as_ref().filter(|c| c.id == id) {
            copies.push((Location::Current, c.clone()));
            comments = Some(inner.current_comments.clone());
        }
        if copies.is_empty() {
            return None;
        }
        Some(MutationSnapshot {
            id: id.to_string(),
            copies,
            comments,
        })
    }

    /// Apply `mutate` to every copy of the complaint in one step.
    /// Returns how many copies were touched.
    pub fn apply<F>(&self, id: &str, mutate: F) -> usize
    where
        F: Fn(&mut Complaint),
    {
        let mut inner = self.inner.write();
        let mut touched = 0;
        for view in crate::types::ALL_VIEWS {
            for c in inner.view_mut(*view).complaints.iter_mut() {
                if c.id == id {
                    mutate(c);
                    touched += 1;
                }
            }
        }
        if let Some(c) = inner.current.as_mut().filter(|c| c.id == id) {
            mutate(c);
            touched += 1;
        }
        touched
    }

    /// Replay a snapshot: every location that still holds the complaint gets
    /// its pre-mutation copy back, in one step. A location refreshed by an
    /// interleaved page fetch no longer holds the stale id and is left alone;
    /// the fetched copy is server-confirmed and outranks the snapshot.
    pub fn restore(&self, snapshot: &MutationSnapshot) {
        let mut inner = self.inner.write();
        for (location, copy) in &snapshot.copies {
            match location {
                Location::View(view) => {
                    if let Some(c) = inner
                        .view_mut(*view)
                        .complaints
                        .iter_mut()
                        .find(|c| c.id == snapshot.id)
                    {
                        *c = copy.clone();
                    }
                }
                Location::Current => {
                    if let Some(c) = inner.current.as_mut().filter(|c| c.id == snapshot.id) {
                        *c = copy.clone();
                    }
                }
            }
        }
        if let Some(comments) = &snapshot.comments
            && inner.current.as_ref().is_some_and(|c| c.id == snapshot.id)
        {
            inner.current_comments = comments.clone();
        }
    }

    // ---- current detail ----------------------------------------------------

    pub fn set_current_detail(&self, detail: ComplaintDetail) {
        let mut inner = self.inner.write();
        inner.current = Some(detail.complaint);
        inner.current_comments = detail.comments;
    }

    pub fn clear_current(&self) {
        let mut inner = self.inner.write();
        inner.current = None;
        inner.current_comments.clear();
    }

    /// Append a provisional comment to the open detail, if it matches.
    pub fn push_current_comment(&self, complaint_id: &str, comment: Comment) {
        let mut inner = self.inner.write();
        if inner.current.as_ref().is_some_and(|c| c.id == complaint_id) {
            inner.current_comments.push(comment);
        }
    }

    /// Swap a provisional comment for its server-confirmed version.
    pub fn replace_current_comment(&self, provisional_id: &str, confirmed: Comment) {
        let mut inner = self.inner.write();
        if let Some(c) = inner
            .current_comments
            .iter_mut()
            .find(|c| c.id == provisional_id)
        {
            *c = confirmed;
        }
    }

    // ---- pagination primitives (engine use) --------------------------------

    /// Register a new fetch for a view and return its token. Any response
    /// carrying an older token is stale.
    pub fn begin_fetch(&self, view: ComplaintView) -> u64 {
        let mut inner = self.inner.write();
        let state = inner.view_mut(view);
        state.latest_request += 1;
        state.latest_request
    }

    pub fn is_latest_request(&self, view: ComplaintView, token: u64) -> bool {
        self.inner.read().view(view).latest_request == token
    }

    /// Replace a view's collection and metadata with a confirmed page,
    /// unless a newer fetch superseded this one. Returns whether the page
    /// was applied.
    pub fn try_complete_fetch(
        &self,
        view: ComplaintView,
        token: u64,
        complaints: Vec<Complaint>,
        meta: PageMeta,
        filter: ComplaintFilter,
    ) -> bool {
        let mut inner = self.inner.write();
        let state = inner.view_mut(view);
        if state.latest_request != token {
            return false;
        }
        state.complaints = complaints;
        state.meta = meta;
        state.filter = filter;
        true
    }

    /// Put a freshly confirmed complaint at the head of "mine" (used when a
    /// queued submission is accepted).
    pub fn insert_mine_front(&self, complaint: Complaint) {
        let mut inner = self.inner.write();
        inner.mine.complaints.insert(0, complaint);
        inner.mine.meta.total += 1;
    }

    /// Hydrate a view directly, bypassing the fetch path. Used by embedders
    /// restoring cached pages and by tests.
    pub fn seed_view(&self, view: ComplaintView, complaints: Vec<Complaint>, meta: PageMeta) {
        let mut inner = self.inner.write();
        let state = inner.view_mut(view);
        state.complaints = complaints;
        state.meta = meta;
    }
}
