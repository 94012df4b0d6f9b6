//! The optimistic mutation engine.
//!
//! Every state-changing operation funnels through one apply -> call-remote ->
//! confirm-or-restore path, so the rollback guarantee lives in exactly one
//! place: after a mutation settles, no two collections hold divergent copies
//! of the same complaint, whether the remote confirmed or failed.
//!
//! On success the optimistic state *is* the confirmed state; there is no
//! second merge round-trip. The one exception is the upvote toggle, where
//! the backend's returned boolean is authoritative and a disagreeing local
//! guess is reconciled rather than treated as an error.

use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;
use jiff::Timestamp;
use uuid::Uuid;

use crate::complaint::{Comment, Complaint};
use crate::error::{CivicError, Result};
use crate::lifecycle;
use crate::remote::ComplaintGateway;
use crate::store::{ComplaintStore, MutationSnapshot};
use crate::types::{Actor, ComplaintStatus};

pub struct MutationEngine {
    gateway: Arc<dyn ComplaintGateway>,
    /// Complaint ids with a mutation between apply and settle. A second
    /// mutation for the same id is rejected until the first settles, so two
    /// in-flight operations can never interleave their apply/restore steps.
    in_flight: DashMap<String, ()>,
}

/// Removes the in-flight marker when the mutation settles, on every path.
struct InFlightGuard<'a> {
    map: &'a DashMap<String, ()>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.map.remove(&self.id);
    }
}

impl MutationEngine {
    pub fn new(gateway: Arc<dyn ComplaintGateway>) -> Self {
        MutationEngine {
            gateway,
            in_flight: DashMap::new(),
        }
    }

    fn acquire(&self, store: &ComplaintStore, id: &str) -> Result<InFlightGuard<'_>> {
        if self.in_flight.insert(id.to_string(), ()).is_some() {
            let err = CivicError::MutationInFlight(id.to_string());
            store.set_last_error(&err);
            return Err(err);
        }
        Ok(InFlightGuard {
            map: &self.in_flight,
            id: id.to_string(),
        })
    }

    fn snapshot_or_reject(&self, store: &ComplaintStore, id: &str) -> Result<MutationSnapshot> {
        store.snapshot(id).ok_or_else(|| {
            let err = CivicError::ComplaintNotFound(id.to_string());
            store.set_last_error(&err);
            err
        })
    }

    /// Record a pre-network rejection. Nothing was applied, so there is
    /// nothing to roll back.
    fn reject(&self, store: &ComplaintStore, err: CivicError) -> CivicError {
        store.set_last_error(&err);
        err
    }

    /// The shared apply -> remote -> confirm-or-restore step.
    async fn settle<T, Fut>(
        &self,
        store: &ComplaintStore,
        snapshot: &MutationSnapshot,
        apply: impl Fn(&mut Complaint),
        remote: Fut,
    ) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        store.apply(snapshot.id(), apply);
        match remote.await {
            Ok(confirmed) => {
                store.clear_last_error();
                Ok(confirmed)
            }
            Err(err) => {
                tracing::warn!(
                    "remote rejected mutation for complaint '{}', rolling back: {err}",
                    snapshot.id()
                );
                store.restore(snapshot);
                store.set_last_error(&err);
                Err(err)
            }
        }
    }

    /// Request a status change, validating it against the lifecycle graph
    /// before anything touches the network.
    pub async fn update_status(
        &self,
        store: &ComplaintStore,
        id: &str,
        requested: ComplaintStatus,
        actor: &Actor,
        notes: Option<String>,
        images: Vec<String>,
    ) -> Result<()> {
        let _guard = self.acquire(store, id)?;
        let snapshot = self.snapshot_or_reject(store, id)?;

        let new_status = lifecycle::transition(snapshot.original().status, requested, actor.role)
            .map_err(|e| self.reject(store, e))?;

        let now = Timestamp::now();
        let resolution_notes = notes.clone();
        let apply = move |c: &mut Complaint| {
            c.status = new_status;
            match new_status {
                ComplaintStatus::Resolved => {
                    c.resolution_date = Some(now);
                    if resolution_notes.is_some() {
                        c.resolution_notes = resolution_notes.clone();
                    }
                }
                ComplaintStatus::Reopened => {
                    c.resolution_date = None;
                    c.resolution_notes = None;
                }
                _ => {}
            }
        };

        let remote = self
            .gateway
            .update_status(id, new_status, actor, notes.as_deref(), &images);
        self.settle(store, &snapshot, apply, remote).await?;
        Ok(())
    }

    /// Assign a complaint to an employee. Assigning an unassigned complaint
    /// rides on the `submitted -> acknowledged` edge: it always acknowledges.
    pub async fn assign(
        &self,
        store: &ComplaintStore,
        id: &str,
        employee_id: &str,
        actor: &Actor,
    ) -> Result<()> {
        let _guard = self.acquire(store, id)?;
        let snapshot = self.snapshot_or_reject(store, id)?;

        let current = snapshot.original();
        let bundled_status = if current.status == ComplaintStatus::Submitted {
            Some(
                lifecycle::transition(
                    ComplaintStatus::Submitted,
                    ComplaintStatus::Acknowledged,
                    actor.role,
                )
                .map_err(|e| self.reject(store, e))?,
            )
        } else if current.status.is_terminal() {
            return Err(self.reject(
                store,
                CivicError::Validation(format!(
                    "cannot assign a {} complaint",
                    current.status
                )),
            ));
        } else {
            None
        };

        let assignee = employee_id.to_string();
        let apply = move |c: &mut Complaint| {
            c.assigned_to = Some(assignee.clone());
            if let Some(status) = bundled_status {
                c.status = status;
            }
        };

        let remote = self.gateway.assign(id, employee_id, actor);
        self.settle(store, &snapshot, apply, remote).await?;
        Ok(())
    }

    /// Toggle the actor's upvote. `has_upvoted` is the sole source of truth
    /// for the direction; each toggle moves the count by exactly one. The
    /// backend's answer wins when it disagrees with the local guess.
    pub async fn toggle_upvote(
        &self,
        store: &ComplaintStore,
        id: &str,
        actor: &Actor,
    ) -> Result<bool> {
        let _guard = self.acquire(store, id)?;
        let snapshot = self.snapshot_or_reject(store, id)?;

        let original = snapshot.original();
        let base_count = original.upvote_count;
        let had = original.has_upvoted;
        let expected = !had;

        store.apply(id, |c| {
            c.has_upvoted = expected;
            c.upvote_count = adjusted_count(base_count, had, expected);
        });

        match self.gateway.toggle_upvote(id, actor).await {
            Ok(now_upvoted) => {
                if now_upvoted != expected {
                    // The local copy was stale (e.g. the user upvoted from
                    // another session). Adopt the remote answer.
                    tracing::warn!(
                        "upvote state for complaint '{id}' reconciled from remote: {now_upvoted}"
                    );
                    store.apply(id, |c| {
                        c.has_upvoted = now_upvoted;
                        c.upvote_count = adjusted_count(base_count, had, now_upvoted);
                    });
                }
                store.clear_last_error();
                Ok(now_upvoted)
            }
            Err(err) => {
                tracing::warn!("upvote toggle failed for complaint '{id}', rolling back: {err}");
                store.restore(&snapshot);
                store.set_last_error(&err);
                Err(err)
            }
        }
    }

    /// Append a comment: the count rises everywhere immediately and a
    /// provisional comment shows in the open detail, swapped for the
    /// server-confirmed one when the call settles.
    pub async fn add_comment(
        &self,
        store: &ComplaintStore,
        id: &str,
        actor: &Actor,
        content: String,
        images: Vec<String>,
        is_official: bool,
    ) -> Result<Comment> {
        let _guard = self.acquire(store, id)?;
        let snapshot = self.snapshot_or_reject(store, id)?;

        if content.trim().is_empty() {
            return Err(self.reject(
                store,
                CivicError::Validation("comment content must not be empty".to_string()),
            ));
        }

        let provisional = Comment {
            id: format!("local-{}", Uuid::new_v4()),
            complaint_id: id.to_string(),
            author_id: actor.id.clone(),
            content: content.clone(),
            images: images.clone(),
            is_official,
            created_at: Timestamp::now(),
        };

        store.apply(id, |c| c.comment_count += 1);
        store.push_current_comment(id, provisional.clone());

        match self
            .gateway
            .add_comment(id, actor, &content, &images, is_official)
            .await
        {
            Ok(confirmed) => {
                store.replace_current_comment(&provisional.id, confirmed.clone());
                store.clear_last_error();
                Ok(confirmed)
            }
            Err(err) => {
                tracing::warn!("comment failed for complaint '{id}', rolling back: {err}");
                store.restore(&snapshot);
                store.set_last_error(&err);
                Err(err)
            }
        }
    }
}

/// Count after moving from `had` to `now`, relative to the pre-mutation
/// count. No net change when the direction did not actually change.
fn adjusted_count(base: u32, had: bool, now: bool) -> u32 {
    match (had, now) {
        (false, true) => base + 1,
        (true, false) => base.saturating_sub(1),
        _ => base,
    }
}
