//! Offline draft and pending-submission queue.
//!
//! The draft is a single slot holding a partially filled form; the queue
//! holds fully validated submissions waiting for a confirmed remote create.
//! Both are committed to the durable store after every change and restored
//! verbatim on the next launch. Queue membership is the only bookkeeping:
//! an entry exists exactly until its create is confirmed, so replaying the
//! queue can never resubmit something that already went through.

use std::sync::Arc;

use jiff::Timestamp;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::complaint::{GeoPoint, NewComplaint};
use crate::error::{CivicError, Result};
use crate::remote::ComplaintGateway;
use crate::store::ComplaintStore;
use crate::storage::DurableStore;
use crate::types::{Actor, Priority};

const DRAFT_KEY: &str = "draft";
const QUEUE_KEY: &str = "pending_queue";

/// The single in-progress complaint form. Everything is optional; the form
/// is saved after every step and validated only at submission time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Draft {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_category_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub landmark: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<GeoPoint>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_anonymous: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub saved_at: Option<Timestamp>,
}

impl Draft {
    /// Promote the draft to a create payload, or name what is missing.
    pub fn into_submission(self) -> Result<NewComplaint> {
        fn required(
            value: Option<String>,
            name: &'static str,
            missing: &mut Vec<&'static str>,
        ) -> String {
            match value {
                Some(v) if !v.trim().is_empty() => v,
                _ => {
                    missing.push(name);
                    String::new()
                }
            }
        }

        let mut missing = Vec::new();
        let title = required(self.title, "title", &mut missing);
        let description = required(self.description, "description", &mut missing);
        let category_id = required(self.category_id, "category", &mut missing);
        let address = required(self.address, "address", &mut missing);
        if !missing.is_empty() {
            return Err(CivicError::IncompleteDraft(missing.join(", ")));
        }

        Ok(NewComplaint {
            title,
            description,
            category_id,
            sub_category_id: self.sub_category_id,
            priority: self.priority.unwrap_or_default(),
            address,
            landmark: self.landmark,
            location: self.location,
            images: self.images,
            is_anonymous: self.is_anonymous,
        })
    }
}

/// One queued submission, tagged with its insertion order and a local id
/// used for reporting until the server assigns the real one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub local_id: String,
    pub payload: NewComplaint,
    pub enqueued_at: Timestamp,
}

/// The outcome of one `sync_pending` run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    /// Server ids of complaints created this run, in queue order.
    pub submitted: Vec<String>,
    /// Entries that stayed queued, with the failure text.
    pub failed: Vec<SyncFailure>,
    /// True when the walk stopped early because the session was rejected.
    /// Remaining entries were not attempted and stay queued.
    pub halted_unauthorized: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncFailure {
    pub local_id: String,
    pub error: String,
    pub transient: bool,
}

pub struct OfflineQueue {
    storage: Arc<dyn DurableStore>,
    draft: RwLock<Option<Draft>>,
    entries: RwLock<Vec<PendingSubmission>>,
}

impl OfflineQueue {
    /// Load the persisted draft and queue. A corrupt queue document is an
    /// error (it holds user submissions and must not be dropped silently);
    /// a corrupt draft is logged and discarded.
    pub fn open(storage: Arc<dyn DurableStore>) -> Result<Self> {
        let draft = match storage.get(DRAFT_KEY)? {
            Some(raw) => match serde_json::from_str::<Draft>(&raw) {
                Ok(draft) => Some(draft),
                Err(e) => {
                    tracing::warn!("discarding unreadable draft: {e}");
                    None
                }
            },
            None => None,
        };

        let entries: Vec<PendingSubmission> = match storage.get(QUEUE_KEY)? {
            Some(raw) => serde_json::from_str(&raw)?,
            None => Vec::new(),
        };

        Ok(OfflineQueue {
            storage,
            draft: RwLock::new(draft),
            entries: RwLock::new(entries),
        })
    }

    // ---- draft -------------------------------------------------------------

    pub fn draft(&self) -> Option<Draft> {
        self.draft.read().clone()
    }

    /// Overwrite the draft slot and commit it.
    pub fn save_draft(&self, mut draft: Draft) -> Result<()> {
        draft.saved_at = Some(Timestamp::now());
        self.storage
            .put(DRAFT_KEY, &serde_json::to_string(&draft)?)?;
        *self.draft.write() = Some(draft);
        Ok(())
    }

    pub fn clear_draft(&self) -> Result<()> {
        self.storage.delete(DRAFT_KEY)?;
        *self.draft.write() = None;
        Ok(())
    }

    // ---- queue -------------------------------------------------------------

    pub fn entries(&self) -> Vec<PendingSubmission> {
        self.entries.read().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Append a fully validated submission and commit the queue.
    pub fn enqueue(&self, payload: NewComplaint) -> Result<PendingSubmission> {
        let entry = PendingSubmission {
            local_id: Uuid::new_v4().to_string(),
            payload,
            enqueued_at: Timestamp::now(),
        };
        let mut entries = self.entries.write();
        entries.push(entry.clone());
        self.persist(&entries)?;
        Ok(entry)
    }

    fn persist(&self, entries: &[PendingSubmission]) -> Result<()> {
        self.storage
            .put(QUEUE_KEY, &serde_json::to_string(entries)?)
    }

    fn remove_entry(&self, local_id: &str) -> Result<()> {
        let mut entries = self.entries.write();
        entries.retain(|e| e.local_id != local_id);
        self.persist(&entries)
    }

    /// Replay the queue against the gateway, in insertion order.
    ///
    /// Each confirmed create removes its entry and puts the server-assigned
    /// complaint at the head of "mine". A failed entry stays queued and the
    /// walk moves on to the next one, so a single bad entry does not block
    /// the rest. The exception is `Unauthorized`, which would fail every
    /// remaining create identically and halts the run for the session
    /// collaborator to deal with.
    pub async fn sync_pending(
        &self,
        gateway: &Arc<dyn ComplaintGateway>,
        store: &ComplaintStore,
        actor: &Actor,
    ) -> Result<SyncReport> {
        let snapshot = self.entries();
        let mut report = SyncReport::default();

        for entry in snapshot {
            match gateway.create(&entry.payload, actor).await {
                Ok(complaint) => {
                    // Commit removal before exposing the complaint: a crash
                    // between the two re-fetches "mine" but never resubmits.
                    self.remove_entry(&entry.local_id)?;
                    tracing::info!(
                        "queued submission '{}' confirmed as {}",
                        entry.local_id,
                        complaint.complaint_number
                    );
                    report.submitted.push(complaint.id.clone());
                    store.insert_mine_front(complaint);
                }
                Err(CivicError::Unauthorized) => {
                    tracing::warn!(
                        "session rejected while syncing '{}'; halting queue replay",
                        entry.local_id
                    );
                    report.failed.push(SyncFailure {
                        local_id: entry.local_id,
                        error: CivicError::Unauthorized.to_string(),
                        transient: false,
                    });
                    report.halted_unauthorized = true;
                    store.set_last_error(&CivicError::Unauthorized);
                    return Ok(report);
                }
                Err(err) => {
                    tracing::warn!(
                        "queued submission '{}' failed, keeping it queued: {err}",
                        entry.local_id
                    );
                    report.failed.push(SyncFailure {
                        local_id: entry.local_id,
                        error: err.to_string(),
                        transient: err.is_transient(),
                    });
                    store.set_last_error(&err);
                }
            }
        }

        if report.failed.is_empty() {
            store.clear_last_error();
        }
        Ok(report)
    }
}
