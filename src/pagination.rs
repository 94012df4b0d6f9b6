//! The pagination and filter engine.
//!
//! Each of the four views pages independently: fetching one view replaces
//! that view's collection and metadata and touches nothing else. Repeated
//! fetches of the same page are idempotent (page-replace, not append).
//!
//! A fetch superseded by a newer fetch for the same view is discarded when
//! its response finally arrives; the store's per-view request token decides.
//! Callers changing the filter are responsible for requesting page 1; the
//! engine never resets the page on its own.

use std::sync::Arc;

use crate::error::Result;
use crate::remote::ComplaintGateway;
use crate::store::ComplaintStore;
use crate::types::{ComplaintFilter, ComplaintView, PageMeta};

/// What became of a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was applied to the view.
    Applied(PageMeta),
    /// A newer fetch for the view superseded this one; its result was
    /// dropped and the view is untouched by it.
    Superseded,
}

pub struct PaginationEngine {
    gateway: Arc<dyn ComplaintGateway>,
}

impl PaginationEngine {
    pub fn new(gateway: Arc<dyn ComplaintGateway>) -> Self {
        PaginationEngine { gateway }
    }

    /// Fetch one page of a view under a filter and replace the view's
    /// backing collection with it.
    ///
    /// On failure the view keeps its last good page and metadata, the error
    /// becomes the last-error value, and the caller gets it back. If a newer
    /// fetch already superseded this one, the failure is irrelevant and
    /// swallowed as `Superseded`.
    pub async fn fetch(
        &self,
        store: &ComplaintStore,
        view: ComplaintView,
        page: u32,
        per_page: u32,
        filter: ComplaintFilter,
    ) -> Result<FetchOutcome> {
        let token = store.begin_fetch(view);

        match self.gateway.fetch_page(view, page, per_page, &filter).await {
            Ok(fetched) => {
                let meta = fetched.meta();
                if store.try_complete_fetch(view, token, fetched.data, meta, filter) {
                    store.clear_last_error();
                    Ok(FetchOutcome::Applied(meta))
                } else {
                    tracing::debug!("discarding stale page {page} for view '{view}'");
                    Ok(FetchOutcome::Superseded)
                }
            }
            Err(err) => {
                if !store.is_latest_request(view, token) {
                    tracing::debug!("ignoring failure of superseded fetch for view '{view}'");
                    return Ok(FetchOutcome::Superseded);
                }
                store.set_last_error(&err);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::complaint::{Comment, Complaint, NewComplaint};
    use crate::error::CivicError;
    use crate::remote::{ComplaintDetail, Page};
    use crate::store::test_helpers::make_complaint;
    use crate::types::{Actor, ComplaintStatus};

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::sync::Notify;

    /// Gateway serving scripted pages, with an optional per-page gate so a
    /// test can hold one response open while another completes.
    #[derive(Default)]
    struct PagedGateway {
        pages: Mutex<Vec<(u32, Page<Complaint>)>>,
        fail_next: Mutex<Option<CivicError>>,
        gates: Mutex<Vec<(u32, std::sync::Arc<Notify>, std::sync::Arc<Notify>)>>,
    }

    impl PagedGateway {
        fn script_page(&self, page: u32, ids: &[&str]) {
            let data: Vec<Complaint> = ids
                .iter()
                .map(|id| make_complaint(id, ComplaintStatus::Submitted))
                .collect();
            let total = data.len() as u64;
            self.pages.lock().push((
                page,
                Page {
                    data,
                    page,
                    per_page: 20,
                    total,
                    total_pages: page,
                },
            ));
        }

        fn gate_page(&self, page: u32) -> (std::sync::Arc<Notify>, std::sync::Arc<Notify>) {
            let entered = std::sync::Arc::new(Notify::new());
            let release = std::sync::Arc::new(Notify::new());
            self.gates
                .lock()
                .push((page, entered.clone(), release.clone()));
            (entered, release)
        }
    }

    #[async_trait]
    impl ComplaintGateway for PagedGateway {
        async fn create(&self, _payload: &NewComplaint, _actor: &Actor) -> Result<Complaint> {
            unreachable!("not used by pagination tests")
        }

        async fn fetch_page(
            &self,
            _view: ComplaintView,
            page: u32,
            per_page: u32,
            _filter: &ComplaintFilter,
        ) -> Result<Page<Complaint>> {
            let gate = self
                .gates
                .lock()
                .iter()
                .find(|(p, _, _)| *p == page)
                .map(|(_, entered, release)| (entered.clone(), release.clone()));
            if let Some((entered, release)) = gate {
                entered.notify_one();
                release.notified().await;
            }

            if let Some(err) = self.fail_next.lock().take() {
                return Err(err);
            }

            self.pages
                .lock()
                .iter()
                .find(|(p, _)| *p == page)
                .map(|(_, page)| page.clone())
                .ok_or_else(|| CivicError::Api(format!("page {page} not scripted")))
                .map(|mut p| {
                    p.per_page = per_page;
                    p
                })
        }

        async fn fetch_complaint(&self, _id: &str) -> Result<ComplaintDetail> {
            unreachable!("not used by pagination tests")
        }

        async fn update_status(
            &self,
            _id: &str,
            _new_status: ComplaintStatus,
            _actor: &Actor,
            _notes: Option<&str>,
            _images: &[String],
        ) -> Result<Complaint> {
            unreachable!("not used by pagination tests")
        }

        async fn assign(
            &self,
            _id: &str,
            _employee_id: &str,
            _actor: &Actor,
        ) -> Result<Complaint> {
            unreachable!("not used by pagination tests")
        }

        async fn toggle_upvote(&self, _id: &str, _actor: &Actor) -> Result<bool> {
            unreachable!("not used by pagination tests")
        }

        async fn add_comment(
            &self,
            _id: &str,
            _actor: &Actor,
            _content: &str,
            _images: &[String],
            _is_official: bool,
        ) -> Result<Comment> {
            unreachable!("not used by pagination tests")
        }

        async fn fetch_catalog(&self) -> Result<Vec<Category>> {
            unreachable!("not used by pagination tests")
        }
    }

    fn ids(store: &ComplaintStore, view: ComplaintView) -> Vec<String> {
        store
            .view_snapshot(view)
            .complaints
            .iter()
            .map(|c| c.id.clone())
            .collect()
    }

    #[tokio::test]
    async fn test_fetch_replaces_page() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(1, &["c-1", "c-2"]);
        gateway.script_page(2, &["c-3"]);
        let engine = PaginationEngine::new(gateway.clone() as Arc<dyn ComplaintGateway>);
        let store = ComplaintStore::new();

        let outcome = engine
            .fetch(&store, ComplaintView::Mine, 1, 20, ComplaintFilter::default())
            .await
            .unwrap();
        assert!(matches!(outcome, FetchOutcome::Applied(meta) if meta.page == 1));
        assert_eq!(ids(&store, ComplaintView::Mine), vec!["c-1", "c-2"]);

        engine
            .fetch(&store, ComplaintView::Mine, 2, 20, ComplaintFilter::default())
            .await
            .unwrap();
        // page-replace, not append
        assert_eq!(ids(&store, ComplaintView::Mine), vec!["c-3"]);
        assert_eq!(store.view_snapshot(ComplaintView::Mine).meta.page, 2);

        // refetching the same page is idempotent
        engine
            .fetch(&store, ComplaintView::Mine, 2, 20, ComplaintFilter::default())
            .await
            .unwrap();
        assert_eq!(ids(&store, ComplaintView::Mine), vec!["c-3"]);
    }

    #[tokio::test]
    async fn test_fetch_does_not_touch_other_views() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(1, &["c-1"]);
        gateway.script_page(2, &["c-9"]);
        let engine = PaginationEngine::new(gateway.clone() as Arc<dyn ComplaintGateway>);
        let store = ComplaintStore::new();

        engine
            .fetch(&store, ComplaintView::Mine, 1, 20, ComplaintFilter::default())
            .await
            .unwrap();
        let mine_before = store.view_snapshot(ComplaintView::Mine);

        engine
            .fetch(&store, ComplaintView::Assigned, 2, 20, ComplaintFilter::default())
            .await
            .unwrap();

        assert_eq!(store.view_snapshot(ComplaintView::Mine), mine_before);
        assert_eq!(store.view_snapshot(ComplaintView::Public).meta, PageMeta::default());
        assert_eq!(store.view_snapshot(ComplaintView::All).meta, PageMeta::default());
        assert_eq!(store.view_snapshot(ComplaintView::Assigned).meta.page, 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_preserves_last_good_page() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(1, &["c-1", "c-2"]);
        let engine = PaginationEngine::new(gateway.clone() as Arc<dyn ComplaintGateway>);
        let store = ComplaintStore::new();

        engine
            .fetch(&store, ComplaintView::Public, 1, 20, ComplaintFilter::default())
            .await
            .unwrap();
        let before = store.view_snapshot(ComplaintView::Public);

        *gateway.fail_next.lock() = Some(CivicError::Unavailable("503".into()));
        let err = engine
            .fetch(&store, ComplaintView::Public, 2, 20, ComplaintFilter::default())
            .await
            .unwrap_err();
        assert!(err.is_transient());

        assert_eq!(store.view_snapshot(ComplaintView::Public), before);
        assert!(store.last_error().is_some());
    }

    #[tokio::test]
    async fn test_stale_response_is_discarded() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(1, &["c-old"]);
        gateway.script_page(2, &["c-new"]);
        let (entered, release) = gateway.gate_page(1);

        let engine = Arc::new(PaginationEngine::new(
            gateway.clone() as Arc<dyn ComplaintGateway>
        ));
        let store = Arc::new(ComplaintStore::new());

        // fetch A (page 1) parks inside the gateway
        let fetch_a = {
            let engine = engine.clone();
            let store = store.clone();
            tokio::spawn(async move {
                engine
                    .fetch(&store, ComplaintView::Mine, 1, 20, ComplaintFilter::default())
                    .await
            })
        };
        entered.notified().await;

        // fetch B (page 2) is issued later and completes first
        engine
            .fetch(&store, ComplaintView::Mine, 2, 20, ComplaintFilter::default())
            .await
            .unwrap();
        assert_eq!(ids(&store, ComplaintView::Mine), vec!["c-new"]);

        // A's response finally arrives and must be dropped
        release.notify_one();
        let outcome = fetch_a.await.unwrap().unwrap();
        assert_eq!(outcome, FetchOutcome::Superseded);
        assert_eq!(ids(&store, ComplaintView::Mine), vec!["c-new"]);
        assert_eq!(store.view_snapshot(ComplaintView::Mine).meta.page, 2);
    }

    #[tokio::test]
    async fn test_superseded_failure_does_not_clobber_last_error() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(2, &["c-new"]);
        let (entered, release) = gateway.gate_page(1);

        let engine = Arc::new(PaginationEngine::new(
            gateway.clone() as Arc<dyn ComplaintGateway>
        ));
        let store = Arc::new(ComplaintStore::new());

        let fetch_a = {
            let engine = engine.clone();
            let store = store.clone();
            tokio::spawn(async move {
                engine
                    .fetch(&store, ComplaintView::Mine, 1, 20, ComplaintFilter::default())
                    .await
            })
        };
        entered.notified().await;

        engine
            .fetch(&store, ComplaintView::Mine, 2, 20, ComplaintFilter::default())
            .await
            .unwrap();

        // A fails after being superseded: swallowed, no error surfaced
        *gateway.fail_next.lock() = Some(CivicError::Unavailable("timeout".into()));
        release.notify_one();
        let outcome = fetch_a.await.unwrap().unwrap();
        assert_eq!(outcome, FetchOutcome::Superseded);
        assert!(store.last_error().is_none());
    }

    #[tokio::test]
    async fn test_filter_travels_with_the_page() {
        let gateway = Arc::new(PagedGateway::default());
        gateway.script_page(1, &["c-1"]);
        let engine = PaginationEngine::new(gateway.clone() as Arc<dyn ComplaintGateway>);
        let store = ComplaintStore::new();

        let filter = ComplaintFilter {
            status: Some(ComplaintStatus::Resolved),
            ..Default::default()
        };
        engine
            .fetch(&store, ComplaintView::All, 1, 20, filter.clone())
            .await
            .unwrap();
        assert_eq!(store.view_snapshot(ComplaintView::All).filter, filter);
        // other views keep their own (empty) filter
        assert!(store.view_snapshot(ComplaintView::Mine).filter.is_empty());
    }
}
