//! Pagination through the client facade: per-view isolation, page-replace
//! semantics, and filter changes restarting at page 1.

mod common;

use std::sync::Arc;

use civiclink::{
    Actor, CivicClient, ComplaintFilter, ComplaintGateway, ComplaintStatus, ComplaintView,
    DurableStore, FetchOutcome, MemoryStore, Role,
};

use common::{MockGateway, payload};

fn admin_client(gateway: &Arc<MockGateway>) -> CivicClient {
    let storage: Arc<dyn DurableStore> = Arc::new(MemoryStore::new());
    CivicClient::new(
        gateway.clone() as Arc<dyn ComplaintGateway>,
        storage,
        Actor::new("admin-1", Role::Admin),
    )
    .unwrap()
}

async fn seed_server(client: &CivicClient, count: usize) {
    for i in 0..count {
        client.submit(payload(&format!("complaint {i:02}"))).await.unwrap();
    }
}

#[tokio::test]
async fn test_page_replace_and_meta() {
    let gateway = Arc::new(MockGateway::new());
    let client = admin_client(&gateway);
    seed_server(&client, 25).await;

    let outcome = client.fetch_page(ComplaintView::All, 1).await.unwrap();
    match outcome {
        FetchOutcome::Applied(meta) => {
            assert_eq!(meta.page, 1);
            assert_eq!(meta.total, 25);
            assert_eq!(meta.total_pages, 2);
        }
        other => panic!("expected Applied, got {other:?}"),
    }
    assert_eq!(client.view(ComplaintView::All).complaints.len(), 20);

    client.fetch_page(ComplaintView::All, 2).await.unwrap();
    let snapshot = client.view(ComplaintView::All);
    // replaced, not appended
    assert_eq!(snapshot.complaints.len(), 5);
    assert_eq!(snapshot.meta.page, 2);

    // same page again: same contents
    client.fetch_page(ComplaintView::All, 2).await.unwrap();
    assert_eq!(client.view(ComplaintView::All).complaints.len(), 5);
}

#[tokio::test]
async fn test_fetching_one_view_leaves_the_others_alone() {
    let gateway = Arc::new(MockGateway::new());
    let client = admin_client(&gateway);
    seed_server(&client, 30).await;

    client.fetch_page(ComplaintView::Mine, 1).await.unwrap();
    client.fetch_page(ComplaintView::Public, 1).await.unwrap();
    let mine_before = client.view(ComplaintView::Mine);
    let public_before = client.view(ComplaintView::Public);

    client.fetch_page(ComplaintView::Assigned, 2).await.unwrap();

    assert_eq!(client.view(ComplaintView::Mine), mine_before);
    assert_eq!(client.view(ComplaintView::Public), public_before);
    assert_eq!(client.view(ComplaintView::Assigned).meta.page, 2);
    // a view never fetched keeps pristine metadata
    assert_eq!(client.view(ComplaintView::All).meta.page, 1);
    assert_eq!(client.view(ComplaintView::All).meta.total, 0);
}

#[tokio::test]
async fn test_failed_fetch_keeps_last_good_page() {
    let gateway = Arc::new(MockGateway::new());
    let client = admin_client(&gateway);
    seed_server(&client, 10).await;

    client.fetch_page(ComplaintView::Public, 1).await.unwrap();
    let before = client.view(ComplaintView::Public);
    assert_eq!(before.complaints.len(), 10);

    gateway.set_offline(true);
    assert!(client.fetch_page(ComplaintView::Public, 2).await.is_err());

    assert_eq!(client.view(ComplaintView::Public), before);
    assert!(client.last_error().is_some());

    // and the next successful fetch clears the error
    gateway.set_offline(false);
    client.fetch_page(ComplaintView::Public, 1).await.unwrap();
    assert!(client.last_error().is_none());
}

#[tokio::test]
async fn test_filter_change_restarts_at_page_one() {
    let gateway = Arc::new(MockGateway::new());
    let client = admin_client(&gateway);
    seed_server(&client, 25).await;

    client.fetch_page(ComplaintView::All, 2).await.unwrap();
    assert_eq!(client.view(ComplaintView::All).meta.page, 2);

    let filter = ComplaintFilter {
        status: Some(ComplaintStatus::Submitted),
        ..Default::default()
    };
    client.set_filter(ComplaintView::All, filter.clone()).await.unwrap();

    let snapshot = client.view(ComplaintView::All);
    assert_eq!(snapshot.meta.page, 1);
    assert_eq!(snapshot.filter, filter);
    // the other views keep their own filters
    assert!(client.view(ComplaintView::Mine).filter.is_empty());
}
