//--------------------------------------------------------------------------------------------------
// TEST MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// End-to-end tests of the mutation -> recompute -> publish -> consume pipeline, using an
// in-process broker that records every payload and a last-writer-wins consumer cache.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures::future::join_all;
use parking_lot::Mutex;
use rand::seq::SliceRandom;
use serde_json::Value;
use tokio_test::{assert_err, assert_ok};

use stall_reviews::inbounds::handlers::handle_stats_event;
use stall_reviews::{
    Author, BrokerClient, BrokerError, EventPublisher, EventRoutes, InMemoryReviewStore, NewReview,
    ReviewPatch, ReviewService, ReviewServiceImpl, ReviewStore, StallStatsCache,
};

#[ctor::ctor]
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .with_test_writer()
        .try_init();
}

#[derive(Debug, Clone)]
struct Sent {
    routing_key: String,
    payload: Vec<u8>,
}

impl Sent {
    fn json(&self) -> Value {
        serde_json::from_slice(&self.payload).unwrap()
    }
}

/// Accepts every message and keeps it in arrival order.
#[derive(Default)]
struct RecordingBroker {
    sent: Mutex<Vec<Sent>>,
}

impl RecordingBroker {
    fn sent(&self) -> Vec<Sent> {
        self.sent.lock().clone()
    }

    fn with_key(&self, routing_key: &str) -> Vec<Value> {
        self.sent()
            .iter()
            .filter(|sent| sent.routing_key == routing_key)
            .map(Sent::json)
            .collect()
    }
}

#[async_trait]
impl BrokerClient for RecordingBroker {
    async fn send(&self, _exchange: &str, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        self.sent.lock().push(Sent {
            routing_key: routing_key.to_owned(),
            payload,
        });
        Ok(())
    }
}

/// Never answers.
struct HangingBroker;

#[async_trait]
impl BrokerClient for HangingBroker {
    async fn send(&self, _exchange: &str, _routing_key: &str, _payload: Vec<u8>) -> Result<(), BrokerError> {
        futures::future::pending::<()>().await;
        Ok(())
    }
}

fn service_with(broker: Arc<dyn BrokerClient>) -> (Arc<ReviewServiceImpl>, Arc<InMemoryReviewStore>) {
    let store = Arc::new(InMemoryReviewStore::new());
    let publisher = Arc::new(EventPublisher::new(
        broker,
        EventRoutes::default(),
        Duration::from_millis(250),
    ));
    (Arc::new(ReviewServiceImpl::new(store.clone(), publisher)), store)
}

fn review_of(stall_id: i64, rating: i32) -> NewReview {
    NewReview {
        stall_id,
        rating,
        ..Default::default()
    }
}

fn replay(events: &[Sent], cache: &StallStatsCache) {
    let routes = EventRoutes::default();
    for sent in events {
        assert_ok!(handle_stats_event(&sent.routing_key, &sent.payload, &routes, cache));
    }
}

#[tokio::test(start_paused = true)]
async fn mutations_complete_when_the_broker_hangs() {
    let (service, store) = service_with(Arc::new(HangingBroker));
    let started = tokio::time::Instant::now();

    let review = service
        .create_review(review_of(1, 5), Author::new("alice", "Alice"))
        .await
        .unwrap();

    // one timeout per event
    assert!(started.elapsed() >= Duration::from_millis(500));
    assert!(store.find_review(review.id).await.unwrap().is_some());

    let updated = service
        .update_review(
            review.id,
            ReviewPatch {
                rating: Some(3),
                ..Default::default()
            },
            "alice",
        )
        .await
        .unwrap();
    assert_eq!(updated.rating, 3);

    assert_ok!(service.delete_review(review.id, "alice").await);
    assert!(store.find_review(review.id).await.unwrap().is_none());
}

#[tokio::test]
async fn bulk_delete_publishes_one_cycle_per_stall() {
    let broker = Arc::new(RecordingBroker::default());
    let (service, _store) = service_with(broker.clone());
    let author = Author::new("alice", "Alice");

    let mut ids = Vec::new();
    for (stall_id, rating) in [(10, 5), (10, 1), (20, 4)] {
        ids.push(service.create_review(review_of(stall_id, rating), author.clone()).await.unwrap().id);
    }
    broker.sent.lock().clear();

    let outcome = service.admin_bulk_delete(ids).await.unwrap();
    assert_eq!(outcome.affected_stalls, vec![10, 20]);

    let ratings = broker.with_key("review.rating.changed");
    let prices = broker.with_key("review.price.changed");
    assert_eq!(ratings.len(), 2);
    assert_eq!(prices.len(), 2);
    for event in ratings.iter().chain(prices.iter()) {
        assert!(event["timestamp"].is_string());
    }
    assert!(ratings.iter().all(|event| event["reviewCount"] == 0));
}

#[tokio::test]
async fn reordered_delivery_still_settles_on_newest_snapshot() {
    let broker = Arc::new(RecordingBroker::default());
    let (service, _store) = service_with(broker.clone());

    service
        .create_review(review_of(5, 2), Author::new("alice", "Alice"))
        .await
        .unwrap();
    service
        .create_review(review_of(5, 4), Author::new("bob", "Bob"))
        .await
        .unwrap();

    // the first cycle's events arrive last
    let mut delayed = broker.sent();
    delayed.reverse();

    let cache = StallStatsCache::new();
    replay(&delayed, &cache);

    let stats = cache.get(5).unwrap();
    assert_eq!(stats.average_rating, 3.0);
    assert_eq!(stats.review_count, 2);

    // a naive consumer that keeps the last arrival would be wrong here
    let last_arrival = delayed
        .iter()
        .rev()
        .find(|sent| sent.routing_key == "review.rating.changed")
        .map(Sent::json)
        .unwrap();
    assert_eq!(last_arrival["reviewCount"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_creates_converge_at_the_consumer() {
    let broker = Arc::new(RecordingBroker::default());
    let (service, _store) = service_with(broker.clone());

    let creates = (0..24).map(|i| {
        let service = service.clone();
        tokio::spawn(async move {
            let author = Author::new(&format!("user-{}", i), "someone");
            service.create_review(review_of(77, (i % 5) + 1), author).await
        })
    });
    for result in join_all(creates).await {
        assert_ok!(result.unwrap());
    }

    let mut events = broker.sent();
    assert_eq!(events.len(), 48);
    events.shuffle(&mut rand::thread_rng());

    let cache = StallStatsCache::new();
    replay(&events, &cache);

    let expected = service.stall_stats(77).await.unwrap();
    let settled = cache.get(77).unwrap();
    assert_eq!(settled.review_count, 24);
    assert_eq!(settled.review_count, expected.total_reviews);
    assert_eq!(settled.average_rating, expected.average_rating);
}

#[tokio::test]
async fn consumer_rejects_foreign_messages() {
    let cache = StallStatsCache::new();
    let routes = EventRoutes::default();

    assert_err!(handle_stats_event("review.created", b"{}", &routes, &cache));
    assert_err!(handle_stats_event("review.price.changed", b"[]", &routes, &cache));
    assert!(cache.is_empty());
}
