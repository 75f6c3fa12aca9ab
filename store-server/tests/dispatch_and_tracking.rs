//! Dispatch, double-booking, and delivery reconciliation tests
//!
//! The courier here is a test double that counts booking calls so the
//! book-once guarantee is observable, not just inferred from state.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use shared::models::{CartLine, CheckoutRequest, PaymentStatus, ShipmentStatus};
use store_server::courier::{CourierClient, CourierError, ScanEvent, ShipmentRequest};
use store_server::db::DbService;
use store_server::db::repository::order;
use store_server::orders::tracking::tracking_timeline;
use store_server::orders::{DeliveryReconciler, ShipmentDispatcher, checkout};
use store_server::utils::AppError;
use store_server::{Config, ServerState};
use tempfile::TempDir;

/// Counts bookings; optionally fails the first call, optionally reports
/// the shipment delivered.
struct CountingCourier {
    bookings: AtomicUsize,
    fail_next: AtomicBool,
    delivered: AtomicBool,
}

impl CountingCourier {
    fn new() -> Self {
        Self {
            bookings: AtomicUsize::new(0),
            fail_next: AtomicBool::new(false),
            delivered: AtomicBool::new(false),
        }
    }
}

#[async_trait::async_trait]
impl CourierClient for CountingCourier {
    async fn book(&self, request: &ShipmentRequest) -> Result<String, CourierError> {
        assert!(request.weight_kg > 0.0);
        if self.fail_next.swap(false, Ordering::SeqCst) {
            return Err(CourierError::Unavailable("carrier timeout".to_string()));
        }
        let n = self.bookings.fetch_add(1, Ordering::SeqCst);
        Ok(format!("DLTEST{:09}", n + 1))
    }

    async fn track(&self, _waybill: &str) -> Result<Vec<ScanEvent>, CourierError> {
        let mut scans = vec![
            ScanEvent {
                timestamp: 2_000,
                location: "Pune Hub".to_string(),
                description: "In Transit".to_string(),
            },
            ScanEvent {
                timestamp: 1_000,
                location: "Mahabaleshwar".to_string(),
                description: "Picked Up".to_string(),
            },
        ];
        if self.delivered.load(Ordering::SeqCst) {
            scans.push(ScanEvent {
                timestamp: 3_000,
                location: "Mumbai".to_string(),
                description: "Delivered to consignee".to_string(),
            });
        }
        Ok(scans)
    }

    async fn label_url(&self, _waybill: &str) -> Result<Option<String>, CourierError> {
        Ok(None)
    }
}

async fn paid_order_setup() -> (TempDir, ServerState, Arc<CountingCourier>, String) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("store.db");
    let db = DbService::new(&db_path.to_string_lossy()).await.unwrap();

    let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    config.razorpay_key_id = None;
    config.razorpay_key_secret = None;
    config.delhivery_api_key = None;

    let state = ServerState::with_pool(config, db.pool).unwrap();

    let request = CheckoutRequest {
        customer_name: "Asha Kulkarni".to_string(),
        phone_number: "919876543210".to_string(),
        address: "14 Market Road".to_string(),
        city: None,
        pincode: "412806".to_string(),
        items: vec![CartLine {
            quantity: 2,
            product_ref: None,
            name: None,
            price: None,
        }],
        client_token: None,
    };
    let created = checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        request,
    )
    .await
    .unwrap();

    assert!(order::mark_paid(&state.pool, &created.order_id, "pay_test")
        .await
        .unwrap());

    let courier = Arc::new(CountingCourier::new());
    (dir, state, courier, created.order_id)
}

#[tokio::test]
async fn test_concurrent_dispatch_books_once() {
    let (_dir, state, courier, order_id) = paid_order_setup().await;
    let dispatcher = ShipmentDispatcher::new(state.pool.clone(), courier.clone());

    let (a, b) = tokio::join!(dispatcher.dispatch(&order_id), dispatcher.dispatch(&order_id));

    // Exactly one wins, exactly one carrier call happened
    let results = [a, b];
    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert_eq!(
        results
            .iter()
            .filter(|r| matches!(r, Err(AppError::Conflict(_))))
            .count(),
        1
    );
    assert_eq!(courier.bookings.load(Ordering::SeqCst), 1);

    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShipmentStatus::Shipped);
    let winner = results.iter().flatten().next().unwrap();
    assert_eq!(stored.tracking_id.as_deref(), Some(winner.as_str()));
}

#[tokio::test]
async fn test_dispatch_requires_payment() {
    let (_dir, state, courier, order_id) = paid_order_setup().await;
    let dispatcher = ShipmentDispatcher::new(state.pool.clone(), courier.clone());

    // A second, unpaid order
    let request = CheckoutRequest {
        customer_name: "Ravi Shinde".to_string(),
        phone_number: "919812345678".to_string(),
        address: "2 Hill View".to_string(),
        city: None,
        pincode: "412806".to_string(),
        items: vec![CartLine {
            quantity: 1,
            product_ref: None,
            name: None,
            price: None,
        }],
        client_token: None,
    };
    let unpaid = checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        request,
    )
    .await
    .unwrap();

    let result = dispatcher.dispatch(&unpaid.order_id).await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
    // No carrier call for the unpaid order
    assert_eq!(courier.bookings.load(Ordering::SeqCst), 0);

    // The paid one still dispatches fine afterwards
    dispatcher.dispatch(&order_id).await.unwrap();
}

#[tokio::test]
async fn test_booking_failure_is_retryable() {
    let (_dir, state, courier, order_id) = paid_order_setup().await;
    let dispatcher = ShipmentDispatcher::new(state.pool.clone(), courier.clone());

    courier.fail_next.store(true, Ordering::SeqCst);
    let first = dispatcher.dispatch(&order_id).await;
    assert!(matches!(first, Err(AppError::BookingFailed(_))));

    // A timeout must never look like a shipped order
    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShipmentStatus::Processing);
    assert!(stored.tracking_id.is_none());

    // Retry succeeds against the untouched precondition
    let awb = dispatcher.dispatch(&order_id).await.unwrap();
    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.tracking_id.as_deref(), Some(awb.as_str()));
    assert_eq!(stored.payment_status, PaymentStatus::Paid);
}

#[tokio::test]
async fn test_tracking_timeline_projection() {
    let (_dir, state, courier, order_id) = paid_order_setup().await;
    let dispatcher = ShipmentDispatcher::new(state.pool.clone(), courier.clone());

    // No waybill yet → empty, not an error
    let events = tracking_timeline(&state.pool, courier.as_ref(), &order_id)
        .await
        .unwrap();
    assert!(events.is_empty());

    dispatcher.dispatch(&order_id).await.unwrap();

    // Carrier returns scans out of order; the timeline is sorted ascending
    let events = tracking_timeline(&state.pool, courier.as_ref(), &order_id)
        .await
        .unwrap();
    assert_eq!(events.len(), 2);
    assert!(events[0].timestamp <= events[1].timestamp);
    assert_eq!(events[0].description, "Picked Up");
}

#[tokio::test]
async fn test_delivery_reconciliation() {
    let (_dir, state, courier, order_id) = paid_order_setup().await;
    let dispatcher = ShipmentDispatcher::new(state.pool.clone(), courier.clone());
    dispatcher.dispatch(&order_id).await.unwrap();

    let reconciler = DeliveryReconciler::new(
        state.pool.clone(),
        courier.clone(),
        Duration::from_secs(600),
    );

    // No delivered scan yet — nothing moves
    assert_eq!(reconciler.reconcile_once().await.unwrap(), 0);
    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShipmentStatus::Shipped);

    // Carrier reports delivery — one forward transition, then steady state
    courier.delivered.store(true, Ordering::SeqCst);
    assert_eq!(reconciler.reconcile_once().await.unwrap(), 1);
    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShipmentStatus::Delivered);

    assert_eq!(reconciler.reconcile_once().await.unwrap(), 0);
    let stored = order::find_by_order_id(&state.pool, &order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, ShipmentStatus::Delivered);
}
