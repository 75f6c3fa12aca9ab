//! Checkout and payment pipeline tests over a real SQLite database
//!
//! Uses the mock gateway/courier selected by `ServerState::with_pool` when no
//! credentials are configured, so callbacks can be signed with the known
//! mock secret.

use shared::models::{CartLine, CheckoutRequest, PaymentCallback, PaymentStatus, ShipmentStatus};
use store_server::db::DbService;
use store_server::db::repository::order;
use store_server::orders::{checkout, payment};
use store_server::payments::mock::MOCK_GATEWAY_SECRET;
use store_server::payments::sign;
use store_server::utils::AppError;
use store_server::{Config, ServerState};
use tempfile::TempDir;

const LOCAL_PINCODE: &str = "412806";

async fn test_state() -> (TempDir, ServerState) {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("store.db");
    let db = DbService::new(&db_path.to_string_lossy()).await.unwrap();

    let mut config = Config::with_overrides(dir.path().to_string_lossy().to_string(), 0);
    // Force the mock integrations regardless of host environment
    config.razorpay_key_id = None;
    config.razorpay_key_secret = None;
    config.delhivery_api_key = None;

    let state = ServerState::with_pool(config, db.pool).unwrap();
    (dir, state)
}

fn checkout_request(quantity: i32, pincode: &str, token: Option<&str>) -> CheckoutRequest {
    CheckoutRequest {
        customer_name: "Asha Kulkarni".to_string(),
        phone_number: "919876543210".to_string(),
        address: "14 Market Road".to_string(),
        city: Some("Mahabaleshwar".to_string()),
        pincode: pincode.to_string(),
        items: vec![CartLine {
            quantity,
            product_ref: Some("jar-strawberry".to_string()),
            name: Some("Totally Different Jam".to_string()),
            // Tamper attempt: the client claims a unit price of 1
            price: Some(1.0),
        }],
        client_token: token.map(str::to_string),
    }
}

async fn create(state: &ServerState, request: CheckoutRequest) -> shared::models::Order {
    checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        request,
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn test_happy_path_totals() {
    let (_dir, state) = test_state().await;

    // 2 jars at the default server price of 249, 0.8 kg → 1.0 kg slab,
    // local zone: base 40 + one extra slab 30
    let order = create(&state, checkout_request(2, LOCAL_PINCODE, None)).await;

    assert_eq!(order.subtotal, 498.0);
    assert_eq!(order.shipping_cost, 70.0);
    assert_eq!(order.total_amount, 568.0);
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.status, ShipmentStatus::Processing);
    assert!(order.tracking_id.is_none());
    assert!(order.order_id.starts_with("ORD-"));
    assert!(order.invoice_id.starts_with("INV-"));
    assert!(order.gateway_order_id.as_deref().unwrap().starts_with("order_MOCK"));
}

#[tokio::test]
async fn test_client_price_is_discarded() {
    let (_dir, state) = test_state().await;

    let order = create(&state, checkout_request(1, LOCAL_PINCODE, None)).await;

    // The request claimed price=1 and a made-up name; the server resolved 249
    assert_eq!(order.items.len(), 1);
    assert_eq!(order.items[0].unit_price, 249.0);
    assert_eq!(order.items[0].line_total, 249.0);
    assert_ne!(order.items[0].name, "Totally Different Jam");
    assert_eq!(order.subtotal, 249.0);
}

#[tokio::test]
async fn test_non_serviceable_writes_nothing() {
    let (_dir, state) = test_state().await;

    let result = checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        checkout_request(1, "999999", None),
    )
    .await;

    assert!(matches!(result, Err(AppError::NotServiceable(_))));
    // Creation aborted before any write
    let orders = order::find_all(&state.pool, 50, 0).await.unwrap();
    assert!(orders.is_empty());
}

#[tokio::test]
async fn test_invalid_pincode_rejected() {
    let (_dir, state) = test_state().await;

    let result = checkout::create_order(
        &state.pool,
        &state.price_authority,
        state.gateway.as_ref(),
        checkout_request(1, "41280", None),
    )
    .await;

    assert!(matches!(result, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_idempotency_token_replay() {
    let (_dir, state) = test_state().await;

    let first = create(&state, checkout_request(2, LOCAL_PINCODE, Some("cart-abc"))).await;
    let second = create(&state, checkout_request(2, LOCAL_PINCODE, Some("cart-abc"))).await;

    // Same intent → same order, not a second billable row
    assert_eq!(first.order_id, second.order_id);
    assert_eq!(first.invoice_id, second.invoice_id);
    let orders = order::find_all(&state.pool, 50, 0).await.unwrap();
    assert_eq!(orders.len(), 1);
}

#[tokio::test]
async fn test_distinct_tokens_create_distinct_orders() {
    let (_dir, state) = test_state().await;

    let first = create(&state, checkout_request(1, LOCAL_PINCODE, Some("cart-1"))).await;
    let second = create(&state, checkout_request(1, LOCAL_PINCODE, Some("cart-2"))).await;

    assert_ne!(first.order_id, second.order_id);
    let orders = order::find_all(&state.pool, 50, 0).await.unwrap();
    assert_eq!(orders.len(), 2);
}

fn valid_callback(order: &shared::models::Order, payment_id: &str) -> PaymentCallback {
    PaymentCallback {
        gateway_payment_id: payment_id.to_string(),
        signature: sign(
            MOCK_GATEWAY_SECRET,
            order.gateway_order_id.as_deref().unwrap(),
            payment_id,
        ),
        amount: order.total_amount,
    }
}

#[tokio::test]
async fn test_confirm_payment_idempotent() {
    let (_dir, state) = test_state().await;
    let order = create(&state, checkout_request(2, LOCAL_PINCODE, None)).await;

    let callback = valid_callback(&order, "pay_001");
    let paid = payment::confirm_payment(
        &state.pool,
        state.gateway.as_ref(),
        &order.order_id,
        callback.clone(),
    )
    .await
    .unwrap();
    assert_eq!(paid.payment_status, PaymentStatus::Paid);

    // Gateway redelivers the same callback — must succeed with the same order
    let replay = payment::confirm_payment(
        &state.pool,
        state.gateway.as_ref(),
        &order.order_id,
        callback,
    )
    .await
    .unwrap();
    assert_eq!(replay.payment_status, PaymentStatus::Paid);
    assert_eq!(replay.order_id, paid.order_id);
}

#[tokio::test]
async fn test_amount_mismatch_marks_failed() {
    let (_dir, state) = test_state().await;
    let order = create(&state, checkout_request(2, LOCAL_PINCODE, None)).await;

    let mut callback = valid_callback(&order, "pay_002");
    callback.amount = 1.0;

    let result = payment::confirm_payment(
        &state.pool,
        state.gateway.as_ref(),
        &order.order_id,
        callback,
    )
    .await;
    assert!(matches!(result, Err(AppError::PaymentVerificationFailed(_))));

    // The row is retained, marked FAILED, and FAILED is terminal
    let stored = order::find_by_order_id(&state.pool, &order.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Failed);

    let late_valid = valid_callback(&order, "pay_002");
    let result = payment::confirm_payment(
        &state.pool,
        state.gateway.as_ref(),
        &order.order_id,
        late_valid,
    )
    .await;
    assert!(matches!(result, Err(AppError::Conflict(_))));
}

#[tokio::test]
async fn test_bad_signature_marks_failed() {
    let (_dir, state) = test_state().await;
    let order = create(&state, checkout_request(1, LOCAL_PINCODE, None)).await;

    let callback = PaymentCallback {
        gateway_payment_id: "pay_003".to_string(),
        signature: sign("wrong-secret", order.gateway_order_id.as_deref().unwrap(), "pay_003"),
        amount: order.total_amount,
    };

    let result = payment::confirm_payment(
        &state.pool,
        state.gateway.as_ref(),
        &order.order_id,
        callback,
    )
    .await;
    assert!(matches!(result, Err(AppError::PaymentVerificationFailed(_))));

    let stored = order::find_by_order_id(&state.pool, &order.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.payment_status, PaymentStatus::Failed);
}

#[tokio::test]
async fn test_admin_price_update_flows_into_totals() {
    let (_dir, state) = test_state().await;

    state.price_authority.set_unit_price(300.0).await.unwrap();
    let order = create(&state, checkout_request(1, LOCAL_PINCODE, None)).await;

    assert_eq!(order.items[0].unit_price, 300.0);
    assert_eq!(order.subtotal, 300.0);
    // Existing orders keep their snapshot price
    state.price_authority.set_unit_price(249.0).await.unwrap();
    let stored = order::find_by_order_id(&state.pool, &order.order_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.items[0].unit_price, 300.0);
}
