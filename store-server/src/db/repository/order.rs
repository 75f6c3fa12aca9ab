//! Order Repository
//!
//! The orders table is the single shared mutable resource of the pipeline.
//! State transitions (pay-once, book-once, forward-only delivery) are all
//! guarded UPDATEs checked via `rows_affected()`.

use super::{RepoError, RepoResult, is_unique_violation};
use shared::models::{Order, OrderItem, PaymentStatus, ShipmentStatus};
use sqlx::SqlitePool;

/// SQLite row shape; `items` is a JSON column, statuses are TEXT enums.
#[derive(Debug, Clone, sqlx::FromRow)]
struct OrderRow {
    pub id: i64,
    pub order_id: String,
    pub invoice_id: String,
    pub client_token: Option<String>,
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    pub city: Option<String>,
    pub pincode: String,
    pub items: String,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
    pub payment_status: String,
    pub status: String,
    pub gateway_order_id: Option<String>,
    pub gateway_payment_id: Option<String>,
    pub tracking_id: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepoError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let items: Vec<OrderItem> = serde_json::from_str(&row.items).map_err(|e| {
            RepoError::Database(format!("Corrupt items JSON for {}: {e}", row.order_id))
        })?;
        let payment_status = PaymentStatus::parse(&row.payment_status).ok_or_else(|| {
            RepoError::Database(format!(
                "Unknown payment_status {:?} for {}",
                row.payment_status, row.order_id
            ))
        })?;
        let status = ShipmentStatus::parse(&row.status).ok_or_else(|| {
            RepoError::Database(format!(
                "Unknown status {:?} for {}",
                row.status, row.order_id
            ))
        })?;

        Ok(Order {
            id: Some(row.id),
            order_id: row.order_id,
            invoice_id: row.invoice_id,
            client_token: row.client_token,
            customer_name: row.customer_name,
            phone_number: row.phone_number,
            address: row.address,
            city: row.city,
            pincode: row.pincode,
            items,
            subtotal: row.subtotal,
            shipping_cost: row.shipping_cost,
            total_amount: row.total_amount,
            payment_status,
            status,
            gateway_order_id: row.gateway_order_id,
            gateway_payment_id: row.gateway_payment_id,
            tracking_id: row.tracking_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Insert payload — totals and identifiers are computed by the checkout
/// pipeline before this ever touches the database.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub order_id: String,
    pub invoice_id: String,
    pub client_token: Option<String>,
    pub customer_name: String,
    pub phone_number: String,
    pub address: String,
    pub city: Option<String>,
    pub pincode: String,
    pub items: Vec<OrderItem>,
    pub subtotal: f64,
    pub shipping_cost: f64,
    pub total_amount: f64,
    pub gateway_order_id: Option<String>,
}

const SELECT_COLUMNS: &str = "SELECT id, order_id, invoice_id, client_token, customer_name, phone_number, address, city, pincode, items, subtotal, shipping_cost, total_amount, payment_status, status, gateway_order_id, gateway_payment_id, tracking_id, created_at, updated_at FROM orders";

pub async fn find_by_order_id(pool: &SqlitePool, order_id: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_COLUMNS} WHERE order_id = ?"))
        .bind(order_id)
        .fetch_optional(pool)
        .await?;
    row.map(Order::try_from).transpose()
}

pub async fn find_by_client_token(pool: &SqlitePool, token: &str) -> RepoResult<Option<Order>> {
    let row = sqlx::query_as::<_, OrderRow>(&format!("{SELECT_COLUMNS} WHERE client_token = ?"))
        .bind(token)
        .fetch_optional(pool)
        .await?;
    row.map(Order::try_from).transpose()
}

/// Admin list, newest first
pub async fn find_all(pool: &SqlitePool, limit: i32, offset: i32) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT_COLUMNS} ORDER BY created_at DESC LIMIT ? OFFSET ?"
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Shipped-but-not-delivered orders with a waybill, for the delivery reconciler
pub async fn find_shipped_with_tracking(pool: &SqlitePool) -> RepoResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, OrderRow>(&format!(
        "{SELECT_COLUMNS} WHERE status = 'SHIPPED' AND tracking_id IS NOT NULL"
    ))
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(Order::try_from).collect()
}

/// Insert a new order with PENDING/PROCESSING state and no waybill.
///
/// Identity collisions surface as `RepoError::Duplicate` naming the column
/// (`order_id`, `invoice_id`, or `client_token`) so the checkout pipeline can
/// decide between regeneration and idempotent replay.
pub async fn create(pool: &SqlitePool, data: &NewOrder) -> RepoResult<Order> {
    let items_json = serde_json::to_string(&data.items)
        .map_err(|e| RepoError::Validation(format!("Failed to serialize items: {e}")))?;
    let now = shared::util::now_millis();

    let result = sqlx::query(
        "INSERT INTO orders (order_id, invoice_id, client_token, customer_name, phone_number, address, city, pincode, items, subtotal, shipping_cost, total_amount, payment_status, status, gateway_order_id, gateway_payment_id, tracking_id, created_at, updated_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 'PENDING', 'PROCESSING', ?13, NULL, NULL, ?14, ?14)",
    )
    .bind(&data.order_id)
    .bind(&data.invoice_id)
    .bind(&data.client_token)
    .bind(&data.customer_name)
    .bind(&data.phone_number)
    .bind(&data.address)
    .bind(&data.city)
    .bind(&data.pincode)
    .bind(&items_json)
    .bind(data.subtotal)
    .bind(data.shipping_cost)
    .bind(data.total_amount)
    .bind(&data.gateway_order_id)
    .bind(now)
    .execute(pool)
    .await;

    if let Err(e) = result {
        for column in ["client_token", "order_id", "invoice_id"] {
            if is_unique_violation(&e, column) {
                return Err(RepoError::Duplicate(column.to_string()));
            }
        }
        return Err(e.into());
    }

    find_by_order_id(pool, &data.order_id)
        .await?
        .ok_or_else(|| RepoError::Database(format!("Order {} not found after insert", data.order_id)))
}

/// PENDING → PAID, exactly once. Returns false when the row was not PENDING
/// (already decided) — the caller re-reads to distinguish replay from error.
pub async fn mark_paid(
    pool: &SqlitePool,
    order_id: &str,
    gateway_payment_id: &str,
) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'PAID', gateway_payment_id = ?1, updated_at = ?2 WHERE order_id = ?3 AND payment_status = 'PENDING'",
    )
    .bind(gateway_payment_id)
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// PENDING → FAILED. The row is kept for audit; never deleted.
pub async fn mark_payment_failed(pool: &SqlitePool, order_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET payment_status = 'FAILED', updated_at = ?1 WHERE order_id = ?2 AND payment_status = 'PENDING'",
    )
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Attach the waybill and advance PROCESSING → SHIPPED in one statement.
///
/// The `tracking_id IS NULL AND payment_status = 'PAID'` guard is the final
/// authority against double booking; a false return after a successful
/// carrier call means another dispatch won the race.
pub async fn set_shipped(pool: &SqlitePool, order_id: &str, tracking_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET tracking_id = ?1, status = 'SHIPPED', updated_at = ?2 WHERE order_id = ?3 AND tracking_id IS NULL AND payment_status = 'PAID'",
    )
    .bind(tracking_id)
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// SHIPPED → DELIVERED, forward-only (reconciler and carrier signals).
pub async fn mark_delivered(pool: &SqlitePool, order_id: &str) -> RepoResult<bool> {
    let now = shared::util::now_millis();
    let rows = sqlx::query(
        "UPDATE orders SET status = 'DELIVERED', updated_at = ?1 WHERE order_id = ?2 AND status = 'SHIPPED'",
    )
    .bind(now)
    .bind(order_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Unconditional logistics-status write. Admin override only — every caller
/// must emit an audit event; the pipeline itself never uses this.
pub async fn override_status(
    pool: &SqlitePool,
    order_id: &str,
    status: ShipmentStatus,
) -> RepoResult<Order> {
    let now = shared::util::now_millis();
    let rows = sqlx::query("UPDATE orders SET status = ?1, updated_at = ?2 WHERE order_id = ?3")
        .bind(status.as_str())
        .bind(now)
        .bind(order_id)
        .execute(pool)
        .await?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("Order {order_id} not found")));
    }
    find_by_order_id(pool, order_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Order {order_id} not found")))
}
