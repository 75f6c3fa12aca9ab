//! Shipment Dispatcher
//!
//! Books a paid order with the carrier and attaches the waybill. The
//! book-once guarantee is enforced twice: a per-order mutex serializes
//! concurrent dispatches (so at most one carrier call is in flight per
//! order), and the repository CAS (`tracking_id IS NULL AND payment_status =
//! 'PAID'`) is the final authority. Distinct orders share nothing and
//! dispatch in parallel.

use std::sync::Arc;

use dashmap::DashMap;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use shared::models::{PaymentStatus, ShipmentStatus};

use crate::courier::{CourierClient, PaymentMode, ShipmentRequest};
use crate::db::repository::order;
use crate::orders::money::{to_decimal, to_f64};
use crate::orders::status::shipment_can_advance;
use crate::pricing::UNIT_WEIGHT_KG;
use crate::utils::{AppError, AppResult};

pub struct ShipmentDispatcher {
    pool: SqlitePool,
    courier: Arc<dyn CourierClient>,
    /// Per-order dispatch locks; entries are cheap and bounded by the number
    /// of orders dispatched in this process lifetime
    locks: DashMap<String, Arc<Mutex<()>>>,
}

impl std::fmt::Debug for ShipmentDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShipmentDispatcher")
            .field("locks", &self.locks.len())
            .finish()
    }
}

impl ShipmentDispatcher {
    pub fn new(pool: SqlitePool, courier: Arc<dyn CourierClient>) -> Self {
        Self {
            pool,
            courier,
            locks: DashMap::new(),
        }
    }

    /// Book the order's shipment. Preconditions: PAID and not yet booked.
    ///
    /// Carrier rejection or timeout leaves the order untouched and returns
    /// `BookingFailed` — the call is safely retryable.
    pub async fn dispatch(&self, order_id: &str) -> AppResult<String> {
        let lock = self
            .locks
            .entry(order_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _guard = lock.lock().await;

        // Consistent read under the lock; the CAS below re-checks in SQL
        let order = order::find_by_order_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        if order.tracking_id.is_some() {
            return Err(AppError::conflict(format!(
                "Order {order_id} already has a shipment booked"
            )));
        }
        if order.payment_status != PaymentStatus::Paid {
            return Err(AppError::conflict(format!(
                "Order {order_id} is not paid (payment_status={})",
                order.payment_status.as_str()
            )));
        }
        if !shipment_can_advance(order.status, ShipmentStatus::Shipped) {
            return Err(AppError::conflict(format!(
                "Order {order_id} cannot move from {} to SHIPPED",
                order.status.as_str()
            )));
        }

        // Weight from the order's snapshot quantities, not fresh input
        let total_qty: i64 = order.items.iter().map(|i| i64::from(i.quantity)).sum();
        let weight_kg = to_f64(Decimal::from(total_qty) * to_decimal(UNIT_WEIGHT_KG));

        let request = ShipmentRequest {
            order_id: order.order_id.clone(),
            customer_name: order.customer_name.clone(),
            address: order.address.clone(),
            pincode: order.pincode.clone(),
            phone_number: order.phone_number.clone(),
            weight_kg,
            payment_mode: PaymentMode::Prepaid,
            cod_amount: 0.0,
        };

        let awb = self
            .courier
            .book(&request)
            .await
            .map_err(|e| AppError::BookingFailed(e.to_string()))?;

        let updated = order::set_shipped(&self.pool, order_id, &awb).await?;
        if !updated {
            // The per-order lock makes this unreachable from this code path;
            // if it fires, something else wrote tracking_id concurrently
            tracing::error!(
                order_id,
                awb = %awb,
                "Carrier booking succeeded but shipped CAS found the order already booked"
            );
            return Err(AppError::conflict(format!(
                "Order {order_id} already has a shipment booked"
            )));
        }

        tracing::info!(order_id, awb = %awb, "Shipment booked and order marked SHIPPED");
        Ok(awb)
    }

    /// Packing-slip link for the admin dispatch console.
    pub async fn label_url(&self, order_id: &str) -> AppResult<Option<String>> {
        let order = order::find_by_order_id(&self.pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

        let Some(awb) = order.tracking_id.as_deref() else {
            return Ok(None);
        };
        self.courier
            .label_url(awb)
            .await
            .map_err(|e| AppError::internal(e.to_string()))
    }
}
