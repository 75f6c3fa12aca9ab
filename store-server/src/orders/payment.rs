//! Payment Reconciliation
//!
//! Validates a gateway callback and flips `payment_status` to PAID exactly
//! once. Replayed callbacks on an already-paid order are a successful no-op
//! (gateways redeliver); verification failures mark the order FAILED and
//! keep the row for support.

use sqlx::SqlitePool;

use shared::models::{Order, PaymentCallback, PaymentStatus};

use crate::db::repository::order;
use crate::orders::money::money_eq;
use crate::orders::status::payment_can_transition;
use crate::payments::PaymentGateway;
use crate::utils::{AppError, AppResult};

/// Confirm a payment reported by the gateway callback.
pub async fn confirm_payment(
    pool: &SqlitePool,
    gateway: &dyn PaymentGateway,
    order_id: &str,
    callback: PaymentCallback,
) -> AppResult<Order> {
    let order = order::find_by_order_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    if !payment_can_transition(order.payment_status, PaymentStatus::Paid) {
        return match order.payment_status {
            // Idempotent callback redelivery
            PaymentStatus::Paid => Ok(order),
            _ => Err(AppError::conflict(format!(
                "Order {order_id} payment already {}",
                order.payment_status.as_str()
            ))),
        };
    }

    let Some(gateway_order_id) = order.gateway_order_id.as_deref() else {
        // No intent on record — nothing to verify against
        order::mark_payment_failed(pool, order_id).await?;
        return Err(AppError::PaymentVerificationFailed(format!(
            "Order {order_id} has no gateway intent"
        )));
    };

    // The callback must match our computed total, not the other way around
    if !money_eq(callback.amount, order.total_amount) {
        tracing::warn!(
            order_id,
            expected = order.total_amount,
            reported = callback.amount,
            "Payment callback amount mismatch"
        );
        order::mark_payment_failed(pool, order_id).await?;
        return Err(AppError::PaymentVerificationFailed(format!(
            "Amount mismatch for order {order_id}"
        )));
    }

    if !gateway.verify_signature(
        gateway_order_id,
        &callback.gateway_payment_id,
        &callback.signature,
    ) {
        tracing::warn!(order_id, "Payment callback signature rejected");
        order::mark_payment_failed(pool, order_id).await?;
        return Err(AppError::PaymentVerificationFailed(format!(
            "Invalid signature for order {order_id}"
        )));
    }

    let flipped = order::mark_paid(pool, order_id, &callback.gateway_payment_id).await?;
    if !flipped {
        // Lost a race with a concurrent callback; the row is already decided
        let current = order::find_by_order_id(pool, order_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;
        return match current.payment_status {
            PaymentStatus::Paid => Ok(current),
            _ => Err(AppError::conflict(format!(
                "Order {order_id} payment already {}",
                current.payment_status.as_str()
            ))),
        };
    }

    tracing::info!(order_id, payment_id = %callback.gateway_payment_id, "Payment confirmed");
    order::find_by_order_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))
}
