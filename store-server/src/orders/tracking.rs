//! Tracking Reconciler
//!
//! Read side: [`tracking_timeline`] projects raw carrier scans into the
//! normalized customer-facing sequence. Always fetched fresh — carrier state
//! changes independently of this system.
//!
//! Write side: [`DeliveryReconciler`] periodically sweeps SHIPPED orders and
//! advances them to DELIVERED (forward-only CAS) once the carrier reports a
//! delivered scan.

use std::sync::Arc;
use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;

use shared::models::TrackingEvent;

use crate::courier::CourierClient;
use crate::db::repository::order;
use crate::utils::{AppError, AppResult};

/// Normalized scan timeline for an order, oldest scan first.
///
/// No waybill yet, or a carrier with no events (or a carrier read failure —
/// the storefront tracking page must not 500 because the carrier hiccuped):
/// empty sequence, never an error.
pub async fn tracking_timeline(
    pool: &SqlitePool,
    courier: &dyn CourierClient,
    order_id: &str,
) -> AppResult<Vec<TrackingEvent>> {
    let order = order::find_by_order_id(pool, order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {order_id} not found")))?;

    let Some(awb) = order.tracking_id.as_deref() else {
        return Ok(Vec::new());
    };

    let scans = match courier.track(awb).await {
        Ok(scans) => scans,
        Err(e) => {
            tracing::warn!(order_id, awb, error = %e, "Carrier tracking fetch failed");
            return Ok(Vec::new());
        }
    };

    let mut events: Vec<TrackingEvent> = scans
        .into_iter()
        .map(|s| TrackingEvent {
            timestamp: s.timestamp,
            location: s.location,
            description: s.description,
        })
        .collect();
    events.sort_by_key(|e| e.timestamp);
    Ok(events)
}

/// Periodic worker reconciling carrier-reported delivery with the ledger.
pub struct DeliveryReconciler {
    pool: SqlitePool,
    courier: Arc<dyn CourierClient>,
    interval: Duration,
}

impl DeliveryReconciler {
    pub fn new(pool: SqlitePool, courier: Arc<dyn CourierClient>, interval: Duration) -> Self {
        Self {
            pool,
            courier,
            interval,
        }
    }

    /// Run until the shutdown token fires.
    pub async fn run(self, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Delivery reconciler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    match self.reconcile_once().await {
                        Ok(0) => {}
                        Ok(n) => tracing::info!(delivered = n, "Delivery reconciliation pass complete"),
                        Err(e) => tracing::warn!(error = %e, "Delivery reconciliation pass failed"),
                    }
                }
            }
        }
    }

    /// One sweep: poll every SHIPPED order's waybill, mark delivered ones.
    ///
    /// Per-order carrier failures are logged and retried next tick; they
    /// never abort the sweep.
    pub async fn reconcile_once(&self) -> AppResult<usize> {
        let shipped = order::find_shipped_with_tracking(&self.pool).await?;
        let mut delivered = 0;

        for o in shipped {
            let Some(awb) = o.tracking_id.as_deref() else {
                continue;
            };
            match self.courier.track(awb).await {
                Ok(scans) if scans.iter().any(|s| s.is_delivered()) => {
                    if order::mark_delivered(&self.pool, &o.order_id).await? {
                        tracing::info!(order_id = %o.order_id, awb, "Order delivered per carrier scans");
                        delivered += 1;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(order_id = %o.order_id, awb, error = %e, "Carrier poll failed, will retry");
                }
            }
        }
        Ok(delivered)
    }
}
