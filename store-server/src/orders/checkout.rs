//! Order creation protocol
//!
//! Turns a client-supplied cart into a priced, persisted PENDING order:
//!
//! 1. resolve the authoritative unit price (client prices discarded)
//! 2. compute line totals and subtotal
//! 3. derive shipment weight from the catalog and quote shipping —
//!    a non-serviceable destination aborts before anything is written
//! 4. total = subtotal + shipping
//! 5. register a gateway payment intent for the authoritative total
//! 6. insert with collision-checked identifiers
//!
//! Retried submissions carrying the same `client_token` return the already
//! created order instead of inserting a duplicate.

use rust_decimal::Decimal;
use sqlx::SqlitePool;

use shared::models::{CheckoutRequest, Order, OrderItem};

use crate::db::repository::{RepoError, order};
use crate::orders::money::{self, to_decimal, to_f64};
use crate::payments::PaymentGateway;
use crate::pricing::{PRODUCT_NAME, PriceAuthority, UNIT_WEIGHT_KG};
use crate::shipping;
use crate::utils::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_QUANTITY, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_phone, validate_required_text,
};
use crate::utils::{AppError, AppResult};

/// Identity collisions are regenerated, not surfaced; this bounds the loop.
const MAX_ID_ATTEMPTS: usize = 8;

fn validate_request(request: &CheckoutRequest) -> AppResult<()> {
    validate_required_text(&request.customer_name, "customer_name", MAX_NAME_LEN)?;
    validate_required_text(&request.address, "address", MAX_ADDRESS_LEN)?;
    validate_optional_text(&request.city, "city", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&request.client_token, "client_token", MAX_SHORT_TEXT_LEN)?;
    validate_phone(&request.phone_number)?;

    if request.items.is_empty() {
        return Err(AppError::validation("Cart must contain at least one item"));
    }
    for line in &request.items {
        if line.quantity <= 0 {
            return Err(AppError::validation(format!(
                "quantity must be positive, got {}",
                line.quantity
            )));
        }
        if line.quantity > MAX_QUANTITY {
            return Err(AppError::validation(format!(
                "quantity exceeds maximum allowed ({MAX_QUANTITY}), got {}",
                line.quantity
            )));
        }
    }
    Ok(())
}

/// Create an order from a checkout submission.
///
/// Totals are derived exclusively from server state; the `name`/`price`
/// fields on incoming cart lines are never read.
pub async fn create_order(
    pool: &SqlitePool,
    price_authority: &PriceAuthority,
    gateway: &dyn PaymentGateway,
    request: CheckoutRequest,
) -> AppResult<Order> {
    validate_request(&request)?;

    // Idempotent replay: same token → same order, no new insert
    if let Some(token) = &request.client_token {
        if let Some(existing) = order::find_by_client_token(pool, token).await? {
            tracing::info!(
                order_id = %existing.order_id,
                "Checkout retry with known client_token, returning existing order"
            );
            return Ok(existing);
        }
    }

    let unit_price = price_authority.resolve_unit_price().await?;

    let mut items = Vec::with_capacity(request.items.len());
    let mut total_qty: i64 = 0;
    for line in &request.items {
        items.push(OrderItem {
            name: PRODUCT_NAME.to_string(),
            unit_price,
            quantity: line.quantity,
            line_total: money::line_total(unit_price, line.quantity),
        });
        total_qty += i64::from(line.quantity);
    }
    let subtotal = money::subtotal(items.iter().map(|i| i.line_total));

    // Weight is a catalog property: qty × unit weight, exact in decimal
    let total_weight_kg = to_f64(Decimal::from(total_qty) * to_decimal(UNIT_WEIGHT_KG));
    let quote = shipping::quote(&request.pincode, total_weight_kg)?;

    let total_amount = money::grand_total(subtotal, quote.cost);

    // The intent carries the authoritative amount; the callback signature is
    // later checked against this intent's id
    let receipt = format!("rcpt_{}", shared::util::now_millis());
    let intent = gateway.create_intent(total_amount, &receipt).await?;

    for attempt in 1..=MAX_ID_ATTEMPTS {
        let new_order = order::NewOrder {
            order_id: shared::util::order_ref(),
            invoice_id: shared::util::invoice_ref(),
            client_token: request.client_token.clone(),
            customer_name: request.customer_name.clone(),
            phone_number: request.phone_number.clone(),
            address: request.address.clone(),
            city: request.city.clone(),
            pincode: request.pincode.clone(),
            items: items.clone(),
            subtotal,
            shipping_cost: quote.cost,
            total_amount,
            gateway_order_id: Some(intent.gateway_order_id.clone()),
        };

        match order::create(pool, &new_order).await {
            Ok(created) => {
                tracing::info!(
                    order_id = %created.order_id,
                    invoice_id = %created.invoice_id,
                    total_amount,
                    "Order created"
                );
                return Ok(created);
            }
            // Two retries raced past the pre-insert lookup; the UNIQUE
            // constraint picked a winner — return it
            Err(RepoError::Duplicate(column)) if column == "client_token" => {
                let token = request.client_token.as_deref().unwrap_or_default();
                return order::find_by_client_token(pool, token)
                    .await?
                    .ok_or_else(|| {
                        AppError::database("client_token winner vanished after conflict")
                    });
            }
            // order_id / invoice_id collision: regenerate and retry
            Err(RepoError::Duplicate(column)) => {
                tracing::debug!(attempt, column = %column, "Identifier collision, regenerating");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::internal(format!(
        "Failed to generate unique order identifiers after {MAX_ID_ATTEMPTS} attempts"
    )))
}
