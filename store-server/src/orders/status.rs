//! Status transition tables
//!
//! Both axes are closed enums with explicit transition rules so illegal
//! states are unrepresentable and illegal moves are caught before SQL.
//! The repository CAS guards remain the last line of defense under
//! concurrency; these tables are the first.

use shared::models::{PaymentStatus, ShipmentStatus};

/// Valid payment transitions: PENDING → PAID | FAILED. Terminal after that.
pub fn payment_can_transition(from: PaymentStatus, to: PaymentStatus) -> bool {
    matches!(
        (from, to),
        (PaymentStatus::Pending, PaymentStatus::Paid)
            | (PaymentStatus::Pending, PaymentStatus::Failed)
    )
}

/// Valid pipeline logistics transitions: strictly forward, one step at a time.
pub fn shipment_can_advance(from: ShipmentStatus, to: ShipmentStatus) -> bool {
    matches!(
        (from, to),
        (ShipmentStatus::Processing, ShipmentStatus::Shipped)
            | (ShipmentStatus::Shipped, ShipmentStatus::Delivered)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use PaymentStatus as P;
    use ShipmentStatus as S;

    #[test]
    fn test_payment_terminal_states() {
        assert!(payment_can_transition(P::Pending, P::Paid));
        assert!(payment_can_transition(P::Pending, P::Failed));
        // Paid must never be reverted
        assert!(!payment_can_transition(P::Paid, P::Pending));
        assert!(!payment_can_transition(P::Paid, P::Failed));
        assert!(!payment_can_transition(P::Failed, P::Paid));
    }

    #[test]
    fn test_shipment_forward_only() {
        assert!(shipment_can_advance(S::Processing, S::Shipped));
        assert!(shipment_can_advance(S::Shipped, S::Delivered));
        // No regression, no skipping
        assert!(!shipment_can_advance(S::Shipped, S::Processing));
        assert!(!shipment_can_advance(S::Delivered, S::Shipped));
        assert!(!shipment_can_advance(S::Processing, S::Delivered));
        assert!(!shipment_can_advance(S::Processing, S::Processing));
    }
}
