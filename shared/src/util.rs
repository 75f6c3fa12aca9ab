/// 获取当前 UTC 时间戳（毫秒）
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generate a customer-facing order reference: "ORD-" + 6 random digits.
///
/// The space is small on purpose (short enough to read over the phone);
/// callers must collision-check against the ledger and regenerate on a hit.
pub fn order_ref() -> String {
    use rand::Rng;
    format!("ORD-{:06}", rand::thread_rng().gen_range(0..1_000_000))
}

/// Generate a billing document reference: "INV-" + 8 random digits.
///
/// Same collision-check contract as [`order_ref`].
pub fn invoice_ref() -> String {
    use rand::Rng;
    format!("INV-{:08}", rand::thread_rng().gen_range(0..100_000_000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_ref_format() {
        let r = order_ref();
        assert!(r.starts_with("ORD-"));
        assert_eq!(r.len(), 10);
        assert!(r[4..].chars().all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_invoice_ref_format() {
        let r = invoice_ref();
        assert!(r.starts_with("INV-"));
        assert_eq!(r.len(), 12);
        assert!(r[4..].chars().all(|c| c.is_ascii_digit()));
    }
}
