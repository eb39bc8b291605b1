//! Final receipt assembly.

use crate::models::receipt::{
    NormalizedItem, ParsedReceipt, Provenance, ReceiptIdentity, UNKNOWN_MERCHANT,
};

/// Build a [`ParsedReceipt`] from normalized parts.
///
/// `receipt_time` is passed through untouched; nothing here parses dates.
pub fn assemble(
    merchant: impl Into<String>,
    items: Vec<NormalizedItem>,
    receipt_time: Option<String>,
    provenance: Provenance,
    identity: ReceiptIdentity,
) -> ParsedReceipt {
    let mut merchant = merchant.into();
    if merchant.trim().is_empty() {
        merchant = UNKNOWN_MERCHANT.to_string();
    }

    ParsedReceipt {
        id: identity.id,
        merchant,
        items,
        source: provenance.source,
        receipt_time,
        owner_id: provenance.owner_id,
        upload_time: provenance.upload_time,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;

    #[test]
    fn test_assemble_copies_inputs() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let items = vec![NormalizedItem::new("Tea", "Aldi", Decimal::new(149, 2))];
        let receipt = assemble(
            "Aldi",
            items.clone(),
            Some("01/05/2024 08:59".to_string()),
            Provenance::new("img.jpg", "bob", at),
            ReceiptIdentity::new("abc"),
        );

        assert_eq!(
            receipt,
            ParsedReceipt {
                id: "abc".to_string(),
                merchant: "Aldi".to_string(),
                items,
                source: "img.jpg".to_string(),
                receipt_time: Some("01/05/2024 08:59".to_string()),
                owner_id: "bob".to_string(),
                upload_time: at,
            }
        );
    }

    #[test]
    fn test_blank_merchant_becomes_unknown() {
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap();
        let receipt = assemble(
            " ",
            Vec::new(),
            None,
            Provenance::new("img.jpg", "bob", at),
            ReceiptIdentity::new("abc"),
        );
        assert_eq!(receipt.merchant, UNKNOWN_MERCHANT);
        assert_eq!(receipt.receipt_time, None);
    }
}
