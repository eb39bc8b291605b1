//! Parsed receipt models.
//!
//! Field names serialize to the receipts table layout (`shop`, `contents`,
//! `user_id`, ...), so a `ParsedReceipt` can be handed to a table writer
//! as-is.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use super::provenance::{Provenance, ReceiptIdentity};

/// Merchant name used when nothing on the receipt identifies the shop.
pub const UNKNOWN_MERCHANT: &str = "Unknown";

/// A purchased item that survived filtering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedItem {
    /// Trimmed item description.
    #[serde(rename = "item")]
    pub description: String,

    /// Resolved merchant name.
    pub merchant: String,

    /// Line amount. Always strictly positive.
    #[serde(rename = "price")]
    pub amount: Decimal,

    /// First whitespace-delimited token of the description.
    pub first_token: String,
}

impl NormalizedItem {
    /// Build an item from a trimmed description.
    ///
    /// The first token falls back to the merchant when the description is
    /// blank.
    pub fn new(description: impl Into<String>, merchant: impl Into<String>, amount: Decimal) -> Self {
        let description = description.into();
        let merchant = merchant.into();
        let first_token = description
            .split_whitespace()
            .next()
            .map(str::to_string)
            .unwrap_or_else(|| merchant.clone());

        Self {
            description,
            merchant,
            amount,
            first_token,
        }
    }
}

/// A normalized receipt, ready for persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedReceipt {
    /// Opaque identifier assigned by the caller.
    pub id: String,

    /// Canonical merchant name, never empty.
    #[serde(rename = "shop")]
    pub merchant: String,

    /// Purchased items in receipt order.
    #[serde(rename = "contents")]
    pub items: Vec<NormalizedItem>,

    /// Provenance token (storage key basename or file name).
    pub source: String,

    /// Transaction time exactly as printed on the receipt.
    pub receipt_time: Option<String>,

    /// Owner of the receipt.
    #[serde(rename = "user_id")]
    pub owner_id: String,

    /// When the source image was uploaded.
    pub upload_time: DateTime<Utc>,
}

impl ParsedReceipt {
    /// Sum of all item amounts.
    pub fn total(&self) -> Decimal {
        self.items.iter().map(|i| i.amount).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
