//! Core library for receipt normalization.
//!
//! This crate provides:
//! - Expense document models matching the AnalyzeExpense response shape
//! - A four-stage pipeline: field extraction, merchant resolution,
//!   line item filtering and receipt assembly
//! - Receipt configuration (merchant catalog, noise denylist, field labels)
//! - Provenance helpers for storage keys and generated identities

pub mod error;
pub mod models;
pub mod receipt;

pub use error::{DocumentError, Result, TillrollError};
pub use models::config::ReceiptConfig;
pub use models::expense::{AnalyzeExpenseResponse, ExpenseDocument, ExpenseField, LineItem, LineItemGroup};
pub use models::receipt::{NormalizedItem, ParsedReceipt, Provenance, ReceiptIdentity};
pub use receipt::{ExtractionResult, ReceiptExtractor, ReceiptParser};
