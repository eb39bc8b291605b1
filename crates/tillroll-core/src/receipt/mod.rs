//! Receipt normalization pipeline.

mod assembler;
pub mod fields;
mod parser;
pub mod rules;

pub use assembler::assemble;
pub use fields::DocumentView;
pub use parser::{ExtractionResult, ReceiptParser};

use crate::error::Result;
use crate::models::expense::{AnalyzeExpenseResponse, ExpenseDocument};
use crate::models::receipt::{ParsedReceipt, Provenance, ReceiptIdentity};

/// Trait for turning expense documents into parsed receipts.
pub trait ReceiptExtractor {
    /// Normalize one expense document.
    ///
    /// Sparse or noisy documents degrade to an unknown merchant, no receipt
    /// time and an empty item list; this never fails.
    fn extract(
        &self,
        document: &ExpenseDocument,
        provenance: Provenance,
        identity: ReceiptIdentity,
    ) -> ParsedReceipt;

    /// Normalize the first document of a service response.
    fn extract_response(
        &self,
        response: &AnalyzeExpenseResponse,
        provenance: Provenance,
        identity: ReceiptIdentity,
    ) -> Result<ParsedReceipt> {
        let document = response.first_document()?;
        Ok(self.extract(document, provenance, identity))
    }
}
