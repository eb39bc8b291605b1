//! Receipt parser wiring the normalization stages together.

use tracing::{debug, info};

use crate::models::config::{FieldLabels, ReceiptConfig};
use crate::models::expense::ExpenseDocument;
use crate::models::receipt::{NormalizedItem, ParsedReceipt, Provenance, ReceiptIdentity};

use super::assembler::assemble;
use super::fields::DocumentView;
use super::rules::{
    LineItemNormalizer, LineOutcome, MerchantCatalog, MerchantResolver, MerchantSource,
    NoiseFilter,
};
use super::ReceiptExtractor;

/// Result of normalizing one document, before identity is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionResult {
    /// Resolved merchant name.
    pub merchant: String,
    /// Which rule produced the merchant.
    pub merchant_source: MerchantSource,
    /// Raw transaction time, if the document has one.
    pub receipt_time: Option<String>,
    /// Items that survived filtering.
    pub items: Vec<NormalizedItem>,
    /// Diagnostics: dropped lines and fallbacks.
    pub warnings: Vec<String>,
}

impl ExtractionResult {
    /// Attach caller-supplied provenance and identity.
    pub fn into_receipt(self, provenance: Provenance, identity: ReceiptIdentity) -> ParsedReceipt {
        assemble(
            self.merchant,
            self.items,
            self.receipt_time,
            provenance,
            identity,
        )
    }
}

/// Rule-based receipt parser.
///
/// Holds only configuration, so one parser can be shared across threads.
#[derive(Debug, Clone, Default)]
pub struct ReceiptParser {
    catalog: MerchantCatalog,
    noise: NoiseFilter,
    labels: FieldLabels,
}

impl ReceiptParser {
    /// Create a parser with the built-in catalog, denylist and labels.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &ReceiptConfig) -> Self {
        Self {
            catalog: config.catalog.clone(),
            noise: config.noise.clone(),
            labels: config.labels.clone(),
        }
    }

    /// Set the merchant catalog.
    pub fn with_catalog(mut self, catalog: MerchantCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    /// Set the noise denylist.
    pub fn with_noise_filter(mut self, noise: NoiseFilter) -> Self {
        self.noise = noise;
        self
    }

    /// Set the detection labels.
    pub fn with_labels(mut self, labels: FieldLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn catalog(&self) -> &MerchantCatalog {
        &self.catalog
    }

    /// Normalize a document without touching identity or time.
    pub fn parse(&self, document: &ExpenseDocument) -> ExtractionResult {
        let view = DocumentView::new(document);
        let mut warnings = Vec::new();

        let merchant = MerchantResolver::new(&self.catalog, &self.labels.vendor_name).resolve(&view);
        match merchant.source {
            MerchantSource::Catalog => {}
            MerchantSource::VendorName => warnings.push(format!(
                "Merchant not in catalog, using {} {:?}",
                self.labels.vendor_name, merchant.name
            )),
            MerchantSource::Unknown => warnings.push("Could not determine merchant".to_string()),
        }

        let receipt_time = view
            .first_summary_of(self.labels.receipt_time.as_slice())
            .map(str::to_string);
        if receipt_time.is_none() {
            warnings.push("Could not find receipt time".to_string());
        }

        let normalizer = LineItemNormalizer::new(&self.noise, &self.labels);
        let mut items = Vec::new();
        let mut candidates = 0usize;

        for (index, line) in view.candidate_lines().enumerate() {
            candidates += 1;
            match normalizer.classify(line, &merchant.name) {
                LineOutcome::Keep(item) => items.push(item),
                LineOutcome::Discard(reason) => {
                    debug!("Dropped line {}: {}", index + 1, reason);
                    warnings.push(format!("Line {} dropped: {}", index + 1, reason));
                }
            }
        }

        info!(
            "Parsed receipt from {}: kept {} of {} lines",
            merchant.name,
            items.len(),
            candidates
        );

        ExtractionResult {
            merchant: merchant.name,
            merchant_source: merchant.source,
            receipt_time,
            items,
            warnings,
        }
    }
}

impl ReceiptExtractor for ReceiptParser {
    fn extract(
        &self,
        document: &ExpenseDocument,
        provenance: Provenance,
        identity: ReceiptIdentity,
    ) -> ParsedReceipt {
        self.parse(document).into_receipt(provenance, identity)
    }
}
