//! Line item filtering and normalization.

use std::fmt;

use rust_decimal::Decimal;
use tracing::debug;

use crate::models::config::FieldLabels;
use crate::models::expense::LineItem;
use crate::models::receipt::NormalizedItem;

use super::amounts::{parse_amount, ParsedAmount};
use super::noise::NoiseFilter;

/// Why a candidate line was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DiscardReason {
    /// No item description field.
    MissingName,
    /// No price or total field.
    MissingAmount { name: String },
    /// Amount was zero, negative or did not parse.
    NonPositive { name: String, raw_amount: String, parsed: ParsedAmount },
    /// Description contains a denylisted phrase.
    Noise { name: String, phrase: String },
}

impl fmt::Display for DiscardReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscardReason::MissingName => write!(f, "no item description"),
            DiscardReason::MissingAmount { name } => write!(f, "{:?} has no amount", name),
            DiscardReason::NonPositive {
                name,
                raw_amount,
                parsed: ParsedAmount::Unparsable,
            } => write!(f, "{:?} has unparsable amount {:?}", name, raw_amount),
            DiscardReason::NonPositive {
                name,
                parsed: ParsedAmount::Value(v),
                ..
            } => write!(f, "{:?} has non-positive amount {}", name, v),
            DiscardReason::Noise { name, phrase } => {
                write!(f, "{:?} matches noise phrase {:?}", name, phrase)
            }
        }
    }
}

/// Outcome of classifying one candidate line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Keep(NormalizedItem),
    Discard(DiscardReason),
}

/// Turns candidate lines into priced items.
pub struct LineItemNormalizer<'a> {
    noise: &'a NoiseFilter,
    labels: &'a FieldLabels,
}

impl<'a> LineItemNormalizer<'a> {
    pub fn new(noise: &'a NoiseFilter, labels: &'a FieldLabels) -> Self {
        Self { noise, labels }
    }

    /// Keep the genuine items of `lines`, in order.
    ///
    /// Identical rows stay separate items.
    pub fn normalize<'l>(
        &self,
        lines: impl IntoIterator<Item = &'l LineItem>,
        merchant: &str,
    ) -> Vec<NormalizedItem> {
        lines
            .into_iter()
            .filter_map(|line| match self.classify(line, merchant) {
                LineOutcome::Keep(item) => Some(item),
                LineOutcome::Discard(_) => None,
            })
            .collect()
    }

    /// Decide whether a single line is a genuine item.
    pub fn classify(&self, line: &LineItem, merchant: &str) -> LineOutcome {
        let Some(raw_name) = line.first_value(std::slice::from_ref(&self.labels.item_name)) else {
            return LineOutcome::Discard(DiscardReason::MissingName);
        };
        let name = raw_name.trim();

        let Some(raw_amount) = line.first_value(self.labels.item_amount.as_slice()) else {
            return LineOutcome::Discard(DiscardReason::MissingAmount {
                name: name.to_string(),
            });
        };

        let parsed = parse_amount(raw_amount);
        let amount = parsed.or_zero();
        if amount <= Decimal::ZERO {
            if parsed == ParsedAmount::Unparsable {
                debug!("Amount {:?} for {:?} is unparsable, counted as zero", raw_amount, name);
            }
            return LineOutcome::Discard(DiscardReason::NonPositive {
                name: name.to_string(),
                raw_amount: raw_amount.to_string(),
                parsed,
            });
        }

        if let Some(phrase) = self.noise.matching_phrase(name) {
            return LineOutcome::Discard(DiscardReason::Noise {
                name: name.to_string(),
                phrase: phrase.to_string(),
            });
        }

        LineOutcome::Keep(NormalizedItem::new(name, merchant, amount))
    }
}
