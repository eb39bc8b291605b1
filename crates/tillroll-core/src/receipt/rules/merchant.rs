//! Merchant resolution: curated chain catalog first, OCR vendor name second.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::receipt::UNKNOWN_MERCHANT;
use crate::receipt::fields::DocumentView;

/// A `pattern -> canonical name` catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Substring searched for, case-insensitively.
    pub pattern: String,
    /// Display name returned on a match.
    pub name: String,
}

impl CatalogEntry {
    pub fn new(pattern: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into().to_lowercase(),
            name: name.into(),
        }
    }
}

/// Ordered lookup table of known retailers.
///
/// Entries are scanned in declaration order and the first pattern found in
/// the text wins, so overlapping patterns resolve the same way every time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MerchantCatalog {
    entries: Vec<CatalogEntry>,
}

impl MerchantCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// An empty catalog; every receipt falls through to the vendor name.
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self::new(
            pairs
                .into_iter()
                .map(|(pattern, name)| CatalogEntry::new(pattern, name))
                .collect(),
        )
    }

    /// Common UK grocery and high-street chains.
    pub fn uk_grocers() -> Self {
        Self::from_pairs([
            ("tesco", "Tesco"),
            ("sainsbury", "Sainsbury's"),
            ("asda", "Asda"),
            ("morrisons", "Morrisons"),
            ("waitrose", "Waitrose"),
            ("aldi", "Aldi"),
            ("lidl", "Lidl"),
            ("co-op", "Co-op"),
            ("co op", "Co-op"),
            ("coop", "Co-op"),
            ("marks & spencer", "M&S"),
            ("marks and spencer", "M&S"),
            ("m&s", "M&S"),
            ("iceland", "Iceland"),
            ("spar", "Spar"),
            ("one stop", "One Stop"),
            ("boots", "Boots"),
            ("superdrug", "Superdrug"),
            ("costco", "Costco"),
        ])
    }

    /// Append an entry after all existing ones.
    pub fn push(&mut self, pattern: impl Into<String>, name: impl Into<String>) {
        self.entries.push(CatalogEntry::new(pattern, name));
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose pattern occurs in `text`, ignoring case.
    pub fn lookup(&self, text: &str) -> Option<&CatalogEntry> {
        let haystack = text.to_lowercase();
        self.entries
            .iter()
            .filter(|e| !e.pattern.is_empty())
            .find(|e| haystack.contains(&e.pattern.to_lowercase()))
    }
}

impl Default for MerchantCatalog {
    fn default() -> Self {
        Self::uk_grocers()
    }
}

/// Which rule produced the merchant name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MerchantSource {
    /// Matched a catalog pattern in the summary text.
    Catalog,
    /// Taken verbatim from the vendor name field.
    VendorName,
    /// Nothing matched.
    Unknown,
}

/// A resolved merchant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Merchant {
    pub name: String,
    pub source: MerchantSource,
}

impl Merchant {
    pub fn unknown() -> Self {
        Self {
            name: UNKNOWN_MERCHANT.to_string(),
            source: MerchantSource::Unknown,
        }
    }
}

/// Resolves the merchant for a document view.
pub struct MerchantResolver<'a> {
    catalog: &'a MerchantCatalog,
    vendor_label: &'a str,
}

impl<'a> MerchantResolver<'a> {
    pub fn new(catalog: &'a MerchantCatalog, vendor_label: &'a str) -> Self {
        Self {
            catalog,
            vendor_label,
        }
    }

    pub fn resolve(&self, view: &DocumentView<'_>) -> Merchant {
        if let Some(entry) = self.catalog.lookup(view.summary_text()) {
            debug!("Merchant {} matched catalog pattern {:?}", entry.name, entry.pattern);
            return Merchant {
                name: entry.name.clone(),
                source: MerchantSource::Catalog,
            };
        }

        // Used verbatim; the assembler maps a blank name to Unknown.
        let vendor = view
            .summary_by_type(self.vendor_label)
            .filter(|v| !v.is_empty());

        match vendor {
            Some(name) => {
                debug!("Merchant {} taken from {}", name, self.vendor_label);
                Merchant {
                    name: name.to_string(),
                    source: MerchantSource::VendorName,
                }
            }
            None => Merchant::unknown(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::expense::{ExpenseDocument, ExpenseField};
    use pretty_assertions::assert_eq;

    fn doc(fields: &[(&str, &str)]) -> ExpenseDocument {
        ExpenseDocument::new(
            fields
                .iter()
                .map(|(label, value)| ExpenseField::new(*label, *value))
                .collect(),
            Vec::new(),
        )
    }

    fn resolve(catalog: &MerchantCatalog, doc: &ExpenseDocument) -> Merchant {
        MerchantResolver::new(catalog, "VENDOR_NAME").resolve(&DocumentView::new(doc))
    }

    #[test]
    fn test_catalog_beats_vendor_name() {
        let doc = doc(&[
            ("VENDOR_NAME", "TESC0 ST0RES"),
            ("ADDRESS", "TESCO STORES LTD"),
        ]);
        let merchant = resolve(&MerchantCatalog::default(), &doc);
        assert_eq!(merchant.name, "Tesco");
        assert_eq!(merchant.source, MerchantSource::Catalog);
    }

    #[test]
    fn test_vendor_name_fallback() {
        let doc = doc(&[("VENDOR_NAME", "Joe's Deli")]);
        let merchant = resolve(&MerchantCatalog::default(), &doc);
        assert_eq!(merchant.name, "Joe's Deli");
        assert_eq!(merchant.source, MerchantSource::VendorName);
    }

    #[test]
    fn test_vendor_name_is_used_verbatim() {
        let doc = doc(&[("VENDOR_NAME", " Joe's Deli\n")]);
        let merchant = resolve(&MerchantCatalog::empty(), &doc);
        assert_eq!(merchant.name, " Joe's Deli\n");
        assert_eq!(merchant.source, MerchantSource::VendorName);
    }

    #[test]
    fn test_empty_vendor_name_is_unknown() {
        let empty = doc(&[("VENDOR_NAME", ""), ("TOTAL", "4.20")]);
        assert_eq!(resolve(&MerchantCatalog::default(), &empty), Merchant::unknown());

        let missing = doc(&[("TOTAL", "4.20")]);
        assert_eq!(resolve(&MerchantCatalog::default(), &missing), Merchant::unknown());
    }

    #[test]
    fn test_first_matching_entry_wins() {
        let catalog = MerchantCatalog::from_pairs([("coop", "Coop Group"), ("co-op", "Co-op")]);
        let doc = doc(&[("VENDOR_NAME", "THE CO-OP COOPERATIVE")]);
        assert_eq!(resolve(&catalog, &doc).name, "Coop Group");

        let catalog = MerchantCatalog::from_pairs([("co-op", "Co-op"), ("coop", "Coop Group")]);
        assert_eq!(resolve(&catalog, &doc).name, "Co-op");
    }

    #[test]
    fn test_resolution_is_repeatable() {
        let doc = doc(&[("NAME", "Sainsbury's Local"), ("OTHER", "co op")]);
        let catalog = MerchantCatalog::default();
        let first = resolve(&catalog, &doc);
        for _ in 0..10 {
            assert_eq!(resolve(&catalog, &doc), first);
        }
        assert_eq!(first.name, "Sainsbury's");
    }

    #[test]
    fn test_patterns_are_lowercased() {
        let catalog = MerchantCatalog::from_pairs([("LIDL", "Lidl")]);
        assert_eq!(catalog.entries()[0].pattern, "lidl");
        assert!(catalog.lookup("lidl gb").is_some());
    }

    #[test]
    fn test_catalog_serializes_in_order() {
        let catalog = MerchantCatalog::from_pairs([("b", "B"), ("a", "A")]);
        let json = serde_json::to_string(&catalog).unwrap();
        assert_eq!(json, r#"[{"pattern":"b","name":"B"},{"pattern":"a","name":"A"}]"#);
    }
}
